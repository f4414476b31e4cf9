//! Attribute sync metrics tracking using OpenTelemetry.

use opentelemetry::metrics::{Counter, Gauge, Histogram, Meter};
use std::sync::Arc;
use std::time::Instant;

/// Metrics collector for bootstrap and propagation.
///
/// # Examples
///
/// ```rust,no_run
/// use dcc_sync::metrics::SyncMetrics;
/// use opentelemetry::global;
///
/// let metrics = SyncMetrics::new(global::meter("dcc-sync"));
///
/// let timer = metrics.start_propagation();
/// // ... apply the change ...
/// metrics.record_propagation_applied(timer, 0);
/// ```
#[derive(Clone)]
pub struct SyncMetrics {
    bootstrap_attempts: Counter<u64>,
    bootstrap_fallbacks: Counter<u64>,
    bootstrap_failures: Counter<u64>,
    propagation_applied: Counter<u64>,
    propagation_ignored: Counter<u64>,
    propagation_failures: Counter<u64>,
    binding_failures: Counter<u64>,
    propagation_duration: Histogram<f64>,
    bound_keys: Gauge<i64>,
    change_age_seconds: Gauge<i64>,
    last_change: Arc<parking_lot::Mutex<Instant>>,
}

impl SyncMetrics {
    /// Create a new metrics collector with the provided meter.
    pub fn new(meter: Meter) -> Self {
        let bootstrap_attempts = meter
            .u64_counter("dcc_sync.bootstrap.attempts")
            .with_description("Attributes bootstrapped")
            .build();

        let bootstrap_fallbacks = meter
            .u64_counter("dcc_sync.bootstrap.fallbacks")
            .with_description("Attributes bound to their local default after a store failure")
            .build();

        let bootstrap_failures = meter
            .u64_counter("dcc_sync.bootstrap.failures")
            .with_description("Attributes that could not be bound at bootstrap")
            .build();

        let propagation_applied = meter
            .u64_counter("dcc_sync.propagation.applied")
            .with_description("Change messages applied to the store")
            .build();

        let propagation_ignored = meter
            .u64_counter("dcc_sync.propagation.ignored")
            .with_description("Change messages for attributes absent from the store")
            .build();

        let propagation_failures = meter
            .u64_counter("dcc_sync.propagation.failures")
            .with_description("Change messages that failed on the store")
            .build();

        let binding_failures = meter
            .u64_counter("dcc_sync.binding.failures")
            .with_description("Target slot writes that were rejected")
            .build();

        let propagation_duration = meter
            .f64_histogram("dcc_sync.propagation.duration")
            .with_description("Duration of change propagation in seconds")
            .with_unit("s")
            .build();

        let bound_keys = meter
            .i64_gauge("dcc_sync.registry.keys")
            .with_description("Store keys with bound targets in this process")
            .build();

        let change_age_seconds = meter
            .i64_gauge("dcc_sync.change.age")
            .with_description("Time since the last applied change in seconds")
            .with_unit("s")
            .build();

        Self {
            bootstrap_attempts,
            bootstrap_fallbacks,
            bootstrap_failures,
            propagation_applied,
            propagation_ignored,
            propagation_failures,
            binding_failures,
            propagation_duration,
            bound_keys,
            change_age_seconds,
            last_change: Arc::new(parking_lot::Mutex::new(Instant::now())),
        }
    }

    /// Record one attribute bootstrap.
    pub fn record_bootstrap(&self, fallback: bool) {
        self.bootstrap_attempts.add(1, &[]);
        if fallback {
            self.bootstrap_fallbacks.add(1, &[]);
        }
    }

    /// Record an attribute that could not be bound at bootstrap.
    pub fn record_bootstrap_failure(&self) {
        self.bootstrap_attempts.add(1, &[]);
        self.bootstrap_failures.add(1, &[]);
    }

    /// Start a propagation timer.
    pub fn start_propagation(&self) -> Instant {
        Instant::now()
    }

    /// Record an applied change and the number of rejected target writes.
    pub fn record_propagation_applied(&self, start: Instant, binding_failures: usize) {
        self.propagation_applied.add(1, &[]);
        self.propagation_duration
            .record(start.elapsed().as_secs_f64(), &[]);
        if binding_failures > 0 {
            self.binding_failures.add(binding_failures as u64, &[]);
        }
        *self.last_change.lock() = Instant::now();
    }

    /// Record a change ignored because the attribute is unknown.
    pub fn record_propagation_ignored(&self) {
        self.propagation_ignored.add(1, &[]);
    }

    /// Record a change that failed on the store.
    pub fn record_propagation_failure(&self, start: Instant) {
        self.propagation_failures.add(1, &[]);
        self.propagation_duration
            .record(start.elapsed().as_secs_f64(), &[]);
    }

    /// Update the number of bound keys.
    pub fn update_bound_keys(&self, count: usize) {
        self.bound_keys.record(count as i64, &[]);
    }

    /// Update the time-since-last-change metric.
    ///
    /// This should be called periodically.
    pub fn update_change_age(&self) {
        let age_secs = self.last_change.lock().elapsed().as_secs() as i64;
        self.change_age_seconds.record(age_secs, &[]);
    }
}

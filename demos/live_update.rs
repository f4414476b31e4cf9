//! Example demonstrating live attribute updates across two services.
//!
//! This example shows how to:
//! - Declare attributes with defaults on a component
//! - Bootstrap the component against a shared store
//! - Publish a change and watch it reach every bound component
//! - Keep running on defaults when the store is down
//!
//! Run with: RUST_LOG=dcc_sync=debug cargo run --example live_update

use dcc_sync::prelude::*;
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dcc_sync=info".into()),
        )
        .init();

    println!("=== Live Attribute Update Example ===\n");

    let settings = DccSettings {
        system: "orders".to_string(),
        ..Default::default()
    };

    // One store and one channel, shared by two "instances" of the same system.
    let store = MemoryStore::new();
    let channel = MemoryChannel::new(settings.channel_capacity);

    let instance_a = Arc::new(
        AttributeSyncService::builder()
            .with_settings(&settings)
            .with_store(Arc::new(store.clone()))
            .build()?,
    );
    let instance_b = Arc::new(
        AttributeSyncService::builder()
            .with_settings(&settings)
            .with_store(Arc::new(store.clone()))
            .build()?,
    );
    let _listener_a = instance_a.listen(&channel).await?;
    let _listener_b = instance_b.listen(&channel).await?;

    let checkout_a = Arc::new(
        DynamicAttributes::builder("Checkout@a")
            .attribute("retryLimit", "3")
            .declaration("paymentUrl:https://pay.example.com/v1")?
            .build(),
    );
    let checkout_b = Arc::new(
        DynamicAttributes::builder("Checkout@b")
            .attribute("retryLimit", "3")
            .declaration("paymentUrl:https://pay.example.com/v1")?
            .build(),
    );

    let report = instance_a.bootstrap(checkout_a.clone()).await?;
    println!("Bootstrapped {}:", report.target());
    for (attribute, value) in report.resolved() {
        println!("  {attribute} = {} ({value:?})", value.value());
    }
    instance_b.bootstrap(checkout_b.clone()).await?;
    println!();

    println!("--- Publishing retryLimit = 5 ---");
    let reached = publish_change(&channel, "orders", &ChangeMessage::new("retryLimit", "5")).await?;
    println!("Reached {reached} subscribers");
    tokio::time::sleep(Duration::from_millis(50)).await;
    print_target(&checkout_a);
    print_target(&checkout_b);
    println!();

    println!("--- Publishing an attribute nobody declared ---");
    publish_change(&channel, "orders", &ChangeMessage::new("unknown", "1")).await?;
    tokio::time::sleep(Duration::from_millis(50)).await;
    println!("Store has key orders_unknown: {}\n", store.peek("orders_unknown").is_some());

    println!("--- Store outage ---");
    store.set_available(false);
    let late = Arc::new(
        DynamicAttributes::builder("Checkout@late")
            .attribute("retryLimit", "3")
            .build(),
    );
    let report = instance_a.bootstrap(late.clone()).await?;
    println!("Fallbacks while store is down: {}", report.fallback_count());
    print_target(&late);

    let outcome = instance_a.on_change(ChangeMessage::new("retryLimit", "9")).await;
    println!("Change during outage: {outcome:?}");
    print_target(&checkout_a);

    store.set_available(true);
    println!("\n=== Example Complete ===");
    Ok(())
}

fn print_target(target: &DynamicAttributes) {
    let values: Vec<String> = target
        .slot_names()
        .map(|name| {
            let value = target.get(name).map(|v| v.to_string()).unwrap_or_default();
            format!("{name}={value}")
        })
        .collect();
    println!("  {:?}: {}", target.target_name(), values.join(", "));
}

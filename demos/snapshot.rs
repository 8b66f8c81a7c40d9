//! Load one aggregate snapshot from the live providers and print it.
//!
//! ```bash
//! NASA_API_KEY=... cargo run --example snapshot
//! ```

use cosmic_feed::prelude::*;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("cosmic_feed=info")),
        )
        .init();

    let client = CosmicClientBuilder::from_env().build()?;
    if client.uses_demo_key() {
        tracing::warn!("Using the shared DEMO_KEY; expect rate limiting");
    }

    let engine = CosmicAggregator::new(client.clone(), client, AggregatorConfig::default());
    let mut rx = engine.subscribe();
    let snap = tokio::time::timeout(Duration::from_secs(60), rx.wait_for(|s| !s.is_refreshing))
        .await??
        .clone();

    println!("status:          {:?}", snap.status());
    if let Some(err) = &snap.last_error {
        println!("error:           {}", err);
    }
    match snap.current_price {
        Some(price) => println!("current price:   ${}", price),
        None => println!("current price:   unknown"),
    }
    println!("events today:    {}", snap.today_event_count);
    println!("hazard score:    {}%", snap.overall_hazard_score);
    if snap.uses_fallback_events() {
        println!("                 (event data is synthetic, provider was rate limiting)");
    }
    println!();
    for point in &snap.series {
        println!(
            "{:<14} ${:>12}  {:>3} objects",
            display_date(&point.date),
            point.price,
            point.event_count
        );
    }
    Ok(())
}

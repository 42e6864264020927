//! End-to-end walk through the store and the telemetry feed.
//!
//! Run with `cargo run --example ride_flow`. State persists in ./neonride-db
//! between runs; delete the directory for a fresh install.

use std::sync::Arc;
use std::time::Duration;

use neonride::store::AppStore;
use neonride::telemetry::DriverFeed;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let db = Arc::new(sled::open("neonride-db")?);
    let mut store = AppStore::open(db);

    let token = store.subscribe(|snapshot| {
        println!(
            "observer: balance {} cents, {} rides, authenticated: {}",
            snapshot.balance_cents,
            snapshot.ride_history.len(),
            snapshot.is_authenticated
        );
    });

    store.login("alex@example.com", "hunter2")?;
    let ride = store.book_ride("Downtown Hub", "Airport Terminal 3")?;
    println!(
        "booked {} for {} cents with {}",
        ride.id, ride.price_cents, ride.driver
    );
    store.cancel_ride(&ride.id)?; // no refund
    store.add_funds(5_000)?;
    println!("referral code: {}", store.referral().code);
    store.unsubscribe(token);

    // live driver telemetry for a few ticks
    let mut feed = DriverFeed::with_interval(Duration::from_millis(500));
    let (subscriber, updates) = feed.subscribe();
    feed.start();
    for update in updates.iter().take(3) {
        println!(
            "driver at ({:.4}, {:.4}) heading {:.0}° at {} km/h, eta {} min",
            update.lat, update.lng, update.heading, update.speed_kmh, update.eta_minutes
        );
    }
    feed.unsubscribe(subscriber);
    feed.stop();

    Ok(())
}

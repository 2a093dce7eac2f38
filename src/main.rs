//! # Order Taker Demo
//!
//! Takes a small batch of orders concurrently from the [`SimulatedVenue`](order_taker::lifecycle::SimulatedVenue).
//!
//! ```bash
//! RUST_LOG=info cargo run
//! RUST_LOG=debug cargo run -- taker.toml
//! ```

use order_taker::lifecycle::{setup_tracing, Decision, TakerConfig, TakingSystem};
use order_taker::model::{Order, OrderId};
use tracing::{error, info, Instrument};

const BATCH_SIZE: usize = 6;

#[tokio::main]
async fn main() -> Result<(), String> {
    setup_tracing();

    let config = match std::env::args().nth(1) {
        Some(path) => TakerConfig::load(&path).map_err(|e| e.to_string())?,
        None => TakerConfig::default(),
    };
    info!(?config, "Starting order taker demo");

    let orders: Vec<Order> = (0..BATCH_SIZE).map(|_| Order::new(OrderId::new())).collect();
    let listings = orders.iter().enumerate().map(|(i, order)| {
        let decision = if i % 3 == 2 {
            Decision::Decline("already_taken".to_string())
        } else {
            Decision::Accept
        };
        (order.id, decision)
    });

    let system = TakingSystem::new(&config, listings);

    let mut handles = Vec::with_capacity(orders.len());
    for order in orders {
        let taker = system.taker.clone();
        let options = system.options();
        let span = tracing::info_span!("batch");
        handles.push(tokio::spawn(
            async move { (order.id, taker.take(&order, options).await) }.instrument(span),
        ));
    }

    let mut taken = 0;
    for handle in handles {
        match handle.await.map_err(|e| e.to_string())? {
            (order_id, Ok(accepted)) => {
                taken += 1;
                info!(%order_id, details = ?accepted.details.fields, "Order taken");
            }
            (order_id, Err(e)) => error!(%order_id, error = %e, "Order not taken"),
        }
    }
    info!(taken, total = BATCH_SIZE, "Batch finished");

    system.shutdown().await?;

    info!("Application completed successfully");
    Ok(())
}

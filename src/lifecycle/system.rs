//! System wiring: one simulated venue, one push hub, one order taker.

use crate::clients::PushHub;
use crate::lifecycle::config::TakerConfig;
use crate::lifecycle::venue::{Decision, SimulatedVenue};
use crate::model::OrderId;
use crate::taker::{OrderTaker, TakeOptions};
use std::sync::Arc;
use tracing::{error, info};

/// Wires a simulated venue, its push hub and an [`OrderTaker`] together.
///
/// `TakingSystem` is responsible for:
/// - **Lifecycle Management**: spawning the venue actor and stopping it again
/// - **Dependency Wiring**: handing the venue's command client and the hub to the taker
///
/// # Example
///
/// ```ignore
/// let system = TakingSystem::new(&config, [(order.id, Decision::Accept)]);
///
/// let accepted = system.taker.take(&order, system.options()).await?;
///
/// system.shutdown().await?;
/// ```
pub struct TakingSystem {
    /// Takes orders from the venue.
    pub taker: OrderTaker,

    /// Push feeds the venue publishes its decisions on.
    pub hub: PushHub,

    options: TakeOptions,

    /// Task handles for the running actors (used for graceful shutdown)
    handles: Vec<tokio::task::JoinHandle<()>>,
}

impl TakingSystem {
    /// Spawns the venue with `listings` already listed and returns the wired system.
    ///
    /// Must be called inside a Tokio runtime.
    pub fn new(
        config: &TakerConfig,
        listings: impl IntoIterator<Item = (OrderId, Decision)>,
    ) -> Self {
        let hub = PushHub::new();
        let (mut venue, client) = SimulatedVenue::new(100, config.venue.clone(), hub.clone());
        for (order_id, decision) in listings {
            venue.list(order_id, decision);
        }
        let venue_handle = tokio::spawn(venue.run());

        let taker = OrderTaker::new(Arc::new(client), Arc::new(hub.clone()));

        Self {
            taker,
            hub,
            options: config.take_options(),
            handles: vec![venue_handle],
        }
    }

    /// Pacing read from the configuration.
    pub fn options(&self) -> TakeOptions {
        self.options
    }

    /// Gracefully shuts down the system.
    ///
    /// Dropping the taker closes the command channel and the venue leaves its loop.
    /// Clones of the taker held elsewhere keep the channel open, so drop them first.
    ///
    /// # Returns
    ///
    /// - `Ok(())` if every actor shut down cleanly
    /// - `Err(String)` if an actor task failed or panicked
    pub async fn shutdown(self) -> Result<(), String> {
        info!("Shutting down system...");

        drop(self.taker);
        drop(self.hub);

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!("Actor task failed: {:?}", e);
                return Err(format!("Actor task failed: {:?}", e));
            }
        }

        info!("System shutdown complete.");
        Ok(())
    }
}

//! # Details Retriever
//!
//! Once an order is known to be ours, its details are fetched until they arrive.
//!
//! Failures are never inspected and there is no retry ceiling or backoff growth: a
//! permanently failing details endpoint keeps the operation alive until the caller
//! cancels it. Callers that cannot tolerate that should wrap the take in a timeout.

use crate::clients::TransportCommandPort;
use crate::framework::DelayScheduler;
use crate::model::{AcceptedOrder, OrderId};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

pub struct DetailsRetriever {
    transport: Arc<dyn TransportCommandPort>,
    order_id: OrderId,
    retry_interval: Duration,
}

impl DetailsRetriever {
    pub fn new(
        transport: Arc<dyn TransportCommandPort>,
        order_id: OrderId,
        retry_interval: Duration,
    ) -> Self {
        Self {
            transport,
            order_id,
            retry_interval,
        }
    }

    /// Fetches details, first attempt immediately, then every `retry_interval`.
    ///
    /// Returns `None` only if `cancel` fires first.
    pub async fn run(self, cancel: CancellationToken) -> Option<AcceptedOrder> {
        let delays = DelayScheduler::new(cancel.clone());
        let order_id = self.order_id;
        let mut attempt: u64 = 0;

        loop {
            attempt += 1;
            debug!(%order_id, attempt, "Fetching details");

            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => return None,
                result = self.transport.fetch_details(order_id) => result,
            };

            match result {
                Ok(details) => return Some(AcceptedOrder { id: order_id, details }),
                Err(failure) => warn!(%order_id, attempt, %failure, "Details fetch failed, retrying"),
            }

            if delays.pause(self.retry_interval).await.is_err() {
                return None;
            }
        }
    }
}

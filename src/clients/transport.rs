//! # TransportCommandPort
//!
//! The request/response half of the venue connection. Every call is one-shot: one request,
//! one response or one failure. Implementations are shared (`Arc<dyn TransportCommandPort>`)
//! by every in-flight take operation, so they must tolerate concurrent callers.
use crate::clients::TransportFailure;
use crate::model::{OrderDetails, OrderId, TakeResponse};
use async_trait::async_trait;

/// One-shot command calls against the venue.
#[async_trait]
pub trait TransportCommandPort: Send + Sync {
    /// Ask the venue to assign the order to us.
    async fn submit_take(&self, order_id: OrderId) -> Result<TakeResponse, TransportFailure>;

    /// Ask how a previously submitted take is going.
    async fn poll_status(&self, order_id: OrderId) -> Result<TakeResponse, TransportFailure>;

    /// Fetch the full details of an accepted order.
    async fn fetch_details(&self, order_id: OrderId) -> Result<OrderDetails, TransportFailure>;
}

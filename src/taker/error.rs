//! Error type surfaced by a take operation.

use thiserror::Error;

/// The order was declined.
///
/// A synchronous `Declined` answer, a push-declined event and a transport failure carrying
/// a decline reason all end up here. The caller cannot tell which of them produced it.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Order taking failed: {reason}")]
pub struct OrderTakingFailure {
    pub reason: String,
}

impl OrderTakingFailure {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

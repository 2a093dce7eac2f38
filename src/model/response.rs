//! Payloads exchanged with the venue: command responses and push notices.

use crate::model::OrderId;
use serde::{Deserialize, Serialize};

/// Result of a submit-take or poll-status call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", content = "reason", rename_all = "snake_case")]
pub enum TakeResponse {
    Accepted,
    Processing,
    Declined(String),
}

/// A decline notification delivered on the push feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclineNotice {
    pub order_id: OrderId,
    pub reason: String,
}

impl DeclineNotice {
    pub fn new(order_id: OrderId, reason: impl Into<String>) -> Self {
        Self {
            order_id,
            reason: reason.into(),
        }
    }
}

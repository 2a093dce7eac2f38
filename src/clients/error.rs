//! Error type for the transport ports.

use thiserror::Error;

/// Failure of any transport call.
///
/// The failure is opaque except for one field: a decline reason. When present it is an
/// authoritative, terminal answer from the venue ("this order will never be yours").
/// When absent the failure is transient and the caller is free to retry.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Transport failure: {message}")]
pub struct TransportFailure {
    pub message: String,
    pub decline_reason: Option<String>,
}

impl TransportFailure {
    /// A retryable failure (timeout, 5xx, dropped connection, ...).
    pub fn transient(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            decline_reason: None,
        }
    }

    /// A failure whose payload carries a decline reason.
    pub fn declined(reason: impl Into<String>) -> Self {
        let reason = reason.into();
        Self {
            message: format!("declined: {}", reason),
            decline_reason: Some(reason),
        }
    }

    pub fn decline_reason(&self) -> Option<&str> {
        self.decline_reason.as_deref()
    }

    pub fn is_transient(&self) -> bool {
        self.decline_reason.is_none()
    }
}

//! # Command Messages
//!
//! The message type carried between a [`CommandClient`](crate::framework::CommandClient) and
//! whatever services the command channel: a transport actor talking to the network, the
//! [`SimulatedVenue`](crate::lifecycle::venue::SimulatedVenue), or a test mock.

use crate::clients::TransportFailure;
use crate::model::{OrderDetails, OrderId, TakeResponse};
use tokio::sync::oneshot;

/// Type alias for the one-shot response channel attached to every command.
pub type Response<T> = oneshot::Sender<Result<T, TransportFailure>>;

/// A single request/response exchange.
///
/// Each variant maps to one operation of the
/// [`TransportCommandPort`](crate::clients::TransportCommandPort). The servicing side answers
/// exactly once through `respond_to`; if the caller has given up in the meantime the answer
/// is simply discarded.
#[derive(Debug)]
pub enum CommandRequest {
    SubmitTake {
        order_id: OrderId,
        respond_to: Response<TakeResponse>,
    },
    PollStatus {
        order_id: OrderId,
        respond_to: Response<TakeResponse>,
    },
    FetchDetails {
        order_id: OrderId,
        respond_to: Response<OrderDetails>,
    },
}

impl CommandRequest {
    pub fn order_id(&self) -> OrderId {
        match self {
            CommandRequest::SubmitTake { order_id, .. }
            | CommandRequest::PollStatus { order_id, .. }
            | CommandRequest::FetchDetails { order_id, .. } => *order_id,
        }
    }

    pub fn kind(&self) -> CommandKind {
        match self {
            CommandRequest::SubmitTake { .. } => CommandKind::SubmitTake,
            CommandRequest::PollStatus { .. } => CommandKind::PollStatus,
            CommandRequest::FetchDetails { .. } => CommandKind::FetchDetails,
        }
    }
}

/// Discriminant of a [`CommandRequest`], handy for logs and call recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    SubmitTake,
    PollStatus,
    FetchDetails,
}

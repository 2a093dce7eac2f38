//! Channel plumbing shared by the take pipeline.
//!
//! # Main Components
//!
//! - [`CommandRequest`] - The request/response message carried on the command channel
//! - [`CommandClient`] - Channel-backed implementation of the transport port
//! - [`DelayScheduler`] - Cancellable one-shot pauses
//!
//! # Testing
//!
//! See [`mock`] module for a scripted transport and raw channel helpers.

pub mod client;
pub mod delay;
pub mod message;
pub mod mock;

pub use client::CommandClient;
pub use delay::{Cancelled, DelayScheduler};
pub use message::{CommandKind, CommandRequest, Response};

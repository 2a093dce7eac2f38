//! The order-taking coordinator.
//!
//! # Main Components
//!
//! - [`OrderTaker`] - Public entry point: one take, one result
//! - [`RaceCoordinator`] - First-completed-wins over polling and push feeds
//! - [`PollingPipeline`] - Submit/poll loop over the [`PollOperation`] state machine
//! - [`DetailsRetriever`] - Fetches details of an accepted order

pub mod coordinator;
pub mod details;
pub mod error;
pub mod pipeline;
pub mod race;
pub mod state;

pub use coordinator::{OrderTaker, TakeOptions, DEFAULT_INITIAL_POLL_DELAY, DEFAULT_RETRY_INTERVAL};
pub use details::DetailsRetriever;
pub use error::OrderTakingFailure;
pub use pipeline::PollingPipeline;
pub use race::{Branch, RaceCoordinator};
pub use state::{Outcome, PollOperation, PollState};

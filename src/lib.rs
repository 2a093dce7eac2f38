//! # Order Taker
//!
//! > **Confirm a remotely submitted take, whichever channel answers first.**
//!
//! A venue can tell us that an order was assigned (or refused) in two independent ways: the
//! answer to a submit/poll exchange, or an unsolicited push notification. This crate races
//! the two, settles on exactly one outcome per order, and on acceptance fetches the order
//! details.
//!
//! ## 🚀 Core Concepts
//!
//! ### One task per take
//! A take runs entirely on the caller's task. The polling pipeline and both push
//! subscriptions are futures inside one `tokio::select!`, so there is never more than one
//! thing touching an operation's state at a time and no lock is needed.
//!
//! ### Pure state transitions
//! [`PollOperation`](taker::PollOperation) is an immutable snapshot. Each answer from the
//! venue produces a new snapshot; states only move forward.
//!
//! ### Cancellation is dropping
//! Losing race branches are dropped, not ignored. Dropping a take's future (or cancelling
//! the token passed to [`take_cancellable`](taker::OrderTaker::take_cancellable)) abandons
//! in-flight calls, disarms pauses and releases push subscriptions.
//!
//! ## 👩‍💻 Architecture Notes
//!
//! ### Retry policy
//! Transient submit failures are resubmitted immediately. Polls are paced by
//! `initial_poll_delay` then `retry_interval`. Details are refetched every `retry_interval`
//! with no ceiling, so a venue that never serves details keeps a take alive until the
//! caller gives up.
//!
//! ### Decline sources
//! A `Declined` answer, a push decline and a transport failure carrying a decline reason
//! all surface as the same [`OrderTakingFailure`](taker::OrderTakingFailure).
//!
//! ## 🗺️ Module Tour
//!
//! ### 1. The Coordinator ([`taker`])
//! - **Role**: State machine, race, details retrieval and the public entry point.
//! - **Key items**: [`OrderTaker`](taker::OrderTaker), [`TakeOptions`](taker::TakeOptions).
//!
//! ### 2. The Ports ([`clients`])
//! - **Role**: What the coordinator needs from the venue.
//! - **Key items**: [`TransportCommandPort`](clients::TransportCommandPort),
//!   [`PushEventPort`](clients::PushEventPort), [`PushHub`](clients::PushHub).
//!
//! ### 3. The Plumbing ([`framework`])
//! - **Role**: Channel-backed command client, cancellable delays, test mocks.
//! - **Key items**: [`CommandClient`](framework::CommandClient),
//!   [`DelayScheduler`](framework::DelayScheduler), [`mock`](framework::mock).
//!
//! ### 4. The Orchestrator ([`lifecycle`])
//! - **Role**: Configuration, tracing, the simulated venue and system wiring.
//! - **Key items**: [`TakingSystem`](lifecycle::TakingSystem),
//!   [`TakerConfig`](lifecycle::TakerConfig).
//!
//! ## 🚀 Quick Start
//!
//! ```bash
//! RUST_LOG=info cargo run
//! cargo test
//! ```

pub mod clients;
pub mod framework;
pub mod lifecycle;
pub mod model;
pub mod taker;

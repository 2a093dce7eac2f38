//! # Observability & Tracing
//!
//! [`setup_tracing`] installs structured logging with the `tracing` crate. Every take
//! operation runs inside a `take_cancellable` span carrying its `order_id`, so all lines
//! of one take can be grepped together even when many run concurrently.
//!
//! ## Usage Examples
//!
//! ```bash
//! # Milestones only: take started, race settled (and by which branch), result
//! RUST_LOG=info cargo run
//!
//! # Every command issued and every poll state transition
//! RUST_LOG=debug cargo run
//!
//! # Only the coordinator
//! RUST_LOG=order_taker::taker=debug cargo run
//! ```
//!
//! ## What Gets Traced
//!
//! - **info**: take started, race settled, order taken/declined, venue started/stopped
//! - **debug**: each command issued, each state transition, push publications
//! - **warn**: transient transport failures, failed details fetches, unexpected venue calls
//!
//! ## Workflow Trace Example
//!
//! ```text
//! INFO take_cancellable: Taking order order_id=order_6f1c… options=TakeOptions { .. }
//! WARN take_cancellable: Transient transport failure order_id=order_6f1c… command=SubmitTake attempt=1
//! INFO take_cancellable: Race settled order_id=order_6f1c… branch=pipeline outcome=AcceptedPending
//! INFO take_cancellable: Order taken order_id=order_6f1c…
//! ```

/// Installs the global subscriber. Panics if one is already installed.
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}

/// Like [`setup_tracing`], but returns `false` instead of panicking when a subscriber is
/// already installed. Convenient in tests, where many may race to install one.
pub fn try_setup_tracing() -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .with_test_writer()
        .try_init()
        .is_ok()
}

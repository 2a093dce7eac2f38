//! Runtime orchestration and lifecycle management.
//!
//! # Main Components
//!
//! - [`TakingSystem`] - Spawns the simulated venue and wires it to an order taker
//! - [`SimulatedVenue`] - In-process venue actor driven by a [`VenueScript`]
//! - [`TakerConfig`] - TOML file configuration
//! - [`setup_tracing`] - Initializes the tracing/logging infrastructure

pub mod config;
pub mod system;
pub mod tracing;
pub mod venue;

pub use config::{ConfigError, TakerConfig};
pub use system::TakingSystem;
pub use self::tracing::{setup_tracing, try_setup_tracing};
pub use venue::{Decision, SimulatedVenue, VenueScript};

//! Pure data structures (DTOs) shared by the coordinator, its ports and the simulated venue.

pub mod order;
pub mod response;

pub use order::*;
pub use response::*;

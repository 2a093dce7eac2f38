//! Ports to the venue: the command transport and the push feeds.

pub mod error;
pub mod push;
pub mod transport;

pub use error::*;
pub use push::*;
pub use transport::*;

// diagmon Core - Collection Rule Actions, Domain Logic & Ports
// NO process spawning or OS adapters here (Hexagonal Architecture)

pub mod application;
pub mod domain;
pub mod error;
pub mod port;

pub use error::{AppError, Result};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

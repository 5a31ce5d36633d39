//! Application layer - Use cases and orchestration
//!
//! Contains route acquisition, rendering and live tracking services plus the
//! port definitions they depend on. Infrastructure adapters implement the
//! ports.

pub mod error;
pub mod ports;
pub mod services;

#[cfg(test)]
mod testing;

pub use error::ApplicationError;
pub use ports::*;
pub use services::*;

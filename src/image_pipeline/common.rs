//! Shared error types
//!
//! Every pipeline step reports through [`BridgeError`]; runtime startup has
//! its own [`InitError`].

pub mod error;

pub use error::{BridgeError, InitError, Result};

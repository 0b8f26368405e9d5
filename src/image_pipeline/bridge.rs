//! Processing bridge module
//!
//! Orchestrates read, decode, grayscale, encode and write for a single
//! locator, with blocking and asynchronous entry points.

mod locks;
mod pipeline;

#[cfg(test)]
mod tests;

pub use locks::PathLocks;
pub use pipeline::ProcessingBridge;

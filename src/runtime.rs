//! Runtime for executing chat turns
//!
//! Connects the pure state machine to the backend and the display.

mod executor;

#[cfg(test)]
pub mod testing;

pub use executor::ChatRuntime;

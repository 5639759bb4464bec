//! This module contains the encoding-chain machinery.
//!
//! `models` defines the requested transforms and the recorded steps,
//! `executor` runs a chain over a typed array, `decoder` inverts a recorded
//! chain, and `classifier` chooses a chain from the data itself.

pub mod classifier;
pub mod decoder;
pub mod executor;
pub mod models;

//! Analysis modules.
//!
//! Reshapes long-form observations into complete categorical grids.

pub mod aggregator;

pub use aggregator::*;

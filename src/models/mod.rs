//! Exponential model implementations.
//!
//! Models are implemented as small, pure functions so that fitting/search code can
//! stay generic over the sign convention.

pub mod model;

pub use model::*;

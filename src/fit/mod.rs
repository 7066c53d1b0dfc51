//! Exponential curve fitting.
//!
//! - `seed`: deterministic parallel search for a starting rate
//! - `fitter`: Levenberg–Marquardt refinement and fit diagnostics

pub mod fitter;
pub mod seed;

pub use fitter::*;
pub use seed::{Seed, seed_rate};

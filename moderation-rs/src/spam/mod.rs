//! Heuristic spam scoring
//!
//! Deterministic, local scoring from surface features of a message. No I/O.

pub mod scorer;
pub mod types;

pub use scorer::HeuristicScorer;
pub use types::*;

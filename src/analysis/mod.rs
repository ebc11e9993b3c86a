//! Repository tiering and profile scoring.
//!
//! Pure, synchronous heuristics: no I/O, and the only ambient input is
//! the clock, which callers inject.

pub mod aggregator;
pub mod clock;
pub mod policy;
pub mod tier;

pub use aggregator::*;
pub use clock::{Clock, FixedClock, SystemClock};
pub use policy::ScoringPolicy;
pub use tier::{classify_repo_tier, flagship_signals, noise_reasons, FlagshipSignals};

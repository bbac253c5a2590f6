//! Thread bump ordering and eviction rules

mod engine;

pub use engine::{BumpDecision, BumpOutcome, ThreadBumpEngine, ThreadState};

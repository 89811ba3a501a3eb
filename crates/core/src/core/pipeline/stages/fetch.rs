//! Fetch stage: instruction cache access.
//!
//! Queries the I-cache at the current PC. A hit produces the next IF/ID
//! entry in the same cycle; a miss leaves the frontend stalled while the
//! refill engine fills the line.

use crate::core::pipeline::latches::IfIdEntry;
use crate::core::units::icache::{FetchOutcome, ICache};

/// What the fetch stage produced this cycle.
#[derive(Debug, Clone, Copy)]
pub enum FetchResult {
    /// The instruction at `pc` was served; advance IF/ID.
    Fetched(IfIdEntry),
    /// Cache miss; PC holds and IF/ID receives a bubble.
    Stalled {
        /// True when this access started the refill (counts as one miss).
        refill_started: bool,
    },
}

/// Runs the fetch stage at the given PC.
pub fn fetch_stage(pc: u32, icache: &mut ICache) -> FetchResult {
    match icache.fetch(pc) {
        FetchOutcome::Hit(inst) => FetchResult::Fetched(IfIdEntry { pc, inst }),
        FetchOutcome::Miss { refill_started } => FetchResult::Stalled { refill_started },
    }
}

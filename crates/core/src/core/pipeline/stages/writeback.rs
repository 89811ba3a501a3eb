//! Writeback stage: register-file write arbitration and retirement.
//!
//! Three sources compete for the single write port each cycle, in fixed
//! priority order:
//! 1. the store-forward result registered at MEM last cycle,
//! 2. the oldest complete load-queue entry,
//! 3. the normal execute result in the MEM/WB latch.
//!
//! The queue-sourced writes belong to program-order-older instructions, so
//! when one wins while the MEM/WB latch also wants the port, the pipeline
//! result holds and the stages upstream stall for the cycle.

use crate::core::pipeline::latches::{PipelineLatches, RegWrite};
use crate::core::units::lsq::LoadQueue;
use crate::stats::SimStats;

/// Which source won the write port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WbSource {
    /// No write this cycle.
    Idle,
    /// Registered store-to-load forward result.
    StoreForward,
    /// Completed load-queue entry (carries the entry id to dequeue).
    LoadQueue(u64),
    /// Execute result from the MEM/WB latch.
    Pipeline,
}

/// Outcome of writeback arbitration for one cycle.
#[derive(Debug, Clone, Copy)]
pub struct WbDecision {
    /// The register write to perform, if any.
    pub write: Option<RegWrite>,
    /// Winning source.
    pub source: WbSource,
    /// True when a queue source won while the pipeline result also wanted
    /// the port; MEM/WB and upstream must hold this cycle.
    pub conflict: bool,
}

/// Arbitrates the write port from the previous tick's state.
pub fn arbitrate(prev: &PipelineLatches, loads: &LoadQueue) -> WbDecision {
    let pipeline_write = pipeline_write(prev);

    if let Some(w) = prev.store_fwd {
        return WbDecision {
            write: Some(w),
            source: WbSource::StoreForward,
            conflict: pipeline_write.is_some(),
        };
    }

    if let Some((id, dest, value)) = loads.oldest_complete() {
        return WbDecision {
            write: Some(RegWrite { rd: dest, value }),
            source: WbSource::LoadQueue(id),
            conflict: pipeline_write.is_some(),
        };
    }

    match pipeline_write {
        Some(w) => WbDecision {
            write: Some(w),
            source: WbSource::Pipeline,
            conflict: false,
        },
        None => WbDecision {
            write: None,
            source: WbSource::Idle,
            conflict: false,
        },
    }
}

/// The write the MEM/WB latch wants this cycle, if any.
///
/// Loads pass through the latch as placeholders (their writes arrive
/// through the queue sources), so `mem_read` entries never claim the port
/// here.
fn pipeline_write(prev: &PipelineLatches) -> Option<RegWrite> {
    if !prev.mem_wb.valid {
        return None;
    }
    let e = &prev.mem_wb.payload;
    if !e.ctrl.reg_write || e.ctrl.mem_read || e.rd == 0 {
        return None;
    }
    let value = if e.ctrl.jump {
        e.pc.wrapping_add(4)
    } else {
        e.alu
    };
    Some(RegWrite { rd: e.rd, value })
}

/// Retirement accounting for the entry leaving the MEM/WB latch.
pub fn retire(prev: &PipelineLatches, stats: &mut SimStats) {
    if !prev.mem_wb.valid {
        return;
    }
    let e = &prev.mem_wb.payload;
    stats.instructions_retired += 1;
    if e.ctrl.mem_read {
        stats.inst_load += 1;
    } else if e.ctrl.mem_write {
        stats.inst_store += 1;
    } else if e.ctrl.branch || e.ctrl.jump {
        stats.inst_branch += 1;
    } else if e.ctrl.is_system() {
        stats.inst_system += 1;
    } else {
        stats.inst_alu += 1;
    }
}

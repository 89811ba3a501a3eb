//! Memory stage: queue peel-off and store-to-load forward detection.
//!
//! Loads and stores leave the main pipeline here. A store enqueues into the
//! store queue; a load first probes the store queue for a forwardable match:
//!
//! - exact address, identical width → the store's data is run through the
//!   *load's* sign/zero-extension rule and registered for writeback next
//!   cycle; the load never touches memory.
//! - overlapping but width-mismatched → no merging; the load enqueues and
//!   the queue holds its request until the store has retired to memory.
//! - no overlap → the load enqueues and issues normally.
//!
//! A full queue refuses the enqueue and the stage reports backpressure; the
//! EX/MEM latch and everything upstream hold.

use crate::core::pipeline::latches::{ExMemEntry, MemWbEntry, RegWrite};
use crate::core::units::lsq::{Lsq, StoreLookup, extend_load};

/// What the memory stage produced this cycle.
#[derive(Debug, Clone, Copy)]
pub enum MemOutcome {
    /// The instruction advanced into MEM/WB (possibly as a queue
    /// placeholder).
    Advance {
        /// Entry for the MEM/WB latch.
        entry: MemWbEntry,
        /// Store-to-load forward result to register for next cycle's
        /// writeback.
        store_fwd: Option<RegWrite>,
        /// True when the load was satisfied by forwarding (statistics).
        forwarded: bool,
    },
    /// The target queue is full; hold EX/MEM and upstream.
    Stall,
}

/// Runs the memory stage on one EX/MEM entry.
pub fn memory_stage(ex: &ExMemEntry, lsq: &mut Lsq) -> MemOutcome {
    let placeholder = MemWbEntry {
        pc: ex.pc,
        inst: ex.inst,
        rd: ex.rd,
        alu: ex.alu,
        ctrl: ex.ctrl,
    };

    if ex.ctrl.mem_read {
        let addr = ex.alu;
        match lsq.stores.lookup(addr, ex.ctrl.width) {
            StoreLookup::Forward(raw) => {
                let value = extend_load(raw, ex.ctrl.width, ex.ctrl.signed_load);
                tracing::trace!(
                    addr = format_args!("{addr:#x}"),
                    value = format_args!("{value:#x}"),
                    "store-to-load forward"
                );
                MemOutcome::Advance {
                    entry: placeholder,
                    store_fwd: Some(RegWrite { rd: ex.rd, value }),
                    forwarded: true,
                }
            }
            StoreLookup::Conflict | StoreLookup::None => {
                if lsq
                    .loads
                    .enqueue(addr, ex.rd, ex.ctrl.width, ex.ctrl.signed_load)
                    .is_none()
                {
                    return MemOutcome::Stall;
                }
                MemOutcome::Advance {
                    entry: placeholder,
                    store_fwd: None,
                    forwarded: false,
                }
            }
        }
    } else if ex.ctrl.mem_write {
        if lsq
            .stores
            .enqueue(ex.alu, ex.store_data, ex.ctrl.width)
            .is_none()
        {
            return MemOutcome::Stall;
        }
        MemOutcome::Advance {
            entry: placeholder,
            store_fwd: None,
            forwarded: false,
        }
    } else {
        MemOutcome::Advance {
            entry: placeholder,
            store_fwd: None,
            forwarded: false,
        }
    }
}

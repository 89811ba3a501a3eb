//! Data hazard detection and operand forwarding.
//!
//! This module implements the logic for maintaining pipeline consistency when
//! data dependencies exist between instructions. It provides:
//! 1. **Load-Use Detection:** The one-cycle stall when a decode-stage
//!    instruction depends on a load currently in execute.
//! 2. **Queue Interlock:** Execute-stage holds against outstanding load-queue
//!    entries that forwarding cannot cover (slow responses, lost writeback
//!    arbitration), for both source (RAW) and destination (WAW) overlap.
//! 3. **Operand Forwarding:** Resolves RAW hazards by bypassing the register
//!    file from the younger in-flight latches or the writeback output.

use crate::core::pipeline::latches::{ExMemEntry, IdExEntry, IfIdEntry, Latch, MemWbEntry, RegWrite};
use crate::core::units::lsq::LoadQueue;
use crate::isa::decode;

/// Where a forwarded operand value came from, chosen independently per
/// operand in priority order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ForwardSource {
    /// No hazard; the register-file value read at decode stands.
    #[default]
    None,
    /// Result sitting in the execute→memory latch.
    FromExecuteLatch,
    /// Result sitting in the memory→writeback latch.
    FromMemoryLatch,
    /// Value at the writeback arbitration output this cycle.
    FromWriteback,
}

/// Checks if a one-cycle stall is needed due to a load-use data hazard.
///
/// A stall is required when the instruction in execute is a load whose valid,
/// nonzero destination matches either source operand of the instruction
/// entering decode. Non-load producers are handled by forwarding instead.
pub fn need_stall_load_use(id_ex: &Latch<IdExEntry>, if_id: &Latch<IfIdEntry>) -> bool {
    if !id_ex.valid || !if_id.valid {
        return false;
    }
    let ex = &id_ex.payload;
    if !ex.ctrl.mem_read || ex.rd == 0 {
        return false;
    }
    let (rs1, rs2) = decode::source_regs(if_id.payload.inst);
    rs1 == Some(ex.rd) || rs2 == Some(ex.rd)
}

/// Checks if the execute stage must hold against outstanding loads.
///
/// The one-cycle load-use stall only covers the adjacent case where the load
/// completes by its writeback slot. When a load is still in the queue (slow
/// memory, lost writeback arbitration), a consumer must wait for its value
/// (RAW) and a same-destination writer must wait to preserve write order
/// (WAW). The load one stage ahead, about to enqueue this cycle, counts too.
///
/// `loads` is the queue state after this cycle's writeback commit, so an
/// entry writing back right now (whose value reaches execute through the
/// writeback forward path) no longer blocks.
pub fn need_stall_queue_dep(
    id_ex: &Latch<IdExEntry>,
    ex_mem: &Latch<ExMemEntry>,
    loads: &LoadQueue,
) -> bool {
    if !id_ex.valid {
        return false;
    }
    let ex = &id_ex.payload;

    let matches = |dest: usize| -> bool {
        dest != 0
            && ((ex.uses_rs1 && ex.rs1 == dest)
                || (ex.uses_rs2 && ex.rs2 == dest)
                || (ex.ctrl.reg_write && ex.rd == dest))
    };

    if ex_mem.valid && ex_mem.payload.ctrl.mem_read && matches(ex_mem.payload.rd) {
        return true;
    }
    loads.iter().any(|entry| matches(entry.dest))
}

/// Forwards one execute-stage operand from the youngest matching producer.
///
/// Priority: execute→memory latch, then memory→writeback latch, then the
/// writeback arbitration output, then the register-file value read at decode.
/// A load is never forwarded from the latches; its result only becomes
/// visible at writeback, which is why the load-use detector exists.
pub fn forward_operand(
    src: usize,
    reg_value: u32,
    ex_mem: &Latch<ExMemEntry>,
    mem_wb: &Latch<MemWbEntry>,
    wb_write: Option<RegWrite>,
) -> (u32, ForwardSource) {
    if src == 0 {
        return (0, ForwardSource::None);
    }

    if ex_mem.valid {
        let m = &ex_mem.payload;
        if m.ctrl.reg_write && !m.ctrl.mem_read && m.rd == src {
            let val = if m.ctrl.jump {
                m.pc.wrapping_add(4)
            } else {
                m.alu
            };
            return (val, ForwardSource::FromExecuteLatch);
        }
    }

    if mem_wb.valid {
        let w = &mem_wb.payload;
        if w.ctrl.reg_write && !w.ctrl.mem_read && w.rd == src {
            let val = if w.ctrl.jump {
                w.pc.wrapping_add(4)
            } else {
                w.alu
            };
            return (val, ForwardSource::FromMemoryLatch);
        }
    }

    if let Some(w) = wb_write {
        if w.rd == src {
            return (w.value, ForwardSource::FromWriteback);
        }
    }

    (reg_value, ForwardSource::None)
}

//! Execute stage: ALU dispatch, branch resolution, and redirect generation.
//!
//! Computes the ALU result (which doubles as the effective address for
//! memory operations), resolves branch and jump outcomes against the
//! always-not-taken fetch policy, and raises the pipeline redirect that
//! forces the frontend to a bubble on the following cycle.

use crate::common::RegisterFile;
use crate::common::constants::{REG_A0, REG_A7, SYSCALL_EXIT};
use crate::core::alu::{alu, branch_taken};
use crate::core::csr::CsrFile;
use crate::core::pipeline::latches::{ExMemEntry, IdExEntry};
use crate::core::pipeline::signals::{OpASrc, OpBSrc};

/// What the execute stage produced this cycle.
#[derive(Debug, Clone, Copy)]
pub struct ExecuteOutcome {
    /// Entry for the EX/MEM latch.
    pub entry: ExMemEntry,
    /// Redirect target when control transfers (taken branch, jump, MRET,
    /// FENCE.I refetch). Forces the frontend latches to bubbles.
    pub redirect: Option<u32>,
    /// Simulation exit code requested by an ECALL exit.
    pub exit: Option<u32>,
}

/// Runs the execute stage on one instruction with forwarded operands.
///
/// `fwd_a`/`fwd_b` are the rs1/rs2 values after forwarding resolution; the
/// store operand travels in the EX/MEM entry as `store_data`.
pub fn execute_stage(
    id: &IdExEntry,
    fwd_a: u32,
    fwd_b: u32,
    csr: &mut CsrFile,
    regs: &RegisterFile,
) -> ExecuteOutcome {
    let op_a = match id.ctrl.a_src {
        OpASrc::Reg1 => fwd_a,
        OpASrc::Pc => id.pc,
        OpASrc::Zero => 0,
    };
    let op_b = match id.ctrl.b_src {
        OpBSrc::Imm => id.imm as u32,
        OpBSrc::Reg2 => fwd_b,
    };

    let alu_out = alu(id.ctrl.alu, op_a, op_b);

    let mut redirect = None;
    let mut exit = None;

    if id.ctrl.branch {
        let f3 = (id.inst >> 12) & 0x7;
        if branch_taken(f3, fwd_a, fwd_b) {
            redirect = Some(id.pc.wrapping_add(id.imm as u32));
        }
    } else if id.ctrl.jump {
        let target = if id.ctrl.jalr {
            fwd_a.wrapping_add(id.imm as u32) & !1
        } else {
            id.pc.wrapping_add(id.imm as u32)
        };
        redirect = Some(target);
    } else if id.ctrl.is_mret {
        redirect = Some(csr.mret());
    } else if id.ctrl.is_fence_i {
        // Squash anything fetched past the fence; the cache invalidation
        // pulse fires when the fence retires at writeback.
        redirect = Some(id.pc.wrapping_add(4));
    } else if id.ctrl.is_ecall && regs.read(REG_A7) == SYSCALL_EXIT {
        exit = Some(regs.read(REG_A0));
    }

    ExecuteOutcome {
        entry: ExMemEntry {
            pc: id.pc,
            inst: id.inst,
            rd: id.rd,
            alu: alu_out,
            store_data: fwd_b,
            ctrl: id.ctrl,
        },
        redirect,
        exit,
    }
}

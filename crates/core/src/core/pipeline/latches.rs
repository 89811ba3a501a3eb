//! Pipeline latch structures for inter-stage communication.
//!
//! This module defines the entry types carried between the five pipeline
//! stages (IF → ID → EX → MEM → WB) and the typed holding cell that carries
//! them:
//! 1. **Instruction Flow:** Entry structs for each inter-stage boundary.
//! 2. **Latch Discipline:** Exactly one transition per latch per cycle:
//!    *advance*, *flush-to-bubble*, or *hold* (no call). A flush always
//!    outranks a hold caused by a stall.
//! 3. **Registered Forwards:** The store-to-load forward result registered at
//!    MEM for writeback in the following cycle.

use crate::core::pipeline::signals::ControlSignals;

/// Typed holding cell between two pipeline stages.
///
/// `valid == false` marks a bubble: the payload is the default (no-op) value
/// and downstream stages treat the slot as empty.
#[derive(Clone, Debug, Default)]
pub struct Latch<T> {
    /// Payload produced by the upstream stage.
    pub payload: T,
    /// Whether the payload represents a real instruction.
    pub valid: bool,
}

impl<T: Default> Latch<T> {
    /// Replaces the payload from upstream and marks the latch valid.
    pub fn advance(&mut self, payload: T) {
        self.payload = payload;
        self.valid = true;
    }

    /// Flushes the latch to an inert bubble.
    pub fn bubble(&mut self) {
        self.payload = T::default();
        self.valid = false;
    }
}

/// Entry in the IF/ID latch (fetch to decode).
#[derive(Clone, Copy, Debug, Default)]
pub struct IfIdEntry {
    /// Program counter of the instruction.
    pub pc: u32,
    /// Raw 32-bit instruction encoding.
    pub inst: u32,
}

/// Entry in the ID/EX latch (decode to execute).
#[derive(Clone, Copy, Debug, Default)]
pub struct IdExEntry {
    /// Program counter of the instruction.
    pub pc: u32,
    /// Raw 32-bit instruction encoding.
    pub inst: u32,
    /// First source register index.
    pub rs1: usize,
    /// Second source register index.
    pub rs2: usize,
    /// True when the instruction's format actually reads rs1.
    pub uses_rs1: bool,
    /// True when the instruction's format actually reads rs2.
    pub uses_rs2: bool,
    /// Destination register index.
    pub rd: usize,
    /// Sign-extended immediate value.
    pub imm: i32,
    /// Value read from rs1 at decode (may be superseded by forwarding).
    pub rv1: u32,
    /// Value read from rs2 at decode (may be superseded by forwarding).
    pub rv2: u32,
    /// Control signals for downstream stages.
    pub ctrl: ControlSignals,
}

/// Entry in the EX/MEM latch (execute to memory).
#[derive(Clone, Copy, Debug, Default)]
pub struct ExMemEntry {
    /// Program counter of the instruction.
    pub pc: u32,
    /// Raw 32-bit instruction encoding.
    pub inst: u32,
    /// Destination register index.
    pub rd: usize,
    /// ALU result; the effective address for loads and stores.
    pub alu: u32,
    /// Data to be stored (for store instructions).
    pub store_data: u32,
    /// Control signals for downstream stages.
    pub ctrl: ControlSignals,
}

/// Entry in the MEM/WB latch (memory to writeback).
///
/// Loads and stores pass through as placeholders: their data moves through
/// the queues, not this latch.
#[derive(Clone, Copy, Debug, Default)]
pub struct MemWbEntry {
    /// Program counter of the instruction.
    pub pc: u32,
    /// Raw 32-bit instruction encoding.
    pub inst: u32,
    /// Destination register index.
    pub rd: usize,
    /// ALU result (for non-memory instructions).
    pub alu: u32,
    /// Control signals for the writeback stage.
    pub ctrl: ControlSignals,
}

/// A register-file write arbitrated at writeback.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RegWrite {
    /// Destination register index.
    pub rd: usize,
    /// Value to write.
    pub value: u32,
}

/// All inter-stage state that commits once per clock edge.
#[derive(Clone, Debug, Default)]
pub struct PipelineLatches {
    /// Fetch → decode.
    pub if_id: Latch<IfIdEntry>,
    /// Decode → execute.
    pub id_ex: Latch<IdExEntry>,
    /// Execute → memory.
    pub ex_mem: Latch<ExMemEntry>,
    /// Memory → writeback.
    pub mem_wb: Latch<MemWbEntry>,
    /// Store-to-load forward result registered at MEM, written back next cycle.
    pub store_fwd: Option<RegWrite>,
}

impl PipelineLatches {
    /// Clears every latch back to the reset bubble state.
    pub fn reset(&mut self) {
        self.if_id.bubble();
        self.id_ex.bubble();
        self.ex_mem.bubble();
        self.mem_wb.bubble();
        self.store_fwd = None;
    }
}

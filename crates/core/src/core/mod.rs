//! The CPU core: architectural state plus the synchronous tick.
//!
//! Hardware's many simultaneously-updating storage cells become one explicit
//! state struct and a single ordered `tick` function. Every stage computes
//! from the *previous* tick's latch snapshot and all commits land once per
//! cycle, in the fixed acyclic order: writeback arbitration → memory stage →
//! execute (with forwarding) → hazard detection → decode → fetch → queue and
//! refill engines. There is no intra-cycle re-evaluation loop.
//!
//! Latch transition priority is the safety-critical rule here: a flush
//! (taken branch, jump, MRET, FENCE.I refetch, interrupt entry) always
//! outranks any stall holding the same latch. Letting a stall mask a flush
//! would re-execute the pre-branch instruction stream.

/// Arithmetic/logic unit and branch comparator.
pub mod alu;
/// Machine-mode CSR state and interrupt lines.
pub mod csr;
/// Latches, hazards, signals, and stage logic.
pub mod pipeline;
/// Instruction cache and load/store queues.
pub mod units;

use crate::common::constants::INSTRUCTION_BYTES;
use crate::common::{AccessFault, RegisterFile};
use crate::config::Config;
use crate::core::csr::{CsrFile, InterruptCause, InterruptLine};
use crate::core::pipeline::hazards;
use crate::core::pipeline::latches::PipelineLatches;
use crate::core::pipeline::stages::fetch::{FetchResult, fetch_stage};
use crate::core::pipeline::stages::memory::{MemOutcome, memory_stage};
use crate::core::pipeline::stages::writeback::{self, WbSource};
use crate::core::pipeline::stages::{decode::decode_stage, execute::execute_stage};
use crate::core::units::icache::ICache;
use crate::core::units::lsq::Lsq;
use crate::mem::MainMemory;
use crate::stats::SimStats;

/// The 5-stage in-order core.
#[derive(Debug, Clone)]
pub struct Cpu {
    /// Architectural register file.
    pub regs: RegisterFile,
    /// Next-fetch address.
    pub pc: u32,
    /// Inter-stage latches.
    pub latches: PipelineLatches,
    /// Instruction cache on the fetch port.
    pub icache: ICache,
    /// Load/store queueing system on the data port.
    pub lsq: Lsq,
    /// CSR collaborator for the interrupt-suspend contract.
    pub csr: CsrFile,
    /// Backing memory, shared by both ports.
    pub mem: MainMemory,
    /// Performance counters (observational only).
    pub stats: SimStats,
    /// Exit code requested by an ECALL exit, if any.
    pub exit_code: Option<u32>,
    /// Emit the per-cycle pipeline diagram to stderr.
    pub trace: bool,

    reset_pc: u32,
}

impl Cpu {
    /// Builds a core in the post-reset state.
    pub fn new(config: &Config) -> Self {
        let mem = MainMemory::new(&config.memory);
        // One request per line word plus the memory round trip.
        let refill_latency = config.memory.read_latency + config.icache.line_words as u64;
        Self {
            regs: RegisterFile::new(),
            pc: config.general.reset_pc,
            latches: PipelineLatches::default(),
            icache: ICache::new(&config.icache, refill_latency),
            lsq: Lsq::new(&config.queues),
            csr: CsrFile::new(),
            mem,
            stats: SimStats::default(),
            exit_code: None,
            trace: config.general.trace,
            reset_pc: config.general.reset_pc,
        }
    }

    /// Returns every component to the reset state. Memory contents are kept
    /// so a loaded program can be re-run.
    pub fn reset(&mut self) {
        self.regs.reset();
        self.pc = self.reset_pc;
        self.latches.reset();
        self.icache.reset();
        self.lsq.reset();
        self.csr.reset();
        self.stats = SimStats::default();
        self.exit_code = None;
    }

    /// Drives one of the asynchronous interrupt request lines.
    pub fn set_irq(&mut self, line: InterruptLine, asserted: bool) {
        self.csr.set_line(line, asserted);
    }

    /// True when a deliverable interrupt is waiting.
    pub fn interrupt_pending(&self) -> bool {
        self.csr.pending_interrupt().is_some()
    }

    /// Cause code of the waiting interrupt, if any.
    pub fn pending_cause(&self) -> Option<InterruptCause> {
        self.csr.pending_interrupt()
    }

    /// Advances the core by one clock cycle.
    pub fn tick(&mut self) -> Result<(), AccessFault> {
        self.stats.cycles += 1;
        let cycle = self.stats.cycles;
        if self.trace {
            self.print_pipeline_diagram();
        }

        // Load responses arriving on this edge become visible to this
        // cycle's writeback arbitration.
        self.lsq.collect_load_responses(cycle, &self.mem)?;

        // Previous-tick latch state; every stage below reads this snapshot.
        let prev = self.latches.clone();

        // ---- Writeback: arbitrate the single register-file write port ----
        let wb = writeback::arbitrate(&prev, &self.lsq.loads);
        if let Some(w) = wb.write {
            self.regs.write(w.rd, w.value);
        }
        if let WbSource::LoadQueue(id) = wb.source {
            self.lsq.loads.dequeue(id);
        }
        // The registered store-forward always wins the port when present,
        // so it is consumed unconditionally; the memory stage may register a
        // fresh one below.
        self.latches.store_fwd = None;

        if wb.conflict {
            // A queue write (program-order older) claimed the port while the
            // pipeline result wanted it: MEM/WB and everything upstream hold
            // for the cycle. Interrupts remain takeable.
            self.stats.stalls_mem += 1;
            let _ = self.try_take_interrupt();
            return self.finish_cycle(cycle);
        }

        // ---- Memory stage: queue peel-off / store-to-load forwarding ----
        if prev.ex_mem.valid {
            match memory_stage(&prev.ex_mem.payload, &mut self.lsq) {
                MemOutcome::Stall => {
                    // Queue-full backpressure: EX/MEM and upstream hold, a
                    // bubble drains into MEM/WB.
                    self.retire_leaving(&prev);
                    self.latches.mem_wb.bubble();
                    self.stats.stalls_mem += 1;
                    let _ = self.try_take_interrupt();
                    return self.finish_cycle(cycle);
                }
                MemOutcome::Advance {
                    entry,
                    store_fwd,
                    forwarded,
                } => {
                    self.retire_leaving(&prev);
                    self.latches.mem_wb.advance(entry);
                    self.latches.store_fwd = store_fwd;
                    if forwarded {
                        self.stats.store_forwards += 1;
                    }
                }
            }
        } else {
            self.retire_leaving(&prev);
            self.latches.mem_wb.bubble();
        }

        // ---- Execute: forwarding, ALU, branch resolution ----
        let mut redirect = None;
        if prev.id_ex.valid {
            // Outstanding-load interlock: forwarding cannot supply a value
            // still in the load queue, and a same-destination writer must
            // not overtake it.
            if hazards::need_stall_queue_dep(&prev.id_ex, &prev.ex_mem, &self.lsq.loads) {
                self.latches.ex_mem.bubble();
                self.stats.stalls_data += 1;
                let _ = self.try_take_interrupt();
                return self.finish_cycle(cycle);
            }

            let id = &prev.id_ex.payload;
            let (a, src_a) =
                hazards::forward_operand(id.rs1, id.rv1, &prev.ex_mem, &prev.mem_wb, wb.write);
            let (b, src_b) =
                hazards::forward_operand(id.rs2, id.rv2, &prev.ex_mem, &prev.mem_wb, wb.write);
            if self.trace {
                if src_a != hazards::ForwardSource::None {
                    eprintln!("EX  pc={:#x} rs1=x{} val={a:#x} src={src_a:?}", id.pc, id.rs1);
                }
                if src_b != hazards::ForwardSource::None {
                    eprintln!("EX  pc={:#x} rs2=x{} val={b:#x} src={src_b:?}", id.pc, id.rs2);
                }
            }

            let out = execute_stage(id, a, b, &mut self.csr, &self.regs);
            self.latches.ex_mem.advance(out.entry);
            if out.exit.is_some() {
                self.exit_code = out.exit;
            }
            redirect = out.redirect;
        } else {
            self.latches.ex_mem.bubble();
        }

        // ---- Control: flush beats stall beats advance ----
        if let Some(target) = redirect {
            // The two frontend latches hold wrong-path instructions; both
            // flush to bubbles regardless of any concurrent fetch stall, and
            // an in-flight refill simply keeps filling in the background.
            self.latches.id_ex.bubble();
            self.latches.if_id.bubble();
            self.pc = target;
            self.stats.stalls_control += 2;
            tracing::trace!(cycle, target = format_args!("{target:#x}"), "pipeline flush");
        } else if self.try_take_interrupt() {
            // Decode output would be wrong-path after the trap redirect.
            self.latches.id_ex.bubble();
        } else if hazards::need_stall_load_use(&prev.id_ex, &prev.if_id) {
            // One-cycle load-use stall: IF/ID and PC hold, EX gets a bubble.
            self.latches.id_ex.bubble();
            self.stats.stalls_data += 1;
        } else {
            // ---- Decode ----
            if prev.if_id.valid {
                match decode_stage(&prev.if_id.payload, &self.regs) {
                    Some(entry) => self.latches.id_ex.advance(entry),
                    None => self.latches.id_ex.bubble(),
                }
            } else {
                self.latches.id_ex.bubble();
            }

            // ---- Fetch ----
            match fetch_stage(self.pc, &mut self.icache) {
                FetchResult::Fetched(entry) => {
                    self.latches.if_id.advance(entry);
                    self.stats.icache_hits += 1;
                    self.pc = self.pc.wrapping_add(INSTRUCTION_BYTES);
                }
                FetchResult::Stalled { refill_started } => {
                    self.latches.if_id.bubble();
                    if refill_started {
                        self.stats.icache_misses += 1;
                    }
                    self.stats.stalls_mem += 1;
                }
            }
        }

        self.finish_cycle(cycle)
    }

    /// End-of-cycle engines: store retirement, the data-port grant, and the
    /// refill countdown. These run on every cycle, stalled or not.
    fn finish_cycle(&mut self, cycle: u64) -> Result<(), AccessFault> {
        self.lsq.end_cycle(cycle, &mut self.mem)?;
        if let Some(install) = self.icache.tick(&self.mem)? {
            if install.evicted {
                self.stats.icache_evictions += 1;
            }
        }
        Ok(())
    }

    /// Retirement bookkeeping for the instruction leaving MEM/WB, including
    /// the one-cycle invalidation pulse when the retiring instruction is the
    /// instruction-stream synchronization fence.
    fn retire_leaving(&mut self, prev: &PipelineLatches) {
        writeback::retire(prev, &mut self.stats);
        if prev.mem_wb.valid && prev.mem_wb.payload.ctrl.is_fence_i {
            self.icache.invalidate();
            self.stats.icache_invalidations += 1;
            tracing::debug!("instruction stream synchronized; icache invalidated");
        }
    }

    /// Takes a pending interrupt, if one is deliverable this cycle.
    ///
    /// The suspension point sits between the instruction in decode
    /// (squashed; its PC becomes the saved PC) and the instruction in
    /// execute (older; it drains architecturally). Works during load-use,
    /// cache-miss, and backpressure stalls; only a same-cycle branch
    /// redirect defers delivery, so the saved PC is never wrong-path.
    fn try_take_interrupt(&mut self) -> bool {
        let Some(cause) = self.csr.pending_interrupt() else {
            return false;
        };
        let epc = if self.latches.if_id.valid {
            self.latches.if_id.payload.pc
        } else {
            self.pc
        };
        let vector = self.csr.take_trap(epc, cause);
        self.latches.if_id.bubble();
        self.pc = vector;
        self.stats.interrupts_taken += 1;
        tracing::debug!(
            ?cause,
            epc = format_args!("{epc:#x}"),
            vector = format_args!("{vector:#x}"),
            "interrupt taken"
        );
        true
    }

    fn print_pipeline_diagram(&self) {
        let fmt = |valid: bool, pc: u32| -> String {
            if valid {
                format!("[{pc:08x}]")
            } else {
                format!("[{:^8}]", "--")
            }
        };
        eprintln!(
            "IF {:08x} -> ID {} -> EX {} -> MEM {} -> WB {}  (LQ {} SQ {})",
            self.pc,
            fmt(self.latches.if_id.valid, self.latches.if_id.payload.pc),
            fmt(self.latches.id_ex.valid, self.latches.id_ex.payload.pc),
            fmt(self.latches.ex_mem.valid, self.latches.ex_mem.payload.pc),
            fmt(self.latches.mem_wb.valid, self.latches.mem_wb.payload.pc),
            self.lsq.loads.len(),
            self.lsq.stores.len(),
        );
    }
}

//! Simulation statistics collection and reporting.
//!
//! This module tracks performance metrics for the core. It provides:
//! 1. **Cycle and IPC:** Total cycles, retired instructions, and derived CPI.
//! 2. **Instruction mix:** Counts by category (ALU, load, store, branch, system).
//! 3. **Stalls:** Data, control, and memory stall cycle counts.
//! 4. **Memory side:** I-cache hits/misses/evictions/invalidations and
//!    store-to-load forwarding counts.
//!
//! Statistics are observational only and never affect timing.

/// Simulation statistics structure tracking all performance metrics.
#[derive(Debug, Clone, Default)]
pub struct SimStats {
    /// Total simulator cycles elapsed.
    pub cycles: u64,
    /// Number of instructions committed (retired).
    pub instructions_retired: u64,

    /// Count of load instructions retired.
    pub inst_load: u64,
    /// Count of store instructions retired.
    pub inst_store: u64,
    /// Count of branch/jump instructions retired.
    pub inst_branch: u64,
    /// Count of ALU (non-load/store/branch/system) instructions retired.
    pub inst_alu: u64,
    /// Count of system (ECALL, MRET, FENCE.I) instructions retired.
    pub inst_system: u64,

    /// Stall cycles due to data hazards (load-use and queue dependencies).
    pub stalls_data: u64,
    /// Stall cycles due to control hazards (branch resolution, flush).
    pub stalls_control: u64,
    /// Stall cycles due to the memory side (cache refill, queue backpressure,
    /// write-port conflicts).
    pub stalls_mem: u64,

    /// Instruction cache hit count.
    pub icache_hits: u64,
    /// Instruction cache miss count (one per refill, not per stalled cycle).
    pub icache_misses: u64,
    /// Valid lines displaced by refills.
    pub icache_evictions: u64,
    /// Whole-cache invalidation pulses observed.
    pub icache_invalidations: u64,

    /// Loads satisfied by store-to-load forwarding.
    pub store_forwards: u64,
    /// Interrupts taken.
    pub interrupts_taken: u64,
}

impl SimStats {
    /// Cycles per retired instruction, or 0.0 before anything retires.
    pub fn cpi(&self) -> f64 {
        if self.instructions_retired == 0 {
            0.0
        } else {
            self.cycles as f64 / self.instructions_retired as f64
        }
    }

    /// Prints a formatted report to stdout.
    pub fn print(&self) {
        println!("=== Simulation Statistics ===");
        println!("Cycles:              {}", self.cycles);
        println!("Instructions:        {}", self.instructions_retired);
        println!("CPI:                 {:.3}", self.cpi());
        println!();
        println!("Instruction mix:");
        println!("  ALU:               {}", self.inst_alu);
        println!("  Load:              {}", self.inst_load);
        println!("  Store:             {}", self.inst_store);
        println!("  Branch/Jump:       {}", self.inst_branch);
        println!("  System:            {}", self.inst_system);
        println!();
        println!("Stall cycles:");
        println!("  Data hazard:       {}", self.stalls_data);
        println!("  Control hazard:    {}", self.stalls_control);
        println!("  Memory:            {}", self.stalls_mem);
        println!();
        println!("I-cache:");
        println!("  Hits:              {}", self.icache_hits);
        println!("  Misses:            {}", self.icache_misses);
        println!("  Evictions:         {}", self.icache_evictions);
        println!("  Invalidations:     {}", self.icache_invalidations);
        println!();
        println!("Store-to-load fwd:   {}", self.store_forwards);
        println!("Interrupts taken:    {}", self.interrupts_taken);
    }
}

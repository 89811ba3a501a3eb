//! Configuration system for the simulator.
//!
//! This module defines all configuration structures used to parameterize the
//! core. It provides:
//! 1. **Defaults:** Baseline hardware constants (cache geometry, queue depths, memory timing).
//! 2. **Structures:** Hierarchical config for general, cache, queue, and memory parameters.
//!
//! Configuration is supplied via JSON (`serde_json`) or `Config::default()`.

use serde::Deserialize;

/// Default configuration constants for the simulator.
///
/// These values define the baseline hardware configuration when not
/// explicitly overridden.
mod defaults {
    /// Reset value of the program counter.
    pub const RESET_PC: u32 = 0x0000_0000;

    /// Base address of main memory.
    pub const MEM_BASE: u32 = 0x0000_0000;

    /// Total size of main memory (256 KiB).
    pub const MEM_SIZE: usize = 256 * 1024;

    /// Memory read latency in cycles (request to response).
    pub const MEM_READ_LATENCY: u64 = 1;

    /// Memory write latency in cycles (request to retirement).
    pub const MEM_WRITE_LATENCY: u64 = 1;

    /// Number of instruction cache sets.
    pub const ICACHE_SETS: usize = 16;

    /// Instruction cache associativity (2-way).
    pub const ICACHE_WAYS: usize = 2;

    /// Instruction cache line size in 32-bit words.
    pub const ICACHE_LINE_WORDS: usize = 4;

    /// Load queue depth.
    pub const LOAD_QUEUE_ENTRIES: usize = 4;

    /// Store queue depth.
    pub const STORE_QUEUE_ENTRIES: usize = 4;
}

/// General simulation parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Emit a per-cycle pipeline diagram and stage events to stderr.
    pub trace: bool,
    /// Program counter value at reset.
    pub reset_pc: u32,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            trace: false,
            reset_pc: defaults::RESET_PC,
        }
    }
}

/// Instruction cache geometry.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IcacheConfig {
    /// Number of sets.
    pub sets: usize,
    /// Ways per set.
    pub ways: usize,
    /// Line size in 32-bit words.
    pub line_words: usize,
}

impl Default for IcacheConfig {
    fn default() -> Self {
        Self {
            sets: defaults::ICACHE_SETS,
            ways: defaults::ICACHE_WAYS,
            line_words: defaults::ICACHE_LINE_WORDS,
        }
    }
}

/// Load/store queue depths.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    /// Load queue capacity.
    pub load_entries: usize,
    /// Store queue capacity.
    pub store_entries: usize,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            load_entries: defaults::LOAD_QUEUE_ENTRIES,
            store_entries: defaults::STORE_QUEUE_ENTRIES,
        }
    }
}

/// Main memory placement and timing.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    /// Base address of the mapped range.
    pub base: u32,
    /// Size of the mapped range in bytes.
    pub size: usize,
    /// Read latency in cycles.
    pub read_latency: u64,
    /// Write latency in cycles.
    pub write_latency: u64,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            base: defaults::MEM_BASE,
            size: defaults::MEM_SIZE,
            read_latency: defaults::MEM_READ_LATENCY,
            write_latency: defaults::MEM_WRITE_LATENCY,
        }
    }
}

/// Root configuration for the simulator.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General simulation parameters.
    pub general: GeneralConfig,
    /// Instruction cache geometry.
    pub icache: IcacheConfig,
    /// Load/store queue depths.
    pub queues: QueueConfig,
    /// Main memory placement and timing.
    pub memory: MemoryConfig,
}

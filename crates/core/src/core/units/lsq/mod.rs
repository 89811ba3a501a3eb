//! Split load/store queueing system and the shared data-port arbiter.
//!
//! Memory instructions peel off the pipeline at MEM into these queues and
//! rejoin at writeback, possibly on a different cycle than their neighbours:
//! 1. **Load Queue:** In-order issue, out-of-order completion relative to
//!    stores, extension on response.
//! 2. **Store Queue:** In-order retirement, forwarding lookup for younger
//!    loads.
//! 3. **Arbitration:** The queues share one memory port; each cycle at most
//!    one request is granted, favouring whichever queue is nearer to full
//!    (deadlock avoidance under backpressure) with a slight edge to loads
//!    otherwise, since the pipeline stalls on outstanding loads more
//!    directly.

/// Load queue implementation.
pub mod load_queue;
/// Store queue implementation.
pub mod store_queue;

pub use load_queue::{LoadQueue, LoadQueueEntry, LoadStatus};
pub use store_queue::{StoreLookup, StoreQueue, StoreQueueEntry, StoreStatus};

use crate::common::AccessFault;
use crate::config::QueueConfig;
use crate::core::pipeline::signals::MemWidth;
use crate::mem::MainMemory;

/// Applies a load's sign/zero-extension rule to raw memory or forwarded data.
///
/// Extension is a property of the consuming load, never of the producing
/// store: byte loads replicate bit 7 (or zero), halfword loads replicate
/// bit 15 (or zero), word loads pass through. Both the memory response path
/// and the store-to-load forward path go through this one function.
#[inline]
pub fn extend_load(raw: u32, width: MemWidth, signed: bool) -> u32 {
    match (width, signed) {
        (MemWidth::Byte, true) => raw as u8 as i8 as i32 as u32,
        (MemWidth::Byte, false) => u32::from(raw as u8),
        (MemWidth::Half, true) => raw as u16 as i16 as i32 as u32,
        (MemWidth::Half, false) => u32::from(raw as u16),
        _ => raw,
    }
}

/// Which queue wins the data port this cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Grant {
    Load,
    Store,
    Idle,
}

/// The load/store queueing system sharing one memory port.
#[derive(Debug, Clone)]
pub struct Lsq {
    /// Outstanding loads.
    pub loads: LoadQueue,
    /// Pending stores.
    pub stores: StoreQueue,
}

impl Lsq {
    /// Creates both queues from the configuration.
    pub fn new(config: &QueueConfig) -> Self {
        Self {
            loads: LoadQueue::new(config.load_entries),
            stores: StoreQueue::new(config.store_entries),
        }
    }

    /// Completes load responses that have arrived by `cycle`.
    ///
    /// Runs at the start of the cycle so a completing load is visible to this
    /// cycle's writeback arbitration.
    pub fn collect_load_responses(
        &mut self,
        cycle: u64,
        mem: &MainMemory,
    ) -> Result<(), AccessFault> {
        self.loads.collect_responses(cycle, mem)
    }

    /// End-of-cycle work: retire landed stores, then grant at most one new
    /// request to the port.
    ///
    /// Store retirement runs first so a load blocked behind a conflicting
    /// store can issue the moment the store's write is in memory.
    pub fn end_cycle(&mut self, cycle: u64, mem: &mut MainMemory) -> Result<(), AccessFault> {
        self.stores.retire_ready(cycle, mem)?;

        match self.choose_grant() {
            Grant::Load => {
                if let Some((id, addr)) = self.loads.oldest_pending().map(|e| (e.id, e.addr)) {
                    tracing::trace!(cycle, addr = format_args!("{addr:#x}"), "load issued");
                    self.loads.mark_issued(id, cycle + mem.read_latency);
                }
            }
            Grant::Store => {
                tracing::trace!(cycle, "store issued");
                self.stores.issue_head(cycle + mem.write_latency);
            }
            Grant::Idle => {}
        }
        Ok(())
    }

    /// Arbitration rule from the resource model: the fuller queue wins,
    /// loads take ties.
    fn choose_grant(&self) -> Grant {
        let load_ready = self
            .loads
            .oldest_pending()
            .is_some_and(|e| !self.stores.overlaps(e.addr, e.width.bytes()));
        let store_ready = self.stores.head_pending();

        match (load_ready, store_ready) {
            (true, true) => {
                let store_fill = self.stores.len() * self.loads.capacity();
                let load_fill = self.loads.len() * self.stores.capacity();
                if store_fill > load_fill {
                    Grant::Store
                } else {
                    Grant::Load
                }
            }
            (true, false) => Grant::Load,
            (false, true) => Grant::Store,
            (false, false) => Grant::Idle,
        }
    }

    /// Drops all queued operations.
    pub fn reset(&mut self) {
        self.loads.reset();
        self.stores.reset();
    }
}

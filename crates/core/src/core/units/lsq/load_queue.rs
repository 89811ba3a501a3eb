//! Load queue: outstanding loads between MEM and writeback.
//!
//! Tracks loads that could not be satisfied by store-to-load forwarding.
//! Entries issue memory read requests in FIFO order once granted by the
//! arbiter, apply the load's sign/zero extension when the response arrives,
//! and leave the queue when writeback consumes them. Completion may happen
//! out of program order with respect to stores.

use std::collections::VecDeque;

use crate::common::AccessFault;
use crate::core::pipeline::signals::MemWidth;
use crate::core::units::lsq::extend_load;
use crate::mem::MainMemory;

/// Lifecycle of a load queue entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum LoadStatus {
    /// Enqueued, request not yet granted.
    #[default]
    Pending,
    /// Request granted; the response arrives at `ready_at`.
    WaitingResponse {
        /// Cycle the memory response becomes visible.
        ready_at: u64,
    },
    /// Response received and extended; ready for writeback.
    Complete {
        /// Extended load result.
        value: u32,
    },
}

/// A single outstanding load.
#[derive(Clone, Copy, Debug)]
pub struct LoadQueueEntry {
    /// Queue-assigned identifier.
    pub id: u64,
    /// Byte address of the access.
    pub addr: u32,
    /// Destination register.
    pub dest: usize,
    /// Access width.
    pub width: MemWidth,
    /// Whether the result is sign-extended.
    pub signed: bool,
    /// Current lifecycle state.
    pub status: LoadStatus,
}

/// FIFO queue of outstanding loads.
#[derive(Debug, Clone)]
pub struct LoadQueue {
    entries: VecDeque<LoadQueueEntry>,
    capacity: usize,
    next_id: u64,
}

impl LoadQueue {
    /// Creates an empty queue with the given capacity.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
            next_id: 0,
        }
    }

    /// Returns the capacity.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the number of occupied entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no loads are outstanding.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns true if the queue cannot accept another load.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.entries.len() == self.capacity
    }

    /// Iterates entries oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &LoadQueueEntry> {
        self.entries.iter()
    }

    /// Enqueues a load. Returns the entry id, or `None` when full
    /// (backpressure: the producing stage must stall).
    pub fn enqueue(
        &mut self,
        addr: u32,
        dest: usize,
        width: MemWidth,
        signed: bool,
    ) -> Option<u64> {
        if self.is_full() {
            return None;
        }
        let id = self.next_id;
        self.next_id += 1;
        self.entries.push_back(LoadQueueEntry {
            id,
            addr,
            dest,
            width,
            signed,
            status: LoadStatus::Pending,
        });
        Some(id)
    }

    /// Oldest entry still waiting for a grant, if any.
    ///
    /// Issue order is FIFO: younger pending loads never bypass it.
    pub fn oldest_pending(&self) -> Option<&LoadQueueEntry> {
        self.entries
            .iter()
            .find(|e| e.status == LoadStatus::Pending)
    }

    /// Marks an entry as granted, with its response due at `ready_at`.
    pub fn mark_issued(&mut self, id: u64, ready_at: u64) {
        if let Some(e) = self.entries.iter_mut().find(|e| e.id == id) {
            e.status = LoadStatus::WaitingResponse { ready_at };
        }
    }

    /// Completes entries whose response has arrived by `cycle`.
    ///
    /// The data is sampled from memory now (after any earlier store has
    /// retired) and run through the load's own extension rule.
    pub fn collect_responses(
        &mut self,
        cycle: u64,
        mem: &MainMemory,
    ) -> Result<(), AccessFault> {
        for e in &mut self.entries {
            if let LoadStatus::WaitingResponse { ready_at } = e.status {
                if ready_at <= cycle {
                    let raw = match e.width {
                        MemWidth::Byte => u32::from(mem.read_u8(e.addr)?),
                        MemWidth::Half => u32::from(mem.read_u16(e.addr)?),
                        _ => mem.read_u32(e.addr)?,
                    };
                    e.status = LoadStatus::Complete {
                        value: extend_load(raw, e.width, e.signed),
                    };
                }
            }
        }
        Ok(())
    }

    /// Oldest complete entry, eligible for writeback this cycle.
    pub fn oldest_complete(&self) -> Option<(u64, usize, u32)> {
        self.entries.iter().find_map(|e| match e.status {
            LoadStatus::Complete { value } => Some((e.id, e.dest, value)),
            _ => None,
        })
    }

    /// Removes the entry consumed by writeback.
    pub fn dequeue(&mut self, id: u64) {
        if let Some(idx) = self.entries.iter().position(|e| e.id == id) {
            let _ = self.entries.remove(idx);
        }
    }

    /// Drops every entry.
    pub fn reset(&mut self) {
        self.entries.clear();
    }
}

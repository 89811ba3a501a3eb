//! Set-associative instruction cache.
//!
//! Sits between the fetch stage and instruction memory:
//! 1. **Hits** return the word combinationally in the same cycle.
//! 2. **Misses** start a refill sized to the cache line; the requesting stage
//!    stalls and replays the fetch as a hit once the line is installed.
//! 3. **Invalidation** clears every valid bit in one cycle. A refill already
//!    in flight is unaffected and still installs its line afterwards.
//!
//! Victim choice is round-robin per set, skipping a way whose tag already
//! matches the incoming line so a set never holds two lines with one tag.

use crate::common::AccessFault;
use crate::config::IcacheConfig;
use crate::mem::MainMemory;

/// One cache line.
#[derive(Debug, Clone, Default)]
struct CacheLine {
    tag: u32,
    words: Vec<u32>,
    valid: bool,
}

/// One set: its ways plus the round-robin replacement cursor.
#[derive(Debug, Clone)]
struct CacheSet {
    lines: Vec<CacheLine>,
    cursor: usize,
}

/// An in-flight line refill.
#[derive(Debug, Clone, Copy)]
struct Refill {
    line_addr: u32,
    remaining: u64,
}

/// Result of a fetch-port access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The word was served this cycle.
    Hit(u32),
    /// The line is absent; the fetch stage must stall.
    Miss {
        /// True when this miss started a refill (first miss for the line);
        /// false while a refill is already occupying the fill engine.
        refill_started: bool,
    },
}

/// A completed line install.
#[derive(Debug, Clone, Copy)]
pub struct InstallEvent {
    /// Whether a valid line was displaced.
    pub evicted: bool,
}

/// N-way set-associative instruction cache with a single fill engine.
#[derive(Debug, Clone)]
pub struct ICache {
    sets: Vec<CacheSet>,
    num_sets: usize,
    ways: usize,
    line_words: usize,
    refill_latency: u64,
    refill: Option<Refill>,
}

impl ICache {
    /// Creates an empty cache.
    ///
    /// `refill_latency` is the full miss-to-install delay in cycles,
    /// covering the memory round trip for one line.
    pub fn new(config: &IcacheConfig, refill_latency: u64) -> Self {
        let line = CacheLine {
            tag: 0,
            words: vec![0; config.line_words],
            valid: false,
        };
        let set = CacheSet {
            lines: vec![line; config.ways],
            cursor: 0,
        };
        Self {
            sets: vec![set; config.sets],
            num_sets: config.sets,
            ways: config.ways,
            line_words: config.line_words,
            refill_latency: refill_latency.max(1),
            refill: None,
        }
    }

    #[inline]
    fn line_bytes(&self) -> u32 {
        (self.line_words * 4) as u32
    }

    #[inline]
    fn set_index(&self, addr: u32) -> usize {
        ((addr / self.line_bytes()) as usize) % self.num_sets
    }

    #[inline]
    fn tag_of(&self, addr: u32) -> u32 {
        addr / (self.line_bytes() * self.num_sets as u32)
    }

    /// Fetch-port access for one instruction word.
    ///
    /// On a miss with the fill engine idle, the refill for the enclosing line
    /// begins; while the engine is busy the access keeps missing until the
    /// install completes and the fetch replays as a hit.
    pub fn fetch(&mut self, addr: u32) -> FetchOutcome {
        let set = self.set_index(addr);
        let tag = self.tag_of(addr);
        for line in &self.sets[set].lines {
            if line.valid && line.tag == tag {
                let word = line.words[((addr % self.line_bytes()) / 4) as usize];
                return FetchOutcome::Hit(word);
            }
        }

        if self.refill.is_none() {
            let line_addr = addr & !(self.line_bytes() - 1);
            self.refill = Some(Refill {
                line_addr,
                remaining: self.refill_latency,
            });
            tracing::trace!(addr = format_args!("{addr:#x}"), "icache refill started");
            FetchOutcome::Miss {
                refill_started: true,
            }
        } else {
            FetchOutcome::Miss {
                refill_started: false,
            }
        }
    }

    /// Advances the fill engine one cycle; installs the line when the
    /// countdown expires. Returns the install event, if one happened.
    pub fn tick(&mut self, mem: &MainMemory) -> Result<Option<InstallEvent>, AccessFault> {
        let Some(mut refill) = self.refill else {
            return Ok(None);
        };
        refill.remaining -= 1;
        if refill.remaining > 0 {
            self.refill = Some(refill);
            return Ok(None);
        }

        let mut words = vec![0u32; self.line_words];
        for (i, word) in words.iter_mut().enumerate() {
            *word = mem.read_u32(refill.line_addr + (i as u32) * 4)?;
        }

        let set_idx = self.set_index(refill.line_addr);
        let tag = self.tag_of(refill.line_addr);
        let set = &mut self.sets[set_idx];

        // Round-robin victim; never displace into a way already holding this
        // tag, so a set keeps at most one line per tag.
        let mut way = set.cursor;
        if set.lines[way].valid && set.lines[way].tag == tag {
            way = (way + 1) % self.ways;
        }
        let evicted = set.lines[way].valid;
        set.lines[way] = CacheLine {
            tag,
            words,
            valid: true,
        };
        set.cursor = (way + 1) % self.ways;
        self.refill = None;
        Ok(Some(InstallEvent { evicted }))
    }

    /// Clears every valid bit in one cycle.
    ///
    /// An in-flight refill is left alone: a refill started before the
    /// invalidation completes after it and still installs its line.
    pub fn invalidate(&mut self) {
        for set in &mut self.sets {
            for line in &mut set.lines {
                line.valid = false;
            }
        }
    }

    /// True while a refill is in flight.
    pub fn refilling(&self) -> bool {
        self.refill.is_some()
    }

    /// Returns to the post-reset state: empty, fill engine idle.
    pub fn reset(&mut self) {
        self.invalidate();
        self.refill = None;
        for set in &mut self.sets {
            set.cursor = 0;
        }
    }
}

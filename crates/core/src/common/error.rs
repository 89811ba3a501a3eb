//! Fault definitions for the memory model.
//!
//! The core does not resolve unmapped accesses internally; they surface from
//! `Cpu::tick` as an [`AccessFault`] for the embedder to handle.

use thiserror::Error;

/// A memory access the backing store cannot serve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AccessFault {
    /// The address falls outside the mapped memory range.
    ///
    /// Carries the faulting byte address.
    #[error("unmapped memory access at {addr:#010x}")]
    Unmapped {
        /// Faulting byte address.
        addr: u32,
    },
}

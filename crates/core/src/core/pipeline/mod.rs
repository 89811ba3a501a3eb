//! Pipeline structure: latches, hazard logic, control signals, and the five
//! stage implementations.
//!
//! Stages are pure-ish functions of the previous tick's latch state; the
//! owning [`crate::core::Cpu`] composes them in a fixed, acyclic order and
//! commits every latch once per cycle.

/// Data hazard detection and operand forwarding.
pub mod hazards;
/// Inter-stage latches and entry types.
pub mod latches;
/// Control signals and operation types.
pub mod signals;
/// Per-stage logic.
pub mod stages;

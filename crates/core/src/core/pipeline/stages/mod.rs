//! The five pipeline stage implementations.

/// Instruction decode and register read.
pub mod decode;
/// Branch resolution, ALU dispatch, and redirect generation.
pub mod execute;
/// Instruction fetch through the I-cache.
pub mod fetch;
/// Queue peel-off and store-to-load forward detection.
pub mod memory;
/// Writeback arbitration and retirement accounting.
pub mod writeback;

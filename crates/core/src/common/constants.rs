//! System-wide constants.

/// Width of one instruction in bytes. RV32 base encodings only; the
/// compressed extension is not modelled.
pub const INSTRUCTION_BYTES: u32 = 4;

/// Canonical no-op encoding (`ADDI x0, x0, 0`), used for latch bubbles.
pub const NOP_INSTRUCTION: u32 = 0x0000_0013;

/// Number of architectural general-purpose registers.
pub const NUM_REGISTERS: usize = 32;

/// ABI index of the syscall-number register (`a7`).
pub const REG_A7: usize = 17;

/// ABI index of the first syscall-argument register (`a0`).
pub const REG_A0: usize = 10;

/// Syscall number that terminates a bare-metal simulation.
pub const SYSCALL_EXIT: u32 = 93;

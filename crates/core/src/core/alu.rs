//! Arithmetic/logic unit and branch comparator.
//!
//! Pure combinational functions of two 32-bit operands; no pipeline state.
//! Division follows the RISC-V convention: divide-by-zero yields all-ones
//! (or the dividend for remainder), never a fault.

use crate::core::pipeline::signals::AluOp;
use crate::isa::funct3;

/// Computes one ALU operation.
pub fn alu(op: AluOp, a: u32, b: u32) -> u32 {
    let sh = b & 0x1f;
    match op {
        AluOp::Add => a.wrapping_add(b),
        AluOp::Sub => a.wrapping_sub(b),
        AluOp::Sll => a.wrapping_shl(sh),
        AluOp::Srl => a.wrapping_shr(sh),
        AluOp::Sra => ((a as i32) >> sh) as u32,
        AluOp::Or => a | b,
        AluOp::And => a & b,
        AluOp::Xor => a ^ b,
        AluOp::Slt => ((a as i32) < (b as i32)) as u32,
        AluOp::Sltu => (a < b) as u32,
        AluOp::Mul => a.wrapping_mul(b),
        AluOp::Mulh => ((i64::from(a as i32) * i64::from(b as i32)) >> 32) as u32,
        AluOp::Mulhsu => ((i64::from(a as i32) * i64::from(b)) >> 32) as u32,
        AluOp::Mulhu => ((u64::from(a) * u64::from(b)) >> 32) as u32,
        AluOp::Div => {
            if b == 0 {
                u32::MAX
            } else {
                (a as i32).wrapping_div(b as i32) as u32
            }
        }
        AluOp::Divu => {
            if b == 0 { u32::MAX } else { a / b }
        }
        AluOp::Rem => {
            if b == 0 {
                a
            } else {
                (a as i32).wrapping_rem(b as i32) as u32
            }
        }
        AluOp::Remu => {
            if b == 0 { a } else { a % b }
        }
    }
}

/// Resolves a conditional branch by its funct3 encoding.
pub fn branch_taken(f3: u32, a: u32, b: u32) -> bool {
    match f3 {
        funct3::BEQ => a == b,
        funct3::BNE => a != b,
        funct3::BLT => (a as i32) < (b as i32),
        funct3::BGE => (a as i32) >= (b as i32),
        funct3::BLTU => a < b,
        funct3::BGEU => a >= b,
        _ => false,
    }
}

//! Decode stage: control-signal derivation and register read.
//!
//! Translates the fetched word into an ID/EX entry using the combinational
//! decoder, reads both register ports, and records which source fields the
//! format actually uses. NOPs and undecodable words degrade to bubbles;
//! fault delivery for illegal encodings belongs to an external collaborator.

use crate::common::RegisterFile;
use crate::common::constants::NOP_INSTRUCTION;
use crate::core::pipeline::latches::{IdExEntry, IfIdEntry};
use crate::core::pipeline::signals::{AluOp, ControlSignals, MemWidth, OpASrc, OpBSrc};
use crate::isa::{decode, funct3, funct7, opcodes, system};

/// Runs the decode stage on one fetched instruction.
///
/// Returns `None` for NOPs and words with no known decoding; the ID/EX latch
/// receives a bubble in that case.
pub fn decode_stage(fetched: &IfIdEntry, regs: &RegisterFile) -> Option<IdExEntry> {
    let inst = fetched.inst;
    if inst == NOP_INSTRUCTION || inst == 0 {
        return None;
    }

    let d = decode::decode(inst);
    let ctrl = derive_control(&d)?;
    let (uses_rs1, uses_rs2) = {
        let (a, b) = decode::source_regs(inst);
        (a.is_some(), b.is_some())
    };

    Some(IdExEntry {
        pc: fetched.pc,
        inst,
        rs1: d.rs1,
        rs2: d.rs2,
        uses_rs1,
        uses_rs2,
        rd: d.rd,
        imm: d.imm,
        rv1: regs.read(d.rs1),
        rv2: regs.read(d.rs2),
        ctrl,
    })
}

fn derive_control(d: &decode::Decoded) -> Option<ControlSignals> {
    let mut c = ControlSignals::default();

    match d.opcode {
        opcodes::OP_LUI => {
            c.reg_write = true;
            c.a_src = OpASrc::Zero;
        }
        opcodes::OP_AUIPC => {
            c.reg_write = true;
            c.a_src = OpASrc::Pc;
        }
        opcodes::OP_JAL => {
            c.reg_write = true;
            c.jump = true;
        }
        opcodes::OP_JALR => {
            c.reg_write = true;
            c.jump = true;
            c.jalr = true;
        }
        opcodes::OP_BRANCH => {
            c.branch = true;
            c.b_src = OpBSrc::Reg2;
        }
        opcodes::OP_LOAD => {
            c.reg_write = true;
            c.mem_read = true;
            let (w, s) = match d.funct3 {
                funct3::LB => (MemWidth::Byte, true),
                funct3::LH => (MemWidth::Half, true),
                funct3::LW => (MemWidth::Word, true),
                funct3::LBU => (MemWidth::Byte, false),
                funct3::LHU => (MemWidth::Half, false),
                _ => return None,
            };
            c.width = w;
            c.signed_load = s;
        }
        opcodes::OP_STORE => {
            c.mem_write = true;
            c.width = match d.funct3 {
                funct3::SB => MemWidth::Byte,
                funct3::SH => MemWidth::Half,
                funct3::SW => MemWidth::Word,
                _ => return None,
            };
        }
        opcodes::OP_IMM => {
            c.reg_write = true;
            c.alu = match d.funct3 {
                funct3::ADD_SUB => AluOp::Add,
                funct3::SLT => AluOp::Slt,
                funct3::SLTU => AluOp::Sltu,
                funct3::XOR => AluOp::Xor,
                funct3::OR => AluOp::Or,
                funct3::AND => AluOp::And,
                funct3::SLL => AluOp::Sll,
                funct3::SRL_SRA => {
                    if d.funct7 & funct7::SRA != 0 {
                        AluOp::Sra
                    } else {
                        AluOp::Srl
                    }
                }
                _ => return None,
            };
        }
        opcodes::OP_REG => {
            c.reg_write = true;
            c.b_src = OpBSrc::Reg2;
            c.alu = match (d.funct3, d.funct7) {
                (funct3::ADD_SUB, funct7::DEFAULT) => AluOp::Add,
                (funct3::ADD_SUB, funct7::SUB) => AluOp::Sub,
                (funct3::SLL, funct7::DEFAULT) => AluOp::Sll,
                (funct3::SLT, funct7::DEFAULT) => AluOp::Slt,
                (funct3::SLTU, funct7::DEFAULT) => AluOp::Sltu,
                (funct3::XOR, funct7::DEFAULT) => AluOp::Xor,
                (funct3::SRL_SRA, funct7::DEFAULT) => AluOp::Srl,
                (funct3::SRL_SRA, funct7::SRA) => AluOp::Sra,
                (funct3::OR, funct7::DEFAULT) => AluOp::Or,
                (funct3::AND, funct7::DEFAULT) => AluOp::And,
                (funct3::ADD_SUB, funct7::M_EXTENSION) => AluOp::Mul,
                (funct3::SLL, funct7::M_EXTENSION) => AluOp::Mulh,
                (funct3::SLT, funct7::M_EXTENSION) => AluOp::Mulhsu,
                (funct3::SLTU, funct7::M_EXTENSION) => AluOp::Mulhu,
                (funct3::XOR, funct7::M_EXTENSION) => AluOp::Div,
                (funct3::SRL_SRA, funct7::M_EXTENSION) => AluOp::Divu,
                (funct3::OR, funct7::M_EXTENSION) => AluOp::Rem,
                (funct3::AND, funct7::M_EXTENSION) => AluOp::Remu,
                _ => return None,
            };
        }
        opcodes::OP_MISC_MEM => {
            if d.funct3 == funct3::FENCE_I {
                c.is_fence_i = true;
            }
            // Plain FENCE retires as a no-op: there is nothing to order in a
            // single-hart core with in-order retirement per queue.
        }
        opcodes::OP_SYSTEM => match d.raw {
            system::ECALL => c.is_ecall = true,
            system::EBREAK => {}
            system::MRET => c.is_mret = true,
            _ => return None,
        },
        _ => return None,
    }

    Some(c)
}

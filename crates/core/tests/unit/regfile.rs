//! Register-file axioms, checked both directly and through the pipeline.

use proptest::prelude::*;

use crate::common::{InstructionBuilder, TestContext};
use rv32sim_core::common::RegisterFile;

proptest! {
    /// Writing v to r != 0 makes subsequent reads return v until overwritten.
    #[test]
    fn write_read_round_trip(reg in 1usize..32, a: u32, b: u32) {
        let mut rf = RegisterFile::new();
        rf.write(reg, a);
        prop_assert_eq!(rf.read(reg), a);
        rf.write(reg, b);
        prop_assert_eq!(rf.read(reg), b);
    }

    /// Reads of register 0 always return 0 regardless of prior writes.
    #[test]
    fn x0_is_immutable(val: u32) {
        let mut rf = RegisterFile::new();
        rf.write(0, val);
        prop_assert_eq!(rf.read(0), 0);
    }
}

#[test]
fn pipeline_discards_writes_to_x0() {
    let program = [
        InstructionBuilder::new().addi(0, 0, 55).build(),
        InstructionBuilder::new().add(1, 0, 0).build(),
    ];
    let mut ctx = TestContext::new().load_program(0, &program);
    ctx.run(40);

    assert_eq!(ctx.get_reg(0), 0);
    assert_eq!(ctx.get_reg(1), 0, "x0 reads as zero even right after a write");
}

#[test]
fn loads_to_x0_are_discarded_without_stalling() {
    let program = [
        InstructionBuilder::new().addi(10, 0, 0x100).build(),
        InstructionBuilder::new().lw(0, 10, 0).build(),
        InstructionBuilder::new().add(1, 0, 0).build(),
    ];
    let mut ctx = TestContext::new().load_program(0, &program);
    ctx.write_word(0x100, 0xDEAD_BEEF);
    ctx.run(60);

    assert_eq!(ctx.get_reg(0), 0);
    assert_eq!(ctx.get_reg(1), 0);
    assert_eq!(
        ctx.stats().stalls_data,
        0,
        "a load to x0 produces nothing, so no load-use stall applies"
    );
}

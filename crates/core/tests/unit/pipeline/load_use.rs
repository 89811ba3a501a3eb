//! Load-use hazard timing tests.
//!
//! A dependent instruction directly behind a load must cost exactly one
//! stall cycle; independent instructions behind a load must cost none.

use crate::common::{InstructionBuilder, TestContext};

#[test]
fn load_use_pair_stalls_exactly_once() {
    let program = [
        InstructionBuilder::new().addi(10, 0, 0x100).build(),
        InstructionBuilder::new().lw(1, 10, 0).build(),
        InstructionBuilder::new().add(2, 1, 1).build(),
    ];
    let mut ctx = TestContext::new().load_program(0, &program);
    ctx.write_word(0x100, 5);
    ctx.run(60);

    assert_eq!(ctx.get_reg(1), 5);
    assert_eq!(ctx.get_reg(2), 10, "x2 = 2 * mem[x10]");
    assert_eq!(ctx.stats().stalls_data, 1, "exactly one inserted stall");
}

#[test]
fn independent_instruction_after_load_costs_nothing() {
    let program = [
        InstructionBuilder::new().addi(10, 0, 0x100).build(),
        InstructionBuilder::new().lw(1, 10, 0).build(),
        InstructionBuilder::new().addi(3, 0, 9).build(),
        InstructionBuilder::new().add(2, 1, 1).build(),
    ];
    let mut ctx = TestContext::new().load_program(0, &program);
    ctx.write_word(0x100, 5);
    ctx.run(60);

    assert_eq!(ctx.get_reg(2), 10);
    assert_eq!(ctx.get_reg(3), 9);
    assert_eq!(ctx.stats().stalls_data, 0, "gap of one closes the hazard");
}

#[test]
fn sustained_load_use_pairs_stall_once_each() {
    // 100 consecutive LW;ADD pairs accumulating into x2. Each pair must
    // insert exactly one stall and the final value must be uncorrupted.
    // x0-relative addressing keeps every pair inside one cache line, so no
    // refill ever separates a load from its consumer.
    const PAIRS: u32 = 100;
    let mut program = Vec::new();
    for _ in 0..PAIRS {
        program.push(InstructionBuilder::new().lw(1, 0, 0x100).build());
        program.push(InstructionBuilder::new().add(2, 2, 1).build());
    }
    let mut ctx = TestContext::new().load_program(0, &program);
    ctx.write_word(0x100, 5);
    ctx.run(4_000);

    assert_eq!(ctx.get_reg(2), 5 * PAIRS);
    assert_eq!(ctx.stats().stalls_data, u64::from(PAIRS));
    assert_eq!(
        ctx.stats().instructions_retired,
        u64::from(2 * PAIRS),
        "every instruction retires exactly once"
    );
}

#[test]
fn back_to_back_loads_with_joint_consumer() {
    // Two loads feeding one add: the second pairs with the consumer, the
    // first must still be visible through the register file.
    let program = [
        InstructionBuilder::new().addi(10, 0, 0x100).build(),
        InstructionBuilder::new().lw(7, 10, 4).build(),
        InstructionBuilder::new().lw(8, 10, 8).build(),
        InstructionBuilder::new().add(7, 7, 8).build(),
    ];
    let mut ctx = TestContext::new().load_program(0, &program);
    ctx.write_word(0x104, 2);
    ctx.write_word(0x108, 3);
    ctx.run(60);

    assert_eq!(ctx.get_reg(8), 3);
    assert_eq!(ctx.get_reg(7), 5);
}

//! Data forwarding tests.
//!
//! Back-to-back dependent ALU instructions must resolve entirely through the
//! forwarding paths: correct values, zero inserted bubbles.

use crate::common::{InstructionBuilder, TestContext};

#[test]
fn dependent_addi_chain_needs_no_bubbles() {
    let program = [
        InstructionBuilder::new().addi(1, 0, 10).build(),
        InstructionBuilder::new().addi(2, 1, 5).build(),
        InstructionBuilder::new().addi(3, 2, 5).build(),
    ];
    let mut ctx = TestContext::new().load_program(0, &program);
    ctx.run(40);

    assert_eq!(ctx.get_reg(1), 10);
    assert_eq!(ctx.get_reg(2), 15);
    assert_eq!(ctx.get_reg(3), 20);
    assert_eq!(ctx.stats().stalls_data, 0, "forwarding must close RAW gaps");
    assert_eq!(ctx.stats().stalls_control, 0);
}

#[test]
fn forwarding_reaches_two_instructions_back() {
    let program = [
        InstructionBuilder::new().addi(1, 0, 7).build(),
        InstructionBuilder::new().nop().build(),
        InstructionBuilder::new().add(2, 1, 1).build(),
    ];
    let mut ctx = TestContext::new().load_program(0, &program);
    ctx.run(40);

    assert_eq!(ctx.get_reg(2), 14);
    assert_eq!(ctx.stats().stalls_data, 0);
}

#[test]
fn store_data_is_forwarded() {
    let program = [
        InstructionBuilder::new().addi(10, 0, 0x100).build(),
        InstructionBuilder::new().addi(1, 0, 77).build(),
        InstructionBuilder::new().sw(10, 1, 0).build(),
    ];
    let mut ctx = TestContext::new().load_program(0, &program);
    ctx.run(40);

    assert_eq!(ctx.read_word(0x100), 77);
}

#[test]
fn jump_link_value_is_forwardable() {
    // JAL writes pc+4 into x1; the consumer must see it via forwarding.
    let program = [
        InstructionBuilder::new().jal(1, 8).build(), // 0x0: link=0x4, target 0x8
        InstructionBuilder::new().nop().build(),     // 0x4 (skipped)
        InstructionBuilder::new().addi(2, 1, 0).build(), // 0x8
    ];
    let mut ctx = TestContext::new().load_program(0, &program);
    ctx.run(40);

    assert_eq!(ctx.get_reg(1), 4);
    assert_eq!(ctx.get_reg(2), 4);
}

#[test]
fn chain_mixing_subtraction_and_logic() {
    let program = [
        InstructionBuilder::new().addi(1, 0, 100).build(),
        InstructionBuilder::new().addi(2, 1, -30).build(),
        InstructionBuilder::new().sub(3, 1, 2).build(),
        InstructionBuilder::new().or(4, 3, 2).build(),
    ];
    let mut ctx = TestContext::new().load_program(0, &program);
    ctx.run(40);

    assert_eq!(ctx.get_reg(2), 70);
    assert_eq!(ctx.get_reg(3), 30);
    assert_eq!(ctx.get_reg(4), 70 | 30);
    assert_eq!(ctx.stats().stalls_data, 0);
}

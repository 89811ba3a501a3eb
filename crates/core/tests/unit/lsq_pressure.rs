//! Queue backpressure tests.
//!
//! A full load or store queue refuses the enqueue; the memory stage and
//! everything upstream hold until space frees, and no operation is lost.

use crate::common::{InstructionBuilder, TestContext};
use rv32sim_core::config::Config;

#[test]
fn store_burst_through_single_entry_queue() {
    let mut config = Config::default();
    config.queues.store_entries = 1;

    let program = [
        InstructionBuilder::new().addi(10, 0, 0x100).build(),
        InstructionBuilder::new().addi(1, 0, 11).build(),
        InstructionBuilder::new().addi(2, 0, 22).build(),
        InstructionBuilder::new().addi(3, 0, 33).build(),
        InstructionBuilder::new().sw(10, 1, 0).build(),
        InstructionBuilder::new().sw(10, 2, 4).build(),
        InstructionBuilder::new().sw(10, 3, 8).build(),
    ];
    let mut ctx = TestContext::with_config(config).load_program(0, &program);
    ctx.run(120);

    assert_eq!(ctx.read_word(0x100), 11);
    assert_eq!(ctx.read_word(0x104), 22);
    assert_eq!(ctx.read_word(0x108), 33);
    assert!(
        ctx.stats().stalls_mem > 0,
        "backpressure must have held the pipeline"
    );
}

#[test]
fn load_burst_through_single_entry_queue() {
    let mut config = Config::default();
    config.queues.load_entries = 1;

    let program = [
        InstructionBuilder::new().addi(10, 0, 0x100).build(),
        InstructionBuilder::new().lw(1, 10, 0).build(),
        InstructionBuilder::new().lw(2, 10, 4).build(),
        InstructionBuilder::new().lw(3, 10, 8).build(),
    ];
    let mut ctx = TestContext::with_config(config).load_program(0, &program);
    ctx.write_word(0x100, 7);
    ctx.write_word(0x104, 8);
    ctx.write_word(0x108, 9);
    ctx.run(120);

    assert_eq!(ctx.get_reg(1), 7);
    assert_eq!(ctx.get_reg(2), 8);
    assert_eq!(ctx.get_reg(3), 9);
}

#[test]
fn mixed_traffic_retires_in_a_consistent_order() {
    // A store burst and a load from an earlier store's address: the load
    // must observe the store regardless of which queue wins the port.
    let program = [
        InstructionBuilder::new().addi(10, 0, 0x100).build(),
        InstructionBuilder::new().addi(1, 0, 5).build(),
        InstructionBuilder::new().sw(10, 1, 0).build(),
        InstructionBuilder::new().sw(10, 1, 4).build(),
        InstructionBuilder::new().lw(2, 10, 0).build(),
        InstructionBuilder::new().lw(3, 10, 4).build(),
    ];
    let mut ctx = TestContext::new().load_program(0, &program);
    ctx.run(120);

    assert_eq!(ctx.get_reg(2), 5);
    assert_eq!(ctx.get_reg(3), 5);
}

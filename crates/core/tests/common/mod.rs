pub mod builder;

pub use builder::InstructionBuilder;
pub use harness::TestContext;

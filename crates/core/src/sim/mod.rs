//! Simulation driver.
//!
//! Owns the [`Cpu`] and advances it tick by tick, surfacing the exit code
//! requested by the running program.

/// Program image loading (hex records and flat binaries).
pub mod loader;

use crate::common::AccessFault;
use crate::config::Config;
use crate::core::Cpu;

/// Top-level simulator: core state plus the run loop.
#[derive(Debug)]
pub struct Simulator {
    /// The simulated core.
    pub cpu: Cpu,
}

impl Simulator {
    /// Creates a simulator with a freshly reset core.
    pub fn new(config: &Config) -> Self {
        Self {
            cpu: Cpu::new(config),
        }
    }

    /// Advances the simulation by one clock cycle.
    pub fn tick(&mut self) -> Result<(), AccessFault> {
        self.cpu.tick()
    }

    /// Runs until the program requests exit or `max_cycles` elapse.
    ///
    /// Returns the exit code when the program terminated, `None` when the
    /// cycle budget ran out first.
    pub fn run(&mut self, max_cycles: u64) -> Result<Option<u32>, AccessFault> {
        for _ in 0..max_cycles {
            self.cpu.tick()?;
            if self.cpu.exit_code.is_some() {
                break;
            }
        }
        Ok(self.cpu.exit_code)
    }

    /// Retrieves the exit code if the simulation has finished.
    pub fn take_exit(&mut self) -> Option<u32> {
        self.cpu.exit_code.take()
    }
}

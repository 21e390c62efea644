use std::rc::Rc;

use crate::bus::{Bus, SharedBus};
use crate::cpu_6502::Cpu6502;
use crate::error::MachineError;

/// The assembled machine: a bus and the CPU that drives it. A front-end
/// loads a program, attaches its devices, resets, and then pumps the CPU.
pub struct Machine {
    pub bus: SharedBus,
    pub cpu: Cpu6502,
}

impl Machine {
    pub fn new(ram_size: usize) -> Result<Machine, MachineError> {
        let bus = Bus::new_shared(ram_size)?;
        Ok(Machine {
            cpu: Cpu6502::new(Rc::clone(&bus)),
            // Take ownership of the initial bus.
            bus,
        })
    }

    pub fn step(&mut self) -> Result<u32, MachineError> {
        self.cpu.step()
    }

    pub fn run<F>(&mut self, predicate: F) -> Result<u64, MachineError>
    where
        F: FnMut(&Cpu6502) -> bool,
    {
        self.cpu.run(predicate)
    }
}

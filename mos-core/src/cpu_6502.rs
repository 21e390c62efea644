use std::rc::Rc;

use crate::bus::SharedBus;
use crate::constants::{InterruptVectors, STACK_PAGE};
use crate::error::MachineError;
use crate::opcodes::{self, ExtraCycle, Mode};

pub mod opcodes_jump;
pub mod opcodes_logical;
pub mod opcodes_move;

#[cfg(test)]
mod test_helpers;


/// The status register the CPU wakes up with: interrupts disabled, plus the
/// hardwired always-on bit.
pub const RESET_STATUS_FLAG: u8 = 0b0010_0100;

#[rustfmt::skip]
pub enum StatusFlag {
    Carry            = 0b00000001,
    Zero             = 0b00000010,
    InterruptDisable = 0b00000100,
    Decimal          = 0b00001000,
    Break            = 0b00010000,
    Unused           = 0b00100000,
    Overflow         = 0b01000000,
    Negative         = 0b10000000,
}

/// A point in time copy of the register file, for hosts that want to
/// inspect the CPU between steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CpuState {
    pub a: u8,
    pub x: u8,
    pub y: u8,
    pub pc: u16,
    pub s: u8,
    pub p: u8,
}

/// This struct implements the MOS Technology 6502 central processing unit.
///
/// http://www.6502.org/
/// https://en.wikipedia.org/wiki/MOS_Technology_6502
pub struct Cpu6502 {
    // The bus is what holds all the memory access for the program.
    pub bus: SharedBus,
    // "A" register - The accumulator. Typical results of operations are stored here.
    // In combination with the status register, supports using the status register for
    // carrying, overflow detection, and so on.
    pub a: u8,
    /// "X" register.
    /// Used for several addressing modes. They can be used as loop counters easily,
    /// using INC/DEC and branch instructions. Not being the accumulator, they have
    /// limited addressing modes themselves when loading and saving.
    pub x: u8,
    /// "Y" register.
    pub y: u8,

    /// "PC" - Program counter.
    /// The 2-byte program counter PC supports 65536 direct (unbanked) memory
    /// locations. It moves through the internal fetch logic, interrupts, and the
    /// RTS/JMP/JSR/Branch instructions, and wraps at the top of the address space.
    pub pc: u16,

    /// "S" - Stack pointer
    ///
    /// The 6502 has hardware support for a stack implemented using a 256-byte array
    /// whose location is hardcoded at page 0x01 (0x0100-0x01FF), using the S register
    /// for a stack pointer.
    ///
    /// The 6502 uses a descending stack (it grows downwards).
    pub s: u8,

    /// "P" - Status register.
    /// P has 6 bits used by the ALU but is byte-wide. PHP, PLP, arithmetic, testing,
    /// and branch instructions can access this register.
    ///
    ///   7  bit  0
    /// ---- ----
    /// NVss DIZC
    /// |||| ||||
    /// |||| |||+- Carry
    /// |||| ||+-- Zero
    /// |||| |+--- Interrupt Disable
    /// |||| +---- Decimal
    /// ||++------ Break / the always-on bit
    /// |+-------- Overflow
    /// +--------- Negative
    pub p: u8,

    /// The opcode byte of the instruction currently being executed.
    pub(crate) opcode: u8,

    /// Set while an instruction executes when an effective address crossed a
    /// page boundary. Only meaningful for cycle accounting; cleared at the
    /// start of every step.
    pub(crate) page_crossed: bool,

    /// Set while an instruction executes when a branch was taken. Cleared at
    /// the start of every step.
    pub(crate) branch_taken: bool,

    /// Instructions executed since power on.
    pub tick_count: u64,

    /// Cycles accumulated since power on.
    pub cycle_count: u64,
}

impl Cpu6502 {
    /// Build a CPU against the bus and perform a reset. The reset vector
    /// should already be loaded when this is called; `reset` can be invoked
    /// again after late loads.
    pub fn new(bus: SharedBus) -> Cpu6502 {
        let mut cpu = Cpu6502 {
            bus,
            a: 0,
            x: 0,
            y: 0,
            pc: 0,
            s: 0,
            p: 0,
            opcode: 0,
            page_crossed: false,
            branch_taken: false,
            tick_count: 0,
            cycle_count: 0,
        };
        cpu.reset();
        cpu
    }

    /// Re-initialize the register file and load the program counter from the
    /// reset vector. No bus writes occur.
    pub fn reset(&mut self) {
        self.a = 0;
        self.x = 0;
        self.y = 0;
        self.s = 0xFD;
        self.set_p(StatusFlag::InterruptDisable as u8);
        self.pc = self
            .bus
            .borrow_mut()
            .read_u16(InterruptVectors::ResetVector as u16);
        self.page_crossed = false;
        self.branch_taken = false;
    }

    /// A snapshot of the register file.
    pub fn state(&self) -> CpuState {
        CpuState {
            a: self.a,
            x: self.x,
            y: self.y,
            pc: self.pc,
            s: self.s,
            p: self.p,
        }
    }

    /// The shared handle to the bus this CPU executes against.
    pub fn bus(&self) -> SharedBus {
        Rc::clone(&self.bus)
    }

    /// Point the CPU at a different bus. Registers are left as they are;
    /// call `reset` to start over against the new memory.
    pub fn set_bus(&mut self, bus: SharedBus) {
        self.bus = bus;
    }

    /// Increment the program counter and read the next u8 value following
    /// the current pc.
    fn next_u8(&mut self) -> u8 {
        let value = self.bus.borrow_mut().read_u8(self.pc);
        self.pc = self.pc.wrapping_add(1);
        value
    }

    /// Increment the program counter and read the next u16 value following
    /// the current pc.
    fn next_u16(&mut self) -> u16 {
        let value = self.bus.borrow_mut().read_u16(self.pc);
        self.pc = self.pc.wrapping_add(2);
        value
    }

    /// Execute exactly one instruction and return the cycles it took,
    /// including any page crossing or taken branch charge. The step is
    /// atomic from the host's point of view: nothing is observable between
    /// the fetch and the final cycle accounting.
    pub fn step(&mut self) -> Result<u32, MachineError> {
        self.page_crossed = false;
        self.branch_taken = false;

        self.opcode = self.next_u8();
        let index = self.opcode as usize;

        // The operations are all contained in tables that match up the opcode
        // to its particular implementation details.
        let operation_fn = opcodes::OPERATION_FN_TABLE[index];
        let mode = opcodes::ADDRESSING_MODE_TABLE[index];
        operation_fn(self, mode)?;

        let mut cycles = u32::from(opcodes::CYCLES_TABLE[index]);
        match opcodes::EXTRA_CYCLES_TABLE[index] {
            ExtraCycle::None => {}
            ExtraCycle::PageBoundary => {
                if self.page_crossed {
                    cycles += 1;
                }
            }
            ExtraCycle::IfTaken => {
                if self.branch_taken {
                    cycles += 1 + u32::from(self.page_crossed);
                }
            }
        }

        self.tick_count += 1;
        self.cycle_count += u64::from(cycles);
        Ok(cycles)
    }

    /// Run the CPU while the predicate holds, and return the cycles spent.
    /// The predicate is consulted before every instruction, never in the
    /// middle of one. Typical predicates: run until the program counter
    /// reaches an address, or run until a cycle budget is spent.
    pub fn run<F>(&mut self, mut predicate: F) -> Result<u64, MachineError>
    where
        F: FnMut(&Cpu6502) -> bool,
    {
        let mut cycles: u64 = 0;
        while predicate(self) {
            cycles += u64::from(self.step()?);
        }
        Ok(cycles)
    }

    /// The source for the comments on the modes is coming from:
    /// http://www.emulator101.com/6502-addressing-modes.html
    fn get_operand_address(&mut self, mode: Mode) -> Result<u16, MachineError> {
        match mode {
            // Absolute addressing specifies the memory location explicitly in the two
            // bytes following the opcode. So JMP $4032 will set the PC to $4032. The
            // hex for this is 4C 32 40, here 4C is the opcode. The 6502 is a little
            // endian machine, so any 16 bit (2 byte) value is stored with the LSB
            // first. All instructions that use absolute addressing are 3 bytes.
            Mode::Absolute => Ok(self.next_u16()),
            // Absolute indexing gets the target address by adding the contents of the
            // X or Y register to an absolute address.
            Mode::AbsoluteIndexedX => {
                let base_address = self.next_u16();
                let offset_address = base_address.wrapping_add(self.x as u16);
                self.record_page_crossing(base_address, offset_address);
                Ok(offset_address)
            }
            Mode::AbsoluteIndexedY => {
                let base_address = self.next_u16();
                let offset_address = base_address.wrapping_add(self.y as u16);
                self.record_page_crossing(base_address, offset_address);
                Ok(offset_address)
            }
            // These instructions have their data defined as the next byte after the
            // opcode. ORA #$B2 will perform a logical (also called bitwise) of the
            // value B2 with the accumulator.
            Mode::Immediate => {
                // Return the current program counter as the address, but also
                // increment the program counter.
                let address = self.pc;
                self.pc = self.pc.wrapping_add(1);
                Ok(address)
            }
            // The indirect addressing mode is similar to the absolute mode, but the
            // next u16 is actually a pointer to another address. Use this next
            // address for the operation. The pointer read does not carry into the
            // page byte; see `read_u16_page_wrap`.
            Mode::Indirect => {
                let address = self.next_u16();
                Ok(self.bus.borrow_mut().read_u16_page_wrap(address))
            }
            Mode::IndirectX => {
                let zero_page_address = self.next_u8().wrapping_add(self.x) as u16;
                Ok(self.bus.borrow_mut().read_u16_page_wrap(zero_page_address))
            }
            Mode::IndirectY => {
                let zero_page_address = self.next_u8() as u16;
                let base_address = self.bus.borrow_mut().read_u16_page_wrap(zero_page_address);
                let offset_address = base_address.wrapping_add(self.y as u16);
                self.record_page_crossing(base_address, offset_address);
                Ok(offset_address)
            }
            // Zero-Page is an addressing mode that is only capable of addressing the
            // first 256 bytes of the CPU's memory map. You can think of it as
            // absolute addressing for the first 256 bytes. The instruction takes one
            // less byte to specify and executes in fewer cycles, so most programs
            // keep their hottest variables there.
            Mode::ZeroPage => Ok(self.next_u8() as u16),
            // This works just like absolute indexed, but the target address is
            // limited to the first 0xFF bytes. The target address wraps and always
            // stays in the zero page: if the instruction is LDA $C0,X with X = $60,
            // the target is $20. $C0+$60 = $120, but the carry is discarded.
            Mode::ZeroPageX => Ok(self.next_u8().wrapping_add(self.x) as u16),
            Mode::ZeroPageY => Ok(self.next_u8().wrapping_add(self.y) as u16),
            // Branches fetch their own offset and the remaining modes have no
            // operand address. Reaching here means a dispatch table entry is wrong.
            Mode::Implied | Mode::RegisterA | Mode::Relative | Mode::None => {
                Err(MachineError::InvalidAddressingMode { mode })
            }
        }
    }

    fn get_operand(&mut self, mode: Mode) -> Result<(u16, u8), MachineError> {
        let address = self.get_operand_address(mode)?;
        let value = self.bus.borrow_mut().read_u8(address);
        Ok((address, value))
    }

    fn get_address_and_maybe_operand(
        &mut self,
        mode: Mode,
    ) -> Result<(Option<u16>, u8), MachineError> {
        if mode == Mode::RegisterA {
            return Ok((None, self.a));
        }
        let (address, value) = self.get_operand(mode)?;
        Ok((Some(address), value))
    }

    /// Shift and rotate results land either back in memory or in the
    /// accumulator, depending on the addressing mode.
    fn write_back(&mut self, address: Option<u16>, value: u8) {
        match address {
            Some(address) => self.bus.borrow_mut().set_u8(address, value),
            None => self.a = value,
        }
    }

    /// Record a page crossing for the cycle accounting at the end of the
    /// step. This is based purely on the effective address arithmetic; the
    /// extra cycle is charged even when the final read is from a device.
    fn record_page_crossing(&mut self, base_address: u16, offset_address: u16) {
        let [_, base_page] = base_address.to_le_bytes();
        let [_, offset_page] = offset_address.to_le_bytes();
        if base_page != offset_page {
            self.page_crossed = true;
        }
    }

    /// These flags are commonly set together.
    fn update_zero_and_negative_flag(&mut self, value: u8) {
        // Numbers can be interpreted as signed or unsigned. The negative flag only
        // cares if the most-significant bit is 1 or 0.
        let negative = 0b1000_0000;
        self.set_status_flag(StatusFlag::Zero, value == 0);
        self.set_status_flag(StatusFlag::Negative, value & negative == negative);
    }

    /// ADC and SBC operate on 9 bits. 8 of them are the register A, while the last
    /// bit is the carry flag. Store this 9th bit onto the status flag.
    fn update_carry_flag(&mut self, result: u16) {
        let carry = 0b1_0000_0000;
        self.set_status_flag(StatusFlag::Carry, result & carry == carry);
    }

    /// Overflow for ADC and SBC indicates if we overflow from bit 6 to bit 7 of the
    /// u8, and change the meaning of a number from being negative or positive.
    /// e.g. 0b0111_1111 + 0b0000_0001 = 0b1000_0000
    ///        |             |             |
    ///        positive      positive      negative result
    fn update_overflow_flag(&mut self, operand: u8, result: u8) {
        let bit_7_mask = 0b1000_0000;

        let does_overflow = (
            // Only look at bit 7, the most significant bit (MSB)
            bit_7_mask &
            // A and operand have the same MSB.
            !(self.a ^ operand) &
            // A and result have a different MSB
            (self.a ^ result)
        ) == bit_7_mask;

        self.set_status_flag(StatusFlag::Overflow, does_overflow);
    }

    /// Every write to the status register funnels through here so the
    /// always-on bit stays on no matter what was pulled or computed.
    fn set_p(&mut self, value: u8) {
        self.p = value | StatusFlag::Unused as u8;
    }

    fn set_status_flag(&mut self, status_flag: StatusFlag, value: bool) {
        if value {
            self.set_p(self.p | status_flag as u8);
        } else {
            self.set_p(self.p & !(status_flag as u8));
        }
    }

    fn get_carry(&self) -> u8 {
        self.p & (StatusFlag::Carry as u8)
    }

    fn is_status_flag_set(&self, status_flag: StatusFlag) -> bool {
        let flag = status_flag as u8;
        self.p & flag == flag
    }

    /// This function implements pushing to the stack.
    /// See the "S" register for more details.
    fn push_stack_u8(&mut self, value: u8) {
        // The stack page is hard coded.
        let address = u16::from_le_bytes([self.s, STACK_PAGE]);
        // The stack points to the next available memory.
        self.bus.borrow_mut().set_u8(address, value);
        // Grow down only after setting the memory.
        self.s = self.s.wrapping_sub(1);
    }

    /// This function implements pulling from the stack.
    /// See the "S" register for more details.
    fn pull_stack_u8(&mut self) -> u8 {
        // The current stack pointer points at available memory, increment it first.
        self.s = self.s.wrapping_add(1);
        // Now read out the memory that is being pulled.
        let address = u16::from_le_bytes([self.s, STACK_PAGE]);
        self.bus.borrow_mut().read_u8(address)
    }

    fn push_stack_u16(&mut self, value: u16) {
        let [low, high] = value.to_le_bytes();
        // Push the high byte first so the stack holds the word little endian.
        self.push_stack_u8(high);
        self.push_stack_u8(low);
    }

    fn pull_stack_u16(&mut self) -> u16 {
        let low = self.pull_stack_u8();
        let high = self.pull_stack_u8();
        u16::from_le_bytes([low, high])
    }
}

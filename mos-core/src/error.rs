use thiserror::Error;

use crate::opcodes::Mode;

/// Every failure the machine can surface. Errors are synchronous: the
/// operation that caused one returns it directly, nothing is caught or
/// retried, and no state is mutated beyond what each variant documents.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MachineError {
    /// The bus addresses between 1 and 65536 bytes of RAM.
    #[error("ram size {size} is out of range (1 to 65536 bytes)")]
    RamSizeOutOfRange { size: usize },

    /// A load would run past the end of the configured RAM. The RAM is left
    /// untouched.
    #[error("loading {len} bytes at {start:#06x} runs past the end of ram ({ram_size} bytes)")]
    LoadOutOfRange {
        start: u16,
        len: usize,
        ram_size: usize,
    },

    /// The fetched opcode is not part of the documented instruction set.
    /// The program counter has already moved past the opcode byte; no other
    /// register changed.
    #[error("illegal opcode {opcode:#04x} at {pc:#06x}")]
    IllegalOpcode { opcode: u8, pc: u16 },

    /// An executor was dispatched with an addressing mode it cannot use.
    /// This indicates a bug in the dispatch tables, not in the program
    /// being run.
    #[error("addressing mode {mode:?} cannot produce an operand address")]
    InvalidAddressingMode { mode: Mode },
}

// Clippy rules to disable.
#![allow(clippy::new_without_default)]

pub mod bus;
pub mod console;
pub mod constants;
pub mod cpu_6502;
pub mod device;
pub mod error;
pub mod machine;
pub mod opcodes;

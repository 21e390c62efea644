//! A terminal host for the 6502 machine core. It loads a raw machine code
//! image (for example a Microsoft 6502 BASIC build), wires the console
//! bridge to stdin/stdout, and pumps the CPU until something goes wrong.

use std::error::Error;
use std::fs;
use std::io::{self, BufRead};
use std::num::ParseIntError;
use std::path::PathBuf;
use std::process;
use std::thread;

use colored::Colorize;
use log::info;
use structopt::StructOpt;

use mos_core::console::{BridgeAddresses, ConsoleBridge};
use mos_core::constants::InterruptVectors;
use mos_core::cpu_6502::CpuState;
use mos_core::machine::Machine;

fn parse_hex(src: &str) -> Result<u16, ParseIntError> {
    let src = src.trim_start_matches("0x").trim_start_matches('$');
    u16::from_str_radix(src, 16)
}

#[derive(StructOpt)]
#[structopt(
    name = "basic-console",
    about = "Run a 6502 machine code image against a terminal console."
)]
struct Opt {
    /// Path to a raw machine code image, e.g. a 6502 BASIC build.
    rom: PathBuf,

    /// Address (hex) the image is loaded at.
    #[structopt(long, default_value = "8000", parse(try_from_str = parse_hex))]
    load_addr: u16,

    /// Override the reset vector (hex). Without this flag the image's own
    /// vector is used when it covers 0xFFFC, and the load address otherwise.
    #[structopt(long, parse(try_from_str = parse_hex))]
    reset: Option<u16>,

    /// Bytes of RAM to give the machine.
    #[structopt(long, default_value = "65536")]
    ram: usize,

    /// Address (hex) of the console output register.
    #[structopt(long, default_value = "f001", parse(try_from_str = parse_hex))]
    output_data: u16,

    /// Address (hex) of the console input status register.
    #[structopt(long, default_value = "f004", parse(try_from_str = parse_hex))]
    input_status: u16,

    /// Address (hex) of the console input data register.
    #[structopt(long, default_value = "f005", parse(try_from_str = parse_hex))]
    input_data: u16,
}

fn main() {
    env_logger::init();
    let opt = Opt::from_args();
    if let Err(error) = run(&opt) {
        eprintln!("{} {}", "error:".red().bold(), error);
        process::exit(1);
    }
}

fn run(opt: &Opt) -> Result<(), Box<dyn Error>> {
    let image = fs::read(&opt.rom)?;
    let mut machine = Machine::new(opt.ram)?;

    {
        let mut bus = machine.bus.borrow_mut();
        bus.load(opt.load_addr, &image)?;

        let image_end = opt.load_addr as usize + image.len();
        let covers_vector = (opt.load_addr as usize) <= InterruptVectors::ResetVector as usize
            && image_end >= InterruptVectors::ResetVector as usize + 2;
        if opt.reset.is_some() || !covers_vector {
            let reset = opt.reset.unwrap_or(opt.load_addr);
            bus.load(InterruptVectors::ResetVector as u16, &reset.to_le_bytes())?;
        }
    }

    let bridge = ConsoleBridge::new().with_addresses(BridgeAddresses {
        output_data: opt.output_data,
        input_status: opt.input_status,
        input_data: opt.input_data,
    });
    let input = bridge.input();
    machine.bus.borrow_mut().attach(Box::new(bridge));

    // Feed terminal lines into the bridge from a reader thread. Period
    // BASICs expect a carriage return terminator.
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            match line {
                Ok(line) => {
                    input.submit_input(&line);
                    input.submit_input("\r");
                }
                Err(_) => break,
            }
        }
    });

    machine.cpu.reset();
    info!(
        "loaded {} bytes at {:#06x}, reset to {:#06x}",
        image.len(),
        opt.load_addr,
        machine.cpu.pc
    );

    // The program is in charge from here; only a failure hands control back.
    if let Err(error) = machine.run(|_| true) {
        eprintln!();
        eprintln!("{} {}", "halted:".red().bold(), error);
        print_state(&machine.cpu.state());
        process::exit(1);
    }
    Ok(())
}

fn print_state(state: &CpuState) {
    eprintln!("{}", "register file".bold());
    eprintln!(
        "  a={:#04x} x={:#04x} y={:#04x}",
        state.a, state.x, state.y
    );
    eprintln!(
        "  pc={:#06x} s={:#04x} p={:#010b}",
        state.pc, state.s, state.p
    );
}

use crate::cpu_6502::*;

/// Branches fetch a signed offset byte themselves. An untaken branch only
/// moves the program counter past the offset; a taken branch records itself
/// (and any page crossing) for the cycle accounting at the end of the step.
fn branch(cpu: &mut Cpu6502, do_branch: bool) {
    let relative_offset = cpu.next_u8() as i8;
    if !do_branch {
        return;
    }
    // Adding the sign extended offset wraps just like the address bus does,
    // so a negative offset becomes a subtraction.
    let base_address = cpu.pc;
    let offset_address = base_address.wrapping_add(relative_offset as u16);
    cpu.branch_taken = true;
    cpu.record_page_crossing(base_address, offset_address);
    cpu.pc = offset_address;
}

/// Branch if plus
/// Function: branch on N=0
/// Flags:
pub fn bpl(cpu: &mut Cpu6502, _mode: Mode) -> Result<(), MachineError> {
    branch(cpu, !cpu.is_status_flag_set(StatusFlag::Negative));
    Ok(())
}

/// Branch if minus
/// Function: branch on N=1
/// Flags:
pub fn bmi(cpu: &mut Cpu6502, _mode: Mode) -> Result<(), MachineError> {
    branch(cpu, cpu.is_status_flag_set(StatusFlag::Negative));
    Ok(())
}

/// Branch if Overflow Clear
/// Function: branch on V=0
/// Flags:
pub fn bvc(cpu: &mut Cpu6502, _mode: Mode) -> Result<(), MachineError> {
    branch(cpu, !cpu.is_status_flag_set(StatusFlag::Overflow));
    Ok(())
}

/// Branch if Overflow Set
/// Function: branch on V=1
/// Flags:
pub fn bvs(cpu: &mut Cpu6502, _mode: Mode) -> Result<(), MachineError> {
    branch(cpu, cpu.is_status_flag_set(StatusFlag::Overflow));
    Ok(())
}

/// Branch if Carry Clear
/// Function: branch on C=0
/// Flags:
pub fn bcc(cpu: &mut Cpu6502, _mode: Mode) -> Result<(), MachineError> {
    branch(cpu, !cpu.is_status_flag_set(StatusFlag::Carry));
    Ok(())
}

/// Branch if Carry Set
/// Function: branch on C=1
/// Flags:
pub fn bcs(cpu: &mut Cpu6502, _mode: Mode) -> Result<(), MachineError> {
    branch(cpu, cpu.is_status_flag_set(StatusFlag::Carry));
    Ok(())
}

/// Branch if Not Equal
/// Function: branch on Z=0
/// Flags:
pub fn bne(cpu: &mut Cpu6502, _mode: Mode) -> Result<(), MachineError> {
    branch(cpu, !cpu.is_status_flag_set(StatusFlag::Zero));
    Ok(())
}

/// Branch if Equal
/// Function: branch on Z=1
/// Flags:
pub fn beq(cpu: &mut Cpu6502, _mode: Mode) -> Result<(), MachineError> {
    branch(cpu, cpu.is_status_flag_set(StatusFlag::Zero));
    Ok(())
}

/// Break - The software interrupt. The byte after BRK is padding: the pushed
/// return address points past it, and the pushed status has Break set.
/// Function: (S)-:=PC,P PC:=($FFFE)
/// Flags: B I
pub fn brk(cpu: &mut Cpu6502, _mode: Mode) -> Result<(), MachineError> {
    cpu.pc = cpu.pc.wrapping_add(1);
    cpu.push_stack_u16(cpu.pc);
    cpu.push_stack_u8(cpu.p | StatusFlag::Break as u8);
    cpu.set_status_flag(StatusFlag::InterruptDisable, true);
    cpu.pc = cpu
        .bus
        .borrow_mut()
        .read_u16(InterruptVectors::IrqBrkVector as u16);
    Ok(())
}

/// Return from Interrupt. Break never survives the pull, and the always-on
/// bit is forced.
/// Function: P,PC:=+(S)
/// Flags: N V D I Z C
pub fn rti(cpu: &mut Cpu6502, _mode: Mode) -> Result<(), MachineError> {
    let status = cpu.pull_stack_u8();
    cpu.set_p(status & !(StatusFlag::Break as u8));
    cpu.pc = cpu.pull_stack_u16();
    Ok(())
}

/// Jump to subroutine
/// Function: (S)-:=PC PC:={adr}
/// Flags:
pub fn jsr(cpu: &mut Cpu6502, mode: Mode) -> Result<(), MachineError> {
    let address = cpu.get_operand_address(mode)?;
    // The pushed return address is the last byte of this instruction; RTS
    // adds one back when it returns.
    let return_address = cpu.pc.wrapping_sub(1);
    cpu.push_stack_u16(return_address);
    cpu.pc = address;
    Ok(())
}

/// Return from Sub Routine
/// Function: PC:=+(S)+1
/// Flags:
pub fn rts(cpu: &mut Cpu6502, _mode: Mode) -> Result<(), MachineError> {
    cpu.pc = cpu.pull_stack_u16().wrapping_add(1);
    Ok(())
}

/// Jump
/// Function: PC:={adr}
/// Flags:
pub fn jmp(cpu: &mut Cpu6502, mode: Mode) -> Result<(), MachineError> {
    let address = cpu.get_operand_address(mode)?;
    cpu.pc = address;
    Ok(())
}

/// Bit test
/// Function: N:=b7 V:=b6 Z:=A&{adr}
/// Flags: N V Z
pub fn bit(cpu: &mut Cpu6502, mode: Mode) -> Result<(), MachineError> {
    let (_, operand) = cpu.get_operand(mode)?;
    let result = cpu.a & operand;
    cpu.set_status_flag(StatusFlag::Negative, operand & 0b1000_0000 != 0);
    cpu.set_status_flag(StatusFlag::Overflow, operand & 0b0100_0000 != 0);
    cpu.set_status_flag(StatusFlag::Zero, result == 0);
    Ok(())
}

/// Clear Carry flag
/// Function: C:=0
/// Flags: C
pub fn clc(cpu: &mut Cpu6502, _mode: Mode) -> Result<(), MachineError> {
    cpu.set_status_flag(StatusFlag::Carry, false);
    Ok(())
}

/// Set Carry flag
/// Function: C:=1
/// Flags: C
pub fn sec(cpu: &mut Cpu6502, _mode: Mode) -> Result<(), MachineError> {
    cpu.set_status_flag(StatusFlag::Carry, true);
    Ok(())
}

/// Clear Decimal flag
/// Function: D:=0
/// Flags: D
pub fn cld(cpu: &mut Cpu6502, _mode: Mode) -> Result<(), MachineError> {
    cpu.set_status_flag(StatusFlag::Decimal, false);
    Ok(())
}

/// Set Decimal flag
/// Function: D:=1
/// Flags: D
pub fn sed(cpu: &mut Cpu6502, _mode: Mode) -> Result<(), MachineError> {
    cpu.set_status_flag(StatusFlag::Decimal, true);
    Ok(())
}

/// Clear Interrupt disable
/// Function: I:=0
/// Flags: I
pub fn cli(cpu: &mut Cpu6502, _mode: Mode) -> Result<(), MachineError> {
    cpu.set_status_flag(StatusFlag::InterruptDisable, false);
    Ok(())
}

/// Set Interrupt disable
/// Function: I:=1
/// Flags: I
pub fn sei(cpu: &mut Cpu6502, _mode: Mode) -> Result<(), MachineError> {
    cpu.set_status_flag(StatusFlag::InterruptDisable, true);
    Ok(())
}

/// Clear overflow flag
/// Function: V:=0
/// Flags: V
pub fn clv(cpu: &mut Cpu6502, _mode: Mode) -> Result<(), MachineError> {
    cpu.set_status_flag(StatusFlag::Overflow, false);
    Ok(())
}

/// No operation
/// Function:
/// Flags:
pub fn nop(_cpu: &mut Cpu6502, _mode: Mode) -> Result<(), MachineError> {
    Ok(())
}

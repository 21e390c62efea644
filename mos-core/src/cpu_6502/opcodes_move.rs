use crate::cpu_6502::*;

/// Load the value into register A
/// Function: A:={adr}
/// Flags: N Z
pub fn lda(cpu: &mut Cpu6502, mode: Mode) -> Result<(), MachineError> {
    let (_address, operand) = cpu.get_operand(mode)?;
    cpu.a = operand;
    cpu.update_zero_and_negative_flag(cpu.a);
    Ok(())
}

/// Store register A at address
/// Function: {adr}:=A
/// Flags:
pub fn sta(cpu: &mut Cpu6502, mode: Mode) -> Result<(), MachineError> {
    // Stores only compute the effective address; reading first would be
    // visible to a device sitting at the target.
    let address = cpu.get_operand_address(mode)?;
    cpu.bus.borrow_mut().set_u8(address, cpu.a);
    Ok(())
}

/// Load register X with the value
/// Function: X:={adr}
/// Flags: N Z
pub fn ldx(cpu: &mut Cpu6502, mode: Mode) -> Result<(), MachineError> {
    let (_address, operand) = cpu.get_operand(mode)?;
    cpu.x = operand;
    cpu.update_zero_and_negative_flag(cpu.x);
    Ok(())
}

/// Store register X at address
/// Function: {adr}:=X
/// Flags:
pub fn stx(cpu: &mut Cpu6502, mode: Mode) -> Result<(), MachineError> {
    let address = cpu.get_operand_address(mode)?;
    cpu.bus.borrow_mut().set_u8(address, cpu.x);
    Ok(())
}

/// Load register Y with the value
/// Function: Y:={adr}
/// Flags: N Z
pub fn ldy(cpu: &mut Cpu6502, mode: Mode) -> Result<(), MachineError> {
    let (_address, operand) = cpu.get_operand(mode)?;
    cpu.y = operand;
    cpu.update_zero_and_negative_flag(cpu.y);
    Ok(())
}

/// Store register Y at address
/// Function: {adr}:=Y
/// Flags:
pub fn sty(cpu: &mut Cpu6502, mode: Mode) -> Result<(), MachineError> {
    let address = cpu.get_operand_address(mode)?;
    cpu.bus.borrow_mut().set_u8(address, cpu.y);
    Ok(())
}

/// Transfer A to X
/// Function: X:=A
/// Flags: N Z
pub fn tax(cpu: &mut Cpu6502, _mode: Mode) -> Result<(), MachineError> {
    cpu.x = cpu.a;
    cpu.update_zero_and_negative_flag(cpu.x);
    Ok(())
}

/// Transfer X to A
/// Function: A:=X
/// Flags: N Z
pub fn txa(cpu: &mut Cpu6502, _mode: Mode) -> Result<(), MachineError> {
    cpu.a = cpu.x;
    cpu.update_zero_and_negative_flag(cpu.a);
    Ok(())
}

/// Transfer A to Y
/// Function: Y:=A
/// Flags: N Z
pub fn tay(cpu: &mut Cpu6502, _mode: Mode) -> Result<(), MachineError> {
    cpu.y = cpu.a;
    cpu.update_zero_and_negative_flag(cpu.y);
    Ok(())
}

/// Transfer Y to A
/// Function: A:=Y
/// Flags: N Z
pub fn tya(cpu: &mut Cpu6502, _mode: Mode) -> Result<(), MachineError> {
    cpu.a = cpu.y;
    cpu.update_zero_and_negative_flag(cpu.a);
    Ok(())
}

/// Transfer S to X
/// Function: X:=S
/// Flags: N Z
pub fn tsx(cpu: &mut Cpu6502, _mode: Mode) -> Result<(), MachineError> {
    cpu.x = cpu.s;
    cpu.update_zero_and_negative_flag(cpu.x);
    Ok(())
}

/// Transfer X to S. The only transfer that leaves the flags alone.
/// Function: S:=X
/// Flags:
pub fn txs(cpu: &mut Cpu6502, _mode: Mode) -> Result<(), MachineError> {
    cpu.s = cpu.x;
    Ok(())
}

/// Pull A
/// Function: A:=+(S)
/// Flags: N Z
pub fn pla(cpu: &mut Cpu6502, _mode: Mode) -> Result<(), MachineError> {
    cpu.a = cpu.pull_stack_u8();
    cpu.update_zero_and_negative_flag(cpu.a);
    Ok(())
}

/// Push A to the stack
/// Function: (S)-:=A
/// Flags:
pub fn pha(cpu: &mut Cpu6502, _mode: Mode) -> Result<(), MachineError> {
    cpu.push_stack_u8(cpu.a);
    Ok(())
}

/// Pull the status register from the stack. Break is cleared and the
/// always-on bit is forced, the same as RTI.
/// Function: P:=+(S)
/// Flags: N V D I Z C
pub fn plp(cpu: &mut Cpu6502, _mode: Mode) -> Result<(), MachineError> {
    let status = cpu.pull_stack_u8();
    cpu.set_p(status & !(StatusFlag::Break as u8));
    Ok(())
}

/// Push the status register to the stack, with Break set in the pushed
/// copy. The live register is unchanged.
/// Function: (S)-:=P
/// Flags:
pub fn php(cpu: &mut Cpu6502, _mode: Mode) -> Result<(), MachineError> {
    cpu.push_stack_u8(cpu.p | StatusFlag::Break as u8);
    Ok(())
}

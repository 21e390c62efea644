use crate::cpu_6502::*;

/// Apply the logical "or" operator on the accumulator.
/// Function: A:=A or {adr}
/// Flags: N Z
pub fn ora(cpu: &mut Cpu6502, mode: Mode) -> Result<(), MachineError> {
    let (_, operand) = cpu.get_operand(mode)?;
    cpu.a |= operand;
    cpu.update_zero_and_negative_flag(cpu.a);
    Ok(())
}

/// Apply the logical "and" operator on the accumulator.
/// Function: A:=A&{adr}
/// Flags: N Z
pub fn and(cpu: &mut Cpu6502, mode: Mode) -> Result<(), MachineError> {
    let (_, operand) = cpu.get_operand(mode)?;
    cpu.a &= operand;
    cpu.update_zero_and_negative_flag(cpu.a);
    Ok(())
}

/// Logical Exclusive OR
/// Function: A:=A exor {adr}
/// Flags: N Z
pub fn eor(cpu: &mut Cpu6502, mode: Mode) -> Result<(), MachineError> {
    let (_, operand) = cpu.get_operand(mode)?;
    cpu.a ^= operand;
    cpu.update_zero_and_negative_flag(cpu.a);
    Ok(())
}

fn add_impl(cpu: &mut Cpu6502, operand: u8) {
    // Translating to u16 means that the values won't wrap, so wrapping
    // add is not needed.
    let result_u16 =
        // Get the carry from the previous operation, and carry it over
        // into this one, but operate in the u16 space as to not overflow.
        cpu.get_carry() as u16 + // Either 0x00 or 0x01
        cpu.a as u16 +
        operand as u16;

    let result_u8 = result_u16 as u8;

    cpu.update_zero_and_negative_flag(result_u8);
    // Take the 0x100 value here, and set it to the register. This can then carry
    // over into the next byte of a number.
    cpu.update_carry_flag(result_u16);
    cpu.update_overflow_flag(operand, result_u8);
    cpu.a = result_u8;
}

/// Each nibble holds one decimal digit 0-9.
fn bcd_to_decimal(value: u8) -> u16 {
    u16::from(value >> 4) * 10 + u16::from(value & 0x0F)
}

fn decimal_to_bcd(value: u16) -> u8 {
    (((value / 10) << 4) | (value % 10)) as u8
}

/// Decimal mode addition. Both the accumulator and the operand are read as
/// two packed decimal digits. Overflow still comes from the binary sum; the
/// hardware leaves it undefined in this mode.
fn add_decimal_impl(cpu: &mut Cpu6502, operand: u8) {
    let carry = cpu.get_carry() as u16;

    let binary_result = (cpu.a as u16 + operand as u16 + carry) as u8;
    cpu.update_overflow_flag(operand, binary_result);

    let decimal_sum = bcd_to_decimal(cpu.a) + bcd_to_decimal(operand) + carry;
    cpu.set_status_flag(StatusFlag::Carry, decimal_sum > 99);
    cpu.a = decimal_to_bcd(decimal_sum % 100);
    cpu.update_zero_and_negative_flag(cpu.a);
}

/// Decimal mode subtraction, with the carry acting as the usual inverted
/// borrow. A borrow wraps the difference back into 0-99.
fn sub_decimal_impl(cpu: &mut Cpu6502, operand: u8) {
    let carry = cpu.get_carry() as i16;

    let binary_result = (cpu.a as u16 + (!operand) as u16 + carry as u16) as u8;
    cpu.update_overflow_flag(!operand, binary_result);

    let decimal_diff =
        bcd_to_decimal(cpu.a) as i16 - bcd_to_decimal(operand) as i16 - (1 - carry);
    let borrowed = decimal_diff < 0;
    let decimal_diff = if borrowed {
        decimal_diff + 100
    } else {
        decimal_diff
    };
    cpu.set_status_flag(StatusFlag::Carry, !borrowed);
    cpu.a = decimal_to_bcd(decimal_diff as u16);
    cpu.update_zero_and_negative_flag(cpu.a);
}

/// Add with Carry
/// Function: A:=A+{adr}+C
/// Flags: N V Z C
pub fn adc(cpu: &mut Cpu6502, mode: Mode) -> Result<(), MachineError> {
    let (_, operand) = cpu.get_operand(mode)?;
    if cpu.is_status_flag_set(StatusFlag::Decimal) {
        add_decimal_impl(cpu, operand);
    } else {
        add_impl(cpu, operand);
    }
    Ok(())
}

/// Subtract with Carry
/// Function: A:=A-{adr}+C-1
/// Flags: N V Z C
pub fn sbc(cpu: &mut Cpu6502, mode: Mode) -> Result<(), MachineError> {
    let (_, operand) = cpu.get_operand(mode)?;
    if cpu.is_status_flag_set(StatusFlag::Decimal) {
        sub_decimal_impl(cpu, operand);
    } else {
        // In order to properly subtract we need the two's complement of the
        // operand. Normally this would be accomplished by:
        // `let twos_complement = !operand + 0x1;`
        //
        // However, in this CPU, this is done by inverting the operand here, and
        // letting the carry flag be the + 1.
        //
        // Because of this, it's assumed the assembly will run SEC before sbc.
        add_impl(cpu, !operand);
    }
    Ok(())
}

/// Compare A with source
/// http://6502.org/tutorials/compare_instructions.html
/// Function: A-{adr}
/// Flags: N Z C
pub fn cmp(cpu: &mut Cpu6502, mode: Mode) -> Result<(), MachineError> {
    let (_, operand) = cpu.get_operand(mode)?;
    cpu.update_zero_and_negative_flag(cpu.a.wrapping_sub(operand));
    cpu.set_status_flag(StatusFlag::Carry, cpu.a >= operand);
    Ok(())
}

/// Compare X with source
/// Function: X-{adr}
/// Flags: N Z C
pub fn cpx(cpu: &mut Cpu6502, mode: Mode) -> Result<(), MachineError> {
    let (_, operand) = cpu.get_operand(mode)?;
    cpu.update_zero_and_negative_flag(cpu.x.wrapping_sub(operand));
    cpu.set_status_flag(StatusFlag::Carry, cpu.x >= operand);
    Ok(())
}

/// Compare Y with source
/// Function: Y-{adr}
/// Flags: N Z C
pub fn cpy(cpu: &mut Cpu6502, mode: Mode) -> Result<(), MachineError> {
    let (_, operand) = cpu.get_operand(mode)?;
    cpu.update_zero_and_negative_flag(cpu.y.wrapping_sub(operand));
    cpu.set_status_flag(StatusFlag::Carry, cpu.y >= operand);
    Ok(())
}

/// Decrement at an address
/// Function: {adr}:={adr}-1
/// Flags: N Z
pub fn dec(cpu: &mut Cpu6502, mode: Mode) -> Result<(), MachineError> {
    let (address, operand) = cpu.get_operand(mode)?;
    let result = operand.wrapping_sub(1);
    cpu.update_zero_and_negative_flag(result);
    cpu.bus.borrow_mut().set_u8(address, result);
    Ok(())
}

/// Decrement X
/// Function: X:=X-1
/// Flags: N Z
pub fn dex(cpu: &mut Cpu6502, _mode: Mode) -> Result<(), MachineError> {
    cpu.x = cpu.x.wrapping_sub(1);
    cpu.update_zero_and_negative_flag(cpu.x);
    Ok(())
}

/// Decrement Y
/// Function: Y:=Y-1
/// Flags: N Z
pub fn dey(cpu: &mut Cpu6502, _mode: Mode) -> Result<(), MachineError> {
    cpu.y = cpu.y.wrapping_sub(1);
    cpu.update_zero_and_negative_flag(cpu.y);
    Ok(())
}

/// Increment at an address
/// Function: {adr}:={adr}+1
/// Flags: N Z
pub fn inc(cpu: &mut Cpu6502, mode: Mode) -> Result<(), MachineError> {
    let (address, operand) = cpu.get_operand(mode)?;
    let result = operand.wrapping_add(1);
    cpu.update_zero_and_negative_flag(result);
    cpu.bus.borrow_mut().set_u8(address, result);
    Ok(())
}

/// Increment X
/// Function: X:=X+1
/// Flags: N Z
pub fn inx(cpu: &mut Cpu6502, _mode: Mode) -> Result<(), MachineError> {
    cpu.x = cpu.x.wrapping_add(1);
    cpu.update_zero_and_negative_flag(cpu.x);
    Ok(())
}

/// Increment Y
/// Function: Y:=Y+1
/// Flags: N Z
pub fn iny(cpu: &mut Cpu6502, _mode: Mode) -> Result<(), MachineError> {
    cpu.y = cpu.y.wrapping_add(1);
    cpu.update_zero_and_negative_flag(cpu.y);
    Ok(())
}

/// Arithmetic shift left
/// Function: {adr}:={adr}*2
/// Flags: N Z C
pub fn asl(cpu: &mut Cpu6502, mode: Mode) -> Result<(), MachineError> {
    let (address, operand) = cpu.get_address_and_maybe_operand(mode)?;
    let result = operand << 1;
    cpu.update_zero_and_negative_flag(result);
    // The Carry flag contains the bit that was shifted out:
    cpu.set_status_flag(StatusFlag::Carry, operand & 0b1000_0000 != 0);
    cpu.write_back(address, result);
    Ok(())
}

/// Rotate left
/// Function: {adr}:={adr}*2+C
/// Flags: N Z C
pub fn rol(cpu: &mut Cpu6502, mode: Mode) -> Result<(), MachineError> {
    let (address, operand) = cpu.get_address_and_maybe_operand(mode)?;
    let result = (operand << 1) | cpu.get_carry();
    cpu.update_zero_and_negative_flag(result);
    // The Carry flag contains the bit that was shifted out:
    cpu.set_status_flag(StatusFlag::Carry, operand & 0b1000_0000 != 0);
    cpu.write_back(address, result);
    Ok(())
}

/// Logical shift right
/// Function: {adr}:={adr}/2
/// Flags: N Z C
pub fn lsr(cpu: &mut Cpu6502, mode: Mode) -> Result<(), MachineError> {
    let (address, operand) = cpu.get_address_and_maybe_operand(mode)?;
    let result = operand >> 1;
    cpu.update_zero_and_negative_flag(result);
    // The Carry flag contains the bit that was shifted out:
    cpu.set_status_flag(StatusFlag::Carry, operand & 0b0000_0001 != 0);
    cpu.write_back(address, result);
    Ok(())
}

/// Rotate right
/// Function: {adr}:={adr}/2+C*128
/// Flags: N Z C
pub fn ror(cpu: &mut Cpu6502, mode: Mode) -> Result<(), MachineError> {
    let (address, operand) = cpu.get_address_and_maybe_operand(mode)?;

    let result =
        // Shift the operand, {adr}/2
        (operand >> 1) |
        // Move the carry bit to the top, C*128
        (cpu.get_carry() << 7);

    cpu.update_zero_and_negative_flag(result);
    // The Carry flag contains the bit that was shifted out:
    cpu.set_status_flag(StatusFlag::Carry, operand & 0b0000_0001 != 0);
    cpu.write_back(address, result);
    Ok(())
}

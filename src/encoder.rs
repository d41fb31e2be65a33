//! This module provides the tape encoding used by the multiplication program:
//! two binary numerals terminated by `#` and `$`, and a binary product as output.

use crate::machine::TuringMachine;
use crate::types::TuringMachineError;

/// Terminates the first operand.
pub const OPERAND_SEPARATOR: char = '#';
/// Terminates the second operand.
pub const INPUT_TERMINATOR: char = '$';

/// Encodes an operand pair for the sampling driver: `1<a>#1<b>$`.
///
/// Each operand is written in binary behind a leading `1`, so the numeral on the tape
/// has the value `2^bits(a) + a`.
///
/// ```
/// assert_eq!(tally::encoder::encode_operands(5, 2), "1101#110$");
/// ```
pub fn encode_operands(a: u64, b: u64) -> String {
    format!("1{a:b}{OPERAND_SEPARATOR}1{b:b}{INPUT_TERMINATOR}")
}

/// Writes two numbers as plain binary numerals: `<a>#<b>$`.
pub fn encode_numerals(a: u64, b: u64) -> String {
    format!("{a:b}{OPERAND_SEPARATOR}{b:b}{INPUT_TERMINATOR}")
}

/// Reads back the two numerals of an input tape, as the multiplication program sees them.
pub fn decode_numerals(tape: &str) -> Result<(u128, u128), TuringMachineError> {
    let body = tape
        .strip_suffix(INPUT_TERMINATOR)
        .ok_or_else(|| invalid(tape, "missing terminator"))?;
    let (a, b) = body
        .split_once(OPERAND_SEPARATOR)
        .ok_or_else(|| invalid(tape, "missing separator"))?;

    Ok((parse_binary(a, tape)?, parse_binary(b, tape)?))
}

/// Decodes the trimmed output tape of the multiplication program.
pub fn decode_product(tape: &str) -> Result<u128, TuringMachineError> {
    parse_binary(tape, tape)
}

/// Multiplies `a` and `b` on `machine`, returning the product and the number of steps.
pub fn multiply(
    machine: &mut TuringMachine,
    a: u64,
    b: u64,
) -> Result<(u128, usize), TuringMachineError> {
    let steps = machine.run(&encode_numerals(a, b))?;
    let product = decode_product(&machine.tape_content())?;
    Ok((product, steps))
}

fn parse_binary(numeral: &str, tape: &str) -> Result<u128, TuringMachineError> {
    if numeral.is_empty() {
        return Err(invalid(tape, "empty numeral"));
    }
    u128::from_str_radix(numeral, 2).map_err(|e| invalid(tape, &e.to_string()))
}

fn invalid(tape: &str, reason: &str) -> TuringMachineError {
    TuringMachineError::InvalidTape(format!("'{tape}': {reason}"))
}

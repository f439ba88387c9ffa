//! Decoder tests
//!
//! Test suite for the eZ80/Z80 decoder, organized into:
//! - instructions.rs: decoding of individual instructions and families
//! - modes.rs: ADL/classic gating, prefix precedence, range properties
//!
//! # References
//! - eZ80 CPU User Manual (Zilog UM0077)
//! - Z80 opcode-matrix decomposition (http://www.z80.info/decoding.htm)

use super::*;

mod modes;

// ========== Test Helpers ==========

/// Decode a whole buffer with no base address and no label prefixes.
fn decode_bytes(bytes: &[u8], adl: bool, classic: bool) -> Vec<Instruction> {
    decode_all(bytes, 0, false, adl, classic, "", "")
}

/// Text of the first instruction in the buffer, eZ80 ADL mode.
fn adl_text(bytes: &[u8]) -> String {
    first(bytes, true, false).text()
}

/// Text of the first instruction in the buffer, classic Z80 mode.
fn classic_text(bytes: &[u8]) -> String {
    first(bytes, false, true).text()
}

/// First decoded instruction of the buffer.
fn first(bytes: &[u8], adl: bool, classic: bool) -> Instruction {
    let instrs = decode_bytes(bytes, adl, classic);
    assert!(!instrs.is_empty(), "nothing decoded from {:02X?}", bytes);
    instrs.into_iter().next().unwrap()
}

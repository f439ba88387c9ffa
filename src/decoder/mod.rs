//! eZ80/Z80 instruction decoder
//!
//! Table-driven disassembly of the eZ80 opcode space, including the Z80
//! compatibility subset. One `Decoder` owns one pass over a byte range and
//! produces one `Instruction` record per decoded instruction.
//!
//! # Module Organization
//!
//! - `tables`: operand-name lookup tables indexed by opcode fields
//! - `helpers`: bit-field accessors and hex formatting
//! - `decode`: the dispatcher (decode_x0, decode_x3, decode_cb, decode_ed,
//!   decode_index) and the prefix state machine
//!
//! # Prefix handling
//!
//! CB, ED and DD/FD redirect decoding to their own tables. The eZ80
//! addressing-mode overrides (0x40/0x49/0x52/0x5B in the x=1 quadrant) fix
//! the immediate width for the single following instruction and re-enter the
//! dispatcher. When a prefix is nullified by a later prefix ("last prefix
//! wins") the record becomes NONI and the cursor backs up one byte so the
//! governing byte is decoded as the start of a fresh instruction; every such
//! backtrack still consumes at least one byte net, so a pass always
//! terminates.
//!
//! # References
//! - eZ80 CPU User Manual (Zilog UM0077)
//! - Z80 opcode-matrix decomposition (http://www.z80.info/decoding.htm)

mod decode;
pub mod helpers;
pub mod tables;

#[cfg(test)]
mod tests;

use helpers::{hex_word, signed_hex};

/// One decoded instruction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    /// Base mnemonic (e.g. "ld", "jp"), or an undefined-opcode marker
    /// ("OPCODETRAP", "NONI") or the incomplete-tail sentinel
    pub mnemonic: String,
    /// Addressing-mode suffix (".sis", ".lil", ...), empty if none
    pub suffix: String,
    /// Formatted operand text, empty if none
    pub operands: String,
    /// Offset into the input buffer where the instruction began
    pub start: usize,
    /// Number of bytes consumed from `start`
    pub length: usize,
    /// Whether the instruction transfers control (jp/call/jr/djnz/rst)
    pub is_branch: bool,
    /// Resolved target address (or raw displacement when no base address is
    /// known); meaningful only if `is_branch`
    pub branch_target: i32,
}

/// Mnemonic of the sentinel record emitted when the decode range ends in the
/// middle of a multi-byte instruction.
pub const INCOMPLETE_MNEMONIC: &str = "<Incomplete instruction>";

impl Instruction {
    /// Full instruction text: mnemonic, suffix, and operands.
    pub fn text(&self) -> String {
        if self.operands.is_empty() {
            format!("{}{}", self.mnemonic, self.suffix)
        } else {
            format!("{}{} {}", self.mnemonic, self.suffix, self.operands)
        }
    }
}

impl std::fmt::Display for Instruction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text())
    }
}

/// A multi-byte read would pass the decode range's limit.
/// Converted by `decode_one` into the incomplete-tail sentinel record.
pub(crate) struct Incomplete;

/// eZ80 addressing-mode override state for the instruction being decoded.
/// At most one override governs an instruction; a second one nullifies the
/// first (see the module docs).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AddressingPrefix {
    None,
    Sis,
    Lis,
    Sil,
    Lil,
}

/// Per-pass decode context. Create one per disassembly invocation; a
/// `Decoder` must not be shared between passes.
pub struct Decoder<'a> {
    data: &'a [u8],
    /// Exclusive read bound: one past the last byte of the decode range
    limit: usize,
    base_address: i32,
    has_base_address: bool,
    adl_mode: bool,
    classic: bool,
    label_prefix: &'a str,
    loc_prefix: &'a str,
    /// Next byte to read; visible to the dispatcher, which backs it up by
    /// one byte when a prefix is nullified
    pub(crate) cursor: usize,
    // Per-instruction state, reset at the start of each decode_one
    pub(crate) prefix: AddressingPrefix,
    /// Immediate words carry a third byte when set
    pub(crate) long_data: bool,
    /// Hex digits used to render immediate words (4 or 6)
    pub(crate) word_digits: usize,
}

impl<'a> Decoder<'a> {
    #[allow(clippy::too_many_arguments)]
    fn new(
        data: &'a [u8],
        start: usize,
        end: usize,
        base_address: i32,
        has_base_address: bool,
        adl_mode: bool,
        classic_mode: bool,
        label_prefix: &'a str,
        loc_prefix: &'a str,
    ) -> Self {
        Self {
            data,
            limit: data.len().min(end.saturating_add(1)),
            base_address,
            has_base_address,
            adl_mode,
            classic: classic_mode,
            label_prefix,
            loc_prefix,
            cursor: start,
            prefix: AddressingPrefix::None,
            long_data: adl_mode,
            word_digits: if adl_mode { 6 } else { 4 },
        }
    }

    /// Decode one instruction at the cursor.
    ///
    /// The record is a scoped builder owned by this call alone: dispatch
    /// functions receive it by `&mut` and fill it in, and `length` is derived
    /// from the cursor afterwards. An `Incomplete` from any read inside the
    /// dispatch replaces the whole record with the sentinel and parks the
    /// cursor at the limit, which makes it the final record of the pass.
    pub(crate) fn decode_one(&mut self) -> Instruction {
        self.prefix = AddressingPrefix::None;
        self.long_data = self.adl_mode;
        self.word_digits = if self.long_data { 6 } else { 4 };

        let start = self.cursor;
        let mut ins = Instruction {
            mnemonic: String::new(),
            suffix: String::new(),
            operands: String::new(),
            start,
            length: 0,
            is_branch: false,
            branch_target: 0,
        };

        match self.decode_main(&mut ins) {
            Ok(()) => {
                ins.length = self.cursor - start;
            }
            Err(Incomplete) => {
                ins.mnemonic = INCOMPLETE_MNEMONIC.to_string();
                ins.suffix.clear();
                ins.operands.clear();
                ins.is_branch = false;
                ins.branch_target = 0;
                self.cursor = self.limit;
                ins.length = self.limit - start;
            }
        }
        ins
    }

    // ========== Cursor and Immediate Reads ==========

    /// Read one byte, advancing the cursor. Bounds-checked against the
    /// range limit; never panics.
    pub(crate) fn read_byte(&mut self) -> Result<u8, Incomplete> {
        if self.cursor >= self.limit {
            return Err(Incomplete);
        }
        let b = self.data[self.cursor];
        self.cursor += 1;
        Ok(b)
    }

    /// Read a little-endian immediate word: two bytes, or three when the
    /// active addressing mode selects long data.
    pub(crate) fn read_word(&mut self) -> Result<i32, Incomplete> {
        let lo = self.read_byte()? as i32;
        let hi = self.read_byte()? as i32;
        let mut r = lo | (hi << 8);
        if self.long_data {
            r |= (self.read_byte()? as i32) << 16;
        }
        Ok(r)
    }

    /// Read an immediate word and render it at the active display width.
    pub(crate) fn word_text(&mut self) -> Result<String, Incomplete> {
        let w = self.read_word()?;
        Ok(hex_word(w, self.word_digits))
    }

    /// Read an immediate word and render it as a memory operand,
    /// `(loc-prefix + address)`.
    pub(crate) fn mem_operand(&mut self) -> Result<String, Incomplete> {
        let w = self.word_text()?;
        Ok(format!("({}{})", self.loc_prefix, w))
    }

    /// Read an 8-bit immediate and render it as two hex digits.
    pub(crate) fn imm8_text(&mut self) -> Result<String, Incomplete> {
        let b = self.read_byte()?;
        Ok(format!("{:02X}", b))
    }

    /// Read an 8-bit displacement and render it signed.
    pub(crate) fn disp_text(&mut self) -> Result<String, Incomplete> {
        let d = self.read_byte()? as i8;
        Ok(signed_hex(d as i32))
    }

    // ========== Branch Resolution ==========

    /// Read the displacement byte of a relative branch and resolve the
    /// target: displacement plus the address of the following instruction
    /// when a base address is known, masked to 16 bits in classic mode.
    pub(crate) fn relative_target(&mut self) -> Result<i32, Incomplete> {
        let disp = self.read_byte()? as i8 as i32;
        let mut target = disp;
        if self.has_base_address {
            target += self.cursor as i32 + self.base_address;
        }
        if self.classic {
            target &= 0xFFFF;
        }
        Ok(target)
    }

    /// Operand text for a relative branch: an address literal carrying the
    /// label prefix when a base address is known, a signed byte otherwise.
    pub(crate) fn relative_text(&self, target: i32) -> String {
        if self.has_base_address {
            let digits = if self.classic { 4 } else { 6 };
            format!("{}{}", self.label_prefix, hex_word(target, digits))
        } else {
            signed_hex(target)
        }
    }

    /// Operand text for an absolute branch target. The label prefix applies
    /// uniformly whether or not the target falls inside the decoded range.
    pub(crate) fn absolute_text(&self, target: i32) -> String {
        format!("{}{}", self.label_prefix, hex_word(target, self.word_digits))
    }
}

/// Decode the byte range `[start, end]` (inclusive offsets into `data`) into
/// a sequence of instruction records, in buffer order. A non-zero base
/// address implies that the base address is known.
///
/// The pass always runs to completion: undefined encodings and a truncated
/// tail are reported as ordinary records, never as errors. Record starts
/// partition the range contiguously; see the crate tests for the exact
/// property.
#[allow(clippy::too_many_arguments)]
pub fn decode(
    data: &[u8],
    start: usize,
    end: usize,
    base_address: i32,
    has_base_address: bool,
    adl_mode: bool,
    classic_mode: bool,
    label_prefix: &str,
    loc_prefix: &str,
) -> Vec<Instruction> {
    let mut decoder = Decoder::new(
        data,
        start,
        end,
        base_address,
        base_address != 0 || has_base_address,
        adl_mode,
        classic_mode,
        label_prefix,
        loc_prefix,
    );
    let mut out = Vec::new();
    while decoder.cursor < decoder.limit {
        out.push(decoder.decode_one());
    }
    out
}

/// Decode an entire buffer.
pub fn decode_all(
    data: &[u8],
    base_address: i32,
    has_base_address: bool,
    adl_mode: bool,
    classic_mode: bool,
    label_prefix: &str,
    loc_prefix: &str,
) -> Vec<Instruction> {
    if data.is_empty() {
        return Vec::new();
    }
    decode(
        data,
        0,
        data.len() - 1,
        base_address,
        has_base_address,
        adl_mode,
        classic_mode,
        label_prefix,
        loc_prefix,
    )
}

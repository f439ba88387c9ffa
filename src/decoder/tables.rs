//! Operand-name lookup tables
//!
//! Fixed tables indexed by the x/y/z/p/q opcode fields, following the
//! standard Z80 opcode-matrix decomposition (http://www.z80.info/decoding.htm).

/// 8-bit registers by the r field. Index 6 is the memory-indirect form.
pub const REG8: [&str; 8] = ["b", "c", "d", "e", "h", "l", "(hl)", "a"];

/// Register pairs by the p field, sp variant (16-bit load/arithmetic group).
pub const REG_PAIR_SP: [&str; 4] = ["bc", "de", "hl", "sp"];

/// Register pairs by the p field, af variant (push/pop group).
pub const REG_PAIR_AF: [&str; 4] = ["bc", "de", "hl", "af"];

/// Condition codes by the y field (or y - 4 for conditional jr).
pub const CONDITIONS: [&str; 8] = ["nz", "z", "nc", "c", "po", "pe", "p", "m"];

/// ALU mnemonics by the y field.
pub const ALU_OPS: [&str; 8] = ["add", "adc", "sub", "sbc", "and", "xor", "or", "cp"];

/// Leading operand text paired with ALU_OPS: add/adc/sbc spell out the
/// accumulator, the rest take a bare operand.
pub const ALU_ACC_ARG: [&str; 8] = ["a, ", "a, ", "", "a, ", "", "", "", ""];

/// Rotate/shift mnemonics by the y field of a CB-prefixed opcode.
/// Index 6 is the undocumented sll.
pub const ROT_OPS: [&str; 8] = ["rlc", "rrc", "rl", "rr", "sla", "sra", "sll", "srl"];

/// Interrupt-mode operand text by the y field of an ED-prefixed opcode.
/// The odd gaps have no defined mode on the classic Z80.
pub const INT_MODES: [&str; 8] = ["0", "?", "1", "2", "0", "?", "1", "2"];

/// Index registers by DD/FD prefix number.
pub const INDEX_REGS: [&str; 2] = ["ix", "iy"];

//! eZ80/Z80 instruction dispatch
//!
//! This module contains the decoding functions for the full opcode space:
//! - decode_main: top-level dispatch on the x field, including the eZ80
//!   addressing-mode override prefixes
//! - decode_x0: no-operand forms, relative branches, 16-bit and 8-bit
//!   load/arithmetic (x=0 category)
//! - decode_x3: control flow, I/O, exchanges and prefix dispatch (x=3)
//! - decode_cb: CB prefix (rotate, shift, bit operations)
//! - decode_ed_x0, decode_ed_x1, decode_ed_block: ED prefix categories
//! - decode_index, decode_index_cb: DD/FD prefix (IX/IY indexed operations)
//!
//! # References
//! - eZ80 CPU User Manual (Zilog UM0077)
//! - Z80 opcode-matrix decomposition (http://www.z80.info/decoding.htm)

use super::helpers::{field_p, field_q, field_x, field_y, field_z, signed_hex};
use super::tables::{
    ALU_ACC_ARG, ALU_OPS, CONDITIONS, INDEX_REGS, INT_MODES, REG8, REG_PAIR_AF, REG_PAIR_SP,
    ROT_OPS,
};
use super::{AddressingPrefix, Decoder, Incomplete, Instruction};

impl<'a> Decoder<'a> {
    /// Dispatch one instruction starting at the cursor.
    pub(crate) fn decode_main(&mut self, ins: &mut Instruction) -> Result<(), Incomplete> {
        let b = self.read_byte()?;
        match field_x(b) {
            0 => self.decode_x0(ins, b)?,
            1 => {
                // The eZ80 addressing-mode overrides live in the x=1 quadrant;
                // on a classic Z80 the same bytes are plain ld r,r' forms.
                if !self.classic {
                    if self.prefix != AddressingPrefix::None {
                        // A second x=1 byte while an override is active: the
                        // earlier override contributes nothing. Report it as
                        // NONI and back the cursor up one byte so this byte
                        // starts a fresh instruction.
                        ins.mnemonic = "NONI".to_string();
                        self.cursor -= 1;
                        return Ok(());
                    }
                    match b {
                        0x40 => {
                            return self.with_override(ins, AddressingPrefix::Sis, ".sis", false, 4)
                        }
                        0x49 => {
                            return self.with_override(ins, AddressingPrefix::Lis, ".lis", true, 4)
                        }
                        0x52 => {
                            return self.with_override(ins, AddressingPrefix::Sil, ".sil", false, 6)
                        }
                        0x5B => {
                            return self.with_override(ins, AddressingPrefix::Lil, ".lil", true, 6)
                        }
                        _ => {}
                    }
                }
                if b == 0x76 {
                    // The ld (hl),(hl) slot
                    ins.mnemonic = "halt".to_string();
                } else {
                    ins.mnemonic = "ld".to_string();
                    ins.operands = format!(
                        "{}, {}",
                        REG8[field_y(b) as usize],
                        REG8[field_z(b) as usize]
                    );
                }
            }
            2 => {
                // ALU a, r
                let y = field_y(b) as usize;
                ins.mnemonic = ALU_OPS[y].to_string();
                ins.operands = format!("{}{}", ALU_ACC_ARG[y], REG8[field_z(b) as usize]);
            }
            3 => self.decode_x3(ins, b)?,
            _ => unreachable!(),
        }
        Ok(())
    }

    /// Bind an addressing-mode override for the single following instruction
    /// and re-enter the dispatcher. The override fixes both the immediate
    /// data width and the hex display width; the two do not always agree
    /// (.lis reads long data but displays short addresses, .sil the reverse).
    fn with_override(
        &mut self,
        ins: &mut Instruction,
        prefix: AddressingPrefix,
        suffix: &str,
        long_data: bool,
        digits: usize,
    ) -> Result<(), Incomplete> {
        self.prefix = prefix;
        ins.suffix = suffix.to_string();
        self.long_data = long_data;
        self.word_digits = digits;
        self.decode_main(ins)
    }

    fn decode_x0(&mut self, ins: &mut Instruction, b: u8) -> Result<(), Incomplete> {
        let y = field_y(b);
        let z = field_z(b);
        let p = field_p(b) as usize;
        let q = field_q(b);
        match z {
            0 => match y {
                0 => ins.mnemonic = "nop".to_string(),
                1 => {
                    ins.mnemonic = "ex".to_string();
                    ins.operands = "af, af'".to_string();
                }
                2 => {
                    let target = self.relative_target()?;
                    ins.is_branch = true;
                    ins.branch_target = target;
                    ins.mnemonic = "djnz".to_string();
                    ins.operands = self.relative_text(target);
                }
                3 => {
                    let target = self.relative_target()?;
                    ins.is_branch = true;
                    ins.branch_target = target;
                    ins.mnemonic = "jr".to_string();
                    ins.operands = self.relative_text(target);
                }
                4..=7 => {
                    let target = self.relative_target()?;
                    ins.is_branch = true;
                    ins.branch_target = target;
                    ins.mnemonic = "jr".to_string();
                    ins.operands = format!(
                        "{}, {}",
                        CONDITIONS[(y - 4) as usize],
                        self.relative_text(target)
                    );
                }
                _ => unreachable!(),
            },
            1 => {
                if q == 0 {
                    ins.mnemonic = "ld".to_string();
                    let nn = self.word_text()?;
                    ins.operands = format!("{}, {}", REG_PAIR_SP[p], nn);
                } else {
                    ins.mnemonic = "add".to_string();
                    ins.operands = format!("hl, {}", REG_PAIR_SP[p]);
                }
            }
            2 => {
                ins.mnemonic = "ld".to_string();
                ins.operands = match y {
                    0 => "(bc), a".to_string(),
                    1 => "a, (bc)".to_string(),
                    2 => "(de), a".to_string(),
                    3 => "a, (de)".to_string(),
                    4 => format!("{}, hl", self.mem_operand()?),
                    5 => format!("hl, {}", self.mem_operand()?),
                    6 => format!("{}, a", self.mem_operand()?),
                    7 => format!("a, {}", self.mem_operand()?),
                    _ => unreachable!(),
                };
            }
            3 => {
                ins.mnemonic = if q == 0 { "inc" } else { "dec" }.to_string();
                ins.operands = REG_PAIR_SP[p].to_string();
            }
            4 => {
                ins.mnemonic = "inc".to_string();
                ins.operands = REG8[y as usize].to_string();
            }
            5 => {
                ins.mnemonic = "dec".to_string();
                ins.operands = REG8[y as usize].to_string();
            }
            6 => {
                ins.mnemonic = "ld".to_string();
                let n = self.imm8_text()?;
                ins.operands = format!("{}, {}", REG8[y as usize], n);
            }
            7 => {
                ins.mnemonic = match y {
                    0 => "rlca",
                    1 => "rrca",
                    2 => "rla",
                    3 => "rra",
                    4 => "daa",
                    5 => "cpl",
                    6 => "scf",
                    7 => "ccf",
                    _ => unreachable!(),
                }
                .to_string();
            }
            _ => unreachable!(),
        }
        Ok(())
    }

    fn decode_x3(&mut self, ins: &mut Instruction, b: u8) -> Result<(), Incomplete> {
        let y = field_y(b);
        let z = field_z(b);
        let p = field_p(b) as usize;
        let q = field_q(b);
        match z {
            0 => {
                ins.mnemonic = "ret".to_string();
                ins.operands = CONDITIONS[y as usize].to_string();
            }
            1 => {
                if q == 0 {
                    ins.mnemonic = "pop".to_string();
                    ins.operands = REG_PAIR_AF[p].to_string();
                } else {
                    match p {
                        0 => ins.mnemonic = "ret".to_string(),
                        1 => ins.mnemonic = "exx".to_string(),
                        2 => {
                            ins.mnemonic = "jp".to_string();
                            ins.operands = "(hl)".to_string();
                        }
                        3 => {
                            ins.mnemonic = "ld".to_string();
                            ins.operands = "sp, hl".to_string();
                        }
                        _ => unreachable!(),
                    }
                }
            }
            2 => {
                ins.mnemonic = "jp".to_string();
                let target = self.read_word()?;
                ins.operands = format!("{}, {}", CONDITIONS[y as usize], self.absolute_text(target));
                ins.is_branch = true;
                ins.branch_target = target;
            }
            3 => match y {
                0 => {
                    ins.mnemonic = "jp".to_string();
                    let target = self.read_word()?;
                    ins.operands = self.absolute_text(target);
                    ins.is_branch = true;
                    ins.branch_target = target;
                }
                1 => self.decode_cb(ins)?,
                2 => {
                    ins.mnemonic = "out".to_string();
                    let port = self.imm8_text()?;
                    ins.operands = format!("({}), a", port);
                }
                3 => {
                    ins.mnemonic = "in".to_string();
                    let port = self.imm8_text()?;
                    ins.operands = format!("a, ({})", port);
                }
                4 => {
                    ins.mnemonic = "ex".to_string();
                    ins.operands = "(sp), hl".to_string();
                }
                5 => {
                    ins.mnemonic = "ex".to_string();
                    ins.operands = "de, hl".to_string();
                }
                6 => ins.mnemonic = "di".to_string(),
                7 => ins.mnemonic = "ei".to_string(),
                _ => unreachable!(),
            },
            4 => {
                let target = self.read_word()?;
                ins.is_branch = true;
                ins.branch_target = target;
                ins.mnemonic = "call".to_string();
                ins.operands = format!("{}, {}", CONDITIONS[y as usize], self.absolute_text(target));
            }
            5 => {
                if q == 0 {
                    ins.mnemonic = "push".to_string();
                    ins.operands = REG_PAIR_AF[p].to_string();
                } else {
                    match b {
                        0xCD => {
                            let target = self.read_word()?;
                            ins.is_branch = true;
                            ins.branch_target = target;
                            ins.mnemonic = "call".to_string();
                            ins.operands = self.absolute_text(target);
                        }
                        0xDD => self.decode_index(ins, 0)?,
                        0xED => self.decode_ed(ins)?,
                        0xFD => self.decode_index(ins, 1)?,
                        _ => unreachable!(),
                    }
                }
            }
            6 => {
                let y = y as usize;
                ins.mnemonic = ALU_OPS[y].to_string();
                let n = self.imm8_text()?;
                ins.operands = format!("{}{}", ALU_ACC_ARG[y], n);
            }
            7 => {
                ins.mnemonic = "rst".to_string();
                let target = y as i32 * 8;
                ins.operands = format!("{:02X}h", target);
                ins.is_branch = true;
                ins.branch_target = target;
            }
            _ => unreachable!(),
        }
        Ok(())
    }

    fn decode_cb(&mut self, ins: &mut Instruction) -> Result<(), Incomplete> {
        let b = self.read_byte()?;
        let y = field_y(b) as usize;
        let z = field_z(b) as usize;
        match field_x(b) {
            0 => {
                ins.mnemonic = ROT_OPS[y].to_string();
                ins.operands = REG8[z].to_string();
            }
            1 => {
                ins.mnemonic = "bit".to_string();
                ins.operands = format!("{}, {}", y, REG8[z]);
            }
            2 => {
                ins.mnemonic = "res".to_string();
                ins.operands = format!("{}, {}", y, REG8[z]);
            }
            3 => {
                ins.mnemonic = "set".to_string();
                ins.operands = format!("{}, {}", y, REG8[z]);
            }
            _ => unreachable!(),
        }
        Ok(())
    }

    fn decode_ed(&mut self, ins: &mut Instruction) -> Result<(), Incomplete> {
        let b = self.read_byte()?;
        match field_x(b) {
            0 => self.decode_ed_x0(ins, b)?,
            1 => self.decode_ed_x1(ins, b)?,
            2 | 3 => self.decode_ed_block(ins, b),
            _ => unreachable!(),
        }
        Ok(())
    }

    /// ED prefix, x=0 category: the quadrant exists only on the eZ80
    /// (in0/out0, lea, tst, and register-pair loads through (hl)).
    fn decode_ed_x0(&mut self, ins: &mut Instruction, b: u8) -> Result<(), Incomplete> {
        if self.classic {
            ins.mnemonic = "NONI \\ NOP".to_string();
            return Ok(());
        }
        let y = field_y(b);
        let z = field_z(b);
        let p = field_p(b);
        let q = field_q(b);
        match z {
            0 => {
                if b == 0x30 {
                    ins.mnemonic = "OPCODETRAP".to_string();
                    return Ok(());
                }
                ins.mnemonic = "in0".to_string();
                let port = self.imm8_text()?;
                ins.operands = format!("{}, ({})", REG8[y as usize], port);
            }
            1 => {
                if b == 0x31 {
                    // 0x31 sits in the out0 column but encodes the iy form of
                    // the z=7 register-pair load group
                    ins.mnemonic = "ld".to_string();
                    ins.operands = "iy, (hl)".to_string();
                } else {
                    ins.mnemonic = "out0".to_string();
                    let port = self.imm8_text()?;
                    ins.operands = format!("({}), {}", port, REG8[y as usize]);
                }
            }
            2 | 3 => {
                // lea rr, ix+d / lea rr, iy+d; odd q slots are unassigned
                let index_reg = INDEX_REGS[(b & 1) as usize];
                if q == 0 {
                    ins.mnemonic = "lea".to_string();
                    let dst = match p {
                        0 => "bc",
                        1 => "de",
                        2 => "hl",
                        3 => index_reg,
                        _ => unreachable!(),
                    };
                    let d = self.read_byte()?;
                    ins.operands = format!("{}, {} + {:02X}", dst, index_reg, d);
                } else {
                    ins.mnemonic = "OPCODETRAP".to_string();
                }
            }
            4 => {
                ins.mnemonic = "tst".to_string();
                ins.operands = format!("a, {}", REG8[y as usize]);
            }
            5 => ins.mnemonic = "OPCODETRAP".to_string(),
            6 => {
                if b == 0x3E {
                    ins.mnemonic = "ld".to_string();
                    ins.operands = "(hl), iy".to_string();
                } else {
                    ins.mnemonic = "OPCODETRAP".to_string();
                }
            }
            7 => {
                ins.mnemonic = "ld".to_string();
                let rr = match p {
                    0 => "bc",
                    1 => "de",
                    2 => "hl",
                    3 => "ix",
                    _ => unreachable!(),
                };
                ins.operands = if q == 0 {
                    format!("{}, (hl)", rr)
                } else {
                    format!("(hl), {}", rr)
                };
            }
            _ => unreachable!(),
        }
        Ok(())
    }

    /// ED prefix, x=1 category: I/O on (bc), 16-bit arithmetic, absolute
    /// loads, and the neg/mlt/lea/pea/im/retn block. Several slots are legal
    /// in only one of the two modes.
    fn decode_ed_x1(&mut self, ins: &mut Instruction, b: u8) -> Result<(), Incomplete> {
        let y = field_y(b);
        let z = field_z(b);
        let p = field_p(b) as usize;
        let q = field_q(b);
        match z {
            0 => {
                ins.mnemonic = "in".to_string();
                if b == 0x70 {
                    // Flag-only input: undocumented on the Z80, unassigned on
                    // the eZ80
                    if self.classic {
                        ins.operands = "(c)".to_string();
                    } else {
                        ins.mnemonic = "OPCODETRAP".to_string();
                    }
                } else {
                    let port = if self.classic { "(c)" } else { "(bc)" };
                    ins.operands = format!("{}, {}", REG8[y as usize], port);
                }
            }
            1 => {
                ins.mnemonic = "out".to_string();
                if b == 0x71 {
                    if self.classic {
                        ins.operands = "(c), 0".to_string();
                    } else {
                        ins.mnemonic = "OPCODETRAP".to_string();
                    }
                } else {
                    let port = if self.classic { "(c), " } else { "(bc), " };
                    ins.operands = format!("{}{}", port, REG8[y as usize]);
                }
            }
            2 => {
                ins.mnemonic = if q == 0 { "sbc" } else { "adc" }.to_string();
                ins.operands = format!("hl, {}", REG_PAIR_SP[p]);
            }
            3 => {
                ins.mnemonic = "ld".to_string();
                ins.operands = if q == 0 {
                    format!("{}, {}", self.mem_operand()?, REG_PAIR_SP[p])
                } else {
                    format!("{}, {}", REG_PAIR_SP[p], self.mem_operand()?)
                };
            }
            4 => {
                if self.classic {
                    // Every slot aliases neg on the classic Z80
                    ins.mnemonic = "neg".to_string();
                } else if q == 0 {
                    match p {
                        0 => ins.mnemonic = "neg".to_string(),
                        1 => {
                            ins.mnemonic = "lea".to_string();
                            let d = self.disp_text()?;
                            ins.operands = format!("ix, iy + {}", d);
                        }
                        2 => {
                            ins.mnemonic = "tst".to_string();
                            let n = self.imm8_text()?;
                            ins.operands = format!("a, {}", n);
                        }
                        3 => {
                            ins.mnemonic = "tstio".to_string();
                            ins.operands = self.imm8_text()?;
                        }
                        _ => unreachable!(),
                    }
                } else {
                    ins.mnemonic = "mlt".to_string();
                    ins.operands = REG_PAIR_SP[p].to_string();
                }
            }
            5 => {
                if self.classic {
                    ins.mnemonic = if y != 1 { "retn" } else { "reti" }.to_string();
                } else {
                    match y {
                        0 => ins.mnemonic = "retn".to_string(),
                        1 => ins.mnemonic = "reti".to_string(),
                        2 => {
                            ins.mnemonic = "lea".to_string();
                            let d = self.disp_text()?;
                            ins.operands = format!("iy, ix + {}", d);
                        }
                        3 | 6 => ins.mnemonic = "OPCODETRAP".to_string(),
                        4 => {
                            ins.mnemonic = "pea".to_string();
                            let d = self.disp_text()?;
                            ins.operands = format!("ix + {}", d);
                        }
                        5 => {
                            ins.mnemonic = "ld".to_string();
                            ins.operands = "mb, a".to_string();
                        }
                        7 => ins.mnemonic = "stmix".to_string(),
                        _ => unreachable!(),
                    }
                }
            }
            6 => {
                if self.classic {
                    ins.mnemonic = "im".to_string();
                    ins.operands = INT_MODES[y as usize].to_string();
                } else {
                    match y {
                        0 | 2 | 3 => {
                            ins.mnemonic = "im".to_string();
                            ins.operands = INT_MODES[y as usize].to_string();
                        }
                        1 => ins.mnemonic = "OPCODETRAP".to_string(),
                        4 => {
                            ins.mnemonic = "pea".to_string();
                            let d = self.disp_text()?;
                            ins.operands = format!("iy + {}", d);
                        }
                        5 => {
                            ins.mnemonic = "ld".to_string();
                            ins.operands = "a, mb".to_string();
                        }
                        6 => ins.mnemonic = "slp".to_string(),
                        7 => ins.mnemonic = "rsmix".to_string(),
                        _ => unreachable!(),
                    }
                }
            }
            7 => match y {
                0 => {
                    ins.mnemonic = "ld".to_string();
                    ins.operands = "i, a".to_string();
                }
                1 => {
                    ins.mnemonic = "ld".to_string();
                    ins.operands = "r, a".to_string();
                }
                2 => {
                    ins.mnemonic = "ld".to_string();
                    ins.operands = "a, i".to_string();
                }
                3 => {
                    ins.mnemonic = "ld".to_string();
                    ins.operands = "a, r".to_string();
                }
                4 => ins.mnemonic = "rrd".to_string(),
                5 => ins.mnemonic = "rld".to_string(),
                6 | 7 => {
                    ins.mnemonic = if self.classic {
                        "NONI \\ NOP"
                    } else {
                        "OPCODETRAP"
                    }
                    .to_string();
                }
                _ => unreachable!(),
            },
            _ => unreachable!(),
        }
        Ok(())
    }

    /// ED prefix, x=2/x=3 categories: block transfer/search/I/O repertoire
    /// matched by byte value.
    fn decode_ed_block(&mut self, ins: &mut Instruction, b: u8) {
        // The two register-pair loads through i are the only block-quadrant
        // encodings with operands
        if !self.classic {
            if b == 0xC7 {
                ins.mnemonic = "ld".to_string();
                ins.operands = "i, hl".to_string();
                return;
            }
            if b == 0xD7 {
                ins.mnemonic = "ld".to_string();
                ins.operands = "hl, i".to_string();
                return;
            }
        }
        match Self::block_mnemonic(b, self.classic) {
            Some(name) => ins.mnemonic = name.to_string(),
            None => {
                ins.mnemonic = if self.classic {
                    "NONI \\ NOP"
                } else {
                    "OPCODETRAP"
                }
                .to_string();
            }
        }
    }

    /// Block instruction repertoire. The first half is common to both modes;
    /// the classic-mode guard keeps the eZ80-extended variants out, so in
    /// classic mode those bytes fall through to the caller's undefined
    /// handling.
    fn block_mnemonic(b: u8, classic: bool) -> Option<&'static str> {
        match b {
            0xA0 => Some("ldi"),
            0xA1 => Some("cpi"),
            0xA2 => Some("ini"),
            0xA3 => Some("outi"),
            0xA8 => Some("ldd"),
            0xA9 => Some("cpd"),
            0xAA => Some("ind"),
            0xAB => Some("outd"),
            0xB0 => Some("ldir"),
            0xB1 => Some("cpir"),
            0xB2 => Some("inir"),
            0xB3 => Some("otir"),
            0xB8 => Some("lddr"),
            0xB9 => Some("cpdr"),
            0xBA => Some("indr"),
            0xBB => Some("otdr"),
            _ if classic => None,
            0x82 => Some("inim"),
            0x83 => Some("otim"),
            0x84 => Some("ini2"),
            0x8A => Some("indm"),
            0x8B => Some("otdm"),
            0x8C => Some("ind2"),
            0x92 => Some("inimr"),
            0x93 => Some("otimr"),
            0x94 => Some("ini2r"),
            0x9A => Some("indmr"),
            0x9B => Some("otdmr"),
            0x9C => Some("ind2r"),
            0xA4 => Some("outi2"),
            0xAC => Some("outd2"),
            0xB4 => Some("oti2r"),
            0xBC => Some("otd2r"),
            0xC2 => Some("inirx"),
            0xC3 => Some("otirx"),
            0xCA => Some("indrx"),
            0xCB => Some("otdrx"),
            _ => None,
        }
    }

    /// DD/FD prefix: decode with ix or iy bound as the index register.
    fn decode_index(&mut self, ins: &mut Instruction, index_num: usize) -> Result<(), Incomplete> {
        let ir = INDEX_REGS[index_num];
        let b = self.read_byte()?;
        let y = field_y(b) as usize;
        let z = field_z(b) as usize;
        let p = field_p(b) as usize;
        match b {
            0x21 => {
                ins.mnemonic = "ld".to_string();
                let nn = self.word_text()?;
                ins.operands = format!("{}, {}", ir, nn);
            }
            0x22 => {
                ins.mnemonic = "ld".to_string();
                let nn = self.word_text()?;
                ins.operands = format!("({}), {}", nn, ir);
            }
            0x2A => {
                ins.mnemonic = "ld".to_string();
                let nn = self.word_text()?;
                ins.operands = format!("{}, ({})", ir, nn);
            }
            0x23 => {
                ins.mnemonic = "inc".to_string();
                ins.operands = ir.to_string();
            }
            0x2B => {
                ins.mnemonic = "dec".to_string();
                ins.operands = ir.to_string();
            }
            0x24 => {
                ins.mnemonic = "inc".to_string();
                ins.operands = format!("{}h", ir);
            }
            0x2C => {
                ins.mnemonic = "inc".to_string();
                ins.operands = format!("{}l", ir);
            }
            0x25 => {
                ins.mnemonic = "dec".to_string();
                ins.operands = format!("{}h", ir);
            }
            0x2D => {
                ins.mnemonic = "dec".to_string();
                ins.operands = format!("{}l", ir);
            }
            0x34 => {
                ins.mnemonic = "inc".to_string();
                let d = self.disp_text()?;
                ins.operands = format!("({} + {})", ir, d);
            }
            0x35 => {
                ins.mnemonic = "dec".to_string();
                let d = self.disp_text()?;
                ins.operands = format!("({} + {})", ir, d);
            }
            0x26 => {
                ins.mnemonic = "ld".to_string();
                let n = self.disp_text()?;
                ins.operands = format!("{}h, {}", ir, n);
            }
            0x2E => {
                ins.mnemonic = "ld".to_string();
                let n = self.disp_text()?;
                ins.operands = format!("{}l, {}", ir, n);
            }
            0x36 => {
                ins.mnemonic = "ld".to_string();
                let d = self.disp_text()?;
                let n = self.imm8_text()?;
                ins.operands = format!("({} + {}), {}", ir, d, n);
            }
            0x09 => {
                ins.mnemonic = "add".to_string();
                ins.operands = format!("{}, bc", ir);
            }
            0x19 => {
                ins.mnemonic = "add".to_string();
                ins.operands = format!("{}, de", ir);
            }
            0x29 => {
                ins.mnemonic = "add".to_string();
                ins.operands = format!("{}, {}", ir, ir);
            }
            0x39 => {
                ins.mnemonic = "add".to_string();
                ins.operands = format!("{}, sp", ir);
            }
            // ld ixh/ixl, r
            0x60..=0x63 | 0x67..=0x6B | 0x6F => {
                ins.mnemonic = "ld".to_string();
                ins.operands = format!("{}{}, {}", ir, REG8[y], REG8[z]);
            }
            // ld ixh/ixl, ixh/ixl
            0x64 | 0x65 | 0x6C | 0x6D => {
                ins.mnemonic = "ld".to_string();
                ins.operands = format!("{}{}, {}{}", ir, REG8[y], ir, REG8[z]);
            }
            // ld (ix + d), r
            0x70..=0x75 | 0x77 => {
                ins.mnemonic = "ld".to_string();
                let d = self.disp_text()?;
                ins.operands = format!("({} + {}), {}", ir, d, REG8[z]);
            }
            // ld r, ixh/ixl
            0x44 | 0x45 | 0x4C | 0x4D | 0x54 | 0x55 | 0x5C | 0x5D | 0x7C | 0x7D => {
                ins.mnemonic = "ld".to_string();
                ins.operands = format!("{}, {}{}", REG8[y], ir, REG8[z]);
            }
            // ld r, (ix + d)
            0x46 | 0x4E | 0x56 | 0x5E | 0x66 | 0x6E | 0x7E => {
                ins.mnemonic = "ld".to_string();
                let d = self.disp_text()?;
                ins.operands = format!("{}, ({} + {})", REG8[y], ir, d);
            }
            // ALU a, ixh/ixl
            0x84 | 0x85 | 0x8C | 0x8D | 0x94 | 0x95 | 0x9C | 0x9D | 0xA4 | 0xA5 | 0xAC | 0xAD
            | 0xB4 | 0xB5 | 0xBC | 0xBD => {
                ins.mnemonic = ALU_OPS[y].to_string();
                ins.operands = format!("{}{}{}", ALU_ACC_ARG[y], ir, REG8[z]);
            }
            // ALU a, (ix + d)
            0x86 | 0x8E | 0x96 | 0x9E | 0xA6 | 0xAE | 0xB6 | 0xBE => {
                ins.mnemonic = ALU_OPS[y].to_string();
                let d = self.disp_text()?;
                ins.operands = format!("{}({} + {})", ALU_ACC_ARG[y], ir, d);
            }
            0xE1 => {
                ins.mnemonic = "pop".to_string();
                ins.operands = ir.to_string();
            }
            0xE9 => {
                ins.mnemonic = "jp".to_string();
                ins.operands = format!("({})", ir);
            }
            0xE3 => {
                ins.mnemonic = "ex".to_string();
                ins.operands = format!("(sp), {}", ir);
            }
            0xE5 => {
                ins.mnemonic = "push".to_string();
                ins.operands = ir.to_string();
            }
            0xCB => self.decode_index_cb(ins, ir)?,
            0xF9 => {
                ins.mnemonic = "ld".to_string();
                ins.operands = format!("sp, {}", ir);
            }
            // eZ80 register-pair loads through (ix + d)
            0x07 | 0x17 | 0x27 if !self.classic => {
                ins.mnemonic = "ld".to_string();
                let d = self.disp_text()?;
                ins.operands = format!("{}, ({} + {})", REG_PAIR_SP[p], ir, d);
            }
            0x37 if !self.classic => {
                ins.mnemonic = "ld".to_string();
                let d = self.disp_text()?;
                ins.operands = format!("{}, ({} + {})", ir, ir, d);
            }
            0x0F | 0x1F | 0x2F if !self.classic => {
                ins.mnemonic = "ld".to_string();
                let d = self.disp_text()?;
                ins.operands = format!("({} + {}), {}", ir, d, REG_PAIR_SP[p]);
            }
            0x3F if !self.classic => {
                ins.mnemonic = "ld".to_string();
                let d = self.disp_text()?;
                ins.operands = format!("({} + {}), {}", ir, d, ir);
            }
            0x31 if !self.classic => {
                ins.mnemonic = "ld".to_string();
                let d = self.disp_text()?;
                ins.operands = format!("{}, ({} + {})", INDEX_REGS[index_num ^ 1], ir, d);
            }
            0x3E if !self.classic => {
                ins.mnemonic = "ld".to_string();
                let d = self.disp_text()?;
                ins.operands = format!("({} + {}), {}", ir, d, INDEX_REGS[index_num ^ 1]);
            }
            // No arm for ED: index registers are forbidden on the ED block.
            // No arm for DD/FD: only the last prefix matters.
            _ => {
                // The prefix contributed nothing, but this byte may still
                // start a valid instruction: back the cursor up one byte so
                // it is decoded fresh.
                ins.mnemonic = "NONI".to_string();
                self.cursor -= 1;
            }
        }
        Ok(())
    }

    /// DD CB / FD CB: the displacement byte precedes the bit-manipulation
    /// opcode. Only the memory-indirect forms are assigned on the eZ80;
    /// classic mode renders the undocumented copy-result text instead.
    fn decode_index_cb(&mut self, ins: &mut Instruction, ir: &str) -> Result<(), Incomplete> {
        let d = self.read_byte()? as i8;
        let b = self.read_byte()?;
        let operand = format!("({} + {})", ir, signed_hex(d as i32));
        let y = field_y(b) as usize;
        let z = field_z(b) as usize;
        match field_x(b) {
            0 => {
                ins.mnemonic = ROT_OPS[y].to_string();
                if z != 6 {
                    if self.classic {
                        ins.operands = format!("{}, {}", REG8[z], operand);
                    } else {
                        ins.mnemonic = "OPCODETRAP".to_string();
                    }
                } else {
                    ins.operands = operand;
                }
            }
            1 => {
                ins.mnemonic = "bit".to_string();
                if z != 6 && !self.classic {
                    ins.mnemonic = "OPCODETRAP".to_string();
                } else {
                    ins.operands = format!("{}, {}", y, operand);
                }
            }
            2 => {
                ins.mnemonic = "res".to_string();
                if z != 6 {
                    if self.classic {
                        ins.operands = format!("{}, {}, {}", REG8[z], y, operand);
                    } else {
                        ins.mnemonic = "OPCODETRAP".to_string();
                    }
                } else {
                    ins.operands = format!("{}, {}", y, operand);
                }
            }
            3 => {
                ins.mnemonic = "set".to_string();
                if z != 6 {
                    if self.classic {
                        ins.operands = format!("{}, {}, {}", REG8[z], y, operand);
                    } else {
                        ins.mnemonic = "OPCODETRAP".to_string();
                    }
                } else {
                    ins.operands = format!("{}, {}", y, operand);
                }
            }
            _ => unreachable!(),
        }
        Ok(())
    }
}

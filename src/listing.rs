//! Listing formatter
//!
//! Renders a decoded instruction sequence as an assembly-style text listing:
//! optional label lines for branch targets, an optional address column, an
//! optional opcode-hex column, and operand alignment by spaces or tabs.
//!
//! Label placement is a second, read-only pass over the records: every
//! `branch_target` of a branch instruction becomes a known label, and a label
//! line is emitted in front of any instruction whose address is in that set.

use crate::decoder::Instruction;
use std::collections::HashSet;

/// Listing layout options
#[derive(Debug, Clone)]
pub struct Options {
    /// Print the address of each instruction
    pub show_addresses: bool,
    /// Print the instruction bytes as a hex column
    pub show_opcodes: bool,
    /// Pad the mnemonic to a fixed-width field before the operands
    pub align_operands: bool,
    /// Separate columns with tabs instead of space padding
    pub use_tabs: bool,
    /// Emit label lines for known branch targets
    pub add_labels: bool,
    /// Render addresses at classic Z80 width (4 hex digits instead of 6)
    pub classic: bool,
    /// Address of the first buffer byte
    pub base_address: i32,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            show_addresses: false,
            show_opcodes: true,
            align_operands: true,
            use_tabs: false,
            add_labels: true,
            classic: false,
            base_address: 0,
        }
    }
}

/// Collect the distinct branch targets of a decoded sequence.
pub fn branch_targets(instrs: &[Instruction]) -> HashSet<i32> {
    instrs
        .iter()
        .filter(|i| i.is_branch)
        .map(|i| i.branch_target)
        .collect()
}

/// Render the listing for `instrs`, which must have been decoded from
/// `data` (the opcode column reads the instruction bytes back out of it).
pub fn render(data: &[u8], instrs: &[Instruction], opts: &Options) -> String {
    let known_labels = if opts.add_labels {
        branch_targets(instrs)
    } else {
        HashSet::new()
    };

    let mut out = String::new();
    for ins in instrs {
        let address = ins.start as i32 + opts.base_address;

        if opts.add_labels && known_labels.contains(&address) {
            // Indent the label line past the address/opcode columns
            if opts.show_addresses {
                out.push_str(if opts.use_tabs { "\t" } else { "        " });
            }
            if opts.show_opcodes {
                out.push_str(if opts.use_tabs { "\t\t" } else { "            " });
            }
            out.push_str("label_");
            if opts.classic {
                out.push_str(&format!("{:04X}", address & 0xFFFF));
            } else {
                out.push_str(&format!("{:06X}", address));
            }
            out.push_str(":\n");
        }

        if opts.show_addresses {
            if opts.classic {
                out.push_str(&format!("{:04X}", address));
            } else {
                out.push_str(&format!("{:06X}", address));
            }
            out.push(':');
            if opts.use_tabs {
                out.push('\t');
            } else {
                out.push_str(if opts.classic { "   " } else { " " });
            }
        }

        if opts.show_opcodes {
            for i in 0..ins.length {
                out.push_str(&format!("{:02X}", data[ins.start + i]));
            }
            if opts.use_tabs {
                if ins.length > 3 {
                    out.push('\t');
                }
                out.push('\t');
            } else {
                let pad = 14usize.saturating_sub(2 * ins.length);
                out.push_str(&" ".repeat(pad));
            }
        } else {
            out.push_str(if opts.use_tabs { "\t" } else { "    " });
        }

        out.push_str(&ins.mnemonic);
        out.push_str(&ins.suffix);
        if opts.align_operands {
            if opts.use_tabs {
                out.push('\t');
            } else {
                let used = ins.mnemonic.len() + ins.suffix.len();
                let pad = if used < 10 { 10 - used } else { 3 };
                out.push_str(&" ".repeat(pad));
            }
        } else {
            out.push(' ');
        }
        out.push_str(&ins.operands);
        out.push('\n');
    }
    out
}

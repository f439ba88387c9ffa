use anyhow::{bail, Context, Result};
use clap::Parser;
use disasm_core::hex::HexInput;
use disasm_core::{decode_all, listing};
use std::fs;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "ezdisasm")]
#[command(about = "eZ80/Z80 disassembler", long_about = None)]
struct Args {
    /// Base address of the first byte (hex)
    #[arg(short = 'b', long = "base", value_name = "ADDR")]
    base: Option<String>,

    /// Read hex text from a file instead of the command line
    #[arg(short = 'i', long = "input", value_name = "FILE", conflicts_with = "binary")]
    input: Option<PathBuf>,

    /// Read raw binary from a file instead of the command line
    #[arg(short = 'I', long = "binary", value_name = "FILE")]
    binary: Option<PathBuf>,

    /// Decode classic Z80 (disables the eZ80 extensions)
    #[arg(short = 'E', long = "classic")]
    classic: bool,

    /// Use 16-bit immediates (eZ80 short mode; implied by --classic)
    #[arg(short = 'A', long = "short")]
    short: bool,

    /// Do not generate labels for branch targets
    #[arg(short = 'L', long = "no-labels")]
    no_labels: bool,

    /// Do not print the opcode hex column
    #[arg(short = 'X', long = "no-opcodes")]
    no_opcodes: bool,

    /// Do not align the operand column
    #[arg(short = 'T', long = "no-align")]
    no_align: bool,

    /// Separate columns with tabs instead of spaces
    #[arg(short = 'S', long = "tabs")]
    tabs: bool,

    /// Print instruction addresses
    #[arg(short = 'D', long = "addresses")]
    addresses: bool,

    /// Hex string to disassemble, with an optional leading "ADDR:" base
    /// marker (e.g. "D00100: 3E 01 C9")
    #[arg(
        value_name = "HEX",
        required_unless_present_any = ["input", "binary"],
        conflicts_with_all = ["input", "binary"]
    )]
    hex: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut base_address = match args.base.as_deref() {
        Some(text) => Some(parse_hex_address(text)?),
        None => None,
    };

    let data = if let Some(path) = args.binary.as_ref() {
        fs::read(path).with_context(|| format!("failed to read {}", path.display()))?
    } else {
        let text = match args.input.as_ref() {
            Some(path) => fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?,
            None => args.hex.clone().unwrap_or_default(),
        };
        let parsed = HexInput::parse(&text);
        if let Some(marker) = parsed.base_address {
            if base_address.is_some() {
                bail!("the input's base-address marker conflicts with --base");
            }
            base_address = Some(marker);
        }
        parsed.bytes
    };
    if data.is_empty() {
        bail!("no instruction bytes in input");
    }

    let classic = args.classic;
    let adl = !args.short && !classic;
    let add_labels = !args.no_labels;
    let (label_prefix, loc_prefix) = if add_labels { ("label_", "loc_") } else { ("", "") };
    let base = base_address.unwrap_or(0);

    let instrs = decode_all(
        &data,
        base,
        base_address.is_some(),
        adl,
        classic,
        label_prefix,
        loc_prefix,
    );
    let opts = listing::Options {
        show_addresses: args.addresses,
        show_opcodes: !args.no_opcodes,
        align_operands: !args.no_align,
        use_tabs: args.tabs,
        add_labels,
        classic,
        base_address: base,
    };
    print!("{}", listing::render(&data, &instrs, &opts));

    Ok(())
}

fn parse_hex_address(text: &str) -> Result<i32> {
    let digits = text.trim().trim_start_matches("0x");
    i32::from_str_radix(digits, 16).with_context(|| format!("invalid base address {}", text))
}

//! End-to-end tests: hex text in, listing out
//!
//! Drives the same pipeline as the command line: parse a hex input string
//! (with its optional base-address marker), decode, collect branch targets,
//! render the listing.

use crate::decoder::{decode_all, INCOMPLETE_MNEMONIC};
use crate::hex::HexInput;
use crate::listing::{branch_targets, render, Options};

#[test]
fn test_hex_to_listing_with_labels() {
    let input = HexInput::parse("000100: 3E 01 18 00 C9 C3 00 01 00");
    assert_eq!(input.base_address, Some(0x000100));
    assert_eq!(input.bytes.len(), 9);

    let base = input.base_address.unwrap();
    let instrs = decode_all(&input.bytes, base, true, true, false, "label_", "loc_");
    assert_eq!(instrs.len(), 4);

    // jr +0 resolves to the ret, jp to the block start
    let targets = branch_targets(&instrs);
    assert!(targets.contains(&0x000104));
    assert!(targets.contains(&0x000100));

    let text = render(
        &input.bytes,
        &instrs,
        &Options {
            base_address: base,
            ..Options::default()
        },
    );
    let lines: Vec<&str> = text.lines().collect();
    let expected = [
        "            label_000100:",
        "3E01          ld        a, 01",
        "1800          jr        label_000104",
        "            label_000104:",
        "C9            ret       ",
        "C3000100      jp        label_000100",
    ];
    assert_eq!(lines, expected);
}

#[test]
fn test_classic_tab_listing_with_addresses() {
    let input = HexInput::parse("8000:C9");
    let base = input.base_address.unwrap();
    let instrs = decode_all(&input.bytes, base, true, false, true, "label_", "loc_");
    let text = render(
        &input.bytes,
        &instrs,
        &Options {
            show_addresses: true,
            use_tabs: true,
            classic: true,
            base_address: base,
            ..Options::default()
        },
    );
    assert_eq!(text, "8000:\tC9\tret\t\n");
}

#[test]
fn test_no_label_mode_renders_bare_addresses() {
    let input = HexInput::parse("C3 00 01 00");
    let instrs = decode_all(&input.bytes, 0, false, true, false, "", "");
    let text = render(
        &input.bytes,
        &instrs,
        &Options {
            add_labels: false,
            ..Options::default()
        },
    );
    assert_eq!(text, "C3000100      jp        000100\n");
}

#[test]
fn test_truncated_input_still_renders() {
    let input = HexInput::parse("00 CD 00");
    let instrs = decode_all(&input.bytes, 0, false, true, false, "label_", "loc_");
    assert_eq!(instrs.len(), 2);
    assert_eq!(instrs[1].mnemonic, INCOMPLETE_MNEMONIC);
    assert_eq!(instrs[1].length, 2);

    let text = render(&input.bytes, &instrs, &Options::default());
    assert!(text.contains(INCOMPLETE_MNEMONIC));
    // Both lines present, nothing panicked on the sentinel
    assert_eq!(text.lines().count(), 2);
}

//! Mode and range behavior tests
//!
//! Tests for:
//! - ADL addressing-mode override prefixes and "last prefix wins"
//! - eZ80/classic mode gating
//! - Incomplete-tail handling and decode-range properties

use super::*;

// ========== Addressing-Mode Overrides ==========

#[test]
fn test_override_suffixes() {
    let ins = first(&[0x40, 0x00], true, false);
    assert_eq!(ins.text(), "nop.sis");
    assert_eq!(ins.length, 2);

    // .sis forces short immediates even in ADL mode
    let ins = first(&[0x40, 0x21, 0x34, 0x12], true, false);
    assert_eq!(ins.text(), "ld.sis hl, 1234");
    assert_eq!(ins.length, 4);

    // .lil forces long immediates even in short mode
    let ins = first(&[0x5B, 0x21, 0x56, 0x34, 0x12], false, false);
    assert_eq!(ins.text(), "ld.lil hl, 123456");
    assert_eq!(ins.length, 5);
}

#[test]
fn test_lis_reads_long_displays_short() {
    // .lis consumes a 3-byte immediate but renders at 4-digit width
    let ins = first(&[0x49, 0x21, 0x34, 0x12, 0x00], true, false);
    assert_eq!(ins.text(), "ld.lis hl, 1234");
    assert_eq!(ins.length, 5);
}

#[test]
fn test_sil_reads_short_displays_long() {
    let ins = first(&[0x52, 0x21, 0x34, 0x12], true, false);
    assert_eq!(ins.text(), "ld.sil hl, 001234");
    assert_eq!(ins.length, 4);
}

#[test]
fn test_override_applies_to_index_prefix() {
    let ins = first(&[0x5B, 0xDD, 0x21, 0x56, 0x34, 0x12], false, false);
    assert_eq!(ins.text(), "ld.lil ix, 123456");
    assert_eq!(ins.length, 6);
}

#[test]
fn test_override_then_override_is_noni() {
    // Last prefix wins: the first override becomes a one-byte NONI record
    // (keeping its suffix text) and the second starts a fresh instruction
    let instrs = decode_bytes(&[0x5B, 0x49, 0x00], true, false);
    assert_eq!(instrs.len(), 2);
    assert_eq!(instrs[0].mnemonic, "NONI");
    assert_eq!(instrs[0].suffix, ".lil");
    assert_eq!(instrs[0].start, 0);
    assert_eq!(instrs[0].length, 1);
    assert_eq!(instrs[1].start, 1);
    assert_eq!(instrs[1].text(), "nop.lis");
    assert_eq!(instrs[1].length, 2);
}

#[test]
fn test_override_then_register_load_is_noni() {
    // Any x=1 byte after an active override nullifies it, including plain
    // ld r, r' forms
    let instrs = decode_bytes(&[0x40, 0x41], true, false);
    assert_eq!(instrs.len(), 2);
    assert_eq!(instrs[0].mnemonic, "NONI");
    assert_eq!(instrs[0].length, 1);
    assert_eq!(instrs[1].text(), "ld b, c");
}

#[test]
fn test_overrides_are_plain_loads_in_classic_mode() {
    assert_eq!(classic_text(&[0x40]), "ld b, b");
    assert_eq!(classic_text(&[0x49]), "ld c, c");
    assert_eq!(classic_text(&[0x52]), "ld d, d");
    assert_eq!(classic_text(&[0x5B]), "ld e, e");
}

// ========== Index-Prefix Nullification ==========

#[test]
fn test_double_index_prefix_is_noni() {
    let instrs = decode_bytes(&[0xDD, 0xDD, 0xE5], true, false);
    assert_eq!(instrs.len(), 2);
    assert_eq!(instrs[0].mnemonic, "NONI");
    assert_eq!(instrs[0].length, 1);
    assert_eq!(instrs[1].text(), "push ix");
    assert_eq!(instrs[1].start, 1);
    assert_eq!(instrs[1].length, 2);
}

#[test]
fn test_index_prefix_before_ed_is_noni() {
    // Index registers are forbidden on the ED block
    let instrs = decode_bytes(&[0xDD, 0xED, 0x44], true, false);
    assert_eq!(instrs.len(), 2);
    assert_eq!(instrs[0].mnemonic, "NONI");
    assert_eq!(instrs[1].text(), "neg");
}

#[test]
fn test_index_ez80_forms_are_noni_in_classic_mode() {
    // DD 31 is ld iy, (ix + d) on the eZ80; classic reprocesses the 31
    let instrs = decode_bytes(&[0xDD, 0x31, 0x34, 0x12], false, true);
    assert_eq!(instrs.len(), 2);
    assert_eq!(instrs[0].mnemonic, "NONI");
    assert_eq!(instrs[0].length, 1);
    assert_eq!(instrs[1].text(), "ld sp, 1234");
}

// ========== Mode Gating ==========

#[test]
fn test_ed_x0_quadrant_gating() {
    // ED 31 is the iy load on the eZ80 and undefined on the classic Z80
    assert_eq!(adl_text(&[0xED, 0x31]), "ld iy, (hl)");
    assert_eq!(classic_text(&[0xED, 0x31]), "NONI \\ NOP");

    // in0 consumes its port byte on the eZ80 only
    let ins = first(&[0xED, 0x38, 0x10], true, false);
    assert_eq!(ins.text(), "in0 a, (10)");
    assert_eq!(ins.length, 3);
    let ins = first(&[0xED, 0x38, 0x10], false, true);
    assert_eq!(ins.text(), "NONI \\ NOP");
    assert_eq!(ins.length, 2);
}

#[test]
fn test_ez80_only_ed_encodings_in_classic_mode() {
    // A sweep over ED bytes that decode to eZ80-only instructions: classic
    // mode must resolve every one of them to an undefined marker instead
    let ez80_only: [u8; 12] = [
        0x00, 0x23, 0x31, 0x3E, // in0/lea/iy forms (x=0 quadrant)
        0x4C, 0x65, 0x6D, 0x76, // mlt/pea/ld mb/slp
        0x84, 0xB4, 0xC7, 0xCB, // extended block ops
    ];
    for b in ez80_only {
        let classic = first(&[0xED, b, 0x00], false, true);
        assert!(
            classic.mnemonic == "NONI \\ NOP"
                || classic.mnemonic == "neg"
                || classic.mnemonic == "retn"
                || classic.mnemonic == "im",
            "ED {:02X} decoded to {:?} in classic mode",
            b,
            classic.mnemonic
        );
        let ez80 = first(&[0xED, b, 0x00], true, false);
        assert_ne!(ez80.mnemonic, "NONI \\ NOP", "ED {:02X} in eZ80 mode", b);
        assert_ne!(ez80.mnemonic, "OPCODETRAP", "ED {:02X} in eZ80 mode", b);
    }
}

#[test]
fn test_classic_relative_branch_masks_to_16_bits() {
    // Wrap past the top of the 64K space
    let instrs = decode(&[0x18, 0x02], 0, 1, 0xFFFE, true, false, true, "", "");
    assert_eq!(instrs[0].branch_target, 0x0002);
    assert_eq!(instrs[0].text(), "jr 0002");
}

#[test]
fn test_adl_relative_branch_is_24_bit() {
    let instrs = decode(&[0x18, 0x02], 0, 1, 0xD00100, true, true, false, "", "");
    assert_eq!(instrs[0].branch_target, 0xD00104);
    assert_eq!(instrs[0].text(), "jr D00104");
}

// ========== Incomplete Tails ==========

#[test]
fn test_incomplete_call_at_end() {
    let instrs = decode_bytes(&[0xCD], true, false);
    assert_eq!(instrs.len(), 1);
    assert_eq!(instrs[0].mnemonic, INCOMPLETE_MNEMONIC);
    assert_eq!(instrs[0].length, 1);
    assert!(!instrs[0].is_branch);
    assert!(instrs[0].operands.is_empty());
}

#[test]
fn test_incomplete_word_keeps_partial_length() {
    // ld bc, nn with only one immediate byte present
    let instrs = decode_bytes(&[0x01, 0x34], true, false);
    assert_eq!(instrs.len(), 1);
    assert_eq!(instrs[0].mnemonic, INCOMPLETE_MNEMONIC);
    assert_eq!(instrs[0].length, 2);
}

#[test]
fn test_incomplete_index_cb() {
    let instrs = decode_bytes(&[0xDD, 0xCB, 0x05], true, false);
    assert_eq!(instrs.len(), 1);
    assert_eq!(instrs[0].mnemonic, INCOMPLETE_MNEMONIC);
    assert_eq!(instrs[0].length, 3);
}

#[test]
fn test_incomplete_after_valid_instructions() {
    let instrs = decode_bytes(&[0x00, 0xC9, 0x3E], true, false);
    assert_eq!(instrs.len(), 3);
    assert_eq!(instrs[0].text(), "nop");
    assert_eq!(instrs[1].text(), "ret");
    assert_eq!(instrs[2].mnemonic, INCOMPLETE_MNEMONIC);
    assert_eq!(instrs[2].start, 2);
    assert_eq!(instrs[2].length, 1);
}

#[test]
fn test_decode_range_bounds_reads() {
    // Bytes past the requested range must not be consumed
    let data = [0xCD, 0x00, 0x80, 0x00, 0xC9];
    let instrs = decode(&data, 0, 0, 0, false, true, false, "", "");
    assert_eq!(instrs.len(), 1);
    assert_eq!(instrs[0].mnemonic, INCOMPLETE_MNEMONIC);
    assert_eq!(instrs[0].length, 1);

    // The same bytes decode fully when the range allows it
    let instrs = decode(&data, 0, 4, 0, false, true, false, "", "");
    assert_eq!(instrs.len(), 2);
    assert_eq!(instrs[0].text(), "call 008000");
    assert_eq!(instrs[1].text(), "ret");
}

#[test]
fn test_decode_subrange() {
    let data = [0xC9, 0x3E, 0x01, 0xC9];
    let instrs = decode(&data, 1, 3, 0, false, true, false, "", "");
    assert_eq!(instrs.len(), 2);
    assert_eq!(instrs[0].start, 1);
    assert_eq!(instrs[0].text(), "ld a, 01");
    assert_eq!(instrs[1].text(), "ret");
}

#[test]
fn test_empty_input() {
    assert!(decode_all(&[], 0, false, true, false, "", "").is_empty());
    // start past end yields nothing
    assert!(decode(&[0x00], 1, 0, 0, false, true, false, "", "").is_empty());
}

// ========== Range Properties ==========

/// Sum of record lengths must equal the range size, with contiguous,
/// non-overlapping starts, for any input.
fn assert_partition(data: &[u8], adl: bool, classic: bool) {
    let instrs = decode_bytes(data, adl, classic);
    let mut expected_start = 0usize;
    for ins in &instrs {
        assert_eq!(
            ins.start, expected_start,
            "gap or overlap at {:#04X} in {:02X?}",
            ins.start, data
        );
        assert!(ins.length > 0, "zero-length record in {:02X?}", data);
        expected_start += ins.length;
    }
    assert_eq!(expected_start, data.len(), "total length of {:02X?}", data);
}

#[test]
fn test_total_length_partition() {
    // Every byte value once, ascending and descending
    let mut ascending = [0u8; 256];
    for (i, b) in ascending.iter_mut().enumerate() {
        *b = i as u8;
    }
    let mut descending = [0u8; 256];
    for (i, b) in descending.iter_mut().enumerate() {
        *b = 255 - i as u8;
    }
    // A pseudo-random but fixed pattern
    let mut blob = [0u8; 512];
    let mut state: u32 = 0x2545_F491;
    for b in blob.iter_mut() {
        state = state.wrapping_mul(1_103_515_245).wrapping_add(12_345);
        *b = (state >> 16) as u8;
    }

    let samples: [&[u8]; 8] = [
        &[0x00],
        &[0x3E, 0x01, 0xC9],
        // Prefix-heavy: overrides, double prefixes, index CB
        &[0x5B, 0x49, 0xDD, 0xDD, 0xCB, 0x05, 0x06, 0xC9],
        // ED block and gaps
        &[0xED, 0x31, 0xED, 0xFF, 0xED, 0xA0],
        // Truncated tail
        &[0x00, 0xDD, 0x21, 0x34],
        &ascending,
        &descending,
        &blob,
    ];

    for data in samples {
        assert_partition(data, true, false);
        assert_partition(data, false, false);
        assert_partition(data, false, true);
    }
}

#[test]
fn test_determinism() {
    let mut blob = [0u8; 256];
    let mut state: u32 = 0xDEAD_BEEF;
    for b in blob.iter_mut() {
        state = state.wrapping_mul(1_103_515_245).wrapping_add(12_345);
        *b = (state >> 16) as u8;
    }
    let a = decode_all(&blob, 0x8000, true, true, false, "label_", "loc_");
    let b = decode_all(&blob, 0x8000, true, true, false, "label_", "loc_");
    assert_eq!(a, b);
}

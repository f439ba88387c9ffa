//! eZ80/Z80 Disassembler Core
//!
//! This crate provides a platform-agnostic disassembler core with a stable
//! C ABI. No OS APIs are used - all I/O is done through byte buffers and
//! returned strings.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//! - `decoder`: table-driven eZ80/Z80 instruction decoding
//! - `listing`: branch-target collection and text listing rendering
//! - `hex`: hex-string input parsing with an optional base-address marker
//!
//! A clap-based command line (`ezdisasm`, feature `cli`) and wasm bindings
//! (`wasm32` targets) sit on top of the same three modules.
//!
//! # Opcode space
//!
//! | First byte        | Table                                    |
//! |-------------------|------------------------------------------|
//! | 0xCB              | Rotate/shift/bit operations              |
//! | 0xED              | Extended block (I/O, eZ80 extensions)    |
//! | 0xDD / 0xFD       | ix / iy indexed forms                    |
//! | 0x40/49/52/5B     | ADL mode overrides (eZ80 mode, x=1 only) |
//! | anything else     | Primary table                            |

pub mod decoder;
pub mod hex;
pub mod listing;

#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use wasm::*;

#[cfg(test)]
mod listing_integration_test;

use std::ffi::CString;
use std::os::raw::c_char;
use std::ptr;
use std::slice;

pub use decoder::{decode, decode_all, Instruction, INCOMPLETE_MNEMONIC};
pub use hex::HexInput;
pub use listing::{branch_targets, render, Options};

/// Decode classic Z80 only (disables the eZ80 extensions).
pub const DIS_FLAG_CLASSIC: u32 = 1 << 0;
/// Use 16-bit immediates (eZ80 short mode; implied by CLASSIC).
pub const DIS_FLAG_SHORT_IMM: u32 = 1 << 1;
/// Do not generate labels for branch targets.
pub const DIS_FLAG_NO_LABELS: u32 = 1 << 2;
/// Do not include the opcode hex column.
pub const DIS_FLAG_NO_OPCODES: u32 = 1 << 3;
/// Include an address column.
pub const DIS_FLAG_ADDRESSES: u32 = 1 << 4;
/// Separate columns with tabs instead of space padding.
pub const DIS_FLAG_TABS: u32 = 1 << 5;

fn listing_for(data: &[u8], base_address: i32, flags: u32) -> String {
    let classic = flags & DIS_FLAG_CLASSIC != 0;
    let adl = !classic && flags & DIS_FLAG_SHORT_IMM == 0;
    let labels = flags & DIS_FLAG_NO_LABELS == 0;
    let (label_prefix, loc_prefix) = if labels { ("label_", "loc_") } else { ("", "") };

    let instrs = decode_all(
        data,
        base_address,
        false,
        adl,
        classic,
        label_prefix,
        loc_prefix,
    );
    let opts = Options {
        show_addresses: flags & DIS_FLAG_ADDRESSES != 0,
        show_opcodes: flags & DIS_FLAG_NO_OPCODES == 0,
        align_operands: true,
        use_tabs: flags & DIS_FLAG_TABS != 0,
        add_labels: labels,
        classic,
        base_address,
    };
    render(data, &instrs, &opts)
}

/// Render a disassembly listing for `len` bytes at `data`.
/// Returns a heap-allocated NUL-terminated string owned by the caller, who
/// must release it with dis_free_listing(). Returns null if `data` is null.
#[cfg_attr(not(feature = "ios_prefixed"), no_mangle)]
#[cfg_attr(feature = "ios_prefixed", export_name = "rust_dis_render_listing")]
pub extern "C" fn dis_render_listing(
    data: *const u8,
    len: usize,
    base_address: i32,
    flags: u32,
) -> *mut c_char {
    if data.is_null() {
        return ptr::null_mut();
    }
    let bytes = unsafe { slice::from_raw_parts(data, len) };
    let text = listing_for(bytes, base_address, flags);
    match CString::new(text) {
        Ok(s) => s.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

/// Release a string returned by dis_render_listing().
/// Safe to call with null pointer.
#[cfg_attr(not(feature = "ios_prefixed"), no_mangle)]
#[cfg_attr(feature = "ios_prefixed", export_name = "rust_dis_free_listing")]
pub extern "C" fn dis_free_listing(text: *mut c_char) {
    if !text.is_null() {
        unsafe {
            drop(CString::from_raw(text));
        }
    }
}

/// Count the instructions in `len` bytes at `data`.
/// Returns 0 if `data` is null.
#[cfg_attr(not(feature = "ios_prefixed"), no_mangle)]
#[cfg_attr(feature = "ios_prefixed", export_name = "rust_dis_instruction_count")]
pub extern "C" fn dis_instruction_count(data: *const u8, len: usize, flags: u32) -> usize {
    if data.is_null() {
        return 0;
    }
    let bytes = unsafe { slice::from_raw_parts(data, len) };
    let classic = flags & DIS_FLAG_CLASSIC != 0;
    let adl = !classic && flags & DIS_FLAG_SHORT_IMM == 0;
    decode_all(bytes, 0, false, adl, classic, "", "").len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CStr;

    #[test]
    fn test_render_null_input() {
        assert!(dis_render_listing(ptr::null(), 0, 0, 0).is_null());
        assert_eq!(dis_instruction_count(ptr::null(), 0, 0), 0);
        // Freeing null is a no-op
        dis_free_listing(ptr::null_mut());
    }

    #[test]
    fn test_render_round_trip() {
        let data = [0x3E, 0x01, 0xC9];
        let text = dis_render_listing(data.as_ptr(), data.len(), 0, 0);
        assert!(!text.is_null());
        let listing = unsafe { CStr::from_ptr(text) }.to_str().unwrap().to_owned();
        dis_free_listing(text);
        assert!(listing.contains("ld        a, 01"));
        assert!(listing.contains("ret"));
    }

    #[test]
    fn test_render_flags() {
        let data = [0xED, 0x31];
        let text = dis_render_listing(data.as_ptr(), data.len(), 0, DIS_FLAG_CLASSIC);
        assert!(!text.is_null());
        let listing = unsafe { CStr::from_ptr(text) }.to_str().unwrap().to_owned();
        dis_free_listing(text);
        assert!(listing.contains("NONI \\ NOP"));

        let text = dis_render_listing(data.as_ptr(), data.len(), 0, 0);
        let listing = unsafe { CStr::from_ptr(text) }.to_str().unwrap().to_owned();
        dis_free_listing(text);
        assert!(listing.contains("ld        iy, (hl)"));
    }

    #[test]
    fn test_instruction_count() {
        let data = [0x00, 0x3E, 0x01, 0xC9];
        assert_eq!(dis_instruction_count(data.as_ptr(), data.len(), 0), 3);
    }
}

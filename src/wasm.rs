//! WebAssembly bindings for the eZ80/Z80 disassembler
//!
//! This module provides JavaScript-friendly APIs using wasm-bindgen.

use crate::decoder;
use crate::listing;
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = console)]
    fn log(s: &str);
}

/// WASM-friendly wrapper holding the decode and layout options.
/// Unlike the C FFI this is a plain owned object - WASM is single-threaded,
/// so no synchronization is needed.
#[wasm_bindgen]
pub struct WasmDisasm {
    base_address: i32,
    adl: bool,
    classic: bool,
    labels: bool,
    addresses: bool,
    tabs: bool,
}

#[wasm_bindgen]
impl WasmDisasm {
    /// Create a disassembler with eZ80 ADL defaults.
    #[wasm_bindgen(constructor)]
    pub fn new() -> WasmDisasm {
        // Set up console panic hook for better error messages
        console_error_panic_hook::set_once();

        WasmDisasm {
            base_address: 0,
            adl: true,
            classic: false,
            labels: true,
            addresses: false,
            tabs: false,
        }
    }

    /// Set the address of the first buffer byte.
    #[wasm_bindgen]
    pub fn set_base_address(&mut self, base_address: i32) {
        self.base_address = base_address;
    }

    /// Select ADL (24-bit immediate) decoding.
    #[wasm_bindgen]
    pub fn set_adl(&mut self, adl: bool) {
        self.adl = adl;
    }

    /// Select classic Z80 decoding; this also drops back to 16-bit
    /// immediates.
    #[wasm_bindgen]
    pub fn set_classic(&mut self, classic: bool) {
        self.classic = classic;
        if classic {
            self.adl = false;
        }
    }

    /// Enable or disable label generation for branch targets.
    #[wasm_bindgen]
    pub fn set_labels(&mut self, labels: bool) {
        self.labels = labels;
    }

    /// Enable or disable the address column.
    #[wasm_bindgen]
    pub fn set_addresses(&mut self, addresses: bool) {
        self.addresses = addresses;
    }

    /// Separate listing columns with tabs instead of space padding.
    #[wasm_bindgen]
    pub fn set_tabs(&mut self, tabs: bool) {
        self.tabs = tabs;
    }

    /// Disassemble a byte buffer into a text listing.
    #[wasm_bindgen]
    pub fn listing(&self, data: &[u8]) -> String {
        log(&format!("[WASM] listing: {} bytes", data.len()));
        let (label_prefix, loc_prefix) = if self.labels {
            ("label_", "loc_")
        } else {
            ("", "")
        };
        let instrs = decoder::decode_all(
            data,
            self.base_address,
            false,
            self.adl,
            self.classic,
            label_prefix,
            loc_prefix,
        );
        let opts = listing::Options {
            show_addresses: self.addresses,
            show_opcodes: true,
            align_operands: true,
            use_tabs: self.tabs,
            add_labels: self.labels,
            classic: self.classic,
            base_address: self.base_address,
        };
        listing::render(data, &instrs, &opts)
    }

    /// Number of instructions in the buffer.
    #[wasm_bindgen]
    pub fn instruction_count(&self, data: &[u8]) -> usize {
        decoder::decode_all(
            data,
            self.base_address,
            false,
            self.adl,
            self.classic,
            "",
            "",
        )
        .len()
    }
}

impl Default for WasmDisasm {
    fn default() -> Self {
        Self::new()
    }
}

//! Program image loading.
//!
//! Two formats are supported:
//! 1. **Hex records** in the Verilog `$readmemh` style: optional `@index`
//!    lines select a 32-bit word index relative to the memory base, followed
//!    by whitespace-separated hex words placed consecutively. `//` comments
//!    are ignored.
//! 2. **Flat binaries**, copied byte-for-byte to the memory base.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::common::AccessFault;
use crate::mem::MainMemory;

/// Errors raised while loading a program image.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The image file could not be read.
    #[error("failed to read image: {0}")]
    Io(#[from] std::io::Error),
    /// A hex record line could not be parsed.
    #[error("bad hex record on line {line}: {token:?}")]
    Parse {
        /// 1-based line number.
        line: usize,
        /// Offending token.
        token: String,
    },
    /// The image does not fit in mapped memory.
    #[error(transparent)]
    Fault(#[from] AccessFault),
}

/// Loads a hex-record image from text into memory.
pub fn load_hex(mem: &mut MainMemory, text: &str) -> Result<(), LoadError> {
    let base = mem.base();
    let mut word_index: u32 = 0;

    for (lineno, raw_line) in text.lines().enumerate() {
        let line = raw_line.split("//").next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }
        for token in line.split_whitespace() {
            if let Some(idx) = token.strip_prefix('@') {
                word_index = u32::from_str_radix(idx, 16).map_err(|_| LoadError::Parse {
                    line: lineno + 1,
                    token: token.to_string(),
                })?;
                continue;
            }
            let word = u32::from_str_radix(token, 16).map_err(|_| LoadError::Parse {
                line: lineno + 1,
                token: token.to_string(),
            })?;
            mem.write_u32(base + word_index * 4, word)?;
            word_index += 1;
        }
    }
    Ok(())
}

/// Loads a hex-record image file into memory.
pub fn load_hex_file(mem: &mut MainMemory, path: impl AsRef<Path>) -> Result<(), LoadError> {
    let text = fs::read_to_string(path)?;
    load_hex(mem, &text)
}

/// Loads a flat binary file at the memory base.
pub fn load_binary_file(mem: &mut MainMemory, path: impl AsRef<Path>) -> Result<(), LoadError> {
    let bytes = fs::read(path)?;
    mem.load_image(mem.base(), &bytes)?;
    Ok(())
}

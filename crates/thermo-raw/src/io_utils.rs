//! Binary reading utilities for decoding Finnigan/Thermo RAW structures.
//!
//! Every multi-byte value in the format is little-endian; strings are either
//! a fixed-length run of UTF-16LE code units or a "PascalStringWin32": an
//! `i32` code-unit count followed by that many `u16` code units.

use crate::RawError;
use byteorder::{LittleEndian, ReadBytesExt};
use std::io::Cursor;

/// A cursor wrapper for reading binary data from a byte slice.
pub struct BinaryReader<'a> {
    cursor: Cursor<&'a [u8]>,
}

impl<'a> BinaryReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            cursor: Cursor::new(data),
        }
    }

    /// Create a reader starting at a specific offset.
    pub fn at_offset(data: &'a [u8], offset: u64) -> Self {
        let mut cursor = Cursor::new(data);
        cursor.set_position(offset);
        Self { cursor }
    }

    pub fn position(&self) -> u64 {
        self.cursor.position()
    }

    pub fn set_position(&mut self, pos: u64) {
        self.cursor.set_position(pos);
    }

    pub fn remaining(&self) -> usize {
        let pos = self.cursor.position() as usize;
        let len = self.cursor.get_ref().len();
        len.saturating_sub(pos)
    }

    pub fn read_u8(&mut self) -> Result<u8, RawError> {
        self.cursor.read_u8().map_err(RawError::IoError)
    }

    pub fn read_u16(&mut self) -> Result<u16, RawError> {
        self.cursor
            .read_u16::<LittleEndian>()
            .map_err(RawError::IoError)
    }

    pub fn read_u32(&mut self) -> Result<u32, RawError> {
        self.cursor
            .read_u32::<LittleEndian>()
            .map_err(RawError::IoError)
    }

    pub fn read_i32(&mut self) -> Result<i32, RawError> {
        self.cursor
            .read_i32::<LittleEndian>()
            .map_err(RawError::IoError)
    }

    pub fn read_u64(&mut self) -> Result<u64, RawError> {
        self.cursor
            .read_u64::<LittleEndian>()
            .map_err(RawError::IoError)
    }

    pub fn read_i64(&mut self) -> Result<i64, RawError> {
        self.cursor
            .read_i64::<LittleEndian>()
            .map_err(RawError::IoError)
    }

    pub fn read_f32(&mut self) -> Result<f32, RawError> {
        self.cursor
            .read_f32::<LittleEndian>()
            .map_err(RawError::IoError)
    }

    pub fn read_f64(&mut self) -> Result<f64, RawError> {
        self.cursor
            .read_f64::<LittleEndian>()
            .map_err(RawError::IoError)
    }

    /// Read N bytes into a new Vec.
    pub fn read_bytes(&mut self, n: usize) -> Result<Vec<u8>, RawError> {
        let pos = self.cursor.position() as usize;
        let data = self.cursor.get_ref();
        if pos + n > data.len() {
            return Err(RawError::MalformedFile(format!(
                "tried to read {} bytes at offset {}, but only {} available",
                n,
                pos,
                data.len().saturating_sub(pos)
            )));
        }
        let result = data[pos..pos + n].to_vec();
        self.cursor.set_position((pos + n) as u64);
        Ok(result)
    }

    /// Skip N bytes.
    pub fn skip(&mut self, n: usize) -> Result<(), RawError> {
        let new_pos = self.cursor.position() + n as u64;
        if new_pos > self.cursor.get_ref().len() as u64 {
            return Err(RawError::MalformedFile(format!(
                "tried to skip to offset {}, but file is only {} bytes",
                new_pos,
                self.cursor.get_ref().len()
            )));
        }
        self.cursor.set_position(new_pos);
        Ok(())
    }

    /// Read a fixed-size UTF-16LE string (size in bytes, not code units).
    /// Trailing NUL padding is trimmed; no terminator is assumed to be present.
    pub fn read_utf16_fixed(&mut self, byte_len: usize) -> Result<String, RawError> {
        let bytes = self.read_bytes(byte_len)?;
        let u16s: Vec<u16> = bytes
            .chunks_exact(2)
            .map(|c| u16::from_le_bytes([c[0], c[1]]))
            .collect();
        Ok(String::from_utf16_lossy(&u16s)
            .trim_end_matches('\0')
            .to_string())
    }

    /// Read a PascalStringWin32: i32 code-unit count, then that many UTF-16LE units.
    /// `max_len` is a sanity cap on the code-unit count; exceeding it (or a
    /// negative length) is `MalformedFile`, not a panic.
    pub fn read_pascal_string(&mut self, max_len: i32) -> Result<String, RawError> {
        let len = self.read_i32()?;
        if len < 0 || len > max_len {
            return Err(RawError::MalformedFile(format!(
                "PascalString length {} out of bounds (max {})",
                len, max_len
            )));
        }
        if len == 0 {
            return Ok(String::new());
        }
        self.read_utf16_fixed(len as usize * 2)
    }

    /// Get a slice of the underlying data at the current position without advancing it.
    pub fn slice(&self, len: usize) -> Result<&'a [u8], RawError> {
        let pos = self.cursor.position() as usize;
        let data = self.cursor.get_ref();
        if pos + len > data.len() {
            return Err(RawError::MalformedFile(format!(
                "slice: requested {} bytes at {}, only {} available",
                len,
                pos,
                data.len().saturating_sub(pos)
            )));
        }
        Ok(&data[pos..pos + len])
    }

    /// Read an array of f64 values.
    pub fn read_f64_array(&mut self, count: usize) -> Result<Vec<f64>, RawError> {
        let mut result = Vec::with_capacity(count);
        for _ in 0..count {
            result.push(self.read_f64()?);
        }
        Ok(result)
    }
}

//! # Packet Buffer
//!
//! Owned byte buffer with an explicit read cursor, used by every serializer
//! call on the decode and encode paths.
//!
//! The cursor is a plain integer offset into owned storage, so rewinding
//! after a failed deserialize is a single index assignment — no streaming
//! replay machinery. Writes always append; reads advance the cursor and fail
//! with [`CodecError::UnexpectedEof`] instead of reading past the written
//! length.
//!
//! ## Wire Conventions
//! - Fixed-width integers are little-endian
//! - VarInts are unsigned LEB128 (max 5 bytes for 32-bit, 10 for 64-bit)
//! - Strings are VarInt length-prefixed UTF-8, capped at 32 KB

use crate::error::{CodecError, Result};
use bytes::{Buf, BufMut, Bytes, BytesMut};

/// Maximum length of a length-prefixed string (32 KB)
const MAX_STRING_LENGTH: usize = 32_768;

/// Max bytes for a 32-bit VarInt
const MAX_VARINT32_BYTES: usize = 5;

/// Max bytes for a 64-bit VarInt
const MAX_VARINT64_BYTES: usize = 10;

/// Byte buffer with append-writes and a rewindable read cursor.
#[derive(Debug, Default, Clone)]
pub struct PacketBuffer {
    data: BytesMut,
    reader_index: usize,
}

impl PacketBuffer {
    /// Create an empty buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty buffer with pre-allocated write capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: BytesMut::with_capacity(capacity),
            reader_index: 0,
        }
    }

    /// Create a buffer holding a copy of `bytes`, cursor at the start
    pub fn from_slice(bytes: &[u8]) -> Self {
        Self {
            data: BytesMut::from(bytes),
            reader_index: 0,
        }
    }

    /// Total number of bytes written so far
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether nothing has been written
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Current read cursor position
    pub fn reader_index(&self) -> usize {
        self.reader_index
    }

    /// Move the read cursor. Indices beyond the written length are clamped.
    pub fn set_reader_index(&mut self, index: usize) {
        self.reader_index = index.min(self.data.len());
    }

    /// Number of unread bytes
    pub fn remaining(&self) -> usize {
        self.data.len() - self.reader_index
    }

    /// Whether any unread bytes remain
    pub fn is_readable(&self) -> bool {
        self.remaining() > 0
    }

    /// The entire written contents, ignoring the read cursor
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    fn unread(&self) -> &[u8] {
        &self.data[self.reader_index..]
    }

    fn check_readable(&self, needed: usize) -> Result<()> {
        let remaining = self.remaining();
        if remaining < needed {
            return Err(CodecError::UnexpectedEof {
                needed: needed - remaining,
                remaining,
            });
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Writes (append at the end, never touch the read cursor)
    // ------------------------------------------------------------------

    pub fn write_u8(&mut self, value: u8) {
        self.data.put_u8(value);
    }

    pub fn write_u16(&mut self, value: u16) {
        self.data.put_u16_le(value);
    }

    pub fn write_u32(&mut self, value: u32) {
        self.data.put_u32_le(value);
    }

    pub fn write_u64(&mut self, value: u64) {
        self.data.put_u64_le(value);
    }

    pub fn write_bool(&mut self, value: bool) {
        self.data.put_u8(value as u8);
    }

    pub fn write_slice(&mut self, bytes: &[u8]) {
        self.data.put_slice(bytes);
    }

    /// Write an unsigned 32-bit LEB128 VarInt
    pub fn write_var_u32(&mut self, mut value: u32) {
        loop {
            let byte = (value & 0x7F) as u8;
            value >>= 7;
            if value == 0 {
                self.data.put_u8(byte);
                return;
            }
            self.data.put_u8(byte | 0x80);
        }
    }

    /// Write an unsigned 64-bit LEB128 VarInt
    pub fn write_var_u64(&mut self, mut value: u64) {
        loop {
            let byte = (value & 0x7F) as u8;
            value >>= 7;
            if value == 0 {
                self.data.put_u8(byte);
                return;
            }
            self.data.put_u8(byte | 0x80);
        }
    }

    /// Write a signed 32-bit VarInt (zigzag encoded)
    pub fn write_var_i32(&mut self, value: i32) {
        self.write_var_u32(((value << 1) ^ (value >> 31)) as u32);
    }

    /// Write a VarInt length-prefixed UTF-8 string
    pub fn write_string(&mut self, value: &str) -> Result<()> {
        let bytes = value.as_bytes();
        if bytes.len() > MAX_STRING_LENGTH {
            return Err(CodecError::StringTooLarge {
                len: bytes.len(),
                max: MAX_STRING_LENGTH,
            });
        }
        self.write_var_u32(bytes.len() as u32);
        self.data.put_slice(bytes);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Reads (advance the cursor, bounds-checked)
    // ------------------------------------------------------------------

    pub fn read_u8(&mut self) -> Result<u8> {
        self.check_readable(1)?;
        let value = self.data[self.reader_index];
        self.reader_index += 1;
        Ok(value)
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        self.check_readable(2)?;
        let value = self.unread().get_u16_le();
        self.reader_index += 2;
        Ok(value)
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        self.check_readable(4)?;
        let value = self.unread().get_u32_le();
        self.reader_index += 4;
        Ok(value)
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        self.check_readable(8)?;
        let value = self.unread().get_u64_le();
        self.reader_index += 8;
        Ok(value)
    }

    pub fn read_bool(&mut self) -> Result<bool> {
        Ok(self.read_u8()? != 0)
    }

    /// Read an unsigned 32-bit LEB128 VarInt
    pub fn read_var_u32(&mut self) -> Result<u32> {
        let mut value = 0u32;
        for i in 0..MAX_VARINT32_BYTES {
            let byte = self.read_u8()?;
            value |= u32::from(byte & 0x7F) << (i * 7);
            if byte & 0x80 == 0 {
                return Ok(value);
            }
        }
        Err(CodecError::VarIntTooLong {
            max_bytes: MAX_VARINT32_BYTES,
        })
    }

    /// Read an unsigned 64-bit LEB128 VarInt
    pub fn read_var_u64(&mut self) -> Result<u64> {
        let mut value = 0u64;
        for i in 0..MAX_VARINT64_BYTES {
            let byte = self.read_u8()?;
            value |= u64::from(byte & 0x7F) << (i * 7);
            if byte & 0x80 == 0 {
                return Ok(value);
            }
        }
        Err(CodecError::VarIntTooLong {
            max_bytes: MAX_VARINT64_BYTES,
        })
    }

    /// Read a signed 32-bit VarInt (zigzag encoded)
    pub fn read_var_i32(&mut self) -> Result<i32> {
        let raw = self.read_var_u32()?;
        Ok(((raw >> 1) as i32) ^ -((raw & 1) as i32))
    }

    /// Read a VarInt length-prefixed UTF-8 string
    pub fn read_string(&mut self) -> Result<String> {
        let len = self.read_var_u32()? as usize;
        if len > MAX_STRING_LENGTH {
            return Err(CodecError::StringTooLarge {
                len,
                max: MAX_STRING_LENGTH,
            });
        }
        let bytes = self.read_slice(len)?;
        Ok(String::from_utf8(bytes.to_vec())?)
    }

    /// Read exactly `len` bytes as an owned copy
    pub fn read_slice(&mut self, len: usize) -> Result<Bytes> {
        self.check_readable(len)?;
        let bytes = Bytes::copy_from_slice(&self.unread()[..len]);
        self.reader_index += len;
        Ok(bytes)
    }

    /// Read every unread byte as an owned copy.
    ///
    /// The copy never aliases this buffer's storage, so the buffer can be
    /// reused or recycled immediately afterwards.
    pub fn read_remaining(&mut self) -> Bytes {
        let bytes = Bytes::copy_from_slice(self.unread());
        self.reader_index = self.data.len();
        bytes
    }
}

impl From<Vec<u8>> for PacketBuffer {
    fn from(data: Vec<u8>) -> Self {
        Self::from_slice(&data)
    }
}

impl AsRef<[u8]> for PacketBuffer {
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}

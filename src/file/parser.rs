//! Low-level byte stream parser for metadata blob decoding.
//!
//! [`Parser`] is a cursor over a byte slice with bounds-checked reads of primitive values,
//! ECMA-335 compressed integers, `TypeDefOrRef` encoded tokens and `SerString` values. It is
//! used by the heap readers and by every blob decoder (signatures, custom attributes,
//! security declarations).
//!
//! ```rust
//! use cilmeta::Parser;
//!
//! let data = [0x0C, 0x80, 0x95, 0x01];
//! let mut parser = Parser::new(&data);
//!
//! assert_eq!(parser.read_compressed_uint()?, 0x0C);
//! assert_eq!(parser.read_compressed_uint()?, 0x95);
//! assert_eq!(parser.read_le::<u8>()?, 0x01);
//! # Ok::<(), cilmeta::Error>(())
//! ```

use crate::{
    file::io::{read_le_at, CilIO},
    metadata::token::Token,
    Error::OutOfBounds,
    Result,
};

/// A generic cursor-based parser for binary metadata.
pub struct Parser<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> Parser<'a> {
    /// Create a new `Parser` over `data`, starting at position 0
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Parser { data, position: 0 }
    }

    /// Returns the length of the underlying data
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the underlying data is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns true if there are unread bytes left
    #[must_use]
    pub fn has_more_data(&self) -> bool {
        self.position < self.data.len()
    }

    /// Returns the number of unread bytes
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.position)
    }

    /// Returns the current position
    #[must_use]
    pub fn pos(&self) -> usize {
        self.position
    }

    /// Move the cursor to `pos`
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if `pos` is past the end of the data.
    pub fn seek(&mut self, pos: usize) -> Result<()> {
        if pos > self.data.len() {
            return Err(OutOfBounds);
        }

        self.position = pos;
        Ok(())
    }

    /// Skip one byte
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if no data is left.
    pub fn advance(&mut self) -> Result<()> {
        if self.position >= self.data.len() {
            return Err(OutOfBounds);
        }

        self.position += 1;
        Ok(())
    }

    /// Peek at the current byte without advancing
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if no data is left.
    pub fn peek_byte(&self) -> Result<u8> {
        self.data.get(self.position).copied().ok_or(OutOfBounds)
    }

    /// Read a little-endian value of type `T` and advance
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if not enough data is left.
    pub fn read_le<T: CilIO>(&mut self) -> Result<T> {
        read_le_at(self.data, &mut self.position)
    }

    /// Read `length` raw bytes and advance
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if not enough data is left.
    pub fn read_bytes(&mut self, length: usize) -> Result<&'a [u8]> {
        let Some(end) = self.position.checked_add(length) else {
            return Err(OutOfBounds);
        };
        if end > self.data.len() {
            return Err(OutOfBounds);
        }

        let bytes = &self.data[self.position..end];
        self.position = end;
        Ok(bytes)
    }

    /// Read a compressed unsigned integer (ECMA-335 II.23.2)
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] on truncated input, or
    /// [`crate::Error::Malformed`] for an invalid leading byte.
    pub fn read_compressed_uint(&mut self) -> Result<u32> {
        let first_byte = self.read_le::<u8>()?;

        // 1-byte encoding: 0xxxxxxx
        if (first_byte & 0x80) == 0 {
            return Ok(u32::from(first_byte));
        }

        // 2-byte encoding: 10xxxxxx xxxxxxxx
        if (first_byte & 0xC0) == 0x80 {
            let second_byte = self.read_le::<u8>()?;
            let value = ((u32::from(first_byte) & 0x3F) << 8) | u32::from(second_byte);
            return Ok(value);
        }

        // 4-byte encoding: 110xxxxx xxxxxxxx xxxxxxxx xxxxxxxx
        if (first_byte & 0xE0) == 0xC0 {
            let b1 = u32::from(self.read_le::<u8>()?);
            let b2 = u32::from(self.read_le::<u8>()?);
            let b3 = u32::from(self.read_le::<u8>()?);
            let value = ((u32::from(first_byte) & 0x1F) << 24) | (b1 << 16) | (b2 << 8) | b3;
            return Ok(value);
        }

        Err(malformed_error!("Invalid compressed uint - {}", first_byte))
    }

    /// Read a compressed signed integer (ECMA-335 II.23.2)
    ///
    /// The sign bit is rotated into bit 0 of the 7, 14 or 29 bit payload.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] on truncated input, or
    /// [`crate::Error::Malformed`] for an invalid leading byte.
    #[allow(clippy::cast_possible_wrap)]
    pub fn read_compressed_int(&mut self) -> Result<i32> {
        let bits = match self.peek_byte()? {
            byte if byte & 0x80 == 0 => 7,
            byte if byte & 0xC0 == 0x80 => 14,
            _ => 29,
        };

        let value = self.read_compressed_uint()?;
        let magnitude = (value >> 1) as i32;
        if value & 1 == 0 {
            Ok(magnitude)
        } else {
            Ok(magnitude - (1 << (bits - 1)))
        }
    }

    /// Read a compressed `TypeDefOrRef` encoded token (ECMA-335 II.23.2.8)
    ///
    /// # Errors
    /// Returns an error on truncated input or an invalid table tag.
    pub fn read_compressed_token(&mut self) -> Result<Token> {
        let compressed_token = self.read_compressed_uint()?;

        let table: u32 = match compressed_token & 0x3 {
            0x0 => 0x0200_0000, // TypeDef
            0x1 => 0x0100_0000, // TypeRef
            0x2 => 0x1B00_0000, // TypeSpec
            _ => {
                return Err(malformed_error!(
                    "Invalid compressed token - {}",
                    compressed_token
                ))
            }
        };

        Ok(Token::new(table | (compressed_token >> 2)))
    }

    /// Read a `SerString`: compressed length followed by UTF-8 bytes, or `0xFF` for null
    ///
    /// # Errors
    /// Returns an error on truncated input or invalid UTF-8.
    pub fn read_ser_string(&mut self) -> Result<Option<String>> {
        if self.peek_byte()? == 0xFF {
            self.position += 1;
            return Ok(None);
        }

        let length = self.read_compressed_uint()? as usize;
        let bytes = self.read_bytes(length)?;
        match std::str::from_utf8(bytes) {
            Ok(value) => Ok(Some(value.to_string())),
            Err(_) => Err(malformed_error!("Invalid UTF-8 in SerString")),
        }
    }
}

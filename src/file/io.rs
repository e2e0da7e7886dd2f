//! Endian-aware primitive reads and writes on byte slices.
//!
//! Every table row, heap index and header field is read and written through these helpers.
//! They are bounds-checked and advance a caller-owned offset, which lets row definitions
//! describe their layout as a simple sequence of reads or writes.
//!
//! The `_dyn` variants read or write a `u32` as either 2 or 4 bytes; this is how heap indices,
//! simple table indices and coded indices switch between their small and large encodings.

use crate::{Error::OutOfBounds, Result};

/// Trait for implementing type-specific safe binary data reading operations.
///
/// Each implementation defines a `Bytes` associated type that represents the fixed-size
/// byte array required for that particular type (e.g., `[u8; 4]` for `u32`).
pub trait CilIO: Sized {
    /// Associated type representing the byte array type for this numeric type.
    type Bytes: Sized + AsRef<[u8]> + for<'a> TryFrom<&'a [u8]>;

    /// Read T from a byte buffer in little-endian
    fn from_le_bytes(bytes: Self::Bytes) -> Self;

    /// Write T to a byte buffer in little-endian
    fn to_le_bytes(self) -> Self::Bytes;
}

macro_rules! impl_cil_io {
    ($($ty:ty => $len:expr),* $(,)?) => {
        $(
            impl CilIO for $ty {
                type Bytes = [u8; $len];

                fn from_le_bytes(bytes: Self::Bytes) -> Self {
                    <$ty>::from_le_bytes(bytes)
                }

                fn to_le_bytes(self) -> Self::Bytes {
                    <$ty>::to_le_bytes(self)
                }
            }
        )*
    };
}

impl_cil_io!(
    u64 => 8,
    i64 => 8,
    u32 => 4,
    i32 => 4,
    u16 => 2,
    i16 => 2,
    u8 => 1,
    i8 => 1,
    f32 => 4,
    f64 => 8,
);

/// Safely reads T in little-endian from the start of a data buffer.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if the buffer is too small.
pub fn read_le<T: CilIO>(data: &[u8]) -> Result<T> {
    let mut offset = 0_usize;
    read_le_at(data, &mut offset)
}

/// Safely reads T in little-endian from a data buffer at `offset`, advancing the offset.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if the buffer is too small.
pub fn read_le_at<T: CilIO>(data: &[u8], offset: &mut usize) -> Result<T> {
    let type_len = std::mem::size_of::<T>();
    let Some(end) = offset.checked_add(type_len) else {
        return Err(OutOfBounds);
    };
    if end > data.len() {
        return Err(OutOfBounds);
    }

    let Ok(read) = data[*offset..end].try_into() else {
        return Err(OutOfBounds);
    };

    *offset = end;

    Ok(T::from_le_bytes(read))
}

/// Reads a 2 or 4 byte little-endian value, depending on `is_large`.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if the buffer is too small.
pub fn read_le_at_dyn(data: &[u8], offset: &mut usize, is_large: bool) -> Result<u32> {
    let res = if is_large {
        read_le_at::<u32>(data, offset)?
    } else {
        u32::from(read_le_at::<u16>(data, offset)?)
    };

    Ok(res)
}

/// Safely writes T in little-endian into a data buffer at `offset`, advancing the offset.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if the buffer is too small.
pub fn write_le_at<T: CilIO>(data: &mut [u8], offset: &mut usize, value: T) -> Result<()> {
    let type_len = std::mem::size_of::<T>();
    let Some(end) = offset.checked_add(type_len) else {
        return Err(OutOfBounds);
    };
    if end > data.len() {
        return Err(OutOfBounds);
    }

    data[*offset..end].copy_from_slice(value.to_le_bytes().as_ref());
    *offset = end;

    Ok(())
}

/// Writes a value as 2 or 4 byte little-endian, depending on `is_large`.
///
/// A small write of a value that does not fit into 16 bits is reported as out of bounds;
/// the width decision must already account for the largest value of the column.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if the buffer is too small or the value too wide.
pub fn write_le_at_dyn(
    data: &mut [u8],
    offset: &mut usize,
    value: u32,
    is_large: bool,
) -> Result<()> {
    if is_large {
        write_le_at::<u32>(data, offset, value)
    } else {
        let Ok(small) = u16::try_from(value) else {
            return Err(OutOfBounds);
        };
        write_le_at::<u16>(data, offset, small)
    }
}

/// Appends a compressed unsigned integer (ECMA-335 II.23.2) to `buffer`.
///
/// # Errors
/// Returns [`crate::Error::Malformed`] if the value exceeds `0x1FFF_FFFF`.
#[allow(clippy::cast_possible_truncation)]
pub fn write_compressed_uint(value: u32, buffer: &mut Vec<u8>) -> Result<()> {
    if value < 0x80 {
        buffer.push(value as u8);
    } else if value < 0x4000 {
        buffer.push(0x80 | (value >> 8) as u8);
        buffer.push(value as u8);
    } else if value < 0x2000_0000 {
        buffer.push(0xC0 | (value >> 24) as u8);
        buffer.push((value >> 16) as u8);
        buffer.push((value >> 8) as u8);
        buffer.push(value as u8);
    } else {
        return Err(malformed_error!(
            "Value {:#x} is too large for a compressed integer",
            value
        ));
    }

    Ok(())
}

/// Appends a compressed signed integer (ECMA-335 II.23.2) to `buffer`.
///
/// # Errors
/// Returns [`crate::Error::Malformed`] if the value does not fit into 29 bits.
#[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
pub fn write_compressed_int(value: i32, buffer: &mut Vec<u8>) -> Result<()> {
    let rotate = |mask: u32| (((value as u32) << 1) & mask) | u32::from(value < 0);

    if (-0x40..0x40).contains(&value) {
        buffer.push(rotate(0x7F) as u8);
    } else if (-0x2000..0x2000).contains(&value) {
        let rotated = rotate(0x3FFF);
        buffer.push(0x80 | (rotated >> 8) as u8);
        buffer.push(rotated as u8);
    } else if (-0x1000_0000..0x1000_0000).contains(&value) {
        let rotated = rotate(0x1FFF_FFFF);
        buffer.push(0xC0 | (rotated >> 24) as u8);
        buffer.push((rotated >> 16) as u8);
        buffer.push((rotated >> 8) as u8);
        buffer.push(rotated as u8);
    } else {
        return Err(malformed_error!(
            "Value {} is out of range for a compressed signed integer",
            value
        ));
    }

    Ok(())
}

/// Appends a `SerString`: compressed length and UTF-8 bytes, or `0xFF` for a null string.
///
/// # Errors
/// Returns [`crate::Error::Malformed`] if the string is too long for a compressed length.
pub fn write_ser_string(value: Option<&str>, buffer: &mut Vec<u8>) -> Result<()> {
    let Some(value) = value else {
        buffer.push(0xFF);
        return Ok(());
    };

    let Ok(length) = u32::try_from(value.len()) else {
        return Err(malformed_error!("String too long - {} bytes", value.len()));
    };

    write_compressed_uint(length, buffer)?;
    buffer.extend_from_slice(value.as_bytes());
    Ok(())
}

/// Returns how many bytes [`write_compressed_uint`] emits for `value`.
#[must_use]
pub fn compressed_uint_size(value: u32) -> usize {
    if value < 0x80 {
        1
    } else if value < 0x4000 {
        2
    } else {
        4
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_write_le() {
        let mut buffer = [0u8; 8];
        let mut offset = 0;
        write_le_at::<u16>(&mut buffer, &mut offset, 0x0201).unwrap();
        write_le_at::<u32>(&mut buffer, &mut offset, 0x0605_0403).unwrap();
        assert_eq!(offset, 6);
        assert_eq!(buffer[..6], [0x01, 0x02, 0x03, 0x04, 0x05, 0x06]);

        let mut offset = 0;
        assert_eq!(read_le_at::<u16>(&buffer, &mut offset).unwrap(), 0x0201);
        assert_eq!(read_le_at::<u32>(&buffer, &mut offset).unwrap(), 0x0605_0403);
    }

    #[test]
    fn out_of_bounds() {
        let mut buffer = [0u8; 3];
        let mut offset = 0;
        assert!(write_le_at::<u32>(&mut buffer, &mut offset, 1).is_err());
        assert_eq!(offset, 0);

        let mut offset = 2;
        assert!(read_le_at::<u16>(&buffer, &mut offset).is_err());
    }

    #[test]
    fn dyn_width() {
        let mut buffer = [0u8; 6];
        let mut offset = 0;
        write_le_at_dyn(&mut buffer, &mut offset, 0x1234, false).unwrap();
        write_le_at_dyn(&mut buffer, &mut offset, 0x0001_0000, true).unwrap();
        assert_eq!(buffer, [0x34, 0x12, 0x00, 0x00, 0x01, 0x00]);

        let mut offset = 0;
        assert!(write_le_at_dyn(&mut buffer, &mut offset, 0x0001_0000, false).is_err());

        let mut offset = 0;
        assert_eq!(read_le_at_dyn(&buffer, &mut offset, false).unwrap(), 0x1234);
        assert_eq!(read_le_at_dyn(&buffer, &mut offset, true).unwrap(), 0x0001_0000);
    }

    #[test]
    fn compressed_uint() {
        let cases: &[(u32, &[u8])] = &[
            (0x03, &[0x03]),
            (0x7F, &[0x7F]),
            (0x80, &[0x80, 0x80]),
            (0x2E57, &[0xAE, 0x57]),
            (0x3FFF, &[0xBF, 0xFF]),
            (0x4000, &[0xC0, 0x00, 0x40, 0x00]),
            (0x1FFF_FFFF, &[0xDF, 0xFF, 0xFF, 0xFF]),
        ];

        for (value, expected) in cases {
            let mut buffer = Vec::new();
            write_compressed_uint(*value, &mut buffer).unwrap();
            assert_eq!(buffer.as_slice(), *expected, "value {value:#x}");
            assert_eq!(compressed_uint_size(*value), expected.len());
        }

        let mut buffer = Vec::new();
        assert!(write_compressed_uint(0x2000_0000, &mut buffer).is_err());
    }

    #[test]
    fn compressed_int() {
        let cases: &[(i32, &[u8])] = &[
            (3, &[0x06]),
            (-3, &[0x7B]),
            (64, &[0x80, 0x80]),
            (-64, &[0x01]),
            (8192, &[0xC0, 0x00, 0x40, 0x00]),
            (-8192, &[0x80, 0x01]),
            (268_435_455, &[0xDF, 0xFF, 0xFF, 0xFE]),
            (-268_435_456, &[0xC0, 0x00, 0x00, 0x01]),
        ];

        for (value, expected) in cases {
            let mut buffer = Vec::new();
            write_compressed_int(*value, &mut buffer).unwrap();
            assert_eq!(buffer.as_slice(), *expected, "value {value}");
        }

        let mut buffer = Vec::new();
        assert!(write_compressed_int(0x1000_0000, &mut buffer).is_err());
    }

    #[test]
    fn ser_string() {
        let mut buffer = Vec::new();
        write_ser_string(Some("Hi"), &mut buffer).unwrap();
        write_ser_string(None, &mut buffer).unwrap();
        write_ser_string(Some(""), &mut buffer).unwrap();
        assert_eq!(buffer, [0x02, b'H', b'i', 0xFF, 0x00]);
    }
}

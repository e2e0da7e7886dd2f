//! String Heap (`#Strings`)
//!
//! Read access to the ECMA-335 `#Strings` heap, which stores identifier strings as
//! null-terminated UTF-8. Offset 0 always holds the empty string.
//!
//! # Reference
//! - [ECMA-335 II.24.2.3](https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf)

use std::ffi::CStr;

use crate::{Error::OutOfBounds, Result};

/// '#Strings' holds the identifiers referenced from the metadata tables: type names, member
/// names, namespaces, cultures, ...
///
/// # Examples
///
/// ```rust
/// use cilmeta::metadata::streams::Strings;
///
/// let data = &[0u8, b'H', b'e', b'l', b'l', b'o', 0u8];
/// let strings = Strings::from(data)?;
/// assert_eq!(strings.get(1)?, "Hello");
/// assert_eq!(strings.get(0)?, "");
/// # Ok::<(), cilmeta::Error>(())
/// ```
pub struct Strings<'a> {
    data: &'a [u8],
}

impl<'a> Strings<'a> {
    /// Create a `Strings` object from a sequence of bytes
    ///
    /// # Errors
    /// Returns an error if the heap is empty or does not start with the empty string
    pub fn from(data: &'a [u8]) -> Result<Strings<'a>> {
        if data.is_empty() || data[0] != 0 {
            return Err(malformed_error!("Provided #Strings heap is empty"));
        }

        Ok(Strings { data })
    }

    /// Returns the string starting at byte offset `index`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the offset lies outside the heap, or
    /// [`crate::Error::Malformed`] if the string is unterminated or not UTF-8.
    pub fn get(&self, index: usize) -> Result<&'a str> {
        if index >= self.data.len() {
            return Err(OutOfBounds);
        }

        let Ok(value) = CStr::from_bytes_until_nul(&self.data[index..]) else {
            return Err(malformed_error!("Unterminated string at index - {}", index));
        };

        value
            .to_str()
            .map_err(|_| malformed_error!("Invalid string at index - {}", index))
    }

    /// Size of the heap in bytes
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the heap holds nothing but the empty string
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.len() <= 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crafted() {
        #[rustfmt::skip]
        let data : [u8; 47] = [
            0x00,
            0x3c, 0x4d, 0x6f, 0x64, 0x75, 0x6c, 0x65, 0x3e, 0x00,
            0x53, 0x79, 0x73, 0x74, 0x65, 0x6d, 0x00,
            0x4f, 0x62, 0x6a, 0x65, 0x63, 0x74, 0x00,
            0x57, 0x72, 0x69, 0x74, 0x65, 0x4c, 0x69, 0x6e, 0x65, 0x00,
            0x2e, 0x63, 0x74, 0x6f, 0x72, 0x00,
            0x46, 0x6f, 0x6f, 0x42, 0x61, 0x72, 0x00,
        ];

        let strings = Strings::from(&data).unwrap();

        assert_eq!(strings.get(0).unwrap(), "");
        assert_eq!(strings.get(1).unwrap(), "<Module>");
        assert_eq!(strings.get(10).unwrap(), "System");
        assert_eq!(strings.get(17).unwrap(), "Object");
        assert_eq!(strings.get(24).unwrap(), "WriteLine");
        assert_eq!(strings.get(34).unwrap(), ".ctor");
        assert_eq!(strings.get(40).unwrap(), "FooBar");
        // suffixes of other strings are valid offsets too
        assert_eq!(strings.get(43).unwrap(), "Bar");
    }

    #[test]
    fn invalid() {
        assert!(Strings::from(&[]).is_err());
        assert!(Strings::from(&[0x41, 0x00]).is_err());

        let strings = Strings::from(&[0x00, 0x41, 0x42]).unwrap();
        assert!(matches!(strings.get(1), Err(crate::Error::Malformed { .. })));
        assert!(matches!(strings.get(3), Err(OutOfBounds)));

        let strings = Strings::from(&[0x00, 0xFF, 0x00]).unwrap();
        assert!(strings.get(1).is_err());
    }
}

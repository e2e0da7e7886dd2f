//! GUID Heap (`#GUID`)
//!
//! Read access to the ECMA-335 `#GUID` heap, a plain array of 16-byte GUIDs. Indices are
//! 1-based; index 0 is the null GUID.
//!
//! # Reference
//! - [ECMA-335 II.24.2.5](https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf)

use crate::{Error::OutOfBounds, Result};

/// '#GUID' holds the 128-bit identifiers of the module (`Mvid`, `EncId`, `EncBaseId`).
///
/// # Examples
///
/// ```rust
/// use cilmeta::metadata::streams::Guid;
///
/// let data = [0xAA; 16];
/// let guids = Guid::from(&data)?;
/// assert_eq!(guids.get(1)?, uguid::guid!("AAAAAAAA-AAAA-AAAA-AAAA-AAAAAAAAAAAA"));
/// assert_eq!(guids.get(0)?, uguid::Guid::ZERO);
/// # Ok::<(), cilmeta::Error>(())
/// ```
pub struct Guid<'a> {
    data: &'a [u8],
}

impl<'a> Guid<'a> {
    /// Create a `Guid` object from a sequence of bytes
    ///
    /// # Errors
    /// Returns an error if the heap size is not a multiple of 16
    pub fn from(data: &'a [u8]) -> Result<Guid<'a>> {
        if data.len() % 16 != 0 {
            return Err(malformed_error!(
                "Size of the #GUID heap is not a multiple of 16 - {}",
                data.len()
            ));
        }

        Ok(Guid { data })
    }

    /// Returns the GUID at 1-based `index`, the null GUID for index 0.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the index points past the heap
    pub fn get(&self, index: usize) -> Result<uguid::Guid> {
        if index == 0 {
            return Ok(uguid::Guid::ZERO);
        }

        let start = (index - 1) * 16;
        let Some(bytes) = self.data.get(start..start + 16) else {
            return Err(OutOfBounds);
        };

        let mut buffer = [0u8; 16];
        buffer.copy_from_slice(bytes);
        Ok(uguid::Guid::from_bytes(buffer))
    }

    /// Number of GUIDs in the heap
    #[must_use]
    pub fn count(&self) -> usize {
        self.data.len() / 16
    }
}

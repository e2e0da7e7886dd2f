//! Blob Heap (`#Blob`)
//!
//! Read access to the ECMA-335 `#Blob` heap, which stores signatures, custom attribute values,
//! permission sets, constants and public keys. Every entry is prefixed with its length as a
//! compressed unsigned integer; offset 0 always holds the empty blob.
//!
//! # Reference
//! - [ECMA-335 II.24.2.4](https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf)

use crate::{file::parser::Parser, Error::OutOfBounds, Result};

/// '#Blob' points to streams of bytes. There are several types of blobs, e.g. signatures,
/// custom attribute values or security permission sets.
///
/// # Examples
///
/// ```rust
/// use cilmeta::metadata::streams::Blob;
///
/// let data = &[0x00, 0x03, 0x41, 0x42, 0x43];
/// let blob = Blob::from(data)?;
/// assert_eq!(blob.get(1)?, &[0x41, 0x42, 0x43]);
/// assert!(blob.get(0)?.is_empty());
/// # Ok::<(), cilmeta::Error>(())
/// ```
pub struct Blob<'a> {
    data: &'a [u8],
}

impl<'a> Blob<'a> {
    /// Create a `Blob` object from a sequence of bytes
    ///
    /// # Errors
    /// Returns an error if the heap is empty or does not start with the empty blob
    pub fn from(data: &'a [u8]) -> Result<Blob<'a>> {
        if data.is_empty() || data[0] != 0 {
            return Err(malformed_error!("Invalid memory for #Blob heap"));
        }

        Ok(Blob { data })
    }

    /// Get a view into the blob starting at byte offset `index`, without its length prefix.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the offset or the encoded length points past
    /// the end of the heap.
    pub fn get(&self, index: usize) -> Result<&'a [u8]> {
        if index >= self.data.len() {
            return Err(OutOfBounds);
        }

        let mut parser = Parser::new(&self.data[index..]);
        let len = parser.read_compressed_uint()? as usize;

        let Some(data_start) = index.checked_add(parser.pos()) else {
            return Err(OutOfBounds);
        };

        let Some(data_end) = data_start.checked_add(len) else {
            return Err(OutOfBounds);
        };

        if data_end > self.data.len() {
            return Err(OutOfBounds);
        }

        Ok(&self.data[data_start..data_end])
    }

    /// Size of the heap in bytes
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the heap holds nothing but the empty blob
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.len() <= 1
    }

    /// Returns an iterator over `(offset, blob)` of every entry after the empty blob
    #[must_use]
    pub fn iter(&self) -> BlobIterator<'_, 'a> {
        BlobIterator {
            blob: self,
            position: 1,
        }
    }
}

/// Iterator over the entries of a `#Blob` heap, in heap order
pub struct BlobIterator<'b, 'a> {
    blob: &'b Blob<'a>,
    position: usize,
}

impl<'a> Iterator for BlobIterator<'_, 'a> {
    type Item = Result<(usize, &'a [u8])>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.position >= self.blob.data.len() {
            return None;
        }

        let start = self.position;
        let mut parser = Parser::new(&self.blob.data[start..]);
        let prefix = match parser.read_compressed_uint() {
            Ok(_) => parser.pos(),
            Err(error) => {
                self.position = self.blob.data.len();
                return Some(Err(error));
            }
        };

        match self.blob.get(start) {
            Ok(data) => {
                self.position = start + prefix + data.len();
                Some(Ok((start, data)))
            }
            Err(error) => {
                self.position = self.blob.data.len();
                Some(Err(error))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crafted() {
        #[rustfmt::skip]
        let data = {
            let mut data = vec![0xCC; 0x4100];
            /* i - 0    - always empty         */ data[0]                = 0x00;

            /* i - 1    - len 10               */ data[1]                = 0x0A;
            /* i - 1    - len 10               */ data[2..12]            .copy_from_slice(&[0x0A; 10]);

            /* i - 12   - len 0x100, 2 bytes   */ data[12..14]           .copy_from_slice(&[0x81, 0x00]);
            /* i - 12   - len 0x100, 2 bytes   */ data[14..0x10E]        .copy_from_slice(&[0xAB; 0x100]);

            /* i - 270  - len 0x4000, 4 bytes  */ data[0x10E..0x112]     .copy_from_slice(&[0xC0, 0x00, 0x40, 0x00]);
            data
        };

        let blob = Blob::from(&data).unwrap();

        assert!(blob.get(0).unwrap().is_empty());
        assert_eq!(blob.get(1).unwrap(), &[0x0A; 10]);
        assert_eq!(blob.get(12).unwrap(), &[0xAB; 0x100][..]);
        // the last entry claims more bytes than the heap holds
        assert!(matches!(blob.get(0x10E), Err(OutOfBounds)));
        assert!(matches!(blob.get(data.len()), Err(OutOfBounds)));
    }

    #[test]
    fn iterate() {
        let data = [0x00, 0x02, 0x01, 0x02, 0x00, 0x01, 0xFF];
        let blob = Blob::from(&data).unwrap();

        let entries: Vec<(usize, &[u8])> = blob.iter().map(|entry| entry.unwrap()).collect();
        assert_eq!(
            entries,
            vec![(1, &[0x01, 0x02][..]), (4, &[][..]), (5, &[0xFF][..])]
        );
    }

    #[test]
    fn invalid() {
        assert!(Blob::from(&[]).is_err());
        assert!(Blob::from(&[0x01]).is_err());
    }
}

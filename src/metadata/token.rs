use std::fmt;
use std::hash::{Hash, Hasher};

use crate::metadata::tables::TableId;

/// A metadata token representing a reference to a metadata table entry.
///
/// Tokens in .NET metadata consist of a 32-bit value where:
/// - The high byte (bits 24-31) indicates the table type
/// - The low 24 bits (bits 0-23) indicate the row index within that table
///
/// Row index 0 is the null row of every table.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Token(pub u32);

impl Token {
    /// Creates a new token from a raw 32-bit value
    #[must_use]
    pub fn new(value: u32) -> Self {
        Token(value)
    }

    /// Creates a token from a table and a 1-based row id.
    ///
    /// Only the low 24 bits of `row` are kept.
    #[must_use]
    pub fn from_parts(table: TableId, row: u32) -> Self {
        Token(((table as u32) << 24) | (row & 0x00FF_FFFF))
    }

    /// Returns the raw token value
    #[must_use]
    pub fn value(&self) -> u32 {
        self.0
    }

    /// Extracts the table type from the token (high byte)
    #[must_use]
    pub fn table(&self) -> u8 {
        (self.0 >> 24) as u8
    }

    /// Returns the table part of the token in place (`value & 0xFF00_0000`)
    #[must_use]
    pub fn table_kind(&self) -> u32 {
        self.0 & 0xFF00_0000
    }

    /// Returns the table of this token, if the high byte names a known table
    #[must_use]
    pub fn table_id(&self) -> Option<TableId> {
        TableId::from_u8(self.table())
    }

    /// Extracts the row index from the token (low 24 bits)
    #[must_use]
    pub fn row(&self) -> u32 {
        self.0 & 0x00FF_FFFF
    }

    /// Returns true if this token does not reference a row (row 0)
    #[must_use]
    pub fn is_null(&self) -> bool {
        self.row() == 0
    }
}

impl From<u32> for Token {
    fn from(value: u32) -> Self {
        Token(value)
    }
}

impl From<Token> for u32 {
    fn from(token: Token) -> Self {
        token.0
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Token(0x{:08x}, table: 0x{:02x}, row: {})",
            self.0,
            self.table(),
            self.row()
        )
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08x}", self.0)
    }
}

impl Hash for Token {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use strum::IntoEnumIterator;

    #[test]
    fn test_token_parts() {
        let token = Token(0x06000001);
        assert_eq!(token.table(), 0x06);
        assert_eq!(token.table_kind(), 0x0600_0000);
        assert_eq!(token.table_id(), Some(TableId::MethodDef));
        assert_eq!(token.row(), 1);

        let token = Token(0x06FFFFFF);
        assert_eq!(token.row(), 0x00FFFFFF);
    }

    #[test]
    fn test_token_from_parts_round_trip() {
        for table in TableId::iter() {
            for row in [0, 1, 0xFFFF, 0x1_0000, 0x00FF_FFFF] {
                let token = Token::from_parts(table, row);
                assert_eq!(token.row(), row);
                assert_eq!(token.table_id(), Some(table));

                let rebuilt = Token::from_parts(token.table_id().unwrap(), token.row());
                assert_eq!(rebuilt.value(), token.value());
            }
        }
    }

    #[test]
    fn test_token_from_parts_masks_row() {
        let token = Token::from_parts(TableId::TypeDef, 0x0100_0002);
        assert_eq!(token.value(), 0x0200_0002);
    }

    #[test]
    fn test_token_is_null() {
        assert!(Token(0x00000000).is_null());
        assert!(Token(0x02000000).is_null());
        assert!(!Token(0x06000001).is_null());
    }

    #[test]
    fn test_token_unknown_table() {
        assert_eq!(Token(0x2D000001).table_id(), None);
        assert_eq!(Token(0xFF000001).table_id(), None);
    }

    #[test]
    fn test_token_display() {
        assert_eq!(format!("{}", Token(0x06000001)), "0x06000001");

        let debug_str = format!("{:?}", Token(0x06000001));
        assert!(debug_str.contains("Token(0x06000001"));
        assert!(debug_str.contains("table: 0x06"));
        assert!(debug_str.contains("row: 1"));
    }

    #[test]
    fn test_token_ordering() {
        let token1 = Token(0x06000001);
        let token2 = Token(0x06000002);
        let token3 = Token(0x07000001);

        assert!(token1 < token2);
        assert!(token2 < token3);
    }

    #[test]
    fn test_token_hash() {
        let mut map = HashMap::new();
        map.insert(Token(0x06000001), "Method1");
        map.insert(Token(0x06000002), "Method2");

        assert_eq!(map.get(&Token(0x06000001)), Some(&"Method1"));
        assert_eq!(map.get(&Token(0x06000002)), Some(&"Method2"));
    }
}

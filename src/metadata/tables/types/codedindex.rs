//! # Coded Index Types Module
//!
//! Coded indices let a single column reference rows of several different tables. The low
//! `tag_bits` bits of the stored value select the target table from a fixed, ordered candidate
//! list; the remaining bits hold the row id.
//!
//! ```text
//! packed = (row << tag_bits) | tag        tag_bits = ceil(log2(candidates))
//! ```
//!
//! The order of the candidate lists is part of the file format. Each [`CodedIndexType`] therefore
//! returns a static slice, and the position of a table in that slice is its tag. The only
//! exception is [`CodedIndexType::CustomAttributeType`], whose tags 0, 1 and 4 are reserved.
//!
//! ## References
//!
//! - [ECMA-335 Standard](https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf) - Section II.24.2.6

use strum::{EnumCount, EnumIter};

use crate::{
    file::io::{read_le_at_dyn, write_le_at_dyn},
    metadata::{
        tables::{TableId, TableInfoRef},
        token::Token,
    },
    Error, Result,
};

/// All coded index categories of ECMA-335 II.24.2.6.
///
/// Each category names the tables a column of that kind may point into.
#[derive(Debug, Hash, Eq, PartialEq, Clone, Copy, EnumIter, EnumCount)]
#[repr(usize)]
pub enum CodedIndexType {
    /// `TypeDef`, `TypeRef` or `TypeSpec`
    TypeDefOrRef,
    /// `Field`, `Param` or `Property`
    HasConstant,
    /// Any of the 22 tables whose rows can carry custom attributes
    HasCustomAttribute,
    /// `Field` or `Param`
    HasFieldMarshal,
    /// `TypeDef`, `MethodDef` or `Assembly`
    HasDeclSecurity,
    /// `TypeDef`, `TypeRef`, `ModuleRef`, `MethodDef` or `TypeSpec`
    MemberRefParent,
    /// `Event` or `Property`
    HasSemantics,
    /// `MethodDef` or `MemberRef`
    MethodDefOrRef,
    /// `Field` or `MethodDef`
    MemberForwarded,
    /// `File`, `AssemblyRef` or `ExportedType`
    Implementation,
    /// `MethodDef` (tag 2) or `MemberRef` (tag 3); tags 0, 1 and 4 are not used
    CustomAttributeType,
    /// `Module`, `ModuleRef`, `AssemblyRef` or `TypeRef`
    ResolutionScope,
    /// `TypeDef` or `MethodDef`
    TypeOrMethodDef,
}

impl CodedIndexType {
    /// Returns the candidate tables of this category, in tag order.
    ///
    /// For `CustomAttributeType` the reserved slots are filled with the table of the nearest
    /// used tag, so decoding a reserved tag stays lenient while the slice length still yields
    /// the 3 tag bits the format requires.
    #[must_use]
    pub fn tables(&self) -> &'static [TableId] {
        match self {
            CodedIndexType::TypeDefOrRef => {
                &[TableId::TypeDef, TableId::TypeRef, TableId::TypeSpec]
            }
            CodedIndexType::HasConstant => &[TableId::Field, TableId::Param, TableId::Property],
            CodedIndexType::HasCustomAttribute => &[
                TableId::MethodDef,
                TableId::Field,
                TableId::TypeRef,
                TableId::TypeDef,
                TableId::Param,
                TableId::InterfaceImpl,
                TableId::MemberRef,
                TableId::Module,
                // Labeled 'Permission' in the standard, there is no such table
                TableId::DeclSecurity,
                TableId::Property,
                TableId::Event,
                TableId::StandAloneSig,
                TableId::ModuleRef,
                TableId::TypeSpec,
                TableId::Assembly,
                TableId::AssemblyRef,
                TableId::File,
                TableId::ExportedType,
                TableId::ManifestResource,
                TableId::GenericParam,
                TableId::GenericParamConstraint,
                TableId::MethodSpec,
            ],
            CodedIndexType::HasFieldMarshal => &[TableId::Field, TableId::Param],
            CodedIndexType::HasDeclSecurity => {
                &[TableId::TypeDef, TableId::MethodDef, TableId::Assembly]
            }
            CodedIndexType::MemberRefParent => &[
                TableId::TypeDef,
                TableId::TypeRef,
                TableId::ModuleRef,
                TableId::MethodDef,
                TableId::TypeSpec,
            ],
            CodedIndexType::HasSemantics => &[TableId::Event, TableId::Property],
            CodedIndexType::MethodDefOrRef => &[TableId::MethodDef, TableId::MemberRef],
            CodedIndexType::MemberForwarded => &[TableId::Field, TableId::MethodDef],
            CodedIndexType::Implementation => {
                &[TableId::File, TableId::AssemblyRef, TableId::ExportedType]
            }
            CodedIndexType::CustomAttributeType => &[
                TableId::MethodDef,
                TableId::MethodDef,
                TableId::MethodDef,
                TableId::MemberRef,
                TableId::MemberRef,
            ],
            CodedIndexType::ResolutionScope => &[
                TableId::Module,
                TableId::ModuleRef,
                TableId::AssemblyRef,
                TableId::TypeRef,
            ],
            CodedIndexType::TypeOrMethodDef => &[TableId::TypeDef, TableId::MethodDef],
        }
    }

    /// Number of low bits used for the table tag, `ceil(log2(candidates))`
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn tag_bits(&self) -> u8 {
        let candidates = self.tables().len();
        // Safe: candidate lists are at most 22 entries long
        (usize::BITS - (candidates - 1).leading_zeros()) as u8
    }

    /// Returns the tag that selects `table` in this category, if `table` is a candidate
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn tag_of(&self, table: TableId) -> Option<u32> {
        if *self == CodedIndexType::CustomAttributeType {
            return match table {
                TableId::MethodDef => Some(2),
                TableId::MemberRef => Some(3),
                _ => None,
            };
        }

        self.tables()
            .iter()
            .position(|candidate| *candidate == table)
            .map(|tag| tag as u32)
    }

    /// Packs `(table, row)` into the width independent coded index value.
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidReference`] if `table` is not a candidate of this category.
    pub fn encode(&self, table: TableId, row: u32) -> Result<u32> {
        let Some(tag) = self.tag_of(table) else {
            return Err(Error::InvalidReference {
                table,
                row,
                category: format!("{self:?}"),
            });
        };

        Ok((row << self.tag_bits()) | tag)
    }

    /// Splits a packed coded index value into `(table, row)`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the tag does not name a candidate table.
    pub fn decode(&self, value: u32) -> Result<(TableId, u32)> {
        let tag_bits = self.tag_bits();
        let tag_mask = (1u32 << tag_bits) - 1;

        let tag = (value & tag_mask) as usize;
        let tables = self.tables();
        if tag >= tables.len() {
            return Err(Error::OutOfBounds);
        }

        Ok((tables[tag], value >> tag_bits))
    }
}

/// A decoded coded index: the target table, the row and the resulting token.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CodedIndex {
    /// The table this index is referring to
    pub tag: TableId,
    /// The 1-based row id, 0 for a null reference
    pub row: u32,
    /// The token of the referenced row
    pub token: Token,
}

impl CodedIndex {
    /// Creates a new `CodedIndex` pointing to `row` of `tag`
    #[must_use]
    pub fn new(tag: TableId, row: u32) -> CodedIndex {
        CodedIndex {
            tag,
            row,
            token: Token::from_parts(tag, row),
        }
    }

    /// A null reference in the given category (first candidate table, row 0)
    #[must_use]
    pub fn null(ci_type: CodedIndexType) -> CodedIndex {
        let tag = match ci_type {
            CodedIndexType::CustomAttributeType => TableId::MethodDef,
            _ => ci_type.tables()[0],
        };

        CodedIndex::new(tag, 0)
    }

    /// Returns true if this index does not reference a row
    #[must_use]
    pub fn is_null(&self) -> bool {
        self.row == 0
    }

    /// Reads and decodes a coded index, in the width `info` dictates for `ci_type`.
    ///
    /// # Errors
    /// Returns an error if the buffer is too small or the tag is invalid.
    pub fn read(
        data: &[u8],
        offset: &mut usize,
        info: &TableInfoRef,
        ci_type: CodedIndexType,
    ) -> Result<Self> {
        let value = read_le_at_dyn(data, offset, info.coded_index_bytes(ci_type) == 4)?;

        let (tag, row) = ci_type.decode(value)?;
        Ok(CodedIndex::new(tag, row))
    }

    /// Encodes and writes this coded index, in the width `info` dictates for `ci_type`.
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidReference`] if the target table is not part of `ci_type`,
    /// or [`crate::Error::OutOfBounds`] if the buffer is too small or the value does not fit.
    pub fn write(
        &self,
        data: &mut [u8],
        offset: &mut usize,
        info: &TableInfoRef,
        ci_type: CodedIndexType,
    ) -> Result<()> {
        let (width, packed) = info.encode_coded_index(self.tag, self.row, ci_type)?;
        write_le_at_dyn(data, offset, packed, width == 4)
    }
}

impl TryFrom<Token> for CodedIndex {
    type Error = Error;

    fn try_from(token: Token) -> Result<Self> {
        if token.is_null() {
            return Err(malformed_error!("Cannot convert null token to CodedIndex"));
        }

        match token.table_id() {
            Some(table) => Ok(CodedIndex::new(table, token.row())),
            None => Err(malformed_error!("Unknown table ID: 0x{:02x}", token.table())),
        }
    }
}

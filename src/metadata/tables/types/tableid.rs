use strum::{EnumCount, EnumIter};

/// Identifiers of the metadata tables defined in ECMA-335 Partition II, Section 22.
///
/// The discriminant of each variant is the table number. It is the high byte of every
/// [`crate::metadata::token::Token`] pointing into the table and the bit position of the table
/// in the `valid` and `sorted` vectors of the tables stream header.
///
/// ## Table Groups
///
/// - **Definitions**: `Module`, `TypeDef`, `Field`, `MethodDef`, `Param`, `Event`, `Property`,
///   `GenericParam`
/// - **References**: `TypeRef`, `MemberRef`, `ModuleRef`, `AssemblyRef`, `TypeSpec`, `MethodSpec`
/// - **Relationships**: `InterfaceImpl`, `NestedClass`, `EventMap`, `PropertyMap`,
///   `MethodSemantics`, `MethodImpl`, `GenericParamConstraint`
/// - **Attributes and layout**: `CustomAttribute`, `DeclSecurity`, `Constant`, `FieldMarshal`,
///   `ClassLayout`, `FieldLayout`, `FieldRVA`, `ImplMap`
/// - **Indirection** (uncompressed `#-` streams only): `FieldPtr`, `MethodPtr`, `ParamPtr`,
///   `EventPtr`, `PropertyPtr`
/// - **Edit and continue**: `EncLog`, `EncMap`
/// - **Manifest**: `Assembly`, `AssemblyProcessor`, `AssemblyOS`, `AssemblyRefProcessor`,
///   `AssemblyRefOS`, `File`, `ExportedType`, `ManifestResource`
///
/// ## Reference
/// * [ECMA-335 Partition II, Section 22](https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf) - Metadata Tables
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Hash, EnumIter, EnumCount)]
#[repr(u8)]
pub enum TableId {
    /// `Module` (0x00) - The single row describing the current module
    Module = 0x00,
    /// `TypeRef` (0x01) - Types defined in other modules or assemblies
    TypeRef = 0x01,
    /// `TypeDef` (0x02) - Types defined in this module
    TypeDef = 0x02,
    /// `FieldPtr` (0x03) - Field indirection
    FieldPtr = 0x03,
    /// `Field` (0x04) - Field definitions
    Field = 0x04,
    /// `MethodPtr` (0x05) - Method indirection
    MethodPtr = 0x05,
    /// `MethodDef` (0x06) - Method definitions
    MethodDef = 0x06,
    /// `ParamPtr` (0x07) - Parameter indirection
    ParamPtr = 0x07,
    /// `Param` (0x08) - Parameter definitions
    Param = 0x08,
    /// `InterfaceImpl` (0x09) - Interfaces implemented by a type
    InterfaceImpl = 0x09,
    /// `MemberRef` (0x0A) - References to fields and methods of other types
    MemberRef = 0x0A,
    /// `Constant` (0x0B) - Default values of fields, parameters and properties
    Constant = 0x0B,
    /// `CustomAttribute` (0x0C) - Custom attribute applications
    CustomAttribute = 0x0C,
    /// `FieldMarshal` (0x0D) - Interop marshalling descriptors
    FieldMarshal = 0x0D,
    /// `DeclSecurity` (0x0E) - Declarative security permission sets
    DeclSecurity = 0x0E,
    /// `ClassLayout` (0x0F) - Explicit packing and size of a type
    ClassLayout = 0x0F,
    /// `FieldLayout` (0x10) - Explicit field offsets
    FieldLayout = 0x10,
    /// `StandAloneSig` (0x11) - Signatures not attached to a member (locals, `calli`)
    StandAloneSig = 0x11,
    /// `EventMap` (0x12) - Maps a type to its event range
    EventMap = 0x12,
    /// `EventPtr` (0x13) - Event indirection
    EventPtr = 0x13,
    /// `Event` (0x14) - Event definitions
    Event = 0x14,
    /// `PropertyMap` (0x15) - Maps a type to its property range
    PropertyMap = 0x15,
    /// `PropertyPtr` (0x16) - Property indirection
    PropertyPtr = 0x16,
    /// `Property` (0x17) - Property definitions
    Property = 0x17,
    /// `MethodSemantics` (0x18) - Accessor methods of events and properties
    MethodSemantics = 0x18,
    /// `MethodImpl` (0x19) - Explicit method overrides
    MethodImpl = 0x19,
    /// `ModuleRef` (0x1A) - References to other modules
    ModuleRef = 0x1A,
    /// `TypeSpec` (0x1B) - Constructed types described by a signature blob
    TypeSpec = 0x1B,
    /// `ImplMap` (0x1C) - P/Invoke mappings
    ImplMap = 0x1C,
    /// `FieldRVA` (0x1D) - Initial data of static fields
    FieldRVA = 0x1D,
    /// `EncLog` (0x1E) - Edit and continue log
    EncLog = 0x1E,
    /// `EncMap` (0x1F) - Edit and continue token map
    EncMap = 0x1F,
    /// `Assembly` (0x20) - The assembly manifest
    Assembly = 0x20,
    /// `AssemblyProcessor` (0x21) - Unused, processor of the assembly
    AssemblyProcessor = 0x21,
    /// `AssemblyOS` (0x22) - Unused, operating system of the assembly
    AssemblyOS = 0x22,
    /// `AssemblyRef` (0x23) - Referenced assemblies
    AssemblyRef = 0x23,
    /// `AssemblyRefProcessor` (0x24) - Unused, processor of a referenced assembly
    AssemblyRefProcessor = 0x24,
    /// `AssemblyRefOS` (0x25) - Unused, operating system of a referenced assembly
    AssemblyRefOS = 0x25,
    /// `File` (0x26) - Other files of a multi-file assembly
    File = 0x26,
    /// `ExportedType` (0x27) - Types exported or forwarded by the assembly
    ExportedType = 0x27,
    /// `ManifestResource` (0x28) - Resources of the assembly
    ManifestResource = 0x28,
    /// `NestedClass` (0x29) - Nesting relationships between types
    NestedClass = 0x29,
    /// `GenericParam` (0x2A) - Generic parameters of types and methods
    GenericParam = 0x2A,
    /// `MethodSpec` (0x2B) - Generic method instantiations
    MethodSpec = 0x2B,
    /// `GenericParamConstraint` (0x2C) - Constraints of generic parameters
    GenericParamConstraint = 0x2C,
}

impl TableId {
    /// Maps a table number to its identifier
    #[must_use]
    pub fn from_u8(value: u8) -> Option<TableId> {
        let table = match value {
            0x00 => TableId::Module,
            0x01 => TableId::TypeRef,
            0x02 => TableId::TypeDef,
            0x03 => TableId::FieldPtr,
            0x04 => TableId::Field,
            0x05 => TableId::MethodPtr,
            0x06 => TableId::MethodDef,
            0x07 => TableId::ParamPtr,
            0x08 => TableId::Param,
            0x09 => TableId::InterfaceImpl,
            0x0A => TableId::MemberRef,
            0x0B => TableId::Constant,
            0x0C => TableId::CustomAttribute,
            0x0D => TableId::FieldMarshal,
            0x0E => TableId::DeclSecurity,
            0x0F => TableId::ClassLayout,
            0x10 => TableId::FieldLayout,
            0x11 => TableId::StandAloneSig,
            0x12 => TableId::EventMap,
            0x13 => TableId::EventPtr,
            0x14 => TableId::Event,
            0x15 => TableId::PropertyMap,
            0x16 => TableId::PropertyPtr,
            0x17 => TableId::Property,
            0x18 => TableId::MethodSemantics,
            0x19 => TableId::MethodImpl,
            0x1A => TableId::ModuleRef,
            0x1B => TableId::TypeSpec,
            0x1C => TableId::ImplMap,
            0x1D => TableId::FieldRVA,
            0x1E => TableId::EncLog,
            0x1F => TableId::EncMap,
            0x20 => TableId::Assembly,
            0x21 => TableId::AssemblyProcessor,
            0x22 => TableId::AssemblyOS,
            0x23 => TableId::AssemblyRef,
            0x24 => TableId::AssemblyRefProcessor,
            0x25 => TableId::AssemblyRefOS,
            0x26 => TableId::File,
            0x27 => TableId::ExportedType,
            0x28 => TableId::ManifestResource,
            0x29 => TableId::NestedClass,
            0x2A => TableId::GenericParam,
            0x2B => TableId::MethodSpec,
            0x2C => TableId::GenericParamConstraint,
            _ => return None,
        };

        Some(table)
    }

    /// Returns true for the tables that are ordered by a key column before they are written.
    ///
    /// These are exactly the eight tables that readers binary search: `ClassLayout`,
    /// `Constant`, `CustomAttribute`, `DeclSecurity`, `FieldLayout`, `FieldMarshal`, `ImplMap`
    /// and `MethodSemantics`.
    #[must_use]
    pub fn is_sorted(self) -> bool {
        matches!(
            self,
            TableId::ClassLayout
                | TableId::Constant
                | TableId::CustomAttribute
                | TableId::DeclSecurity
                | TableId::FieldLayout
                | TableId::FieldMarshal
                | TableId::ImplMap
                | TableId::MethodSemantics
        )
    }

    /// The bit of this table in the `valid` / `sorted` vectors of the tables stream header
    #[must_use]
    pub fn bit(self) -> u64 {
        1u64 << (self as u8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn from_u8_matches_discriminant() {
        for table in TableId::iter() {
            assert_eq!(TableId::from_u8(table as u8), Some(table));
        }

        assert_eq!(TableId::COUNT, 45);
        assert_eq!(TableId::from_u8(0x2D), None);
        assert_eq!(TableId::from_u8(0x30), None);
    }

    #[test]
    fn sorted_tables() {
        let sorted: Vec<TableId> = TableId::iter().filter(|t| t.is_sorted()).collect();
        assert_eq!(
            sorted,
            vec![
                TableId::Constant,
                TableId::CustomAttribute,
                TableId::FieldMarshal,
                TableId::DeclSecurity,
                TableId::ClassLayout,
                TableId::FieldLayout,
                TableId::MethodSemantics,
                TableId::ImplMap,
            ]
        );
    }
}

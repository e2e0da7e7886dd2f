use crate::metadata::customattributes::CustomAttributeNamedArgument;

/// Security actions as defined in ECMA-335 and the .NET Framework
///
/// These values control how a permission set is applied to the code element that carries it.
///
/// # Reference
/// * ECMA-335 II.22.11
/// * <https://learn.microsoft.com/en-us/dotnet/api/system.security.permissions.securityaction>
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum SecurityAction {
    /// Without further checks, refuse Demand for the specified permission.
    Deny = 0x0001,
    /// Check that all callers in the call chain have been granted the permission.
    Demand = 0x0002,
    /// Without further checks, satisfy Demand for the specified permission.
    Assert = 0x0003,
    /// Check that the current assembly has been granted the specified permission.
    NonCasDemand = 0x0004,
    /// Check that the immediate caller has been granted the specified permission.
    LinkDemand = 0x0005,
    /// The permission must be granted to inherit from the class or override the method.
    InheritanceDemand = 0x0006,
    /// Minimum permissions required to run.
    RequestMinimum = 0x0007,
    /// Optional permissions to grant.
    RequestOptional = 0x0008,
    /// Permissions not to be granted.
    RequestRefuse = 0x0009,
    /// Reserved for prejitting.
    PrejitGrant = 0x000A,
    /// Reserved for prejitting.
    PrejitDeny = 0x000B,
    /// Non-CAS version of `LinkDemand`.
    NonCasLinkDemand = 0x000C,
    /// Non-CAS version of `InheritanceDemand`.
    NonCasInheritance = 0x000D,
    /// Link demand for one of the given permissions.
    LinkDemandChoice = 0x000E,
    /// Inheritance demand for one of the given permissions.
    InheritanceDemandChoice = 0x000F,
    /// Demand for one of the given permissions.
    DemandChoice = 0x0010,
    /// Refuse Demand for all permissions other than those specified.
    PermitOnly = 0x0011,
    /// Unknown security action.
    Unknown(u16),
}

impl From<u16> for SecurityAction {
    fn from(value: u16) -> Self {
        match value {
            0x0001 => SecurityAction::Deny,
            0x0002 => SecurityAction::Demand,
            0x0003 => SecurityAction::Assert,
            0x0004 => SecurityAction::NonCasDemand,
            0x0005 => SecurityAction::LinkDemand,
            0x0006 => SecurityAction::InheritanceDemand,
            0x0007 => SecurityAction::RequestMinimum,
            0x0008 => SecurityAction::RequestOptional,
            0x0009 => SecurityAction::RequestRefuse,
            0x000A => SecurityAction::PrejitGrant,
            0x000B => SecurityAction::PrejitDeny,
            0x000C => SecurityAction::NonCasLinkDemand,
            0x000D => SecurityAction::NonCasInheritance,
            0x000E => SecurityAction::LinkDemandChoice,
            0x000F => SecurityAction::InheritanceDemandChoice,
            0x0010 => SecurityAction::DemandChoice,
            0x0011 => SecurityAction::PermitOnly,
            _ => SecurityAction::Unknown(value),
        }
    }
}

impl From<SecurityAction> for u16 {
    fn from(action: SecurityAction) -> Self {
        match action {
            SecurityAction::Deny => 0x0001,
            SecurityAction::Demand => 0x0002,
            SecurityAction::Assert => 0x0003,
            SecurityAction::NonCasDemand => 0x0004,
            SecurityAction::LinkDemand => 0x0005,
            SecurityAction::InheritanceDemand => 0x0006,
            SecurityAction::RequestMinimum => 0x0007,
            SecurityAction::RequestOptional => 0x0008,
            SecurityAction::RequestRefuse => 0x0009,
            SecurityAction::PrejitGrant => 0x000A,
            SecurityAction::PrejitDeny => 0x000B,
            SecurityAction::NonCasLinkDemand => 0x000C,
            SecurityAction::NonCasInheritance => 0x000D,
            SecurityAction::LinkDemandChoice => 0x000E,
            SecurityAction::InheritanceDemandChoice => 0x000F,
            SecurityAction::DemandChoice => 0x0010,
            SecurityAction::PermitOnly => 0x0011,
            SecurityAction::Unknown(value) => value,
        }
    }
}

/// The encodings a `DeclSecurity` permission set blob can have
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionSetFormat {
    /// `.`-prefixed list of attribute types and their named arguments (.NET 2.0+)
    Binary,
    /// Legacy XML `PermissionSet` document, usually UTF-16LE
    Xml,
}

impl PermissionSetFormat {
    /// Detects the format from the leading bytes of a permission set blob
    #[must_use]
    pub fn detect(data: &[u8]) -> Option<Self> {
        match data {
            [b'.', ..] => Some(PermissionSetFormat::Binary),
            [b'<', ..] | [0xFF, 0xFE, ..] => Some(PermissionSetFormat::Xml),
            _ => None,
        }
    }
}

/// One permission of a security declaration: the security attribute type and its property
/// and field assignments
#[derive(Debug, Clone, PartialEq)]
pub struct SecurityAttribute {
    /// Assembly-qualified name of the security attribute or permission type
    pub type_name: String,
    /// Named arguments, in blob order
    pub named_args: Vec<CustomAttributeNamedArgument>,
}

impl SecurityAttribute {
    /// Creates a permission without arguments
    pub fn new(type_name: impl Into<String>) -> Self {
        SecurityAttribute {
            type_name: type_name.into(),
            named_args: Vec::new(),
        }
    }

    /// Field assignments
    pub fn fields(&self) -> impl Iterator<Item = &CustomAttributeNamedArgument> {
        self.named_args.iter().filter(|arg| arg.is_field)
    }

    /// Property assignments
    pub fn properties(&self) -> impl Iterator<Item = &CustomAttributeNamedArgument> {
        self.named_args.iter().filter(|arg| !arg.is_field)
    }

    /// The type name without its assembly qualification
    #[must_use]
    pub fn class_name(&self) -> &str {
        match self.type_name.split_once(',') {
            Some((class, _)) => class.trim(),
            None => self.type_name.trim(),
        }
    }
}

/// Well-known permission classes
pub mod security_classes {
    /// Controls access to security-sensitive operations
    pub const SECURITY_PERMISSION: &str = "System.Security.Permissions.SecurityPermission";
    /// Attribute form of [`SECURITY_PERMISSION`]
    pub const SECURITY_PERMISSION_ATTRIBUTE: &str =
        "System.Security.Permissions.SecurityPermissionAttribute";
    /// Controls access to files and directories
    pub const FILE_IO_PERMISSION: &str = "System.Security.Permissions.FileIOPermission";
    /// Controls use of reflection
    pub const REFLECTION_PERMISSION: &str = "System.Security.Permissions.ReflectionPermission";
    /// The permission set root of the XML format
    pub const PERMISSION_SET: &str = "System.Security.PermissionSet";
}

use std::fmt;

use crate::metadata::{signatures::MethodSignature, typesystem::TypeReference};

/// A method identified by declaring type, name and signature.
///
/// This is how custom attribute constructors and method overrides point at methods, whether
/// they are defined in the module (`MethodDef`) or referenced from elsewhere (`MemberRef`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodReference {
    /// The type declaring the method
    pub declaring_type: TypeReference,
    /// Method name, `.ctor` for constructors
    pub name: String,
    /// The method signature
    pub signature: MethodSignature,
}

impl MethodReference {
    /// Creates a reference to `declaring_type::name` with `signature`
    #[must_use]
    pub fn new(declaring_type: TypeReference, name: &str, signature: MethodSignature) -> Self {
        MethodReference {
            declaring_type,
            name: name.to_string(),
            signature,
        }
    }

    /// Returns true if this is an instance or static constructor
    #[must_use]
    pub fn is_constructor(&self) -> bool {
        self.name == ".ctor" || self.name == ".cctor"
    }
}

impl fmt::Display for MethodReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parameters = String::new();
        self.signature.write_parameter_list(&mut parameters);
        write!(
            f,
            "{} {}::{}{}",
            self.signature.return_type.full_name(),
            self.declaring_type.full_name(),
            self.name,
            parameters
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{metadata::typesystem::PrimitiveType, test::TestTypes};

    #[test]
    fn display() {
        let types = TestTypes::new();
        let reference = MethodReference::new(
            types.attribute(),
            ".ctor",
            MethodSignature::new(
                PrimitiveType::Void.into(),
                vec![PrimitiveType::I4.into(), PrimitiveType::String.into()],
            )
            .instance(),
        );

        assert!(reference.is_constructor());
        assert_eq!(
            reference.to_string(),
            "System.Void System.Attribute::.ctor(System.Int32,System.String)"
        );
    }
}

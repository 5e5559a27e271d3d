//! Type descriptors.
//!
//! Cedar has four primitive types, user-declared named types (structs and
//! function-pointer signatures, resolved against the unit-wide registry at
//! lowering time), and pointers. Array-ness is a property of a variable
//! declaration, not of the type itself.

use std::fmt;

/// The built-in scalar types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    Void,
    Char,
    Int,
    Double,
}

impl Primitive {
    /// Parse a primitive kind from its source spelling.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "void" => Some(Primitive::Void),
            "char" => Some(Primitive::Char),
            "int" => Some(Primitive::Int),
            "double" => Some(Primitive::Double),
            _ => None,
        }
    }
}

/// A source-level type descriptor.
#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    Primitive(Primitive),
    /// A user-declared name: a struct or a function-pointer signature.
    Named(String),
    Pointer(Box<Type>),
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Primitive(Primitive::Void) => write!(f, "void"),
            Type::Primitive(Primitive::Char) => write!(f, "char"),
            Type::Primitive(Primitive::Int) => write!(f, "int"),
            Type::Primitive(Primitive::Double) => write!(f, "double"),
            Type::Named(name) => write!(f, "{name}"),
            Type::Pointer(base) => write!(f, "{base}*"),
        }
    }
}

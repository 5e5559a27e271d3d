//! Declaration nodes.
//!
//! Forward declarations are the same node as definitions with the defining
//! part absent: a function with no body, a struct with no fields. The
//! lowering pass relies on this to implement the two-phase declare-then-
//! define protocol for recursive types.

use crate::expr::Expr;
use crate::stmt::Stmt;
use crate::types::Type;

/// A single function parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub identifier: String,
    pub ty: Type,
}

/// Any top-level (or, for `Variable`, statement-level) declaration.
#[derive(Debug, Clone, PartialEq)]
pub enum Decl {
    Function {
        identifier: String,
        return_type: Type,
        parameters: Vec<Param>,
        /// `None` for a forward declaration.
        body: Option<Vec<Stmt>>,
    },
    Variable {
        identifier: String,
        ty: Type,
        /// `Some` declares an array of the element type `ty`.
        array_size: Option<Expr>,
        initializer: Option<Expr>,
    },
    Struct {
        identifier: String,
        /// Empty for a forward declaration. Field indices are assigned in
        /// this order, starting at zero.
        fields: Vec<StructField>,
    },
    /// A named function-pointer signature.
    FunctionPointer {
        identifier: String,
        return_type: Type,
        parameters: Vec<Param>,
    },
}

/// One field of a struct definition.
#[derive(Debug, Clone, PartialEq)]
pub struct StructField {
    pub identifier: String,
    pub ty: Type,
}

impl Decl {
    /// The declared name, whatever the declaration kind.
    pub fn identifier(&self) -> &str {
        match self {
            Decl::Function { identifier, .. }
            | Decl::Variable { identifier, .. }
            | Decl::Struct { identifier, .. }
            | Decl::FunctionPointer { identifier, .. } => identifier,
        }
    }
}

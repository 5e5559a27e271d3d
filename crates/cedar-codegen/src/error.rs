//! Code generation error types.
//!
//! Every error is fatal to the pass: generation either produces a fully
//! verified module or aborts with an error naming the offending
//! declaration, identifier, or construct. There is no local recovery and
//! no partial-output mode.

use std::fmt;

use inkwell::builder::BuilderError;

/// A fatal error raised during lowering or verification.
#[derive(Debug, Clone, PartialEq)]
pub enum CodegenError {
    /// A named type was used but never declared.
    UnknownType { name: String },
    /// An identifier reference exhausted the scope chain.
    UnknownIdentifier { name: String },
    /// Address-of was requested for an expression that has no storage.
    InvalidLValue { found: String },
    /// A non-void function reached the end of a control path without a
    /// return.
    MissingReturn { function: String },
    /// A construct this backend deliberately does not lower.
    UnsupportedFeature { feature: String },
    /// The finished module failed LLVM's whole-unit consistency check.
    ModuleVerification { message: String },
    /// An instruction builder failure (an internal error, not a source
    /// program error).
    Builder { message: String },
}

impl fmt::Display for CodegenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownType { name } => write!(f, "unknown type: {name}"),
            Self::UnknownIdentifier { name } => write!(f, "unknown identifier: {name}"),
            Self::InvalidLValue { found } => {
                write!(f, "expression is not assignable: {found}")
            }
            Self::MissingReturn { function } => {
                write!(f, "non-void function '{function}' does not return on every path")
            }
            Self::UnsupportedFeature { feature } => write!(f, "unsupported: {feature}"),
            Self::ModuleVerification { message } => {
                write!(f, "module verification failed: {message}")
            }
            Self::Builder { message } => write!(f, "instruction builder error: {message}"),
        }
    }
}

impl std::error::Error for CodegenError {}

impl From<BuilderError> for CodegenError {
    fn from(e: BuilderError) -> Self {
        Self::Builder {
            message: e.to_string(),
        }
    }
}

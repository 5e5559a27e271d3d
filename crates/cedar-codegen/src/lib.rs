//! LLVM code generation for the Cedar compiler.
//!
//! This crate lowers a `cedar_ast::Program` into LLVM IR using the Inkwell
//! safe bindings: basic blocks, typed instructions, and explicit control
//! transfers, followed by a whole-module verification pass.
//!
//! ## Architecture
//!
//! - [`codegen`]: the lowering pass ([`CodeGen`]) — declarations, statement
//!   control flow, expressions, and the address/value duality for
//!   assignable expressions
//! - [`error`]: the fatal error taxonomy of the pass
//!
//! ## Pipeline
//!
//! ```text
//! Program -> per-declaration lowering -> LLVM IR -> Module::verify
//! ```
//!
//! The pass is single-threaded and strictly sequential: declarations are
//! processed in source order, and generation either runs to completion or
//! aborts on the first fatal error.

pub mod codegen;
pub mod error;

use inkwell::context::Context;

pub use codegen::CodeGen;
pub use error::CodegenError;

use cedar_ast::Program;

/// Lower a program and return the textual IR of the verified module.
///
/// This is the main library entry point: it owns a fresh LLVM context for
/// the duration of the pass, generates the module, verifies it, and hands
/// back the printable result.
///
/// # Errors
///
/// Returns the first fatal [`CodegenError`] encountered; no partial output
/// is produced.
pub fn generate_ir(program: &Program) -> Result<String, CodegenError> {
    let context = Context::create();
    let mut codegen = CodeGen::new(&context, "cedar_module");
    codegen.generate(program)?;
    Ok(codegen.ir())
}

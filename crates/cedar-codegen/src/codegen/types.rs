//! Source type to LLVM type mapping.
//!
//! The primitive mapping is fixed: void/char/int/double map to LLVM
//! void/i8/i32/f64. Pointers map to the context's single opaque pointer
//! type without resolving the pointee — pointee types are recovered from
//! recorded source types, never from produced values. A named type
//! resolves through the unit-wide registry: structs to their (possibly
//! still opaque) struct type, function-pointer signatures to the pointer
//! type.

use inkwell::context::Context;
use inkwell::types::{BasicMetadataTypeEnum, BasicType, BasicTypeEnum, FunctionType, StructType};
use inkwell::AddressSpace;
use rustc_hash::FxHashMap;

use cedar_ast::{Primitive, Type};

use super::FnSig;
use crate::error::CodegenError;

/// Resolve a source type in a value position.
///
/// # Errors
///
/// `UnknownType` for a named type with no registry entry; `void` has no
/// value representation and is rejected.
pub(crate) fn llvm_type<'ctx>(
    context: &'ctx Context,
    ty: &Type,
    struct_types: &FxHashMap<String, StructType<'ctx>>,
    fn_ptr_sigs: &FxHashMap<String, FnSig>,
) -> Result<BasicTypeEnum<'ctx>, CodegenError> {
    match ty {
        Type::Primitive(Primitive::Void) => Err(CodegenError::UnsupportedFeature {
            feature: "'void' in a value position".to_string(),
        }),
        Type::Primitive(Primitive::Char) => Ok(context.i8_type().into()),
        Type::Primitive(Primitive::Int) => Ok(context.i32_type().into()),
        Type::Primitive(Primitive::Double) => Ok(context.f64_type().into()),
        Type::Named(name) => {
            if let Some(struct_ty) = struct_types.get(name) {
                Ok((*struct_ty).into())
            } else if fn_ptr_sigs.contains_key(name) {
                Ok(context.ptr_type(AddressSpace::default()).into())
            } else {
                Err(CodegenError::UnknownType { name: name.clone() })
            }
        }
        Type::Pointer(_) => Ok(context.ptr_type(AddressSpace::default()).into()),
    }
}

/// Build an LLVM function type from source return and parameter types.
///
/// Handled separately from [`llvm_type`] so `void` returns are
/// representable.
pub(crate) fn llvm_fn_type<'ctx>(
    context: &'ctx Context,
    return_type: &Type,
    params: &[Type],
    struct_types: &FxHashMap<String, StructType<'ctx>>,
    fn_ptr_sigs: &FxHashMap<String, FnSig>,
) -> Result<FunctionType<'ctx>, CodegenError> {
    let mut param_types: Vec<BasicMetadataTypeEnum<'ctx>> = Vec::with_capacity(params.len());
    for param in params {
        param_types.push(llvm_type(context, param, struct_types, fn_ptr_sigs)?.into());
    }

    match return_type {
        Type::Primitive(Primitive::Void) => Ok(context.void_type().fn_type(&param_types, false)),
        other => {
            Ok(llvm_type(context, other, struct_types, fn_ptr_sigs)?.fn_type(&param_types, false))
        }
    }
}

//! LLVM IR generation from the Cedar tree.
//!
//! - [`CodeGen`]: main codegen struct holding the LLVM context, module,
//!   builder, and the unit-wide named-type registry
//! - [`types`]: source type to LLVM type mapping
//! - [`scope`]: arena-indexed scope table
//! - [`expr`]: expression lowering and the address/value duality
//! - [`stmt`]: statement and control-flow lowering

pub mod expr;
pub(crate) mod scope;
pub mod stmt;
pub mod types;

use inkwell::builder::Builder;
use inkwell::context::Context;
use inkwell::module::Module;
use inkwell::types::{BasicTypeEnum, FunctionType, StructType};
use inkwell::values::FunctionValue;
use rustc_hash::FxHashMap;

use cedar_ast::{Decl, Param, Primitive, Program, Stmt, StructField, Type};

use self::scope::{Binding, ScopeArena};
use crate::error::CodegenError;

/// A function signature kept as source types, so calls can recover
/// parameter and return types without introspecting LLVM values.
#[derive(Debug, Clone)]
pub(crate) struct FnSig {
    pub return_type: Type,
    pub params: Vec<Type>,
}

/// The main code generation context.
///
/// Owns the in-progress LLVM module and every name table of the pass. The
/// LLVM `Context` is borrowed and must outlive the `CodeGen`.
pub struct CodeGen<'ctx> {
    pub(crate) context: &'ctx Context,
    pub(crate) module: Module<'ctx>,
    pub(crate) builder: Builder<'ctx>,

    // ── Named-type registry (unit-wide, lives for the whole pass) ────
    /// Declared struct types by name. Opaque until the struct is defined.
    pub(crate) struct_types: FxHashMap<String, StructType<'ctx>>,
    /// Ordered field layout per struct: index = declaration position.
    pub(crate) struct_fields: FxHashMap<String, Vec<(String, Type)>>,
    /// Named function-pointer signatures.
    pub(crate) fn_ptr_sigs: FxHashMap<String, FnSig>,

    // ── Function tracking ────────────────────────────────────────────
    /// Source signatures of declared functions, for direct-call lowering.
    pub(crate) functions: FxHashMap<String, FnSig>,
    /// The function currently being defined.
    pub(crate) current_fn: Option<FunctionValue<'ctx>>,

    // ── Variable tracking ────────────────────────────────────────────
    pub(crate) scopes: ScopeArena<'ctx>,
}

impl<'ctx> CodeGen<'ctx> {
    /// Create a codegen instance targeting a fresh module.
    pub fn new(context: &'ctx Context, module_name: &str) -> Self {
        CodeGen {
            context,
            module: context.create_module(module_name),
            builder: context.create_builder(),
            struct_types: FxHashMap::default(),
            struct_fields: FxHashMap::default(),
            fn_ptr_sigs: FxHashMap::default(),
            functions: FxHashMap::default(),
            current_fn: None,
            scopes: ScopeArena::new(),
        }
    }

    /// Lower a whole program and verify the resulting module.
    ///
    /// Declarations are processed strictly in source order, so forward
    /// declarations must precede uses — including the declare-then-define
    /// protocol for recursive struct types.
    pub fn generate(&mut self, program: &Program) -> Result<(), CodegenError> {
        for decl in &program.declarations {
            self.lower_decl(decl)?;
        }

        self.module
            .verify()
            .map_err(|e| CodegenError::ModuleVerification {
                message: e.to_string(),
            })
    }

    /// The textual IR of the module as generated so far.
    pub fn ir(&self) -> String {
        self.module.print_to_string().to_string()
    }

    /// The underlying LLVM module.
    pub fn module(&self) -> &Module<'ctx> {
        &self.module
    }

    // ── Declaration lowering ─────────────────────────────────────────

    fn lower_decl(&mut self, decl: &Decl) -> Result<(), CodegenError> {
        match decl {
            Decl::Function {
                identifier,
                return_type,
                parameters,
                body,
            } => {
                let fn_val = self.declare_function(identifier, return_type, parameters)?;
                if let Some(body) = body {
                    self.define_function(fn_val, identifier, return_type, parameters, body)?;
                }
                Ok(())
            }
            Decl::Struct { identifier, fields } => self.lower_struct(identifier, fields),
            Decl::FunctionPointer {
                identifier,
                return_type,
                parameters,
            } => {
                self.fn_ptr_sigs.insert(
                    identifier.clone(),
                    FnSig {
                        return_type: return_type.clone(),
                        params: parameters.iter().map(|p| p.ty.clone()).collect(),
                    },
                );
                Ok(())
            }
            Decl::Variable { identifier, .. } => Err(CodegenError::UnsupportedFeature {
                feature: format!("global variable declaration '{identifier}'"),
            }),
        }
    }

    /// Create (or reuse) the signature-only function object.
    ///
    /// A definition after a forward declaration reuses the declared
    /// function rather than creating a duplicate.
    fn declare_function(
        &mut self,
        name: &str,
        return_type: &Type,
        parameters: &[Param],
    ) -> Result<FunctionValue<'ctx>, CodegenError> {
        if let Some(existing) = self.module.get_function(name) {
            return Ok(existing);
        }

        let param_types: Vec<Type> = parameters.iter().map(|p| p.ty.clone()).collect();
        let fn_type = self.fn_type(return_type, &param_types)?;
        let fn_val = self.module.add_function(name, fn_type, None);
        for (param, value) in parameters.iter().zip(fn_val.get_param_iter()) {
            value.set_name(&param.identifier);
        }

        self.functions.insert(
            name.to_string(),
            FnSig {
                return_type: return_type.clone(),
                params: param_types,
            },
        );

        Ok(fn_val)
    }

    fn define_function(
        &mut self,
        fn_val: FunctionValue<'ctx>,
        name: &str,
        return_type: &Type,
        parameters: &[Param],
        body: &[Stmt],
    ) -> Result<(), CodegenError> {
        let entry = self.context.append_basic_block(fn_val, "entry");
        self.builder.position_at_end(entry);
        self.current_fn = Some(fn_val);

        // Parameters are bound into a fresh scope, recording both the
        // resolved and the source type of each.
        self.scopes.push();
        for (i, param) in parameters.iter().enumerate() {
            let resolved = self.resolve(&param.ty)?;
            let alloca = self.builder.build_alloca(resolved, &param.identifier)?;
            let incoming =
                fn_val
                    .get_nth_param(i as u32)
                    .ok_or_else(|| CodegenError::Builder {
                        message: format!("missing parameter {i} of function '{name}'"),
                    })?;
            self.builder.build_store(alloca, incoming)?;
            self.scopes.define(
                &param.identifier,
                Binding {
                    storage: alloca,
                    resolved,
                    source: param.ty.clone(),
                },
            );
        }

        for stmt in body {
            self.lower_stmt(stmt)?;
        }

        // Termination tie-break for the final block: an already-terminated
        // block (the body ended in a return) is left alone; otherwise a
        // void function gets its implicit return and anything else is a
        // missing-return error.
        if !self.block_terminated() {
            if matches!(return_type, Type::Primitive(Primitive::Void)) {
                self.builder.build_return(None)?;
            } else {
                return Err(CodegenError::MissingReturn {
                    function: name.to_string(),
                });
            }
        }

        self.scopes.pop();
        self.current_fn = None;
        Ok(())
    }

    /// Two-phase struct lowering.
    ///
    /// A forward declaration (no fields) creates the opaque type object
    /// and an empty layout entry; the definition fills the body in field
    /// order. A later declaration or definition of an already-known struct
    /// reuses the existing type object, preserving type identity.
    fn lower_struct(&mut self, name: &str, fields: &[StructField]) -> Result<(), CodegenError> {
        let struct_ty = match self.struct_types.get(name) {
            Some(existing) => *existing,
            None => {
                let ty = self.context.opaque_struct_type(name);
                self.struct_types.insert(name.to_string(), ty);
                self.struct_fields.insert(name.to_string(), Vec::new());
                ty
            }
        };

        if fields.is_empty() {
            return Ok(());
        }

        let mut field_types: Vec<BasicTypeEnum<'ctx>> = Vec::with_capacity(fields.len());
        let mut layout: Vec<(String, Type)> = Vec::with_capacity(fields.len());
        for field in fields {
            field_types.push(self.resolve(&field.ty)?);
            layout.push((field.identifier.clone(), field.ty.clone()));
        }
        struct_ty.set_body(&field_types, false);
        self.struct_fields.insert(name.to_string(), layout);
        Ok(())
    }

    // ── Shared helpers ───────────────────────────────────────────────

    pub(crate) fn resolve(&self, ty: &Type) -> Result<BasicTypeEnum<'ctx>, CodegenError> {
        types::llvm_type(self.context, ty, &self.struct_types, &self.fn_ptr_sigs)
    }

    pub(crate) fn fn_type(
        &self,
        return_type: &Type,
        params: &[Type],
    ) -> Result<FunctionType<'ctx>, CodegenError> {
        types::llvm_fn_type(
            self.context,
            return_type,
            params,
            &self.struct_types,
            &self.fn_ptr_sigs,
        )
    }

    pub(crate) fn current_function(&self) -> FunctionValue<'ctx> {
        self.current_fn.expect("no current function during codegen")
    }

    /// Build an alloca in the function's entry block.
    ///
    /// Locals declared in nested blocks or loop bodies stay visible for
    /// the rest of the function, so their storage must dominate every
    /// later use; placing all allocas in the entry block guarantees that
    /// (and keeps loop iterations from growing the stack).
    pub(crate) fn build_entry_alloca(
        &self,
        ty: BasicTypeEnum<'ctx>,
        name: &str,
    ) -> Result<inkwell::values::PointerValue<'ctx>, CodegenError> {
        let fn_val = self.current_function();
        let entry_bb = fn_val
            .get_first_basic_block()
            .ok_or_else(|| CodegenError::Builder {
                message: "function has no entry block".to_string(),
            })?;

        let current_bb = self.builder.get_insert_block();

        if let Some(first_inst) = entry_bb.get_first_instruction() {
            self.builder.position_before(&first_inst);
        } else {
            self.builder.position_at_end(entry_bb);
        }

        let alloca = self.builder.build_alloca(ty, name)?;

        if let Some(bb) = current_bb {
            self.builder.position_at_end(bb);
        }

        Ok(alloca)
    }

    /// Whether the current insertion point already has a terminator.
    pub(crate) fn block_terminated(&self) -> bool {
        self.builder
            .get_insert_block()
            .is_some_and(|bb| bb.get_terminator().is_some())
    }
}

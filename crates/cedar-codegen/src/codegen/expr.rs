//! Expression lowering.
//!
//! The assignable forms — identifiers, member access, indexing, and prefix
//! dereference — are unified under two dual operations: [`CodeGen::address_of`]
//! produces a storage address without loading, [`CodeGen::value_of`] loads
//! through it. Everything else (literals, operators, calls, comma chains)
//! yields a value directly and is lowered by [`CodeGen::lower_expr`].
//!
//! Because LLVM pointers are opaque, every structural step (field offset,
//! element type, pointee type) consults the source types recorded in scope
//! bindings and the named-type registry; nothing is derived from an LLVM
//! value.

use inkwell::values::{BasicMetadataValueEnum, BasicValueEnum, CallSiteValue, IntValue};
use inkwell::{FloatPredicate, IntPredicate};

use cedar_ast::{BinOp, Expr, Primitive, Type, UnaryOp};

use super::CodeGen;
use crate::error::CodegenError;

/// A loaded value together with its source type.
pub(crate) struct TypedValue<'ctx> {
    pub value: BasicValueEnum<'ctx>,
    pub ty: Type,
}

/// A storage location: the address, the LLVM type of what it holds, and
/// the source type of what a load would yield.
pub(crate) struct Place<'ctx> {
    pub ptr: inkwell::values::PointerValue<'ctx>,
    pub resolved: inkwell::types::BasicTypeEnum<'ctx>,
    pub source: Type,
}

impl<'ctx> CodeGen<'ctx> {
    // ── The address/value duality ────────────────────────────────────

    /// Resolve an assignable expression to its storage address.
    pub(crate) fn address_of(&mut self, expr: &Expr) -> Result<Place<'ctx>, CodegenError> {
        match expr {
            Expr::Identifier(name) => {
                let binding = self.scopes.lookup(name).cloned().ok_or_else(|| {
                    CodegenError::UnknownIdentifier { name: name.clone() }
                })?;
                Ok(Place {
                    ptr: binding.storage,
                    resolved: binding.resolved,
                    source: binding.source,
                })
            }

            Expr::Member {
                object,
                member,
                arrow,
            } => {
                // Arrow access loads the object's pointer value and uses it
                // as the struct base; dot access uses the object's own
                // storage address directly.
                let (base_ptr, struct_name) = if *arrow {
                    let object_val = self.value_of(object)?;
                    let Type::Pointer(pointee) = object_val.ty else {
                        return Err(CodegenError::InvalidLValue {
                            found: "arrow access through a non-pointer value".to_string(),
                        });
                    };
                    let Type::Named(name) = *pointee else {
                        return Err(CodegenError::InvalidLValue {
                            found: "arrow access through a pointer to a non-struct".to_string(),
                        });
                    };
                    (object_val.value.into_pointer_value(), name)
                } else {
                    let place = self.address_of(object)?;
                    let Type::Named(name) = place.source else {
                        return Err(CodegenError::InvalidLValue {
                            found: "member access on a non-struct value".to_string(),
                        });
                    };
                    (place.ptr, name)
                };

                let struct_ty = *self.struct_types.get(&struct_name).ok_or_else(|| {
                    CodegenError::UnknownType {
                        name: struct_name.clone(),
                    }
                })?;
                let layout = self.struct_fields.get(&struct_name).ok_or_else(|| {
                    CodegenError::UnknownType {
                        name: struct_name.clone(),
                    }
                })?;
                let (index, field_ty) = layout
                    .iter()
                    .enumerate()
                    .find(|(_, (field_name, _))| field_name == member)
                    .map(|(i, (_, ty))| (i, ty.clone()))
                    .ok_or_else(|| CodegenError::UnknownIdentifier {
                        name: format!("{struct_name}.{member}"),
                    })?;

                let field_ptr =
                    self.builder
                        .build_struct_gep(struct_ty, base_ptr, index as u32, "field_ptr")?;
                Ok(Place {
                    ptr: field_ptr,
                    resolved: self.resolve(&field_ty)?,
                    source: field_ty,
                })
            }

            Expr::Index { array, index } => {
                let index_val = self.value_of(index)?.value.into_int_value();
                let base = self.address_of(array)?;

                if base.resolved.is_array_type() {
                    // Storage holds the aggregate itself; step into it.
                    let zero = self.context.i32_type().const_zero();
                    let elem_ptr = unsafe {
                        self.builder.build_in_bounds_gep(
                            base.resolved,
                            base.ptr,
                            &[zero, index_val],
                            "elem_ptr",
                        )?
                    };
                    return Ok(Place {
                        ptr: elem_ptr,
                        resolved: self.resolve(&base.source)?,
                        source: base.source,
                    });
                }

                // Storage holds a pointer; load it and scale by the
                // recorded element type.
                let Type::Pointer(elem) = base.source else {
                    return Err(CodegenError::InvalidLValue {
                        found: "index into a non-array, non-pointer value".to_string(),
                    });
                };
                let base_val = self
                    .builder
                    .build_load(base.resolved, base.ptr, "base_ptr")?
                    .into_pointer_value();
                let elem_resolved = self.resolve(&elem)?;
                let elem_ptr = unsafe {
                    self.builder.build_in_bounds_gep(
                        elem_resolved,
                        base_val,
                        &[index_val],
                        "elem_ptr",
                    )?
                };
                Ok(Place {
                    ptr: elem_ptr,
                    resolved: elem_resolved,
                    source: *elem,
                })
            }

            // `*p` addresses the location p points at: the value of p,
            // one indirection fewer than p's own address.
            Expr::Unary {
                op: UnaryOp::Deref,
                operand,
                ..
            } => {
                let pointer = self.value_of(operand)?;
                let Type::Pointer(pointee) = pointer.ty else {
                    return Err(CodegenError::InvalidLValue {
                        found: "dereference of a non-pointer value".to_string(),
                    });
                };
                Ok(Place {
                    ptr: pointer.value.into_pointer_value(),
                    resolved: self.resolve(&pointee)?,
                    source: *pointee,
                })
            }

            other => Err(CodegenError::InvalidLValue {
                found: expr_kind(other).to_string(),
            }),
        }
    }

    /// Load an expression's value, through [`Self::address_of`] for the
    /// assignable forms and directly for everything else.
    pub(crate) fn value_of(&mut self, expr: &Expr) -> Result<TypedValue<'ctx>, CodegenError> {
        match expr {
            Expr::Identifier(_)
            | Expr::Member { .. }
            | Expr::Index { .. }
            | Expr::Unary {
                op: UnaryOp::Deref,
                ..
            } => {
                let place = self.address_of(expr)?;

                // An array-typed slot decays to a pointer to its first
                // element instead of loading the aggregate.
                if place.resolved.is_array_type() {
                    let zero = self.context.i32_type().const_zero();
                    let decayed = unsafe {
                        self.builder.build_in_bounds_gep(
                            place.resolved,
                            place.ptr,
                            &[zero, zero],
                            "decay",
                        )?
                    };
                    return Ok(TypedValue {
                        value: decayed.into(),
                        ty: Type::Pointer(Box::new(place.source)),
                    });
                }

                let value = self.builder.build_load(place.resolved, place.ptr, "loadtmp")?;
                Ok(TypedValue {
                    value,
                    ty: place.source,
                })
            }
            other => self.lower_expr(other),
        }
    }

    // ── Expression lowering ──────────────────────────────────────────

    pub(crate) fn lower_expr(&mut self, expr: &Expr) -> Result<TypedValue<'ctx>, CodegenError> {
        match expr {
            Expr::IntLiteral(value) => Ok(TypedValue {
                value: self
                    .context
                    .i32_type()
                    .const_int(*value as u64, true)
                    .into(),
                ty: Type::Primitive(Primitive::Int),
            }),

            Expr::DoubleLiteral(value) => Ok(TypedValue {
                value: self.context.f64_type().const_float(*value).into(),
                ty: Type::Primitive(Primitive::Double),
            }),

            Expr::CharLiteral(value) => Ok(TypedValue {
                value: self
                    .context
                    .i8_type()
                    .const_int(*value as u64, false)
                    .into(),
                ty: Type::Primitive(Primitive::Char),
            }),

            Expr::StringLiteral(value) => {
                let global = self.builder.build_global_string_ptr(value, ".str")?;
                Ok(TypedValue {
                    value: global.as_pointer_value().into(),
                    ty: Type::Pointer(Box::new(Type::Primitive(Primitive::Char))),
                })
            }

            Expr::Identifier(_)
            | Expr::Member { .. }
            | Expr::Index { .. }
            | Expr::Unary {
                op: UnaryOp::Deref,
                ..
            } => self.value_of(expr),

            Expr::Binary {
                op: BinOp::Assign,
                left,
                right,
            } => self.lower_assign(left, right),

            Expr::Binary { op, left, right } => self.lower_binary(*op, left, right),

            Expr::Unary {
                op,
                operand,
                prefix,
            } => self.lower_unary(*op, operand, *prefix),

            Expr::Call { callee, arguments } => self.lower_call(callee, arguments),

            Expr::Cast { .. } => Err(CodegenError::UnsupportedFeature {
                feature: "explicit cast expressions".to_string(),
            }),

            Expr::Comma(operands) => {
                let mut last = None;
                for operand in operands {
                    last = Some(self.lower_expr(operand)?);
                }
                last.ok_or_else(|| CodegenError::UnsupportedFeature {
                    feature: "empty comma expression".to_string(),
                })
            }
        }
    }

    /// `lhs = rhs`: store through the left side's address; the result is
    /// the stored r-value, so assignments nest.
    fn lower_assign(&mut self, left: &Expr, right: &Expr) -> Result<TypedValue<'ctx>, CodegenError> {
        let place = self.address_of(left)?;
        let value = self.value_of(right)?;
        self.builder.build_store(place.ptr, value.value)?;
        Ok(value)
    }

    fn lower_binary(
        &mut self,
        op: BinOp,
        left: &Expr,
        right: &Expr,
    ) -> Result<TypedValue<'ctx>, CodegenError> {
        let lhs = self.value_of(left)?;
        let rhs = self.value_of(right)?;

        if lhs.value.is_int_value() && rhs.value.is_int_value() {
            let l = lhs.value.into_int_value();
            let r = rhs.value.into_int_value();
            let (value, ty): (BasicValueEnum<'ctx>, Type) = match op {
                BinOp::Add => (self.builder.build_int_add(l, r, "addtmp")?.into(), lhs.ty),
                BinOp::Sub => (self.builder.build_int_sub(l, r, "subtmp")?.into(), lhs.ty),
                BinOp::Mul => (self.builder.build_int_mul(l, r, "multmp")?.into(), lhs.ty),
                BinOp::Div => (
                    self.builder.build_int_signed_div(l, r, "divtmp")?.into(),
                    lhs.ty,
                ),
                BinOp::Lt => (
                    self.builder
                        .build_int_compare(IntPredicate::SLT, l, r, "cmptmp")?
                        .into(),
                    Type::Primitive(Primitive::Int),
                ),
                BinOp::Gt => (
                    self.builder
                        .build_int_compare(IntPredicate::SGT, l, r, "cmptmp")?
                        .into(),
                    Type::Primitive(Primitive::Int),
                ),
                BinOp::Eq => (
                    self.builder
                        .build_int_compare(IntPredicate::EQ, l, r, "cmptmp")?
                        .into(),
                    Type::Primitive(Primitive::Int),
                ),
                BinOp::Ne => (
                    self.builder
                        .build_int_compare(IntPredicate::NE, l, r, "cmptmp")?
                        .into(),
                    Type::Primitive(Primitive::Int),
                ),
                BinOp::Assign => unreachable!("assignment is lowered separately"),
            };
            return Ok(TypedValue { value, ty });
        }

        if lhs.value.is_float_value() && rhs.value.is_float_value() {
            let l = lhs.value.into_float_value();
            let r = rhs.value.into_float_value();
            let (value, ty): (BasicValueEnum<'ctx>, Type) = match op {
                BinOp::Add => (self.builder.build_float_add(l, r, "addtmp")?.into(), lhs.ty),
                BinOp::Sub => (self.builder.build_float_sub(l, r, "subtmp")?.into(), lhs.ty),
                BinOp::Mul => (self.builder.build_float_mul(l, r, "multmp")?.into(), lhs.ty),
                BinOp::Div => (self.builder.build_float_div(l, r, "divtmp")?.into(), lhs.ty),
                BinOp::Lt => (
                    self.builder
                        .build_float_compare(FloatPredicate::OLT, l, r, "cmptmp")?
                        .into(),
                    Type::Primitive(Primitive::Int),
                ),
                BinOp::Gt => (
                    self.builder
                        .build_float_compare(FloatPredicate::OGT, l, r, "cmptmp")?
                        .into(),
                    Type::Primitive(Primitive::Int),
                ),
                BinOp::Eq => (
                    self.builder
                        .build_float_compare(FloatPredicate::OEQ, l, r, "cmptmp")?
                        .into(),
                    Type::Primitive(Primitive::Int),
                ),
                BinOp::Ne => (
                    self.builder
                        .build_float_compare(FloatPredicate::ONE, l, r, "cmptmp")?
                        .into(),
                    Type::Primitive(Primitive::Int),
                ),
                BinOp::Assign => unreachable!("assignment is lowered separately"),
            };
            return Ok(TypedValue { value, ty });
        }

        Err(CodegenError::UnsupportedFeature {
            feature: format!("operator {op:?} on non-arithmetic operands"),
        })
    }

    fn lower_unary(
        &mut self,
        op: UnaryOp,
        operand: &Expr,
        prefix: bool,
    ) -> Result<TypedValue<'ctx>, CodegenError> {
        match op {
            UnaryOp::Neg => {
                let val = self.value_of(operand)?;
                let value: BasicValueEnum<'ctx> = if val.value.is_float_value() {
                    self.builder
                        .build_float_neg(val.value.into_float_value(), "negtmp")?
                        .into()
                } else {
                    self.builder
                        .build_int_neg(val.value.into_int_value(), "negtmp")?
                        .into()
                };
                Ok(TypedValue { value, ty: val.ty })
            }

            UnaryOp::Not => {
                let val = self.value_of(operand)?;
                let cond = self.coerce_condition(&val)?;
                Ok(TypedValue {
                    value: self.builder.build_not(cond, "nottmp")?.into(),
                    ty: Type::Primitive(Primitive::Int),
                })
            }

            UnaryOp::AddrOf => {
                let place = self.address_of(operand)?;
                Ok(TypedValue {
                    value: place.ptr.into(),
                    ty: Type::Pointer(Box::new(place.source)),
                })
            }

            // Load through the operand's value; the pointee type comes
            // from the recorded source type, not the pointer itself.
            UnaryOp::Deref => {
                let pointer = self.value_of(operand)?;
                let Type::Pointer(pointee) = pointer.ty else {
                    return Err(CodegenError::InvalidLValue {
                        found: "dereference of a non-pointer value".to_string(),
                    });
                };
                let resolved = self.resolve(&pointee)?;
                let value = self.builder.build_load(
                    resolved,
                    pointer.value.into_pointer_value(),
                    "loadtmp",
                )?;
                Ok(TypedValue {
                    value,
                    ty: *pointee,
                })
            }

            UnaryOp::Inc | UnaryOp::Dec => {
                let place = self.address_of(operand)?;
                let old = self.builder.build_load(place.resolved, place.ptr, "loadtmp")?;

                let new: BasicValueEnum<'ctx> = if old.is_float_value() {
                    let one = self.context.f64_type().const_float(1.0);
                    let old_f = old.into_float_value();
                    if op == UnaryOp::Inc {
                        self.builder.build_float_add(old_f, one, "inctmp")?.into()
                    } else {
                        self.builder.build_float_sub(old_f, one, "dectmp")?.into()
                    }
                } else {
                    let old_i = old.into_int_value();
                    let one = old_i.get_type().const_int(1, false);
                    if op == UnaryOp::Inc {
                        self.builder.build_int_add(old_i, one, "inctmp")?.into()
                    } else {
                        self.builder.build_int_sub(old_i, one, "dectmp")?.into()
                    }
                };
                self.builder.build_store(place.ptr, new)?;

                // Prefix yields the adjusted value, postfix the original.
                Ok(TypedValue {
                    value: if prefix { new } else { old },
                    ty: place.source,
                })
            }
        }
    }

    /// Lower a call, deciding direct vs indirect at lowering time.
    ///
    /// The callee name is resolved against declared functions first; only
    /// if that fails is it treated as a bound function-pointer value,
    /// using the signature registered for its declared type. The two
    /// forms need different instruction shapes, so the split cannot be
    /// deferred.
    fn lower_call(
        &mut self,
        callee: &Expr,
        arguments: &[Expr],
    ) -> Result<TypedValue<'ctx>, CodegenError> {
        let Expr::Identifier(name) = callee else {
            return Err(CodegenError::UnsupportedFeature {
                feature: "call through a non-identifier callee expression".to_string(),
            });
        };

        let mut args: Vec<BasicMetadataValueEnum<'ctx>> = Vec::with_capacity(arguments.len());
        for argument in arguments {
            args.push(self.value_of(argument)?.value.into());
        }

        if let Some(sig) = self.functions.get(name).cloned() {
            let fn_val = self.module.get_function(name).ok_or_else(|| {
                CodegenError::UnknownIdentifier { name: name.clone() }
            })?;
            let call = self
                .builder
                .build_call(fn_val, &args, call_name(&sig.return_type))?;
            return self.call_result(call, sig.return_type);
        }

        let binding = self
            .scopes
            .lookup(name)
            .cloned()
            .ok_or_else(|| CodegenError::UnknownIdentifier { name: name.clone() })?;
        let sig = match &binding.source {
            Type::Named(type_name) => self
                .fn_ptr_sigs
                .get(type_name)
                .cloned()
                .ok_or_else(|| CodegenError::UnknownType {
                    name: type_name.clone(),
                })?,
            other => {
                return Err(CodegenError::UnsupportedFeature {
                    feature: format!(
                        "indirect call through '{name}' of type {other} (no function-pointer signature)"
                    ),
                })
            }
        };

        let fn_ptr = self
            .builder
            .build_load(binding.resolved, binding.storage, "fnptr")?
            .into_pointer_value();
        let fn_ty = self.fn_type(&sig.return_type, &sig.params)?;
        let call =
            self.builder
                .build_indirect_call(fn_ty, fn_ptr, &args, call_name(&sig.return_type))?;
        self.call_result(call, sig.return_type)
    }

    fn call_result(
        &self,
        call: CallSiteValue<'ctx>,
        return_type: Type,
    ) -> Result<TypedValue<'ctx>, CodegenError> {
        if matches!(return_type, Type::Primitive(Primitive::Void)) {
            // Placeholder; a well-formed program never reads a void result.
            return Ok(TypedValue {
                value: self.context.i32_type().const_zero().into(),
                ty: return_type,
            });
        }
        let value = call
            .try_as_basic_value()
            .basic()
            .ok_or_else(|| CodegenError::Builder {
                message: "call to a non-void function produced no value".to_string(),
            })?;
        Ok(TypedValue {
            value,
            ty: return_type,
        })
    }

    /// Coerce a scalar to an i1 condition: wider integers compare `!= 0`,
    /// floats compare `!= 0.0`, pointers compare non-null, and an i1
    /// passes through unchanged.
    pub(crate) fn coerce_condition(
        &mut self,
        val: &TypedValue<'ctx>,
    ) -> Result<IntValue<'ctx>, CodegenError> {
        match val.value {
            BasicValueEnum::IntValue(iv) => {
                if iv.get_type().get_bit_width() == 1 {
                    Ok(iv)
                } else {
                    Ok(self.builder.build_int_compare(
                        IntPredicate::NE,
                        iv,
                        iv.get_type().const_zero(),
                        "tobool",
                    )?)
                }
            }
            BasicValueEnum::FloatValue(fv) => Ok(self.builder.build_float_compare(
                FloatPredicate::ONE,
                fv,
                fv.get_type().const_zero(),
                "tobool",
            )?),
            BasicValueEnum::PointerValue(pv) => Ok(self.builder.build_is_not_null(pv, "tobool")?),
            _ => Err(CodegenError::UnsupportedFeature {
                feature: "condition of non-scalar type".to_string(),
            }),
        }
    }
}

/// Instruction name for a call result; LLVM forbids naming void results.
fn call_name(return_type: &Type) -> &'static str {
    if matches!(return_type, Type::Primitive(Primitive::Void)) {
        ""
    } else {
        "calltmp"
    }
}

/// Short description of a non-assignable expression kind for error text.
fn expr_kind(expr: &Expr) -> &'static str {
    match expr {
        Expr::IntLiteral(_) => "integer literal",
        Expr::DoubleLiteral(_) => "double literal",
        Expr::CharLiteral(_) => "character literal",
        Expr::StringLiteral(_) => "string literal",
        Expr::Identifier(_) => "identifier",
        Expr::Binary { .. } => "binary expression result",
        Expr::Unary { .. } => "unary expression result",
        Expr::Call { .. } => "call result",
        Expr::Cast { .. } => "cast result",
        Expr::Member { .. } => "member access",
        Expr::Index { .. } => "index expression",
        Expr::Comma(_) => "comma expression result",
    }
}

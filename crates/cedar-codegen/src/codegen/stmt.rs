//! Statement and control-flow lowering.
//!
//! Each structured statement produces one or more basic blocks. A
//! recurring tie-break applies throughout: a block only receives a
//! closing branch if its insertion point is not already terminated, so a
//! body that ended in a return is never double-terminated.
//!
//! Scoping is per function body, not per nested block: a variable
//! declared inside an `if` body stays visible (and redefinable) after the
//! block ends.

use inkwell::types::BasicType;
use inkwell::values::IntValue;

use cedar_ast::{Decl, Expr, ForInit, Stmt, SwitchCase};

use super::scope::Binding;
use super::CodeGen;
use crate::error::CodegenError;

impl<'ctx> CodeGen<'ctx> {
    pub(crate) fn lower_stmt(&mut self, stmt: &Stmt) -> Result<(), CodegenError> {
        match stmt {
            Stmt::Block(statements) => {
                for statement in statements {
                    self.lower_stmt(statement)?;
                }
                Ok(())
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => self.lower_if(condition, then_branch, else_branch.as_deref()),

            Stmt::While { condition, body } => self.lower_while(condition, body),

            Stmt::DoWhile { condition, body } => self.lower_do_while(condition, body),

            Stmt::For {
                init,
                condition,
                update,
                body,
            } => self.lower_for(init.as_ref(), condition.as_ref(), update.as_ref(), body),

            Stmt::Return(value) => {
                match value {
                    Some(expr) => {
                        let result = self.value_of(expr)?;
                        self.builder.build_return(Some(&result.value))?;
                    }
                    None => {
                        self.builder.build_return(None)?;
                    }
                }
                Ok(())
            }

            Stmt::Expr(expr) => {
                self.lower_expr(expr)?;
                Ok(())
            }

            Stmt::Decl(decl) => self.lower_local_decl(decl),

            Stmt::Switch {
                condition,
                cases,
                default,
            } => self.lower_switch(condition, cases, default.as_deref()),
        }
    }

    // ── Structured control flow ──────────────────────────────────────

    fn lower_if(
        &mut self,
        condition: &Expr,
        then_branch: &Stmt,
        else_branch: Option<&Stmt>,
    ) -> Result<(), CodegenError> {
        let fn_val = self.current_function();
        let cond = self.lower_condition(condition)?;

        let then_bb = self.context.append_basic_block(fn_val, "then");
        let else_bb = else_branch.map(|_| self.context.append_basic_block(fn_val, "else"));
        let merge_bb = self.context.append_basic_block(fn_val, "if_merge");

        self.builder
            .build_conditional_branch(cond, then_bb, else_bb.unwrap_or(merge_bb))?;

        self.builder.position_at_end(then_bb);
        self.lower_stmt(then_branch)?;
        if !self.block_terminated() {
            self.builder.build_unconditional_branch(merge_bb)?;
        }

        if let (Some(else_bb), Some(else_branch)) = (else_bb, else_branch) {
            self.builder.position_at_end(else_bb);
            self.lower_stmt(else_branch)?;
            if !self.block_terminated() {
                self.builder.build_unconditional_branch(merge_bb)?;
            }
        }

        self.builder.position_at_end(merge_bb);
        Ok(())
    }

    fn lower_while(&mut self, condition: &Expr, body: &Stmt) -> Result<(), CodegenError> {
        let fn_val = self.current_function();

        let cond_bb = self.context.append_basic_block(fn_val, "while_cond");
        let body_bb = self.context.append_basic_block(fn_val, "while_body");
        let merge_bb = self.context.append_basic_block(fn_val, "while_merge");

        self.builder.build_unconditional_branch(cond_bb)?;

        self.builder.position_at_end(cond_bb);
        let cond = self.lower_condition(condition)?;
        self.builder
            .build_conditional_branch(cond, body_bb, merge_bb)?;

        self.builder.position_at_end(body_bb);
        self.lower_stmt(body)?;
        if !self.block_terminated() {
            self.builder.build_unconditional_branch(cond_bb)?;
        }

        self.builder.position_at_end(merge_bb);
        Ok(())
    }

    fn lower_do_while(&mut self, condition: &Expr, body: &Stmt) -> Result<(), CodegenError> {
        let fn_val = self.current_function();

        let body_bb = self.context.append_basic_block(fn_val, "do_body");
        let cond_bb = self.context.append_basic_block(fn_val, "do_cond");
        let merge_bb = self.context.append_basic_block(fn_val, "do_merge");

        // The body runs once before the condition is first checked.
        self.builder.build_unconditional_branch(body_bb)?;

        self.builder.position_at_end(body_bb);
        self.lower_stmt(body)?;
        if !self.block_terminated() {
            self.builder.build_unconditional_branch(cond_bb)?;
        }

        self.builder.position_at_end(cond_bb);
        let cond = self.lower_condition(condition)?;
        self.builder
            .build_conditional_branch(cond, body_bb, merge_bb)?;

        self.builder.position_at_end(merge_bb);
        Ok(())
    }

    fn lower_for(
        &mut self,
        init: Option<&ForInit>,
        condition: Option<&Expr>,
        update: Option<&Expr>,
        body: &Stmt,
    ) -> Result<(), CodegenError> {
        let fn_val = self.current_function();

        // Init runs once in its own block.
        let init_bb = self.context.append_basic_block(fn_val, "for_init");
        self.builder.build_unconditional_branch(init_bb)?;
        self.builder.position_at_end(init_bb);
        match init {
            Some(ForInit::Expr(expr)) => {
                self.lower_expr(expr)?;
            }
            Some(ForInit::Decl(decl)) => self.lower_local_decl(decl)?,
            None => {}
        }

        let cond_bb = self.context.append_basic_block(fn_val, "for_cond");
        let body_bb = self.context.append_basic_block(fn_val, "for_body");
        let update_bb = self.context.append_basic_block(fn_val, "for_update");
        let merge_bb = self.context.append_basic_block(fn_val, "for_merge");

        self.builder.build_unconditional_branch(cond_bb)?;

        // An absent condition loops unconditionally.
        self.builder.position_at_end(cond_bb);
        match condition {
            Some(condition) => {
                let cond = self.lower_condition(condition)?;
                self.builder
                    .build_conditional_branch(cond, body_bb, merge_bb)?;
            }
            None => {
                self.builder.build_unconditional_branch(body_bb)?;
            }
        }

        self.builder.position_at_end(body_bb);
        self.lower_stmt(body)?;
        if !self.block_terminated() {
            self.builder.build_unconditional_branch(update_bb)?;
        }

        // The update block always branches back to the condition.
        self.builder.position_at_end(update_bb);
        if let Some(update) = update {
            self.lower_expr(update)?;
        }
        self.builder.build_unconditional_branch(cond_bb)?;

        self.builder.position_at_end(merge_bb);
        Ok(())
    }

    /// Lower a switch with C fallthrough: each case body falls into the
    /// next case block unless already terminated; the last case falls
    /// into the default (when present) and the default into the merge.
    fn lower_switch(
        &mut self,
        condition: &Expr,
        cases: &[SwitchCase],
        default: Option<&Stmt>,
    ) -> Result<(), CodegenError> {
        let fn_val = self.current_function();

        let scrutinee = self.value_of(condition)?;
        let scrutinee = match scrutinee.value {
            inkwell::values::BasicValueEnum::IntValue(iv) => iv,
            _ => {
                return Err(CodegenError::UnsupportedFeature {
                    feature: "switch on a non-integer value".to_string(),
                })
            }
        };

        let case_bbs: Vec<_> = cases
            .iter()
            .map(|_| self.context.append_basic_block(fn_val, "case"))
            .collect();
        let default_bb = default.map(|_| self.context.append_basic_block(fn_val, "switch_default"));
        let merge_bb = self.context.append_basic_block(fn_val, "switch_merge");

        let keys: Vec<(IntValue<'ctx>, _)> = cases
            .iter()
            .zip(&case_bbs)
            .map(|(case, bb)| {
                (
                    scrutinee.get_type().const_int(case.value as u64, true),
                    *bb,
                )
            })
            .collect();
        self.builder
            .build_switch(scrutinee, default_bb.unwrap_or(merge_bb), &keys)?;

        for (i, case) in cases.iter().enumerate() {
            self.builder.position_at_end(case_bbs[i]);
            self.lower_stmt(&case.body)?;
            if !self.block_terminated() {
                let next = case_bbs
                    .get(i + 1)
                    .copied()
                    .or(default_bb)
                    .unwrap_or(merge_bb);
                self.builder.build_unconditional_branch(next)?;
            }
        }

        if let (Some(default_bb), Some(default)) = (default_bb, default) {
            self.builder.position_at_end(default_bb);
            self.lower_stmt(default)?;
            if !self.block_terminated() {
                self.builder.build_unconditional_branch(merge_bb)?;
            }
        }

        self.builder.position_at_end(merge_bb);
        Ok(())
    }

    // ── Local declarations ───────────────────────────────────────────

    /// Allocate and bind a local variable in the current scope.
    fn lower_local_decl(&mut self, decl: &Decl) -> Result<(), CodegenError> {
        let Decl::Variable {
            identifier,
            ty,
            array_size,
            initializer,
        } = decl
        else {
            return Err(CodegenError::UnsupportedFeature {
                feature: format!("local declaration of '{}'", decl.identifier()),
            });
        };

        let element = self.resolve(ty)?;

        if let Some(size) = array_size {
            if initializer.is_some() {
                return Err(CodegenError::UnsupportedFeature {
                    feature: format!("array initializer for '{identifier}'"),
                });
            }
            let Expr::IntLiteral(n) = size else {
                return Err(CodegenError::UnsupportedFeature {
                    feature: format!("non-constant array size for '{identifier}'"),
                });
            };
            let array_ty = element.array_type(*n as u32);
            let alloca = self.build_entry_alloca(array_ty.into(), identifier)?;
            self.scopes.define(
                identifier,
                Binding {
                    storage: alloca,
                    resolved: array_ty.into(),
                    // The recorded source type is the element type; the
                    // resolved array type carries the aggregate shape.
                    source: ty.clone(),
                },
            );
            return Ok(());
        }

        let alloca = self.build_entry_alloca(element, identifier)?;
        if let Some(init) = initializer {
            let value = self.value_of(init)?;
            self.builder.build_store(alloca, value.value)?;
        }
        self.scopes.define(
            identifier,
            Binding {
                storage: alloca,
                resolved: element,
                source: ty.clone(),
            },
        );
        Ok(())
    }

    /// Evaluate a condition expression and coerce it to i1.
    fn lower_condition(&mut self, condition: &Expr) -> Result<IntValue<'ctx>, CodegenError> {
        let value = self.value_of(condition)?;
        self.coerce_condition(&value)
    }
}

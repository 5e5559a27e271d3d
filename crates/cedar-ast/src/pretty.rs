//! Tree pretty printer — outputs a readable indented dump for debugging.
//!
//! Example output:
//! ```text
//! Program
//!   FunctionDefinition "add" -> int
//!     Param "a": int
//!     Param "b": int
//!     Return
//!       Binary Add
//!         Identifier "a"
//!         Identifier "b"
//! ```

use crate::decl::Decl;
use crate::expr::Expr;
use crate::stmt::{ForInit, Stmt};
use crate::Program;

/// Pretty-prints a tree to a string.
pub struct PrettyPrinter {
    output: String,
    indent: usize,
}

impl PrettyPrinter {
    pub fn new() -> Self {
        Self {
            output: String::new(),
            indent: 0,
        }
    }

    pub fn print_program(&mut self, program: &Program) -> &str {
        self.line("Program");
        self.indent += 1;
        for decl in &program.declarations {
            self.print_decl(decl);
        }
        self.indent -= 1;
        &self.output
    }

    fn print_decl(&mut self, decl: &Decl) {
        match decl {
            Decl::Function {
                identifier,
                return_type,
                parameters,
                body,
            } => {
                let kind = if body.is_some() {
                    "FunctionDefinition"
                } else {
                    "FunctionDeclaration"
                };
                self.line(&format!("{kind} \"{identifier}\" -> {return_type}"));
                self.indent += 1;
                for param in parameters {
                    self.line(&format!("Param \"{}\": {}", param.identifier, param.ty));
                }
                if let Some(body) = body {
                    for stmt in body {
                        self.print_stmt(stmt);
                    }
                }
                self.indent -= 1;
            }
            Decl::Variable {
                identifier,
                ty,
                array_size,
                initializer,
            } => {
                self.line(&format!("Variable \"{identifier}\": {ty}"));
                self.indent += 1;
                if let Some(size) = array_size {
                    self.line("ArraySize");
                    self.indent += 1;
                    self.print_expr(size);
                    self.indent -= 1;
                }
                if let Some(init) = initializer {
                    self.line("Initializer");
                    self.indent += 1;
                    self.print_expr(init);
                    self.indent -= 1;
                }
                self.indent -= 1;
            }
            Decl::Struct { identifier, fields } => {
                let kind = if fields.is_empty() {
                    "StructDeclaration"
                } else {
                    "StructDefinition"
                };
                self.line(&format!("{kind} \"{identifier}\""));
                self.indent += 1;
                for field in fields {
                    self.line(&format!("Field \"{}\": {}", field.identifier, field.ty));
                }
                self.indent -= 1;
            }
            Decl::FunctionPointer {
                identifier,
                return_type,
                parameters,
            } => {
                self.line(&format!("FunctionPointer \"{identifier}\" -> {return_type}"));
                self.indent += 1;
                for param in parameters {
                    self.line(&format!("Param \"{}\": {}", param.identifier, param.ty));
                }
                self.indent -= 1;
            }
        }
    }

    fn print_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Block(statements) => {
                self.line("Block");
                self.indent += 1;
                for s in statements {
                    self.print_stmt(s);
                }
                self.indent -= 1;
            }
            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                self.line("If");
                self.indent += 1;
                self.print_expr(condition);
                self.print_stmt(then_branch);
                if let Some(else_branch) = else_branch {
                    self.line("Else");
                    self.indent += 1;
                    self.print_stmt(else_branch);
                    self.indent -= 1;
                }
                self.indent -= 1;
            }
            Stmt::While { condition, body } => {
                self.line("While");
                self.indent += 1;
                self.print_expr(condition);
                self.print_stmt(body);
                self.indent -= 1;
            }
            Stmt::DoWhile { condition, body } => {
                self.line("DoWhile");
                self.indent += 1;
                self.print_stmt(body);
                self.print_expr(condition);
                self.indent -= 1;
            }
            Stmt::For {
                init,
                condition,
                update,
                body,
            } => {
                self.line("For");
                self.indent += 1;
                match init {
                    Some(ForInit::Expr(e)) => self.print_expr(e),
                    Some(ForInit::Decl(d)) => self.print_decl(d),
                    None => self.line("(no init)"),
                }
                match condition {
                    Some(c) => self.print_expr(c),
                    None => self.line("(no condition)"),
                }
                match update {
                    Some(u) => self.print_expr(u),
                    None => self.line("(no update)"),
                }
                self.print_stmt(body);
                self.indent -= 1;
            }
            Stmt::Return(expr) => {
                self.line("Return");
                if let Some(expr) = expr {
                    self.indent += 1;
                    self.print_expr(expr);
                    self.indent -= 1;
                }
            }
            Stmt::Expr(expr) => {
                self.line("ExpressionStatement");
                self.indent += 1;
                self.print_expr(expr);
                self.indent -= 1;
            }
            Stmt::Decl(decl) => self.print_decl(decl),
            Stmt::Switch {
                condition,
                cases,
                default,
            } => {
                self.line("Switch");
                self.indent += 1;
                self.print_expr(condition);
                for case in cases {
                    self.line(&format!("Case {}", case.value));
                    self.indent += 1;
                    self.print_stmt(&case.body);
                    self.indent -= 1;
                }
                if let Some(default) = default {
                    self.line("Default");
                    self.indent += 1;
                    self.print_stmt(default);
                    self.indent -= 1;
                }
                self.indent -= 1;
            }
        }
    }

    fn print_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::IntLiteral(v) => self.line(&format!("IntLiteral {v}")),
            Expr::DoubleLiteral(v) => self.line(&format!("DoubleLiteral {v}")),
            Expr::CharLiteral(c) => self.line(&format!("CharLiteral {:?}", *c as char)),
            Expr::StringLiteral(s) => self.line(&format!("StringLiteral {s:?}")),
            Expr::Identifier(name) => self.line(&format!("Identifier \"{name}\"")),
            Expr::Binary { op, left, right } => {
                self.line(&format!("Binary {op:?}"));
                self.indent += 1;
                self.print_expr(left);
                self.print_expr(right);
                self.indent -= 1;
            }
            Expr::Unary {
                op,
                operand,
                prefix,
            } => {
                let position = if *prefix { "prefix" } else { "postfix" };
                self.line(&format!("Unary {op:?} ({position})"));
                self.indent += 1;
                self.print_expr(operand);
                self.indent -= 1;
            }
            Expr::Call { callee, arguments } => {
                self.line("Call");
                self.indent += 1;
                self.print_expr(callee);
                for arg in arguments {
                    self.print_expr(arg);
                }
                self.indent -= 1;
            }
            Expr::Cast { target, operand } => {
                self.line(&format!("Cast -> {target}"));
                self.indent += 1;
                self.print_expr(operand);
                self.indent -= 1;
            }
            Expr::Member {
                object,
                member,
                arrow,
            } => {
                let kind = if *arrow { "arrow" } else { "dot" };
                self.line(&format!("Member \"{member}\" ({kind})"));
                self.indent += 1;
                self.print_expr(object);
                self.indent -= 1;
            }
            Expr::Index { array, index } => {
                self.line("Index");
                self.indent += 1;
                self.print_expr(array);
                self.print_expr(index);
                self.indent -= 1;
            }
            Expr::Comma(operands) => {
                self.line("Comma");
                self.indent += 1;
                for operand in operands {
                    self.print_expr(operand);
                }
                self.indent -= 1;
            }
        }
    }

    fn line(&mut self, text: &str) {
        for _ in 0..self.indent {
            self.output.push_str("  ");
        }
        self.output.push_str(text);
        self.output.push('\n');
    }
}

impl Default for PrettyPrinter {
    fn default() -> Self {
        Self::new()
    }
}

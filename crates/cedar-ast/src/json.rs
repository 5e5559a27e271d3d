//! JSON front-end: builds a [`Program`] from the external document format.
//!
//! The producer delivers the tree as a JSON document of `nodeType`-tagged
//! objects, e.g.:
//!
//! ```json
//! {
//!   "declarations": [
//!     {
//!       "nodeType": "FunctionDefinition",
//!       "identifier": "main",
//!       "returnType": { "nodeType": "PrimitiveType", "kind": "int" },
//!       "parameters": [],
//!       "body": { "nodeType": "BlockStatement", "statements": [] }
//!     }
//!   ]
//! }
//! ```
//!
//! Forward declarations use distinct tags (`FunctionDeclaration` vs
//! `FunctionDefinition`, `StructDeclaration` vs `StructDefinition`); both
//! map onto the same [`Decl`] variant with the defining part absent. An
//! unrecognized node kind is the producer's error and fails the whole load.

use std::fmt;

use serde_json::Value;

use crate::decl::{Decl, Param, StructField};
use crate::expr::{BinOp, Expr, UnaryOp};
use crate::stmt::{ForInit, Stmt, SwitchCase};
use crate::types::{Primitive, Type};
use crate::Program;

/// An error while building the tree from a JSON document.
#[derive(Debug)]
pub enum FromJsonError {
    /// The document is not valid JSON at all.
    Syntax(serde_json::Error),
    /// A node carried a `nodeType` this front-end does not know.
    UnknownNode { node_type: String },
    /// A known node was missing a required field, or the field had the
    /// wrong JSON shape.
    BadField {
        node_type: &'static str,
        field: &'static str,
    },
    /// An operator spelling with no corresponding [`BinOp`]/[`UnaryOp`].
    UnknownOperator { symbol: String },
    /// A primitive type kind with no corresponding [`Primitive`].
    UnknownPrimitive { kind: String },
}

impl fmt::Display for FromJsonError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Syntax(e) => write!(f, "invalid JSON document: {e}"),
            Self::UnknownNode { node_type } => write!(f, "unknown node type: {node_type}"),
            Self::BadField { node_type, field } => {
                write!(f, "missing or ill-typed field '{field}' on {node_type}")
            }
            Self::UnknownOperator { symbol } => write!(f, "unknown operator: {symbol}"),
            Self::UnknownPrimitive { kind } => write!(f, "unknown primitive type: {kind}"),
        }
    }
}

impl std::error::Error for FromJsonError {}

impl From<serde_json::Error> for FromJsonError {
    fn from(e: serde_json::Error) -> Self {
        Self::Syntax(e)
    }
}

/// Parse a JSON source string into a [`Program`].
pub fn program_from_str(source: &str) -> Result<Program, FromJsonError> {
    let value: Value = serde_json::from_str(source)?;
    program_from_value(&value)
}

/// Build a [`Program`] from an already-parsed JSON value.
pub fn program_from_value(value: &Value) -> Result<Program, FromJsonError> {
    let declarations = field(value, "Program", "declarations")?
        .as_array()
        .ok_or(FromJsonError::BadField {
            node_type: "Program",
            field: "declarations",
        })?
        .iter()
        .map(parse_decl)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Program { declarations })
}

// ── Field access helpers ─────────────────────────────────────────────

fn field<'a>(
    value: &'a Value,
    node_type: &'static str,
    name: &'static str,
) -> Result<&'a Value, FromJsonError> {
    value.get(name).ok_or(FromJsonError::BadField {
        node_type,
        field: name,
    })
}

fn str_field<'a>(
    value: &'a Value,
    node_type: &'static str,
    name: &'static str,
) -> Result<&'a str, FromJsonError> {
    field(value, node_type, name)?
        .as_str()
        .ok_or(FromJsonError::BadField {
            node_type,
            field: name,
        })
}

fn node_type(value: &Value) -> Result<&str, FromJsonError> {
    value
        .get("nodeType")
        .and_then(Value::as_str)
        .ok_or(FromJsonError::BadField {
            node_type: "<node>",
            field: "nodeType",
        })
}

fn parse_list<T>(
    value: &Value,
    node_type: &'static str,
    name: &'static str,
    parse: impl Fn(&Value) -> Result<T, FromJsonError>,
) -> Result<Vec<T>, FromJsonError> {
    field(value, node_type, name)?
        .as_array()
        .ok_or(FromJsonError::BadField {
            node_type,
            field: name,
        })?
        .iter()
        .map(parse)
        .collect()
}

/// `null` and absent fields both mean "not present".
fn optional<'a>(value: &'a Value, name: &str) -> Option<&'a Value> {
    match value.get(name) {
        None | Some(Value::Null) => None,
        Some(v) => Some(v),
    }
}

// ── Types ────────────────────────────────────────────────────────────

fn parse_type(value: &Value) -> Result<Type, FromJsonError> {
    match node_type(value)? {
        "PrimitiveType" => {
            let kind = str_field(value, "PrimitiveType", "kind")?;
            let primitive =
                Primitive::from_name(kind).ok_or_else(|| FromJsonError::UnknownPrimitive {
                    kind: kind.to_string(),
                })?;
            Ok(Type::Primitive(primitive))
        }
        "NamedType" => Ok(Type::Named(
            str_field(value, "NamedType", "identifier")?.to_string(),
        )),
        "PointerType" => {
            let base = parse_type(field(value, "PointerType", "baseType")?)?;
            Ok(Type::Pointer(Box::new(base)))
        }
        other => Err(FromJsonError::UnknownNode {
            node_type: other.to_string(),
        }),
    }
}

// ── Expressions ──────────────────────────────────────────────────────

fn parse_expr(value: &Value) -> Result<Expr, FromJsonError> {
    match node_type(value)? {
        "Literal" => parse_literal(value),
        "Identifier" => Ok(Expr::Identifier(
            str_field(value, "Identifier", "identifier")?.to_string(),
        )),
        "BinaryExpression" => {
            let symbol = str_field(value, "BinaryExpression", "operator")?;
            let op = BinOp::from_symbol(symbol).ok_or_else(|| FromJsonError::UnknownOperator {
                symbol: symbol.to_string(),
            })?;
            Ok(Expr::Binary {
                op,
                left: Box::new(parse_expr(field(value, "BinaryExpression", "left")?)?),
                right: Box::new(parse_expr(field(value, "BinaryExpression", "right")?)?),
            })
        }
        "UnaryExpression" => {
            let symbol = str_field(value, "UnaryExpression", "operator")?;
            let op = UnaryOp::from_symbol(symbol).ok_or_else(|| FromJsonError::UnknownOperator {
                symbol: symbol.to_string(),
            })?;
            let prefix = field(value, "UnaryExpression", "prefix")?
                .as_bool()
                .ok_or(FromJsonError::BadField {
                    node_type: "UnaryExpression",
                    field: "prefix",
                })?;
            Ok(Expr::Unary {
                op,
                operand: Box::new(parse_expr(field(value, "UnaryExpression", "operand")?)?),
                prefix,
            })
        }
        "CastExpression" => Ok(Expr::Cast {
            target: parse_type(field(value, "CastExpression", "targetType")?)?,
            operand: Box::new(parse_expr(field(value, "CastExpression", "expression")?)?),
        }),
        "CallExpression" => Ok(Expr::Call {
            callee: Box::new(parse_expr(field(value, "CallExpression", "callee")?)?),
            arguments: parse_list(value, "CallExpression", "arguments", parse_expr)?,
        }),
        "MemberAccessExpression" => Ok(Expr::Member {
            object: Box::new(parse_expr(field(value, "MemberAccessExpression", "object")?)?),
            member: str_field(value, "MemberAccessExpression", "member")?.to_string(),
            arrow: str_field(value, "MemberAccessExpression", "kind")? == "arrow",
        }),
        "IndexExpression" => Ok(Expr::Index {
            array: Box::new(parse_expr(field(value, "IndexExpression", "array")?)?),
            index: Box::new(parse_expr(field(value, "IndexExpression", "index")?)?),
        }),
        "CommaExpression" => Ok(Expr::Comma(parse_list(
            value,
            "CommaExpression",
            "expressions",
            parse_expr,
        )?)),
        other => Err(FromJsonError::UnknownNode {
            node_type: other.to_string(),
        }),
    }
}

fn parse_literal(value: &Value) -> Result<Expr, FromJsonError> {
    let lit = field(value, "Literal", "value")?;
    match str_field(value, "Literal", "kind")? {
        "integer" => lit
            .as_i64()
            .map(Expr::IntLiteral)
            .ok_or(FromJsonError::BadField {
                node_type: "Literal",
                field: "value",
            }),
        "double" => lit
            .as_f64()
            .map(Expr::DoubleLiteral)
            .ok_or(FromJsonError::BadField {
                node_type: "Literal",
                field: "value",
            }),
        // Characters arrive either as a one-character string or as a code point.
        "character" => match lit {
            Value::String(s) if s.len() == 1 => Ok(Expr::CharLiteral(s.as_bytes()[0])),
            Value::Number(n) => n
                .as_u64()
                .filter(|&c| c <= u8::MAX as u64)
                .map(|c| Expr::CharLiteral(c as u8))
                .ok_or(FromJsonError::BadField {
                    node_type: "Literal",
                    field: "value",
                }),
            _ => Err(FromJsonError::BadField {
                node_type: "Literal",
                field: "value",
            }),
        },
        "string" => lit
            .as_str()
            .map(|s| Expr::StringLiteral(s.to_string()))
            .ok_or(FromJsonError::BadField {
                node_type: "Literal",
                field: "value",
            }),
        other => Err(FromJsonError::UnknownNode {
            node_type: format!("Literal/{other}"),
        }),
    }
}

// ── Statements ───────────────────────────────────────────────────────

fn parse_stmt(value: &Value) -> Result<Stmt, FromJsonError> {
    match node_type(value)? {
        "BlockStatement" => Ok(Stmt::Block(parse_list(
            value,
            "BlockStatement",
            "statements",
            parse_stmt,
        )?)),
        "ReturnStatement" => {
            let expr = optional(value, "expression").map(parse_expr).transpose()?;
            Ok(Stmt::Return(expr))
        }
        "IfStatement" => Ok(Stmt::If {
            condition: parse_expr(field(value, "IfStatement", "condition")?)?,
            then_branch: Box::new(parse_stmt(field(value, "IfStatement", "thenBranch")?)?),
            else_branch: optional(value, "elseBranch")
                .map(|v| parse_stmt(v).map(Box::new))
                .transpose()?,
        }),
        "WhileStatement" => Ok(Stmt::While {
            condition: parse_expr(field(value, "WhileStatement", "condition")?)?,
            body: Box::new(parse_stmt(field(value, "WhileStatement", "loopBody")?)?),
        }),
        "DoWhileStatement" => Ok(Stmt::DoWhile {
            condition: parse_expr(field(value, "DoWhileStatement", "condition")?)?,
            body: Box::new(parse_stmt(field(value, "DoWhileStatement", "loopBody")?)?),
        }),
        "ForStatement" => {
            let init = optional(value, "init").map(parse_for_init).transpose()?;
            let condition = optional(value, "condition").map(parse_expr).transpose()?;
            let update = optional(value, "update").map(parse_expr).transpose()?;
            Ok(Stmt::For {
                init,
                condition,
                update,
                body: Box::new(parse_stmt(field(value, "ForStatement", "body")?)?),
            })
        }
        "ExpressionStatement" => {
            let inner = field(value, "ExpressionStatement", "expression")?;
            // The wrapped node is either an expression proper or a local
            // declaration; the tag decides.
            if node_type(inner)?.ends_with("Declaration") {
                Ok(Stmt::Decl(Box::new(parse_decl(inner)?)))
            } else {
                Ok(Stmt::Expr(parse_expr(inner)?))
            }
        }
        "SwitchStatement" => Ok(Stmt::Switch {
            condition: parse_expr(field(value, "SwitchStatement", "condition")?)?,
            cases: parse_list(value, "SwitchStatement", "cases", parse_case)?,
            default: optional(value, "defaultBody")
                .map(|v| parse_stmt(v).map(Box::new))
                .transpose()?,
        }),
        other => Err(FromJsonError::UnknownNode {
            node_type: other.to_string(),
        }),
    }
}

fn parse_case(value: &Value) -> Result<SwitchCase, FromJsonError> {
    let key = field(value, "CaseStatement", "value")?;
    // The key may be a bare integer or a wrapped integer literal node.
    let key = match key.as_i64() {
        Some(n) => n,
        None => match parse_expr(key)? {
            Expr::IntLiteral(n) => n,
            _ => {
                return Err(FromJsonError::BadField {
                    node_type: "CaseStatement",
                    field: "value",
                })
            }
        },
    };
    Ok(SwitchCase {
        value: key,
        body: Box::new(parse_stmt(field(value, "CaseStatement", "body")?)?),
    })
}

fn parse_for_init(value: &Value) -> Result<ForInit, FromJsonError> {
    if node_type(value)?.ends_with("Declaration") {
        Ok(ForInit::Decl(Box::new(parse_decl(value)?)))
    } else {
        Ok(ForInit::Expr(parse_expr(value)?))
    }
}

// ── Declarations ─────────────────────────────────────────────────────

fn parse_decl(value: &Value) -> Result<Decl, FromJsonError> {
    match node_type(value)? {
        "VariableDeclaration" => Ok(Decl::Variable {
            identifier: str_field(value, "VariableDeclaration", "identifier")?.to_string(),
            ty: parse_type(field(value, "VariableDeclaration", "type")?)?,
            array_size: optional(value, "arraySize").map(parse_expr).transpose()?,
            initializer: optional(value, "initializer").map(parse_expr).transpose()?,
        }),
        "FunctionDeclaration" => {
            let (identifier, return_type, parameters) = parse_signature(value)?;
            Ok(Decl::Function {
                identifier,
                return_type,
                parameters,
                body: None,
            })
        }
        "FunctionDefinition" => {
            let (identifier, return_type, parameters) = parse_signature(value)?;
            let body = match parse_stmt(field(value, "FunctionDefinition", "body")?)? {
                Stmt::Block(statements) => statements,
                other => vec![other],
            };
            Ok(Decl::Function {
                identifier,
                return_type,
                parameters,
                body: Some(body),
            })
        }
        "FunctionPointerDeclaration" => {
            let (identifier, return_type, parameters) = parse_signature(value)?;
            Ok(Decl::FunctionPointer {
                identifier,
                return_type,
                parameters,
            })
        }
        "StructDeclaration" => Ok(Decl::Struct {
            identifier: str_field(value, "StructDeclaration", "identifier")?.to_string(),
            fields: Vec::new(),
        }),
        "StructDefinition" => Ok(Decl::Struct {
            identifier: str_field(value, "StructDefinition", "identifier")?.to_string(),
            fields: parse_list(value, "StructDefinition", "fields", parse_field_decl)?,
        }),
        other => Err(FromJsonError::UnknownNode {
            node_type: other.to_string(),
        }),
    }
}

fn parse_signature(value: &Value) -> Result<(String, Type, Vec<Param>), FromJsonError> {
    let identifier = str_field(value, "FunctionDeclaration", "identifier")?.to_string();
    let return_type = parse_type(field(value, "FunctionDeclaration", "returnType")?)?;
    let parameters = parse_list(value, "FunctionDeclaration", "parameters", parse_param)?;
    Ok((identifier, return_type, parameters))
}

fn parse_param(value: &Value) -> Result<Param, FromJsonError> {
    Ok(Param {
        identifier: str_field(value, "Parameter", "identifier")?.to_string(),
        ty: parse_type(field(value, "Parameter", "type")?)?,
    })
}

/// Struct fields arrive as `VariableDeclaration` nodes; only the name and
/// type survive into the field table.
fn parse_field_decl(value: &Value) -> Result<StructField, FromJsonError> {
    match parse_decl(value)? {
        Decl::Variable { identifier, ty, .. } => Ok(StructField { identifier, ty }),
        _ => Err(FromJsonError::BadField {
            node_type: "StructDefinition",
            field: "fields",
        }),
    }
}

//! Compilation of literal argument values.
use apollo_compiler::Name;
use apollo_compiler::ast;
use apollo_compiler::executable::Field;
use serde_json::Number;
use serde_json_bytes::Value;

use crate::error::CompileError;
use crate::json_ext::Object;

/// Compiles the arguments of `field` into the object passed to its resolver.
///
/// Only scalar and enum literals are supported. Arguments keep the order of the document.
pub(super) fn compile_arguments(field: &Field) -> Result<Object, CompileError> {
    let mut compiled = Object::with_capacity(field.arguments.len());
    for argument in &field.arguments {
        let value = compile_literal(&argument.value, &argument.name, &field.name)?;
        compiled.insert(argument.name.as_str(), value);
    }
    Ok(compiled)
}

/// Converts one literal value node into its JSON value.
///
/// Enum values become strings holding the enum value name. Variables, lists and input objects
/// fail with `unsupported-argument-kind`.
pub(super) fn compile_literal(
    value: &ast::Value,
    argument: &Name,
    field: &Name,
) -> Result<Value, CompileError> {
    match value {
        ast::Value::Null => Ok(Value::Null),
        ast::Value::Boolean(b) => Ok(Value::Bool(*b)),
        ast::Value::String(s) => Ok(Value::String(s.as_str().into())),
        ast::Value::Enum(name) => Ok(Value::String(name.as_str().into())),
        ast::Value::Int(int) => int
            .as_str()
            .parse::<i64>()
            .map(Value::from)
            .map_err(|_| CompileError::InvalidArgumentLiteral {
                kind: "int",
                value: int.as_str().to_owned(),
                argument: argument.clone(),
            }),
        ast::Value::Float(float) => float
            .as_str()
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or_else(|| CompileError::InvalidArgumentLiteral {
                kind: "float",
                value: float.as_str().to_owned(),
                argument: argument.clone(),
            }),
        ast::Value::Variable(_) | ast::Value::List(_) | ast::Value::Object(_) => {
            Err(CompileError::UnsupportedArgumentKind {
                kind: value_kind(value),
                argument: argument.clone(),
                field: field.clone(),
            })
        }
    }
}

pub(super) fn value_kind(value: &ast::Value) -> &'static str {
    match value {
        ast::Value::Null => "null",
        ast::Value::Enum(_) => "enum",
        ast::Value::Variable(_) => "variable",
        ast::Value::String(_) => "string",
        ast::Value::Float(_) => "float",
        ast::Value::Int(_) => "int",
        ast::Value::Boolean(_) => "boolean",
        ast::Value::List(_) => "list",
        ast::Value::Object(_) => "object",
    }
}

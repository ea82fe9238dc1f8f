//! Error types for compiling queries and for invoking compiled operations.
use apollo_compiler::Name;
use apollo_compiler::ast::OperationType;
use displaydoc::Display;
use thiserror::Error;

use crate::resolver::ResolverError;
use crate::schema::FieldCoordinate;

/// Errors aborting the compilation of a query document.
///
/// No partial artifact is ever produced: any of these stops compilation of the whole document.
#[derive(Error, Debug, Display, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CompileError {
    /// parsing error: {0}
    ParsingError(String),

    /// {0} operations are not supported, only queries can be compiled
    UnsupportedOperationType(OperationType),

    /// operations must be named to be compiled
    MissingOperationName,

    /// no type binding for field '{field}' on type '{parent_type}'
    MissingTypeBinding { field: Name, parent_type: Name },

    /// unsupported-argument-kind: {kind} value for argument '{argument}' of field '{field}'
    UnsupportedArgumentKind {
        kind: &'static str,
        argument: Name,
        field: Name,
    },

    /// invalid {kind} literal '{value}' for argument '{argument}'
    InvalidArgumentLiteral {
        kind: &'static str,
        value: String,
        argument: Name,
    },

    /// {0} selections are not supported
    UnsupportedSelection(&'static str),

    /// field '{field}' has list type {ty} of objects, which cannot be compiled
    UnsupportedListField { field: Name, ty: String },

    /// field '{field}' has abstract type '{ty}', which cannot be compiled
    UnsupportedAbstractType { field: Name, ty: Name },

    /// selection processing recursion limit({0}) exceeded
    RecursionLimitExceeded(usize),

    /// compile stacks are unbalanced: {0}
    StackImbalance(&'static str),
}

/// Errors building an [`ExecutableSchema`](crate::ExecutableSchema).
#[derive(Error, Debug, Display, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SchemaError {
    /// schema parsing error: {0}
    ParsingError(String),

    /// cannot register a resolver for unknown field {0}
    UnknownField(String),
}

/// Errors raised while running a compiled operation.
///
/// Resolver failures are carried as-is in [`ExecutionError::Resolver`]:
/// compiled operations do not collect per-field errors.
#[derive(Error, Debug, Display, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ExecutionError {
    /// no resolver is registered for {0}
    MissingResolver(FieldCoordinate),

    /// resolver for {0} is asynchronous but was compiled as a synchronous call site
    UnexpectedAsyncResolver(FieldCoordinate),

    /// operation '{0}' is asynchronous and must be awaited
    DeferredOperation(Name),

    /// identifier {0} is not bound by any enclosing scope
    UnboundIdentifier(String),

    /// {0}
    Resolver(#[from] ResolverError),
}

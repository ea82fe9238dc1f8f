//! Per-field resolution strategy and the expressions built from it.
use std::sync::Arc;

use apollo_compiler::Name;
use apollo_compiler::Node;
use apollo_compiler::executable::Field;

use super::arguments::compile_arguments;
use crate::error::CompileError;
use crate::json_ext::Object;
use crate::operation::Binding;
use crate::operation::Expr;
use crate::operation::ObjectScope;
use crate::operation::Properties;
use crate::operation::ResolverCall;
use crate::resolver::ResolveInfo;
use crate::schema::ExecutableSchema;
use crate::schema::FieldCoordinate;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum ResolutionStrategy {
    /// Read the property named after the field off the source value
    Default,
    /// Invoke the resolver registered for the coordinate
    Custom(FieldCoordinate),
}

/// Decisions taken once per field, when leaving it.
#[derive(Debug)]
pub(super) struct FieldPlan {
    pub(super) strategy: ResolutionStrategy,
    pub(super) is_async: bool,
    pub(super) arguments: Object,
}

impl FieldPlan {
    /// Looks up the field configuration of `parent_type.field` and plans the call site.
    ///
    /// Arguments are compiled for every field so that unsupported literals always fail,
    /// but only custom resolvers receive them.
    pub(super) fn new(
        schema: &ExecutableSchema,
        parent_type: &Name,
        field: &Field,
    ) -> Result<Self, CompileError> {
        let arguments = compile_arguments(field)?;
        let coordinate = FieldCoordinate::new(parent_type.clone(), field.name.clone());
        let Some(resolve) = schema.resolve_fn(&coordinate) else {
            return Ok(Self {
                strategy: ResolutionStrategy::Default,
                is_async: false,
                arguments: Object::new(),
            });
        };
        Ok(Self {
            is_async: resolve.is_async(),
            arguments,
            strategy: ResolutionStrategy::Custom(coordinate),
        })
    }

    /// Builds the expression producing the field's own value from `source`.
    pub(super) fn into_value_expr(
        self,
        field: &Node<Field>,
        source: Binding,
        emit_ast: bool,
    ) -> Expr {
        match self.strategy {
            ResolutionStrategy::Default => Expr::Property {
                source,
                key: field.name.clone(),
            },
            ResolutionStrategy::Custom(coordinate) => {
                let info = if emit_ast {
                    ResolveInfo {
                        field_nodes: vec![field.clone()],
                    }
                } else {
                    ResolveInfo::default()
                };
                Expr::Resolve(ResolverCall {
                    coordinate,
                    source,
                    arguments: self.arguments,
                    info: Arc::new(info),
                    awaited: self.is_async,
                })
            }
        }
    }
}

/// Wraps the value of an object-typed field into its scope closure.
pub(super) fn object_scope_expr(
    binding: Binding,
    value: Expr,
    selection: Properties,
    is_async: bool,
) -> Expr {
    Expr::Scope(ObjectScope {
        binding,
        value: Box::new(value),
        selection,
        is_async,
    })
}

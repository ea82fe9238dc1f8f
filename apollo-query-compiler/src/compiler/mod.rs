//! Compiles query operations into [`CompiledOperation`]s.
//!
//! The compiler walks each operation depth-first, keeping three parallel stacks in a
//! [`CompileContext`]: the identifier bound by every open object scope, whether each of
//! those scopes must await, and the properties accumulated for every open selection set.
//! Field strategies are decided when leaving a field, once its nested selection is compiled.
use apollo_compiler::ExecutableDocument;
use apollo_compiler::Name;
use apollo_compiler::Node;
use apollo_compiler::Schema;
use apollo_compiler::ast;
use apollo_compiler::ast::OperationType;
use apollo_compiler::executable::Field;
use apollo_compiler::executable::Operation;
use apollo_compiler::executable::Selection;
use apollo_compiler::executable::SelectionSet;
use apollo_compiler::name;
use apollo_compiler::schema::ExtendedType;
use apollo_compiler::validation::Valid;
use serde_json_bytes::Value;

use self::arguments::value_kind;
use self::strategy::FieldPlan;
use self::strategy::object_scope_expr;
use crate::configuration::Options;
use crate::error::CompileError;
use crate::operation::Binding;
use crate::operation::CompiledArtifact;
use crate::operation::CompiledOperation;
use crate::operation::Expr;
use crate::operation::Properties;
use crate::schema::ExecutableSchema;

mod arguments;
mod assembler;
mod strategy;

pub(crate) const TYPENAME: &str = "__typename";

/// Parses, validates and compiles every operation of `query_source`.
#[tracing::instrument(skip_all, level = "debug")]
pub fn compile(
    query_source: &str,
    schema: &ExecutableSchema,
    options: &Options,
) -> Result<CompiledArtifact, CompileError> {
    let document =
        ExecutableDocument::parse_and_validate(schema.definitions(), query_source, "query.graphql")
            .map_err(|invalid| CompileError::ParsingError(invalid.errors.to_string()))?;
    compile_document(&document, schema, options)
}

/// Compiles every operation of an already validated document.
#[tracing::instrument(skip_all, level = "debug")]
pub fn compile_document(
    document: &Valid<ExecutableDocument>,
    schema: &ExecutableSchema,
    options: &Options,
) -> Result<CompiledArtifact, CompileError> {
    let mut context = CompileContext::new(schema, options);
    let mut artifact = CompiledArtifact::default();
    for operation in document.operations.iter() {
        let compiled = context.compile_operation(operation)?;
        artifact.operations.insert(compiled.name.clone(), compiled);
    }
    Ok(artifact)
}

/// An open object scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CompileFrame {
    source: Binding,
    requires_async: bool,
}

/// Traversal state of one compilation.
struct CompileContext<'a> {
    schema: &'a ExecutableSchema,
    options: &'a Options,
    sources: Vec<Binding>,
    async_flags: Vec<bool>,
    accumulators: Vec<Properties>,
}

impl<'a> CompileContext<'a> {
    fn new(schema: &'a ExecutableSchema, options: &'a Options) -> Self {
        Self {
            schema,
            options,
            sources: Vec::new(),
            async_flags: Vec::new(),
            accumulators: Vec::new(),
        }
    }

    fn compile_operation(
        &mut self,
        operation: &Operation,
    ) -> Result<CompiledOperation, CompileError> {
        if operation.operation_type != OperationType::Query {
            return Err(CompileError::UnsupportedOperationType(
                operation.operation_type,
            ));
        }
        let name = operation
            .name
            .clone()
            .ok_or(CompileError::MissingOperationName)?;
        tracing::debug!(operation = %name, "compiling operation");

        self.push_frame(Binding::RootValue);
        let data = self.compile_selection_set(&operation.selection_set)?;
        let root = self.pop_frame()?;
        self.ensure_balanced()?;

        tracing::debug!(operation = %name, is_async = root.requires_async, "compiled operation");
        Ok(assembler::assemble(name, data, root.requires_async))
    }

    fn compile_selection_set(
        &mut self,
        selection_set: &SelectionSet,
    ) -> Result<Properties, CompileError> {
        self.accumulators.push(Properties::new());
        for selection in &selection_set.selections {
            match selection {
                Selection::Field(field) => self.compile_field(field, &selection_set.ty)?,
                Selection::FragmentSpread(_) => {
                    return Err(CompileError::UnsupportedSelection("fragment spread"));
                }
                Selection::InlineFragment(_) => {
                    return Err(CompileError::UnsupportedSelection("inline fragment"));
                }
            }
        }
        self.accumulators
            .pop()
            .ok_or(CompileError::StackImbalance("selection accumulator stack is empty"))
    }

    fn compile_field(
        &mut self,
        field: &Node<Field>,
        parent_type: &Name,
    ) -> Result<(), CompileError> {
        if is_statically_skipped(field)? {
            return Ok(());
        }
        let binding = TypeBinding::of(self.schema.definitions(), field, parent_type)?;
        let expr = if field.name == TYPENAME && binding.parent.is_object() {
            Expr::Literal(Value::String(parent_type.as_str().into()))
        } else if binding.opens_scope(field)? {
            self.compile_object_field(field, parent_type)?
        } else {
            self.compile_leaf_field(field, parent_type)?
        };
        let response_key = field.alias.as_ref().unwrap_or(&field.name).clone();
        self.accumulators
            .last_mut()
            .ok_or(CompileError::StackImbalance("no selection accumulator for field"))?
            .push((response_key, expr));
        Ok(())
    }

    fn compile_leaf_field(
        &mut self,
        field: &Node<Field>,
        parent_type: &Name,
    ) -> Result<Expr, CompileError> {
        let plan = self.plan_field(field, parent_type)?;
        let source = self.current_source()?;
        Ok(plan.into_value_expr(field, source, self.options.emit_ast))
    }

    fn compile_object_field(
        &mut self,
        field: &Node<Field>,
        parent_type: &Name,
    ) -> Result<Expr, CompileError> {
        let depth = self.sources.len();
        if depth > self.options.recursion_limit {
            tracing::error!(
                "selection processing recursion limit({}) exceeded",
                self.options.recursion_limit
            );
            return Err(CompileError::RecursionLimitExceeded(
                self.options.recursion_limit,
            ));
        }
        self.push_frame(Binding::Result(depth));
        let selection = self.compile_selection_set(&field.selection_set)?;
        let frame = self.pop_frame()?;

        // The field's own value comes from the enclosing scope
        let plan = self.plan_field(field, parent_type)?;
        let is_async = frame.requires_async || plan.is_async;
        let source = self.current_source()?;
        let value = plan.into_value_expr(field, source, self.options.emit_ast);
        Ok(object_scope_expr(frame.source, value, selection, is_async))
    }

    fn plan_field(&mut self, field: &Field, parent_type: &Name) -> Result<FieldPlan, CompileError> {
        let plan = FieldPlan::new(self.schema, parent_type, field)?;
        tracing::trace!(
            field = %field.name,
            parent_type = %parent_type,
            strategy = ?plan.strategy,
            is_async = plan.is_async,
            "planned field"
        );
        if plan.is_async {
            self.mark_async();
        }
        Ok(plan)
    }

    /// Every open scope encloses the call site being classified, and must await it.
    fn mark_async(&mut self) {
        for requires_async in &mut self.async_flags {
            *requires_async = true;
        }
    }

    fn push_frame(&mut self, source: Binding) {
        self.sources.push(source);
        self.async_flags.push(false);
    }

    fn pop_frame(&mut self) -> Result<CompileFrame, CompileError> {
        match (self.sources.pop(), self.async_flags.pop()) {
            (Some(source), Some(requires_async)) => Ok(CompileFrame {
                source,
                requires_async,
            }),
            _ => Err(CompileError::StackImbalance("compile frame stack is empty")),
        }
    }

    fn current_source(&self) -> Result<Binding, CompileError> {
        self.sources
            .last()
            .copied()
            .ok_or(CompileError::StackImbalance("no compile frame for field"))
    }

    fn ensure_balanced(&self) -> Result<(), CompileError> {
        if !self.sources.is_empty() || !self.async_flags.is_empty() {
            return Err(CompileError::StackImbalance(
                "compile frames left open after operation",
            ));
        }
        if !self.accumulators.is_empty() {
            return Err(CompileError::StackImbalance(
                "selection accumulators left open after operation",
            ));
        }
        Ok(())
    }
}

/// Types bound to a field by the validated document: its own named type and its parent type.
struct TypeBinding<'s> {
    ty: &'s ExtendedType,
    parent: &'s ExtendedType,
}

impl<'s> TypeBinding<'s> {
    fn of(schema: &'s Schema, field: &Field, parent_type: &Name) -> Result<Self, CompileError> {
        let missing = || CompileError::MissingTypeBinding {
            field: field.name.clone(),
            parent_type: parent_type.clone(),
        };
        let parent = schema.types.get(parent_type).ok_or_else(missing)?;
        let ty = schema
            .types
            .get(field.ty().inner_named_type())
            .ok_or_else(missing)?;
        Ok(Self { ty, parent })
    }

    /// Whether the field compiles to an object scope rather than a leaf value
    fn opens_scope(&self, field: &Field) -> Result<bool, CompileError> {
        match self.ty {
            ExtendedType::Object(_) | ExtendedType::Interface(_) if field.ty().is_list() => {
                Err(CompileError::UnsupportedListField {
                    field: field.name.clone(),
                    ty: field.ty().to_string(),
                })
            }
            ExtendedType::Object(_) | ExtendedType::Interface(_) => Ok(true),
            ExtendedType::Union(_) => Err(CompileError::UnsupportedAbstractType {
                field: field.name.clone(),
                ty: field.ty().inner_named_type().clone(),
            }),
            ExtendedType::Scalar(_) | ExtendedType::Enum(_) => Ok(false),
            ExtendedType::InputObject(_) => Err(CompileError::MissingTypeBinding {
                field: field.name.clone(),
                parent_type: field.ty().inner_named_type().clone(),
            }),
        }
    }
}

/// `@skip(if: true)` and `@include(if: false)` drop a field from the compiled operation.
fn is_statically_skipped(field: &Field) -> Result<bool, CompileError> {
    for directive in field.directives.iter() {
        let skip_when = match directive.name.as_str() {
            "skip" => true,
            "include" => false,
            _ => continue,
        };
        let condition = match directive.specified_argument_by_name("if").map(|value| &**value) {
            Some(ast::Value::Boolean(condition)) => *condition,
            Some(other) => {
                return Err(CompileError::UnsupportedArgumentKind {
                    kind: value_kind(other),
                    argument: name!("if"),
                    field: field.name.clone(),
                });
            }
            None => continue,
        };
        if condition == skip_when {
            return Ok(true);
        }
    }
    Ok(false)
}

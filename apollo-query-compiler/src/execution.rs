//! Invocation of compiled operations against an executable schema and a root value.
//!
//! Properties are resolved strictly in selection order. Synchronous scopes run to completion
//! in place, asynchronous ones await each of their asynchronous call sites in turn.
use futures::FutureExt;
use futures::future::BoxFuture;
use serde::Deserialize;
use serde::Serialize;
use serde_json_bytes::Value;

use crate::error::ExecutionError;
use crate::json_ext::Object;
use crate::json_ext::is_truthy;
use crate::json_ext::read_property;
use crate::json_ext::shallow_merge;
use crate::operation::Binding;
use crate::operation::CompiledOperation;
use crate::operation::Expr;
use crate::operation::ObjectScope;
use crate::operation::Properties;
use crate::operation::ResolverCall;
use crate::resolver::ResolveFn;
use crate::schema::ExecutableSchema;

/// Result of a compiled operation: `{ data }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub data: Object,
}

/// What invoking a compiled operation returns.
pub enum Completion<'a> {
    /// The operation is synchronous and already ran
    Ready(Result<Response, ExecutionError>),
    /// The operation is asynchronous, nothing runs until this is awaited
    Deferred(BoxFuture<'a, Result<Response, ExecutionError>>),
}

impl<'a> Completion<'a> {
    pub fn is_deferred(&self) -> bool {
        matches!(self, Completion::Deferred(_))
    }

    /// Returns the result of a synchronous operation, or `None` if it must be awaited
    pub fn ready(self) -> Option<Result<Response, ExecutionError>> {
        match self {
            Completion::Ready(result) => Some(result),
            Completion::Deferred(_) => None,
        }
    }

    pub async fn resolve(self) -> Result<Response, ExecutionError> {
        match self {
            Completion::Ready(result) => result,
            Completion::Deferred(future) => future.await,
        }
    }
}

impl CompiledOperation {
    /// Calls the operation with `(schema, rootValue)`.
    pub fn invoke<'a>(
        &'a self,
        schema: &'a ExecutableSchema,
        root_value: &'a Value,
    ) -> Completion<'a> {
        tracing::debug!(
            operation = %self.name,
            is_async = self.is_async,
            "invoking compiled operation"
        );
        let invocation = Invocation { schema };
        if self.is_async {
            Completion::Deferred(
                async move {
                    let root = Scope::root(root_value);
                    let data = invocation
                        .evaluate_properties_async(&self.data, &root)
                        .await?;
                    Ok(Response { data })
                }
                .boxed(),
            )
        } else {
            let root = Scope::root(root_value);
            Completion::Ready(
                invocation
                    .evaluate_properties(&self.data, &root)
                    .map(|data| Response { data }),
            )
        }
    }

    /// Runs a synchronous operation. Asynchronous operations fail with
    /// [`ExecutionError::DeferredOperation`] without running any resolver.
    pub fn execute(
        &self,
        schema: &ExecutableSchema,
        root_value: &Value,
    ) -> Result<Response, ExecutionError> {
        self.invoke(schema, root_value)
            .ready()
            .unwrap_or_else(|| Err(ExecutionError::DeferredOperation(self.name.clone())))
    }

    /// Runs the operation, awaiting it if it is asynchronous
    pub async fn execute_async(
        &self,
        schema: &ExecutableSchema,
        root_value: &Value,
    ) -> Result<Response, ExecutionError> {
        self.invoke(schema, root_value).resolve().await
    }
}

/// Values bound by the enclosing scopes, innermost first.
struct Scope<'a> {
    binding: Binding,
    value: &'a Value,
    parent: Option<&'a Scope<'a>>,
}

impl<'a> Scope<'a> {
    fn root(root_value: &'a Value) -> Self {
        Scope {
            binding: Binding::RootValue,
            value: root_value,
            parent: None,
        }
    }

    fn lookup(&self, binding: Binding) -> Result<&'a Value, ExecutionError> {
        let mut scope = Some(self);
        while let Some(current) = scope {
            if current.binding == binding {
                return Ok(current.value);
            }
            scope = current.parent;
        }
        Err(ExecutionError::UnboundIdentifier(binding.to_string()))
    }
}

#[derive(Clone, Copy)]
struct Invocation<'a> {
    schema: &'a ExecutableSchema,
}

impl<'a> Invocation<'a> {
    fn resolve_fn(&self, call: &ResolverCall) -> Result<&'a ResolveFn, ExecutionError> {
        self.schema
            .resolve_fn(&call.coordinate)
            .ok_or_else(|| ExecutionError::MissingResolver(call.coordinate.clone()))
    }

    fn evaluate_properties(
        &self,
        properties: &Properties,
        scope: &Scope<'_>,
    ) -> Result<Object, ExecutionError> {
        let mut object = Object::with_capacity(properties.len());
        for (key, expr) in properties {
            object.insert(key.as_str(), self.evaluate(expr, scope)?);
        }
        Ok(object)
    }

    fn evaluate(&self, expr: &Expr, scope: &Scope<'_>) -> Result<Value, ExecutionError> {
        match expr {
            Expr::Property { source, key } => {
                Ok(read_property(scope.lookup(*source)?, key.as_str()))
            }
            Expr::Literal(value) => Ok(value.clone()),
            Expr::Resolve(call) => self.call(call, scope),
            Expr::Scope(object_scope) => self.evaluate_scope(object_scope, scope),
        }
    }

    fn call(&self, call: &ResolverCall, scope: &Scope<'_>) -> Result<Value, ExecutionError> {
        let source = scope.lookup(call.source)?;
        match self.resolve_fn(call)? {
            ResolveFn::Sync(resolve) => Ok(resolve(source, &call.arguments, &*call.info)?),
            ResolveFn::Async(_) => Err(ExecutionError::UnexpectedAsyncResolver(
                call.coordinate.clone(),
            )),
        }
    }

    fn evaluate_scope(
        &self,
        object_scope: &ObjectScope,
        scope: &Scope<'_>,
    ) -> Result<Value, ExecutionError> {
        let value = self.evaluate(&object_scope.value, scope)?;
        if !is_truthy(&value) {
            return Ok(Value::Null);
        }
        let inner = Scope {
            binding: object_scope.binding,
            value: &value,
            parent: Some(scope),
        };
        let selection = self.evaluate_properties(&object_scope.selection, &inner)?;
        Ok(shallow_merge(value, selection))
    }

    fn evaluate_properties_async<'s>(
        &'s self,
        properties: &'s Properties,
        scope: &'s Scope<'s>,
    ) -> BoxFuture<'s, Result<Object, ExecutionError>> {
        async move {
            let mut object = Object::with_capacity(properties.len());
            for (key, expr) in properties {
                let value = self.evaluate_async(expr, scope).await?;
                object.insert(key.as_str(), value);
            }
            Ok(object)
        }
        .boxed()
    }

    fn evaluate_async<'s>(
        &'s self,
        expr: &'s Expr,
        scope: &'s Scope<'s>,
    ) -> BoxFuture<'s, Result<Value, ExecutionError>> {
        async move {
            match expr {
                Expr::Resolve(call) if call.awaited => self.call_async(call, scope).await,
                Expr::Scope(object_scope) if object_scope.is_async => {
                    let value = self.evaluate_async(&object_scope.value, scope).await?;
                    if !is_truthy(&value) {
                        return Ok(Value::Null);
                    }
                    let selection = {
                        let inner = Scope {
                            binding: object_scope.binding,
                            value: &value,
                            parent: Some(scope),
                        };
                        self.evaluate_properties_async(&object_scope.selection, &inner)
                            .await?
                    };
                    Ok(shallow_merge(value, selection))
                }
                // Nothing below needs awaiting
                _ => self.evaluate(expr, scope),
            }
        }
        .boxed()
    }

    async fn call_async(
        &self,
        call: &ResolverCall,
        scope: &Scope<'_>,
    ) -> Result<Value, ExecutionError> {
        let source = scope.lookup(call.source)?;
        match self.resolve_fn(call)? {
            ResolveFn::Sync(resolve) => Ok(resolve(source, &call.arguments, &*call.info)?),
            ResolveFn::Async(resolve) => {
                let future = resolve(source.clone(), call.arguments.clone(), call.info.clone());
                Ok(future.await?)
            }
        }
    }
}

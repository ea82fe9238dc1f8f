use std::fmt;
use std::future::Future;
use std::sync::Arc;

use apollo_compiler::Node;
use apollo_compiler::executable::Field;
use displaydoc::Display;
use futures::FutureExt;
use futures::future::BoxFuture;
use serde_json_bytes::Value;
use thiserror::Error;

use crate::json_ext::Object;

/// Future returned by asynchronous resolvers
pub type ResolveFuture = BoxFuture<'static, Result<Value, ResolverError>>;

type SyncResolve =
    dyn Fn(&Value, &Object, &ResolveInfo) -> Result<Value, ResolverError> + Send + Sync;
type AsyncResolve = dyn Fn(Value, Object, Arc<ResolveInfo>) -> ResolveFuture + Send + Sync;

/// A field resolver, registered with its declared capability.
///
/// Whether a resolver is asynchronous is decided by whoever registers it,
/// never by inspecting the callable. The compiler reads it through [`ResolveFn::is_async`].
#[derive(Clone)]
pub enum ResolveFn {
    /// Called in place, its result is used directly
    Sync(Arc<SyncResolve>),
    /// Called with owned inputs, its result is awaited
    Async(Arc<AsyncResolve>),
}

impl ResolveFn {
    pub fn sync<F>(resolve: F) -> Self
    where
        F: Fn(&Value, &Object, &ResolveInfo) -> Result<Value, ResolverError>
            + Send
            + Sync
            + 'static,
    {
        Self::Sync(Arc::new(resolve))
    }

    pub fn from_async<F, Fut>(resolve: F) -> Self
    where
        F: Fn(Value, Object, Arc<ResolveInfo>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, ResolverError>> + Send + 'static,
    {
        Self::Async(Arc::new(move |source, arguments, info| {
            resolve(source, arguments, info).boxed()
        }))
    }

    pub fn is_async(&self) -> bool {
        matches!(self, Self::Async(_))
    }
}

impl fmt::Debug for ResolveFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sync(_) => f.write_str("ResolveFn::Sync"),
            Self::Async(_) => f.write_str("ResolveFn::Async"),
        }
    }
}

/// Request metadata handed to custom resolvers.
///
/// When the compiler runs with `emit_ast` enabled, `field_nodes` holds the field selection
/// that triggered the call, so a resolver can look at what was requested below it.
/// Otherwise it is empty.
#[derive(Debug, Clone, Default)]
pub struct ResolveInfo {
    pub field_nodes: Vec<Node<Field>>,
}

impl ResolveInfo {
    pub fn is_empty(&self) -> bool {
        self.field_nodes.is_empty()
    }
}

/// resolver error: {message}
#[derive(Error, Debug, Display, Clone, PartialEq, Eq)]
pub struct ResolverError {
    pub message: String,
}

impl ResolverError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<String> for ResolverError {
    fn from(message: String) -> Self {
        Self { message }
    }
}

impl From<&str> for ResolverError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

//! Compiled operations: the output of the compiler.
//!
//! A compiled operation is a function of `(schema, rootValue)`. Its body is a tree of [`Expr`]
//! in which every decision depending on the query document was taken at compile time:
//! resolution strategies, argument literals, scope identifiers and await points.
use std::fmt;
use std::sync::Arc;

use apollo_compiler::Name;
use indexmap::IndexMap;
use serde_json_bytes::Value;

use crate::json_ext::Object;
use crate::resolver::ResolveInfo;
use crate::schema::FieldCoordinate;

/// Parameters of every compiled operation, in order
pub const PARAMETERS: [&str; 2] = ["schema", "rootValue"];

/// Identifier a compiled scope binds its resolved value to.
///
/// Identifiers are keyed by nesting depth, so nested scopes never shadow an ancestor's value.
/// Sibling scopes at the same depth reuse the same identifier, each in its own closure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Binding {
    /// The `rootValue` parameter
    RootValue,
    /// `result_<depth>`, bound by the object scope at that depth
    Result(usize),
}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Binding::RootValue => f.write_str(PARAMETERS[1]),
            Binding::Result(depth) => write!(f, "result_{depth}"),
        }
    }
}

/// Properties of an object literal, in selection order.
pub type Properties = Vec<(Name, Expr)>;

#[derive(Debug, Clone)]
pub enum Expr {
    /// `source["key"]`: default resolution
    Property { source: Binding, key: Name },
    /// Custom resolver invocation, awaited or not
    Resolve(ResolverCall),
    /// A value known at compile time
    Literal(Value),
    /// Immediately invoked closure wrapping an object-typed field
    Scope(ObjectScope),
}

#[derive(Debug, Clone)]
pub struct ResolverCall {
    pub coordinate: FieldCoordinate,
    pub source: Binding,
    pub arguments: Object,
    pub info: Arc<ResolveInfo>,
    pub awaited: bool,
}

/// Closure compiled for an object-typed field.
///
/// Binds `value` to `binding`, then returns the shallow merge of that value with `selection`
/// if it is truthy, and nothing otherwise.
#[derive(Debug, Clone)]
pub struct ObjectScope {
    pub binding: Binding,
    pub value: Box<Expr>,
    pub selection: Properties,
    /// The closure is declared async and its invocation awaited
    pub is_async: bool,
}

/// One function per compiled operation: `name(schema, rootValue) { return { data } }`
#[derive(Debug, Clone)]
pub struct CompiledOperation {
    pub(crate) name: Name,
    pub(crate) is_async: bool,
    pub(crate) data: Properties,
}

impl CompiledOperation {
    pub fn name(&self) -> &Name {
        &self.name
    }

    pub fn parameters(&self) -> &'static [&'static str] {
        &PARAMETERS
    }

    /// Whether the operation returns a deferred completion that must be awaited
    pub fn is_async(&self) -> bool {
        self.is_async
    }

    /// The root selection object returned under `data`
    pub fn data(&self) -> &Properties {
        &self.data
    }
}

/// Every query operation of a document, compiled, in document order.
#[derive(Debug, Clone, Default)]
pub struct CompiledArtifact {
    pub(crate) operations: IndexMap<Name, CompiledOperation>,
}

impl CompiledArtifact {
    pub fn operation(&self, name: &str) -> Option<&CompiledOperation> {
        self.operations.get(name)
    }

    pub fn operations(&self) -> impl Iterator<Item = &CompiledOperation> {
        self.operations.values()
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

//! Ahead-of-time compilation of GraphQL queries.
//!
//! [`compile`] turns every named query of a document into a [`CompiledOperation`]: a function of
//! `(schema, rootValue)` whose resolution strategy, argument literals and await points were all
//! decided at compile time. Invoking it walks the selection without looking at the document again.
//!
//! ```ignore
//! let schema = ExecutableSchema::parse(sdl, "schema.graphql")?
//!     .with_resolver("Query", "hello", |_, _, _| Ok("world".into()))?;
//! let artifact = compile("query Hello { hello }", &schema, &Options::default())?;
//! let response = artifact.operation("Hello").unwrap().execute(&schema, &root_value)?;
//! ```

#![warn(
    rustdoc::broken_intra_doc_links,
    unreachable_patterns,
    unused,
    unused_qualifications,
    dead_code,
    while_true,
    unconditional_panic,
    clippy::all
)]
#![cfg_attr(
    not(test),
    deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)
)]

mod compiler;
mod configuration;
mod emit;
pub mod error;
mod execution;
mod json_ext;
pub mod operation;
mod resolver;
mod schema;

pub use crate::compiler::compile;
pub use crate::compiler::compile_document;
pub use crate::configuration::Options;
pub use crate::error::CompileError;
pub use crate::error::ExecutionError;
pub use crate::error::SchemaError;
pub use crate::execution::Completion;
pub use crate::execution::Response;
pub use crate::json_ext::Object;
pub use crate::operation::CompiledArtifact;
pub use crate::operation::CompiledOperation;
pub use crate::resolver::ResolveFn;
pub use crate::resolver::ResolveFuture;
pub use crate::resolver::ResolveInfo;
pub use crate::resolver::ResolverError;
pub use crate::schema::ExecutableSchema;
pub use crate::schema::FieldConfig;
pub use crate::schema::FieldCoordinate;

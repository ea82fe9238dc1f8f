use apollo_compiler::Name;

use crate::operation::CompiledOperation;
use crate::operation::Properties;

/// Wraps the root selection of an operation into its function:
/// `name(schema, rootValue) { return { data: <selection> } }`, async iff the root scope is.
pub(super) fn assemble(name: Name, data: Properties, is_async: bool) -> CompiledOperation {
    CompiledOperation {
        name,
        is_async,
        data,
    }
}

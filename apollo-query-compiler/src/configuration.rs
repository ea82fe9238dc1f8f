//! Compiler options.
use schemars::JsonSchema;
use serde::Deserialize;
use serde::Serialize;

// The default recursion limit is chosen to be:
//   < # expected to cause stack overflow &&
//   > # expected in a legitimate query
const DEFAULT_RECURSION_LIMIT: usize = 512;

/// Options for [`compile`](crate::compile).
///
/// Example `compiler.yaml`:
///
/// ```yaml
/// emit_ast: false
/// recursion_limit: 64
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(default, deny_unknown_fields)]
pub struct Options {
    /// Embed the field selection that triggered each custom resolver call in its resolve info.
    pub emit_ast: bool,

    /// Maximum nesting of object-typed fields in a compiled operation.
    pub recursion_limit: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            emit_ast: true,
            recursion_limit: DEFAULT_RECURSION_LIMIT,
        }
    }
}

impl Options {
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }
}

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use apollo_compiler::Name;
use apollo_compiler::Schema;
use apollo_compiler::schema::ExtendedType;
use apollo_compiler::validation::Valid;
use serde_json_bytes::Value;

use crate::error::SchemaError;
use crate::json_ext::Object;
use crate::resolver::ResolveFn;
use crate::resolver::ResolveInfo;
use crate::resolver::ResolverError;

/// `Type.field`: identifies a field definition of a composite type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldCoordinate {
    pub type_name: Name,
    pub field_name: Name,
}

impl FieldCoordinate {
    pub fn new(type_name: Name, field_name: Name) -> Self {
        Self {
            type_name,
            field_name,
        }
    }
}

impl fmt::Display for FieldCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.type_name, self.field_name)
    }
}

/// Field configuration consulted by the compiler and by compiled operations.
///
/// A field without a `resolve` function is resolved by reading the property of the parent
/// value that has the field's name.
#[derive(Debug, Clone, Default)]
pub struct FieldConfig {
    pub resolve: Option<ResolveFn>,
}

/// A validated schema bound to its field resolvers.
///
/// This is the `schema` parameter of every compiled operation.
#[derive(Debug, Clone)]
pub struct ExecutableSchema {
    definitions: Arc<Valid<Schema>>,
    fields: HashMap<FieldCoordinate, FieldConfig>,
}

impl ExecutableSchema {
    pub fn new(definitions: Valid<Schema>) -> Self {
        Self {
            definitions: Arc::new(definitions),
            fields: HashMap::new(),
        }
    }

    /// Parses and validates SDL, with no resolver registered yet
    pub fn parse(sdl: &str, path: &str) -> Result<Self, SchemaError> {
        let definitions = Schema::parse_and_validate(sdl, path)
            .map_err(|invalid| SchemaError::ParsingError(invalid.errors.to_string()))?;
        Ok(Self::new(definitions))
    }

    pub fn definitions(&self) -> &Valid<Schema> {
        &self.definitions
    }

    /// Returns the configuration registered for `type_name.field_name`, if any
    pub fn field_config(&self, type_name: &str, field_name: &str) -> Option<&FieldConfig> {
        let coordinate =
            FieldCoordinate::new(Name::new(type_name).ok()?, Name::new(field_name).ok()?);
        self.fields.get(&coordinate)
    }

    pub(crate) fn resolve_fn(&self, coordinate: &FieldCoordinate) -> Option<&ResolveFn> {
        self.fields
            .get(coordinate)
            .and_then(|config| config.resolve.as_ref())
    }

    /// Registers the configuration of a field defined by the schema
    pub fn with_field(
        mut self,
        type_name: &str,
        field_name: &str,
        config: FieldConfig,
    ) -> Result<Self, SchemaError> {
        let coordinate = self.coordinate(type_name, field_name)?;
        self.fields.insert(coordinate, config);
        Ok(self)
    }

    /// Registers a synchronous resolver
    pub fn with_resolver<F>(
        self,
        type_name: &str,
        field_name: &str,
        resolve: F,
    ) -> Result<Self, SchemaError>
    where
        F: Fn(&Value, &Object, &ResolveInfo) -> Result<Value, ResolverError>
            + Send
            + Sync
            + 'static,
    {
        self.with_field(
            type_name,
            field_name,
            FieldConfig {
                resolve: Some(ResolveFn::sync(resolve)),
            },
        )
    }

    /// Registers an asynchronous resolver
    pub fn with_async_resolver<F, Fut>(
        self,
        type_name: &str,
        field_name: &str,
        resolve: F,
    ) -> Result<Self, SchemaError>
    where
        F: Fn(Value, Object, Arc<ResolveInfo>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, ResolverError>> + Send + 'static,
    {
        self.with_field(
            type_name,
            field_name,
            FieldConfig {
                resolve: Some(ResolveFn::from_async(resolve)),
            },
        )
    }

    fn coordinate(
        &self,
        type_name: &str,
        field_name: &str,
    ) -> Result<FieldCoordinate, SchemaError> {
        let unknown = || SchemaError::UnknownField(format!("{type_name}.{field_name}"));
        let (type_name, fields) = match self.definitions.types.get_key_value(type_name) {
            Some((name, ExtendedType::Object(object))) => (name, &object.fields),
            Some((name, ExtendedType::Interface(interface))) => (name, &interface.fields),
            _ => return Err(unknown()),
        };
        let (field_name, _) = fields.get_key_value(field_name).ok_or_else(unknown)?;
        Ok(FieldCoordinate::new(type_name.clone(), field_name.clone()))
    }
}

#[cfg(test)]
mod tests {
    use serde_json_bytes::json;

    use super::*;

    const SDL: &str = r#"
        type Query {
            hello: String
            node: Node
        }

        interface Node {
            id: ID!
        }
    "#;

    #[test]
    fn registers_resolvers_for_known_fields() {
        let schema = ExecutableSchema::parse(SDL, "schema.graphql")
            .unwrap()
            .with_resolver("Query", "hello", |_, _, _| Ok(json!("world")))
            .unwrap()
            .with_async_resolver("Node", "id", |_, _, _| async { Ok(json!("1")) })
            .unwrap();

        let hello = schema.field_config("Query", "hello").unwrap();
        assert!(!hello.resolve.as_ref().unwrap().is_async());
        let id = schema.field_config("Node", "id").unwrap();
        assert!(id.resolve.as_ref().unwrap().is_async());
        assert!(schema.field_config("Query", "node").is_none());
    }

    #[test]
    fn rejects_unknown_coordinates() {
        let schema = ExecutableSchema::parse(SDL, "schema.graphql").unwrap();
        let err = schema
            .clone()
            .with_resolver("Query", "missing", |_, _, _| Ok(Value::Null))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "cannot register a resolver for unknown field Query.missing"
        );
        assert!(matches!(
            schema.with_resolver("String", "length", |_, _, _| Ok(Value::Null)),
            Err(SchemaError::UnknownField(_))
        ));
    }

    #[test]
    fn reports_invalid_sdl() {
        let err =
            ExecutableSchema::parse("type Query { a: Missing }", "schema.graphql").unwrap_err();
        assert!(matches!(err, SchemaError::ParsingError(_)));
    }
}

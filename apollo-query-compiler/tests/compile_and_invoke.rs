use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use apollo_query_compiler::CompileError;
use apollo_query_compiler::ExecutableSchema;
use apollo_query_compiler::ExecutionError;
use apollo_query_compiler::Object;
use apollo_query_compiler::Options;
use apollo_query_compiler::ResolverError;
use apollo_query_compiler::compile;
use pretty_assertions::assert_eq;
use serde_json_bytes::Value;
use serde_json_bytes::json;
use test_log::test;

const SDL: &str = r#"
    enum Color {
        RED
        GREEN
    }

    type Query {
        aScalarRootField: String
        anObjectRootField: Nested
        anAsyncObjectRootField: Nested
        argumentsField(
            intArg: Int
            nullArg: String
            floatArg: Float
            boolArg: Boolean
            enumArg: Color
            stringArg: String
            listArg: [Int]
            objectArg: Filter
        ): String
        failing: String
        node: Node
    }

    interface Node {
        id: ID!
    }

    type Item implements Node {
        id: ID!
        name: String
    }

    type Nested {
        aNestedScalarField: String
        anAsyncNestedScalarField: String
        deeper: Nested
    }

    input Filter {
        limit: Int
    }
"#;

fn property(source: &Value, key: &str) -> Value {
    source
        .as_object()
        .and_then(|object| object.get(key))
        .cloned()
        .unwrap_or(Value::Null)
}

fn schema() -> ExecutableSchema {
    ExecutableSchema::parse(SDL, "schema.graphql")
        .unwrap()
        .with_resolver("Query", "aScalarRootField", |_, _, _| Ok(json!("hello world")))
        .unwrap()
        .with_resolver("Query", "anObjectRootField", |_, _, _| Ok(json!({})))
        .unwrap()
        .with_async_resolver("Query", "anAsyncObjectRootField", |_, _, _| async {
            Ok(json!({ "label": "async" }))
        })
        .unwrap()
        .with_resolver("Nested", "aNestedScalarField", |_, _, _| {
            Ok(json!("hello world"))
        })
        .unwrap()
        .with_async_resolver("Nested", "anAsyncNestedScalarField", |source, _, _| async move {
            Ok(property(&source, "label"))
        })
        .unwrap()
        .with_resolver("Query", "failing", |_, _, _| {
            Err(ResolverError::new("resolver exploded"))
        })
        .unwrap()
}

#[test]
fn scalar_root_field() {
    let schema = schema();
    let artifact = compile(
        "query SomeQuery { aScalarRootField }",
        &schema,
        &Options::default(),
    )
    .unwrap();
    let operation = artifact.operation("SomeQuery").unwrap();
    assert!(!operation.is_async());
    assert_eq!(operation.parameters(), ["schema", "rootValue"]);

    let response = operation.execute(&schema, &Value::Null).unwrap();
    assert_eq!(
        serde_json::to_value(&response).unwrap(),
        serde_json::json!({ "data": { "aScalarRootField": "hello world" } })
    );
}

#[test]
fn object_root_field() {
    let schema = schema();
    let artifact = compile(
        "query SomeQuery { anObjectRootField { aNestedScalarField } }",
        &schema,
        &Options::default(),
    )
    .unwrap();
    let response = artifact
        .operation("SomeQuery")
        .unwrap()
        .execute(&schema, &Value::Null)
        .unwrap();
    assert_eq!(
        Value::Object(response.data),
        json!({ "anObjectRootField": { "aNestedScalarField": "hello world" } })
    );
}

#[test]
fn resolvers_observe_literal_arguments() {
    let observed: Arc<Mutex<Option<Object>>> = Arc::default();
    let sink = observed.clone();
    let schema = schema()
        .with_resolver("Query", "argumentsField", move |_, args, _| {
            *sink.lock().unwrap() = Some(args.clone());
            Ok(json!("ok"))
        })
        .unwrap();
    let artifact = compile(
        r#"query Arguments {
            argumentsField(
                intArg: 42
                nullArg: null
                floatArg: 2.5
                boolArg: false
                enumArg: GREEN
                stringArg: "text"
            )
        }"#,
        &schema,
        &Options::default(),
    )
    .unwrap();
    artifact
        .operation("Arguments")
        .unwrap()
        .execute(&schema, &Value::Null)
        .unwrap();

    let observed = observed.lock().unwrap().take().unwrap();
    assert_eq!(
        Value::Object(observed),
        json!({
            "intArg": 42,
            "nullArg": null,
            "floatArg": 2.5,
            "boolArg": false,
            "enumArg": "GREEN",
            "stringArg": "text"
        })
    );
}

#[test]
fn unsupported_arguments_fail_before_any_function_is_produced() {
    let schema = schema();
    for query in [
        "query Q($n: Int) { argumentsField(intArg: $n) }",
        "query Q { argumentsField(listArg: [1, 2]) }",
        "query Q { argumentsField(objectArg: { limit: 1 }) }",
    ] {
        let err = compile(query, &schema, &Options::default()).unwrap_err();
        assert!(matches!(err, CompileError::UnsupportedArgumentKind { .. }));
        assert!(err.to_string().starts_with("unsupported-argument-kind"));
    }
}

#[test]
fn falsy_object_values_skip_the_nested_selection() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let schema = ExecutableSchema::parse(SDL, "schema.graphql")
        .unwrap()
        .with_resolver("Query", "anObjectRootField", |_, _, _| Ok(Value::Null))
        .unwrap()
        .with_resolver("Nested", "aNestedScalarField", move |_, _, _| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(json!("unreachable"))
        })
        .unwrap();
    let artifact = compile(
        "query Q { anObjectRootField { aNestedScalarField deeper { aNestedScalarField } } }",
        &schema,
        &Options::default(),
    )
    .unwrap();
    let response = artifact
        .operation("Q")
        .unwrap()
        .execute(&schema, &Value::Null)
        .unwrap();
    assert_eq!(Value::Object(response.data), json!({ "anObjectRootField": null }));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn unselected_properties_are_merged_into_the_result() {
    let schema = ExecutableSchema::parse(SDL, "schema.graphql").unwrap();
    let artifact = compile(
        "query Q { anObjectRootField { aNestedScalarField } }",
        &schema,
        &Options::default(),
    )
    .unwrap();
    let root = json!({
        "anObjectRootField": { "aNestedScalarField": "own", "secret": 7 }
    });
    let response = artifact.operation("Q").unwrap().execute(&schema, &root).unwrap();
    assert_eq!(
        Value::Object(response.data),
        json!({ "anObjectRootField": { "aNestedScalarField": "own", "secret": 7 } })
    );
}

#[test(tokio::test)]
async fn async_resolvers_make_the_whole_operation_async() {
    let schema = schema();
    let artifact = compile(
        r#"
        query Q {
            aScalarRootField
            anObjectRootField {
                deeper { anAsyncNestedScalarField }
            }
            anAsyncObjectRootField { aNestedScalarField anAsyncNestedScalarField }
        }
        "#,
        &schema,
        &Options::default(),
    )
    .unwrap();
    let operation = artifact.operation("Q").unwrap();
    assert!(operation.is_async());

    let root = Value::Null;
    assert!(operation.invoke(&schema, &root).is_deferred());
    assert!(matches!(
        operation.execute(&schema, &root),
        Err(ExecutionError::DeferredOperation(_))
    ));

    let response = operation.execute_async(&schema, &root).await.unwrap();
    assert_eq!(
        Value::Object(response.data),
        json!({
            "aScalarRootField": "hello world",
            "anObjectRootField": { "deeper": null },
            "anAsyncObjectRootField": {
                "label": "async",
                "aNestedScalarField": "hello world",
                "anAsyncNestedScalarField": "async"
            }
        })
    );
}

#[test(tokio::test)]
async fn resolver_errors_are_not_wrapped() {
    let schema = schema();
    let artifact = compile(
        r#"
        query Sync { failing }
        query Async { anAsyncObjectRootField { label: aNestedScalarField } failing }
        "#,
        &schema,
        &Options::default(),
    )
    .unwrap();
    let expected = ExecutionError::Resolver(ResolverError::new("resolver exploded"));
    assert_eq!(
        artifact
            .operation("Sync")
            .unwrap()
            .execute(&schema, &Value::Null),
        Err(expected.clone())
    );
    assert_eq!(
        artifact
            .operation("Async")
            .unwrap()
            .execute_async(&schema, &Value::Null)
            .await,
        Err(expected)
    );
}

#[test]
fn resolve_info_follows_emit_ast() {
    let seen: Arc<Mutex<Vec<usize>>> = Arc::default();
    let sink = seen.clone();
    let schema = ExecutableSchema::parse(SDL, "schema.graphql")
        .unwrap()
        .with_resolver("Query", "aScalarRootField", move |_, _, info| {
            sink.lock().unwrap().push(info.field_nodes.len());
            Ok(Value::Null)
        })
        .unwrap();
    let query = "query Q { aScalarRootField }";

    let with_ast = compile(query, &schema, &Options::default()).unwrap();
    let options = Options::from_yaml("emit_ast: false").unwrap();
    let without_ast = compile(query, &schema, &options).unwrap();
    for artifact in [with_ast, without_ast] {
        artifact
            .operation("Q")
            .unwrap()
            .execute(&schema, &Value::Null)
            .unwrap();
    }
    assert_eq!(*seen.lock().unwrap(), [1, 0]);
}

#[test]
fn interface_fields_resolve_through_the_interface_coordinate() {
    let schema = ExecutableSchema::parse(SDL, "schema.graphql")
        .unwrap()
        .with_resolver("Node", "id", |source, _, _| {
            let key = property(source, "key");
            Ok(json!(format!("node:{}", key.as_str().unwrap_or_default())))
        })
        .unwrap();
    let artifact = compile(
        "query Q { node { id __typename } }",
        &schema,
        &Options::default(),
    )
    .unwrap();
    let root = json!({ "node": { "key": "7", "__typename": "Item" } });
    let response = artifact.operation("Q").unwrap().execute(&schema, &root).unwrap();
    assert_eq!(
        Value::Object(response.data),
        json!({ "node": { "key": "7", "__typename": "Item", "id": "node:7" } })
    );
}

#[test]
fn compiled_operations_can_be_reused() {
    let schema = schema();
    let artifact = compile(
        "query Q { anObjectRootField { aNestedScalarField } }",
        &schema,
        &Options::default(),
    )
    .unwrap();
    let operation = artifact.operation("Q").unwrap();
    let first = operation.execute(&schema, &Value::Null).unwrap();
    let second = operation.execute(&schema, &json!({ "ignored": true })).unwrap();
    assert_eq!(first, second);
}

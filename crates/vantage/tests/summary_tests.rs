//! Tests for variable classification and summarization.

use vantage::{InstanceData, Summarizer, Value, VariableKind};

/// Builds an opaque instance value with the given type coordinates.
fn instance(module: &str, type_name: &str, repr: &str) -> Value {
    Value::Instance(Box::new(InstanceData {
        module: module.to_owned(),
        type_name: type_name.to_owned(),
        repr: repr.to_owned(),
        len: None,
        shape: None,
        size_bytes: None,
    }))
}

/// Builds a dataframe-shaped instance value.
fn dataframe(shape: Option<Vec<u64>>) -> Value {
    Value::Instance(Box::new(InstanceData {
        module: "pandas.core.frame".to_owned(),
        type_name: "DataFrame".to_owned(),
        repr: "<DataFrame>".to_owned(),
        len: shape.as_ref().and_then(|dims| dims.first().copied()),
        shape,
        size_bytes: Some(4096),
    }))
}

// =============================================================================
// 1. Classification
// =============================================================================

#[test]
fn classify_follows_the_ordered_rules() {
    let summarizer = Summarizer::default();
    let cases: Vec<(Value, Option<VariableKind>)> = vec![
        (Value::str("hi"), Some(VariableKind::String)),
        (Value::Bool(true), Some(VariableKind::Number)),
        (Value::Int(3), Some(VariableKind::Number)),
        (Value::Float(0.5), Some(VariableKind::Number)),
        (Value::List(vec![]), Some(VariableKind::List)),
        (Value::Tuple(vec![]), Some(VariableKind::List)),
        (Value::Set(vec![]), Some(VariableKind::List)),
        (Value::FrozenSet(vec![]), Some(VariableKind::List)),
        (
            Value::Range {
                start: 0,
                stop: 5,
                step: 1,
            },
            Some(VariableKind::List),
        ),
        (
            Value::Function {
                qualname: "f".to_owned(),
                signature: "()".to_owned(),
            },
            Some(VariableKind::Function),
        ),
        (Value::Bytes(vec![1]), Some(VariableKind::Object)),
        (Value::Dict(vec![]), Some(VariableKind::Object)),
        (instance("acme", "Widget", "<Widget>"), Some(VariableKind::Object)),
        (dataframe(Some(vec![2, 2])), Some(VariableKind::Dataframe)),
        (Value::None, None),
    ];

    for (value, expected) in cases {
        assert_eq!(
            summarizer.classify(&value),
            expected,
            "unexpected kind for {value:?}"
        );
    }
}

#[test]
fn classify_is_deterministic() {
    let summarizer = Summarizer::default();
    let value = Value::List(vec![Value::Int(1)]);
    assert_eq!(summarizer.classify(&value), summarizer.classify(&value));
}

#[test]
fn dataframe_allow_list_is_configurable() {
    let summarizer = Summarizer::new(1024, 100, vec!["acme.table.Frame".to_owned()]);
    let table = instance("acme.table", "Frame", "<Frame>");
    assert_eq!(summarizer.classify(&table), Some(VariableKind::Dataframe));
    assert_eq!(
        summarizer.classify(&dataframe(None)),
        Some(VariableKind::Object),
        "the default allow-list no longer applies once replaced"
    );
}

// =============================================================================
// 2. Summaries per kind
// =============================================================================

#[test]
fn summarize_number() {
    let summary = Summarizer::default().summarize("x", &Value::Int(5));
    assert_eq!(summary.name, "x");
    assert_eq!(summary.value, "5");
    assert_eq!(summary.kind, Some(VariableKind::Number));
    assert_eq!(summary.type_name, "int");
    assert_eq!(summary.length, Some(0));
    assert!(summary.size > 0);
}

#[test]
fn summarize_string_quotes_the_value() {
    let summary = Summarizer::default().summarize("greeting", &Value::str("Hello"));
    assert_eq!(summary.value, "'Hello'");
    assert_eq!(summary.kind, Some(VariableKind::String));
    assert_eq!(summary.type_name, "str");
    assert_eq!(summary.length, Some(5));
}

#[test]
fn summarize_long_string_truncates_before_quoting() {
    let long = "a".repeat(2000);
    let summary = Summarizer::default().summarize("text", &Value::str(long));
    assert!(summary.value.starts_with("'aaa"));
    assert!(summary.value.ends_with("...'"), "marker sits inside the quotes");
    assert_eq!(summary.value.chars().count(), 1024 + 3 + 2);
    assert_eq!(summary.length, Some(2000), "length reflects the full value");
}

#[test]
fn summarize_none_has_no_kind() {
    let summary = Summarizer::default().summarize("nothing", &Value::None);
    assert_eq!(summary.value, "None");
    assert_eq!(summary.kind, None);
    assert_eq!(summary.type_name, "None");
    assert_eq!(summary.length, Some(0));
}

#[test]
fn summarize_function_shows_signature() {
    let double = Value::Function {
        qualname: "double".to_owned(),
        signature: "(n)".to_owned(),
    };
    let summary = Summarizer::default().summarize("double", &double);
    assert_eq!(summary.value, "double(n)");
    assert_eq!(summary.kind, Some(VariableKind::Function));
    assert_eq!(summary.type_name, "double");
    assert_eq!(summary.length, None, "functions report no length");
}

#[test]
fn summarize_dataframe_reports_dimensions() {
    let summarizer = Summarizer::default();

    let framed = summarizer.summarize("df", &dataframe(Some(vec![3, 4])));
    assert_eq!(framed.value, "DataFrame: [3 rows x 4 columns]");
    assert_eq!(framed.kind, Some(VariableKind::Dataframe));
    assert_eq!(framed.type_name, "pandas.core.frame.DataFrame");
    assert_eq!(framed.length, Some(3));
    assert_eq!(framed.size, 4096, "host-reported size wins");

    let shapeless = summarizer.summarize("df", &dataframe(None));
    assert_eq!(shapeless.value, "DataFrame: [0 rows x 0 columns]");

    let odd = summarizer.summarize("df", &dataframe(Some(vec![2, 3, 4])));
    assert_eq!(odd.value, "DataFrame: ", "wrong arity leaves dimensions off");
}

#[test]
fn summarize_object_uses_host_repr() {
    let widget = instance("acme.widgets", "Widget", "<Widget idle>");
    let summary = Summarizer::default().summarize("w", &widget);
    assert_eq!(summary.value, "<Widget idle>");
    assert_eq!(summary.kind, Some(VariableKind::Object));
    assert_eq!(summary.type_name, "acme.widgets.Widget");
}

// =============================================================================
// 3. Truncation and degradation
// =============================================================================

#[test]
fn truncation_is_idempotent() {
    let summarizer = Summarizer::default();
    let long = "x".repeat(5000);
    let once = summarizer.truncate(&long);
    let twice = summarizer.truncate(&once);
    assert_eq!(once.chars().count(), 1024 + 3);
    assert_eq!(once, twice);

    let short = "short".to_owned();
    assert_eq!(summarizer.truncate(&short), short);
}

#[test]
fn oversized_container_rendering_is_truncated() {
    let big = Value::List((0..2000).map(Value::Int).collect());
    let summary = Summarizer::default().summarize("big", &big);
    assert!(summary.value.ends_with("..."));
    assert_eq!(summary.value.chars().count(), 1024 + 3);
    assert_eq!(summary.length, Some(2000));
}

#[test]
fn unrenderable_value_degrades_to_name_and_type() {
    let mut nested = Value::Int(0);
    for _ in 0..70 {
        nested = Value::List(vec![nested]);
    }

    let summary = Summarizer::default().summarize("deep", &nested);
    assert_eq!(summary.value, "list");
    assert_eq!(summary.kind, None);
    assert_eq!(summary.type_name, "list");
    assert_eq!(summary.length, None);
    assert_eq!(summary.size, 0);
}

// =============================================================================
// 4. Serialization shape
// =============================================================================

#[test]
fn kind_serializes_lowercase() {
    assert_eq!(
        serde_json::to_value(VariableKind::Number).unwrap(),
        serde_json::json!("number")
    );
    assert_eq!(VariableKind::Dataframe.to_string(), "dataframe");
}

#[test]
fn summary_json_omits_absent_fields() {
    let summary = Summarizer::default().summarize("nothing", &Value::None);
    let json = serde_json::to_value(&summary).unwrap();
    assert!(json.get("kind").is_none(), "absent kind must not serialize");
    assert_eq!(json["name"], "nothing");
    assert_eq!(json["type_name"], "None");

    let double = Summarizer::default().summarize(
        "double",
        &Value::Function {
            qualname: "double".to_owned(),
            signature: "(n)".to_owned(),
        },
    );
    let json = serde_json::to_value(&double).unwrap();
    assert!(json.get("length").is_none(), "absent length must not serialize");
    assert_eq!(json["kind"], "function");
}

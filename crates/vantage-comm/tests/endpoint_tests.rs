//! Tests for the stdio endpoint and its JSON-line framing.

use serde_json::Value as JsonValue;
use vantage::{CollectChannel, EnvironmentChannel, EnvironmentMessage, Value};
use vantage_comm::endpoint::{EnvironmentEndpoint, JsonLinesChannel};

/// Builds a connected endpoint with one visible variable seeded.
fn connected_endpoint() -> (EnvironmentEndpoint, CollectChannel) {
    let channel = CollectChannel::new();
    let mut endpoint = EnvironmentEndpoint::new();
    endpoint.session_mut().namespace_mut().insert("x", Value::Int(5));
    endpoint
        .connect(Box::new(channel.clone()))
        .expect("collect channel never fails");
    (endpoint, channel)
}

// =============================================================================
// 1. Endpoint dispatch
// =============================================================================

#[test]
fn connect_sends_an_initial_list() {
    let (_, channel) = connected_endpoint();
    match channel.last().unwrap() {
        EnvironmentMessage::List { variables } => {
            assert_eq!(variables.len(), 1);
            assert_eq!(variables[0].name, "x");
        }
        other => panic!("expected a list report, got {other:?}"),
    }
}

#[test]
fn refresh_line_round_trips_through_the_session() {
    let (mut endpoint, channel) = connected_endpoint();
    let before = channel.len();

    endpoint.handle_line(r#"{"msg_type": "refresh"}"#);

    assert_eq!(channel.len(), before + 1);
    assert!(matches!(channel.last().unwrap(), EnvironmentMessage::List { .. }));
}

#[test]
fn delete_line_removes_the_named_variable() {
    let (mut endpoint, channel) = connected_endpoint();

    endpoint.handle_line(r#"{"msg_type": "delete", "name": ["x"]}"#);

    assert!(!endpoint.session().namespace().contains_name("x"));
    match channel.last().unwrap() {
        EnvironmentMessage::Update { assigned, removed } => {
            assert!(assigned.is_empty());
            assert!(removed.contains("x"));
        }
        other => panic!("expected an update report, got {other:?}"),
    }
}

#[test]
fn malformed_json_is_answered_with_an_error_report() {
    let (mut endpoint, channel) = connected_endpoint();

    endpoint.handle_line("not json at all");

    match channel.last().unwrap() {
        EnvironmentMessage::Error { message } => {
            assert!(message.contains("invalid request"), "unexpected error text: {message}");
        }
        other => panic!("expected an error report, got {other:?}"),
    }
}

#[test]
fn unknown_message_type_is_forwarded_to_the_session() {
    let (mut endpoint, channel) = connected_endpoint();

    endpoint.handle_line(r#"{"msg_type": "bogus"}"#);

    assert!(matches!(channel.last().unwrap(), EnvironmentMessage::Error { .. }));
}

// =============================================================================
// 2. JSON-line framing
// =============================================================================

#[test]
fn json_lines_channel_writes_one_line_per_message() {
    let mut channel = JsonLinesChannel::new(Vec::new());

    channel
        .send(&EnvironmentMessage::Error {
            message: "boom".to_owned(),
        })
        .unwrap();
    channel.send(&EnvironmentMessage::List { variables: vec![] }).unwrap();

    let output = String::from_utf8(channel.into_inner()).unwrap();
    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(lines.len(), 2);

    let first: JsonValue = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(first["msg_type"], "error");
    assert_eq!(first["message"], "boom");

    let second: JsonValue = serde_json::from_str(lines[1]).unwrap();
    assert_eq!(second["msg_type"], "list");
    assert_eq!(second["variables"], serde_json::json!([]));
}

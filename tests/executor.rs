mod common;
use common::{base_url, quiet_logger, RecordingTransport};

use n8n_mcp::errors::{ErrorCode, ToolError, ToolErrorKind};
use n8n_mcp::operations::{operations, HttpMethod, ParamKind, ParamSpec, Rule};
use n8n_mcp::services::tool_executor::ToolExecutor;
use n8n_mcp::services::translator::Translator;
use n8n_mcp::services::validation::Validation;
use serde_json::{json, Map, Value};
use std::sync::Arc;

fn executor(transport: Arc<RecordingTransport>, default_key: Option<&str>) -> ToolExecutor {
    ToolExecutor::new(
        quiet_logger(),
        Translator::new(base_url("https://n8n.example.com"), Validation::new()),
        transport,
        default_key.map(str::to_string),
    )
}

fn headers(value: Value) -> Map<String, Value> {
    value.as_object().cloned().expect("headers object")
}

#[tokio::test]
async fn validation_failures_never_reach_the_transport() {
    let transport = Arc::new(RecordingTransport::ok(json!({})));
    let exec = executor(transport.clone(), Some("key"));

    let err = exec
        .execute("list-workflows", json!({ "limit": 1001 }), None)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ToolErrorKind::Validation);
    assert_eq!(err.code, ErrorCode::symbol(ErrorCode::INVALID_PARAMS));

    let err = exec
        .execute("get-workflow", json!({ "id": "" }), None)
        .await
        .unwrap_err();
    assert!(err.message.contains("'id'"));

    assert!(transport.calls().is_empty());
}

/// A value that satisfies every rule of `spec`.
fn valid_value(spec: &ParamSpec) -> Value {
    let mut item = json!("x");
    for rule in spec.rules {
        match rule {
            Rule::OneOf(options) => return json!(options[0]),
            Rule::ItemKind(ParamKind::Object) if item.is_string() => item = json!({}),
            Rule::ItemFields(fields) => {
                item = Value::Object(fields.iter().map(|f| (f.to_string(), json!("x"))).collect())
            }
            Rule::ItemOneOf(options) => item = json!(options[0]),
            _ => {}
        }
    }
    match spec.kind {
        ParamKind::String => json!("x"),
        ParamKind::Integer => json!(1),
        ParamKind::Boolean => json!(true),
        ParamKind::Array => json!([item]),
        ParamKind::Object => json!({}),
    }
}

fn wrong_kind(kind: ParamKind) -> Value {
    match kind {
        ParamKind::String => json!(123),
        ParamKind::Integer => json!("1"),
        ParamKind::Boolean => json!("true"),
        ParamKind::Array => json!({ "0": "x" }),
        ParamKind::Object => json!(["x"]),
    }
}

#[tokio::test]
async fn every_required_param_is_enforced_without_io() {
    for op in operations() {
        let required: Vec<&ParamSpec> = op.params.iter().filter(|s| s.required).collect();
        let valid: Map<String, Value> = required
            .iter()
            .map(|spec| (spec.name.to_string(), valid_value(spec)))
            .collect();

        let transport = Arc::new(RecordingTransport::ok(json!({})));
        let exec = executor(transport.clone(), Some("key"));
        exec.execute(op.name, Value::Object(valid.clone()), None)
            .await
            .unwrap_or_else(|err| panic!("{} rejected valid args: {:?}", op.name, err));
        assert_eq!(transport.calls().len(), 1, "{}", op.name);

        for spec in &required {
            let mut missing = valid.clone();
            missing.remove(spec.name);
            let mut null = valid.clone();
            null.insert(spec.name.to_string(), Value::Null);
            let mut mistyped = valid.clone();
            mistyped.insert(spec.name.to_string(), wrong_kind(spec.kind));

            let cases = [("missing", missing), ("null", null), ("wrong kind", mistyped)];
            for (case, args) in cases {
                let transport = Arc::new(RecordingTransport::ok(json!({})));
                let exec = executor(transport.clone(), Some("key"));
                let err = exec
                    .execute(op.name, Value::Object(args), None)
                    .await
                    .expect_err("invalid args must fail");
                assert_eq!(
                    err.kind,
                    ToolErrorKind::Validation,
                    "{} {} {}",
                    op.name,
                    spec.name,
                    case
                );
                assert!(
                    err.message.contains(spec.name),
                    "{} {} {}: {}",
                    op.name,
                    spec.name,
                    case,
                    err.message
                );
                assert!(transport.calls().is_empty(), "{} {} {}", op.name, spec.name, case);
            }
        }
    }
}

#[tokio::test]
async fn unknown_tool_suggests_close_names() {
    let transport = Arc::new(RecordingTransport::ok(json!({})));
    let exec = executor(transport.clone(), Some("key"));
    let err = exec
        .execute("list-workflow", json!({}), None)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::symbol(ErrorCode::UNKNOWN_TOOL));
    assert!(err.details.contains("list-workflows"));
    assert!(transport.calls().is_empty());
}

#[tokio::test]
async fn missing_credential_fails_before_any_io() {
    let transport = Arc::new(RecordingTransport::ok(json!({})));
    let exec = executor(transport.clone(), None);
    let err = exec.execute("list-tags", json!({}), None).await.unwrap_err();
    assert_eq!(err.kind, ToolErrorKind::Auth);
    assert_eq!(err.code, ErrorCode::symbol(ErrorCode::MISSING_API_KEY));

    let blank = headers(json!({ "x-n8n-api-key": "  " }));
    let err = exec
        .execute("list-tags", json!({}), Some(&blank))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::symbol(ErrorCode::MISSING_API_KEY));
    assert!(transport.calls().is_empty());
}

#[tokio::test]
async fn header_credential_overrides_configured_default() {
    let transport = Arc::new(RecordingTransport::ok(json!({ "data": [] })));
    let exec = executor(transport.clone(), Some("env-key"));

    let inbound = headers(json!({ "Authorization": "Bearer bearer-key" }));
    exec.execute("list-tags", json!({}), Some(&inbound))
        .await
        .unwrap();
    exec.execute("list-tags", json!({}), None).await.unwrap();

    let calls = transport.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].1, "bearer-key");
    assert_eq!(calls[1].1, "env-key");
}

#[tokio::test]
async fn successful_call_returns_transport_payload_and_shaped_request() {
    let transport = Arc::new(RecordingTransport::ok(json!([{ "id": "u1" }])));
    let exec = executor(transport.clone(), Some("key"));
    let users = json!([{ "email": "a@example.com", "role": "global:member" }]);

    let out = exec
        .execute("create-users", json!({ "users": users.clone() }), None)
        .await
        .unwrap();
    assert_eq!(out, json!([{ "id": "u1" }]));

    let calls = transport.calls();
    let (call, _) = &calls[0];
    assert_eq!(call.method, HttpMethod::Post);
    assert_eq!(call.url.as_str(), "https://n8n.example.com/api/v1/users");
    assert_eq!(call.body, Some(users));
}

#[tokio::test]
async fn transport_errors_are_returned_unchanged() {
    let upstream = ToolError::upstream_status(
        ToolErrorKind::NotFound,
        404,
        "Resource not found in n8n",
    )
    .with_details("GET /workflows/missing");
    let transport = Arc::new(RecordingTransport::replying(Err(upstream)));
    let exec = executor(transport, Some("key"));
    let err = exec
        .execute("get-workflow", json!({ "id": "missing" }), None)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::Status(404));
    assert_eq!(err.details, "GET /workflows/missing");
}

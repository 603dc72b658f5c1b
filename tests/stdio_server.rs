mod common;
use common::{base_url, quiet_logger, RecordingTransport};

use n8n_mcp::app::App;
use n8n_mcp::config::Config;
use n8n_mcp::mcp::server::McpServer;
use n8n_mcp::operations::operations;
use n8n_mcp::services::logger::LogLevel;
use serde_json::{json, Value};
use std::sync::Arc;

fn server(transport: Arc<RecordingTransport>, default_key: Option<&str>) -> McpServer {
    let config = Config {
        api_url: base_url("http://localhost:5678"),
        api_key: default_key.map(str::to_string),
        timeout_ms: 1_000,
        log_level: LogLevel::Error,
    };
    let app = App::with_transport(config, quiet_logger(), transport).expect("app");
    McpServer::new(app)
}

async fn exchange(server: &McpServer, lines: &[Value]) -> Vec<Value> {
    let input: String = lines.iter().map(|line| format!("{}\n", line)).collect();
    let mut output = Vec::new();
    server
        .serve(input.as_bytes(), &mut output)
        .await
        .expect("serve");
    String::from_utf8(output)
        .expect("utf8")
        .lines()
        .map(|line| serde_json::from_str(line).expect("response json"))
        .collect()
}

fn tool_text(response: &Value) -> Value {
    let text = response["result"]["content"][0]["text"]
        .as_str()
        .expect("text content");
    serde_json::from_str(text).expect("json text")
}

#[tokio::test]
async fn initialize_and_list_tools() {
    let server = server(Arc::new(RecordingTransport::ok(json!({}))), Some("k"));
    let responses = exchange(
        &server,
        &[
            json!({ "jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {} }),
            json!({ "jsonrpc": "2.0", "method": "notifications/initialized" }),
            json!({ "jsonrpc": "2.0", "id": 2, "method": "tools/list" }),
        ],
    )
    .await;
    assert_eq!(responses.len(), 2);
    assert_eq!(responses[0]["result"]["serverInfo"]["name"], "n8n-mcp");
    let tools = responses[1]["result"]["tools"].as_array().expect("tools");
    assert_eq!(tools.len(), operations().len());
}

#[tokio::test]
async fn tools_call_uses_forwarded_headers() {
    let transport = Arc::new(RecordingTransport::ok(json!({ "id": "t1", "name": "ops" })));
    let server = server(transport.clone(), None);
    let responses = exchange(
        &server,
        &[json!({
            "jsonrpc": "2.0",
            "id": 3,
            "method": "tools/call",
            "params": {
                "name": "create-tag",
                "arguments": { "name": "ops" },
                "_meta": { "headers": { "X-API-Key": "proxy-key" } }
            }
        })],
    )
    .await;
    assert_eq!(responses[0]["result"]["isError"], false);
    assert_eq!(tool_text(&responses[0])["id"], "t1");
    assert_eq!(transport.calls()[0].1, "proxy-key");
}

#[tokio::test]
async fn tool_failures_come_back_as_error_envelopes() {
    let server = server(Arc::new(RecordingTransport::ok(json!({}))), Some("k"));
    let responses = exchange(
        &server,
        &[
            json!({
                "jsonrpc": "2.0", "id": 4, "method": "tools/call",
                "params": { "name": "list-tags", "arguments": { "limit": 0 } }
            }),
            json!({
                "jsonrpc": "2.0", "id": 5, "method": "tools/call",
                "params": { "name": "list-tagz", "arguments": {} }
            }),
        ],
    )
    .await;
    assert_eq!(responses[0]["result"]["isError"], true);
    let error = &tool_text(&responses[0])["error"];
    assert_eq!(error["code"], "INVALID_PARAMS");
    assert_eq!(error["kind"], "validation");

    let error = &tool_text(&responses[1])["error"];
    assert_eq!(error["code"], "UNKNOWN_TOOL");
    assert!(error["details"].as_str().unwrap().contains("list-tags"));
}

#[tokio::test]
async fn protocol_errors_use_json_rpc_codes() {
    let server = server(Arc::new(RecordingTransport::ok(json!({}))), Some("k"));
    let mut output = Vec::new();
    server
        .serve(
            "not json\n{\"jsonrpc\":\"2.0\",\"id\":9,\"method\":\"resources/list\"}\n{\"jsonrpc\":\"2.0\",\"id\":10,\"method\":\"tools/call\",\"params\":{}}\n"
                .as_bytes(),
            &mut output,
        )
        .await
        .expect("serve");
    let responses: Vec<Value> = String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(responses[0]["error"]["code"], -32700);
    assert_eq!(responses[1]["error"]["code"], -32601);
    assert_eq!(responses[2]["error"]["code"], -32602);
}

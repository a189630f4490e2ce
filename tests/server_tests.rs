//! End-to-end tests of the line-delimited transport.
//!
//! The server reads from an in-memory buffer and writes to a `Vec<u8>`, so
//! each test sees exactly the bytes a host would read from stdout.

use mcp_python_bridge::config::ServerConfig;
use mcp_python_bridge::runner::{Interpreter, RunLimits};
use mcp_python_bridge::server::McpServer;
use serde_json::Value;

fn sh_server() -> McpServer {
    McpServer::new(ServerConfig {
        interpreter: Interpreter::new("sh").arg("-c"),
        limits: RunLimits::unbounded(),
    })
}

async fn serve(server: &McpServer, input: &str) -> Vec<Value> {
    let mut output = Vec::new();
    server.serve(input.as_bytes(), &mut output).await.unwrap();

    let text = String::from_utf8(output).unwrap();
    assert!(text.is_empty() || text.ends_with('\n'), "Every message ends with a newline");
    text.lines()
        .map(|line| serde_json::from_str(line).expect("each output line is one JSON object"))
        .collect()
}

fn call_line(id: i64, code: &str) -> String {
    serde_json::json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": "tools/call",
        "params": { "name": "run_python", "arguments": { "code": code } }
    })
    .to_string()
}

#[tokio::test]
async fn malformed_lines_produce_no_output() {
    let input = "not json\n{\"jsonrpc\":\"2.0\",\"id\":1,\n\n[1,2,3]\n{\"id\":2}\n";
    let out = serve(&sh_server(), input).await;
    assert!(out.is_empty(), "got {out:?}");
}

#[tokio::test]
async fn invalid_utf8_line_is_dropped() {
    let mut input = b"\xff\xfe\n".to_vec();
    input.extend_from_slice(b"{\"jsonrpc\":\"2.0\",\"id\":9,\"method\":\"tools/list\"}\n");

    let mut output = Vec::new();
    sh_server().serve(&input[..], &mut output).await.unwrap();

    let text = String::from_utf8(output).unwrap();
    assert_eq!(text.lines().count(), 1);
    let resp: Value = serde_json::from_str(text.trim_end()).unwrap();
    assert_eq!(resp["id"], 9);
}

#[tokio::test]
async fn session_answers_only_requests_with_ids() {
    let input = [
        r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}"#,
        r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
        r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#,
        r#"{"jsonrpc":"2.0","id":3,"method":"ping"}"#,
        "garbage",
    ]
    .join("\n");

    let out = serve(&sh_server(), &input).await;

    assert_eq!(out.len(), 2, "got {out:?}");
    assert_eq!(out[0]["id"], 1);
    assert_eq!(out[0]["result"]["serverInfo"]["name"], "mcp-python-bridge");
    assert_eq!(out[1]["id"], 2);
    assert_eq!(out[1]["result"]["tools"][0]["name"], "run_python");
}

#[tokio::test]
async fn last_line_without_newline_is_processed() {
    let out = serve(&sh_server(), r#"{"jsonrpc":"2.0","id":"tail","method":"initialize"}"#).await;

    assert_eq!(out.len(), 1);
    assert_eq!(out[0]["id"], "tail");
}

#[tokio::test]
async fn in_flight_calls_finish_after_input_closes() {
    let input = format!("{}\n", call_line(5, "sleep 0.2; echo late"));
    let out = serve(&sh_server(), &input).await;

    assert_eq!(out.len(), 1);
    assert_eq!(out[0]["id"], 5);
    assert_eq!(out[0]["result"]["stdout"], "late\n");
    assert_eq!(out[0]["result"]["exitCode"], 0);
}

#[tokio::test]
async fn concurrent_calls_are_correlated_by_id() {
    let input = format!(
        "{}\n{}\n{}\n",
        call_line(1, "sleep 1; echo slow"),
        call_line(2, "echo fast"),
        r#"{"jsonrpc":"2.0","id":3,"method":"tools/list"}"#,
    );
    let out = serve(&sh_server(), &input).await;

    assert_eq!(out.len(), 3, "got {out:?}");

    // tools/list is answered inline, before either process finishes.
    assert_eq!(out[0]["id"], 3);
    assert_eq!(out[1]["id"], 2);
    assert_eq!(out[1]["result"]["stdout"], "fast\n");
    assert_eq!(out[2]["id"], 1);
    assert_eq!(out[2]["result"]["stdout"], "slow\n");
}

#[tokio::test]
async fn spawn_failure_is_written_as_error_line() {
    let server = McpServer::new(ServerConfig {
        interpreter: Interpreter::new("no-such-interpreter-7d0a").arg("-c"),
        limits: RunLimits::unbounded(),
    });
    let out = serve(&server, &format!("{}\n", call_line(8, "print(1)"))).await;

    assert_eq!(out.len(), 1);
    assert_eq!(out[0]["id"], 8);
    assert_eq!(out[0]["error"]["code"], -1);
    assert!(out[0].get("result").is_none());
}

#[tokio::test]
async fn large_numeric_ids_are_echoed_exactly() {
    let input = r#"{"jsonrpc":"2.0","id":9007199254740993,"method":"initialize"}"#;
    let mut output = Vec::new();
    sh_server().serve(input.as_bytes(), &mut output).await.unwrap();

    let text = String::from_utf8(output).unwrap();
    assert!(text.contains(r#""id":9007199254740993"#), "got {text}");
}

#[tokio::test]
async fn ids_are_echoed_byte_for_byte() {
    let ids = [
        "123456789012345678901234567890",
        "1.50",
        "-0",
        "1e3",
        "true",
        r#"{"k": 1}"#,
        r#"["a",2]"#,
        "null",
        r#""café""#,
    ];

    let server = sh_server();
    for id in ids {
        let input = format!(r#"{{"jsonrpc":"2.0","id":{id},"method":"initialize"}}"#);
        let mut output = Vec::new();
        server.serve(input.as_bytes(), &mut output).await.unwrap();

        let text = String::from_utf8(output).unwrap();
        let expected = format!(r#"{{"jsonrpc":"2.0","id":{id},"result":"#);
        assert!(text.starts_with(&expected), "id {id}: got {text}");
        assert_eq!(text.lines().count(), 1, "id {id}");
    }
}

#[tokio::test]
async fn explicit_null_id_is_answered_but_absent_id_is_not() {
    let input = [
        r#"{"jsonrpc":"2.0","id":null,"method":"tools/list"}"#,
        r#"{"jsonrpc":"2.0","method":"tools/list"}"#,
    ]
    .join("\n");

    let out = serve(&sh_server(), &input).await;

    assert_eq!(out.len(), 1, "got {out:?}");
    assert!(out[0].get("id").is_some_and(Value::is_null));
    assert_eq!(out[0]["result"]["tools"][0]["name"], "run_python");
}

#[tokio::test]
async fn exact_id_survives_a_tool_call() {
    let input = r#"{"jsonrpc":"2.0","id":18446744073709551616.0,"method":"tools/call","params":{"name":"run_python","arguments":{"code":"echo ok"}}}"#;
    let mut output = Vec::new();
    sh_server().serve(input.as_bytes(), &mut output).await.unwrap();

    let text = String::from_utf8(output).unwrap();
    assert!(text.starts_with(r#"{"jsonrpc":"2.0","id":18446744073709551616.0,"result":"#), "got {text}");
}

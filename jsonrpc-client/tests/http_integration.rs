//! HTTP-level tests for the JSON-RPC client against a mock server

use jsonrpc_client::{JsonRpcClient, RpcError, JSONRPC_PATH};
use mockito::{Matcher, Server};
use serde_json::json;
use std::net::TcpListener;

fn endpoint(server: &Server) -> String {
    format!("{}{}", server.url(), JSONRPC_PATH)
}

#[test]
fn test_call_posts_slim_request_envelope() {
    let mut server = Server::new();
    let mock = server
        .mock("POST", JSONRPC_PATH)
        .match_header("content-type", "application/json")
        .match_header("authorization", Matcher::Missing)
        .match_body(Matcher::PartialJson(json!({
            "method": "slim.request",
            "params": ["00:00:00:00:00:00", ["player", "count", "?"]]
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"id":1,"method":"slim.request","result":{"_count":2}}"#)
        .create();

    let client = JsonRpcClient::new(endpoint(&server));
    let result = client
        .call("00:00:00:00:00:00", &[json!("player"), json!("count"), json!("?")])
        .unwrap();

    assert_eq!(result, json!({"_count": 2}));
    mock.assert();
}

#[test]
fn test_call_sends_basic_auth_header() {
    let mut server = Server::new();
    let mock = server
        .mock("POST", JSONRPC_PATH)
        .match_header("authorization", "Basic dXNlcjpwYXNz")
        .with_status(200)
        .with_body(r#"{"id":1,"result":{}}"#)
        .create();

    let client = JsonRpcClient::new(endpoint(&server)).with_basic_auth("user", "pass");
    client.call("aa:bb:cc:dd:ee:ff", &[json!("status")]).unwrap();

    mock.assert();
}

#[test]
fn test_request_ids_increase_per_call() {
    let mut server = Server::new();
    let first = server
        .mock("POST", JSONRPC_PATH)
        .match_body(Matcher::PartialJson(json!({"id": 1})))
        .with_body(r#"{"id":1,"result":{}}"#)
        .create();
    let second = server
        .mock("POST", JSONRPC_PATH)
        .match_body(Matcher::PartialJson(json!({"id": 2})))
        .with_body(r#"{"id":2,"result":{}}"#)
        .create();

    let client = JsonRpcClient::new(endpoint(&server));
    client.call("0", &[json!("version"), json!("?")]).unwrap();
    client.clone().call("0", &[json!("version"), json!("?")]).unwrap();

    first.assert();
    second.assert();
}

#[test]
fn test_unauthorized_status_is_mapped() {
    let mut server = Server::new();
    server
        .mock("POST", JSONRPC_PATH)
        .with_status(401)
        .create();

    let client = JsonRpcClient::new(endpoint(&server));
    let result = client.call("0", &[json!("players"), json!(0), json!(1000)]);

    assert!(matches!(result, Err(RpcError::Unauthorized)));
}

#[test]
fn test_server_error_status_is_mapped() {
    let mut server = Server::new();
    server
        .mock("POST", JSONRPC_PATH)
        .with_status(500)
        .with_body("internal failure")
        .create();

    let client = JsonRpcClient::new(endpoint(&server));
    match client.call("0", &[json!("players")]) {
        Err(RpcError::Http { status, body }) => {
            assert_eq!(status, 500);
            assert_eq!(body, "internal failure");
        }
        other => panic!("Expected RpcError::Http, got {:?}", other),
    }
}

#[test]
fn test_malformed_body_is_parse_error() {
    let mut server = Server::new();
    server
        .mock("POST", JSONRPC_PATH)
        .with_status(200)
        .with_body("this is not json")
        .create();

    let client = JsonRpcClient::new(endpoint(&server));
    assert!(matches!(
        client.call("0", &[json!("players")]),
        Err(RpcError::Parse(_))
    ));
}

#[test]
fn test_reply_larger_than_ten_megabytes() {
    let rows: Vec<String> = (0..100_000)
        .map(|i| {
            format!(
                r#"{{"id":{i},"title":"Track number {i} with a long enough title","url":"file:///music/library/artist/album/{i:06}.flac","artist_id":"{i}"}}"#
            )
        })
        .collect();
    let body = format!(r#"{{"id":1,"result":{{"count":100000,"titles_loop":[{}]}}}}"#, rows.join(","));
    assert!(body.len() > 10 * 1024 * 1024);

    let mut server = Server::new();
    server
        .mock("POST", JSONRPC_PATH)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body)
        .create();

    let client = JsonRpcClient::new(endpoint(&server));
    let result = client
        .call("0", &[json!("tracks"), json!("-"), json!("-"), json!("tags:seuSp")])
        .unwrap();

    assert_eq!(result["count"], json!(100000));
    assert_eq!(result["titles_loop"].as_array().map(Vec::len), Some(100_000));
}

#[test]
fn test_unreachable_server_is_network_error() {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let client = JsonRpcClient::new(format!("http://127.0.0.1:{}/jsonrpc.js", port));
    assert!(matches!(
        client.call("0", &[json!("players")]),
        Err(RpcError::Network(_))
    ));
}

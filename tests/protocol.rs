//! End-to-end tests: a server and a client over an in-memory duplex pipe.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{Map, Value, json};
use tokio::io::{AsyncReadExt, AsyncWriteExt, DuplexStream, ReadHalf, WriteHalf};
use tokio::task::JoinHandle;

use toolhost::core::transport::TransportResult;
use toolhost::core::{Config, Status, ToolClient, ToolServer};
use toolhost::domains::tools::definitions::clock::DEFAULT_FORMAT;
use toolhost::domains::tools::definitions::register_builtin;
use toolhost::domains::tools::{ResultKind, Tool, ToolError, ToolRegistry, ToolResult, ValueKind};

type Client = ToolClient<ReadHalf<DuplexStream>, WriteHalf<DuplexStream>>;

/// A tool backed by an injected store.
struct Remember {
    notes: Arc<Mutex<Vec<String>>>,
    capacity: usize,
}

/// Parameters for the remember tool.
#[derive(Deserialize, JsonSchema)]
struct RememberParams {
    /// Note to keep.
    note: String,
}

#[async_trait]
impl Tool for Remember {
    const NAME: &'static str = "remember";
    const DESCRIPTION: &'static str = "Store a note and return how many are kept";
    type Params = RememberParams;
    type Output = usize;

    async fn call(&self, params: RememberParams) -> ToolResult<usize> {
        let mut notes = self
            .notes
            .lock()
            .map_err(|_| ToolError::fault("note store poisoned"))?;
        if notes.len() >= self.capacity {
            let mut detail = Map::new();
            detail.insert("capacity".into(), json!(self.capacity));
            return Err(ToolError::domain_with_detail("note store is full", detail));
        }
        notes.push(params.note);
        Ok(notes.len())
    }
}

fn start(config: Config, registry: ToolRegistry) -> (Client, JoinHandle<TransportResult<()>>) {
    let (client_io, server_io) = tokio::io::duplex(64 * 1024);
    let server = ToolServer::new(config, registry);
    let handle = tokio::spawn(async move {
        let (reader, writer) = tokio::io::split(server_io);
        server.serve_connection(reader, writer).await
    });
    let (reader, writer) = tokio::io::split(client_io);
    (ToolClient::new(reader, writer), handle)
}

fn registry_with_notes(notes: Arc<Mutex<Vec<String>>>) -> ToolRegistry {
    let mut builder = ToolRegistry::builder();
    register_builtin(&mut builder).unwrap();
    builder.tool(Remember { notes, capacity: 2 }).unwrap();
    builder.build()
}

fn args(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("not an object: {}", other),
    }
}

#[tokio::test]
async fn test_list_tools_describes_every_tool() {
    let notes = Arc::new(Mutex::new(Vec::new()));
    let (mut client, server) = start(Config::default(), registry_with_notes(notes));

    let tools = client.list_tools().await.unwrap();
    let names: Vec<_> = tools.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["echo", "current_time", "remember"]);

    let echo = &tools[0];
    let text = echo.parameter("text").unwrap();
    assert!(text.required);
    assert_eq!(text.kind, ValueKind::String);
    assert_eq!(echo.returns, ResultKind::Value(ValueKind::String));

    let clock = &tools[1];
    let format = clock.parameter("format").unwrap();
    assert!(!format.required);
    assert_eq!(format.default, Some(json!(DEFAULT_FORMAT)));
    let utc = clock.parameter("utc").unwrap();
    assert_eq!(utc.kind, ValueKind::Boolean);
    assert_eq!(utc.default, Some(json!(false)));

    let remember = &tools[2];
    assert_eq!(
        remember.parameter("note").unwrap().description.as_deref(),
        Some("Note to keep.")
    );
    assert_eq!(remember.returns, ResultKind::Value(ValueKind::Integer));

    client.close().await.unwrap();
    server.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_call_outcomes() {
    let notes = Arc::new(Mutex::new(Vec::new()));
    let (mut client, server) = start(Config::default(), registry_with_notes(Arc::clone(&notes)));

    let resp = client
        .call_tool("echo", args(json!({ "text": "hello" })))
        .await
        .unwrap();
    assert_eq!(resp.status, Status::Ok);
    assert_eq!(resp.payload, json!("hello"));

    let resp = client.call_tool("echo", Map::new()).await.unwrap();
    assert_eq!(resp.status, Status::DomainError);
    assert_eq!(resp.message(), Some("missing parameter: text"));

    let resp = client.call_tool("missing_tool", Map::new()).await.unwrap();
    assert_eq!(resp.status, Status::DomainError);
    assert_eq!(resp.message(), Some("unknown tool: missing_tool"));

    for (note, expected) in [("a", 1), ("b", 2)] {
        let resp = client
            .call_tool("remember", args(json!({ "note": note })))
            .await
            .unwrap();
        assert_eq!(resp.payload, json!(expected));
    }
    let resp = client
        .call_tool("remember", args(json!({ "note": "c" })))
        .await
        .unwrap();
    assert_eq!(resp.status, Status::DomainError);
    assert_eq!(resp.payload, json!("note store is full"));
    assert_eq!(resp.detail.unwrap()["capacity"], json!(2));
    assert_eq!(notes.lock().unwrap().len(), 2);

    client.close().await.unwrap();
    server.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_blocking_tool_over_the_wire() {
    let (mut client, server) = start(Config::default(), registry_with_notes(Default::default()));

    let resp = client
        .call_tool("current_time", args(json!({ "format": "%Y", "utc": true })))
        .await
        .unwrap();
    assert_eq!(resp.status, Status::Ok);
    let year = resp.payload.as_str().unwrap();
    assert_eq!(year.len(), 4);
    assert!(year.chars().all(|c| c.is_ascii_digit()));

    let resp = client
        .call_tool("current_time", args(json!({ "format": "" })))
        .await
        .unwrap();
    assert_eq!(resp.status, Status::DomainError);
    assert_eq!(resp.message(), Some("format cannot be empty"));

    client.close().await.unwrap();
    server.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_pipelined_server_answers_in_order() {
    let mut config = Config::default();
    config.dispatch.max_in_flight = 8;
    let (mut client, server) = start(config, registry_with_notes(Default::default()));

    for i in 0..20 {
        let text = format!("message {}", i);
        let resp = client
            .call_tool("echo", args(json!({ "text": text })))
            .await
            .unwrap();
        assert_eq!(resp.payload, json!(text));
    }

    client.close().await.unwrap();
    server.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_garbage_closes_the_channel() {
    let (client_io, server_io) = tokio::io::duplex(1024);
    let server = ToolServer::new(Config::default(), registry_with_notes(Default::default()));
    let handle = tokio::spawn(async move {
        let (reader, writer) = tokio::io::split(server_io);
        server.serve_connection(reader, writer).await
    });

    let (mut reader, mut writer) = tokio::io::split(client_io);
    writer.write_all(b"this is not json\n").await.unwrap();

    let mut out = Vec::new();
    reader.read_to_end(&mut out).await.unwrap();
    assert!(out.is_empty());
    assert!(handle.await.unwrap().is_err());
}

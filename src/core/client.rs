//! Caller-side helper speaking the same framing as the server.
//!
//! Requests are issued one at a time with increasing numeric ids, and each
//! response is checked against the id that was sent.

use tokio::io::{AsyncRead, AsyncWrite, BufReader};
use tracing::debug;

use super::protocol::{CallRequest, CallResponse, Message, RequestId};
use super::transport::framing::DEFAULT_MAX_FRAME_BYTES;
use super::transport::{FrameReader, FrameWriter, TransportError, TransportResult};
use crate::domains::tools::{Arguments, ToolDescriptor};

/// A client for one channel.
pub struct ToolClient<R, W> {
    reader: FrameReader<BufReader<R>>,
    writer: FrameWriter<W>,
    next_id: u64,
}

impl<R, W> ToolClient<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self::with_max_frame_bytes(reader, writer, DEFAULT_MAX_FRAME_BYTES)
    }

    pub fn with_max_frame_bytes(reader: R, writer: W, max_frame_bytes: usize) -> Self {
        Self {
            reader: FrameReader::new(BufReader::new(reader), max_frame_bytes),
            writer: FrameWriter::new(writer),
            next_id: 1,
        }
    }

    /// Fetch every tool descriptor the server offers.
    pub async fn list_tools(&mut self) -> TransportResult<Vec<ToolDescriptor>> {
        let request_id = self.next_request_id();
        match self.round_trip(Message::ListTools { request_id }).await? {
            Message::ToolList { tools, .. } => Ok(tools),
            other => Err(unexpected("tool_list", &other)),
        }
    }

    /// Invoke a tool and return its envelope.
    ///
    /// Domain errors and faults are normal outcomes here; only a broken
    /// channel is an `Err`.
    pub async fn call_tool(
        &mut self,
        name: impl Into<String>,
        arguments: Arguments,
    ) -> TransportResult<CallResponse> {
        let request = CallRequest {
            request_id: self.next_request_id(),
            name: name.into(),
            arguments,
        };
        match self.round_trip(Message::CallTool(request)).await? {
            Message::CallResult(response) => Ok(response),
            other => Err(unexpected("call_result", &other)),
        }
    }

    /// Close the write half so the server sees end of input.
    pub async fn close(mut self) -> TransportResult<()> {
        self.writer.shutdown().await?;
        Ok(())
    }

    fn next_request_id(&mut self) -> RequestId {
        let id = self.next_id;
        self.next_id += 1;
        RequestId::from(id)
    }

    async fn round_trip(&mut self, request: Message) -> TransportResult<Message> {
        let sent = request.request_id().clone();
        debug!("Sending '{}' request {}", request.kind(), sent);
        self.writer.write_frame(&request).await?;

        let response: Message = self
            .reader
            .read_frame()
            .await?
            .ok_or_else(|| TransportError::connection("server closed the channel"))?;

        if response.request_id() != &sent {
            return Err(TransportError::protocol(format!(
                "expected response to request {}, got {}",
                sent,
                response.request_id()
            )));
        }
        Ok(response)
    }
}

fn unexpected(expected: &str, got: &Message) -> TransportError {
    TransportError::protocol(format!("expected '{}', got '{}'", expected, got.kind()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::transport::framing::encode;
    use serde_json::{Map, json};

    fn frame(message: &Message) -> Vec<u8> {
        encode(message).unwrap()
    }

    #[tokio::test]
    async fn test_call_tool_round_trip() {
        let mut args = Map::new();
        args.insert("text".into(), json!("hi"));
        let request = frame(&Message::CallTool(CallRequest {
            request_id: RequestId::from(1u64),
            name: "echo".into(),
            arguments: args.clone(),
        }));
        let response = frame(&Message::CallResult(CallResponse::ok(
            RequestId::from(1u64),
            json!("hi"),
        )));

        let reader = tokio_test::io::Builder::new().read(&response).build();
        let writer = tokio_test::io::Builder::new().write(&request).build();
        let mut client = ToolClient::new(reader, writer);

        let resp = client.call_tool("echo", args).await.unwrap();
        assert!(resp.is_ok());
        assert_eq!(resp.payload, json!("hi"));
    }

    #[tokio::test]
    async fn test_request_ids_increase() {
        let mut client = ToolClient::new(tokio::io::empty(), tokio::io::sink());
        assert_eq!(client.next_request_id(), RequestId::from(1u64));
        assert_eq!(client.next_request_id(), RequestId::from(2u64));
    }

    #[tokio::test]
    async fn test_mismatched_id_is_a_protocol_error() {
        let response = frame(&Message::ToolList {
            request_id: RequestId::from(99u64),
            tools: vec![],
        });
        let mut client = ToolClient::new(&response[..], tokio::io::sink());
        let err = client.list_tools().await.unwrap_err();
        assert!(matches!(err, TransportError::ProtocolError(_)));
    }

    #[tokio::test]
    async fn test_wrong_kind_is_a_protocol_error() {
        let response = frame(&Message::CallResult(CallResponse::ok(
            RequestId::from(1u64),
            json!(null),
        )));
        let mut client = ToolClient::new(&response[..], tokio::io::sink());
        let err = client.list_tools().await.unwrap_err();
        assert!(err.to_string().contains("expected 'tool_list'"));
    }

    #[tokio::test]
    async fn test_closed_channel() {
        let mut client = ToolClient::new(tokio::io::empty(), tokio::io::sink());
        let err = client.list_tools().await.unwrap_err();
        assert!(matches!(err, TransportError::ConnectionError(_)));
    }
}

//! Request dispatch for one channel.
//!
//! The dispatcher reads frames, routes each request to the registry, and
//! writes exactly one response per request in arrival order. Unknown tools
//! and invalid arguments are answered with `domain_error` without invoking
//! any handler; handler failures and panics are contained in the response
//! envelope and never end the channel.
//!
//! A frame that cannot be decoded, or a response-kind message sent by the
//! caller, closes the channel without a response.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::{FutureExt, StreamExt};
use serde_json::Value;
use tokio::io::{AsyncRead, AsyncWrite, BufReader};
use tracing::{debug, info, instrument, warn};

use super::config::DispatchConfig;
use super::protocol::{CallRequest, CallResponse, Message, RequestId};
use super::transport::{FrameReader, FrameWriter, FramingError, TransportResult};
use crate::domains::tools::handlers::panic_message;
use crate::domains::tools::validation::validate_arguments;
use crate::domains::tools::{
    Arguments, RegisteredTool, ToolError, ToolRegistry, ToolResult, ValidationError,
};

/// Routes requests from one channel to the tool registry.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: Arc<ToolRegistry>,
    config: DispatchConfig,
}

impl Dispatcher {
    pub fn new(registry: Arc<ToolRegistry>, config: DispatchConfig) -> Self {
        Self { registry, config }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Answer a single request message.
    ///
    /// # Errors
    ///
    /// Returns [`FramingError::UnexpectedMessage`] for response-kind messages;
    /// the channel must be closed.
    pub async fn handle(&self, message: Message) -> Result<Message, FramingError> {
        match message {
            Message::ListTools { request_id } => Ok(self.list_tools(request_id)),
            Message::CallTool(request) => Ok(Message::CallResult(self.call(request).await)),
            other => Err(FramingError::UnexpectedMessage(other.kind())),
        }
    }

    /// Describe every registered tool, in registration order.
    pub fn list_tools(&self, request_id: RequestId) -> Message {
        debug!("Listing {} tools", self.registry.len());
        Message::ToolList {
            request_id,
            tools: self.registry.list().cloned().collect(),
        }
    }

    /// Validate and execute one tool call.
    ///
    /// Always produces a response; every failure is folded into the envelope.
    #[instrument(skip_all, fields(tool = %request.name, request_id = %request.request_id))]
    pub async fn call(&self, request: CallRequest) -> CallResponse {
        let CallRequest {
            request_id,
            name,
            arguments,
        } = request;

        let Some(tool) = self.registry.lookup(&name) else {
            debug!("Unknown tool");
            return CallResponse::from_outcome(request_id, Err(ValidationError::UnknownTool(name).into()));
        };

        let outcome = match validate_arguments(tool.descriptor(), arguments) {
            Ok(arguments) => self.invoke(tool, arguments).await,
            Err(e) => {
                debug!("Rejected arguments: {}", e);
                Err(e.into())
            }
        };

        match &outcome {
            Ok(_) => debug!("Call succeeded"),
            Err(e) if e.is_fault() => warn!("Call faulted: {}", e),
            Err(e) => debug!("Call failed: {}", e),
        }

        CallResponse::from_outcome(request_id, outcome)
    }

    /// Run the handler, turning a panic into a fault whatever the handler's
    /// origin (typed tool, closure or custom `ToolHandler`).
    async fn invoke(&self, tool: &RegisteredTool, arguments: Arguments) -> ToolResult<Value> {
        let name = &tool.descriptor().name;
        let call = async {
            match AssertUnwindSafe(async { tool.handler().invoke(arguments).await })
                .catch_unwind()
                .await
            {
                Ok(outcome) => outcome,
                Err(payload) => {
                    let msg = panic_message(payload.as_ref());
                    warn!("Tool '{}' panicked: {}", name, msg);
                    Err(ToolError::fault(format!("tool '{}' panicked: {}", name, msg)))
                }
            }
        };

        let Some(limit) = self.config.call_timeout() else {
            return call.await;
        };

        match tokio::time::timeout(limit, call).await {
            Ok(outcome) => outcome,
            Err(_) => Err(ToolError::fault(format!(
                "tool '{}' timed out after {}ms",
                name,
                limit.as_millis()
            ))),
        }
    }

    /// Serve one channel until the caller closes it.
    ///
    /// Up to `max_in_flight` requests are dispatched concurrently; responses
    /// are still written in the order the requests arrived.
    ///
    /// # Errors
    ///
    /// Returns the framing or I/O error that closed the channel. A caller
    /// hanging up, even mid-frame, is a normal close.
    pub async fn serve<R, W>(&self, reader: R, writer: W) -> TransportResult<()>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let frames =
            FrameReader::new(BufReader::new(reader), self.config.max_frame_bytes).into_stream::<Message>();
        let mut writer = FrameWriter::new(writer);

        let responses = frames
            .map(|frame| async move {
                let message = frame?;
                debug!("Received '{}' request {}", message.kind(), message.request_id());
                self.handle(message).await
            })
            .buffered(self.config.max_in_flight.max(1));
        futures::pin_mut!(responses);

        while let Some(outcome) = responses.next().await {
            match outcome {
                Ok(response) => writer.write_frame(&response).await?,
                Err(e) if e.is_connection_closed() => {
                    info!("Caller hung up: {}", e);
                    break;
                }
                Err(e) => {
                    warn!("Closing channel: {}", e);
                    return Err(e.into());
                }
            }
        }

        info!("Channel closed by caller");
        writer.shutdown().await?;
        Ok(())
    }
}

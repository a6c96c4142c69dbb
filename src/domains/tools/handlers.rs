//! Tool handler traits.
//!
//! A tool is written against one of two typed traits:
//! - [`Tool`] for handlers that suspend on I/O (`async fn call`)
//! - [`BlockingTool`] for handlers that block a thread (`fn call`)
//!
//! Both are erased behind [`ToolHandler`], the only shape the registry and
//! dispatcher know about: validated JSON arguments in, JSON value or
//! [`ToolError`] out.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;
use schemars::JsonSchema;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::warn;

use super::envelope::to_payload;
use super::error::{ToolError, ToolResult, ValidationError};

/// Validated, defaulted arguments for one call.
pub type Arguments = Map<String, Value>;

/// Parameter struct for tools that take no arguments.
#[derive(Debug, Clone, Default, serde::Deserialize, JsonSchema)]
pub struct NoParams {}

// ============================================================================
// Typed tool traits
// ============================================================================

/// A tool whose handler may suspend.
///
/// Backend handles (clients, pools, credentials) belong in the implementing
/// value and are injected when the tool is constructed.
#[async_trait]
pub trait Tool: Send + Sync + 'static {
    /// Tool name as advertised to callers.
    const NAME: &'static str;

    /// Tool description shown to callers.
    const DESCRIPTION: &'static str;

    type Params: DeserializeOwned + JsonSchema + Send;
    type Output: Serialize + JsonSchema + Send;

    async fn call(&self, params: Self::Params) -> ToolResult<Self::Output>;
}

/// A tool whose handler blocks the calling thread.
///
/// Calls are moved onto the runtime's blocking pool so they never stall
/// suspended handlers or the dispatcher.
pub trait BlockingTool: Send + Sync + 'static {
    /// Tool name as advertised to callers.
    const NAME: &'static str;

    /// Tool description shown to callers.
    const DESCRIPTION: &'static str;

    type Params: DeserializeOwned + JsonSchema + Send + 'static;
    type Output: Serialize + JsonSchema + Send;

    fn call(&self, params: Self::Params) -> ToolResult<Self::Output>;
}

// ============================================================================
// Erased handler
// ============================================================================

/// Type-erased handler stored in the registry.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    /// Invoke the tool with already-validated arguments.
    async fn invoke(&self, arguments: Arguments) -> ToolResult<Value>;
}

/// Closures taking raw arguments can be registered directly.
#[async_trait]
impl<F, Fut> ToolHandler for F
where
    F: Fn(Arguments) -> Fut + Send + Sync,
    Fut: std::future::Future<Output = ToolResult<Value>> + Send,
{
    async fn invoke(&self, arguments: Arguments) -> ToolResult<Value> {
        (self)(arguments).await
    }
}

fn decode_params<P: DeserializeOwned>(arguments: Arguments) -> ToolResult<P> {
    serde_json::from_value(Value::Object(arguments))
        .map_err(|e| ValidationError::InvalidArguments(e.to_string()).into())
}

pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Adapter from [`Tool`] to [`ToolHandler`].
pub(crate) struct AsyncHandler<T>(pub(crate) Arc<T>);

#[async_trait]
impl<T: Tool> ToolHandler for AsyncHandler<T> {
    async fn invoke(&self, arguments: Arguments) -> ToolResult<Value> {
        let params: T::Params = decode_params(arguments)?;

        match AssertUnwindSafe(self.0.call(params)).catch_unwind().await {
            Ok(result) => to_payload(&result?),
            Err(payload) => {
                let msg = panic_message(payload.as_ref());
                warn!("Tool '{}' panicked: {}", T::NAME, msg);
                Err(ToolError::fault(format!("tool '{}' panicked: {}", T::NAME, msg)))
            }
        }
    }
}

/// Adapter from [`BlockingTool`] to [`ToolHandler`].
pub(crate) struct BlockingHandler<T>(pub(crate) Arc<T>);

#[async_trait]
impl<T: BlockingTool> ToolHandler for BlockingHandler<T> {
    async fn invoke(&self, arguments: Arguments) -> ToolResult<Value> {
        let params: T::Params = decode_params(arguments)?;
        let tool = Arc::clone(&self.0);

        let joined = tokio::task::spawn_blocking(move || {
            tool.call(params).and_then(|output| to_payload(&output))
        })
        .await;

        match joined {
            Ok(result) => result,
            Err(e) if e.is_panic() => {
                let msg = panic_message(e.into_panic().as_ref());
                warn!("Tool '{}' panicked: {}", T::NAME, msg);
                Err(ToolError::fault(format!("tool '{}' panicked: {}", T::NAME, msg)))
            }
            Err(e) => Err(ToolError::fault(format!("tool '{}' was cancelled: {}", T::NAME, e))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Deserialize, JsonSchema)]
    struct CountParams {
        n: u32,
    }

    struct Doubler;

    #[async_trait]
    impl Tool for Doubler {
        const NAME: &'static str = "double";
        const DESCRIPTION: &'static str = "Double a number";
        type Params = CountParams;
        type Output = u64;

        async fn call(&self, params: CountParams) -> ToolResult<u64> {
            Ok(u64::from(params.n) * 2)
        }
    }

    struct Exploding;

    impl BlockingTool for Exploding {
        const NAME: &'static str = "explode";
        const DESCRIPTION: &'static str = "Always panics";
        type Params = NoParams;
        type Output = ();

        fn call(&self, _params: NoParams) -> ToolResult<()> {
            panic!("boom");
        }
    }

    fn args(value: Value) -> Arguments {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_async_handler_success() {
        let handler = AsyncHandler(Arc::new(Doubler));
        let out = handler.invoke(args(json!({ "n": 21 }))).await.unwrap();
        assert_eq!(out, json!(42));
    }

    #[tokio::test]
    async fn test_out_of_range_argument_is_domain_error() {
        let handler = AsyncHandler(Arc::new(Doubler));
        let err = handler.invoke(args(json!({ "n": -1 }))).await.unwrap_err();
        assert!(!err.is_fault());
        assert!(err.to_string().starts_with("invalid arguments:"));
    }

    #[tokio::test]
    async fn test_blocking_panic_is_fault() {
        let handler = BlockingHandler(Arc::new(Exploding));
        let err = handler.invoke(Arguments::new()).await.unwrap_err();
        assert!(err.is_fault());
        assert!(err.to_string().contains("boom"));
    }

    #[tokio::test]
    async fn test_closure_handler() {
        let handler =
            |arguments: Arguments| async move { Ok::<_, ToolError>(Value::Object(arguments)) };
        let out = handler.invoke(args(json!({ "k": "v" }))).await.unwrap();
        assert_eq!(out, json!({ "k": "v" }));
    }
}

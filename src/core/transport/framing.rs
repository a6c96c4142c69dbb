//! Transport framing - newline-delimited JSON.
//!
//! Each frame is one compact JSON document followed by `\n`. Compact JSON
//! escapes every control character inside strings, so a payload can never
//! contain a raw delimiter and frame boundaries are always recoverable.
//!
//! The reader tolerates `\r\n` line endings and skips blank lines. It keeps
//! whatever it read past the current frame in its buffer for the next call.

use futures::Stream;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::trace;

use super::error::FramingError;

/// Frame delimiter.
pub const DELIMITER: u8 = b'\n';

/// Default upper bound on a single frame (8 MiB).
pub const DEFAULT_MAX_FRAME_BYTES: usize = 8 * 1024 * 1024;

/// Encode `message` as one frame, delimiter included.
pub fn encode<T: Serialize>(message: &T) -> Result<Vec<u8>, FramingError> {
    let mut bytes = serde_json::to_vec(message)?;
    bytes.push(DELIMITER);
    Ok(bytes)
}

/// Decode one frame body (without its delimiter).
///
/// Returns `Ok(None)` for a blank line.
pub fn decode<T: DeserializeOwned>(frame: &[u8]) -> Result<Option<T>, FramingError> {
    let frame = frame.strip_suffix(b"\r").unwrap_or(frame);
    let text = std::str::from_utf8(frame)?;
    if text.trim().is_empty() {
        return Ok(None);
    }
    Ok(Some(serde_json::from_str(text)?))
}

// ============================================================================
// Reader
// ============================================================================

/// Reads frames from a buffered byte stream.
pub struct FrameReader<R> {
    inner: R,
    buf: Vec<u8>,
    max_frame_bytes: usize,
}

impl<R: AsyncBufRead + Unpin> FrameReader<R> {
    pub fn new(inner: R, max_frame_bytes: usize) -> Self {
        Self {
            inner,
            buf: Vec::new(),
            max_frame_bytes,
        }
    }

    /// Read the next message.
    ///
    /// Returns `Ok(None)` when the stream ends cleanly on a frame boundary and
    /// [`FramingError::ConnectionClosed`] when it ends mid-frame.
    pub async fn read_frame<T: DeserializeOwned>(&mut self) -> Result<Option<T>, FramingError> {
        loop {
            let Some(line) = self.next_line().await? else {
                return Ok(None);
            };
            if let Some(message) = decode(&line)? {
                return Ok(Some(message));
            }
            trace!("Skipping blank line");
        }
    }

    /// Pull bytes until one delimiter-terminated line is buffered.
    async fn next_line(&mut self) -> Result<Option<Vec<u8>>, FramingError> {
        loop {
            let available = self.inner.fill_buf().await?;
            if available.is_empty() {
                return if self.buf.is_empty() {
                    Ok(None)
                } else {
                    Err(FramingError::ConnectionClosed {
                        pending: self.buf.len(),
                    })
                };
            }

            let (chunk, found) = match available.iter().position(|&b| b == DELIMITER) {
                Some(i) => (&available[..i], Some(i + 1)),
                None => (available, None),
            };

            if self.buf.len() + chunk.len() > self.max_frame_bytes {
                return Err(FramingError::FrameTooLarge {
                    max: self.max_frame_bytes,
                });
            }
            self.buf.extend_from_slice(chunk);

            match found {
                Some(consumed) => {
                    self.inner.consume(consumed);
                    return Ok(Some(std::mem::take(&mut self.buf)));
                }
                None => {
                    let consumed = chunk.len();
                    self.inner.consume(consumed);
                }
            }
        }
    }

    /// Turn the reader into a stream of messages.
    ///
    /// The stream ends after the first error or at end of input.
    pub fn into_stream<T>(self) -> impl Stream<Item = Result<T, FramingError>>
    where
        T: DeserializeOwned,
    {
        futures::stream::unfold(Some(self), |state| async move {
            let mut reader = state?;
            match reader.read_frame().await {
                Ok(Some(message)) => Some((Ok(message), Some(reader))),
                Ok(None) => None,
                Err(e) => Some((Err(e), None)),
            }
        })
    }
}

// ============================================================================
// Writer
// ============================================================================

/// Writes frames to a byte stream.
pub struct FrameWriter<W> {
    inner: W,
}

impl<W: AsyncWrite + Unpin> FrameWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    /// Write one message and flush it.
    pub async fn write_frame<T: Serialize>(&mut self, message: &T) -> Result<(), FramingError> {
        let bytes = encode(message)?;
        self.inner.write_all(&bytes).await?;
        self.inner.flush().await?;
        Ok(())
    }

    /// Shut down the write half.
    pub async fn shutdown(&mut self) -> Result<(), FramingError> {
        self.inner.shutdown().await?;
        Ok(())
    }
}

//! WebSocket transport.

use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt as _;
use tokio_tungstenite::tungstenite::Message;

use crate::LiveError;
use crate::client::{Connector, FrameStream};

/// How long the TCP connect plus WebSocket handshake may take.
pub const DEFAULT_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

/// Connects over `ws://` using `tokio-tungstenite`.
///
/// Text frames are passed through, binary frames are accepted if they are
/// UTF-8, and control frames are handled by the library. A close frame
/// ends the stream.
#[derive(Debug, Clone, Copy)]
pub struct WsConnector {
    handshake_timeout: Duration,
}

impl Default for WsConnector {
    fn default() -> Self {
        Self::with_timeout(DEFAULT_HANDSHAKE_TIMEOUT)
    }
}

impl WsConnector {
    /// Creates a connector that abandons handshakes after `handshake_timeout`.
    #[must_use]
    pub const fn with_timeout(handshake_timeout: Duration) -> Self {
        Self { handshake_timeout }
    }
}

#[async_trait]
impl Connector for WsConnector {
    async fn connect(&self, url: &str) -> Result<FrameStream, LiveError> {
        let (socket, response) =
            tokio::time::timeout(self.handshake_timeout, tokio_tungstenite::connect_async(url))
                .await
                .map_err(|_| LiveError::Transport {
                    message: format!("handshake timed out after {:?}", self.handshake_timeout),
                })?
                .map_err(|e| LiveError::Transport {
                    message: e.to_string(),
                })?;
        log::debug!("WebSocket handshake with {url}: {}", response.status());

        let frames = socket.filter_map(|item| async move {
            match item {
                Ok(Message::Text(text)) => Some(Ok(text.as_str().to_owned())),
                Ok(Message::Binary(bytes)) => match String::from_utf8(bytes.to_vec()) {
                    Ok(text) => Some(Ok(text)),
                    Err(e) => {
                        log::warn!("Dropping non-UTF-8 binary frame: {e}");
                        None
                    }
                },
                Ok(Message::Close(frame)) => {
                    log::debug!("WebSocket close frame: {frame:?}");
                    None
                }
                Ok(Message::Ping(_) | Message::Pong(_) | Message::Frame(_)) => None,
                Err(e) => Some(Err(LiveError::Transport {
                    message: e.to_string(),
                })),
            }
        });
        Ok(Box::pin(frames))
    }
}

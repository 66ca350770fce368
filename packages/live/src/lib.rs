#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Live-update client for the lovebug map push channel.
//!
//! The push channel is an optimization layer on top of polling: a single
//! connection delivers `{ "type": ..., "data": ... }` messages which are
//! fanned out to subscribers. When the connection drops, the client
//! reconnects with linear backoff and eventually gives up; nothing in
//! here ever returns a transport error into message handling.
//!
//! The reconnect policy is a sans-IO state machine ([`machine`]) so it
//! can be tested without sockets or timers. [`LiveClient`] drives it on a
//! tokio task through a [`Connector`]; [`WsConnector`] is the WebSocket
//! implementation.

pub mod client;
pub mod machine;
pub mod message;
pub mod subscribers;
pub mod ws;

pub use client::{Connector, FrameStream, LiveClient};
pub use machine::{ConnectionState, ReconnectPolicy};
pub use message::{LiveEventKind, LiveMessage};
pub use subscribers::{Subscribers, SubscriptionId};
pub use ws::{DEFAULT_HANDSHAKE_TIMEOUT, WsConnector};

/// Default push endpoint for local development.
pub const DEFAULT_WS_URL: &str = "ws://localhost:8000/ws";

/// Errors produced by the live-update client.
#[derive(Debug, thiserror::Error)]
pub enum LiveError {
    /// The transport failed to connect or broke mid-stream.
    #[error("Live transport error: {message}")]
    Transport {
        /// Description of what went wrong.
        message: String,
    },

    /// A frame was not a `{ type, data }` object.
    #[error("Malformed live message: {0}")]
    Malformed(#[from] serde_json::Error),

    /// A message's `data` did not match its declared type.
    #[error("Unexpected payload for {event_type}: {source}")]
    Payload {
        /// The message type.
        event_type: String,
        /// Decode error.
        source: serde_json::Error,
    },

    /// The initial connection attempt failed.
    #[error("Live connection could not be established")]
    ConnectFailed,

    /// The client's background task is gone.
    #[error("Live client has shut down")]
    Closed,
}

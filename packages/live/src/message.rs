//! Push-channel message envelope.

use lovebug_report_models::{Hotspot, Report, Stats, StatsPayload};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

use crate::LiveError;

/// Message types the server is known to push.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum LiveEventKind {
    /// A single newly created report.
    NewReport,
    /// Fresh aggregate statistics.
    StatsUpdate,
    /// One or more hotspots changed.
    HotspotUpdate,
}

/// A `{ "type": ..., "data": ... }` frame.
///
/// `data` defaults to `null` when absent. Unknown types parse fine and are
/// dispatched to whoever subscribed to that exact string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveMessage {
    /// Routing key.
    #[serde(rename = "type")]
    pub event_type: String,
    /// Type-specific payload.
    #[serde(default)]
    pub data: serde_json::Value,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl LiveMessage {
    /// Parses one text frame.
    ///
    /// # Errors
    ///
    /// Returns [`LiveError::Malformed`] if the frame is not JSON, not an
    /// object, or has no string `type`.
    pub fn parse(frame: &str) -> Result<Self, LiveError> {
        Ok(serde_json::from_str(frame)?)
    }

    /// The known kind of this message, if any.
    #[must_use]
    pub fn kind(&self) -> Option<LiveEventKind> {
        self.event_type.parse().ok()
    }

    fn decode<T: DeserializeOwned>(&self) -> Result<T, LiveError> {
        T::deserialize(&self.data).map_err(|source| LiveError::Payload {
            event_type: self.event_type.clone(),
            source,
        })
    }

    /// Decodes a `new_report` payload.
    ///
    /// # Errors
    ///
    /// Returns [`LiveError::Payload`] if `data` is not a report.
    pub fn report(&self) -> Result<Report, LiveError> {
        self.decode()
    }

    /// Decodes a `stats_update` payload in either stats shape.
    ///
    /// # Errors
    ///
    /// Returns [`LiveError::Payload`] if `data` is not a stats object.
    pub fn stats(&self) -> Result<Stats, LiveError> {
        self.decode::<StatsPayload>().map(Into::into)
    }

    /// Decodes a `hotspot_update` payload, accepting a single hotspot or a
    /// list.
    ///
    /// # Errors
    ///
    /// Returns [`LiveError::Payload`] if `data` is neither.
    pub fn hotspots(&self) -> Result<Vec<Hotspot>, LiveError> {
        Ok(match self.decode::<OneOrMany<Hotspot>>()? {
            OneOrMany::Many(hotspots) => hotspots,
            OneOrMany::One(hotspot) => vec![hotspot],
        })
    }
}

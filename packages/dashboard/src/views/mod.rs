//! Per-page view models.

pub mod dashboard;
pub mod home;
pub mod hotspots;
pub mod map;
pub mod reports;
pub mod statistics;

use lovebug_live::ConnectionState;

/// Time window choices offered by the page filters, in hours.
pub const TIME_FILTERS: &[(u32, &str)] = &[
    (1, "Last hour"),
    (6, "Last 6 hours"),
    (24, "Last 24 hours"),
    (72, "Last 3 days"),
    (168, "Last 7 days"),
    (720, "Last 30 days"),
];

/// Default time window.
pub const DEFAULT_HOURS: u32 = 24;

/// Label for a time window, falling back to "Last N hours".
#[must_use]
pub fn time_filter_label(hours: u32) -> String {
    TIME_FILTERS
        .iter()
        .find(|(h, _)| *h == hours)
        .map_or_else(|| format!("Last {hours} hours"), |(_, label)| (*label).to_string())
}

/// Status text for the live-update indicator.
#[must_use]
pub fn connection_indicator(state: ConnectionState) -> String {
    match state {
        ConnectionState::Connected => "Live".to_string(),
        ConnectionState::Connecting { attempt: 0 } => "Connecting...".to_string(),
        ConnectionState::Connecting { attempt } | ConnectionState::Reconnecting { attempt } => {
            format!("Reconnecting ({attempt})...")
        }
        ConnectionState::Disconnected | ConnectionState::GaveUp => "Offline".to_string(),
    }
}

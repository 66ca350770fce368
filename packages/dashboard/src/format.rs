//! Display formatting helpers.

use chrono::{DateTime, Local, TimeZone, Utc};
use lovebug_report_models::{Platform, Severity};

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Formats a timestamp as `YYYY-MM-DD HH:MM` in its own timezone.
#[must_use]
pub fn format_date<Tz: TimeZone>(date: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    date.format(DATE_FORMAT).to_string()
}

fn format_local(date: DateTime<Utc>) -> String {
    format_date(&date.with_timezone(&Local))
}

/// "just now", "N min ago", "N hours ago" or "N days ago" for the last
/// week; the local date after that.
#[must_use]
pub fn format_relative_time(date: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let minutes = (now - date).num_minutes();
    let hours = minutes / 60;
    let days = hours / 24;

    if minutes < 1 {
        "just now".to_string()
    } else if minutes < 60 {
        format!("{minutes} min ago")
    } else if hours < 24 {
        format!("{hours} hours ago")
    } else if days < 7 {
        format!("{days} days ago")
    } else {
        format_local(date)
    }
}

/// Like [`format_relative_time`] but counts days up to 30.
#[must_use]
pub fn format_time_ago(date: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - date).num_seconds();

    if seconds < 60 {
        "just now".to_string()
    } else if seconds < 3_600 {
        format!("{} min ago", seconds / 60)
    } else if seconds < 86_400 {
        format!("{} hours ago", seconds / 3_600)
    } else if seconds < 2_592_000 {
        format!("{} days ago", seconds / 86_400)
    } else {
        format_local(date)
    }
}

/// Compact count: `999`, `1.2K`, `3.4M`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn format_number(n: u64) -> String {
    if n >= 1_000_000 {
        format!("{:.1}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{:.1}K", n as f64 / 1_000.0)
    } else {
        n.to_string()
    }
}

/// `value / total` as a one-decimal percentage; `"0%"` when `total` is 0.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn format_percentage(value: u64, total: u64) -> String {
    if total == 0 {
        return "0%".to_string();
    }
    format!("{:.1}%", value as f64 / total as f64 * 100.0)
}

/// Shortens a street address to its district and neighbourhood (the
/// second and third words) when it has at least three.
#[must_use]
pub fn format_address(address: &str) -> String {
    let parts: Vec<&str> = address.split_whitespace().collect();
    if parts.len() >= 3 {
        format!("{} {}", parts[1], parts[2])
    } else {
        address.to_string()
    }
}

/// Cuts `text` to `max_chars` characters, appending `...` if anything was
/// removed. `None` becomes an empty string.
#[must_use]
pub fn truncate_text(text: Option<&str>, max_chars: usize) -> String {
    let Some(text) = text else {
        return String::new();
    };
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => format!("{}...", &text[..end]),
        None => text.to_string(),
    }
}

/// Confidence in `0.0..=1.0` as a one-decimal percentage.
#[must_use]
pub fn format_confidence(confidence: f64) -> String {
    format!("{:.1}%", confidence * 100.0)
}

/// `lat, lng` to four decimals.
#[must_use]
pub fn format_location(latitude: f64, longitude: f64) -> String {
    format!("{latitude:.4}, {longitude:.4}")
}

/// Display label for a severity.
#[must_use]
pub const fn severity_label(severity: Severity) -> &'static str {
    severity.label()
}

/// Display label for a platform.
#[must_use]
pub const fn platform_label(platform: Platform) -> &'static str {
    platform.label()
}

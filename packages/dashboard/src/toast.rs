//! Pop-up notice for newly pushed reports.

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use lovebug_report_models::Report;

use crate::format::{format_address, format_relative_time, severity_label};

/// How long a toast stays up.
pub const TOAST_DURATION: Duration = Duration::from_secs(3);

/// When the exit animation starts.
pub const TOAST_EXIT_AFTER: Duration = Duration::from_millis(2_500);

/// Lifecycle of the current toast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastPhase {
    /// Fully shown.
    Visible,
    /// Animating out.
    Exiting,
    /// Nothing to show.
    Hidden,
}

/// The most recently pushed report, shown briefly.
#[derive(Debug, Clone, Default)]
pub struct Toast {
    report: Option<Report>,
    shown_at: Option<Instant>,
}

impl Toast {
    /// Shows `report`, replacing any current toast and restarting the
    /// timer.
    pub fn show(&mut self, report: Report, now: Instant) {
        self.report = Some(report);
        self.shown_at = Some(now);
    }

    /// Hides the toast immediately.
    pub fn dismiss(&mut self) {
        self.report = None;
        self.shown_at = None;
    }

    /// Phase at `now`.
    #[must_use]
    pub fn phase(&self, now: Instant) -> ToastPhase {
        let Some(shown_at) = self.shown_at.filter(|_| self.report.is_some()) else {
            return ToastPhase::Hidden;
        };
        let elapsed = now.saturating_duration_since(shown_at);
        if elapsed < TOAST_EXIT_AFTER {
            ToastPhase::Visible
        } else if elapsed < TOAST_DURATION {
            ToastPhase::Exiting
        } else {
            ToastPhase::Hidden
        }
    }

    /// The report on screen at `now`, if any.
    #[must_use]
    pub fn current(&self, now: Instant) -> Option<&Report> {
        match self.phase(now) {
            ToastPhase::Hidden => None,
            ToastPhase::Visible | ToastPhase::Exiting => self.report.as_ref(),
        }
    }

    /// Text lines for the toast at `now`; empty when hidden.
    #[must_use]
    pub fn lines(&self, now: Instant, wall_clock: DateTime<Utc>) -> Vec<String> {
        let Some(report) = self.current(now) else {
            return Vec::new();
        };
        let address = report
            .location
            .address
            .as_deref()
            .map(format_address)
            .unwrap_or_default();
        vec![
            "New lovebug report".to_string(),
            report.content.clone(),
            format!("{address} [{}]", severity_label(report.severity)),
            format!(
                "{} via {}",
                format_relative_time(report.created_at, wall_clock),
                report.platform
            ),
        ]
    }
}

#[cfg(test)]
mod tests {
    use lovebug_report_models::{Location, Platform, Severity};

    use super::*;

    fn report() -> Report {
        let mut location = Location::new(37.5, 127.0);
        location.address = Some("Seoul Mapo-gu Hapjeong-dong 12".to_string());
        Report {
            id: "r-1".to_string(),
            content: "Swarm by the river".to_string(),
            description: None,
            location,
            address: None,
            severity: Severity::Critical,
            platform: Platform::Naver,
            created_at: Utc::now(),
            keywords: Vec::new(),
            confidence: 0.9,
            sentiment: 0.0,
            photos: Vec::new(),
            verified: false,
            verification_count: 0,
            user_id: None,
            reported_at: None,
        }
    }

    #[test]
    fn lifecycle() {
        let start = Instant::now();
        let mut toast = Toast::default();
        assert_eq!(toast.phase(start), ToastPhase::Hidden);

        toast.show(report(), start);
        assert_eq!(toast.phase(start), ToastPhase::Visible);
        assert_eq!(
            toast.phase(start + Duration::from_millis(2_499)),
            ToastPhase::Visible
        );
        assert_eq!(
            toast.phase(start + Duration::from_millis(2_500)),
            ToastPhase::Exiting
        );
        assert_eq!(toast.phase(start + TOAST_DURATION), ToastPhase::Hidden);
        assert!(toast.current(start + TOAST_DURATION).is_none());
    }

    #[test]
    fn new_report_restarts_timer() {
        let start = Instant::now();
        let mut toast = Toast::default();
        toast.show(report(), start);
        toast.show(report(), start + Duration::from_secs(2));
        assert_eq!(
            toast.phase(start + Duration::from_secs(4)),
            ToastPhase::Visible
        );
    }

    #[test]
    fn dismiss_hides_immediately() {
        let start = Instant::now();
        let mut toast = Toast::default();
        toast.show(report(), start);
        toast.dismiss();
        assert_eq!(toast.phase(start), ToastPhase::Hidden);
        assert!(toast.lines(start, Utc::now()).is_empty());
    }

    #[test]
    fn lines_summarize_report() {
        let start = Instant::now();
        let mut toast = Toast::default();
        toast.show(report(), start);
        let lines = toast.lines(start, Utc::now());
        assert_eq!(lines[1], "Swarm by the river");
        assert_eq!(lines[2], "Mapo-gu Hapjeong-dong [Critical]");
        assert_eq!(lines[3], "just now via naver");
    }
}

//! Periodic refresh and the merged view state.
//!
//! Polling and live pushes both write into [`ViewState`]. Neither is
//! authoritative: whichever write lands last is what the views show.

use std::time::Duration;

use chrono::{DateTime, Utc};
use lovebug_api::DataAccess;
use lovebug_live::{LiveEventKind, LiveMessage};
use lovebug_report_models::{Hotspot, Report, SearchFilter, Stats};

/// Something the dashboard refreshes on a timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PollKind {
    /// Aggregate statistics.
    Stats,
    /// Report list.
    Reports,
    /// Hotspot list.
    Hotspots,
}

impl PollKind {
    /// All poll kinds.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Stats, Self::Reports, Self::Hotspots]
    }

    /// Refresh period.
    #[must_use]
    pub const fn interval(self) -> Duration {
        match self {
            Self::Stats => Duration::from_secs(30),
            Self::Reports => Duration::from_secs(60),
            Self::Hotspots => Duration::from_secs(120),
        }
    }
}

/// Where a value in [`ViewState`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateSource {
    /// A scheduled fetch.
    Poll,
    /// A push-channel message.
    Push,
}

/// A value with its provenance.
#[derive(Debug, Clone, PartialEq)]
pub struct Stamped<T> {
    /// The value.
    pub value: T,
    /// When it was written.
    pub updated_at: DateTime<Utc>,
    /// Who wrote it.
    pub source: UpdateSource,
}

/// Freshly fetched data for one [`PollKind`].
#[derive(Debug, Clone, PartialEq)]
pub enum Polled {
    /// Result of a stats poll.
    Stats(Stats),
    /// Result of a reports poll.
    Reports(Vec<Report>),
    /// Result of a hotspots poll.
    Hotspots(Vec<Hotspot>),
}

/// Fetches one kind of data. Never fails; [`DataAccess`] substitutes
/// sample data when the API is down.
pub async fn poll_once(data: &DataAccess, filter: &SearchFilter, kind: PollKind) -> Polled {
    log::debug!("Polling {kind:?}");
    match kind {
        PollKind::Stats => Polled::Stats(data.get_stats(filter).await),
        PollKind::Reports => Polled::Reports(data.get_reports(filter).await),
        PollKind::Hotspots => Polled::Hotspots(data.get_hotspots(filter).await),
    }
}

/// Latest reports, hotspots and stats shown by the views.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewState {
    reports: Option<Stamped<Vec<Report>>>,
    hotspots: Option<Stamped<Vec<Hotspot>>>,
    stats: Option<Stamped<Stats>>,
}

fn stamp<T>(value: T, source: UpdateSource, at: DateTime<Utc>) -> Option<Stamped<T>> {
    Some(Stamped {
        value,
        updated_at: at,
        source,
    })
}

impl ViewState {
    /// Current reports.
    #[must_use]
    pub const fn reports(&self) -> Option<&Stamped<Vec<Report>>> {
        self.reports.as_ref()
    }

    /// Current hotspots.
    #[must_use]
    pub const fn hotspots(&self) -> Option<&Stamped<Vec<Hotspot>>> {
        self.hotspots.as_ref()
    }

    /// Current stats.
    #[must_use]
    pub const fn stats(&self) -> Option<&Stamped<Stats>> {
        self.stats.as_ref()
    }

    /// Replaces the reports.
    pub fn set_reports(&mut self, reports: Vec<Report>, source: UpdateSource, at: DateTime<Utc>) {
        self.reports = stamp(reports, source, at);
    }

    /// Replaces the hotspots.
    pub fn set_hotspots(
        &mut self,
        hotspots: Vec<Hotspot>,
        source: UpdateSource,
        at: DateTime<Utc>,
    ) {
        self.hotspots = stamp(hotspots, source, at);
    }

    /// Replaces the stats.
    pub fn set_stats(&mut self, stats: Stats, source: UpdateSource, at: DateTime<Utc>) {
        self.stats = stamp(stats, source, at);
    }

    /// Stores a poll result.
    pub fn apply_poll(&mut self, polled: Polled, at: DateTime<Utc>) {
        match polled {
            Polled::Stats(stats) => self.set_stats(stats, UpdateSource::Poll, at),
            Polled::Reports(reports) => self.set_reports(reports, UpdateSource::Poll, at),
            Polled::Hotspots(hotspots) => self.set_hotspots(hotspots, UpdateSource::Poll, at),
        }
    }

    /// Applies a pushed message. Returns `false` if the message was not a
    /// known kind or its payload did not decode.
    ///
    /// A pushed report goes to the front of the list, replacing any report
    /// with the same ID. Pushed hotspots replace hotspots with matching
    /// IDs and are appended otherwise.
    pub fn apply_live(&mut self, message: &LiveMessage, at: DateTime<Utc>) -> bool {
        let Some(kind) = message.kind() else {
            log::debug!("Ignoring live message of type {}", message.event_type);
            return false;
        };

        let applied = match kind {
            LiveEventKind::NewReport => message.report().map(|report| {
                let mut reports = self
                    .reports
                    .take()
                    .map(|stamped| stamped.value)
                    .unwrap_or_default();
                reports.retain(|existing| existing.id != report.id);
                reports.insert(0, report);
                self.set_reports(reports, UpdateSource::Push, at);
            }),
            LiveEventKind::StatsUpdate => message
                .stats()
                .map(|stats| self.set_stats(stats, UpdateSource::Push, at)),
            LiveEventKind::HotspotUpdate => message.hotspots().map(|updates| {
                let mut hotspots = self
                    .hotspots
                    .take()
                    .map(|stamped| stamped.value)
                    .unwrap_or_default();
                for update in updates {
                    match hotspots.iter_mut().find(|h| h.id == update.id) {
                        Some(existing) => *existing = update,
                        None => hotspots.push(update),
                    }
                }
                self.set_hotspots(hotspots, UpdateSource::Push, at);
            }),
        };

        applied
            .inspect_err(|e| log::warn!("Ignoring live {kind} message: {e}"))
            .is_ok()
    }
}

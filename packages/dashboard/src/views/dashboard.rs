//! Summary cards.

use lovebug_report_models::{Platform, SearchFilter, Severity, Stats};

use crate::format::format_percentage;

/// Hotspots shown on the dashboard.
pub const DASHBOARD_HOTSPOT_LIMIT: u32 = 6;

/// One row of the severity breakdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeverityShare {
    /// Severity.
    pub severity: Severity,
    /// Reports with that severity.
    pub count: u64,
    /// Formatted share of all reports.
    pub percentage: String,
}

/// Numbers behind the dashboard cards.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardSummary {
    /// Time window in hours.
    pub hours: u32,
    /// All reports.
    pub total: u64,
    /// Verified reports.
    pub verified: u64,
    /// Pending reports.
    pub pending: u64,
    /// Verified share in percent; 0 when there are no reports.
    pub verification_rate: f64,
    /// Platform with the most reports.
    pub dominant_platform: Option<(Platform, u64)>,
    /// Breakdown by severity, most severe first.
    pub severity: Vec<SeverityShare>,
}

impl DashboardSummary {
    /// Derives the cards from `stats`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn from_stats(stats: &Stats, hours: u32) -> Self {
        let verification_rate = if stats.total_reports == 0 {
            0.0
        } else {
            stats.verified_reports as f64 / stats.total_reports as f64 * 100.0
        };
        let total = stats.by_severity.total();

        Self {
            hours,
            total: stats.total_reports,
            verified: stats.verified_reports,
            pending: stats.pending_reports,
            verification_rate,
            dominant_platform: stats.dominant_platform(),
            severity: Severity::all()
                .iter()
                .rev()
                .map(|severity| {
                    let count = stats.by_severity.get(*severity);
                    SeverityShare {
                        severity: *severity,
                        count,
                        percentage: format_percentage(count, total),
                    }
                })
                .collect(),
        }
    }

    /// Filter for the dashboard's stats request.
    #[must_use]
    pub fn stats_filter(hours: u32) -> SearchFilter {
        SearchFilter::with_hours(hours)
    }

    /// Filter for the dashboard's hotspot request.
    #[must_use]
    pub fn hotspot_filter(hours: u32) -> SearchFilter {
        SearchFilter {
            limit: Some(DASHBOARD_HOTSPOT_LIMIT),
            ..SearchFilter::with_hours(hours)
        }
    }
}

//! Distributions and trends derived from the report list.

use chrono::{DateTime, NaiveDate, TimeDelta, Timelike as _, Utc};
use lovebug_report_models::{Platform, Report, SearchFilter, Severity, Stats};

use crate::format::format_percentage;

/// Reports fetched to compute the statistics page.
pub const STATISTICS_REPORT_LIMIT: u32 = 1_000;

/// Days covered by the daily trend.
pub const TREND_DAYS: usize = 7;

/// Reports created in one hour of the day (UTC).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HourBucket {
    /// Hour of day, 0-23.
    pub hour: u32,
    /// Reports in that hour.
    pub count: u64,
    /// Share of all reports in percent.
    pub percentage: f64,
}

/// One day of the trend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyPoint {
    /// Calendar day (UTC).
    pub date: NaiveDate,
    /// Reports created that day.
    pub count: u64,
    /// Running total from the first day shown.
    pub accumulated: u64,
}

/// Average confidence of one severity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeverityConfidence {
    /// Severity.
    pub severity: Severity,
    /// Mean confidence in percent.
    pub average_confidence: f64,
    /// Reports averaged.
    pub count: u64,
}

/// Filter for the statistics page's report request.
#[must_use]
pub fn report_filter(hours: u32) -> SearchFilter {
    SearchFilter {
        limit: Some(STATISTICS_REPORT_LIMIT),
        ..SearchFilter::with_hours(hours)
    }
}

/// Buckets reports by UTC hour of creation. Always 24 buckets.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn hourly_distribution(reports: &[Report]) -> Vec<HourBucket> {
    let mut counts = [0_u64; 24];
    for report in reports {
        counts[report.created_at.hour() as usize] += 1;
    }
    let total = reports.len() as f64;
    (0..24_u32)
        .zip(counts)
        .map(|(hour, count)| HourBucket {
            hour,
            count,
            percentage: if reports.is_empty() {
                0.0
            } else {
                count as f64 / total * 100.0
            },
        })
        .collect()
}

/// Hour with the most reports; the earliest hour wins ties.
#[must_use]
pub fn peak_hour(buckets: &[HourBucket]) -> Option<u32> {
    buckets
        .iter()
        .fold(None::<&HourBucket>, |best, b| match best {
            Some(best) if best.count >= b.count => Some(best),
            _ => Some(b),
        })
        .map(|b| b.hour)
}

/// Daily counts for the [`TREND_DAYS`] days ending at `now`, oldest
/// first. A report belongs to the day `floor((now - created) / 24h)` days
/// back; future or older reports are skipped.
#[must_use]
#[allow(
    clippy::cast_possible_wrap,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn daily_trend(reports: &[Report], now: DateTime<Utc>) -> Vec<DailyPoint> {
    let mut counts = [0_u64; TREND_DAYS];
    for report in reports {
        let elapsed = now - report.created_at;
        if elapsed < TimeDelta::zero() {
            continue;
        }
        let days_back = elapsed.num_days();
        if days_back < TREND_DAYS as i64 {
            counts[TREND_DAYS - 1 - days_back as usize] += 1;
        }
    }

    let today = now.date_naive();
    let mut accumulated = 0;
    counts
        .iter()
        .enumerate()
        .map(|(index, count)| {
            accumulated += count;
            let days_back = (TREND_DAYS - 1 - index) as i64;
            DailyPoint {
                date: today - TimeDelta::days(days_back),
                count: *count,
                accumulated,
            }
        })
        .collect()
}

/// Mean confidence per severity, for severities that have reports.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn confidence_by_severity(reports: &[Report]) -> Vec<SeverityConfidence> {
    Severity::all()
        .iter()
        .filter_map(|severity| {
            let (sum, count) = reports
                .iter()
                .filter(|r| r.severity == *severity)
                .fold((0.0, 0_u64), |(sum, count), r| (sum + r.confidence, count + 1));
            (count > 0).then(|| SeverityConfidence {
                severity: *severity,
                average_confidence: sum / count as f64 * 100.0,
                count,
            })
        })
        .collect()
}

/// Mean confidence of all reports in percent.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn average_confidence(reports: &[Report]) -> Option<f64> {
    if reports.is_empty() {
        return None;
    }
    let sum: f64 = reports.iter().map(|r| r.confidence).sum();
    Some(sum / reports.len() as f64 * 100.0)
}

/// Each platform's count and formatted share, largest first.
#[must_use]
pub fn platform_share(stats: &Stats) -> Vec<(Platform, u64, String)> {
    let total: u64 = stats.by_platform.values().sum();
    let mut shares: Vec<_> = stats
        .by_platform
        .iter()
        .map(|(platform, count)| (*platform, *count, format_percentage(*count, total)))
        .collect();
    shares.sort_by(|a, b| b.1.cmp(&a.1));
    shares
}

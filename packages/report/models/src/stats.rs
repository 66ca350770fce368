//! Aggregate statistics snapshots.
//!
//! [`Stats`] is the canonical shape. Older API builds (and some push
//! messages) still send [`LegacyStats`], which names the same concepts
//! differently; [`StatsPayload`] accepts either and always yields
//! [`Stats`].

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{Platform, SeverityCounts};

/// One point in the recent-activity trend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendPoint {
    /// Calendar day.
    pub date: NaiveDate,
    /// Reports on that day.
    pub count: u64,
}

/// Aggregate report counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    /// All reports in the window.
    pub total_reports: u64,
    /// Reports that have been verified.
    pub verified_reports: u64,
    /// Reports awaiting verification.
    pub pending_reports: u64,
    /// Breakdown by severity.
    pub by_severity: SeverityCounts,
    /// Breakdown by source platform.
    #[serde(default)]
    pub by_platform: BTreeMap<Platform, u64>,
    /// Daily counts, oldest first.
    #[serde(default)]
    pub recent_trend: Vec<TrendPoint>,
}

impl Stats {
    /// Returns the platform with the most reports, if any were counted.
    ///
    /// Ties go to the platform that sorts first.
    #[must_use]
    pub fn dominant_platform(&self) -> Option<(Platform, u64)> {
        self.by_platform
            .iter()
            .map(|(p, c)| (*p, *c))
            .fold(None, |best, (p, c)| match best {
                Some((_, best_count)) if best_count >= c => best,
                _ => Some((p, c)),
            })
    }
}

/// Time-bucketed counts in the legacy stats shape.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportsByTime {
    /// Reports in the last hour.
    #[serde(default)]
    pub last_hour: u64,
    /// Reports in the last 6 hours.
    #[serde(default)]
    pub last_6_hours: u64,
    /// Reports in the last 24 hours.
    #[serde(default)]
    pub last_24_hours: u64,
    /// Reports in the last week.
    #[serde(default)]
    pub last_week: u64,
}

/// Per-district count in the legacy stats shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistrictCount {
    /// District name.
    pub district: String,
    /// Reports in the district.
    pub count: u64,
}

/// The older statistics shape. Only decoded at API boundaries and
/// converted straight into [`Stats`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyStats {
    /// All reports in the window.
    pub total_reports: u64,
    /// Breakdown by severity.
    pub reports_by_severity: SeverityCounts,
    /// Breakdown by platform.
    #[serde(default)]
    pub reports_by_platform: BTreeMap<Platform, u64>,
    /// Time-bucketed counts.
    #[serde(default)]
    pub reports_by_time: ReportsByTime,
    /// Busiest districts.
    #[serde(default)]
    pub top_districts: Vec<DistrictCount>,
    /// Snapshot time.
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
}

impl From<LegacyStats> for Stats {
    /// The legacy shape carries no verification counts, so every report
    /// is counted as pending.
    fn from(legacy: LegacyStats) -> Self {
        Self {
            total_reports: legacy.total_reports,
            verified_reports: 0,
            pending_reports: legacy.total_reports,
            by_severity: legacy.reports_by_severity,
            by_platform: legacy.reports_by_platform,
            recent_trend: Vec::new(),
        }
    }
}

/// Either stats shape, as it arrives over the wire.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum StatsPayload {
    /// Canonical shape.
    Current(Stats),
    /// Older shape.
    Legacy(LegacyStats),
}

impl From<StatsPayload> for Stats {
    fn from(payload: StatsPayload) -> Self {
        match payload {
            StatsPayload::Current(stats) => stats,
            StatsPayload::Legacy(legacy) => legacy.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_canonical_shape() {
        let json = r#"{
            "total_reports": 10, "verified_reports": 6, "pending_reports": 4,
            "by_severity": {"low": 1, "medium": 2, "high": 3, "critical": 4},
            "by_platform": {"google": 5, "naver": 5},
            "recent_trend": [{"date": "2024-06-20", "count": 3}]
        }"#;
        let stats: Stats = serde_json::from_str::<StatsPayload>(json).unwrap().into();
        assert_eq!(stats.verified_reports, 6);
        assert_eq!(stats.by_platform.get(&Platform::Google), Some(&5));
        assert_eq!(stats.recent_trend.len(), 1);
    }

    #[test]
    fn converts_legacy_shape() {
        let json = r#"{
            "total_reports": 7,
            "reports_by_severity": {"low": 1, "medium": 2, "high": 3, "critical": 1},
            "reports_by_platform": {"twitter": 4, "kakao": 3},
            "reports_by_time": {"last_hour": 1, "last_6_hours": 2, "last_24_hours": 5, "last_week": 7},
            "top_districts": [{"district": "Eunpyeong-gu", "count": 5}],
            "last_updated": "2024-06-20T10:00:00Z"
        }"#;
        let payload: StatsPayload = serde_json::from_str(json).unwrap();
        assert!(matches!(payload, StatsPayload::Legacy(_)));
        let stats = Stats::from(payload);
        assert_eq!(stats.total_reports, 7);
        assert_eq!(stats.verified_reports, 0);
        assert_eq!(stats.pending_reports, 7);
        assert_eq!(stats.by_severity.high, 3);
        assert_eq!(stats.by_platform.get(&Platform::Twitter), Some(&4));
    }

    #[test]
    fn dominant_platform_picks_largest() {
        let mut stats = Stats::default();
        assert_eq!(stats.dominant_platform(), None);
        stats.by_platform.insert(Platform::Google, 480);
        stats.by_platform.insert(Platform::Naver, 420);
        stats.by_platform.insert(Platform::Kakao, 350);
        assert_eq!(stats.dominant_platform(), Some((Platform::Google, 480)));
    }
}

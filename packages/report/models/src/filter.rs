//! Query filters shared by the read endpoints.

use serde::{Deserialize, Serialize};

use crate::{Platform, Severity};

/// Optional filters for report, hotspot, and stats queries.
///
/// Each endpoint accepts a different subset; use the matching
/// `*_query` method to build its query string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchFilter {
    /// Look-back window in hours.
    pub hours: Option<u32>,
    /// Only this severity.
    pub severity: Option<Severity>,
    /// Only this platform.
    pub platform: Option<Platform>,
    /// Free-text search.
    pub search: Option<String>,
    /// Page size.
    pub limit: Option<u32>,
    /// Page offset.
    pub offset: Option<u32>,
}

impl SearchFilter {
    /// Convenience constructor for a look-back window.
    #[must_use]
    pub fn with_hours(hours: u32) -> Self {
        Self {
            hours: Some(hours),
            ..Self::default()
        }
    }

    /// Query pairs for `GET /reports`.
    #[must_use]
    pub fn report_query(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        self.push_hours(&mut pairs);
        self.push_severity(&mut pairs);
        self.push_platform(&mut pairs);
        push_nonzero(&mut pairs, "limit", self.limit);
        push_nonzero(&mut pairs, "offset", self.offset);
        if let Some(search) = self.search.as_deref().filter(|s| !s.trim().is_empty()) {
            pairs.push(("search", search.to_string()));
        }
        pairs
    }

    /// Query pairs for `GET /hotspots`.
    #[must_use]
    pub fn hotspot_query(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        self.push_hours(&mut pairs);
        self.push_severity(&mut pairs);
        push_nonzero(&mut pairs, "limit", self.limit);
        pairs
    }

    /// Query pairs for `GET /stats`.
    #[must_use]
    pub fn stats_query(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        self.push_hours(&mut pairs);
        self.push_severity(&mut pairs);
        self.push_platform(&mut pairs);
        pairs
    }

    fn push_hours(&self, pairs: &mut Vec<(&'static str, String)>) {
        push_nonzero(pairs, "hours", self.hours);
    }

    fn push_severity(&self, pairs: &mut Vec<(&'static str, String)>) {
        if let Some(severity) = self.severity {
            pairs.push(("severity", severity.to_string()));
        }
    }

    fn push_platform(&self, pairs: &mut Vec<(&'static str, String)>) {
        if let Some(platform) = self.platform {
            pairs.push(("platform", platform.to_string()));
        }
    }
}

fn push_nonzero(pairs: &mut Vec<(&'static str, String)>, key: &'static str, value: Option<u32>) {
    if let Some(v) = value.filter(|v| *v > 0) {
        pairs.push((key, v.to_string()));
    }
}

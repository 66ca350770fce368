//! Paged, filterable report list.

use std::cmp::Reverse;

use lovebug_report_models::{Platform, Report, SearchFilter, Severity};
use strum_macros::{AsRefStr, Display, EnumString};

use super::DEFAULT_HOURS;

/// Reports per page.
pub const PAGE_SIZE: u32 = 20;

/// Page buttons shown at most.
pub const MAX_PAGE_BUTTONS: u32 = 5;

/// Ordering of the report list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum ReportSort {
    /// Most recent first.
    #[default]
    Newest,
    /// Most severe first, newest within a severity.
    Severity,
}

impl ReportSort {
    /// Sorts `reports` in place.
    pub fn apply(self, reports: &mut [Report]) {
        match self {
            Self::Newest => reports.sort_by_key(|r| Reverse(r.created_at)),
            Self::Severity => {
                reports.sort_by_key(|r| (Reverse(r.severity.value()), Reverse(r.created_at)));
            }
        }
    }
}

/// Filter, search, sort and page position of the reports page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportsPage {
    filter: SearchFilter,
    search: String,
    sort: ReportSort,
    page: u32,
}

impl Default for ReportsPage {
    fn default() -> Self {
        Self {
            filter: default_filter(),
            search: String::new(),
            sort: ReportSort::default(),
            page: 1,
        }
    }
}

fn default_filter() -> SearchFilter {
    SearchFilter {
        limit: Some(PAGE_SIZE),
        ..SearchFilter::with_hours(DEFAULT_HOURS)
    }
}

impl ReportsPage {
    /// Current page, starting at 1.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Current ordering.
    #[must_use]
    pub const fn sort(&self) -> ReportSort {
        self.sort
    }

    /// Current filter, without paging or search.
    #[must_use]
    pub const fn filter(&self) -> &SearchFilter {
        &self.filter
    }

    /// Changes the time window and returns to page 1.
    pub fn set_hours(&mut self, hours: u32) {
        self.filter.hours = Some(hours);
        self.page = 1;
    }

    /// Changes the severity filter and returns to page 1.
    pub fn set_severity(&mut self, severity: Option<Severity>) {
        self.filter.severity = severity;
        self.page = 1;
    }

    /// Changes the platform filter and returns to page 1.
    pub fn set_platform(&mut self, platform: Option<Platform>) {
        self.filter.platform = platform;
        self.page = 1;
    }

    /// Changes the search text and returns to page 1.
    pub fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into();
        self.page = 1;
    }

    /// Changes the ordering.
    pub const fn set_sort(&mut self, sort: ReportSort) {
        self.sort = sort;
    }

    /// Jumps to `page`, clamped to at least 1.
    pub fn go_to(&mut self, page: u32) {
        self.page = page.max(1);
    }

    /// Filter for the current page's request.
    #[must_use]
    pub fn query(&self) -> SearchFilter {
        let limit = self.filter.limit.unwrap_or(PAGE_SIZE);
        let search = self.search.trim();
        SearchFilter {
            offset: Some(self.page.saturating_sub(1).saturating_mul(limit)),
            search: (!search.is_empty()).then(|| search.to_string()),
            ..self.filter.clone()
        }
    }

    /// Pages needed for `total` reports.
    #[must_use]
    pub fn total_pages(&self, total: u64) -> u32 {
        let limit = u64::from(self.filter.limit.unwrap_or(PAGE_SIZE).max(1));
        u32::try_from(total.div_ceil(limit)).unwrap_or(u32::MAX)
    }

    /// Advances one page unless already on the last of `total_pages`.
    pub const fn next(&mut self, total_pages: u32) -> bool {
        if self.page < total_pages {
            self.page += 1;
            true
        } else {
            false
        }
    }

    /// Goes back one page unless on the first.
    pub const fn prev(&mut self) -> bool {
        if self.page > 1 {
            self.page -= 1;
            true
        } else {
            false
        }
    }

    /// Page buttons to show: `1..=min(5, total_pages)`.
    #[must_use]
    pub fn page_numbers(total_pages: u32) -> Vec<u32> {
        (1..=total_pages.min(MAX_PAGE_BUTTONS)).collect()
    }

    /// Clears filters and search back to `hours = 24, limit = 20`.
    pub fn reset(&mut self) {
        *self = Self {
            sort: self.sort,
            ..Self::default()
        };
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeDelta, Utc};
    use lovebug_report_models::Location;

    use super::*;

    fn report(id: &str, severity: Severity, minutes_ago: i64) -> Report {
        Report {
            id: id.to_string(),
            content: String::new(),
            description: None,
            location: Location::new(37.5, 127.0),
            address: None,
            severity,
            platform: Platform::Naver,
            created_at: Utc::now() - TimeDelta::minutes(minutes_ago),
            keywords: Vec::new(),
            confidence: 0.5,
            sentiment: 0.0,
            photos: Vec::new(),
            verified: false,
            verification_count: 0,
            user_id: None,
            reported_at: None,
        }
    }

    fn ids(reports: &[Report]) -> Vec<&str> {
        reports.iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn sorts_by_newest_and_by_severity() {
        let mut reports = vec![
            report("old-critical", Severity::Critical, 60),
            report("new-low", Severity::Low, 1),
            report("new-critical", Severity::Critical, 5),
            report("mid-high", Severity::High, 30),
        ];

        ReportSort::Newest.apply(&mut reports);
        assert_eq!(ids(&reports), vec!["new-low", "new-critical", "mid-high", "old-critical"]);

        ReportSort::Severity.apply(&mut reports);
        assert_eq!(ids(&reports), vec!["new-critical", "old-critical", "mid-high", "new-low"]);
    }

    #[test]
    fn page_maps_to_offset() {
        let mut page = ReportsPage::default();
        assert_eq!(page.query().offset, Some(0));
        page.go_to(3);
        let query = page.query();
        assert_eq!(query.offset, Some(40));
        assert_eq!(query.limit, Some(20));
        assert_eq!(query.hours, Some(24));
        assert!(query.search.is_none());
    }

    #[test]
    fn filter_changes_return_to_first_page() {
        let mut page = ReportsPage::default();
        page.go_to(4);
        page.set_severity(Some(Severity::High));
        assert_eq!(page.page(), 1);
        page.go_to(2);
        page.set_search("  gangnam ");
        assert_eq!(page.page(), 1);
        assert_eq!(page.query().search.as_deref(), Some("gangnam"));
    }

    #[test]
    fn paging_bounds() {
        let mut page = ReportsPage::default();
        assert_eq!(page.total_pages(0), 0);
        assert_eq!(page.total_pages(41), 3);
        assert!(!page.prev());
        assert!(page.next(3));
        assert!(page.next(3));
        assert!(!page.next(3));
        assert_eq!(page.page(), 3);
        assert_eq!(ReportsPage::page_numbers(3), vec![1, 2, 3]);
        assert_eq!(ReportsPage::page_numbers(12), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn reset_restores_defaults() {
        let mut page = ReportsPage::default();
        page.set_hours(168);
        page.set_platform(Some(Platform::Kakao));
        page.set_search("seoul");
        page.set_sort(ReportSort::Severity);
        page.go_to(5);
        page.reset();

        assert_eq!(page.filter().hours, Some(24));
        assert_eq!(page.filter().limit, Some(20));
        assert!(page.filter().platform.is_none());
        assert_eq!(page.page(), 1);
        assert_eq!(page.sort(), ReportSort::Severity);
        assert!(page.query().search.is_none());
    }

    #[test]
    fn sort_parses_from_snake_case() {
        assert_eq!("severity".parse::<ReportSort>().ok(), Some(ReportSort::Severity));
        assert_eq!(ReportSort::Newest.as_ref(), "newest");
    }
}

//! Hotspot list summary.

use lovebug_report_models::{Hotspot, SearchFilter};

/// Hotspots fetched for the hotspots page.
pub const HOTSPOT_LIMIT: u32 = 50;

/// Header numbers for the hotspots page.
#[derive(Debug, Clone, PartialEq)]
pub struct HotspotSummary {
    /// Hotspots listed.
    pub count: usize,
    /// Reports across all hotspots.
    pub total_reports: u64,
    /// Mean reports per hotspot, rounded. 0 with no hotspots.
    pub average_per_hotspot: u64,
    /// Hotspot with the highest report count; the first one wins ties.
    pub most_active: Option<Hotspot>,
}

impl HotspotSummary {
    /// Summarizes `hotspots`.
    #[must_use]
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    pub fn from_hotspots(hotspots: &[Hotspot]) -> Self {
        let total_reports: u64 = hotspots.iter().map(|h| h.report_count).sum();
        let average_per_hotspot = if hotspots.is_empty() {
            0
        } else {
            (total_reports as f64 / hotspots.len() as f64).round() as u64
        };
        let most_active = hotspots
            .iter()
            .fold(None::<&Hotspot>, |best, h| match best {
                Some(best) if best.report_count >= h.report_count => Some(best),
                _ => Some(h),
            })
            .cloned();

        Self {
            count: hotspots.len(),
            total_reports,
            average_per_hotspot,
            most_active,
        }
    }

    /// Filter for the hotspots page request.
    #[must_use]
    pub fn filter(hours: u32) -> SearchFilter {
        SearchFilter {
            limit: Some(HOTSPOT_LIMIT),
            ..SearchFilter::with_hours(hours)
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use lovebug_report_models::Location;

    use super::*;

    fn hotspot(id: &str, report_count: u64) -> Hotspot {
        Hotspot {
            id: id.to_string(),
            location: Location::new(37.55, 126.98),
            address: None,
            report_count,
            severity_distribution: None,
            last_activity: Utc::now(),
            radius: 300.0,
        }
    }

    #[test]
    fn averages_and_picks_most_active() {
        let hotspots = vec![hotspot("a", 10), hotspot("b", 25), hotspot("c", 25), hotspot("d", 4)];
        let summary = HotspotSummary::from_hotspots(&hotspots);
        assert_eq!(summary.count, 4);
        assert_eq!(summary.total_reports, 64);
        assert_eq!(summary.average_per_hotspot, 16);
        assert_eq!(summary.most_active.map(|h| h.id), Some("b".to_string()));
    }

    #[test]
    fn average_rounds_half_up() {
        let summary = HotspotSummary::from_hotspots(&[hotspot("a", 1), hotspot("b", 2)]);
        assert_eq!(summary.average_per_hotspot, 2);
    }

    #[test]
    fn empty_list() {
        let summary = HotspotSummary::from_hotspots(&[]);
        assert_eq!(summary.count, 0);
        assert_eq!(summary.average_per_hotspot, 0);
        assert!(summary.most_active.is_none());
    }
}

//! Live map page.

use lovebug_api::DataAccess;
use lovebug_map::{MapRenderer, MapSurface};
use lovebug_report_models::{Hotspot, Platform, Report, SearchFilter, Severity};

use super::DEFAULT_HOURS;

/// Reports drawn on the map.
pub const MAP_REPORT_LIMIT: u32 = 100;

/// Hotspots drawn on the map.
pub const MAP_HOTSPOT_LIMIT: u32 = 20;

/// Map page: filters, the hotspot toggle and the renderer they feed.
#[derive(Debug)]
pub struct MapPage<S> {
    filter: SearchFilter,
    renderer: MapRenderer<S>,
}

impl<S: MapSurface> MapPage<S> {
    /// Wraps a renderer with the default filters.
    pub fn new(renderer: MapRenderer<S>) -> Self {
        Self {
            filter: SearchFilter {
                limit: Some(MAP_REPORT_LIMIT),
                ..SearchFilter::with_hours(DEFAULT_HOURS)
            },
            renderer,
        }
    }

    /// The renderer.
    pub const fn renderer(&self) -> &MapRenderer<S> {
        &self.renderer
    }

    /// The renderer, for ticks and clicks.
    pub const fn renderer_mut(&mut self) -> &mut MapRenderer<S> {
        &mut self.renderer
    }

    /// Filter for the report request.
    #[must_use]
    pub const fn report_filter(&self) -> &SearchFilter {
        &self.filter
    }

    /// Filter for the hotspot request. Shares the time window and
    /// severity of the report filter.
    #[must_use]
    pub const fn hotspot_filter(&self) -> SearchFilter {
        SearchFilter {
            hours: self.filter.hours,
            severity: self.filter.severity,
            platform: None,
            search: None,
            limit: Some(MAP_HOTSPOT_LIMIT),
            offset: None,
        }
    }

    /// Changes the time window.
    pub const fn set_hours(&mut self, hours: u32) {
        self.filter.hours = Some(hours);
    }

    /// Changes the severity filter.
    pub const fn set_severity(&mut self, severity: Option<Severity>) {
        self.filter.severity = severity;
    }

    /// Changes the platform filter.
    pub const fn set_platform(&mut self, platform: Option<Platform>) {
        self.filter.platform = platform;
    }

    /// Flips hotspot visibility and returns the new setting.
    pub fn toggle_hotspots(&mut self) -> bool {
        let show = !self.renderer.show_hotspots();
        self.renderer.set_show_hotspots(show);
        show
    }

    /// Hands fresh data to the renderer.
    pub fn update(&mut self, reports: Vec<Report>, hotspots: Vec<Hotspot>) {
        self.renderer.set_reports(reports);
        self.renderer.set_hotspots(hotspots);
    }

    /// Fetches reports and hotspots for the current filters and redraws.
    pub async fn refresh(&mut self, data: &DataAccess) {
        let hotspot_filter = self.hotspot_filter();
        let (reports, hotspots) = futures::join!(
            data.get_reports(&self.filter),
            data.get_hotspots(&hotspot_filter)
        );
        log::debug!(
            "Map refreshed with {} reports and {} hotspots",
            reports.len(),
            hotspots.len()
        );
        self.update(reports, hotspots);
    }
}

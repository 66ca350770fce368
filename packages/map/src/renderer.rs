//! Report and hotspot layer management.

use std::time::{Duration, Instant};

use lovebug_report_models::{Hotspot, Report};

use crate::style::{circle_for, hotspot_color, marker_color, marker_for};
use crate::{DEFAULT_CENTER, DEFAULT_ZOOM, LatLng, LayerId, MapSurface};

/// Time between the surface signalling ready and the first draw.
pub const DEFAULT_SETTLE: Duration = Duration::from_millis(500);

/// Zoom used when a report is selected.
pub const REPORT_ZOOM: u8 = 15;

/// Zoom used when a hotspot is selected.
pub const HOTSPOT_ZOOM: u8 = 14;

/// What a clicked layer resolved to.
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    /// A report marker.
    Report(Report),
    /// A hotspot circle.
    Hotspot(Hotspot),
}

/// One row of the side list of rendered entities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegendEntry {
    /// Layer the entry refers to, for [`MapRenderer::click`].
    pub layer: LayerId,
    /// Display text.
    pub label: String,
    /// Swatch colour.
    pub color: &'static str,
}

type SelectHandler = Box<dyn FnMut(&Selection) + Send>;

/// Keeps a [`MapSurface`] in sync with the current reports and hotspots.
pub struct MapRenderer<S> {
    surface: S,
    reports: Vec<Report>,
    hotspots: Vec<Hotspot>,
    show_hotspots: bool,
    markers: Vec<(LayerId, usize)>,
    circles: Vec<(LayerId, usize)>,
    ready_signal: Option<Instant>,
    settle: Duration,
    drawn: bool,
    on_select: Option<SelectHandler>,
}

impl<S: std::fmt::Debug> std::fmt::Debug for MapRenderer<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapRenderer")
            .field("surface", &self.surface)
            .field("reports", &self.reports.len())
            .field("hotspots", &self.hotspots.len())
            .field("show_hotspots", &self.show_hotspots)
            .field("drawn", &self.drawn)
            .finish_non_exhaustive()
    }
}

impl<S: MapSurface> MapRenderer<S> {
    /// Wraps `surface` and centres it on the default view.
    pub fn new(mut surface: S) -> Self {
        surface.set_view(DEFAULT_CENTER, DEFAULT_ZOOM);
        Self {
            surface,
            reports: Vec::new(),
            hotspots: Vec::new(),
            show_hotspots: true,
            markers: Vec::new(),
            circles: Vec::new(),
            ready_signal: None,
            settle: DEFAULT_SETTLE,
            drawn: false,
            on_select: None,
        }
    }

    /// Overrides the settle delay.
    #[must_use]
    pub const fn with_settle(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }

    /// Sets the callback invoked by [`MapRenderer::click`].
    pub fn on_select(&mut self, handler: impl FnMut(&Selection) + Send + 'static) {
        self.on_select = Some(Box::new(handler));
    }

    /// The underlying surface.
    pub const fn surface(&self) -> &S {
        &self.surface
    }

    /// Records that the surface finished loading. Later calls are
    /// ignored.
    pub fn surface_ready(&mut self, now: Instant) {
        if self.ready_signal.is_none() {
            log::debug!("Map surface ready, settling for {:?}", self.settle);
            self.ready_signal = Some(now);
        }
    }

    /// Whether the settle delay has passed since the ready signal.
    #[must_use]
    pub fn is_ready(&self, now: Instant) -> bool {
        self.ready_signal
            .is_some_and(|at| now.saturating_duration_since(at) >= self.settle)
    }

    /// Draws everything the first time readiness is observed. Returns
    /// whether it drew.
    pub fn tick(&mut self, now: Instant) -> bool {
        if self.drawn || !self.is_ready(now) {
            return false;
        }
        self.drawn = true;
        self.redraw_markers();
        self.redraw_circles();
        true
    }

    /// Replaces the reports and redraws their markers.
    pub fn set_reports(&mut self, reports: Vec<Report>) {
        self.reports = reports;
        if self.drawn {
            self.redraw_markers();
        }
    }

    /// Replaces the hotspots and redraws their circles.
    pub fn set_hotspots(&mut self, hotspots: Vec<Hotspot>) {
        self.hotspots = hotspots;
        if self.drawn {
            self.redraw_circles();
        }
    }

    /// Shows or hides hotspot circles.
    pub fn set_show_hotspots(&mut self, show: bool) {
        self.show_hotspots = show;
        if self.drawn {
            self.redraw_circles();
        }
    }

    /// Whether hotspot circles are shown.
    #[must_use]
    pub const fn show_hotspots(&self) -> bool {
        self.show_hotspots
    }

    fn clear(surface: &mut S, layers: &mut Vec<(LayerId, usize)>) {
        for (id, _) in layers.drain(..) {
            if let Err(e) = surface.remove_layer(id) {
                log::warn!("Failed to remove map layer: {e}");
            }
        }
    }

    fn redraw_markers(&mut self) {
        Self::clear(&mut self.surface, &mut self.markers);
        for (index, report) in self.reports.iter().enumerate() {
            match self.surface.add_marker(&marker_for(report)) {
                Ok(id) => self.markers.push((id, index)),
                Err(e) => log::warn!("Failed to add marker for report {}: {e}", report.id),
            }
        }
    }

    fn redraw_circles(&mut self) {
        Self::clear(&mut self.surface, &mut self.circles);
        if !self.show_hotspots {
            return;
        }
        for (index, hotspot) in self.hotspots.iter().enumerate() {
            match self.surface.add_circle(&circle_for(hotspot)) {
                Ok(id) => self.circles.push((id, index)),
                Err(e) => log::warn!("Failed to add circle for hotspot {}: {e}", hotspot.id),
            }
        }
    }

    /// Resolves a clicked layer, re-centres on it and notifies the
    /// selection callback.
    pub fn click(&mut self, layer: LayerId) -> Option<Selection> {
        let (center, zoom, selection) =
            if let Some((_, index)) = self.markers.iter().find(|(id, _)| *id == layer) {
                let report = self.reports.get(*index)?;
                (
                    LatLng::from(&report.location),
                    REPORT_ZOOM,
                    Selection::Report(report.clone()),
                )
            } else {
                let (_, index) = self.circles.iter().find(|(id, _)| *id == layer)?;
                let hotspot = self.hotspots.get(*index)?;
                (
                    LatLng::from(&hotspot.location),
                    HOTSPOT_ZOOM,
                    Selection::Hotspot(hotspot.clone()),
                )
            };

        self.surface.set_view(center, zoom);
        if let Some(handler) = self.on_select.as_mut() {
            handler(&selection);
        }
        Some(selection)
    }

    /// Rendered entities, markers first.
    #[must_use]
    pub fn legend(&self) -> Vec<LegendEntry> {
        let reports = self.markers.iter().filter_map(|(layer, index)| {
            let report = self.reports.get(*index)?;
            Some(LegendEntry {
                layer: *layer,
                label: format!(
                    "{} - {}",
                    report.severity.label(),
                    report.display_address().unwrap_or(&report.content)
                ),
                color: marker_color(report.severity),
            })
        });
        let hotspots = self.circles.iter().filter_map(|(layer, index)| {
            let hotspot = self.hotspots.get(*index)?;
            Some(LegendEntry {
                layer: *layer,
                label: format!(
                    "Hotspot - {} ({} reports)",
                    hotspot.display_address().unwrap_or("Unknown location"),
                    hotspot.report_count
                ),
                color: hotspot_color(hotspot.report_count),
            })
        });
        reports.chain(hotspots).collect()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use chrono::Utc;
    use lovebug_report_models::{Location, Platform, Severity};

    use super::*;
    use crate::{Layer, RecordingSurface, SurfaceOp};

    fn report(id: &str, severity: Severity) -> Report {
        Report {
            id: id.to_string(),
            content: format!("report {id}"),
            description: None,
            location: Location::new(37.56, 126.97),
            address: Some(format!("Seoul {id}")),
            severity,
            platform: Platform::Google,
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

    fn hotspot(id: &str, report_count: u64) -> Hotspot {
        Hotspot {
            id: id.to_string(),
            location: Location::new(37.57, 126.98),
            address: None,
            report_count,
            severity_distribution: None,
            last_activity: Utc::now(),
            radius: 300.0,
        }
    }

    fn ready_renderer() -> MapRenderer<RecordingSurface> {
        let mut renderer = MapRenderer::new(RecordingSurface::new());
        let start = Instant::now();
        renderer.surface_ready(start);
        assert!(renderer.tick(start + DEFAULT_SETTLE));
        renderer
    }

    #[test]
    fn one_marker_per_report_with_severity_colors() {
        let mut renderer = ready_renderer();
        renderer.set_reports(vec![report("a", Severity::Low)]);
        assert_eq!(renderer.surface().markers().count(), 1);

        renderer.set_reports(vec![
            report("1", Severity::Low),
            report("2", Severity::High),
            report("3", Severity::Critical),
            report("4", Severity::Medium),
        ]);

        let colors: Vec<_> = renderer.surface().markers().map(|m| m.color).collect();
        assert_eq!(colors, vec!["#7b1fa2", "#f57c00", "#d32f2f", "#fbc02d"]);
        assert_eq!(renderer.surface().removed(), 1);
        assert!(renderer.surface().markers().all(|m| m.size_px == 20));
    }

    #[test]
    fn redraw_removes_prior_markers_before_adding() {
        let mut renderer = ready_renderer();
        renderer.set_hotspots(vec![hotspot("h", 12)]);
        renderer.set_reports(vec![report("a", Severity::Low), report("b", Severity::High)]);

        let marker_ids = |renderer: &MapRenderer<RecordingSurface>| -> Vec<LayerId> {
            renderer
                .surface()
                .layers()
                .filter(|(_, layer)| matches!(layer, Layer::Marker(_)))
                .map(|(id, _)| id)
                .collect()
        };
        let old_markers = marker_ids(&renderer);
        let circles: Vec<_> = renderer
            .surface()
            .layers()
            .filter(|(_, layer)| matches!(layer, Layer::Circle(_)))
            .map(|(id, _)| id)
            .collect();
        let checkpoint = renderer.surface().ops().len();

        renderer.set_reports(vec![
            report("1", Severity::Medium),
            report("2", Severity::Critical),
            report("3", Severity::Low),
        ]);

        let ops = &renderer.surface().ops()[checkpoint..];
        let removed: Vec<_> = ops
            .iter()
            .take_while(|op| matches!(op, SurfaceOp::Remove(_)))
            .map(|op| match op {
                SurfaceOp::Remove(id) | SurfaceOp::Add(id) => *id,
            })
            .collect();
        assert_eq!(removed, old_markers);
        let new_markers = marker_ids(&renderer);
        assert_eq!(
            &ops[removed.len()..],
            new_markers
                .iter()
                .map(|id| SurfaceOp::Add(*id))
                .collect::<Vec<_>>()
                .as_slice()
        );
        assert!(ops.iter().all(|op| match op {
            SurfaceOp::Remove(id) | SurfaceOp::Add(id) => !circles.contains(id),
        }));
        assert_eq!(renderer.surface().circles().count(), 1);
    }

    #[test]
    fn nothing_draws_before_settle() {
        let mut renderer = MapRenderer::new(RecordingSurface::new());
        renderer.set_reports(vec![report("1", Severity::High)]);
        renderer.set_hotspots(vec![hotspot("h", 3)]);
        assert_eq!(renderer.surface().layers().count(), 0);

        let start = Instant::now();
        assert!(!renderer.tick(start));
        renderer.surface_ready(start);
        assert!(!renderer.tick(start + Duration::from_millis(499)));
        assert_eq!(renderer.surface().layers().count(), 0);

        assert!(renderer.tick(start + Duration::from_millis(500)));
        assert_eq!(renderer.surface().markers().count(), 1);
        assert_eq!(renderer.surface().circles().count(), 1);
        assert!(!renderer.tick(start + Duration::from_secs(5)));
    }

    #[test]
    fn hotspot_toggle_clears_and_restores_circles() {
        let mut renderer = ready_renderer();
        renderer.set_hotspots(vec![hotspot("a", 25), hotspot("b", 7)]);
        let circle = renderer.surface().circles().next().unwrap().clone();
        assert_eq!(circle.color, "#d32f2f");
        assert!((circle.fill_opacity - 0.3).abs() < f64::EPSILON);
        assert_eq!(circle.weight, 2);
        assert!((circle.radius_m - 300.0).abs() < f64::EPSILON);

        renderer.set_show_hotspots(false);
        assert_eq!(renderer.surface().circles().count(), 0);
        renderer.set_show_hotspots(true);
        assert_eq!(renderer.surface().circles().count(), 2);
    }

    #[test]
    fn failed_adds_are_skipped() {
        let mut surface = RecordingSurface::new();
        surface.fail_next_adds(1);
        let mut renderer = MapRenderer::new(surface);
        renderer.set_reports(vec![report("1", Severity::Low), report("2", Severity::Low)]);
        let start = Instant::now();
        renderer.surface_ready(start);
        renderer.tick(start + DEFAULT_SETTLE);

        assert_eq!(renderer.surface().markers().count(), 1);
        assert_eq!(renderer.legend().len(), 1);
    }

    #[test]
    fn click_recentres_and_notifies() {
        let mut renderer = ready_renderer();
        let selected = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&selected);
        renderer.on_select(move |s| sink.lock().unwrap().push(s.clone()));
        renderer.set_reports(vec![report("r", Severity::Critical)]);
        renderer.set_hotspots(vec![hotspot("h", 12)]);

        let legend = renderer.legend();
        assert_eq!(legend.len(), 2);
        assert_eq!(legend[0].color, "#d32f2f");
        assert_eq!(legend[1].color, "#f57c00");

        let selection = renderer.click(legend[0].layer).unwrap();
        assert!(matches!(&selection, Selection::Report(r) if r.id == "r"));
        assert_eq!(renderer.surface().view().unwrap().1, REPORT_ZOOM);

        renderer.click(legend[1].layer).unwrap();
        assert_eq!(renderer.surface().view().unwrap().1, HOTSPOT_ZOOM);

        assert!(renderer.click(LayerId(9_999)).is_none());
        assert_eq!(selected.lock().unwrap().len(), 2);
    }

    #[test]
    fn starts_on_default_view() {
        let renderer = MapRenderer::new(RecordingSurface::new());
        assert_eq!(renderer.surface().view(), Some((DEFAULT_CENTER, DEFAULT_ZOOM)));
    }
}

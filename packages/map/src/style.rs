//! Layer colours, sizes and popup text.

use lovebug_report_models::{Hotspot, Report, Severity};

use crate::{CircleSpec, LatLng, MarkerSpec};

/// Marker diameter in pixels.
pub const MARKER_SIZE_PX: u32 = 20;

/// Hotspot circle fill opacity.
pub const HOTSPOT_FILL_OPACITY: f64 = 0.3;

/// Hotspot circle stroke width.
pub const HOTSPOT_WEIGHT: u32 = 2;

/// Marker colour for a severity.
#[must_use]
pub const fn marker_color(severity: Severity) -> &'static str {
    match severity {
        Severity::Low => "#7b1fa2",
        Severity::Medium => "#fbc02d",
        Severity::High => "#f57c00",
        Severity::Critical => "#d32f2f",
    }
}

/// Circle colour for a hotspot's report count.
#[must_use]
pub const fn hotspot_color(report_count: u64) -> &'static str {
    match report_count {
        20.. => "#d32f2f",
        10..=19 => "#f57c00",
        5..=9 => "#fbc02d",
        _ => "#7b1fa2",
    }
}

pub(crate) fn marker_for(report: &Report) -> MarkerSpec {
    let location = report.display_address().unwrap_or("Unknown location");
    let popup = format!(
        "{} | {}\n{}\nLocation: {location}\nTime: {}\nConfidence: {:.0}%",
        report.severity.label(),
        report.platform.label(),
        report.content,
        report
            .created_at
            .with_timezone(&chrono::Local)
            .format("%Y-%m-%d %H:%M"),
        report.confidence * 100.0,
    );

    MarkerSpec {
        position: LatLng::from(&report.location),
        color: marker_color(report.severity),
        size_px: MARKER_SIZE_PX,
        popup,
    }
}

pub(crate) fn circle_for(hotspot: &Hotspot) -> CircleSpec {
    let color = hotspot_color(hotspot.report_count);
    let location = hotspot.display_address().unwrap_or("Unknown location");
    let mut popup = format!(
        "Hotspot ({} reports)\nLocation: {location}\nLast activity: {}\nRadius: {}m",
        hotspot.report_count,
        hotspot
            .last_activity
            .with_timezone(&chrono::Local)
            .format("%Y-%m-%d %H:%M"),
        hotspot.radius,
    );
    if let Some(dist) = &hotspot.severity_distribution {
        for severity in Severity::all().iter().rev() {
            popup.push_str(&format!("\n  {}: {}", severity.label(), dist.get(*severity)));
        }
    }

    CircleSpec {
        center: LatLng::from(&hotspot.location),
        radius_m: hotspot.radius,
        color,
        fill_opacity: HOTSPOT_FILL_OPACITY,
        weight: HOTSPOT_WEIGHT,
        popup,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hotspot_color_thresholds() {
        assert_eq!(hotspot_color(0), "#7b1fa2");
        assert_eq!(hotspot_color(4), "#7b1fa2");
        assert_eq!(hotspot_color(5), "#fbc02d");
        assert_eq!(hotspot_color(9), "#fbc02d");
        assert_eq!(hotspot_color(10), "#f57c00");
        assert_eq!(hotspot_color(19), "#f57c00");
        assert_eq!(hotspot_color(20), "#d32f2f");
        assert_eq!(hotspot_color(500), "#d32f2f");
    }

    #[test]
    fn marker_colors_are_distinct() {
        let mut colors: Vec<_> = Severity::all().iter().map(|s| marker_color(*s)).collect();
        colors.sort_unstable();
        colors.dedup();
        assert_eq!(colors.len(), 4);
    }
}

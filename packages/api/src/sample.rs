//! Placeholder data served when the API is unreachable.
//!
//! The shapes are fixed (counts, ranges, centre point) so every view has
//! something sensible to draw in offline and demo setups; the values are
//! randomized. Pass a seeded RNG for reproducible output.

use std::collections::BTreeMap;

use chrono::{TimeDelta, Utc};
use lovebug_report_models::{
    Hotspot, Location, Platform, Report, Severity, SeverityCounts, Stats, TrendPoint,
};
use rand::Rng;
use rand::seq::IndexedRandom as _;

/// Seoul City Hall, the default map centre.
pub const DEFAULT_CENTER: (f64, f64) = (37.5665, 126.9780);

/// Number of generated reports.
pub const REPORT_COUNT: usize = 20;

/// Number of generated hotspots.
pub const HOTSPOT_COUNT: usize = 5;

/// Maximum offset from [`DEFAULT_CENTER`] in degrees.
const SPREAD_DEG: f64 = 0.05;

const MS_PER_DAY: i64 = 86_400_000;

/// Platforms the sample generator draws from.
const SAMPLE_PLATFORMS: &[Platform] = &[Platform::Google, Platform::Naver, Platform::Kakao];

fn jitter<R: Rng + ?Sized>(rng: &mut R) -> Location {
    Location::new(
        DEFAULT_CENTER.0 + rng.random_range(-SPREAD_DEG..SPREAD_DEG),
        DEFAULT_CENTER.1 + rng.random_range(-SPREAD_DEG..SPREAD_DEG),
    )
}

fn random_severity<R: Rng + ?Sized>(rng: &mut R) -> Severity {
    Severity::all().choose(rng).copied().unwrap_or(Severity::Low)
}

/// Generates [`REPORT_COUNT`] reports scattered around the city centre
/// over the last week.
pub fn reports<R: Rng + ?Sized>(rng: &mut R) -> Vec<Report> {
    let now = Utc::now();
    (1..=REPORT_COUNT)
        .map(|n| {
            let address = format!("Seoul Jung-gu Myeongdong {n}-gil");
            let mut location = jitter(rng);
            location.address = Some(address.clone());
            let content = format!("Lovebug sighting report {n}");

            Report {
                id: format!("report-{}", n - 1),
                content: content.clone(),
                description: Some(content),
                location,
                address: Some(address),
                severity: random_severity(rng),
                platform: SAMPLE_PLATFORMS
                    .choose(rng)
                    .copied()
                    .unwrap_or(Platform::Google),
                created_at: now - TimeDelta::milliseconds(rng.random_range(0..MS_PER_DAY * 7)),
                keywords: vec![
                    "lovebug".to_string(),
                    "insect".to_string(),
                    "report".to_string(),
                ],
                confidence: rng.random_range(0.5..1.0),
                sentiment: rng.random_range(-1.0..1.0),
                photos: Vec::new(),
                verified: rng.random_bool(0.5),
                verification_count: rng.random_range(0..10),
                user_id: Some(format!("user-{}", n - 1)),
                reported_at: Some(
                    now - TimeDelta::milliseconds(rng.random_range(0..MS_PER_DAY * 7)),
                ),
            }
        })
        .collect()
}

/// Generates [`HOTSPOT_COUNT`] hotspots active within the last day.
pub fn hotspots<R: Rng + ?Sized>(rng: &mut R) -> Vec<Hotspot> {
    let now = Utc::now();
    (1..=HOTSPOT_COUNT)
        .map(|n| {
            let address = format!("Seoul Jung-gu Hotspot {n}");
            let mut location = jitter(rng);
            location.address = Some(address.clone());

            Hotspot {
                id: format!("hotspot-{}", n - 1),
                location,
                address: Some(address),
                report_count: rng.random_range(10..60),
                severity_distribution: Some(SeverityCounts {
                    low: rng.random_range(0..10),
                    medium: rng.random_range(0..10),
                    high: rng.random_range(0..10),
                    critical: rng.random_range(0..5),
                }),
                last_activity: now - TimeDelta::milliseconds(rng.random_range(0..MS_PER_DAY)),
                radius: f64::from(rng.random_range(100_u32..600)),
            }
        })
        .collect()
}

/// Returns fixed aggregate counts with a randomized 7-day trend, oldest
/// day first.
pub fn stats<R: Rng + ?Sized>(rng: &mut R) -> Stats {
    let today = Utc::now().date_naive();
    let recent_trend = (0..7_i64)
        .rev()
        .map(|days_ago| TrendPoint {
            date: today - TimeDelta::days(days_ago),
            count: rng.random_range(10..60),
        })
        .collect();

    Stats {
        total_reports: 1250,
        verified_reports: 980,
        pending_reports: 270,
        by_severity: SeverityCounts {
            low: 450,
            medium: 520,
            high: 230,
            critical: 50,
        },
        by_platform: BTreeMap::from([
            (Platform::Google, 480),
            (Platform::Naver, 420),
            (Platform::Kakao, 350),
        ]),
        recent_trend,
    }
}

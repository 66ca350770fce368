#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Sighting report, hotspot, and statistics types.
//!
//! These are the records the lovebug map API returns and accepts. Every
//! other crate in the workspace speaks in terms of these types, so the
//! closed enumerations ([`Severity`], [`Platform`]) live here along with
//! the wire shapes.

pub mod filter;
pub mod stats;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

pub use filter::SearchFilter;
pub use stats::{LegacyStats, Stats, StatsPayload, TrendPoint};

/// Reported infestation intensity, ordered from `Low` to `Critical`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Severity {
    /// A few insects spotted.
    Low = 1,
    /// A typical amount for the season.
    Medium = 2,
    /// Many insects in one place.
    High = 3,
    /// Swarms.
    Critical = 4,
}

impl Severity {
    /// Returns the numeric rank of this severity (1-4).
    #[must_use]
    pub const fn value(self) -> u8 {
        self as u8
    }

    /// Returns all variants, lowest first.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Low, Self::Medium, Self::High, Self::Critical]
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::Critical => "Critical",
        }
    }
}

/// Platform a sighting was collected from.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Platform {
    /// Twitter / X posts.
    Twitter,
    /// Instagram posts.
    Instagram,
    /// Naver maps and blogs.
    Naver,
    /// Kakao maps.
    Kakao,
    /// Google maps.
    Google,
}

impl Platform {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Twitter,
            Self::Instagram,
            Self::Naver,
            Self::Kakao,
            Self::Google,
        ]
    }

    /// Platforms a user can pick when submitting a report by hand.
    #[must_use]
    pub const fn submittable() -> &'static [Self] {
        &[Self::Google, Self::Naver, Self::Kakao]
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Twitter => "Twitter",
            Self::Instagram => "Instagram",
            Self::Naver => "Naver",
            Self::Kakao => "Kakao",
            Self::Google => "Google",
        }
    }
}

/// A point on the map with optional human-readable context.
///
/// Decoding accepts `latitude`/`longitude`, the short `lat`/`lng`, or
/// both side by side. The long names win when both are present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "LocationWire")]
pub struct Location {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
    /// Street address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// District (gu) name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,
    /// City name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
}

#[derive(Deserialize)]
struct LocationWire {
    latitude: Option<f64>,
    longitude: Option<f64>,
    lat: Option<f64>,
    lng: Option<f64>,
    address: Option<String>,
    district: Option<String>,
    city: Option<String>,
}

impl TryFrom<LocationWire> for Location {
    type Error = String;

    fn try_from(wire: LocationWire) -> Result<Self, Self::Error> {
        let latitude = wire
            .latitude
            .or(wire.lat)
            .ok_or("location is missing latitude")?;
        let longitude = wire
            .longitude
            .or(wire.lng)
            .ok_or("location is missing longitude")?;
        Ok(Self {
            latitude,
            longitude,
            address: wire.address,
            district: wire.district,
            city: wire.city,
        })
    }
}

impl Location {
    /// Creates a location with coordinates only.
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            address: None,
            district: None,
            city: None,
        }
    }

    /// Returns the most specific label available: address, then
    /// district.
    #[must_use]
    pub fn label(&self) -> Option<&str> {
        self.address.as_deref().or(self.district.as_deref())
    }
}

/// A single sighting as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// Unique report ID.
    pub id: String,
    /// Free-text content of the sighting.
    pub content: String,
    /// Longer description, if the reporter gave one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Where the sighting happened.
    pub location: Location,
    /// Top-level address copy some API versions send.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Reported intensity.
    pub severity: Severity,
    /// Source platform.
    pub platform: Platform,
    /// When the report was created.
    pub created_at: DateTime<Utc>,
    /// Keywords extracted from the content.
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Classifier confidence in `[0, 1]`.
    #[serde(default)]
    pub confidence: f64,
    /// Sentiment score in `[-1, 1]`.
    #[serde(default)]
    pub sentiment: f64,
    /// Attached photo references.
    #[serde(default)]
    pub photos: Vec<String>,
    /// Whether the report has been verified.
    #[serde(default)]
    pub verified: bool,
    /// Number of verifications received.
    #[serde(default)]
    pub verification_count: u32,
    /// Reporter ID.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// When the sighting was reported, if different from `created_at`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reported_at: Option<DateTime<Utc>>,
}

impl Report {
    /// Returns the best address available for display.
    #[must_use]
    pub fn display_address(&self) -> Option<&str> {
        self.location.label().or(self.address.as_deref())
    }

    /// Whether `confidence` is within `[0, 1]`.
    #[must_use]
    pub fn confidence_in_bounds(&self) -> bool {
        (0.0..=1.0).contains(&self.confidence)
    }

    /// Whether `sentiment` is within `[-1, 1]`.
    #[must_use]
    pub fn sentiment_in_bounds(&self) -> bool {
        (-1.0..=1.0).contains(&self.sentiment)
    }
}

/// Payload for `POST /reports`.
///
/// Identity and verification fields are assigned by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewReport {
    /// Free-text content of the sighting.
    pub content: String,
    /// Longer description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Where the sighting happened.
    pub location: Location,
    /// Top-level address copy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Reported intensity.
    pub severity: Severity,
    /// Source platform.
    pub platform: Platform,
    /// Client-side creation time.
    pub created_at: DateTime<Utc>,
    /// Keywords for the report.
    pub keywords: Vec<String>,
    /// Confidence in `[0, 1]`.
    pub confidence: f64,
    /// Sentiment in `[-1, 1]`.
    pub sentiment: f64,
    /// Attached photo names.
    pub photos: Vec<String>,
}

/// Report counts per severity level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityCounts {
    /// Count of `low` reports.
    #[serde(default)]
    pub low: u64,
    /// Count of `medium` reports.
    #[serde(default)]
    pub medium: u64,
    /// Count of `high` reports.
    #[serde(default)]
    pub high: u64,
    /// Count of `critical` reports.
    #[serde(default)]
    pub critical: u64,
}

impl SeverityCounts {
    /// Returns the count for a single severity.
    #[must_use]
    pub const fn get(&self, severity: Severity) -> u64 {
        match severity {
            Severity::Low => self.low,
            Severity::Medium => self.medium,
            Severity::High => self.high,
            Severity::Critical => self.critical,
        }
    }

    /// Adds one to the count for `severity`.
    pub const fn increment(&mut self, severity: Severity) {
        match severity {
            Severity::Low => self.low += 1,
            Severity::Medium => self.medium += 1,
            Severity::High => self.high += 1,
            Severity::Critical => self.critical += 1,
        }
    }

    /// Sum of all severities.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.low + self.medium + self.high + self.critical
    }
}

/// A server-computed cluster of nearby reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hotspot {
    /// Unique hotspot ID.
    pub id: String,
    /// Cluster centroid.
    pub location: Location,
    /// Top-level address copy some API versions send.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Number of reports in the cluster.
    pub report_count: u64,
    /// Per-severity breakdown, when the server computes one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity_distribution: Option<SeverityCounts>,
    /// Most recent report time in the cluster.
    pub last_activity: DateTime<Utc>,
    /// Cluster radius in meters.
    pub radius: f64,
}

impl Hotspot {
    /// Returns the best label available for display.
    #[must_use]
    pub fn display_address(&self) -> Option<&str> {
        self.location.label().or(self.address.as_deref())
    }

    /// Whether the severity breakdown sums to no more than
    /// `report_count`. The server owns this contract; the client only
    /// reports on it.
    #[must_use]
    pub fn distribution_within_count(&self) -> bool {
        self.severity_distribution
            .is_none_or(|d| d.total() <= self.report_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_is_ordered() {
        assert!(Severity::Low < Severity::Medium);
        assert!(Severity::Medium < Severity::High);
        assert!(Severity::High < Severity::Critical);
        for (i, s) in Severity::all().iter().enumerate() {
            assert_eq!(usize::from(s.value()), i + 1);
        }
    }

    #[test]
    fn severity_parses_lowercase() {
        assert_eq!("critical".parse::<Severity>().unwrap(), Severity::Critical);
        assert_eq!(Severity::Medium.to_string(), "medium");
        assert!("extreme".parse::<Severity>().is_err());
    }

    #[test]
    fn location_accepts_both_coordinate_spellings() {
        let both: Location = serde_json::from_str(
            r#"{"latitude":37.5,"longitude":127.0,"lat":37.4,"lng":126.9,"city":"Seoul"}"#,
        )
        .unwrap();
        assert!((both.latitude - 37.5).abs() < f64::EPSILON);
        assert!((both.longitude - 127.0).abs() < f64::EPSILON);
        assert_eq!(both.city.as_deref(), Some("Seoul"));

        let short: Location = serde_json::from_str(r#"{"lat":37.4,"lng":126.9}"#).unwrap();
        assert_eq!(short, Location::new(37.4, 126.9));

        let err = serde_json::from_str::<Location>(r#"{"lat":37.4}"#).unwrap_err();
        assert!(err.to_string().contains("missing longitude"));
    }

    #[test]
    fn report_list_survives_mixed_location_shapes() {
        let json = r#"[
            {"id":"a","content":"x","location":{"latitude":37.5,"longitude":127.0,"lat":37.5,"lng":127.0},
             "severity":"low","platform":"kakao","created_at":"2024-06-20T10:00:00Z"},
            {"id":"b","content":"y","location":{"lat":37.6,"lng":127.1},
             "severity":"medium","platform":"google","created_at":"2024-06-20T11:00:00Z"}
        ]"#;
        let reports: Vec<Report> = serde_json::from_str(json).unwrap();
        assert_eq!(reports.len(), 2);
        assert!((reports[1].location.longitude - 127.1).abs() < f64::EPSILON);
    }

    #[test]
    fn decodes_report_with_missing_optionals() {
        let json = r#"{
            "id": "r-1",
            "content": "lots of bugs",
            "location": {"lat": 37.5, "lng": 127.0, "address": "Seoul Jung-gu Myeongdong"},
            "severity": "high",
            "platform": "naver",
            "created_at": "2024-06-20T10:00:00Z",
            "intensity": "high"
        }"#;
        let report: Report = serde_json::from_str(json).unwrap();
        assert_eq!(report.severity, Severity::High);
        assert_eq!(report.platform, Platform::Naver);
        assert!((report.location.latitude - 37.5).abs() < f64::EPSILON);
        assert!(!report.verified);
        assert_eq!(report.verification_count, 0);
        assert_eq!(report.display_address(), Some("Seoul Jung-gu Myeongdong"));
    }

    #[test]
    fn rejects_unknown_severity() {
        let json = r#"{
            "id": "r-1", "content": "x",
            "location": {"latitude": 0.0, "longitude": 0.0},
            "severity": "apocalyptic", "platform": "naver",
            "created_at": "2024-06-20T10:00:00Z"
        }"#;
        assert!(serde_json::from_str::<Report>(json).is_err());
    }

    #[test]
    fn severity_counts_increment_and_total() {
        let mut counts = SeverityCounts::default();
        counts.increment(Severity::Low);
        counts.increment(Severity::Critical);
        counts.increment(Severity::Critical);
        assert_eq!(counts.get(Severity::Critical), 2);
        assert_eq!(counts.total(), 3);
    }

    #[test]
    fn hotspot_distribution_contract() {
        let mut hotspot = Hotspot {
            id: "h-1".to_string(),
            location: Location::new(37.5, 127.0),
            address: None,
            report_count: 10,
            severity_distribution: Some(SeverityCounts {
                low: 2,
                medium: 3,
                high: 4,
                critical: 1,
            }),
            last_activity: Utc::now(),
            radius: 250.0,
        };
        assert!(hotspot.distribution_within_count());
        hotspot.report_count = 9;
        assert!(!hotspot.distribution_within_count());
        hotspot.severity_distribution = None;
        assert!(hotspot.distribution_within_count());
    }
}

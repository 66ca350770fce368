#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Map layer rendering for reports and hotspots.
//!
//! [`MapRenderer`] turns the current report and hotspot lists into
//! markers and circles on a [`MapSurface`]. Every update clears the
//! previously rendered layers of that kind and draws the full set again.

pub mod recording;
pub mod renderer;
pub mod style;

pub use recording::{Layer, RecordingSurface, SurfaceOp};
pub use renderer::{LegendEntry, MapRenderer, Selection};
pub use style::{hotspot_color, marker_color};

/// Default map centre (Seoul City Hall).
pub const DEFAULT_CENTER: LatLng = LatLng {
    lat: 37.5665,
    lng: 126.9780,
};

/// Default zoom level.
pub const DEFAULT_ZOOM: u8 = 12;

/// A geographic coordinate in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLng {
    /// Latitude.
    pub lat: f64,
    /// Longitude.
    pub lng: f64,
}

impl From<&lovebug_report_models::Location> for LatLng {
    fn from(location: &lovebug_report_models::Location) -> Self {
        Self {
            lat: location.latitude,
            lng: location.longitude,
        }
    }
}

/// Handle to a layer on a [`MapSurface`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LayerId(pub u64);

impl std::fmt::Display for LayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "layer-{}", self.0)
    }
}

/// A round severity marker.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerSpec {
    /// Marker position.
    pub position: LatLng,
    /// Fill colour as `#rrggbb`.
    pub color: &'static str,
    /// Diameter in pixels.
    pub size_px: u32,
    /// Popup text.
    pub popup: String,
}

/// A filled hotspot circle.
#[derive(Debug, Clone, PartialEq)]
pub struct CircleSpec {
    /// Circle centre.
    pub center: LatLng,
    /// Radius in metres.
    pub radius_m: f64,
    /// Stroke and fill colour as `#rrggbb`.
    pub color: &'static str,
    /// Fill opacity in `0.0..=1.0`.
    pub fill_opacity: f64,
    /// Stroke width in pixels.
    pub weight: u32,
    /// Popup text.
    pub popup: String,
}

/// Errors a [`MapSurface`] can report.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MapError {
    /// The layer does not exist on the surface.
    #[error("Unknown map layer: {0}")]
    UnknownLayer(LayerId),

    /// The surface refused to add a layer.
    #[error("Map surface rejected layer: {message}")]
    Rejected {
        /// Description of what went wrong.
        message: String,
    },
}

/// Something layers can be drawn on.
pub trait MapSurface {
    /// Adds a marker layer.
    ///
    /// # Errors
    ///
    /// Returns [`MapError`] if the surface cannot add the layer.
    fn add_marker(&mut self, marker: &MarkerSpec) -> Result<LayerId, MapError>;

    /// Adds a circle layer.
    ///
    /// # Errors
    ///
    /// Returns [`MapError`] if the surface cannot add the layer.
    fn add_circle(&mut self, circle: &CircleSpec) -> Result<LayerId, MapError>;

    /// Removes a layer.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::UnknownLayer`] if the layer is not present.
    fn remove_layer(&mut self, id: LayerId) -> Result<(), MapError>;

    /// Centres the view.
    fn set_view(&mut self, center: LatLng, zoom: u8);
}

//! In-memory [`MapSurface`].

use std::collections::BTreeMap;

use crate::{CircleSpec, LatLng, LayerId, MapError, MapSurface, MarkerSpec};

/// A layer held by a [`RecordingSurface`].
#[derive(Debug, Clone, PartialEq)]
pub enum Layer {
    /// A marker.
    Marker(MarkerSpec),
    /// A circle.
    Circle(CircleSpec),
}

/// A layer change applied to a [`RecordingSurface`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceOp {
    /// A layer was added.
    Add(LayerId),
    /// A layer was removed.
    Remove(LayerId),
}

/// A surface that keeps its layers in memory, in insertion order, and
/// logs every change.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    next_id: u64,
    layers: BTreeMap<LayerId, Layer>,
    view: Option<(LatLng, u8)>,
    removed: usize,
    ops: Vec<SurfaceOp>,
    failing_adds: usize,
}

impl RecordingSurface {
    /// Creates an empty surface.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next `count` add calls fail.
    pub const fn fail_next_adds(&mut self, count: usize) {
        self.failing_adds = count;
    }

    /// All live layers.
    pub fn layers(&self) -> impl Iterator<Item = (LayerId, &Layer)> {
        self.layers.iter().map(|(id, layer)| (*id, layer))
    }

    /// Live markers.
    pub fn markers(&self) -> impl Iterator<Item = &MarkerSpec> {
        self.layers.values().filter_map(|layer| match layer {
            Layer::Marker(marker) => Some(marker),
            Layer::Circle(_) => None,
        })
    }

    /// Live circles.
    pub fn circles(&self) -> impl Iterator<Item = &CircleSpec> {
        self.layers.values().filter_map(|layer| match layer {
            Layer::Circle(circle) => Some(circle),
            Layer::Marker(_) => None,
        })
    }

    /// Number of layers removed so far.
    #[must_use]
    pub const fn removed(&self) -> usize {
        self.removed
    }

    /// Layer changes in the order they happened.
    #[must_use]
    pub fn ops(&self) -> &[SurfaceOp] {
        &self.ops
    }

    /// The last view set, if any.
    #[must_use]
    pub const fn view(&self) -> Option<(LatLng, u8)> {
        self.view
    }

    fn insert(&mut self, layer: Layer) -> Result<LayerId, MapError> {
        if self.failing_adds > 0 {
            self.failing_adds -= 1;
            return Err(MapError::Rejected {
                message: "surface refused layer".to_string(),
            });
        }
        let id = LayerId(self.next_id);
        self.next_id += 1;
        self.layers.insert(id, layer);
        self.ops.push(SurfaceOp::Add(id));
        Ok(id)
    }
}

impl MapSurface for RecordingSurface {
    fn add_marker(&mut self, marker: &MarkerSpec) -> Result<LayerId, MapError> {
        self.insert(Layer::Marker(marker.clone()))
    }

    fn add_circle(&mut self, circle: &CircleSpec) -> Result<LayerId, MapError> {
        self.insert(Layer::Circle(circle.clone()))
    }

    fn remove_layer(&mut self, id: LayerId) -> Result<(), MapError> {
        self.layers
            .remove(&id)
            .ok_or(MapError::UnknownLayer(id))?;
        self.removed += 1;
        self.ops.push(SurfaceOp::Remove(id));
        Ok(())
    }

    fn set_view(&mut self, center: LatLng, zoom: u8) {
        self.view = Some((center, zoom));
    }
}

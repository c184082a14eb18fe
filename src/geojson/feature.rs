//! Feature, FeatureCollection and polygonal geometry types.

use crate::error::{FogError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A `[longitude, latitude]` pair in degrees.
pub type Position = [f64; 2];

/// A linear ring. Valid rings are closed and have at least four positions.
pub type Ring = Vec<Position>;

/// Polygonal GeoJSON geometry.
///
/// Serialized with the GeoJSON `"type"` tag, e.g.
/// `{"type": "Polygon", "coordinates": [[[0,0], ...]]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    /// An exterior ring followed by zero or more holes.
    Polygon { coordinates: Vec<Ring> },
    /// A set of polygons, each an exterior ring followed by holes.
    MultiPolygon { coordinates: Vec<Vec<Ring>> },
}

impl Geometry {
    /// GeoJSON name of the geometry kind.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Geometry::Polygon { .. } => "Polygon",
            Geometry::MultiPolygon { .. } => "MultiPolygon",
        }
    }

    /// Returns the polygons as ring lists, treating a Polygon as a
    /// one-element MultiPolygon.
    pub fn polygons(&self) -> Vec<&[Ring]> {
        match self {
            Geometry::Polygon { coordinates } => vec![coordinates.as_slice()],
            Geometry::MultiPolygon { coordinates } => {
                coordinates.iter().map(|p| p.as_slice()).collect()
            }
        }
    }

    /// Iterates over every ring of every polygon.
    pub fn rings(&self) -> impl Iterator<Item = &Ring> + '_ {
        let polygons: Box<dyn Iterator<Item = &Vec<Ring>> + '_> = match self {
            Geometry::Polygon { coordinates } => Box::new(std::iter::once(coordinates)),
            Geometry::MultiPolygon { coordinates } => Box::new(coordinates.iter()),
        };
        polygons.flat_map(|rings| rings.iter())
    }

    /// Total number of positions over all rings.
    pub fn vertex_count(&self) -> usize {
        self.rings().map(Vec::len).sum()
    }

    /// Applies `f` to every ring, preserving the geometry kind.
    pub fn map_rings<M>(&self, mut f: M) -> Geometry
    where
        M: FnMut(&Ring) -> Ring,
    {
        match self {
            Geometry::Polygon { coordinates } => Geometry::Polygon {
                coordinates: coordinates.iter().map(&mut f).collect(),
            },
            Geometry::MultiPolygon { coordinates } => Geometry::MultiPolygon {
                coordinates: coordinates
                    .iter()
                    .map(|rings| rings.iter().map(&mut f).collect())
                    .collect(),
            },
        }
    }
}

/// The `"type": "Feature"` tag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeatureKind {
    #[default]
    Feature,
}

/// The `"type": "FeatureCollection"` tag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollectionKind {
    #[default]
    FeatureCollection,
}

/// A GeoJSON Feature carrying polygonal geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    #[serde(rename = "type")]
    pub kind: FeatureKind,
    pub geometry: Geometry,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<Map<String, Value>>,
}

impl Feature {
    /// Wraps a geometry in a feature without properties.
    pub fn new(geometry: Geometry) -> Self {
        Self {
            kind: FeatureKind::Feature,
            geometry,
            properties: None,
        }
    }

    /// Creates a Polygon feature from its rings.
    pub fn polygon(rings: Vec<Ring>) -> Self {
        Self::new(Geometry::Polygon { coordinates: rings })
    }

    /// Creates a MultiPolygon feature.
    pub fn multi_polygon(polygons: Vec<Vec<Ring>>) -> Self {
        Self::new(Geometry::MultiPolygon {
            coordinates: polygons,
        })
    }

    /// Attaches a properties object.
    pub fn with_properties(mut self, properties: Map<String, Value>) -> Self {
        self.properties = Some(properties);
        self
    }

    /// Converts untyped JSON into a feature, checking the GeoJSON envelope.
    ///
    /// Rejects anything that is not a `Feature` with a `Polygon` or
    /// `MultiPolygon` geometry and a `coordinates` member. Ring-level
    /// validity is left to [`crate::polygon::validate`].
    pub fn from_value(value: &Value) -> Result<Self> {
        let object = value
            .as_object()
            .ok_or_else(|| FogError::Validation("feature is not a JSON object".into()))?;

        match object.get("type").and_then(Value::as_str) {
            Some("Feature") => {}
            Some(other) => {
                return Err(FogError::Validation(format!(
                    "expected type Feature, found {other}"
                )))
            }
            None => return Err(FogError::Validation("missing feature type".into())),
        }

        let geometry = object
            .get("geometry")
            .and_then(Value::as_object)
            .ok_or_else(|| FogError::Validation("missing geometry".into()))?;

        match geometry.get("type").and_then(Value::as_str) {
            Some("Polygon") | Some("MultiPolygon") => {}
            Some(other) => {
                return Err(FogError::Validation(format!(
                    "unsupported geometry type {other}"
                )))
            }
            None => return Err(FogError::Validation("missing geometry type".into())),
        }

        if !geometry.get("coordinates").is_some_and(Value::is_array) {
            return Err(FogError::Validation("missing coordinates".into()));
        }

        serde_json::from_value(value.clone()).map_err(|e| FogError::Validation(e.to_string()))
    }
}

/// A GeoJSON FeatureCollection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection {
    #[serde(rename = "type")]
    pub kind: CollectionKind,
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn new(features: Vec<Feature>) -> Self {
        Self {
            kind: CollectionKind::FeatureCollection,
            features,
        }
    }

    /// An empty collection: nothing to draw.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Total number of positions over all features.
    pub fn vertex_count(&self) -> usize {
        self.features.iter().map(|f| f.geometry.vertex_count()).sum()
    }
}

//! Region and point-of-interest records.
//!
//! These are the units the engine's atlas cache holds: a region of the
//! campaign map plus the named places inside it. Danger level feeds quest
//! difficulty inference, and bounds support hit-testing on the map image.

use serde::{Deserialize, Serialize};

use crate::ids::{PoiId, RegionId};

/// A region of the campaign map
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Region {
    pub id: RegionId,
    pub name: String,
    pub description: String,
    /// World coordinates of the region's anchor point
    pub coordinates: Coordinates,
    /// Bounds on the world map, if the region has been charted
    pub bounds: Option<MapBounds>,
    /// Local danger on a 1-5 scale, used for difficulty inference
    pub danger_level: u32,
}

impl Region {
    pub fn new(name: impl Into<String>, coordinates: Coordinates) -> Self {
        Self {
            id: RegionId::new(),
            name: name.into(),
            description: String::new(),
            coordinates,
            bounds: None,
            danger_level: 1,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_bounds(mut self, bounds: MapBounds) -> Self {
        self.bounds = Some(bounds);
        self
    }

    pub fn with_danger_level(mut self, danger: u32) -> Self {
        self.danger_level = danger.clamp(1, 5);
        self
    }

    /// Check if a map position falls inside this region's bounds.
    pub fn contains_point(&self, x: i32, y: i32) -> bool {
        self.bounds.map_or(false, |b| b.contains(x, y))
    }
}

/// A named place within a region
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Poi {
    pub id: PoiId,
    pub region_id: RegionId,
    pub name: String,
    pub kind: PoiKind,
    pub coordinates: Coordinates,
}

impl Poi {
    pub fn new(region_id: RegionId, name: impl Into<String>, kind: PoiKind) -> Self {
        Self {
            id: PoiId::new(),
            region_id,
            name: name.into(),
            kind,
            coordinates: Coordinates::default(),
        }
    }

    pub fn at(mut self, coordinates: Coordinates) -> Self {
        self.coordinates = coordinates;
        self
    }
}

/// Category of point of interest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PoiKind {
    Settlement,
    Dungeon,
    Landmark,
    Shrine,
    Camp,
    Ruin,
}

/// A position in world coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coordinates {
    pub x: i32,
    pub y: i32,
}

impl Coordinates {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Bounds defining a rectangular area on the world map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapBounds {
    /// X coordinate of the top-left corner
    pub x: i32,
    /// Y coordinate of the top-left corner
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl MapBounds {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Check if a position is within these bounds.
    pub fn contains(&self, px: i32, py: i32) -> bool {
        px >= self.x
            && px < self.x + self.width as i32
            && py >= self.y
            && py < self.y + self.height as i32
    }
}

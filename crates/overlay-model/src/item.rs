//! Overlay item types and their wire representation.
//!
//! An overlay is a decoration (emoji glyph or short text) placed on top of
//! the recording surface. Coordinates are in recording-surface pixels with
//! `(0, 0)` at the top-left.

use serde::{Deserialize, Serialize};

/// Minimum overlay scale reachable by pinch gestures.
pub const SCALE_MIN: f64 = 0.5;

/// Maximum overlay scale reachable by pinch gestures.
pub const SCALE_MAX: f64 = 3.0;

/// Nominal edge length of a freshly spawned overlay, in surface pixels.
/// New items spawn at the surface center offset by half this size.
pub const NOMINAL_ITEM_SIZE: f64 = 100.0;

/// Unique overlay identifier.
///
/// Time-seeded and strictly increasing within a session; never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OverlayId(pub u64);

impl std::fmt::Display for OverlayId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What kind of decoration an overlay renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverlayKind {
    /// A short glyph string, e.g. a single emoji.
    Emoji,
    /// Arbitrary short text.
    Text,
}

/// A 2D position on the recording surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Offset by a gesture delta.
    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

/// A user-placed decoration with its current transform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayItem {
    pub id: OverlayId,
    pub kind: OverlayKind,
    pub content: String,
    pub position: Position,
    pub scale: f64,
    pub rotation: f64,
}

impl OverlayItem {
    /// Clamp a requested scale into the allowed range.
    pub fn clamp_scale(scale: f64) -> f64 {
        scale.clamp(SCALE_MIN, SCALE_MAX)
    }
}

/// One record of the serialized overlay description consumed by the
/// burn-in stage: `{id, type, content, x, y, scale, rotation}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireOverlay {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: OverlayKind,
    pub content: String,
    pub x: f64,
    pub y: f64,
    pub scale: f64,
    pub rotation: f64,
}

impl From<&OverlayItem> for WireOverlay {
    fn from(item: &OverlayItem) -> Self {
        Self {
            id: item.id.to_string(),
            kind: item.kind,
            content: item.content.clone(),
            x: item.position.x,
            y: item.position.y,
            scale: item.scale,
            rotation: item.rotation,
        }
    }
}

impl TryFrom<WireOverlay> for OverlayItem {
    type Error = std::num::ParseIntError;

    /// A malformed id is an error: collapsing bad ids to a sentinel would
    /// let distinct records collide. Scale is clamped on ingest so the
    /// session invariant holds for externally supplied records too.
    fn try_from(wire: WireOverlay) -> Result<Self, Self::Error> {
        Ok(Self {
            id: OverlayId(wire.id.parse()?),
            kind: wire.kind,
            content: wire.content,
            position: Position::new(wire.x, wire.y),
            scale: OverlayItem::clamp_scale(wire.scale),
            rotation: wire.rotation,
        })
    }
}

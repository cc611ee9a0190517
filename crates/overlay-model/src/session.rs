//! Editing session owning the active overlay set.
//!
//! The session holds overlays in insertion order (insertion order is z-order,
//! front-most last) for the lifetime of one recording/editing session.
//! Nothing here persists across sessions; the pipeline receives a frozen
//! [`OverlaySnapshot`] instead of live session state.

use serde::{Deserialize, Serialize};

use crate::item::{
    OverlayId, OverlayItem, OverlayKind, Position, WireOverlay, NOMINAL_ITEM_SIZE,
};

/// Partial update merged into an existing overlay by id.
#[derive(Debug, Clone, Copy, Default)]
pub struct OverlayUpdate {
    pub position: Option<Position>,
    pub scale: Option<f64>,
    pub rotation: Option<f64>,
}

/// Dimensions of the visible recording surface, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurfaceSize {
    pub width: f64,
    pub height: f64,
}

impl SurfaceSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Default spawn position: surface center minus half the nominal
    /// item size, so a fresh item appears visually centered.
    pub fn default_spawn_position(&self) -> Position {
        Position::new(
            self.width / 2.0 - NOMINAL_ITEM_SIZE / 2.0,
            self.height / 2.0 - NOMINAL_ITEM_SIZE / 2.0,
        )
    }
}

/// The live overlay editing session.
#[derive(Debug, Clone)]
pub struct OverlaySession {
    surface: SurfaceSize,
    items: Vec<OverlayItem>,
    last_id: u64,
}

impl OverlaySession {
    /// Create an empty session for a surface of the given size.
    pub fn new(surface: SurfaceSize) -> Self {
        Self {
            surface,
            items: Vec::new(),
            last_id: 0,
        }
    }

    /// Spawn a new overlay at the default position. Always succeeds.
    pub fn add(&mut self, kind: OverlayKind, content: impl Into<String>) -> OverlayId {
        let id = self.next_id();
        let item = OverlayItem {
            id,
            kind,
            content: content.into(),
            position: self.surface.default_spawn_position(),
            scale: 1.0,
            rotation: 0.0,
        };
        tracing::debug!(id = %id, kind = ?kind, "Overlay added");
        self.items.push(item);
        id
    }

    /// Merge a partial update into the overlay with the given id.
    ///
    /// Scale is clamped into the allowed range. Returns false (and leaves
    /// the session untouched) when no overlay matches.
    pub fn update(&mut self, id: OverlayId, update: OverlayUpdate) -> bool {
        let Some(item) = self.items.iter_mut().find(|item| item.id == id) else {
            tracing::debug!(id = %id, "Overlay update ignored: no such id");
            return false;
        };

        if let Some(position) = update.position {
            item.position = position;
        }
        if let Some(scale) = update.scale {
            item.scale = OverlayItem::clamp_scale(scale);
        }
        if let Some(rotation) = update.rotation {
            item.rotation = rotation;
        }
        true
    }

    /// Remove the overlay with the given id. No-op when absent.
    pub fn remove(&mut self, id: OverlayId) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id != id);
        before != self.items.len()
    }

    /// Look up an overlay by id.
    pub fn get(&self, id: OverlayId) -> Option<&OverlayItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// The active overlays in z-order (front-most last).
    pub fn items(&self) -> &[OverlayItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn surface(&self) -> SurfaceSize {
        self.surface
    }

    /// Freeze the current overlay set into a value copy for pipeline
    /// hand-off. Later session mutations do not affect the snapshot.
    pub fn snapshot(&self) -> OverlaySnapshot {
        OverlaySnapshot {
            items: self.items.clone(),
        }
    }

    /// Next overlay id: millisecond timestamp, bumped past the previous id
    /// when the clock has not advanced. Strictly increasing.
    fn next_id(&mut self) -> OverlayId {
        let now = chrono::Utc::now().timestamp_millis().max(0) as u64;
        let id = now.max(self.last_id + 1);
        self.last_id = id;
        OverlayId(id)
    }
}

/// An immutable copy of the overlay set taken at a specific instant.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OverlaySnapshot {
    items: Vec<OverlayItem>,
}

impl OverlaySnapshot {
    pub fn items(&self) -> &[OverlayItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Serialize to the wire format consumed by the burn-in stage:
    /// a JSON array of `{id, type, content, x, y, scale, rotation}`
    /// records in z-order.
    pub fn to_wire_json(&self) -> serde_json::Result<String> {
        let records: Vec<WireOverlay> = self.items.iter().map(WireOverlay::from).collect();
        serde_json::to_string(&records)
    }

    /// Parse a wire-format overlay list back into a snapshot.
    ///
    /// Records with unparseable ids are rejected; scale is clamped into
    /// the session range on ingest.
    pub fn from_wire_json(json: &str) -> serde_json::Result<Self> {
        use serde::de::Error;

        let records: Vec<WireOverlay> = serde_json::from_str(json)?;
        let items = records
            .into_iter()
            .map(|record| {
                let id = record.id.clone();
                OverlayItem::try_from(record).map_err(|e| {
                    serde_json::Error::custom(format!("invalid overlay id {id:?}: {e}"))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { items })
    }
}

impl FromIterator<OverlayItem> for OverlaySnapshot {
    fn from_iter<I: IntoIterator<Item = OverlayItem>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

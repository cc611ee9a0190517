//! Gesture-to-model mapping for overlay transforms.
//!
//! Each gesture captures the item's committed value at gesture start,
//! exposes `preview` for the purely visual per-frame transform, and commits
//! the final value to the session only on `end`. Intermediate frames never
//! mutate the model.

use crate::item::{OverlayId, OverlayItem, Position};
use crate::session::{OverlaySession, OverlayUpdate};

/// Drag gesture: position = position-at-start + accumulated delta.
#[derive(Debug, Clone, Copy)]
pub struct PanGesture {
    id: OverlayId,
    start: Position,
}

impl PanGesture {
    /// Begin a pan on the given overlay. None if the id is gone.
    pub fn begin(session: &OverlaySession, id: OverlayId) -> Option<Self> {
        session.get(id).map(|item| Self {
            id,
            start: item.position,
        })
    }

    /// Visual position for the current frame.
    pub fn preview(&self, dx: f64, dy: f64) -> Position {
        self.start.translated(dx, dy)
    }

    /// Commit the final position to the model.
    pub fn end(self, session: &mut OverlaySession, dx: f64, dy: f64) -> bool {
        session.update(
            self.id,
            OverlayUpdate {
                position: Some(self.preview(dx, dy)),
                ..Default::default()
            },
        )
    }
}

/// Pinch gesture: scale = clamp(factor × scale-at-start).
#[derive(Debug, Clone, Copy)]
pub struct PinchGesture {
    id: OverlayId,
    start_scale: f64,
}

impl PinchGesture {
    pub fn begin(session: &OverlaySession, id: OverlayId) -> Option<Self> {
        session.get(id).map(|item| Self {
            id,
            start_scale: item.scale,
        })
    }

    /// Visual scale for the current frame, already clamped.
    pub fn preview(&self, factor: f64) -> f64 {
        OverlayItem::clamp_scale(factor * self.start_scale)
    }

    pub fn end(self, session: &mut OverlaySession, factor: f64) -> bool {
        session.update(
            self.id,
            OverlayUpdate {
                scale: Some(self.preview(factor)),
                ..Default::default()
            },
        )
    }
}

/// Rotation gesture: rotation = gesture angle + rotation-at-start.
#[derive(Debug, Clone, Copy)]
pub struct RotateGesture {
    id: OverlayId,
    start_rotation: f64,
}

impl RotateGesture {
    pub fn begin(session: &OverlaySession, id: OverlayId) -> Option<Self> {
        session.get(id).map(|item| Self {
            id,
            start_rotation: item.rotation,
        })
    }

    /// Visual rotation for the current frame, in radians.
    pub fn preview(&self, angle: f64) -> f64 {
        angle + self.start_rotation
    }

    pub fn end(self, session: &mut OverlaySession, angle: f64) -> bool {
        session.update(
            self.id,
            OverlayUpdate {
                rotation: Some(self.preview(angle)),
                ..Default::default()
            },
        )
    }
}

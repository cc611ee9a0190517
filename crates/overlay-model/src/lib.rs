//! StoryClip Overlay Model
//!
//! Tracks user-placed decorations (emoji/text) over a live recording
//! preview: position, scale, and rotation driven by pan/pinch/rotate
//! gestures, with a frozen snapshot handed to the post-processing
//! pipeline when recording finishes.
//!
//! Gestures commit to the model only on gesture end; intermediate frames
//! update a purely visual transform via the `preview` methods.

pub mod gesture;
pub mod item;
pub mod session;

pub use gesture::{PanGesture, PinchGesture, RotateGesture};
pub use item::{OverlayId, OverlayItem, OverlayKind, Position, WireOverlay};
pub use session::{OverlaySession, OverlaySnapshot, OverlayUpdate, SurfaceSize};

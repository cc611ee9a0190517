//! Overlay burn-in filter construction.
//!
//! Translates a wire-format overlay list into a `drawtext` filter chain,
//! one filter per record in z-order. Emoji and text overlays both render
//! through `drawtext` with a font resolved in the stage working directory.

use std::path::Path;

use storyclip_overlay_model::WireOverlay;

/// Base font size at scale 1.0, in output pixels.
const BASE_FONT_SIZE: f64 = 40.0;

/// Build the complete filter chain for a list of overlay records.
/// Returns None when the list is empty (nothing to burn).
pub fn build_overlay_filter(overlays: &[WireOverlay], font_file: &Path) -> Option<String> {
    if overlays.is_empty() {
        return None;
    }

    let parts: Vec<String> = overlays
        .iter()
        .map(|overlay| drawtext_filter(overlay, font_file))
        .collect();

    Some(parts.join(","))
}

fn drawtext_filter(overlay: &WireOverlay, font_file: &Path) -> String {
    format!(
        "drawtext=text='{text}':x={x}:y={y}:fontsize={size}:fontcolor=white:fontfile='{font}'",
        text = escape_drawtext(&overlay.content),
        x = overlay.x.round() as i64,
        y = overlay.y.round() as i64,
        size = (overlay.scale * BASE_FONT_SIZE).round().max(1.0) as i64,
        font = font_file.display(),
    )
}

/// Escape characters that are special inside a quoted drawtext value.
fn escape_drawtext(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '\'' => escaped.push_str("\\'"),
            ':' => escaped.push_str("\\:"),
            '%' => escaped.push_str("\\%"),
            _ => escaped.push(c),
        }
    }
    escaped
}

//! Window sizing and placement
//!
//! The window is the text's bounding box grown by the margins on every side,
//! anchored to a screen corner (again offset by the margins) or centered.
//! Nothing is clamped to the screen: oversized text or margins produce
//! negative or off-screen origins and it is up to the caller to cope.

use text_display_types::{Placement, ScreenMetrics, TextMetrics, TextOrigin, WindowGeometry};

/// Size and position the overlay window for the given text extents.
pub fn compute_geometry(
    metrics: &TextMetrics,
    screen: &ScreenMetrics,
    margin_x: u32,
    margin_y: u32,
    placement: Placement,
) -> WindowGeometry {
    let width = metrics.width.saturating_add(margin_x.saturating_mul(2));
    let height = metrics.height().saturating_add(margin_y.saturating_mul(2));

    let (sw, sh) = (i64::from(screen.width), i64::from(screen.height));
    let (ww, wh) = (i64::from(width), i64::from(height));
    let (mx, my) = (i64::from(margin_x), i64::from(margin_y));

    let (x, y) = match placement {
        Placement::TopRight => (sw - ww - mx, my),
        Placement::TopLeft => (mx, my),
        Placement::BottomRight => (sw - ww - mx, sh - wh - my),
        Placement::BottomLeft => (mx, sh - wh - my),
        // Integer division truncates toward zero, also for oversized windows
        Placement::Center => ((sw - ww) / 2, (sh - wh) / 2),
        Placement::Unanchored => (0, 0),
    };

    WindowGeometry {
        x: saturate(x),
        y: saturate(y),
        width,
        height,
    }
}

/// Where the text baseline starts inside the window. Independent of placement.
pub fn text_origin(metrics: &TextMetrics, margin_x: u32, margin_y: u32) -> TextOrigin {
    TextOrigin {
        x: saturate(i64::from(margin_x)),
        y: saturate(i64::from(margin_y) + i64::from(metrics.ascent)),
    }
}

fn saturate(value: i64) -> i32 {
    value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

//! Shared value types for text-display
//!
//! Plain data passed between the CLI, the layout core and the platform
//! backends. Nothing in here talks to a display server.

use std::fmt;

// ─────────────────────────────────────────────────────────────────────────────
// Placement
// ─────────────────────────────────────────────────────────────────────────────

/// Named screen anchor for the overlay window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Placement {
    TopLeft,
    #[default]
    TopRight,
    BottomLeft,
    BottomRight,
    Center,
    /// Placement name that was not recognized. The window lands at the
    /// screen origin, matching the historical command-line behavior.
    Unanchored,
}

impl Placement {
    /// All named placements, in the order they appear in usage text
    pub const NAMED: [Placement; 5] = [
        Placement::TopRight,
        Placement::TopLeft,
        Placement::BottomRight,
        Placement::BottomLeft,
        Placement::Center,
    ];

    /// Look up a placement by its command-line name
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "top-left" => Some(Placement::TopLeft),
            "top-right" => Some(Placement::TopRight),
            "bottom-left" => Some(Placement::BottomLeft),
            "bottom-right" => Some(Placement::BottomRight),
            "center" => Some(Placement::Center),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Placement::TopLeft => "top-left",
            Placement::TopRight => "top-right",
            Placement::BottomLeft => "bottom-left",
            Placement::BottomRight => "bottom-right",
            Placement::Center => "center",
            Placement::Unanchored => "unanchored",
        }
    }
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Color Type
// ─────────────────────────────────────────────────────────────────────────────

/// 24-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const RED: Rgb = Rgb::new(0xFF, 0x00, 0x00);
    pub const BLACK: Rgb = Rgb::new(0x00, 0x00, 0x00);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Build from a packed `0xRRGGBB` value (upper byte ignored)
    pub const fn from_u32(packed: u32) -> Self {
        Self {
            r: (packed >> 16) as u8,
            g: (packed >> 8) as u8,
            b: packed as u8,
        }
    }

    /// Packed `0xRRGGBB`, the pixel value on a 24-bit TrueColor visual
    pub const fn to_u32(self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Display Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Everything the user asked for on the command line.
///
/// Built once at startup and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayConfig {
    /// Text to render (never empty)
    pub text: String,
    pub placement: Placement,
    /// Font name or full font descriptor
    pub font: String,
    /// Pixel size used when a descriptor has to be synthesized from a name
    pub font_size: u32,
    /// Horizontal margin in pixels
    pub margin_x: u32,
    /// Vertical margin in pixels
    pub margin_y: u32,
    pub color: Rgb,
    /// How long the overlay stays up
    pub duration_secs: u64,
    /// Clip the window to the glyph shapes
    pub transparent: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            text: "abc".to_string(),
            placement: Placement::TopRight,
            font: "fixed".to_string(),
            font_size: 12,
            margin_x: 10,
            margin_y: 20,
            color: Rgb::RED,
            duration_secs: 30,
            transparent: true,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Layout Values
// ─────────────────────────────────────────────────────────────────────────────

/// Size of the target display surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScreenMetrics {
    pub width: u32,
    pub height: u32,
}

/// Pixel extents of a string rendered in a particular font
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TextMetrics {
    /// Advance width of the whole string
    pub width: u32,
    /// Distance from the baseline to the top of the font's line box
    pub ascent: u32,
    /// Distance from the baseline to the bottom of the font's line box
    pub descent: u32,
}

impl TextMetrics {
    pub fn height(&self) -> u32 {
        self.ascent + self.descent
    }
}

/// Window size and screen position.
///
/// The origin is not clamped: it may be negative or lie past the screen edge
/// when margins or text exceed the screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowGeometry {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// Baseline start of the text, relative to the window's top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextOrigin {
    pub x: i32,
    pub y: i32,
}

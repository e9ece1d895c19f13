//! Tests for the overlay lifecycle against a recording platform

use std::cell::RefCell;

use text_display_core::{FontProvider, GlyphRasterizer, VisibilityMask};
use text_display_overlay::{OverlayPlatform, OverlaySurface, PlatformError};
use text_display_types::{
    DisplayConfig, Placement, Rgb, ScreenMetrics, TextMetrics, TextOrigin, WindowGeometry,
};

use crate::app::present;
use crate::error::AppError;

const ADVANCE: u32 = 10;
const ASCENT: u32 = 10;
const DESCENT: u32 = 4;

/// Platform that records every call instead of talking to a display
struct RecordingPlatform {
    known_fonts: Vec<&'static str>,
    events: RefCell<Vec<String>>,
}

impl RecordingPlatform {
    fn new(known_fonts: &[&'static str]) -> Self {
        Self {
            known_fonts: known_fonts.to_vec(),
            events: RefCell::new(Vec::new()),
        }
    }

    fn record(&self, event: impl Into<String>) {
        self.events.borrow_mut().push(event.into());
    }

    fn events(&self) -> Vec<String> {
        self.events.borrow().clone()
    }
}

struct FakeFont<'a> {
    name: String,
    platform: &'a RecordingPlatform,
}

impl Drop for FakeFont<'_> {
    fn drop(&mut self) {
        self.platform.record(format!("free font {}", self.name));
    }
}

struct FakeSurface<'a> {
    platform: &'a RecordingPlatform,
}

impl Drop for FakeSurface<'_> {
    fn drop(&mut self) {
        self.platform.record("destroy window");
    }
}

impl FontProvider for RecordingPlatform {
    type Font<'a> = FakeFont<'a>;
    type Error = PlatformError;

    fn load(&self, descriptor: &str) -> Result<FakeFont<'_>, PlatformError> {
        self.record(format!("load {descriptor}"));
        if self.known_fonts.iter().any(|known| *known == descriptor) {
            Ok(FakeFont {
                name: descriptor.to_string(),
                platform: self,
            })
        } else {
            Err(PlatformError::FontUnavailable(descriptor.to_string()))
        }
    }

    fn measure(&self, _font: &FakeFont<'_>, text: &str) -> TextMetrics {
        TextMetrics {
            width: ADVANCE * text.chars().count() as u32,
            ascent: ASCENT,
            descent: DESCENT,
        }
    }
}

impl GlyphRasterizer for RecordingPlatform {
    fn rasterize(
        &self,
        font: &FakeFont<'_>,
        text: &str,
        origin: TextOrigin,
        mask: &mut VisibilityMask,
    ) -> Result<(), PlatformError> {
        self.record(format!("rasterize {text} with {}", font.name));
        // One pixel per glyph, on the baseline
        for i in 0..text.chars().count() as i32 {
            mask.mark(origin.x + i * ADVANCE as i32, origin.y);
        }
        Ok(())
    }
}

impl OverlayPlatform for RecordingPlatform {
    type Surface<'a> = FakeSurface<'a>;

    fn screen_metrics(&self) -> ScreenMetrics {
        ScreenMetrics {
            width: 1920,
            height: 1080,
        }
    }

    fn create_surface<'a>(
        &'a self,
        geometry: &WindowGeometry,
        font: &FakeFont<'_>,
        color: Rgb,
    ) -> Result<FakeSurface<'a>, PlatformError> {
        self.record(format!(
            "create window {}x{}+{}+{} font {} color {}",
            geometry.width, geometry.height, geometry.x, geometry.y, font.name, color
        ));
        Ok(FakeSurface { platform: self })
    }
}

impl OverlaySurface for FakeSurface<'_> {
    fn apply_mask(&mut self, mask: &VisibilityMask) -> Result<(), PlatformError> {
        self.platform.record(format!(
            "apply mask {}x{} visible {}",
            mask.width(),
            mask.height(),
            mask.visible_count()
        ));
        Ok(())
    }

    fn map(&mut self) -> Result<(), PlatformError> {
        self.platform.record("map");
        Ok(())
    }

    fn draw_text(&mut self, text: &str, origin: TextOrigin) -> Result<(), PlatformError> {
        self.platform
            .record(format!("draw {text} at {},{}", origin.x, origin.y));
        Ok(())
    }

    fn flush(&mut self) -> Result<(), PlatformError> {
        self.platform.record("flush");
        Ok(())
    }
}

const FIXED_12: &str = "-*-fixed-*-*-*-*-12-*-*-*-*-*-*-*";
const FALLBACK: &str = "fixed";
const ARIAL: &str = "-*-Arial-*-*-*-*-12-*-*-*-*-*-*-*";

fn present_recording(platform: &RecordingPlatform, config: &DisplayConfig) -> Result<(), AppError> {
    present(platform, config, |config| {
        platform.record(format!("hold {}s", config.duration_secs));
    })
}

#[test]
fn test_transparent_overlay_lifecycle() {
    let platform = RecordingPlatform::new(&[FIXED_12]);
    let config = DisplayConfig::default();

    present_recording(&platform, &config).unwrap();

    // "abc" is 30x14, grown by 10/20 margins, anchored top-right
    assert_eq!(
        platform.events(),
        vec![
            format!("load {FIXED_12}"),
            format!("rasterize abc with {FIXED_12}"),
            format!("create window 50x54+1860+20 font {FIXED_12} color FF0000"),
            "apply mask 50x54 visible 3".to_string(),
            "map".to_string(),
            "draw abc at 10,30".to_string(),
            "flush".to_string(),
            "hold 30s".to_string(),
            "destroy window".to_string(),
            format!("free font {FIXED_12}"),
        ]
    );
}

#[test]
fn test_opaque_overlay_skips_mask() {
    let platform = RecordingPlatform::new(&[FALLBACK]);
    let config = DisplayConfig {
        transparent: false,
        ..DisplayConfig::default()
    };

    present_recording(&platform, &config).unwrap();

    let events = platform.events();
    assert!(!events.iter().any(|e| e.starts_with("rasterize")));
    assert!(!events.iter().any(|e| e.starts_with("apply mask")));
    assert!(events.contains(&"map".to_string()));
    assert!(events.contains(&"draw abc at 10,30".to_string()));
}

#[test]
fn test_unknown_font_falls_back_to_fixed() {
    let platform = RecordingPlatform::new(&[FALLBACK]);
    let config = DisplayConfig {
        font: "Arial".to_string(),
        ..DisplayConfig::default()
    };

    present_recording(&platform, &config).unwrap();

    let events = platform.events();
    assert_eq!(events[0], format!("load {ARIAL}"));
    assert_eq!(events[1], "load fixed");
    assert!(events[3].ends_with("font fixed color FF0000"), "{events:?}");
}

#[test]
fn test_requested_font_is_used_when_available() {
    let platform = RecordingPlatform::new(&[ARIAL, FALLBACK]);
    let config = DisplayConfig {
        font: "Arial".to_string(),
        ..DisplayConfig::default()
    };

    present_recording(&platform, &config).unwrap();

    let events = platform.events();
    assert_eq!(events[0], format!("load {ARIAL}"));
    assert_eq!(events.last().unwrap(), &format!("free font {ARIAL}"));
    assert!(!events.contains(&"load fixed".to_string()));
}

#[test]
fn test_font_failure_opens_no_window() {
    let platform = RecordingPlatform::new(&[]);
    let config = DisplayConfig::default();

    let err = present_recording(&platform, &config).unwrap_err();

    assert!(matches!(err, AppError::Font(_)));
    let events = platform.events();
    assert_eq!(events, vec![format!("load {FIXED_12}"), "load fixed".to_string()]);
}

#[test]
fn test_geometry_follows_placement() {
    let platform = RecordingPlatform::new(&[FALLBACK]);
    let config = DisplayConfig {
        placement: Placement::BottomLeft,
        transparent: false,
        ..DisplayConfig::default()
    };

    present_recording(&platform, &config).unwrap();

    // 1080 - 54 - 20
    assert!(
        platform
            .events()
            .contains(&"create window 50x54+10+1006 font fixed color FF0000".to_string()),
        "{:?}",
        platform.events()
    );
}

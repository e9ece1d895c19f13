//! X11 platform implementation for overlay windows
//!
//! Uses XCB via x11rb. Fonts are server-side core fonts; text width follows
//! the `XTextWidth` rule using the per-character metrics from `QueryFont`.
//! Glyph coverage is obtained by drawing into a 1-bit pixmap and reading it
//! back, and the window silhouette is set through the SHAPE extension.

use text_display_core::{FontProvider, GlyphRasterizer, VisibilityMask};
use text_display_types::{Rgb, ScreenMetrics, TextMetrics, TextOrigin, WindowGeometry};
use x11rb::atom_manager;
use x11rb::connection::Connection;
use x11rb::protocol::shape::{self, ConnectionExt as _};
use x11rb::protocol::xproto::*;
use x11rb::rust_connection::RustConnection;
use x11rb::wrapper::ConnectionExt as _;

use super::{OverlayPlatform, OverlaySurface, PlatformError};

/// Rectangles per SHAPE request, well below the core request size limit
const SHAPE_CHUNK: usize = 4096;

/// Longest string a single TEXTITEM8 can carry
const TEXT_ITEM_MAX: usize = 254;

// Atoms needed for EWMH hints
atom_manager! {
    pub AtomCollection: AtomCollectionCookie {
        _NET_WM_STATE,
        _NET_WM_STATE_ABOVE,
        ATOM,
    }
}

fn other<E: std::fmt::Display>(e: E) -> PlatformError {
    PlatformError::Other(e.to_string())
}

fn clamp_coord(v: i32) -> i16 {
    v.clamp(i16::MIN.into(), i16::MAX.into()) as i16
}

/// X rejects zero-sized drawables, and sizes are 16 bit on the wire
fn clamp_extent(v: u32) -> u16 {
    v.clamp(1, u16::MAX.into()) as u16
}

// ─────────────────────────────────────────────────────────────────────────────
// Server Resources
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
enum ResourceKind {
    Font,
    Pixmap,
    Gc,
    Window,
}

/// Server-side object released when dropped
struct Resource<'a> {
    conn: &'a RustConnection,
    kind: ResourceKind,
    id: u32,
}

impl<'a> Resource<'a> {
    fn new(conn: &'a RustConnection, kind: ResourceKind, id: u32) -> Self {
        Self { conn, kind, id }
    }
}

impl Drop for Resource<'_> {
    fn drop(&mut self) {
        let result = match self.kind {
            ResourceKind::Font => self.conn.close_font(self.id).map(drop),
            ResourceKind::Pixmap => self.conn.free_pixmap(self.id).map(drop),
            ResourceKind::Gc => self.conn.free_gc(self.id).map(drop),
            ResourceKind::Window => self.conn.destroy_window(self.id).map(drop),
        };
        match result {
            Ok(()) => tracing::debug!(kind = ?self.kind, id = self.id, "released X11 resource"),
            Err(e) => tracing::warn!(kind = ?self.kind, id = self.id, error = %e, "failed to release X11 resource"),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Text Encoding and Metrics
// ─────────────────────────────────────────────────────────────────────────────

/// Core fonts take 8-bit strings; anything outside Latin-1 becomes `?`
pub fn encode_latin1(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
        .collect()
}

/// Pack a string into TEXTITEM8 entries for `PolyText8`
pub fn encode_text_items(bytes: &[u8]) -> Vec<u8> {
    let mut items = Vec::with_capacity(bytes.len() + 2 * bytes.len().div_ceil(TEXT_ITEM_MAX));
    for chunk in bytes.chunks(TEXT_ITEM_MAX) {
        items.push(chunk.len() as u8);
        items.push(0); // delta
        items.extend_from_slice(chunk);
    }
    items
}

/// Per-character advance widths of a core font
#[derive(Debug, Clone, Default)]
pub struct CharWidths {
    pub first_char: u16,
    /// Advance of each character from `first_char` on; `None` if the glyph is absent
    pub widths: Vec<Option<i16>>,
    pub default_char: u16,
    /// Advance used for every character when the font sends no per-char table
    pub uniform_width: i16,
}

impl CharWidths {
    fn from_reply(reply: &QueryFontReply) -> Self {
        let widths = reply
            .char_infos
            .iter()
            .map(|ci| {
                let absent = ci.character_width == 0
                    && ci.left_side_bearing == 0
                    && ci.right_side_bearing == 0
                    && ci.ascent == 0
                    && ci.descent == 0;
                (!absent).then_some(ci.character_width)
            })
            .collect();

        Self {
            first_char: reply.min_char_or_byte2,
            widths,
            default_char: reply.default_char,
            uniform_width: reply.max_bounds.character_width,
        }
    }

    fn lookup(&self, ch: u16) -> Option<i16> {
        let index = usize::from(ch.checked_sub(self.first_char)?);
        self.widths.get(index).copied().flatten()
    }

    fn width_of(&self, ch: u8) -> i32 {
        if self.widths.is_empty() {
            return self.uniform_width.into();
        }
        self.lookup(ch.into())
            .or_else(|| self.lookup(self.default_char))
            .map_or(0, i32::from)
    }

    /// Sum of advances, as `XTextWidth` computes it
    pub fn text_width(&self, bytes: &[u8]) -> u32 {
        let total: i64 = bytes.iter().map(|&b| i64::from(self.width_of(b))).sum();
        total.clamp(0, u32::MAX.into()) as u32
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Bitmap Readback
// ─────────────────────────────────────────────────────────────────────────────

/// How the server lays out 1-bit images
#[derive(Debug, Clone, Copy)]
pub struct BitmapLayout {
    pub unit_bytes: usize,
    pub pad_bits: usize,
    pub lsb_bit_first: bool,
    pub lsb_byte_first: bool,
}

impl BitmapLayout {
    fn from_setup(setup: &Setup) -> Self {
        Self {
            unit_bytes: usize::from(setup.bitmap_format_scanline_unit / 8).max(1),
            pad_bits: usize::from(setup.bitmap_format_scanline_pad).max(8),
            lsb_bit_first: setup.bitmap_format_bit_order == ImageOrder::LSB_FIRST,
            lsb_byte_first: setup.image_byte_order == ImageOrder::LSB_FIRST,
        }
    }

    fn stride(&self, width: usize) -> usize {
        width.div_ceil(self.pad_bits) * self.pad_bits / 8
    }

    /// Call `set` for every pixel whose bit is 1
    pub fn decode(&self, data: &[u8], width: u16, height: u16, mut set: impl FnMut(i32, i32)) {
        let stride = self.stride(width.into());
        let unit_bits = self.unit_bytes * 8;

        for y in 0..usize::from(height) {
            for x in 0..usize::from(width) {
                let within = x % unit_bits;
                let mut byte = within / 8;
                if self.lsb_bit_first != self.lsb_byte_first {
                    byte = self.unit_bytes - 1 - byte;
                }
                let index = y * stride + (x / unit_bits) * self.unit_bytes + byte;
                let bit = if self.lsb_bit_first {
                    within % 8
                } else {
                    7 - within % 8
                };

                if data.get(index).is_some_and(|&b| (b >> bit) & 1 == 1) {
                    set(x as i32, y as i32);
                }
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// X11 Display
// ─────────────────────────────────────────────────────────────────────────────

/// Connection to an X server and the screen the overlay goes on
pub struct X11Display {
    conn: RustConnection,
    screen_num: usize,
    atoms: AtomCollection,
}

/// Core font loaded on the server
pub struct X11Font<'a> {
    resource: Resource<'a>,
    ascent: u32,
    descent: u32,
    widths: CharWidths,
}

impl X11Font<'_> {
    fn id(&self) -> Font {
        self.resource.id
    }
}

impl X11Display {
    /// Connect to the display named by `$DISPLAY`
    pub fn connect() -> Result<Self, PlatformError> {
        let (conn, screen_num) =
            x11rb::connect(None).map_err(|e| PlatformError::ConnectionFailed(e.to_string()))?;

        // Intern atoms
        let atoms = AtomCollection::new(&conn).map_err(other)?.reply().map_err(other)?;

        tracing::debug!(screen = screen_num, "connected to X server");
        Ok(Self {
            conn,
            screen_num,
            atoms,
        })
    }

    fn screen(&self) -> &Screen {
        &self.conn.setup().roots[self.screen_num]
    }
}

impl FontProvider for X11Display {
    type Font<'a> = X11Font<'a>;
    type Error = PlatformError;

    fn load(&self, descriptor: &str) -> Result<X11Font<'_>, PlatformError> {
        let id = self.conn.generate_id().map_err(other)?;
        self.conn
            .open_font(id, descriptor.as_bytes())
            .map_err(other)?
            .check()
            .map_err(|e| PlatformError::FontUnavailable(format!("{descriptor}: {e}")))?;
        let resource = Resource::new(&self.conn, ResourceKind::Font, id);

        let reply = self.conn.query_font(id).map_err(other)?.reply().map_err(other)?;

        Ok(X11Font {
            resource,
            ascent: reply.font_ascent.max(0) as u32,
            descent: reply.font_descent.max(0) as u32,
            widths: CharWidths::from_reply(&reply),
        })
    }

    fn measure(&self, font: &X11Font<'_>, text: &str) -> TextMetrics {
        TextMetrics {
            width: font.widths.text_width(&encode_latin1(text)),
            ascent: font.ascent,
            descent: font.descent,
        }
    }
}

impl GlyphRasterizer for X11Display {
    fn rasterize(
        &self,
        font: &X11Font<'_>,
        text: &str,
        origin: TextOrigin,
        mask: &mut VisibilityMask,
    ) -> Result<(), PlatformError> {
        if mask.width() == 0 || mask.height() == 0 {
            return Ok(());
        }
        let (width, height) = (clamp_extent(mask.width()), clamp_extent(mask.height()));

        let pixmap_id = self.conn.generate_id().map_err(other)?;
        self.conn
            .create_pixmap(1, pixmap_id, self.screen().root, width, height)
            .map_err(other)?;
        let pixmap = Resource::new(&self.conn, ResourceKind::Pixmap, pixmap_id);

        let gc_id = self.conn.generate_id().map_err(other)?;
        self.conn
            .create_gc(
                gc_id,
                pixmap.id,
                &CreateGCAux::new()
                    .foreground(0)
                    .font(font.id())
                    .graphics_exposures(0),
            )
            .map_err(other)?;
        let gc = Resource::new(&self.conn, ResourceKind::Gc, gc_id);

        // Clear, then draw the glyphs with 1 bits
        self.conn
            .poly_fill_rectangle(
                pixmap.id,
                gc.id,
                &[Rectangle {
                    x: 0,
                    y: 0,
                    width,
                    height,
                }],
            )
            .map_err(other)?;
        self.conn
            .change_gc(gc.id, &ChangeGCAux::new().foreground(1))
            .map_err(other)?;
        self.conn
            .poly_text8(
                pixmap.id,
                gc.id,
                clamp_coord(origin.x),
                clamp_coord(origin.y),
                &encode_text_items(&encode_latin1(text)),
            )
            .map_err(other)?;

        let image = self
            .conn
            .get_image(ImageFormat::XY_PIXMAP, pixmap.id, 0, 0, width, height, 1)
            .map_err(other)?
            .reply()
            .map_err(|e| PlatformError::BufferError(format!("mask readback failed: {e}")))?;

        let layout = BitmapLayout::from_setup(self.conn.setup());
        layout.decode(&image.data, width, height, |x, y| mask.mark(x, y));
        Ok(())
    }
}

impl OverlayPlatform for X11Display {
    type Surface<'a> = X11Window<'a>;

    fn screen_metrics(&self) -> ScreenMetrics {
        let screen = self.screen();
        ScreenMetrics {
            width: screen.width_in_pixels.into(),
            height: screen.height_in_pixels.into(),
        }
    }

    fn create_surface<'a>(
        &'a self,
        geometry: &WindowGeometry,
        font: &X11Font<'_>,
        color: Rgb,
    ) -> Result<X11Window<'a>, PlatformError> {
        let screen = self.screen();

        let window_id = self.conn.generate_id().map_err(other)?;
        let win_aux = CreateWindowAux::new()
            .background_pixel(screen.black_pixel)
            .override_redirect(1);

        self.conn
            .create_window(
                x11rb::COPY_DEPTH_FROM_PARENT,
                window_id,
                screen.root,
                clamp_coord(geometry.x),
                clamp_coord(geometry.y),
                clamp_extent(geometry.width),
                clamp_extent(geometry.height),
                0,
                WindowClass::INPUT_OUTPUT,
                x11rb::COPY_FROM_PARENT,
                &win_aux,
            )
            .map_err(other)?;
        let window = Resource::new(&self.conn, ResourceKind::Window, window_id);

        // Keep above other windows
        self.conn
            .change_property32(
                PropMode::REPLACE,
                window.id,
                self.atoms._NET_WM_STATE,
                self.atoms.ATOM,
                &[self.atoms._NET_WM_STATE_ABOVE],
            )
            .map_err(other)?;

        let gc_id = self.conn.generate_id().map_err(other)?;
        self.conn
            .create_gc(
                gc_id,
                window.id,
                &CreateGCAux::new().foreground(color.to_u32()).font(font.id()),
            )
            .map_err(other)?;
        let gc = Resource::new(&self.conn, ResourceKind::Gc, gc_id);

        Ok(X11Window {
            conn: &self.conn,
            gc,
            window,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// X11 Window
// ─────────────────────────────────────────────────────────────────────────────

/// Overlay window and its drawing context
pub struct X11Window<'a> {
    conn: &'a RustConnection,
    // Field order is drop order: the context goes before its window
    gc: Resource<'a>,
    window: Resource<'a>,
}

impl OverlaySurface for X11Window<'_> {
    fn apply_mask(&mut self, mask: &VisibilityMask) -> Result<(), PlatformError> {
        self.conn
            .shape_query_version()
            .map_err(|_| PlatformError::UnsupportedFeature("Shape extension".into()))?
            .reply()
            .map_err(|_| PlatformError::UnsupportedFeature("Shape extension".into()))?;

        let rects: Vec<Rectangle> = mask
            .spans()
            .into_iter()
            .map(|s| Rectangle {
                x: clamp_coord(s.x as i32),
                y: clamp_coord(s.y as i32),
                width: clamp_extent(s.len),
                height: 1,
            })
            .collect();

        if rects.is_empty() {
            // Nothing visible at all
            self.conn
                .shape_rectangles(
                    shape::SO::SET,
                    shape::SK::BOUNDING,
                    ClipOrdering::UNSORTED,
                    self.window.id,
                    0,
                    0,
                    &[],
                )
                .map_err(other)?;
        }
        for (i, chunk) in rects.chunks(SHAPE_CHUNK).enumerate() {
            let op = if i == 0 { shape::SO::SET } else { shape::SO::UNION };
            self.conn
                .shape_rectangles(
                    op,
                    shape::SK::BOUNDING,
                    ClipOrdering::YX_SORTED,
                    self.window.id,
                    0,
                    0,
                    chunk,
                )
                .map_err(other)?;
        }

        tracing::debug!(rectangles = rects.len(), "applied bounding shape");
        Ok(())
    }

    fn map(&mut self) -> Result<(), PlatformError> {
        self.conn.map_window(self.window.id).map_err(other)?;
        Ok(())
    }

    fn draw_text(&mut self, text: &str, origin: TextOrigin) -> Result<(), PlatformError> {
        self.conn
            .poly_text8(
                self.window.id,
                self.gc.id,
                clamp_coord(origin.x),
                clamp_coord(origin.y),
                &encode_text_items(&encode_latin1(text)),
            )
            .map_err(other)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), PlatformError> {
        self.conn.flush().map_err(other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_latin1() {
        assert_eq!(encode_latin1("abc"), b"abc");
        assert_eq!(encode_latin1("café"), vec![b'c', b'a', b'f', 0xE9]);
        assert_eq!(encode_latin1("a→b"), b"a?b");
    }

    #[test]
    fn test_encode_text_items() {
        assert_eq!(encode_text_items(b"abc"), vec![3, 0, b'a', b'b', b'c']);
        assert!(encode_text_items(b"").is_empty());

        let long = vec![b'x'; 300];
        let items = encode_text_items(&long);
        assert_eq!(items.len(), 300 + 4);
        assert_eq!(items[0], 254);
        assert_eq!(items[1], 0);
        assert_eq!(items[256], 46);
    }

    fn ascii_widths() -> CharWidths {
        // 'a'..='c' with widths 5, 6, absent; default char 'a'
        CharWidths {
            first_char: u16::from(b'a'),
            widths: vec![Some(5), Some(6), None],
            default_char: u16::from(b'a'),
            uniform_width: 9,
        }
    }

    #[test]
    fn test_text_width_sums_advances() {
        let widths = ascii_widths();
        assert_eq!(widths.text_width(b"ab"), 11);
        assert_eq!(widths.text_width(b""), 0);
    }

    #[test]
    fn test_missing_chars_use_default_char() {
        let widths = ascii_widths();
        // 'c' is absent, 'z' is out of range; both fall back to 'a'
        assert_eq!(widths.text_width(b"c"), 5);
        assert_eq!(widths.text_width(b"z"), 5);

        let no_default = CharWidths {
            default_char: 0,
            ..ascii_widths()
        };
        assert_eq!(no_default.text_width(b"zb"), 6);
    }

    #[test]
    fn test_fonts_without_char_table_are_uniform() {
        let widths = CharWidths {
            widths: Vec::new(),
            ..ascii_widths()
        };
        assert_eq!(widths.text_width(b"hello"), 45);
    }

    fn layout(lsb_bit_first: bool, lsb_byte_first: bool) -> BitmapLayout {
        BitmapLayout {
            unit_bytes: 4,
            pad_bits: 32,
            lsb_bit_first,
            lsb_byte_first,
        }
    }

    fn decode(layout: BitmapLayout, data: &[u8], width: u16, height: u16) -> Vec<(i32, i32)> {
        let mut set = Vec::new();
        layout.decode(data, width, height, |x, y| set.push((x, y)));
        set
    }

    #[test]
    fn test_decode_lsb_first() {
        // Two rows, 32-bit padded: pixel 0 and 9 on row 0, pixel 2 on row 1
        let data = [0b0000_0001, 0b0000_0010, 0, 0, 0b0000_0100, 0, 0, 0];
        assert_eq!(
            decode(layout(true, true), &data, 10, 2),
            vec![(0, 0), (9, 0), (2, 1)]
        );
    }

    #[test]
    fn test_decode_msb_first() {
        let data = [0b1000_0000, 0b0100_0000, 0, 0, 0b0010_0000, 0, 0, 0];
        assert_eq!(
            decode(layout(false, false), &data, 10, 2),
            vec![(0, 0), (9, 0), (2, 1)]
        );
    }

    #[test]
    fn test_decode_mixed_bit_and_byte_order() {
        // MSB bit order with LSB byte order: pixel 0 is the top bit of the last byte of the unit
        let data = [0, 0, 0, 0b1000_0000];
        assert_eq!(decode(layout(false, true), &data, 8, 1), vec![(0, 0)]);
    }

    #[test]
    fn test_decode_ignores_short_data() {
        assert_eq!(decode(layout(true, true), &[0xFF], 16, 4).len(), 8);
    }
}

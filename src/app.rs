//! Overlay lifecycle
//!
//! `present` runs one display cycle against any [`OverlayPlatform`]:
//! resolve the font, size the window, optionally build the glyph mask, then
//! create, map and draw the window before handing control to `hold`.
//! Every backend resource is a guard, so returning (normally or via `?`)
//! tears them down in reverse order of acquisition.

use text_display_core::{ResolvedFont, build_mask, compute_geometry, resolve_font, text_origin};
use text_display_overlay::{OverlayPlatform, OverlaySurface, PreviewPlatform, SoftwareRenderer};
use text_display_types::DisplayConfig;
use tracing::info;

use crate::cli::Cli;
use crate::error::AppError;

/// Run the program for parsed arguments.
pub fn run(cli: &Cli) -> Result<(), AppError> {
    let config = cli.to_config()?;

    match &cli.preview {
        Some(path) => {
            let platform = PreviewPlatform::new(SoftwareRenderer::new(), cli.screen, path.clone());
            present(&platform, &config, |_| {})?;
            println!("Wrote preview of \"{}\" to {}", config.text, path.display());
            Ok(())
        }
        None => run_native(&config),
    }
}

#[cfg(all(unix, not(target_os = "macos")))]
fn run_native(config: &DisplayConfig) -> Result<(), AppError> {
    let platform = text_display_overlay::NativeOverlay::connect().map_err(AppError::Connection)?;
    present(&platform, config, |config| {
        println!(
            "Displaying \"{}\" for {} seconds...",
            config.text, config.duration_secs
        );
        std::thread::sleep(std::time::Duration::from_secs(config.duration_secs));
    })
}

#[cfg(not(all(unix, not(target_os = "macos"))))]
fn run_native(_config: &DisplayConfig) -> Result<(), AppError> {
    Err(AppError::Connection(
        text_display_overlay::PlatformError::UnsupportedFeature(
            "overlay windows need an X11 display; use --preview instead".to_string(),
        ),
    ))
}

/// Show `config` on `platform`, call `hold` while it is visible, then tear down.
pub fn present<P: OverlayPlatform>(
    platform: &P,
    config: &DisplayConfig,
    hold: impl FnOnce(&DisplayConfig),
) -> Result<(), AppError> {
    let screen = platform.screen_metrics();

    let ResolvedFont {
        font,
        descriptor,
        fell_back,
    } = resolve_font(platform, &config.font, config.font_size)?;

    let metrics = platform.measure(&font, &config.text);
    let geometry = compute_geometry(
        &metrics,
        &screen,
        config.margin_x,
        config.margin_y,
        config.placement,
    );
    let origin = text_origin(&metrics, config.margin_x, config.margin_y);
    info!(
        %descriptor,
        fell_back,
        placement = %config.placement,
        x = geometry.x,
        y = geometry.y,
        width = geometry.width,
        height = geometry.height,
        "overlay geometry"
    );

    let mask = if config.transparent {
        Some(build_mask(platform, &geometry, &config.text, &font, origin)?)
    } else {
        None
    };

    let mut surface = platform.create_surface(&geometry, &font, config.color)?;
    if let Some(mask) = &mask {
        surface.apply_mask(mask)?;
    }
    surface.map()?;
    surface.draw_text(&config.text, origin)?;
    surface.flush()?;

    hold(config);

    info!("closing overlay");
    Ok(())
}

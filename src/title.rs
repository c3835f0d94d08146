//! Curved title rasterizer.
//!
//! Lays a short title string along a circular arc: each character is rendered
//! into its own transparent tile, rotated to the local arc tangent, and
//! composited onto the output canvas. Geometry is identical for the dark and
//! light color passes so the two variants register pixel-perfectly.

use std::path::{Path, PathBuf};

use image::{Rgba, RgbaImage};
use tracing::{debug, info, warn};

use crate::{
    config::{ContrastColors, TitleStyle},
    font::TitleFont,
    raster::{composite_over, hex_rgba, rotate_about_center, save_png},
    slug::kebab_slug,
};

/// Curvature magnitudes below this are substituted to keep the arc radius
/// finite; curvature 0 therefore renders a near-flat line instead of erroring.
const CURVATURE_EPSILON: f64 = 1e-3;

/// Render `text` along an arc into a transparent canvas.
///
/// Negative curvature bows the text downward, positive upward. The arc center
/// sits `style.vertical_offset` pixels below the canvas midpoint.
pub fn draw_curved_text(
    font: &TitleFont,
    text: &str,
    style: &TitleStyle,
    color: Rgba<u8>,
) -> RgbaImage {
    let (w, h) = style.canvas_size();
    let mut canvas = RgbaImage::from_pixel(w, h, Rgba([0, 0, 0, 0]));

    let px = style.font_size;
    let center_x = f64::from(w) / 2.0;
    let center_y = f64::from(h) / 2.0 + f64::from(style.vertical_offset);

    let text_width: f64 = text.chars().map(|c| f64::from(font.advance(c, px))).sum();
    // Degenerate inputs (empty string, all-zero advances) keep a tiny width
    // so the angle math below stays finite.
    let text_width = text_width.max(1e-6);

    let magnitude = style.curvature.abs().max(CURVATURE_EPSILON);
    let radius = text_width / (2.0 * std::f64::consts::PI * magnitude);
    let vertical_sign = if style.curvature < 0.0 { -1.0 } else { 1.0 };

    debug!(text, text_width, radius, "curved text layout");

    let mut current_x = -text_width / 2.0;
    for ch in text.chars() {
        let advance = f64::from(font.advance(ch, px));
        let angle = (current_x + advance / 2.0) / radius;

        let x = center_x + radius * angle.sin();
        let y = center_y + radius * (1.0 - angle.cos()) * vertical_sign;

        let tile = font.glyph_tile(ch, px, color);
        let rotated = rotate_about_center(&tile, angle.to_degrees());
        let half = i64::from(tile.width()) / 2;
        composite_over(&mut canvas, &rotated, x as i64 - half, y as i64 - half);

        current_x += advance;
    }

    canvas
}

/// Saved dark/light title rasters for one product.
#[derive(Clone, Debug)]
pub struct TitleArtifacts {
    pub slug: String,
    pub title: String,
    pub dark: Option<PathBuf>,
    pub light: Option<PathBuf>,
}

impl TitleArtifacts {
    pub fn both_rendered(&self) -> bool {
        self.dark.is_some() && self.light.is_some()
    }
}

/// Deterministic output paths for a product's title rasters.
pub fn title_paths(slug: &str, out_dir: &Path) -> (PathBuf, PathBuf) {
    (
        out_dir.join(format!("{slug}_title_dark.png")),
        out_dir.join(format!("{slug}_title_light.png")),
    )
}

/// Render and save the dark and light title variants.
///
/// A failure on one side is logged and leaves that entry `None`; the sibling
/// render still runs.
pub fn render_title_pair(
    font: &TitleFont,
    title: &str,
    style: &TitleStyle,
    colors: &ContrastColors,
    out_dir: &Path,
) -> TitleArtifacts {
    let slug = kebab_slug(title);
    let (dark_path, light_path) = title_paths(&slug, out_dir);

    info!(title, slug = %slug, "rendering curved title pair");

    let passes = [
        (&colors.dark_text, dark_path),
        (&colors.light_text, light_path),
    ];

    let mut saved: [Option<PathBuf>; 2] = [None, None];
    for (slot, (hex, path)) in saved.iter_mut().zip(passes) {
        let color = match hex_rgba(hex) {
            Ok(c) => c,
            Err(e) => {
                warn!(hex = %hex, error = %e, "skipping title pass with invalid color");
                continue;
            }
        };
        let img = draw_curved_text(font, title, style, color);
        match save_png(&img, &path) {
            Ok(()) => *slot = Some(path),
            Err(e) => warn!(path = %path.display(), error = %e, "title save failed"),
        }
    }

    let [dark, light] = saved;
    TitleArtifacts {
        slug,
        title: title.to_string(),
        dark,
        light,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn style() -> TitleStyle {
        TitleStyle {
            font_size: 40.0,
            canvas_width: 600,
            canvas_height: 200,
            curvature: -0.6,
            vertical_offset: 10,
            ..TitleStyle::default()
        }
    }

    fn inked(img: &RgbaImage) -> usize {
        img.pixels().filter(|p| p.0[3] > 0).count()
    }

    #[test]
    fn output_matches_canvas_size_and_has_ink() {
        let img = draw_curved_text(
            &TitleFont::Builtin,
            "SPETTRALE",
            &style(),
            Rgba([17, 17, 17, 255]),
        );
        assert_eq!(img.dimensions(), (600, 200));
        assert!(inked(&img) > 0);
    }

    #[test]
    fn zero_curvature_does_not_panic_and_differs_from_curved() {
        let mut flat_style = style();
        flat_style.curvature = 0.0;
        let flat = draw_curved_text(
            &TitleFont::Builtin,
            "CAVALLO",
            &flat_style,
            Rgba([0, 0, 0, 255]),
        );
        let curved = draw_curved_text(
            &TitleFont::Builtin,
            "CAVALLO",
            &style(),
            Rgba([0, 0, 0, 255]),
        );
        assert!(inked(&flat) > 0);
        assert_ne!(flat.as_raw(), curved.as_raw());
    }

    #[test]
    fn empty_text_renders_blank_canvas() {
        let img = draw_curved_text(&TitleFont::Builtin, "", &style(), Rgba([0, 0, 0, 255]));
        assert_eq!(inked(&img), 0);
    }

    #[test]
    fn dark_and_light_share_geometry() {
        let dark = draw_curved_text(
            &TitleFont::Builtin,
            "LUNA",
            &style(),
            Rgba([17, 17, 17, 255]),
        );
        let light = draw_curved_text(
            &TitleFont::Builtin,
            "LUNA",
            &style(),
            Rgba([255, 255, 255, 255]),
        );
        let dark_alpha: Vec<u8> = dark.pixels().map(|p| p.0[3]).collect();
        let light_alpha: Vec<u8> = light.pixels().map(|p| p.0[3]).collect();
        assert_eq!(dark_alpha, light_alpha);
    }

    #[test]
    fn pair_render_writes_both_files() {
        let dir = tempfile::tempdir().unwrap();
        let artifacts = render_title_pair(
            &TitleFont::Builtin,
            "Cavallo Spettrale",
            &style(),
            &ContrastColors::default(),
            dir.path(),
        );
        assert_eq!(artifacts.slug, "cavallo-spettrale");
        assert!(artifacts.both_rendered());
        assert!(artifacts.dark.as_ref().unwrap().is_file());
        assert!(
            artifacts
                .light
                .as_ref()
                .unwrap()
                .ends_with("cavallo-spettrale_title_light.png")
        );
    }
}

//! Raster primitives shared by the title renderer and the canvas composer:
//! straight-alpha RGBA buffers from the `image` crate, fixed-point `over`
//! compositing, bilinear rotation, and typed file probing.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use image::{Rgba, RgbaImage};

use crate::error::{MonoprintError, MonoprintResult};

/// Outcome of probing a layer input before any decode is attempted.
///
/// Optional layers turn `Missing`/`Unreadable` into a skip; required layers
/// turn them into a composition failure.
#[derive(Debug)]
pub enum LayerSource {
    Ready(RgbaImage),
    Missing(PathBuf),
    Unreadable { path: PathBuf, reason: String },
}

impl LayerSource {
    pub fn is_ready(&self) -> bool {
        matches!(self, LayerSource::Ready(_))
    }

    /// Human-readable skip reason for the non-ready states.
    pub fn skip_reason(&self) -> Option<String> {
        match self {
            LayerSource::Ready(_) => None,
            LayerSource::Missing(path) => Some(format!("missing file '{}'", path.display())),
            LayerSource::Unreadable { path, reason } => {
                Some(format!("unreadable file '{}': {reason}", path.display()))
            }
        }
    }
}

/// Check existence, then decode. Decode errors become `Unreadable`, not panics.
pub fn probe_layer(path: Option<&Path>) -> LayerSource {
    let Some(path) = path else {
        return LayerSource::Missing(PathBuf::from("<unset>"));
    };
    if !path.is_file() {
        return LayerSource::Missing(path.to_path_buf());
    }
    match image::open(path) {
        Ok(img) => LayerSource::Ready(img.to_rgba8()),
        Err(e) => LayerSource::Unreadable {
            path: path.to_path_buf(),
            reason: e.to_string(),
        },
    }
}

/// Decode a required image into straight-alpha RGBA.
pub fn load_rgba(path: &Path) -> MonoprintResult<RgbaImage> {
    let img = image::open(path).with_context(|| format!("decode image '{}'", path.display()))?;
    Ok(img.to_rgba8())
}

/// Encode as PNG, creating parent directories first.
pub fn save_png(img: &RgbaImage, path: &Path) -> MonoprintResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    img.save_with_format(path, image::ImageFormat::Png)
        .with_context(|| format!("write png '{}'", path.display()))?;
    Ok(())
}

/// Straight-alpha source-over for a single pixel.
pub fn over(dst: [u8; 4], src: [u8; 4]) -> [u8; 4] {
    let sa = u32::from(src[3]);
    if sa == 0 {
        return dst;
    }
    if sa == 255 {
        return src;
    }

    let da = u32::from(dst[3]);
    let inv = 255 - sa;
    // Output alpha at 255x scale: oa*255 = sa*255 + da*inv.
    let oa255 = sa * 255 + da * inv;
    if oa255 == 0 {
        return [0, 0, 0, 0];
    }

    let mut out = [0u8; 4];
    for i in 0..3 {
        let sc = u32::from(src[i]);
        let dc = u32::from(dst[i]);
        let num = sc * sa * 255 + dc * da * inv;
        out[i] = ((num + oa255 / 2) / oa255) as u8;
    }
    out[3] = ((oa255 + 127) / 255) as u8;
    out
}

/// Alpha-composite `src` onto `canvas` with its top-left corner at `(x, y)`.
/// Pixels falling outside the canvas are clipped.
pub fn composite_over(canvas: &mut RgbaImage, src: &RgbaImage, x: i64, y: i64) {
    let (cw, ch) = (i64::from(canvas.width()), i64::from(canvas.height()));
    for (sx, sy, px) in src.enumerate_pixels() {
        if px.0[3] == 0 {
            continue;
        }
        let dx = x + i64::from(sx);
        let dy = y + i64::from(sy);
        if dx < 0 || dy < 0 || dx >= cw || dy >= ch {
            continue;
        }
        let dst = canvas.get_pixel_mut(dx as u32, dy as u32);
        dst.0 = over(dst.0, px.0);
    }
}

/// Rotate counterclockwise by `degrees` about the image center, keeping the
/// original dimensions. Samples bilinearly in premultiplied space so
/// transparent surroundings do not bleed dark fringes into the glyph edge.
pub fn rotate_about_center(src: &RgbaImage, degrees: f64) -> RgbaImage {
    let (w, h) = src.dimensions();
    let mut out = RgbaImage::from_pixel(w, h, Rgba([0, 0, 0, 0]));
    if w == 0 || h == 0 {
        return out;
    }

    let theta = degrees.to_radians();
    let (sin, cos) = theta.sin_cos();
    let cx = f64::from(w - 1) / 2.0;
    let cy = f64::from(h - 1) / 2.0;

    for (x, y, px) in out.enumerate_pixels_mut() {
        let dx = f64::from(x) - cx;
        let dy = f64::from(y) - cy;
        // Inverse map of a counterclockwise screen-space rotation.
        let sx = cx + cos * dx - sin * dy;
        let sy = cy + sin * dx + cos * dy;
        px.0 = sample_bilinear(src, sx, sy);
    }
    out
}

fn sample_bilinear(src: &RgbaImage, x: f64, y: f64) -> [u8; 4] {
    let (w, h) = (i64::from(src.width()), i64::from(src.height()));
    let x0 = x.floor() as i64;
    let y0 = y.floor() as i64;
    let fx = x - x0 as f64;
    let fy = y - y0 as f64;

    let fetch = |ix: i64, iy: i64| -> [f64; 4] {
        if ix < 0 || iy < 0 || ix >= w || iy >= h {
            return [0.0; 4];
        }
        let p = src.get_pixel(ix as u32, iy as u32).0;
        let a = f64::from(p[3]);
        // Premultiplied so fully-transparent neighbors carry no color weight.
        [
            f64::from(p[0]) * a / 255.0,
            f64::from(p[1]) * a / 255.0,
            f64::from(p[2]) * a / 255.0,
            a,
        ]
    };

    let p00 = fetch(x0, y0);
    let p10 = fetch(x0 + 1, y0);
    let p01 = fetch(x0, y0 + 1);
    let p11 = fetch(x0 + 1, y0 + 1);

    let mut acc = [0.0f64; 4];
    for i in 0..4 {
        let top = p00[i] * (1.0 - fx) + p10[i] * fx;
        let bot = p01[i] * (1.0 - fx) + p11[i] * fx;
        acc[i] = top * (1.0 - fy) + bot * fy;
    }

    let a = acc[3];
    if a <= 0.0 {
        return [0, 0, 0, 0];
    }
    [
        ((acc[0] * 255.0 / a).round().clamp(0.0, 255.0)) as u8,
        ((acc[1] * 255.0 / a).round().clamp(0.0, 255.0)) as u8,
        ((acc[2] * 255.0 / a).round().clamp(0.0, 255.0)) as u8,
        (a.round().clamp(0.0, 255.0)) as u8,
    ]
}

/// Parse `#RRGGBB` (leading `#` optional) into opaque RGBA.
pub fn hex_rgba(s: &str) -> MonoprintResult<Rgba<u8>> {
    let hex = s.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return Err(MonoprintError::validation(format!("invalid hex color '{s}'")));
    }
    let mut channels = [0u8; 3];
    for (i, channel) in channels.iter_mut().enumerate() {
        *channel = u8::from_str_radix(&hex[2 * i..2 * i + 2], 16)
            .map_err(|_| MonoprintError::validation(format!("invalid hex color '{s}'")))?;
    }
    Ok(Rgba([channels[0], channels[1], channels[2], 255]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn over_src_transparent_is_noop() {
        let dst = [10, 20, 30, 40];
        assert_eq!(over(dst, [255, 255, 255, 0]), dst);
    }

    #[test]
    fn over_src_opaque_replaces_dst() {
        let src = [255, 0, 0, 255];
        assert_eq!(over([0, 0, 0, 255], src), src);
    }

    #[test]
    fn over_onto_transparent_keeps_src() {
        let src = [100, 110, 120, 200];
        assert_eq!(over([0, 0, 0, 0], src), src);
    }

    #[test]
    fn over_half_alpha_blends() {
        let out = over([0, 0, 0, 255], [255, 255, 255, 128]);
        assert_eq!(out[3], 255);
        assert!(out[0] > 120 && out[0] < 136, "got {}", out[0]);
    }

    #[test]
    fn composite_clips_out_of_bounds() {
        let mut canvas = RgbaImage::from_pixel(4, 4, Rgba([0, 0, 0, 0]));
        let src = RgbaImage::from_pixel(3, 3, Rgba([255, 0, 0, 255]));
        composite_over(&mut canvas, &src, -1, -1);
        assert_eq!(canvas.get_pixel(0, 0).0, [255, 0, 0, 255]);
        assert_eq!(canvas.get_pixel(2, 2).0, [0, 0, 0, 0]);
    }

    #[test]
    fn rotate_zero_degrees_is_identity() {
        let mut src = RgbaImage::from_pixel(5, 5, Rgba([0, 0, 0, 0]));
        src.put_pixel(1, 2, Rgba([200, 10, 10, 255]));
        let out = rotate_about_center(&src, 0.0);
        assert_eq!(out.get_pixel(1, 2).0, [200, 10, 10, 255]);
    }

    #[test]
    fn rotate_quarter_turn_moves_pixel_counterclockwise() {
        let mut src = RgbaImage::from_pixel(5, 5, Rgba([0, 0, 0, 0]));
        // Right of center; a 90 degree counterclockwise turn puts it above.
        src.put_pixel(4, 2, Rgba([0, 255, 0, 255]));
        let out = rotate_about_center(&src, 90.0);
        assert_eq!(out.get_pixel(2, 0).0, [0, 255, 0, 255]);
        assert_eq!(out.get_pixel(4, 2).0[3], 0);
    }

    #[test]
    fn probe_reports_missing_and_unset() {
        assert!(!probe_layer(None).is_ready());
        let missing = probe_layer(Some(Path::new("/no/such/file.png")));
        assert!(matches!(missing, LayerSource::Missing(_)));
    }

    #[test]
    fn hex_parses_and_rejects() {
        assert_eq!(hex_rgba("#111111").unwrap().0, [17, 17, 17, 255]);
        assert_eq!(hex_rgba("FFFFFF").unwrap().0, [255, 255, 255, 255]);
        assert!(hex_rgba("#12345").is_err());
        assert!(hex_rgba("#1234zz").is_err());
    }
}

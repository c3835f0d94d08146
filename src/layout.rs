//! Pure placement geometry for the canvas composer: percentage-driven
//! aspect-preserving resize, anchor positioning, and safe-area clamping.
//! All functions are free of I/O and deterministic.

use image::RgbaImage;
use image::imageops::{self, FilterType};

use crate::config::LayoutRule;

/// Horizontal anchor for a placed element.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Alignment {
    #[default]
    Center,
    /// 10% in from the left canvas edge.
    Left,
    /// 10% in from the right canvas edge.
    Right,
}

/// Resize according to the rule's single percentage dimension, deriving the
/// other from the source aspect ratio. Rules with no dimension return the
/// image at native size. Lanczos3 keeps edges print-smooth.
pub fn resize_to_rule(img: &RgbaImage, rule: &LayoutRule, canvas: (u32, u32)) -> RgbaImage {
    let (canvas_w, canvas_h) = canvas;
    let (src_w, src_h) = img.dimensions();

    let (target_w, target_h) = if let Some(pct) = rule.width_percent {
        let w = (f64::from(canvas_w) * pct / 100.0) as u32;
        let h = (f64::from(w) * f64::from(src_h) / f64::from(src_w)) as u32;
        (w, h)
    } else if let Some(pct) = rule.height_percent {
        let h = (f64::from(canvas_h) * pct / 100.0) as u32;
        let w = (f64::from(h) * f64::from(src_w) / f64::from(src_h)) as u32;
        (w, h)
    } else {
        return img.clone();
    };

    let target_w = target_w.max(1);
    let target_h = target_h.max(1);
    if (target_w, target_h) == (src_w, src_h) {
        return img.clone();
    }
    imageops::resize(img, target_w, target_h, FilterType::Lanczos3)
}

/// Top-left paste position for an element on a canvas.
///
/// Vertical: `top_percent` of the canvas height when set, else centered.
/// Horizontal: centered unless an edge alignment offsets it 10% in.
pub fn position_element(
    canvas: (u32, u32),
    element: (u32, u32),
    rule: &LayoutRule,
    alignment: Alignment,
) -> (i64, i64) {
    let (canvas_w, canvas_h) = (i64::from(canvas.0), i64::from(canvas.1));
    let (elem_w, elem_h) = (i64::from(element.0), i64::from(element.1));

    let y = match rule.top_percent {
        Some(pct) => (f64::from(canvas.1) * pct / 100.0) as i64,
        None => (canvas_h - elem_h).div_euclid(2),
    };

    let x = match alignment {
        Alignment::Center => (canvas_w - elem_w).div_euclid(2),
        Alignment::Left => (f64::from(canvas.0) * 0.1) as i64,
        Alignment::Right => (f64::from(canvas.0) * 0.9) as i64 - elem_w,
    };

    (x, y)
}

/// Clamp a position so the element's bounding box stays inside the safe area.
///
/// When the element is larger than the safe area the position collapses to
/// `margin` and the element overflows on the far side; that overflow is
/// accepted rather than treated as an error.
pub fn clamp_to_safe_area(
    position: (i64, i64),
    element: (u32, u32),
    canvas: (u32, u32),
    margin: u32,
) -> (i64, i64) {
    let margin = i64::from(margin);
    let max_x = i64::from(canvas.0) - i64::from(element.0) - margin;
    let max_y = i64::from(canvas.1) - i64::from(element.1) - margin;
    (
        position.0.min(max_x).max(margin),
        position.1.min(max_y).max(margin),
    )
}

//! QA checks for source artwork and generated compositions.
//!
//! Checks accumulate into a report instead of short-circuiting, so a single
//! pass surfaces every problem with a file.

use std::path::Path;

use tracing::info;

use crate::config::{CanvasTemplate, ImageRequirements};

/// Marketplace uploads above this size tend to time out; warn early.
const COMPOSITION_SIZE_WARN_BYTES: u64 = 50 * 1024 * 1024;

#[derive(Clone, Debug, Default)]
pub struct QaReport {
    pub valid: bool,
    pub issues: Vec<String>,
    pub warnings: Vec<String>,
    pub file_size_bytes: u64,
}

impl QaReport {
    fn new() -> Self {
        Self {
            valid: true,
            ..Self::default()
        }
    }

    fn issue(&mut self, msg: impl Into<String>) {
        self.valid = false;
        self.issues.push(msg.into());
    }

    fn warning(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }
}

/// Check a source artwork file against the intake requirements:
/// PNG encoding, alpha channel, minimum long-side dimension, size cap.
pub fn validate_artwork(path: &Path, requirements: &ImageRequirements) -> QaReport {
    let mut report = QaReport::new();

    let Ok(meta) = std::fs::metadata(path) else {
        report.issue(format!("file not found: '{}'", path.display()));
        return report;
    };
    report.file_size_bytes = meta.len();

    if meta.len() > requirements.max_file_size {
        report.issue(format!(
            "file size {} exceeds limit {}",
            meta.len(),
            requirements.max_file_size
        ));
    }

    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            report.issue(format!("unreadable: {e}"));
            return report;
        }
    };

    match image::guess_format(&bytes) {
        Ok(image::ImageFormat::Png) => {}
        Ok(other) => report.issue(format!("format {other:?}, PNG required")),
        Err(e) => {
            report.issue(format!("not a recognized image: {e}"));
            return report;
        }
    }

    let img = match image::load_from_memory(&bytes) {
        Ok(img) => img,
        Err(e) => {
            report.issue(format!("decode failed: {e}"));
            return report;
        }
    };

    let (w, h) = (img.width(), img.height());
    if w.max(h) < requirements.min_dimension {
        report.issue(format!(
            "long side {}px below minimum {}px",
            w.max(h),
            requirements.min_dimension
        ));
    }

    if requirements.require_alpha && !img.color().has_alpha() {
        report.issue("no alpha channel; transparent background required");
    }

    info!(
        path = %path.display(),
        valid = report.valid,
        "artwork validation"
    );
    report
}

/// Check a generated composition: exact template dimensions, RGBA encoding,
/// upload-size warning.
pub fn validate_composition(path: &Path, template: &CanvasTemplate) -> QaReport {
    let mut report = QaReport::new();

    let Ok(meta) = std::fs::metadata(path) else {
        report.issue(format!("file not found: '{}'", path.display()));
        return report;
    };
    report.file_size_bytes = meta.len();

    if meta.len() > COMPOSITION_SIZE_WARN_BYTES {
        report.warning(format!(
            "large file: {:.1} MB",
            meta.len() as f64 / (1024.0 * 1024.0)
        ));
    }

    let img = match image::open(path) {
        Ok(img) => img,
        Err(e) => {
            report.issue(format!("decode failed: {e}"));
            return report;
        }
    };

    let actual = (img.width(), img.height());
    let expected = template.size();
    if actual != expected {
        report.issue(format!(
            "dimensions {}x{}, expected {}x{}",
            actual.0, actual.1, expected.0, expected.1
        ));
    }

    if !img.color().has_alpha() {
        report.warning("encoding has no alpha channel; RGBA expected");
    }

    info!(
        path = %path.display(),
        valid = report.valid,
        "composition validation"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn png_at(dir: &Path, name: &str, w: u32, h: u32) -> std::path::PathBuf {
        let path = dir.join(name);
        RgbaImage::from_pixel(w, h, Rgba([1, 2, 3, 128]))
            .save(&path)
            .unwrap();
        path
    }

    #[test]
    fn artwork_missing_file_is_invalid() {
        let report = validate_artwork(
            Path::new("/no/such/art.png"),
            &ImageRequirements::default(),
        );
        assert!(!report.valid);
    }

    #[test]
    fn artwork_below_min_dimension_is_flagged() {
        let dir = tempfile::tempdir().unwrap();
        let path = png_at(dir.path(), "small.png", 64, 64);
        let report = validate_artwork(&path, &ImageRequirements::default());
        assert!(!report.valid);
        assert!(report.issues.iter().any(|i| i.contains("below minimum")));
    }

    #[test]
    fn artwork_meeting_requirements_passes() {
        let dir = tempfile::tempdir().unwrap();
        let path = png_at(dir.path(), "ok.png", 1100, 900);
        let report = validate_artwork(&path, &ImageRequirements::default());
        assert!(report.valid, "issues: {:?}", report.issues);
    }

    #[test]
    fn artwork_rejects_non_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("art.jpg");
        image::DynamicImage::ImageRgba8(RgbaImage::from_pixel(1100, 900, Rgba([1, 2, 3, 255])))
            .to_rgb8()
            .save(&path)
            .unwrap();
        let report = validate_artwork(&path, &ImageRequirements::default());
        assert!(!report.valid);
        assert!(report.issues.iter().any(|i| i.contains("PNG required")));
    }

    #[test]
    fn composition_dimension_mismatch_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let path = png_at(dir.path(), "comp.png", 100, 100);
        let template = CanvasTemplate {
            width: 120,
            height: 160,
            dpi: 300,
            safe_margin: 5,
        };
        let report = validate_composition(&path, &template);
        assert!(!report.valid);
    }

    #[test]
    fn composition_exact_dimensions_pass() {
        let dir = tempfile::tempdir().unwrap();
        let path = png_at(dir.path(), "comp.png", 120, 160);
        let template = CanvasTemplate {
            width: 120,
            height: 160,
            dpi: 300,
            safe_margin: 5,
        };
        let report = validate_composition(&path, &template);
        assert!(report.valid, "issues: {:?}", report.issues);
        assert!(report.file_size_bytes > 0);
    }
}

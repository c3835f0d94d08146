//! Canvas composer: deterministic placement of pre-rendered elements onto
//! fixed-size transparent print canvases.
//!
//! Every output raster has exactly its template's pixel dimensions; elements
//! are resized by percentage rules, positioned, clamped into the safe area
//! and pasted bottom-up in a fixed z-order. Optional layers degrade to a
//! recorded skip instead of failing the composition.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use image::{Rgba, RgbaImage};
use kurbo::Rect;
use tracing::{debug, info, warn};

use crate::{
    config::{CanvasTemplate, LayoutConfig, LayoutRule, Templates},
    error::{MonoprintError, MonoprintResult},
    layout::{Alignment, clamp_to_safe_area, position_element, resize_to_rule},
    raster::{LayerSource, composite_over, probe_layer, save_png},
};

/// Physical print location.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Placement {
    Front,
    Back,
    Sleeve,
}

/// Element slot within a placement.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    Artwork,
    Title,
    Wordmark,
    Logo,
}

/// The closed set of placement-variant outputs produced per product.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    FrontLight,
    FrontDark,
    Back,
    SleeveDark,
    SleeveLight,
}

impl Variant {
    pub const ALL: [Variant; 5] = [
        Variant::FrontLight,
        Variant::FrontDark,
        Variant::Back,
        Variant::SleeveDark,
        Variant::SleeveLight,
    ];

    pub fn placement(self) -> Placement {
        match self {
            Variant::FrontLight | Variant::FrontDark => Placement::Front,
            Variant::Back => Placement::Back,
            Variant::SleeveDark | Variant::SleeveLight => Placement::Sleeve,
        }
    }

    pub fn suffix(self) -> &'static str {
        match self {
            Variant::FrontLight => "front_light",
            Variant::FrontDark => "front_dark",
            Variant::Back => "back",
            Variant::SleeveDark => "sleeve_dark",
            Variant::SleeveLight => "sleeve_light",
        }
    }

    /// `{output_dir}/{slug}/{slug}_{variant}.png`
    pub fn output_path(self, slug: &str, output_dir: &Path) -> PathBuf {
        output_dir
            .join(slug)
            .join(format!("{slug}_{}.png", self.suffix()))
    }
}

impl std::fmt::Display for Variant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.suffix())
    }
}

/// What happened to a single layer during composition.
#[derive(Clone, Debug, PartialEq)]
pub enum LayerOutcome {
    /// Pasted; bounds are the element's bounding box on the canvas.
    Placed { bounds: Rect },
    Skipped { reason: String },
}

#[derive(Clone, Debug)]
pub struct LayerReport {
    pub element: ElementKind,
    pub outcome: LayerOutcome,
}

/// Per-composition result: the saved path plus one report per attempted layer.
#[derive(Clone, Debug)]
pub struct CompositionReport {
    pub placement: Placement,
    pub output: PathBuf,
    pub layers: Vec<LayerReport>,
}

impl CompositionReport {
    pub fn placed_count(&self) -> usize {
        self.layers
            .iter()
            .filter(|l| matches!(l.outcome, LayerOutcome::Placed { .. }))
            .count()
    }
}

/// File paths of the per-product contrast assets; `None` means the asset was
/// never produced and its dependent variants are skipped.
#[derive(Clone, Debug, Default)]
pub struct ProductAssets {
    pub title_dark: Option<PathBuf>,
    pub title_light: Option<PathBuf>,
    pub wordmark_dark: Option<PathBuf>,
    pub wordmark_light: Option<PathBuf>,
    pub logo_dark: Option<PathBuf>,
    pub logo_light: Option<PathBuf>,
}

/// Result of a five-variant product run. Every variant is present in the map;
/// `None` marks a skipped or failed composition.
#[derive(Clone, Debug, Default)]
pub struct VariantOutputs {
    pub outputs: BTreeMap<Variant, Option<PathBuf>>,
    pub reports: Vec<CompositionReport>,
}

impl VariantOutputs {
    pub fn path(&self, variant: Variant) -> Option<&PathBuf> {
        self.outputs.get(&variant).and_then(|p| p.as_ref())
    }

    pub fn succeeded(&self) -> usize {
        self.outputs.values().filter(|p| p.is_some()).count()
    }
}

/// Stateless composer over the immutable template and layout tables.
pub struct Composer<'a> {
    templates: &'a Templates,
    layout: &'a LayoutConfig,
}

impl<'a> Composer<'a> {
    pub fn new(templates: &'a Templates, layout: &'a LayoutConfig) -> Self {
        Self { templates, layout }
    }

    fn blank_canvas(template: &CanvasTemplate) -> RgbaImage {
        RgbaImage::from_pixel(template.width, template.height, Rgba([0, 0, 0, 0]))
    }

    /// Resize, position, clamp and paste one layer. Non-ready sources become
    /// a recorded skip; the canvas is left untouched.
    fn place(
        &self,
        canvas: &mut RgbaImage,
        template: &CanvasTemplate,
        rule: &LayoutRule,
        element: ElementKind,
        source: LayerSource,
    ) -> LayerReport {
        let img = match source {
            LayerSource::Ready(img) => img,
            other => {
                let reason = other
                    .skip_reason()
                    .unwrap_or_else(|| "unavailable".to_string());
                warn!(?element, reason = %reason, "layer skipped");
                return LayerReport {
                    element,
                    outcome: LayerOutcome::Skipped { reason },
                };
            }
        };

        let resized = resize_to_rule(&img, rule, template.size());
        let (w, h) = resized.dimensions();
        let pos = position_element(template.size(), (w, h), rule, Alignment::Center);
        let (x, y) = clamp_to_safe_area(pos, (w, h), template.size(), template.safe_margin);
        composite_over(canvas, &resized, x, y);

        debug!(?element, w, h, x, y, "layer placed");
        LayerReport {
            element,
            outcome: LayerOutcome::Placed {
                bounds: Rect::new(
                    x as f64,
                    y as f64,
                    x as f64 + f64::from(w),
                    y as f64 + f64::from(h),
                ),
            },
        }
    }

    /// Front composition: artwork, curved title, wordmark, in that z-order.
    ///
    /// Every layer is optional; a missing file is skipped and the canvas is
    /// still saved. Returns the report of whatever was placed.
    pub fn compose_front(
        &self,
        artwork: &Path,
        title: &Path,
        wordmark: &Path,
        output: &Path,
    ) -> MonoprintResult<CompositionReport> {
        let template = &self.templates.main;
        let mut canvas = Self::blank_canvas(template);

        info!(
            width = template.width,
            height = template.height,
            "composing front"
        );

        let layers = vec![
            self.place(
                &mut canvas,
                template,
                &self.layout.front_main_image,
                ElementKind::Artwork,
                probe_layer(Some(artwork)),
            ),
            self.place(
                &mut canvas,
                template,
                &self.layout.front_title,
                ElementKind::Title,
                probe_layer(Some(title)),
            ),
            self.place(
                &mut canvas,
                template,
                &self.layout.front_wordmark,
                ElementKind::Wordmark,
                probe_layer(Some(wordmark)),
            ),
        ];

        save_png(&canvas, output)?;
        Ok(CompositionReport {
            placement: Placement::Front,
            output: output.to_path_buf(),
            layers,
        })
    }

    /// Back composition: the artwork alone, larger than on the front.
    /// The artwork is required; nothing is written when it is unavailable.
    pub fn compose_back(&self, artwork: &Path, output: &Path) -> MonoprintResult<CompositionReport> {
        let template = &self.templates.main;
        let source = probe_layer(Some(artwork));
        if let Some(reason) = source.skip_reason() {
            return Err(MonoprintError::composition(format!(
                "back requires artwork: {reason}"
            )));
        }

        let mut canvas = Self::blank_canvas(template);
        info!(
            width = template.width,
            height = template.height,
            "composing back"
        );

        let layers = vec![self.place(
            &mut canvas,
            template,
            &self.layout.back_main_image,
            ElementKind::Artwork,
            source,
        )];

        save_png(&canvas, output)?;
        Ok(CompositionReport {
            placement: Placement::Back,
            output: output.to_path_buf(),
            layers,
        })
    }

    /// Sleeve composition: the brand logo alone on the sleeve strip.
    /// The logo is required; nothing is written when it is unavailable.
    pub fn compose_sleeve(&self, logo: &Path, output: &Path) -> MonoprintResult<CompositionReport> {
        let template = &self.templates.sleeve;
        let source = probe_layer(Some(logo));
        if let Some(reason) = source.skip_reason() {
            return Err(MonoprintError::composition(format!(
                "sleeve requires logo: {reason}"
            )));
        }

        let mut canvas = Self::blank_canvas(template);
        info!(
            width = template.width,
            height = template.height,
            "composing sleeve"
        );

        let layers = vec![self.place(
            &mut canvas,
            template,
            &self.layout.sleeve_logo,
            ElementKind::Logo,
            source,
        )];

        save_png(&canvas, output)?;
        Ok(CompositionReport {
            placement: Placement::Sleeve,
            output: output.to_path_buf(),
            layers,
        })
    }

    /// Produce the five variant canvases for one product.
    ///
    /// Each composition is attempted independently; a failure or missing
    /// input marks that entry `None` and never aborts the siblings. The
    /// returned map always contains all five variants.
    pub fn create_all_variants(
        &self,
        slug: &str,
        artwork: &Path,
        assets: &ProductAssets,
        output_dir: &Path,
    ) -> VariantOutputs {
        let mut result = VariantOutputs::default();
        for variant in Variant::ALL {
            result.outputs.insert(variant, None);
        }

        info!(slug, "composing all product variants");

        for variant in Variant::ALL {
            let output = variant.output_path(slug, output_dir);
            let attempt = match variant {
                // Light garments take the dark title and wordmark.
                Variant::FrontLight => match (&assets.title_dark, &assets.wordmark_dark) {
                    (Some(title), Some(wordmark)) => {
                        Some(self.compose_front(artwork, title, wordmark, &output))
                    }
                    _ => None,
                },
                Variant::FrontDark => match (&assets.title_light, &assets.wordmark_light) {
                    (Some(title), Some(wordmark)) => {
                        Some(self.compose_front(artwork, title, wordmark, &output))
                    }
                    _ => None,
                },
                Variant::Back => Some(self.compose_back(artwork, &output)),
                Variant::SleeveDark => assets
                    .logo_dark
                    .as_deref()
                    .map(|logo| self.compose_sleeve(logo, &output)),
                Variant::SleeveLight => assets
                    .logo_light
                    .as_deref()
                    .map(|logo| self.compose_sleeve(logo, &output)),
            };

            match attempt {
                None => debug!(%variant, "variant skipped, inputs unavailable"),
                Some(Err(e)) => warn!(%variant, error = %e, "variant failed"),
                Some(Ok(report)) => {
                    result.outputs.insert(variant, Some(output));
                    result.reports.push(report);
                }
            }
        }

        info!(slug, succeeded = result.succeeded(), "variant run complete");
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CanvasTemplate;

    fn small_templates() -> Templates {
        Templates {
            main: CanvasTemplate {
                width: 120,
                height: 160,
                dpi: 300,
                safe_margin: 5,
            },
            sleeve: CanvasTemplate {
                width: 40,
                height: 140,
                dpi: 300,
                safe_margin: 5,
            },
        }
    }

    fn write_solid(path: &Path, w: u32, h: u32, rgba: [u8; 4]) {
        let img = RgbaImage::from_pixel(w, h, Rgba(rgba));
        save_png(&img, path).unwrap();
    }

    #[test]
    fn front_output_matches_template_size() {
        let dir = tempfile::tempdir().unwrap();
        let art = dir.path().join("art.png");
        let title = dir.path().join("title.png");
        let mark = dir.path().join("mark.png");
        write_solid(&art, 50, 50, [255, 0, 0, 255]);
        write_solid(&title, 60, 20, [0, 0, 0, 255]);
        write_solid(&mark, 30, 10, [0, 0, 255, 255]);

        let templates = small_templates();
        let layout = LayoutConfig::default();
        let composer = Composer::new(&templates, &layout);

        let out = dir.path().join("front.png");
        let report = composer.compose_front(&art, &title, &mark, &out).unwrap();
        assert_eq!(report.placed_count(), 3);

        let saved = image::open(&out).unwrap().to_rgba8();
        assert_eq!(saved.dimensions(), (120, 160));
    }

    #[test]
    fn front_with_missing_optional_layers_still_saves() {
        let dir = tempfile::tempdir().unwrap();
        let art = dir.path().join("art.png");
        write_solid(&art, 50, 50, [255, 0, 0, 255]);

        let templates = small_templates();
        let layout = LayoutConfig::default();
        let composer = Composer::new(&templates, &layout);

        let out = dir.path().join("front.png");
        let report = composer
            .compose_front(
                &art,
                Path::new("/missing/title.png"),
                Path::new("/missing/mark.png"),
                &out,
            )
            .unwrap();

        assert!(out.is_file());
        assert_eq!(report.placed_count(), 1);
        let skipped = report
            .layers
            .iter()
            .filter(|l| matches!(l.outcome, LayerOutcome::Skipped { .. }))
            .count();
        assert_eq!(skipped, 2);
    }

    #[test]
    fn back_requires_artwork_and_writes_nothing_without_it() {
        let dir = tempfile::tempdir().unwrap();
        let templates = small_templates();
        let layout = LayoutConfig::default();
        let composer = Composer::new(&templates, &layout);

        let out = dir.path().join("back.png");
        let err = composer.compose_back(Path::new("/missing/art.png"), &out);
        assert!(err.is_err());
        assert!(!out.exists());
    }

    #[test]
    fn placed_bounds_respect_safe_margin() {
        let dir = tempfile::tempdir().unwrap();
        let art = dir.path().join("art.png");
        // Wider than the safe area after the 80% back rule.
        write_solid(&art, 400, 40, [9, 9, 9, 255]);

        let templates = small_templates();
        let layout = LayoutConfig::default();
        let composer = Composer::new(&templates, &layout);

        let out = dir.path().join("back.png");
        let report = composer.compose_back(&art, &out).unwrap();
        let LayerOutcome::Placed { bounds } = &report.layers[0].outcome else {
            panic!("artwork not placed");
        };
        assert!(bounds.x0 >= 5.0);
        assert!(bounds.y0 >= 5.0);
    }

    #[test]
    fn all_variants_map_is_complete_with_none_for_missing_inputs() {
        let dir = tempfile::tempdir().unwrap();
        let art = dir.path().join("art.png");
        let title_dark = dir.path().join("td.png");
        let title_light = dir.path().join("tl.png");
        let mark_dark = dir.path().join("wd.png");
        let mark_light = dir.path().join("wl.png");
        let logo_dark = dir.path().join("ld.png");
        for (path, shade) in [
            (&art, [200, 0, 0, 255]),
            (&title_dark, [17, 17, 17, 255]),
            (&title_light, [255, 255, 255, 255]),
            (&mark_dark, [17, 17, 17, 255]),
            (&mark_light, [255, 255, 255, 255]),
            (&logo_dark, [17, 17, 17, 255]),
        ] {
            write_solid(path, 40, 20, shade);
        }

        let assets = ProductAssets {
            title_dark: Some(title_dark),
            title_light: Some(title_light),
            wordmark_dark: Some(mark_dark),
            wordmark_light: Some(mark_light),
            logo_dark: Some(logo_dark),
            logo_light: None, // never produced
        };

        let templates = small_templates();
        let layout = LayoutConfig::default();
        let composer = Composer::new(&templates, &layout);
        let result = composer.create_all_variants("volpe", &art, &assets, dir.path());

        assert_eq!(result.outputs.len(), 5);
        assert_eq!(result.succeeded(), 4);
        assert!(result.path(Variant::SleeveLight).is_none());
        for variant in [
            Variant::FrontLight,
            Variant::FrontDark,
            Variant::Back,
            Variant::SleeveDark,
        ] {
            let path = result.path(variant).unwrap();
            assert!(path.is_file());
            assert!(path.ends_with(format!("volpe/volpe_{}.png", variant.suffix())));
        }
    }
}

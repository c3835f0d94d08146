use std::path::{Path, PathBuf};

use crate::error::{MonoprintError, MonoprintResult};

/// Fixed pixel specification for one physical print area.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CanvasTemplate {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Print resolution the dimensions assume.
    pub dpi: u32,
    /// Minimum distance from the canvas edge for placed content, in pixels.
    pub safe_margin: u32,
}

impl CanvasTemplate {
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// The two print areas every product uses: the main front/back panel and the sleeve strip.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Templates {
    pub main: CanvasTemplate,
    pub sleeve: CanvasTemplate,
}

impl Default for Templates {
    fn default() -> Self {
        // 12x16" and 3x14" @300 DPI, 0.25" safe margin.
        Self {
            main: CanvasTemplate {
                width: 3600,
                height: 4800,
                dpi: 300,
                safe_margin: 75,
            },
            sleeve: CanvasTemplate {
                width: 900,
                height: 4200,
                dpi: 300,
                safe_margin: 75,
            },
        }
    }
}

/// Percentage-based placement rule for one element on one print area.
///
/// At most one of `width_percent`/`height_percent` is set; the other dimension
/// is derived preserving the source aspect ratio. With neither set the element
/// keeps its native size. A missing `top_percent` centers vertically.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LayoutRule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width_percent: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height_percent: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_percent: Option<f64>,
}

impl LayoutRule {
    pub fn from_width(width_percent: f64, top_percent: f64) -> Self {
        Self {
            width_percent: Some(width_percent),
            height_percent: None,
            top_percent: Some(top_percent),
        }
    }

    pub fn from_height(height_percent: f64, top_percent: f64) -> Self {
        Self {
            width_percent: None,
            height_percent: Some(height_percent),
            top_percent: Some(top_percent),
        }
    }

    pub fn validate(&self) -> MonoprintResult<()> {
        if self.width_percent.is_some() && self.height_percent.is_some() {
            return Err(MonoprintError::validation(
                "layout rule sets both width_percent and height_percent",
            ));
        }
        for pct in [self.width_percent, self.height_percent, self.top_percent]
            .into_iter()
            .flatten()
        {
            if !(0.0..=100.0).contains(&pct) {
                return Err(MonoprintError::validation(format!(
                    "layout percentage {pct} out of 0-100 range"
                )));
            }
        }
        Ok(())
    }
}

/// The static placement table: one rule per (placement, element) pair.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LayoutConfig {
    pub front_main_image: LayoutRule,
    pub front_title: LayoutRule,
    pub front_wordmark: LayoutRule,
    pub back_main_image: LayoutRule,
    pub sleeve_logo: LayoutRule,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            front_main_image: LayoutRule::from_width(45.0, 20.0),
            front_title: LayoutRule::from_width(60.0, 55.0),
            front_wordmark: LayoutRule::from_width(25.0, 75.0),
            back_main_image: LayoutRule::from_width(80.0, 50.0),
            sleeve_logo: LayoutRule::from_height(25.0, 50.0),
        }
    }
}

impl LayoutConfig {
    pub fn validate(&self) -> MonoprintResult<()> {
        for rule in [
            &self.front_main_image,
            &self.front_title,
            &self.front_wordmark,
            &self.back_main_image,
            &self.sleeve_logo,
        ] {
            rule.validate()?;
        }
        Ok(())
    }
}

/// Geometry and typeface settings for the curved title rasterizer.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TitleStyle {
    /// TrueType file to render with; a built-in face is used when unreadable.
    pub font_path: PathBuf,
    /// Glyph size in pixels.
    pub font_size: f32,
    /// Output raster width in pixels.
    pub canvas_width: u32,
    /// Output raster height in pixels.
    pub canvas_height: u32,
    /// Arc coefficient; negative curves the text downward.
    pub curvature: f64,
    /// Downward shift of the arc center, tuned visually for the default face.
    pub vertical_offset: i32,
}

impl Default for TitleStyle {
    fn default() -> Self {
        Self {
            font_path: PathBuf::from("assets/fonts/LibreBodoni-Regular.ttf"),
            font_size: 180.0,
            canvas_width: 2400,
            canvas_height: 800,
            curvature: -0.60,
            vertical_offset: 50,
        }
    }
}

impl TitleStyle {
    pub fn canvas_size(&self) -> (u32, u32) {
        (self.canvas_width, self.canvas_height)
    }

    pub fn validate(&self) -> MonoprintResult<()> {
        if self.canvas_width == 0 || self.canvas_height == 0 {
            return Err(MonoprintError::validation(
                "title canvas width/height must be > 0",
            ));
        }
        if !(self.font_size.is_finite() && self.font_size > 0.0) {
            return Err(MonoprintError::validation("title font_size must be > 0"));
        }
        Ok(())
    }
}

/// The two foreground colors used for garment contrast, as `#RRGGBB` hex.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ContrastColors {
    /// Foreground for light garments.
    pub dark_text: String,
    /// Foreground for dark garments.
    pub light_text: String,
}

impl Default for ContrastColors {
    fn default() -> Self {
        Self {
            dark_text: "#111111".to_string(),
            light_text: "#FFFFFF".to_string(),
        }
    }
}

/// File paths of the static brand rasters, one dark and one light of each.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BrandAssets {
    pub wordmark_dark: PathBuf,
    pub wordmark_light: PathBuf,
    pub logo_dark: PathBuf,
    pub logo_light: PathBuf,
}

/// Acceptance thresholds for source artwork.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ImageRequirements {
    /// Minimum long-side pixel dimension.
    pub min_dimension: u32,
    /// Maximum file size in bytes.
    pub max_file_size: u64,
    /// Whether source artwork must carry an alpha channel.
    pub require_alpha: bool,
}

impl Default for ImageRequirements {
    fn default() -> Self {
        Self {
            min_dimension: 1024,
            max_file_size: 200 * 1024 * 1024,
            require_alpha: true,
        }
    }
}

/// Garment color names grouped by contrast class.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct GarmentColors {
    pub light: Vec<String>,
    pub dark: Vec<String>,
}

impl Default for GarmentColors {
    fn default() -> Self {
        let light = [
            "White",
            "Natural",
            "Sand",
            "Ash",
            "Sport Grey",
            "Cream",
            "Ivory",
            "Beige",
            "Yellow",
            "Light Pink",
            "Light Gray",
            "Light Grey",
            "Tan",
            "Khaki",
            "Silver",
        ];
        let dark = [
            "Black",
            "Charcoal",
            "Navy",
            "Forest",
            "Maroon",
            "Dark Grey",
            "Dark Gray",
            "Midnight",
            "Heather",
        ];
        Self {
            light: light.iter().map(|s| s.to_string()).collect(),
            dark: dark.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl GarmentColors {
    /// Light garments take dark artwork elements and vice versa.
    pub fn is_light(&self, color: &str) -> bool {
        self.light.iter().any(|c| c == color)
    }
}

/// Storefront listing parameters.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ListingConfig {
    pub brand: String,
    pub price: String,
    pub sizes: Vec<String>,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            brand: "OnlyOne".to_string(),
            price: "35.00".to_string(),
            sizes: ["S", "M", "L", "XL", "XXL"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Aggregate immutable configuration, constructed once at startup and passed
/// by reference into the renderer, composer and workflow.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct StudioConfig {
    pub templates: Templates,
    pub layout: LayoutConfig,
    pub title: TitleStyle,
    pub colors: ContrastColors,
    pub brand_assets: BrandAssets,
    pub requirements: ImageRequirements,
    pub garment_colors: GarmentColors,
    pub listing: ListingConfig,
}

impl StudioConfig {
    /// Read a config JSON file; fields left out fall back to the defaults.
    pub fn load(path: &Path) -> MonoprintResult<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| MonoprintError::validation(format!("read config '{}': {e}", path.display())))?;
        let config: Self = serde_json::from_str(&text)
            .map_err(|e| MonoprintError::serde(format!("parse config '{}': {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> MonoprintResult<()> {
        for tpl in [&self.templates.main, &self.templates.sleeve] {
            if tpl.width == 0 || tpl.height == 0 {
                return Err(MonoprintError::validation(
                    "canvas template width/height must be > 0",
                ));
            }
            if 2 * tpl.safe_margin >= tpl.width.min(tpl.height) {
                return Err(MonoprintError::validation(
                    "safe_margin leaves no usable canvas area",
                ));
            }
        }
        self.layout.validate()?;
        self.title.validate()?;
        Ok(())
    }
}

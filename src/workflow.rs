//! Drop pipeline orchestration: validate artwork, render the title pair,
//! compose the five print canvases, QA the outputs, keep the ledger current,
//! and optionally push the product to the storefront.
//!
//! One product is driven at a time; failures are contained per step and per
//! variant, and partial success is a normal, reported outcome.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::Context as _;
use tracing::{info, warn};

use crate::{
    compose::{Composer, ProductAssets, Variant, VariantOutputs},
    config::StudioConfig,
    error::{MonoprintError, MonoprintResult},
    font::TitleFont,
    publish::{CatalogVariant, CreatedProduct, ImageHost, Marketplace, build_sync_request},
    slug::{title_from_slug, unique_slug},
    title::{TitleArtifacts, render_title_pair},
    tracker::Ledger,
    validate::{validate_artwork, validate_composition},
};

/// Pause before re-attempting a product whose compositions partially failed.
const COMPOSE_RETRY_BACKOFF: Duration = Duration::from_secs(2);

/// Running totals for one batch session.
#[derive(Debug)]
pub struct SessionStats {
    started: Instant,
    pub images_processed: usize,
    pub titles_rendered: usize,
    pub compositions_created: usize,
    pub products_published: usize,
    pub errors: Vec<String>,
}

impl SessionStats {
    fn new() -> Self {
        Self {
            started: Instant::now(),
            images_processed: 0,
            titles_rendered: 0,
            compositions_created: 0,
            products_published: 0,
            errors: Vec::new(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn log_summary(&self) {
        info!(
            images = self.images_processed,
            titles = self.titles_rendered,
            compositions = self.compositions_created,
            published = self.products_published,
            errors = self.errors.len(),
            elapsed_secs = self.elapsed().as_secs(),
            "session summary"
        );
    }
}

/// Result of processing one artwork through the local pipeline.
#[derive(Debug)]
pub struct ProductOutcome {
    pub slug: String,
    pub title: String,
    pub artifacts: TitleArtifacts,
    pub outputs: VariantOutputs,
}

/// External endpoints for a publish run, resolved by the caller.
pub struct PublishTargets<'a> {
    pub host: &'a dyn ImageHost,
    pub marketplace: &'a dyn Marketplace,
    /// Garment variants of the catalog product being listed.
    pub catalog: Vec<CatalogVariant>,
    pub product_type: String,
}

/// Owns the long-lived pipeline state: configuration, typeface, ledger.
pub struct Studio {
    config: StudioConfig,
    font: TitleFont,
    ledger: Ledger,
    output_dir: PathBuf,
    stats: SessionStats,
}

impl Studio {
    pub fn new(
        config: StudioConfig,
        ledger_path: &Path,
        output_dir: &Path,
    ) -> MonoprintResult<Self> {
        config.validate()?;
        let font = TitleFont::load(&config.title.font_path);
        let ledger = Ledger::load_or_create(ledger_path)?;
        Ok(Self {
            config,
            font,
            ledger,
            output_dir: output_dir.to_path_buf(),
            stats: SessionStats::new(),
        })
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Resolve the per-product asset table: rendered titles plus the static
    /// brand rasters that actually exist on disk.
    fn resolve_assets(&self, artifacts: &TitleArtifacts) -> ProductAssets {
        let existing = |path: &PathBuf| path.is_file().then(|| path.clone());
        let brand = &self.config.brand_assets;
        ProductAssets {
            title_dark: artifacts.dark.clone(),
            title_light: artifacts.light.clone(),
            wordmark_dark: existing(&brand.wordmark_dark),
            wordmark_light: existing(&brand.wordmark_light),
            logo_dark: existing(&brand.logo_dark),
            logo_light: existing(&brand.logo_light),
        }
    }

    /// How many variant compositions have their required inputs available.
    fn expected_attempts(artwork_ok: bool, assets: &ProductAssets) -> usize {
        let mut expected = usize::from(artwork_ok); // back
        if assets.title_dark.is_some() && assets.wordmark_dark.is_some() {
            expected += 1;
        }
        if assets.title_light.is_some() && assets.wordmark_light.is_some() {
            expected += 1;
        }
        expected += usize::from(assets.logo_dark.is_some());
        expected += usize::from(assets.logo_light.is_some());
        expected
    }

    /// Run one artwork through validation, title rendering, composition and
    /// output QA, recording everything in the ledger.
    pub fn process_artwork(&mut self, artwork: &Path) -> MonoprintResult<ProductOutcome> {
        let file_name = artwork
            .file_name()
            .ok_or_else(|| MonoprintError::validation("artwork path has no file name"))?
            .to_string_lossy()
            .to_string();

        info!(artwork = %artwork.display(), "processing artwork");

        let intake = validate_artwork(artwork, &self.config.requirements);
        if !intake.valid {
            let detail = intake.issues.join("; ");
            self.stats.errors.push(format!("{file_name}: {detail}"));
            return Err(MonoprintError::validation(format!(
                "artwork rejected: {detail}"
            )));
        }

        let slug = unique_slug(&file_name, &self.ledger.slugs());
        let title = title_from_slug(&slug, 4);
        self.ledger.create_entry(&slug, &title)?;

        let artifacts = render_title_pair(
            &self.font,
            &title,
            &self.config.title,
            &self.config.colors,
            &self.output_dir,
        );
        if artifacts.both_rendered() {
            self.stats.titles_rendered += 1;
        } else {
            warn!(slug = %slug, "title pair incomplete, front variants will be skipped");
        }

        let assets = self.resolve_assets(&artifacts);
        let composer = Composer::new(&self.config.templates, &self.config.layout);
        let mut outputs = composer.create_all_variants(&slug, artwork, &assets, &self.output_dir);

        let expected = Self::expected_attempts(true, &assets);
        if outputs.succeeded() < expected {
            warn!(
                slug = %slug,
                succeeded = outputs.succeeded(),
                expected,
                "composition shortfall, retrying once"
            );
            std::thread::sleep(COMPOSE_RETRY_BACKOFF);
            outputs = composer.create_all_variants(&slug, artwork, &assets, &self.output_dir);
        }
        self.stats.compositions_created += outputs.succeeded();

        for variant in Variant::ALL {
            let Some(path) = outputs.path(variant) else {
                continue;
            };
            let template = match variant.placement() {
                crate::compose::Placement::Sleeve => &self.config.templates.sleeve,
                _ => &self.config.templates.main,
            };
            let qa = validate_composition(path, template);
            if !qa.valid {
                warn!(%variant, issues = ?qa.issues, "composition failed QA");
                self.stats
                    .errors
                    .push(format!("{slug}/{variant}: {}", qa.issues.join("; ")));
            }
            self.ledger
                .record_composition(&slug, variant, path.display().to_string())?;
        }

        self.ledger.record_listing(
            &slug,
            "tshirt",
            &self.config.listing.price,
            &self.config.listing.sizes,
        )?;
        self.ledger.save()?;
        self.stats.images_processed += 1;

        Ok(ProductOutcome {
            slug,
            title,
            artifacts,
            outputs,
        })
    }

    /// Upload a product's compositions and create the marketplace listing.
    ///
    /// Composition slots already holding URLs are reused, so a re-run after a
    /// partial publish only uploads what is still local.
    pub fn publish_product(
        &mut self,
        slug: &str,
        targets: &PublishTargets<'_>,
    ) -> MonoprintResult<CreatedProduct> {
        let record = self
            .ledger
            .get(slug)
            .ok_or_else(|| MonoprintError::ledger(format!("no entry for slug '{slug}'")))?
            .clone();

        for variant in Variant::ALL {
            let slot = match variant {
                Variant::FrontLight => &record.front_light_url,
                Variant::FrontDark => &record.front_dark_url,
                Variant::Back => &record.back_url,
                Variant::SleeveDark => &record.sleeve_dark_url,
                Variant::SleeveLight => &record.sleeve_light_url,
            };
            let Some(location) = slot else {
                continue;
            };
            if location.starts_with("http") {
                continue;
            }
            let url = targets
                .host
                .upload(Path::new(location), &format!("{slug}_{variant}"))?;
            self.ledger.record_composition(slug, variant, url)?;
        }

        let record = self
            .ledger
            .get(slug)
            .ok_or_else(|| MonoprintError::ledger(format!("no entry for slug '{slug}'")))?
            .clone();
        let request = build_sync_request(
            &record,
            &targets.catalog,
            &self.config.garment_colors,
            &self.config.listing,
            &targets.product_type,
        );

        let created = targets.marketplace.create_product(&request)?;
        targets.marketplace.publish(created.id)?;

        self.ledger.mark_published(slug, created.id, None)?;
        self.ledger.save()?;
        self.stats.products_published += 1;

        info!(slug, product_id = created.id, "product published");
        Ok(created)
    }

    /// Process every artwork file in a directory, pausing between products.
    /// Per-product failures are recorded and do not stop the batch.
    pub fn run_batch(&mut self, input_dir: &Path, pause: Duration) -> MonoprintResult<()> {
        let files = discover_artwork(input_dir)?;
        info!(count = files.len(), dir = %input_dir.display(), "starting batch");

        for (index, file) in files.iter().enumerate() {
            if index > 0 && !pause.is_zero() {
                std::thread::sleep(pause);
            }
            if let Err(e) = self.process_artwork(file) {
                warn!(file = %file.display(), error = %e, "artwork failed, continuing batch");
                self.stats.errors.push(format!("{}: {e}", file.display()));
            }
        }

        self.stats.log_summary();
        Ok(())
    }
}

/// Artwork files (PNG/JPEG) in a directory, sorted for stable batch order.
pub fn discover_artwork(dir: &Path) -> MonoprintResult<Vec<PathBuf>> {
    let entries =
        std::fs::read_dir(dir).with_context(|| format!("read input dir '{}'", dir.display()))?;

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|ext| {
                        matches!(ext.to_ascii_lowercase().as_str(), "png" | "jpg" | "jpeg")
                    })
        })
        .collect();
    files.sort();
    Ok(files)
}

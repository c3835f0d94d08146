//! Product ledger: one record per slug, covering the full drop lifecycle
//! from asset generation to storefront publication.
//!
//! Persisted as a single JSON document keyed by slug. Writes are explicit
//! (`save`), so a batch can update many records and persist once.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use chrono::Utc;
use tracing::{debug, info};

use crate::compose::Variant;
use crate::error::{MonoprintError, MonoprintResult};

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
    #[default]
    Draft,
    Published,
    Archived,
}

/// Everything tracked for one product, mirroring the drop pipeline stages.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ProductRecord {
    pub slug: String,
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artwork_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_dark_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_light_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wordmark_dark_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wordmark_light_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub front_light_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub front_dark_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub back_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sleeve_dark_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sleeve_light_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_type: Option<String>,
    #[serde(default)]
    pub colors_light: Vec<String>,
    #[serde(default)]
    pub colors_dark: Vec<String>,
    #[serde(default)]
    pub sizes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_url: Option<String>,

    #[serde(default)]
    pub status: ProductStatus,
    pub created_at: String,
}

impl ProductRecord {
    fn new(slug: &str, title: &str) -> Self {
        Self {
            slug: slug.to_string(),
            title: title.to_string(),
            artwork_url: None,
            title_dark_url: None,
            title_light_url: None,
            wordmark_dark_url: None,
            wordmark_light_url: None,
            front_light_url: None,
            front_dark_url: None,
            back_url: None,
            sleeve_dark_url: None,
            sleeve_light_url: None,
            product_type: None,
            colors_light: Vec::new(),
            colors_dark: Vec::new(),
            sizes: Vec::new(),
            price: None,
            product_id: None,
            store_url: None,
            status: ProductStatus::Draft,
            created_at: Utc::now().to_rfc3339(),
        }
    }

    fn composition_slot(&mut self, variant: Variant) -> &mut Option<String> {
        match variant {
            Variant::FrontLight => &mut self.front_light_url,
            Variant::FrontDark => &mut self.front_dark_url,
            Variant::Back => &mut self.back_url,
            Variant::SleeveDark => &mut self.sleeve_dark_url,
            Variant::SleeveLight => &mut self.sleeve_light_url,
        }
    }
}

/// Pre-composition asset URLs to merge into a record; `None` fields are
/// left untouched.
#[derive(Clone, Debug, Default)]
pub struct AssetUrls {
    pub artwork: Option<String>,
    pub title_dark: Option<String>,
    pub title_light: Option<String>,
    pub wordmark_dark: Option<String>,
    pub wordmark_light: Option<String>,
}

#[derive(Debug)]
pub struct Ledger {
    path: PathBuf,
    records: BTreeMap<String, ProductRecord>,
}

impl Ledger {
    /// Open an existing ledger file or start an empty one at `path`.
    /// A corrupt file is an error, not a silent reset.
    pub fn load_or_create(path: &Path) -> MonoprintResult<Self> {
        let records = if path.is_file() {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("read ledger '{}'", path.display()))?;
            serde_json::from_str(&text)
                .map_err(|e| MonoprintError::serde(format!("parse ledger '{}': {e}", path.display())))?
        } else {
            BTreeMap::new()
        };

        info!(path = %path.display(), entries = records.len(), "ledger loaded");
        Ok(Self {
            path: path.to_path_buf(),
            records,
        })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains(&self, slug: &str) -> bool {
        self.records.contains_key(slug)
    }

    pub fn get(&self, slug: &str) -> Option<&ProductRecord> {
        self.records.get(slug)
    }

    pub fn slugs(&self) -> Vec<String> {
        self.records.keys().cloned().collect()
    }

    /// Start a draft record for a new product. Duplicate slugs are refused.
    pub fn create_entry(&mut self, slug: &str, title: &str) -> MonoprintResult<()> {
        if self.records.contains_key(slug) {
            return Err(MonoprintError::ledger(format!(
                "entry already exists for slug '{slug}'"
            )));
        }
        self.records
            .insert(slug.to_string(), ProductRecord::new(slug, title));
        debug!(slug, "ledger entry created");
        Ok(())
    }

    fn record_mut(&mut self, slug: &str) -> MonoprintResult<&mut ProductRecord> {
        self.records
            .get_mut(slug)
            .ok_or_else(|| MonoprintError::ledger(format!("no entry for slug '{slug}'")))
    }

    /// Merge uploaded asset URLs into a record.
    pub fn record_asset_urls(&mut self, slug: &str, urls: AssetUrls) -> MonoprintResult<()> {
        let record = self.record_mut(slug)?;
        let pairs = [
            (&mut record.artwork_url, urls.artwork),
            (&mut record.title_dark_url, urls.title_dark),
            (&mut record.title_light_url, urls.title_light),
            (&mut record.wordmark_dark_url, urls.wordmark_dark),
            (&mut record.wordmark_light_url, urls.wordmark_light),
        ];
        for (slot, value) in pairs {
            if value.is_some() {
                *slot = value;
            }
        }
        Ok(())
    }

    /// Record a composition location (local path or public URL) for a variant.
    pub fn record_composition(
        &mut self,
        slug: &str,
        variant: Variant,
        location: String,
    ) -> MonoprintResult<()> {
        let record = self.record_mut(slug)?;
        *record.composition_slot(variant) = Some(location);
        Ok(())
    }

    /// Fill in the listing parameters chosen for the product.
    pub fn record_listing(
        &mut self,
        slug: &str,
        product_type: &str,
        price: &str,
        sizes: &[String],
    ) -> MonoprintResult<()> {
        let record = self.record_mut(slug)?;
        record.product_type = Some(product_type.to_string());
        record.price = Some(price.to_string());
        record.sizes = sizes.to_vec();
        Ok(())
    }

    pub fn set_status(&mut self, slug: &str, status: ProductStatus) -> MonoprintResult<()> {
        self.record_mut(slug)?.status = status;
        Ok(())
    }

    /// Flip a record to published with its marketplace identifiers.
    pub fn mark_published(
        &mut self,
        slug: &str,
        product_id: u64,
        store_url: Option<String>,
    ) -> MonoprintResult<()> {
        let record = self.record_mut(slug)?;
        record.product_id = Some(product_id);
        record.store_url = store_url;
        record.status = ProductStatus::Published;
        info!(slug, product_id, "ledger entry published");
        Ok(())
    }

    pub fn status_counts(&self) -> BTreeMap<ProductStatus, usize> {
        let mut counts = BTreeMap::new();
        for record in self.records.values() {
            *counts.entry(record.status).or_insert(0) += 1;
        }
        counts
    }

    /// Persist the ledger to its backing file.
    pub fn save(&self) -> MonoprintResult<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create ledger dir '{}'", parent.display()))?;
        }
        let text = serde_json::to_string_pretty(&self.records)
            .map_err(|e| MonoprintError::serde(format!("encode ledger: {e}")))?;
        std::fs::write(&self.path, text)
            .with_context(|| format!("write ledger '{}'", self.path.display()))?;
        debug!(path = %self.path.display(), entries = self.records.len(), "ledger saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_ledger() -> (tempfile::TempDir, Ledger) {
        let dir = tempfile::tempdir().unwrap();
        let ledger = Ledger::load_or_create(&dir.path().join("ledger.json")).unwrap();
        (dir, ledger)
    }

    #[test]
    fn create_entry_refuses_duplicates() {
        let (_dir, mut ledger) = temp_ledger();
        ledger.create_entry("volpe", "Volpe").unwrap();
        assert!(ledger.create_entry("volpe", "Volpe").is_err());
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn roundtrip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.json");

        let mut ledger = Ledger::load_or_create(&path).unwrap();
        ledger.create_entry("volpe", "Volpe").unwrap();
        ledger
            .record_composition(
                "volpe",
                Variant::Back,
                "artifacts/volpe/volpe_back.png".to_string(),
            )
            .unwrap();
        ledger.mark_published("volpe", 42, Some("https://store/volpe".to_string())).unwrap();
        ledger.save().unwrap();

        let reloaded = Ledger::load_or_create(&path).unwrap();
        let record = reloaded.get("volpe").unwrap();
        assert_eq!(record.status, ProductStatus::Published);
        assert_eq!(record.product_id, Some(42));
        assert_eq!(
            record.back_url.as_deref(),
            Some("artifacts/volpe/volpe_back.png")
        );
        assert!(record.front_light_url.is_none());
    }

    #[test]
    fn updates_on_unknown_slug_fail() {
        let (_dir, mut ledger) = temp_ledger();
        assert!(ledger.set_status("ghost", ProductStatus::Archived).is_err());
        assert!(
            ledger
                .record_asset_urls("ghost", AssetUrls::default())
                .is_err()
        );
    }

    #[test]
    fn asset_url_merge_keeps_existing_values() {
        let (_dir, mut ledger) = temp_ledger();
        ledger.create_entry("volpe", "Volpe").unwrap();
        ledger
            .record_asset_urls(
                "volpe",
                AssetUrls {
                    artwork: Some("https://img/art".to_string()),
                    ..AssetUrls::default()
                },
            )
            .unwrap();
        ledger
            .record_asset_urls(
                "volpe",
                AssetUrls {
                    title_dark: Some("https://img/td".to_string()),
                    ..AssetUrls::default()
                },
            )
            .unwrap();

        let record = ledger.get("volpe").unwrap();
        assert_eq!(record.artwork_url.as_deref(), Some("https://img/art"));
        assert_eq!(record.title_dark_url.as_deref(), Some("https://img/td"));
    }

    #[test]
    fn status_counts_group_by_lifecycle() {
        let (_dir, mut ledger) = temp_ledger();
        ledger.create_entry("a-b-c", "A").unwrap();
        ledger.create_entry("d-e-f", "D").unwrap();
        ledger.mark_published("a-b-c", 7, None).unwrap();

        let counts = ledger.status_counts();
        assert_eq!(counts.get(&ProductStatus::Draft), Some(&1));
        assert_eq!(counts.get(&ProductStatus::Published), Some(&1));
    }
}

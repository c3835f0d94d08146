//! Printful marketplace client: catalog variant lookup and synchronized
//! product creation against the store API.
//!
//! Print files are referenced by public URL; each garment color variant gets
//! the front composition matching its contrast class plus the universal back.

use std::time::Duration;

use anyhow::Context as _;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::config::{GarmentColors, ListingConfig};
use crate::error::{MonoprintError, MonoprintResult};
use crate::slug::listing_title;
use crate::tracker::ProductRecord;

use super::{Marketplace, Pacer};

const API_BASE: &str = "https://api.printful.com";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
/// Keeps us comfortably under the documented 120 requests/minute.
const REQUEST_INTERVAL: Duration = Duration::from_millis(600);

pub struct PrintfulClient {
    http: reqwest::blocking::Client,
    api_key: String,
    store_id: String,
    base_url: String,
    pacer: Pacer,
}

#[derive(Clone, Debug, serde::Serialize)]
pub struct SyncProduct {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
}

/// One print file attached to a variant, e.g. `{url, placement: "front"}`.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct PrintFile {
    pub url: String,
    pub placement: String,
}

#[derive(Clone, Debug, serde::Serialize)]
pub struct SyncVariant {
    pub variant_id: u64,
    pub retail_price: String,
    pub files: Vec<PrintFile>,
}

#[derive(Clone, Debug, serde::Serialize)]
pub struct SyncProductRequest {
    pub sync_product: SyncProduct,
    pub sync_variants: Vec<SyncVariant>,
}

#[derive(Clone, Debug, serde::Deserialize)]
pub struct CreatedProduct {
    pub id: u64,
    #[serde(default)]
    pub external_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// A catalog garment variant: one (color, size) combination of the base product.
#[derive(Clone, Debug, serde::Deserialize)]
pub struct CatalogVariant {
    pub id: u64,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub size: String,
}

#[derive(serde::Deserialize)]
struct Envelope<T> {
    result: T,
}

#[derive(serde::Deserialize)]
struct CatalogProduct {
    #[serde(default)]
    variants: Vec<CatalogVariant>,
}

impl PrintfulClient {
    pub fn new(api_key: impl Into<String>, store_id: impl Into<String>) -> MonoprintResult<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("monoprint/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("build printful http client")?;
        Ok(Self {
            http,
            api_key: api_key.into(),
            store_id: store_id.into(),
            base_url: API_BASE.to_string(),
            pacer: Pacer::new(REQUEST_INTERVAL),
        })
    }

    /// Point the client at a different API root (self-hosted mocks in tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::blocking::RequestBuilder,
    ) -> MonoprintResult<T> {
        self.pacer.pace();
        let response = request
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("X-PF-Store-Id", &self.store_id)
            .send()
            .context("printful request")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(MonoprintError::publish(format!(
                "printful returned {status}: {body}"
            )));
        }

        let envelope: Envelope<T> = response.json().context("parse printful response")?;
        Ok(envelope.result)
    }

    /// All garment variants of a catalog product (every color and size).
    pub fn catalog_variants(&self, product_id: u64) -> MonoprintResult<Vec<CatalogVariant>> {
        let url = format!("{}/products/{product_id}", self.base_url);
        debug!(product_id, "fetching catalog variants");
        let product: CatalogProduct = self.send(self.http.get(url))?;
        Ok(product.variants)
    }
}

impl Marketplace for PrintfulClient {
    fn create_product(&self, request: &SyncProductRequest) -> MonoprintResult<CreatedProduct> {
        if request.sync_variants.is_empty() {
            return Err(MonoprintError::publish(
                "sync product request has no variants",
            ));
        }
        info!(
            name = %request.sync_product.name,
            variants = request.sync_variants.len(),
            "creating sync product"
        );
        let url = format!("{}/store/products", self.base_url);
        self.send(self.http.post(url).json(request))
    }

    fn publish(&self, product_id: u64) -> MonoprintResult<()> {
        let url = format!("{}/store/products/{product_id}", self.base_url);
        let body = serde_json::json!({ "is_ignored": false });
        let _: serde_json::Value = self.send(self.http.put(url).json(&body))?;
        Ok(())
    }
}

/// Assemble the marketplace request for a tracked product.
///
/// Each garment variant receives the front composition matching its contrast
/// class (light garments carry the dark-element front) and the universal
/// back. Variants whose front composition is unavailable are dropped.
pub fn build_sync_request(
    record: &ProductRecord,
    catalog: &[CatalogVariant],
    garment_colors: &GarmentColors,
    listing: &ListingConfig,
    product_type: &str,
) -> SyncProductRequest {
    let mut sync_variants = Vec::new();

    for variant in catalog {
        let front_url = if garment_colors.is_light(&variant.color) {
            record.front_light_url.as_ref()
        } else {
            record.front_dark_url.as_ref()
        };

        let Some(front_url) = front_url else {
            debug!(color = %variant.color, "variant dropped, no front composition");
            continue;
        };

        let mut files = vec![PrintFile {
            url: front_url.clone(),
            placement: "front".to_string(),
        }];
        if let Some(back_url) = &record.back_url {
            files.push(PrintFile {
                url: back_url.clone(),
                placement: "back".to_string(),
            });
        }

        sync_variants.push(SyncVariant {
            variant_id: variant.id,
            retail_price: listing.price.clone(),
            files,
        });
    }

    SyncProductRequest {
        sync_product: SyncProduct {
            name: listing_title(&listing.brand, &record.title, product_type),
            thumbnail: record.front_light_url.clone().or_else(|| record.front_dark_url.clone()),
        },
        sync_variants,
    }
}

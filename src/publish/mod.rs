//! Storefront publishing: a public image host for print files and the
//! print-on-demand marketplace that consumes them by URL.
//!
//! Both services sit behind traits so the workflow can run against fakes in
//! tests and against the real HTTP clients in production.

use std::path::Path;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::error::MonoprintResult;

mod imgur;
mod printful;

pub use imgur::ImgurClient;
pub use printful::{
    CatalogVariant, CreatedProduct, PrintFile, PrintfulClient, SyncProduct, SyncProductRequest,
    SyncVariant, build_sync_request,
};

/// Hosts a local raster at a publicly fetchable URL.
pub trait ImageHost {
    fn upload(&self, path: &Path, title: &str) -> MonoprintResult<String>;
}

/// Creates and publishes synchronized product listings.
pub trait Marketplace {
    fn create_product(&self, request: &SyncProductRequest) -> MonoprintResult<CreatedProduct>;
    fn publish(&self, product_id: u64) -> MonoprintResult<()>;
}

/// Serializes outbound requests and enforces a minimum spacing between them.
/// Both external services rate-limit aggressively enough that pacing up front
/// beats handling 429 responses.
pub(crate) struct Pacer {
    min_interval: Duration,
    last: Mutex<Option<Instant>>,
}

impl Pacer {
    pub(crate) fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last: Mutex::new(None),
        }
    }

    pub(crate) fn pace(&self) {
        let mut last = self.last.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(prev) = *last {
            let elapsed = prev.elapsed();
            if elapsed < self.min_interval {
                std::thread::sleep(self.min_interval - elapsed);
            }
        }
        *last = Some(Instant::now());
    }
}

//! Imgur upload client. PNGs are sent base64-encoded in a JSON body, which
//! keeps transparency intact end to end.

use std::path::Path;
use std::time::Duration;

use anyhow::Context as _;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use tracing::{info, warn};

use crate::error::{MonoprintError, MonoprintResult};

use super::{ImageHost, Pacer};

const UPLOAD_URL: &str = "https://api.imgur.com/3/upload";
const UPLOAD_TIMEOUT: Duration = Duration::from_secs(60);
/// Spacing between uploads; anonymous clients are rate-limited hard.
const UPLOAD_INTERVAL: Duration = Duration::from_millis(1500);

pub struct ImgurClient {
    http: reqwest::blocking::Client,
    client_id: String,
    pacer: Pacer,
}

#[derive(serde::Serialize)]
struct UploadPayload<'a> {
    image: String,
    #[serde(rename = "type")]
    kind: &'a str,
    title: &'a str,
    description: &'a str,
}

#[derive(serde::Deserialize)]
struct UploadResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    data: UploadData,
}

#[derive(Default, serde::Deserialize)]
struct UploadData {
    #[serde(default)]
    link: Option<String>,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

impl ImgurClient {
    pub fn new(client_id: impl Into<String>) -> MonoprintResult<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(UPLOAD_TIMEOUT)
            .user_agent(concat!("monoprint/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("build imgur http client")?;
        Ok(Self {
            http,
            client_id: client_id.into(),
            pacer: Pacer::new(UPLOAD_INTERVAL),
        })
    }
}

impl ImageHost for ImgurClient {
    fn upload(&self, path: &Path, title: &str) -> MonoprintResult<String> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("read upload source '{}'", path.display()))?;

        self.pacer.pace();
        info!(path = %path.display(), bytes = bytes.len(), "uploading image");

        let payload = UploadPayload {
            image: BASE64.encode(&bytes),
            kind: "base64",
            title,
            description: "monoprint drop asset",
        };

        let response = self
            .http
            .post(UPLOAD_URL)
            .header("Authorization", format!("Client-ID {}", self.client_id))
            .json(&payload)
            .send()
            .context("imgur upload request")?
            .error_for_status()
            .context("imgur upload status")?;

        let parsed: UploadResponse = response.json().context("parse imgur response")?;
        if !parsed.success {
            let detail = parsed
                .data
                .error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "no error detail".to_string());
            warn!(path = %path.display(), detail = %detail, "imgur rejected upload");
            return Err(MonoprintError::publish(format!("imgur rejected upload: {detail}")));
        }

        match parsed.data.link {
            Some(link) if !link.is_empty() => Ok(link),
            _ => Err(MonoprintError::publish("imgur returned an empty link")),
        }
    }
}

//! HTTP image host client.
//!
//! Posts the exported image as a multipart form (`image` part) and reads
//! the public URL back from the JSON reply. Hosts disagree on where they
//! put it, so `data.url`, `secure_url` and `url` are tried in that order.

use std::time::Duration;

use canvas::session::{ImageUploader, UploadError};
use reqwest::multipart::{Form, Part};
use serde_json::Value;
use tracing::debug;

use crate::config::UploadConfig;

const CONNECT_TIMEOUT_SECS: u64 = 10;

pub struct HttpUploader {
    http: reqwest::Client,
    url: String,
    api_key: Option<String>,
}

impl HttpUploader {
    /// # Errors
    ///
    /// Returns [`UploadError::Network`] if the HTTP client cannot be built.
    pub fn new(config: &UploadConfig) -> Result<Self, UploadError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(|e| UploadError::Network(e.to_string()))?;
        Ok(Self { http, url: config.url.clone(), api_key: config.api_key.clone() })
    }
}

#[async_trait::async_trait]
impl ImageUploader for HttpUploader {
    async fn upload(&self, bytes: Vec<u8>, mime: &str) -> Result<String, UploadError> {
        let size = bytes.len();
        let part = Part::bytes(bytes)
            .file_name(file_name(mime))
            .mime_str(mime)
            .map_err(|e| UploadError::Network(e.to_string()))?;
        let form = Form::new().part("image", part);

        let mut request = self.http.post(&self.url).multipart(form);
        if let Some(key) = &self.api_key {
            request = request.query(&[("key", key)]);
        }

        debug!(url = %self.url, size, mime, "uploading design");
        let response = request.send().await.map_err(|e| UploadError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response.text().await.map_err(|e| UploadError::Network(e.to_string()))?;
        if !(200..300).contains(&status) {
            return Err(UploadError::Status { status, body: text });
        }

        parse_upload_response(&text)
    }
}

/// Extract the public URL from an image host reply.
///
/// # Errors
///
/// Returns [`UploadError::Response`] for non-JSON bodies or replies without
/// a usable URL.
pub fn parse_upload_response(text: &str) -> Result<String, UploadError> {
    let json: Value = serde_json::from_str(text).map_err(|e| UploadError::Response(e.to_string()))?;
    [json.pointer("/data/url"), json.get("secure_url"), json.get("url")]
        .into_iter()
        .flatten()
        .filter_map(Value::as_str)
        .find(|url| !url.is_empty())
        .map(str::to_owned)
        .ok_or_else(|| UploadError::Response("no image URL in response".into()))
}

fn file_name(mime: &str) -> &'static str {
    match mime {
        "image/jpeg" => "design.jpg",
        _ => "design.png",
    }
}

#[cfg(test)]
#[path = "upload_test.rs"]
mod tests;

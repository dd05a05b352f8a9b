// src/core/service_client.rs
//! HTTP collaborators: paged data sources and the interview upload service

use anyhow::{Context, Result};
use reqwest::multipart::{Form, Part};
use serde_json::Value;
use std::time::Duration;
use tracing::{error, info, trace};

use crate::types::{InterviewUploadResponse, UploadableFile};

fn build_client(timeout_seconds: u64) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_seconds))
        .build()
        .context("Failed to create HTTP client")
}

/// One paged endpoint of the backend, fetched with `?page=N&page_size=M`
pub struct HttpPageSource {
    client: reqwest::Client,
    url: String,
}

impl HttpPageSource {
    pub fn new(base_url: &str, endpoint: &str, timeout_seconds: u64) -> Result<Self> {
        Ok(Self {
            client: build_client(timeout_seconds)?,
            url: format!("{}{}", base_url, endpoint),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Raw payload of one page; shape classification is left to the aggregator
    pub async fn fetch_page(&self, page: u32, page_size: u32) -> Result<Value> {
        trace!("GET {} page={} page_size={}", self.url, page, page_size);

        let response = self
            .client
            .get(&self.url)
            .query(&[("page", page), ("page_size", page_size)])
            .send()
            .await
            .with_context(|| format!("Failed to GET from {}", self.url))?;

        let status = response.status();
        if status.is_success() {
            response
                .json::<Value>()
                .await
                .context("Failed to parse JSON response")
        } else {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            anyhow::bail!("HTTP {} error: {}", status, error_text)
        }
    }
}

/// Submits recorded interview answers for processing
pub struct InterviewUploadClient {
    client: reqwest::Client,
    base_url: String,
    endpoint: String,
}

impl InterviewUploadClient {
    pub fn new(base_url: String, endpoint: String, timeout_seconds: u64) -> Result<Self> {
        Ok(Self {
            client: build_client(timeout_seconds)?,
            base_url,
            endpoint,
        })
    }

    pub async fn upload(&self, file: &UploadableFile) -> Result<InterviewUploadResponse> {
        let url = format!("{}{}", self.base_url, self.endpoint);

        let form = Form::new()
            .text("recorded_at", file.last_modified.to_rfc3339())
            .part(
                "video",
                Part::bytes(file.bytes.clone())
                    .file_name(file.name.clone())
                    .mime_str(&file.media_type)
                    .context("Failed to create multipart")?,
            );

        info!("Uploading {} ({} bytes) to {}", file.name, file.bytes.len(), url);

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .context("HTTP request failed")?;

        let status = response.status();
        if status.is_success() {
            let upload_response: InterviewUploadResponse = response
                .json()
                .await
                .context("Failed to parse upload response")?;

            if upload_response.status == "success" {
                Ok(upload_response)
            } else {
                anyhow::bail!(
                    "Interview upload failed: {}",
                    upload_response
                        .message
                        .as_deref()
                        .unwrap_or(&upload_response.status)
                )
            }
        } else {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());

            error!("Upload service error response: {}", error_text);
            anyhow::bail!("Service returned error status {}: {}", status, error_text)
        }
    }
}

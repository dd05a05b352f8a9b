// src/export/service.rs
//! Named-source export: aggregate every page, then write one CSV

use anyhow::Result;
use serde_json::Value;
use std::future::Future;
use tracing::{error, info};

use super::aggregator::aggregate;
use super::csv_writer::export_csv;
use super::sink::ArtifactSink;
use crate::core::{ConfigManager, HttpPageSource};
use crate::types::ExportOutcome;
use crate::utils::normalize_export_name;

pub struct ExportService<S: ArtifactSink> {
    config: ConfigManager,
    sink: S,
}

impl<S: ArtifactSink> ExportService<S> {
    pub fn new(config: ConfigManager, sink: S) -> Self {
        Self { config, sink }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Export a configured data source through the backend API
    pub async fn export_source(&self, name: &str, page_size: Option<u32>) -> Result<ExportOutcome> {
        let endpoint = self.config.source_endpoint(name)?;
        let source = HttpPageSource::new(
            &self.config.service.api_base_url,
            endpoint,
            self.config.service.timeout_seconds,
        )?;

        info!("Exporting {} from {}", name, source.url());

        self.export_with(
            |page, size| source.fetch_page(page, size),
            name,
            page_size.unwrap_or(self.config.export.page_size),
        )
        .await
    }

    /// Export from any page-fetch function. Nothing is written on failure.
    pub async fn export_with<F, Fut>(
        &self,
        fetch_page: F,
        name: &str,
        page_size: u32,
    ) -> Result<ExportOutcome>
    where
        F: FnMut(u32, u32) -> Fut,
        Fut: Future<Output = Result<Value>>,
    {
        let base_filename = normalize_export_name(name);

        let records = match aggregate(fetch_page, page_size).await {
            Ok(records) => records,
            Err(e) => {
                error!("Export of {} failed, no file written: {:#}", name, e);
                return Err(e);
            }
        };

        let rows = records.len();
        match export_csv(&self.sink, &records, &base_filename)? {
            Some(filename) => {
                info!("Exported {} row(s) of {} to {}", rows, name, filename);
                Ok(ExportOutcome::Exported { filename, rows })
            }
            None => Ok(ExportOutcome::NothingToExport),
        }
    }
}

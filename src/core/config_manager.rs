// src/core/config_manager.rs
//! Configuration from environment variables with an optional TOML overlay

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::export::aggregator::DEFAULT_PAGE_SIZE;
use crate::video_validator::DEFAULT_MAX_SIZE_MB;

const DEFAULT_API_URL: &str = "http://127.0.0.1:5555";
const DEFAULT_UPLOAD_ENDPOINT: &str = "/interviews/upload";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct ConfigManager {
    pub environment: EnvironmentConfig,
    pub service: ServiceConfig,
    pub export: ExportConfig,
    pub video: VideoConfig,
}

#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub output_path: PathBuf,
    pub staging_path: PathBuf,
    pub log_file: PathBuf,
}

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub api_base_url: String,
    pub upload_endpoint: String,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone)]
pub struct ExportConfig {
    pub page_size: u32,
    /// data source name -> endpoint path
    pub sources: BTreeMap<String, String>,
}

#[derive(Debug, Clone)]
pub struct VideoConfig {
    pub max_size_mb: f64,
}

/// Shape of the optional TOML file; every key is optional
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    api_base_url: Option<String>,
    upload_endpoint: Option<String>,
    timeout_seconds: Option<u64>,
    output_dir: Option<PathBuf>,
    staging_dir: Option<PathBuf>,
    log_file: Option<PathBuf>,
    page_size: Option<u32>,
    max_video_size_mb: Option<f64>,
    #[serde(default)]
    sources: BTreeMap<String, String>,
}

impl ConfigManager {
    /// Load all configurations
    pub fn load() -> Result<Self> {
        let file = match std::env::var("JOBASSIST_CONFIG") {
            Ok(path) => Self::load_file(Path::new(&path))?,
            Err(_) => FileConfig::default(),
        };

        Self::from_parts(file, |key| std::env::var(key).ok())
    }

    fn load_file(path: &Path) -> Result<FileConfig> {
        info!("Loading configuration file: {}", path.display());
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Merge file values with environment lookups; environment wins
    fn from_parts(file: FileConfig, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let base_dir = std::env::current_dir().context("Failed to get current directory")?;

        let output_path = env("JOBASSIST_OUTPUT_DIR")
            .map(PathBuf::from)
            .or(file.output_dir)
            .unwrap_or_else(|| base_dir.join("exports"));
        let staging_path = env("JOBASSIST_STAGING_DIR")
            .map(PathBuf::from)
            .or(file.staging_dir)
            .unwrap_or_else(|| output_path.join(".staging"));
        let log_file = env("JOBASSIST_LOG_FILE")
            .map(PathBuf::from)
            .or(file.log_file)
            .unwrap_or_else(|| PathBuf::from("/tmp/jobassist.log"));

        let api_base_url = env("JOBASSIST_API_URL")
            .or(file.api_base_url)
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let timeout_seconds = match env("JOBASSIST_TIMEOUT_SECS") {
            Some(raw) => raw
                .parse::<u64>()
                .map_err(|_| anyhow::anyhow!("JOBASSIST_TIMEOUT_SECS must be a number of seconds"))?,
            None => file.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECS),
        };

        let page_size = match env("JOBASSIST_PAGE_SIZE") {
            Some(raw) => raw
                .parse::<u32>()
                .map_err(|_| anyhow::anyhow!("JOBASSIST_PAGE_SIZE must be a positive integer"))?,
            None => file.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
        };
        if page_size == 0 {
            anyhow::bail!("Page size must be greater than zero");
        }

        let max_size_mb = match env("JOBASSIST_MAX_VIDEO_MB") {
            Some(raw) => raw
                .parse::<f64>()
                .map_err(|_| anyhow::anyhow!("JOBASSIST_MAX_VIDEO_MB must be a number"))?,
            None => file.max_video_size_mb.unwrap_or(DEFAULT_MAX_SIZE_MB),
        };

        let sources = if file.sources.is_empty() {
            Self::default_sources()
        } else {
            file.sources
        };

        Ok(Self {
            environment: EnvironmentConfig {
                output_path,
                staging_path,
                log_file,
            },
            service: ServiceConfig {
                api_base_url: api_base_url.trim_end_matches('/').to_string(),
                upload_endpoint: file
                    .upload_endpoint
                    .unwrap_or_else(|| DEFAULT_UPLOAD_ENDPOINT.to_string()),
                timeout_seconds,
            },
            export: ExportConfig { page_size, sources },
            video: VideoConfig { max_size_mb },
        })
    }

    fn default_sources() -> BTreeMap<String, String> {
        [
            ("applications", "/applications"),
            ("contacts", "/contacts"),
            ("jobs", "/jobs"),
        ]
        .into_iter()
        .map(|(name, endpoint)| (name.to_string(), endpoint.to_string()))
        .collect()
    }

    /// Endpoint path for a named data source
    pub fn source_endpoint(&self, name: &str) -> Result<&str> {
        self.export
            .sources
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "Unknown data source: {}. Available: {:?}",
                    name,
                    self.export.sources.keys().collect::<Vec<_>>()
                )
            })
    }
}

// src/lib.rs
//! Data export and interview-recording helpers for the job-search assistant

pub mod core;
pub mod export;
pub mod export_cli;
pub mod types;
pub mod utils;
pub mod video_validator;

pub use crate::core::ConfigManager;
pub use export::{aggregate, export_csv, to_csv, ArtifactSink, ExportService};
pub use types::{ExportOutcome, PageShape, Record, VideoChunk};
pub use video_validator::{VideoBlobGuard, VideoValidationError};

// src/export/mod.rs
//! Paged aggregation and CSV export

pub mod aggregator;
pub mod csv_writer;
pub mod service;
pub mod sink;

pub use aggregator::{aggregate, DEFAULT_PAGE_SIZE};
pub use csv_writer::{csv_filename, export_csv, to_csv, trigger_download};
pub use service::ExportService;
pub use sink::{ArtifactSink, FsArtifactSink, HandleGuard, MemorySink};

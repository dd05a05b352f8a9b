// src/types/mod.rs
pub mod media;
pub mod page;
pub mod record;
pub mod response;

pub use media::{CombinedVideo, UploadableFile, VideoChunk};
pub use page::{classify_page, PageShape};
pub use record::Record;
pub use response::{ExportOutcome, InterviewUploadResponse};

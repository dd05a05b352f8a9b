// src/types/media.rs
//! Binary media units produced by the recorder and consumed by the uploader

use chrono::{DateTime, Utc};

pub const COMBINED_MEDIA_TYPE: &str = "video/webm";

/// One recorded segment of an interview session
#[derive(Debug, Clone, PartialEq)]
pub struct VideoChunk {
    pub bytes: Vec<u8>,
    pub media_type: String,
}

impl VideoChunk {
    pub fn new(bytes: Vec<u8>, media_type: impl Into<String>) -> Self {
        Self {
            bytes,
            media_type: media_type.into(),
        }
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    /// Only `video/*` media types count as video blobs; codec parameters are allowed.
    pub fn is_video(&self) -> bool {
        let essence = self
            .media_type
            .split(';')
            .next()
            .unwrap_or("")
            .trim()
            .to_ascii_lowercase();
        essence
            .strip_prefix("video/")
            .is_some_and(|subtype| !subtype.is_empty())
    }
}

/// Valid chunks concatenated into one playable unit
#[derive(Debug, Clone, PartialEq)]
pub struct CombinedVideo {
    pub bytes: Vec<u8>,
    pub media_type: String,
    pub chunk_count: usize,
}

impl CombinedVideo {
    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

/// Named, timestamped file ready for the upload collaborator
#[derive(Debug, Clone)]
pub struct UploadableFile {
    pub name: String,
    pub media_type: String,
    pub last_modified: DateTime<Utc>,
    pub bytes: Vec<u8>,
}

/// Map a file extension to the media type the recorder would have tagged it with
pub fn media_type_for_extension(ext: &str) -> &'static str {
    match ext.to_lowercase().as_str() {
        "webm" => "video/webm",
        "mp4" | "m4v" => "video/mp4",
        "mkv" => "video/x-matroska",
        "mov" => "video/quicktime",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_video() {
        assert!(VideoChunk::new(vec![1], "video/webm").is_video());
        assert!(VideoChunk::new(vec![1], "video/webm;codecs=vp9,opus").is_video());
        assert!(VideoChunk::new(vec![1], "Video/MP4").is_video());
        assert!(!VideoChunk::new(vec![1], "audio/webm").is_video());
        assert!(!VideoChunk::new(vec![1], "video/").is_video());
        assert!(!VideoChunk::new(vec![1], "").is_video());
    }

    #[test]
    fn test_media_type_for_extension() {
        assert_eq!(media_type_for_extension("WEBM"), "video/webm");
        assert_eq!(media_type_for_extension("mp4"), "video/mp4");
        assert_eq!(media_type_for_extension("txt"), "application/octet-stream");
    }
}

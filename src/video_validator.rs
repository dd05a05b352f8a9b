// src/video_validator.rs
use anyhow::Result;
use chrono::Utc;
use tracing::{error, info, warn};

use crate::export::sink::{is_temporary_handle, ArtifactSink};
use crate::types::media::COMBINED_MEDIA_TYPE;
use crate::types::{CombinedVideo, UploadableFile, VideoChunk};
use crate::utils::bytes_to_mb;

pub const DEFAULT_MAX_SIZE_MB: f64 = 100.0;

#[derive(Debug, Clone)]
pub struct VideoValidationError {
    pub error_type: VideoErrorType,
    pub message: String,
    pub suggestion: String,
}

impl std::fmt::Display for VideoValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for VideoValidationError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoErrorType {
    Missing,
    WrongType,
    Empty,
    TooLarge,
}

impl VideoErrorType {
    /// Short reason shown next to the upload button
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Missing => "missing",
            Self::WrongType => "wrong-type",
            Self::Empty => "empty",
            Self::TooLarge => "too-large",
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Missing => "VIDEO_MISSING",
            Self::WrongType => "VIDEO_WRONG_TYPE",
            Self::Empty => "VIDEO_EMPTY",
            Self::TooLarge => "VIDEO_TOO_LARGE",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidatedVideo {
    pub size_mb: f64,
}

pub struct VideoBlobGuard;

impl VideoBlobGuard {
    /// Validate a recorded video before upload
    pub fn validate(
        chunk: Option<&VideoChunk>,
        max_size_mb: f64,
    ) -> Result<ValidatedVideo, VideoValidationError> {
        let Some(chunk) = chunk else {
            return Err(VideoValidationError {
                error_type: VideoErrorType::Missing,
                message: "No video recording provided".to_string(),
                suggestion: "Record your answer before submitting".to_string(),
            });
        };

        if !chunk.is_video() {
            return Err(VideoValidationError {
                error_type: VideoErrorType::WrongType,
                message: format!("Invalid video data type: {:?}", chunk.media_type),
                suggestion: "Please record again or upload a WebM/MP4 video".to_string(),
            });
        }

        if chunk.size() == 0 {
            return Err(VideoValidationError {
                error_type: VideoErrorType::Empty,
                message: "Video recording is empty".to_string(),
                suggestion: "Check your camera and record again".to_string(),
            });
        }

        let size_mb = bytes_to_mb(chunk.size());
        let exact_mb = chunk.size() as f64 / (1024.0 * 1024.0);
        if exact_mb > max_size_mb {
            return Err(VideoValidationError {
                error_type: VideoErrorType::TooLarge,
                message: format!(
                    "Video file too large: {:.2}MB exceeds {}MB limit",
                    size_mb, max_size_mb
                ),
                suggestion: "Please record a shorter answer".to_string(),
            });
        }

        Ok(ValidatedVideo { size_mb })
    }

    /// Concatenate the usable chunks of a recording session, in order.
    /// Returns `None` when no chunk survives filtering.
    pub fn combine(chunks: &[VideoChunk]) -> Option<CombinedVideo> {
        let valid: Vec<&VideoChunk> = chunks
            .iter()
            .enumerate()
            .filter_map(|(index, chunk)| {
                if !chunk.is_video() {
                    warn!("Dropping chunk {}: not a video ({:?})", index, chunk.media_type);
                    None
                } else if chunk.size() == 0 {
                    warn!("Dropping chunk {}: empty", index);
                    None
                } else {
                    Some(chunk)
                }
            })
            .collect();

        if valid.is_empty() {
            warn!("No valid video chunks to combine");
            return None;
        }

        let total: usize = valid.iter().map(|chunk| chunk.size()).sum();
        let mut bytes = Vec::with_capacity(total);
        for chunk in &valid {
            bytes.extend_from_slice(&chunk.bytes);
        }

        info!(
            "Combined {} of {} chunk(s) into {:.2}MB",
            valid.len(),
            chunks.len(),
            bytes_to_mb(total)
        );

        Some(CombinedVideo {
            bytes,
            media_type: COMBINED_MEDIA_TYPE.to_string(),
            chunk_count: valid.len(),
        })
    }

    /// Wrap a video for the upload collaborator. Malformed input is a hard error.
    pub fn wrap_for_upload(chunk: Option<&VideoChunk>, filename: &str) -> Result<UploadableFile> {
        let chunk = chunk.ok_or_else(|| anyhow::anyhow!("Invalid blob provided: no video"))?;
        if !chunk.is_video() {
            anyhow::bail!("Invalid blob provided: {:?} is not a video", chunk.media_type);
        }
        if chunk.size() == 0 {
            anyhow::bail!("Invalid blob provided: video is empty");
        }

        Ok(UploadableFile {
            name: filename.to_string(),
            media_type: chunk.media_type.clone(),
            last_modified: Utc::now(),
            bytes: chunk.bytes.clone(),
        })
    }

    /// Temporary handle for local playback. The caller must hand it back to
    /// `release_preview_handle` once the preview is gone.
    pub fn create_preview_handle<S: ArtifactSink + ?Sized>(
        sink: &S,
        chunk: Option<&VideoChunk>,
    ) -> Option<String> {
        let chunk = chunk.filter(|c| c.is_video() && c.size() > 0)?;

        match sink.create_temporary_handle(&chunk.bytes, &chunk.media_type) {
            Ok(handle) => Some(handle),
            Err(e) => {
                error!("Failed to create preview handle: {:#}", e);
                None
            }
        }
    }

    /// Release a preview handle. Strings that are not temporary handles are ignored.
    pub fn release_preview_handle<S: ArtifactSink + ?Sized>(sink: &S, handle: &str) -> bool {
        if !is_temporary_handle(handle) {
            warn!("Ignoring release of unrecognized handle: {}", handle);
            return false;
        }
        sink.release_handle(handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::sink::MemorySink;

    const MB: usize = 1024 * 1024;

    fn webm(bytes: &[u8]) -> VideoChunk {
        VideoChunk::new(bytes.to_vec(), "video/webm;codecs=vp8,opus")
    }

    #[test]
    fn test_validate_ok_reports_size() {
        let chunk = VideoChunk::new(vec![0u8; 3 * MB / 2], "video/webm");
        let validated = VideoBlobGuard::validate(Some(&chunk), DEFAULT_MAX_SIZE_MB).unwrap();
        assert_eq!(validated.size_mb, 1.5);
    }

    #[test]
    fn test_validate_missing_and_wrong_type() {
        let err = VideoBlobGuard::validate(None, DEFAULT_MAX_SIZE_MB).unwrap_err();
        assert_eq!(err.error_type.reason(), "missing");

        let audio = VideoChunk::new(vec![1, 2, 3], "audio/ogg");
        let err = VideoBlobGuard::validate(Some(&audio), DEFAULT_MAX_SIZE_MB).unwrap_err();
        assert_eq!(err.error_type, VideoErrorType::WrongType);
        assert_eq!(err.error_type.code(), "VIDEO_WRONG_TYPE");
    }

    #[test]
    fn test_validate_empty() {
        let err = VideoBlobGuard::validate(Some(&webm(&[])), DEFAULT_MAX_SIZE_MB).unwrap_err();
        assert_eq!(err.error_type.reason(), "empty");
    }

    #[test]
    fn test_validate_too_large_message() {
        let chunk = VideoChunk::new(vec![0u8; 150 * MB], "video/webm");
        let err = VideoBlobGuard::validate(Some(&chunk), 100.0).unwrap_err();
        assert_eq!(err.error_type.reason(), "too-large");
        assert!(err.message.contains("150.00MB"));
        assert!(err.message.contains("100MB"));
    }

    #[test]
    fn test_validate_exactly_at_limit_passes() {
        let chunk = VideoChunk::new(vec![0u8; 2 * MB], "video/mp4");
        assert!(VideoBlobGuard::validate(Some(&chunk), 2.0).is_ok());
    }

    #[test]
    fn test_validate_just_over_limit_is_too_large() {
        let one_byte_over = VideoChunk::new(vec![0u8; 2 * MB + 1], "video/mp4");
        let err = VideoBlobGuard::validate(Some(&one_byte_over), 2.0).unwrap_err();
        assert_eq!(err.error_type, VideoErrorType::TooLarge);

        // rounds to 100.00MB but is still over the limit
        let chunk = VideoChunk::new(vec![0u8; 100 * MB + 5000], "video/webm");
        let err = VideoBlobGuard::validate(Some(&chunk), 100.0).unwrap_err();
        assert_eq!(err.error_type.reason(), "too-large");
        assert!(err.message.contains("100.00MB"));
    }

    #[test]
    fn test_combine_skips_empty_and_foreign_chunks() {
        let chunks = vec![
            webm(b"AAA"),
            webm(b""),
            VideoChunk::new(b"zzz".to_vec(), "text/plain"),
            webm(b"BB"),
        ];

        let combined = VideoBlobGuard::combine(&chunks).unwrap();
        assert_eq!(combined.bytes, b"AAABB");
        assert_eq!(combined.media_type, "video/webm");
        assert_eq!(combined.chunk_count, 2);
    }

    #[test]
    fn test_combine_nothing_valid() {
        assert!(VideoBlobGuard::combine(&[]).is_none());
        assert!(VideoBlobGuard::combine(&[webm(b"")]).is_none());
    }

    #[test]
    fn test_wrap_for_upload() {
        let file = VideoBlobGuard::wrap_for_upload(Some(&webm(b"data")), "answer-1.webm").unwrap();
        assert_eq!(file.name, "answer-1.webm");
        assert_eq!(file.bytes, b"data");
        assert!(file.media_type.starts_with("video/webm"));

        assert!(VideoBlobGuard::wrap_for_upload(None, "x.webm").is_err());
        let text = VideoChunk::new(b"data".to_vec(), "text/plain");
        assert!(VideoBlobGuard::wrap_for_upload(Some(&text), "x.webm").is_err());
        assert!(VideoBlobGuard::wrap_for_upload(Some(&webm(b"")), "x.webm").is_err());
    }

    #[test]
    fn test_preview_handle_lifecycle() {
        let sink = MemorySink::new();
        let chunk = webm(b"frames");

        let handle = VideoBlobGuard::create_preview_handle(&sink, Some(&chunk)).unwrap();
        assert_eq!(sink.resolve(&handle).unwrap().1, b"frames");

        assert!(VideoBlobGuard::release_preview_handle(&sink, &handle));
        assert_eq!(sink.live_handles(), 0);
    }

    #[test]
    fn test_preview_handle_invalid_input() {
        let sink = MemorySink::new();
        assert!(VideoBlobGuard::create_preview_handle(&sink, None).is_none());
        assert!(VideoBlobGuard::create_preview_handle(&sink, Some(&webm(b""))).is_none());
        assert_eq!(sink.live_handles(), 0);
    }

    #[test]
    fn test_release_rejects_foreign_handles() {
        let sink = MemorySink::new();
        let handle = VideoBlobGuard::create_preview_handle(&sink, Some(&webm(b"x"))).unwrap();

        assert!(!VideoBlobGuard::release_preview_handle(&sink, "https://cdn.example.com/a.webm"));
        assert!(!VideoBlobGuard::release_preview_handle(&sink, ""));
        assert_eq!(sink.live_handles(), 1);

        assert!(VideoBlobGuard::release_preview_handle(&sink, &handle));
    }
}

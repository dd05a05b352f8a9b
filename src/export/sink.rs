// src/export/sink.rs
//! Artifact sinks: where exported files and temporary handles live

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, warn};
use uuid::Uuid;

pub const HANDLE_PREFIX: &str = "blob:";

/// Persistence and temporary-handle capability behind downloads and previews
pub trait ArtifactSink {
    /// Persist `bytes` under `filename`, returning where they ended up
    fn save(&self, bytes: &[u8], filename: &str) -> Result<PathBuf>;

    /// Register bytes under a new temporary handle owned by the caller
    fn create_temporary_handle(&self, bytes: &[u8], media_type: &str) -> Result<String>;

    /// Release a handle. Returns false if the sink did not know it.
    fn release_handle(&self, handle: &str) -> bool;
}

pub fn is_temporary_handle(handle: &str) -> bool {
    handle
        .strip_prefix(HANDLE_PREFIX)
        .is_some_and(|id| !id.is_empty())
}

fn new_handle() -> String {
    format!("{}{}", HANDLE_PREFIX, Uuid::new_v4())
}

/// Owns one temporary handle and releases it when dropped
pub struct HandleGuard<'a, S: ArtifactSink + ?Sized> {
    sink: &'a S,
    handle: Option<String>,
}

impl<'a, S: ArtifactSink + ?Sized> HandleGuard<'a, S> {
    pub fn new(sink: &'a S, handle: String) -> Self {
        Self {
            sink,
            handle: Some(handle),
        }
    }

    pub fn handle(&self) -> &str {
        self.handle.as_deref().unwrap_or("")
    }
}

impl<S: ArtifactSink + ?Sized> Drop for HandleGuard<'_, S> {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            if !self.sink.release_handle(&handle) {
                warn!("Temporary handle {} was already released", handle);
            }
        }
    }
}

// ===== Filesystem sink =====

/// Saves into an output directory; temporary handles are staged files
pub struct FsArtifactSink {
    output_dir: PathBuf,
    staging_dir: PathBuf,
    staged: Mutex<HashMap<String, PathBuf>>,
}

impl FsArtifactSink {
    pub fn new(output_dir: PathBuf, staging_dir: PathBuf) -> Self {
        Self {
            output_dir,
            staging_dir,
            staged: Mutex::new(HashMap::new()),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Path of the staged file behind a live handle
    #[cfg(test)]
    pub(crate) fn staged_path(&self, handle: &str) -> Option<PathBuf> {
        self.staged
            .lock()
            .ok()
            .and_then(|staged| staged.get(handle).cloned())
    }

    fn ensure_dir(path: &Path) -> Result<()> {
        if !path.exists() {
            fs::create_dir_all(path)
                .with_context(|| format!("Failed to create directory: {}", path.display()))?;
            debug!("Created directory: {}", path.display());
        }
        Ok(())
    }
}

impl ArtifactSink for FsArtifactSink {
    fn save(&self, bytes: &[u8], filename: &str) -> Result<PathBuf> {
        let safe_name = crate::utils::sanitize_filename(filename);
        if safe_name.is_empty() {
            anyhow::bail!("Refusing to save artifact with empty filename");
        }

        Self::ensure_dir(&self.output_dir)?;
        let path = self.output_dir.join(safe_name);
        fs::write(&path, bytes)
            .with_context(|| format!("Failed to write file: {}", path.display()))?;

        Ok(path)
    }

    fn create_temporary_handle(&self, bytes: &[u8], media_type: &str) -> Result<String> {
        Self::ensure_dir(&self.staging_dir)?;

        let handle = new_handle();
        let id = handle.trim_start_matches(HANDLE_PREFIX);
        let path = self.staging_dir.join(format!("{}.part", id));
        fs::write(&path, bytes)
            .with_context(|| format!("Failed to stage file: {}", path.display()))?;

        self.staged
            .lock()
            .map_err(|_| anyhow::anyhow!("Staging registry lock poisoned"))?
            .insert(handle.clone(), path);

        debug!("Created handle {} ({}, {} bytes)", handle, media_type, bytes.len());
        Ok(handle)
    }

    fn release_handle(&self, handle: &str) -> bool {
        let path = match self.staged.lock() {
            Ok(mut staged) => staged.remove(handle),
            Err(_) => None,
        };

        match path {
            Some(path) => {
                if let Err(e) = fs::remove_file(&path) {
                    warn!("Failed to remove staged file {}: {}", path.display(), e);
                }
                debug!("Released handle {}", handle);
                true
            }
            None => false,
        }
    }
}

// ===== In-memory sink =====

#[derive(Default)]
struct MemoryState {
    saved: Vec<(String, Vec<u8>)>,
    handles: HashMap<String, (String, Vec<u8>)>,
}

/// Keeps everything in memory; used by tests and embedders without a filesystem
#[derive(Default)]
pub struct MemorySink {
    state: Mutex<MemoryState>,
    fail_saves: bool,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sink whose `save` always errors
    pub fn failing_saves() -> Self {
        Self {
            fail_saves: true,
            ..Self::default()
        }
    }

    pub fn saved(&self, filename: &str) -> Option<Vec<u8>> {
        let state = self.state.lock().ok()?;
        state
            .saved
            .iter()
            .find(|(name, _)| name == filename)
            .map(|(_, bytes)| bytes.clone())
    }

    pub fn saved_count(&self) -> usize {
        self.state.lock().map(|s| s.saved.len()).unwrap_or(0)
    }

    pub fn live_handles(&self) -> usize {
        self.state.lock().map(|s| s.handles.len()).unwrap_or(0)
    }

    /// Bytes and media type behind a live handle
    #[cfg(test)]
    pub(crate) fn resolve(&self, handle: &str) -> Option<(String, Vec<u8>)> {
        self.state.lock().ok()?.handles.get(handle).cloned()
    }
}

impl ArtifactSink for MemorySink {
    fn save(&self, bytes: &[u8], filename: &str) -> Result<PathBuf> {
        if self.fail_saves {
            anyhow::bail!("Save rejected for {}", filename);
        }
        self.state
            .lock()
            .map_err(|_| anyhow::anyhow!("Memory sink lock poisoned"))?
            .saved
            .push((filename.to_string(), bytes.to_vec()));
        Ok(PathBuf::from(filename))
    }

    fn create_temporary_handle(&self, bytes: &[u8], media_type: &str) -> Result<String> {
        let handle = new_handle();
        self.state
            .lock()
            .map_err(|_| anyhow::anyhow!("Memory sink lock poisoned"))?
            .handles
            .insert(handle.clone(), (media_type.to_string(), bytes.to_vec()));
        Ok(handle)
    }

    fn release_handle(&self, handle: &str) -> bool {
        self.state
            .lock()
            .map(|mut s| s.handles.remove(handle).is_some())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_temporary_handle() {
        assert!(is_temporary_handle("blob:1234"));
        assert!(!is_temporary_handle("blob:"));
        assert!(!is_temporary_handle("https://example.com/video.webm"));
        assert!(!is_temporary_handle(""));
    }

    #[test]
    fn test_guard_releases_on_drop() {
        let sink = MemorySink::new();
        {
            let handle = sink.create_temporary_handle(b"abc", "text/plain").unwrap();
            let guard = HandleGuard::new(&sink, handle);
            assert!(is_temporary_handle(guard.handle()));
            assert_eq!(sink.live_handles(), 1);
        }
        assert_eq!(sink.live_handles(), 0);
    }

    #[test]
    fn test_fs_sink_save_and_stage() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FsArtifactSink::new(dir.path().join("out"), dir.path().join("staging"));

        let path = sink.save(b"a,b\n1,2", "jobs_2024-01-01T00-00-00.csv").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"a,b\n1,2");
        assert!(path.starts_with(sink.output_dir()));

        let handle = sink.create_temporary_handle(b"video", "video/webm").unwrap();
        let staged = sink.staged_path(&handle).unwrap();
        assert!(staged.exists());

        assert!(sink.release_handle(&handle));
        assert!(!staged.exists());
        assert!(!sink.release_handle(&handle));
    }

    #[test]
    fn test_fs_sink_strips_path_components() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FsArtifactSink::new(dir.path().join("out"), dir.path().join("staging"));

        let path = sink.save(b"x", "../escape.csv").unwrap();
        assert!(path.starts_with(dir.path().join("out")));
    }
}

// src/export_cli.rs
use crate::core::{ConfigManager, InterviewUploadClient};
use crate::export::{ExportService, FsArtifactSink};
use crate::types::media::media_type_for_extension;
use crate::types::{ExportOutcome, VideoChunk};
use crate::utils::get_file_extension;
use crate::video_validator::VideoBlobGuard;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "jobassist")]
#[command(about = "Export job-search data to CSV and prepare interview recordings")]
pub struct ExportCli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Fetch every page of a data source and save it as CSV
    Export {
        source: String,
        #[arg(long)]
        page_size: Option<u32>,
    },
    /// List configured data sources
    Sources,
    /// Interview recording helpers
    Video {
        #[command(subcommand)]
        command: VideoCommand,
    },
}

#[derive(Subcommand)]
pub enum VideoCommand {
    /// Check that a recording can be uploaded
    Validate {
        file: PathBuf,
        #[arg(long)]
        max_mb: Option<f64>,
    },
    /// Concatenate recorded chunks into one file
    Combine { output: PathBuf, chunks: Vec<PathBuf> },
    /// Validate and upload a recording
    Upload {
        file: PathBuf,
        #[arg(long)]
        name: Option<String>,
    },
}

pub async fn handle_command(cli: ExportCli, config: ConfigManager) -> Result<()> {
    match cli.command {
        Command::Export { source, page_size } => {
            let sink = FsArtifactSink::new(
                config.environment.output_path.clone(),
                config.environment.staging_path.clone(),
            );
            let output_dir = sink.output_dir().to_path_buf();
            let service = ExportService::new(config, sink);

            match service.export_source(&source, page_size).await {
                Ok(ExportOutcome::Exported { filename, rows }) => {
                    println!(
                        "✅ Exported {} row(s) to {}",
                        rows,
                        output_dir.join(filename).display()
                    );
                }
                Ok(ExportOutcome::NothingToExport) => {
                    println!("ℹ️  Nothing to export for {}", source);
                }
                Err(e) => {
                    println!("❌ Export failed, no file was written: {:#}", e);
                    return Err(e);
                }
            }
        }

        Command::Sources => {
            println!("Configured data sources:");
            for (name, endpoint) in &config.export.sources {
                println!("  {} -> {}{}", name, config.service.api_base_url, endpoint);
            }
        }

        Command::Video { command } => handle_video_command(command, &config).await?,
    }

    Ok(())
}

async fn handle_video_command(command: VideoCommand, config: &ConfigManager) -> Result<()> {
    match command {
        VideoCommand::Validate { file, max_mb } => {
            let chunk = read_chunk(&file).await?;
            let max_mb = max_mb.unwrap_or(config.video.max_size_mb);

            match VideoBlobGuard::validate(Some(&chunk), max_mb) {
                Ok(validated) => {
                    println!("✅ {} is valid ({:.2}MB)", file.display(), validated.size_mb);
                }
                Err(validation_error) => {
                    println!(
                        "❌ {} [{}]: {}",
                        file.display(),
                        validation_error.error_type.reason(),
                        validation_error.message
                    );
                    println!("   {}", validation_error.suggestion);
                    return Err(validation_error.into());
                }
            }
        }

        VideoCommand::Combine { output, chunks } => {
            let mut recorded = Vec::with_capacity(chunks.len());
            for path in &chunks {
                recorded.push(read_chunk(path).await?);
            }

            let Some(combined) = VideoBlobGuard::combine(&recorded) else {
                println!("⚠️  No valid chunks to combine");
                return Ok(());
            };

            tokio::fs::write(&output, &combined.bytes)
                .await
                .with_context(|| format!("Failed to write file: {}", output.display()))?;
            println!(
                "✅ Combined {} of {} chunk(s) into {} ({} bytes)",
                combined.chunk_count,
                chunks.len(),
                output.display(),
                combined.size()
            );
        }

        VideoCommand::Upload { file, name } => {
            let chunk = read_chunk(&file).await?;
            if let Err(validation_error) =
                VideoBlobGuard::validate(Some(&chunk), config.video.max_size_mb)
            {
                error!("Refusing upload: {}", validation_error.message);
                return Err(validation_error.into());
            }

            let name = name.unwrap_or_else(|| {
                file.file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or("interview.webm")
                    .to_string()
            });
            let upload = VideoBlobGuard::wrap_for_upload(Some(&chunk), &name)?;

            let client = InterviewUploadClient::new(
                config.service.api_base_url.clone(),
                config.service.upload_endpoint.clone(),
                config.service.timeout_seconds,
            )?;
            let response = client.upload(&upload).await?;

            info!("Upload accepted: {:?}", response.interview_id);
            println!(
                "✅ Uploaded {} (interview: {})",
                upload.name,
                response.interview_id.as_deref().unwrap_or("pending")
            );
        }
    }

    Ok(())
}

/// Read a recording from disk, tagging it by extension
pub async fn read_chunk(path: &Path) -> Result<VideoChunk> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read file: {}", path.display()))?;
    let ext = get_file_extension(&path.to_string_lossy()).unwrap_or_default();
    Ok(VideoChunk::new(bytes, media_type_for_extension(&ext)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_export_command() {
        let cli = ExportCli::try_parse_from(["jobassist", "export", "jobs", "--page-size", "50"]).unwrap();
        match cli.command {
            Command::Export { source, page_size } => {
                assert_eq!(source, "jobs");
                assert_eq!(page_size, Some(50));
            }
            _ => panic!("expected export command"),
        }
    }

    #[test]
    fn test_parse_video_combine() {
        let cli =
            ExportCli::try_parse_from(["jobassist", "video", "combine", "out.webm", "a.webm", "b.webm"])
                .unwrap();
        match cli.command {
            Command::Video {
                command: VideoCommand::Combine { output, chunks },
            } => {
                assert_eq!(output, PathBuf::from("out.webm"));
                assert_eq!(chunks.len(), 2);
            }
            _ => panic!("expected video combine command"),
        }
    }

    #[tokio::test]
    async fn test_read_chunk_tags_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let webm = dir.path().join("take1.webm");
        let txt = dir.path().join("notes.txt");
        tokio::fs::write(&webm, b"frames").await.unwrap();
        tokio::fs::write(&txt, b"hello").await.unwrap();

        assert_eq!(read_chunk(&webm).await.unwrap().media_type, "video/webm");
        assert!(!read_chunk(&txt).await.unwrap().is_video());
    }
}

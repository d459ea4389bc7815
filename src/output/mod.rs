use anyhow::Context;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::channel::VideoRef;
use crate::transcribe::{AcquiredTranscript, TranscriptSource};
use crate::utils::{sanitize_filename, truncate_chars};
use crate::Result;

/// Per-video summary recorded in the channel metadata document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoSummary {
    pub video_id: String,
    pub title: String,
    pub upload_date: String,
    pub transcript_source: TranscriptSource,
    pub transcript_file: String,
}

/// Aggregated record written once per channel run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelMetadata {
    pub channel_url: String,
    pub channel_name: String,
    pub download_date: String,
    pub videos: Vec<VideoSummary>,
}

impl ChannelMetadata {
    pub fn new(channel_url: impl Into<String>, channel_name: impl Into<String>) -> Self {
        Self {
            channel_url: channel_url.into(),
            channel_name: channel_name.into(),
            download_date: Utc::now().to_rfc3339(),
            videos: Vec::new(),
        }
    }
}

/// Writes one channel's transcripts and metadata under the output root.
///
/// Layout: `<output_root>/<sanitized_channel_name>/transcripts/<file>` plus
/// `<output_root>/<sanitized_channel_name>/metadata.json`.
pub struct ChannelWriter {
    channel_dir: PathBuf,
    transcript_dir: PathBuf,
    title_max_chars: usize,
}

impl ChannelWriter {
    pub fn create(output_root: &Path, channel_name: &str, title_max_chars: usize) -> Result<Self> {
        let channel_dir = output_root.join(sanitize_filename(channel_name));
        let transcript_dir = channel_dir.join("transcripts");

        fs_err::create_dir_all(&transcript_dir)
            .context("Failed to create transcript output directories")?;

        Ok(Self {
            channel_dir,
            transcript_dir,
            title_max_chars,
        })
    }

    pub fn transcript_dir(&self) -> &Path {
        &self.transcript_dir
    }

    pub fn metadata_path(&self) -> PathBuf {
        self.channel_dir.join("metadata.json")
    }

    /// Filename for a video's transcript: upload date, truncated sanitized
    /// title, and video id.
    pub fn transcript_filename(&self, video: &VideoRef) -> String {
        let clean_title = truncate_chars(&sanitize_filename(&video.title), self.title_max_chars);
        format!("{}_{}_{}.txt", video.upload_date, clean_title, video.id)
    }

    /// Write one video's transcript file. Returns the filename used.
    pub fn write_transcript(
        &self,
        video: &VideoRef,
        transcript: &AcquiredTranscript,
    ) -> Result<String> {
        let filename = self.transcript_filename(video);
        let path = self.transcript_dir.join(&filename);

        let content = format!(
            "Title: {}\nVideo ID: {}\nUpload Date: {}\nTranscript Source: {}\n\n{}\n\n{}",
            video.title,
            video.id,
            video.upload_date,
            transcript.source,
            "=".repeat(50),
            transcript.text,
        );

        fs_err::write(&path, content)
            .with_context(|| format!("Failed to write transcript {}", path.display()))?;

        Ok(filename)
    }

    /// Write the aggregated channel metadata document.
    pub fn write_metadata(&self, metadata: &ChannelMetadata) -> Result<PathBuf> {
        let path = self.metadata_path();
        let json = serde_json::to_string_pretty(metadata)?;

        fs_err::write(&path, json)
            .with_context(|| format!("Failed to write metadata {}", path.display()))?;

        Ok(path)
    }
}

/// Concatenate every transcript file in a channel's transcript directory
/// into a single document. Returns the number of transcripts combined.
pub fn export_transcripts(transcript_dir: &Path, output_file: &Path) -> Result<usize> {
    let mut files: Vec<PathBuf> = fs_err::read_dir(transcript_dir)?
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.extension().map(|ext| ext == "txt").unwrap_or(false))
        .collect();
    files.sort();

    let mut combined = String::new();
    for path in &files {
        let title = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let transcript = fs_err::read_to_string(path)?;

        combined.push_str(&format!("Title: {}\n", title));
        combined.push_str(&transcript);
        combined.push_str("\n\n");
    }

    fs_err::write(output_file, combined)
        .with_context(|| format!("Failed to write {}", output_file.display()))?;

    Ok(files.len())
}

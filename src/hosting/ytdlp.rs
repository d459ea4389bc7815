use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use uuid::Uuid;

use async_trait::async_trait;

use super::{ChannelListing, HostingService, ListingEntry};
use crate::{Result, ScribeError};

/// Video-hosting service implementation backed by the yt-dlp binary
pub struct YtDlpService {
    yt_dlp_path: String,
}

impl YtDlpService {
    pub fn new() -> Self {
        Self {
            yt_dlp_path: "yt-dlp".to_string(),
        }
    }

    pub fn with_binary(path: impl Into<String>) -> Self {
        Self {
            yt_dlp_path: path.into(),
        }
    }

    /// Check if yt-dlp is available
    pub async fn check_availability(&self) -> Result<bool> {
        let output = Command::new(&self.yt_dlp_path)
            .arg("--version")
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await;

        Ok(output.is_ok() && output.unwrap().status.success())
    }

    async fn run(&self, args: &[&str]) -> Result<Vec<u8>> {
        let output = Command::new(&self.yt_dlp_path)
            .args(args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    anyhow::Error::new(ScribeError::ToolMissing("yt-dlp".to_string()))
                } else {
                    anyhow::anyhow!("Failed to run yt-dlp: {}", e)
                }
            })?;

        if !output.status.success() {
            let error = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("yt-dlp failed: {}", error.trim());
        }

        Ok(output.stdout)
    }

    /// Locate the file a download produced when the final extension is not
    /// known up front.
    fn find_downloaded_file(dest_dir: &Path, stem: &str) -> Result<PathBuf> {
        let entries = fs_err::read_dir(dest_dir)?;

        for entry in entries.flatten() {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if name.starts_with(stem) && !name.ends_with(".part") {
                return Ok(entry.path());
            }
        }

        Err(anyhow::Error::new(ScribeError::DownloadFailed(format!(
            "no file named {}.* found after download",
            stem
        ))))
    }
}

/// Parse the single-JSON payload of a flat playlist extraction.
fn parse_listing(raw: &[u8]) -> Result<ChannelListing> {
    #[derive(Deserialize)]
    struct RawListing {
        channel: Option<String>,
        uploader: Option<String>,
        channel_id: Option<String>,
        entries: Option<Vec<Option<RawEntry>>>,
    }

    #[derive(Deserialize)]
    struct RawEntry {
        id: Option<String>,
        title: Option<String>,
        upload_date: Option<String>,
    }

    let listing: RawListing = serde_json::from_slice(raw)?;

    let entries = listing.entries.map(|entries| {
        entries
            .into_iter()
            .flatten()
            .map(|e| ListingEntry {
                id: e.id,
                title: e.title,
                upload_date: e.upload_date,
            })
            .collect()
    });

    Ok(ChannelListing {
        channel_name: listing.channel.or(listing.uploader),
        channel_id: listing.channel_id,
        entries,
    })
}

#[async_trait]
impl HostingService for YtDlpService {
    async fn lookup_channel_id(&self, channel_url: &str) -> Result<String> {
        tracing::debug!("Looking up channel id for: {}", channel_url);

        let stdout = self
            .run(&[
                "--dump-single-json",
                "--flat-playlist",
                "--skip-download",
                "--playlist-items",
                "1",
                "--no-warnings",
                channel_url,
            ])
            .await?;

        let info: serde_json::Value = serde_json::from_slice(&stdout)?;

        info["channel_id"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| {
                anyhow::Error::new(ScribeError::UnrecognizedChannelUrl(format!(
                    "{} (hosting service reported no channel id)",
                    channel_url
                )))
            })
    }

    async fn list_uploads(&self, uploads_url: &str, max_entries: usize) -> Result<ChannelListing> {
        tracing::debug!("Listing uploads from: {}", uploads_url);

        let end = max_entries.to_string();
        let stdout = self
            .run(&[
                "--dump-single-json",
                "--flat-playlist",
                "--skip-download",
                "--ignore-errors",
                "--playlist-end",
                &end,
                "--no-warnings",
                uploads_url,
            ])
            .await?;

        parse_listing(&stdout)
    }

    async fn fetch_best_audio(&self, video_url: &str, dest_dir: &Path) -> Result<PathBuf> {
        let stem = format!("audio_{}", &Uuid::new_v4().to_string()[..8]);
        let template = dest_dir.join(format!("{}.%(ext)s", stem));
        let template = template.to_string_lossy().to_string();

        tracing::debug!("Downloading best audio for: {}", video_url);

        self.run(&[
            "--output",
            &template,
            "--format",
            "bestaudio/best",
            "--extract-audio",
            "--audio-format",
            "mp3",
            "--no-playlist",
            "--no-warnings",
            "--quiet",
            video_url,
        ])
        .await?;

        // --audio-format pins the final extension
        let expected = dest_dir.join(format!("{}.mp3", stem));
        if expected.exists() {
            return Ok(expected);
        }

        Self::find_downloaded_file(dest_dir, &stem)
    }

    async fn fetch_video(&self, video_url: &str, dest_dir: &Path) -> Result<PathBuf> {
        let stem = format!("video_{}", &Uuid::new_v4().to_string()[..8]);
        let template = dest_dir.join(format!("{}.%(ext)s", stem));
        let template = template.to_string_lossy().to_string();

        tracing::debug!("Downloading video: {}", video_url);

        self.run(&[
            "--output",
            &template,
            "--format",
            "best",
            "--no-playlist",
            "--no-warnings",
            "--quiet",
            video_url,
        ])
        .await?;

        Self::find_downloaded_file(dest_dir, &stem)
    }
}

impl Default for YtDlpService {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_listing_full() {
        let raw = r#"{
            "channel": "Example Channel",
            "channel_id": "UCabc123",
            "entries": [
                {"id": "vid1", "title": "First", "upload_date": "20240101"},
                null,
                {"id": "vid2", "title": "Second"}
            ]
        }"#;

        let listing = parse_listing(raw.as_bytes()).unwrap();
        assert_eq!(listing.channel_name.as_deref(), Some("Example Channel"));
        assert_eq!(listing.channel_id.as_deref(), Some("UCabc123"));

        let entries = listing.entries.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].id.as_deref(), Some("vid1"));
        assert_eq!(entries[0].upload_date.as_deref(), Some("20240101"));
        assert_eq!(entries[1].upload_date, None);
    }

    #[test]
    fn test_parse_listing_uploader_fallback() {
        let raw = r#"{"uploader": "Someone", "channel_id": "UCx", "entries": []}"#;
        let listing = parse_listing(raw.as_bytes()).unwrap();
        assert_eq!(listing.channel_name.as_deref(), Some("Someone"));
        assert_eq!(listing.entries.unwrap().len(), 0);
    }

    #[test]
    fn test_parse_listing_without_entries() {
        let raw = r#"{"channel": "No Uploads Tab", "channel_id": "UCy"}"#;
        let listing = parse_listing(raw.as_bytes()).unwrap();
        assert!(listing.entries.is_none());
    }
}

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use std::path::{Path, PathBuf};

pub mod ytdlp;

pub use ytdlp::YtDlpService;

use crate::Result;

/// One entry of a flat channel upload listing, before filtering.
///
/// Every field is optional because the hosting service omits metadata for
/// deleted, private, or still-processing uploads.
#[derive(Debug, Clone)]
pub struct ListingEntry {
    pub id: Option<String>,
    pub title: Option<String>,
    pub upload_date: Option<String>,
}

/// Result of a flat extraction against a channel uploads page.
#[derive(Debug, Clone)]
pub struct ChannelListing {
    /// Channel display name, when the service reports one
    pub channel_name: Option<String>,

    /// Canonical channel identifier, when the service reports one
    pub channel_id: Option<String>,

    /// Raw upload entries in platform order; `None` when the service
    /// returned no listing at all
    pub entries: Option<Vec<ListingEntry>>,
}

/// Trait for the video-hosting collaborator.
///
/// Covers the three capabilities the pipelines need: metadata-only channel
/// lookups, flat upload listings, and media download by format selector.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait HostingService: Send + Sync {
    /// Resolve the canonical channel identifier for a channel page URL
    /// without downloading any media.
    async fn lookup_channel_id(&self, channel_url: &str) -> Result<String>;

    /// Flat (metadata-only) listing of a channel uploads page, bounded to
    /// `max_entries` items.
    async fn list_uploads(&self, uploads_url: &str, max_entries: usize) -> Result<ChannelListing>;

    /// Download the best available audio track for a video into `dest_dir`.
    /// Returns the path of the downloaded file.
    async fn fetch_best_audio(&self, video_url: &str, dest_dir: &Path) -> Result<PathBuf>;

    /// Download a full video into `dest_dir`. Returns the path of the
    /// downloaded container file.
    async fn fetch_video(&self, video_url: &str, dest_dir: &Path) -> Result<PathBuf>;
}

/// Canonical watch URL for a video identifier.
pub fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={}", video_id)
}

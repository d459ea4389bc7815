use url::Url;

use crate::hosting::HostingService;
use crate::{Result, ScribeError};

/// A single upload discovered by channel enumeration.
///
/// Immutable once created; `id` is unique within a channel. `upload_date`
/// stays in the platform's raw `YYYYMMDD` form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoRef {
    pub id: String,
    pub title: String,
    pub upload_date: String,
}

impl VideoRef {
    pub fn watch_url(&self) -> String {
        crate::hosting::watch_url(&self.id)
    }
}

/// The recognized channel URL shapes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelRef {
    /// `/channel/<id>` - carries the canonical identifier directly
    Id(String),
    /// `/@<handle>` - handle is itself a usable identifier
    Handle(String),
    /// `/c/<name>` - legacy custom name, needs a lookup
    Custom(String),
    /// `/user/<name>` - legacy username, needs a lookup
    LegacyUser(String),
}

/// A channel with a usable identifier and the uploads page to enumerate.
#[derive(Debug, Clone)]
pub struct ResolvedChannel {
    pub id: String,
    pub uploads_url: String,
}

/// Channel display name plus its uploads, in platform order.
#[derive(Debug, Clone)]
pub struct ChannelVideos {
    pub channel_name: String,
    pub channel_id: String,
    pub videos: Vec<VideoRef>,
}

fn is_youtube_host(host: &str) -> bool {
    let h = host.to_ascii_lowercase();
    h == "youtube.com" || h.ends_with(".youtube.com")
}

fn unrecognized(url: &str) -> anyhow::Error {
    anyhow::Error::new(ScribeError::UnrecognizedChannelUrl(url.to_string()))
}

/// Classify a channel URL by host and path shape.
pub fn classify(channel_url: &str) -> Result<ChannelRef> {
    let parsed = Url::parse(channel_url).map_err(|_| unrecognized(channel_url))?;

    let host = parsed.host_str().ok_or_else(|| unrecognized(channel_url))?;
    if !is_youtube_host(host) {
        return Err(unrecognized(channel_url));
    }

    let mut segments = parsed
        .path_segments()
        .ok_or_else(|| unrecognized(channel_url))?
        .filter(|s| !s.is_empty());

    let first = segments.next().ok_or_else(|| unrecognized(channel_url))?;

    if let Some(handle) = first.strip_prefix('@') {
        if handle.is_empty() {
            return Err(unrecognized(channel_url));
        }
        return Ok(ChannelRef::Handle(handle.to_string()));
    }

    let second = segments.next().filter(|s| !s.is_empty());
    match (first, second) {
        ("channel", Some(id)) => Ok(ChannelRef::Id(id.to_string())),
        ("c", Some(name)) => Ok(ChannelRef::Custom(name.to_string())),
        ("user", Some(name)) => Ok(ChannelRef::LegacyUser(name.to_string())),
        _ => Err(unrecognized(channel_url)),
    }
}

/// Resolve a channel URL to an identifier and uploads page.
///
/// Shapes without a direct identifier go through a metadata-only lookup on
/// the hosting service.
pub async fn resolve(channel_url: &str, hosting: &dyn HostingService) -> Result<ResolvedChannel> {
    match classify(channel_url)? {
        ChannelRef::Id(id) => Ok(ResolvedChannel {
            uploads_url: format!("https://www.youtube.com/channel/{}/videos", id),
            id,
        }),
        ChannelRef::Handle(handle) => Ok(ResolvedChannel {
            uploads_url: format!("https://www.youtube.com/@{}/videos", handle),
            id: handle,
        }),
        ChannelRef::Custom(_) | ChannelRef::LegacyUser(_) => {
            tracing::debug!("Channel URL carries no identifier, querying hosting service");
            let id = hosting.lookup_channel_id(channel_url).await?;
            Ok(ResolvedChannel {
                uploads_url: format!("https://www.youtube.com/channel/{}/videos", id),
                id,
            })
        }
    }
}

/// Enumerate a channel's uploads through a flat extraction.
///
/// Entries missing an identifier or title are skipped; platform ordering is
/// preserved. A missing listing or missing channel id is fatal.
pub async fn enumerate_uploads(
    channel: &ResolvedChannel,
    hosting: &dyn HostingService,
    max_videos: usize,
) -> Result<ChannelVideos> {
    tracing::info!("Fetching channel info from: {}", channel.uploads_url);

    let listing = hosting.list_uploads(&channel.uploads_url, max_videos).await?;

    let entries = listing.entries.ok_or_else(|| {
        anyhow::Error::new(ScribeError::ChannelEnumeration(
            "hosting service returned no upload listing".to_string(),
        ))
    })?;

    let channel_id = listing.channel_id.ok_or_else(|| {
        anyhow::Error::new(ScribeError::ChannelEnumeration(
            "hosting service reported no channel id".to_string(),
        ))
    })?;

    let channel_name = listing
        .channel_name
        .unwrap_or_else(|| "Unknown_Channel".to_string());

    let mut videos: Vec<VideoRef> = entries
        .into_iter()
        .filter_map(|entry| match (entry.id, entry.title) {
            (Some(id), Some(title)) => Some(VideoRef {
                id,
                title,
                upload_date: entry
                    .upload_date
                    .unwrap_or_else(|| "Unknown_Date".to_string()),
            }),
            _ => None,
        })
        .collect();
    videos.truncate(max_videos);

    tracing::info!("Found {} videos in channel: {}", videos.len(), channel_name);

    Ok(ChannelVideos {
        channel_name,
        channel_id,
        videos,
    })
}

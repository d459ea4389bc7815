use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use serde::Deserialize;

use crate::config::CaptionsConfig;
use crate::utils::format_timestamp;

const WATCH_URL: &str = "https://www.youtube.com/watch";

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";

/// One timestamped caption line, offset in seconds from the video start.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptionEntry {
    pub start: f64,
    pub text: String,
}

/// Why a caption fetch produced no transcript.
#[derive(thiserror::Error, Debug)]
pub enum CaptionError {
    #[error("captions are disabled or absent")]
    Disabled,

    #[error("no caption track matches the configured languages ({0})")]
    NoMatchingTrack(String),

    #[error("caption transport error: {0}")]
    Transport(String),

    #[error("caption payload could not be parsed: {0}")]
    Payload(String),
}

/// Trait for the captions-retrieval collaborator.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait CaptionSource: Send + Sync {
    /// Fetch the timestamped caption entries for a video identifier.
    async fn fetch(&self, video_id: &str) -> Result<Vec<CaptionEntry>, CaptionError>;
}

/// Caption client speaking the watch-page caption-track protocol.
pub struct CaptionClient {
    http: reqwest::Client,
    languages: Vec<String>,
    prefer_manual: bool,
}

#[derive(Debug, Deserialize)]
struct RawTrack {
    #[serde(rename = "baseUrl")]
    base_url: String,

    #[serde(rename = "languageCode")]
    language_code: String,

    /// `"asr"` marks an auto-generated track
    kind: Option<String>,
}

impl RawTrack {
    fn is_auto_generated(&self) -> bool {
        self.kind.as_deref() == Some("asr")
    }
}

impl CaptionClient {
    pub fn new(config: &CaptionsConfig) -> crate::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            http,
            languages: config.languages.clone(),
            prefer_manual: config.prefer_manual,
        })
    }

    async fn get_text(&self, url: &str) -> Result<String, CaptionError> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| CaptionError::Transport(e.to_string()))?;

        let response = response
            .error_for_status()
            .map_err(|e| CaptionError::Transport(e.to_string()))?;

        response
            .text()
            .await
            .map_err(|e| CaptionError::Transport(e.to_string()))
    }
}

#[async_trait]
impl CaptionSource for CaptionClient {
    async fn fetch(&self, video_id: &str) -> Result<Vec<CaptionEntry>, CaptionError> {
        tracing::debug!("Fetching caption tracks for video: {}", video_id);

        let page = self
            .get_text(&format!("{}?v={}", WATCH_URL, video_id))
            .await?;

        let tracks = extract_caption_tracks(&page)?;
        let track = select_track(&tracks, &self.languages, self.prefer_manual)?;

        // json3 carries per-event millisecond offsets
        let payload = self
            .get_text(&format!("{}&fmt=json3", track.base_url))
            .await?;

        let entries = parse_json3(&payload)?;
        if entries.is_empty() {
            return Err(CaptionError::Payload(
                "caption track contained no entries".to_string(),
            ));
        }

        Ok(entries)
    }
}

/// Locate and deserialize the `captionTracks` array embedded in a watch page.
fn extract_caption_tracks(page: &str) -> Result<Vec<RawTrack>, CaptionError> {
    const MARKER: &str = "\"captionTracks\":";

    let start = page.find(MARKER).ok_or(CaptionError::Disabled)?;
    let rest = &page[start + MARKER.len()..];
    let open = rest
        .find('[')
        .ok_or_else(|| CaptionError::Payload("captionTracks is not an array".to_string()))?;

    // Scan for the matching bracket; string contents may hold brackets
    let bytes = rest[open..].as_bytes();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }

        match b {
            b'"' => in_string = true,
            b'[' => depth += 1,
            b']' => {
                depth -= 1;
                if depth == 0 {
                    let slice = &rest[open..=open + i];
                    return serde_json::from_str(slice)
                        .map_err(|e| CaptionError::Payload(e.to_string()));
                }
            }
            _ => {}
        }
    }

    Err(CaptionError::Payload(
        "unterminated captionTracks array".to_string(),
    ))
}

/// Pick a caption track by configured language preference.
///
/// Human-authored tracks win over auto-generated ones for the same language
/// when `prefer_manual` is set.
fn select_track<'a>(
    tracks: &'a [RawTrack],
    languages: &[String],
    prefer_manual: bool,
) -> Result<&'a RawTrack, CaptionError> {
    for lang in languages {
        if prefer_manual {
            if let Some(track) = tracks
                .iter()
                .find(|t| t.language_code == *lang && !t.is_auto_generated())
            {
                return Ok(track);
            }
        }
        if let Some(track) = tracks.iter().find(|t| t.language_code == *lang) {
            return Ok(track);
        }
    }

    Err(CaptionError::NoMatchingTrack(languages.join(", ")))
}

/// Parse a `json3` caption payload into timestamped entries.
fn parse_json3(payload: &str) -> Result<Vec<CaptionEntry>, CaptionError> {
    #[derive(Deserialize)]
    struct Json3 {
        #[serde(default)]
        events: Vec<Json3Event>,
    }

    #[derive(Deserialize)]
    struct Json3Event {
        #[serde(rename = "tStartMs")]
        t_start_ms: Option<i64>,

        #[serde(default)]
        segs: Vec<Json3Seg>,
    }

    #[derive(Deserialize)]
    struct Json3Seg {
        utf8: Option<String>,
    }

    let parsed: Json3 =
        serde_json::from_str(payload).map_err(|e| CaptionError::Payload(e.to_string()))?;

    let entries = parsed
        .events
        .into_iter()
        .filter_map(|event| {
            let start_ms = event.t_start_ms?;
            let text: String = event
                .segs
                .into_iter()
                .filter_map(|seg| seg.utf8)
                .collect::<String>()
                .replace('\n', " ")
                .trim()
                .to_string();

            if text.is_empty() {
                return None;
            }

            Some(CaptionEntry {
                start: start_ms as f64 / 1000.0,
                text,
            })
        })
        .collect();

    Ok(entries)
}

/// Render caption entries as `[MM:SS] text` lines ordered by start time.
pub fn format_transcript(entries: &[CaptionEntry]) -> String {
    let mut ordered: Vec<&CaptionEntry> = entries.iter().collect();
    ordered.sort_by(|a, b| a.start.total_cmp(&b.start));

    ordered
        .iter()
        .map(|entry| format!("[{}] {}", format_timestamp(entry.start), entry.text))
        .collect::<Vec<_>>()
        .join("\n")
}

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub mod whisper;

pub use whisper::WhisperEngine;

use crate::audio::AudioExtractor;
use crate::captions::{format_transcript, CaptionSource};
use crate::channel::VideoRef;
use crate::hosting::HostingService;
use crate::Result;

/// Which acquisition path produced a transcript.
///
/// The serialized names are the vocabulary older metadata files already use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TranscriptSource {
    #[serde(rename = "youtube_api")]
    PlatformCaptions,

    #[serde(rename = "whisper")]
    SpeechToText,
}

impl TranscriptSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            TranscriptSource::PlatformCaptions => "youtube_api",
            TranscriptSource::SpeechToText => "whisper",
        }
    }
}

impl std::fmt::Display for TranscriptSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Transcript text together with the path that actually produced it.
#[derive(Debug, Clone)]
pub struct AcquiredTranscript {
    pub text: String,
    pub source: TranscriptSource,
}

/// Why a video ended up with no transcript at all.
#[derive(Debug, thiserror::Error)]
pub enum AcquireFailure {
    #[error("captions failed ({captions}); no speech-to-text engine is configured")]
    SttUnavailable { captions: String },

    #[error("captions failed ({captions}); speech-to-text failed ({stt})")]
    BothFailed { captions: String, stt: String },
}

/// Trait for the speech-to-text collaborator.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait SpeechToText: Send + Sync {
    /// Transcribe an audio file (16 kHz mono WAV) to plain text.
    async fn transcribe(&self, audio: &Path) -> Result<String>;
}

/// Two-step transcript acquisition: platform captions first, speech-to-text
/// second. A failure in either step degrades only that step.
pub struct TranscriptAcquirer<'a> {
    captions: &'a dyn CaptionSource,
    hosting: &'a dyn HostingService,
    audio: &'a dyn AudioExtractor,
    engine: Option<&'a dyn SpeechToText>,
}

impl<'a> TranscriptAcquirer<'a> {
    pub fn new(
        captions: &'a dyn CaptionSource,
        hosting: &'a dyn HostingService,
        audio: &'a dyn AudioExtractor,
        engine: Option<&'a dyn SpeechToText>,
    ) -> Self {
        Self {
            captions,
            hosting,
            audio,
            engine,
        }
    }

    /// Obtain a transcript for one video, using `scratch` for temporary
    /// audio artifacts.
    pub async fn acquire(
        &self,
        video: &VideoRef,
        scratch: &Path,
    ) -> std::result::Result<AcquiredTranscript, AcquireFailure> {
        tracing::info!("Fetching transcript for video: {} ({})", video.title, video.id);

        let caption_error = match self.captions.fetch(&video.id).await {
            Ok(entries) => {
                return Ok(AcquiredTranscript {
                    text: format_transcript(&entries),
                    source: TranscriptSource::PlatformCaptions,
                });
            }
            Err(e) => {
                tracing::warn!("Could not get captions for {}: {}", video.id, e);
                e
            }
        };

        let Some(engine) = self.engine else {
            tracing::warn!(
                "No speech-to-text engine configured, skipping fallback for {}",
                video.id
            );
            return Err(AcquireFailure::SttUnavailable {
                captions: caption_error.to_string(),
            });
        };

        tracing::info!("Attempting speech-to-text for {}", video.title);
        match self.transcribe_from_audio(video, engine, scratch).await {
            Ok(text) => Ok(AcquiredTranscript {
                text,
                source: TranscriptSource::SpeechToText,
            }),
            Err(e) => {
                tracing::error!("Speech-to-text failed for {}: {}", video.id, e);
                Err(AcquireFailure::BothFailed {
                    captions: caption_error.to_string(),
                    stt: e.to_string(),
                })
            }
        }
    }

    async fn transcribe_from_audio(
        &self,
        video: &VideoRef,
        engine: &dyn SpeechToText,
        scratch: &Path,
    ) -> Result<String> {
        let downloaded = self
            .hosting
            .fetch_best_audio(&video.watch_url(), scratch)
            .await?;

        let wav = downloaded.with_extension("wav");
        self.audio.extract_wav(&downloaded, &wav).await?;

        let text = engine.transcribe(&wav).await;

        // Per-video intermediates are removed as soon as the engine is done;
        // the scratch directory itself is owned by the caller.
        let _ = fs_err::remove_file(&downloaded);
        let _ = fs_err::remove_file(&wav);

        text
    }
}

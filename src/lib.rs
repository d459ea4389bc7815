//! yt-scribe - A Rust CLI tool for harvesting transcripts from YouTube channels
//!
//! This library provides functionality to enumerate a channel's uploads, fetch
//! platform captions for each video (falling back to a local Whisper engine when
//! captions are unavailable), and transcribe single videos from a URL or file.

pub mod audio;
pub mod captions;
pub mod channel;
pub mod cli;
pub mod config;
pub mod hosting;
pub mod output;
pub mod pipeline;
pub mod transcribe;
pub mod utils;

pub use channel::VideoRef;
pub use cli::{Cli, Commands};
pub use config::Config;
pub use hosting::HostingService;
pub use pipeline::{ChannelPipeline, VideoPipeline};
pub use transcribe::{AcquiredTranscript, SpeechToText, TranscriptSource};

/// Result type used throughout the library
pub type Result<T> = anyhow::Result<T>;

/// Error types specific to the transcript harvester
#[derive(thiserror::Error, Debug)]
pub enum ScribeError {
    #[error("Unrecognized channel URL: {0}")]
    UnrecognizedChannelUrl(String),

    #[error("Channel enumeration failed: {0}")]
    ChannelEnumeration(String),

    #[error("Unsupported URL: {0}")]
    UnsupportedUrl(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Audio extraction failed: {0}")]
    AudioExtraction(String),

    #[error("Speech-to-text failed: {0}")]
    SpeechToText(String),

    #[error("{0} is not installed or not in PATH")]
    ToolMissing(String),
}

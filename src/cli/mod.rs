use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "yt-scribe",
    about = "yt-scribe - Bulk-download YouTube channel transcripts with a local Whisper fallback",
    version,
    long_about = "A CLI tool for harvesting transcripts from YouTube channels. Platform captions \
are fetched first; videos without captions fall back to a locally-run Whisper engine. Single \
videos can also be transcribed from a YouTube/Instagram URL or a local file."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Download transcripts for every video in a channel
    Channel {
        /// Channel URL (prompted interactively if omitted)
        #[arg(long, value_name = "URL")]
        channel_url: Option<String>,

        /// Output directory for transcripts (default: transcripts)
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,
    },

    /// Transcribe a single video from a URL or a local file
    Video {
        /// YouTube URL, Instagram URL, or path to a local video file
        #[arg(value_name = "URL_OR_FILE")]
        input: String,

        /// Write the transcript to this file instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Keep the extracted audio track next to the transcript
        #[arg(long)]
        keep_audio: bool,
    },

    /// Concatenate a channel's transcript files into a single document
    Export {
        /// A channel's transcripts directory
        #[arg(long, value_name = "DIR")]
        channel_dir: PathBuf,

        /// Output file for the combined document
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },

    /// Show current configuration
    Config,

    /// List supported platforms
    Platforms,
}

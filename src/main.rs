use anyhow::Result;
use clap::Parser;
use console::style;
use std::io::Write;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use yt_scribe::audio::FfmpegExtractor;
use yt_scribe::captions::CaptionClient;
use yt_scribe::cli::{Cli, Commands};
use yt_scribe::config::Config;
use yt_scribe::hosting::YtDlpService;
use yt_scribe::output;
use yt_scribe::pipeline::{ChannelPipeline, VideoPipeline};
use yt_scribe::transcribe::{SpeechToText, WhisperEngine};
use yt_scribe::utils;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing
    let default_filter = if cli.debug {
        "yt_scribe=debug"
    } else {
        "yt_scribe=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run(cli).await {
        tracing::error!("Program failed: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Channel {
            channel_url,
            output,
        } => {
            warn_missing_dependencies().await;

            let config = Config::load().await?;

            let channel_url = match channel_url {
                Some(url) => url,
                None => prompt_channel_url()?,
            };
            if channel_url.is_empty() {
                eprintln!("No channel URL provided. Exiting.");
                std::process::exit(1);
            }

            let output_root = output.unwrap_or_else(|| config.app.output_dir.clone());

            let captions = CaptionClient::new(&config.captions)?;
            let engine = WhisperEngine::from_config(&config.whisper)?;
            if engine.is_none() {
                tracing::warn!(
                    "No whisper model configured; videos without captions will be skipped"
                );
            }

            let pipeline = ChannelPipeline::new(
                config,
                Box::new(YtDlpService::new()),
                Box::new(captions),
                Box::new(FfmpegExtractor::new()),
                engine.map(|e| Box::new(e) as Box<dyn SpeechToText>),
            );

            tokio::select! {
                result = pipeline.run(&channel_url, &output_root) => {
                    let summary = result?;
                    println!("\n{}", style("Download complete!").green().bold());
                    println!("  Channel: {}", summary.channel_name);
                    println!("  Transcripts: {}/{} videos", summary.successful, summary.total_videos);
                    println!("  Saved to: {}", summary.transcript_dir.display());
                    println!("  Metadata: {}", summary.metadata_path.display());
                }
                _ = tokio::signal::ctrl_c() => {
                    println!("\nProcess interrupted by user. Exiting...");
                    std::process::exit(0);
                }
            }
        }

        Commands::Video {
            input,
            output,
            keep_audio,
        } => {
            warn_missing_dependencies().await;

            let config = Config::load().await?;

            let engine = WhisperEngine::from_config(&config.whisper)?.ok_or_else(|| {
                anyhow::anyhow!(
                    "single-video transcription needs a speech-to-text engine; \
                     set whisper.model_path in the configuration"
                )
            })?;

            let keep_audio_dir = if keep_audio {
                Some(match &output {
                    Some(path) => path
                        .parent()
                        .filter(|p| !p.as_os_str().is_empty())
                        .map(|p| p.to_path_buf())
                        .unwrap_or(std::env::current_dir()?),
                    None => std::env::current_dir()?,
                })
            } else {
                None
            };

            let pipeline = VideoPipeline::new(
                Box::new(YtDlpService::new()),
                Box::new(FfmpegExtractor::new()),
                Box::new(engine),
            );

            let result = pipeline.run(&input, keep_audio_dir.as_deref()).await?;

            match output {
                Some(path) => {
                    fs_err::write(&path, &result.text)?;
                    println!("Transcription saved to: {}", path.display());
                }
                None => println!("{}", result.text),
            }

            if let Some(audio_path) = result.audio_path {
                println!("Audio saved to: {}", audio_path.display());
            }
        }

        Commands::Export {
            channel_dir,
            output,
        } => {
            let count = output::export_transcripts(&channel_dir, &output)?;
            println!(
                "Combined {} transcripts into {}",
                count,
                output.display()
            );
        }

        Commands::Config => {
            let config = Config::load().await?;
            config.display();
        }

        Commands::Platforms => {
            println!("Supported inputs:");
            println!("  • YouTube channels (@handle, /c/, /channel/, /user/ URLs)");
            println!("  • YouTube videos (youtube.com, youtu.be)");
            println!("  • Instagram videos (instagram.com, instagr.am)");
            println!("  • Local video files (mp4, mkv, avi, mov, webm, m4v)");
        }
    }

    Ok(())
}

async fn warn_missing_dependencies() {
    // Non-fatal: the tools may still appear once the real work starts
    let missing = utils::check_dependencies().await;
    if !missing.is_empty() {
        eprintln!("⚠️  Dependency check warnings:");
        for dep in missing {
            eprintln!("   • {}", dep);
        }
        eprintln!("   (Continuing anyway - tools may be available)");
    }
}

fn prompt_channel_url() -> Result<String> {
    println!("\nYouTube Channel URL can be in any of these formats:");
    println!("- https://www.youtube.com/@ChannelName");
    println!("- https://www.youtube.com/c/ChannelName");
    println!("- https://www.youtube.com/channel/CHANNEL_ID");
    println!("- https://www.youtube.com/user/USERNAME\n");
    print!("Please enter the YouTube channel URL: ");
    std::io::stdout().flush()?;

    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

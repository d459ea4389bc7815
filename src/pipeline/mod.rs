use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use url::Url;

use crate::audio::AudioExtractor;
use crate::captions::CaptionSource;
use crate::channel;
use crate::config::Config;
use crate::hosting::HostingService;
use crate::output::{ChannelMetadata, ChannelWriter, VideoSummary};
use crate::transcribe::{SpeechToText, TranscriptAcquirer};
use crate::{Result, ScribeError};

/// Video container extensions accepted for local input files.
const ACCEPTED_CONTAINERS: &[&str] = &["mp4", "mkv", "avi", "mov", "webm", "m4v"];

/// The closed set of hosting providers for single-video URLs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    YouTube,
    Instagram,
}

impl Provider {
    /// Match a URL's host component against the known provider hosts.
    pub fn from_url(url: &Url) -> Option<Self> {
        let host = url.host_str()?.to_ascii_lowercase();

        if host == "youtube.com" || host.ends_with(".youtube.com") || host == "youtu.be" {
            return Some(Provider::YouTube);
        }
        if host == "instagram.com" || host.ends_with(".instagram.com") || host == "instagr.am" {
            return Some(Provider::Instagram);
        }

        None
    }

    pub fn name(&self) -> &'static str {
        match self {
            Provider::YouTube => "YouTube",
            Provider::Instagram => "Instagram",
        }
    }
}

/// Parsed input of the single-video pipeline.
#[derive(Debug, Clone)]
pub enum VideoInput {
    LocalFile(PathBuf),
    Remote { url: String, provider: Provider },
}

impl VideoInput {
    pub fn parse(input: &str) -> Result<Self> {
        let path = Path::new(input);
        if path.exists() {
            crate::utils::check_file_accessible(path)?;

            let supported = path
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| ACCEPTED_CONTAINERS.contains(&ext.to_lowercase().as_str()))
                .unwrap_or(false);
            if !supported {
                anyhow::bail!(
                    "Unsupported video container: {} (expected one of {})",
                    path.display(),
                    ACCEPTED_CONTAINERS.join(", ")
                );
            }

            return Ok(VideoInput::LocalFile(path.to_path_buf()));
        }

        let url = Url::parse(input)
            .map_err(|_| anyhow::Error::new(ScribeError::UnsupportedUrl(input.to_string())))?;
        let provider = Provider::from_url(&url)
            .ok_or_else(|| anyhow::Error::new(ScribeError::UnsupportedUrl(input.to_string())))?;

        Ok(VideoInput::Remote {
            url: input.to_string(),
            provider,
        })
    }
}

/// Outcome of one bulk channel run.
#[derive(Debug)]
pub struct ChannelRunSummary {
    pub channel_name: String,
    pub total_videos: usize,
    pub successful: usize,
    pub transcript_dir: PathBuf,
    pub metadata_path: PathBuf,
}

/// Bulk pipeline: enumerate a channel and persist one transcript per video.
///
/// Videos are processed sequentially; a failed video degrades to "no
/// transcript" without aborting the run.
pub struct ChannelPipeline {
    config: Config,
    hosting: Box<dyn HostingService>,
    captions: Box<dyn CaptionSource>,
    audio: Box<dyn AudioExtractor>,
    engine: Option<Box<dyn SpeechToText>>,
}

impl ChannelPipeline {
    pub fn new(
        config: Config,
        hosting: Box<dyn HostingService>,
        captions: Box<dyn CaptionSource>,
        audio: Box<dyn AudioExtractor>,
        engine: Option<Box<dyn SpeechToText>>,
    ) -> Self {
        Self {
            config,
            hosting,
            captions,
            audio,
            engine,
        }
    }

    pub async fn run(&self, channel_url: &str, output_root: &Path) -> Result<ChannelRunSummary> {
        let resolved = channel::resolve(channel_url, self.hosting.as_ref()).await?;
        let listing = channel::enumerate_uploads(
            &resolved,
            self.hosting.as_ref(),
            self.config.app.max_videos,
        )
        .await?;

        let writer = ChannelWriter::create(
            output_root,
            &listing.channel_name,
            self.config.app.title_max_chars,
        )?;
        let mut metadata = ChannelMetadata::new(channel_url, &listing.channel_name);

        tracing::info!(
            "Processing {} videos from {}",
            listing.videos.len(),
            listing.channel_name
        );

        let progress = ProgressBar::new(listing.videos.len() as u64);
        progress.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap(),
        );
        progress.set_message("Downloading transcripts");

        let scratch = TempDir::new()?;
        let acquirer = TranscriptAcquirer::new(
            self.captions.as_ref(),
            self.hosting.as_ref(),
            self.audio.as_ref(),
            self.engine.as_deref(),
        );

        let mut successful = 0usize;
        for video in &listing.videos {
            match acquirer.acquire(video, scratch.path()).await {
                Ok(transcript) => {
                    let transcript_file = writer.write_transcript(video, &transcript)?;
                    metadata.videos.push(VideoSummary {
                        video_id: video.id.clone(),
                        title: video.title.clone(),
                        upload_date: video.upload_date.clone(),
                        transcript_source: transcript.source,
                        transcript_file,
                    });
                    successful += 1;
                }
                Err(failure) => {
                    tracing::warn!(
                        "No transcript for {} ({}): {}",
                        video.title,
                        video.id,
                        failure
                    );
                }
            }
            progress.inc(1);
        }
        progress.finish_and_clear();

        let metadata_path = writer.write_metadata(&metadata)?;

        tracing::info!(
            "Download completed. Successfully downloaded {} out of {} transcripts.",
            successful,
            listing.videos.len()
        );
        tracing::info!("Transcripts saved to: {}", writer.transcript_dir().display());
        tracing::info!("Metadata saved to: {}", metadata_path.display());

        Ok(ChannelRunSummary {
            channel_name: listing.channel_name,
            total_videos: listing.videos.len(),
            successful,
            transcript_dir: writer.transcript_dir().to_path_buf(),
            metadata_path,
        })
    }
}

/// Transcript produced by the single-video pipeline.
#[derive(Debug)]
pub struct VideoTranscription {
    pub text: String,

    /// Extracted audio, preserved only when requested
    pub audio_path: Option<PathBuf>,
}

/// Single-video pipeline: local file or URL in, transcript text out.
///
/// All intermediate artifacts live in a temporary directory that is removed
/// when the run ends, on the error paths as much as the success path.
pub struct VideoPipeline {
    hosting: Box<dyn HostingService>,
    audio: Box<dyn AudioExtractor>,
    engine: Box<dyn SpeechToText>,
}

impl VideoPipeline {
    pub fn new(
        hosting: Box<dyn HostingService>,
        audio: Box<dyn AudioExtractor>,
        engine: Box<dyn SpeechToText>,
    ) -> Self {
        Self {
            hosting,
            audio,
            engine,
        }
    }

    pub async fn run(
        &self,
        input: &str,
        keep_audio_dir: Option<&Path>,
    ) -> Result<VideoTranscription> {
        let input = VideoInput::parse(input)?;
        let scratch = TempDir::new()?;

        let source_path = match &input {
            VideoInput::LocalFile(path) => {
                tracing::info!("Transcribing local file: {}", path.display());
                path.clone()
            }
            VideoInput::Remote { url, provider } => {
                tracing::info!("Downloading {} video: {}", provider.name(), url);
                self.hosting
                    .fetch_video(url, scratch.path())
                    .await
                    .map_err(|e| {
                        anyhow::Error::new(ScribeError::DownloadFailed(e.to_string()))
                    })?
            }
        };

        let wav = scratch.path().join("audio.wav");
        self.audio.extract_wav(&source_path, &wav).await?;

        let text = self.engine.transcribe(&wav).await?;

        let audio_path = match keep_audio_dir {
            Some(dir) => {
                let stem = source_path
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "audio".to_string());
                let dest = dir.join(format!("{}.wav", stem));
                fs_err::copy(&wav, &dest)?;
                Some(dest)
            }
            None => None,
        };

        Ok(VideoTranscription { text, audio_path })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::MockAudioExtractor;
    use crate::captions::{CaptionEntry, CaptionError, MockCaptionSource};
    use crate::hosting::{ChannelListing, ListingEntry, MockHostingService};
    use crate::transcribe::MockSpeechToText;

    fn entry(id: &str, title: &str) -> ListingEntry {
        ListingEntry {
            id: Some(id.to_string()),
            title: Some(title.to_string()),
            upload_date: Some("20240101".to_string()),
        }
    }

    fn three_video_listing() -> ChannelListing {
        ChannelListing {
            channel_name: Some("Test Channel".to_string()),
            channel_id: Some("UCtest".to_string()),
            entries: Some(vec![
                entry("aaa", "First Video"),
                entry("bbb", "Second Video"),
                entry("ccc", "Third Video"),
            ]),
        }
    }

    fn captions_for_two() -> MockCaptionSource {
        let mut captions = MockCaptionSource::new();
        captions.expect_fetch().returning(|video_id| {
            if video_id == "ccc" {
                Err(CaptionError::Disabled)
            } else {
                Ok(vec![CaptionEntry {
                    start: 1.0,
                    text: format!("caption for {}", video_id),
                }])
            }
        });
        captions
    }

    fn pipeline_with(
        hosting: MockHostingService,
        captions: MockCaptionSource,
        engine: Option<Box<dyn SpeechToText>>,
    ) -> ChannelPipeline {
        ChannelPipeline::new(
            Config::default(),
            Box::new(hosting),
            Box::new(captions),
            Box::new(MockAudioExtractor::new()),
            engine,
        )
    }

    #[tokio::test]
    async fn test_channel_run_partial_success() {
        let mut hosting = MockHostingService::new();
        hosting
            .expect_list_uploads()
            .returning(|_, _| Ok(three_video_listing()));

        let output = tempfile::tempdir().unwrap();
        let pipeline = pipeline_with(hosting, captions_for_two(), None);

        let summary = pipeline
            .run("https://www.youtube.com/@testchannel", output.path())
            .await
            .unwrap();

        assert_eq!(summary.channel_name, "Test Channel");
        assert_eq!(summary.total_videos, 3);
        assert_eq!(summary.successful, 2);

        // Exactly two transcript files on disk
        let files: Vec<_> = fs_err::read_dir(&summary.transcript_dir)
            .unwrap()
            .flatten()
            .collect();
        assert_eq!(files.len(), 2);

        // Metadata lists the two successes and never the failed id
        let metadata: crate::output::ChannelMetadata =
            serde_json::from_str(&fs_err::read_to_string(&summary.metadata_path).unwrap())
                .unwrap();
        let ids: Vec<&str> = metadata.videos.iter().map(|v| v.video_id.as_str()).collect();
        assert_eq!(ids, vec!["aaa", "bbb"]);
        assert!(!ids.contains(&"ccc"));
    }

    #[tokio::test]
    async fn test_channel_run_empty_channel() {
        let mut hosting = MockHostingService::new();
        hosting.expect_list_uploads().returning(|_, _| {
            Ok(ChannelListing {
                channel_name: Some("Empty Channel".to_string()),
                channel_id: Some("UCempty".to_string()),
                entries: Some(vec![]),
            })
        });

        let mut captions = MockCaptionSource::new();
        captions.expect_fetch().never();

        let output = tempfile::tempdir().unwrap();
        let pipeline = pipeline_with(hosting, captions, None);

        let summary = pipeline
            .run("https://www.youtube.com/@empty", output.path())
            .await
            .unwrap();

        assert_eq!(summary.total_videos, 0);
        assert_eq!(summary.successful, 0);

        let files: Vec<_> = fs_err::read_dir(&summary.transcript_dir)
            .unwrap()
            .flatten()
            .collect();
        assert!(files.is_empty());

        let metadata: crate::output::ChannelMetadata =
            serde_json::from_str(&fs_err::read_to_string(&summary.metadata_path).unwrap())
                .unwrap();
        assert!(metadata.videos.is_empty());
    }

    #[tokio::test]
    async fn test_channel_run_idempotent_transcripts() {
        let output = tempfile::tempdir().unwrap();

        let mut first_bytes = None;
        for _ in 0..2 {
            let mut hosting = MockHostingService::new();
            hosting
                .expect_list_uploads()
                .returning(|_, _| Ok(three_video_listing()));

            let pipeline = pipeline_with(hosting, captions_for_two(), None);
            let summary = pipeline
                .run("https://www.youtube.com/@testchannel", output.path())
                .await
                .unwrap();

            let mut paths: Vec<_> = fs_err::read_dir(&summary.transcript_dir)
                .unwrap()
                .flatten()
                .map(|e| e.path())
                .collect();
            paths.sort();
            let bytes: Vec<Vec<u8>> =
                paths.iter().map(|p| fs_err::read(p).unwrap()).collect();

            match &first_bytes {
                None => first_bytes = Some(bytes),
                Some(previous) => assert_eq!(previous, &bytes),
            }
        }
    }

    #[tokio::test]
    async fn test_channel_run_whisper_fallback_is_tagged() {
        let mut hosting = MockHostingService::new();
        hosting.expect_list_uploads().returning(|_, _| {
            Ok(ChannelListing {
                channel_name: Some("Test Channel".to_string()),
                channel_id: Some("UCtest".to_string()),
                entries: Some(vec![entry("ccc", "Captionless Video")]),
            })
        });
        hosting
            .expect_fetch_best_audio()
            .returning(|_, dir| Ok(dir.join("audio_12345678.mp3")));

        let mut captions = MockCaptionSource::new();
        captions
            .expect_fetch()
            .returning(|_| Err(CaptionError::Disabled));

        let mut audio = MockAudioExtractor::new();
        audio.expect_extract_wav().returning(|_, _| Ok(()));

        let mut engine = MockSpeechToText::new();
        engine
            .expect_transcribe()
            .returning(|_| Ok("spoken words".to_string()));

        let output = tempfile::tempdir().unwrap();
        let pipeline = ChannelPipeline::new(
            Config::default(),
            Box::new(hosting),
            Box::new(captions),
            Box::new(audio),
            Some(Box::new(engine)),
        );

        let summary = pipeline
            .run("https://www.youtube.com/@testchannel", output.path())
            .await
            .unwrap();
        assert_eq!(summary.successful, 1);

        let metadata: crate::output::ChannelMetadata =
            serde_json::from_str(&fs_err::read_to_string(&summary.metadata_path).unwrap())
                .unwrap();
        assert_eq!(
            metadata.videos[0].transcript_source,
            crate::transcribe::TranscriptSource::SpeechToText
        );
    }

    #[tokio::test]
    async fn test_channel_run_unrecognized_url_is_fatal() {
        let hosting = MockHostingService::new();
        let captions = MockCaptionSource::new();
        let output = tempfile::tempdir().unwrap();
        let pipeline = pipeline_with(hosting, captions, None);

        let err = pipeline
            .run("https://vimeo.com/somechannel", output.path())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Unrecognized channel URL"));
    }

    #[test]
    fn test_provider_from_url() {
        let yt = Url::parse("https://www.youtube.com/watch?v=abc").unwrap();
        assert_eq!(Provider::from_url(&yt), Some(Provider::YouTube));

        let short = Url::parse("https://youtu.be/abc").unwrap();
        assert_eq!(Provider::from_url(&short), Some(Provider::YouTube));

        let insta = Url::parse("https://www.instagram.com/reel/xyz/").unwrap();
        assert_eq!(Provider::from_url(&insta), Some(Provider::Instagram));

        // Host component matching, not substring search
        let tricky = Url::parse("https://youtube.com.evil.example/watch?v=abc").unwrap();
        assert_eq!(Provider::from_url(&tricky), None);

        let vimeo = Url::parse("https://vimeo.com/12345").unwrap();
        assert_eq!(Provider::from_url(&vimeo), None);
    }

    #[test]
    fn test_video_input_parse() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("clip.mp4");
        fs_err::write(&file, b"not really a video").unwrap();

        match VideoInput::parse(file.to_str().unwrap()).unwrap() {
            VideoInput::LocalFile(path) => assert_eq!(path, file),
            other => panic!("expected local file, got {:?}", other),
        }

        let doc = dir.path().join("notes.txt");
        fs_err::write(&doc, b"text").unwrap();
        assert!(VideoInput::parse(doc.to_str().unwrap()).is_err());

        match VideoInput::parse("https://youtu.be/abc123").unwrap() {
            VideoInput::Remote { provider, .. } => assert_eq!(provider, Provider::YouTube),
            other => panic!("expected remote input, got {:?}", other),
        }

        assert!(VideoInput::parse("https://vimeo.com/12345").is_err());
        assert!(VideoInput::parse("not-a-url-and-not-a-file").is_err());
    }

    #[tokio::test]
    async fn test_video_pipeline_download_failure_is_reported() {
        let mut hosting = MockHostingService::new();
        hosting
            .expect_fetch_video()
            .returning(|_, _| Err(anyhow::anyhow!("404 not found")));

        let pipeline = VideoPipeline::new(
            Box::new(hosting),
            Box::new(MockAudioExtractor::new()),
            Box::new(MockSpeechToText::new()),
        );

        let err = pipeline
            .run("https://youtu.be/missing", None)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Download failed"));
    }

    #[tokio::test]
    async fn test_video_pipeline_remote_success() {
        let mut hosting = MockHostingService::new();
        hosting.expect_fetch_video().returning(|_, dir| {
            let path = dir.join("video_12345678.mp4");
            std::fs::write(&path, b"container").unwrap();
            Ok(path)
        });

        let mut audio = MockAudioExtractor::new();
        audio.expect_extract_wav().returning(|_, dest| {
            std::fs::write(dest, b"wav").unwrap();
            Ok(())
        });

        let mut engine = MockSpeechToText::new();
        engine
            .expect_transcribe()
            .returning(|_| Ok("hello from the video".to_string()));

        let keep_dir = tempfile::tempdir().unwrap();
        let pipeline = VideoPipeline::new(Box::new(hosting), Box::new(audio), Box::new(engine));

        let result = pipeline
            .run("https://youtu.be/abc123", Some(keep_dir.path()))
            .await
            .unwrap();

        assert_eq!(result.text, "hello from the video");
        let kept = result.audio_path.unwrap();
        assert!(kept.exists());
        assert_eq!(kept.file_name().unwrap(), "video_12345678.wav");
    }
}

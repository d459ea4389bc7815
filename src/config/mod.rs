use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application settings
    pub app: AppConfig,

    /// Platform caption retrieval settings
    pub captions: CaptionsConfig,

    /// Local speech-to-text engine settings
    pub whisper: WhisperConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Root directory for channel transcript output
    pub output_dir: PathBuf,

    /// Maximum number of uploads to enumerate per channel
    pub max_videos: usize,

    /// Maximum number of title characters used in transcript filenames
    pub title_max_chars: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptionsConfig {
    /// Caption languages in preference order
    pub languages: Vec<String>,

    /// Prefer human-authored tracks over auto-generated ones
    pub prefer_manual: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhisperConfig {
    /// Name or path of the whisper.cpp CLI binary
    pub binary: String,

    /// Path to a ggml model file; speech-to-text is disabled when unset
    pub model_path: Option<PathBuf>,

    /// Spoken language hint passed to the engine
    pub language: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app: AppConfig {
                output_dir: PathBuf::from("transcripts"),
                max_videos: 50,
                title_max_chars: 50,
            },
            captions: CaptionsConfig {
                languages: vec!["en".to_string(), "en-US".to_string()],
                prefer_manual: true,
            },
            whisper: WhisperConfig {
                binary: "whisper-cli".to_string(),
                model_path: None,
                language: None,
            },
        }
    }
}

impl Config {
    /// Load configuration from file or create default
    pub async fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = fs_err::read_to_string(&config_path)
                .context("Failed to read config file")?;

            let config: Config = serde_yaml::from_str(&content)
                .context("Failed to parse config file")?;

            config.validate()?;
            Ok(config)
        } else {
            let config = Self::default();
            config.save().await?;
            Ok(config)
        }
    }

    /// Save configuration to file
    pub async fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            fs_err::create_dir_all(parent)?;
        }

        let content = serde_yaml::to_string(self)
            .context("Failed to serialize config")?;

        fs_err::write(&config_path, content)
            .context("Failed to write config file")?;

        Ok(())
    }

    /// Get configuration file path
    fn config_path() -> Result<PathBuf> {
        // First try current directory for easy testing
        let local_config = PathBuf::from("config.yaml");
        if local_config.exists() {
            return Ok(local_config);
        }

        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?;

        Ok(config_dir.join("yt-scribe").join("config.yaml"))
    }

    /// Validate configuration
    fn validate(&self) -> Result<()> {
        if self.app.max_videos == 0 {
            anyhow::bail!("app.max_videos must be greater than zero");
        }

        if self.app.title_max_chars == 0 {
            anyhow::bail!("app.title_max_chars must be greater than zero");
        }

        if self.captions.languages.is_empty() {
            anyhow::bail!("captions.languages must list at least one language");
        }

        Ok(())
    }

    /// Display current configuration
    pub fn display(&self) {
        println!("Current Configuration:");
        println!("  Output Directory: {}", self.app.output_dir.display());
        println!("  Max Videos per Channel: {}", self.app.max_videos);
        println!("  Caption Languages: {}", self.captions.languages.join(", "));
        println!("  Whisper Binary: {}", self.whisper.binary);
        match &self.whisper.model_path {
            Some(path) => println!("  Whisper Model: {}", path.display()),
            None => println!("  Whisper Model: (not configured - caption fallback disabled)"),
        }
    }
}

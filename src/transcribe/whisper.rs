use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

use super::SpeechToText;
use crate::config::WhisperConfig;
use crate::{Result, ScribeError};

/// Speech-to-text engine backed by a whisper.cpp CLI binary.
///
/// Constructed once by the caller and reused for every video in the session.
#[derive(Debug)]
pub struct WhisperEngine {
    binary: String,
    model_path: PathBuf,
    language: Option<String>,
}

impl WhisperEngine {
    pub fn new(binary: String, model_path: PathBuf, language: Option<String>) -> Result<Self> {
        if !model_path.exists() {
            return Err(anyhow::Error::new(ScribeError::SpeechToText(format!(
                "model not found: {}",
                model_path.display()
            ))));
        }

        Ok(Self {
            binary,
            model_path,
            language,
        })
    }

    /// Build the engine from configuration. Returns `None` when no model is
    /// configured, which disables the speech-to-text fallback.
    pub fn from_config(config: &WhisperConfig) -> Result<Option<Self>> {
        match &config.model_path {
            None => Ok(None),
            Some(path) => Ok(Some(Self::new(
                config.binary.clone(),
                path.clone(),
                config.language.clone(),
            )?)),
        }
    }
}

#[async_trait]
impl SpeechToText for WhisperEngine {
    async fn transcribe(&self, audio: &Path) -> Result<String> {
        tracing::debug!("Transcribing {} with {}", audio.display(), self.binary);

        let mut command = Command::new(&self.binary);
        command
            .arg("-m")
            .arg(&self.model_path)
            .arg("-f")
            .arg(audio)
            .arg("--no-timestamps");

        if let Some(lang) = &self.language {
            command.arg("-l").arg(lang);
        }

        let output = command
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    anyhow::Error::new(ScribeError::ToolMissing(self.binary.clone()))
                } else {
                    anyhow::Error::new(ScribeError::SpeechToText(format!(
                        "failed to run {}: {}",
                        self.binary, e
                    )))
                }
            })?;

        if !output.status.success() {
            let error = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow::Error::new(ScribeError::SpeechToText(
                error.trim().to_string(),
            )));
        }

        let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if text.is_empty() {
            return Err(anyhow::Error::new(ScribeError::SpeechToText(
                "engine produced no output".to_string(),
            )));
        }

        Ok(text)
    }
}

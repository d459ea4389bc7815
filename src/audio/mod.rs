use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

use crate::{Result, ScribeError};

/// Trait for turning a downloaded media file into engine-ready audio.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait AudioExtractor: Send + Sync {
    /// Extract the audio track of `source` into `dest` as 16 kHz mono WAV,
    /// the input format the speech-to-text engine expects.
    async fn extract_wav(&self, source: &Path, dest: &Path) -> Result<()>;
}

/// ffmpeg-backed audio extraction
pub struct FfmpegExtractor {
    ffmpeg_path: String,
}

impl FfmpegExtractor {
    pub fn new() -> Self {
        Self {
            ffmpeg_path: "ffmpeg".to_string(),
        }
    }
}

impl Default for FfmpegExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AudioExtractor for FfmpegExtractor {
    async fn extract_wav(&self, source: &Path, dest: &Path) -> Result<()> {
        tracing::debug!(
            "Extracting audio: {} -> {}",
            source.display(),
            dest.display()
        );

        let output = Command::new(&self.ffmpeg_path)
            .arg("-y")
            .arg("-i")
            .arg(source)
            .arg("-vn")
            .arg("-ar")
            .arg("16000")
            .arg("-ac")
            .arg("1")
            .arg("-loglevel")
            .arg("error")
            .arg(dest)
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    anyhow::Error::new(ScribeError::ToolMissing("ffmpeg".to_string()))
                } else {
                    anyhow::Error::new(ScribeError::AudioExtraction(format!(
                        "ffmpeg execution failed: {}",
                        e
                    )))
                }
            })?;

        if !output.status.success() {
            let error = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow::Error::new(ScribeError::AudioExtraction(
                error.trim().to_string(),
            )));
        }

        Ok(())
    }
}

use std::path::Path;

/// Characters that must never appear in a path segment derived from a video
/// or channel title.
const UNSAFE_FILENAME_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Strip filesystem-unsafe characters from a title or channel name.
///
/// Characters are removed rather than replaced so that reruns over the same
/// channel always derive the same names.
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .filter(|c| !UNSAFE_FILENAME_CHARS.contains(c))
        .collect()
}

/// Truncate a string to at most `max_chars` characters, never splitting a
/// multi-byte character.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

/// Format a caption start offset as `MM:SS`.
///
/// Minutes are not wrapped at the hour so a 90-minute mark renders as `90:00`,
/// matching how the transcript lines are consumed downstream.
pub fn format_timestamp(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    format!("{:02}:{:02}", total / 60, total % 60)
}

/// Check if a file exists and is readable
pub fn check_file_accessible(path: &Path) -> crate::Result<()> {
    if !path.exists() {
        anyhow::bail!("File does not exist: {}", path.display());
    }

    if !path.is_file() {
        anyhow::bail!("Path is not a file: {}", path.display());
    }

    std::fs::metadata(path)
        .map_err(|e| anyhow::anyhow!("Cannot access file {}: {}", path.display(), e))?;

    Ok(())
}

/// Check if the current environment has required tools
pub async fn check_dependencies() -> Vec<String> {
    let mut missing = Vec::new();

    // Check for yt-dlp
    if !check_command_available("yt-dlp").await {
        missing.push("yt-dlp - required for channel listing and media download".to_string());
    }

    // Check for ffmpeg
    if !check_command_available("ffmpeg").await {
        missing.push("ffmpeg - required for audio extraction".to_string());
    }

    missing
}

/// Check if a command is available in PATH
async fn check_command_available(command: &str) -> bool {
    use tokio::process::Command;

    Command::new(command)
        .arg("--version")
        .output()
        .await
        .map(|output| output.status.success())
        .unwrap_or(false)
}

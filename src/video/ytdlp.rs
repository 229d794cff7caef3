use std::{
    path::{Path, PathBuf},
    process::Stdio,
};

use async_trait::async_trait;
use log::info;
use serde::Deserialize;
use tokio::{
    fs,
    io::{AsyncBufReadExt, AsyncRead, BufReader},
    process,
    sync::mpsc,
};

use crate::errors::{BotError, BotResult};

/// Video-level metadata reported by yt-dlp.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct VideoDetails {
    #[serde(default)]
    pub id: String,
    pub title: Option<String>,
    pub uploader: Option<String>,
    /// Seconds. yt-dlp reports fractional values for some sources.
    pub duration: Option<f64>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl VideoDetails {
    pub fn duration_secs(&self) -> u32 {
        self.duration.map(|d| d.max(0.0) as u32).unwrap_or(0)
    }
}

/// One stream variant as listed by yt-dlp.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawFormat {
    pub format_id: String,
    #[serde(default)]
    pub ext: String,
    pub height: Option<u32>,
    pub vcodec: Option<String>,
    pub acodec: Option<String>,
    pub filesize: Option<u64>,
    pub filesize_approx: Option<u64>,
}

impl RawFormat {
    pub fn has_video(&self) -> bool {
        codec_present(&self.vcodec)
    }

    pub fn has_audio(&self) -> bool {
        codec_present(&self.acodec)
    }

    /// Exact size when known, otherwise the estimate. Zero counts as unknown.
    pub fn approximate_size(&self) -> Option<u64> {
        self.filesize
            .filter(|&s| s > 0)
            .or(self.filesize_approx.filter(|&s| s > 0))
    }
}

fn codec_present(codec: &Option<String>) -> bool {
    codec.as_deref().is_some_and(|c| !c.is_empty() && c != "none")
}

/// Output of a metadata-only extraction.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExtractedInfo {
    #[serde(flatten)]
    pub details: VideoDetails,
    #[serde(default)]
    pub formats: Vec<RawFormat>,
}

/// Output of a finished download.
#[derive(Debug, Clone, Deserialize)]
pub struct DownloadedMedia {
    #[serde(flatten)]
    pub details: VideoDetails,
    /// Path yt-dlp reported. The container may have changed after merging.
    #[serde(rename = "_filename")]
    pub filename: PathBuf,
}

/// Media extraction engine.
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Fetch metadata and the stream list without downloading.
    async fn extract_info(&self, url: &str) -> BotResult<ExtractedInfo>;

    /// Download `format_id` to `output_template` (yt-dlp template syntax).
    ///
    /// Completion percentages are pushed to `progress_sender` while the transfer runs.
    async fn download(
        &self,
        url: &str,
        format_id: &str,
        output_template: &Path,
        progress_sender: Option<mpsc::UnboundedSender<f32>>,
    ) -> BotResult<DownloadedMedia>;
}

/// Percentage from a `[download]` progress line, e.g. `[download]  45.3% of 10.00MiB`.
pub fn parse_progress(line: &str) -> Option<f32> {
    let rest = line.trim_start().strip_prefix("[download]")?;
    rest.split_whitespace()
        .find_map(|token| token.strip_suffix('%'))
        .and_then(|percent| percent.parse::<f32>().ok())
        .filter(|percent| (0.0..=100.0).contains(percent))
}

fn last_json_line(stdout: &str) -> BotResult<&str> {
    // With --no-simulate yt-dlp may print other lines before the JSON.
    stdout
        .lines()
        .rev()
        .find(|line| line.trim_start().starts_with('{'))
        .ok_or_else(|| BotError::ParseError("yt-dlp printed no JSON".to_string()))
}

/// Collects the lines of `reader`, forwarding progress lines instead of keeping them.
async fn collect_lines<R: AsyncRead + Unpin>(
    reader: R,
    progress_sender: Option<&mpsc::UnboundedSender<f32>>,
) -> std::io::Result<String> {
    let mut lines = BufReader::new(reader).lines();
    let mut kept = String::new();

    while let Some(line) = lines.next_line().await? {
        if let Some(percent) = parse_progress(&line) {
            if let Some(sender) = progress_sender {
                let _ = sender.send(percent);
            }
            continue;
        }
        kept.push_str(&line);
        kept.push('\n');
    }

    Ok(kept)
}

/// Drives the `yt-dlp` binary.
#[derive(Debug, Clone)]
pub struct YtDlp {
    binary: String,
}

impl YtDlp {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    fn base_command(&self) -> process::Command {
        let mut cmd = process::Command::new(&self.binary);
        cmd.arg("--no-playlist")
            .arg("--no-warnings")
            .args(["--socket-timeout", "15"])
            .kill_on_drop(true);
        cmd
    }

    /// Returns the installed version, failing when the binary is missing.
    pub async fn version(&self) -> BotResult<String> {
        let output = process::Command::new(&self.binary)
            .arg("--version")
            .output()
            .await
            .map_err(|e| BotError::external_command_error(&self.binary, e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).to_string();
            return Err(BotError::external_command_error(&self.binary, stderr));
        }

        let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if version.is_empty() {
            return Err(BotError::general("yt-dlp printed no version"));
        }
        Ok(version)
    }

    async fn run_json<T: for<'de> Deserialize<'de>>(
        &self,
        mut cmd: process::Command,
    ) -> BotResult<T> {
        let output = cmd
            .output()
            .await
            .map_err(|e| BotError::external_command_error(&self.binary, e.to_string()))?;

        info!("yt-dlp exit code: {:?}", output.status.code());

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            log::error!("yt-dlp failed: {}", stderr);
            return Err(BotError::youtube_error(stderr));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(serde_json::from_str(last_json_line(&stdout)?)?)
    }

    /// Like `run_json`, but reads output as it is produced so progress can be reported.
    async fn run_json_streaming<T: for<'de> Deserialize<'de>>(
        &self,
        mut cmd: process::Command,
        progress_sender: Option<mpsc::UnboundedSender<f32>>,
    ) -> BotResult<T> {
        let mut child = cmd
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| BotError::external_command_error(&self.binary, e.to_string()))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| BotError::general("yt-dlp stdout is not piped"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| BotError::general("yt-dlp stderr is not piped"))?;

        // Quiet mode (-j) sends progress to stderr, so both streams are scanned.
        let (stdout, stderr) = tokio::join!(
            collect_lines(stdout, progress_sender.as_ref()),
            collect_lines(stderr, progress_sender.as_ref())
        );
        let (stdout, stderr) = (stdout?, stderr?);
        let status = child.wait().await?;

        info!("yt-dlp exit code: {:?}", status.code());

        if !status.success() {
            let stderr = stderr.trim().to_string();
            log::error!("yt-dlp failed: {}", stderr);
            return Err(BotError::youtube_error(stderr));
        }

        Ok(serde_json::from_str(last_json_line(&stdout)?)?)
    }

    fn download_command(
        &self,
        url: &str,
        format_id: &str,
        output_template: &Path,
    ) -> process::Command {
        let mut cmd = self.base_command();
        cmd.args(["-f", format_id])
            .arg("-o")
            .arg(output_template)
            .arg("--no-simulate")
            .arg("-j")
            .arg("--progress")
            .arg("--newline")
            // Keep the local mtime so the old-file sweep does not pick up fresh downloads.
            .arg("--no-mtime")
            .arg(url);
        cmd
    }
}

impl Default for YtDlp {
    fn default() -> Self {
        Self::new("yt-dlp")
    }
}

#[async_trait]
impl Extractor for YtDlp {
    async fn extract_info(&self, url: &str) -> BotResult<ExtractedInfo> {
        let mut cmd = self.base_command();
        cmd.arg("-J").arg(url);

        info!("Extracting info: {}", url);
        self.run_json(cmd).await
    }

    async fn download(
        &self,
        url: &str,
        format_id: &str,
        output_template: &Path,
        progress_sender: Option<mpsc::UnboundedSender<f32>>,
    ) -> BotResult<DownloadedMedia> {
        if let Some(dir) = output_template.parent() {
            fs::create_dir_all(dir).await?;
        }

        let cmd = self.download_command(url, format_id, output_template);

        info!("Starting download: {} (format: {})", url, format_id);
        self.run_json_streaming(cmd, progress_sender).await
    }
}

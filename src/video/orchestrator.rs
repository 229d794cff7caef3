use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use log::{error, info, warn};
use teloxide::{
    types::{ChatId, MessageId, UserId},
    utils::html,
};
use tokio::{fs, sync::mpsc, task::JoinHandle};

use crate::{
    config::Config,
    errors::BotResult,
    menu::format_size,
    session::SessionStore,
    texts,
    transport::{ChatTransport, VideoUpload},
    utils::locate_output,
    video::{Extractor, Format, VideoDetails},
};

/// Containers tried when yt-dlp's reported filename does not exist.
pub const FALLBACK_EXTENSIONS: [&str; 3] = ["mp4", "mkv", "webm"];

const DEFAULT_WIDTH: u32 = 1280;
const DEFAULT_HEIGHT: u32 = 720;

/// Percentage points between two progress edits of the status message.
const PROGRESS_STEP: f32 = 10.0;
const PROGRESS_BAR_WIDTH: usize = 10;

/// A quality the user picked, plus where to report progress.
#[derive(Debug, Clone)]
pub struct DownloadJob {
    pub user: UserId,
    pub chat_id: ChatId,
    pub status_message: MessageId,
    pub url: String,
    pub format: Format,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DownloadOutcome {
    Delivered { size: u64 },
    /// yt-dlp finished but no file could be found under any known container
    NotFound,
    TooLarge { size: u64, limit: u64 },
    /// Extraction, filesystem or Telegram failure. The message was shown to the user.
    Failed(String),
}

/// A file on disk waiting to be sent.
#[derive(Debug, Clone)]
pub struct DownloadResult {
    pub path: PathBuf,
    pub size: u64,
    pub details: VideoDetails,
}

pub fn output_template(dir: &Path, label: &str) -> PathBuf {
    dir.join(format!("%(title)s_{}_%(id)s.%(ext)s", label))
}

pub fn caption(result: &DownloadResult, label: &str, bot_username: Option<&str>) -> String {
    let title = result.details.title.as_deref().unwrap_or("Video");
    let mut caption = format!(
        "🎬 <b>{}</b>\n📊 Quality: {}\n📦 Size: {}",
        html::escape(title),
        label,
        format_size(Some(result.size))
    );
    if let Some(username) = bot_username {
        caption.push_str(&format!("\n\n🤖 @{}", username));
    }
    caption
}

fn downloading_message(format: &Format, percent: Option<f32>) -> String {
    let progress = match percent {
        Some(percent) => format!(" {:.0}%\n{}", percent, progress_bar(percent)),
        None => String::new(),
    };
    format!(
        "⏳ <b>Downloading...</b>{}\n\n🎬 Quality: {}\n📦 Size: ~{}\n⏱️ This may take a while...",
        progress,
        format.label,
        format_size(format.size)
    )
}

fn progress_bar(percent: f32) -> String {
    let filled =
        ((percent.clamp(0.0, 100.0) / 100.0) * PROGRESS_BAR_WIDTH as f32).round() as usize;
    format!(
        "{}{}",
        "▓".repeat(filled),
        "░".repeat(PROGRESS_BAR_WIDTH - filled)
    )
}

/// Lets a progress value through once it has moved at least `step` points.
#[derive(Debug)]
struct ProgressThrottle {
    step: f32,
    last: f32,
}

impl ProgressThrottle {
    fn new(step: f32) -> Self {
        Self { step, last: 0.0 }
    }

    fn accept(&mut self, percent: f32) -> bool {
        if percent - self.last >= self.step || (percent >= 100.0 && self.last < 100.0) {
            self.last = percent;
            return true;
        }
        false
    }
}

fn too_large_message(size: u64, limit: u64) -> String {
    format!(
        "❌ <b>The file is too large!</b>\nSize: {}\nLimit: {}\n\nTry a lower quality.",
        format_size(Some(size)),
        format_size(Some(limit))
    )
}

fn failure_message(reason: &str) -> String {
    format!(
        "❌ <b>Download error:</b>\n<code>{}</code>\n\n\
        The video may be protected or unavailable in your region.",
        html::escape(reason)
    )
}

/// Runs [`download_and_send`] on its own task so the chat keeps being served.
///
/// A `/cancel` arriving meanwhile only clears the session. The download itself
/// runs to completion or failure.
pub fn spawn_download<E, T>(
    extractor: Arc<E>,
    transport: Arc<T>,
    sessions: SessionStore,
    config: Arc<Config>,
    job: DownloadJob,
) -> JoinHandle<DownloadOutcome>
where
    E: Extractor + ?Sized + 'static,
    T: ChatTransport + ?Sized + 'static,
{
    tokio::spawn(async move {
        let chat_id = job.chat_id;
        let outcome = download_and_send(&*extractor, &*transport, &sessions, &config, job).await;
        match &outcome {
            DownloadOutcome::Delivered { size } => {
                info!("Delivered {} bytes to {}", size, chat_id)
            }
            DownloadOutcome::TooLarge { size, limit } => {
                info!("Rejected {} bytes for {} (limit {})", size, chat_id, limit)
            }
            DownloadOutcome::NotFound => warn!("Downloaded file for {} vanished", chat_id),
            DownloadOutcome::Failed(reason) => {
                warn!("Download for {} failed: {}", chat_id, reason)
            }
        }
        outcome
    })
}

/// Downloads the chosen format and sends it to the chat.
///
/// The session is cleared only after a successful upload. On every other
/// outcome it stays in `SelectingQuality`.
pub async fn download_and_send<E, T>(
    extractor: &E,
    transport: &T,
    sessions: &SessionStore,
    config: &Config,
    job: DownloadJob,
) -> DownloadOutcome
where
    E: Extractor + ?Sized,
    T: ChatTransport + ?Sized,
{
    let mut local_file = None;

    match deliver(extractor, transport, sessions, config, &job, &mut local_file).await {
        Ok(outcome) => outcome,
        Err(e) => {
            let reason = e.to_string();
            error!("Download of {} ({}) failed: {}", job.url, job.format.label, reason);

            if let Err(e) = transport
                .edit_text(job.chat_id, job.status_message, failure_message(&reason))
                .await
            {
                warn!("Could not report failure: {}", e);
            }

            if let Some(path) = local_file {
                if let Err(e) = fs::remove_file(&path).await {
                    warn!("Could not remove {}: {}", path.display(), e);
                }
            }

            DownloadOutcome::Failed(reason)
        }
    }
}

async fn deliver<E, T>(
    extractor: &E,
    transport: &T,
    sessions: &SessionStore,
    config: &Config,
    job: &DownloadJob,
    local_file: &mut Option<PathBuf>,
) -> BotResult<DownloadOutcome>
where
    E: Extractor + ?Sized,
    T: ChatTransport + ?Sized,
{
    transport
        .edit_text(
            job.chat_id,
            job.status_message,
            downloading_message(&job.format, None),
        )
        .await?;

    let template = output_template(&config.download_path, &job.format.label);
    let (progress_tx, mut progress_rx) = mpsc::unbounded_channel();
    let download = extractor.download(&job.url, &job.format.id, &template, Some(progress_tx));

    // Ends once the download drops its sender.
    let report_progress = async {
        let mut throttle = ProgressThrottle::new(PROGRESS_STEP);
        while let Some(percent) = progress_rx.recv().await {
            if !throttle.accept(percent) {
                continue;
            }
            if let Err(e) = transport
                .edit_text(
                    job.chat_id,
                    job.status_message,
                    downloading_message(&job.format, Some(percent)),
                )
                .await
            {
                warn!("Could not report progress: {}", e);
            }
        }
    };

    let (media, ()) = tokio::join!(download, report_progress);
    let media = media?;

    let Some(path) = locate_output(&media.filename, &FALLBACK_EXTENSIONS).await else {
        warn!("yt-dlp reported {} but nothing was found", media.filename.display());
        transport
            .edit_text(job.chat_id, job.status_message, texts::FILE_NOT_FOUND.to_string())
            .await?;
        return Ok(DownloadOutcome::NotFound);
    };
    *local_file = Some(path.clone());

    let size = fs::metadata(&path).await?.len();
    if size > config.max_file_size {
        fs::remove_file(&path).await?;
        *local_file = None;
        info!(
            "Rejected {}: {} bytes over the {} byte limit",
            path.display(),
            size,
            config.max_file_size
        );
        transport
            .edit_text(
                job.chat_id,
                job.status_message,
                too_large_message(size, config.max_file_size),
            )
            .await?;
        return Ok(DownloadOutcome::TooLarge {
            size,
            limit: config.max_file_size,
        });
    }

    let result = DownloadResult {
        path,
        size,
        details: media.details,
    };

    transport
        .edit_text(job.chat_id, job.status_message, texts::UPLOADING.to_string())
        .await?;

    let upload = VideoUpload {
        path: result.path.clone(),
        caption: caption(&result, &job.format.label, config.bot_username.as_deref()),
        duration: result.details.duration_secs(),
        width: result.details.width.unwrap_or(DEFAULT_WIDTH),
        height: result.details.height.unwrap_or(DEFAULT_HEIGHT),
    };
    transport.send_video(job.chat_id, upload).await?;
    info!("Sent {} ({} bytes) to {}", result.path.display(), result.size, job.chat_id);

    // All three run even if one of them fails.
    if let Err(e) = transport.delete_message(job.chat_id, job.status_message).await {
        warn!("Could not delete status message: {}", e);
    }
    if let Err(e) = fs::remove_file(&result.path).await {
        warn!("Could not remove {}: {}", result.path.display(), e);
    }
    *local_file = None;
    sessions.delete(job.user).await;

    Ok(DownloadOutcome::Delivered { size: result.size })
}

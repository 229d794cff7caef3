pub mod orchestrator;
pub mod resolver;
pub mod ytdlp;

pub use orchestrator::{DownloadJob, spawn_download};
pub use resolver::{Format, Resolution, resolve};
pub use ytdlp::{Extractor, VideoDetails, YtDlp};

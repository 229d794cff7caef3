use std::{
    path::{Path, PathBuf},
    time::{Duration, SystemTime},
};

use tokio::{fs, io};

/// Loose check: the text only has to mention a YouTube host.
pub fn is_youtube_link(text: &str) -> bool {
    text.contains("youtube.com") || text.contains("youtu.be")
}

pub fn format_duration(seconds: u32) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{}:{:02}", minutes, secs)
    }
}

/// Removes every regular file in `dir`. A missing directory is not an error.
pub async fn clear_dir(dir: impl AsRef<Path>) -> io::Result<usize> {
    remove_files_where(dir.as_ref(), |_| true).await
}

/// Removes files whose modification time is older than `max_age`.
pub async fn cleanup_old_files(dir: impl AsRef<Path>, max_age: Duration) -> io::Result<usize> {
    let now = SystemTime::now();
    remove_files_where(dir.as_ref(), |modified| {
        now.duration_since(modified).unwrap_or_default() >= max_age
    })
    .await
}

async fn remove_files_where<F>(dir: &Path, should_remove: F) -> io::Result<usize>
where
    F: Fn(SystemTime) -> bool,
{
    let mut entries = match fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(e),
    };

    let mut removed = 0;
    while let Some(entry) = entries.next_entry().await? {
        let metadata = entry.metadata().await?;
        if !metadata.is_file() {
            continue;
        }
        if should_remove(metadata.modified()?) {
            fs::remove_file(entry.path()).await?;
            log::info!("Removed stale file {}", entry.path().display());
            removed += 1;
        }
    }

    Ok(removed)
}

/// Existing file for `reported`, trying other containers when the extension changed.
pub async fn locate_output(reported: &Path, fallback_exts: &[&str]) -> Option<PathBuf> {
    if fs::try_exists(reported).await.unwrap_or(false) {
        return Some(reported.to_path_buf());
    }

    for ext in fallback_exts {
        let candidate = reported.with_extension(ext);
        if fs::try_exists(&candidate).await.unwrap_or(false) {
            return Some(candidate);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_youtube_link_substring_check() {
        assert!(is_youtube_link("https://youtu.be/abc123"));
        assert!(is_youtube_link("https://www.youtube.com/watch?v=abc123"));
        assert!(is_youtube_link("https://youtube.com/shorts/xyz"));
        assert!(is_youtube_link("look at youtube.com"));
        assert!(!is_youtube_link("https://vimeo.com/123"));
        assert!(!is_youtube_link("hello"));
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0), "0:00");
        assert_eq!(format_duration(65), "1:05");
        assert_eq!(format_duration(3600), "1:00:00");
        assert_eq!(format_duration(3725), "1:02:05");
    }

    #[tokio::test]
    async fn test_clear_dir_keeps_subdirectories() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.mp4"), b"a").await.unwrap();
        fs::write(dir.path().join("b.webm"), b"b").await.unwrap();
        fs::create_dir(dir.path().join("nested")).await.unwrap();

        assert_eq!(clear_dir(dir.path()).await.unwrap(), 2);
        assert!(dir.path().join("nested").exists());
        assert!(!dir.path().join("a.mp4").exists());
    }

    #[tokio::test]
    async fn test_clear_missing_dir_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(clear_dir(dir.path().join("missing")).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_cleanup_old_files_skips_fresh_ones() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("fresh.mp4"), b"x").await.unwrap();

        let removed = cleanup_old_files(dir.path(), Duration::from_secs(3600))
            .await
            .unwrap();
        assert_eq!(removed, 0);
        assert!(dir.path().join("fresh.mp4").exists());

        let removed = cleanup_old_files(dir.path(), Duration::ZERO).await.unwrap();
        assert_eq!(removed, 1);
    }

    #[tokio::test]
    async fn test_locate_output_tries_other_containers() {
        let dir = tempfile::tempdir().unwrap();
        let reported = dir.path().join("Title_720p_abc.webm");
        fs::write(dir.path().join("Title_720p_abc.mkv"), b"x")
            .await
            .unwrap();

        let found = locate_output(&reported, &["mp4", "mkv", "webm"]).await;
        assert_eq!(found, Some(dir.path().join("Title_720p_abc.mkv")));

        let found = locate_output(&dir.path().join("other.mp4"), &["mp4", "mkv", "webm"]).await;
        assert_eq!(found, None);
    }
}

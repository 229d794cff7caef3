use std::collections::HashSet;

use log::info;

use crate::{
    errors::BotResult,
    video::ytdlp::{Extractor, RawFormat, VideoDetails},
};

/// One selectable quality.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Format {
    /// yt-dlp format id
    pub id: String,
    /// e.g. "720p"
    pub label: String,
    pub height: u32,
    /// Approximate size in bytes
    pub size: Option<u64>,
    pub ext: String,
}

impl Format {
    fn from_raw(raw: &RawFormat, height: u32) -> Self {
        Self {
            id: raw.format_id.clone(),
            label: format!("{}p", height),
            height,
            size: raw.approximate_size(),
            ext: if raw.ext.is_empty() {
                "mp4".to_string()
            } else {
                raw.ext.clone()
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Formats {
        details: VideoDetails,
        formats: Vec<Format>,
    },
    /// Extraction worked but nothing carries both video and audio
    /// (DRM, region locks, adaptive-only listings).
    NoFormats,
}

/// Muxed variants only, one per height (first listed wins), ascending.
pub fn select_formats(raw: &[RawFormat], max_height: Option<u32>) -> Vec<Format> {
    let mut seen = HashSet::new();

    let mut formats: Vec<Format> = raw
        .iter()
        .filter(|f| f.has_video() && f.has_audio())
        .filter_map(|f| f.height.filter(|&h| h > 0).map(|h| (f, h)))
        .filter(|&(_, h)| max_height.is_none_or(|max| h <= max))
        .filter(|&(_, h)| seen.insert(h))
        .map(|(f, h)| Format::from_raw(f, h))
        .collect();

    formats.sort_by_key(|f| f.height);
    formats
}

pub async fn resolve<E: Extractor + ?Sized>(
    extractor: &E,
    url: &str,
    max_height: Option<u32>,
) -> BotResult<Resolution> {
    let info = extractor.extract_info(url).await?;
    let formats = select_formats(&info.formats, max_height);

    info!(
        "Resolved {} qualities out of {} variants for {}",
        formats.len(),
        info.formats.len(),
        url
    );

    if formats.is_empty() {
        return Ok(Resolution::NoFormats);
    }

    Ok(Resolution::Formats {
        details: info.details,
        formats,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use std::path::Path;

    use async_trait::async_trait;
    use tokio::sync::mpsc;

    use super::*;
    use crate::{
        errors::BotError,
        video::ytdlp::{DownloadedMedia, ExtractedInfo},
    };

    pub(crate) fn muxed(id: &str, height: u32, size: Option<u64>) -> RawFormat {
        RawFormat {
            format_id: id.to_string(),
            ext: "mp4".to_string(),
            height: Some(height),
            vcodec: Some("avc1.4d401f".to_string()),
            acodec: Some("mp4a.40.2".to_string()),
            filesize: size,
            filesize_approx: None,
        }
    }

    fn video_only(id: &str, height: u32) -> RawFormat {
        RawFormat {
            acodec: Some("none".to_string()),
            ..muxed(id, height, None)
        }
    }

    fn audio_only(id: &str) -> RawFormat {
        RawFormat {
            format_id: id.to_string(),
            ext: "m4a".to_string(),
            vcodec: Some("none".to_string()),
            acodec: Some("mp4a.40.2".to_string()),
            ..Default::default()
        }
    }

    struct StaticExtractor(BotResult<ExtractedInfo>);

    #[async_trait]
    impl Extractor for StaticExtractor {
        async fn extract_info(&self, _url: &str) -> BotResult<ExtractedInfo> {
            match &self.0 {
                Ok(info) => Ok(info.clone()),
                Err(e) => Err(BotError::youtube_error(e.to_string())),
            }
        }

        async fn download(
            &self,
            _: &str,
            _: &str,
            _: &Path,
            _: Option<mpsc::UnboundedSender<f32>>,
        ) -> BotResult<DownloadedMedia> {
            Err(BotError::general("not used"))
        }
    }

    #[test]
    fn test_only_muxed_variants_survive() {
        let raw = vec![
            audio_only("140"),
            video_only("137", 1080),
            muxed("18", 360, None),
        ];
        let formats = select_formats(&raw, None);
        assert_eq!(formats.len(), 1);
        assert_eq!(formats[0].id, "18");
        assert_eq!(formats[0].label, "360p");
    }

    #[test]
    fn test_sorted_ascending_and_unique_by_height() {
        let raw = vec![
            muxed("a", 1080, None),
            muxed("b", 240, None),
            muxed("c", 720, None),
            muxed("d", 240, None),
            muxed("e", 480, None),
        ];
        let formats = select_formats(&raw, None);
        let heights: Vec<u32> = formats.iter().map(|f| f.height).collect();
        assert_eq!(heights, vec![240, 480, 720, 1080]);
        assert!(heights.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(formats[0].id, "b");
    }

    #[test]
    fn test_missing_or_zero_height_is_skipped() {
        let mut no_height = muxed("x", 0, None);
        no_height.height = None;
        let raw = vec![no_height, muxed("z", 0, None), muxed("y", 144, None)];
        let formats = select_formats(&raw, None);
        assert_eq!(formats.len(), 1);
        assert_eq!(formats[0].height, 144);
    }

    #[test]
    fn test_max_height_caps_the_menu() {
        let raw = vec![
            muxed("a", 360, None),
            muxed("b", 1080, None),
            muxed("c", 2160, None),
        ];
        let formats = select_formats(&raw, Some(1080));
        let heights: Vec<u32> = formats.iter().map(|f| f.height).collect();
        assert_eq!(heights, vec![360, 1080]);
    }

    #[tokio::test]
    async fn test_first_variant_wins_per_height() {
        let info = ExtractedInfo {
            details: VideoDetails {
                id: "abc123".into(),
                title: Some("Clip".into()),
                ..Default::default()
            },
            formats: vec![
                muxed("360-a", 360, Some(5_000_000)),
                muxed("720-high", 720, Some(40_000_000)),
                muxed("720-low", 720, Some(20_000_000)),
                muxed("1080-a", 1080, None),
            ],
        };
        let extractor = StaticExtractor(Ok(info));

        let resolution = resolve(&extractor, "https://youtu.be/abc123", None)
            .await
            .unwrap();

        let Resolution::Formats { details, formats } = resolution else {
            panic!("expected formats");
        };
        assert_eq!(details.id, "abc123");
        let labels: Vec<&str> = formats.iter().map(|f| f.label.as_str()).collect();
        assert_eq!(labels, vec!["360p", "720p", "1080p"]);
        assert_eq!(formats[1].id, "720-high");
        assert_eq!(formats[1].size, Some(40_000_000));
    }

    #[tokio::test]
    async fn test_nothing_usable_is_no_formats() {
        let info = ExtractedInfo {
            details: VideoDetails::default(),
            formats: vec![audio_only("140"), video_only("137", 1080)],
        };
        let extractor = StaticExtractor(Ok(info));

        let resolution = resolve(&extractor, "https://youtu.be/abc123", None)
            .await
            .unwrap();
        assert_eq!(resolution, Resolution::NoFormats);
    }

    #[tokio::test]
    async fn test_extractor_error_propagates() {
        let extractor = StaticExtractor(Err(BotError::youtube_error("ERROR: Private video")));
        let err = resolve(&extractor, "https://youtu.be/abc123", None)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "ERROR: Private video");
    }
}

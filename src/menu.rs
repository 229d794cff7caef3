use std::{fmt, str::FromStr};

use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

use teloxide::utils::html;

use crate::{
    texts,
    utils::format_duration,
    video::{Format, VideoDetails},
};

const MIB: f64 = 1024.0 * 1024.0;

/// Callback data carried by inline buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackAction {
    StartDownload,
    Help,
    Cancel,
    /// Index into the session's format list
    Quality(usize),
}

impl fmt::Display for CallbackAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallbackAction::StartDownload => write!(f, "start_download"),
            CallbackAction::Help => write!(f, "help"),
            CallbackAction::Cancel => write!(f, "cancel"),
            CallbackAction::Quality(index) => write!(f, "quality_{}", index),
        }
    }
}

impl FromStr for CallbackAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "start_download" => Ok(Self::StartDownload),
            "help" => Ok(Self::Help),
            "cancel" => Ok(Self::Cancel),
            _ => s
                .strip_prefix("quality_")
                .and_then(|i| i.parse().ok())
                .map(Self::Quality)
                .ok_or_else(|| format!("Unknown callback data: {}", s)),
        }
    }
}

fn button(text: &str, action: CallbackAction) -> InlineKeyboardButton {
    InlineKeyboardButton::callback(text, action.to_string())
}

/// "500.0MB", "2.0GB", or "?" when unknown.
pub fn format_size(bytes: Option<u64>) -> String {
    match bytes {
        Some(bytes) => {
            let mb = bytes as f64 / MIB;
            if mb < 1024.0 {
                format!("{:.1}MB", mb)
            } else {
                format!("{:.1}GB", mb / 1024.0)
            }
        }
        None => "?".to_string(),
    }
}

/// Title, channel, duration and the list of qualities above the keyboard.
pub fn video_summary(details: &VideoDetails, formats: &[Format]) -> String {
    let qualities: Vec<String> = formats
        .iter()
        .map(|f| match f.size {
            Some(_) => format!("• {} - {}", f.label, format_size(f.size)),
            None => format!("• {}", f.label),
        })
        .collect();

    format!(
        "🎬 <b>{}</b>\n\n\
        👤 <b>Channel:</b> {}\n\
        ⏱️ <b>Duration:</b> {}\n\n\
        📊 <b>Available qualities (lowest first):</b>\n{}\n\n\
        ✅ <b>Choose a quality:</b>",
        html::escape(details.title.as_deref().unwrap_or("Untitled video")),
        html::escape(details.uploader.as_deref().unwrap_or("Unknown")),
        format_duration(details.duration_secs()),
        qualities.join("\n")
    )
}

/// Two qualities per row in list order, then a cancel row.
pub fn quality_keyboard(formats: &[Format]) -> InlineKeyboardMarkup {
    let mut keyboard = InlineKeyboardMarkup::default();

    for (row_index, chunk) in formats.chunks(2).enumerate() {
        let row: Vec<InlineKeyboardButton> = chunk
            .iter()
            .enumerate()
            .map(|(i, f)| {
                let label = format!("{} ({})", f.label, format_size(f.size));
                button(&label, CallbackAction::Quality(row_index * 2 + i))
            })
            .collect();
        keyboard = keyboard.append_row(row);
    }

    keyboard.append_row([button(texts::CANCEL_BUTTON, CallbackAction::Cancel)])
}

pub fn start_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::default()
        .append_row([button(texts::START_BUTTON, CallbackAction::StartDownload)])
        .append_row([button(texts::HELP_BUTTON, CallbackAction::Help)])
}

pub fn cancel_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::default().append_row([button(texts::CANCEL_BUTTON, CallbackAction::Cancel)])
}

/// Shown under an invalid link, goes back to the "send me a link" prompt.
pub fn back_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::default()
        .append_row([button(texts::BACK_BUTTON, CallbackAction::StartDownload)])
}

#[cfg(test)]
mod tests {
    use teloxide::types::InlineKeyboardButtonKind;

    use super::*;

    fn format(height: u32, size: Option<u64>) -> Format {
        Format {
            id: format!("f{}", height),
            label: format!("{}p", height),
            height,
            size,
            ext: "mp4".into(),
        }
    }

    fn callback_data(button: &InlineKeyboardButton) -> &str {
        match &button.kind {
            InlineKeyboardButtonKind::CallbackData(data) => data,
            other => panic!("unexpected button kind {:?}", other),
        }
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(Some(500 * 1024 * 1024)), "500.0MB");
        assert_eq!(format_size(Some(2048 * 1024 * 1024)), "2.0GB");
        assert_eq!(format_size(Some(1536 * 1024)), "1.5MB");
        assert_eq!(format_size(None), "?");
    }

    #[test]
    fn test_quality_keyboard_rows() {
        for n in 0..6 {
            let formats: Vec<Format> = (0..n).map(|i| format(144 + i * 100, None)).collect();
            let rows = quality_keyboard(&formats).inline_keyboard;

            let quality_rows = (n as usize).div_ceil(2);
            assert_eq!(rows.len(), quality_rows + 1, "n = {}", n);
            for row in &rows[..quality_rows] {
                assert!(row.len() <= 2);
            }

            let last = rows.last().unwrap();
            assert_eq!(last.len(), 1);
            assert_eq!(callback_data(&last[0]), "cancel");
        }
    }

    #[test]
    fn test_quality_keyboard_keeps_order_and_indexes() {
        let formats = vec![
            format(360, Some(10 * 1024 * 1024)),
            format(720, None),
            format(1080, Some(3 * 1024 * 1024 * 1024)),
        ];
        let rows = quality_keyboard(&formats).inline_keyboard;

        assert_eq!(rows[0][0].text, "360p (10.0MB)");
        assert_eq!(rows[0][1].text, "720p (?)");
        assert_eq!(rows[1][0].text, "1080p (3.0GB)");
        assert_eq!(callback_data(&rows[0][0]), "quality_0");
        assert_eq!(callback_data(&rows[0][1]), "quality_1");
        assert_eq!(callback_data(&rows[1][0]), "quality_2");
    }

    #[test]
    fn test_video_summary_lists_qualities() {
        let details = VideoDetails {
            title: Some("Tom & Jerry".into()),
            uploader: Some("Cartoons".into()),
            duration: Some(125.0),
            ..Default::default()
        };
        let summary = video_summary(
            &details,
            &[format(360, Some(5 * 1024 * 1024)), format(720, None)],
        );

        assert!(summary.contains("Tom &amp; Jerry"));
        assert!(summary.contains("Cartoons"));
        assert!(summary.contains("2:05"));
        assert!(summary.contains("• 360p - 5.0MB\n• 720p"));
    }

    #[test]
    fn test_start_keyboard() {
        let rows = start_keyboard().inline_keyboard;
        assert_eq!(rows.len(), 2);
        assert_eq!(callback_data(&rows[0][0]), "start_download");
        assert_eq!(callback_data(&rows[1][0]), "help");
    }

    #[test]
    fn test_callback_action_parse() {
        assert_eq!("start_download".parse::<CallbackAction>(), Ok(CallbackAction::StartDownload));
        assert_eq!("help".parse::<CallbackAction>(), Ok(CallbackAction::Help));
        assert_eq!("cancel".parse::<CallbackAction>(), Ok(CallbackAction::Cancel));
        assert_eq!("quality_12".parse::<CallbackAction>(), Ok(CallbackAction::Quality(12)));
        assert!("quality_".parse::<CallbackAction>().is_err());
        assert!("quality_x".parse::<CallbackAction>().is_err());
        assert!("buy_premium".parse::<CallbackAction>().is_err());
    }

    #[test]
    fn test_callback_action_roundtrips_through_display() {
        for action in [
            CallbackAction::StartDownload,
            CallbackAction::Help,
            CallbackAction::Cancel,
            CallbackAction::Quality(3),
        ] {
            assert_eq!(action.to_string().parse::<CallbackAction>(), Ok(action));
        }
    }
}

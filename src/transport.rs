use std::path::PathBuf;

use async_trait::async_trait;
use teloxide::{
    prelude::*,
    types::{ChatId, InputFile, MessageId, ParseMode},
};

use crate::errors::BotResult;

/// A video ready to be uploaded.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoUpload {
    pub path: PathBuf,
    /// HTML caption
    pub caption: String,
    pub duration: u32,
    pub width: u32,
    pub height: u32,
}

/// The chat operations the download flow needs.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Replace the text of a message, HTML formatted.
    async fn edit_text(&self, chat_id: ChatId, message_id: MessageId, text: String)
    -> BotResult<()>;

    async fn delete_message(&self, chat_id: ChatId, message_id: MessageId) -> BotResult<()>;

    async fn send_video(&self, chat_id: ChatId, video: VideoUpload) -> BotResult<()>;
}

#[async_trait]
impl ChatTransport for Bot {
    async fn edit_text(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
        text: String,
    ) -> BotResult<()> {
        self.edit_message_text(chat_id, message_id, text)
            .parse_mode(ParseMode::Html)
            .await?;
        Ok(())
    }

    async fn delete_message(&self, chat_id: ChatId, message_id: MessageId) -> BotResult<()> {
        Requester::delete_message(self, chat_id, message_id).await?;
        Ok(())
    }

    async fn send_video(&self, chat_id: ChatId, video: VideoUpload) -> BotResult<()> {
        Requester::send_video(self, chat_id, InputFile::file(video.path))
            .caption(video.caption)
            .parse_mode(ParseMode::Html)
            .supports_streaming(true)
            .duration(video.duration)
            .width(video.width)
            .height(video.height)
            .await?;
        Ok(())
    }
}

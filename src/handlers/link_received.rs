use std::sync::Arc;

use teloxide::{
    prelude::*,
    types::{Chat, ParseMode},
    utils::html,
};

use crate::{
    config::Config,
    conversation::{self, UrlOutcome},
    errors::HandlerResult,
    menu::{back_keyboard, quality_keyboard, video_summary},
    session::SessionStore,
    texts,
    utils::is_youtube_link,
    video::YtDlp,
};

/// Links are only taken from private chats.
fn accepts_links(chat: &Chat) -> bool {
    chat.is_private()
}

pub async fn link_received(
    bot: Bot,
    msg: Message,
    text: String,
    sessions: SessionStore,
    config: Arc<Config>,
    extractor: Arc<YtDlp>,
) -> HandlerResult {
    if !accepts_links(&msg.chat) {
        return Ok(());
    }
    let Some(user) = msg.from.as_ref().map(|u| u.id) else {
        return Ok(());
    };

    // Plain chatter outside of /download is not answered.
    if !conversation::is_awaiting_url(&sessions, user).await {
        return Ok(());
    }

    if !is_youtube_link(&text) {
        bot.send_message(msg.chat.id, texts::INVALID_LINK)
            .parse_mode(ParseMode::Html)
            .reply_markup(back_keyboard())
            .await?;
        return Ok(());
    }

    let status_msg = bot
        .send_message(msg.chat.id, texts::ANALYZING)
        .parse_mode(ParseMode::Html)
        .await?;

    match conversation::submit_url(&sessions, &*extractor, user, &text, config.max_height).await {
        Ok(UrlOutcome::Ready { details, formats }) => {
            log::info!(
                "Offering {} qualities of '{}' to {}",
                formats.len(),
                details.title.as_deref().unwrap_or_default(),
                msg.chat.id
            );
            bot.edit_message_text(msg.chat.id, status_msg.id, video_summary(&details, &formats))
                .parse_mode(ParseMode::Html)
                .reply_markup(quality_keyboard(&formats))
                .await?;
        }
        Ok(UrlOutcome::NoFormats) => {
            bot.edit_message_text(msg.chat.id, status_msg.id, texts::NO_FORMATS)
                .parse_mode(ParseMode::Html)
                .await?;
        }
        Ok(UrlOutcome::Ignored | UrlOutcome::InvalidLink) => {
            // The session changed while we were replying (e.g. a concurrent /cancel).
            bot.delete_message(msg.chat.id, status_msg.id).await?;
        }
        Err(e) => {
            log::error!("Could not resolve {}: {}", text, e);
            bot.edit_message_text(
                msg.chat.id,
                status_msg.id,
                format!(
                    "❌ <b>An error occurred:</b>\n<code>{}</code>\n\n\
                    Check the link or try another video.",
                    html::escape(&e.to_string())
                ),
            )
            .parse_mode(ParseMode::Html)
            .await?;
        }
    }

    Ok(())
}

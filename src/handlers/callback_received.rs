use std::sync::Arc;

use teloxide::{
    prelude::*,
    types::{MaybeInaccessibleMessage, ParseMode},
};

use crate::{
    config::Config,
    conversation,
    errors::HandlerResult,
    menu::{CallbackAction, cancel_keyboard, start_keyboard},
    session::SessionStore,
    texts,
    video::{DownloadJob, YtDlp, spawn_download},
};

pub async fn callback_received(
    bot: Bot,
    query: CallbackQuery,
    sessions: SessionStore,
    config: Arc<Config>,
    extractor: Arc<YtDlp>,
) -> HandlerResult {
    let user = query.from.id;

    let action = match query.data.as_deref().map(str::parse::<CallbackAction>) {
        Some(Ok(action)) => action,
        Some(Err(e)) => {
            log::warn!("{}", e);
            bot.answer_callback_query(query.id.clone()).await?;
            return Ok(());
        }
        None => {
            bot.answer_callback_query(query.id.clone()).await?;
            return Ok(());
        }
    };

    let Some(message) = query.message.as_ref() else {
        bot.answer_callback_query(query.id.clone()).await?;
        return Ok(());
    };
    let (chat_id, message_id) = match message {
        MaybeInaccessibleMessage::Inaccessible(m) => (m.chat.id, m.message_id),
        MaybeInaccessibleMessage::Regular(m) => (m.chat.id, m.id),
    };

    match action {
        CallbackAction::StartDownload => {
            conversation::begin(&sessions, user).await;
            bot.answer_callback_query(query.id.clone()).await?;
            bot.edit_message_text(chat_id, message_id, texts::ASK_URL_WITH_HINTS)
                .parse_mode(ParseMode::Html)
                .reply_markup(cancel_keyboard())
                .await?;
        }
        CallbackAction::Cancel => {
            conversation::cancel(&sessions, user).await;
            bot.answer_callback_query(query.id.clone()).await?;
            bot.edit_message_text(chat_id, message_id, texts::CANCELLED)
                .parse_mode(ParseMode::Html)
                .await?;
        }
        CallbackAction::Help => {
            bot.answer_callback_query(query.id.clone()).await?;
            bot.edit_message_text(chat_id, message_id, texts::HELP_SHORT)
                .parse_mode(ParseMode::Html)
                .reply_markup(start_keyboard())
                .await?;
        }
        CallbackAction::Quality(index) => {
            let Some(selection) = conversation::select(&sessions, user, index).await else {
                bot.answer_callback_query(query.id.clone())
                    .text(texts::SESSION_EXPIRED)
                    .show_alert(true)
                    .await?;
                return Ok(());
            };
            bot.answer_callback_query(query.id.clone()).await?;

            log::info!(
                "User {} selected {} ({})",
                user.0,
                selection.format.label,
                selection.format.id
            );

            let job = DownloadJob {
                user,
                chat_id,
                status_message: message_id,
                url: selection.url,
                format: selection.format,
            };
            // Runs detached so this chat's next updates (e.g. /cancel) are not queued behind it.
            spawn_download(extractor, Arc::new(bot), sessions, config, job);
        }
    }

    Ok(())
}

use teloxide::{prelude::*, types::ParseMode};

use crate::{conversation, errors::HandlerResult, session::SessionStore, texts};

pub async fn cancel(bot: Bot, msg: Message, sessions: SessionStore) -> HandlerResult {
    if let Some(user) = msg.from.as_ref().map(|u| u.id) {
        conversation::cancel(&sessions, user).await;
    }

    bot.send_message(msg.chat.id, texts::CANCELLED)
        .parse_mode(ParseMode::Html)
        .await?;
    Ok(())
}

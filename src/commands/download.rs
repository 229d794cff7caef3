use teloxide::{prelude::*, types::ParseMode};

use crate::{
    conversation, errors::HandlerResult, menu::cancel_keyboard, session::SessionStore, texts,
};

pub async fn download(bot: Bot, msg: Message, sessions: SessionStore) -> HandlerResult {
    let Some(user) = msg.from.as_ref().map(|u| u.id) else {
        return Ok(());
    };

    conversation::begin(&sessions, user).await;

    bot.send_message(msg.chat.id, texts::ASK_URL)
        .parse_mode(ParseMode::Html)
        .reply_markup(cancel_keyboard())
        .await?;
    Ok(())
}

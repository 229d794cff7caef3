use teloxide::{prelude::*, types::ParseMode};

use crate::{errors::HandlerResult, menu::start_keyboard, texts};

pub async fn start(bot: Bot, msg: Message) -> HandlerResult {
    bot.send_message(msg.chat.id, texts::WELCOME)
        .parse_mode(ParseMode::Html)
        .reply_markup(start_keyboard())
        .await?;
    Ok(())
}

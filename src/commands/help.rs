use teloxide::{prelude::*, types::ParseMode};

use crate::{errors::HandlerResult, texts};

pub async fn help(bot: Bot, msg: Message) -> HandlerResult {
    bot.send_message(msg.chat.id, texts::HELP)
        .parse_mode(ParseMode::Html)
        .await?;
    Ok(())
}

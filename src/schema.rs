use teloxide::{dispatching::UpdateHandler, prelude::*, utils::command::BotCommands};

use crate::{
    commands::*,
    errors::BotError,
    handlers::{callback_received, link_received},
};

#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase", description = "These commands are supported:")]
pub enum Command {
    /// Show the start menu
    Start,
    /// How to use the bot
    Help,
    /// Download a YouTube video
    Download,
    /// Cancel the current download
    Cancel,
}

pub fn schema() -> UpdateHandler<BotError> {
    use dptree::case;

    let command_handler = teloxide::filter_command::<Command, _>()
        .branch(case![Command::Start].endpoint(start))
        .branch(case![Command::Help].endpoint(help))
        .branch(case![Command::Download].endpoint(download))
        .branch(case![Command::Cancel].endpoint(cancel));

    let message_handler = Update::filter_message()
        .branch(command_handler)
        // Anything else that is text may be the link we are waiting for
        .branch(Message::filter_text().endpoint(link_received));

    dptree::entry()
        .branch(message_handler)
        .branch(Update::filter_callback_query().endpoint(callback_received))
}

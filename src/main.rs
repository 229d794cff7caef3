mod commands;
mod config;
mod conversation;
mod errors;
mod handlers;
mod maintenance;
mod menu;
mod schema;
mod session;
mod texts;
mod transport;
mod utils;
mod video;

use std::sync::Arc;

use teloxide::{prelude::*, utils::command::BotCommands};

use crate::{
    config::Config,
    schema::{Command, schema},
    session::SessionStore,
    utils::clear_dir,
    video::YtDlp,
};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    pretty_env_logger::init();
    log::info!("Starting YouTube quality bot...");

    let mut config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("{}", e);
            return;
        }
    };

    let extractor = Arc::new(YtDlp::new(config.ytdlp_path.clone()));
    match extractor.version().await {
        Ok(version) => log::info!("yt-dlp version: {}", version),
        Err(e) => {
            log::error!("yt-dlp is not installed or not runnable: {}", e);
            return;
        }
    }

    if let Err(e) = tokio::fs::create_dir_all(&config.download_path).await {
        log::error!(
            "Cannot create download directory {}: {}",
            config.download_path.display(),
            e
        );
        return;
    }

    let bot = Bot::from_env();

    match bot.get_me().await {
        Ok(me) => config.bot_username = me.username.clone(),
        Err(e) => log::warn!("Could not fetch bot profile: {}", e),
    }
    if let Err(e) = bot.set_my_commands(Command::bot_commands()).await {
        log::warn!("Could not register commands: {}", e);
    }

    let config = Arc::new(config);
    let sessions = SessionStore::new();
    maintenance::spawn(sessions.clone(), config.clone());
    log::info!("Downloads go to {}", config.download_path.display());

    Dispatcher::builder(bot, schema())
        .dependencies(dptree::deps![sessions, config.clone(), extractor])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    match clear_dir(&config.download_path).await {
        Ok(removed) => log::info!("Removed {} leftover files", removed),
        Err(e) => log::warn!("Could not clear {}: {}", config.download_path.display(), e),
    }
}

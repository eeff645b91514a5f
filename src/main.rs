use std::sync::Arc;

use teloxide::{prelude::*, utils::command::BotCommands};

mod booking;
mod bot_state;
mod catalog;
mod config;
mod dashboard;
mod database;
mod handlers;
mod lifecycle;
mod models;
mod notifier;
mod spam_guard;
mod validators;

use crate::bot_state::BotState;
use crate::config::AppConfig;
use crate::database::Database;
use crate::handlers::{callback_handler, command_handler, message_handler};

#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase", description = "Доступные команды:")]
pub enum Command {
    #[command(description = "главное меню")]
    Start,
    #[command(description = "показать помощь")]
    Help,
    #[command(description = "прервать запись или вопрос")]
    Cancel,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Загружаем .env и инициализируем логирование
    dotenvy::dotenv().ok();
    env_logger::init();
    log::info!("Starting grooming bot with SQLite...");

    let config = AppConfig::from_env()?;
    if config.admin_ids.is_empty() {
        log::warn!("⚠️ ADMIN_IDS is empty: nobody can process requests from chat");
    }

    let db = Database::new(&config.database_url).await?;
    db.init().await?;
    log::info!("✅ Database initialized");

    let bot = Bot::new(config.bot_token.clone());
    let dashboard_addr = config.dashboard_addr;
    let state = BotState::new(db, config, Arc::new(bot.clone()));

    // Фоновая очистка брошенных диалогов
    let state_clone = state.clone();
    tokio::spawn(async move {
        handlers::cleanup_dialogs_task(state_clone).await;
    });

    // Панель администратора в том же процессе
    let state_clone = state.clone();
    tokio::spawn(async move {
        if let Err(e) = dashboard::serve(state_clone, dashboard_addr).await {
            log::error!("❌ Dashboard stopped: {}", e);
        }
    });

    let handler = dptree::entry()
        .branch(
            Update::filter_message()
                .filter_command::<Command>()
                .endpoint(command_handler),
        )
        .branch(Update::filter_callback_query().endpoint(callback_handler))
        .branch(Update::filter_message().endpoint(message_handler));

    log::info!("🚀 Starting dispatcher...");

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}

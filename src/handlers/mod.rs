pub mod callback_data;
pub mod callbacks;
pub mod commands;
pub mod messages;
pub mod utils;

pub use callbacks::callback_handler;
pub use commands::command_handler;
pub use messages::message_handler;

use tokio::time;

use crate::bot_state::BotState;

pub type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

const DIALOG_CLEANUP_INTERVAL: time::Duration = time::Duration::from_secs(600);

/// Периодически выбрасывает брошенные анкеты и вопросы
pub async fn cleanup_dialogs_task(state: BotState) {
    let mut interval = time::interval(DIALOG_CLEANUP_INTERVAL);

    loop {
        interval.tick().await;
        state.cleanup_expired().await;
    }
}

use teloxide::prelude::*;

use crate::booking;
use crate::bot_state::BotState;
use crate::handlers::utils::main_menu_keyboard;
use crate::handlers::HandlerResult;
use crate::models::User;
use crate::Command;

pub async fn command_handler(bot: Bot, msg: Message, cmd: Command, state: BotState) -> HandlerResult {
    match cmd {
        Command::Start => handle_start(bot, msg, state).await?,
        Command::Help => handle_help(bot, msg).await?,
        Command::Cancel => handle_cancel(bot, msg, state).await?,
    }
    Ok(())
}

async fn handle_start(bot: Bot, msg: Message, state: BotState) -> HandlerResult {
    let first_name = msg.chat.first_name();
    User::get_or_create(&state.db, msg.chat.id.0, first_name).await?;

    bot.send_message(
        msg.chat.id,
        format!(
            "🐕 Привет, {}!\nДобро пожаловать в груминг-салон! Выбери действие:",
            first_name.unwrap_or("друг")
        ),
    )
    .reply_markup(main_menu_keyboard())
    .await?;

    Ok(())
}

async fn handle_help(bot: Bot, msg: Message) -> HandlerResult {
    bot.send_message(
        msg.chat.id,
        "🐾 Помощь по боту\n\n\
        /start - главное меню\n\
        /cancel - прервать запись или вопрос\n\n\
        Как записаться:\n\
        1. Нажми «📅 Записаться» и выбери услугу\n\
        2. Укажи дату, время, кличку питомца и телефон\n\
        3. Дождись подтверждения администратора",
    )
    .await?;

    Ok(())
}

async fn handle_cancel(bot: Bot, msg: Message, state: BotState) -> HandlerResult {
    booking::cancel(&state, msg.chat.id).await;

    bot.send_message(msg.chat.id, "❌ Отменено")
        .reply_markup(main_menu_keyboard())
        .await?;

    Ok(())
}

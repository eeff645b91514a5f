use chrono::Local;
use teloxide::prelude::*;

use crate::booking::{self, Advance, BookingInput};
use crate::bot_state::BotState;
use crate::handlers::utils::{cancel_keyboard, main_menu_keyboard, services_keyboard};
use crate::handlers::HandlerResult;
use crate::models::{BookingStep, FaqLog, User, UserState};

pub async fn message_handler(bot: Bot, msg: Message, state: BotState) -> HandlerResult {
    let chat_id = msg.chat.id;

    let Some(text) = msg.text() else {
        bot.send_message(chat_id, "🐕 Я понимаю только текст. Выбери действие:")
            .reply_markup(main_menu_keyboard())
            .await?;
        return Ok(());
    };

    // Известные команды уже обработаны в command_handler
    if text.starts_with('/') {
        bot.send_message(chat_id, "Неизвестная команда. Попробуй /start или /help")
            .await?;
        return Ok(());
    }

    match state.get_user_state(chat_id).await {
        UserState::Booking { step, draft } => {
            let outcome = booking::advance(step, draft, BookingInput::Text(text), Local::now().naive_local());
            apply_advance(&bot, &state, chat_id, msg.chat.first_name(), outcome).await?;
        }
        UserState::AwaitingQuestion => {
            handle_question(&bot, &state, &msg, text).await?;
        }
        UserState::Idle => {
            bot.send_message(chat_id, "🏠 Выбери действие:")
                .reply_markup(main_menu_keyboard())
                .await?;
        }
    }

    Ok(())
}

/// Показать пользователю результат шага анкеты и сохранить новое состояние
pub async fn apply_advance(
    bot: &Bot,
    state: &BotState,
    chat_id: ChatId,
    first_name: Option<&str>,
    outcome: Advance,
) -> HandlerResult {
    match outcome {
        Advance::Next { step, draft } => {
            state.save_user_state(chat_id, UserState::Booking { step, draft }).await;
            bot.send_message(chat_id, step.prompt())
                .reply_markup(cancel_keyboard())
                .await?;
        }
        Advance::Retry { step, draft, reason } => {
            state.save_user_state(chat_id, UserState::Booking { step, draft }).await;
            let keyboard = if step == BookingStep::Service {
                services_keyboard()
            } else {
                cancel_keyboard()
            };
            bot.send_message(chat_id, reason.message())
                .reply_markup(keyboard)
                .await?;
        }
        Advance::Ignored { step, .. } => {
            log::debug!("Stale input ignored for {} at step {:?}", chat_id, step);
        }
        Advance::Completed(done) => {
            state.clear_user_state(chat_id).await;
            match booking::submit(state, chat_id, first_name, done).await {
                Ok(request) => {
                    log::info!("📨 Request {} submitted by {}", request.id, chat_id);
                    bot.send_message(
                        chat_id,
                        "✅ Заявка отправлена админу!\nСкоро мы подтвердим запись. Спасибо! 🐕",
                    )
                    .reply_markup(main_menu_keyboard())
                    .await?;
                }
                Err(e) => {
                    log::error!("❌ Error saving request for {}: {}", chat_id, e);
                    bot.send_message(chat_id, "⚠️ Не удалось сохранить заявку. Попробуй ещё раз.")
                        .reply_markup(main_menu_keyboard())
                        .await?;
                }
            }
        }
    }

    Ok(())
}

async fn handle_question(bot: &Bot, state: &BotState, msg: &Message, text: &str) -> HandlerResult {
    let chat_id = msg.chat.id;
    let user = User::get_or_create(&state.db, chat_id.0, msg.chat.first_name()).await?;

    if let Err(e) = FaqLog::record(&state.db, user.id, text).await {
        log::error!("Error logging question from {}: {}", chat_id, e);
    }

    state
        .notify_staff(
            &format!(
                "💬 Вопрос от {} (id {}):\n{}",
                user.display_name(),
                user.tg_user_id,
                text
            ),
            None,
        )
        .await;

    state.clear_user_state(chat_id).await;

    bot.send_message(
        chat_id,
        "✅ Вопрос отправлен!\nАдмин ответит тебе в этом чате в ближайшее время.",
    )
    .reply_markup(main_menu_keyboard())
    .await?;

    Ok(())
}

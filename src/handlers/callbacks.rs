use chrono::{Local, Utc};
use teloxide::prelude::*;
use teloxide::types::MessageId;

use crate::booking::{self, BookingInput};
use crate::bot_state::BotState;
use crate::catalog;
use crate::handlers::callback_data::CallbackCommand;
use crate::handlers::messages::apply_advance;
use crate::handlers::utils::{
    back_menu_keyboard, cancel_keyboard, faq_answer_keyboard, faq_keyboard, main_menu_keyboard,
    render_user_requests, services_keyboard,
};
use crate::handlers::HandlerResult;
use crate::lifecycle::{self, LifecycleError, Origin};
use crate::models::{BookingStep, FaqLog, Request, User, UserState};

const MY_REQUESTS_LIMIT: i64 = 5;

pub async fn callback_handler(bot: Bot, q: CallbackQuery, state: BotState) -> HandlerResult {
    let Some(data) = q.data.as_deref() else {
        return Ok(());
    };
    let Some(command) = CallbackCommand::parse(data) else {
        log::debug!("Unknown callback data: {}", data);
        bot.answer_callback_query(q.id.clone()).await?;
        return Ok(());
    };
    let Some(message) = q.message.as_ref() else {
        bot.answer_callback_query(q.id.clone()).await?;
        return Ok(());
    };

    let chat_id = message.chat().id;
    let message_id = message.id();
    let actor = ChatId::from(q.from.id);
    let first_name = q.from.first_name.as_str();

    match command {
        CallbackCommand::Book => {
            if !booking::start(&state, chat_id, Utc::now()).await? {
                return alert(
                    &bot,
                    &q,
                    &format!(
                        "⏳ Подождите {} минут перед новой заявкой",
                        state.config.spam_timeout_minutes
                    ),
                )
                .await;
            }
            bot.edit_message_text(chat_id, message_id, BookingStep::Service.prompt())
                .reply_markup(services_keyboard())
                .await?;
        }

        CallbackCommand::Service(code) => {
            let UserState::Booking { step, draft } = state.get_user_state(chat_id).await else {
                return alert(&bot, &q, "⌛ Запись устарела. Начни заново через меню.").await;
            };

            let outcome = booking::advance(step, draft, BookingInput::Service(&code), Local::now().naive_local());
            if let Some(service) = catalog::find_service(&code).filter(|_| step == BookingStep::Service) {
                bot.edit_message_text(chat_id, message_id, format!("Услуга: {}", service.name))
                    .await?;
            }
            apply_advance(&bot, &state, chat_id, Some(first_name), outcome).await?;
        }

        CallbackCommand::Cancel => {
            booking::cancel(&state, chat_id).await;
            if let Err(e) = bot.delete_message(chat_id, message_id).await {
                log::debug!("Could not delete message in {}: {}", chat_id, e);
            }
            bot.send_message(chat_id, "❌ Отменено")
                .reply_markup(main_menu_keyboard())
                .await?;
        }

        CallbackCommand::ShowFaq => {
            bot.edit_message_text(chat_id, message_id, "❓ Частые вопросы:")
                .reply_markup(faq_keyboard())
                .await?;
        }

        CallbackCommand::Faq(code) => {
            let Some(item) = catalog::find_faq(&code) else {
                return alert(&bot, &q, "❌ Вопрос не найден").await;
            };
            log_faq_view(&state, actor, first_name, item.question).await;
            bot.edit_message_text(chat_id, message_id, format!("❓ {}\n\n{}", item.question, item.answer))
                .reply_markup(faq_answer_keyboard())
                .await?;
        }

        CallbackCommand::AskQuestion => {
            state.save_user_state(chat_id, UserState::AwaitingQuestion).await;
            bot.edit_message_text(chat_id, message_id, "💬 Напиши свой вопрос, и админ ответит тебе здесь:")
                .reply_markup(cancel_keyboard())
                .await?;
        }

        CallbackCommand::MyRequests => {
            let user = User::get_or_create(&state.db, actor.0, Some(first_name)).await?;
            let requests = Request::recent_for_user(&state.db, user.id, MY_REQUESTS_LIMIT).await?;
            if requests.is_empty() {
                return alert(&bot, &q, "У тебя еще нет заявок").await;
            }
            bot.edit_message_text(chat_id, message_id, render_user_requests(&requests))
                .reply_markup(back_menu_keyboard())
                .await?;
        }

        CallbackCommand::BackMenu => {
            bot.edit_message_text(chat_id, message_id, "🏠 Главное меню")
                .reply_markup(main_menu_keyboard())
                .await?;
        }

        CallbackCommand::Approve(request_id) => {
            let result = lifecycle::approve(&state, Origin::Chat { actor }, request_id, None).await;
            return finish_decision(
                &bot,
                &q,
                chat_id,
                message_id,
                result.map(|r| format!("✅ Заявка #{} подтверждена. Клиент уведомлен.", r.id)),
            )
            .await;
        }

        CallbackCommand::Reject(request_id) => {
            let result = lifecycle::reject(&state, Origin::Chat { actor }, request_id, None).await;
            return finish_decision(
                &bot,
                &q,
                chat_id,
                message_id,
                result.map(|r| format!("❌ Заявка #{} отклонена. Клиент уведомлен.", r.id)),
            )
            .await;
        }

        CallbackCommand::Clarify(request_id) => {
            let text = match lifecycle::clarify(&state, actor, request_id) {
                Ok(()) => format!(
                    "📌 Заявка #{} помечена на уточнение.\nСвяжись с клиентом и затем подтверди или отклони заявку.",
                    request_id
                ),
                Err(e) => decision_error_text(&e),
            };
            return alert(&bot, &q, &text).await;
        }
    }

    bot.answer_callback_query(q.id.clone()).await?;
    Ok(())
}

async fn alert(bot: &Bot, q: &CallbackQuery, text: &str) -> HandlerResult {
    bot.answer_callback_query(q.id.clone())
        .text(text)
        .show_alert(true)
        .await?;
    Ok(())
}

/// Карточка заявки заменяется итогом; при ошибке карточка остаётся с кнопками
async fn finish_decision(
    bot: &Bot,
    q: &CallbackQuery,
    chat_id: ChatId,
    message_id: MessageId,
    result: Result<String, LifecycleError>,
) -> HandlerResult {
    match result {
        Ok(summary) => {
            bot.edit_message_text(chat_id, message_id, summary).await?;
            bot.answer_callback_query(q.id.clone()).await?;
            Ok(())
        }
        Err(e) => alert(bot, q, &decision_error_text(&e)).await,
    }
}

fn decision_error_text(error: &LifecycleError) -> String {
    match error {
        LifecycleError::Unauthorized => "❌ Доступ запрещен".to_string(),
        LifecycleError::NotFound(_) => "❌ Заявка не найдена".to_string(),
        LifecycleError::InvalidTransition { id, from, .. } => {
            format!("⚠️ Заявка #{} уже обработана (статус: {})", id, from)
        }
        LifecycleError::Database(e) => {
            log::error!("❌ Database error while processing decision: {}", e);
            "⚠️ Ошибка базы данных, попробуй позже".to_string()
        }
    }
}

/// Просмотр ответа FAQ пишется в журнал; сбой журнала не мешает ответу
async fn log_faq_view(state: &BotState, actor: ChatId, first_name: &str, question: &str) {
    let user = match User::get_or_create(&state.db, actor.0, Some(first_name)).await {
        Ok(user) => user,
        Err(e) => {
            log::error!("Error loading user {} for FAQ log: {}", actor, e);
            return;
        }
    };
    if let Err(e) = FaqLog::record(&state.db, user.id, question).await {
        log::error!("Error logging FAQ view for {}: {}", actor, e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decision_errors_map_to_staff_alerts() {
        assert_eq!(decision_error_text(&LifecycleError::Unauthorized), "❌ Доступ запрещен");
        assert_eq!(decision_error_text(&LifecycleError::NotFound(3)), "❌ Заявка не найдена");

        let text = decision_error_text(&LifecycleError::InvalidTransition {
            id: 3,
            from: crate::models::RequestStatus::Rejected,
            to: crate::models::RequestStatus::Approved,
        });
        assert!(text.contains("#3"));
        assert!(text.contains("rejected"));
    }
}

//! Пошаговая анкета записи: услуга → дата → время → кличка → телефон → комментарий.
//!
//! `advance` не ходит ни в базу, ни в Telegram: на каждый ввод он возвращает
//! следующий шаг, повтор того же шага с подсказкой или готовую заявку.
//! Сохранение и уведомления делает `submit`.

use chrono::{DateTime, NaiveDateTime, Utc};
use teloxide::types::ChatId;

use crate::bot_state::{BotState, BotStateError};
use crate::catalog;
use crate::handlers::utils::{render_request_card, request_decision_keyboard};
use crate::models::{BookingDraft, BookingStep, NewRequest, Request, User, UserState};
use crate::spam_guard;
use crate::validators::{validate_date_at, validate_phone, validate_time};

/// Ответы, означающие «без комментария»
const NO_COMMENT: &[&str] = &["нет", "no", "none"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingInput<'a> {
    /// Нажата кнопка `service:<code>`
    Service(&'a str),
    Text(&'a str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    UseServiceButtons,
    UnknownService,
    InvalidDate,
    InvalidTime,
    EmptyPetName,
    InvalidPhone,
}

impl Rejection {
    pub fn message(self) -> &'static str {
        match self {
            Rejection::UseServiceButtons => "👇 Выбери услугу кнопкой ниже:",
            Rejection::UnknownService => "❌ Такой услуги нет. Выбери из списка:",
            Rejection::InvalidDate => "❌ Неверный формат. Используй ДД.ММ.ГГГГ (будущая дата):",
            Rejection::InvalidTime => "❌ Неверный формат. Используй ЧЧ:ММ (10:30):",
            Rejection::EmptyPetName => "❌ Напиши кличку питомца:",
            Rejection::InvalidPhone => "❌ Неверный формат. Используй +7XXXXXXXXXX:",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedBooking {
    pub service: String,
    pub date: String,
    pub time: String,
    pub pet_name: String,
    pub phone: String,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advance {
    Next { step: BookingStep, draft: BookingDraft },
    /// Ввод не принят, шаг тот же
    Retry { step: BookingStep, draft: BookingDraft, reason: Rejection },
    /// Кнопка услуги от старого сообщения посреди анкеты
    Ignored { step: BookingStep, draft: BookingDraft },
    Completed(CompletedBooking),
}

pub fn advance(
    step: BookingStep,
    mut draft: BookingDraft,
    input: BookingInput<'_>,
    now: NaiveDateTime,
) -> Advance {
    let retry = |draft: BookingDraft, reason| Advance::Retry { step, draft, reason };

    let text = match input {
        BookingInput::Service(code) if step == BookingStep::Service => {
            if catalog::find_service(code).is_none() {
                return retry(draft, Rejection::UnknownService);
            }
            draft.service = Some(code.to_string());
            return next(step, draft);
        }
        BookingInput::Service(_) => return Advance::Ignored { step, draft },
        BookingInput::Text(text) => text.trim(),
    };

    match step {
        BookingStep::Service => return retry(draft, Rejection::UseServiceButtons),
        BookingStep::Date => {
            if !validate_date_at(text, now) {
                return retry(draft, Rejection::InvalidDate);
            }
            draft.date = Some(text.to_string());
        }
        BookingStep::Time => {
            if !validate_time(text) {
                return retry(draft, Rejection::InvalidTime);
            }
            draft.time = Some(text.to_string());
        }
        BookingStep::PetName => {
            if text.is_empty() {
                return retry(draft, Rejection::EmptyPetName);
            }
            draft.pet_name = Some(text.to_string());
        }
        BookingStep::Phone => {
            if !validate_phone(text) {
                return retry(draft, Rejection::InvalidPhone);
            }
            draft.phone = Some(text.to_string());
        }
        BookingStep::Comment => {
            let comment = if NO_COMMENT.iter().any(|s| text.to_lowercase() == *s) || text.is_empty() {
                None
            } else {
                Some(text.to_string())
            };
            return complete(draft, comment);
        }
    }

    next(step, draft)
}

fn next(step: BookingStep, draft: BookingDraft) -> Advance {
    match step.next() {
        Some(step) => Advance::Next { step, draft },
        None => complete(draft, None),
    }
}

fn complete(draft: BookingDraft, comment: Option<String>) -> Advance {
    // До шага комментария все поля уже заполнены: каждый шаг пишет своё поле перед переходом
    Advance::Completed(CompletedBooking {
        service: draft.service.unwrap_or_default(),
        date: draft.date.unwrap_or_default(),
        time: draft.time.unwrap_or_default(),
        pet_name: draft.pet_name.unwrap_or_default(),
        phone: draft.phone.unwrap_or_default(),
        comment,
    })
}

/// Начать анкету, если антиспам разрешает. `false` означает, что запись отклонена.
pub async fn start(state: &BotState, chat_id: ChatId, now: DateTime<Utc>) -> Result<bool, BotStateError> {
    let allowed =
        spam_guard::is_booking_allowed(&state.db, chat_id.0, state.config.spam_timeout_minutes, now).await?;
    if allowed {
        // Новая анкета всегда начинается с пустого черновика
        state.save_user_state(chat_id, UserState::start_booking()).await;
    }
    Ok(allowed)
}

/// Отмена с любого шага: всё собранное выбрасывается
pub async fn cancel(state: &BotState, chat_id: ChatId) {
    state.clear_user_state(chat_id).await;
    log::info!("🚫 Dialog cancelled by {}", chat_id);
}

/// Завершение анкеты: заявка в базу, телефон в профиль, карточка сотрудникам
pub async fn submit(
    state: &BotState,
    chat_id: ChatId,
    first_name: Option<&str>,
    booking: CompletedBooking,
) -> Result<Request, BotStateError> {
    let mut user = User::get_or_create(&state.db, chat_id.0, first_name).await?;

    let request = Request::create(
        &state.db,
        &NewRequest {
            user_id: user.id,
            service: booking.service,
            desired_date: booking.date,
            desired_time: booking.time,
            pet_name: booking.pet_name,
            comment: booking.comment,
        },
    )
    .await?;

    User::set_phone(&state.db, user.id, &booking.phone).await?;
    user.phone = Some(booking.phone);
    log::info!("📋 Request {} created by user {}", request.id, chat_id);

    let card = render_request_card(&request, &user);
    let delivered = state
        .notify_staff(&card, Some(request_decision_keyboard(request.id)))
        .await;
    if delivered == 0 {
        log::warn!("⚠️ Request {} was not delivered to any staff member", request.id);
    }

    Ok(request)
}

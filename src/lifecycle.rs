//! Переходы статусов заявки и уведомления, которые они вызывают.
//!
//! Разрешённые переходы: `new → approved`, `new → rejected`, `approved → completed`.
//! Каждый переход выполняется одним условным UPDATE, поэтому из двух
//! одновременных решений по одной заявке применяется только первое.

use teloxide::types::ChatId;

use crate::bot_state::BotState;
use crate::handlers::utils::main_menu_keyboard;
use crate::models::{Request, RequestStatus, StatusChange, User};

/// Откуда пришло решение сотрудника
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Кнопка в чате; действующий сверяется с белым списком
    Chat { actor: ChatId },
    Dashboard,
}

#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    #[error("actor is not allowed to manage requests")]
    Unauthorized,
    #[error("request {0} not found")]
    NotFound(i64),
    #[error("request {id} is {from}, cannot become {to}")]
    InvalidTransition {
        id: i64,
        from: RequestStatus,
        to: RequestStatus,
    },
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

fn authorize(state: &BotState, origin: Origin) -> Result<(), LifecycleError> {
    match origin {
        Origin::Chat { actor } if !state.config.is_staff(actor) => {
            log::warn!("🔒 Unauthorized staff action attempt by {}", actor);
            Err(LifecycleError::Unauthorized)
        }
        _ => Ok(()),
    }
}

pub async fn approve(
    state: &BotState,
    origin: Origin,
    request_id: i64,
    master_id: Option<i64>,
) -> Result<Request, LifecycleError> {
    authorize(state, origin)?;

    let change = StatusChange {
        master_id,
        comment: None,
    };
    let request = apply(state, request_id, RequestStatus::New, RequestStatus::Approved, &change).await?;
    log::info!("✅ Request {} approved via {:?}", request.id, origin);

    let text = format!(
        "✅ Ваша заявка подтверждена!\n📅 {}\n⏰ {}\n🐕 {}\n\nДо скорой встречи! 🐕",
        request.desired_date, request.desired_time, request.pet_name
    );
    notify_client(state, &request, &text, false).await;

    Ok(request)
}

/// Из чата комментарий не трогается, из панели заменяется пометкой с причиной
pub async fn reject(
    state: &BotState,
    origin: Origin,
    request_id: i64,
    reason: Option<&str>,
) -> Result<Request, LifecycleError> {
    authorize(state, origin)?;

    let comment = match origin {
        Origin::Chat { .. } => None,
        Origin::Dashboard => Some(rejection_note(reason)),
    };
    let change = StatusChange {
        master_id: None,
        comment,
    };
    let request = apply(state, request_id, RequestStatus::New, RequestStatus::Rejected, &change).await?;
    log::info!("❌ Request {} rejected via {:?}", request.id, origin);

    let text = format!(
        "❌ К сожалению, на выбранное время {} {} нет мест.\n\nВыбери другое время или задай вопрос админу:",
        request.desired_date, request.desired_time
    );
    notify_client(state, &request, &text, true).await;

    Ok(request)
}

/// Только из панели, клиенту ничего не отправляется
pub async fn complete(state: &BotState, request_id: i64) -> Result<Request, LifecycleError> {
    let request = apply(
        state,
        request_id,
        RequestStatus::Approved,
        RequestStatus::Completed,
        &StatusChange::default(),
    )
    .await?;
    log::info!("🎉 Request {} completed", request.id);
    Ok(request)
}

/// Уточнение ведётся вручную в переписке; заявка и база не затрагиваются
pub fn clarify(state: &BotState, actor: ChatId, request_id: i64) -> Result<(), LifecycleError> {
    authorize(state, Origin::Chat { actor })?;
    log::info!("📌 Request {} marked for clarification by {}", request_id, actor);
    Ok(())
}

fn rejection_note(reason: Option<&str>) -> String {
    match reason.map(str::trim).filter(|r| !r.is_empty()) {
        Some(reason) => format!("[ОТКЛОНЕНО] {}", reason),
        None => "[ОТКЛОНЕНО]".to_string(),
    }
}

async fn apply(
    state: &BotState,
    request_id: i64,
    from: RequestStatus,
    to: RequestStatus,
    change: &StatusChange,
) -> Result<Request, LifecycleError> {
    if let Some(request) = Request::transition(&state.db, request_id, from, to, change).await? {
        return Ok(request);
    }

    match Request::find_by_id(&state.db, request_id).await? {
        None => Err(LifecycleError::NotFound(request_id)),
        Some(current) => {
            log::warn!(
                "⚠️ Request {} is {}, refusing {} -> {}",
                request_id,
                current.status,
                from,
                to
            );
            Err(LifecycleError::InvalidTransition {
                id: request_id,
                from: current.status,
                to,
            })
        }
    }
}

/// Ошибка доставки только логируется: смена статуса уже сохранена
async fn notify_client(state: &BotState, request: &Request, text: &str, offer_menu: bool) {
    let user = match User::find_by_id(&state.db, request.user_id).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            log::error!("❌ Request {} references missing user {}", request.id, request.user_id);
            return;
        }
        Err(e) => {
            log::error!("❌ Error loading client of request {}: {}", request.id, e);
            return;
        }
    };

    let keyboard = offer_menu.then(main_menu_keyboard);
    if let Err(e) = state.notifier.notify(user.chat_id(), text, keyboard).await {
        log::error!("❌ Failed to notify client {}: {}", user.tg_user_id, e);
    }
}

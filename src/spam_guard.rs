use chrono::{DateTime, Duration, Utc};

use crate::database::Database;
use crate::models::{Request, RequestStatus, User};

/// Можно ли пользователю начать новую запись.
///
/// Блокирует только если последняя заявка в статусе `new` создана меньше
/// `timeout_minutes` назад. Подтверждённые и отклонённые заявки не считаются.
pub async fn is_booking_allowed(
    db: &Database,
    tg_user_id: i64,
    timeout_minutes: i64,
    now: DateTime<Utc>,
) -> Result<bool, sqlx::Error> {
    let Some(user) = User::find_by_tg_id(db, tg_user_id).await? else {
        return Ok(true);
    };

    let Some(last_pending) = Request::latest_with_status(db, user.id, RequestStatus::New).await? else {
        return Ok(true);
    };

    let age = now - last_pending.created_at;
    let allowed = age >= Duration::minutes(timeout_minutes);
    if !allowed {
        log::info!(
            "⏳ Spam guard blocked user {}: request {} is {}s old",
            tg_user_id,
            last_pending.id,
            age.num_seconds()
        );
    }

    Ok(allowed)
}

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::database::Database;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    New,
    Approved,
    Rejected,
    Canceled,
    Completed,
}

impl RequestStatus {
    pub const ALL: [RequestStatus; 5] = [
        RequestStatus::New,
        RequestStatus::Approved,
        RequestStatus::Rejected,
        RequestStatus::Canceled,
        RequestStatus::Completed,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RequestStatus::New => "new",
            RequestStatus::Approved => "approved",
            RequestStatus::Rejected => "rejected",
            RequestStatus::Canceled => "canceled",
            RequestStatus::Completed => "completed",
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            RequestStatus::New => "⏳",
            RequestStatus::Approved => "✅",
            RequestStatus::Rejected => "❌",
            RequestStatus::Canceled => "🚫",
            RequestStatus::Completed => "🎉",
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown request status: {0}")]
pub struct UnknownStatus(String);

impl FromStr for RequestStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RequestStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

impl TryFrom<String> for RequestStatus {
    type Error = UnknownStatus;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Request {
    pub id: i64,
    pub user_id: i64,
    pub master_id: Option<i64>,
    pub service: String,
    pub desired_date: String,
    pub desired_time: String,
    pub pet_name: String,
    pub comment: Option<String>,
    #[sqlx(try_from = "String")]
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewRequest {
    pub user_id: i64,
    pub service: String,
    pub desired_date: String,
    pub desired_time: String,
    pub pet_name: String,
    pub comment: Option<String>,
}

/// Какие поля меняются вместе со статусом
#[derive(Debug, Clone, Default)]
pub struct StatusChange {
    pub master_id: Option<i64>,
    pub comment: Option<String>,
}

/// Строка выдачи для панели: заявка вместе с клиентом и мастером
#[derive(Debug, Clone, FromRow)]
pub struct RequestListRow {
    pub id: i64,
    pub client: Option<String>,
    pub phone: Option<String>,
    pub service: String,
    pub desired_date: String,
    pub desired_time: String,
    pub pet_name: String,
    pub comment: Option<String>,
    pub status: String,
    pub master_id: Option<i64>,
    pub master_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

const REQUEST_COLUMNS: &str = "id, user_id, master_id, service, desired_date, desired_time, \
     pet_name, comment, status, created_at, updated_at";

impl Request {
    pub async fn create(db: &Database, new: &NewRequest) -> Result<Self, sqlx::Error> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO requests
                (user_id, service, desired_date, desired_time, pet_name, comment, status, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(new.user_id)
        .bind(&new.service)
        .bind(&new.desired_date)
        .bind(&new.desired_time)
        .bind(&new.pet_name)
        .bind(&new.comment)
        .bind(RequestStatus::New.as_str())
        .bind(now)
        .bind(now)
        .execute(&db.pool)
        .await?;

        Ok(Request {
            id: result.last_insert_rowid(),
            user_id: new.user_id,
            master_id: None,
            service: new.service.clone(),
            desired_date: new.desired_date.clone(),
            desired_time: new.desired_time.clone(),
            pet_name: new.pet_name.clone(),
            comment: new.comment.clone(),
            status: RequestStatus::New,
            created_at: now,
            updated_at: now,
        })
    }

    pub async fn find_by_id(db: &Database, id: i64) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Request>(&format!("SELECT {REQUEST_COLUMNS} FROM requests WHERE id = ?"))
            .bind(id)
            .fetch_optional(&db.pool)
            .await
    }

    /// Самая свежая заявка пользователя в заданном статусе
    pub async fn latest_with_status(
        db: &Database,
        user_id: i64,
        status: RequestStatus,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Request>(&format!(
            "SELECT {REQUEST_COLUMNS} FROM requests \
             WHERE user_id = ? AND status = ? \
             ORDER BY created_at DESC, id DESC LIMIT 1"
        ))
        .bind(user_id)
        .bind(status.as_str())
        .fetch_optional(&db.pool)
        .await
    }

    pub async fn recent_for_user(
        db: &Database,
        user_id: i64,
        limit: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Request>(&format!(
            "SELECT {REQUEST_COLUMNS} FROM requests \
             WHERE user_id = ? ORDER BY created_at DESC, id DESC LIMIT ?"
        ))
        .bind(user_id)
        .bind(limit)
        .fetch_all(&db.pool)
        .await
    }

    /// Смена статуса одним условным UPDATE: запись меняется, только если её текущий
    /// статус равен `from`. Возвращает `None`, если заявки нет или статус уже другой.
    pub async fn transition(
        db: &Database,
        id: i64,
        from: RequestStatus,
        to: RequestStatus,
        change: &StatusChange,
    ) -> Result<Option<Self>, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE requests SET
                status = ?,
                master_id = COALESCE(?, master_id),
                comment = COALESCE(?, comment),
                updated_at = ?
            WHERE id = ? AND status = ?
            "#,
        )
        .bind(to.as_str())
        .bind(change.master_id)
        .bind(&change.comment)
        .bind(Utc::now())
        .bind(id)
        .bind(from.as_str())
        .execute(&db.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        Self::find_by_id(db, id).await
    }

    /// Список для панели, новые сверху. Пустой фильтр означает все статусы.
    pub async fn list_with_people(
        db: &Database,
        status: Option<&str>,
    ) -> Result<Vec<RequestListRow>, sqlx::Error> {
        let base = r#"
            SELECT r.id, u.first_name AS client, u.phone AS phone, r.service,
                   r.desired_date, r.desired_time, r.pet_name, r.comment, r.status,
                   r.master_id, m.name AS master_name, r.created_at
            FROM requests r
            LEFT JOIN users u ON u.id = r.user_id
            LEFT JOIN masters m ON m.id = r.master_id
        "#;

        match status {
            Some(status) => {
                sqlx::query_as::<_, RequestListRow>(&format!(
                    "{base} WHERE r.status = ? ORDER BY r.created_at DESC, r.id DESC"
                ))
                .bind(status)
                .fetch_all(&db.pool)
                .await
            }
            None => {
                sqlx::query_as::<_, RequestListRow>(&format!(
                    "{base} ORDER BY r.created_at DESC, r.id DESC"
                ))
                .fetch_all(&db.pool)
                .await
            }
        }
    }

    pub async fn count_by_status(db: &Database) -> Result<Vec<(String, i64)>, sqlx::Error> {
        sqlx::query_as::<_, (String, i64)>("SELECT status, COUNT(*) FROM requests GROUP BY status")
            .fetch_all(&db.pool)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::User;

    fn sample(user_id: i64) -> NewRequest {
        NewRequest {
            user_id,
            service: "wash".to_string(),
            desired_date: "15.01.2026".to_string(),
            desired_time: "10:30".to_string(),
            pet_name: "Rex".to_string(),
            comment: None,
        }
    }

    #[test]
    fn status_round_trips_through_text() {
        for status in RequestStatus::ALL {
            assert_eq!(status.as_str().parse::<RequestStatus>().unwrap(), status);
        }
        assert!("pending".parse::<RequestStatus>().is_err());
    }

    #[tokio::test]
    async fn create_stores_new_request() {
        let db = Database::in_memory().await;
        let user = User::get_or_create(&db, 10, Some("Мария")).await.unwrap();

        let created = Request::create(&db, &sample(user.id)).await.unwrap();
        let stored = Request::find_by_id(&db, created.id).await.unwrap().unwrap();

        assert_eq!(stored.status, RequestStatus::New);
        assert_eq!(stored.pet_name, "Rex");
        assert!(stored.comment.is_none());
        assert!(stored.master_id.is_none());
    }

    #[tokio::test]
    async fn transition_only_applies_from_expected_status() {
        let db = Database::in_memory().await;
        let user = User::get_or_create(&db, 11, None).await.unwrap();
        let created = Request::create(&db, &sample(user.id)).await.unwrap();

        let approved = Request::transition(
            &db,
            created.id,
            RequestStatus::New,
            RequestStatus::Approved,
            &StatusChange::default(),
        )
        .await
        .unwrap()
        .unwrap();
        assert_eq!(approved.status, RequestStatus::Approved);
        assert!(approved.updated_at >= created.updated_at);

        let again = Request::transition(
            &db,
            created.id,
            RequestStatus::New,
            RequestStatus::Rejected,
            &StatusChange::default(),
        )
        .await
        .unwrap();
        assert!(again.is_none());

        let stored = Request::find_by_id(&db, created.id).await.unwrap().unwrap();
        assert_eq!(stored.status, RequestStatus::Approved);
    }

    #[tokio::test]
    async fn list_filters_by_exact_status_newest_first() {
        let db = Database::in_memory().await;
        let user = User::get_or_create(&db, 12, Some("Олег")).await.unwrap();
        let first = Request::create(&db, &sample(user.id)).await.unwrap();
        let second = Request::create(&db, &sample(user.id)).await.unwrap();
        Request::transition(
            &db,
            first.id,
            RequestStatus::New,
            RequestStatus::Rejected,
            &StatusChange::default(),
        )
        .await
        .unwrap();

        let all = Request::list_with_people(&db, None).await.unwrap();
        assert_eq!(all.iter().map(|r| r.id).collect::<Vec<_>>(), vec![second.id, first.id]);
        assert_eq!(all[0].client.as_deref(), Some("Олег"));

        let new_only = Request::list_with_people(&db, Some("new")).await.unwrap();
        assert_eq!(new_only.len(), 1);
        assert_eq!(new_only[0].id, second.id);

        let none = Request::list_with_people(&db, Some("NEW")).await.unwrap();
        assert!(none.is_empty());
    }
}

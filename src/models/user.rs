use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use teloxide::types::ChatId;

use crate::database::Database;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub tg_user_id: i64,
    pub first_name: Option<String>,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn chat_id(&self) -> ChatId {
        ChatId(self.tg_user_id)
    }

    pub fn display_name(&self) -> &str {
        self.first_name.as_deref().unwrap_or("?")
    }

    /// Найти пользователя по внешнему идентификатору или создать нового без телефона.
    ///
    /// Вставка идёт через `ON CONFLICT DO NOTHING`, поэтому два одновременных первых
    /// обращения одного клиента не создают две записи.
    pub async fn get_or_create(
        db: &Database,
        tg_user_id: i64,
        first_name: Option<&str>,
    ) -> Result<Self, sqlx::Error> {
        let inserted = sqlx::query(
            r#"
            INSERT INTO users (tg_user_id, first_name, phone, created_at)
            VALUES (?, ?, NULL, ?)
            ON CONFLICT (tg_user_id) DO NOTHING
            "#,
        )
        .bind(tg_user_id)
        .bind(first_name)
        .bind(Utc::now())
        .execute(&db.pool)
        .await?;

        if inserted.rows_affected() > 0 {
            log::info!("👤 New user registered: {}", tg_user_id);
        }

        sqlx::query_as::<_, User>(
            "SELECT id, tg_user_id, first_name, phone, created_at FROM users WHERE tg_user_id = ?",
        )
        .bind(tg_user_id)
        .fetch_one(&db.pool)
        .await
    }

    pub async fn find_by_tg_id(db: &Database, tg_user_id: i64) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            "SELECT id, tg_user_id, first_name, phone, created_at FROM users WHERE tg_user_id = ?",
        )
        .bind(tg_user_id)
        .fetch_optional(&db.pool)
        .await
    }

    pub async fn find_by_id(db: &Database, id: i64) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            "SELECT id, tg_user_id, first_name, phone, created_at FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&db.pool)
        .await
    }

    pub async fn set_phone(db: &Database, id: i64, phone: &str) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET phone = ? WHERE id = ?")
            .bind(phone)
            .bind(id)
            .execute(&db.pool)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn get_or_create_is_idempotent() {
        let db = Database::in_memory().await;

        let first = User::get_or_create(&db, 42, Some("Анна")).await.unwrap();
        let second = User::get_or_create(&db, 42, Some("Другое имя")).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.first_name.as_deref(), Some("Анна"));
        assert!(second.phone.is_none());

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE tg_user_id = 42")
            .fetch_one(&db.pool)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn distinct_identities_get_distinct_records() {
        let db = Database::in_memory().await;
        let a = User::get_or_create(&db, 1, None).await.unwrap();
        let b = User::get_or_create(&db, 2, None).await.unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(a.display_name(), "?");
    }

    #[tokio::test]
    async fn set_phone_overwrites_previous_value() {
        let db = Database::in_memory().await;
        let user = User::get_or_create(&db, 7, Some("Rex owner")).await.unwrap();

        User::set_phone(&db, user.id, "+79990000000").await.unwrap();
        User::set_phone(&db, user.id, "+79991234567").await.unwrap();

        let reloaded = User::find_by_tg_id(&db, 7).await.unwrap().unwrap();
        assert_eq!(reloaded.phone.as_deref(), Some("+79991234567"));
    }
}

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::database::Database;

/// Журнал вопросов: и выбранные пункты FAQ, и вопросы свободным текстом
#[derive(Debug, Clone, FromRow)]
pub struct FaqLog {
    pub id: i64,
    pub user_id: Option<i64>,
    pub question: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl FaqLog {
    pub async fn record(db: &Database, user_id: i64, question: &str) -> Result<(), sqlx::Error> {
        sqlx::query("INSERT INTO faq_logs (user_id, question, created_at) VALUES (?, ?, ?)")
            .bind(user_id)
            .bind(question)
            .bind(Utc::now())
            .execute(&db.pool)
            .await?;
        Ok(())
    }
}

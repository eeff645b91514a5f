use std::collections::HashMap;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::database::Database;

/// День недели -> интервалы работы, например `{"пн": ["10:00-14:00"]}`.
/// Хранится, но при записи не проверяется.
pub type WeeklySchedule = HashMap<String, Vec<String>>;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Master {
    pub id: i64,
    pub name: String,
    pub specialty: Option<String>,
    pub phone: Option<String>,
    pub is_active: bool,
    #[sqlx(json)]
    pub schedule: WeeklySchedule,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewMaster {
    pub name: String,
    pub specialty: String,
    pub phone: String,
}

impl Master {
    pub async fn get_all(db: &Database) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Master>(
            "SELECT id, name, specialty, phone, is_active, schedule FROM masters ORDER BY id",
        )
        .fetch_all(&db.pool)
        .await
    }

    /// Новый мастер всегда активен и без расписания
    pub async fn create(db: &Database, new: &NewMaster) -> Result<Self, sqlx::Error> {
        let created_at = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO masters (name, specialty, phone, is_active, schedule, created_at)
            VALUES (?, ?, ?, 1, '{}', ?)
            "#,
        )
        .bind(&new.name)
        .bind(&new.specialty)
        .bind(&new.phone)
        .bind(created_at)
        .execute(&db.pool)
        .await?;

        log::info!("✂️ Master {} created: {}", result.last_insert_rowid(), new.name);

        Ok(Master {
            id: result.last_insert_rowid(),
            name: new.name.clone(),
            specialty: Some(new.specialty.clone()),
            phone: Some(new.phone.clone()),
            is_active: true,
            schedule: WeeklySchedule::new(),
        })
    }
}

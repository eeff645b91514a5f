//! HTTP-панель администратора: выдача заявок и мастеров, команды по заявкам.
//!
//! Команды идут через тот же жизненный цикл, что и кнопки в чате, но без
//! проверки белого списка: доступ к самой панели ограничивается снаружи.

use std::net::SocketAddr;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::bot_state::BotState;
use crate::lifecycle::{self, LifecycleError, Origin};
use crate::models::{Master, NewMaster, Request, RequestListRow, RequestStatus};

type ApiError = (StatusCode, Json<Value>);

pub fn build_router(state: BotState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/stats", get(stats))
        .route("/requests", get(list_requests))
        .route("/requests/{id}/approve", post(approve_request))
        .route("/requests/{id}/reject", post(reject_request))
        .route("/requests/{id}/complete", post(complete_request))
        .route("/masters", get(list_masters).post(create_master))
        .with_state(state)
}

pub async fn serve(state: BotState, addr: SocketAddr) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    log::info!("🌐 Dashboard listening on {}", addr);
    axum::serve(listener, build_router(state)).await
}

/// Строка заявки в том виде, в каком её показывает панель
#[derive(Debug, Serialize)]
pub struct RequestView {
    pub id: i64,
    pub client: String,
    pub phone: Option<String>,
    pub service: String,
    pub date: String,
    pub time: String,
    pub pet: String,
    pub comment: String,
    pub status: String,
    pub master: String,
    pub created_at: String,
}

impl From<RequestListRow> for RequestView {
    fn from(row: RequestListRow) -> Self {
        let master = match (row.master_id, row.master_name) {
            (None, _) => "не назначен".to_string(),
            (Some(_), Some(name)) => name,
            (Some(_), None) => "неизвестно".to_string(),
        };

        Self {
            id: row.id,
            client: row.client.unwrap_or_else(|| "?".to_string()),
            phone: row.phone,
            service: row.service,
            date: row.desired_date,
            time: row.desired_time,
            pet: row.pet_name,
            comment: row.comment.unwrap_or_default(),
            status: row.status,
            master,
            created_at: row.created_at.format("%d.%m.%Y %H:%M").to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ListParams {
    status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApproveParams {
    master_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct RejectParams {
    reason: Option<String>,
}

async fn healthz() -> (StatusCode, &'static str) {
    (StatusCode::OK, "ok")
}

async fn list_requests(
    State(state): State<BotState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<RequestView>>, ApiError> {
    let status = params.status.as_deref().filter(|s| !s.is_empty());

    let rows = Request::list_with_people(&state.db, status)
        .await
        .map_err(internal_error)?;

    Ok(Json(rows.into_iter().map(RequestView::from).collect()))
}

async fn approve_request(
    State(state): State<BotState>,
    Path(id): Path<i64>,
    Query(params): Query<ApproveParams>,
) -> Result<Json<Value>, ApiError> {
    log::info!("🖥 Dashboard approve for request {}", id);
    lifecycle::approve(&state, Origin::Dashboard, id, params.master_id)
        .await
        .map_err(lifecycle_error)?;
    Ok(ok_message("Заявка подтверждена"))
}

async fn reject_request(
    State(state): State<BotState>,
    Path(id): Path<i64>,
    Query(params): Query<RejectParams>,
) -> Result<Json<Value>, ApiError> {
    log::info!("🖥 Dashboard reject for request {}", id);
    lifecycle::reject(&state, Origin::Dashboard, id, params.reason.as_deref())
        .await
        .map_err(lifecycle_error)?;
    Ok(ok_message("Заявка отклонена"))
}

async fn complete_request(
    State(state): State<BotState>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    log::info!("🖥 Dashboard complete for request {}", id);
    lifecycle::complete(&state, id).await.map_err(lifecycle_error)?;
    Ok(ok_message("Заявка выполнена"))
}

async fn list_masters(State(state): State<BotState>) -> Result<Json<Vec<Master>>, ApiError> {
    let masters = Master::get_all(&state.db).await.map_err(internal_error)?;
    Ok(Json(masters))
}

async fn create_master(
    State(state): State<BotState>,
    Query(new): Query<NewMaster>,
) -> Result<Json<Value>, ApiError> {
    let master = Master::create(&state.db, &new).await.map_err(internal_error)?;
    Ok(Json(json!({ "id": master.id, "name": master.name })))
}

async fn stats(State(state): State<BotState>) -> Result<Json<Value>, ApiError> {
    let counts = Request::count_by_status(&state.db).await.map_err(internal_error)?;

    let mut body = serde_json::Map::new();
    body.insert("total".to_string(), json!(counts.iter().map(|(_, n)| n).sum::<i64>()));
    for status in RequestStatus::ALL {
        let count = counts
            .iter()
            .find(|(s, _)| s == status.as_str())
            .map(|(_, n)| *n)
            .unwrap_or(0);
        body.insert(status.as_str().to_string(), json!(count));
    }

    Ok(Json(Value::Object(body)))
}

fn ok_message(message: &str) -> Json<Value> {
    Json(json!({ "status": "ok", "message": message }))
}

fn internal_error(e: sqlx::Error) -> ApiError {
    log::error!("❌ Dashboard storage error: {}", e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "internal error" })),
    )
}

fn lifecycle_error(e: LifecycleError) -> ApiError {
    match e {
        LifecycleError::NotFound(_) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "detail": "Заявка не найдена" })),
        ),
        LifecycleError::InvalidTransition { from, to, .. } => (
            StatusCode::CONFLICT,
            Json(json!({ "detail": format!("Заявка в статусе {}, переход в {} невозможен", from, to) })),
        ),
        LifecycleError::Database(e) => internal_error(e),
        // Панель не проходит через белый список
        LifecycleError::Unauthorized => (
            StatusCode::FORBIDDEN,
            Json(json!({ "detail": "Доступ запрещен" })),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bot_state::testing::test_state;
    use crate::models::{NewRequest, User};
    use axum::body::Body;
    use axum::http::Request as HttpRequest;
    use teloxide::types::ChatId;
    use tower::util::ServiceExt;

    const CLIENT: ChatId = ChatId(777);

    async fn seed_request(state: &BotState, pet: &str) -> i64 {
        let user = User::get_or_create(&state.db, CLIENT.0, Some("Олег")).await.unwrap();
        User::set_phone(&state.db, user.id, "+79991234567").await.unwrap();
        Request::create(
            &state.db,
            &NewRequest {
                user_id: user.id,
                service: "haircut".to_string(),
                desired_date: "20.02.2026".to_string(),
                desired_time: "12:00".to_string(),
                pet_name: pet.to_string(),
                comment: None,
            },
        )
        .await
        .unwrap()
        .id
    }

    async fn call(state: &BotState, method: &str, uri: &str) -> (StatusCode, Value) {
        let response = build_router(state.clone())
            .oneshot(
                HttpRequest::builder()
                    .method(method)
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    #[tokio::test]
    async fn healthz_ok() {
        let (state, _) = test_state().await;
        let response = build_router(state)
            .oneshot(HttpRequest::builder().uri("/healthz").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn listing_joins_client_and_master() {
        let (state, _) = test_state().await;
        let id = seed_request(&state, "Бублик").await;

        let (status, body) = call(&state, "GET", "/requests").await;
        assert_eq!(status, StatusCode::OK);
        let rows = body.as_array().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["id"], id);
        assert_eq!(rows[0]["client"], "Олег");
        assert_eq!(rows[0]["phone"], "+79991234567");
        assert_eq!(rows[0]["pet"], "Бублик");
        assert_eq!(rows[0]["comment"], "");
        assert_eq!(rows[0]["status"], "new");
        assert_eq!(rows[0]["master"], "не назначен");
    }

    #[tokio::test]
    async fn listing_filters_by_status_and_ignores_empty_filter() {
        let (state, _) = test_state().await;
        let first = seed_request(&state, "Бублик").await;
        seed_request(&state, "Пряник").await;
        call(&state, "POST", &format!("/requests/{first}/approve")).await;

        let (_, approved) = call(&state, "GET", "/requests?status=approved").await;
        assert_eq!(approved.as_array().unwrap().len(), 1);
        assert_eq!(approved[0]["id"], first);

        let (_, all) = call(&state, "GET", "/requests?status=").await;
        assert_eq!(all.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn approve_with_master_and_dangling_master() {
        let (state, notifier) = test_state().await;
        let (_, master) = call(&state, "POST", "/masters?name=Anna&specialty=haircut&phone=%2B79990000000").await;
        let master_id = master["id"].as_i64().unwrap();

        let with_master = seed_request(&state, "Бублик").await;
        let dangling = seed_request(&state, "Пряник").await;

        let (status, body) =
            call(&state, "POST", &format!("/requests/{with_master}/approve?master_id={master_id}")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        call(&state, "POST", &format!("/requests/{dangling}/approve?master_id=999")).await;

        let (_, rows) = call(&state, "GET", "/requests").await;
        let master_of = |id: i64| {
            rows.as_array()
                .unwrap()
                .iter()
                .find(|r| r["id"] == id)
                .map(|r| r["master"].clone())
                .unwrap()
        };
        assert_eq!(master_of(with_master), "Anna");
        assert_eq!(master_of(dangling), "неизвестно");
        assert_eq!(notifier.sent_to(CLIENT).len(), 2);
    }

    #[tokio::test]
    async fn reject_overwrites_comment_with_reason() {
        let (state, _) = test_state().await;
        let id = seed_request(&state, "Бублик").await;

        let (status, _) = call(&state, "POST", &format!("/requests/{id}/reject?reason=%D0%BD%D0%B5%D1%82%20%D0%BC%D0%B5%D1%81%D1%82")).await;
        assert_eq!(status, StatusCode::OK);

        let stored = Request::find_by_id(&state.db, id).await.unwrap().unwrap();
        assert_eq!(stored.comment.as_deref(), Some("[ОТКЛОНЕНО] нет мест"));
    }

    #[tokio::test]
    async fn unknown_request_is_404_and_repeat_decision_is_409() {
        let (state, _) = test_state().await;
        let (status, body) = call(&state, "POST", "/requests/999/approve").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["detail"], "Заявка не найдена");

        let id = seed_request(&state, "Бублик").await;
        call(&state, "POST", &format!("/requests/{id}/reject")).await;
        let (status, _) = call(&state, "POST", &format!("/requests/{id}/approve")).await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn complete_and_stats() {
        let (state, notifier) = test_state().await;
        let id = seed_request(&state, "Бублик").await;
        seed_request(&state, "Пряник").await;

        let (status, _) = call(&state, "POST", &format!("/requests/{id}/complete")).await;
        assert_eq!(status, StatusCode::CONFLICT);

        call(&state, "POST", &format!("/requests/{id}/approve")).await;
        let (status, _) = call(&state, "POST", &format!("/requests/{id}/complete")).await;
        assert_eq!(status, StatusCode::OK);
        // Только уведомление о подтверждении
        assert_eq!(notifier.sent_to(CLIENT).len(), 1);

        let (_, stats) = call(&state, "GET", "/stats").await;
        assert_eq!(stats["total"], 2);
        assert_eq!(stats["new"], 1);
        assert_eq!(stats["completed"], 1);
        assert_eq!(stats["canceled"], 0);
    }

    #[tokio::test]
    async fn masters_listing_includes_schedule() {
        let (state, _) = test_state().await;
        call(&state, "POST", "/masters?name=Anna&specialty=haircut&phone=123").await;

        let (status, body) = call(&state, "GET", "/masters").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["name"], "Anna");
        assert_eq!(body[0]["is_active"], true);
        assert_eq!(body[0]["schedule"], json!({}));
        assert!(body[0].get("created_at").is_none());
    }
}

//! # 글쓰기 세션 라우트 핸들러
//!
//! ## 엔드포인트
//! - `POST /api/v1/writing-sessions`                      → 세션 생성 (201)
//! - `GET  /api/v1/writing-sessions/on-process`           → 진행 중 세션 (없으면 `null`)
//! - `POST /api/v1/writing-sessions/on-process/writings`  → 진행 중 세션에 글 추가 (201)
//! - `GET  /api/v1/writing-sessions/cron-tasks`           → 무장된 트리거 이름 목록
//!
//! 모든 엔드포인트는 `AuthUser`로 인증된 요청만 받습니다.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

use crate::{
    error::AppError,
    middleware::auth::AuthUser,
    models::*,
    routes::AppState,
    services::writing_sessions as service,
};

/// `POST /writing-sessions`: 새 글쓰기 세션을 만듭니다.
///
/// 이미 진행 중인 세션이 있으면 409, 필드 누락이나 범위 오류는 400입니다.
/// 범위는 `CreateWritingSessionRequest` 참고 (`writing_hours`는 24 미만).
/// 본문이 JSON으로 해석되지 않아도 같은 400 `validation_error`입니다.
pub async fn create_writing_session(
    State(state): State<AppState>,
    auth: AuthUser,
    body: Result<Json<CreateWritingSessionRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<WritingSession>), AppError> {
    let Json(req) = body?;
    let session =
        service::create_writing_session(&state.pool, &state.scheduler, &auth.user_id, req).await?;
    Ok((StatusCode::CREATED, Json(session)))
}

/// `GET /writing-sessions/on-process`: 진행 중인 세션과 글 목록을 조회합니다.
pub async fn get_on_process_session(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Option<OnProcessWritingSession>>, AppError> {
    let session = service::get_on_process_session(&state.pool, &auth.user_id).await?;
    Ok(Json(session))
}

/// `POST /writing-sessions/on-process/writings`: 진행 중인 세션에 글을 추가합니다.
pub async fn add_writing(
    State(state): State<AppState>,
    auth: AuthUser,
    body: Result<Json<CreateWritingRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Writing>), AppError> {
    let Json(req) = body?;
    let writing = service::add_writing(&state.pool, &auth.user_id, req).await?;
    Ok((StatusCode::CREATED, Json(writing)))
}

/// `GET /writing-sessions/cron-tasks`: 현재 메모리에 무장된 트리거 이름들
///
/// 운영 중 타이머가 제대로 걸려 있는지 확인하는 진단용입니다.
pub async fn list_cron_tasks(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> Json<Value> {
    let names = state.scheduler.armed_names().await;
    Json(json!({ "cronTasks": names }))
}

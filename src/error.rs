//! # 에러 처리 모듈
//!
//! 애플리케이션 전체에서 쓰는 단일 에러 타입 `AppError`를 정의합니다.
//!
//! - 세션 생성 요청의 검증 실패(`Validation`)와 중복 세션(`Conflict`)은
//!   호출자에게 그대로 돌려줍니다.
//! - 타이머가 실행한 핸들러 안에서 생긴 에러는 스케줄러가 로그로만 남기고,
//!   타이머는 다음 반복을 위해 계속 살아 있습니다 (`scheduler::service` 참고).

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// 애플리케이션에서 발생할 수 있는 모든 에러 종류
#[derive(Debug, Error)]
pub enum AppError {
    /// 존재하지 않는 세션을 참조함 (HTTP 404)
    #[error("Resource not found")]
    NotFound,

    /// 세션 매개변수가 없거나 범위를 벗어남 (HTTP 400)
    ///
    /// 0시 0분처럼 "값이 0"인 것은 누락이 아니므로 이 에러가 나지 않아야 합니다.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// 이미 진행 중인 세션이 있음 (HTTP 409)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// 저장된 트리거 표현식을 해석할 수 없음 (HTTP 500)
    #[error("Invalid trigger expression: {0}")]
    InvalidExpression(String),

    /// 서버 내부 오류 (HTTP 500)
    #[error("Internal error: {0}")]
    Internal(String),

    /// 데이터베이스 오류 (HTTP 500)
    /// #[from]: sqlx 함수 결과에 `?`를 쓰면 자동으로 이 variant로 변환됩니다.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// 본문이 JSON이 아니거나 필드 타입이 맞지 않으면 (`"hour": -1` 등)
/// axum 기본 응답(텍스트 422) 대신 검증 에러로 돌려줍니다.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    /// 내부 에러(Database, Internal, InvalidExpression)는 로그에만 자세히 남기고
    /// 클라이언트에는 일반적인 메시지만 반환합니다.
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::NotFound => (StatusCode::NOT_FOUND, "not_found", self.to_string()),
            AppError::Validation(ref msg) => {
                (StatusCode::BAD_REQUEST, "validation_error", msg.clone())
            }
            AppError::Conflict(ref msg) => (StatusCode::CONFLICT, "conflict", msg.clone()),
            AppError::InvalidExpression(ref msg) => {
                tracing::error!("Invalid trigger expression: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                )
            }
            AppError::Internal(ref msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                )
            }
            AppError::Database(ref e) => {
                tracing::error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "database_error",
                    "A database error occurred".to_string(),
                )
            }
        };

        // { "error": { "code": "...", "message": "..." } }
        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

//! # 라우트 핸들러 모듈
//!
//! HTTP 요청을 처리하는 핸들러 함수들을 모아둔 모듈입니다.
//!
//! 각 하위 모듈:
//! - `health`: 서버 상태 확인 (헬스체크)
//! - `writing_sessions`: 글쓰기 세션 생성/조회, 글 추가, 트리거 목록

pub mod health;
pub mod writing_sessions;

pub use health::*;
pub use writing_sessions::*;

use axum::{
    routing::{get, post},
    Router,
};
use sqlx::SqlitePool;

use crate::scheduler::Scheduler;

/// 애플리케이션 공유 상태
///
/// 모든 요청 핸들러가 `State(state): State<AppState>`로 접근합니다.
/// 세 필드 모두 내부가 `Arc`라서 clone 비용이 작습니다.
#[derive(Clone)]
pub struct AppState {
    /// SQLite 연결 풀
    pub pool: SqlitePool,
    /// 액세스 토큰 검증용 비밀키
    pub jwt_secret: String,
    /// 세션 트리거 타이머를 들고 있는 스케줄러
    pub scheduler: Scheduler,
}

/// `/api/v1` 아래에 붙는 API 라우터
pub fn api_router(state: AppState) -> Router {
    Router::new()
        .route("/writing-sessions", post(create_writing_session))
        .route("/writing-sessions/on-process", get(get_on_process_session))
        .route("/writing-sessions/on-process/writings", post(add_writing))
        .route("/writing-sessions/cron-tasks", get(list_cron_tasks))
        .route("/health", get(health_check))
        .with_state(state)
}

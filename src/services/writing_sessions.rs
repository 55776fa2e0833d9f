//! # 글쓰기 세션 서비스
//!
//! 라우트 핸들러가 호출하는 세션 단위 작업들입니다.
//! 시간대 계산(`scheduler::window`), 레코드 저장(`db`), 타이머 등록(`Scheduler`)을
//! 순서대로 엮습니다.
//!
//! ## 세션 생성 흐름
//! ```text
//! 진행 중 세션 확인 → 매개변수 검증 → 날짜 계산
//!   → [트랜잭션] 세션 INSERT + 트리거 쌍 INSERT → 타이머 무장 → 커밋
//! ```
//! 세션과 트리거가 한 트랜잭션이므로 트리거 없이 남는 세션은 생기지 않습니다.
//! 타이머를 하나라도 못 걸거나 커밋이 실패하면 건 타이머를 내리고 롤백합니다.

use chrono::Local;
use sqlx::SqlitePool;
use tracing::info;

use crate::db::{self, NewWritingSession};
use crate::error::AppError;
use crate::models::*;
use crate::scheduler::{compute_window, Scheduler};

/// 새 글쓰기 세션을 만들고 매일 열고 닫을 트리거를 등록합니다.
///
/// # 에러
/// - `Conflict`: 이미 진행 중인 세션이 있음 (요청 내용과 상관없이 먼저 검사)
/// - `Validation`: 필수 값 누락 또는 범위 밖
pub async fn create_writing_session(
    pool: &SqlitePool,
    scheduler: &Scheduler,
    user_id: &str,
    req: CreateWritingSessionRequest,
) -> Result<WritingSession, AppError> {
    let mut tx = pool.begin().await?;

    if db::find_on_process_session_by_user(&mut *tx, user_id)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict(
            "An on-process writing session already exists".to_string(),
        ));
    }

    let params = req.into_params()?;
    let window = compute_window(
        params.start_at,
        params.writing_hours,
        params.period,
        Local::now(),
    )?;

    let session = db::create_session(
        &mut *tx,
        &NewWritingSession {
            user_id,
            params: &params,
            start_date: window.start_date,
            finish_date: window.finish_date,
            nearest_finish_date: window.nearest_finish_date,
        },
    )
    .await?;

    let triggers = Scheduler::triggers_for(&session);
    db::create_triggers(&mut *tx, &triggers).await?;

    let armed = scheduler.arm(&triggers).await;
    if armed < triggers.len() {
        scheduler.disarm(&triggers).await;
        return Err(AppError::Internal(format!(
            "armed {} of {} triggers for session {}",
            armed,
            triggers.len(),
            session.id
        )));
    }
    if let Err(e) = tx.commit().await {
        scheduler.disarm(&triggers).await;
        return Err(e.into());
    }

    info!(
        session_id = %session.id,
        user_id = %user_id,
        start_date = %session.start_date,
        finish_date = %session.finish_date,
        "Writing session created"
    );
    Ok(session)
}

/// 사용자의 진행 중인 세션과 그 글 목록(최신순)을 조회합니다. 없으면 `None`.
pub async fn get_on_process_session(
    pool: &SqlitePool,
    user_id: &str,
) -> Result<Option<OnProcessWritingSession>, AppError> {
    let Some(session) = db::find_on_process_session_by_user(pool, user_id).await? else {
        return Ok(None);
    };

    let writings = db::list_writings_for_session(pool, &session.id).await?;
    Ok(Some(OnProcessWritingSession {
        phase: session.phase(),
        session,
        writings,
    }))
}

/// 진행 중인 세션에 글을 추가합니다.
///
/// 진행 중인 세션이 없으면 `NotFound`.
pub async fn add_writing(
    pool: &SqlitePool,
    user_id: &str,
    req: CreateWritingRequest,
) -> Result<Writing, AppError> {
    if req.title.trim().is_empty() {
        return Err(AppError::Validation("title is required".to_string()));
    }

    let session = db::find_on_process_session_by_user(pool, user_id)
        .await?
        .ok_or(AppError::NotFound)?;

    db::create_writing(pool, &session.id, &req.title, &req.content).await
}

//! # 글쓰기 세션 데이터베이스 쿼리 모듈
//!
//! 세션 레코드의 생성, 조회, 부분 수정을 담당합니다.
//!
//! 모든 함수는 `SqliteExecutor`를 받습니다. `&SqlitePool`을 넘기면 단독 쿼리로,
//! `&mut *tx`를 넘기면 진행 중인 트랜잭션 안에서 실행됩니다.

use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite, SqliteExecutor};

use crate::error::AppError;
use crate::models::{SessionParams, SessionPatch, SessionStatus, WritingSession};

const SESSION_COLUMNS: &str = r#"
    id, user_id, subject, page, period, start_hour, start_minute, writing_hours,
    status, is_activated, start_date, finish_date, nearest_start_date,
    nearest_finish_date, created_at, updated_at
"#;

/// 새 세션을 만들 때 필요한 값들: 날짜는 `scheduler::window`가 계산한 결과입니다.
#[derive(Debug)]
pub struct NewWritingSession<'a> {
    pub user_id: &'a str,
    pub params: &'a SessionParams,
    pub start_date: DateTime<Utc>,
    pub finish_date: DateTime<Utc>,
    pub nearest_finish_date: DateTime<Utc>,
}

/// 사용자의 진행 중(onProcess) 세션을 하나 찾습니다.
pub async fn find_on_process_session_by_user<'e, E>(
    executor: E,
    user_id: &str,
) -> Result<Option<WritingSession>, AppError>
where
    E: SqliteExecutor<'e>,
{
    let sql = format!(
        "SELECT {} FROM writing_sessions WHERE user_id = ? AND status = ? LIMIT 1",
        SESSION_COLUMNS
    );
    let session = sqlx::query_as::<_, WritingSession>(&sql)
        .bind(user_id)
        .bind(SessionStatus::OnProcess)
        .fetch_optional(executor)
        .await?;

    Ok(session)
}

/// ID로 세션 하나를 조회합니다.
pub async fn find_session_by_id<'e, E>(
    executor: E,
    id: &str,
) -> Result<Option<WritingSession>, AppError>
where
    E: SqliteExecutor<'e>,
{
    let sql = format!("SELECT {} FROM writing_sessions WHERE id = ?", SESSION_COLUMNS);
    let session = sqlx::query_as::<_, WritingSession>(&sql)
        .bind(id)
        .fetch_optional(executor)
        .await?;

    Ok(session)
}

/// 새 세션을 저장합니다. 상태는 `onProcess`, `is_activated = false`로 시작합니다.
///
/// `nearest_start_date`는 첫 활성화 시각(`start_date`)과 같은 값으로 시작합니다.
///
/// 같은 사용자에게 이미 진행 중인 세션이 있으면 부분 유니크 인덱스
/// (`idx_writing_sessions_one_on_process`)에 걸려 `AppError::Conflict`가 됩니다.
pub async fn create_session<'e, E>(
    executor: E,
    new: &NewWritingSession<'_>,
) -> Result<WritingSession, AppError>
where
    E: SqliteExecutor<'e>,
{
    let id = uuid::Uuid::now_v7().to_string();
    let now = Utc::now();

    let sql = format!(
        r#"
        INSERT INTO writing_sessions (
            id, user_id, subject, page, period, start_hour, start_minute, writing_hours,
            status, is_activated, start_date, finish_date, nearest_start_date,
            nearest_finish_date, created_at, updated_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, 0, ?, ?, ?, ?, ?, ?)
        RETURNING {}
        "#,
        SESSION_COLUMNS
    );

    let session = sqlx::query_as::<_, WritingSession>(&sql)
        .bind(&id)
        .bind(new.user_id)
        .bind(&new.params.subject)
        .bind(new.params.page)
        .bind(new.params.period)
        .bind(new.params.start_at.hour)
        .bind(new.params.start_at.minute)
        .bind(new.params.writing_hours)
        .bind(SessionStatus::OnProcess)
        .bind(new.start_date)
        .bind(new.finish_date)
        .bind(new.start_date) // nearest_start_date
        .bind(new.nearest_finish_date)
        .bind(now)
        .bind(now)
        .fetch_one(executor)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                AppError::Conflict("An on-process writing session already exists".to_string())
            }
            other => AppError::Database(other),
        })?;

    Ok(session)
}

/// 세션을 부분 수정하고 수정된 레코드를 반환합니다.
///
/// 패치에 들어 있는 필드만 SET 절에 들어가며, `updated_at`은 항상 갱신됩니다.
///
/// ## 반환값
/// - `Ok(Some(WritingSession))`: 수정 성공
/// - `Ok(None)`: 해당 ID의 세션이 없음
pub async fn update_session<'e, E>(
    executor: E,
    id: &str,
    patch: &SessionPatch,
) -> Result<Option<WritingSession>, AppError>
where
    E: SqliteExecutor<'e>,
{
    // QueryBuilder: 값마다 타입이 다른 동적 UPDATE 문을 안전하게 바인딩합니다.
    let mut query: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE writing_sessions SET updated_at = ");
    query.push_bind(Utc::now());

    if let Some(status) = patch.status {
        query.push(", status = ").push_bind(status);
    }
    if let Some(is_activated) = patch.is_activated {
        query.push(", is_activated = ").push_bind(is_activated);
    }
    if let Some(nearest_start_date) = patch.nearest_start_date {
        query.push(", nearest_start_date = ").push_bind(nearest_start_date);
    }
    if let Some(nearest_finish_date) = patch.nearest_finish_date {
        query.push(", nearest_finish_date = ").push_bind(nearest_finish_date);
    }

    query.push(" WHERE id = ").push_bind(id);
    query.push(" RETURNING ").push(SESSION_COLUMNS);

    let session = query
        .build_query_as::<WritingSession>()
        .fetch_optional(executor)
        .await?;

    Ok(session)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;
    use crate::models::StartAt;
    use chrono::Duration;

    fn params() -> SessionParams {
        SessionParams {
            subject: "essay".to_string(),
            page: 5,
            period: 3,
            start_at: StartAt { hour: 0, minute: 0 },
            writing_hours: 0.5,
        }
    }

    async fn insert(pool: &sqlx::SqlitePool, user_id: &str) -> Result<WritingSession, AppError> {
        let params = params();
        let start = Utc::now() + Duration::hours(1);
        create_session(
            pool,
            &NewWritingSession {
                user_id,
                params: &params,
                start_date: start,
                nearest_finish_date: start + Duration::minutes(30),
                finish_date: start + Duration::minutes(30) + Duration::days(3),
            },
        )
        .await
    }

    #[tokio::test]
    async fn create_starts_on_process_and_inactive() {
        let pool = test_pool().await;
        let session = insert(&pool, "user-1").await.unwrap();

        assert_eq!(session.status, SessionStatus::OnProcess);
        assert!(!session.is_activated);
        assert_eq!(session.nearest_start_date, session.start_date);
        assert_eq!(session.start_at, StartAt { hour: 0, minute: 0 });

        let found = find_on_process_session_by_user(&pool, "user-1").await.unwrap();
        assert_eq!(found.map(|s| s.id), Some(session.id));
    }

    #[tokio::test]
    async fn second_on_process_session_hits_unique_index() {
        let pool = test_pool().await;
        insert(&pool, "user-1").await.unwrap();

        let err = insert(&pool, "user-1").await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        // 다른 사용자는 영향 없음
        assert!(insert(&pool, "user-2").await.is_ok());
    }

    #[tokio::test]
    async fn update_applies_only_patched_fields() {
        let pool = test_pool().await;
        let session = insert(&pool, "user-1").await.unwrap();

        let patch = SessionPatch {
            is_activated: Some(true),
            ..Default::default()
        };
        let updated = update_session(&pool, &session.id, &patch).await.unwrap().unwrap();

        assert!(updated.is_activated);
        assert_eq!(updated.status, SessionStatus::OnProcess);
        assert_eq!(updated.nearest_finish_date, session.nearest_finish_date);
    }

    #[tokio::test]
    async fn completed_session_frees_the_user_slot() {
        let pool = test_pool().await;
        let session = insert(&pool, "user-1").await.unwrap();

        let patch = SessionPatch {
            status: Some(SessionStatus::Completed),
            ..Default::default()
        };
        update_session(&pool, &session.id, &patch).await.unwrap();

        assert!(find_on_process_session_by_user(&pool, "user-1").await.unwrap().is_none());
        assert!(insert(&pool, "user-1").await.is_ok());
    }

    #[tokio::test]
    async fn update_missing_session_returns_none() {
        let pool = test_pool().await;
        let patch = SessionPatch::default();
        assert!(update_session(&pool, "nope", &patch).await.unwrap().is_none());
    }
}

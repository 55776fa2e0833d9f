//! # 글(Writing) 데이터베이스 쿼리 모듈

use chrono::Utc;
use sqlx::SqliteExecutor;

use crate::error::AppError;
use crate::models::Writing;

/// 세션에 글 한 편을 추가합니다.
pub async fn create_writing<'e, E>(
    executor: E,
    writing_session_id: &str,
    title: &str,
    content: &str,
) -> Result<Writing, AppError>
where
    E: SqliteExecutor<'e>,
{
    let writing = sqlx::query_as::<_, Writing>(
        r#"
        INSERT INTO writings (id, writing_session_id, title, content, created_at)
        VALUES (?, ?, ?, ?, ?)
        RETURNING id, writing_session_id, title, content, created_at
        "#,
    )
    .bind(uuid::Uuid::now_v7().to_string())
    .bind(writing_session_id)
    .bind(title)
    .bind(content)
    .bind(Utc::now())
    .fetch_one(executor)
    .await?;

    Ok(writing)
}

/// 세션의 글을 최신순으로 조회합니다.
///
/// 같은 시각에 저장된 글은 UUIDv7 ID 역순으로 정렬되어 나중에 쓴 글이 먼저 옵니다.
pub async fn list_writings_for_session<'e, E>(
    executor: E,
    writing_session_id: &str,
) -> Result<Vec<Writing>, AppError>
where
    E: SqliteExecutor<'e>,
{
    let writings = sqlx::query_as::<_, Writing>(
        r#"
        SELECT id, writing_session_id, title, content, created_at
        FROM writings
        WHERE writing_session_id = ?
        ORDER BY created_at DESC, id DESC
        "#,
    )
    .bind(writing_session_id)
    .fetch_all(executor)
    .await?;

    Ok(writings)
}

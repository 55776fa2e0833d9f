//! # 글(Writing) 모델
//!
//! 글쓰기 세션 동안 사용자가 남긴 글 한 편입니다.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// `writings` 테이블 한 행
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Writing {
    pub id: String,
    /// 이 글이 속한 세션 ID (외래키)
    pub writing_session_id: String,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// 글 작성 요청: `POST /api/v1/writing-sessions/on-process/writings`
#[derive(Debug, Deserialize)]
pub struct CreateWritingRequest {
    pub title: String,
    pub content: String,
}

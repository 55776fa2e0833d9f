//! # 데이터베이스 접근 계층 (Data Access Layer)
//!
//! - `sessions`: 글쓰기 세션 레코드 (Session Record Store)
//! - `triggers`: 재시작 복구용 트리거 (Persistent Trigger Store)
//! - `writings`: 세션에 속한 글

pub mod sessions;
pub mod triggers;
pub mod writings;

pub use sessions::*;
pub use triggers::*;
pub use writings::*;

/// 마이그레이션이 적용된 인메모리 SQLite 풀
///
/// 인메모리 DB는 연결마다 따로 생기므로 연결을 하나로 고정하고,
/// 유휴 연결이 닫혀 데이터가 사라지지 않도록 수명 제한을 끕니다.
#[cfg(test)]
pub async fn test_pool() -> sqlx::SqlitePool {
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    sqlx::migrate!("./migrations").run(&pool).await.unwrap();
    pool
}

//! # 미들웨어 모듈
//!
//! - `auth`: `Authorization: Bearer <token>` 헤더에서 사용자를 꺼내는 extractor

pub mod auth;

//! # 서비스 계층
//!
//! 여러 DB 쿼리와 스케줄러 호출을 묶는 비즈니스 로직입니다.
//! - `writing_sessions`: 세션 생성, 진행 중 세션 조회, 글 추가

pub mod writing_sessions;

//! # 데이터 모델 모듈
//!
//! - `session`: 글쓰기 세션과 생성 요청, 부분 수정 구조체
//! - `trigger`: 재시작 후 복구되는 반복 트리거
//! - `writing`: 세션에 속한 글
//!
//! 하위 모듈의 공개 항목을 재공개하여 `crate::models::WritingSession`처럼 씁니다.

pub mod session;
pub mod trigger;
pub mod writing;

pub use session::*;
pub use trigger::*;
pub use writing::*;

//! 글쓰기 세션 스케줄러
//!
//! - `window`: 세션 매개변수 → 시작/첫 종료/최종 종료 시각
//! - `expression`: 시각 → 매일 반복 cron 표현식, 표현식 → 다음 실행 시각
//! - `service`: 타이머 등록/취소, 재시작 복구, activate/deactivate 핸들러
//!
//! ```ignore
//! let scheduler = Scheduler::new(pool.clone());
//! scheduler.on_boot().await?;          // 저장된 트리거 복구
//! // ... 세션 생성 시 services::writing_sessions::create_writing_session이 트리거를 저장·무장
//! scheduler.shutdown().await;          // 종료 시 타이머 정리
//! ```

pub mod expression;
pub mod service;
pub mod window;

pub use service::Scheduler;
pub use window::compute_window;

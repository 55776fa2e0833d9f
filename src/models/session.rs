//! # 글쓰기 세션 모델 정의
//!
//! 사용자가 선언한 "매일 반복되는 글쓰기 시간대"를 표현하는 구조체들입니다.
//!
//! ## 세션 흐름
//! ```text
//! 생성 → Pending ─activate→ Active ─deactivate→ Idle ─activate→ Active ...
//!                                              └─(기간 종료)→ Completed
//! ```
//! `Completed`는 종료 상태이며, 레코드를 물리적으로 지우지 않고
//! `status = completed`로만 표시합니다.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::Writing;

/// 세션의 진행 상태: DB에는 "onProcess" / "completed" 문자열로 저장됩니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "camelCase")]
#[sqlx(rename_all = "camelCase")]
pub enum SessionStatus {
    OnProcess,
    Completed,
}

/// 매일 글쓰기를 시작하는 로컬 시각 (시:분)
///
/// 두 값 모두 0이 유효합니다 (자정 = `{ hour: 0, minute: 0 }`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct StartAt {
    #[sqlx(rename = "start_hour")]
    pub hour: u32,
    #[sqlx(rename = "start_minute")]
    pub minute: u32,
}

/// 글쓰기 세션 엔티티: `writing_sessions` 테이블 한 행에 대응합니다.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct WritingSession {
    /// 세션 고유 식별자 (UUIDv7)
    pub id: String,
    /// 세션 소유자 ID (JWT의 `sub`)
    pub user_id: String,
    pub subject: String,
    /// 목표 페이지 수
    pub page: i64,
    /// 세션이 진행되는 일수
    pub period: i64,
    #[sqlx(flatten)]
    pub start_at: StartAt,
    /// 하루 글쓰기 시간 (시간 단위, 소수 허용)
    pub writing_hours: f64,
    pub status: SessionStatus,
    /// 지금 글쓰기 시간대가 열려 있는지
    pub is_activated: bool,
    /// 첫 활성화 시각
    pub start_date: DateTime<Utc>,
    /// 이 시각이 지나면 세션을 완료 처리할 수 있음
    pub finish_date: DateTime<Utc>,
    /// 다음 activate 시각: activate가 실행될 때마다 하루씩 밀립니다.
    pub nearest_start_date: DateTime<Utc>,
    /// 다음 deactivate 시각: deactivate가 실행될 때마다 하루씩 밀립니다.
    pub nearest_finish_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 스케줄러 관점의 세션 단계
///
/// DB에는 `status`와 `is_activated`만 저장되고, 단계는 두 값과
/// `nearest_start_date`로부터 계산합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// 생성 후 아직 한 번도 활성화되지 않음
    Pending,
    /// 오늘의 글쓰기 시간대가 열려 있음
    Active,
    /// 시간대가 닫혀 있고 기간은 남아 있음
    Idle,
    /// 기간이 끝남 (종료 상태)
    Completed,
}

impl WritingSession {
    pub fn phase(&self) -> SessionPhase {
        match (self.status, self.is_activated) {
            (SessionStatus::Completed, _) => SessionPhase::Completed,
            (SessionStatus::OnProcess, true) => SessionPhase::Active,
            (SessionStatus::OnProcess, false) if self.nearest_start_date == self.start_date => {
                SessionPhase::Pending
            }
            (SessionStatus::OnProcess, false) => SessionPhase::Idle,
        }
    }
}

/// 세션 시작 시각 요청: `{ "hour": 0, "minute": 30 }`
///
/// 필드를 `Option`으로 받아 "값이 없음"과 "값이 0"을 구분합니다.
#[derive(Debug, Deserialize)]
pub struct StartAtRequest {
    pub hour: Option<u32>,
    pub minute: Option<u32>,
}

/// 세션 생성 요청: `POST /api/v1/writing-sessions`의 요청 본문
///
/// 값 범위:
/// - `start_at.hour` 0~23, `start_at.minute` 0~59 (0시 0분 허용)
/// - `writing_hours` 0 초과 24 미만. 하루 창이 다음 날 시작 시각과 겹치지 않게 합니다.
/// - `period` 1일 이상, `page` 1 이상
#[derive(Debug, Deserialize)]
pub struct CreateWritingSessionRequest {
    pub subject: Option<String>,
    pub page: Option<i64>,
    pub period: Option<u32>,
    pub start_at: Option<StartAtRequest>,
    pub writing_hours: Option<f64>,
}

/// 필수 항목이 모두 채워진 세션 생성 매개변수
///
/// 값의 범위(시 0~23 등)는 `scheduler::window::compute_window`가 검사합니다.
#[derive(Debug, Clone)]
pub struct SessionParams {
    pub subject: String,
    pub page: i64,
    pub period: u32,
    pub start_at: StartAt,
    pub writing_hours: f64,
}

impl CreateWritingSessionRequest {
    /// 누락된 필드가 있으면 `AppError::Validation`을 반환합니다.
    ///
    /// `Some(0)`은 누락이 아닙니다. 0이 의미 없는 항목(page, period 등)은
    /// 범위 검사에서 따로 걸러집니다.
    pub fn into_params(self) -> Result<SessionParams, AppError> {
        let missing = |field: &str| AppError::Validation(format!("{} is required", field));

        let subject = self
            .subject
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| missing("subject"))?;
        let page = self.page.ok_or_else(|| missing("page"))?;
        let period = self.period.ok_or_else(|| missing("period"))?;
        let writing_hours = self.writing_hours.ok_or_else(|| missing("writing_hours"))?;
        let start_at = self.start_at.ok_or_else(|| missing("start_at"))?;
        let hour = start_at.hour.ok_or_else(|| missing("start_at.hour"))?;
        let minute = start_at.minute.ok_or_else(|| missing("start_at.minute"))?;

        if page <= 0 {
            return Err(AppError::Validation("page must be positive".to_string()));
        }

        Ok(SessionParams {
            subject,
            page,
            period,
            start_at: StartAt { hour, minute },
            writing_hours,
        })
    }
}

/// 세션 부분 수정: 스케줄러 핸들러가 바꾸는 필드만 담습니다.
///
/// `None`인 필드는 UPDATE 문에 포함되지 않습니다.
#[derive(Debug, Default, Clone)]
pub struct SessionPatch {
    pub status: Option<SessionStatus>,
    pub is_activated: Option<bool>,
    pub nearest_start_date: Option<DateTime<Utc>>,
    pub nearest_finish_date: Option<DateTime<Utc>>,
}

/// 진행 중인 세션 조회 응답: 세션 필드에 글 목록(최신순)을 덧붙입니다.
#[derive(Debug, Serialize)]
pub struct OnProcessWritingSession {
    #[serde(flatten)]
    pub session: WritingSession,
    pub phase: SessionPhase,
    pub writings: Vec<Writing>,
}

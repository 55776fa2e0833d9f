//! # 세션 시간대 계산
//!
//! 사용자가 선언한 "매일 몇 시부터 몇 시간, 며칠 동안"을
//! 실제 날짜(절대 시각)로 바꾸는 순수 함수입니다.
//!
//! ```text
//! start_date          = 오늘(또는 이미 지났으면 내일) hour:minute:00
//! nearest_finish_date = start_date + writing_hours
//! finish_date         = nearest_finish_date + period 일
//! ```
//! 시각은 서버 프로세스의 로컬 시간대 기준입니다.

use chrono::{DateTime, Duration, Local, NaiveDate, TimeZone, Utc};

use crate::error::AppError;
use crate::models::StartAt;

/// 하루 글쓰기 시간의 상한 (시간). 창이 다음 날 시작 시각을 넘지 않아야 합니다.
const MAX_WRITING_HOURS: f64 = 24.0;

/// 계산된 세션 날짜
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionWindow {
    /// 첫 활성화 시각 (항상 `now`보다 미래)
    pub start_date: DateTime<Utc>,
    /// 첫날 글쓰기가 끝나는 시각
    pub nearest_finish_date: DateTime<Utc>,
    /// 세션 전체가 끝나는 시각
    pub finish_date: DateTime<Utc>,
}

/// 세션 매개변수와 현재 시각으로 세션 날짜를 계산합니다.
///
/// `now`를 인자로 받기 때문에 같은 입력이면 항상 같은 결과가 나옵니다.
///
/// # 에러
/// 시·분이 범위를 벗어나거나, `writing_hours`가 (0, 24) 밖이거나,
/// `period`가 0이면 `AppError::Validation`을 반환합니다.
/// 0시 0분은 유효한 입력입니다.
pub fn compute_window(
    start_at: StartAt,
    writing_hours: f64,
    period: u32,
    now: DateTime<Local>,
) -> Result<SessionWindow, AppError> {
    if start_at.hour > 23 {
        return Err(AppError::Validation("start_at.hour must be 0-23".to_string()));
    }
    if start_at.minute > 59 {
        return Err(AppError::Validation("start_at.minute must be 0-59".to_string()));
    }
    if !writing_hours.is_finite() || writing_hours <= 0.0 || writing_hours >= MAX_WRITING_HOURS {
        return Err(AppError::Validation(
            "writing_hours must be greater than 0 and less than 24".to_string(),
        ));
    }
    if period == 0 {
        return Err(AppError::Validation("period must be at least 1 day".to_string()));
    }

    // 오늘 hour:minute:00, 이미 지났거나 정확히 지금이면 다음 날
    let mut date = now.date_naive();
    let mut start = local_time_on(date, start_at)?;
    while start <= now {
        date = date
            .succ_opt()
            .ok_or_else(|| AppError::Internal("date overflow".to_string()))?;
        start = local_time_on(date, start_at)?;
    }

    let writing = Duration::milliseconds((writing_hours * 3_600_000.0).round() as i64);
    let nearest_finish = start + writing;
    let finish = nearest_finish + Duration::days(i64::from(period));

    Ok(SessionWindow {
        start_date: start.with_timezone(&Utc),
        nearest_finish_date: nearest_finish.with_timezone(&Utc),
        finish_date: finish.with_timezone(&Utc),
    })
}

/// 해당 날짜의 로컬 hour:minute:00
///
/// 서머타임 전환으로 그 시각이 두 번 있으면 앞의 것을, 없으면(건너뛴 구간)
/// 한 시간 뒤를 씁니다.
fn local_time_on(date: NaiveDate, start_at: StartAt) -> Result<DateTime<Local>, AppError> {
    let naive = date
        .and_hms_opt(start_at.hour, start_at.minute, 0)
        .ok_or_else(|| AppError::Validation("invalid start_at".to_string()))?;

    Local
        .from_local_datetime(&naive)
        .earliest()
        .or_else(|| Local.from_local_datetime(&(naive + Duration::hours(1))).earliest())
        .ok_or_else(|| AppError::Internal(format!("unrepresentable local time {}", naive)))
}

//! # 트리거 표현식
//!
//! 절대 시각을 "매일 이 시각에 실행"이라는 cron 표현식으로 바꾸고,
//! 저장된 표현식에서 다음 실행 시각을 계산합니다.
//!
//! 형식은 `cron` 크레이트의 6필드(초 분 시 일 월 요일)입니다.
//! 날짜 부분은 버리고 시각(로컬 시간대)만 남기므로 트리거는 매일 반복됩니다.
//! 세션이 끝나면 반복을 멈추는 것은 스케줄러의 몫입니다.

use std::str::FromStr;

use chrono::{DateTime, Local, TimeZone, Timelike};
use cron::Schedule;

use crate::error::AppError;

/// 절대 시각을 매일 반복 표현식으로 바꿉니다.
///
/// 같은 시각(시:분:초)이면 날짜와 상관없이 같은 문자열이 나옵니다.
pub fn encode_daily<Tz: TimeZone>(instant: &DateTime<Tz>) -> String {
    let local = instant.with_timezone(&Local);
    format!("{} {} {} * * *", local.second(), local.minute(), local.hour())
}

/// 저장된 표현식을 해석합니다.
pub fn parse(expression: &str) -> Result<Schedule, AppError> {
    Schedule::from_str(expression)
        .map_err(|e| AppError::InvalidExpression(format!("{}: {}", expression, e)))
}

/// `after` 이후(같은 시각 제외) 첫 실행 시각
pub fn next_fire(schedule: &Schedule, after: &DateTime<Local>) -> Option<DateTime<Local>> {
    schedule.after(after).next()
}

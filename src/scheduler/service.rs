//! # 세션 라이프사이클 스케줄러
//!
//! 트리거마다 백그라운드 타이머 태스크 하나를 띄우고, 시각이 되면
//! activate/deactivate 핸들러를 별도 태스크로 실행합니다.
//!
//! ## 구성
//! - `timers`: 트리거 이름 → 취소 핸들(oneshot). 메모리에 "무장된" 타이머 목록입니다.
//! - `cron_tasks` 테이블: 재시작 후 `on_boot()`가 읽어 타이머를 다시 만듭니다.
//! - `session_locks`: 같은 세션의 핸들러가 겹치지 않도록 세션별로 직렬화합니다.
//!
//! ## 완료 처리
//! 트리거는 매일 반복되므로 스스로 끝나지 않습니다. deactivate가 실행될 때마다
//! `now + 1분 > finish_date`를 확인하고, 지났으면 세션을 `completed`로 바꾸고
//! 트리거를 DB와 메모리에서 모두 지웁니다.
//!
//! 상태 변경과 트리거 삭제는 한 트랜잭션입니다. 그래도 완료된 세션의 트리거가
//! 남아 있다가 실행되면, 핸들러는 세션을 건드리지 않고 남은 트리거만 정리합니다.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Local, Timelike, Utc};
use cron::Schedule;
use sqlx::SqlitePool;
use tokio::sync::{oneshot, RwLock};
use tracing::{debug, error, info, warn};

use crate::db;
use crate::error::AppError;
use crate::models::{
    SessionPatch, SessionPhase, SessionStatus, Trigger, TriggerKind, WritingSession,
};
use crate::scheduler::expression;
use crate::sync::KeyedLocks;

/// 완료 판정 여유 시간. deactivate가 finish_date 직전에 실행돼도 마지막 날로 인정합니다.
const COMPLETION_GRACE_MINUTES: i64 = 1;

/// 세션 트리거를 관리하는 스케줄러
///
/// `main()`에서 한 번 만들어 `AppState`로 공유하고, 종료 시 `shutdown()`을 호출합니다.
/// 내부는 `Arc`로 감싸져 있어 clone해도 같은 타이머 목록을 가리킵니다.
#[derive(Clone)]
pub struct Scheduler {
    inner: Arc<SchedulerInner>,
}

struct SchedulerInner {
    pool: SqlitePool,
    timers: RwLock<HashMap<String, oneshot::Sender<()>>>,
    session_locks: KeyedLocks,
}

impl Scheduler {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            inner: Arc::new(SchedulerInner {
                pool,
                timers: RwLock::new(HashMap::new()),
                session_locks: KeyedLocks::new(),
            }),
        }
    }

    /// 세션의 activate/deactivate 트리거 쌍을 만듭니다 (저장은 호출자 몫).
    ///
    /// activate는 `start_date`의 시각, deactivate는 `finish_date`의 시각에 매일 실행됩니다.
    pub fn triggers_for(session: &WritingSession) -> [Trigger; 2] {
        [
            Trigger::new(
                &session.user_id,
                &session.id,
                TriggerKind::Activate,
                expression::encode_daily(&session.start_date),
            ),
            Trigger::new(
                &session.user_id,
                &session.id,
                TriggerKind::Deactivate,
                expression::encode_daily(&session.finish_date),
            ),
        ]
    }

    /// 프로세스 시작 시 저장된 트리거를 모두 다시 무장합니다.
    ///
    /// 세션 날짜로 표현식을 다시 계산하지 않고 저장된 표현식을 그대로 씁니다.
    /// 무장된 타이머 개수를 반환합니다.
    pub async fn on_boot(&self) -> Result<usize, AppError> {
        let triggers = db::find_all_triggers(&self.inner.pool).await?;
        info!(count = triggers.len(), "Re-arming persisted cron tasks");
        Ok(self.arm(&triggers).await)
    }

    /// 이미 저장된 트리거들에 대해 메모리 타이머를 켭니다.
    ///
    /// 표현식이나 이름이 잘못된 트리거는 로그만 남기고 건너뜁니다.
    /// 같은 이름의 타이머가 이미 있으면 기존 타이머를 취소하고 교체합니다.
    pub async fn arm(&self, triggers: &[Trigger]) -> usize {
        let mut armed = 0;
        for trigger in triggers {
            match self.arm_one(trigger).await {
                Ok(()) => armed += 1,
                Err(e) => error!(trigger = %trigger.name, error = %e, "Failed to arm trigger"),
            }
        }
        armed
    }

    async fn arm_one(&self, trigger: &Trigger) -> Result<(), AppError> {
        let schedule = expression::parse(&trigger.expression)?;
        let session_id = trigger
            .session_id()
            .ok_or_else(|| AppError::InvalidExpression(format!("bad trigger name {}", trigger.name)))?
            .to_string();

        let (cancel_tx, mut cancel_rx) = oneshot::channel::<()>();
        {
            let mut timers = self.inner.timers.write().await;
            if let Some(previous) = timers.insert(trigger.name.clone(), cancel_tx) {
                let _ = previous.send(());
            }
        }

        let name = trigger.name.clone();
        let kind = trigger.kind;
        let scheduler = self.clone();

        debug!(trigger = %name, expression = %trigger.expression, "Timer armed");

        tokio::spawn(async move {
            let mut last_fired = None;
            loop {
                let now = Local::now();
                let Some(next) = next_boundary(&schedule, now, last_fired) else {
                    warn!(trigger = %name, "Expression has no upcoming fire time");
                    break;
                };
                let delay = (next - now).to_std().unwrap_or(StdDuration::ZERO);

                tokio::select! {
                    _ = tokio::time::sleep(delay) => {
                        last_fired = Some(next);
                        // 핸들러는 별도 태스크에서 실행. DB I/O가 타이머 루프를 막으면 안 됨
                        scheduler.dispatch(kind, session_id.clone(), name.clone());
                    }
                    // 취소 신호를 받았거나 송신자가 버려졌으면 종료
                    _ = &mut cancel_rx => {
                        debug!(trigger = %name, "Timer cancelled");
                        break;
                    }
                }
            }
        });

        Ok(())
    }

    /// 타이머가 울렸을 때 핸들러를 실행합니다.
    ///
    /// 핸들러가 실패해도 타이머는 그대로 두어 다음 날 다시 실행되게 합니다.
    fn dispatch(&self, kind: TriggerKind, session_id: String, name: String) {
        let scheduler = self.clone();
        tokio::spawn(async move {
            let result = match kind {
                TriggerKind::Activate => scheduler.activate(&session_id).await,
                TriggerKind::Deactivate => scheduler.deactivate(&session_id).await,
            };
            if let Err(e) = result {
                error!(
                    trigger = %name,
                    session_id = %session_id,
                    error = %e,
                    "Scheduled transition failed; timer stays armed"
                );
            }
        });
    }

    /// 글쓰기 시간대를 엽니다.
    ///
    /// `is_activated = true`, `nearest_start_date = 지금 + 1일`(초 이하 버림).
    /// 세션이 없거나 이미 완료됐으면 아무것도 하지 않습니다.
    pub async fn activate(&self, session_id: &str) -> Result<(), AppError> {
        let lock = self.inner.session_locks.get(session_id);
        let _guard = lock.lock().await;

        let Some(session) = self.live_session(session_id).await? else {
            return Ok(());
        };

        let patch = SessionPatch {
            is_activated: Some(true),
            nearest_start_date: Some(next_day_anchor(Utc::now())),
            ..Default::default()
        };
        db::update_session(&self.inner.pool, &session.id, &patch).await?;

        info!(session_id = %session.id, from = ?session.phase(), "Writing session activated");
        Ok(())
    }

    /// 글쓰기 시간대를 닫고, 전체 기간이 지났으면 세션을 완료 처리합니다.
    ///
    /// `is_activated = false`, `nearest_finish_date = 지금 + 1일`(초 이하 버림).
    /// 세션이 없거나 이미 완료됐으면 아무것도 하지 않습니다.
    pub async fn deactivate(&self, session_id: &str) -> Result<(), AppError> {
        let completed = {
            let lock = self.inner.session_locks.get(session_id);
            let _guard = lock.lock().await;
            self.deactivate_locked(session_id).await?
        };

        if completed {
            self.inner.session_locks.remove(session_id);
        }
        Ok(())
    }

    /// 세션 락을 잡은 상태에서 실행됩니다. 세션이 완료되면 `true`.
    async fn deactivate_locked(&self, session_id: &str) -> Result<bool, AppError> {
        let Some(session) = self.live_session(session_id).await? else {
            return Ok(false);
        };

        let patch = SessionPatch {
            is_activated: Some(false),
            nearest_finish_date: Some(next_day_anchor(Utc::now())),
            ..Default::default()
        };
        let Some(session) = db::update_session(&self.inner.pool, &session.id, &patch).await? else {
            return Ok(false);
        };

        if Utc::now() + Duration::minutes(COMPLETION_GRACE_MINUTES) > session.finish_date {
            self.complete(&session).await?;
            return Ok(true);
        }

        debug!(session_id = %session.id, "Writing session deactivated");
        Ok(false)
    }

    /// 세션의 트리거를 모두 취소합니다 (DB 행 삭제 + 메모리 타이머 취소).
    ///
    /// 세션 상태는 바꾸지 않습니다. 반환값은 DB에서 지운 트리거 개수입니다.
    pub async fn cancel(&self, session_id: &str) -> Result<u64, AppError> {
        let session = db::find_session_by_id(&self.inner.pool, session_id)
            .await?
            .ok_or(AppError::NotFound)?;

        let prefix = Trigger::session_prefix(&session.user_id, &session.id);
        let deleted = db::delete_triggers_by_prefix(&self.inner.pool, &prefix).await?;
        self.cancel_timers(&prefix).await;

        Ok(deleted)
    }

    /// 주어진 트리거의 메모리 타이머만 끕니다. 저장된 행은 건드리지 않습니다.
    pub async fn disarm(&self, triggers: &[Trigger]) {
        let mut timers = self.inner.timers.write().await;
        for trigger in triggers {
            if let Some(cancel) = timers.remove(&trigger.name) {
                let _ = cancel.send(());
            }
        }
    }

    /// 메모리에 무장된 트리거 이름 목록 (이름순)
    pub async fn armed_names(&self) -> Vec<String> {
        let timers = self.inner.timers.read().await;
        let mut names: Vec<String> = timers.keys().cloned().collect();
        names.sort();
        names
    }

    /// 모든 타이머를 취소합니다. 저장된 트리거는 남겨 두어 다음 부팅 때 복구됩니다.
    pub async fn shutdown(&self) {
        let mut timers = self.inner.timers.write().await;
        let count = timers.len();
        for (_, cancel) in timers.drain() {
            let _ = cancel.send(());
        }
        info!(count, "Scheduler stopped");
    }

    /// 핸들러가 손댈 수 있는 세션을 찾습니다.
    ///
    /// 없으면 `None`. 완료된 세션이면 남아 있는 트리거를 정리하고 `None`을 반환합니다.
    async fn live_session(&self, session_id: &str) -> Result<Option<WritingSession>, AppError> {
        let Some(session) = db::find_session_by_id(&self.inner.pool, session_id).await? else {
            warn!(session_id = %session_id, "Trigger fired for unknown session; ignoring");
            return Ok(None);
        };

        if session.phase() == SessionPhase::Completed {
            debug!(session_id = %session_id, "Trigger fired for completed session; cleaning up");
            self.cancel(&session.id).await?;
            return Ok(None);
        }

        Ok(Some(session))
    }

    /// 세션을 `completed`로 바꾸고 트리거를 같은 트랜잭션에서 지운 뒤 타이머를 끕니다.
    async fn complete(&self, session: &WritingSession) -> Result<(), AppError> {
        let prefix = Trigger::session_prefix(&session.user_id, &session.id);

        let mut tx = self.inner.pool.begin().await?;
        let patch = SessionPatch {
            status: Some(SessionStatus::Completed),
            ..Default::default()
        };
        db::update_session(&mut *tx, &session.id, &patch).await?;
        let deleted = db::delete_triggers_by_prefix(&mut *tx, &prefix).await?;
        tx.commit().await?;

        self.cancel_timers(&prefix).await;

        info!(session_id = %session.id, triggers = deleted, "Writing session completed");
        Ok(())
    }

    async fn cancel_timers(&self, prefix: &str) {
        let mut timers = self.inner.timers.write().await;
        let names: Vec<String> = timers
            .keys()
            .filter(|name| name.starts_with(prefix))
            .cloned()
            .collect();
        for name in names {
            if let Some(cancel) = timers.remove(&name) {
                let _ = cancel.send(());
            }
        }
    }
}

/// 다음에 실행할 시각
///
/// sleep은 단조 시계, 표현식은 벽시계 기준이라 실행 직후 벽시계가 뒤로 밀리면
/// 방금 실행한 시각이 다시 나올 수 있습니다. `last_fired` 이전 시각은 건너뜁니다.
fn next_boundary(
    schedule: &Schedule,
    now: DateTime<Local>,
    last_fired: Option<DateTime<Local>>,
) -> Option<DateTime<Local>> {
    let from = match last_fired {
        Some(fired) if fired > now => fired,
        _ => now,
    };
    expression::next_fire(schedule, &from)
}

/// 하루 뒤 같은 분(초와 나노초는 0)
fn next_day_anchor(now: DateTime<Utc>) -> DateTime<Utc> {
    let next = now + Duration::days(1);
    next.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{test_pool, NewWritingSession};
    use crate::models::{SessionParams, StartAt};
    use chrono::TimeZone;

    fn params() -> SessionParams {
        SessionParams {
            subject: "novel".to_string(),
            page: 10,
            period: 3,
            start_at: StartAt { hour: 6, minute: 0 },
            writing_hours: 2.0,
        }
    }

    /// 지정한 날짜로 세션을 만들고 트리거 쌍을 저장·무장합니다.
    async fn seed(
        pool: &SqlitePool,
        scheduler: &Scheduler,
        user_id: &str,
        nearest_finish_date: DateTime<Utc>,
        finish_date: DateTime<Utc>,
    ) -> WritingSession {
        let params = params();
        let session = db::create_session(
            pool,
            &NewWritingSession {
                user_id,
                params: &params,
                start_date: nearest_finish_date - Duration::hours(2),
                nearest_finish_date,
                finish_date,
            },
        )
        .await
        .unwrap();

        let triggers = Scheduler::triggers_for(&session);
        db::create_triggers(pool, &triggers).await.unwrap();
        assert_eq!(scheduler.arm(&triggers).await, 2);
        session
    }

    async fn trigger_names(pool: &SqlitePool) -> Vec<String> {
        db::find_all_triggers(pool)
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.name)
            .collect()
    }

    #[test]
    fn trigger_pair_uses_start_and_finish_time_of_day() {
        let now = Utc::now();
        let session = WritingSession {
            id: "s1".to_string(),
            user_id: "u1".to_string(),
            subject: String::new(),
            page: 1,
            period: 1,
            start_at: StartAt { hour: 9, minute: 0 },
            writing_hours: 1.0,
            status: SessionStatus::OnProcess,
            is_activated: false,
            start_date: now,
            finish_date: now + Duration::hours(1) + Duration::days(1),
            nearest_start_date: now,
            nearest_finish_date: now + Duration::hours(1),
            created_at: now,
            updated_at: now,
        };

        let [activate, deactivate] = Scheduler::triggers_for(&session);
        assert_eq!(activate.name, "u1/s1/activate");
        assert_eq!(activate.expression, expression::encode_daily(&session.start_date));
        assert_eq!(deactivate.name, "u1/s1/deactivate");
        assert_eq!(deactivate.expression, expression::encode_daily(&session.finish_date));
    }

    #[tokio::test]
    async fn activate_opens_window_and_advances_nearest_start() {
        let pool = test_pool().await;
        let scheduler = Scheduler::new(pool.clone());
        let now = Utc::now();
        let session = seed(&pool, &scheduler, "u1", now, now + Duration::days(3)).await;
        assert_eq!(session.phase(), SessionPhase::Pending);

        scheduler.activate(&session.id).await.unwrap();

        let updated = db::find_session_by_id(&pool, &session.id).await.unwrap().unwrap();
        assert!(updated.is_activated);
        assert_eq!(updated.phase(), SessionPhase::Active);
        assert_eq!(updated.status, SessionStatus::OnProcess);
        assert_eq!(updated.nearest_start_date.second(), 0);
        assert!(updated.nearest_start_date > now + Duration::hours(23));
        // activate는 새 트리거를 만들지 않음
        assert_eq!(trigger_names(&pool).await.len(), 2);
    }

    #[tokio::test]
    async fn deactivate_before_finish_keeps_session_and_triggers() {
        let pool = test_pool().await;
        let scheduler = Scheduler::new(pool.clone());
        let now = Utc::now();
        let session = seed(&pool, &scheduler, "u1", now, now + Duration::days(2)).await;

        scheduler.activate(&session.id).await.unwrap();
        scheduler.deactivate(&session.id).await.unwrap();

        let updated = db::find_session_by_id(&pool, &session.id).await.unwrap().unwrap();
        assert!(!updated.is_activated);
        assert_eq!(updated.phase(), SessionPhase::Idle);
        assert_eq!(updated.status, SessionStatus::OnProcess);
        assert!(updated.nearest_finish_date > now + Duration::hours(23));

        assert_eq!(trigger_names(&pool).await.len(), 2);
        assert_eq!(scheduler.armed_names().await.len(), 2);
    }

    #[tokio::test]
    async fn deactivate_after_finish_completes_and_purges() {
        let pool = test_pool().await;
        let scheduler = Scheduler::new(pool.clone());
        let now = Utc::now();
        let finished = seed(
            &pool,
            &scheduler,
            "u1",
            now - Duration::hours(1),
            now - Duration::seconds(30),
        )
        .await;
        // 같은 사용자의 다른(이미 끝난 세션과 무관한) 트리거는 남아야 함
        let other = seed(&pool, &scheduler, "u2", now, now + Duration::days(2)).await;

        scheduler.activate(&finished.id).await.unwrap();
        scheduler.deactivate(&finished.id).await.unwrap();

        let updated = db::find_session_by_id(&pool, &finished.id).await.unwrap().unwrap();
        assert_eq!(updated.status, SessionStatus::Completed);
        assert!(!updated.is_activated);

        let expected = vec![
            format!("u2/{}/activate", other.id),
            format!("u2/{}/deactivate", other.id),
        ];
        assert_eq!(trigger_names(&pool).await, expected);
        assert_eq!(scheduler.armed_names().await, expected);
    }

    #[tokio::test]
    async fn grace_minute_counts_as_finished() {
        let pool = test_pool().await;
        let scheduler = Scheduler::new(pool.clone());
        let now = Utc::now();
        // finish_date가 30초 뒤여도 now + 1분을 넘으므로 완료
        let session = seed(
            &pool,
            &scheduler,
            "u1",
            now - Duration::hours(1),
            now + Duration::seconds(30),
        )
        .await;

        scheduler.deactivate(&session.id).await.unwrap();

        let updated = db::find_session_by_id(&pool, &session.id).await.unwrap().unwrap();
        assert_eq!(updated.status, SessionStatus::Completed);
        assert!(scheduler.armed_names().await.is_empty());
    }

    #[tokio::test]
    async fn handlers_on_missing_session_are_noops() {
        let pool = test_pool().await;
        let scheduler = Scheduler::new(pool);

        assert!(scheduler.activate("does-not-exist").await.is_ok());
        assert!(scheduler.deactivate("does-not-exist").await.is_ok());
    }

    #[tokio::test]
    async fn handlers_on_completed_session_change_nothing() {
        let pool = test_pool().await;
        let scheduler = Scheduler::new(pool.clone());
        let now = Utc::now();
        let session = seed(
            &pool,
            &scheduler,
            "u1",
            now - Duration::hours(1),
            now - Duration::minutes(5),
        )
        .await;
        scheduler.deactivate(&session.id).await.unwrap();
        let completed = db::find_session_by_id(&pool, &session.id).await.unwrap().unwrap();

        scheduler.activate(&session.id).await.unwrap();
        scheduler.deactivate(&session.id).await.unwrap();

        let after = db::find_session_by_id(&pool, &session.id).await.unwrap().unwrap();
        assert_eq!(after.status, SessionStatus::Completed);
        assert!(!after.is_activated);
        assert_eq!(after.updated_at, completed.updated_at);
    }

    #[tokio::test]
    async fn stale_trigger_of_completed_session_is_cleaned_on_fire() {
        let pool = test_pool().await;
        let scheduler = Scheduler::new(pool.clone());
        let now = Utc::now();
        let session = seed(&pool, &scheduler, "u1", now, now + Duration::days(1)).await;

        // 상태만 완료로 바뀌고 트리거 삭제 전에 죽은 상황
        let patch = SessionPatch {
            status: Some(SessionStatus::Completed),
            ..Default::default()
        };
        db::update_session(&pool, &session.id, &patch).await.unwrap();

        scheduler.activate(&session.id).await.unwrap();

        assert!(trigger_names(&pool).await.is_empty());
        assert!(scheduler.armed_names().await.is_empty());
    }

    #[tokio::test]
    async fn on_boot_rearms_every_persisted_trigger_verbatim() {
        let pool = test_pool().await;
        let before_restart = Scheduler::new(pool.clone());
        let now = Utc::now();
        seed(&pool, &before_restart, "u1", now, now + Duration::days(2)).await;
        seed(&pool, &before_restart, "u2", now, now + Duration::days(5)).await;
        let persisted = db::find_all_triggers(&pool).await.unwrap();
        before_restart.shutdown().await;
        assert!(before_restart.armed_names().await.is_empty());

        let after_restart = Scheduler::new(pool.clone());
        let armed = after_restart.on_boot().await.unwrap();

        assert_eq!(armed, 4);
        let names: Vec<String> = persisted.iter().map(|t| t.name.clone()).collect();
        assert_eq!(after_restart.armed_names().await, names);
        assert_eq!(db::find_all_triggers(&pool).await.unwrap(), persisted);
    }

    #[tokio::test]
    async fn invalid_persisted_trigger_is_skipped_on_boot() {
        let pool = test_pool().await;
        let broken = Trigger {
            name: "u1/s1/activate".to_string(),
            kind: TriggerKind::Activate,
            expression: "every day at nine".to_string(),
        };
        let fine = Trigger::new("u1", "s1", TriggerKind::Deactivate, "0 0 11 * * *".into());
        db::create_triggers(&pool, &[broken, fine]).await.unwrap();

        let scheduler = Scheduler::new(pool);
        assert_eq!(scheduler.on_boot().await.unwrap(), 1);
        assert_eq!(scheduler.armed_names().await, vec!["u1/s1/deactivate"]);
    }

    #[tokio::test]
    async fn rearming_same_name_replaces_the_timer() {
        let pool = test_pool().await;
        let scheduler = Scheduler::new(pool);
        let trigger = Trigger::new("u1", "s1", TriggerKind::Activate, "0 0 9 * * *".into());

        scheduler.arm(&[trigger.clone()]).await;
        scheduler.arm(&[trigger]).await;

        assert_eq!(scheduler.armed_names().await, vec!["u1/s1/activate"]);
    }

    #[tokio::test]
    async fn cancel_removes_rows_and_timers() {
        let pool = test_pool().await;
        let scheduler = Scheduler::new(pool.clone());
        let now = Utc::now();
        let session = seed(&pool, &scheduler, "u1", now, now + Duration::days(2)).await;

        assert_eq!(scheduler.cancel(&session.id).await.unwrap(), 2);
        assert!(trigger_names(&pool).await.is_empty());
        assert!(scheduler.armed_names().await.is_empty());

        assert!(matches!(scheduler.cancel("missing").await, Err(AppError::NotFound)));
    }

    /// 지금부터 약 2초 뒤(초 단위 절삭)에 울리는 표현식
    fn in_two_seconds() -> String {
        expression::encode_daily(&(Local::now() + Duration::seconds(2)))
    }

    #[tokio::test]
    async fn armed_trigger_fires_its_kind_for_its_session() {
        let pool = test_pool().await;
        let scheduler = Scheduler::new(pool.clone());
        let now = Utc::now();
        let session = db::create_session(
            &pool,
            &NewWritingSession {
                user_id: "u1",
                params: &params(),
                start_date: now + Duration::hours(1),
                nearest_finish_date: now + Duration::hours(2),
                finish_date: now + Duration::days(2),
            },
        )
        .await
        .unwrap();

        let trigger = Trigger::new("u1", &session.id, TriggerKind::Activate, in_two_seconds());
        assert_eq!(scheduler.arm(&[trigger.clone()]).await, 1);

        tokio::time::sleep(StdDuration::from_millis(3500)).await;

        let after = db::find_session_by_id(&pool, &session.id).await.unwrap().unwrap();
        assert!(after.is_activated);
        assert_eq!(after.phase(), SessionPhase::Active);
        // 매일 반복이므로 실행 후에도 무장 상태
        assert_eq!(scheduler.armed_names().await, vec![trigger.name]);
    }

    #[tokio::test]
    async fn failing_handler_leaves_timer_armed() {
        let pool = test_pool().await;
        let scheduler = Scheduler::new(pool.clone());
        let trigger = Trigger::new("u1", "s1", TriggerKind::Deactivate, in_two_seconds());
        assert_eq!(scheduler.arm(&[trigger.clone()]).await, 1);

        // 저장소가 죽은 상태에서 타이머가 울림
        pool.close().await;
        tokio::time::sleep(StdDuration::from_millis(3500)).await;

        assert_eq!(scheduler.armed_names().await, vec![trigger.name]);
    }

    #[test]
    fn clock_stepped_back_does_not_refire_the_same_boundary() {
        let schedule = expression::parse("0 0 9 * * *").unwrap();
        let fired = Local.with_ymd_and_hms(2026, 1, 10, 9, 0, 0).unwrap();
        let stepped_back = fired - Duration::milliseconds(500);

        // 기록이 없으면 방금 울린 시각이 다시 나옴
        assert_eq!(next_boundary(&schedule, stepped_back, None), Some(fired));

        let next = next_boundary(&schedule, stepped_back, Some(fired)).unwrap();
        assert_eq!(next, fired + Duration::days(1));
    }

    #[test]
    fn last_fired_in_the_past_does_not_hold_back_the_schedule() {
        let schedule = expression::parse("0 0 9 * * *").unwrap();
        let fired = Local.with_ymd_and_hms(2026, 1, 10, 9, 0, 0).unwrap();
        let next_morning = fired + Duration::hours(23);

        assert_eq!(
            next_boundary(&schedule, next_morning, Some(fired)),
            Some(fired + Duration::days(1))
        );
    }

    #[tokio::test]
    async fn disarm_stops_timers_but_keeps_rows() {
        let pool = test_pool().await;
        let scheduler = Scheduler::new(pool.clone());
        let now = Utc::now();
        let session = seed(&pool, &scheduler, "u1", now, now + Duration::days(2)).await;

        scheduler.disarm(&Scheduler::triggers_for(&session)).await;

        assert!(scheduler.armed_names().await.is_empty());
        assert_eq!(trigger_names(&pool).await.len(), 2);
    }

    #[test]
    fn anchor_is_one_day_later_on_the_minute() {
        let now = Utc::now();
        let anchor = next_day_anchor(now);
        assert_eq!(anchor.second(), 0);
        assert_eq!(anchor.nanosecond(), 0);
        assert!(anchor > now + Duration::hours(23));
        assert!(anchor <= now + Duration::days(1));
    }
}

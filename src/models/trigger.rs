//! # 트리거 모델
//!
//! 트리거는 "이 세션을 매일 몇 시에 열고/닫아라"라는 반복 규칙 한 건입니다.
//! `cron_tasks` 테이블에 저장되어 프로세스가 재시작되어도 다시 등록됩니다.
//!
//! 이름 형식은 `{user_id}/{session_id}/{kind}`입니다. 이름이 곧 식별자이고,
//! 한 세션의 트리거는 모두 `{user_id}/{session_id}/` 접두사를 공유합니다.

use serde::{Deserialize, Serialize};

/// 트리거가 실행할 전이 종류: DB에는 "activate" / "deactivate"로 저장
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum TriggerKind {
    Activate,
    Deactivate,
}

impl TriggerKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TriggerKind::Activate => "activate",
            TriggerKind::Deactivate => "deactivate",
        }
    }
}

impl std::fmt::Display for TriggerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `cron_tasks` 테이블 한 행
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Trigger {
    pub name: String,
    pub kind: TriggerKind,
    /// 매일 반복되는 cron 표현식 (예: "0 30 9 * * *")
    pub expression: String,
}

impl Trigger {
    pub fn new(user_id: &str, session_id: &str, kind: TriggerKind, expression: String) -> Self {
        Self {
            name: format!("{}{}", Self::session_prefix(user_id, session_id), kind),
            kind,
            expression,
        }
    }

    /// 한 세션의 모든 트리거가 공유하는 이름 접두사
    pub fn session_prefix(user_id: &str, session_id: &str) -> String {
        format!("{}/{}/", user_id, session_id)
    }

    /// 이름에서 세션 ID를 꺼냅니다. 형식이 맞지 않으면 `None`.
    ///
    /// 사용자 ID는 토큰의 `sub` 그대로라 `/`가 들어 있을 수 있으므로
    /// 종류와 세션 ID를 뒤에서부터 떼어 냅니다.
    pub fn session_id(&self) -> Option<&str> {
        let mut parts = self.name.rsplitn(3, '/');
        let _kind = parts.next().filter(|s| !s.is_empty())?;
        let session = parts.next().filter(|s| !s.is_empty())?;
        let _user = parts.next().filter(|s| !s.is_empty())?;
        Some(session)
    }
}

//! # 트리거 저장소 (cron_tasks 테이블)
//!
//! 아직 끝나지 않은 세션의 반복 트리거를 보관합니다.
//! 프로세스가 재시작되면 스케줄러가 `find_all_triggers`로 읽어
//! 타이머를 다시 등록하므로, 이 테이블이 복구의 기준(source of truth)입니다.

use sqlx::{QueryBuilder, Sqlite, SqliteExecutor};

use crate::error::AppError;
use crate::models::Trigger;

/// 트리거 여러 개를 하나의 INSERT 문으로 저장합니다.
///
/// 한 문장이므로 전부 저장되거나 하나도 저장되지 않습니다.
/// activate/deactivate 쌍 중 하나만 남는 일이 없어야 합니다.
pub async fn create_triggers<'e, E>(executor: E, triggers: &[Trigger]) -> Result<(), AppError>
where
    E: SqliteExecutor<'e>,
{
    if triggers.is_empty() {
        return Ok(());
    }

    let mut query: QueryBuilder<Sqlite> =
        QueryBuilder::new("INSERT INTO cron_tasks (name, kind, expression) ");
    query.push_values(triggers, |mut row, trigger| {
        row.push_bind(&trigger.name)
            .push_bind(trigger.kind)
            .push_bind(&trigger.expression);
    });

    query.build().execute(executor).await?;
    Ok(())
}

/// 저장된 트리거 전체를 이름순으로 조회합니다.
pub async fn find_all_triggers<'e, E>(executor: E) -> Result<Vec<Trigger>, AppError>
where
    E: SqliteExecutor<'e>,
{
    let triggers = sqlx::query_as::<_, Trigger>(
        r#"
        SELECT name, kind, expression
        FROM cron_tasks
        ORDER BY name
        "#,
    )
    .fetch_all(executor)
    .await?;

    Ok(triggers)
}

/// 이름이 `prefix`로 시작하는 트리거를 모두 지우고 삭제된 개수를 반환합니다.
///
/// LIKE 대신 `substr`로 비교합니다. ID에 `%`나 `_`가 섞여도 와일드카드로 해석되지 않습니다.
pub async fn delete_triggers_by_prefix<'e, E>(executor: E, prefix: &str) -> Result<u64, AppError>
where
    E: SqliteExecutor<'e>,
{
    let result = sqlx::query("DELETE FROM cron_tasks WHERE substr(name, 1, length(?)) = ?")
        .bind(prefix)
        .bind(prefix)
        .execute(executor)
        .await?;

    Ok(result.rows_affected())
}

//! 세션 ID별 비동기 락

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;

/// 키마다 따로 잠기는 비동기 뮤텍스 모음
///
/// 같은 세션에 대한 activate/deactivate는 순서대로 실행되고,
/// 서로 다른 세션은 동시에 진행됩니다.
#[derive(Clone, Default)]
pub struct KeyedLocks {
    locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

impl KeyedLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// 키에 해당하는 락을 가져오거나 새로 만듭니다.
    pub fn get(&self, key: &str) -> Arc<Mutex<()>> {
        self.locks
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// 더 이상 쓰지 않을 키(완료된 세션)의 락을 지웁니다.
    ///
    /// 다른 곳에서 아직 락을 들고 있으면(strong_count > 1) 남겨 둡니다.
    pub fn remove(&self, key: &str) {
        self.locks.remove_if(key, |_, lock| Arc::strong_count(lock) == 1);
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.locks.len()
    }
}

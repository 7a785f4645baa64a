//! Scheduler port - waiting between poll attempts.

use async_trait::async_trait;
use std::time::Duration;

/// Scheduler は指定時間だけ呼び出し側を待たせる
///
/// # テスト容易性
/// - TaskPoller は直接 sleep しない
/// - テストでは即座に返り、要求された delay を記録する実装を使う
#[async_trait]
pub trait Scheduler: Send + Sync {
    async fn delay(&self, duration: Duration);
}

/// Tokio timer backed scheduler.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioScheduler;

#[async_trait]
impl Scheduler for TokioScheduler {
    async fn delay(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

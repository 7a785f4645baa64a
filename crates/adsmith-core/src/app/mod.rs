//! App - orchestration layer
//!
//! ports と adapters を組み合わせて生成ワークフローを構成します。
//!
//! # Components
//! - **OrchestratorBuilder**: 配線と起動時チェック
//! - **RequestOrchestrator**: 検証 → submit → polling → fallback → commit
//! - **TaskPoller**: バックグラウンドタスクの polling 状態機械
//! - **HistoryStore**: `HistoryStorage` 上の media ごとの上限つき履歴
//! - **fallback**: primary が使えないときのプレースホルダー結果
//! - **GenerationStamps**: 古い結果の抑止

pub mod builder;
pub mod fallback;
pub mod history;
pub mod orchestrator;
pub mod poller;
pub mod stamps;

pub use self::builder::{BuildError, OrchestratorBuilder};
pub use self::history::{HistoryCapacity, HistoryStore};
pub use self::orchestrator::{GenerationStatus, RequestOrchestrator};
pub use self::poller::{PollOutcome, PollProgress, TaskPoller};
pub use self::stamps::GenerationStamps;

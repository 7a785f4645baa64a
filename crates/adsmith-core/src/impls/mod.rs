//! Impls - port implementations that live in the core crate.
//!
//! - **FileHistoryStorage**: JSON ファイル、アトミックに置き換え
//! - **InMemoryHistoryStorage**: テスト用

pub mod file_history;
pub mod inmem_history;

pub use self::file_history::FileHistoryStorage;
pub use self::inmem_history::InMemoryHistoryStorage;

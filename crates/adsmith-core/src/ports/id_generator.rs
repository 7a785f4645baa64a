//! IdGenerator port - ID の生成
//!
//! # 実装
//! - **UlidGenerator**: `Clock` の時刻を使った単調増加 ULID

use std::sync::Mutex;
use std::time::SystemTime;

use ulid::{Generator, Ulid};

use crate::domain::ids::{ArtifactId, RequestId};
use crate::ports::Clock;

/// IdGenerator は ID を払い出す
///
/// 同じクロック tick 内で何度呼ばれても、同じ ID を二度返してはならない。
pub trait IdGenerator: Send + Sync {
    fn artifact_id(&self) -> ArtifactId;

    fn request_id(&self) -> RequestId;
}

/// UlidGenerator produces monotonic ULIDs.
///
/// The timestamp part comes from the injected `Clock`; within the same
/// millisecond the random part is incremented, so IDs stay unique and sorted.
pub struct UlidGenerator<C> {
    clock: C,
    inner: Mutex<Generator>,
}

impl<C: Clock> UlidGenerator<C> {
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            inner: Mutex::new(Generator::new()),
        }
    }

    fn next(&self) -> Ulid {
        let now = self.clock.now();
        let mut generator = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        match generator.generate_from_datetime(SystemTime::from(now)) {
            Ok(ulid) => ulid,
            Err(_) => {
                // Random part overflowed within one millisecond.
                tracing::debug!("ulid overflow, falling back to fresh random ulid");
                Ulid::from_parts(now.timestamp_millis().max(0) as u64, rand::random())
            }
        }
    }
}

impl<C: Clock> IdGenerator for UlidGenerator<C> {
    fn artifact_id(&self) -> ArtifactId {
        ArtifactId::from(self.next())
    }

    fn request_id(&self) -> RequestId {
        RequestId::from(self.next())
    }
}

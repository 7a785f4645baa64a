//! GenerationStamps - 古い結果の抑止
//!
//! 並行するリクエスト間の調整はこのカウンタの比較だけです。

use std::sync::atomic::{AtomicU64, Ordering};

use crate::domain::MediaClass;

/// One monotonically increasing counter per media class.
///
/// A request takes a stamp when it starts; its outcome is applied only if
/// the stamp is still the latest for that media class.
#[derive(Debug, Default)]
pub struct GenerationStamps {
    image: AtomicU64,
    video: AtomicU64,
}

impl GenerationStamps {
    pub fn new() -> Self {
        Self::default()
    }

    fn counter(&self, media: MediaClass) -> &AtomicU64 {
        match media {
            MediaClass::Image => &self.image,
            MediaClass::Video => &self.video,
        }
    }

    /// Starts a new generation and returns its stamp.
    pub fn advance(&self, media: MediaClass) -> u64 {
        self.counter(media).fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn current(&self, media: MediaClass) -> u64 {
        self.counter(media).load(Ordering::SeqCst)
    }

    pub fn is_current(&self, media: MediaClass, stamp: u64) -> bool {
        self.current(media) == stamp
    }
}

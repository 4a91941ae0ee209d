//! Shared helpers for unit and integration tests.

use std::sync::atomic::{AtomicI64, Ordering};

use bulletin_proto::{Bulletin, BulletinType, TxEnvelope};

use crate::ports::outbound::TimeSource;

/// A hand-cranked clock for deterministic TTL behavior in tests.
#[derive(Debug)]
pub struct ManualTimeSource {
    now: AtomicI64,
}

impl ManualTimeSource {
    pub fn new(now: i64) -> Self {
        Self {
            now: AtomicI64::new(now),
        }
    }

    pub fn advance(&self, secs: i64) {
        self.now.fetch_add(secs, Ordering::SeqCst);
    }

    pub fn set(&self, now: i64) {
        self.now.store(now, Ordering::SeqCst);
    }
}

impl TimeSource for ManualTimeSource {
    fn now(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// A fresh BLOG creation on `topic` with the standard test identity and
/// an expiry of 1_700_003_600.
pub fn creation(topic: &[u8], timestamp: i64) -> Bulletin {
    Bulletin {
        bulletin_type: BulletinType::Blog,
        topic: topic.to_vec(),
        timestamp,
        duration: 1_700_003_600,
        old_sn: Vec::new(),
        from: test_address(),
        content_type: "My Blog".to_string(),
        content_list: vec![vec![1, 2]],
        censored_start: 0,
        censored_end: 0,
    }
}

/// The standard test author.
pub fn test_address() -> [u8; 20] {
    [
        0x06, 0xC1, 0x4E, 0xD4, 0x69, 0xFB, 0x93, 0x54, 0x5C, 0xBF, 0x07, 0x1B, 0x59, 0x3D, 0x8F,
        0x90, 0x19, 0x4E, 0xDE, 0x62,
    ]
}

/// Wrap a bulletin in a minimal envelope (no payment, no auth sections).
pub fn envelope_for(bulletin: &Bulletin) -> TxEnvelope {
    TxEnvelope::assemble(None, bulletin, None, None).expect("test envelope")
}

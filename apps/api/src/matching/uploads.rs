//! Upload supersession — a newer upload from the same uploader invalidates any
//! run still in flight for them. Stale runs check their ticket and bail out.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use uuid::Uuid;

#[derive(Clone, Default)]
pub struct UploadRegistry {
    latest: Arc<Mutex<HashMap<Uuid, u64>>>,
    sequence: Arc<AtomicU64>,
}

impl UploadRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new upload. Anonymous uploads (`None`) can never be superseded.
    pub fn begin(&self, uploader: Option<Uuid>) -> UploadTicket {
        let seq = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(key) = uploader {
            self.lock().insert(key, seq);
        }
        UploadTicket {
            registry: self.clone(),
            uploader,
            seq,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Uuid, u64>> {
        // the map stays consistent even if a holder panicked mid-insert
        self.latest.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    #[cfg(test)]
    fn tracked(&self) -> usize {
        self.lock().len()
    }
}

pub struct UploadTicket {
    registry: UploadRegistry,
    uploader: Option<Uuid>,
    seq: u64,
}

impl UploadTicket {
    pub fn is_current(&self) -> bool {
        match self.uploader {
            None => true,
            Some(key) => self.registry.lock().get(&key) == Some(&self.seq),
        }
    }

    pub fn sequence(&self) -> u64 {
        self.seq
    }
}

impl Drop for UploadTicket {
    fn drop(&mut self) {
        if let Some(key) = self.uploader {
            let mut latest = self.registry.lock();
            if latest.get(&key) == Some(&self.seq) {
                latest.remove(&key);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newer_upload_supersedes_older() {
        let registry = UploadRegistry::new();
        let user = Uuid::new_v4();

        let first = registry.begin(Some(user));
        assert!(first.is_current());

        let second = registry.begin(Some(user));
        assert!(!first.is_current());
        assert!(second.is_current());
        assert!(second.sequence() > first.sequence());
    }

    #[test]
    fn test_uploaders_are_independent() {
        let registry = UploadRegistry::new();
        let alice = registry.begin(Some(Uuid::new_v4()));
        let _bob = registry.begin(Some(Uuid::new_v4()));
        assert!(alice.is_current());
    }

    #[test]
    fn test_anonymous_uploads_are_never_superseded() {
        let registry = UploadRegistry::new();
        let first = registry.begin(None);
        let _second = registry.begin(None);
        assert!(first.is_current());
        assert_eq!(registry.tracked(), 0);
    }

    #[test]
    fn test_dropping_stale_ticket_keeps_newer_entry() {
        let registry = UploadRegistry::new();
        let user = Uuid::new_v4();
        let first = registry.begin(Some(user));
        let second = registry.begin(Some(user));

        drop(first);
        assert!(second.is_current());
        assert_eq!(registry.tracked(), 1);

        drop(second);
        assert_eq!(registry.tracked(), 0);
    }
}

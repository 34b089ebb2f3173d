use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::OwnedMutexGuard;
use uuid::Uuid;

/// One async lock per owner so publishing an owner's bundle is single-writer.
/// Different owners never contend.
#[derive(Default)]
pub struct OwnerLocks {
    inner: Mutex<HashMap<Uuid, Arc<tokio::sync::Mutex<()>>>>,
}

impl OwnerLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, owner_id: &Uuid) -> OwnedMutexGuard<()> {
        let lock = {
            let mut map = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
            // Only the map holds an idle lock; holders and waiters keep a clone.
            map.retain(|_, lock| Arc::strong_count(lock) > 1);
            Arc::clone(map.entry(*owner_id).or_default())
        };
        lock.lock_owned().await
    }

    #[cfg(test)]
    fn tracked_owners(&self) -> usize {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

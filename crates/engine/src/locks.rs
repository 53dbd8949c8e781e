use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use tokio::sync::OwnedMutexGuard;

/// One async mutex per owner.
///
/// Holding the guard serializes the read, reconcile and write cycle of an
/// owner; owners never wait on each other.
#[derive(Debug, Default)]
pub(crate) struct OwnerLocks {
    inner: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl OwnerLocks {
    pub(crate) async fn acquire(&self, owner_id: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut map = self.inner.lock().unwrap_or_else(|e| e.into_inner());
            // held or awaited locks have clones outside the map
            map.retain(|_, lock| Arc::strong_count(lock) > 1);
            map.entry(owner_id.to_string()).or_default().clone()
        };
        lock.lock_owned().await
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn same_owner_waits() {
        let locks = Arc::new(OwnerLocks::default());
        let guard = locks.acquire("alice").await;

        let other = Arc::clone(&locks);
        let waiter = tokio::spawn(async move {
            let _guard = other.acquire("alice").await;
        });
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        // a different owner is not blocked
        let _bob = locks.acquire("bob").await;

        drop(guard);
        waiter.await.unwrap();
    }

    #[tokio::test]
    async fn idle_owners_are_dropped() {
        let locks = OwnerLocks::default();
        for owner in ["alice", "bob", "carol"] {
            drop(locks.acquire(owner).await);
        }
        let held = locks.acquire("dave").await;
        assert_eq!(locks.len(), 1);

        let _alice = locks.acquire("alice").await;
        assert_eq!(locks.len(), 2);
        drop(held);
    }
}

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

/// Per-user write gate for derived streak state.
///
/// At most one save per key is in flight at a time, so concurrent requests
/// (two tabs, a double submit) serialize instead of racing the
/// `current_streak`/`best_streak`/`last_active_date` columns.
#[derive(Clone, Default)]
pub struct SaveLocks {
    locks: Arc<Mutex<HashMap<Uuid, Arc<Mutex<()>>>>>,
}

impl SaveLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for the key's gate; the gate is held until the guard drops.
    pub async fn acquire(&self, key: Uuid) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            locks.entry(key).or_default().clone()
        };
        lock.lock_owned().await
    }

    /// Drop gates nobody is holding (call from a background task).
    pub async fn cleanup(&self) {
        let mut locks = self.locks.lock().await;
        locks.retain(|_, lock| Arc::strong_count(lock) > 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;

    #[tokio::test]
    async fn same_key_serializes() {
        let locks = SaveLocks::new();
        let key = Uuid::from_u128(7);

        let held = locks.acquire(key).await;
        let blocked = timeout(Duration::from_millis(50), locks.acquire(key)).await;
        assert!(blocked.is_err(), "second acquire should wait for the first");

        drop(held);
        let unblocked = timeout(Duration::from_millis(50), locks.acquire(key)).await;
        assert!(unblocked.is_ok(), "gate should open once the guard drops");
    }

    #[tokio::test]
    async fn different_keys_are_independent() {
        let locks = SaveLocks::new();
        let _held = locks.acquire(Uuid::from_u128(1)).await;

        let other = timeout(Duration::from_millis(50), locks.acquire(Uuid::from_u128(2))).await;
        assert!(other.is_ok(), "unrelated key should not block");
    }

    #[tokio::test]
    async fn cleanup_drops_idle_gates_but_keeps_held_ones() {
        let locks = SaveLocks::new();
        let held = locks.acquire(Uuid::from_u128(1)).await;
        drop(locks.acquire(Uuid::from_u128(2)).await);

        locks.cleanup().await;
        assert_eq!(locks.locks.lock().await.len(), 1);

        drop(held);
        locks.cleanup().await;
        assert!(locks.locks.lock().await.is_empty());
    }
}

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::debug;

/// In-process named locks gating re-seeds.
///
/// Complements the PostgreSQL advisory lock taken inside the replace
/// transactions: this one covers the whole run (member upserts included)
/// for seeds started from the same process.
#[derive(Default)]
pub struct NamedLocks {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl NamedLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for and hold the lock called `name` until the guard is dropped
    pub async fn acquire(&self, name: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            // Entries only the map holds have no owner and no waiter
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            locks
                .entry(name.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        debug!("Waiting for seed lock {}", name);
        lock.lock_owned().await
    }

    /// Names currently tracked, held or not yet pruned
    pub async fn len(&self) -> usize {
        self.locks.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_name_is_exclusive() {
        let locks = Arc::new(NamedLocks::new());
        let guard = locks.acquire("seed:family:garcia").await;

        let contender = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let _guard = locks.acquire("seed:family:garcia").await;
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!contender.is_finished());

        drop(guard);
        contender.await.unwrap();
    }

    #[tokio::test]
    async fn test_different_names_do_not_block() {
        let locks = NamedLocks::new();
        let _garcia = locks.acquire("seed:family:garcia").await;
        let _lopez = tokio::time::timeout(Duration::from_millis(100), locks.acquire("seed:family:lopez"))
            .await
            .expect("distinct lock names must not contend");
    }

    #[tokio::test]
    async fn test_released_names_are_pruned() {
        let locks = NamedLocks::new();
        for slug in ["garcia", "lopez", "rossi", "chen", "okafor"] {
            let _guard = locks.acquire(&format!("seed:family:{}", slug)).await;
        }
        // Only the last released name lingers until the next acquire
        assert_eq!(locks.len().await, 1);

        let garcia = locks.acquire("seed:family:garcia").await;
        let tokens = locks.acquire("seed:tokens").await;
        assert_eq!(locks.len().await, 2);

        drop(garcia);
        drop(tokens);
        let _again = locks.acquire("seed:tokens").await;
        assert_eq!(locks.len().await, 1);
    }
}

//! Per-child mutual exclusion.
//!
//! Every write that reads a child's balance and then writes to the ledger or
//! the purchase table runs while holding that child's lock. Different
//! children never contend. Batches lock in ascending id order so two
//! overlapping batches cannot wait on each other.

use std::{collections::HashMap, sync::Arc, time::Duration};

use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::{EngineError, ResultEngine};

#[derive(Clone, Debug, Default)]
pub(crate) struct ChildLocks {
    inner: Arc<Mutex<HashMap<i64, Arc<Mutex<()>>>>>,
}

/// Held locks; released on drop.
#[derive(Debug)]
pub(crate) struct ChildGuards {
    child_ids: Vec<i64>,
    _guards: Vec<OwnedMutexGuard<()>>,
}

impl ChildGuards {
    pub(crate) fn child_ids(&self) -> &[i64] {
        &self.child_ids
    }
}

impl ChildLocks {
    async fn slot(&self, child_id: i64) -> Arc<Mutex<()>> {
        let mut slots = self.inner.lock().await;
        slots
            .entry(child_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Locks every child in `child_ids` (deduplicated, ascending).
    ///
    /// Waiting is bounded by `timeout` for the whole set; running out of time
    /// yields [`EngineError::Conflict`] and releases whatever was taken.
    pub(crate) async fn acquire(
        &self,
        child_ids: &[i64],
        timeout: Duration,
    ) -> ResultEngine<ChildGuards> {
        let mut ids = child_ids.to_vec();
        ids.sort_unstable();
        ids.dedup();

        let deadline = tokio::time::Instant::now() + timeout;
        let mut guards = Vec::with_capacity(ids.len());
        for &child_id in &ids {
            let slot = self.slot(child_id).await;
            match tokio::time::timeout_at(deadline, slot.lock_owned()).await {
                Ok(guard) => guards.push(guard),
                Err(_) => {
                    return Err(EngineError::Conflict(format!(
                        "child {child_id} is busy, lock not acquired within {}ms",
                        timeout.as_millis()
                    )));
                }
            }
        }
        tracing::debug!(child_ids = ?ids, "child locks acquired");

        Ok(ChildGuards {
            child_ids: ids,
            _guards: guards,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn same_child_times_out_while_held() {
        let locks = ChildLocks::default();
        let held = locks.acquire(&[1], Duration::from_millis(50)).await.unwrap();

        let err = locks
            .acquire(&[1], Duration::from_millis(20))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Conflict(_)));

        drop(held);
        assert!(locks.acquire(&[1], Duration::from_millis(20)).await.is_ok());
    }

    #[tokio::test]
    async fn different_children_do_not_block() {
        let locks = ChildLocks::default();
        let _one = locks.acquire(&[1], Duration::from_millis(50)).await.unwrap();
        assert!(locks.acquire(&[2], Duration::from_millis(20)).await.is_ok());
    }

    #[tokio::test]
    async fn batch_ids_are_sorted_and_deduplicated() {
        let locks = ChildLocks::default();
        let guards = locks
            .acquire(&[3, 1, 3, 2], Duration::from_millis(50))
            .await
            .unwrap();
        assert_eq!(guards.child_ids(), &[1, 2, 3]);
    }
}

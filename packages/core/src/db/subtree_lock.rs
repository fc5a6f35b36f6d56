//! Subtree claims for the in-memory store
//!
//! A claim covers a page and everything below it. Two claims overlap when
//! one claimed root is an ancestor-or-self of the other; overlapping claims
//! are granted one after the other, disjoint ones side by side.
//!
//! Ancestor chains are recomputed on every attempt while holding the claim
//! table, so a reparent that committed just before the attempt is seen.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

use super::error::{StoreError, StoreResult};

/// Root id plus the ids of all its ancestors
#[derive(Debug, Clone)]
pub(crate) struct ClaimedRoot {
    pub root: String,
    pub chain: HashSet<String>,
}

impl ClaimedRoot {
    fn overlaps(&self, other: &ClaimedRoot) -> bool {
        self.chain.contains(&other.root) || other.chain.contains(&self.root)
    }
}

#[derive(Debug, Default)]
struct ClaimTable {
    next_id: u64,
    active: HashMap<u64, Vec<ClaimedRoot>>,
}

#[derive(Debug, Default)]
pub(crate) struct SubtreeLocks {
    table: Mutex<ClaimTable>,
    released: Notify,
}

impl SubtreeLocks {
    /// Wait for and take a claim on `roots`.
    ///
    /// `resolve` maps the requested roots to their ancestor chains against
    /// the current committed tree.
    pub async fn acquire<F>(
        self: &Arc<Self>,
        roots: &[&str],
        resolve: F,
    ) -> StoreResult<SubtreeClaim>
    where
        F: Fn(&[&str]) -> StoreResult<Vec<ClaimedRoot>>,
    {
        if roots.is_empty() {
            return Ok(SubtreeClaim {
                locks: None,
                claim_id: 0,
            });
        }

        loop {
            // Registered before checking so a release in between is not missed
            let released = self.released.notified();
            {
                let mut table = self.table.lock().map_err(|_| StoreError::Poisoned)?;
                let wanted = resolve(roots)?;
                let blocked = table
                    .active
                    .values()
                    .flatten()
                    .any(|held| wanted.iter().any(|want| want.overlaps(held)));

                if !blocked {
                    table.next_id += 1;
                    let claim_id = table.next_id;
                    table.active.insert(claim_id, wanted);
                    return Ok(SubtreeClaim {
                        locks: Some(Arc::clone(self)),
                        claim_id,
                    });
                }
            }
            tracing::trace!("Subtree claim on {:?} waiting for overlapping transaction", roots);
            released.await;
        }
    }

    fn release(&self, claim_id: u64) {
        let mut table = self
            .table
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        table.active.remove(&claim_id);
        drop(table);
        self.released.notify_waiters();
    }

    #[cfg(test)]
    fn active_claims(&self) -> usize {
        self.table.lock().map(|t| t.active.len()).unwrap_or(0)
    }
}

/// Held claim; released on drop
#[derive(Debug)]
pub(crate) struct SubtreeClaim {
    locks: Option<Arc<SubtreeLocks>>,
    claim_id: u64,
}

impl Drop for SubtreeClaim {
    fn drop(&mut self) {
        if let Some(locks) = self.locks.take() {
            locks.release(self.claim_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    /// Tree: a -> b -> c, and a separate root x
    fn resolve(roots: &[&str]) -> StoreResult<Vec<ClaimedRoot>> {
        let parents: HashMap<&str, &str> = [("b", "a"), ("c", "b")].into_iter().collect();
        Ok(roots
            .iter()
            .map(|root| {
                let mut chain = HashSet::new();
                let mut current = Some(*root);
                while let Some(id) = current {
                    chain.insert(id.to_string());
                    current = parents.get(id).copied();
                }
                ClaimedRoot {
                    root: root.to_string(),
                    chain,
                }
            })
            .collect())
    }

    #[tokio::test]
    async fn test_disjoint_claims_do_not_wait() {
        let locks = Arc::new(SubtreeLocks::default());

        let first = locks.acquire(&["c"], resolve).await.unwrap();
        let second = tokio::time::timeout(Duration::from_millis(100), locks.acquire(&["x"], resolve))
            .await
            .expect("disjoint claim must not block")
            .unwrap();

        assert_eq!(locks.active_claims(), 2);
        drop(first);
        drop(second);
        assert_eq!(locks.active_claims(), 0);
    }

    #[tokio::test]
    async fn test_descendant_claim_waits_for_ancestor() {
        let locks = Arc::new(SubtreeLocks::default());
        let ancestor = locks.acquire(&["a"], resolve).await.unwrap();

        let blocked =
            tokio::time::timeout(Duration::from_millis(50), locks.acquire(&["c"], resolve)).await;
        assert!(blocked.is_err(), "claim below a held root must wait");

        let waiter = {
            let locks = Arc::clone(&locks);
            tokio::spawn(async move { locks.acquire(&["c"], resolve).await.map(|_| ()) })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        drop(ancestor);

        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("waiter should be woken on release")
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_ancestor_claim_waits_for_descendant() {
        let locks = Arc::new(SubtreeLocks::default());
        let _descendant = locks.acquire(&["b"], resolve).await.unwrap();

        let blocked =
            tokio::time::timeout(Duration::from_millis(50), locks.acquire(&["a"], resolve)).await;
        assert!(blocked.is_err());
    }

    #[tokio::test]
    async fn test_empty_claim_never_blocks() {
        let locks = Arc::new(SubtreeLocks::default());
        let _all = locks.acquire(&["a"], resolve).await.unwrap();

        let free = locks.acquire(&[], resolve).await.unwrap();
        drop(free);
        assert_eq!(locks.active_claims(), 1);
    }
}

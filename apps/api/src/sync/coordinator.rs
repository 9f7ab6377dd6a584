//! Optimistic mutation protocol shared by every client collection.
//!
//! `mutate` snapshots the collection, installs `apply(snapshot)`, awaits
//! `persist()`, then either folds the server's answer back in (`reconcile`)
//! or reinstalls the snapshot verbatim. Mutations on one coordinator are
//! serialized through an async gate, so a slow persist can never land after
//! a later one and a rollback never clobbers a newer change.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::sync::error::PersistError;

/// A record held in a client collection.
pub trait Entity: Clone + Send + Sync + 'static {
    fn id(&self) -> Uuid;
}

/// One server-bound change to a collection.
#[async_trait]
pub trait Mutation<T: Entity>: Send + Sync {
    /// What `persist` hands back, typically the canonical server record.
    type Output: Send;

    /// Short description for logs.
    fn label(&self) -> String;

    /// Pure local transform. An error here aborts the mutation before
    /// anything is installed or sent.
    fn apply(&self, items: &[T]) -> Result<Vec<T>, PersistError>;

    async fn persist(&self) -> Result<Self::Output, PersistError>;

    /// Folds the persisted result into the applied collection.
    fn reconcile(&self, _items: &mut Vec<T>, _output: &Self::Output) {}

    /// Called after the original collection has been reinstalled.
    fn on_failure(&self, _original: &[T], _error: &PersistError) {}
}

pub struct Coordinator<T> {
    items: RwLock<Vec<T>>,
    version: AtomicU64,
    gate: Mutex<()>,
}

impl<T: Entity> Default for Coordinator<T> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl<T: Entity> Coordinator<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items: RwLock::new(items),
            version: AtomicU64::new(0),
            gate: Mutex::new(()),
        }
    }

    /// Copy of the collection as currently installed, including any
    /// in-flight optimistic change.
    pub fn snapshot(&self) -> Vec<T> {
        self.read().clone()
    }

    pub fn get(&self, id: Uuid) -> Option<T> {
        self.read().iter().find(|item| item.id() == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Bumped every time a new collection is installed, rollbacks included.
    pub fn version(&self) -> u64 {
        self.version.load(Ordering::Acquire)
    }

    /// Installs a freshly loaded collection. Waits for any in-flight
    /// mutation to settle first.
    pub async fn replace_all(&self, items: Vec<T>) {
        let _gate = self.gate.lock().await;
        self.install(items);
    }

    /// Runs one mutation end to end. The returned future must be driven to
    /// completion: dropping it while `persist` is pending leaves the applied
    /// collection installed with no rollback.
    pub async fn mutate<M>(&self, mutation: &M) -> Result<M::Output, PersistError>
    where
        M: Mutation<T>,
    {
        let _gate = self.gate.lock().await;
        let label = mutation.label();

        let original = self.snapshot();
        let applied = mutation.apply(&original)?;
        self.install(applied);

        match mutation.persist().await {
            Ok(output) => {
                {
                    let mut items = self.write();
                    mutation.reconcile(&mut items, &output);
                }
                self.version.fetch_add(1, Ordering::AcqRel);
                debug!(mutation = %label, "Persisted");
                Ok(output)
            }
            Err(err) => {
                warn!(mutation = %label, "Persist failed, rolling back: {err}");
                self.install(original.clone());
                mutation.on_failure(&original, &err);
                Err(err)
            }
        }
    }

    fn install(&self, items: Vec<T>) {
        *self.write() = items;
        self.version.fetch_add(1, Ordering::AcqRel);
    }

    // A panic inside apply/reconcile must not wedge the collection.
    fn read(&self) -> RwLockReadGuard<'_, Vec<T>> {
        self.items.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<T>> {
        self.items.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Replaces the record with `id` in place, keeping its position. Returns
/// `false` when no record matches.
pub fn supersede<T: Entity>(items: &mut [T], id: Uuid, record: T) -> bool {
    match items.iter_mut().find(|item| item.id() == id) {
        Some(slot) => {
            *slot = record;
            true
        }
        None => false,
    }
}

/// Index of the record with `id`, or `UnknownEntity`.
pub fn position_of<T: Entity>(items: &[T], id: Uuid) -> Result<usize, PersistError> {
    items
        .iter()
        .position(|item| item.id() == id)
        .ok_or(PersistError::UnknownEntity(id))
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicBool;
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Item {
        id: Uuid,
        label: String,
    }

    impl Entity for Item {
        fn id(&self) -> Uuid {
            self.id
        }
    }

    fn items(n: usize) -> Vec<Item> {
        (1..=n)
            .map(|i| Item {
                id: Uuid::new_v4(),
                label: format!("item {i}"),
            })
            .collect()
    }

    struct Delete {
        id: Uuid,
        fail: bool,
        delay: Duration,
        saw_original: AtomicBool,
    }

    impl Delete {
        fn new(id: Uuid, fail: bool) -> Self {
            Self {
                id,
                fail,
                delay: Duration::ZERO,
                saw_original: AtomicBool::new(false),
            }
        }
    }

    #[async_trait]
    impl Mutation<Item> for Delete {
        type Output = ();

        fn label(&self) -> String {
            format!("delete {}", self.id)
        }

        fn apply(&self, items: &[Item]) -> Result<Vec<Item>, PersistError> {
            position_of(items, self.id)?;
            Ok(items.iter().filter(|i| i.id != self.id).cloned().collect())
        }

        async fn persist(&self) -> Result<(), PersistError> {
            tokio::time::sleep(self.delay).await;
            if self.fail {
                return Err(PersistError::Network("injected".into()));
            }
            Ok(())
        }

        fn on_failure(&self, original: &[Item], _error: &PersistError) {
            self.saw_original
                .store(original.iter().any(|i| i.id == self.id), Ordering::SeqCst);
        }
    }

    struct Rename {
        id: Uuid,
        label: String,
        server_label: String,
    }

    #[async_trait]
    impl Mutation<Item> for Rename {
        type Output = Item;

        fn label(&self) -> String {
            "rename".into()
        }

        fn apply(&self, items: &[Item]) -> Result<Vec<Item>, PersistError> {
            let mut next = items.to_vec();
            let index = position_of(&next, self.id)?;
            next[index].label = self.label.clone();
            Ok(next)
        }

        async fn persist(&self) -> Result<Item, PersistError> {
            Ok(Item {
                id: self.id,
                label: self.server_label.clone(),
            })
        }

        fn reconcile(&self, items: &mut Vec<Item>, output: &Item) {
            supersede(items, self.id, output.clone());
        }
    }

    #[tokio::test]
    async fn test_successful_delete_keeps_applied_state() {
        let original = items(3);
        let coordinator = Coordinator::new(original.clone());
        coordinator
            .mutate(&Delete::new(original[1].id, false))
            .await
            .unwrap();
        assert_eq!(
            coordinator.snapshot(),
            vec![original[0].clone(), original[2].clone()]
        );
    }

    #[tokio::test]
    async fn test_failed_delete_restores_exact_original() {
        let original = items(3);
        let coordinator = Coordinator::new(original.clone());
        let delete = Delete::new(original[1].id, true);

        let err = coordinator.mutate(&delete).await.unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(coordinator.snapshot(), original);
        assert!(delete.saw_original.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn test_optimistic_state_visible_while_persisting() {
        let original = items(3);
        let coordinator = Arc::new(Coordinator::new(original.clone()));
        let mut delete = Delete::new(original[1].id, true);
        delete.delay = Duration::from_millis(500);

        let task = {
            let coordinator = coordinator.clone();
            tokio::spawn(async move { coordinator.mutate(&delete).await })
        };
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(coordinator.len(), 2);

        assert!(task.await.unwrap().is_err());
        assert_eq!(coordinator.snapshot(), original);
    }

    #[tokio::test]
    async fn test_apply_error_sends_nothing() {
        let original = items(2);
        let coordinator = Coordinator::new(original.clone());
        let before = coordinator.version();
        let err = coordinator
            .mutate(&Delete::new(Uuid::new_v4(), false))
            .await
            .unwrap_err();
        assert!(matches!(err, PersistError::UnknownEntity(_)));
        assert_eq!(coordinator.version(), before);
        assert_eq!(coordinator.snapshot(), original);
    }

    #[tokio::test]
    async fn test_reconcile_supersedes_placeholder() {
        let original = items(2);
        let coordinator = Coordinator::new(original.clone());
        let rename = Rename {
            id: original[0].id,
            label: "draft".into(),
            server_label: "Canonical".into(),
        };
        let output = coordinator.mutate(&rename).await.unwrap();
        assert_eq!(output.label, "Canonical");
        assert_eq!(coordinator.snapshot()[0].label, "Canonical");
        assert_eq!(coordinator.snapshot()[1], original[1]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_mutations_complete_in_issue_order() {
        let original = items(3);
        let coordinator = Arc::new(Coordinator::new(original.clone()));

        let mut slow_failure = Delete::new(original[0].id, true);
        slow_failure.delay = Duration::from_millis(800);
        let fast_success = Delete::new(original[2].id, false);

        let first = {
            let coordinator = coordinator.clone();
            tokio::spawn(async move { coordinator.mutate(&slow_failure).await })
        };
        tokio::task::yield_now().await;
        let second = {
            let coordinator = coordinator.clone();
            tokio::spawn(async move { coordinator.mutate(&fast_success).await })
        };

        assert!(first.await.unwrap().is_err());
        assert!(second.await.unwrap().is_ok());
        // the rollback of the first delete happened before the second applied
        assert_eq!(
            coordinator.snapshot(),
            vec![original[0].clone(), original[1].clone()]
        );
    }
}

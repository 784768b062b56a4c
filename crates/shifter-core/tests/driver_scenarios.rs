use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use shifter_core::{
    BoxError, InMemoryTaskStore, Migration, MigrationDriver, MigrationOutcome, TaskId, TaskStatus,
    TaskStore,
};

/// Migration whose `apply` fails on one specific call number (1-based).
#[derive(Default)]
struct StubMigration {
    fail_on_call: Option<usize>,
    applies: AtomicUsize,
    starts: AtomicUsize,
    commits: AtomicUsize,
    rollbacks: AtomicUsize,
}

#[async_trait]
impl Migration for StubMigration {
    type Payload = u32;

    async fn apply(&self, _payload: &u32) -> Result<(), BoxError> {
        let call = self.applies.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_on_call == Some(call) {
            return Err(format!("call {call} rejected").into());
        }
        Ok(())
    }

    async fn start_transaction(&self) -> Result<(), BoxError> {
        self.starts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn commit_transaction(&self) -> Result<(), BoxError> {
        self.commits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn rollback_transaction(&self) -> Result<(), BoxError> {
        self.rollbacks.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

async fn store_with(n: u32) -> Arc<InMemoryTaskStore<u32>> {
    let store = Arc::new(InMemoryTaskStore::new());
    for i in 0..n {
        store.add(TaskId::from(i), i).await.unwrap();
    }
    store
}

fn load(counter: &AtomicUsize) -> usize {
    counter.load(Ordering::SeqCst)
}

#[tokio::test]
async fn one_at_a_time_commits_every_task() {
    let migration = Arc::new(StubMigration::default());
    let store = store_with(5).await;

    let outcome = MigrationDriver::new(Arc::clone(&migration), Arc::clone(&store))
        .process(1)
        .await
        .unwrap();

    assert!(outcome.is_success());
    assert_eq!(load(&migration.starts), 5);
    assert_eq!(load(&migration.commits), 5);
    assert_eq!(load(&migration.rollbacks), 0);
    assert_eq!(store.counts().await.success, 5);
}

#[tokio::test]
async fn second_apply_failing_rolls_back_first_batch() {
    let migration = Arc::new(StubMigration {
        fail_on_call: Some(2),
        ..Default::default()
    });
    let store = store_with(5).await;

    let outcome = MigrationDriver::new(Arc::clone(&migration), Arc::clone(&store))
        .process(2)
        .await
        .unwrap();

    assert_eq!(load(&migration.applies), 2);
    assert_eq!(load(&migration.rollbacks), 1);
    assert_eq!(load(&migration.commits), 0);
    assert_eq!(store.counts().await.success, 0);

    match outcome {
        MigrationOutcome::RolledBack(failure) => {
            assert_eq!(failure.processed, 0);
            assert_eq!(failure.errors.len(), 1);
            assert_eq!(failure.errors[0].task_id, TaskId::from(1u32));
            assert_eq!(failure.errors[0].error, "call 2 rejected");
        }
        other => panic!("expected rollback, got {other:?}"),
    }
    assert_eq!(
        store.status_of(&TaskId::from(0u32)).await,
        Some(TaskStatus::Pending)
    );
}

#[tokio::test]
async fn empty_store_is_a_clean_no_op() {
    let migration = Arc::new(StubMigration::default());
    let store = store_with(0).await;

    let outcome = MigrationDriver::new(Arc::clone(&migration), store)
        .process(4)
        .await
        .unwrap();

    assert!(outcome.is_success());
    assert_eq!(outcome.processed(), 0);
    assert!(outcome.errors().is_empty());
    assert_eq!(load(&migration.starts), 0);
    assert_eq!(load(&migration.commits), 0);
    assert_eq!(load(&migration.rollbacks), 0);
}

#[tokio::test]
async fn driver_accepts_a_trait_object_store() {
    let migration = Arc::new(StubMigration::default());
    let store: Arc<dyn TaskStore<u32>> = store_with(3).await;

    let outcome = MigrationDriver::new(Arc::clone(&migration), store)
        .process(2)
        .await
        .unwrap();

    assert_eq!(outcome.processed(), 3);
    assert_eq!(load(&migration.commits), 2);
}

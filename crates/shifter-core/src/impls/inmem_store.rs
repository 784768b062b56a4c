//! InMemoryTaskStore - reference TaskStore for tests and demos

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::domain::{StoreError, Task, TaskId, TaskStatus};
use crate::ports::TaskStore;

/// Number of tasks per status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub pending: usize,
    pub failed: usize,
    pub success: usize,
}

impl StatusCounts {
    pub fn total(&self) -> usize {
        self.pending + self.failed + self.success
    }
}

struct InMemoryState<T> {
    /// Tasks in insertion order; `take` walks this front to back.
    tasks: Vec<Task<T>>,
    /// id -> position in `tasks`.
    index: HashMap<TaskId, usize>,
}

impl<T> InMemoryState<T> {
    fn new() -> Self {
        Self {
            tasks: Vec::new(),
            index: HashMap::new(),
        }
    }

    fn counts(&self) -> StatusCounts {
        let mut counts = StatusCounts::default();
        for task in &self.tasks {
            match task.status {
                TaskStatus::Pending => counts.pending += 1,
                TaskStatus::Failed => counts.failed += 1,
                TaskStatus::Success => counts.success += 1,
            }
        }
        counts
    }
}

/// In-memory task store.
///
/// `take` returns takeable tasks in insertion order. `Failed` tasks are
/// handed out again, so a rerun retries them.
pub struct InMemoryTaskStore<T> {
    state: Mutex<InMemoryState<T>>,
}

impl<T> InMemoryTaskStore<T> {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(InMemoryState::new()),
        }
    }

    pub async fn len(&self) -> usize {
        self.state.lock().await.tasks.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.lock().await.tasks.is_empty()
    }

    pub async fn counts(&self) -> StatusCounts {
        self.state.lock().await.counts()
    }

    pub async fn status_of(&self, id: &TaskId) -> Option<TaskStatus> {
        let state = self.state.lock().await;
        state.index.get(id).map(|&pos| state.tasks[pos].status)
    }
}

impl<T: Clone> InMemoryTaskStore<T> {
    pub async fn get(&self, id: &TaskId) -> Option<Task<T>> {
        let state = self.state.lock().await;
        state.index.get(id).map(|&pos| state.tasks[pos].clone())
    }
}

impl<T> Default for InMemoryTaskStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T> TaskStore<T> for InMemoryTaskStore<T>
where
    T: Clone + Send + Sync + 'static,
{
    async fn clear(&self) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        state.tasks.clear();
        state.index.clear();
        Ok(())
    }

    async fn take(&self, n: usize) -> Result<Vec<Task<T>>, StoreError> {
        let state = self.state.lock().await;
        Ok(state
            .tasks
            .iter()
            .filter(|task| task.status.is_takeable())
            .take(n)
            .cloned()
            .collect())
    }

    async fn add(&self, id: TaskId, payload: T) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        if state.index.contains_key(&id) {
            return Err(StoreError::DuplicateTask(id));
        }
        let pos = state.tasks.len();
        state.index.insert(id.clone(), pos);
        state.tasks.push(Task::pending(id, payload));
        Ok(())
    }

    async fn update(&self, id: &TaskId, status: TaskStatus) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        let Some(&pos) = state.index.get(id) else {
            return Err(StoreError::TaskNotFound(id.clone()));
        };
        state.tasks[pos].status = status;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seeded(n: i64) -> InMemoryTaskStore<i64> {
        let store = InMemoryTaskStore::new();
        for i in 0..n {
            store.add(TaskId::from(i), i * 10).await.unwrap();
        }
        store
    }

    #[tokio::test]
    async fn add_inserts_pending_tasks() {
        let store = seeded(3).await;

        let counts = store.counts().await;
        assert_eq!(counts.pending, 3);
        assert_eq!(counts.total(), 3);
        assert_eq!(store.get(&TaskId::from(1)).await.unwrap().payload, 10);
    }

    #[tokio::test]
    async fn add_rejects_duplicate_ids() {
        let store = seeded(1).await;

        let err = store.add(TaskId::from(0), 99).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateTask(id) if id == TaskId::from(0)));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn take_returns_takeable_tasks_in_insertion_order() {
        let store = seeded(5).await;
        store.update(&TaskId::from(0), TaskStatus::Success).await.unwrap();
        store.update(&TaskId::from(2), TaskStatus::Failed).await.unwrap();

        let batch = store.take(3).await.unwrap();
        let ids: Vec<TaskId> = batch.into_iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![TaskId::from(1), TaskId::from(2), TaskId::from(3)]);
    }

    #[tokio::test]
    async fn take_does_not_claim() {
        let store = seeded(2).await;

        let first = store.take(2).await.unwrap();
        let second = store.take(2).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn update_unknown_task_fails() {
        let store = seeded(1).await;

        let err = store
            .update(&TaskId::from("missing"), TaskStatus::Success)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::TaskNotFound(_)));
    }

    #[tokio::test]
    async fn clear_removes_everything() {
        let store = seeded(4).await;
        store.clear().await.unwrap();

        assert!(store.is_empty().await);
        assert!(store.take(10).await.unwrap().is_empty());
        // ids are free again after clear
        store.add(TaskId::from(0), 1).await.unwrap();
        assert_eq!(store.status_of(&TaskId::from(0)).await, Some(TaskStatus::Pending));
    }
}

use std::sync::Arc;

use uuid::Uuid;
use validator::Validate;

use crate::error::AppError;
use crate::models::{Task, TaskFilter, TaskInput, TaskQuery, UpdateTaskRequest};
use crate::store::TaskStore;

/// Task CRUD, always scoped to the calling owner.
///
/// A task owned by someone else is reported exactly like a missing one.
#[derive(Clone)]
pub struct TaskLedger {
    store: Arc<dyn TaskStore>,
}

fn not_found() -> AppError {
    AppError::NotFound("Task not found".into())
}

impl TaskLedger {
    pub fn new(store: Arc<dyn TaskStore>) -> Self {
        Self { store }
    }

    pub async fn create(&self, owner_id: Uuid, mut input: TaskInput) -> Result<Task, AppError> {
        input.description = input.description.trim().to_string();
        input.validate()?;
        self.store.insert_task(&Task::new(input, owner_id)).await
    }

    pub async fn list(&self, owner_id: Uuid, query: TaskQuery) -> Result<Vec<Task>, AppError> {
        let filter = TaskFilter::try_from(query)?;
        self.store.list_tasks(owner_id, &filter).await
    }

    pub async fn get(&self, owner_id: Uuid, id: Uuid) -> Result<Task, AppError> {
        self.store.find_task(id, owner_id).await?.ok_or_else(not_found)
    }

    pub async fn update(
        &self,
        owner_id: Uuid,
        id: Uuid,
        mut changes: UpdateTaskRequest,
    ) -> Result<Task, AppError> {
        changes.description = changes.description.map(|d| d.trim().to_string());
        changes.validate()?;

        let mut task = self.get(owner_id, id).await?;
        task.apply(&changes);
        self.store.update_task(&task).await?.ok_or_else(not_found)
    }

    pub async fn delete(&self, owner_id: Uuid, id: Uuid) -> Result<Task, AppError> {
        self.store.delete_task(id, owner_id).await?.ok_or_else(not_found)
    }
}

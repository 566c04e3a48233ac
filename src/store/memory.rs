use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::{TaskStore, UserStore};
use crate::error::AppError;
use crate::models::{SortDirection, SortField, Task, TaskFilter, User};

struct UserRecord {
    user: User,
    avatar: Option<Vec<u8>>,
    tokens: Vec<String>,
}

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, UserRecord>,
    /// Insertion order doubles as the tie-breaker for equal sort keys.
    tasks: Vec<Task>,
}

/// Process-local store with the same semantics as `PgStore`.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, Tables> {
        self.tables.read().unwrap_or_else(|poisoned| {
            log::error!("MemoryStore lock poisoned on read; recovering");
            poisoned.into_inner()
        })
    }

    fn write(&self) -> RwLockWriteGuard<'_, Tables> {
        self.tables.write().unwrap_or_else(|poisoned| {
            log::error!("MemoryStore lock poisoned on write; recovering");
            poisoned.into_inner()
        })
    }
}

fn duplicate_email() -> AppError {
    AppError::ValidationError("email: Email is already registered".into())
}

fn compare(a: &Task, b: &Task, field: SortField) -> Ordering {
    match field {
        SortField::CreatedAt => a.created_at.cmp(&b.created_at),
        SortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
        SortField::Description => a.description.cmp(&b.description),
        SortField::Completed => a.completed.cmp(&b.completed),
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert_user(&self, user: &User) -> Result<User, AppError> {
        let mut tables = self.write();
        if tables.users.values().any(|r| r.user.email == user.email) {
            return Err(duplicate_email());
        }
        tables.users.insert(
            user.id,
            UserRecord {
                user: user.clone(),
                avatar: None,
                tokens: Vec::new(),
            },
        );
        Ok(user.clone())
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, AppError> {
        Ok(self.read().users.get(&id).map(|r| r.user.clone()))
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        Ok(self
            .read()
            .users
            .values()
            .find(|r| r.user.email == email)
            .map(|r| r.user.clone()))
    }

    async fn update_user(&self, user: &User) -> Result<Option<User>, AppError> {
        let mut tables = self.write();
        if tables
            .users
            .values()
            .any(|r| r.user.id != user.id && r.user.email == user.email)
        {
            return Err(duplicate_email());
        }
        let Some(record) = tables.users.get_mut(&user.id) else {
            return Ok(None);
        };
        record.user.name = user.name.clone();
        record.user.email = user.email.clone();
        record.user.password_hash = user.password_hash.clone();
        record.user.age = user.age;
        record.user.updated_at = Utc::now();
        Ok(Some(record.user.clone()))
    }

    async fn delete_user(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let mut tables = self.write();
        let removed = tables.users.remove(&id).map(|r| r.user);
        if removed.is_some() {
            tables.tasks.retain(|t| t.owner_id != id);
        }
        Ok(removed)
    }

    async fn set_avatar(&self, id: Uuid, avatar: Option<Vec<u8>>) -> Result<bool, AppError> {
        let mut tables = self.write();
        match tables.users.get_mut(&id) {
            Some(record) => {
                record.avatar = avatar;
                record.user.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn find_avatar(&self, id: Uuid) -> Result<Option<Vec<u8>>, AppError> {
        Ok(self.read().users.get(&id).and_then(|r| r.avatar.clone()))
    }

    async fn add_token(&self, user_id: Uuid, token: &str) -> Result<(), AppError> {
        let mut tables = self.write();
        let record = tables
            .users
            .get_mut(&user_id)
            .ok_or_else(|| AppError::NotFound("User not found".into()))?;
        record.tokens.push(token.to_string());
        Ok(())
    }

    async fn has_token(&self, user_id: Uuid, token: &str) -> Result<bool, AppError> {
        Ok(self
            .read()
            .users
            .get(&user_id)
            .map(|r| r.tokens.iter().any(|t| t == token))
            .unwrap_or(false))
    }

    async fn remove_token(&self, user_id: Uuid, token: &str) -> Result<(), AppError> {
        if let Some(record) = self.write().users.get_mut(&user_id) {
            record.tokens.retain(|t| t != token);
        }
        Ok(())
    }

    async fn clear_tokens(&self, user_id: Uuid) -> Result<(), AppError> {
        if let Some(record) = self.write().users.get_mut(&user_id) {
            record.tokens.clear();
        }
        Ok(())
    }
}

#[async_trait]
impl TaskStore for MemoryStore {
    async fn insert_task(&self, task: &Task) -> Result<Task, AppError> {
        let mut tables = self.write();
        if !tables.users.contains_key(&task.owner_id) {
            return Err(AppError::NotFound("User not found".into()));
        }
        tables.tasks.push(task.clone());
        Ok(task.clone())
    }

    async fn list_tasks(&self, owner_id: Uuid, filter: &TaskFilter) -> Result<Vec<Task>, AppError> {
        let mut tasks: Vec<Task> = self
            .read()
            .tasks
            .iter()
            .filter(|t| t.owner_id == owner_id)
            .filter(|t| filter.completed.map_or(true, |c| t.completed == c))
            .cloned()
            .collect();

        tasks.sort_by(|a, b| {
            let ordering = compare(a, b, filter.sort_field);
            match filter.sort_direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
        });

        let skip = usize::try_from(filter.skip).unwrap_or(0);
        let limit = filter
            .limit
            .and_then(|l| usize::try_from(l).ok())
            .unwrap_or(usize::MAX);
        Ok(tasks.into_iter().skip(skip).take(limit).collect())
    }

    async fn find_task(&self, id: Uuid, owner_id: Uuid) -> Result<Option<Task>, AppError> {
        Ok(self
            .read()
            .tasks
            .iter()
            .find(|t| t.id == id && t.owner_id == owner_id)
            .cloned())
    }

    async fn update_task(&self, task: &Task) -> Result<Option<Task>, AppError> {
        let mut tables = self.write();
        let Some(stored) = tables
            .tasks
            .iter_mut()
            .find(|t| t.id == task.id && t.owner_id == task.owner_id)
        else {
            return Ok(None);
        };
        stored.description = task.description.clone();
        stored.completed = task.completed;
        stored.updated_at = task.updated_at;
        Ok(Some(stored.clone()))
    }

    async fn delete_task(&self, id: Uuid, owner_id: Uuid) -> Result<Option<Task>, AppError> {
        let mut tables = self.write();
        let position = tables
            .tasks
            .iter()
            .position(|t| t.id == id && t.owner_id == owner_id);
        Ok(position.map(|index| tables.tasks.remove(index)))
    }
}

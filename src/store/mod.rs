//! Persistence seam.
//!
//! Handlers and services only see `UserStore` and `TaskStore`. `PgStore` is the
//! production implementation over a `sqlx` pool; `MemoryStore` backs the test-suite
//! and local runs without `DATABASE_URL`.
//!
//! Every task operation takes the owner id and applies it inside the query, so a
//! task that belongs to somebody else is indistinguishable from a missing one.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{Task, TaskFilter, User};

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Inserts a new user. A duplicate email is a `ValidationError`.
    async fn insert_user(&self, user: &User) -> Result<User, AppError>;
    async fn find_user(&self, id: Uuid) -> Result<Option<User>, AppError>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError>;
    /// Persists name, email, password hash and age. Returns `None` if the user is gone.
    async fn update_user(&self, user: &User) -> Result<Option<User>, AppError>;
    /// Removes the user together with its tasks and tokens.
    async fn delete_user(&self, id: Uuid) -> Result<Option<User>, AppError>;
    /// Replaces (or clears) the stored avatar. Returns `false` if the user is gone.
    async fn set_avatar(&self, id: Uuid, avatar: Option<Vec<u8>>) -> Result<bool, AppError>;
    /// Avatar bytes, kept out of `find_user` so authentication never loads them.
    async fn find_avatar(&self, id: Uuid) -> Result<Option<Vec<u8>>, AppError>;

    async fn add_token(&self, user_id: Uuid, token: &str) -> Result<(), AppError>;
    async fn has_token(&self, user_id: Uuid, token: &str) -> Result<bool, AppError>;
    async fn remove_token(&self, user_id: Uuid, token: &str) -> Result<(), AppError>;
    async fn clear_tokens(&self, user_id: Uuid) -> Result<(), AppError>;
}

#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn insert_task(&self, task: &Task) -> Result<Task, AppError>;
    async fn list_tasks(&self, owner_id: Uuid, filter: &TaskFilter) -> Result<Vec<Task>, AppError>;
    async fn find_task(&self, id: Uuid, owner_id: Uuid) -> Result<Option<Task>, AppError>;
    /// Persists description, completed and `updated_at` of an owned task.
    async fn update_task(&self, task: &Task) -> Result<Option<Task>, AppError>;
    async fn delete_task(&self, id: Uuid, owner_id: Uuid) -> Result<Option<Task>, AppError>;
}

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::{TaskStore, UserStore};
use crate::error::AppError;
use crate::models::{Task, TaskFilter, User};

const USER_COLUMNS: &str = "id, name, email, password_hash, age, created_at, updated_at";
const TASK_COLUMNS: &str = "id, description, completed, owner_id, created_at, updated_at";

/// `UserStore` and `TaskStore` over a PostgreSQL pool.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn insert_user(&self, user: &User) -> Result<User, AppError> {
        let sql = format!(
            "INSERT INTO users (id, name, email, password_hash, age, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {USER_COLUMNS}"
        );
        let inserted = sqlx::query_as::<_, User>(&sql)
            .bind(user.id)
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(user.age)
            .bind(user.created_at)
            .bind(user.updated_at)
            .fetch_one(&self.pool)
            .await?;
        Ok(inserted)
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn update_user(&self, user: &User) -> Result<Option<User>, AppError> {
        let sql = format!(
            "UPDATE users SET name = $1, email = $2, password_hash = $3, age = $4, updated_at = NOW() \
             WHERE id = $5 RETURNING {USER_COLUMNS}"
        );
        let updated = sqlx::query_as::<_, User>(&sql)
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(user.age)
            .bind(user.id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(updated)
    }

    async fn delete_user(&self, id: Uuid) -> Result<Option<User>, AppError> {
        // tasks and user_tokens go with it through ON DELETE CASCADE
        let sql = format!("DELETE FROM users WHERE id = $1 RETURNING {USER_COLUMNS}");
        let deleted = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(deleted)
    }

    async fn set_avatar(&self, id: Uuid, avatar: Option<Vec<u8>>) -> Result<bool, AppError> {
        let result = sqlx::query("UPDATE users SET avatar = $1, updated_at = NOW() WHERE id = $2")
            .bind(avatar)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_avatar(&self, id: Uuid) -> Result<Option<Vec<u8>>, AppError> {
        let row: Option<(Option<Vec<u8>>,)> =
            sqlx::query_as("SELECT avatar FROM users WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.and_then(|(avatar,)| avatar))
    }

    async fn add_token(&self, user_id: Uuid, token: &str) -> Result<(), AppError> {
        sqlx::query("INSERT INTO user_tokens (user_id, token) VALUES ($1, $2)")
            .bind(user_id)
            .bind(token)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn has_token(&self, user_id: Uuid, token: &str) -> Result<bool, AppError> {
        let found = sqlx::query_as::<_, (bool,)>(
            "SELECT EXISTS (SELECT 1 FROM user_tokens WHERE user_id = $1 AND token = $2)",
        )
        .bind(user_id)
        .bind(token)
        .fetch_one(&self.pool)
        .await?;
        Ok(found.0)
    }

    async fn remove_token(&self, user_id: Uuid, token: &str) -> Result<(), AppError> {
        sqlx::query("DELETE FROM user_tokens WHERE user_id = $1 AND token = $2")
            .bind(user_id)
            .bind(token)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn clear_tokens(&self, user_id: Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM user_tokens WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl TaskStore for PgStore {
    async fn insert_task(&self, task: &Task) -> Result<Task, AppError> {
        let sql = format!(
            "INSERT INTO tasks (id, description, completed, owner_id, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {TASK_COLUMNS}"
        );
        let inserted = sqlx::query_as::<_, Task>(&sql)
            .bind(task.id)
            .bind(&task.description)
            .bind(task.completed)
            .bind(task.owner_id)
            .bind(task.created_at)
            .bind(task.updated_at)
            .fetch_one(&self.pool)
            .await?;
        Ok(inserted)
    }

    async fn list_tasks(&self, owner_id: Uuid, filter: &TaskFilter) -> Result<Vec<Task>, AppError> {
        let mut query = list_query(owner_id, filter);
        let tasks = query
            .build_query_as::<Task>()
            .fetch_all(&self.pool)
            .await?;
        Ok(tasks)
    }

    async fn find_task(&self, id: Uuid, owner_id: Uuid) -> Result<Option<Task>, AppError> {
        let sql = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1 AND owner_id = $2");
        let task = sqlx::query_as::<_, Task>(&sql)
            .bind(id)
            .bind(owner_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(task)
    }

    async fn update_task(&self, task: &Task) -> Result<Option<Task>, AppError> {
        let sql = format!(
            "UPDATE tasks SET description = $1, completed = $2, updated_at = $3 \
             WHERE id = $4 AND owner_id = $5 RETURNING {TASK_COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Task>(&sql)
            .bind(&task.description)
            .bind(task.completed)
            .bind(task.updated_at)
            .bind(task.id)
            .bind(task.owner_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(updated)
    }

    async fn delete_task(&self, id: Uuid, owner_id: Uuid) -> Result<Option<Task>, AppError> {
        let sql = format!(
            "DELETE FROM tasks WHERE id = $1 AND owner_id = $2 RETURNING {TASK_COLUMNS}"
        );
        let deleted = sqlx::query_as::<_, Task>(&sql)
            .bind(id)
            .bind(owner_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(deleted)
    }
}

/// Builds the listing query. Sort column and direction come from closed enums,
/// everything else is bound.
fn list_query(owner_id: Uuid, filter: &TaskFilter) -> QueryBuilder<'static, Postgres> {
    let mut query = QueryBuilder::new(format!("SELECT {TASK_COLUMNS} FROM tasks WHERE owner_id = "));
    query.push_bind(owner_id);

    if let Some(completed) = filter.completed {
        query.push(" AND completed = ").push_bind(completed);
    }

    query
        .push(" ORDER BY ")
        .push(filter.sort_field.column())
        .push(" ")
        .push(filter.sort_direction.keyword())
        .push(", id");

    if let Some(limit) = filter.limit {
        query.push(" LIMIT ").push_bind(limit);
    }
    query.push(" OFFSET ").push_bind(filter.skip);

    query
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::error::AppError;

/// Largest page a single list request may ask for.
pub const MAX_PAGE_SIZE: i64 = 100;

/// Input structure for creating a task.
#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct TaskInput {
    /// Must be between 1 and 1000 characters once trimmed.
    #[validate(length(min = 1, max = 1000))]
    pub description: String,

    /// Defaults to `false`.
    #[serde(default)]
    pub completed: bool,
}

/// Allowed fields of `PATCH /tasks/{id}`. Anything else rejects the request.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct UpdateTaskRequest {
    #[validate(length(min = 1, max = 1000))]
    pub description: Option<String>,
    pub completed: Option<bool>,
}

/// Represents a task entity as stored in the database and returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Task {
    /// Unique identifier for the task (UUID v4).
    pub id: Uuid,
    pub description: String,
    pub completed: bool,
    /// Identifier of the user who owns the task.
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Creates a new `Task` owned by `owner_id` with a fresh id and timestamps.
    pub fn new(input: TaskInput, owner_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            description: input.description.trim().to_string(),
            completed: input.completed,
            owner_id,
            created_at: now,
            updated_at: now,
        }
    }

    /// Applies a validated update in place and bumps `updated_at`.
    pub fn apply(&mut self, changes: &UpdateTaskRequest) {
        if let Some(description) = &changes.description {
            self.description = description.trim().to_string();
        }
        if let Some(completed) = changes.completed {
            self.completed = completed;
        }
        self.updated_at = Utc::now();
    }
}

/// Raw query parameters of `GET /tasks`, e.g. `?completed=true&limit=10&skip=20&sortBy=createdAt:desc`.
#[derive(Debug, Default, Deserialize)]
pub struct TaskQuery {
    pub completed: Option<bool>,
    pub limit: Option<i64>,
    pub skip: Option<i64>,
    #[serde(rename = "sortBy")]
    pub sort_by: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    CreatedAt,
    UpdatedAt,
    Description,
    Completed,
}

impl SortField {
    /// Column name, safe to splice into SQL.
    pub fn column(self) -> &'static str {
        match self {
            SortField::CreatedAt => "created_at",
            SortField::UpdatedAt => "updated_at",
            SortField::Description => "description",
            SortField::Completed => "completed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn keyword(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// A validated listing request, ready for a store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskFilter {
    pub completed: Option<bool>,
    pub limit: Option<i64>,
    pub skip: i64,
    pub sort_field: SortField,
    pub sort_direction: SortDirection,
}

impl Default for TaskFilter {
    fn default() -> Self {
        Self {
            completed: None,
            limit: None,
            skip: 0,
            sort_field: SortField::CreatedAt,
            sort_direction: SortDirection::Asc,
        }
    }
}

impl TryFrom<TaskQuery> for TaskFilter {
    type Error = AppError;

    fn try_from(query: TaskQuery) -> Result<Self, Self::Error> {
        let mut filter = TaskFilter {
            completed: query.completed,
            ..Default::default()
        };

        if let Some(limit) = query.limit {
            if !(1..=MAX_PAGE_SIZE).contains(&limit) {
                return Err(AppError::ValidationError(format!(
                    "limit: must be between 1 and {}",
                    MAX_PAGE_SIZE
                )));
            }
            filter.limit = Some(limit);
        }

        if let Some(skip) = query.skip {
            if skip < 0 {
                return Err(AppError::ValidationError(
                    "skip: must not be negative".into(),
                ));
            }
            filter.skip = skip;
        }

        if let Some(sort_by) = query.sort_by {
            let (field, direction) = sort_by.split_once(':').unwrap_or((sort_by.as_str(), "asc"));
            filter.sort_field = match field {
                "createdAt" => SortField::CreatedAt,
                "updatedAt" => SortField::UpdatedAt,
                "description" => SortField::Description,
                "completed" => SortField::Completed,
                other => {
                    return Err(AppError::ValidationError(format!(
                        "sortBy: unknown field {:?}",
                        other
                    )))
                }
            };
            filter.sort_direction = match direction {
                "asc" => SortDirection::Asc,
                "desc" => SortDirection::Desc,
                other => {
                    return Err(AppError::ValidationError(format!(
                        "sortBy: unknown direction {:?}",
                        other
                    )))
                }
            };
        }

        Ok(filter)
    }
}

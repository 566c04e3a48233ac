pub mod task;
pub mod user;

pub use task::{
    SortDirection, SortField, Task, TaskFilter, TaskInput, TaskQuery, UpdateTaskRequest,
};
pub use user::{UpdateUserRequest, User};

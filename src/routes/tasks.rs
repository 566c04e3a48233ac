use crate::{
    auth::CurrentUser,
    error::AppError,
    models::{TaskInput, TaskQuery, UpdateTaskRequest},
    state::AppState,
};
use actix_web::{delete, get, patch, post, web, HttpResponse, Responder};
use uuid::Uuid;

/// Retrieves the authenticated user's tasks.
///
/// ## Query Parameters:
/// - `completed` (optional): `true` or `false`.
/// - `limit` (optional): Page size, 1 to 100.
/// - `skip` (optional): Number of tasks to skip.
/// - `sortBy` (optional): `<field>:<asc|desc>` where field is `createdAt`, `updatedAt`,
///   `description` or `completed`. Defaults to `createdAt:asc`.
///
/// ## Responses:
/// - `200 OK`: JSON array of `Task` objects.
/// - `400 Bad Request`: Invalid query parameters.
/// - `401 Unauthorized`: If the request lacks a valid authentication token.
#[get("/tasks")]
pub async fn list_tasks(
    state: web::Data<AppState>,
    current: CurrentUser,
    query: web::Query<TaskQuery>,
) -> Result<impl Responder, AppError> {
    let tasks = state.tasks.list(current.user.id, query.into_inner()).await?;
    Ok(HttpResponse::Ok().json(tasks))
}

/// Creates a new task owned by the authenticated user.
///
/// ## Request Body:
/// - `description`: The task text (required).
/// - `completed` (optional): Defaults to `false`.
///
/// ## Responses:
/// - `201 Created`: The newly created `Task`.
/// - `400 Bad Request`: Invalid or unknown fields.
/// - `401 Unauthorized`: If the request lacks a valid authentication token.
#[post("/tasks")]
pub async fn create_task(
    state: web::Data<AppState>,
    current: CurrentUser,
    payload: web::Json<TaskInput>,
) -> Result<impl Responder, AppError> {
    let task = state.tasks.create(current.user.id, payload.into_inner()).await?;
    Ok(HttpResponse::Created().json(task))
}

/// Retrieves one task.
///
/// ## Responses:
/// - `200 OK`: The `Task`.
/// - `404 Not Found`: The task does not exist or is not owned by the authenticated user.
#[get("/tasks/{id}")]
pub async fn get_task(
    state: web::Data<AppState>,
    current: CurrentUser,
    task_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let task = state.tasks.get(current.user.id, task_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(task))
}

/// Updates `description` and/or `completed` of an owned task.
///
/// ## Responses:
/// - `200 OK`: The updated `Task`.
/// - `400 Bad Request`: A field outside the allow-list was sent, or a value is invalid.
/// - `404 Not Found`: The task does not exist or is not owned by the authenticated user.
#[patch("/tasks/{id}")]
pub async fn update_task(
    state: web::Data<AppState>,
    current: CurrentUser,
    task_id: web::Path<Uuid>,
    payload: web::Json<UpdateTaskRequest>,
) -> Result<impl Responder, AppError> {
    let task = state
        .tasks
        .update(current.user.id, task_id.into_inner(), payload.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(task))
}

/// Deletes an owned task and returns it.
///
/// ## Responses:
/// - `200 OK`: The deleted `Task`.
/// - `404 Not Found`: The task does not exist or is not owned by the authenticated user.
#[delete("/tasks/{id}")]
pub async fn delete_task(
    state: web::Data<AppState>,
    current: CurrentUser,
    task_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let task = state.tasks.delete(current.user.id, task_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(task))
}

use actix_multipart::Multipart;
use actix_web::{delete, get, patch, post, web, HttpResponse, Responder};
use futures::StreamExt;
use uuid::Uuid;

use crate::auth::{CurrentUser, LoginRequest, RegisterRequest};
use crate::avatar::MAX_AVATAR_BYTES;
use crate::error::AppError;
use crate::models::UpdateUserRequest;
use crate::state::AppState;

/// Multipart field carrying the avatar image.
const AVATAR_FIELD: &str = "avatar";

/// Registers a new user.
///
/// ## Responses:
/// - `201 Created`: `{"user": User, "token": String}`.
/// - `400 Bad Request`: Validation failed or the email is already registered.
#[post("/users")]
pub async fn register(
    state: web::Data<AppState>,
    payload: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    let response = state.users.register(payload.into_inner()).await?;
    Ok(HttpResponse::Created().json(response))
}

/// Logs a user in and issues an additional token.
///
/// ## Responses:
/// - `200 OK`: `{"user": User, "token": String}`.
/// - `400 Bad Request`: Credentials did not match. The body does not say why.
#[post("/users/login")]
pub async fn login(
    state: web::Data<AppState>,
    payload: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    let response = state.users.login(payload.into_inner()).await?;
    Ok(HttpResponse::Ok().json(response))
}

/// Revokes the token used for this request.
#[post("/users/logout")]
pub async fn logout(
    state: web::Data<AppState>,
    current: CurrentUser,
) -> Result<impl Responder, AppError> {
    state.users.logout(&current).await?;
    Ok(HttpResponse::Ok().finish())
}

/// Revokes every token of the calling user.
#[post("/users/logout-all")]
pub async fn logout_all(
    state: web::Data<AppState>,
    current: CurrentUser,
) -> Result<impl Responder, AppError> {
    state.users.logout_all(&current).await?;
    Ok(HttpResponse::Ok().finish())
}

#[get("/users/profile")]
pub async fn profile(current: CurrentUser) -> impl Responder {
    HttpResponse::Ok().json(current.user)
}

/// Public lookup of a user by id. Malformed ids are reported as `404`.
#[get("/users/{id}")]
pub async fn get_user(
    state: web::Data<AppState>,
    user_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let user = state.users.find(user_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(user))
}

/// Updates `name`, `email`, `password` and/or `age` of the calling user.
///
/// ## Responses:
/// - `200 OK`: The updated user.
/// - `400 Bad Request`: A field outside the allow-list was sent, or a value is invalid.
///   Nothing is changed in either case.
#[patch("/users/edit-account")]
pub async fn edit_account(
    state: web::Data<AppState>,
    current: CurrentUser,
    payload: web::Json<UpdateUserRequest>,
) -> Result<impl Responder, AppError> {
    let user = state.users.update(&current, payload.into_inner()).await?;
    Ok(HttpResponse::Ok().json(user))
}

/// Deletes the calling user together with all of its tasks.
#[delete("/users/delete-account")]
pub async fn delete_account(
    state: web::Data<AppState>,
    current: CurrentUser,
) -> Result<impl Responder, AppError> {
    let user = state.users.delete(&current).await?;
    Ok(HttpResponse::Ok().json(user))
}

/// Accepts a multipart upload with an `avatar` field (`.jpeg`, `.jpg` or `.png`, at
/// most 1MB) and stores it as a 250x250 PNG.
#[post("/users/profile/avatar")]
pub async fn upload_avatar(
    state: web::Data<AppState>,
    current: CurrentUser,
    mut payload: Multipart,
) -> Result<impl Responder, AppError> {
    while let Some(field) = payload.next().await {
        let mut field = field?;

        if field.content_disposition().get_name() != Some(AVATAR_FIELD) {
            while let Some(chunk) = field.next().await {
                chunk?;
            }
            continue;
        }

        let file_name = field
            .content_disposition()
            .get_filename()
            .unwrap_or_default()
            .to_string();

        let mut bytes = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk?;
            if bytes.len() + chunk.len() > MAX_AVATAR_BYTES {
                return Err(AppError::BadRequest("File too large".into()));
            }
            bytes.extend_from_slice(&chunk);
        }

        state.users.set_avatar(&current, &file_name, bytes).await?;
        return Ok(HttpResponse::Ok().finish());
    }

    Err(AppError::BadRequest("Please upload an image".into()))
}

#[delete("/users/profile/delete-avatar")]
pub async fn delete_avatar(
    state: web::Data<AppState>,
    current: CurrentUser,
) -> Result<impl Responder, AppError> {
    state.users.clear_avatar(&current).await?;
    Ok(HttpResponse::Ok().finish())
}

/// Serves a user's avatar as `image/png`.
#[get("/users/{id}/avatar")]
pub async fn get_avatar(
    state: web::Data<AppState>,
    user_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let png = state.users.avatar(user_id.into_inner()).await?;
    Ok(HttpResponse::Ok().content_type("image/png").body(png))
}

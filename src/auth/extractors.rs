use actix_web::dev::Payload;
use actix_web::http::header;
use actix_web::{web, Error as ActixError, FromRequest, HttpRequest};
use futures::future::LocalBoxFuture;

use crate::auth::resolver::CurrentUser;
use crate::error::AppError;
use crate::state::AppState;

/// Resolves the bearer token of the request into the calling user.
///
/// A handler opts into authentication by taking a `CurrentUser` argument; the
/// request is rejected with 401 before the handler body runs if the token is
/// missing, invalid, expired or revoked.
impl FromRequest for CurrentUser {
    type Error = ActixError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let state = req.app_data::<web::Data<AppState>>().cloned();
        let authorization = req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);

        Box::pin(async move {
            let state = state.ok_or_else(|| {
                AppError::InternalServerError("AppState is not registered".into())
            })?;
            let current = state
                .identity
                .resolve_header(authorization.as_deref())
                .await?;
            Ok(current)
        })
    }
}

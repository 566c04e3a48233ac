use std::sync::Arc;

use actix_web::web;
use uuid::Uuid;
use validator::Validate;

use crate::auth::{AuthResponse, CredentialStore, CurrentUser, LoginRequest, RegisterRequest, TokenService};
use crate::avatar::{self, AvatarProcessor};
use crate::error::AppError;
use crate::models::user::normalize_email;
use crate::models::{UpdateUserRequest, User};
use crate::notify::Notifier;
use crate::store::UserStore;

const LOGIN_FAILED: &str = "Unable to login";

/// Account lifecycle: registration, login/logout, profile edits, deletion and avatars.
#[derive(Clone)]
pub struct UserDirectory {
    store: Arc<dyn UserStore>,
    credentials: CredentialStore,
    tokens: TokenService,
    notifier: Notifier,
    avatars: Arc<dyn AvatarProcessor>,
}

impl UserDirectory {
    pub fn new(
        store: Arc<dyn UserStore>,
        credentials: CredentialStore,
        tokens: TokenService,
        notifier: Notifier,
        avatars: Arc<dyn AvatarProcessor>,
    ) -> Self {
        Self {
            store,
            credentials,
            tokens,
            notifier,
            avatars,
        }
    }

    /// Creates the account, issues its first token and sends the welcome mail.
    pub async fn register(&self, mut request: RegisterRequest) -> Result<AuthResponse, AppError> {
        request.name = request.name.trim().to_string();
        request.email = normalize_email(&request.email);
        request.password = request.password.trim().to_string();
        request.validate()?;

        let password_hash = self.credentials.hash(&request.password)?;
        let user = User::new(
            request.name,
            request.email,
            password_hash,
            request.age.unwrap_or(0),
        );
        let user = self.store.insert_user(&user).await?;
        log::info!("Registered user {}", user.id);

        self.notifier.welcome(&user);
        let token = self.tokens.issue(user.id).await?;
        Ok(AuthResponse { user, token })
    }

    /// Unknown email, wrong password and malformed input all fail the same way.
    /// An unknown email still runs a full bcrypt verification.
    pub async fn login(&self, mut request: LoginRequest) -> Result<AuthResponse, AppError> {
        request.password = request.password.trim().to_string();
        if request.validate().is_err() {
            return Err(AppError::BadRequest(LOGIN_FAILED.into()));
        }

        let found = self
            .store
            .find_user_by_email(&normalize_email(&request.email))
            .await?;
        let verified = self.credentials.verify_account(
            &request.password,
            found.as_ref().map(|user| user.password_hash.as_str()),
        );
        let user = found
            .filter(|_| verified)
            .ok_or_else(|| AppError::BadRequest(LOGIN_FAILED.into()))?;

        let token = self.tokens.issue(user.id).await?;
        Ok(AuthResponse { user, token })
    }

    pub async fn logout(&self, current: &CurrentUser) -> Result<(), AppError> {
        self.tokens.revoke(current.user.id, &current.token).await
    }

    pub async fn logout_all(&self, current: &CurrentUser) -> Result<(), AppError> {
        self.tokens.revoke_all(current.user.id).await
    }

    pub async fn find(&self, id: Uuid) -> Result<User, AppError> {
        self.store
            .find_user(id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".into()))
    }

    /// Applies an allow-listed update. Nothing is written unless every field validates.
    pub async fn update(
        &self,
        current: &CurrentUser,
        mut changes: UpdateUserRequest,
    ) -> Result<User, AppError> {
        changes.name = changes.name.map(|name| name.trim().to_string());
        changes.email = changes.email.map(|email| normalize_email(&email));
        changes.password = changes.password.map(|password| password.trim().to_string());
        changes.validate()?;

        if changes.is_empty() {
            return Ok(current.user.clone());
        }

        let mut user = current.user.clone();
        if let Some(name) = changes.name {
            user.name = name;
        }
        if let Some(email) = changes.email {
            user.email = email;
        }
        if let Some(password) = changes.password {
            user.password_hash = self.credentials.hash(&password)?;
        }
        if let Some(age) = changes.age {
            user.age = age;
        }

        self.store
            .update_user(&user)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".into()))
    }

    /// Removes the account; its tasks and tokens go with it.
    pub async fn delete(&self, current: &CurrentUser) -> Result<User, AppError> {
        let user = self
            .store
            .delete_user(current.user.id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".into()))?;
        log::info!("Deleted user {}", user.id);

        self.notifier.farewell(&user);
        Ok(user)
    }

    pub async fn set_avatar(
        &self,
        current: &CurrentUser,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<(), AppError> {
        avatar::check_file_name(file_name)?;
        avatar::check_size(bytes.len())?;

        let processor = Arc::clone(&self.avatars);
        let png = web::block(move || processor.process(&bytes)).await??;

        if !self.store.set_avatar(current.user.id, Some(png)).await? {
            return Err(AppError::NotFound("User not found".into()));
        }
        Ok(())
    }

    pub async fn clear_avatar(&self, current: &CurrentUser) -> Result<(), AppError> {
        self.store.set_avatar(current.user.id, None).await?;
        Ok(())
    }

    /// PNG bytes of a user's avatar.
    pub async fn avatar(&self, id: Uuid) -> Result<Vec<u8>, AppError> {
        self.store
            .find_avatar(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Avatar not found".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::avatar::ImageAvatarProcessor;
    use crate::notify::LogMailer;
    use crate::state::AppState;
    use crate::store::MemoryStore;
    use std::time::Instant;

    fn directory(cost: u32) -> UserDirectory {
        AppState::new(
            Arc::new(MemoryStore::new()),
            "directory-secret",
            chrono::Duration::hours(1),
            CredentialStore::new(cost),
            Arc::new(LogMailer),
            Arc::new(ImageAvatarProcessor::default()),
        )
        .users
    }

    fn register_request(email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            name: "Known".into(),
            email: email.into(),
            password: password.into(),
            age: None,
        }
    }

    fn login_request(email: &str, password: &str) -> LoginRequest {
        LoginRequest {
            email: email.into(),
            password: password.into(),
        }
    }

    #[actix_rt::test]
    async fn test_unknown_email_costs_as_much_as_wrong_password() {
        let users = directory(10);
        users
            .register(register_request("known@example.com", "Red12345!"))
            .await
            .unwrap();

        let started = Instant::now();
        let known = users.login(login_request("known@example.com", "Wrong12345!")).await;
        let known_elapsed = started.elapsed();

        let started = Instant::now();
        let unknown = users.login(login_request("nobody@example.com", "Wrong12345!")).await;
        let unknown_elapsed = started.elapsed();

        assert!(matches!(known, Err(AppError::BadRequest(ref m)) if m == LOGIN_FAILED));
        assert!(matches!(unknown, Err(AppError::BadRequest(ref m)) if m == LOGIN_FAILED));
        assert!(
            unknown_elapsed * 4 >= known_elapsed,
            "unknown email took {:?}, known email {:?}",
            unknown_elapsed,
            known_elapsed
        );
    }

    #[actix_rt::test]
    async fn test_passwords_are_trimmed() {
        let users = directory(4);
        let registered = users
            .register(register_request("spaces@example.com", "  secret99  "))
            .await
            .unwrap();

        assert!(users.login(login_request("spaces@example.com", "secret99")).await.is_ok());
        assert!(users
            .login(login_request("spaces@example.com", "  secret99  "))
            .await
            .is_ok());

        let current = CurrentUser {
            user: registered.user,
            token: registered.token,
        };
        users
            .update(
                &current,
                UpdateUserRequest {
                    password: Some(" secret100 ".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert!(users.login(login_request("spaces@example.com", "secret100")).await.is_ok());
        assert!(users.login(login_request("spaces@example.com", "secret99")).await.is_err());
    }
}

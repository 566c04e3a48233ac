use std::sync::Arc;

use crate::auth::token::TokenSigner;
use crate::error::AppError;
use crate::models::User;
use crate::store::UserStore;

/// Message for every failed authentication, whatever the cause.
pub const AUTHENTICATE_MESSAGE: &str = "Please authenticate.";

/// The caller of a protected route: the resolved user plus the raw token it
/// presented (needed by logout).
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user: User,
    pub token: String,
}

/// Turns an `Authorization` header into a `CurrentUser`.
#[derive(Clone)]
pub struct IdentityResolver {
    signer: TokenSigner,
    users: Arc<dyn UserStore>,
}

impl IdentityResolver {
    pub fn new(signer: TokenSigner, users: Arc<dyn UserStore>) -> Self {
        Self { signer, users }
    }

    /// Resolves the value of an `Authorization` header (`Bearer <token>`).
    pub async fn resolve_header(&self, header: Option<&str>) -> Result<CurrentUser, AppError> {
        let token = header
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(unauthorized)?;
        self.resolve(token).await
    }

    /// Signature and expiry first, then the claimed user must exist and still hold
    /// this exact token in its active set.
    pub async fn resolve(&self, token: &str) -> Result<CurrentUser, AppError> {
        let claims = self.signer.verify(token).map_err(|e| {
            log::debug!("Rejected bearer token: {}", e);
            unauthorized()
        })?;

        let user = self
            .users
            .find_user(claims.sub)
            .await?
            .ok_or_else(unauthorized)?;

        if !self.users.has_token(user.id, token).await? {
            log::debug!("Token for user {} is not in its active set", user.id);
            return Err(unauthorized());
        }

        Ok(CurrentUser {
            user,
            token: token.to_string(),
        })
    }
}

fn unauthorized() -> AppError {
    AppError::Unauthorized(AUTHENTICATE_MESSAGE.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::token::TokenService;
    use crate::store::MemoryStore;
    use chrono::Duration;

    struct Fixture {
        store: Arc<MemoryStore>,
        tokens: TokenService,
        resolver: IdentityResolver,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let signer = TokenSigner::new("resolver-secret", Duration::hours(1));
        Fixture {
            tokens: TokenService::new(signer.clone(), store.clone()),
            resolver: IdentityResolver::new(signer, store.clone()),
            store,
        }
    }

    async fn register(f: &Fixture, email: &str) -> User {
        let user = User::new("Test".into(), email.into(), "hash".into(), 0);
        f.store.insert_user(&user).await.unwrap()
    }

    #[actix_rt::test]
    async fn test_resolves_owner_of_token() {
        let f = fixture();
        let alice = register(&f, "alice@example.com").await;
        let bob = register(&f, "bob@example.com").await;
        let alice_token = f.tokens.issue(alice.id).await.unwrap();
        f.tokens.issue(bob.id).await.unwrap();

        let header = format!("Bearer {}", alice_token);
        let current = f.resolver.resolve_header(Some(&header)).await.unwrap();
        assert_eq!(current.user.id, alice.id);
        assert_ne!(current.user.id, bob.id);
        assert_eq!(current.token, alice_token);
    }

    #[actix_rt::test]
    async fn test_rejects_missing_or_malformed_header() {
        let f = fixture();
        for header in [None, Some(""), Some("Bearer "), Some("Token abc"), Some("Bearer abc")] {
            assert!(
                matches!(f.resolver.resolve_header(header).await, Err(AppError::Unauthorized(_))),
                "header {:?} should be rejected",
                header
            );
        }
    }

    #[actix_rt::test]
    async fn test_rejects_signed_token_not_in_set() {
        let f = fixture();
        let user = register(&f, "ghost@example.com").await;
        let forged_but_signed = f.tokens.signer().sign(user.id).unwrap();

        assert!(matches!(
            f.resolver.resolve(&forged_but_signed).await,
            Err(AppError::Unauthorized(_))
        ));
    }

    #[actix_rt::test]
    async fn test_rejects_revoked_tokens() {
        let f = fixture();
        let user = register(&f, "leaver@example.com").await;
        let first = f.tokens.issue(user.id).await.unwrap();
        let second = f.tokens.issue(user.id).await.unwrap();

        f.tokens.revoke(user.id, &first).await.unwrap();
        assert!(f.resolver.resolve(&first).await.is_err());
        assert!(f.resolver.resolve(&second).await.is_ok());

        f.tokens.revoke_all(user.id).await.unwrap();
        assert!(f.resolver.resolve(&second).await.is_err());
    }

    #[actix_rt::test]
    async fn test_rejects_token_of_deleted_user() {
        let f = fixture();
        let user = register(&f, "deleted@example.com").await;
        let token = f.tokens.issue(user.id).await.unwrap();
        f.store.delete_user(user.id).await.unwrap();

        match f.resolver.resolve(&token).await {
            Err(AppError::Unauthorized(msg)) => assert_eq!(msg, AUTHENTICATE_MESSAGE),
            other => panic!("expected Unauthorized, got {:?}", other),
        }
    }
}

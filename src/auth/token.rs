use std::sync::Arc;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::store::UserStore;

/// Represents the claims encoded within a JWT (JSON Web Token).
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject of the token, the user's unique identifier.
    pub sub: Uuid,
    /// Unique token id, keeps two tokens issued in the same second distinct.
    pub jti: Uuid,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
}

/// Signs and verifies JWTs with a shared HS256 secret.
#[derive(Clone)]
pub struct TokenSigner {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenSigner {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    /// Generates a JWT for a given user id, valid for the configured ttl.
    pub fn sign(&self, user_id: Uuid) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id,
            jti: Uuid::new_v4(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| AppError::InternalServerError(format!("Failed to generate token: {}", e)))
    }

    /// Verifies signature and expiry and decodes the claims.
    ///
    /// Returns `AppError::Unauthorized` if the token is malformed, its signature is
    /// invalid, or it has expired.
    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        decode::<Claims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| AppError::Unauthorized(format!("Invalid token: {}", e)))
    }
}

/// Issues and revokes tokens against a user's active token set.
///
/// A signature alone never authenticates: the token must also still be in the
/// set, which is what makes logout immediate.
#[derive(Clone)]
pub struct TokenService {
    signer: TokenSigner,
    users: Arc<dyn UserStore>,
}

impl TokenService {
    pub fn new(signer: TokenSigner, users: Arc<dyn UserStore>) -> Self {
        Self { signer, users }
    }

    pub fn signer(&self) -> &TokenSigner {
        &self.signer
    }

    pub async fn issue(&self, user_id: Uuid) -> Result<String, AppError> {
        let token = self.signer.sign(user_id)?;
        self.users.add_token(user_id, &token).await?;
        log::debug!("Issued token for user {}", user_id);
        Ok(token)
    }

    pub async fn revoke(&self, user_id: Uuid, token: &str) -> Result<(), AppError> {
        self.users.remove_token(user_id, token).await
    }

    pub async fn revoke_all(&self, user_id: Uuid) -> Result<(), AppError> {
        self.users.clear_tokens(user_id).await
    }
}

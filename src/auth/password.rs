use std::sync::Arc;

use crate::error::AppError;
use bcrypt::{hash, verify};

/// Hashed once per store and verified against when no account matches, so a
/// lookup miss costs as much as a wrong password.
const DUMMY_PASSWORD: &str = "taskforge-no-such-account";

/// Hashes and verifies passwords with bcrypt.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    cost: u32,
    dummy_hash: Arc<str>,
}

impl Default for CredentialStore {
    fn default() -> Self {
        Self::new(bcrypt::DEFAULT_COST)
    }
}

impl CredentialStore {
    pub fn new(cost: u32) -> Self {
        let dummy_hash = hash(DUMMY_PASSWORD, cost).unwrap_or_else(|e| {
            log::warn!("Could not prepare dummy password hash: {}", e);
            String::new()
        });
        Self {
            cost,
            dummy_hash: dummy_hash.into(),
        }
    }

    pub fn hash(&self, password: &str) -> Result<String, AppError> {
        Ok(hash(password, self.cost)?)
    }

    /// Verifies against the stored digest of a found account, or burns an
    /// equivalent bcrypt round and fails when there is none.
    pub fn verify_account(&self, password: &str, hashed_password: Option<&str>) -> bool {
        match hashed_password {
            Some(hashed) => self.verify(password, hashed),
            None => {
                self.verify(password, &self.dummy_hash);
                false
            }
        }
    }

    /// Checks `password` against a stored digest.
    ///
    /// A digest bcrypt cannot parse counts as a mismatch, so callers only ever
    /// learn "matches" or "does not match".
    pub fn verify(&self, password: &str, hashed_password: &str) -> bool {
        match verify(password, hashed_password) {
            Ok(matches) => matches,
            Err(e) => {
                log::warn!("Stored password hash could not be verified: {}", e);
                false
            }
        }
    }
}

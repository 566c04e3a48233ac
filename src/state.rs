use std::sync::Arc;

use chrono::Duration;

use crate::auth::{CredentialStore, IdentityResolver, TokenService, TokenSigner};
use crate::avatar::AvatarProcessor;
use crate::notify::{Mailer, Notifier};
use crate::services::{TaskLedger, UserDirectory};
use crate::store::{TaskStore, UserStore};

/// Everything a handler needs, registered once as `web::Data<AppState>`.
#[derive(Clone)]
pub struct AppState {
    pub users: UserDirectory,
    pub tasks: TaskLedger,
    pub identity: IdentityResolver,
}

impl AppState {
    pub fn new<S>(
        store: Arc<S>,
        jwt_secret: &str,
        token_ttl: Duration,
        credentials: CredentialStore,
        mailer: Arc<dyn Mailer>,
        avatars: Arc<dyn AvatarProcessor>,
    ) -> Self
    where
        S: UserStore + TaskStore + 'static,
    {
        let user_store: Arc<dyn UserStore> = store.clone();
        let task_store: Arc<dyn TaskStore> = store;
        let signer = TokenSigner::new(jwt_secret, token_ttl);

        Self {
            users: UserDirectory::new(
                user_store.clone(),
                credentials,
                TokenService::new(signer.clone(), user_store.clone()),
                Notifier::new(mailer),
                avatars,
            ),
            tasks: TaskLedger::new(task_store),
            identity: IdentityResolver::new(signer, user_store),
        }
    }
}

//! Account notifications.
//!
//! Mail delivery is an external concern behind `Mailer`. `Notifier` spawns each send
//! on the actix runtime and only logs the outcome, so a slow or failing mail backend
//! never affects the request that triggered it.

use std::sync::Arc;

use async_trait::async_trait;

use crate::models::User;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[derive(Debug, thiserror::Error)]
#[error("mail delivery failed: {0}")]
pub struct MailError(pub String);

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: Email) -> Result<(), MailError>;
}

/// Writes outgoing mail to the log instead of delivering it.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: Email) -> Result<(), MailError> {
        log::info!("Mail to {}: {}", email.to, email.subject);
        Ok(())
    }
}

#[derive(Clone)]
pub struct Notifier {
    mailer: Arc<dyn Mailer>,
}

impl Notifier {
    pub fn new(mailer: Arc<dyn Mailer>) -> Self {
        Self { mailer }
    }

    pub fn welcome(&self, user: &User) {
        self.dispatch(Email {
            to: user.email.clone(),
            subject: "Thanks for joining in!".into(),
            body: format!(
                "Welcome to the app, {}. Let me know how you get along with the app.",
                user.name
            ),
        });
    }

    pub fn farewell(&self, user: &User) {
        self.dispatch(Email {
            to: user.email.clone(),
            subject: "Sorry to see you go!".into(),
            body: format!(
                "Goodbye, {}. Is there anything we could have done to have kept you on board?",
                user.name
            ),
        });
    }

    fn dispatch(&self, email: Email) {
        let mailer = Arc::clone(&self.mailer);
        actix_web::rt::spawn(async move {
            let to = email.to.clone();
            if let Err(e) = mailer.send(email).await {
                log::warn!("Could not notify {}: {}", to, e);
            }
        });
    }
}

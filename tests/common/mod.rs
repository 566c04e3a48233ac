#![allow(dead_code)]

use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use actix_web::dev::{Service, ServiceResponse};
use actix_web::{test, web, App};
use async_trait::async_trait;
use image::{ImageBuffer, ImageFormat, Rgb};

use taskforge::auth::{AuthResponse, CredentialStore, RegisterRequest};
use taskforge::avatar::ImageAvatarProcessor;
use taskforge::models::{Task, TaskInput, User};
use taskforge::notify::{Email, MailError, Mailer};
use taskforge::store::MemoryStore;
use taskforge::{routes, AppState};

pub const BOUNDARY: &str = "taskforge-test-boundary";

/// Keeps every mail instead of sending it.
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<Email>>,
}

impl RecordingMailer {
    pub fn sent(&self) -> Vec<Email> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: Email) -> Result<(), MailError> {
        self.sent.lock().unwrap().push(email);
        Ok(())
    }
}

/// Counts delivery attempts and fails every one of them.
#[derive(Default)]
pub struct FailingMailer {
    attempts: AtomicUsize,
}

impl FailingMailer {
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Mailer for FailingMailer {
    async fn send(&self, _email: Email) -> Result<(), MailError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(MailError("mail server unreachable".into()))
    }
}

pub struct Account {
    pub user: User,
    pub token: String,
    pub password: String,
}

/// Seeded world: two users with one token each, Sara owns two tasks and Msangi one.
pub struct Fixture {
    pub state: AppState,
    pub mailer: Arc<RecordingMailer>,
    pub sara: Account,
    pub msangi: Account,
    pub sara_tasks: Vec<Task>,
    pub msangi_task: Task,
}

pub fn new_state() -> (AppState, Arc<RecordingMailer>) {
    let mailer = Arc::new(RecordingMailer::default());
    (state_with_mailer(mailer.clone()), mailer)
}

pub fn state_with_mailer(mailer: Arc<dyn Mailer>) -> AppState {
    AppState::new(
        Arc::new(MemoryStore::new()),
        "integration-secret",
        chrono::Duration::hours(1),
        CredentialStore::new(4),
        mailer,
        Arc::new(ImageAvatarProcessor::default()),
    )
}

async fn account(state: &AppState, name: &str, email: &str, password: &str) -> Account {
    let AuthResponse { user, token } = state
        .users
        .register(RegisterRequest {
            name: name.into(),
            email: email.into(),
            password: password.into(),
            age: Some(27),
        })
        .await
        .unwrap();
    Account {
        user,
        token,
        password: password.into(),
    }
}

async fn task(state: &AppState, owner: &User, description: &str, completed: bool) -> Task {
    state
        .tasks
        .create(
            owner.id,
            TaskInput {
                description: description.into(),
                completed,
            },
        )
        .await
        .unwrap()
}

pub async fn fixture() -> Fixture {
    let (state, mailer) = new_state();
    let sara = account(&state, "Sara", "sara@example.com", "Red12345!").await;
    let msangi = account(&state, "Msangi", "msangi@example.com", "Blue98765!").await;

    let first = task(&state, &sara.user, "First task", false).await;
    let second = task(&state, &sara.user, "Second task", true).await;
    let msangi_task = task(&state, &msangi.user, "Third task", false).await;

    Fixture {
        state,
        mailer,
        sara,
        msangi,
        sara_tasks: vec![first, second],
        msangi_task,
    }
}

pub async fn init_app(
    state: AppState,
) -> impl Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error> {
    test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(routes::config),
    )
    .await
}

pub fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", token))
}

pub fn jpeg(width: u32, height: u32) -> Vec<u8> {
    let img: ImageBuffer<Rgb<u8>, Vec<u8>> =
        ImageBuffer::from_fn(width, height, |x, y| Rgb([(x % 255) as u8, (y % 255) as u8, 90]));
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Jpeg)
        .unwrap();
    bytes
}

/// A `multipart/form-data` body with a single file field.
pub fn multipart(field: &str, file_name: &str, content: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
            field, file_name
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub fn multipart_content_type() -> String {
    format!("multipart/form-data; boundary={}", BOUNDARY)
}

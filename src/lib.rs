#![doc = "The `taskforge` library crate."]
#![doc = ""]
#![doc = "Accounts, token authentication, owner-scoped tasks, avatar handling, storage"]
#![doc = "backends and the HTTP routes that tie them together. The binary (`main.rs`)"]
#![doc = "only reads configuration, picks a store and starts the server."]

pub mod auth;
pub mod avatar;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod notify;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;

pub use crate::error::AppError;
pub use crate::state::AppState;

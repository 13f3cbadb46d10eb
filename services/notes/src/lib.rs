//! Notes service
//!
//! Multi-user note taking over a JSON API: accounts with email/password
//! login, signed session tokens, a password reset flow, and notes that only
//! their owner can read or change.

pub mod access;
pub mod auth;
pub mod error;
pub mod extract;
pub mod guard;
pub mod models;
pub mod password;
pub mod repositories;
pub mod reset;
pub mod routes;
pub mod session;
pub mod settings;
pub mod state;
pub mod validation;

pub use routes::create_router;
pub use state::AppState;

/// Embedded schema migrations
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!();

/// Hoot Service Library
///
/// A small social-posting backend: authenticated users create hoots and
/// comment on them. Handlers validate ownership, delegate to the store,
/// and shape JSON responses; authentication is a stateless bearer-token
/// check in front of the hoot routes.
///
/// # Modules
///
/// - `handlers`: HTTP request handlers for hoots and comments
/// - `models`: document models and request payloads
/// - `db`: store access over the hoot and user collections
/// - `middleware`: bearer-token authentication
/// - `error`: error types and HTTP rendering
/// - `config`: configuration management
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;

pub use config::Config;
pub use error::{AppError, Result};

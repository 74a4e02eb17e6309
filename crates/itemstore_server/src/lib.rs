//! HTTP surface of the item store.
//!
//! # Responsibility
//! - Map item CRUD operations onto HTTP methods, paths and status codes.
//! - Own the store handle lifecycle: open once, share, close once.

pub mod config;
pub mod error;
pub mod routes;
pub mod server;
pub mod state;

pub use config::ServerConfig;
pub use error::{ApiError, ApiResult, ServerError};
pub use server::{build_router, serve};
pub use state::AppState;

//! Account REST API service
//!
//! HTTP front end over an [`accountcore::AccountStore`]. The binary in
//! `main.rs` wires these pieces into an actix `HttpServer`; the
//! integration tests wire them into `actix_web::test` services.

pub mod config;
pub mod error;
pub mod routes;
pub mod security;

use accountcore::AccountStore;
use std::sync::Arc;

pub use config::ServiceConfig;
pub use error::ApiError;
pub use routes::configure;

/// Application state shared across handlers
pub struct AppState {
    pub store: Arc<dyn AccountStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn AccountStore>) -> Self {
        Self { store }
    }
}

//! Web module for routing and HTML rendering.

pub mod routes;
pub mod templates;

pub use routes::{router, AppState, WebError};

//! HTTP routes for the web UI.
//!
//! Three endpoints: the recent-workouts list, the add form, and the form
//! submission. Each handler opens its own database connection on the blocking
//! pool and drops it when the work is done.

use std::path::PathBuf;

use axum::extract::{Form, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::Router;
use serde::Deserialize;
use thiserror::Error;

use crate::storage::{Database, DatabaseError};
use crate::web::templates;

/// Number of workouts shown on the home page.
pub const RECENT_LIMIT: i64 = 10;

/// Shared state for request handlers.
///
/// Holds the database path rather than an open connection; each request gets
/// a connection scoped to its own lifetime.
#[derive(Clone)]
pub struct AppState {
    db_path: PathBuf,
}

impl AppState {
    pub fn new(db_path: PathBuf) -> Self {
        Self { db_path }
    }

    /// Run a database operation on the blocking thread pool.
    ///
    /// Opens a connection for this call only; it is released when the
    /// closure returns, on success and on failure alike.
    async fn with_db<T, F>(&self, f: F) -> Result<T, WebError>
    where
        T: Send + 'static,
        F: FnOnce(&Database) -> Result<T, DatabaseError> + Send + 'static,
    {
        let path = self.db_path.clone();
        tokio::task::spawn_blocking(move || {
            let db = Database::open(&path)?;
            f(&db)
        })
        .await
        .map_err(|e| WebError::TaskFailed(e.to_string()))?
        .map_err(WebError::Storage)
    }
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/workouts/add", get(add_form).post(add_workout))
        .with_state(state)
}

/// Form payload for the add-workout page.
#[derive(Debug, Deserialize)]
pub struct AddWorkoutForm {
    #[serde(default)]
    name: Option<String>,
}

/// GET / - list the most recent workouts.
async fn home(State(state): State<AppState>) -> Result<Html<String>, WebError> {
    let workouts = state.with_db(|db| db.list_recent(RECENT_LIMIT)).await?;

    Ok(Html(templates::home(&workouts)))
}

/// GET /workouts/add - render an empty submission form. No store access.
async fn add_form() -> Html<String> {
    Html(templates::add_workout())
}

/// POST /workouts/add - persist the workout and redirect to the list page.
///
/// A missing or empty name re-renders the form without writing.
async fn add_workout(
    State(state): State<AppState>,
    Form(form): Form<AddWorkoutForm>,
) -> Result<Response, WebError> {
    let name = form.name.unwrap_or_default();
    if name.is_empty() {
        return Ok(Html(templates::add_workout()).into_response());
    }

    let id = state.with_db(move |db| db.insert_workout(&name)).await?;
    tracing::debug!("Recorded workout {}", id);

    Ok(Redirect::to("/").into_response())
}

/// Errors surfaced by request handlers.
#[derive(Debug, Error)]
pub enum WebError {
    #[error("Storage error: {0}")]
    Storage(#[from] DatabaseError),

    #[error("Task failed: {0}")]
    TaskFailed(String),
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        tracing::error!("Request failed: {}", self);

        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Html(templates::server_error()),
        )
            .into_response()
    }
}

//! Parent portal for Sekolah Bhinekas: parents register, sign in and submit their children's
//! enrollment records, then follow each record's review status on a dashboard.
//!
//! Accounts, sessions and records live behind the [`backend::Backend`] trait. The binary wires
//! in PostgreSQL ([`backend::PgBackend`]) or, with `--in-memory`, [`backend::MemoryBackend`].
//!
//! # Routes
//! - `GET|POST /` login page, `GET /login` redirects there
//! - `GET|POST /register`
//! - `GET /dashboard`, `GET|POST /add-student` (signed-in only)
//! - `POST /logout`
//! - `POST /api/add-student`, `POST /api/login` (JSON)

pub mod api;
pub mod auth;
pub mod backend;
pub mod config;
pub mod enrollment;
pub mod err;
pub mod models;
pub mod pages;
pub mod session;
pub mod validation;

use std::sync::Arc;

use axum::handler::Handler;
use axum::routing::{any, get, post};
use axum::{Extension, Json, Router};
use serde::Serialize;

pub use crate::err::{Error, Success};
use crate::auth::CookieSettings;
use crate::backend::Backend;
use crate::enrollment::SubmissionGuard;

pub type Payload<T> = Result<Json<Success<T>>, Error>;

pub fn proceeds<V>(value: V) -> Payload<V>
where
    V: Serialize,
{
    Ok(Json(Success::of(value)))
}

pub fn breaks<V>(err: Error) -> Payload<V>
where
    V: Serialize,
{
    Err(err)
}

/// Shared by every handler through an `Extension` layer.
#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<dyn Backend>,
    pub submissions: SubmissionGuard,
    pub cookies: CookieSettings,
}

impl AppState {
    pub fn new(backend: Arc<dyn Backend>, cookies: CookieSettings) -> Self {
        Self {
            backend,
            submissions: SubmissionGuard::default(),
            cookies,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(pages::login::show).post(pages::login::submit))
        .route("/login", get(pages::login::alias))
        .route(
            "/register",
            get(pages::register::show).post(pages::register::submit),
        )
        .route("/dashboard", get(pages::dashboard::show))
        .route(
            "/add-student",
            get(pages::add_student::show).post(pages::add_student::submit),
        )
        .route("/logout", post(auth::logout))
        .route("/api/login", post(auth::login_parent))
        .route("/api/add-student", any(api::add_student))
        .fallback(err::handler404.into_service())
        .layer(Extension(state))
}

use std::ops::Add;

use axum::http::{header, HeaderMap, HeaderValue};
use axum::response::{IntoResponse, Redirect, Response};
use axum::{Extension, Json};
use chrono::{DateTime, Duration, Utc};
use pbkdf2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use pbkdf2::Pbkdf2;
use rand::{thread_rng, Rng};
use rand_core::OsRng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::models::ParentSession;
use crate::session::{session_token, SESSION_COOKIE};
use crate::validation::validate_login;
use crate::{proceeds, AppState, Error, Payload};

pub const INVALID_CREDENTIALS: &str = "Invalid login credentials";
pub const USER_ALREADY_REGISTERED: &str = "User already registered";

pub fn hash_password(password: &str) -> Result<String, Error> {
    Ok(Pbkdf2
        .hash_password(password.as_bytes(), &SaltString::generate(&mut OsRng))?
        .to_string())
}

pub fn verify_password(password: &str, password_hash: &str) -> Result<bool, Error> {
    let hash = PasswordHash::new(password_hash)?;
    Ok(Pbkdf2.verify_password(password.as_bytes(), &hash).is_ok())
}

/// Emails are matched case-insensitively.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn generate_session_id() -> String {
    let ssid_bytes: [u8; 32] = thread_rng().gen();

    let mut hasher: Sha256 = Digest::new();
    hasher.update(&ssid_bytes);
    hex::encode(hasher.finalize())
}

pub fn new_session(parent_id: Uuid, lifetime: Duration) -> ParentSession {
    ParentSession {
        ssid: generate_session_id(),
        belongs_to: parent_id,
        expires_at: Utc::now().add(lifetime),
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CookieSettings {
    pub secure: bool,
}

impl CookieSettings {
    fn build(&self, value: &str, max_age: i64) -> String {
        let mut parts = vec![format!("{}={}", SESSION_COOKIE, value)];
        parts.push("Path=/".to_string());
        parts.push("HttpOnly".to_string());
        if self.secure {
            parts.push("Secure".to_string());
        }
        parts.push("SameSite=Lax".to_string());
        parts.push(format!("Max-Age={}", max_age));
        parts.join("; ")
    }

    pub fn session_cookie(&self, session: &ParentSession) -> String {
        let max_age = (session.expires_at - Utc::now()).num_seconds().max(0);
        self.build(&session.ssid, max_age)
    }

    pub fn removal_cookie(&self) -> String {
        self.build("", 0)
    }
}

/// Sets the session cookie and sends the browser to `to`.
pub fn signed_in_redirect(cookies: &CookieSettings, session: &ParentSession, to: &str) -> Response {
    with_cookie(cookies.session_cookie(session), Redirect::to(to))
}

fn with_cookie(cookie: String, response: impl IntoResponse) -> Response {
    let mut response = response.into_response();
    match HeaderValue::from_str(&cookie) {
        Ok(value) => {
            response.headers_mut().append(header::SET_COOKIE, value);
        }
        Err(err) => log::error!("Could not encode session cookie: {}", err),
    }
    response
}

pub async fn login_parent(
    Extension(state): Extension<AppState>,
    Json(login): Json<LoginParent>,
) -> Payload<LoggedInParent> {
    validate_login(&login.email, &login.password)?;

    let session = state
        .backend
        .sign_in(&login.email, &login.password)
        .await?;

    proceeds(LoggedInParent {
        session_id: session.ssid,
        parent_id: session.belongs_to,
        expires_at: session.expires_at,
    })
}

pub async fn logout(Extension(state): Extension<AppState>, headers: HeaderMap) -> Response {
    if let Some(ssid) = session_token(&headers) {
        if let Err(err) = state.backend.sign_out(&ssid).await {
            log::warn!("Could not drop session: {}", err);
        }
    }
    with_cookie(state.cookies.removal_cookie(), Redirect::to("/"))
}

#[derive(Debug, Clone, Serialize)]
pub struct LoggedInParent {
    pub session_id: String,
    pub parent_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginParent {
    email: String,
    password: String,
}

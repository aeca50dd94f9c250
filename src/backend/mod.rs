//! The collaborator that owns accounts, sessions and enrollment records.
//!
//! Handlers never reach a database directly; they hold an `Arc<dyn Backend>` so that the
//! PostgreSQL store and the in-memory store are interchangeable.

mod memory;
mod postgres;

pub use memory::MemoryBackend;
pub use postgres::PgBackend;

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{EnrollmentStatus, NewStudent, Parent, ParentSession, StudentRecord};
use crate::Error;

#[async_trait]
pub trait Backend: Send + Sync {
    /// Parent owning a live session, `None` for unknown or expired sessions.
    async fn current_user(&self, ssid: &str) -> Result<Option<Parent>, Error>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<ParentSession, Error>;

    /// Creates the account and immediately opens a session for it.
    async fn sign_up(&self, email: &str, password: &str) -> Result<ParentSession, Error>;

    async fn sign_out(&self, ssid: &str) -> Result<(), Error>;

    async fn insert_student(&self, student: NewStudent) -> Result<StudentRecord, Error>;

    /// Records owned by `parent` whose status is in `statuses`, newest first.
    async fn list_students(
        &self,
        parent: Uuid,
        statuses: &[EnrollmentStatus],
    ) -> Result<Vec<StudentRecord>, Error>;
}

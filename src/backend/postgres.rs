use async_trait::async_trait;
use chrono::{Duration, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use super::Backend;
use crate::auth::{
    hash_password, new_session, normalize_email, verify_password, INVALID_CREDENTIALS,
    USER_ALREADY_REGISTERED,
};
use crate::models::{
    EnrollmentStatus, NewStudent, Parent, ParentAccount, ParentSession, StudentRecord, StudentRow,
};
use crate::Error;

const SCHEMA: [&str; 4] = [
    "CREATE TABLE IF NOT EXISTS parents (
        id UUID PRIMARY KEY,
        email TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS parent_sessions (
        ssid TEXT PRIMARY KEY,
        belongs_to UUID NOT NULL REFERENCES parents(id) ON DELETE CASCADE,
        expires_at TIMESTAMPTZ NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS students_pending (
        id UUID PRIMARY KEY,
        parent_auth_id UUID NOT NULL REFERENCES parents(id),
        name TEXT NOT NULL,
        batch INTEGER NOT NULL,
        class_name TEXT NOT NULL,
        status TEXT NOT NULL DEFAULT 'pending'
            CHECK (status IN ('pending', 'rejected', 'authenticated')),
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )",
    "CREATE INDEX IF NOT EXISTS students_pending_parent_idx
        ON students_pending (parent_auth_id, created_at DESC)",
];

/// PostgreSQL store for accounts, sessions and `students_pending`.
#[derive(Clone)]
pub struct PgBackend {
    pg: PgPool,
    session_lifetime: Duration,
}

impl PgBackend {
    pub async fn connect(
        database_url: &str,
        max_connections: u32,
        session_lifetime: Duration,
    ) -> anyhow::Result<Self> {
        let pg = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self::new(pg, session_lifetime))
    }

    pub fn new(pg: PgPool, session_lifetime: Duration) -> Self {
        Self {
            pg,
            session_lifetime,
        }
    }

    pub async fn migrate(&self) -> Result<(), Error> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pg).await?;
        }
        log::info!("Database schema is ready");
        Ok(())
    }

    async fn open_session(&self, parent_id: Uuid) -> Result<ParentSession, Error> {
        let session = new_session(parent_id, self.session_lifetime);
        let res = sqlx::query("INSERT INTO parent_sessions VALUES ($1, $2, $3)")
            .bind(&session.ssid)
            .bind(&session.belongs_to)
            .bind(&session.expires_at)
            .execute(&self.pg)
            .await?;

        if res.rows_affected() < 1 {
            return Err(Error::InternalError {
                kind: "DatabaseError",
                message: "Could not update session ids!".to_string(),
            });
        }
        Ok(session)
    }
}

/// A sign-up insert that touched no row lost the email to an existing account.
fn claimed_email(rows_affected: u64) -> Result<(), Error> {
    if rows_affected < 1 {
        return Err(Error::UserAlreadyExists {
            message: USER_ALREADY_REGISTERED.to_string(),
        });
    }
    Ok(())
}

#[async_trait]
impl Backend for PgBackend {
    async fn current_user(&self, ssid: &str) -> Result<Option<Parent>, Error> {
        if ssid.is_empty() {
            return Ok(None);
        }
        let session = sqlx::query_as::<_, ParentSession>(
            "SELECT * FROM parent_sessions WHERE ssid = $1 LIMIT 1",
        )
        .bind(ssid)
        .fetch_optional(&self.pg)
        .await?;

        let session = match session {
            Some(session) => session,
            None => return Ok(None),
        };
        if session.is_expired() {
            sqlx::query("DELETE FROM parent_sessions WHERE ssid = $1")
                .bind(ssid)
                .execute(&self.pg)
                .await?;
            return Ok(None);
        }

        let account =
            sqlx::query_as::<_, ParentAccount>("SELECT * FROM parents WHERE id = $1 LIMIT 1")
                .bind(&session.belongs_to)
                .fetch_optional(&self.pg)
                .await?;
        Ok(account.map(|account| account.parent()))
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<ParentSession, Error> {
        let account =
            sqlx::query_as::<_, ParentAccount>("SELECT * FROM parents WHERE email = $1 LIMIT 1")
                .bind(normalize_email(email))
                .fetch_optional(&self.pg)
                .await?;

        let matches = match &account {
            Some(account) => verify_password(password, &account.password_hash)?,
            None => false,
        };
        match account {
            Some(account) if matches => self.open_session(account.id).await,
            _ => Err(Error::AuthenticationFailure {
                message: INVALID_CREDENTIALS.to_string(),
            }),
        }
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<ParentSession, Error> {
        let account = ParentAccount {
            id: Uuid::new_v4(),
            email: normalize_email(email),
            password_hash: hash_password(password)?,
            created_at: Utc::now(),
        };
        // The unique email index decides between concurrent sign-ups.
        let inserted = sqlx::query(
            "INSERT INTO parents VALUES ($1, $2, $3, $4) ON CONFLICT (email) DO NOTHING",
        )
        .bind(&account.id)
        .bind(&account.email)
        .bind(&account.password_hash)
        .bind(&account.created_at)
        .execute(&self.pg)
        .await?;
        claimed_email(inserted.rows_affected())?;

        self.open_session(account.id).await
    }

    async fn sign_out(&self, ssid: &str) -> Result<(), Error> {
        sqlx::query("DELETE FROM parent_sessions WHERE ssid = $1")
            .bind(ssid)
            .execute(&self.pg)
            .await?;
        Ok(())
    }

    async fn insert_student(&self, student: NewStudent) -> Result<StudentRecord, Error> {
        let row = sqlx::query_as::<_, StudentRow>(
            "INSERT INTO students_pending (id, parent_auth_id, name, batch, class_name, status)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING id, parent_auth_id, name, batch, class_name, status, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(&student.parent_auth_id)
        .bind(&student.name)
        .bind(student.batch)
        .bind(&student.class_name)
        .bind(student.status().as_str())
        .fetch_one(&self.pg)
        .await?;

        StudentRecord::try_from(row)
    }

    async fn list_students(
        &self,
        parent: Uuid,
        statuses: &[EnrollmentStatus],
    ) -> Result<Vec<StudentRecord>, Error> {
        let statuses: Vec<String> = statuses.iter().map(|s| s.as_str().to_string()).collect();
        let rows = sqlx::query_as::<_, StudentRow>(
            "SELECT id, parent_auth_id, name, batch, class_name, status, created_at
             FROM students_pending
             WHERE parent_auth_id = $1 AND status = ANY($2)
             ORDER BY created_at DESC",
        )
        .bind(parent)
        .bind(statuses)
        .fetch_all(&self.pg)
        .await?;

        rows.into_iter().map(StudentRecord::try_from).collect()
    }
}

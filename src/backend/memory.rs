use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use tokio::sync::{Notify, RwLock};
use uuid::Uuid;

use super::Backend;
use crate::auth::{
    hash_password, new_session, normalize_email, verify_password, INVALID_CREDENTIALS,
    USER_ALREADY_REGISTERED,
};
use crate::models::{
    EnrollmentStatus, NewStudent, Parent, ParentAccount, ParentSession, StudentRecord,
};
use crate::Error;

#[derive(Default)]
struct Store {
    accounts: HashMap<String, ParentAccount>,
    sessions: HashMap<String, ParentSession>,
    students: Vec<StudentRecord>,
    failure: Option<String>,
}

/// Process-local backend for development (`--in-memory`) and tests.
pub struct MemoryBackend {
    store: RwLock<Store>,
    session_lifetime: Duration,
    auth_calls: AtomicUsize,
    insert_gate: Mutex<Option<Arc<Notify>>>,
    parked: Notify,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new(Duration::days(2))
    }
}

impl MemoryBackend {
    pub fn new(session_lifetime: Duration) -> Self {
        Self {
            store: RwLock::new(Store::default()),
            session_lifetime,
            auth_calls: AtomicUsize::new(0),
            insert_gate: Mutex::new(None),
            parked: Notify::new(),
        }
    }

    /// Number of sign-in and sign-up requests that reached the backend.
    pub fn auth_calls(&self) -> usize {
        self.auth_calls.load(Ordering::SeqCst)
    }

    /// Makes every following data call fail with `message`; `None` restores normal behaviour.
    pub async fn fail_with(&self, message: Option<&str>) {
        self.store.write().await.failure = message.map(str::to_owned);
    }

    /// Administrative status change, done outside the portal in production.
    pub async fn set_status(&self, id: Uuid, status: EnrollmentStatus) -> bool {
        let mut store = self.store.write().await;
        match store.students.iter_mut().find(|student| student.id == id) {
            Some(student) => {
                student.status = status;
                true
            }
            None => false,
        }
    }

    /// Parks the next `insert_student` call until the returned handle is notified.
    pub fn hold_next_insert(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self
            .insert_gate
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(gate.clone());
        gate
    }

    /// Resolves once an insert is parked by [`MemoryBackend::hold_next_insert`].
    pub async fn insert_parked(&self) {
        self.parked.notified().await;
    }

    pub async fn students(&self) -> Vec<StudentRecord> {
        self.store.read().await.students.clone()
    }

    fn open_session(&self, store: &mut Store, parent_id: Uuid) -> ParentSession {
        let session = new_session(parent_id, self.session_lifetime);
        store.sessions.insert(session.ssid.clone(), session.clone());
        session
    }
}

fn failure(store: &Store) -> Result<(), Error> {
    match &store.failure {
        Some(message) => Err(Error::InternalError {
            kind: "DatabaseError",
            message: message.clone(),
        }),
        None => Ok(()),
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn current_user(&self, ssid: &str) -> Result<Option<Parent>, Error> {
        let mut store = self.store.write().await;
        let session = match store.sessions.get(ssid) {
            Some(session) => session.clone(),
            None => return Ok(None),
        };
        if session.is_expired() {
            store.sessions.remove(ssid);
            return Ok(None);
        }
        Ok(store
            .accounts
            .values()
            .find(|account| account.id == session.belongs_to)
            .map(ParentAccount::parent))
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<ParentSession, Error> {
        self.auth_calls.fetch_add(1, Ordering::SeqCst);
        let mut store = self.store.write().await;
        let account_id = match store.accounts.get(&normalize_email(email)) {
            Some(account) if verify_password(password, &account.password_hash)? => account.id,
            _ => {
                return Err(Error::AuthenticationFailure {
                    message: INVALID_CREDENTIALS.to_string(),
                })
            }
        };
        Ok(self.open_session(&mut store, account_id))
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<ParentSession, Error> {
        self.auth_calls.fetch_add(1, Ordering::SeqCst);
        let email = normalize_email(email);
        let mut store = self.store.write().await;
        if store.accounts.contains_key(&email) {
            return Err(Error::UserAlreadyExists {
                message: USER_ALREADY_REGISTERED.to_string(),
            });
        }
        let account = ParentAccount {
            id: Uuid::new_v4(),
            email: email.clone(),
            password_hash: hash_password(password)?,
            created_at: Utc::now(),
        };
        let id = account.id;
        store.accounts.insert(email, account);
        Ok(self.open_session(&mut store, id))
    }

    async fn sign_out(&self, ssid: &str) -> Result<(), Error> {
        self.store.write().await.sessions.remove(ssid);
        Ok(())
    }

    async fn insert_student(&self, student: NewStudent) -> Result<StudentRecord, Error> {
        let gate = self
            .insert_gate
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        if let Some(gate) = gate {
            self.parked.notify_one();
            gate.notified().await;
        }
        let mut store = self.store.write().await;
        failure(&store)?;
        let record = StudentRecord {
            id: Uuid::new_v4(),
            status: student.status(),
            parent_auth_id: student.parent_auth_id,
            name: student.name,
            batch: student.batch,
            class_name: student.class_name,
            created_at: Utc::now(),
        };
        store.students.push(record.clone());
        Ok(record)
    }

    async fn list_students(
        &self,
        parent: Uuid,
        statuses: &[EnrollmentStatus],
    ) -> Result<Vec<StudentRecord>, Error> {
        let store = self.store.read().await;
        failure(&store)?;
        // Reverse first so equal timestamps keep the latest insert on top.
        let mut records: Vec<StudentRecord> = store
            .students
            .iter()
            .rev()
            .filter(|student| student.parent_auth_id == parent && statuses.contains(&student.status))
            .cloned()
            .collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::VISIBLE_STATUSES;

    #[tokio::test]
    async fn sign_up_then_sign_in() {
        let backend = MemoryBackend::default();
        let session = backend.sign_up("Ibu@Sekolah.id", "rahasia123").await.unwrap();
        let parent = backend.current_user(&session.ssid).await.unwrap().unwrap();
        assert_eq!(parent.email, "ibu@sekolah.id");

        let again = backend.sign_in("ibu@sekolah.id", "rahasia123").await.unwrap();
        assert_eq!(again.belongs_to, parent.id);
        assert_eq!(backend.auth_calls(), 2);
    }

    #[tokio::test]
    async fn wrong_password_and_duplicates_fail() {
        let backend = MemoryBackend::default();
        backend.sign_up("ibu@sekolah.id", "rahasia123").await.unwrap();

        let err = backend.sign_in("ibu@sekolah.id", "salah12345").await.unwrap_err();
        assert_eq!(err.to_string(), INVALID_CREDENTIALS);
        let err = backend.sign_in("ayah@sekolah.id", "rahasia123").await.unwrap_err();
        assert_eq!(err.to_string(), INVALID_CREDENTIALS);
        let err = backend.sign_up("IBU@sekolah.id", "rahasia123").await.unwrap_err();
        assert_eq!(err.to_string(), USER_ALREADY_REGISTERED);
    }

    #[tokio::test]
    async fn expired_and_dropped_sessions_are_absent() {
        let expired = MemoryBackend::new(Duration::seconds(-1));
        let session = expired.sign_up("ibu@sekolah.id", "rahasia123").await.unwrap();
        assert_eq!(expired.current_user(&session.ssid).await.unwrap(), None);

        let backend = MemoryBackend::default();
        let session = backend.sign_up("ibu@sekolah.id", "rahasia123").await.unwrap();
        backend.sign_out(&session.ssid).await.unwrap();
        assert_eq!(backend.current_user(&session.ssid).await.unwrap(), None);
        assert_eq!(backend.current_user("unknown").await.unwrap(), None);
    }

    #[tokio::test]
    async fn listing_filters_owner_and_status_newest_first() {
        let backend = MemoryBackend::default();
        let mine = Uuid::new_v4();
        let theirs = Uuid::new_v4();
        let first = backend
            .insert_student(NewStudent::pending(mine, "Ana".into(), 2023, "Someah".into()))
            .await
            .unwrap();
        backend
            .insert_student(NewStudent::pending(theirs, "Budi".into(), 2024, "Gentur".into()))
            .await
            .unwrap();
        let second = backend
            .insert_student(NewStudent::pending(mine, "Citra".into(), 2024, "Singer".into()))
            .await
            .unwrap();
        backend.set_status(first.id, EnrollmentStatus::Rejected).await;

        let listed = backend.list_students(mine, &VISIBLE_STATUSES).await.unwrap();
        let names: Vec<&str> = listed.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Citra", "Ana"]);
        assert_eq!(listed[0].id, second.id);

        let pending_only = backend
            .list_students(mine, &[EnrollmentStatus::Pending])
            .await
            .unwrap();
        assert_eq!(pending_only.len(), 1);
        assert_eq!(pending_only[0].name, "Citra");
    }

    #[tokio::test]
    async fn injected_failures_surface_their_message() {
        let backend = MemoryBackend::default();
        backend.fail_with(Some("connection refused")).await;
        let err = backend
            .list_students(Uuid::new_v4(), &VISIBLE_STATUSES)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "connection refused");
        backend.fail_with(None).await;
        assert!(backend
            .list_students(Uuid::new_v4(), &VISIBLE_STATUSES)
            .await
            .unwrap()
            .is_empty());
    }
}

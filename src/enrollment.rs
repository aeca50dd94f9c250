//! Normalize-and-insert, shared by the add-student page and the JSON endpoint.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use uuid::Uuid;

use crate::backend::Backend;
use crate::models::{NewStudent, Parent, StudentRecord};
use crate::validation::normalize_name;
use crate::Error;

#[derive(Debug, Clone)]
pub struct Enrollment {
    pub name: String,
    pub batch: i32,
    pub class_name: String,
}

/// Parents with a submission currently in flight.
#[derive(Debug, Clone, Default)]
pub struct SubmissionGuard {
    in_flight: Arc<Mutex<HashSet<Uuid>>>,
}

/// Held while a submission runs; releases the parent on drop.
#[derive(Debug)]
pub struct InFlight {
    parent: Uuid,
    guard: SubmissionGuard,
}

impl SubmissionGuard {
    fn lock(&self) -> MutexGuard<'_, HashSet<Uuid>> {
        self.in_flight
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn begin(&self, parent: Uuid) -> Result<InFlight, Error> {
        if !self.lock().insert(parent) {
            return Err(Error::SubmissionInProgress);
        }
        Ok(InFlight {
            parent,
            guard: self.clone(),
        })
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.guard.lock().remove(&self.parent);
    }
}

pub async fn submit(
    backend: &dyn Backend,
    submissions: &SubmissionGuard,
    parent: &Parent,
    enrollment: Enrollment,
) -> Result<StudentRecord, Error> {
    let name = normalize_name(&enrollment.name);
    if name.is_empty() {
        return Err(Error::invalid("Child name is required"));
    }
    let class_name = enrollment.class_name.trim().to_string();
    if class_name.is_empty() {
        return Err(Error::invalid("Please select a class"));
    }

    let _in_flight = submissions.begin(parent.id)?;
    let student = NewStudent::pending(parent.id, name, enrollment.batch, class_name);
    match backend.insert_student(student).await {
        Ok(record) => {
            log::info!(
                "Parent {} submitted {} ({}, batch {})",
                parent.id,
                record.name,
                record.class_name,
                record.batch
            );
            Ok(record)
        }
        Err(err) => {
            log::error!("Could not store enrollment for parent {}: {}", parent.id, err);
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;
    use crate::models::EnrollmentStatus;

    fn parent() -> Parent {
        Parent {
            id: Uuid::new_v4(),
            email: "ibu@sekolah.id".to_string(),
        }
    }

    fn enrollment(name: &str) -> Enrollment {
        Enrollment {
            name: name.to_string(),
            batch: 2024,
            class_name: "Green Maher".to_string(),
        }
    }

    #[tokio::test]
    async fn stores_normalized_pending_record_for_parent() {
        let backend = MemoryBackend::default();
        let parent = parent();
        let guard = SubmissionGuard::default();
        let record = submit(&backend, &guard, &parent, enrollment("  john DAVID  "))
            .await
            .unwrap();

        assert_eq!(record.name, "John David");
        assert_eq!(record.status, EnrollmentStatus::Pending);
        assert_eq!(record.parent_auth_id, parent.id);
        assert_eq!(backend.students().await, vec![record]);
    }

    #[tokio::test]
    async fn blank_name_is_rejected_before_insert() {
        let backend = MemoryBackend::default();
        let err = submit(&backend, &SubmissionGuard::default(), &parent(), enrollment("   "))
            .await
            .unwrap_err();
        assert_eq!(err, Error::invalid("Child name is required"));
        assert!(backend.students().await.is_empty());
    }

    #[tokio::test]
    async fn insert_failure_is_passed_through() {
        let backend = MemoryBackend::default();
        backend.fail_with(Some("permission denied for table students_pending")).await;
        let err = submit(&backend, &SubmissionGuard::default(), &parent(), enrollment("ana"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "permission denied for table students_pending");
    }

    #[test]
    fn one_submission_per_parent_at_a_time() {
        let guard = SubmissionGuard::default();
        let parent = Uuid::new_v4();

        let first = guard.begin(parent).unwrap();
        assert_eq!(guard.begin(parent).unwrap_err(), Error::SubmissionInProgress);
        assert!(guard.begin(Uuid::new_v4()).is_ok());

        drop(first);
        assert!(guard.begin(parent).is_ok());
    }

    #[tokio::test]
    async fn guard_is_released_after_a_failed_insert() {
        let backend = MemoryBackend::default();
        let guard = SubmissionGuard::default();
        let parent = parent();
        backend.fail_with(Some("timeout")).await;
        assert!(submit(&backend, &guard, &parent, enrollment("ana")).await.is_err());
        backend.fail_with(None).await;
        assert!(submit(&backend, &guard, &parent, enrollment("ana")).await.is_ok());
    }

    #[tokio::test]
    async fn second_submission_while_first_is_stored_is_refused() {
        let backend = MemoryBackend::default();
        let guard = SubmissionGuard::default();
        let parent = parent();
        let gate = backend.hold_next_insert();

        let (first, second) = tokio::join!(
            submit(&backend, &guard, &parent, enrollment("ana")),
            async {
                backend.insert_parked().await;
                let second = submit(&backend, &guard, &parent, enrollment("ana")).await;
                gate.notify_one();
                second
            }
        );

        assert_eq!(second.unwrap_err(), Error::SubmissionInProgress);
        assert_eq!(first.unwrap().name, "Ana");
        assert_eq!(backend.students().await.len(), 1);
    }
}

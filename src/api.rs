use axum::body::Bytes;
use axum::http::{HeaderMap, Method};
use axum::Extension;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::enrollment::{self, Enrollment};
use crate::session::current_parent;
use crate::{breaks, proceeds, AppState, Error, Payload};

#[derive(Debug, Clone, Deserialize)]
pub struct AddStudent {
    name: String,
    batch: i32,
    class_name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct StudentAdded {
    student_id: Uuid,
}

/// `POST /api/add-student`. Checks run in order: method, session, body.
pub async fn add_student(
    method: Method,
    Extension(state): Extension<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Payload<StudentAdded> {
    if method != Method::POST {
        return breaks(Error::MethodNotAllowed);
    }

    let parent = match current_parent(state.backend.as_ref(), &headers).await {
        Ok(Some(parent)) => parent,
        Ok(None) => return breaks(Error::NotAuthenticated),
        Err(err) => {
            log::warn!("Session lookup failed: {}", err);
            return breaks(Error::NotAuthenticated);
        }
    };

    let input = match serde_json::from_slice::<AddStudent>(&body) {
        Ok(input) if !input.name.trim().is_empty() && !input.class_name.trim().is_empty() => input,
        _ => return breaks(Error::invalid("Invalid input")),
    };

    let submission = Enrollment {
        name: input.name,
        batch: input.batch,
        class_name: input.class_name,
    };
    let record =
        enrollment::submit(state.backend.as_ref(), &state.submissions, &parent, submission).await?;

    proceeds(StudentAdded {
        student_id: record.id,
    })
}

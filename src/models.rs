use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::Error;

pub const TK_CLASSES: [&str; 8] = [
    "Blue Pinter Morning",
    "Blue Pinter Afternoon",
    "Green Motekar",
    "Green Wanter",
    "Green Maher",
    "Yellow Maher",
    "Yellow Motekar",
    "Yellow Wanter",
];

pub const SD_CLASSES: [&str; 15] = [
    "Gumujeng",
    "Someah",
    "Rancage",
    "Gentur",
    "Macakal",
    "Calakan",
    "Singer",
    "Rancingeus",
    "Jatmika",
    "Gumanti",
    "Marahmay",
    "Rucita",
    "Binangkit",
    "Gumilang",
    "Sonagar",
];

/// Statuses shown on the dashboard.
pub const VISIBLE_STATUSES: [EnrollmentStatus; 3] = [
    EnrollmentStatus::Pending,
    EnrollmentStatus::Rejected,
    EnrollmentStatus::Authenticated,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnrollmentStatus {
    Pending,
    Rejected,
    Authenticated,
}

impl EnrollmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnrollmentStatus::Pending => "pending",
            EnrollmentStatus::Rejected => "rejected",
            EnrollmentStatus::Authenticated => "authenticated",
        }
    }
}

impl fmt::Display for EnrollmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EnrollmentStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(EnrollmentStatus::Pending),
            "rejected" => Ok(EnrollmentStatus::Rejected),
            "authenticated" => Ok(EnrollmentStatus::Authenticated),
            other => Err(Error::InternalError {
                kind: "DataError",
                message: format!("Unknown enrollment status `{}`", other),
            }),
        }
    }
}

/// Grade band. Decides which class names are offered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Level {
    #[default]
    TK,
    SD,
}

impl Level {
    pub fn classes(&self) -> &'static [&'static str] {
        match self {
            Level::TK => &TK_CLASSES,
            Level::SD => &SD_CLASSES,
        }
    }

    /// Returns the class name if it belongs to this level's set.
    pub fn class<'a>(&self, class_name: &'a str) -> Option<&'a str> {
        self.classes()
            .iter()
            .any(|class| *class == class_name)
            .then_some(class_name)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Level::TK => "TK/PG",
            Level::SD => "SD",
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Level::TK => "TK",
            Level::SD => "SD",
        }
    }
}

/// The authenticated user as the rest of the portal sees them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Parent {
    pub id: Uuid,
    pub email: String,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ParentAccount {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl ParentAccount {
    pub fn parent(&self) -> Parent {
        Parent {
            id: self.id,
            email: self.email.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ParentSession {
    pub ssid: String,
    pub belongs_to: Uuid,
    pub expires_at: DateTime<Utc>,
}

impl ParentSession {
    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }
}

/// A record about to be inserted. Only [`NewStudent::pending`] builds one, so every
/// submission starts out pending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStudent {
    pub parent_auth_id: Uuid,
    pub name: String,
    pub batch: i32,
    pub class_name: String,
    status: EnrollmentStatus,
}

impl NewStudent {
    pub fn pending(parent_auth_id: Uuid, name: String, batch: i32, class_name: String) -> Self {
        Self {
            parent_auth_id,
            name,
            batch,
            class_name,
            status: EnrollmentStatus::Pending,
        }
    }

    pub fn status(&self) -> EnrollmentStatus {
        self.status
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StudentRecord {
    pub id: Uuid,
    pub parent_auth_id: Uuid,
    pub name: String,
    pub batch: i32,
    pub class_name: String,
    pub status: EnrollmentStatus,
    pub created_at: DateTime<Utc>,
}

/// Row shape of `students_pending`; status is stored as text.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StudentRow {
    pub id: Uuid,
    pub parent_auth_id: Uuid,
    pub name: String,
    pub batch: i32,
    pub class_name: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<StudentRow> for StudentRecord {
    type Error = Error;

    fn try_from(row: StudentRow) -> Result<Self, Self::Error> {
        Ok(StudentRecord {
            status: row.status.parse()?,
            id: row.id,
            parent_auth_id: row.parent_auth_id,
            name: row.name,
            batch: row.batch,
            class_name: row.class_name,
            created_at: row.created_at,
        })
    }
}

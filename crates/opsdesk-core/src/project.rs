use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::id::{ClientId, ProjectId, UserId};

/// Delivery state of a project.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    /// Being worked on.
    #[default]
    Active,
    /// Delivered.
    Complete,
    /// Parked.
    Paused,
}

impl ProjectStatus {
    /// Wire/label string for this status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Complete => "complete",
            Self::Paused => "paused",
        }
    }
}

/// A named body of work belonging to exactly one client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    /// Record identifier.
    pub id: ProjectId,
    /// Owning user.
    pub user_id: UserId,
    /// Client the project belongs to.
    pub client_id: ClientId,
    /// Display name.
    pub name: String,
    /// Delivery state.
    pub status: ProjectStatus,
    /// Optional delivery date.
    #[serde(with = "crate::iso_date::option")]
    pub due_date: Option<Date>,
    /// Insertion timestamp assigned by the store.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Payload for creating a project; status defaults to active.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProject {
    /// Client the project belongs to.
    pub client_id: ClientId,
    /// Display name.
    pub name: String,
    /// Defaults to active.
    pub status: ProjectStatus,
    /// Optional delivery date.
    #[serde(with = "crate::iso_date::option")]
    pub due_date: Option<Date>,
}

impl NewProject {
    /// A project for `client_id` with default status and no due date.
    pub fn new(client_id: ClientId, name: impl Into<String>) -> Self {
        Self {
            client_id,
            name: name.into(),
            status: ProjectStatus::default(),
            due_date: None,
        }
    }
}

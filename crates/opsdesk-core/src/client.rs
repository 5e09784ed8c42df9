use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::id::{ClientId, UserId};

/// Where a client relationship currently stands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientStatus {
    /// Ongoing engagement.
    #[default]
    Active,
    /// Engagement on hold.
    Paused,
    /// Relationship ended.
    Churned,
}

impl ClientStatus {
    /// Wire/label string for this status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Paused => "paused",
            Self::Churned => "churned",
        }
    }
}

/// How the client is billed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContractType {
    /// Recurring monthly retainer.
    #[default]
    Retainer,
    /// Billed per project.
    ProjectBased,
}

impl ContractType {
    /// Wire/label string for this contract type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Retainer => "retainer",
            Self::ProjectBased => "project-based",
        }
    }
}

/// An agency client. Projects and tasks always hang off a client;
/// deleting one cascades through the store to its dependents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Client {
    /// Record identifier.
    pub id: ClientId,
    /// Owning user.
    pub user_id: UserId,
    /// Display name.
    pub name: String,
    /// Relationship status.
    pub status: ClientStatus,
    /// Billing model.
    pub contract_type: ContractType,
    /// Recurring monthly revenue; never negative.
    pub monthly_revenue: f64,
    /// Lifetime revenue; never negative.
    pub total_revenue: f64,
    /// Free-form notes about the client.
    pub notes: String,
    /// Hex color or one of the legacy named tokens.
    pub color: String,
    /// Insertion timestamp assigned by the store.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Payload for creating a client; optional fields take the documented
/// defaults (active retainer, zero revenue, slate color).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewClient {
    /// Display name.
    pub name: String,
    /// Defaults to active.
    pub status: ClientStatus,
    /// Defaults to retainer.
    pub contract_type: ContractType,
    /// Defaults to zero.
    pub monthly_revenue: f64,
    /// Defaults to zero.
    pub total_revenue: f64,
    /// Defaults to empty.
    pub notes: String,
    /// Defaults to the legacy `slate` token.
    pub color: String,
}

impl NewClient {
    /// A client named `name` with every optional field at its default.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: ClientStatus::default(),
            contract_type: ContractType::default(),
            monthly_revenue: 0.0,
            total_revenue: 0.0,
            notes: String::new(),
            color: "slate".to_owned(),
        }
    }
}

//! Resource moderation state and listing order.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Moderation state of a resource.
///
/// `pending → approved | rejected`, and an owner edit sends an approved or
/// rejected resource back to `pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid status transition: {from} -> {to}")]
pub struct InvalidTransition {
    pub from: ResourceStatus,
    pub to: ResourceStatus,
}

impl ResourceStatus {
    pub const ALL: [ResourceStatus; 3] = [Self::Pending, Self::Approved, Self::Rejected];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    pub fn can_transition_to(self, next: ResourceStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Approved)
                | (Self::Pending, Self::Rejected)
                | (Self::Approved, Self::Pending)
                | (Self::Rejected, Self::Pending)
        )
    }

    pub fn transition(self, next: ResourceStatus) -> Result<ResourceStatus, InvalidTransition> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(InvalidTransition {
                from: self,
                to: next,
            })
        }
    }

    /// State after the owner edits the resource.
    pub fn after_owner_edit(self) -> ResourceStatus {
        match self {
            Self::Approved | Self::Rejected => Self::Pending,
            Self::Pending => Self::Pending,
        }
    }
}

impl fmt::Display for ResourceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL.into_iter().find(|v| v.as_str() == s).ok_or(())
    }
}

/// Admin review decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewAction {
    Approve,
    Reject,
}

impl ReviewAction {
    pub fn target(self) -> ResourceStatus {
        match self {
            Self::Approve => ResourceStatus::Approved,
            Self::Reject => ResourceStatus::Rejected,
        }
    }
}

/// Ordering of the public resource listing. Pinned resources always come first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceSort {
    #[default]
    Latest,
    Popular,
    Rating,
    Random,
}

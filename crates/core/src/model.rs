use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::WatchError;

/// Review state of a homework as reported by the status API.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum HomeworkStatus {
    /// Accepted by the reviewer.
    Approved,
    /// Picked up by a reviewer, no verdict yet.
    Reviewing,
    /// Returned with comments.
    Rejected,
}

impl HomeworkStatus {
    /// All known statuses, in API order.
    pub const ALL: [HomeworkStatus; 3] = [
        HomeworkStatus::Approved,
        HomeworkStatus::Reviewing,
        HomeworkStatus::Rejected,
    ];

    /// Wire name, as it appears in the `status` field.
    pub fn as_str(self) -> &'static str {
        match self {
            HomeworkStatus::Approved => "approved",
            HomeworkStatus::Reviewing => "reviewing",
            HomeworkStatus::Rejected => "rejected",
        }
    }

    /// Human-readable verdict sent to the chat.
    pub fn verdict(self) -> &'static str {
        match self {
            HomeworkStatus::Approved => {
                "The work has been reviewed: the reviewer liked everything. Hooray!"
            }
            HomeworkStatus::Reviewing => "The work has been taken for review by the reviewer.",
            HomeworkStatus::Rejected => "The work has been reviewed: the reviewer has comments.",
        }
    }
}

impl fmt::Display for HomeworkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HomeworkStatus {
    type Err = WatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HomeworkStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| WatchError::UnknownStatus(s.to_string()))
    }
}

/// A single tracked item from the `homeworks` list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Homework {
    /// `homework_name` from the payload.
    pub name: String,
    /// Parsed `status`.
    pub status: HomeworkStatus,
}

impl Homework {
    /// Message announcing this homework's current verdict.
    pub fn status_message(&self) -> String {
        format!(
            "Changed review status of \"{}\": {}",
            self.name,
            self.status.verdict()
        )
    }
}

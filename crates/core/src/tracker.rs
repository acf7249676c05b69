use std::collections::HashSet;
use std::fmt;
use std::hash::Hash;
use std::str::FromStr;

use crate::model::{Homework, HomeworkStatus};

/// What the change tracker considers "the same state".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TrackBy {
    /// Key on the status value alone. Two homeworks sharing a status collapse into
    /// one seen entry.
    #[default]
    Status,
    /// Key on `(homework_name, status)`.
    Homework,
}

impl FromStr for TrackBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "status" => Ok(TrackBy::Status),
            "homework" => Ok(TrackBy::Homework),
            other => Err(format!("unknown tracking key '{other}' (expected status|homework)")),
        }
    }
}

impl fmt::Display for TrackBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackBy::Status => f.write_str("status"),
            TrackBy::Homework => f.write_str("homework"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum SeenKey {
    Status(HomeworkStatus),
    Homework(String, HomeworkStatus),
}

/// Decide whether `key` is new, returning the decision and the updated set.
///
/// The set only grows when the key is new.
pub fn should_notify<K: Eq + Hash>(key: K, mut seen: HashSet<K>) -> (bool, HashSet<K>) {
    let is_new = seen.insert(key);
    (is_new, seen)
}

/// In-memory record of states that were already announced.
///
/// Append-only for the lifetime of the owning watcher.
#[derive(Debug, Default)]
pub struct ChangeTracker {
    by: TrackBy,
    seen: HashSet<SeenKey>,
}

impl ChangeTracker {
    /// Empty tracker keyed as `by` says.
    pub fn new(by: TrackBy) -> Self {
        Self {
            by,
            seen: HashSet::new(),
        }
    }

    /// Record `homework`; true if its state had not been seen before.
    pub fn observe(&mut self, homework: &Homework) -> bool {
        let key = match self.by {
            TrackBy::Status => SeenKey::Status(homework.status),
            TrackBy::Homework => SeenKey::Homework(homework.name.clone(), homework.status),
        };
        let (is_new, seen) = should_notify(key, std::mem::take(&mut self.seen));
        self.seen = seen;
        is_new
    }

    /// Number of distinct states recorded so far.
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    /// True until the first state is recorded.
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

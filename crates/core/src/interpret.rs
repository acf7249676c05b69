use std::fmt;

use serde_json::Value;
use tracing::error;

use crate::error::{json_type_name, ShapeError, WatchError};
use crate::model::{Homework, HomeworkStatus};

/// Sent instead of a verdict when nothing new happened to a homework.
pub const NO_CHANGE_MESSAGE: &str = "Status has not changed";

/// Turn one raw `homeworks` entry into a typed [`Homework`].
///
/// A `homework_name` that is present but not a string counts as missing. A `status`
/// that is not a string is reported as an unknown status with its JSON rendering.
pub fn parse_homework(item: &Value) -> Result<Homework, WatchError> {
    let Value::Object(map) = item else {
        let got = json_type_name(item);
        error!(got, "homework item is not a mapping");
        return Err(ShapeError::ItemNotAMapping(got).into());
    };

    let name = map
        .get("homework_name")
        .and_then(Value::as_str)
        .ok_or_else(|| missing("homework_name"))?;

    let status = match map.get("status") {
        None => return Err(missing("status")),
        Some(Value::String(s)) => s.parse::<HomeworkStatus>(),
        Some(other) => Err(WatchError::UnknownStatus(other.to_string())),
    }
    .inspect_err(|e| error!(homework = name, "{e}"))?;

    Ok(Homework {
        name: name.to_string(),
        status,
    })
}

/// A homework together with the chat message announcing its review state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    /// The interpreted entry; its status is what the change tracker keys on.
    pub homework: Homework,
    /// `Changed review status of "{name}": {verdict text}`.
    pub message: String,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Interpret one raw entry as the verdict message for its current status.
pub fn parse_status(item: &Value) -> Result<Verdict, WatchError> {
    let homework = parse_homework(item)?;
    let message = homework.status_message();
    Ok(Verdict { homework, message })
}

fn missing(field: &'static str) -> WatchError {
    error!(field, "homework item is missing a required field");
    WatchError::MissingField(field)
}

use serde_json::Value;
use tracing::error;

use crate::error::{json_type_name, ShapeError, WatchError};

/// Check the top-level shape of a status API response and return its `homeworks`.
///
/// Only the container is validated here. Individual entries are checked when they
/// are interpreted, so one bad entry does not hide the shape of the rest.
pub fn check_response(payload: &Value) -> Result<&[Value], WatchError> {
    let Value::Object(map) = payload else {
        let got = json_type_name(payload);
        error!(got, "response is not a mapping");
        return Err(ShapeError::NotAMapping(got).into());
    };

    let Some(homeworks) = map.get("homeworks") else {
        error!("response is missing \"homeworks\"");
        return Err(ShapeError::MissingKey.into());
    };

    match homeworks {
        Value::Array(items) => Ok(items.as_slice()),
        other => {
            let got = json_type_name(other);
            error!(got, "\"homeworks\" is not a list");
            Err(ShapeError::WrongItemListType(got).into())
        }
    }
}

/// Server-side `current_date` of a response, if present and numeric.
pub fn current_date(payload: &Value) -> Option<i64> {
    payload.get("current_date").and_then(Value::as_i64)
}

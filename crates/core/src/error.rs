use thiserror::Error;

/// What was wrong with the shape of a payload or an item.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShapeError {
    /// Top-level payload was not a JSON object.
    #[error("response is not a mapping (got {0})")]
    NotAMapping(&'static str),
    /// Top-level payload had no `homeworks` key.
    #[error("response is missing key \"homeworks\"")]
    MissingKey,
    /// `homeworks` was present but not an array.
    #[error("\"homeworks\" has wrong item-list type (got {0}, expected list)")]
    WrongItemListType(&'static str),
    /// A single homework entry was not a JSON object.
    #[error("homework item is not a mapping (got {0})")]
    ItemNotAMapping(&'static str),
}

/// Every failure the watcher can run into.
///
/// Everything except [`WatchError::ConfigMissing`] is recoverable: the poll loop
/// reports it and tries again next cycle.
#[derive(Debug, Error)]
pub enum WatchError {
    /// Required credentials absent at startup. Fatal.
    #[error("missing required configuration: {}", .0.join(", "))]
    ConfigMissing(Vec<&'static str>),

    /// A configuration value parsed but cannot be used.
    #[error("invalid configuration {name}: {reason}")]
    InvalidConfig {
        /// Flag or variable name.
        name: &'static str,
        /// Why the value was refused.
        reason: String,
    },

    /// The status endpoint could not be reached.
    #[error("request to {url} failed: {reason}")]
    RequestFailure {
        /// Requested URL.
        url: String,
        /// Transport error text.
        reason: String,
    },

    /// The status endpoint answered with a non-success code.
    #[error("unexpected response code {status} from {url} (expected 200)")]
    ResponseError {
        /// HTTP status code.
        status: u16,
        /// URL that produced the response.
        url: String,
    },

    /// The response body was not JSON.
    #[error("could not decode response body from {url}: {reason}")]
    Decode {
        /// Requested URL.
        url: String,
        /// Parser error text.
        reason: String,
    },

    /// Payload or item had the wrong shape.
    #[error(transparent)]
    Shape(#[from] ShapeError),

    /// An item lacked a required field.
    #[error("homework item is missing field \"{0}\"")]
    MissingField(&'static str),

    /// An item carried a status outside the known set.
    #[error("unknown homework status \"{0}\"")]
    UnknownStatus(String),

    /// A chat message could not be delivered.
    #[error("failed to deliver notification: {0}")]
    NotifyFailure(String),
}

impl WatchError {
    /// Short, stable label used as a structured log field.
    pub fn kind(&self) -> &'static str {
        match self {
            WatchError::ConfigMissing(_) => "config_missing",
            WatchError::InvalidConfig { .. } => "invalid_config",
            WatchError::RequestFailure { .. } => "request_failure",
            WatchError::ResponseError { .. } => "response_error",
            WatchError::Decode { .. } => "decode",
            WatchError::Shape(_) => "shape",
            WatchError::MissingField(_) => "missing_field",
            WatchError::UnknownStatus(_) => "unknown_status",
            WatchError::NotifyFailure(_) => "notify_failure",
        }
    }
}

/// Human name for a JSON value's type, for diagnostics.
pub(crate) fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "list",
        serde_json::Value::Object(_) => "mapping",
    }
}

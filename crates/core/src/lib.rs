#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! Shared models and pure logic for the homework review watcher.
//!
//! Nothing in this crate performs I/O: payloads come in as `serde_json::Value`,
//! messages go out as `String`, and the caller decides how to move them.

/// Lower bound of each fetch window.
pub mod cursor;
/// Error taxonomy shared by the core and the watcher.
pub mod error;
/// Turning raw `homeworks` entries into verdict messages.
pub mod interpret;
/// Homework and status types.
pub mod model;
/// Remembering which states were already announced.
pub mod tracker;
/// Top-level response shape checks.
pub mod validation;

mod util;

pub use cursor::{CursorMode, PollCursor};
pub use error::{ShapeError, WatchError};
pub use interpret::{parse_homework, parse_status, Verdict, NO_CHANGE_MESSAGE};
pub use model::{Homework, HomeworkStatus};
pub use tracker::{should_notify, ChangeTracker, TrackBy};
pub use util::now_secs;
pub use validation::{check_response, current_date};

use std::fmt;
use std::str::FromStr;

/// How the `from_date` of the next fetch is chosen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CursorMode {
    /// Every cycle asks for `now - lookback`, regardless of what was fetched before.
    #[default]
    Lookback,
    /// After a successful fetch, ask from the server's `current_date` onwards.
    /// Falls back to `now - lookback` until the first success.
    Advance,
}

impl FromStr for CursorMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lookback" => Ok(CursorMode::Lookback),
            "advance" => Ok(CursorMode::Advance),
            other => Err(format!("unknown cursor mode '{other}' (expected lookback|advance)")),
        }
    }
}

impl fmt::Display for CursorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CursorMode::Lookback => f.write_str("lookback"),
            CursorMode::Advance => f.write_str("advance"),
        }
    }
}

/// Lower time bound (unix seconds) for status fetches.
#[derive(Debug, Clone)]
pub struct PollCursor {
    mode: CursorMode,
    lookback_secs: i64,
    last_current_date: Option<i64>,
}

impl PollCursor {
    /// Cursor that looks `lookback_secs` back from the fetch time.
    pub fn new(mode: CursorMode, lookback_secs: i64) -> Self {
        Self {
            mode,
            lookback_secs,
            last_current_date: None,
        }
    }

    /// `from_date` to use for a fetch issued at `now`.
    pub fn from_date(&self, now: i64) -> i64 {
        match (self.mode, self.last_current_date) {
            (CursorMode::Advance, Some(date)) => date,
            _ => now.saturating_sub(self.lookback_secs),
        }
    }

    /// Record a successfully processed response. Only affects [`CursorMode::Advance`].
    pub fn record_success(&mut self, current_date: Option<i64>) {
        if self.mode == CursorMode::Advance {
            if let Some(date) = current_date {
                self.last_current_date = Some(date);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY: i64 = 24 * 60 * 60;

    #[test]
    fn lookback_is_recomputed_from_now() {
        let mut cursor = PollCursor::new(CursorMode::Lookback, 20 * DAY);
        assert_eq!(cursor.from_date(100 * DAY), 80 * DAY);
        cursor.record_success(Some(99 * DAY));
        assert_eq!(cursor.from_date(101 * DAY), 81 * DAY);
    }

    #[test]
    fn advance_uses_last_current_date() {
        let mut cursor = PollCursor::new(CursorMode::Advance, 20 * DAY);
        assert_eq!(cursor.from_date(100 * DAY), 80 * DAY);
        cursor.record_success(None);
        assert_eq!(cursor.from_date(100 * DAY), 80 * DAY);
        cursor.record_success(Some(100 * DAY));
        assert_eq!(cursor.from_date(105 * DAY), 100 * DAY);
    }

    #[test]
    fn huge_lookback_saturates() {
        let cursor = PollCursor::new(CursorMode::Lookback, i64::MAX);
        assert_eq!(cursor.from_date(1_700_000_000), 1_700_000_000 - i64::MAX);

        let cursor = PollCursor::new(CursorMode::Lookback, i64::MAX);
        assert_eq!(cursor.from_date(-10), i64::MIN);
    }

    #[test]
    fn mode_parses() {
        assert_eq!("advance".parse::<CursorMode>(), Ok(CursorMode::Advance));
        assert!("monotonic".parse::<CursorMode>().is_err());
    }
}

use std::future::Future;
use std::time::Duration;

use homework_core::{
    check_response, current_date, now_secs, parse_status, ChangeTracker, PollCursor,
    WatchError, NO_CHANGE_MESSAGE,
};
use tokio::time::sleep;
use tracing::{error, info};

use crate::api::StatusSource;
use crate::config::Settings;
use crate::notify::{send_message, Notifier};

/// What a completed cycle did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// `from_date` sent with the fetch.
    pub from_date: i64,
    /// Server time reported by the response, when present.
    pub current_date: Option<i64>,
    /// Entries in the `homeworks` list.
    pub homeworks: usize,
    /// Entries announced as a new state.
    pub changed: usize,
    /// Entries answered with the no-change message.
    pub unchanged: usize,
}

/// Result of one poll cycle, handed to the loop controller.
pub type CycleOutcome = Result<CycleReport, WatchError>;

/// Owns everything one poll loop needs: clients, seen states and the fetch cursor.
pub struct Watcher<S, N> {
    source: S,
    notifier: N,
    tracker: ChangeTracker,
    cursor: PollCursor,
    retry_period: Duration,
}

impl<S: StatusSource, N: Notifier> Watcher<S, N> {
    pub fn new(source: S, notifier: N, settings: &Settings) -> Self {
        Self {
            source,
            notifier,
            tracker: ChangeTracker::new(settings.track_by),
            cursor: PollCursor::new(
                settings.cursor,
                i64::try_from(settings.lookback.as_secs()).unwrap_or(i64::MAX),
            ),
            retry_period: settings.retry_period,
        }
    }

    pub fn tracker(&self) -> &ChangeTracker {
        &self.tracker
    }

    /// One fetch/validate/notify pass using the wall clock.
    pub async fn run_cycle(&mut self) -> CycleOutcome {
        self.run_cycle_at(now_secs()).await
    }

    /// One fetch/validate/notify pass as if the current time were `now`.
    ///
    /// Messages for items processed before a failing item have already been sent
    /// when this returns an error.
    pub async fn run_cycle_at(&mut self, now: i64) -> CycleOutcome {
        let from_date = self.cursor.from_date(now);
        let payload = self.source.fetch(from_date).await?;
        let homeworks = check_response(&payload)?;

        let mut report = CycleReport {
            from_date,
            current_date: current_date(&payload),
            homeworks: homeworks.len(),
            ..Default::default()
        };

        for item in homeworks {
            let verdict = parse_status(item)?;
            let homework = &verdict.homework;
            if self.tracker.observe(homework) {
                info!(homework = %homework.name, status = %homework.status, "status changed");
                send_message(&self.notifier, &verdict.message).await;
                report.changed += 1;
            } else {
                info!(homework = %homework.name, status = %homework.status, "status unchanged");
                send_message(&self.notifier, NO_CHANGE_MESSAGE).await;
                report.unchanged += 1;
            }
        }

        self.cursor.record_success(report.current_date);
        Ok(report)
    }

    /// Log a cycle's outcome and report failures to the chat.
    pub async fn handle_outcome(&self, outcome: &CycleOutcome) {
        match outcome {
            Ok(report) => info!(
                from_date = report.from_date,
                homeworks = report.homeworks,
                changed = report.changed,
                unchanged = report.unchanged,
                "poll cycle complete"
            ),
            Err(e) => {
                error!(kind = e.kind(), "poll cycle failed: {e}");
                send_message(&self.notifier, &failure_message(e)).await;
            }
        }
    }

    /// Run and handle a single cycle.
    pub async fn run_once(&mut self) -> CycleOutcome {
        let outcome = self.run_cycle().await;
        self.handle_outcome(&outcome).await;
        outcome
    }

    /// Poll forever, sleeping a fixed period after every cycle, until `shutdown`
    /// resolves. A cycle already in flight is finished before shutdown is noticed.
    pub async fn run<F: Future<Output = ()>>(&mut self, shutdown: F) {
        tokio::pin!(shutdown);
        loop {
            let outcome = self.run_cycle().await;
            self.handle_outcome(&outcome).await;
            tokio::select! {
                _ = &mut shutdown => {
                    info!("shutdown requested");
                    return;
                }
                _ = sleep(self.retry_period) => {}
            }
        }
    }
}

/// Chat text for a failed cycle.
pub fn failure_message(err: &WatchError) -> String {
    format!("Program failure: {err}")
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use homework_core::{CursorMode, HomeworkStatus, TrackBy};
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};
    use tokio::sync::Notify;

    use super::*;

    const DAY: i64 = 24 * 60 * 60;

    #[derive(Default)]
    struct ScriptedSource {
        responses: Mutex<VecDeque<Result<Value, WatchError>>>,
        requested: Mutex<Vec<i64>>,
        /// Signalled when the last scripted response is handed out.
        drained: Arc<Notify>,
    }

    impl ScriptedSource {
        fn push(&self, r: Result<Value, WatchError>) {
            self.responses.lock().unwrap().push_back(r);
        }
    }

    #[async_trait]
    impl StatusSource for ScriptedSource {
        async fn fetch(&self, from_date: i64) -> Result<Value, WatchError> {
            self.requested.lock().unwrap().push(from_date);
            let mut responses = self.responses.lock().unwrap();
            let next = responses.pop_front().expect("no scripted response left");
            if responses.is_empty() {
                self.drained.notify_one();
            }
            next
        }
    }

    #[derive(Default)]
    struct Recorder {
        sent: Mutex<Vec<String>>,
        fail: bool,
    }

    #[async_trait]
    impl Notifier for Recorder {
        async fn send(&self, text: &str) -> Result<(), WatchError> {
            self.sent.lock().unwrap().push(text.to_string());
            if self.fail {
                return Err(WatchError::NotifyFailure("chat unreachable".into()));
            }
            Ok(())
        }
    }

    fn settings(track_by: TrackBy, cursor: CursorMode) -> Settings {
        Settings {
            practicum_token: "p".into(),
            telegram_token: "t".into(),
            telegram_chat_id: "1".into(),
            endpoint: "http://unused".into(),
            telegram_api: "http://unused".into(),
            retry_period: Duration::from_millis(1),
            lookback: Duration::from_secs(20 * DAY as u64),
            request_timeout: Duration::from_secs(1),
            track_by,
            cursor,
            once: false,
        }
    }

    fn watcher(track_by: TrackBy, cursor: CursorMode) -> Watcher<ScriptedSource, Recorder> {
        Watcher::new(
            ScriptedSource::default(),
            Recorder::default(),
            &settings(track_by, cursor),
        )
    }

    fn sent(w: &Watcher<ScriptedSource, Recorder>) -> Vec<String> {
        w.notifier.sent.lock().unwrap().clone()
    }

    #[tokio::test]
    async fn notifies_new_then_no_change() {
        let mut w = watcher(TrackBy::Status, CursorMode::Lookback);
        let payload = json!({"homeworks": [{"homework_name": "HW1", "status": "approved"}]});
        w.source.push(Ok(payload.clone()));
        w.source.push(Ok(payload));

        let first = w.run_cycle_at(100 * DAY).await.unwrap();
        assert_eq!(first.changed, 1);
        let second = w.run_cycle_at(100 * DAY).await.unwrap();
        assert_eq!(second.unchanged, 1);

        assert_eq!(
            sent(&w),
            vec![
                format!(
                    "Changed review status of \"HW1\": {}",
                    HomeworkStatus::Approved.verdict()
                ),
                NO_CHANGE_MESSAGE.to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn failure_is_reported_and_loop_state_survives() {
        let mut w = watcher(TrackBy::Status, CursorMode::Lookback);
        w.source.push(Ok(json!({"homeworks": [{"homework_name": "HW2", "status": "archived"}]})));
        w.source.push(Err(WatchError::ResponseError {
            status: 503,
            url: "http://api/".into(),
        }));

        let outcome = w.run_cycle_at(100 * DAY).await;
        assert!(matches!(outcome, Err(WatchError::UnknownStatus(_))));
        w.handle_outcome(&outcome).await;

        let outcome = w.run_cycle_at(101 * DAY).await;
        w.handle_outcome(&outcome).await;

        assert_eq!(
            sent(&w),
            vec![
                "Program failure: unknown homework status \"archived\"".to_string(),
                "Program failure: unexpected response code 503 from http://api/ (expected 200)"
                    .to_string(),
            ]
        );
        assert_eq!(*w.source.requested.lock().unwrap(), vec![80 * DAY, 81 * DAY]);
        assert!(w.tracker().is_empty());
    }

    #[tokio::test]
    async fn notify_failure_does_not_abort_cycle() {
        let mut w = Watcher::new(
            ScriptedSource::default(),
            Recorder {
                fail: true,
                ..Default::default()
            },
            &settings(TrackBy::Status, CursorMode::Lookback),
        );
        w.source.push(Ok(json!({"homeworks": [
            {"homework_name": "a", "status": "reviewing"},
            {"homework_name": "b", "status": "rejected"}
        ]})));

        let report = w.run_cycle_at(100 * DAY).await.unwrap();
        assert_eq!(report.changed, 2);
        assert_eq!(sent(&w).len(), 2);
    }

    #[tokio::test]
    async fn homework_tracking_announces_each_item() {
        let mut w = watcher(TrackBy::Homework, CursorMode::Lookback);
        w.source.push(Ok(json!({"homeworks": [
            {"homework_name": "a", "status": "reviewing"},
            {"homework_name": "b", "status": "reviewing"}
        ]})));

        let report = w.run_cycle_at(100 * DAY).await.unwrap();
        assert_eq!((report.changed, report.unchanged), (2, 0));
    }

    #[tokio::test]
    async fn advancing_cursor_follows_current_date() {
        let mut w = watcher(TrackBy::Status, CursorMode::Advance);
        w.source.push(Ok(json!({"homeworks": [], "current_date": 99 * DAY})));
        w.source.push(Err(WatchError::RequestFailure {
            url: "http://api/".into(),
            reason: "connection reset".into(),
        }));
        w.source.push(Ok(json!({"homeworks": []})));

        w.run_cycle_at(100 * DAY).await.unwrap();
        w.run_cycle_at(101 * DAY).await.unwrap_err();
        w.run_cycle_at(102 * DAY).await.unwrap();

        assert_eq!(
            *w.source.requested.lock().unwrap(),
            vec![80 * DAY, 99 * DAY, 99 * DAY]
        );
    }

    #[tokio::test]
    async fn run_stops_on_shutdown() {
        let mut w = watcher(TrackBy::Status, CursorMode::Lookback);
        w.source.push(Ok(json!({"homeworks": []})));
        w.run(async {}).await;
        assert_eq!(w.source.requested.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn run_keeps_polling_after_a_failed_cycle() {
        let mut w = watcher(TrackBy::Status, CursorMode::Lookback);
        w.source.push(Err(WatchError::RequestFailure {
            url: "http://api/".into(),
            reason: "connection reset".into(),
        }));
        w.source.push(Ok(json!({"homeworks": [{"homework_name": "HW1", "status": "reviewing"}]})));

        let drained = w.source.drained.clone();
        w.run(async move { drained.notified().await }).await;

        assert_eq!(w.source.requested.lock().unwrap().len(), 2);
        assert_eq!(
            sent(&w),
            vec![
                "Program failure: request to http://api/ failed: connection reset".to_string(),
                format!(
                    "Changed review status of \"HW1\": {}",
                    HomeworkStatus::Reviewing.verdict()
                ),
            ]
        );
        assert_eq!(w.tracker().len(), 1);
    }

    #[test]
    fn oversized_lookback_does_not_wrap() {
        let mut s = settings(TrackBy::Status, CursorMode::Lookback);
        s.lookback = Duration::from_secs(u64::MAX);
        let w = Watcher::new(ScriptedSource::default(), Recorder::default(), &s);
        assert_eq!(w.cursor.from_date(0), -i64::MAX);
    }
}

use api_client::MarketApi;
use configuration::PollingSettings;
use core_types::AdminLogs;
use events::JobStatus;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Follows a running backend job by polling its log.
pub struct LogPoller {
    api: Arc<dyn MarketApi>,
    interval: Duration,
    completion_marker: String,
    max_duration: Option<Duration>,
}

/// A running poller. Dropping the handle does not stop the task; call `cancel`.
pub struct PollHandle {
    logs: watch::Receiver<AdminLogs>,
    token: CancellationToken,
    task: JoinHandle<JobStatus>,
}

impl PollHandle {
    /// Latest log snapshot, updated on every successful poll.
    pub fn subscribe(&self) -> watch::Receiver<AdminLogs> {
        self.logs.clone()
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Waits for the poller to stop and returns why it stopped.
    pub async fn join(self) -> JobStatus {
        match self.task.await {
            Ok(status) => status,
            Err(e) => JobStatus::Failed(format!("log poller task failed: {e}")),
        }
    }
}

impl LogPoller {
    pub fn new(api: Arc<dyn MarketApi>, settings: &PollingSettings) -> Self {
        Self {
            api,
            interval: settings.interval,
            completion_marker: settings.completion_marker.clone(),
            max_duration: settings.max_duration,
        }
    }

    /// Starts polling on the runtime. The poller stops with `parent` as well.
    pub fn spawn(self, parent: &CancellationToken) -> PollHandle {
        let token = parent.child_token();
        let (tx, rx) = watch::channel(AdminLogs::default());
        let task = tokio::spawn(self.run(token.clone(), tx));
        PollHandle {
            logs: rx,
            token,
            task,
        }
    }

    async fn run(self, token: CancellationToken, tx: watch::Sender<AdminLogs>) -> JobStatus {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let deadline = self.max_duration.map(|max| Instant::now() + max);

        tracing::info!(
            interval = ?self.interval,
            marker = %self.completion_marker,
            "Following job logs."
        );

        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => return self.stopped(JobStatus::Cancelled),
                _ = sleep_until(deadline) => return self.stopped(JobStatus::TimedOut),
                _ = ticker.tick() => {}
            }

            let fetched = tokio::select! {
                biased;
                _ = token.cancelled() => return self.stopped(JobStatus::Cancelled),
                _ = sleep_until(deadline) => return self.stopped(JobStatus::TimedOut),
                fetched = self.api.logs() => fetched,
            };

            match fetched {
                Ok(logs) => {
                    let done = logs.newest_contains(&self.completion_marker);
                    tx.send_replace(logs);
                    if done {
                        return self.stopped(JobStatus::Completed);
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        transient = e.is_transient(),
                        "Log poll failed; retrying on the next tick."
                    );
                }
            }
        }
    }

    fn stopped(&self, status: JobStatus) -> JobStatus {
        tracing::info!(?status, "Stopped following job logs.");
        status
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{StubApi, logs};
    use std::sync::atomic::Ordering;

    fn settings(max_duration: Option<Duration>) -> PollingSettings {
        PollingSettings {
            max_duration,
            ..PollingSettings::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn stops_when_the_newest_line_has_the_marker() {
        let api = Arc::new(StubApi::with_logs(vec![
            Some(logs(&["Triggering retraining..."])),
            Some(logs(&["Triggering retraining...", "epoch 1"])),
            Some(logs(&["epoch 1", "[10:02:11] Training Complete"])),
        ]));
        let started = Instant::now();
        let handle = LogPoller::new(api.clone(), &settings(None)).spawn(&CancellationToken::new());
        let rx = handle.subscribe();

        assert_eq!(handle.join().await, JobStatus::Completed);
        assert_eq!(api.log_calls.load(Ordering::SeqCst), 3);
        assert!(started.elapsed() >= Duration::from_secs(4));
        assert!(rx.borrow().newest_contains("Training Complete"));
    }

    #[tokio::test(start_paused = true)]
    async fn poll_errors_are_skipped() {
        let api = Arc::new(StubApi::with_logs(vec![
            None,
            None,
            Some(logs(&["Training Complete"])),
        ]));
        let handle = LogPoller::new(api.clone(), &settings(None)).spawn(&CancellationToken::new());
        assert_eq!(handle.join().await, JobStatus::Completed);
        assert_eq!(api.log_calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelling_the_parent_stops_polling() {
        let api = Arc::new(StubApi::with_logs(vec![Some(logs(&["epoch 1"]))]));
        let parent = CancellationToken::new();
        let handle = LogPoller::new(api.clone(), &settings(None)).spawn(&parent);

        tokio::time::sleep(Duration::from_secs(5)).await;
        parent.cancel();
        assert_eq!(handle.join().await, JobStatus::Cancelled);

        let calls = api.log_calls.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(api.log_calls.load(Ordering::SeqCst), calls);
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_after_max_duration() {
        let api = Arc::new(StubApi::with_logs(vec![Some(logs(&["epoch 1"]))]));
        let handle = LogPoller::new(api, &settings(Some(Duration::from_secs(7))))
            .spawn(&CancellationToken::new());
        assert_eq!(handle.join().await, JobStatus::TimedOut);
    }
}

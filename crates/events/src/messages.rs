use chrono::{DateTime, Utc};
use core_types::Sourced;
use serde::{Deserialize, Serialize};

/// A fetch-lifecycle event for a view whose data is a `T`.
///
/// The `#[serde(tag = "type", content = "payload")]` attribute serializes an
/// event as `{"type": "FetchFailed", "payload": "..."}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum ViewEvent<T> {
    /// A (re)load was issued. The previous snapshot is discarded.
    FetchStarted,
    /// The fetch produced a complete snapshot.
    FetchSucceeded(Sourced<T>),
    /// The fetch succeeded but there is nothing to show.
    FetchEmpty(String),
    FetchFailed(String),
    /// The view was torn down. Nothing is applied afterwards.
    Cancelled,
}

impl<T> ViewEvent<T> {
    /// Whether this event finishes a fetch started by `FetchStarted`.
    pub fn is_completion(&self) -> bool {
        matches!(
            self,
            ViewEvent::FetchSucceeded(_) | ViewEvent::FetchEmpty(_) | ViewEvent::FetchFailed(_)
        )
    }
}

/// Lifecycle of a backend job (pipeline run or retraining) as seen by the client.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "status", content = "detail")]
pub enum JobStatus {
    #[default]
    Idle,
    Running {
        since: DateTime<Utc>,
    },
    /// The completion marker appeared on the newest log line.
    Completed,
    Failed(String),
    Cancelled,
    /// The configured follow duration elapsed first.
    TimedOut,
}

impl JobStatus {
    pub fn running_now() -> Self {
        JobStatus::Running { since: Utc::now() }
    }

    /// Polling is only performed while this is true.
    pub fn is_active(&self) -> bool {
        matches!(self, JobStatus::Running { .. })
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Completed | JobStatus::Failed(_) | JobStatus::Cancelled | JobStatus::TimedOut
        )
    }
}

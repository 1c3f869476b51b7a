use crate::messages::ViewEvent;
use core_types::Sourced;
use serde::{Deserialize, Serialize};

/// What a view currently shows.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "state", content = "value")]
pub enum ViewState<T> {
    #[default]
    Idle,
    Loading,
    Ready(Sourced<T>),
    /// Loaded successfully with nothing to display.
    Empty(String),
    Failed(String),
    /// Terminal. Late events are dropped.
    Cancelled,
}

impl<T> ViewState<T> {
    /// Advances the machine and reports whether `event` was applied.
    ///
    /// Completions are only accepted while `Loading`, so a result that lands
    /// after a newer fetch (or after cancellation) never overwrites the view.
    pub fn apply(&mut self, event: ViewEvent<T>) -> bool {
        if matches!(self, ViewState::Cancelled) {
            tracing::debug!("Dropping event for a cancelled view.");
            return false;
        }

        let next = match event {
            ViewEvent::Cancelled => ViewState::Cancelled,
            ViewEvent::FetchStarted => ViewState::Loading,
            completion if !matches!(self, ViewState::Loading) => {
                tracing::debug!(
                    completion = completion.is_completion(),
                    "Dropping completion that arrived outside a fetch."
                );
                return false;
            }
            ViewEvent::FetchSucceeded(snapshot) => ViewState::Ready(snapshot),
            ViewEvent::FetchEmpty(message) => ViewState::Empty(message),
            ViewEvent::FetchFailed(message) => ViewState::Failed(message),
        };
        *self = next;
        true
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, ViewState::Loading)
    }

    pub fn snapshot(&self) -> Option<&Sourced<T>> {
        match self {
            ViewState::Ready(snapshot) => Some(snapshot),
            _ => None,
        }
    }

    pub fn into_snapshot(self) -> Option<Sourced<T>> {
        match self {
            ViewState::Ready(snapshot) => Some(snapshot),
            _ => None,
        }
    }
}

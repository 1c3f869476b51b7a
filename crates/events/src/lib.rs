//! # Bankdash Events
//!
//! This crate defines the events that drive every view of the dashboard client
//! and the state machine they advance.
//!
//! As a Layer 0 crate, it depends only on `core-types`. A view never mutates its
//! state directly: it applies a `ViewEvent` and the `ViewState` decides whether
//! the transition is legal.

pub mod messages;
pub mod state;

pub use messages::{JobStatus, ViewEvent};
pub use state::ViewState;

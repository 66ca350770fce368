#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Dashboard pages for the lovebug map.
//!
//! Everything here is front-end agnostic: page state, derived numbers,
//! display formatting, the report form, and the wiring that merges
//! polled and pushed data into one [`poll::ViewState`]. The terminal
//! binary renders these; a different front-end could too.

pub mod boundary;
pub mod config;
pub mod context;
pub mod form;
pub mod format;
pub mod poll;
pub mod routes;
pub mod toast;
pub mod views;

pub use boundary::{ErrorBoundary, FailurePanel, PageOutcome};
pub use config::{ConfigError, DashboardConfig};
pub use context::AppContext;
pub use form::{FormError, ReportForm, SubmitError};
pub use poll::{PollKind, UpdateSource, ViewState};
pub use routes::Route;
pub use toast::{Toast, ToastPhase};

//! Per-page failure containment.
//!
//! A page that errors or panics is replaced by a [`FailurePanel`] with a
//! retry prompt. The rest of the app keeps running.

use std::any::Any;
use std::fmt::Display;
use std::future::Future;
use std::panic::AssertUnwindSafe;

use futures::FutureExt as _;

use crate::routes::Route;

/// What a failed page shows instead of its content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailurePanel {
    /// Page that failed.
    pub route: Route,
    /// Headline.
    pub title: &'static str,
    /// Explanation for the user.
    pub message: &'static str,
    /// Retry hint.
    pub retry_hint: &'static str,
    /// Error text, only populated in debug builds.
    pub details: Option<String>,
}

/// Result of running a page inside an [`ErrorBoundary`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageOutcome<T> {
    /// The page produced its content.
    Rendered(T),
    /// The page failed.
    Failed(FailurePanel),
}

impl<T> PageOutcome<T> {
    /// Whether the page failed.
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// Catches page failures for one route.
#[derive(Debug, Clone, Copy)]
pub struct ErrorBoundary {
    route: Route,
}

impl ErrorBoundary {
    /// Creates a boundary for `route`.
    #[must_use]
    pub const fn new(route: Route) -> Self {
        Self { route }
    }

    /// Runs `page`, converting an error or a panic into a
    /// [`PageOutcome::Failed`].
    pub async fn run<T, E, F>(&self, page: F) -> PageOutcome<T>
    where
        E: Display,
        F: Future<Output = Result<T, E>>,
    {
        match AssertUnwindSafe(page).catch_unwind().await {
            Ok(Ok(content)) => PageOutcome::Rendered(content),
            Ok(Err(e)) => PageOutcome::Failed(self.fail(e.to_string())),
            Err(panic) => PageOutcome::Failed(self.fail(panic_message(panic.as_ref()))),
        }
    }

    fn fail(&self, details: String) -> FailurePanel {
        let details = if cfg!(debug_assertions) {
            log::error!("Page {} failed: {details}", self.route);
            Some(details)
        } else {
            log::error!("Page {} failed", self.route);
            None
        };

        FailurePanel {
            route: self.route,
            title: "Something went wrong",
            message: "This page could not be displayed.",
            retry_hint: "Try again",
            details,
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    panic
        .downcast_ref::<&str>()
        .map(ToString::to_string)
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}

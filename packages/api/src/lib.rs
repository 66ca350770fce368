#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Data access for the lovebug map REST API.
//!
//! The [`LovebugApi`] trait is the transport seam; [`HttpApi`] implements
//! it over `reqwest`. Views talk to [`DataAccess`], which keeps the UI
//! populated when the API is unreachable: reads fall back to generated
//! [`sample`] data, while writes always propagate their error so a failed
//! submission is never reported as a success.

pub mod http;
pub mod sample;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use lovebug_report_models::{Hotspot, NewReport, Report, SearchFilter, Stats};

pub use http::HttpApi;

/// Default API base URL for local development.
pub const DEFAULT_API_URL: &str = "http://localhost:8000/api/v1";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors that can occur talking to the API.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Transport-level failure (connect, timeout, TLS, body read).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    Status {
        /// Response status code.
        status: u16,
        /// Request URL.
        url: String,
    },

    /// The response body did not match the expected shape.
    #[error("JSON decode error: {message}")]
    Decode {
        /// Description of what went wrong.
        message: String,
    },

    /// The report ID cannot be placed in a URL path.
    #[error("Invalid report ID: {0:?}")]
    InvalidId(String),
}

/// The REST operations the dashboard consumes.
#[async_trait]
pub trait LovebugApi: Send + Sync {
    /// `GET /reports`
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the request or decoding fails.
    async fn fetch_reports(&self, filter: &SearchFilter) -> Result<Vec<Report>, ApiError>;

    /// `GET /hotspots`
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the request or decoding fails.
    async fn fetch_hotspots(&self, filter: &SearchFilter) -> Result<Vec<Hotspot>, ApiError>;

    /// `GET /stats`
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the request or decoding fails.
    async fn fetch_stats(&self, filter: &SearchFilter) -> Result<Stats, ApiError>;

    /// `POST /reports`
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the request or decoding fails.
    async fn create_report(&self, report: &NewReport) -> Result<Report, ApiError>;

    /// `POST /reports/{id}/verify`
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the request or decoding fails.
    async fn verify_report(&self, id: &str) -> Result<Report, ApiError>;
}

/// Read/write facade used by the views.
#[derive(Clone)]
pub struct DataAccess {
    api: Arc<dyn LovebugApi>,
}

impl DataAccess {
    /// Wraps an API implementation.
    #[must_use]
    pub fn new(api: Arc<dyn LovebugApi>) -> Self {
        Self { api }
    }

    /// Builds a [`DataAccess`] backed by [`HttpApi`].
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Http`] if the HTTP client cannot be built.
    pub fn http(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        Ok(Self::new(Arc::new(HttpApi::new(base_url, timeout)?)))
    }

    /// Fetches reports, falling back to sample data on any error.
    pub async fn get_reports(&self, filter: &SearchFilter) -> Vec<Report> {
        match self.api.fetch_reports(filter).await {
            Ok(reports) => reports,
            Err(e) => {
                log::error!("Error fetching reports, using sample data: {e}");
                sample::reports(&mut rand::rng())
            }
        }
    }

    /// Fetches hotspots, falling back to sample data on any error.
    pub async fn get_hotspots(&self, filter: &SearchFilter) -> Vec<Hotspot> {
        match self.api.fetch_hotspots(filter).await {
            Ok(hotspots) => hotspots,
            Err(e) => {
                log::error!("Error fetching hotspots, using sample data: {e}");
                sample::hotspots(&mut rand::rng())
            }
        }
    }

    /// Fetches stats, falling back to sample data on any error.
    pub async fn get_stats(&self, filter: &SearchFilter) -> Stats {
        match self.api.fetch_stats(filter).await {
            Ok(stats) => stats,
            Err(e) => {
                log::error!("Error fetching stats, using sample data: {e}");
                sample::stats(&mut rand::rng())
            }
        }
    }

    /// Submits a new report.
    ///
    /// # Errors
    ///
    /// Propagates any [`ApiError`]; never substitutes sample data.
    pub async fn create_report(&self, report: &NewReport) -> Result<Report, ApiError> {
        self.api
            .create_report(report)
            .await
            .inspect_err(|e| log::error!("Error creating report: {e}"))
    }

    /// Marks a report as verified.
    ///
    /// # Errors
    ///
    /// Propagates any [`ApiError`]; never substitutes sample data.
    pub async fn verify_report(&self, id: &str) -> Result<Report, ApiError> {
        self.api
            .verify_report(id)
            .await
            .inspect_err(|e| log::error!("Error verifying report {id}: {e}"))
    }
}

//! Report submission form.

use chrono::{DateTime, Utc};
use lovebug_api::{ApiError, DataAccess};
use lovebug_report_models::{Location, NewReport, Platform, Report, Severity};

/// Coordinates attached to hand-submitted reports until addresses are
/// geocoded.
pub const SUBMISSION_COORDINATES: (f64, f64) = (37.5665, 126.9780);

/// Confidence assigned to hand-submitted reports.
pub const SUBMISSION_CONFIDENCE: f64 = 0.8;

/// A form field failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    /// The address is blank.
    #[error("Please enter an address.")]
    AddressRequired,
    /// The description is blank.
    #[error("Please enter a description.")]
    DescriptionRequired,
}

/// Why a submission did not go through.
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    /// The form is incomplete; nothing was sent.
    #[error(transparent)]
    Invalid(#[from] FormError),
    /// The server rejected the report or could not be reached.
    #[error("Failed to submit report: {0}")]
    Api(#[from] ApiError),
}

/// Fields of the report form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportForm {
    /// Where the sighting happened.
    pub address: String,
    /// How bad it is.
    pub severity: Severity,
    /// Where the user came from.
    pub platform: Platform,
    /// Free-text description.
    pub description: String,
    /// Attached photo file names.
    pub photos: Vec<String>,
}

impl Default for ReportForm {
    fn default() -> Self {
        Self {
            address: String::new(),
            severity: Severity::Medium,
            platform: Platform::Google,
            description: String::new(),
            photos: Vec::new(),
        }
    }
}

impl ReportForm {
    /// Checks required fields, address first.
    ///
    /// # Errors
    ///
    /// Returns the first [`FormError`] found.
    pub fn validate(&self) -> Result<(), FormError> {
        if self.address.trim().is_empty() {
            return Err(FormError::AddressRequired);
        }
        if self.description.trim().is_empty() {
            return Err(FormError::DescriptionRequired);
        }
        Ok(())
    }

    /// Builds the request body for a valid form.
    ///
    /// # Errors
    ///
    /// Returns [`FormError`] if the form does not validate.
    pub fn to_new_report(&self, now: DateTime<Utc>) -> Result<NewReport, FormError> {
        self.validate()?;

        let address = self.address.trim().to_string();
        let mut location = Location::new(SUBMISSION_COORDINATES.0, SUBMISSION_COORDINATES.1);
        location.address = Some(address.clone());

        Ok(NewReport {
            content: self.description.clone(),
            description: Some(self.description.clone()),
            location,
            address: Some(address),
            severity: self.severity,
            platform: self.platform,
            created_at: now,
            keywords: vec!["lovebug".to_string(), "report".to_string()],
            confidence: SUBMISSION_CONFIDENCE,
            sentiment: 0.0,
            photos: self.photos.clone(),
        })
    }

    /// Validates, submits, and clears the form on success. Nothing is
    /// sent if validation fails, and failures are not retried.
    ///
    /// # Errors
    ///
    /// Returns [`SubmitError::Invalid`] for an incomplete form and
    /// [`SubmitError::Api`] if the request fails.
    pub async fn submit(&mut self, data: &DataAccess) -> Result<Report, SubmitError> {
        let report = self.to_new_report(Utc::now())?;
        let created = data.create_report(&report).await?;
        log::info!("Submitted report {}", created.id);
        self.reset();
        Ok(created)
    }

    /// Restores the defaults.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use lovebug_api::LovebugApi;
    use lovebug_report_models::{Hotspot, SearchFilter, Stats};

    use super::*;

    /// Echoes created reports back, or fails if `fail` is set.
    #[derive(Default)]
    struct FakeApi {
        creates: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl LovebugApi for FakeApi {
        async fn fetch_reports(&self, _: &SearchFilter) -> Result<Vec<Report>, ApiError> {
            Ok(Vec::new())
        }
        async fn fetch_hotspots(&self, _: &SearchFilter) -> Result<Vec<Hotspot>, ApiError> {
            Ok(Vec::new())
        }
        async fn fetch_stats(&self, _: &SearchFilter) -> Result<Stats, ApiError> {
            Ok(Stats::default())
        }
        async fn create_report(&self, report: &NewReport) -> Result<Report, ApiError> {
            self.creates.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(ApiError::Status {
                    status: 500,
                    url: "http://test/reports".to_string(),
                });
            }
            Ok(Report {
                id: "created-1".to_string(),
                content: report.content.clone(),
                description: report.description.clone(),
                location: report.location.clone(),
                address: report.address.clone(),
                severity: report.severity,
                platform: report.platform,
                created_at: report.created_at,
                keywords: report.keywords.clone(),
                confidence: report.confidence,
                sentiment: report.sentiment,
                photos: report.photos.clone(),
                verified: false,
                verification_count: 0,
                user_id: None,
                reported_at: None,
            })
        }
        async fn verify_report(&self, _: &str) -> Result<Report, ApiError> {
            Err(ApiError::InvalidId(String::new()))
        }
    }

    fn filled() -> ReportForm {
        ReportForm {
            address: "Seoul Eunpyeong-gu Bulgwang-dong".to_string(),
            description: "Dozens on the playground slide".to_string(),
            severity: Severity::High,
            ..ReportForm::default()
        }
    }

    #[test]
    fn defaults() {
        let form = ReportForm::default();
        assert_eq!(form.severity, Severity::Medium);
        assert_eq!(form.platform, Platform::Google);
    }

    #[test]
    fn address_checked_before_description() {
        let form = ReportForm::default();
        assert_eq!(form.validate(), Err(FormError::AddressRequired));

        let form = ReportForm {
            address: "   ".to_string(),
            description: "bugs".to_string(),
            ..ReportForm::default()
        };
        assert_eq!(form.validate(), Err(FormError::AddressRequired));

        let form = ReportForm {
            address: "Seoul".to_string(),
            description: "\n".to_string(),
            ..ReportForm::default()
        };
        assert_eq!(form.validate(), Err(FormError::DescriptionRequired));
    }

    #[test]
    fn builds_submission_body() {
        let now = Utc::now();
        let report = filled().to_new_report(now).unwrap();
        assert_eq!(report.content, "Dozens on the playground slide");
        assert_eq!(report.keywords, vec!["lovebug", "report"]);
        assert!((report.confidence - 0.8).abs() < f64::EPSILON);
        assert!(report.sentiment.abs() < f64::EPSILON);
        assert_eq!(report.created_at, now);
        assert_eq!(
            report.location.address.as_deref(),
            Some("Seoul Eunpyeong-gu Bulgwang-dong")
        );
        assert!((report.location.latitude - SUBMISSION_COORDINATES.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn invalid_form_never_hits_the_network() {
        let api = Arc::new(FakeApi::default());
        let data = DataAccess::new(api.clone());

        let mut form = ReportForm {
            description: "no address".to_string(),
            ..ReportForm::default()
        };
        let err = form.submit(&data).await.unwrap_err();
        assert!(matches!(err, SubmitError::Invalid(FormError::AddressRequired)));

        let mut form = ReportForm {
            address: "Seoul".to_string(),
            ..ReportForm::default()
        };
        let err = form.submit(&data).await.unwrap_err();
        assert!(matches!(err, SubmitError::Invalid(FormError::DescriptionRequired)));

        assert_eq!(api.creates.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn success_resets_form() {
        let api = Arc::new(FakeApi::default());
        let data = DataAccess::new(api.clone());
        let mut form = filled();

        let created = form.submit(&data).await.unwrap();
        assert_eq!(created.severity, Severity::High);
        assert_eq!(form, ReportForm::default());
        assert_eq!(api.creates.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failure_keeps_input_and_surfaces_error() {
        let api = Arc::new(FakeApi {
            fail: true,
            ..FakeApi::default()
        });
        let data = DataAccess::new(api.clone());
        let mut form = filled();

        let err = form.submit(&data).await.unwrap_err();
        assert!(matches!(err, SubmitError::Api(ApiError::Status { status: 500, .. })));
        assert_eq!(form, filled());
        assert_eq!(api.creates.load(Ordering::SeqCst), 1);
    }
}

//! Application root: configuration, data access, the single live client,
//! and the shared view state it feeds.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use chrono::Utc;
use lovebug_api::{ApiError, DataAccess};
use lovebug_live::{ConnectionState, LiveClient, LiveEventKind, LiveMessage, SubscriptionId};
use lovebug_report_models::SearchFilter;

use crate::config::DashboardConfig;
use crate::poll::{PollKind, ViewState, poll_once};
use crate::toast::Toast;

const PUSHED_KINDS: [LiveEventKind; 3] = [
    LiveEventKind::NewReport,
    LiveEventKind::StatsUpdate,
    LiveEventKind::HotspotUpdate,
];

/// Everything the pages share. Created once at startup; call
/// [`AppContext::shutdown`] on exit.
pub struct AppContext {
    config: DashboardConfig,
    data: DataAccess,
    live: LiveClient,
    state: Arc<Mutex<ViewState>>,
    toast: Arc<Mutex<Toast>>,
    subscriptions: Vec<(LiveEventKind, SubscriptionId)>,
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("config", &self.config)
            .field("live", &self.live)
            .finish_non_exhaustive()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl AppContext {
    /// Builds the HTTP data layer and the websocket client from `config`.
    /// Must be called inside a tokio runtime.
    ///
    /// # Errors
    ///
    /// * If the HTTP client cannot be built
    pub fn start(config: DashboardConfig) -> Result<Self, ApiError> {
        let data = DataAccess::http(&config.api_url, config.request_timeout())?;
        let live = LiveClient::websocket(&config.ws_url);
        Ok(Self::with_parts(config, data, live))
    }

    /// Wires an existing data layer and live client together.
    #[must_use]
    pub fn with_parts(config: DashboardConfig, data: DataAccess, live: LiveClient) -> Self {
        let state = Arc::new(Mutex::new(ViewState::default()));
        let toast = Arc::new(Mutex::new(Toast::default()));

        let subscriptions = PUSHED_KINDS
            .iter()
            .map(|kind| {
                let state = Arc::clone(&state);
                let toast = Arc::clone(&toast);
                let id = live.subscribe(kind, move |message: &LiveMessage| {
                    on_push(&state, &toast, message);
                });
                (*kind, id)
            })
            .collect();

        Self {
            config,
            data,
            live,
            state,
            toast,
            subscriptions,
        }
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &DashboardConfig {
        &self.config
    }

    /// The read/write facade.
    #[must_use]
    pub const fn data(&self) -> &DataAccess {
        &self.data
    }

    /// The live client.
    #[must_use]
    pub const fn live(&self) -> &LiveClient {
        &self.live
    }

    /// Connection state for the indicator.
    #[must_use]
    pub fn connection(&self) -> ConnectionState {
        self.live.state()
    }

    /// Opens the push channel. A failure is logged and left to the
    /// reconnect loop.
    pub async fn connect_live(&self) {
        if let Err(e) = self.live.connect().await {
            log::warn!("Live updates unavailable for now: {e}");
        }
    }

    /// Starts opening the push channel in the background. Pages render
    /// from polled data meanwhile and the indicator follows the state.
    pub fn start_live(&self) {
        self.live.start();
    }

    /// Copy of the current view state.
    #[must_use]
    pub fn snapshot(&self) -> ViewState {
        lock(&self.state).clone()
    }

    /// Runs `f` with the toast locked.
    pub fn with_toast<R>(&self, f: impl FnOnce(&mut Toast) -> R) -> R {
        f(&mut lock(&self.toast))
    }

    /// Polls one resource and stores the result.
    pub async fn refresh(&self, kind: PollKind, filter: &SearchFilter) {
        let polled = poll_once(&self.data, filter, kind).await;
        lock(&self.state).apply_poll(polled, Utc::now());
    }

    /// Refreshes stats, reports and hotspots.
    pub async fn refresh_all(&self, filter: &SearchFilter) {
        for kind in PollKind::all() {
            self.refresh(*kind, filter).await;
        }
    }

    /// Drops the subscriptions and stops the live client.
    pub async fn shutdown(self) {
        for (kind, id) in &self.subscriptions {
            self.live.unsubscribe(kind, *id);
        }
        self.live.shutdown().await;
        log::debug!("App context shut down");
    }
}

fn on_push(state: &Mutex<ViewState>, toast: &Mutex<Toast>, message: &LiveMessage) {
    if !lock(state).apply_live(message, Utc::now()) {
        return;
    }
    if message.kind() != Some(LiveEventKind::NewReport) {
        return;
    }
    if let Ok(report) = message.report() {
        lock(toast).show(report, Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;
    use lovebug_api::LovebugApi;
    use lovebug_live::{Connector, FrameStream, LiveError};
    use lovebug_report_models::{Hotspot, NewReport, Report, Severity, Stats};
    use tokio::sync::mpsc;

    use super::*;

    /// Every call fails, so reads fall back to sample data.
    struct Offline;

    fn offline() -> ApiError {
        ApiError::Status {
            status: 503,
            url: "http://test/api".to_string(),
        }
    }

    #[async_trait]
    impl LovebugApi for Offline {
        async fn fetch_reports(&self, _: &SearchFilter) -> Result<Vec<Report>, ApiError> {
            Err(offline())
        }

        async fn fetch_hotspots(&self, _: &SearchFilter) -> Result<Vec<Hotspot>, ApiError> {
            Err(offline())
        }

        async fn fetch_stats(&self, _: &SearchFilter) -> Result<Stats, ApiError> {
            Err(offline())
        }

        async fn create_report(&self, _: &NewReport) -> Result<Report, ApiError> {
            Err(offline())
        }

        async fn verify_report(&self, _: &str) -> Result<Report, ApiError> {
            Err(offline())
        }
    }

    struct Scripted {
        frames: Mutex<Option<mpsc::UnboundedReceiver<Result<String, LiveError>>>>,
    }

    #[async_trait]
    impl Connector for Scripted {
        async fn connect(&self, _url: &str) -> Result<FrameStream, LiveError> {
            let rx = self.frames.lock().unwrap().take().ok_or(LiveError::Transport {
                message: "already used".to_string(),
            })?;
            Ok(Box::pin(futures::stream::unfold(rx, |mut rx| async move {
                rx.recv().await.map(|frame| (frame, rx))
            })))
        }
    }

    fn context() -> (AppContext, mpsc::UnboundedSender<Result<String, LiveError>>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let live = LiveClient::new(
            "ws://test/ws",
            Scripted {
                frames: Mutex::new(Some(rx)),
            },
        );
        let data = DataAccess::new(Arc::new(Offline));
        (
            AppContext::with_parts(DashboardConfig::default(), data, live),
            tx,
        )
    }

    async fn wait_for(ctx: &AppContext, done: impl Fn(&ViewState) -> bool) {
        for _ in 0..200 {
            if done(&ctx.snapshot()) {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("view state never updated");
    }

    #[tokio::test]
    async fn pushed_report_updates_state_and_toast() {
        let (ctx, frames) = context();
        ctx.connect_live().await;
        assert_eq!(ctx.connection(), ConnectionState::Connected);

        frames
            .send(Ok(r#"{"type":"new_report","data":{
                "id":"push-1","content":"swarm at the bus stop",
                "location":{"latitude":37.5,"longitude":127.0},
                "severity":"high","platform":"naver",
                "created_at":"2024-06-21T08:30:00Z"}}"#
                .to_string()))
            .unwrap();
        wait_for(&ctx, |state| state.reports().is_some()).await;

        let state = ctx.snapshot();
        let reports = &state.reports().unwrap().value;
        assert_eq!(reports[0].id, "push-1");
        let shown = ctx.with_toast(|toast| toast.current(Instant::now()).map(|r| r.severity));
        assert_eq!(shown, Some(Severity::High));

        ctx.shutdown().await;
    }

    #[tokio::test]
    async fn undecodable_push_leaves_toast_alone() {
        let (ctx, frames) = context();
        ctx.connect_live().await;

        frames
            .send(Ok(r#"{"type":"new_report","data":{"id":42}}"#.to_string()))
            .unwrap();
        frames
            .send(Ok(r#"{"type":"hotspot_update","data":[]}"#.to_string()))
            .unwrap();
        wait_for(&ctx, |state| state.hotspots().is_some()).await;

        assert!(ctx.snapshot().reports().is_none());
        assert!(ctx.with_toast(|toast| toast.current(Instant::now()).is_none()));

        ctx.shutdown().await;
    }

    #[tokio::test]
    async fn start_live_does_not_wait_for_the_channel() {
        let (ctx, _frames) = context();
        ctx.start_live();
        let mut states = ctx.live().watch_state();
        states.wait_for(|s| s.is_connected()).await.unwrap();
        assert_eq!(ctx.connection(), ConnectionState::Connected);

        ctx.shutdown().await;
    }

    #[tokio::test]
    async fn refresh_all_fills_every_resource() {
        let (ctx, _frames) = context();
        ctx.refresh_all(&SearchFilter::with_hours(24)).await;

        let state = ctx.snapshot();
        assert!(state.stats().is_some());
        assert!(state.reports().is_some());
        assert!(state.hotspots().is_some());

        ctx.shutdown().await;
    }
}

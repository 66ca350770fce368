//! Tokio driver for the reconnect [`Machine`].
//!
//! A [`LiveClient`] owns one background task. The task holds the
//! transport and the reconnect timer and feeds the machine; the client
//! handle talks to it over a channel and observes state through a
//! [`watch`] channel. Subscriptions are shared directly so they work in
//! any state, including before the first connect.

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use futures::{Stream, StreamExt as _};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::LiveError;
use crate::machine::{Command, ConnectionState, Event, Machine, ReconnectPolicy};
use crate::message::LiveMessage;
use crate::subscribers::{Subscribers, SubscriptionId, dispatch};
use crate::ws::WsConnector;

/// Incoming text frames. The stream ending means the transport closed.
pub type FrameStream = Pin<Box<dyn Stream<Item = Result<String, LiveError>> + Send>>;

type Opening = Pin<Box<dyn Future<Output = Result<FrameStream, LiveError>> + Send>>;

/// Opens push-channel transports.
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    /// Opens a transport to `url`.
    ///
    /// # Errors
    ///
    /// Returns [`LiveError::Transport`] if the connection cannot be
    /// established.
    async fn connect(&self, url: &str) -> Result<FrameStream, LiveError>;
}

enum Request {
    Connect(Option<oneshot::Sender<bool>>),
    Disconnect,
    Shutdown,
}

/// Handle to a reconnecting push-channel connection.
///
/// Must be created inside a tokio runtime. Dropping the handle stops the
/// background task; [`LiveClient::shutdown`] does the same and waits for
/// it.
pub struct LiveClient {
    requests: mpsc::UnboundedSender<Request>,
    subscribers: Arc<Mutex<Subscribers>>,
    state: watch::Receiver<ConnectionState>,
    task: JoinHandle<()>,
}

impl std::fmt::Debug for LiveClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LiveClient")
            .field("state", &*self.state.borrow())
            .finish_non_exhaustive()
    }
}

impl LiveClient {
    /// Creates a WebSocket client for `url` with the default policy.
    #[must_use]
    pub fn websocket(url: &str) -> Self {
        Self::new(url, WsConnector::default())
    }

    /// Creates a client using `connector` with the default policy.
    #[must_use]
    pub fn new(url: &str, connector: impl Connector) -> Self {
        Self::with_policy(url, connector, ReconnectPolicy::default())
    }

    /// Creates a client with an explicit reconnect policy.
    #[must_use]
    pub fn with_policy(url: &str, connector: impl Connector, policy: ReconnectPolicy) -> Self {
        let (requests, receiver) = mpsc::unbounded_channel();
        let (state_tx, state) = watch::channel(ConnectionState::Disconnected);
        let subscribers = Arc::new(Mutex::new(Subscribers::default()));

        let driver = Driver {
            url: Arc::from(url),
            connector: Arc::new(connector),
            machine: Machine::new(policy),
            subscribers: Arc::clone(&subscribers),
            state: state_tx,
            transport: None,
            opening: None,
            timer: None,
            waiters: Vec::new(),
        };
        let task = tokio::spawn(driver.run(receiver));

        Self {
            requests,
            subscribers,
            state,
            task,
        }
    }

    /// Connects, resolving once the first attempt settles.
    ///
    /// If already connected this resolves immediately. A failed initial
    /// attempt still leaves the reconnect schedule running.
    ///
    /// # Errors
    ///
    /// Returns [`LiveError::ConnectFailed`] if the attempt fails or is
    /// cancelled by [`LiveClient::disconnect`], and
    /// [`LiveError::Closed`] if the client has shut down.
    pub async fn connect(&self) -> Result<(), LiveError> {
        let (tx, rx) = oneshot::channel();
        self.requests
            .send(Request::Connect(Some(tx)))
            .map_err(|_| LiveError::Closed)?;
        match rx.await {
            Ok(true) => Ok(()),
            Ok(false) => Err(LiveError::ConnectFailed),
            Err(_) => Err(LiveError::Closed),
        }
    }

    /// Starts connecting without waiting for the first attempt. Progress
    /// is visible through [`LiveClient::watch_state`].
    pub fn start(&self) {
        if self.requests.send(Request::Connect(None)).is_err() {
            log::debug!("Live client already shut down");
        }
    }

    /// Closes the connection, abandons an in-flight attempt and cancels
    /// any pending reconnect. Calling this while already disconnected
    /// does nothing.
    pub fn disconnect(&self) {
        if self.requests.send(Request::Disconnect).is_err() {
            log::debug!("Live client already shut down");
        }
    }

    /// Registers `handler` for messages of `event_type`.
    pub fn subscribe(
        &self,
        event_type: impl AsRef<str>,
        handler: impl Fn(&LiveMessage) + Send + Sync + 'static,
    ) -> SubscriptionId {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .subscribe(event_type.as_ref(), Arc::new(handler))
    }

    /// Removes a subscription made with [`LiveClient::subscribe`].
    pub fn unsubscribe(&self, event_type: impl AsRef<str>, id: SubscriptionId) -> bool {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .unsubscribe(event_type.as_ref(), id)
    }

    /// Current connection state.
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    /// Whether messages are currently flowing.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.state().is_connected()
    }

    /// A receiver that observes every state change.
    #[must_use]
    pub fn watch_state(&self) -> watch::Receiver<ConnectionState> {
        self.state.clone()
    }

    /// Disconnects and waits for the background task to finish.
    pub async fn shutdown(self) {
        let _ = self.requests.send(Request::Shutdown);
        if let Err(e) = self.task.await {
            log::error!("Live client task failed: {e}");
        }
    }
}

struct Driver<C> {
    url: Arc<str>,
    connector: Arc<C>,
    machine: Machine,
    subscribers: Arc<Mutex<Subscribers>>,
    state: watch::Sender<ConnectionState>,
    transport: Option<FrameStream>,
    opening: Option<Opening>,
    timer: Option<Instant>,
    waiters: Vec<oneshot::Sender<bool>>,
}

impl<C: Connector> Driver<C> {
    async fn run(mut self, mut requests: mpsc::UnboundedReceiver<Request>) {
        loop {
            tokio::select! {
                request = requests.recv() => match request {
                    Some(Request::Connect(waiter)) => {
                        self.waiters.extend(waiter);
                        self.apply(Event::ConnectRequested);
                    }
                    Some(Request::Disconnect) => self.apply(Event::DisconnectRequested),
                    Some(Request::Shutdown) | None => {
                        self.apply(Event::DisconnectRequested);
                        break;
                    }
                },
                opened = finish_open(&mut self.opening), if self.opening.is_some() => {
                    self.opening = None;
                    let event = match opened {
                        Ok(stream) => {
                            self.transport = Some(stream);
                            Event::Opened
                        }
                        Err(e) => {
                            log::warn!("Live connection to {} failed: {e}", self.url);
                            Event::Failed
                        }
                    };
                    self.apply(event);
                }
                frame = next_frame(&mut self.transport), if self.transport.is_some() => match frame {
                    Some(Ok(text)) => {
                        dispatch(&self.subscribers, &text);
                    }
                    Some(Err(e)) => {
                        log::warn!("Live transport error: {e}");
                        self.transport = None;
                        self.apply(Event::Failed);
                    }
                    None => {
                        log::info!("Live transport closed by server");
                        self.transport = None;
                        self.apply(Event::Failed);
                    }
                },
                () = tokio::time::sleep_until(self.timer.unwrap_or_else(Instant::now)), if self.timer.is_some() => {
                    self.timer = None;
                    self.apply(Event::TimerFired);
                }
            }
        }
        self.state.send_replace(ConnectionState::Disconnected);
        log::debug!("Live client task stopped");
    }

    /// Feeds `event` to the machine and executes the resulting commands,
    /// including any follow-up events they produce.
    fn apply(&mut self, event: Event) {
        let mut pending = VecDeque::from([event]);
        while let Some(event) = pending.pop_front() {
            let commands = self.machine.handle(event);
            self.state.send_replace(self.machine.state());
            for command in commands {
                match command {
                    Command::OpenTransport => self.open(),
                    Command::CloseTransport => {
                        self.transport = None;
                        self.opening = None;
                    }
                    Command::ScheduleReconnect { delay, .. } => {
                        self.timer = Some(Instant::now() + delay);
                    }
                    Command::CancelTimer => self.timer = None,
                    Command::ResolveConnect { opened } => {
                        for waiter in self.waiters.drain(..) {
                            let _ = waiter.send(opened);
                        }
                    }
                    Command::ConnectionChanged(connected) => {
                        log::debug!("Live connected: {connected}");
                    }
                }
            }
        }
    }

    /// Starts a transport open. The attempt is polled by the run loop so
    /// requests are still served while it is in flight.
    fn open(&mut self) {
        let connector = Arc::clone(&self.connector);
        let url = Arc::clone(&self.url);
        self.opening = Some(Box::pin(async move { connector.connect(&url).await }));
    }
}

async fn finish_open(opening: &mut Option<Opening>) -> Result<FrameStream, LiveError> {
    match opening {
        Some(attempt) => attempt.await,
        None => std::future::pending().await,
    }
}

async fn next_frame(transport: &mut Option<FrameStream>) -> Option<Result<String, LiveError>> {
    match transport {
        Some(stream) => stream.next().await,
        None => std::future::pending().await,
    }
}

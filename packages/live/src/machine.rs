//! Connection lifecycle state machine.
//!
//! ```text
//! Disconnected -> Connecting{0} -> Connected
//!                      |              |
//!                      +--- Failed ---+--> Reconnecting{n} --timer--> Connecting{n}
//!                                      \-> GaveUp (after max_attempts)
//! ```
//!
//! [`Machine::handle`] consumes one [`Event`] and returns the
//! [`Command`]s the driver must carry out. It performs no I/O and owns no
//! timers.

use std::time::Duration;

/// Delay unit for the linear backoff.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(1);

/// Reconnect attempts before giving up.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Linear reconnect backoff: attempt `n` waits `base_delay * n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    /// Delay unit.
    pub base_delay: Duration,
    /// Maximum number of reconnect attempts after a drop.
    pub max_attempts: u32,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            base_delay: DEFAULT_BASE_DELAY,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl ReconnectPolicy {
    /// Delay before reconnect attempt `attempt` (1-based).
    #[must_use]
    pub const fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(attempt)
    }
}

/// Where the connection currently stands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConnectionState {
    /// Not connected and not trying to be.
    #[default]
    Disconnected,
    /// A transport open is in flight. `attempt` is 0 for the initial
    /// connection and the reconnect number otherwise.
    Connecting {
        /// Reconnect number of this attempt.
        attempt: u32,
    },
    /// The transport is open and messages flow.
    Connected,
    /// Waiting for the backoff timer before reconnect `attempt`.
    Reconnecting {
        /// Reconnect number that will run when the timer fires.
        attempt: u32,
    },
    /// Reconnect attempts are exhausted. Only an explicit connect
    /// request leaves this state.
    GaveUp,
}

impl ConnectionState {
    /// Whether messages are currently flowing.
    #[must_use]
    pub const fn is_connected(self) -> bool {
        matches!(self, Self::Connected)
    }
}

/// Inputs to the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// The owner asked to connect.
    ConnectRequested,
    /// The transport confirmed it is open.
    Opened,
    /// The transport failed to open, errored, or closed.
    Failed,
    /// The reconnect timer elapsed.
    TimerFired,
    /// The owner asked to disconnect.
    DisconnectRequested,
}

/// Side effects the driver must perform, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Open a new transport.
    OpenTransport,
    /// Close the current transport, if any.
    CloseTransport,
    /// Arm the reconnect timer.
    ScheduleReconnect {
        /// Reconnect number the timer is for.
        attempt: u32,
        /// How long to wait.
        delay: Duration,
    },
    /// Disarm the reconnect timer.
    CancelTimer,
    /// Settle pending `connect()` callers.
    ResolveConnect {
        /// Whether the transport opened.
        opened: bool,
    },
    /// The connected flag flipped.
    ConnectionChanged(bool),
}

/// The reconnect state machine.
#[derive(Debug, Clone, Default)]
pub struct Machine {
    state: ConnectionState,
    policy: ReconnectPolicy,
    awaiting_connect: bool,
}

impl Machine {
    /// Creates a disconnected machine with the given policy.
    #[must_use]
    pub const fn new(policy: ReconnectPolicy) -> Self {
        Self {
            state: ConnectionState::Disconnected,
            policy,
            awaiting_connect: false,
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> ConnectionState {
        self.state
    }

    /// Reconnect policy in use.
    #[must_use]
    pub const fn policy(&self) -> ReconnectPolicy {
        self.policy
    }

    /// Applies `event` and returns the commands to execute. Events that
    /// make no sense in the current state are ignored.
    pub fn handle(&mut self, event: Event) -> Vec<Command> {
        match (event, self.state) {
            (
                Event::ConnectRequested,
                ConnectionState::Disconnected | ConnectionState::GaveUp,
            ) => {
                self.state = ConnectionState::Connecting { attempt: 0 };
                self.awaiting_connect = true;
                vec![Command::OpenTransport]
            }
            (Event::ConnectRequested, ConnectionState::Connected) => {
                vec![Command::ResolveConnect { opened: true }]
            }
            (Event::ConnectRequested, _) => {
                self.awaiting_connect = true;
                Vec::new()
            }

            (Event::Opened, ConnectionState::Connecting { attempt }) => {
                if attempt > 0 {
                    log::info!("Live connection re-established after {attempt} attempt(s)");
                } else {
                    log::info!("Live connection established");
                }
                self.state = ConnectionState::Connected;
                let mut commands = vec![Command::ConnectionChanged(true)];
                self.take_waiters(true, &mut commands);
                commands
            }
            // A transport opened after we stopped wanting one.
            (Event::Opened, _) => vec![Command::CloseTransport],

            (Event::Failed, ConnectionState::Connecting { attempt }) => {
                let mut commands = Vec::new();
                self.take_waiters(false, &mut commands);
                self.schedule_after(attempt, &mut commands);
                commands
            }
            (Event::Failed, ConnectionState::Connected) => {
                log::warn!("Live connection dropped");
                let mut commands = vec![Command::ConnectionChanged(false)];
                self.schedule_after(0, &mut commands);
                commands
            }

            (Event::TimerFired, ConnectionState::Reconnecting { attempt }) => {
                log::info!(
                    "Live reconnect attempt {attempt}/{}",
                    self.policy.max_attempts
                );
                self.state = ConnectionState::Connecting { attempt };
                vec![Command::OpenTransport]
            }

            (Event::DisconnectRequested, ConnectionState::Disconnected) => Vec::new(),
            (Event::DisconnectRequested, previous) => {
                self.state = ConnectionState::Disconnected;
                let mut commands = vec![Command::CancelTimer, Command::CloseTransport];
                if previous.is_connected() {
                    commands.push(Command::ConnectionChanged(false));
                }
                self.take_waiters(false, &mut commands);
                commands
            }

            (Event::Failed | Event::TimerFired, _) => Vec::new(),
        }
    }

    fn take_waiters(&mut self, opened: bool, commands: &mut Vec<Command>) {
        if std::mem::take(&mut self.awaiting_connect) {
            commands.push(Command::ResolveConnect { opened });
        }
    }

    /// Moves to `Reconnecting` after attempt `attempt` failed, or to
    /// `GaveUp` once the budget is spent.
    fn schedule_after(&mut self, attempt: u32, commands: &mut Vec<Command>) {
        if attempt < self.policy.max_attempts {
            let next = attempt + 1;
            let delay = self.policy.delay_for(next);
            log::info!(
                "Live reconnect {next}/{} scheduled in {delay:?}",
                self.policy.max_attempts
            );
            self.state = ConnectionState::Reconnecting { attempt: next };
            commands.push(Command::ScheduleReconnect {
                attempt: next,
                delay,
            });
        } else {
            log::warn!(
                "Giving up on live updates after {} reconnect attempts",
                self.policy.max_attempts
            );
            self.state = ConnectionState::GaveUp;
        }
    }
}

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tokio::sync::{Notify, mpsc, watch};
use tokio::time::MissedTickBehavior;

use crate::clock::{Clock, SystemClock};
use crate::state::{
    ActivityKind, IdleConfig, IdleConfigError, SessionSignal, SessionSnapshot, SessionState,
    Transition, remaining_until_expiry, step,
};

/// Opaque handle of the client-held session credential, passed to the
/// invalidation collaborator at expiry.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SessionHandle(String);

impl SessionHandle {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Session handles must not end up in logs.
impl core::fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("SessionHandle(<redacted>)")
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("session invalidation failed: {0}")]
pub struct InvalidateError(pub String);

/// External collaborator that clears the server-side credential.
///
/// Best effort: a failure is logged by the monitor, never propagated — the
/// client-side expiry flow proceeds regardless.
pub trait SessionInvalidator: Send + Sync {
    fn invalidate(&self, handle: &SessionHandle) -> Result<(), InvalidateError>;
}

/// External collaborator for client-side navigation.
pub trait Navigator: Send + Sync {
    fn navigate_to(&self, path: &str);
}

/// Observable monitor state for UI display.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub struct SessionView {
    pub state: SessionState,
    /// Time left until forced logout; zero once expired.
    pub remaining: Duration,
}

/// Drives the idle state machine for one authenticated client session.
///
/// A single spawned task owns the state and processes activity signals and
/// periodic ticks one at a time, so transitions never interleave. On expiry
/// the task stops listening, invalidates the session handle, then redirects
/// to the login entry point — in that order, so a reload mid-redirect cannot
/// resurrect the session.
///
/// `stop()` is idempotent and safe before `start()`; call it on logout and
/// on component teardown.
#[derive(Clone)]
pub struct SessionMonitor {
    inner: Arc<Inner>,
}

struct Inner {
    config: IdleConfig,
    handle: SessionHandle,
    invalidator: Arc<dyn SessionInvalidator>,
    navigator: Arc<dyn Navigator>,
    clock: Arc<dyn Clock>,
    shutdown: Notify,
    started: AtomicBool,
    stopped: AtomicBool,
    activity_tx: mpsc::UnboundedSender<ActivityKind>,
    activity_rx: Mutex<Option<mpsc::UnboundedReceiver<ActivityKind>>>,
    view_tx: watch::Sender<SessionView>,
}

impl SessionMonitor {
    pub fn new(
        config: IdleConfig,
        handle: SessionHandle,
        invalidator: Arc<dyn SessionInvalidator>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, IdleConfigError> {
        Self::with_clock(config, handle, invalidator, navigator, Arc::new(SystemClock))
    }

    /// Like [`SessionMonitor::new`] with an injected time source (simulated
    /// clocks in tests).
    pub fn with_clock(
        config: IdleConfig,
        handle: SessionHandle,
        invalidator: Arc<dyn SessionInvalidator>,
        navigator: Arc<dyn Navigator>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, IdleConfigError> {
        let config = config.validated()?;
        let (activity_tx, activity_rx) = mpsc::unbounded_channel();
        let (view_tx, _) = watch::channel(SessionView {
            state: SessionState::Active,
            remaining: config.expire_after,
        });

        Ok(Self {
            inner: Arc::new(Inner {
                config,
                handle,
                invalidator,
                navigator,
                clock,
                shutdown: Notify::new(),
                started: AtomicBool::new(false),
                stopped: AtomicBool::new(false),
                activity_tx,
                activity_rx: Mutex::new(Some(activity_rx)),
                view_tx,
            }),
        })
    }

    /// Begin tracking. No-op if already started or already stopped.
    pub fn start(&self) {
        if self.inner.stopped.load(Ordering::SeqCst) {
            return;
        }
        if self.inner.started.swap(true, Ordering::SeqCst) {
            return;
        }
        let Some(activity_rx) = self.inner.activity_rx.lock().unwrap().take()
        else {
            return;
        };
        tokio::spawn(run(self.inner.clone(), activity_rx));
    }

    /// Tear down timers and listeners. Idempotent; safe before `start()` and
    /// after expiry.
    pub fn stop(&self) {
        self.inner.stopped.store(true, Ordering::SeqCst);
        self.inner.shutdown.notify_one();
    }

    /// Deliver a user-presence signal from the host UI.
    ///
    /// Signals not enumerated in the config, and any signal after expiry or
    /// `stop()`, are ignored.
    pub fn record_activity(&self, kind: ActivityKind) {
        if self.inner.stopped.load(Ordering::SeqCst) {
            return;
        }
        if !self.inner.config.signals.contains(&kind) {
            return;
        }
        let _ = self.inner.activity_tx.send(kind);
    }

    pub fn view(&self) -> SessionView {
        *self.inner.view_tx.borrow()
    }

    pub fn state(&self) -> SessionState {
        self.view().state
    }

    /// Watch channel for reactive UI updates (warning banner, countdown).
    pub fn subscribe(&self) -> watch::Receiver<SessionView> {
        self.inner.view_tx.subscribe()
    }
}

impl Inner {
    fn publish(&self, snapshot: &SessionSnapshot) {
        let view = SessionView {
            state: snapshot.state,
            remaining: remaining_until_expiry(snapshot, self.clock.now(), &self.config),
        };
        self.view_tx.send_replace(view);
    }
}

async fn run(inner: Arc<Inner>, mut activity_rx: mpsc::UnboundedReceiver<ActivityKind>) {
    let mut snapshot = SessionSnapshot::started(inner.clock.now());
    inner.publish(&snapshot);

    let mut tick = tokio::time::interval(inner.config.tick);
    tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let expired = loop {
        tokio::select! {
            _ = inner.shutdown.notified() => {
                tracing::debug!("session monitor stopped");
                break false;
            }
            activity = activity_rx.recv() => {
                if activity.is_none() {
                    break false;
                }
                let (next, transition) =
                    step(&snapshot, SessionSignal::Activity, inner.clock.now(), &inner.config);
                snapshot = next;
                inner.publish(&snapshot);
                if transition == Some(Transition::Resumed) {
                    tracing::debug!("activity dismissed the idle warning");
                }
            }
            _ = tick.tick() => {
                let (next, transition) =
                    step(&snapshot, SessionSignal::Tick, inner.clock.now(), &inner.config);
                snapshot = next;
                inner.publish(&snapshot);
                match transition {
                    Some(Transition::Warned) => {
                        tracing::info!("session idle, warning shown");
                    }
                    Some(Transition::Expired) => break true,
                    _ => {}
                }
            }
        }
    };

    // Listening stops before the expiry side effects run.
    drop(activity_rx);
    inner.stopped.store(true, Ordering::SeqCst);

    if expired {
        tracing::info!("session expired after idle timeout");
        if let Err(e) = inner.invalidator.invalidate(&inner.handle) {
            tracing::warn!(error = %e, "session invalidation failed (best effort)");
        }
        inner.navigator.navigate_to(&inner.config.login_path);
    }
}

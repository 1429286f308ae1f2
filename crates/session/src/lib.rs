//! `ledgerdesk-session` — client-side idle session lifecycle.
//!
//! Tracks user inactivity and drives the active → warning → expired state
//! machine, independent of server-side token expiry (defense in depth: the
//! UI self-locks even while the credential is still technically valid).
//!
//! The transition logic is a pure function over explicit timestamps
//! ([`state`]); the async driver ([`monitor`]) feeds it a periodic tick plus
//! discrete activity signals and keeps all side effects (invalidate,
//! redirect) at the edges.

pub mod clock;
pub mod monitor;
pub mod state;

pub use clock::{Clock, SystemClock};
pub use monitor::{
    InvalidateError, Navigator, SessionHandle, SessionInvalidator, SessionMonitor, SessionView,
};
pub use state::{
    ActivityKind, IdleConfig, IdleConfigError, SessionSignal, SessionSnapshot, SessionState,
    Transition, remaining_until_expiry, step,
};

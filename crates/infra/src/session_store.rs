//! In-memory session/credential store.
//!
//! Backs [`CredentialVerifier`] for the server-side resolver and
//! [`SessionInvalidator`] for the client-side monitor. Sessions carry an
//! explicit validity window; extension is a separate, caller-initiated
//! operation — a `verify` never slides the expiry.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::Duration;

use chrono::{DateTime, Utc};
use thiserror::Error;

use ledgerdesk_auth::{CredentialVerifier, IdentityRecord, RawCredential};
use ledgerdesk_session::{InvalidateError, SessionHandle, SessionInvalidator};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionStoreError {
    #[error("session ttl out of range")]
    InvalidTtl,

    #[error("session not found")]
    NotFound,
}

/// One issued session: who it authenticates plus its validity window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    pub identity: IdentityRecord,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl SessionRecord {
    /// A record is valid only inside `[issued_at, expires_at)`. A record
    /// seen before its own issue time is treated as invalid, not as a
    /// grace period.
    fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.issued_at && now < self.expires_at
    }
}

/// Token → session map guarded by a `RwLock`; reads dominate.
#[derive(Debug)]
pub struct InMemorySessionStore {
    ttl: chrono::Duration,
    sessions: RwLock<HashMap<String, SessionRecord>>,
}

impl InMemorySessionStore {
    pub const DEFAULT_TTL: Duration = Duration::from_secs(8 * 60 * 60);

    pub fn new(ttl: Duration) -> Result<Self, SessionStoreError> {
        let ttl = chrono::Duration::from_std(ttl).map_err(|_| SessionStoreError::InvalidTtl)?;
        if ttl <= chrono::Duration::zero() {
            return Err(SessionStoreError::InvalidTtl);
        }
        Ok(Self {
            ttl,
            sessions: RwLock::new(HashMap::new()),
        })
    }

    pub fn with_default_ttl() -> Self {
        Self {
            ttl: chrono::Duration::seconds(Self::DEFAULT_TTL.as_secs() as i64),
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Record a session for `token`, valid for the store's ttl from `now`.
    /// Issuing over an existing token replaces it.
    pub fn issue(&self, token: impl Into<String>, identity: IdentityRecord, now: DateTime<Utc>) {
        let record = SessionRecord {
            identity,
            issued_at: now,
            expires_at: now + self.ttl,
        };
        self.sessions
            .write()
            .unwrap()
            .insert(token.into(), record);
    }

    /// Explicit sliding expiry: restart the validity window from `now`.
    ///
    /// Only callers that decide a request should keep the session alive use
    /// this; resolution never extends implicitly.
    pub fn extend(
        &self,
        credential: &RawCredential,
        now: DateTime<Utc>,
    ) -> Result<(), SessionStoreError> {
        let mut sessions = self.sessions.write().unwrap();
        match sessions.get_mut(credential.expose()) {
            Some(record) if record.is_valid_at(now) => {
                record.expires_at = now + self.ttl;
                Ok(())
            }
            _ => Err(SessionStoreError::NotFound),
        }
    }

    /// Drop the session for `token`. Returns whether one existed.
    pub fn revoke(&self, token: &str) -> bool {
        self.sessions
            .write()
            .unwrap()
            .remove(token)
            .is_some()
    }

    pub fn len(&self) -> usize {
        self.sessions.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CredentialVerifier for InMemorySessionStore {
    fn verify(&self, credential: &RawCredential, now: DateTime<Utc>) -> Option<IdentityRecord> {
        let sessions = self.sessions.read().unwrap();
        sessions
            .get(credential.expose())
            .filter(|record| record.is_valid_at(now))
            .map(|record| record.identity.clone())
    }
}

impl SessionInvalidator for InMemorySessionStore {
    fn invalidate(&self, handle: &SessionHandle) -> Result<(), InvalidateError> {
        if !self.revoke(handle.as_str()) {
            // Already gone counts as invalidated.
            tracing::debug!("invalidation for a session that no longer exists");
        }
        Ok(())
    }
}

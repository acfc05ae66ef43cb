//! Usage: In-memory registry of pending sign-in sessions keyed by the backend-issued sid.
//!
//! Every entry owns a single-shot resolver and a cancellable timeout task. Whichever of
//! `resolve` (callback) and `expire` (timeout) takes the entry out of the map first wins;
//! the other becomes a no-op because the lookup-and-remove happens under one lock.

use super::error::{AuthError, AuthResult};
use crate::shared::mutex_ext::MutexExt;
use crate::shared::security::mask_token;
use crate::shared::time::now_unix_millis;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::AbortHandle;

const MAX_SID_LEN: usize = 512;

/// Payload delivered through a session's resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SessionOutcome {
    Callback { sid: String, client_nonce: String },
    Expired,
}

/// What the router learns about a session it just resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ResolvedSession {
    pub(crate) sid: String,
    pub(crate) created_at_unix_ms: u64,
}

#[derive(Debug)]
struct PendingSession {
    client_nonce: String,
    created_at_unix_ms: u64,
    resolver: Option<oneshot::Sender<SessionOutcome>>,
    timeout: Option<AbortHandle>,
}

impl PendingSession {
    fn fire(&mut self, outcome: SessionOutcome) -> bool {
        match self.resolver.take() {
            Some(resolver) => resolver.send(outcome).is_ok(),
            None => false,
        }
    }
}

impl Drop for PendingSession {
    fn drop(&mut self) {
        if let Some(timeout) = self.timeout.take() {
            timeout.abort();
        }
    }
}

type SessionMap = HashMap<String, PendingSession>;

#[derive(Debug, Clone)]
pub(crate) struct SessionRegistry {
    sessions: Arc<Mutex<SessionMap>>,
    timeout: Duration,
}

impl SessionRegistry {
    pub(crate) fn new(timeout: Duration) -> Self {
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
            timeout,
        }
    }

    pub(crate) fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Store a pending session and arm its timeout.
    ///
    /// A sid that is already pending is rejected: the existing entry keeps its resolver and
    /// timer, and `resolver` is dropped so its waiter observes a closed channel.
    pub(crate) fn register(
        &self,
        sid: &str,
        client_nonce: &str,
        resolver: oneshot::Sender<SessionOutcome>,
    ) -> AuthResult<()> {
        let sid = validate_sid(sid)?;
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| AuthError::Internal {
            message: "session registry used outside of an async runtime".to_string(),
        })?;

        let mut sessions = self.sessions.lock_or_recover();
        if sessions.contains_key(sid) {
            tracing::warn!(sid = %mask_token(sid), "duplicate sign-in session rejected");
            return Err(AuthError::DuplicateSession);
        }

        let timer = runtime.spawn(expire_after(
            Arc::downgrade(&self.sessions),
            sid.to_string(),
            self.timeout,
        ));
        sessions.insert(
            sid.to_string(),
            PendingSession {
                client_nonce: client_nonce.to_string(),
                created_at_unix_ms: now_unix_millis(),
                resolver: Some(resolver),
                timeout: Some(timer.abort_handle()),
            },
        );

        tracing::debug!(
            sid = %mask_token(sid),
            pending = sessions.len(),
            timeout_s = self.timeout.as_secs(),
            "sign-in session registered"
        );
        Ok(())
    }

    /// Remove the session, cancel its timeout and fire its resolver with the sid.
    ///
    /// Returns `None` when the sid was never registered or is already consumed.
    pub(crate) fn resolve(&self, sid: &str) -> Option<ResolvedSession> {
        let mut session = self.sessions.lock_or_recover().remove(sid)?;
        if let Some(timeout) = session.timeout.take() {
            timeout.abort();
        }

        let client_nonce = session.client_nonce.clone();
        let delivered = session.fire(SessionOutcome::Callback {
            sid: sid.to_string(),
            client_nonce,
        });
        if !delivered {
            tracing::debug!(
                sid = %mask_token(sid),
                "sign-in session resolved but nobody is waiting for it anymore"
            );
        }

        Some(ResolvedSession {
            sid: sid.to_string(),
            created_at_unix_ms: session.created_at_unix_ms,
        })
    }

    /// Remove the session if it is still pending and signal the waiter that it timed out.
    pub(crate) fn expire(&self, sid: &str) -> bool {
        expire_in(&self.sessions, sid)
    }

    pub(crate) fn contains(&self, sid: &str) -> bool {
        self.sessions.lock_or_recover().contains_key(sid)
    }

    pub(crate) fn len(&self) -> usize {
        self.sessions.lock_or_recover().len()
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn validate_sid(sid: &str) -> AuthResult<&str> {
    let sid = sid.trim();
    if sid.is_empty() {
        return Err(AuthError::InvalidSession {
            message: "sid is empty".to_string(),
        });
    }
    if sid.len() > MAX_SID_LEN {
        return Err(AuthError::InvalidSession {
            message: format!("sid exceeds {MAX_SID_LEN} bytes"),
        });
    }
    Ok(sid)
}

fn expire_in(sessions: &Mutex<SessionMap>, sid: &str) -> bool {
    let Some(mut session) = sessions.lock_or_recover().remove(sid) else {
        return false;
    };
    // Dropping the session aborts its timer, which is a no-op when the timer is the caller.
    session.fire(SessionOutcome::Expired);
    tracing::info!(sid = %mask_token(sid), "sign-in session expired");
    true
}

async fn expire_after(sessions: Weak<Mutex<SessionMap>>, sid: String, timeout: Duration) {
    tokio::time::sleep(timeout).await;
    if let Some(sessions) = sessions.upgrade() {
        expire_in(&sessions, &sid);
    }
}

//! # Session State
//!
//! One cart per checkout session, keyed by a server-issued id.
//!
//! ## Locking
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Session Carts                                        │
//! │                                                                         │
//! │  RwLock<HashMap<Uuid, Session>>                                         │
//! │    │  write lock: open, close, or touch a session (held only briefly)   │
//! │    │  read lock: count                                                  │
//! │    ▼                                                                    │
//! │  SessionCart = Arc<Mutex<Cart>>                                         │
//! │       scan / remove / clear / checkout hold this lock for the whole     │
//! │       operation, so two requests in one session never interleave.       │
//! │       Different sessions never wait on each other.                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Limits
//! A session unused for `idle_timeout` is expired: lookups treat it as
//! closed and the next `create` drops it. At most `max_open` sessions live
//! at once; past that, `create` fails until one is closed or expires.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use sgventas_core::Cart;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{ApiError, ErrorCode};

/// A session's cart, locked for the duration of each operation.
pub type SessionCart = Arc<Mutex<Cart>>;

/// Bounds on open sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionLimits {
    pub max_open: usize,
    pub idle_timeout: Duration,
}

impl Default for SessionLimits {
    fn default() -> Self {
        SessionLimits {
            max_open: 64,
            idle_timeout: Duration::from_secs(4 * 60 * 60),
        }
    }
}

#[derive(Debug)]
struct Session {
    cart: SessionCart,
    last_used: Instant,
}

impl Session {
    fn is_idle(&self, timeout: Duration) -> bool {
        self.last_used.elapsed() >= timeout
    }
}

#[derive(Debug, Clone, Default)]
pub struct SessionState {
    sessions: Arc<RwLock<HashMap<Uuid, Session>>>,
    limits: SessionLimits,
}

impl SessionState {
    pub fn new() -> Self {
        SessionState::default()
    }

    pub fn with_limits(limits: SessionLimits) -> Self {
        SessionState {
            sessions: Arc::default(),
            limits,
        }
    }

    /// Opens a session with an empty cart, dropping expired ones first.
    pub async fn create(&self) -> Result<(Uuid, SessionCart), ApiError> {
        let mut sessions = self.sessions.write().await;

        let before = sessions.len();
        sessions.retain(|_, session| !session.is_idle(self.limits.idle_timeout));
        let expired = before - sessions.len();
        if expired > 0 {
            info!(expired, "Expired idle sessions");
        }

        if sessions.len() >= self.limits.max_open {
            return Err(ApiError::new(
                ErrorCode::TooManySessions,
                format!(
                    "Cannot open more than {} sessions; close one first",
                    self.limits.max_open
                ),
            ));
        }

        let id = Uuid::new_v4();
        let cart = Arc::new(Mutex::new(Cart::new()));
        sessions.insert(
            id,
            Session {
                cart: Arc::clone(&cart),
                last_used: Instant::now(),
            },
        );
        debug!(session = %id, open = sessions.len(), "Session opened");
        Ok((id, cart))
    }

    /// Looks up a live session and marks it used.
    pub async fn get(&self, id: Uuid) -> Result<SessionCart, ApiError> {
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(&id) {
            Some(session) if !session.is_idle(self.limits.idle_timeout) => {
                session.last_used = Instant::now();
                return Ok(Arc::clone(&session.cart));
            }
            Some(_) => {
                sessions.remove(&id);
                debug!(session = %id, "Session expired");
            }
            None => {}
        }
        Err(session_not_found(id))
    }

    /// Closes a session, discarding its cart.
    pub async fn remove(&self, id: Uuid) -> Result<(), ApiError> {
        match self.sessions.write().await.remove(&id) {
            Some(_) => {
                debug!(session = %id, "Session closed");
                Ok(())
            }
            None => Err(session_not_found(id)),
        }
    }

    pub async fn count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

fn session_not_found(id: Uuid) -> ApiError {
    ApiError::not_found("Session", &id.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sgventas_core::Money;

    #[tokio::test]
    async fn test_sessions_have_independent_carts() {
        let sessions = SessionState::new();
        let (a, _) = sessions.create().await.unwrap();
        let (b, _) = sessions.create().await.unwrap();

        sessions
            .get(a)
            .await
            .unwrap()
            .lock()
            .await
            .add_manual(Money::from_cents(500))
            .unwrap();

        assert_eq!(sessions.get(a).await.unwrap().lock().await.lines().len(), 1);
        assert!(sessions.get(b).await.unwrap().lock().await.is_empty());
        assert_eq!(sessions.count().await, 2);
    }

    #[tokio::test]
    async fn test_removed_session_is_gone() {
        let sessions = SessionState::new();
        let (id, _) = sessions.create().await.unwrap();
        sessions.remove(id).await.unwrap();

        let err = sessions.get(id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert!(sessions.remove(id).await.is_err());
    }

    #[tokio::test]
    async fn test_open_sessions_are_capped() {
        let sessions = SessionState::with_limits(SessionLimits {
            max_open: 2,
            idle_timeout: Duration::from_secs(3600),
        });
        let (first, _) = sessions.create().await.unwrap();
        sessions.create().await.unwrap();

        let err = sessions.create().await.unwrap_err();
        assert_eq!(err.code, ErrorCode::TooManySessions);
        assert_eq!(sessions.count().await, 2);

        sessions.remove(first).await.unwrap();
        sessions.create().await.unwrap();
        assert_eq!(sessions.count().await, 2);
    }

    #[tokio::test]
    async fn test_idle_sessions_are_expired() {
        let sessions = SessionState::with_limits(SessionLimits {
            max_open: 1,
            idle_timeout: Duration::ZERO,
        });
        let (stale, _) = sessions.create().await.unwrap();

        // The stale session no longer counts against the cap.
        let (fresh, _) = sessions.create().await.unwrap();
        assert_ne!(stale, fresh);
        assert_eq!(sessions.count().await, 1);

        let err = sessions.get(fresh).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(sessions.count().await, 0);
    }
}

//! Observable sign-in status.
//!
//! Listeners register explicitly and get an id back; `notify_changed`
//! re-reads the token store and calls each listener with the new status.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;

use super::claims::Claims;
use super::token::TokenStore;
use crate::error::AuthError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AuthStatus {
    SignedOut,
    SignedIn { email: String, role: String, exp: i64 },
}

impl AuthStatus {
    pub fn is_signed_in(&self) -> bool {
        matches!(self, AuthStatus::SignedIn { .. })
    }

    fn from_store(store: &dyn TokenStore) -> Result<Self, AuthError> {
        let Some(token) = store.get()? else {
            return Ok(AuthStatus::SignedOut);
        };
        match Claims::decode(&token) {
            Ok(claims) if !claims.is_expired_at(chrono::Utc::now()) => Ok(AuthStatus::SignedIn {
                email: claims.email,
                role: claims.role,
                exp: claims.exp,
            }),
            Ok(_) => Ok(AuthStatus::SignedOut),
            Err(e) => {
                tracing::debug!(error = %e, "Stored token is unreadable; treating as signed out");
                Ok(AuthStatus::SignedOut)
            }
        }
    }
}

pub type ListenerId = u64;
type Listener = Box<dyn Fn(&AuthStatus) + Send + Sync>;

struct Inner {
    status: AuthStatus,
    next_id: ListenerId,
    listeners: BTreeMap<ListenerId, Listener>,
}

pub struct AuthSession {
    tokens: Arc<dyn TokenStore>,
    inner: Mutex<Inner>,
}

impl AuthSession {
    /// Build the session with its status read from `tokens`.
    pub fn new(tokens: Arc<dyn TokenStore>) -> Result<Self, AuthError> {
        let status = AuthStatus::from_store(tokens.as_ref())?;
        Ok(Self {
            tokens,
            inner: Mutex::new(Inner {
                status,
                next_id: 0,
                listeners: BTreeMap::new(),
            }),
        })
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn status(&self) -> AuthStatus {
        self.lock().status.clone()
    }

    pub fn subscribe<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&AuthStatus) + Send + Sync + 'static,
    {
        let mut inner = self.lock();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.listeners.insert(id, Box::new(listener));
        id
    }

    /// Returns whether `id` was registered.
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        self.lock().listeners.remove(&id).is_some()
    }

    /// Re-read the token store and notify every listener. Listeners run
    /// under the session lock and must not call back into the session.
    pub fn notify_changed(&self) -> Result<AuthStatus, AuthError> {
        let status = AuthStatus::from_store(self.tokens.as_ref())?;
        let mut inner = self.lock();
        inner.status = status.clone();
        for listener in inner.listeners.values() {
            listener(&status);
        }
        tracing::debug!(signed_in = status.is_signed_in(), "Auth status changed");
        Ok(status)
    }

    /// Drop the local token and tell listeners.
    pub fn sign_out(&self) -> Result<(), AuthError> {
        self.tokens.clear()?;
        self.notify_changed().map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::claims::encode_test_token;
    use crate::auth::MemoryTokenStore;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn token(exp: i64) -> String {
        encode_test_token(&Claims {
            sub: "u1".into(),
            email: "sam@example.com".into(),
            role: "user".into(),
            exp,
        })
    }

    #[test]
    fn initial_status_from_store() {
        let store: Arc<dyn TokenStore> = Arc::new(MemoryTokenStore::new());
        assert_eq!(AuthSession::new(store).unwrap().status(), AuthStatus::SignedOut);

        let store: Arc<dyn TokenStore> = Arc::new(MemoryTokenStore::with_token(token(4_000_000_000)));
        let session = AuthSession::new(store).unwrap();
        assert!(matches!(
            session.status(),
            AuthStatus::SignedIn { ref email, .. } if email == "sam@example.com"
        ));

        let store: Arc<dyn TokenStore> = Arc::new(MemoryTokenStore::with_token(token(1)));
        assert_eq!(AuthSession::new(store).unwrap().status(), AuthStatus::SignedOut);
    }

    #[test]
    fn listeners_fire_until_unsubscribed() {
        let store = Arc::new(MemoryTokenStore::new());
        let session = AuthSession::new(store.clone()).unwrap();
        let calls = Arc::new(AtomicUsize::new(0));

        let seen = calls.clone();
        let id = session.subscribe(move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        });

        store.set(&token(4_000_000_000)).unwrap();
        assert!(session.notify_changed().unwrap().is_signed_in());
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        assert!(session.unsubscribe(id));
        assert!(!session.unsubscribe(id));
        session.notify_changed().unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn sign_out_clears_token_and_notifies() {
        let store = Arc::new(MemoryTokenStore::with_token(token(4_000_000_000)));
        let session = AuthSession::new(store.clone()).unwrap();
        let last = Arc::new(Mutex::new(None));
        let sink = last.clone();
        session.subscribe(move |status| {
            *sink.lock().unwrap() = Some(status.clone());
        });

        session.sign_out().unwrap();
        assert_eq!(store.get().unwrap(), None);
        assert_eq!(session.status(), AuthStatus::SignedOut);
        assert_eq!(*last.lock().unwrap(), Some(AuthStatus::SignedOut));
    }
}

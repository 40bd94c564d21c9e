//! Persisted session store.
//!
//! # Design
//! - The store is a cloneable handle; every clone reads and writes the same state.
//! - Readers always observe the latest write (no cached copies on requests).
//! - Only `{user, token, isAuthenticated}` is persisted; `is_loading` is
//!   process-local and always starts false.
//! - Persisted writes are best-effort and happen under the write lock so the
//!   stored document never lags behind a later in-memory update.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use vitrine_api_models::{LoginCredentials, LoginResponse, User};
use vitrine_events::{SessionEvent, SessionSignals};

use crate::error::ApiError;
use crate::jwt;
use crate::storage::{AUTH_STORAGE_KEY, StateStorage, load_state, persist_state};

/// Snapshot of the authenticated session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    /// Authenticated identity.
    pub user: Option<User>,
    /// Bearer credential.
    pub token: Option<String>,
    /// True iff a user and a non-empty token were accepted by the backend.
    pub is_authenticated: bool,
    /// True while a login call is in flight.
    pub is_loading: bool,
}

impl Session {
    fn clear_credentials(&mut self) -> bool {
        let had_credentials = self.user.is_some() || self.token.is_some() || self.is_authenticated;
        self.user = None;
        self.token = None;
        self.is_authenticated = false;
        had_credentials
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PersistedSession {
    #[serde(default)]
    user: Option<User>,
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    is_authenticated: bool,
}

impl From<&Session> for PersistedSession {
    fn from(session: &Session) -> Self {
        Self {
            user: session.user.clone(),
            token: session.token.clone(),
            is_authenticated: session.is_authenticated,
        }
    }
}

impl From<PersistedSession> for Session {
    fn from(persisted: PersistedSession) -> Self {
        let has_token = persisted
            .token
            .as_deref()
            .is_some_and(|token| !token.trim().is_empty());
        if persisted.is_authenticated && !has_token {
            tracing::warn!("persisted session claims authentication without a token; discarding");
            return Self::default();
        }
        Self {
            user: persisted.user,
            token: persisted.token.filter(|token| !token.trim().is_empty()),
            is_authenticated: persisted.is_authenticated,
            is_loading: false,
        }
    }
}

/// Seam between the session store and whatever exchanges credentials for a
/// token (normally [`crate::AuthService`]).
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Exchange credentials for an identity and bearer token.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the backend rejects the credentials or the
    /// request fails.
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<LoginResponse, ApiError>;
}

/// Shared handle to the persisted session.
#[derive(Clone)]
pub struct SessionStore {
    state: Arc<RwLock<Session>>,
    storage: Arc<dyn StateStorage>,
    signals: SessionSignals,
}

impl SessionStore {
    /// Empty store that persists into `storage`.
    #[must_use]
    pub fn new(storage: Arc<dyn StateStorage>, signals: SessionSignals) -> Self {
        Self::with_session(Session::default(), storage, signals)
    }

    /// Store initialised from whatever `storage` holds under `auth-storage`.
    #[must_use]
    pub fn rehydrate(storage: Arc<dyn StateStorage>, signals: SessionSignals) -> Self {
        let session = load_state::<PersistedSession>(storage.as_ref(), AUTH_STORAGE_KEY)
            .map(Session::from)
            .unwrap_or_default();
        Self::with_session(session, storage, signals)
    }

    fn with_session(session: Session, storage: Arc<dyn StateStorage>, signals: SessionSignals) -> Self {
        Self {
            state: Arc::new(RwLock::new(session)),
            storage,
            signals,
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Session> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Session> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn persist(&self, session: &Session) {
        if let Err(err) = persist_state(
            self.storage.as_ref(),
            AUTH_STORAGE_KEY,
            &PersistedSession::from(session),
        ) {
            tracing::warn!(error = %err, "failed to persist session state");
        }
    }

    /// Copy of the current session.
    #[must_use]
    pub fn snapshot(&self) -> Session {
        self.read().clone()
    }

    /// Current bearer token, if any.
    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.read().token.clone()
    }

    /// Current identity, if any.
    #[must_use]
    pub fn user(&self) -> Option<User> {
        self.read().user.clone()
    }

    /// Whether a session is established.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.read().is_authenticated
    }

    /// Whether a login call is in flight.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.read().is_loading
    }

    fn set_loading(&self, loading: bool) {
        self.write().is_loading = loading;
    }

    /// Exchange `credentials` through `authenticator` and store the result.
    ///
    /// On failure the loading flag is reset, the existing user and token are
    /// left untouched and the error is returned to the caller.
    ///
    /// # Errors
    ///
    /// Propagates the authenticator's error, or [`ApiError::MissingToken`] when
    /// the backend answered without a usable token.
    pub async fn login(
        &self,
        authenticator: &dyn Authenticator,
        credentials: &LoginCredentials,
    ) -> Result<User, ApiError> {
        self.set_loading(true);
        let response = match authenticator.authenticate(credentials).await {
            Ok(response) => response,
            Err(err) => {
                self.set_loading(false);
                return Err(err);
            }
        };
        if response.access_token.trim().is_empty() {
            self.set_loading(false);
            return Err(ApiError::MissingToken);
        }

        let user = response.user;
        {
            let mut session = self.write();
            session.user = Some(user.clone());
            session.token = Some(response.access_token);
            session.is_authenticated = true;
            session.is_loading = false;
            self.persist(&session);
        }
        tracing::info!(user_id = %user.id, "session established");
        self.signals.publish(SessionEvent::LoggedIn {
            user_id: user.id.clone(),
        });
        Ok(user)
    }

    /// Clear user, token and authentication flag in one step. Local only; the
    /// backend is not contacted. Calling it while logged out changes nothing.
    pub fn logout(&self) {
        if self.clear() {
            tracing::info!("session cleared by logout");
            self.signals.publish(SessionEvent::LoggedOut);
        }
    }

    /// Clear credentials without announcing a logout; returns whether anything
    /// was cleared.
    pub(crate) fn clear(&self) -> bool {
        let mut session = self.write();
        let cleared = session.clear_credentials();
        if cleared {
            self.persist(&session);
        }
        cleared
    }

    /// Replace the stored identity without touching the token or the
    /// authentication flag.
    pub fn set_user(&self, user: User) {
        let mut session = self.write();
        session.user = Some(user);
        self.persist(&session);
    }

    /// Clear the session when its token carries an expiry earlier than `now`.
    /// Opaque tokens and tokens without an expiry are kept. Returns whether
    /// the session was cleared.
    pub fn discard_if_expired(&self, now: DateTime<Utc>) -> bool {
        let expired = self
            .token()
            .and_then(|token| jwt::token_expiry(&token))
            .is_some_and(|expiry| expiry < now);
        if expired && self.clear() {
            tracing::info!("stored token expired; session cleared");
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use anyhow::Result;
    use chrono::TimeZone;
    use reqwest::StatusCode;
    use std::sync::atomic::{AtomicBool, Ordering};
    use vitrine_test_support::fixtures::{sample_user, valid_credentials};
    use vitrine_test_support::tokens::user_token;

    struct StubAuthenticator {
        outcome: fn() -> Result<LoginResponse, ApiError>,
        observed_loading: AtomicBool,
        store: SessionStore,
    }

    #[async_trait]
    impl Authenticator for StubAuthenticator {
        async fn authenticate(
            &self,
            _credentials: &LoginCredentials,
        ) -> Result<LoginResponse, ApiError> {
            self.observed_loading
                .store(self.store.is_loading(), Ordering::SeqCst);
            (self.outcome)()
        }
    }

    fn accepted() -> Result<LoginResponse, ApiError> {
        Ok(LoginResponse {
            user: sample_user(),
            access_token: "token-1".to_string(),
        })
    }

    fn rejected() -> Result<LoginResponse, ApiError> {
        Err(ApiError::from_status(
            StatusCode::UNAUTHORIZED,
            "/auth/login",
            br#"{"message":"Unauthorized"}"#,
        ))
    }

    fn empty_token() -> Result<LoginResponse, ApiError> {
        Ok(LoginResponse {
            user: sample_user(),
            access_token: "  ".to_string(),
        })
    }

    fn store_with(storage: &MemoryStorage) -> SessionStore {
        SessionStore::new(Arc::new(storage.clone()), SessionSignals::new())
    }

    fn stub(store: &SessionStore, outcome: fn() -> Result<LoginResponse, ApiError>) -> StubAuthenticator {
        StubAuthenticator {
            outcome,
            observed_loading: AtomicBool::new(false),
            store: store.clone(),
        }
    }

    #[tokio::test]
    async fn login_sets_credentials_and_marks_loading_during_call() -> Result<()> {
        let storage = MemoryStorage::new();
        let store = store_with(&storage);
        let auth = stub(&store, accepted);

        let user = store.login(&auth, &valid_credentials()).await?;

        assert!(auth.observed_loading.load(Ordering::SeqCst));
        assert_eq!(user, sample_user());
        let session = store.snapshot();
        assert!(session.is_authenticated);
        assert!(!session.is_loading);
        assert_eq!(session.token.as_deref(), Some("token-1"));
        Ok(())
    }

    #[tokio::test]
    async fn failed_login_resets_loading_and_keeps_state() {
        let storage = MemoryStorage::new();
        let store = store_with(&storage);
        let auth = stub(&store, rejected);

        let err = store
            .login(&auth, &valid_credentials())
            .await
            .expect_err("login rejected");

        assert!(err.is_unauthorized());
        assert_eq!(store.snapshot(), Session::default());
    }

    #[tokio::test]
    async fn empty_access_token_is_rejected() {
        let store = store_with(&MemoryStorage::new());
        let auth = stub(&store, empty_token);
        let err = store
            .login(&auth, &valid_credentials())
            .await
            .expect_err("empty token");
        assert!(matches!(err, ApiError::MissingToken));
        assert!(!store.is_authenticated());
        assert!(!store.is_loading());
    }

    #[tokio::test]
    async fn logout_is_idempotent_and_signals_once() -> Result<()> {
        let signals = SessionSignals::new();
        let mut rx = signals.subscribe();
        let store = SessionStore::new(Arc::new(MemoryStorage::new()), signals);
        store.login(&stub(&store, accepted), &valid_credentials()).await?;
        assert!(matches!(rx.recv().await?, SessionEvent::LoggedIn { .. }));

        store.logout();
        let after_first = store.snapshot();
        store.logout();

        assert_eq!(store.snapshot(), after_first);
        assert_eq!(after_first, Session::default());
        assert_eq!(rx.recv().await?, SessionEvent::LoggedOut);
        assert!(rx.try_recv().is_err());
        Ok(())
    }

    #[tokio::test]
    async fn rehydration_restores_persisted_fields_and_resets_loading() -> Result<()> {
        let storage = MemoryStorage::new();
        let store = store_with(&storage);
        store.login(&stub(&store, accepted), &valid_credentials()).await?;
        store.set_loading(true);
        let before = store.snapshot();

        let reloaded = SessionStore::rehydrate(Arc::new(storage.clone()), SessionSignals::new());
        let after = reloaded.snapshot();

        assert_eq!(after.user, before.user);
        assert_eq!(after.token, before.token);
        assert_eq!(after.is_authenticated, before.is_authenticated);
        assert!(!after.is_loading);

        let raw = storage.load(AUTH_STORAGE_KEY)?.expect("persisted document");
        let document: serde_json::Value = serde_json::from_str(&raw)?;
        assert_eq!(document["isAuthenticated"], true);
        assert!(document.get("isLoading").is_none());
        Ok(())
    }

    #[test]
    fn rehydration_discards_authenticated_record_without_token() -> Result<()> {
        let storage = MemoryStorage::new();
        storage.save(
            AUTH_STORAGE_KEY,
            r#"{"user":null,"token":"","isAuthenticated":true}"#,
        )?;
        let store = SessionStore::rehydrate(Arc::new(storage), SessionSignals::new());
        assert_eq!(store.snapshot(), Session::default());
        Ok(())
    }

    #[tokio::test]
    async fn set_user_keeps_token_and_flag() -> Result<()> {
        let store = store_with(&MemoryStorage::new());
        store.login(&stub(&store, accepted), &valid_credentials()).await?;
        let mut renamed = sample_user();
        renamed.name = "Ana S.".to_string();

        store.set_user(renamed.clone());

        let session = store.snapshot();
        assert_eq!(session.user, Some(renamed));
        assert_eq!(session.token.as_deref(), Some("token-1"));
        assert!(session.is_authenticated);
        Ok(())
    }

    #[test]
    fn expired_tokens_are_discarded() -> Result<()> {
        let storage = MemoryStorage::new();
        let token = user_token("t1", 1_000);
        storage.save(
            AUTH_STORAGE_KEY,
            &serde_json::json!({"user": null, "token": token, "isAuthenticated": true}).to_string(),
        )?;
        let store = SessionStore::rehydrate(Arc::new(storage), SessionSignals::new());
        let before_expiry = Utc.timestamp_opt(999, 0).single().expect("timestamp");
        let after_expiry = Utc.timestamp_opt(1_001, 0).single().expect("timestamp");

        assert!(!store.discard_if_expired(before_expiry));
        assert!(store.is_authenticated());
        assert!(store.discard_if_expired(after_expiry));
        assert!(!store.is_authenticated());
        assert_eq!(store.token(), None);
        Ok(())
    }
}

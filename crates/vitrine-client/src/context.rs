//! Explicit client context shared by the API client and its front ends.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use vitrine_events::SessionSignals;

use crate::jwt;
use crate::session::SessionStore;
use crate::storage::{MemoryStorage, StateStorage};
use crate::tenant::TenantStore;

/// Outcome of reconciling a rehydrated session at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// No session is stored.
    Anonymous,
    /// The stored token had expired and the session was cleared.
    Expired,
    /// A usable session is stored.
    Active,
}

/// Bundle of the session store, tenant store and session signals.
///
/// Cloning is cheap and every clone observes the same state, so the API client
/// and the front end read one source of truth.
#[derive(Clone)]
pub struct ClientContext {
    session: SessionStore,
    tenants: TenantStore,
    signals: SessionSignals,
}

impl ClientContext {
    /// Context with empty stores persisting into `storage`.
    #[must_use]
    pub fn new(storage: Arc<dyn StateStorage>) -> Self {
        let signals = SessionSignals::new();
        Self {
            session: SessionStore::new(Arc::clone(&storage), signals.clone()),
            tenants: TenantStore::new(storage),
            signals,
        }
    }

    /// Context initialised from the persisted state in `storage`.
    #[must_use]
    pub fn rehydrate(storage: Arc<dyn StateStorage>) -> Self {
        let signals = SessionSignals::new();
        Self {
            session: SessionStore::rehydrate(Arc::clone(&storage), signals.clone()),
            tenants: TenantStore::rehydrate(storage),
            signals,
        }
    }

    /// Context backed by process-local storage.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()))
    }

    /// Session store handle.
    #[must_use]
    pub const fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Tenant store handle.
    #[must_use]
    pub const fn tenants(&self) -> &TenantStore {
        &self.tenants
    }

    /// Session signal channel.
    #[must_use]
    pub const fn signals(&self) -> &SessionSignals {
        &self.signals
    }

    /// Startup check: drop a session whose token carries a past expiry,
    /// otherwise re-derive the candidate tenants from the stored token.
    /// Tokens that are not JWTs are treated as opaque and stay active.
    pub fn reconcile(&self, now: DateTime<Utc>) -> SessionStatus {
        if self.session.discard_if_expired(now) {
            return SessionStatus::Expired;
        }
        let Some(token) = self.session.token() else {
            return SessionStatus::Anonymous;
        };
        if let Some(tenant) = jwt::tenant_from_token(&token) {
            self.tenants.set_available_tenants(vec![tenant]);
        }
        SessionStatus::Active
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::AUTH_STORAGE_KEY;
    use anyhow::Result;
    use chrono::TimeZone;
    use serde_json::json;
    use vitrine_api_models::Tenant;
    use vitrine_test_support::fixtures::{sample_user, tenant_b, user_json};
    use vitrine_test_support::tokens::user_token;

    fn storage_with_token(token: &str) -> Result<MemoryStorage> {
        let storage = MemoryStorage::new();
        storage.save(
            AUTH_STORAGE_KEY,
            &json!({"user": null, "token": token, "isAuthenticated": true}).to_string(),
        )?;
        Ok(storage)
    }

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).single().expect("valid timestamp")
    }

    #[test]
    fn reconcile_derives_tenant_from_active_token() -> Result<()> {
        let storage = storage_with_token(&user_token("t7", 5_000))?;
        let context = ClientContext::rehydrate(Arc::new(storage));

        assert_eq!(context.reconcile(at(100)), SessionStatus::Active);
        assert_eq!(
            context.tenants().current_tenant(),
            Some(Tenant::new("t7", "Tenant t7"))
        );
        Ok(())
    }

    #[test]
    fn reconcile_keeps_persisted_tenant_choice() -> Result<()> {
        let storage = storage_with_token(&user_token("t7", 5_000))?;
        TenantStore::new(Arc::new(storage.clone())).set_current_tenant(tenant_b());
        let context = ClientContext::rehydrate(Arc::new(storage));

        context.reconcile(at(100));

        assert_eq!(context.tenants().current_tenant(), Some(tenant_b()));
        assert_eq!(context.tenants().available_tenants().len(), 1);
        Ok(())
    }

    #[test]
    fn reconcile_clears_expired_session() -> Result<()> {
        let storage = storage_with_token(&user_token("t7", 5_000))?;
        let context = ClientContext::rehydrate(Arc::new(storage));

        assert_eq!(context.reconcile(at(6_000)), SessionStatus::Expired);
        assert!(!context.session().is_authenticated());
        assert!(context.tenants().available_tenants().is_empty());
        Ok(())
    }

    #[test]
    fn reconcile_keeps_opaque_token_across_restart() -> Result<()> {
        let storage = MemoryStorage::new();
        storage.save(
            AUTH_STORAGE_KEY,
            &json!({
                "user": user_json(),
                "token": "opaque-token-1",
                "isAuthenticated": true
            })
            .to_string(),
        )?;
        let context = ClientContext::rehydrate(Arc::new(storage));

        assert_eq!(context.reconcile(at(1_700_000_000)), SessionStatus::Active);
        assert!(context.session().is_authenticated());
        assert_eq!(context.session().user(), Some(sample_user()));
        assert_eq!(context.session().token().as_deref(), Some("opaque-token-1"));
        assert!(context.tenants().available_tenants().is_empty());
        Ok(())
    }

    #[test]
    fn reconcile_reports_anonymous_without_token() {
        let context = ClientContext::in_memory();
        assert_eq!(context.reconcile(at(0)), SessionStatus::Anonymous);
    }
}

//! Persisted tenant selection.
//!
//! Only the selected tenant survives a reload; the candidate list is live
//! state that front ends re-derive at startup.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{Deserialize, Serialize};
use vitrine_api_models::Tenant;

use crate::storage::{StateStorage, TENANT_STORAGE_KEY, load_state, persist_state};

/// Snapshot of the tenant selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TenantSelection {
    /// Tenant attached to outgoing requests.
    pub current_tenant: Option<Tenant>,
    /// Tenants the user may switch to, in fetch order.
    pub available_tenants: Vec<Tenant>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PersistedTenant {
    #[serde(default)]
    current_tenant: Option<Tenant>,
}

/// Shared handle to the tenant selection.
#[derive(Clone)]
pub struct TenantStore {
    state: Arc<RwLock<TenantSelection>>,
    storage: Arc<dyn StateStorage>,
}

impl TenantStore {
    /// Empty store that persists into `storage`.
    #[must_use]
    pub fn new(storage: Arc<dyn StateStorage>) -> Self {
        Self {
            state: Arc::new(RwLock::new(TenantSelection::default())),
            storage,
        }
    }

    /// Store initialised with the persisted current tenant and an empty
    /// candidate list.
    #[must_use]
    pub fn rehydrate(storage: Arc<dyn StateStorage>) -> Self {
        let current_tenant = load_state::<PersistedTenant>(storage.as_ref(), TENANT_STORAGE_KEY)
            .and_then(|persisted| persisted.current_tenant);
        Self {
            state: Arc::new(RwLock::new(TenantSelection {
                current_tenant,
                available_tenants: Vec::new(),
            })),
            storage,
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, TenantSelection> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, TenantSelection> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn persist(&self, selection: &TenantSelection) {
        let persisted = PersistedTenant {
            current_tenant: selection.current_tenant.clone(),
        };
        if let Err(err) = persist_state(self.storage.as_ref(), TENANT_STORAGE_KEY, &persisted) {
            tracing::warn!(error = %err, "failed to persist tenant selection");
        }
    }

    /// Copy of the current selection.
    #[must_use]
    pub fn snapshot(&self) -> TenantSelection {
        self.read().clone()
    }

    /// Selected tenant, if any.
    #[must_use]
    pub fn current_tenant(&self) -> Option<Tenant> {
        self.read().current_tenant.clone()
    }

    /// Identifier of the selected tenant, if any.
    #[must_use]
    pub fn current_tenant_id(&self) -> Option<String> {
        self.read()
            .current_tenant
            .as_ref()
            .map(|tenant| tenant.id.clone())
    }

    /// Candidate tenants in fetch order.
    #[must_use]
    pub fn available_tenants(&self) -> Vec<Tenant> {
        self.read().available_tenants.clone()
    }

    /// Replace the selected tenant.
    pub fn set_current_tenant(&self, tenant: Tenant) {
        let mut selection = self.write();
        tracing::debug!(tenant_id = %tenant.id, "tenant selected");
        selection.current_tenant = Some(tenant);
        self.persist(&selection);
    }

    /// Replace the candidate list. When nothing is selected yet, the first
    /// candidate becomes the selection.
    pub fn set_available_tenants(&self, tenants: Vec<Tenant>) {
        let mut selection = self.write();
        selection.available_tenants = tenants;
        if selection.current_tenant.is_none()
            && let Some(first) = selection.available_tenants.first().cloned()
        {
            tracing::debug!(tenant_id = %first.id, "defaulting to first available tenant");
            selection.current_tenant = Some(first);
            self.persist(&selection);
        }
    }
}

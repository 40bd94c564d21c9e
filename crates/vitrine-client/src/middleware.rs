//! Request augmentation and response interception.
//!
//! Request middleware runs in registration order right before dispatch, so it
//! always observes the latest session and tenant state. Response middleware
//! runs in registration order on the outcome of every dispatched request.

use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, HeaderName, HeaderValue};
use vitrine_events::{SessionEvent, SessionSignals};

use crate::error::ApiError;
use crate::request::{ApiRequest, ApiResponse};
use crate::session::SessionStore;
use crate::tenant::TenantStore;

/// Header carrying the selected tenant identifier.
pub const HEADER_TENANT_ID: &str = "x-tenant-id";

/// Hook that may rewrite an outgoing request.
pub trait RequestMiddleware: Send + Sync {
    /// Return the request to dispatch.
    fn on_request(&self, request: ApiRequest) -> ApiRequest;
}

/// Hook that observes, and may replace, the outcome of a request.
pub trait ResponseMiddleware: Send + Sync {
    /// Return the outcome handed to the caller.
    ///
    /// # Errors
    ///
    /// Implementations normally pass errors through unchanged.
    fn on_response(
        &self,
        outcome: Result<ApiResponse, ApiError>,
    ) -> Result<ApiResponse, ApiError>;
}

impl<F> RequestMiddleware for F
where
    F: Fn(ApiRequest) -> ApiRequest + Send + Sync,
{
    fn on_request(&self, request: ApiRequest) -> ApiRequest {
        self(request)
    }
}

impl<F> ResponseMiddleware for F
where
    F: Fn(Result<ApiResponse, ApiError>) -> Result<ApiResponse, ApiError> + Send + Sync,
{
    fn on_response(
        &self,
        outcome: Result<ApiResponse, ApiError>,
    ) -> Result<ApiResponse, ApiError> {
        self(outcome)
    }
}

/// Attaches `Authorization: Bearer <token>` while a token is stored.
#[derive(Clone)]
pub struct BearerAuth {
    session: SessionStore,
}

impl BearerAuth {
    /// Middleware reading tokens from `session`.
    #[must_use]
    pub const fn new(session: SessionStore) -> Self {
        Self { session }
    }
}

impl RequestMiddleware for BearerAuth {
    fn on_request(&self, mut request: ApiRequest) -> ApiRequest {
        let Some(token) = self.session.token().filter(|token| !token.is_empty()) else {
            return request;
        };
        match HeaderValue::from_str(&format!("Bearer {token}")) {
            Ok(mut value) => {
                value.set_sensitive(true);
                request.headers.insert(AUTHORIZATION, value);
            }
            Err(err) => {
                tracing::warn!(path = %request.path, error = %err, "stored token is not a valid header value; sending request without it");
            }
        }
        request
    }
}

/// Attaches `x-tenant-id` while a tenant is selected.
#[derive(Clone)]
pub struct TenantHeader {
    tenants: TenantStore,
}

impl TenantHeader {
    /// Middleware reading the selection from `tenants`.
    #[must_use]
    pub const fn new(tenants: TenantStore) -> Self {
        Self { tenants }
    }
}

impl RequestMiddleware for TenantHeader {
    fn on_request(&self, mut request: ApiRequest) -> ApiRequest {
        let Some(tenant_id) = self
            .tenants
            .current_tenant_id()
            .filter(|id| !id.is_empty())
        else {
            return request;
        };
        match HeaderValue::from_str(&tenant_id) {
            Ok(value) => {
                request
                    .headers
                    .insert(HeaderName::from_static(HEADER_TENANT_ID), value);
            }
            Err(err) => {
                tracing::warn!(path = %request.path, error = %err, "tenant id is not a valid header value; sending request without it");
            }
        }
        request
    }
}

/// Tears the session down when the backend answers 401.
///
/// The session is cleared, [`SessionEvent::Unauthenticated`] is published so
/// the front end can route to the login screen, and the original error is
/// still returned to the caller.
#[derive(Clone)]
pub struct SessionExpiry {
    session: SessionStore,
    signals: SessionSignals,
}

impl SessionExpiry {
    /// Middleware clearing `session` and notifying `signals`.
    #[must_use]
    pub const fn new(session: SessionStore, signals: SessionSignals) -> Self {
        Self { session, signals }
    }
}

impl ResponseMiddleware for SessionExpiry {
    fn on_response(
        &self,
        outcome: Result<ApiResponse, ApiError>,
    ) -> Result<ApiResponse, ApiError> {
        if let Err(err) = &outcome
            && err.status() == Some(StatusCode::UNAUTHORIZED)
        {
            let cleared = self.session.clear();
            tracing::info!(cleared, "backend rejected credentials; session cleared");
            self.signals.publish(SessionEvent::unauthenticated());
        }
        outcome
    }
}

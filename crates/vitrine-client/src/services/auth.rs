//! `/auth` endpoints.

use async_trait::async_trait;
use vitrine_api_models::{LoginCredentials, LoginResponse, RegisterRequest, User};

use crate::client::ApiClient;
use crate::error::ApiError;
use crate::request::ApiRequest;
use crate::session::Authenticator;

/// Login, registration and profile calls.
#[derive(Debug, Clone)]
pub struct AuthService {
    client: ApiClient,
}

impl AuthService {
    /// Service issuing requests through `client`.
    #[must_use]
    pub const fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// `POST /auth/login`.
    ///
    /// # Errors
    ///
    /// Returns the backend rejection (normally 401) or a transport failure.
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<LoginResponse, ApiError> {
        self.client.post_json("/auth/login", credentials).await
    }

    /// `POST /auth/register`.
    ///
    /// # Errors
    ///
    /// Propagates dispatch and decode failures.
    pub async fn register(&self, request: &RegisterRequest) -> Result<User, ApiError> {
        self.client.post_json("/auth/register", request).await
    }

    /// `GET /auth/me`.
    ///
    /// # Errors
    ///
    /// Propagates dispatch and decode failures.
    pub async fn me(&self) -> Result<User, ApiError> {
        self.client.get_json("/auth/me").await
    }

    /// `POST /auth/logout`. The local session is not touched.
    ///
    /// # Errors
    ///
    /// Propagates dispatch failures.
    pub async fn logout(&self) -> Result<(), ApiError> {
        self.client.send(ApiRequest::post("/auth/logout")).await?;
        Ok(())
    }
}

#[async_trait]
impl Authenticator for AuthService {
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<LoginResponse, ApiError> {
        self.login(credentials).await
    }
}

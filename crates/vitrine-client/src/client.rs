//! HTTP client running the middleware pipeline around every backend call.

use std::fmt;
use std::sync::Arc;

use reqwest::Client;
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::config::ClientConfig;
use crate::context::ClientContext;
use crate::error::ApiError;
use crate::middleware::{BearerAuth, RequestMiddleware, ResponseMiddleware, SessionExpiry, TenantHeader};
use crate::request::{ApiRequest, ApiResponse, RequestBody};

/// Shared client for the catalog backend.
///
/// Cloning is cheap: clones share the connection pool, the context and the
/// middleware chains.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    context: ClientContext,
    request_chain: Arc<[Arc<dyn RequestMiddleware>]>,
    response_chain: Arc<[Arc<dyn ResponseMiddleware>]>,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("request_middleware", &self.request_chain.len())
            .field("response_middleware", &self.response_chain.len())
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Client with the default bearer, tenant and session-expiry middleware.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Transport`] when the HTTP client cannot be built.
    pub fn new(config: &ClientConfig, context: ClientContext) -> Result<Self, ApiError> {
        Self::builder(config, context).with_default_middleware().build()
    }

    /// Builder without any middleware registered.
    #[must_use]
    pub fn builder(config: &ClientConfig, context: ClientContext) -> ApiClientBuilder {
        ApiClientBuilder {
            config: config.clone(),
            context,
            http: None,
            request_chain: Vec::new(),
            response_chain: Vec::new(),
        }
    }

    /// Base URL without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Context shared with the front end.
    #[must_use]
    pub const fn context(&self) -> &ClientContext {
        &self.context
    }

    fn endpoint(&self, request: &ApiRequest) -> Result<Url, ApiError> {
        let mut url = Url::parse(&format!("{}{}", self.base_url, request.path)).map_err(|source| {
            ApiError::InvalidUrl {
                path: request.path.clone(),
                source,
            }
        })?;
        if !request.query.is_empty() {
            url.query_pairs_mut().extend_pairs(request.query.iter());
        }
        Ok(url)
    }

    /// Run the request middleware, dispatch, then run the response middleware.
    ///
    /// # Errors
    ///
    /// Returns the outcome produced by the response middleware; by default the
    /// original transport or status error.
    pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let request = self
            .request_chain
            .iter()
            .fold(request, |request, middleware| middleware.on_request(request));
        let outcome = self.dispatch(request).await;
        self.response_chain
            .iter()
            .fold(outcome, |outcome, middleware| middleware.on_response(outcome))
    }

    async fn dispatch(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let url = self.endpoint(&request)?;
        let ApiRequest {
            method,
            path,
            headers,
            body,
            ..
        } = request;
        tracing::debug!(%method, %path, "dispatching request");

        let transport = |source: reqwest::Error| ApiError::Transport {
            path: path.clone(),
            source,
        };
        let mut builder = self.http.request(method, url).headers(headers);
        builder = match body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(&value),
            RequestBody::Multipart(form) => builder.multipart(form.into_form().map_err(transport)?),
        };

        let response = builder.send().await.map_err(transport)?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(transport)?;
        tracing::debug!(%path, status = status.as_u16(), "response received");

        if !status.is_success() {
            return Err(ApiError::from_status(status, path, &body));
        }
        Ok(ApiResponse {
            status,
            headers,
            body,
            path,
        })
    }

    /// `GET path`, decoded as `T`.
    ///
    /// # Errors
    ///
    /// Propagates dispatch and decode failures.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send(ApiRequest::get(path)).await?.json()
    }

    /// `POST path` with a JSON body, decoded as `T`.
    ///
    /// # Errors
    ///
    /// Propagates encode, dispatch and decode failures.
    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        let body = serde_json::to_value(body).map_err(|source| ApiError::Encode { source })?;
        self.send(ApiRequest::post(path).body(body)).await?.json()
    }
}

/// Builder for [`ApiClient`].
pub struct ApiClientBuilder {
    config: ClientConfig,
    context: ClientContext,
    http: Option<Client>,
    request_chain: Vec<Arc<dyn RequestMiddleware>>,
    response_chain: Vec<Arc<dyn ResponseMiddleware>>,
}

impl ApiClientBuilder {
    /// Use a preconfigured HTTP client (for default headers, proxies, etc.).
    /// The configured timeout is then the caller's responsibility.
    #[must_use]
    pub fn http_client(mut self, http: Client) -> Self {
        self.http = Some(http);
        self
    }

    /// Append a request middleware.
    #[must_use]
    pub fn with_request_middleware(mut self, middleware: impl RequestMiddleware + 'static) -> Self {
        self.request_chain.push(Arc::new(middleware));
        self
    }

    /// Append a response middleware.
    #[must_use]
    pub fn with_response_middleware(
        mut self,
        middleware: impl ResponseMiddleware + 'static,
    ) -> Self {
        self.response_chain.push(Arc::new(middleware));
        self
    }

    /// Append [`BearerAuth`], [`TenantHeader`] and [`SessionExpiry`] bound to
    /// the builder's context.
    #[must_use]
    pub fn with_default_middleware(self) -> Self {
        let bearer = BearerAuth::new(self.context.session().clone());
        let tenant = TenantHeader::new(self.context.tenants().clone());
        let expiry = SessionExpiry::new(
            self.context.session().clone(),
            self.context.signals().clone(),
        );
        self.with_request_middleware(bearer)
            .with_request_middleware(tenant)
            .with_response_middleware(expiry)
    }

    /// Finish building.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Transport`] when the HTTP client cannot be built.
    pub fn build(self) -> Result<ApiClient, ApiError> {
        let http = match self.http {
            Some(http) => http,
            None => Client::builder()
                .timeout(self.config.timeout)
                .build()
                .map_err(|source| ApiError::Transport {
                    path: String::new(),
                    source,
                })?,
        };
        Ok(ApiClient {
            http,
            base_url: self.config.base_url_str().to_string(),
            context: self.context,
            request_chain: self.request_chain.into(),
            response_chain: self.response_chain.into(),
        })
    }
}

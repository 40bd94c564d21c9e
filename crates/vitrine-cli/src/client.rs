//! Application context, CLI error type and HTTP wiring.

use std::fmt::{self, Display, Formatter};
use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use reqwest::StatusCode;
use reqwest::header::{HeaderMap, HeaderValue};
use vitrine_api_models::ValidationErrors;
use vitrine_client::{
    ApiClient, ApiError, ClientConfig, ClientContext, FileStorage, MemoryStorage, Services,
    StateStorage,
};

use crate::cli::{Cli, OutputFormat};

pub(crate) const HEADER_REQUEST_ID: &str = "x-request-id";

/// CLI-level error type to distinguish validation from operational failures.
#[derive(Debug)]
pub(crate) enum CliError {
    Validation(String),
    Failure(anyhow::Error),
}

/// Convenience alias for functions returning a `CliError`.
pub(crate) type CliResult<T> = Result<T, CliError>;

impl CliError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn failure(error: impl Into<anyhow::Error>) -> Self {
        Self::Failure(error.into())
    }

    pub(crate) const fn exit_code(&self) -> i32 {
        match self {
            Self::Validation(_) => 2,
            Self::Failure(_) => 3,
        }
    }

    pub(crate) fn display_message(&self) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::Failure(error) => format!("{error:#}"),
        }
    }
}

impl Display for CliError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str("cli error")
    }
}

impl std::error::Error for CliError {}

impl From<ValidationErrors> for CliError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors.to_string())
    }
}

impl From<ApiError> for CliError {
    fn from(error: ApiError) -> Self {
        classify_api_error(error)
    }
}

/// Map a client failure onto the CLI exit-code contract: rejected input is a
/// validation error, everything else is an operational failure.
pub(crate) fn classify_api_error(error: ApiError) -> CliError {
    match error.status() {
        Some(StatusCode::BAD_REQUEST | StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY) => {
            CliError::validation(error.to_string())
        }
        _ => CliError::failure(error),
    }
}

/// Application context passed to command handlers.
#[derive(Clone)]
pub(crate) struct AppContext {
    pub(crate) context: ClientContext,
    pub(crate) services: Services,
    pub(crate) output: OutputFormat,
}

impl AppContext {
    /// Build the client stack from CLI flags: persisted stores, HTTP client
    /// with a per-invocation request id, and the service bundle.
    pub(crate) fn from_cli(cli: &Cli, trace_id: &str) -> CliResult<Self> {
        let config = ClientConfig {
            base_url: cli.api_url.clone(),
            timeout: Duration::from_secs(cli.timeout),
            state_dir: cli.state_dir.clone(),
        };
        let storage: Arc<dyn StateStorage> = match config.resolved_state_dir() {
            Some(dir) => Arc::new(FileStorage::new(dir)),
            None => {
                tracing::warn!("no state directory available; session will not persist");
                Arc::new(MemoryStorage::new())
            }
        };
        let context = ClientContext::rehydrate(storage);

        let mut default_headers = HeaderMap::new();
        let request_id = HeaderValue::from_str(trace_id).map_err(|_| {
            CliError::failure(anyhow!("trace identifier contains invalid characters"))
        })?;
        default_headers.insert(HEADER_REQUEST_ID, request_id);
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .default_headers(default_headers)
            .build()
            .map_err(|err| CliError::failure(anyhow!("failed to build HTTP client: {err}")))?;

        let client = ApiClient::builder(&config, context.clone())
            .http_client(http)
            .with_default_middleware()
            .build()
            .map_err(CliError::failure)?;
        Ok(Self::new(&client, cli.output))
    }

    pub(crate) fn new(client: &ApiClient, output: OutputFormat) -> Self {
        Self {
            context: client.context().clone(),
            services: Services::new(client),
            output,
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use httpmock::prelude::*;
    use serde_json::Value;
    use tempfile::TempDir;

    #[test]
    fn rejected_input_maps_to_validation_exit_code() {
        let err = classify_api_error(ApiError::from_status(
            StatusCode::UNPROCESSABLE_ENTITY,
            "/products",
            br#"{"message": ["name too short"]}"#,
        ));
        assert_eq!(err.exit_code(), 2);
        assert_eq!(err.display_message(), "name too short (status 422 Unprocessable Entity)");
    }

    #[test]
    fn other_statuses_map_to_failure_exit_code() {
        let err = CliError::from(ApiError::from_status(
            StatusCode::INTERNAL_SERVER_ERROR,
            "/products",
            b"",
        ));
        assert_eq!(err.exit_code(), 3);
        assert!(err.display_message().contains("request failed with status 500"));
    }

    #[tokio::test]
    async fn requests_carry_trace_id_and_state_lands_in_state_dir() -> anyhow::Result<()> {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/products")
                    .header(HEADER_REQUEST_ID, "trace-123");
                then.status(200).body("[]");
            })
            .await;
        let state = TempDir::new()?;
        let base_url = server.base_url();
        let state_dir = state.path().to_string_lossy().to_string();
        let cli = Cli::try_parse_from([
            "vitrine",
            "--api-url",
            base_url.as_str(),
            "--state-dir",
            state_dir.as_str(),
            "products",
            "ls",
        ])?;

        let ctx = AppContext::from_cli(&cli, "trace-123").map_err(|err| anyhow!(err.display_message()))?;
        let listed: Value = ctx.services.products.client().get_json("/products").await?;
        ctx.context
            .tenants()
            .set_current_tenant(vitrine_test_support::fixtures::tenant_b());

        assert_eq!(listed, Value::Array(Vec::new()));
        assert!(state.path().join("tenant-storage.json").exists());
        mock.assert_async().await;
        Ok(())
    }
}

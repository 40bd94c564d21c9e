#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
#![allow(clippy::module_name_repetitions)]

//! Tenant-aware REST client for the Vitrine catalog backend.
//!
//! Every backend call flows through one [`ApiClient`]. Before dispatch the
//! request middleware reads the current bearer token and selected tenant from
//! the [`ClientContext`]; after dispatch the response middleware tears the
//! session down on HTTP 401 and still hands the original error back to the
//! caller.
//!
//! Layout:
//! - `config.rs`: base URL, timeout and state directory resolution
//! - `error.rs`: client, configuration and storage errors
//! - `storage.rs`: durable key-value backends and typed persistence helpers
//! - `session.rs` / `tenant.rs`: persisted session and tenant stores
//! - `context.rs`: the shared handle bundling both stores and session signals
//! - `request.rs`: request/response descriptors and payload types
//! - `middleware.rs`: request augmentation and response interception
//! - `client.rs`: the HTTP client running the middleware pipeline
//! - `resource.rs`: generic CRUD service factory
//! - `services/`: auth and catalog entity services
//! - `jwt.rs`: unverified token inspection helpers

pub mod client;
pub mod config;
pub mod context;
pub mod error;
pub mod jwt;
pub mod middleware;
pub mod request;
pub mod resource;
pub mod services;
pub mod session;
pub mod storage;
pub mod tenant;

pub use client::{ApiClient, ApiClientBuilder};
pub use config::ClientConfig;
pub use context::{ClientContext, SessionStatus};
pub use error::{ApiError, ConfigError, StorageError};
pub use middleware::{BearerAuth, RequestMiddleware, ResponseMiddleware, SessionExpiry, TenantHeader};
pub use request::{ApiRequest, ApiResponse, MultipartForm, MultipartPart, RequestBody, RequestOptions};
pub use resource::{Payload, Resource, ResourceId, ResourceService};
pub use services::{AuthService, BannerService, CategoryService, ProductService, Services, ShelfService};
pub use session::{Authenticator, Session, SessionStore};
pub use storage::{FileStorage, MemoryStorage, StateStorage};
pub use tenant::{TenantSelection, TenantStore};
pub use vitrine_events::{LOGIN_ROUTE, SessionEvent, SessionSignals};

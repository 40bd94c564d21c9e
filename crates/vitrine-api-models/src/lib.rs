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
    clippy::cargo,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
//! Shared HTTP DTOs for the Vitrine catalog API.
//!
//! These types mirror the JSON documents exchanged with the catalog backend
//! (camelCase entity fields, snake_case form payloads) so the client and the
//! CLI encode requests and decode responses from a single definition.

pub mod catalog;
pub mod validate;

use serde::{Deserialize, Serialize};

pub use catalog::{
    Banner, BannerFormData, Category, CategoryFormData, Product, ProductFormData, Shelf,
    ShelfFormData,
};
pub use validate::{FieldError, Validate, ValidationErrors};

/// Authenticated identity returned by the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    /// Stable user identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Login e-mail address.
    pub email: String,
    /// Role label assigned by the backend (for example `admin`).
    pub role: String,
}

/// Credentials submitted to `POST /auth/login`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoginCredentials {
    /// Login e-mail address.
    pub email: String,
    /// Plain-text password.
    pub password: String,
}

/// Response document returned by `POST /auth/login`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoginResponse {
    /// Identity of the authenticated user.
    pub user: User,
    /// Opaque bearer credential.
    pub access_token: String,
}

/// Payload submitted to `POST /auth/register`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegisterRequest {
    /// Display name for the new account.
    pub name: String,
    /// Login e-mail address.
    pub email: String,
    /// Plain-text password.
    pub password: String,
}

/// Logical customer partition that scopes every data request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Tenant {
    /// Identifier sent in the `x-tenant-id` header.
    pub id: String,
    /// Human-readable tenant name.
    pub name: String,
    /// Optional logo URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
}

impl Tenant {
    /// Construct a tenant without a logo.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            logo: None,
        }
    }
}

/// Error document emitted by the backend on failed requests.
///
/// Two shapes are accepted: the framework default
/// (`{"statusCode", "message", "error"}`, where `message` may be a list of
/// validation messages) and RFC 9457 problem documents (`{"title", "detail"}`).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    /// HTTP status echoed by the backend.
    #[serde(default, rename = "statusCode", skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    /// Primary message or list of messages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<ErrorMessage>,
    /// Short reason phrase.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Problem document title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Problem document detail.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Message field of an [`ErrorBody`], either a single string or a list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum ErrorMessage {
    /// Single message.
    One(String),
    /// Several messages, typically one per invalid field.
    Many(Vec<String>),
}

impl ErrorBody {
    /// Best human-readable summary carried by the document, if any.
    #[must_use]
    pub fn summary(&self) -> Option<String> {
        let message = match &self.message {
            Some(ErrorMessage::One(text)) if !text.trim().is_empty() => Some(text.trim().to_string()),
            Some(ErrorMessage::Many(items)) if !items.is_empty() => Some(items.join("; ")),
            _ => None,
        };
        message
            .or_else(|| self.detail.clone())
            .or_else(|| self.title.clone())
            .or_else(|| self.error.clone())
    }
}

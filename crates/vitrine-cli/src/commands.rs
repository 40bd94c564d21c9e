//! Command handlers grouped by concern.

pub(crate) mod auth;
pub(crate) mod catalog;
pub(crate) mod tenants;

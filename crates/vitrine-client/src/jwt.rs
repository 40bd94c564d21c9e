//! Unverified inspection of bearer tokens.
//!
//! The backend owns signature verification. These helpers only read the
//! payload segment so the client can skip requests with an obviously expired
//! token and derive identity and tenant defaults after a reload.

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use vitrine_api_models::{Tenant, User};

/// Claims carried by tokens issued by the catalog backend.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct TokenClaims {
    /// Subject (user identifier).
    pub sub: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Login e-mail address.
    #[serde(default)]
    pub email: String,
    /// Role label.
    #[serde(default)]
    pub role: String,
    /// Tenant the token was issued for.
    #[serde(default)]
    pub tenant_id: Option<String>,
    /// Expiry as seconds since the Unix epoch.
    pub exp: i64,
}

/// Decode the payload segment of a compact JWT without verifying it.
#[must_use]
pub fn decode_token(token: &str) -> Option<TokenClaims> {
    let payload = token.split('.').nth(1)?;
    let bytes = match URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')) {
        Ok(bytes) => bytes,
        Err(err) => {
            tracing::debug!(error = %err, "token payload is not base64url");
            return None;
        }
    };
    match serde_json::from_slice(&bytes) {
        Ok(claims) => Some(claims),
        Err(err) => {
            tracing::debug!(error = %err, "token payload is not a claims document");
            None
        }
    }
}

/// Whether `token` expired before `now`. Undecodable tokens count as expired.
#[must_use]
pub fn is_token_expired(token: &str, now: DateTime<Utc>) -> bool {
    decode_token(token).is_none_or(|claims| claims.exp.saturating_mul(1_000) < now.timestamp_millis())
}

/// Expiry instant carried by `token`, when it decodes as a JWT.
#[must_use]
pub fn token_expiry(token: &str) -> Option<DateTime<Utc>> {
    decode_token(token).and_then(|claims| DateTime::from_timestamp(claims.exp, 0))
}

/// Identity described by the token claims.
#[must_use]
pub fn user_from_token(token: &str) -> Option<User> {
    let claims = decode_token(token)?;
    Some(User {
        id: claims.sub,
        name: claims.name,
        email: claims.email,
        role: claims.role,
    })
}

/// Tenant the token was issued for, named after its identifier.
#[must_use]
pub fn tenant_from_token(token: &str) -> Option<Tenant> {
    let tenant_id = decode_token(token)?
        .tenant_id
        .filter(|id| !id.trim().is_empty())?;
    let name = format!("Tenant {tenant_id}");
    Some(Tenant::new(tenant_id, name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;
    use vitrine_test_support::tokens::{unsigned_jwt, user_token};

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).single().expect("valid timestamp")
    }

    #[test]
    fn decodes_claims_from_payload_segment() {
        let token = user_token("t1", 2_000);
        let claims = decode_token(&token).expect("claims");
        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.tenant_id.as_deref(), Some("t1"));
        assert_eq!(claims.exp, 2_000);
    }

    #[test]
    fn malformed_tokens_do_not_decode() {
        assert_eq!(decode_token("opaque-token"), None);
        assert_eq!(decode_token("a.%%%.c"), None);
        assert_eq!(decode_token(&unsigned_jwt(&json!({"hello": "world"}))), None);
    }

    #[test]
    fn expiry_compares_against_now() {
        let token = user_token("t1", 2_000);
        assert!(!is_token_expired(&token, at(1_999)));
        assert!(!is_token_expired(&token, at(2_000)));
        assert!(is_token_expired(&token, at(2_001)));
        assert!(is_token_expired("garbage", at(0)));
    }

    #[test]
    fn expiry_instant_only_for_decodable_tokens() {
        assert_eq!(token_expiry(&user_token("t1", 2_000)), Some(at(2_000)));
        assert_eq!(token_expiry("opaque-token"), None);
        assert_eq!(token_expiry(&unsigned_jwt(&json!({"sub": "u"}))), None);
    }

    #[test]
    fn derives_user_and_tenant() {
        let token = user_token("t9", 2_000);
        let user = user_from_token(&token).expect("user");
        assert_eq!(user.email, "ana@example.com");
        assert_eq!(tenant_from_token(&token), Some(Tenant::new("t9", "Tenant t9")));

        let no_tenant = unsigned_jwt(&json!({"sub": "u", "exp": 1, "tenant_id": ""}));
        assert_eq!(tenant_from_token(&no_tenant), None);
    }
}

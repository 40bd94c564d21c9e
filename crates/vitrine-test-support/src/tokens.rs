//! Unsigned JWT builder for exercising token helpers without a real issuer.

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use serde_json::{Value, json};

/// Encode `claims` as a compact JWT with an `alg: none` header and a dummy
/// signature segment.
#[must_use]
pub fn unsigned_jwt(claims: &Value) -> String {
    let header = json!({"alg": "none", "typ": "JWT"});
    format!(
        "{}.{}.signature",
        URL_SAFE_NO_PAD.encode(header.to_string()),
        URL_SAFE_NO_PAD.encode(claims.to_string()),
    )
}

/// Token for the sample user scoped to `tenant_id`, expiring at `exp` (seconds
/// since the Unix epoch).
#[must_use]
pub fn user_token(tenant_id: &str, exp: i64) -> String {
    unsigned_jwt(&json!({
        "sub": "user-1",
        "name": "Ana Souza",
        "email": "ana@example.com",
        "role": "admin",
        "tenant_id": tenant_id,
        "exp": exp,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsigned_jwt_has_three_segments() {
        let token = user_token("t1", 4_102_444_800);
        assert_eq!(token.split('.').count(), 3);
        let payload = token.split('.').nth(1).expect("payload segment");
        let decoded = URL_SAFE_NO_PAD.decode(payload).expect("base64url");
        let claims: Value = serde_json::from_slice(&decoded).expect("json claims");
        assert_eq!(claims["tenant_id"], "t1");
    }
}

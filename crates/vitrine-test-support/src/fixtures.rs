//! Sample DTOs and backend documents.

use serde_json::{Value, json};
use vitrine_api_models::{LoginCredentials, Tenant, User};

/// Timestamp used by every sample document.
pub const SAMPLE_TIMESTAMP: &str = "2024-05-01T10:00:00Z";

/// Administrator identity used across suites.
#[must_use]
pub fn sample_user() -> User {
    User {
        id: "user-1".to_string(),
        name: "Ana Souza".to_string(),
        email: "ana@example.com".to_string(),
        role: "admin".to_string(),
    }
}

/// Credentials that pass client-side validation.
#[must_use]
pub fn valid_credentials() -> LoginCredentials {
    LoginCredentials {
        email: "ana@example.com".to_string(),
        password: "secret-123".to_string(),
    }
}

/// First tenant in the sample tenant list.
#[must_use]
pub fn tenant_a() -> Tenant {
    Tenant::new("15d1d006-176f-481c-9bff-9a8d3330bfdc", "Loja Centro")
}

/// Second tenant in the sample tenant list.
#[must_use]
pub fn tenant_b() -> Tenant {
    Tenant::new("2", "Loja Norte")
}

/// Login response document for [`sample_user`] carrying `token`.
#[must_use]
pub fn login_response_json(token: &str) -> Value {
    json!({
        "user": user_json(),
        "access_token": token,
    })
}

/// JSON form of [`sample_user`].
#[must_use]
pub fn user_json() -> Value {
    let user = sample_user();
    json!({
        "id": user.id,
        "name": user.name,
        "email": user.email,
        "role": user.role,
    })
}

/// Product document as returned by the backend.
#[must_use]
pub fn product_json(id: i64, name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "description": "Produto de exemplo",
        "price": 19.9,
        "stock": 12,
        "isActive": true,
        "createdAt": SAMPLE_TIMESTAMP,
        "updatedAt": SAMPLE_TIMESTAMP,
    })
}

/// Category document as returned by the backend.
#[must_use]
pub fn category_json(id: i64, name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "tenantId": tenant_a().id,
        "isActive": true,
        "products": [],
        "createdAt": SAMPLE_TIMESTAMP,
        "updatedAt": SAMPLE_TIMESTAMP,
    })
}

/// Shelf document as returned by the backend.
#[must_use]
pub fn shelf_json(id: i64, title: &str) -> Value {
    json!({
        "id": id,
        "title": title,
        "position": 1,
        "tenantId": tenant_a().id,
        "isActive": true,
        "products": [],
        "createdAt": SAMPLE_TIMESTAMP,
        "updatedAt": SAMPLE_TIMESTAMP,
    })
}

/// Banner document as returned by the backend, with a server-relative image.
#[must_use]
pub fn banner_json(id: i64, image_url: &str) -> Value {
    json!({
        "id": id,
        "title": format!("Banner {id}"),
        "position": id,
        "tenantId": tenant_a().id,
        "isActive": true,
        "imageUrl": image_url,
        "createdAt": SAMPLE_TIMESTAMP,
        "updatedAt": SAMPLE_TIMESTAMP,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use vitrine_api_models::{Banner, LoginResponse, Product};

    #[test]
    fn sample_documents_decode_into_models() {
        let login: LoginResponse =
            serde_json::from_value(login_response_json("tok")).expect("login response");
        assert_eq!(login.user, sample_user());

        let product: Product = serde_json::from_value(product_json(7, "Café")).expect("product");
        assert_eq!(product.id, 7);

        let banner: Banner =
            serde_json::from_value(banner_json(1, "/uploads/a.png")).expect("banner");
        assert_eq!(banner.image_url, "/uploads/a.png");
    }
}

//! Client-side form validation run before a payload is dispatched.

use std::fmt::{self, Display, Formatter};

use thiserror::Error;

use crate::{
    BannerFormData, CategoryFormData, LoginCredentials, ProductFormData, RegisterRequest,
    ShelfFormData,
};

const MIN_PASSWORD_LEN: usize = 6;
const MIN_NAME_LEN: usize = 3;
const MIN_DESCRIPTION_LEN: usize = 10;
const MIN_PRICE: f64 = 0.01;

/// Validation failure attached to a single form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Field name as it appears in the form payload.
    pub field: &'static str,
    /// Human-readable description of the failure.
    pub message: String,
}

impl Display for FieldError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}: {}", self.field, self.message)
    }
}

/// Collection of field failures reported by [`Validate::validate`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("{}", render(.errors))]
pub struct ValidationErrors {
    /// Failures in field order.
    pub errors: Vec<FieldError>,
}

fn render(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationErrors {
    fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.push(FieldError {
            field,
            message: message.into(),
        });
    }

    /// Failure recorded for `field`, if any.
    #[must_use]
    pub fn field(&self, field: &str) -> Option<&FieldError> {
        self.errors.iter().find(|error| error.field == field)
    }

    fn into_result(self) -> Result<(), Self> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

/// Schema check applied to a form before it reaches the network.
pub trait Validate {
    /// Validate every field, reporting all failures at once.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationErrors`] listing each offending field.
    fn validate(&self) -> Result<(), ValidationErrors>;
}

/// Loose structural e-mail check: `local@domain.tld` without whitespace.
#[must_use]
pub fn is_valid_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2 && labels.iter().all(|label| !label.is_empty())
}

fn check_min_len(
    errors: &mut ValidationErrors,
    field: &'static str,
    value: &str,
    min: usize,
) {
    if value.trim().chars().count() < min {
        errors.push(field, format!("must be at least {min} characters"));
    }
}

impl Validate for LoginCredentials {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        if !is_valid_email(&self.email) {
            errors.push("email", "invalid e-mail address");
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            errors.push(
                "password",
                format!("must be at least {MIN_PASSWORD_LEN} characters"),
            );
        }
        errors.into_result()
    }
}

impl Validate for RegisterRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        check_min_len(&mut errors, "name", &self.name, MIN_NAME_LEN);
        if !is_valid_email(&self.email) {
            errors.push("email", "invalid e-mail address");
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            errors.push(
                "password",
                format!("must be at least {MIN_PASSWORD_LEN} characters"),
            );
        }
        errors.into_result()
    }
}

impl Validate for ProductFormData {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        check_min_len(&mut errors, "name", &self.name, MIN_NAME_LEN);
        check_min_len(
            &mut errors,
            "description",
            &self.description,
            MIN_DESCRIPTION_LEN,
        );
        if !self.price.is_finite() || self.price < MIN_PRICE {
            errors.push("price", "must be greater than zero");
        }
        if self.stock < 0 {
            errors.push("stock", "cannot be negative");
        }
        errors.into_result()
    }
}

impl Validate for CategoryFormData {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        check_min_len(&mut errors, "name", &self.name, MIN_NAME_LEN);
        errors.into_result()
    }
}

impl Validate for ShelfFormData {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        check_min_len(&mut errors, "title", &self.title, MIN_NAME_LEN);
        errors.into_result()
    }
}

impl Validate for BannerFormData {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        check_min_len(&mut errors, "title", &self.title, MIN_NAME_LEN);
        if self.position <= 0 {
            errors.push("position", "must be a positive number");
        }
        errors.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_check_accepts_common_addresses() {
        assert!(is_valid_email("a@a.com"));
        assert!(is_valid_email("first.last@shop.example.com.br"));
        assert!(!is_valid_email("missing-at.com"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("a @b.com"));
        assert!(!is_valid_email("@b.com"));
        assert!(!is_valid_email("a@b..com"));
    }

    #[test]
    fn login_rejects_short_password_but_accepts_valid_email() {
        let credentials = LoginCredentials {
            email: "a@a.com".into(),
            password: "short".into(),
        };
        let errors = credentials.validate().expect_err("password too short");
        assert!(errors.field("email").is_none());
        assert_eq!(
            errors.field("password").map(|error| error.message.as_str()),
            Some("must be at least 6 characters")
        );
    }

    #[test]
    fn product_reports_every_failing_field() {
        let form = ProductFormData {
            name: "ab".into(),
            description: "too short".into(),
            price: 0.0,
            stock: -1,
            image_url: None,
        };
        let errors = form.validate().expect_err("invalid product");
        let fields: Vec<_> = errors.errors.iter().map(|error| error.field).collect();
        assert_eq!(fields, vec!["name", "description", "price", "stock"]);
        assert!(errors.to_string().starts_with("name: must be at least 3"));
    }

    #[test]
    fn product_accepts_minimum_values() {
        let form = ProductFormData {
            name: "Café".into(),
            description: "Torra média, 500g".into(),
            price: 0.01,
            stock: 0,
            image_url: None,
        };
        assert!(form.validate().is_ok());
    }

    #[test]
    fn banner_requires_positive_position() {
        let form = BannerFormData {
            title: "Verão".into(),
            position: 0,
            is_active: true,
        };
        let errors = form.validate().expect_err("position must be positive");
        assert_eq!(errors.errors.len(), 1);
        assert_eq!(errors.errors[0].field, "position");
    }

    #[test]
    fn shelf_and_category_only_check_their_titles() {
        let shelf = ShelfFormData {
            title: "Ofertas".into(),
            ..ShelfFormData::default()
        };
        assert!(shelf.validate().is_ok());
        assert!(CategoryFormData::default().validate().is_err());
    }
}

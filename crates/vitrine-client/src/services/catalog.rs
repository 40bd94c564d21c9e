//! Catalog collections: products, categories, shelves and banners.

use bytes::Bytes;
use vitrine_api_models::{Banner, BannerFormData, Category, Product, Shelf};

use crate::error::ApiError;
use crate::request::MultipartForm;
use crate::resource::{Resource, ResourceId, ResourceService};

/// CRUD service for `/products`.
pub type ProductService = ResourceService<Product>;
/// CRUD service for `/categories`.
pub type CategoryService = ResourceService<Category>;
/// CRUD service for `/shelves`.
pub type ShelfService = ResourceService<Shelf>;
/// CRUD service for `/banners`.
pub type BannerService = ResourceService<Banner>;

impl Resource for Product {
    const PATH: &'static str = "/products";
}

impl Resource for Category {
    const PATH: &'static str = "/categories";
}

impl Resource for Shelf {
    const PATH: &'static str = "/shelves";
}

impl Resource for Banner {
    const PATH: &'static str = "/banners";

    fn on_read(mut self, base_url: &str) -> Self {
        self.image_url = absolute_image_url(base_url, &self.image_url);
        self
    }
}

/// Prefix a server-relative image path with `base_url`. Absolute and empty
/// values are returned unchanged.
#[must_use]
pub fn absolute_image_url(base_url: &str, image_url: &str) -> String {
    if image_url.is_empty() || image_url.contains("://") {
        return image_url.to_string();
    }
    let base = base_url.trim_end_matches('/');
    if image_url.starts_with('/') {
        format!("{base}{image_url}")
    } else {
        format!("{base}/{image_url}")
    }
}

impl ResourceService<Product> {
    /// `GET /products/category/{id}`.
    ///
    /// # Errors
    ///
    /// Propagates dispatch and decode failures.
    pub async fn by_category(
        &self,
        category_id: impl Into<ResourceId>,
    ) -> Result<Vec<Product>, ApiError> {
        let path = format!("{}/category/{}", Product::PATH, category_id.into());
        self.client().get_json(&path).await
    }
}

/// What a banner submission does with the stored image.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum BannerImage {
    /// Leave the current image untouched.
    #[default]
    Keep,
    /// Upload a new image.
    Upload {
        /// File name reported to the backend.
        file_name: String,
        /// MIME type, when known.
        content_type: Option<String>,
        /// Image contents.
        bytes: Bytes,
    },
    /// Remove the current image.
    Clear,
}

/// Multipart form for a banner create or update: every field as a text part,
/// followed by the `image` part when one is uploaded or cleared.
#[must_use]
pub fn banner_form(form: &BannerFormData, image: BannerImage) -> MultipartForm {
    let multipart = form
        .text_fields()
        .into_iter()
        .fold(MultipartForm::new(), |multipart, (name, value)| {
            multipart.text(name, value)
        });
    match image {
        BannerImage::Keep => multipart,
        BannerImage::Upload {
            file_name,
            content_type,
            bytes,
        } => multipart.file("image", file_name, content_type, bytes),
        BannerImage::Clear => multipart.text("image", ""),
    }
}

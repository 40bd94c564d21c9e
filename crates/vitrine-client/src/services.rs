//! Auth and catalog services bound to one shared [`ApiClient`].

pub mod auth;
pub mod catalog;

pub use auth::AuthService;
pub use catalog::{
    BannerImage, BannerService, CategoryService, ProductService, ShelfService,
    absolute_image_url, banner_form,
};

use crate::client::ApiClient;
use crate::resource::ResourceService;

/// Every service the dashboard uses, sharing one client.
#[derive(Debug, Clone)]
pub struct Services {
    /// `/products`.
    pub products: ProductService,
    /// `/categories`.
    pub categories: CategoryService,
    /// `/shelves`.
    pub shelves: ShelfService,
    /// `/banners`.
    pub banners: BannerService,
    /// `/auth`.
    pub auth: AuthService,
}

impl Services {
    /// Bind every service to `client`.
    #[must_use]
    pub fn new(client: &ApiClient) -> Self {
        Self {
            products: ResourceService::new(client.clone()),
            categories: ResourceService::new(client.clone()),
            shelves: ResourceService::new(client.clone()),
            banners: ResourceService::new(client.clone()),
            auth: AuthService::new(client.clone()),
        }
    }
}

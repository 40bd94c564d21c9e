//! Generic CRUD services over backend resource collections.

use std::fmt;
use std::marker::PhantomData;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::client::ApiClient;
use crate::error::ApiError;
use crate::request::{ApiRequest, MultipartForm, RequestBody, RequestOptions};

/// Entity exposed as a REST collection.
pub trait Resource: DeserializeOwned + Send + 'static {
    /// Collection path, e.g. `/products`.
    const PATH: &'static str;

    /// Post-process an entity read from the backend. `base_url` is the client
    /// base URL without a trailing slash.
    #[must_use]
    fn on_read(self, _base_url: &str) -> Self {
        self
    }
}

/// Identifier of a single resource, rendered into the item path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceId(String);

impl ResourceId {
    /// Identifier as it appears in the URL.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

macro_rules! resource_id_from {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for ResourceId {
                fn from(value: $ty) -> Self {
                    Self(value.to_string())
                }
            }
        )*
    };
}

resource_id_from!(i32, i64, u32, u64, &str, String, &String);

/// Body of a create or update call.
#[derive(Debug, Clone)]
pub enum Payload {
    /// JSON document.
    Json(Value),
    /// `multipart/form-data` form.
    Multipart(MultipartForm),
}

impl Payload {
    /// Serialise `body` as a JSON payload.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Encode`] when `body` cannot be serialised.
    pub fn json<B: Serialize + ?Sized>(body: &B) -> Result<Self, ApiError> {
        serde_json::to_value(body)
            .map(Self::Json)
            .map_err(|source| ApiError::Encode { source })
    }
}

impl From<MultipartForm> for Payload {
    fn from(form: MultipartForm) -> Self {
        Self::Multipart(form)
    }
}

impl From<Payload> for RequestBody {
    fn from(payload: Payload) -> Self {
        match payload {
            Payload::Json(value) => Self::Json(value),
            Payload::Multipart(form) => Self::Multipart(form),
        }
    }
}

/// CRUD operations over the collection at `T::PATH`.
///
/// Every call goes through the shared [`ApiClient`], so credentials and the
/// tenant header are attached at dispatch.
pub struct ResourceService<T> {
    client: ApiClient,
    _resource: PhantomData<fn() -> T>,
}

impl<T> Clone for ResourceService<T> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            _resource: PhantomData,
        }
    }
}

impl<T: Resource> fmt::Debug for ResourceService<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceService")
            .field("path", &T::PATH)
            .finish_non_exhaustive()
    }
}

impl<T: Resource> ResourceService<T> {
    /// Service issuing requests through `client`.
    #[must_use]
    pub const fn new(client: ApiClient) -> Self {
        Self {
            client,
            _resource: PhantomData,
        }
    }

    /// Client the service dispatches through.
    #[must_use]
    pub const fn client(&self) -> &ApiClient {
        &self.client
    }

    fn item_path(id: &ResourceId) -> String {
        format!("{}/{id}", T::PATH)
    }

    fn read_one(&self, entity: T) -> T {
        entity.on_read(self.client.base_url())
    }

    fn read_many(&self, entities: Vec<T>) -> Vec<T> {
        entities
            .into_iter()
            .map(|entity| self.read_one(entity))
            .collect()
    }

    /// `GET {path}` with optional query parameters and headers.
    ///
    /// # Errors
    ///
    /// Propagates dispatch and decode failures.
    pub async fn list(&self, options: RequestOptions) -> Result<Vec<T>, ApiError> {
        let request = ApiRequest::get(T::PATH).options(options);
        let entities = self.client.send(request).await?.json()?;
        Ok(self.read_many(entities))
    }

    /// `GET {path}/{id}`.
    ///
    /// # Errors
    ///
    /// Propagates dispatch and decode failures.
    pub async fn get(&self, id: impl Into<ResourceId>) -> Result<T, ApiError> {
        let request = ApiRequest::get(Self::item_path(&id.into()));
        let entity = self.client.send(request).await?.json()?;
        Ok(self.read_one(entity))
    }

    /// `POST {path}` with a JSON or multipart payload.
    ///
    /// # Errors
    ///
    /// Propagates dispatch and decode failures.
    pub async fn create(&self, payload: impl Into<Payload>) -> Result<T, ApiError> {
        let request = ApiRequest::post(T::PATH).body(payload.into());
        let entity = self.client.send(request).await?.json()?;
        Ok(self.read_one(entity))
    }

    /// `PUT {path}/{id}` with a JSON or multipart payload.
    ///
    /// # Errors
    ///
    /// Propagates dispatch and decode failures.
    pub async fn update(
        &self,
        id: impl Into<ResourceId>,
        payload: impl Into<Payload>,
    ) -> Result<T, ApiError> {
        let request = ApiRequest::put(Self::item_path(&id.into())).body(payload.into());
        let entity = self.client.send(request).await?.json()?;
        Ok(self.read_one(entity))
    }

    /// `DELETE {path}/{id}`; whatever the backend answers is returned as-is
    /// (`null` for an empty body).
    ///
    /// # Errors
    ///
    /// Propagates dispatch and decode failures.
    pub async fn delete(&self, id: impl Into<ResourceId>) -> Result<Value, ApiError> {
        let request = ApiRequest::delete(Self::item_path(&id.into()));
        self.client.send(request).await?.json()
    }

    /// `GET {path}/busca?termo={term}`.
    ///
    /// # Errors
    ///
    /// Propagates dispatch and decode failures.
    pub async fn search(&self, term: &str) -> Result<Vec<T>, ApiError> {
        let request = ApiRequest::get(format!("{}/busca", T::PATH)).query("termo", term);
        let entities = self.client.send(request).await?.json()?;
        Ok(self.read_many(entities))
    }
}

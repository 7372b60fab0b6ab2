//! REST surface of the registry: paths, query encoding, and the transport
//! adapter seam.

mod query;
mod transport;

pub use query::{ListOptions, OrderByField, SortOrder};
pub use transport::{HttpAdapter, RestAdapter, RestRequest, RestResponse};

/// Versioned API root every path hangs off.
pub const BASE_PATH: &str = "/api/model_registry/v1alpha3";

/// Path of a collection, e.g. `/api/model_registry/v1alpha3/registered_models`.
pub(crate) fn collection_path(collection: &str) -> String {
    format!("{BASE_PATH}/{collection}")
}

/// Path of a single resource within a collection.
pub(crate) fn item_path(collection: &str, id: &str) -> String {
    format!("{BASE_PATH}/{collection}/{id}")
}

/// Path of a parent-scoped subcollection, e.g.
/// `/api/model_registry/v1alpha3/registered_models/7/versions`.
pub(crate) fn subcollection_path(collection: &str, id: &str, subcollection: &str) -> String {
    format!("{BASE_PATH}/{collection}/{id}/{subcollection}")
}

/// Path of a singular find endpoint, e.g.
/// `/api/model_registry/v1alpha3/registered_model`.
pub(crate) fn finder_path(finder: &str) -> String {
    format!("{BASE_PATH}/{finder}")
}

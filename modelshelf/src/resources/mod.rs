//! Typed resource graph for the registry.
//!
//! One struct per resource kind holds the full field set (client-settable,
//! server-assigned, and open metadata); the create/update wire variants are
//! projections computed from it rather than separate types. The projections
//! enforce the tier shape for every kind: a create payload never carries
//! server-owned fields, an update payload additionally never carries
//! identity-defining ones.

mod artifacts;
mod models;
mod serving;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::Result;

pub use artifacts::{Artifact, ArtifactState, DocArtifact, ModelArtifact};
pub use models::{ModelVersion, ModelVersionState, RegisteredModel, RegisteredModelState};
pub use serving::{
    ExecutionState, InferenceService, InferenceServiceState, ServeModel, ServingEnvironment,
};

/// Wire fields only the server may set.
const SERVER_OWNED: &[&str] = &["id", "createTimeSinceEpoch", "lastUpdateTimeSinceEpoch"];

/// A registry resource kind.
///
/// Implementations supply the REST path segments and the set of wire fields
/// that are fixed at creation; the generic upsert/find/list machinery in the
/// client works through this trait alone.
pub trait Resource: Clone + std::fmt::Debug + Serialize + DeserializeOwned + Send + Sync {
    /// Human-readable kind name used in log and error messages.
    const KIND: &'static str;
    /// Collection path segment, e.g. `registered_models`.
    const COLLECTION: &'static str;
    /// Singular find-endpoint segment, e.g. `registered_model`.
    const FINDER: &'static str;
    /// Wire fields fixed at creation and stripped from update payloads.
    const IMMUTABLE: &'static [&'static str];

    /// Server-assigned identifier, absent until first persisted.
    fn id(&self) -> Option<&str>;

    /// Client-chosen name.
    fn name(&self) -> Option<&str>;

    /// Full wire representation.
    fn to_wire(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }
}

/// Project a resource onto its create payload: the full wire form minus
/// server-owned fields.
pub fn create_payload<R: Resource>(resource: &R) -> Result<Value> {
    let mut wire = resource.to_wire()?;
    if let Value::Object(map) = &mut wire {
        for field in SERVER_OWNED {
            map.remove(*field);
        }
    }
    Ok(wire)
}

/// Project a resource onto its update payload: the create payload minus
/// identity-defining fields.
pub fn update_payload<R: Resource>(resource: &R) -> Result<Value> {
    let mut wire = create_payload(resource)?;
    if let Value::Object(map) = &mut wire {
        for field in R::IMMUTABLE {
            map.remove(*field);
        }
    }
    Ok(wire)
}

/// One page of a listing, with the opaque continuation token.
///
/// `size` counts the items on this page; there is no total-count guarantee.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct ResourceList<T> {
    /// Resources on this page.
    #[serde(default)]
    pub items: Vec<T>,
    /// Token to pass verbatim to retrieve the next page.
    #[serde(default)]
    pub next_page_token: Option<String>,
    /// Page size the server applied.
    #[serde(default)]
    pub page_size: Option<i32>,
    /// Number of items on this page.
    #[serde(default)]
    pub size: Option<i32>,
}

impl<T> ResourceList<T> {
    /// Token for the next page, if the listing is not exhausted.
    pub fn continuation(&self) -> Option<&str> {
        self.next_page_token.as_deref().filter(|t| !t.is_empty())
    }
}

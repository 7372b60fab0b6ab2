//! Registered models and their versions.

use serde::{Deserialize, Serialize};

use crate::properties::Properties;

use super::Resource;

/// Lifecycle state of a registered model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RegisteredModelState {
    /// Model is active.
    #[default]
    Live,
    /// Model has been archived; soft-deletion, the object remains.
    Archived,
    /// Wire value this client does not know.
    #[serde(other)]
    Unknown,
}

/// Lifecycle state of a model version.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ModelVersionState {
    /// Version is active.
    #[default]
    Live,
    /// Version has been archived.
    Archived,
    /// Wire value this client does not know.
    #[serde(other)]
    Unknown,
}

/// A registered model: the root of the model/version/artifact graph.
///
/// `name` and `external_id` are client-chosen and immutable after creation;
/// `id` and the timestamps are server-assigned.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredModel {
    /// Server-assigned identifier, absent until first persisted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Client-chosen name, unique among registered models.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Client-chosen identifier, unique among registered models.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(default)]
    pub state: RegisteredModelState,
    /// Open user metadata.
    #[serde(
        default,
        skip_serializing_if = "Properties::is_empty",
        deserialize_with = "crate::properties::deserialize_properties"
    )]
    pub custom_properties: Properties,
    /// Server-assigned creation time, seconds since epoch as a string.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub create_time_since_epoch: Option<String>,
    /// Server-assigned last-update time, non-decreasing across upserts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_update_time_since_epoch: Option<String>,
}

impl RegisteredModel {
    /// New unpersisted registered model with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the external ID.
    #[must_use]
    pub fn with_external_id(mut self, external_id: impl Into<String>) -> Self {
        self.external_id = Some(external_id.into());
        self
    }
}

impl Resource for RegisteredModel {
    const KIND: &'static str = "registered model";
    const COLLECTION: &'static str = "registered_models";
    const FINDER: &'static str = "registered_model";
    const IMMUTABLE: &'static [&'static str] = &["name"];

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

/// A version of a registered model.
///
/// Belongs to exactly one registered model via `registered_model_id`, set
/// once at creation. Version names are unique per registered model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelVersion {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Version string, unique under the owning registered model.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default)]
    pub state: ModelVersionState,
    /// Owning registered model; immutable after creation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registered_model_id: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Properties::is_empty",
        deserialize_with = "crate::properties::deserialize_properties"
    )]
    pub custom_properties: Properties,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub create_time_since_epoch: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_update_time_since_epoch: Option<String>,
}

impl ModelVersion {
    /// New unpersisted version with the given name and author.
    pub fn new(name: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            author: Some(author.into()),
            ..Self::default()
        }
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Attach version metadata.
    #[must_use]
    pub fn with_metadata(mut self, metadata: Properties) -> Self {
        self.custom_properties = metadata;
        self
    }
}

impl Resource for ModelVersion {
    const KIND: &'static str = "model version";
    const COLLECTION: &'static str = "model_versions";
    const FINDER: &'static str = "model_version";
    const IMMUTABLE: &'static [&'static str] = &["name", "registeredModelId"];

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

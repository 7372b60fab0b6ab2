//! Deployment-tracking resources: serving environments, inference services,
//! and serve-model records.

use serde::{Deserialize, Serialize};

use crate::properties::Properties;

use super::Resource;

/// Desired deployment state of an inference service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InferenceServiceState {
    /// Service should be running.
    #[default]
    Deployed,
    /// Service should be stopped.
    Undeployed,
    /// Wire value this client does not know.
    #[serde(other)]
    Unknown,
}

/// Last observed state of a serving action.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecutionState {
    New,
    Running,
    Complete,
    Failed,
    Cached,
    Canceled,
    /// State not known; also the fallback for unrecognized wire values.
    #[default]
    #[serde(other)]
    Unknown,
}

/// A namespace/cluster where models are served.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServingEnvironment {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
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

impl ServingEnvironment {
    /// New unpersisted serving environment with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }
}

impl Resource for ServingEnvironment {
    const KIND: &'static str = "serving environment";
    const COLLECTION: &'static str = "serving_environments";
    const FINDER: &'static str = "serving_environment";
    const IMMUTABLE: &'static [&'static str] = &["name"];

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

/// A deployment of a registered model into a serving environment,
/// optionally pinned to a specific version.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InferenceService {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    /// Model being served; immutable after creation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registered_model_id: Option<String>,
    /// Environment served into; immutable after creation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serving_environment_id: Option<String>,
    /// Specific version to serve; latest when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_version_id: Option<String>,
    /// Model server name, e.g. `kserve`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runtime: Option<String>,
    #[serde(default)]
    pub desired_state: InferenceServiceState,
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

impl InferenceService {
    /// New unpersisted inference service for the given model.
    pub fn new(name: impl Into<String>, registered_model_id: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            registered_model_id: Some(registered_model_id.into()),
            ..Self::default()
        }
    }
}

impl Resource for InferenceService {
    const KIND: &'static str = "inference service";
    const COLLECTION: &'static str = "inference_services";
    const FINDER: &'static str = "inference_service";
    const IMMUTABLE: &'static [&'static str] = &["name", "registeredModelId", "servingEnvironmentId"];

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

/// A record of one serving action for a model version.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServeModel {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    /// Version being served; immutable after creation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_version_id: Option<String>,
    #[serde(default)]
    pub last_known_state: ExecutionState,
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

impl ServeModel {
    /// New unpersisted serve record for the given model version.
    pub fn new(model_version_id: impl Into<String>) -> Self {
        Self {
            model_version_id: Some(model_version_id.into()),
            ..Self::default()
        }
    }
}

impl Resource for ServeModel {
    const KIND: &'static str = "serve model";
    const COLLECTION: &'static str = "serve_models";
    const FINDER: &'static str = "serve_model";
    const IMMUTABLE: &'static [&'static str] = &["name", "modelVersionId"];

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

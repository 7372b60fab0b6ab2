//! Artifacts: the files and documents attached to model versions.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::properties::Properties;
use crate::Result;

use super::Resource;

/// Lifecycle state of an artifact.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ArtifactState {
    /// Being written.
    Pending,
    /// Fully written and usable.
    Live,
    /// Scheduled for deletion.
    MarkedForDeletion,
    /// Deleted; the record remains.
    Deleted,
    /// Creation was abandoned.
    Abandoned,
    /// Referenced but not materialized.
    Reference,
    /// State not known; also the fallback for unrecognized wire values.
    #[default]
    #[serde(other)]
    Unknown,
}

/// Polymorphic artifact, discriminated by the `artifactType` wire field.
///
/// An unrecognized discriminator decodes to [`Artifact::Unknown`]; callers
/// must treat that as "unknown artifact kind", not as an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "artifactType")]
pub enum Artifact {
    /// A trained model file.
    #[serde(rename = "model-artifact")]
    ModelArtifact(ModelArtifact),
    /// A document attached to a version.
    #[serde(rename = "doc-artifact")]
    DocArtifact(DocArtifact),
    /// Artifact kind this client does not know.
    #[serde(other)]
    Unknown,
}

impl Artifact {
    /// Server-assigned identifier of the concrete artifact, if any.
    pub fn id(&self) -> Option<&str> {
        match self {
            Artifact::ModelArtifact(a) => a.id.as_deref(),
            Artifact::DocArtifact(a) => a.id.as_deref(),
            Artifact::Unknown => None,
        }
    }

    /// Name of the concrete artifact, if any.
    pub fn name(&self) -> Option<&str> {
        match self {
            Artifact::ModelArtifact(a) => a.name.as_deref(),
            Artifact::DocArtifact(a) => a.name.as_deref(),
            Artifact::Unknown => None,
        }
    }

    /// The model-artifact case, if this is one.
    pub fn as_model_artifact(&self) -> Option<&ModelArtifact> {
        match self {
            Artifact::ModelArtifact(a) => Some(a),
            _ => None,
        }
    }

    /// Consume into the model-artifact case, if this is one.
    pub fn into_model_artifact(self) -> Option<ModelArtifact> {
        match self {
            Artifact::ModelArtifact(a) => Some(a),
            _ => None,
        }
    }
}

/// A trained model stored at a URI, attached to a model version.
///
/// The service enforces at most one model artifact per version at creation;
/// the client performs no local pre-check and propagates the server's
/// conflict unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelArtifact {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    /// Where the model lives, e.g. `s3://bucket/path`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(default)]
    pub state: ArtifactState,
    /// Model serialization format, e.g. `onnx`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_format_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_format_version: Option<String>,
    /// Storage secret name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_path: Option<String>,
    /// Service account holding the storage secret.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_account_name: Option<String>,
    /// Owning model version; immutable after creation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_version_id: Option<String>,
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

impl ModelArtifact {
    /// New unpersisted model artifact with the given name and URI.
    pub fn new(name: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            uri: Some(uri.into()),
            ..Self::default()
        }
    }

    /// Set the model format.
    #[must_use]
    pub fn with_format(mut self, name: impl Into<String>, version: impl Into<String>) -> Self {
        self.model_format_name = Some(name.into());
        self.model_format_version = Some(version.into());
        self
    }
}

impl Resource for ModelArtifact {
    const KIND: &'static str = "model artifact";
    const COLLECTION: &'static str = "model_artifacts";
    const FINDER: &'static str = "model_artifact";
    const IMMUTABLE: &'static [&'static str] = &["name", "modelVersionId"];

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    // Item endpoints and the union endpoint must serialize identically, so
    // the discriminator is injected here rather than stored as a field.
    fn to_wire(&self) -> Result<Value> {
        let mut wire = serde_json::to_value(self)?;
        if let Value::Object(map) = &mut wire {
            map.insert("artifactType".to_string(), Value::String("model-artifact".to_string()));
        }
        Ok(wire)
    }
}

/// A document (model card, eval report, ...) attached to a model version.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocArtifact {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(default)]
    pub state: ArtifactState,
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

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn union_decodes_model_artifact() {
        let artifact: Artifact = serde_json::from_value(json!({
            "artifactType": "model-artifact",
            "id": "3",
            "name": "iris-model",
            "uri": "s3://bucket/iris",
            "state": "LIVE",
        }))
        .unwrap();
        let model = artifact.as_model_artifact().unwrap();
        assert_eq!(model.uri.as_deref(), Some("s3://bucket/iris"));
        assert_eq!(model.state, ArtifactState::Live);
    }

    #[test]
    fn union_decodes_doc_artifact() {
        let artifact: Artifact = serde_json::from_value(json!({
            "artifactType": "doc-artifact",
            "name": "model-card",
            "uri": "s3://bucket/card.md",
        }))
        .unwrap();
        assert!(matches!(artifact, Artifact::DocArtifact(_)));
        assert_eq!(artifact.name(), Some("model-card"));
    }

    #[test]
    fn unrecognized_discriminator_decodes_to_unknown() {
        let artifact: Artifact = serde_json::from_value(json!({
            "artifactType": "metrics-artifact",
            "name": "whatever",
        }))
        .unwrap();
        assert_eq!(artifact, Artifact::Unknown);
        assert!(artifact.id().is_none());
    }

    #[test]
    fn union_serializes_with_discriminator() {
        let artifact = Artifact::ModelArtifact(ModelArtifact::new("m", "s3://b/m"));
        let wire = serde_json::to_value(&artifact).unwrap();
        assert_eq!(wire["artifactType"], "model-artifact");
    }

    #[test]
    fn unknown_artifact_state_falls_back() {
        let state: ArtifactState = serde_json::from_value(json!("QUARANTINED")).unwrap();
        assert_eq!(state, ArtifactState::Unknown);
    }
}

//! Hugging Face hub import (cargo feature `hub`).
//!
//! [`HubCatalog`] is a minimal metadata lookup against the hub's public REST
//! API; [`ModelRegistry::register_hf_model`] imports a hub model into the
//! registry without downloading it. The hub is an external collaborator:
//! only the descriptive metadata this workflow needs is modeled.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;
use tracing::warn;
use url::Url;

use crate::properties::PropertyValue;
use crate::registry::{ModelRegistry, RegistrationParams};
use crate::resources::RegisteredModel;
use crate::{Error, Result};

/// Public Hugging Face hub endpoint.
pub const DEFAULT_HUB_ENDPOINT: &str = "https://huggingface.co";

const USER_AGENT: &str = concat!("modelshelf/", env!("CARGO_PKG_VERSION"));

/// Descriptive metadata of a hub repository at a revision.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HubModelInfo {
    /// Repository id, e.g. `google-bert/bert-base-uncased`.
    pub id: String,
    /// Repository owner, when the hub exposes one.
    #[serde(default)]
    pub author: Option<String>,
    /// Commit the revision resolved to.
    #[serde(default)]
    pub sha: Option<String>,
    /// Model-card front matter.
    #[serde(default)]
    pub card_data: Option<BTreeMap<String, Value>>,
}

/// Metadata client for the Hugging Face hub.
pub struct HubCatalog {
    endpoint: Url,
    client: reqwest::Client,
}

impl HubCatalog {
    /// Catalog against the public hub.
    pub fn new() -> Result<Self> {
        Self::with_endpoint(DEFAULT_HUB_ENDPOINT)
    }

    /// Catalog against a custom hub endpoint (mirror or test double).
    pub fn with_endpoint(endpoint: &str) -> Result<Self> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| Error::Configuration(format!("invalid hub endpoint: {e}")))?;
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| Error::Configuration(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { endpoint, client })
    }

    /// Fetch repository metadata at a revision.
    ///
    /// Fails with [`Error::NotFound`] when the repository or the revision
    /// does not exist; the hub does not always distinguish the two.
    pub async fn model_info(&self, repo: &str, revision: &str) -> Result<HubModelInfo> {
        let url = format!("{}api/models/{repo}/revision/{revision}", self.endpoint);
        let response =
            self.client.get(&url).send().await.map_err(|e| Error::Transport(e.to_string()))?;
        let status = response.status().as_u16();
        if status == 401 || status == 404 {
            return Err(Error::NotFound(format!(
                "repository {repo} or revision {revision} does not exist"
            )));
        }
        if !(200..300).contains(&status) {
            return Err(Error::Remote {
                status,
                code: String::new(),
                message: format!("hub metadata request for {repo} failed"),
            });
        }
        response.json().await.map_err(|e| Error::Transport(e.to_string()))
    }

    /// Download URL of a file at a revision; used as the artifact source URI.
    pub fn resolve_url(&self, repo: &str, path: &str, revision: &str) -> String {
        format!("{}{repo}/resolve/{revision}/{path}", self.endpoint)
    }
}

/// Parameters for [`ModelRegistry::register_hf_model`].
#[derive(Debug, Clone)]
pub struct HubImportParams {
    /// Version string; unique under the registered model.
    pub version: String,
    pub model_format_name: String,
    pub model_format_version: String,
    /// Model author; defaults to the repository owner.
    pub author: Option<String>,
    /// Registered model name; defaults to the repository id.
    pub model_name: Option<String>,
    pub description: Option<String>,
    /// Git reference to resolve.
    pub git_ref: String,
}

impl HubImportParams {
    /// Required parameters only; the git ref defaults to `main`.
    pub fn new(
        version: impl Into<String>,
        model_format_name: impl Into<String>,
        model_format_version: impl Into<String>,
    ) -> Self {
        Self {
            version: version.into(),
            model_format_name: model_format_name.into(),
            model_format_version: model_format_version.into(),
            author: None,
            model_name: None,
            description: None,
            git_ref: "main".to_string(),
        }
    }

    /// Resolve a reference other than `main`.
    #[must_use]
    pub fn with_ref(mut self, git_ref: impl Into<String>) -> Self {
        self.git_ref = git_ref.into();
        self
    }
}

impl ModelRegistry {
    /// Import a model from the Hugging Face hub and register it.
    ///
    /// The model itself is not downloaded; the artifact URI points at the
    /// hub's resolve endpoint for `path` at the requested revision.
    pub fn register_hf_model(
        &self,
        repo: &str,
        path: &str,
        params: HubImportParams,
    ) -> Result<RegisteredModel> {
        self.register_hf_model_from(&HubCatalog::new()?, repo, path, params)
    }

    /// Same as [`register_hf_model`](Self::register_hf_model) against a
    /// specific catalog endpoint.
    pub fn register_hf_model_from(
        &self,
        catalog: &HubCatalog,
        repo: &str,
        path: &str,
        params: HubImportParams,
    ) -> Result<RegisteredModel> {
        let info = self.run(catalog.model_info(repo, &params.git_ref))?;

        let model_author =
            params.author.clone().or_else(|| info.author.clone()).unwrap_or_else(|| {
                warn!(repo, "model author is unknown");
                "unknown".to_string()
            });
        let source_uri = catalog.resolve_url(repo, path, &params.git_ref);

        let mut metadata = self.default_metadata();
        metadata.insert("repo".to_string(), PropertyValue::Str(repo.to_string()));
        metadata.insert("source_uri".to_string(), PropertyValue::Str(source_uri.clone()));
        metadata
            .insert("model_origin".to_string(), PropertyValue::Str("huggingface_hub".to_string()));
        metadata.insert("model_author".to_string(), PropertyValue::Str(model_author.clone()));
        if let Some(card_data) = &info.card_data {
            // Only scalar card fields carry over; tags and other structured
            // card data stay behind.
            for (key, value) in card_data {
                if let Some(scalar) = scalar_property(value) {
                    metadata.insert(key.clone(), scalar);
                }
            }
        }

        let name = params.model_name.clone().unwrap_or_else(|| info.id.clone());
        let registration = RegistrationParams {
            version: params.version,
            model_format_name: params.model_format_name,
            model_format_version: params.model_format_version,
            author: Some(model_author),
            description: params.description,
            storage_key: None,
            storage_path: Some(path.to_string()),
            service_account_name: None,
            metadata: Some(metadata),
        };
        self.register_model(&name, &source_uri, registration)
    }
}

fn scalar_property(value: &Value) -> Option<PropertyValue> {
    match value {
        Value::Bool(b) => Some(PropertyValue::Bool(*b)),
        Value::Number(n) => {
            n.as_i64().map(PropertyValue::Int).or_else(|| n.as_f64().map(PropertyValue::Double))
        }
        Value::String(s) => Some(PropertyValue::Str(s.clone())),
        _ => None,
    }
}

//! Blocking facade and the model registration workflow.
//!
//! [`ModelRegistry`] wraps the async [`ModelRegistryApi`] behind a
//! synchronous interface: it owns a current-thread tokio runtime and drives
//! exactly one request at a time to completion per call. No state is shared
//! between calls beyond the resolved base address and token inside the
//! adapter.

use std::env;
use std::future::Future;
use std::sync::Arc;

use tracing::{info, warn};

use crate::api::RestAdapter;
use crate::client::ModelRegistryApi;
use crate::config::RegistryConfig;
use crate::properties::{Properties, PropertyValue};
use crate::resources::{ModelArtifact, ModelVersion, RegisteredModel, Resource};
use crate::{Error, Result};

/// Environment variables merged into default version metadata.
const DEFAULT_METADATA_KEYS: &[&str] = &["AWS_S3_ENDPOINT", "AWS_S3_BUCKET", "AWS_DEFAULT_REGION"];

/// Parameters for [`ModelRegistry::register_model`].
#[derive(Debug, Clone)]
pub struct RegistrationParams {
    /// Version string; unique under the registered model.
    pub version: String,
    /// Name of the model format, e.g. `onnx`.
    pub model_format_name: String,
    /// Version of the model format.
    pub model_format_version: String,
    /// Version author; defaults to the client author.
    pub author: Option<String>,
    pub description: Option<String>,
    /// Storage secret name.
    pub storage_key: Option<String>,
    pub storage_path: Option<String>,
    /// Service account holding the storage secret.
    pub service_account_name: Option<String>,
    /// Version metadata; defaults to [`ModelRegistry::default_metadata`].
    pub metadata: Option<Properties>,
}

impl RegistrationParams {
    /// Required parameters only; the rest default to unset.
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
            description: None,
            storage_key: None,
            storage_path: None,
            service_account_name: None,
            metadata: None,
        }
    }
}

/// Blocking model registry client.
pub struct ModelRegistry {
    api: ModelRegistryApi,
    author: String,
    runtime: tokio::runtime::Runtime,
}

impl ModelRegistry {
    /// Build a client from a configuration.
    pub fn new(config: &RegistryConfig) -> Result<Self> {
        let api = ModelRegistryApi::new(config)?;
        Self::from_parts(api, config.author.clone())
    }

    /// Build a client from a server address and author name.
    pub fn from_address(server_address: &str, author: &str) -> Result<Self> {
        Self::new(&RegistryConfig::new(server_address, author)?)
    }

    /// Build a client over a caller-supplied transport adapter.
    pub fn with_adapter(adapter: Arc<dyn RestAdapter>, author: impl Into<String>) -> Result<Self> {
        Self::from_parts(ModelRegistryApi::with_adapter(adapter), author.into())
    }

    fn from_parts(api: ModelRegistryApi, author: String) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| Error::Configuration(format!("failed to start runtime: {e}")))?;
        Ok(Self { api, author, runtime })
    }

    /// The async client underneath, for operations the facade doesn't wrap.
    pub fn api(&self) -> &ModelRegistryApi {
        &self.api
    }

    pub(crate) fn run<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }

    /// Register a model end to end: find-or-create the registered model,
    /// create the version, create the artifact.
    ///
    /// Fails with [`Error::AlreadyExists`] if the version string is already
    /// taken under this model; version strings are never silently
    /// overwritten. The sequence is not transactional: a failure after the
    /// version was created leaves that version without an artifact, and no
    /// rollback is attempted.
    pub fn register_model(
        &self,
        name: &str,
        uri: &str,
        params: RegistrationParams,
    ) -> Result<RegisteredModel> {
        let model = match self.lookup(
            RegisteredModel::KIND,
            self.run(self.api.get_registered_model_by_params(Some(name), None)),
        ) {
            Some(model) => model,
            None => self.run(self.api.upsert_registered_model(&RegisteredModel::new(name)))?,
        };
        let model_id = require_id(RegisteredModel::KIND, model.id.as_deref())?;

        let existing = self.lookup(
            ModelVersion::KIND,
            self.run(self.api.get_model_version_by_params(
                Some(&model_id),
                Some(&params.version),
                None,
            )),
        );
        if existing.is_some() {
            return Err(Error::AlreadyExists(format!(
                "version {} already exists under model {name}",
                params.version
            )));
        }

        info!(model = name, version = %params.version, "registering model version");
        let version = ModelVersion {
            name: Some(params.version),
            author: Some(params.author.unwrap_or_else(|| self.author.clone())),
            description: params.description,
            custom_properties: params.metadata.unwrap_or_else(|| self.default_metadata()),
            ..ModelVersion::default()
        };
        let version = self.run(self.api.upsert_model_version(&version, &model_id))?;
        let version_id = require_id(ModelVersion::KIND, version.id.as_deref())?;

        let artifact = ModelArtifact {
            name: Some(name.to_string()),
            uri: Some(uri.to_string()),
            model_format_name: Some(params.model_format_name),
            model_format_version: Some(params.model_format_version),
            storage_key: params.storage_key,
            storage_path: params.storage_path,
            service_account_name: params.service_account_name,
            ..ModelArtifact::default()
        };
        self.run(self.api.upsert_model_artifact(&artifact, &version_id))?;

        Ok(model)
    }

    /// Get a registered model by name. Absent and unreachable both come back
    /// as `None`; see [`lookup`](Self::lookup) for the compatibility shim.
    pub fn get_registered_model(&self, name: &str) -> Option<RegisteredModel> {
        self.lookup(
            RegisteredModel::KIND,
            self.run(self.api.get_registered_model_by_params(Some(name), None)),
        )
    }

    /// Get a model version by model name and version string.
    ///
    /// Fails with [`Error::NotFound`] if the model itself does not exist.
    pub fn get_model_version(&self, name: &str, version: &str) -> Result<Option<ModelVersion>> {
        let Some(model) = self.get_registered_model(name) else {
            return Err(Error::NotFound(format!("model {name} does not exist")));
        };
        let model_id = require_id(RegisteredModel::KIND, model.id.as_deref())?;
        Ok(self.lookup(
            ModelVersion::KIND,
            self.run(self.api.get_model_version_by_params(Some(&model_id), Some(version), None)),
        ))
    }

    /// Get the model artifact of a version, by model name and version string.
    ///
    /// Fails with [`Error::NotFound`] if the model or the version does not
    /// exist.
    pub fn get_model_artifact(&self, name: &str, version: &str) -> Result<Option<ModelArtifact>> {
        let Some(found) = self.get_model_version(name, version)? else {
            return Err(Error::NotFound(format!("version {version} does not exist")));
        };
        let version_id = require_id(ModelVersion::KIND, found.id.as_deref())?;
        Ok(self.lookup(
            ModelArtifact::KIND,
            self.run(self.api.get_model_artifact_by_params(Some(&version_id), None)),
        ))
    }

    /// Default version metadata: the storage-related environment variables
    /// that are set, as string properties.
    pub fn default_metadata(&self) -> Properties {
        DEFAULT_METADATA_KEYS
            .iter()
            .filter_map(|key| {
                env::var(key).ok().map(|value| (key.to_string(), PropertyValue::Str(value)))
            })
            .collect()
    }

    /// Author recorded on versions when none is supplied.
    pub fn author(&self) -> &str {
        &self.author
    }

    /// Compatibility shim around find-by-params: transport and server
    /// failures are logged and folded into "absent", preserving the
    /// long-standing behavior of this facade. The async client keeps the
    /// distinguishable error channel; use it directly when "failed" and
    /// "missing" must not be conflated.
    fn lookup<T>(&self, kind: &str, outcome: Result<Option<T>>) -> Option<T> {
        match outcome {
            Ok(found) => found,
            Err(error) => {
                warn!(kind, %error, "lookup failed; treating resource as absent");
                None
            }
        }
    }
}

fn require_id(kind: &str, id: Option<&str>) -> Result<String> {
    id.map(str::to_string).ok_or_else(|| {
        Error::Transport(format!("{kind} response is missing its server-assigned id"))
    })
}

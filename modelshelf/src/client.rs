//! Async core client: upsert-by-identity, find-by-identity, and paging for
//! every resource kind.
//!
//! The policies live in a handful of generic helpers working through the
//! [`Resource`] trait; the public methods mirror the registry's per-kind
//! operation set. Unlike the blocking facade, nothing here swallows
//! failures: a find distinguishes "absent" (`Ok(None)`) from "failed"
//! (`Err`).

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::api::{self, HttpAdapter, ListOptions, RestAdapter, RestRequest, RestResponse};
use crate::config::RegistryConfig;
use crate::resources::{
    self, Artifact, InferenceService, ModelArtifact, ModelVersion, RegisteredModel, Resource,
    ResourceList, ServeModel, ServingEnvironment,
};
use crate::{Error, Result};

/// Async client for the model registry API.
///
/// Holds nothing mutable: the adapter (base address, token) is fixed at
/// construction, and every operation is a single request/response cycle.
#[derive(Clone)]
pub struct ModelRegistryApi {
    adapter: Arc<dyn RestAdapter>,
}

impl ModelRegistryApi {
    /// Build a client over the production HTTP adapter.
    pub fn new(config: &RegistryConfig) -> Result<Self> {
        Ok(Self::with_adapter(Arc::new(HttpAdapter::new(config)?)))
    }

    /// Build a client over a caller-supplied adapter.
    pub fn with_adapter(adapter: Arc<dyn RestAdapter>) -> Self {
        Self { adapter }
    }

    // ── generic policies ────────────────────────────────────────────────

    async fn create_at<R: Resource>(&self, resource: &R, path: String) -> Result<R> {
        let payload = resources::create_payload(resource)?;
        debug!(kind = R::KIND, "creating resource");
        let response = self.adapter.execute(RestRequest::post(path, payload)).await?;
        decode(success_body(response)?)
    }

    async fn update<R: Resource>(&self, resource: &R, id: &str) -> Result<R> {
        let payload = resources::update_payload(resource)?;
        debug!(kind = R::KIND, id, "updating resource");
        let request = RestRequest::patch(api::item_path(R::COLLECTION, id), payload);
        let response = self.adapter.execute(request).await?;
        decode(success_body(response)?)
    }

    /// Create when the resource has no id yet, update otherwise. The server
    /// response is authoritative; callers should replace their copy with it.
    async fn upsert_at<R: Resource>(&self, resource: &R, create_path: String) -> Result<R> {
        match resource.id() {
            Some(id) => {
                let id = id.to_string();
                self.update(resource, &id).await
            }
            None => self.create_at(resource, create_path).await,
        }
    }

    async fn get_by_id<R: Resource>(&self, id: &str) -> Result<Option<R>> {
        let response =
            self.adapter.execute(RestRequest::get(api::item_path(R::COLLECTION, id))).await?;
        if response.status == 404 {
            return Ok(None);
        }
        Ok(Some(decode(success_body(response)?)?))
    }

    /// Query the kind's singular find endpoint. A miss is `Ok(None)`.
    async fn find<R: Resource>(
        &self,
        name: Option<&str>,
        external_id: Option<&str>,
    ) -> Result<Option<R>> {
        let mut pairs = Vec::new();
        if let Some(name) = name {
            pairs.push(("name", name.to_string()));
        }
        if let Some(external_id) = external_id {
            pairs.push(("externalId", external_id.to_string()));
        }
        let request = RestRequest::get(api::finder_path(R::FINDER)).with_query(pairs);
        let response = self.adapter.execute(request).await?;
        if response.status == 404 {
            return Ok(None);
        }
        Ok(Some(decode(success_body(response)?)?))
    }

    async fn list_at<T: DeserializeOwned>(
        &self,
        path: String,
        filters: Vec<(&'static str, String)>,
        options: &ListOptions,
    ) -> Result<ResourceList<T>> {
        let request = RestRequest::get(path).with_query(filters).with_query(options.query_pairs());
        let response = self.adapter.execute(request).await?;
        Ok(serde_json::from_value(success_body(response)?)?)
    }

    // ── registered models ───────────────────────────────────────────────

    /// Create or update a registered model; returns the server's view.
    pub async fn upsert_registered_model(&self, model: &RegisteredModel) -> Result<RegisteredModel> {
        self.upsert_at(model, api::collection_path(RegisteredModel::COLLECTION)).await
    }

    /// Fetch a registered model by server-assigned id.
    pub async fn get_registered_model_by_id(&self, id: &str) -> Result<Option<RegisteredModel>> {
        self.get_by_id(id).await
    }

    /// Fetch a registered model by name or external id.
    pub async fn get_registered_model_by_params(
        &self,
        name: Option<&str>,
        external_id: Option<&str>,
    ) -> Result<Option<RegisteredModel>> {
        if name.is_none() && external_id.is_none() {
            return Err(Error::InvalidQuery(
                "either name or external_id must be provided".to_string(),
            ));
        }
        self.find(name, external_id).await
    }

    /// List registered models, one page per call.
    pub async fn get_registered_models(
        &self,
        options: &ListOptions,
    ) -> Result<ResourceList<RegisteredModel>> {
        self.list_at(api::collection_path(RegisteredModel::COLLECTION), Vec::new(), options).await
    }

    // ── model versions ──────────────────────────────────────────────────

    /// Create or update a model version under the given registered model.
    pub async fn upsert_model_version(
        &self,
        version: &ModelVersion,
        registered_model_id: &str,
    ) -> Result<ModelVersion> {
        let mut version = version.clone();
        if version.id.is_none() {
            version.registered_model_id = Some(registered_model_id.to_string());
        }
        let create_path = api::subcollection_path(
            RegisteredModel::COLLECTION,
            registered_model_id,
            "versions",
        );
        self.upsert_at(&version, create_path).await
    }

    /// Fetch a model version by server-assigned id.
    pub async fn get_model_version_by_id(&self, id: &str) -> Result<Option<ModelVersion>> {
        self.get_by_id(id).await
    }

    /// Fetch a model version by external id, or by registered model id plus
    /// version name.
    pub async fn get_model_version_by_params(
        &self,
        registered_model_id: Option<&str>,
        name: Option<&str>,
        external_id: Option<&str>,
    ) -> Result<Option<ModelVersion>> {
        match (registered_model_id, name, external_id) {
            (_, _, Some(external_id)) => self.find(None, Some(external_id)).await,
            (Some(registered_model_id), Some(name), None) => {
                let path = api::subcollection_path(
                    RegisteredModel::COLLECTION,
                    registered_model_id,
                    "versions",
                );
                let page: ResourceList<ModelVersion> = self
                    .list_at(path, vec![("name", name.to_string())], &ListOptions::default())
                    .await?;
                Ok(page.items.into_iter().next())
            }
            _ => Err(Error::InvalidQuery(
                "provide external_id, or registered_model_id together with name".to_string(),
            )),
        }
    }

    /// List the versions of a registered model, one page per call.
    pub async fn get_model_versions(
        &self,
        registered_model_id: &str,
        options: &ListOptions,
    ) -> Result<ResourceList<ModelVersion>> {
        let path =
            api::subcollection_path(RegisteredModel::COLLECTION, registered_model_id, "versions");
        self.list_at(path, Vec::new(), options).await
    }

    // ── model artifacts ─────────────────────────────────────────────────

    /// Create or update a model artifact under the given model version.
    ///
    /// The service rejects a second artifact under the same version; that
    /// conflict is propagated unchanged as [`Error::Remote`].
    pub async fn upsert_model_artifact(
        &self,
        artifact: &ModelArtifact,
        model_version_id: &str,
    ) -> Result<ModelArtifact> {
        let mut artifact = artifact.clone();
        if artifact.id.is_none() {
            artifact.model_version_id = Some(model_version_id.to_string());
        }
        let create_path =
            api::subcollection_path(ModelVersion::COLLECTION, model_version_id, "artifacts");
        self.upsert_at(&artifact, create_path).await
    }

    /// Fetch a model artifact by server-assigned id.
    pub async fn get_model_artifact_by_id(&self, id: &str) -> Result<Option<ModelArtifact>> {
        self.get_by_id(id).await
    }

    /// Fetch a model artifact by external id, or by its model version's id.
    pub async fn get_model_artifact_by_params(
        &self,
        model_version_id: Option<&str>,
        external_id: Option<&str>,
    ) -> Result<Option<ModelArtifact>> {
        match (model_version_id, external_id) {
            (_, Some(external_id)) => self.find(None, Some(external_id)).await,
            (Some(model_version_id), None) => {
                let page = self.get_model_artifacts(Some(model_version_id), &ListOptions::default()).await?;
                Ok(page.items.into_iter().find_map(Artifact::into_model_artifact))
            }
            (None, None) => Err(Error::InvalidQuery(
                "either model_version_id or external_id must be provided".to_string(),
            )),
        }
    }

    /// List artifacts, scoped to a model version when given. Items are the
    /// polymorphic [`Artifact`] union.
    pub async fn get_model_artifacts(
        &self,
        model_version_id: Option<&str>,
        options: &ListOptions,
    ) -> Result<ResourceList<Artifact>> {
        let path = match model_version_id {
            Some(id) => api::subcollection_path(ModelVersion::COLLECTION, id, "artifacts"),
            None => api::collection_path(ModelArtifact::COLLECTION),
        };
        self.list_at(path, Vec::new(), options).await
    }

    // ── serving environments ────────────────────────────────────────────

    /// Create or update a serving environment.
    pub async fn upsert_serving_environment(
        &self,
        environment: &ServingEnvironment,
    ) -> Result<ServingEnvironment> {
        self.upsert_at(environment, api::collection_path(ServingEnvironment::COLLECTION)).await
    }

    /// Fetch a serving environment by server-assigned id.
    pub async fn get_serving_environment_by_id(
        &self,
        id: &str,
    ) -> Result<Option<ServingEnvironment>> {
        self.get_by_id(id).await
    }

    /// Fetch a serving environment by name or external id.
    pub async fn get_serving_environment_by_params(
        &self,
        name: Option<&str>,
        external_id: Option<&str>,
    ) -> Result<Option<ServingEnvironment>> {
        if name.is_none() && external_id.is_none() {
            return Err(Error::InvalidQuery(
                "either name or external_id must be provided".to_string(),
            ));
        }
        self.find(name, external_id).await
    }

    /// List serving environments, one page per call.
    pub async fn get_serving_environments(
        &self,
        options: &ListOptions,
    ) -> Result<ResourceList<ServingEnvironment>> {
        self.list_at(api::collection_path(ServingEnvironment::COLLECTION), Vec::new(), options)
            .await
    }

    // ── inference services ──────────────────────────────────────────────

    /// Create or update an inference service under the given environment.
    pub async fn upsert_inference_service(
        &self,
        service: &InferenceService,
        serving_environment_id: &str,
    ) -> Result<InferenceService> {
        let mut service = service.clone();
        if service.id.is_none() {
            service.serving_environment_id = Some(serving_environment_id.to_string());
        }
        let create_path = api::subcollection_path(
            ServingEnvironment::COLLECTION,
            serving_environment_id,
            "inference_services",
        );
        self.upsert_at(&service, create_path).await
    }

    /// Fetch an inference service by server-assigned id.
    pub async fn get_inference_service_by_id(&self, id: &str) -> Result<Option<InferenceService>> {
        self.get_by_id(id).await
    }

    /// Fetch an inference service by name or external id.
    pub async fn get_inference_service_by_params(
        &self,
        name: Option<&str>,
        external_id: Option<&str>,
    ) -> Result<Option<InferenceService>> {
        if name.is_none() && external_id.is_none() {
            return Err(Error::InvalidQuery(
                "either name or external_id must be provided".to_string(),
            ));
        }
        self.find(name, external_id).await
    }

    /// List the inference services of a serving environment.
    pub async fn get_inference_services(
        &self,
        serving_environment_id: &str,
        options: &ListOptions,
    ) -> Result<ResourceList<InferenceService>> {
        let path = api::subcollection_path(
            ServingEnvironment::COLLECTION,
            serving_environment_id,
            "inference_services",
        );
        self.list_at(path, Vec::new(), options).await
    }

    // ── serve models ────────────────────────────────────────────────────

    /// Create or update a serve-model record under the given inference
    /// service.
    pub async fn upsert_serve_model(
        &self,
        serve: &ServeModel,
        inference_service_id: &str,
    ) -> Result<ServeModel> {
        let create_path = api::subcollection_path(
            InferenceService::COLLECTION,
            inference_service_id,
            "serves",
        );
        self.upsert_at(serve, create_path).await
    }

    /// List the serve records of an inference service.
    pub async fn get_serve_models(
        &self,
        inference_service_id: &str,
        options: &ListOptions,
    ) -> Result<ResourceList<ServeModel>> {
        let path = api::subcollection_path(
            InferenceService::COLLECTION,
            inference_service_id,
            "serves",
        );
        self.list_at(path, Vec::new(), options).await
    }
}

fn decode<R: Resource>(body: Value) -> Result<R> {
    Ok(serde_json::from_value(body)?)
}

/// Pull the structured error body out of a failed response.
fn success_body(response: RestResponse) -> Result<Value> {
    if response.is_success() {
        return Ok(response.body);
    }
    let code = response
        .body
        .get("code")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let message = response
        .body
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    Err(Error::Remote { status: response.status, code, message })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    /// Adapter that returns one canned response and records requests.
    struct CannedAdapter {
        response: RestResponse,
        requests: Mutex<Vec<RestRequest>>,
    }

    impl CannedAdapter {
        fn new(status: u16, body: Value) -> Self {
            Self {
                response: RestResponse { status, body },
                requests: Mutex::new(Vec::new()),
            }
        }

        fn request_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl RestAdapter for CannedAdapter {
        async fn execute(&self, request: RestRequest) -> Result<RestResponse> {
            self.requests.lock().unwrap().push(request);
            Ok(self.response.clone())
        }
    }

    #[tokio::test]
    async fn find_without_params_fails_before_any_request() {
        let adapter = Arc::new(CannedAdapter::new(200, json!({})));
        let api = ModelRegistryApi::with_adapter(adapter.clone());
        let err = api.get_registered_model_by_params(None, None).await.unwrap_err();
        assert!(matches!(err, Error::InvalidQuery(_)));
        assert_eq!(adapter.request_count(), 0);
    }

    #[tokio::test]
    async fn finder_miss_is_none_not_error() {
        let adapter = Arc::new(CannedAdapter::new(404, json!({"code": "", "message": "not found"})));
        let api = ModelRegistryApi::with_adapter(adapter);
        let found = api.get_registered_model_by_params(Some("iris"), None).await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn server_error_surfaces_as_remote() {
        let adapter = Arc::new(CannedAdapter::new(
            500,
            json!({"code": "internal", "message": "boom"}),
        ));
        let api = ModelRegistryApi::with_adapter(adapter);
        let err = api.get_registered_model_by_params(Some("iris"), None).await.unwrap_err();
        match err {
            Error::Remote { status, code, message } => {
                assert_eq!(status, 500);
                assert_eq!(code, "internal");
                assert_eq!(message, "boom");
            }
            other => panic!("expected Remote, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn version_find_by_parent_queries_the_subcollection() {
        let adapter = Arc::new(CannedAdapter::new(
            200,
            json!({"items": [{"id": "9", "name": "v1"}], "size": 1}),
        ));
        let api = ModelRegistryApi::with_adapter(adapter.clone());
        let version =
            api.get_model_version_by_params(Some("7"), Some("v1"), None).await.unwrap().unwrap();
        assert_eq!(version.id.as_deref(), Some("9"));

        let requests = adapter.requests.lock().unwrap();
        assert_eq!(requests[0].path, "/api/model_registry/v1alpha3/registered_models/7/versions");
        assert!(requests[0].query.contains(&("name", "v1".to_string())));
    }
}

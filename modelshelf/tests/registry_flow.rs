//! Integration tests for the blocking facade and the registration workflow.

mod common;

use std::sync::Arc;

use async_trait::async_trait;
use common::InMemoryRegistry;
use modelshelf::{
    Error, ListOptions, ModelRegistry, Properties, PropertyValue, RegistrationParams,
    RestAdapter, RestRequest, RestResponse, Result,
};

fn registry() -> ModelRegistry {
    ModelRegistry::with_adapter(Arc::new(InMemoryRegistry::new()), "alice").unwrap()
}

#[test]
fn register_model_creates_model_version_and_artifact() {
    let registry = registry();
    let model = registry
        .register_model("iris", "s3://bucket/iris", RegistrationParams::new("v1", "onnx", "1"))
        .unwrap();
    assert!(model.id.is_some());

    let version = registry.get_model_version("iris", "v1").unwrap().expect("version exists");
    assert_eq!(version.author.as_deref(), Some("alice"));

    let artifact = registry.get_model_artifact("iris", "v1").unwrap().expect("artifact exists");
    assert_eq!(artifact.uri.as_deref(), Some("s3://bucket/iris"));
    assert_eq!(artifact.name.as_deref(), Some("iris"));
    assert_eq!(artifact.model_format_name.as_deref(), Some("onnx"));
}

#[test]
fn registering_the_same_version_twice_fails_and_leaves_the_first_alone() {
    let registry = registry();
    registry
        .register_model("iris", "s3://x", RegistrationParams::new("v1", "onnx", "1"))
        .unwrap();
    let first = registry.get_model_version("iris", "v1").unwrap().unwrap();

    let err = registry
        .register_model("iris", "s3://y", RegistrationParams::new("v1", "onnx", "1"))
        .unwrap_err();
    assert!(matches!(err, Error::AlreadyExists(_)));

    let after = registry.get_model_version("iris", "v1").unwrap().unwrap();
    assert_eq!(after.id, first.id);
    assert_eq!(after.last_update_time_since_epoch, first.last_update_time_since_epoch);
    let artifact = registry.get_model_artifact("iris", "v1").unwrap().unwrap();
    assert_eq!(artifact.uri.as_deref(), Some("s3://x"));
}

#[test]
fn a_second_version_lands_under_the_same_registered_model() {
    let registry = registry();
    let first = registry
        .register_model("iris", "s3://x", RegistrationParams::new("v1", "onnx", "1"))
        .unwrap();
    let second = registry
        .register_model("iris", "s3://y", RegistrationParams::new("v2", "onnx", "1"))
        .unwrap();
    assert_eq!(first.id, second.id);

    let versions = tokio_test::block_on(
        registry.api().get_model_versions(first.id.as_deref().unwrap(), &ListOptions::default()),
    )
    .unwrap();
    let mut names: Vec<_> =
        versions.items.iter().filter_map(|v| v.name.as_deref()).collect();
    names.sort();
    assert_eq!(names, vec!["v1", "v2"]);
}

#[test]
fn explicit_author_and_metadata_override_the_defaults() {
    let registry = registry();
    let mut metadata = Properties::new();
    metadata.insert("accuracy".to_string(), PropertyValue::Double(0.93));
    metadata.insert("labels".to_string(), PropertyValue::List(vec![
        PropertyValue::Str("setosa".to_string()),
        PropertyValue::Str("versicolor".to_string()),
    ]));

    let mut params = RegistrationParams::new("v1", "onnx", "1");
    params.author = Some("bob".to_string());
    params.metadata = Some(metadata.clone());
    registry.register_model("iris", "s3://bucket/iris", params).unwrap();

    // Metadata made a full round trip through the wire codec.
    let version = registry.get_model_version("iris", "v1").unwrap().unwrap();
    assert_eq!(version.author.as_deref(), Some("bob"));
    assert_eq!(version.custom_properties, metadata);
}

#[test]
fn get_model_version_for_a_missing_model_is_not_found() {
    let registry = registry();
    let err = registry.get_model_version("nope", "v1").unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[test]
fn get_model_artifact_for_a_missing_version_is_not_found() {
    let registry = registry();
    registry
        .register_model("iris", "s3://x", RegistrationParams::new("v1", "onnx", "1"))
        .unwrap();
    let err = registry.get_model_artifact("iris", "v9").unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[test]
fn missing_version_under_an_existing_model_is_none_not_error() {
    let registry = registry();
    registry
        .register_model("iris", "s3://x", RegistrationParams::new("v1", "onnx", "1"))
        .unwrap();
    assert!(registry.get_model_version("iris", "v2").unwrap().is_none());
}

/// Adapter whose every request fails at the transport level.
struct UnreachableAdapter;

#[async_trait]
impl RestAdapter for UnreachableAdapter {
    async fn execute(&self, _request: RestRequest) -> Result<RestResponse> {
        Err(Error::Transport("connection refused".to_string()))
    }
}

#[test]
fn facade_lookup_folds_transport_failures_into_absent() {
    // The documented compatibility shim: the blocking facade reports an
    // unreachable registry as "model absent" (with a warning) rather than
    // propagating the failure.
    let registry = ModelRegistry::with_adapter(Arc::new(UnreachableAdapter), "alice").unwrap();
    assert!(registry.get_registered_model("iris").is_none());
}

#[test]
fn async_client_keeps_the_distinguishable_error_channel() {
    // Same lookup through the core client: the failure is an error, not an
    // empty result.
    let registry = ModelRegistry::with_adapter(Arc::new(UnreachableAdapter), "alice").unwrap();
    let outcome = tokio_test::block_on(
        registry.api().get_registered_model_by_params(Some("iris"), None),
    );
    assert!(matches!(outcome, Err(Error::Transport(_))));
}

//! Typed client for the Model Registry REST API.
//!
//! This crate provides:
//! - A typed resource graph (registered models, versions, artifacts, and the
//!   serving family) with create/update wire projections
//! - The `customProperties` metadata codec, wire-compatible with the
//!   registry's tagged value encoding
//! - An async client implementing the upsert-by-identity and
//!   find-by-identity policies for every resource kind
//! - A blocking [`ModelRegistry`] facade sequencing the three-step model
//!   registration workflow
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │              ModelRegistry (blocking)               │
//! │    register_model / get_model_version / imports     │
//! └─────────────────────────────────────────────────────┘
//!                          │ block_on
//!                          ▼
//! ┌─────────────────────────────────────────────────────┐
//! │             ModelRegistryApi (async)                │
//! │      upsert · find-by-params · cursor paging        │
//! └─────────────────────────────────────────────────────┘
//!                          │ RestAdapter
//!                          ▼
//! ┌─────────────────────────────────────────────────────┐
//! │      HttpAdapter (reqwest) / test doubles           │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use modelshelf::{ModelRegistry, RegistrationParams};
//!
//! let registry = ModelRegistry::from_address("http://localhost:8080", "alice")?;
//! registry.register_model(
//!     "iris",
//!     "s3://bucket/iris",
//!     RegistrationParams::new("v1", "onnx", "1"),
//! )?;
//! let version = registry.get_model_version("iris", "v1")?;
//! ```

mod client;
mod config;
mod error;
mod registry;

pub mod api;
#[cfg(feature = "hub")]
pub mod catalog;
pub mod properties;
pub mod resources;

pub use client::ModelRegistryApi;
pub use config::RegistryConfig;
pub use error::{Error, Result};
pub use registry::{ModelRegistry, RegistrationParams};

#[cfg(feature = "hub")]
pub use catalog::{HubCatalog, HubImportParams, HubModelInfo};
pub use properties::{Properties, PropertyValue};
pub use resources::{
    Artifact, ArtifactState, DocArtifact, ExecutionState, InferenceService, InferenceServiceState,
    ModelArtifact, ModelVersion, ModelVersionState, RegisteredModel, RegisteredModelState,
    Resource, ResourceList, ServeModel, ServingEnvironment,
};
pub use api::{HttpAdapter, ListOptions, OrderByField, RestAdapter, RestRequest, RestResponse, SortOrder};

//! In-memory registry server double.
//!
//! Implements `RestAdapter` with the server-side semantics the client
//! depends on: id and timestamp assignment, find/list/pagination, and the
//! single-model-artifact-per-version conflict. Tests run against it instead
//! of a live registry.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use modelshelf::api::BASE_PATH;
use modelshelf::{Error, Result, RestAdapter, RestRequest, RestResponse};

pub struct InMemoryRegistry {
    state: Mutex<State>,
}

#[derive(Default)]
struct State {
    records: HashMap<&'static str, Vec<Map<String, Value>>>,
    next_id: u64,
    clock: u64,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                records: HashMap::new(),
                next_id: 1,
                clock: 1000,
            }),
        }
    }
}

#[async_trait]
impl RestAdapter for InMemoryRegistry {
    async fn execute(&self, request: RestRequest) -> Result<RestResponse> {
        let mut state = self.state.lock().unwrap();
        let path = request
            .path
            .strip_prefix(BASE_PATH)
            .ok_or_else(|| Error::Transport(format!("unexpected path {}", request.path)))?;
        let segments: Vec<&str> =
            path.trim_start_matches('/').split('/').filter(|s| !s.is_empty()).collect();

        let response = match (request.method.as_str(), segments.as_slice()) {
            ("POST", [c @ ("registered_models" | "serving_environments")]) => {
                state.create(collection_key(c), None, body(&request)?)
            }
            ("GET", [c @ ("registered_models" | "serving_environments" | "model_artifacts")]) => {
                state.list(collection_key(c), None, &request)
            }
            (
                "GET",
                [f @ ("registered_model" | "model_version" | "model_artifact"
                | "serving_environment" | "inference_service" | "serve_model")],
            ) => state.find(finder_collection(f), &request),
            ("GET", ["registered_models", id, "versions"]) => {
                state.list("model_versions", Some(("registeredModelId", id)), &request)
            }
            ("POST", ["registered_models", id, "versions"]) => {
                state.create("model_versions", Some(("registeredModelId", id)), body(&request)?)
            }
            ("GET", ["model_versions", id, "artifacts"]) => {
                state.list("model_artifacts", Some(("modelVersionId", id)), &request)
            }
            ("POST", ["model_versions", id, "artifacts"]) => {
                if state.has_model_artifact(id) {
                    conflict("model version already has a model artifact")
                } else {
                    state.create("model_artifacts", Some(("modelVersionId", id)), body(&request)?)
                }
            }
            ("GET", ["serving_environments", id, "inference_services"]) => {
                state.list("inference_services", Some(("servingEnvironmentId", id)), &request)
            }
            ("POST", ["serving_environments", id, "inference_services"]) => {
                state.create("inference_services", Some(("servingEnvironmentId", id)), body(&request)?)
            }
            ("GET", ["inference_services", id, "serves"]) => {
                state.list("serve_models", Some(("inferenceServiceId", id)), &request)
            }
            ("POST", ["inference_services", id, "serves"]) => {
                state.create("serve_models", Some(("inferenceServiceId", id)), body(&request)?)
            }
            ("GET", [c, id]) if is_collection(c) => state.get(collection_key(c), id),
            ("PATCH", [c, id]) if is_collection(c) => {
                state.update(collection_key(c), id, body(&request)?)
            }
            (method, _) => {
                return Err(Error::Transport(format!("no route for {method} {path}")));
            }
        };
        Ok(response)
    }
}

impl State {
    fn create(
        &mut self,
        collection: &'static str,
        parent: Option<(&str, &str)>,
        mut record: Map<String, Value>,
    ) -> RestResponse {
        record.insert("id".to_string(), Value::String(self.next_id.to_string()));
        record.insert("createTimeSinceEpoch".to_string(), Value::String(self.clock.to_string()));
        record
            .insert("lastUpdateTimeSinceEpoch".to_string(), Value::String(self.clock.to_string()));
        if let Some((field, value)) = parent {
            record.insert(field.to_string(), Value::String(value.to_string()));
        }
        self.next_id += 1;
        self.clock += 1;
        let response = Value::Object(record.clone());
        self.records.entry(collection).or_default().push(record);
        RestResponse { status: 201, body: response }
    }

    fn update(
        &mut self,
        collection: &'static str,
        id: &str,
        patch: Map<String, Value>,
    ) -> RestResponse {
        let clock = self.clock;
        self.clock += 1;
        let Some(record) = self
            .records
            .entry(collection)
            .or_default()
            .iter_mut()
            .find(|r| field(r, "id") == Some(id))
        else {
            return not_found(collection, id);
        };
        for (key, value) in patch {
            record.insert(key, value);
        }
        record.insert("lastUpdateTimeSinceEpoch".to_string(), Value::String(clock.to_string()));
        RestResponse { status: 200, body: Value::Object(record.clone()) }
    }

    fn get(&mut self, collection: &'static str, id: &str) -> RestResponse {
        match self
            .records
            .entry(collection)
            .or_default()
            .iter()
            .find(|r| field(r, "id") == Some(id))
        {
            Some(record) => RestResponse { status: 200, body: Value::Object(record.clone()) },
            None => not_found(collection, id),
        }
    }

    fn find(&mut self, collection: &'static str, request: &RestRequest) -> RestResponse {
        let name = query(request, "name");
        let external_id = query(request, "externalId");
        let found = self.records.entry(collection).or_default().iter().find(|r| {
            name.is_none_or(|n| field(r, "name") == Some(n))
                && external_id.is_none_or(|e| field(r, "externalId") == Some(e))
        });
        match found {
            Some(record) => RestResponse { status: 200, body: Value::Object(record.clone()) },
            None => not_found(collection, "by params"),
        }
    }

    fn list(
        &mut self,
        collection: &'static str,
        parent: Option<(&str, &str)>,
        request: &RestRequest,
    ) -> RestResponse {
        let name = query(request, "name");
        let external_id = query(request, "externalId");
        let mut matched: Vec<&Map<String, Value>> = self
            .records
            .entry(collection)
            .or_default()
            .iter()
            .filter(|r| {
                parent.is_none_or(|(f, v)| field(r, f) == Some(v))
                    && name.is_none_or(|n| field(r, "name") == Some(n))
                    && external_id.is_none_or(|e| field(r, "externalId") == Some(e))
            })
            .collect();

        let order_by = query(request, "orderBy").unwrap_or("ID");
        let order_field = match order_by {
            "CREATE_TIME" => "createTimeSinceEpoch",
            "LAST_UPDATE_TIME" => "lastUpdateTimeSinceEpoch",
            _ => "id",
        };
        matched.sort_by_key(|r| numeric(r, order_field));
        if query(request, "sortOrder") == Some("DESC") {
            matched.reverse();
        }

        let offset: usize =
            query(request, "nextPageToken").and_then(|t| t.parse().ok()).unwrap_or(0);
        let page_size: usize =
            query(request, "pageSize").and_then(|s| s.parse().ok()).unwrap_or(matched.len());
        let page: Vec<Value> = matched
            .iter()
            .skip(offset)
            .take(page_size)
            .map(|r| Value::Object((*r).clone()))
            .collect();
        let next_offset = offset + page.len();
        let token = if next_offset < matched.len() { next_offset.to_string() } else { String::new() };

        RestResponse {
            status: 200,
            body: json!({
                "items": page,
                "size": page.len(),
                "pageSize": page_size,
                "nextPageToken": token,
            }),
        }
    }

    fn has_model_artifact(&mut self, model_version_id: &str) -> bool {
        self.records.entry("model_artifacts").or_default().iter().any(|r| {
            field(r, "modelVersionId") == Some(model_version_id)
                && field(r, "artifactType") == Some("model-artifact")
        })
    }
}

fn body(request: &RestRequest) -> Result<Map<String, Value>> {
    request
        .body
        .as_ref()
        .and_then(Value::as_object)
        .cloned()
        .ok_or_else(|| Error::Transport("request body missing or not an object".to_string()))
}

fn query<'a>(request: &'a RestRequest, key: &str) -> Option<&'a str> {
    request.query.iter().find(|(k, _)| *k == key).map(|(_, v)| v.as_str())
}

fn field<'a>(record: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    record.get(key).and_then(Value::as_str)
}

fn numeric(record: &Map<String, Value>, key: &str) -> u64 {
    field(record, key).and_then(|v| v.parse().ok()).unwrap_or(0)
}

fn is_collection(segment: &str) -> bool {
    matches!(
        segment,
        "registered_models"
            | "model_versions"
            | "model_artifacts"
            | "serving_environments"
            | "inference_services"
            | "serve_models"
    )
}

fn collection_key(segment: &str) -> &'static str {
    match segment {
        "registered_models" => "registered_models",
        "model_versions" => "model_versions",
        "model_artifacts" => "model_artifacts",
        "serving_environments" => "serving_environments",
        "inference_services" => "inference_services",
        "serve_models" => "serve_models",
        other => panic!("unknown collection {other}"),
    }
}

fn finder_collection(finder: &str) -> &'static str {
    match finder {
        "registered_model" => "registered_models",
        "model_version" => "model_versions",
        "model_artifact" => "model_artifacts",
        "serving_environment" => "serving_environments",
        "inference_service" => "inference_services",
        "serve_model" => "serve_models",
        other => panic!("unknown finder {other}"),
    }
}

fn not_found(collection: &str, what: &str) -> RestResponse {
    RestResponse {
        status: 404,
        body: json!({"code": "not-found", "message": format!("{collection}: {what} not found")}),
    }
}

fn conflict(message: &str) -> RestResponse {
    RestResponse {
        status: 400,
        body: json!({"code": "conflict", "message": message}),
    }
}

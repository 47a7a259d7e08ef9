//! Request routing and handlers
//!
//! Handlers are thin: they parse ids and bodies, call the graph service or
//! version history, and serialize the result. Graph edits run as
//! load, pure mutation, apply.

use std::collections::BTreeSet;
use std::sync::Arc;

use cardforge_core::graph::GraphReport;
use cardforge_core::storage::traits::{AssetStore, CardStore};
use cardforge_core::storage::types::{Asset, Card, CardSpec};
use cardforge_core::{
    ApplyReport, AssetGraph, AssetGraphService, AssetId, AttachAsset, BindingId, CardError,
    CardId, CardResult, StorageTypes, Stores, VersionHistory, VersionId, bind_to_actor,
    reorder_assets, set_main_background, set_portrait_override, unbind_from_actor,
};
use http_body_util::{BodyExt, Full, Limited};
use hyper::body::{Bytes, Incoming};
use hyper::header::{CONTENT_TYPE, HeaderValue};
use hyper::{Method, Request, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::debug;

use crate::error::ApiError;

pub type JsonResponse = Response<Full<Bytes>>;

/// Largest accepted request body
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

pub fn json_response(status: StatusCode, body: &impl Serialize) -> JsonResponse {
    let bytes = serde_json::to_vec(body).unwrap_or_default();
    let mut response = Response::new(Full::new(Bytes::from(bytes)));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    response
}

fn empty_response(status: StatusCode) -> JsonResponse {
    let mut response = Response::new(Full::new(Bytes::new()));
    *response.status_mut() = status;
    response
}

fn parse_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, ApiError> {
    let raw: &[u8] = if body.is_empty() { b"{}" } else { body };
    serde_json::from_slice(raw).map_err(ApiError::bad_body)
}

/// Parse a body whose shape errors are blamed on one request field
///
/// Malformed JSON is still reported against `body`.
fn parse_field_body<T: DeserializeOwned>(body: &Bytes, field: &'static str) -> Result<T, ApiError> {
    let raw: &[u8] = if body.is_empty() { b"{}" } else { body };
    serde_json::from_slice(raw).map_err(|err| {
        if err.is_data() {
            ApiError::BadRequest {
                field,
                message: err.to_string(),
            }
        } else {
            ApiError::bad_body(err)
        }
    })
}

fn query_param<'a>(query: Option<&'a str>, name: &str) -> Option<&'a str> {
    query?
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
        .filter(|value| !value.is_empty())
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReorderRequest {
    asset_ids: Vec<BindingId>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BindActorRequest {
    actor_index: i64,
}

#[derive(Deserialize)]
struct SnapshotRequest {
    #[serde(default)]
    message: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateCardRequest {
    name: String,
    spec: CardSpec,
    #[serde(default)]
    data: Value,
    #[serde(default)]
    actor_count: u32,
}

#[derive(Deserialize)]
struct UpdateDataRequest {
    data: Value,
}

#[derive(Deserialize)]
struct CreateAssetRequest {
    filename: String,
    mimetype: String,
    size: i64,
    width: Option<u32>,
    height: Option<u32>,
    url: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AttachRequest {
    asset_id: AssetId,
    #[serde(rename = "type")]
    role: String,
    name: Option<String>,
    #[serde(default)]
    is_main: bool,
    #[serde(default)]
    tags: BTreeSet<String>,
}

/// Graph payload returned by every mutation route
#[derive(Serialize)]
struct MutationResponse {
    #[serde(flatten)]
    report: GraphReport,
    applied: ApplyReport,
}

/// HTTP front for one set of stores
pub struct Api<S: StorageTypes> {
    card_store: Arc<S::Card>,
    asset_store: Arc<S::Asset>,
    graph: AssetGraphService<S>,
    history: VersionHistory<S>,
}

impl<S: StorageTypes> Api<S> {
    pub fn from_stores(stores: &impl Stores<S>) -> Self {
        Self {
            card_store: stores.card(),
            asset_store: stores.asset(),
            graph: AssetGraphService::from_stores(stores),
            history: VersionHistory::from_stores(stores),
        }
    }

    /// Read the body and route a hyper request
    pub async fn serve(&self, req: Request<Incoming>) -> JsonResponse {
        let method = req.method().clone();
        let path = req.uri().path().to_string();
        let query = req.uri().query().map(str::to_string);

        let body = match Limited::new(req.into_body(), MAX_BODY_BYTES).collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(_) => return ApiError::PayloadTooLarge.into_response(),
        };

        self.handle(&method, &path, query.as_deref(), body).await
    }

    /// Route a request that has already been read into memory
    pub async fn handle(
        &self,
        method: &Method,
        path: &str,
        query: Option<&str>,
        body: Bytes,
    ) -> JsonResponse {
        debug!(method = %method, path = %path, "incoming request");

        match self.route(method, path, query, &body).await {
            Ok(response) => response,
            Err(err) => {
                debug!(method = %method, path = %path, status = %err.status(), "request failed");
                err.into_response()
            }
        }
    }

    async fn route(
        &self,
        method: &Method,
        path: &str,
        query: Option<&str>,
        body: &Bytes,
    ) -> Result<JsonResponse, ApiError> {
        let segments: Vec<&str> = path.trim_matches('/').split('/').collect();

        match (method, segments.as_slice()) {
            (&Method::GET, ["health"]) => Ok(json_response(StatusCode::OK, &json!({"status": "ok"}))),

            (&Method::POST, ["cards"]) => self.create_card(parse_body(body)?).await,
            (&Method::GET, ["cards", card]) => self.get_card(&CardId::from(*card)).await,
            (&Method::PUT, ["cards", card, "data"]) => {
                self.update_card_data(&CardId::from(*card), parse_body(body)?)
                    .await
            }

            (&Method::POST, ["assets"]) => self.create_asset(parse_body(body)?).await,

            (&Method::GET, ["cards", card, "asset-graph"]) => {
                let report = self.graph.report(&CardId::from(*card)).await?;
                Ok(json_response(StatusCode::OK, &report))
            }
            (&Method::POST, ["cards", card, "assets"]) => {
                self.attach(&CardId::from(*card), parse_body(body)?).await
            }
            (&Method::POST, ["cards", card, "assets", "reorder"]) => {
                let request: ReorderRequest = parse_body(body)?;
                self.mutate(&CardId::from(*card), move |g| {
                    Ok(reorder_assets(g, &request.asset_ids))
                })
                .await
            }
            (&Method::DELETE, ["cards", card, "assets", binding]) => {
                self.graph
                    .detach_asset(&CardId::from(*card), &BindingId::from(*binding))
                    .await?;
                Ok(empty_response(StatusCode::NO_CONTENT))
            }
            (&Method::POST, ["cards", card, "assets", binding, action]) => {
                self.binding_action(&CardId::from(*card), BindingId::from(*binding), action, body)
                    .await
            }

            (&Method::GET, ["cards", card, "versions"]) => {
                let versions = self.history.list(&CardId::from(*card)).await?;
                Ok(json_response(StatusCode::OK, &versions))
            }
            (&Method::POST, ["cards", card, "versions"]) => {
                let request: SnapshotRequest = parse_body(body)?;
                let version = self
                    .history
                    .snapshot(&CardId::from(*card), &request.message)
                    .await?;
                Ok(json_response(StatusCode::CREATED, &version))
            }
            (&Method::GET, ["cards", card, "versions", version, "diff"]) => {
                let card_id = CardId::from(*card);
                let version_id = VersionId::from(*version);
                let diff = match query_param(query, "against") {
                    Some(other) => {
                        self.history
                            .diff_versions(&card_id, &version_id, &VersionId::from(other))
                            .await?
                    }
                    None => self.history.diff_against_live(&card_id, &version_id).await?,
                };
                Ok(json_response(StatusCode::OK, &diff))
            }
            (&Method::DELETE, ["cards", card, "versions", version]) => {
                self.history
                    .delete(&CardId::from(*card), &VersionId::from(*version))
                    .await?;
                Ok(empty_response(StatusCode::NO_CONTENT))
            }

            _ => Err(ApiError::RouteNotFound),
        }
    }

    async fn binding_action(
        &self,
        card_id: &CardId,
        binding_id: BindingId,
        action: &str,
        body: &Bytes,
    ) -> Result<JsonResponse, ApiError> {
        match action {
            "set-portrait-override" => {
                self.mutate(card_id, move |g| Ok(set_portrait_override(g, &binding_id)))
                    .await
            }
            "set-main-background" => {
                self.mutate(card_id, move |g| Ok(set_main_background(g, &binding_id)))
                    .await
            }
            "bind-actor" => {
                let request: BindActorRequest = parse_field_body(body, "actorIndex")?;
                self.mutate(card_id, move |g| {
                    bind_to_actor(g, &binding_id, request.actor_index)
                })
                .await
            }
            "unbind-actor" => {
                self.mutate(card_id, move |g| Ok(unbind_from_actor(g, &binding_id)))
                    .await
            }
            _ => Err(ApiError::RouteNotFound),
        }
    }

    async fn mutate<F>(&self, card_id: &CardId, transform: F) -> Result<JsonResponse, ApiError>
    where
        F: FnOnce(&AssetGraph) -> CardResult<AssetGraph> + Send,
    {
        let (graph, applied) = self.graph.update_graph(card_id, transform).await?;
        let response = MutationResponse {
            report: GraphReport::of(graph),
            applied,
        };
        Ok(json_response(StatusCode::OK, &response))
    }

    async fn create_card(&self, request: CreateCardRequest) -> Result<JsonResponse, ApiError> {
        let card = Card::new(request.name, request.spec, request.data)
            .with_actor_count(request.actor_count);
        let id = self
            .card_store
            .create_card(card)
            .await
            .map_err(CardError::from)?;
        Ok(json_response(StatusCode::CREATED, &json!({ "id": id })))
    }

    async fn get_card(&self, card_id: &CardId) -> Result<JsonResponse, ApiError> {
        let card = self
            .card_store
            .get_card(card_id)
            .await
            .map_err(CardError::from)?
            .ok_or_else(|| CardError::not_found("card", card_id))?;
        Ok(json_response(
            StatusCode::OK,
            &json!({
                "id": card.id,
                "name": card.name,
                "spec": card.spec,
                "actorCount": card.actor_count,
                "data": card.data,
                "createdAt": card.created_at,
                "updatedAt": card.content.updated_at,
            }),
        ))
    }

    async fn update_card_data(
        &self,
        card_id: &CardId,
        request: UpdateDataRequest,
    ) -> Result<JsonResponse, ApiError> {
        let updated = self
            .card_store
            .update_card_data(card_id, request.data)
            .await
            .map_err(CardError::from)?;
        if !updated {
            return Err(CardError::not_found("card", card_id).into());
        }
        Ok(empty_response(StatusCode::NO_CONTENT))
    }

    async fn create_asset(&self, request: CreateAssetRequest) -> Result<JsonResponse, ApiError> {
        let mut asset = Asset::new(request.filename, request.mimetype, request.size);
        if let (Some(width), Some(height)) = (request.width, request.height) {
            asset = asset.with_dimensions(width, height);
        }
        if let Some(url) = request.url {
            asset = asset.with_url(url);
        }
        let id = self
            .asset_store
            .create_asset(asset)
            .await
            .map_err(CardError::from)?;
        Ok(json_response(StatusCode::CREATED, &json!({ "id": id })))
    }

    async fn attach(
        &self,
        card_id: &CardId,
        request: AttachRequest,
    ) -> Result<JsonResponse, ApiError> {
        let mut attach = AttachAsset::new(request.asset_id, request.role);
        attach.name = request.name;
        attach.is_main = request.is_main;
        attach.tags = request.tags;

        let node = self.graph.attach_asset(card_id, attach).await?;
        Ok(json_response(StatusCode::CREATED, &node))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cardforge_core::{MemoryStorage, MemoryStores};

    struct Harness {
        api: Api<MemoryStorage>,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                api: Api::from_stores(&MemoryStores::new()),
            }
        }

        async fn call(&self, method: Method, path: &str, body: Value) -> (StatusCode, Value) {
            let (path, query) = match path.split_once('?') {
                Some((p, q)) => (p, Some(q)),
                None => (path, None),
            };
            let bytes = if body.is_null() {
                Bytes::new()
            } else {
                Bytes::from(serde_json::to_vec(&body).unwrap())
            };
            let response = self.api.handle(&method, path, query, bytes).await;
            let status = response.status();
            let raw = response.into_body().collect().await.unwrap().to_bytes();
            let json = if raw.is_empty() {
                Value::Null
            } else {
                serde_json::from_slice(&raw).unwrap()
            };
            (status, json)
        }

        async fn seed(&self) -> (String, Vec<String>) {
            let (status, card) = self
                .call(
                    Method::POST,
                    "/cards",
                    json!({"name": "Alice", "spec": "chara_card_v3", "data": {"data": {"name": "Alice"}}, "actorCount": 1}),
                )
                .await;
            assert_eq!(status, StatusCode::CREATED);
            let card_id = card["id"].as_str().unwrap().to_string();

            let mut bindings = Vec::new();
            for (file, role) in [("a.png", "icon"), ("b.png", "icon"), ("bg.png", "background")] {
                let (_, asset) = self
                    .call(
                        Method::POST,
                        "/assets",
                        json!({"filename": file, "mimetype": "image/png", "size": 10}),
                    )
                    .await;
                let (status, node) = self
                    .call(
                        Method::POST,
                        &format!("/cards/{card_id}/assets"),
                        json!({"assetId": asset["id"], "type": role}),
                    )
                    .await;
                assert_eq!(status, StatusCode::CREATED);
                bindings.push(node["id"].as_str().unwrap().to_string());
            }
            (card_id, bindings)
        }
    }

    #[tokio::test]
    async fn test_health() {
        let h = Harness::new();
        let (status, body) = h.call(Method::GET, "/health", Value::Null).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_asset_graph_payload() {
        let h = Harness::new();
        let (card_id, bindings) = h.seed().await;

        let (status, body) = h
            .call(Method::GET, &format!("/cards/{card_id}/asset-graph"), Value::Null)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["nodes"].as_array().unwrap().len(), 3);
        assert_eq!(body["nodes"][0]["id"], bindings[0].as_str());
        assert_eq!(body["summary"]["total"], 3);
        assert!(body["validation"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_card_is_404() {
        let h = Harness::new();
        let (status, body) = h
            .call(Method::GET, "/cards/missing/asset-graph", Value::Null)
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].as_str().unwrap().contains("card not found"));
    }

    #[tokio::test]
    async fn test_reorder_and_main_flags() {
        let h = Harness::new();
        let (card_id, bindings) = h.seed().await;

        let (status, body) = h
            .call(
                Method::POST,
                &format!("/cards/{card_id}/assets/reorder"),
                json!({"assetIds": [bindings[2]]}),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["nodes"][0]["id"], bindings[2].as_str());
        assert_eq!(body["applied"]["updated"], 3);

        let (status, body) = h
            .call(
                Method::POST,
                &format!("/cards/{card_id}/assets/{}/set-portrait-override", bindings[1]),
                Value::Null,
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["summary"]["mainPortrait"], bindings[1].as_str());

        // a portrait id on the background route changes nothing
        let (status, body) = h
            .call(
                Method::POST,
                &format!("/cards/{card_id}/assets/{}/set-main-background", bindings[0]),
                Value::Null,
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["applied"]["updated"], 0);
        assert!(body["summary"]["mainBackground"].is_null());
    }

    #[tokio::test]
    async fn test_bind_actor_validation() {
        let h = Harness::new();
        let (card_id, bindings) = h.seed().await;
        let route = format!("/cards/{card_id}/assets/{}/bind-actor", bindings[0]);

        let (status, body) = h.call(Method::POST, &route, json!({"actorIndex": 0})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["field"], "actorIndex");

        for missing in [Value::Null, json!({"actorIndex": "two"}), json!({"actor": 1})] {
            let (status, body) = h.call(Method::POST, &route, missing).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["field"], "actorIndex");
        }

        let response = h
            .api
            .handle(&Method::POST, &route, None, Bytes::from_static(b"{not json"))
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let raw = response.into_body().collect().await.unwrap().to_bytes();
        let body: Value = serde_json::from_slice(&raw).unwrap();
        assert_eq!(body["field"], "body");

        let (status, body) = h.call(Method::POST, &route, json!({"actorIndex": 2})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["summary"]["actors"], json!([2]));
        assert_eq!(body["validation"][0]["severity"], "info");

        let (status, body) = h
            .call(
                Method::POST,
                &format!("/cards/{card_id}/assets/{}/unbind-actor", bindings[0]),
                Value::Null,
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["summary"]["actors"], json!([]));
    }

    #[tokio::test]
    async fn test_versions_and_diff() {
        let h = Harness::new();
        let (card_id, _) = h.seed().await;

        let (status, v1) = h
            .call(
                Method::POST,
                &format!("/cards/{card_id}/versions"),
                json!({"message": "first"}),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(v1["versionNumber"], 1);
        let v1_id = v1["id"].as_str().unwrap().to_string();

        let (status, _) = h
            .call(
                Method::PUT,
                &format!("/cards/{card_id}/data"),
                json!({"data": {"data": {"name": "Alicia"}}}),
            )
            .await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, diff) = h
            .call(
                Method::GET,
                &format!("/cards/{card_id}/versions/{v1_id}/diff"),
                Value::Null,
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(diff["identical"], false);
        assert_eq!(diff["stats"]["added"], 1);

        let (_, v2) = h
            .call(Method::POST, &format!("/cards/{card_id}/versions"), Value::Null)
            .await;
        let v2_id = v2["id"].as_str().unwrap();
        let (status, diff) = h
            .call(
                Method::GET,
                &format!("/cards/{card_id}/versions/{v1_id}/diff?against={v2_id}"),
                Value::Null,
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(diff["stats"]["removed"], 1);

        let (_, list) = h
            .call(Method::GET, &format!("/cards/{card_id}/versions"), Value::Null)
            .await;
        assert_eq!(list.as_array().unwrap().len(), 2);

        let (status, _) = h
            .call(
                Method::DELETE,
                &format!("/cards/{card_id}/versions/{v1_id}"),
                Value::Null,
            )
            .await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn test_detach_and_unknown_routes() {
        let h = Harness::new();
        let (card_id, bindings) = h.seed().await;

        let (status, _) = h
            .call(
                Method::DELETE,
                &format!("/cards/{card_id}/assets/{}", bindings[0]),
                Value::Null,
            )
            .await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _) = h
            .call(
                Method::POST,
                &format!("/cards/{card_id}/assets/{}/explode", bindings[1]),
                Value::Null,
            )
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = h.call(Method::GET, "/nope", Value::Null).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "route not found");
    }

    #[test]
    fn test_query_param() {
        assert_eq!(query_param(Some("a=1&against=v2"), "against"), Some("v2"));
        assert_eq!(query_param(Some("against="), "against"), None);
        assert_eq!(query_param(None, "against"), None);
    }
}

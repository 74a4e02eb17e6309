//! Item HTTP Routes
//!
//! CRUD endpoints for the item catalog plus the root greeting.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use itemstore_core::{validate_item, Item, ItemId};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListItemsQuery {
    #[serde(default)]
    pub max_price: Option<f64>,
}

/// Build the item router
pub fn item_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(read_root))
        .route("/items", get(list_items))
        .route("/items/", post(create_item))
        .route(
            "/items/:item_id",
            get(read_item).put(update_item).delete(delete_item),
        )
        .with_state(state)
}

async fn read_root() -> Json<Value> {
    Json(json!({ "message": "Hello, World!" }))
}

async fn create_item(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Item>)> {
    let item = validate_item(&json_body(payload)?)?;
    let created = state
        .with_items(move |items| items.create_item(&item))
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn read_item(
    State(state): State<AppState>,
    item_id: Result<Path<ItemId>, PathRejection>,
) -> ApiResult<Json<Item>> {
    let id = path_id(item_id)?;
    let item = state.with_items(move |items| items.get_item(id)).await?;
    Ok(Json(item))
}

async fn update_item(
    State(state): State<AppState>,
    item_id: Result<Path<ItemId>, PathRejection>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<Item>> {
    let id = path_id(item_id)?;
    let item = validate_item(&json_body(payload)?)?;
    let updated = state
        .with_items(move |items| items.update_item(id, &item))
        .await?;
    Ok(Json(updated))
}

async fn delete_item(
    State(state): State<AppState>,
    item_id: Result<Path<ItemId>, PathRejection>,
) -> ApiResult<StatusCode> {
    let id = path_id(item_id)?;
    state.with_items(move |items| items.delete_item(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_items(
    State(state): State<AppState>,
    query: Result<Query<ListItemsQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<Item>>> {
    let Query(ListItemsQuery { max_price }) =
        query.map_err(|rejection| ApiError::InvalidRequest(rejection.body_text()))?;
    let items = state
        .with_items(move |items| items.list_items(max_price))
        .await?;
    Ok(Json(items))
}

fn path_id(item_id: Result<Path<ItemId>, PathRejection>) -> ApiResult<ItemId> {
    item_id
        .map(|Path(id)| id)
        .map_err(|rejection| ApiError::InvalidRequest(rejection.body_text()))
}

fn json_body(payload: Result<Json<Value>, JsonRejection>) -> ApiResult<Value> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| ApiError::InvalidRequest(rejection.body_text()))
}

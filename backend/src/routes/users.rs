//! Users resource endpoints (HAL/JSON).
//!
//! - `POST   /users`         create, 201 + `Location`
//! - `GET    /users`         list all
//! - `GET    /users/search`  birth date range search (`from`, `to`)
//! - `GET    /users/:id`     fetch one
//! - `PUT    /users/:id`     full replace
//! - `PATCH  /users/:id`     partial update by field name
//! - `DELETE /users/:id`     delete, 202 + text confirmation
//!
//! Paths come from the [`RouteTable`](crate::links::RouteTable) in state.

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        OriginalUri, Path, Query, State,
    },
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{Map, Value};
use users_common::{CollectionModel, EntityModel, User};

use crate::error::{ApiError, Error};
use crate::AppState;

type ApiResult<T> = std::result::Result<T, ApiError>;

/// Query string of the search endpoint, dates as `YYYY-MM-DD`.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchParams {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

pub fn router(state: Arc<AppState>) -> Router {
    let routes = state.assembler.routes().clone();

    Router::new()
        .route(
            routes.collection(),
            get(list_users).post(create_user).fallback(method_not_allowed),
        )
        .route(
            &routes.search(),
            get(search_users).fallback(method_not_allowed),
        )
        .route(
            &routes.item(),
            get(get_user)
                .put(replace_user)
                .patch(patch_user)
                .delete(delete_user)
                .fallback(method_not_allowed),
        )
        .with_state(state)
}

fn path_id(id: Result<Path<i64>, PathRejection>, uri: &OriginalUri) -> ApiResult<i64> {
    id.map(|Path(id)| id)
        .map_err(|e| Error::InvalidParameter(e.body_text()).at(uri.0.path()))
}

fn json_body<T>(body: Result<Json<T>, JsonRejection>, uri: &OriginalUri) -> ApiResult<T> {
    body.map(|Json(value)| value)
        .map_err(|e| Error::InvalidParameter(e.body_text()).at(uri.0.path()))
}

/// POST /users - Create a user
async fn create_user(
    State(state): State<Arc<AppState>>,
    uri: OriginalUri,
    body: Result<Json<User>, JsonRejection>,
) -> ApiResult<Response> {
    let candidate = json_body(body, &uri)?;
    let user = state.users.create(candidate).await.map_err(|e| e.at(uri.0.path()))?;

    let model = state.assembler.to_model(user);
    let location = model
        .self_link()
        .map(|link| link.href.clone())
        .unwrap_or_else(|| state.assembler.collection_href());

    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(model)).into_response())
}

/// GET /users - List all users
async fn list_users(
    State(state): State<Arc<AppState>>,
    uri: OriginalUri,
) -> ApiResult<Json<CollectionModel<User>>> {
    let users = state.users.get_all().await.map_err(|e| e.at(uri.0.path()))?;
    Ok(Json(state.assembler.to_collection_model(users)))
}

/// GET /users/search?from=YYYY-MM-DD&to=YYYY-MM-DD
async fn search_users(
    State(state): State<Arc<AppState>>,
    uri: OriginalUri,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> ApiResult<Json<CollectionModel<User>>> {
    let Query(params) =
        params.map_err(|e| Error::InvalidParameter(e.body_text()).at(uri.0.path()))?;

    let users = state
        .users
        .search_by_birth_date(params.from, params.to)
        .await
        .map_err(|e| e.at(uri.0.path()))?;
    Ok(Json(state.assembler.to_collection_model(users)))
}

/// GET /users/:id - Fetch one user
async fn get_user(
    State(state): State<Arc<AppState>>,
    uri: OriginalUri,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<EntityModel<User>>> {
    let id = path_id(id, &uri)?;
    let user = state.users.get_by_id(id).await.map_err(|e| e.at(uri.0.path()))?;
    Ok(Json(state.assembler.to_model(user)))
}

/// PUT /users/:id - Replace a user
async fn replace_user(
    State(state): State<Arc<AppState>>,
    uri: OriginalUri,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<User>, JsonRejection>,
) -> ApiResult<Json<EntityModel<User>>> {
    let id = path_id(id, &uri)?;
    let candidate = json_body(body, &uri)?;
    let user = state
        .users
        .replace(id, candidate)
        .await
        .map_err(|e| e.at(uri.0.path()))?;
    Ok(Json(state.assembler.to_model(user)))
}

/// PATCH /users/:id - Update the named fields of a user
async fn patch_user(
    State(state): State<Arc<AppState>>,
    uri: OriginalUri,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<Map<String, Value>>, JsonRejection>,
) -> ApiResult<Json<EntityModel<User>>> {
    let id = path_id(id, &uri)?;
    let fields = json_body(body, &uri)?;
    let user = state
        .users
        .patch_fields(id, fields)
        .await
        .map_err(|e| e.at(uri.0.path()))?;
    Ok(Json(state.assembler.to_model(user)))
}

/// DELETE /users/:id - Delete a user
async fn delete_user(
    State(state): State<Arc<AppState>>,
    uri: OriginalUri,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<(StatusCode, String)> {
    let id = path_id(id, &uri)?;
    state.users.delete(id).await.map_err(|e| e.at(uri.0.path()))?;
    Ok((StatusCode::ACCEPTED, format!("User {} deleted successfully", id)))
}

async fn method_not_allowed(method: Method, uri: OriginalUri) -> ApiError {
    Error::MethodNotSupported(method.to_string()).at(uri.0.path())
}

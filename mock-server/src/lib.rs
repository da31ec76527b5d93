use std::{collections::HashMap, sync::Arc, time::Duration};

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{any, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{
    net::TcpListener,
    sync::{Mutex, RwLock},
};
use url::form_urlencoded;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

#[derive(Deserialize)]
pub struct CreateUser {
    pub name: String,
    pub email: String,
}

#[derive(Deserialize)]
pub struct UpdateUser {
    pub name: Option<String>,
    pub email: Option<String>,
}

pub type Db = Arc<RwLock<HashMap<Uuid, User>>>;

/// Per-key request counters for `/flaky/{key}`.
pub type Attempts = Arc<Mutex<HashMap<String, u32>>>;

#[derive(Clone, Default)]
pub struct AppState {
    pub users: Db,
    pub attempts: Attempts,
}

pub fn app() -> Router {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route(
            "/users/{id}",
            get(get_user).put(update_user).patch(update_user).delete(delete_user),
        )
        .route("/form", post(echo_form))
        .route("/echo", any(echo))
        .route("/status/{code}", any(status))
        .route("/flaky/{key}", any(flaky))
        .route("/slow", get(slow))
        .route("/rate-limited", any(rate_limited))
        .route("/empty", any(empty))
        .with_state(AppState::default())
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn list_users(State(state): State<AppState>) -> Json<Vec<User>> {
    let users = state.users.read().await;
    let mut users: Vec<User> = users.values().cloned().collect();
    users.sort_by(|a, b| a.name.cmp(&b.name));
    Json(users)
}

async fn create_user(State(state): State<AppState>, Json(input): Json<CreateUser>) -> Response {
    let user = User {
        id: Uuid::new_v4(),
        name: input.name,
        email: input.email,
    };
    state.users.write().await.insert(user.id, user.clone());
    let location = format!("/users/{}", user.id);
    (StatusCode::CREATED, [(header::LOCATION, location)], Json(user)).into_response()
}

async fn get_user(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<User>, StatusCode> {
    let users = state.users.read().await;
    users.get(&id).cloned().map(Json).ok_or(StatusCode::NOT_FOUND)
}

async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateUser>,
) -> Result<Json<User>, StatusCode> {
    let mut users = state.users.write().await;
    let user = users.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
    if let Some(name) = input.name {
        user.name = name;
    }
    if let Some(email) = input.email {
        user.email = email;
    }
    Ok(Json(user.clone()))
}

async fn delete_user(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<StatusCode, StatusCode> {
    let mut users = state.users.write().await;
    users.remove(&id).map(|_| StatusCode::NO_CONTENT).ok_or(StatusCode::NOT_FOUND)
}

/// Echo a form body back as `{"content_type", "body", "fields"}`, with
/// `fields` as `[name, value]` pairs in body order.
async fn echo_form(headers: HeaderMap, body: String) -> Json<Value> {
    let fields: Vec<(String, String)> = form_urlencoded::parse(body.as_bytes()).into_owned().collect();
    Json(json!({
        "content_type": header_value(&headers, header::CONTENT_TYPE.as_str()),
        "body": body,
        "fields": fields,
    }))
}

/// Echo method, lower-cased headers, raw query and body.
async fn echo(method: Method, uri: Uri, headers: HeaderMap, body: String) -> Json<Value> {
    let headers: HashMap<String, String> = headers
        .iter()
        .filter_map(|(name, value)| Some((name.as_str().to_string(), value.to_str().ok()?.to_string())))
        .collect();
    Json(json!({
        "method": method.as_str(),
        "path": uri.path(),
        "query": uri.query(),
        "headers": headers,
        "body": body,
    }))
}

async fn status(Path(code): Path<u16>) -> Result<Response, StatusCode> {
    let status = StatusCode::from_u16(code).map_err(|_| StatusCode::BAD_REQUEST)?;
    Ok((status, Json(json!({ "status": code }))).into_response())
}

#[derive(Deserialize)]
struct FlakyParams {
    #[serde(default)]
    failures: u32,
}

/// 503 for the first `failures` hits on `key`, then 200 with the hit count.
async fn flaky(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Query(params): Query<FlakyParams>,
) -> Response {
    let attempt = {
        let mut attempts = state.attempts.lock().await;
        let count = attempts.entry(key).or_insert(0);
        *count += 1;
        *count
    };
    if attempt <= params.failures {
        return (StatusCode::SERVICE_UNAVAILABLE, Json(json!({ "attempt": attempt }))).into_response();
    }
    Json(json!({ "attempts": attempt })).into_response()
}

#[derive(Deserialize)]
struct SlowParams {
    #[serde(default)]
    ms: u64,
}

async fn slow(Query(params): Query<SlowParams>) -> Json<Value> {
    tokio::time::sleep(Duration::from_millis(params.ms)).await;
    Json(json!({ "slept_ms": params.ms }))
}

async fn rate_limited() -> Response {
    (
        StatusCode::TOO_MANY_REQUESTS,
        [(header::RETRY_AFTER, "2")],
        Json(json!({ "error": "slow down" })),
    )
        .into_response()
}

async fn empty() -> StatusCode {
    StatusCode::NO_CONTENT
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers.get(name).and_then(|value| value.to_str().ok()).map(str::to_string)
}

//! Diagnostic routes under `/api/test`
//!
//! | path | method | returns |
//! |------|--------|---------|
//! | /api/test/ping | GET | `pong` |
//! | /api/test/echo | POST | `Echo: {body}` |
//! | /api/test/config | GET | which integrations are configured |
//! | /api/test/jwt-info | GET | identity headers set by the filter |
//! | /api/test/debug-token | GET | bearer token claims, decoded without trust |
//! | /api/test/image-info/{publicId} | GET | provider metadata of a stored image |

use axum::extract::State;
use axum::http::HeaderMap;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use serde_json::{Value, json};
use shared::response::DataResponse;

use crate::api::ApiResult;
use crate::api::extract::AppPath;
use crate::auth::identity::{
    USER_EMAIL_HEADER, USER_ID_HEADER, USER_ROLE_HEADER, bearer_token, inspect_token,
};
use crate::services::storage::ImageInfo;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().nest("/api/test", routes())
}

fn routes() -> Router<AppState> {
    Router::new()
        .route("/ping", get(ping))
        .route("/echo", post(echo))
        .route("/config", get(config))
        .route("/jwt-info", get(jwt_info))
        .route("/debug-token", get(debug_token))
        .route("/image-info/{*public_id}", get(image_info))
}

async fn ping() -> &'static str {
    "pong"
}

async fn echo(body: String) -> String {
    format!("Echo: {body}")
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigReport {
    cloud_name: String,
    api_key_set: bool,
    api_secret_set: bool,
    mapbox_token_set: bool,
    geocoding_available: bool,
    status: &'static str,
}

async fn config(State(state): State<AppState>) -> Json<ConfigReport> {
    let config = &state.config;
    Json(ConfigReport {
        cloud_name: config.cloudinary_cloud_name.clone(),
        api_key_set: !config.cloudinary_api_key.is_empty(),
        api_secret_set: !config.cloudinary_api_secret.is_empty(),
        mapbox_token_set: state.geocoder.token_set(),
        geocoding_available: state.geocoder.is_available(),
        status: "OK",
    })
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JwtInfo {
    user_id_from_jwt: Option<String>,
    email_from_jwt: Option<String>,
    role_from_jwt: Option<String>,
    jwt_filter_working: bool,
}

async fn jwt_info(headers: HeaderMap) -> Json<JwtInfo> {
    let get = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(String::from)
    };
    let user_id = get(USER_ID_HEADER);
    Json(JwtInfo {
        jwt_filter_working: user_id.is_some(),
        user_id_from_jwt: user_id,
        email_from_jwt: get(USER_EMAIL_HEADER),
        role_from_jwt: get(USER_ROLE_HEADER),
    })
}

async fn debug_token(State(state): State<AppState>, headers: HeaderMap) -> Json<Value> {
    if !headers.contains_key(http::header::AUTHORIZATION) {
        return Json(json!({ "error": "No Authorization header found" }));
    }
    let Some(token) = bearer_token(&headers) else {
        return Json(json!({ "error": "Authorization header is not a Bearer token" }));
    };
    match inspect_token(token, &state.config.jwt_secret) {
        Ok(report) => Json(json!(report)),
        Err(e) => Json(json!({ "error": format!("Token could not be decoded: {e}") })),
    }
}

/// Public ids contain the folder, hence the wildcard
async fn image_info(
    State(state): State<AppState>,
    AppPath(public_id): AppPath<String>,
) -> ApiResult<DataResponse<ImageInfo>> {
    let response = match state.storage.info(&public_id).await? {
        Some(info) => DataResponse::success(info, "Image info retrieved"),
        None => DataResponse::empty(format!("Image '{public_id}' not found")),
    };
    Ok(Json(response))
}

use crate::HubInstance;
use crate::contact::BookingInquiry;
use crate::error::{HubError, HubErrorCode};
use crate::record::{EventDraft, LinkDraft, RecordId};
use crate::session::CallerContext;
use axum::Json;
use axum::Router;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

pub const SESSION_COOKIE: &str = "hub_session";

pub fn build_router(hub: Arc<HubInstance>) -> Router {
    Router::new()
        .route("/api/links", get(list_links).post(create_link))
        .route("/api/links/:id", delete(delete_link))
        .route("/api/links/:id/click", post(record_click))
        .route("/api/events", get(list_events).post(create_event))
        .route("/api/events/:id", delete(delete_event))
        .route("/api/contact", post(submit_contact))
        .route("/admin/login", post(admin_login))
        .route("/admin/logout", post(admin_logout))
        .fallback(unknown_route)
        .with_state(hub)
}

fn status_for(code: HubErrorCode) -> StatusCode {
    match code {
        HubErrorCode::Validation => StatusCode::BAD_REQUEST,
        HubErrorCode::PermissionDenied => StatusCode::UNAUTHORIZED,
        HubErrorCode::LinkNotFound | HubErrorCode::EventNotFound => StatusCode::NOT_FOUND,
        HubErrorCode::Io
        | HubErrorCode::Encode
        | HubErrorCode::Decode
        | HubErrorCode::InvalidConfig
        | HubErrorCode::Unavailable => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(err: &HubError) -> Response {
    let status = status_for(err.code());
    let body = Json(json!({ "error": err.to_string(), "code": err.code_str() }));
    (status, body).into_response()
}

fn caller_from_headers(headers: &HeaderMap) -> CallerContext {
    let Some(cookies) = headers.get(header::COOKIE).and_then(|v| v.to_str().ok()) else {
        return CallerContext::anonymous();
    };
    for pair in cookies.split(';') {
        if let Some((name, value)) = pair.trim().split_once('=') {
            if name == SESSION_COOKIE {
                return CallerContext::from_token(value);
            }
        }
    }
    CallerContext::anonymous()
}

fn set_session_cookie(mut response: Response, token: &str, max_age_secs: u64) -> Response {
    let cookie = format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly; Max-Age={max_age_secs}");
    match HeaderValue::from_str(&cookie) {
        Ok(value) => {
            response.headers_mut().insert(header::SET_COOKIE, value);
            response
        }
        Err(_) => error_response(&HubError::Encode("session cookie".into())),
    }
}

async fn list_links(State(hub): State<Arc<HubInstance>>) -> Response {
    match hub.list_links().await {
        Ok(links) => Json(links).into_response(),
        Err(err) => error_response(&err),
    }
}

async fn create_link(
    State(hub): State<Arc<HubInstance>>,
    headers: HeaderMap,
    Json(draft): Json<LinkDraft>,
) -> Response {
    let caller = caller_from_headers(&headers);
    match hub.create_link(&caller, draft).await {
        Ok(link) => (StatusCode::CREATED, Json(link)).into_response(),
        Err(err) => error_response(&err),
    }
}

async fn delete_link(
    State(hub): State<Arc<HubInstance>>,
    headers: HeaderMap,
    Path(id): Path<RecordId>,
) -> Response {
    let caller = caller_from_headers(&headers);
    match hub.delete_link(&caller, id).await {
        Ok(()) => Json(json!({ "success": true })).into_response(),
        Err(err) => error_response(&err),
    }
}

async fn record_click(
    State(hub): State<Arc<HubInstance>>,
    Path(id): Path<RecordId>,
) -> Response {
    match hub.record_click(id).await {
        Ok(link) => Json(json!({ "success": true, "clickCount": link.click_count })).into_response(),
        Err(err) => error_response(&err),
    }
}

async fn list_events(State(hub): State<Arc<HubInstance>>) -> Response {
    match hub.list_events().await {
        Ok(events) => Json(events).into_response(),
        Err(err) => error_response(&err),
    }
}

async fn create_event(
    State(hub): State<Arc<HubInstance>>,
    headers: HeaderMap,
    Json(draft): Json<EventDraft>,
) -> Response {
    let caller = caller_from_headers(&headers);
    match hub.create_event(&caller, draft).await {
        Ok(event) => (StatusCode::CREATED, Json(event)).into_response(),
        Err(err) => error_response(&err),
    }
}

async fn delete_event(
    State(hub): State<Arc<HubInstance>>,
    headers: HeaderMap,
    Path(id): Path<RecordId>,
) -> Response {
    let caller = caller_from_headers(&headers);
    match hub.delete_event(&caller, id).await {
        Ok(()) => Json(json!({ "success": true })).into_response(),
        Err(err) => error_response(&err),
    }
}

async fn submit_contact(
    State(hub): State<Arc<HubInstance>>,
    Json(inquiry): Json<BookingInquiry>,
) -> Response {
    match hub.submit_inquiry(&inquiry) {
        Ok(()) => Json(json!({ "success": true })).into_response(),
        Err(err) => error_response(&err),
    }
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    #[serde(default)]
    password: String,
}

async fn admin_login(
    State(hub): State<Arc<HubInstance>>,
    Json(request): Json<LoginRequest>,
) -> Response {
    match hub.login(&request.password) {
        Ok(token) => {
            let response = Json(json!({ "success": true })).into_response();
            set_session_cookie(response, &token.to_string(), hub.session_ttl().as_secs())
        }
        Err(err) => error_response(&err),
    }
}

async fn admin_logout(State(hub): State<Arc<HubInstance>>, headers: HeaderMap) -> Response {
    let caller = caller_from_headers(&headers);
    hub.logout(&caller);
    // Expire the cookie regardless of whether a live session was revoked.
    set_session_cookie(Json(json!({ "success": true })).into_response(), "", 0)
}

async fn unknown_route() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "not found" })),
    )
        .into_response()
}

//!
//! Alumni Connect HTTP server
//! --------------------------
//! This module defines the Axum-based HTTP API for Alumni Connect.
//!
//! Responsibilities:
//! - Session cookie handling (HTTP-only `token` cookie, bearer header fallback).
//! - Registration/login/logout/me endpoints backed by the `identity` gate.
//! - Event, donation and directory endpoints delegating to the store.
//! - Role guarding per route via the gate's verification.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;

use crate::config::Config;
use crate::error::{AppError, AppResult, FieldError};
use crate::identity::{
    Gate, LoginRequest, Principal, RegisterRequest, Role, TokenSigner, UpdateProfileRequest,
};
use crate::store::{Donation, Event, SharedStore, StoreError};

const TOKEN_COOKIE: &str = "token";

/// Shared server state injected into all handlers. Holds the store handles
/// and the gate; the gate owns the signing material.
#[derive(Clone)]
pub struct AppState {
    pub store: SharedStore,
    pub gate: Arc<Gate>,
}

impl AppState {
    pub fn new(store: SharedStore, token_secret: &str) -> Self {
        let gate = Arc::new(Gate::new(store.accounts.clone(), TokenSigner::new(token_secret)));
        Self { store, gate }
    }
}

/// Mount all HTTP routes onto a router bound to the given state.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { "alumni-connect ok" }))
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/me", get(me))
        .route("/auth/logout", post(logout))
        .route("/profile", put(update_profile))
        .route("/events", get(list_events).post(create_event))
        .route("/events/{id}/rsvp", post(rsvp))
        .route("/donations", get(list_donations).post(create_donation))
        .route("/donations/mine", get(my_donations))
        .route("/directory/alumni", get(alumni_directory))
        .route("/directory/students", get(student_directory))
        .with_state(state)
}

/// Start the HTTP server with a fresh in-memory store.
pub async fn run(config: Config) -> anyhow::Result<()> {
    let state = AppState::new(SharedStore::in_memory(), &config.token_secret);
    let app = router(state);

    let addr: SocketAddr = format!("0.0.0.0:{}", config.http_port).parse()?;
    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn parse_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    let cookie = headers.get("cookie").or_else(|| headers.get("Cookie"))?;
    let s = cookie.to_str().ok()?;
    for part in s.split(';') {
        let p = part.trim();
        if let Some(eq) = p.find('=') {
            let (k, v) = p.split_at(eq);
            if k == name { return Some(v[1..].to_string()); }
        }
    }
    None
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let v = headers.get("authorization").or_else(|| headers.get("Authorization"))?;
    let s = v.to_str().ok()?;
    s.strip_prefix("Bearer ").map(|t| t.trim().to_string())
}

/// Token as presented by the client: the session cookie, or the bearer
/// header as a fallback.
fn session_token(headers: &HeaderMap) -> Option<String> {
    parse_cookie(headers, TOKEN_COOKIE).or_else(|| bearer_token(headers))
}

fn set_token_cookie(token: &str) -> HeaderValue {
    // HTTP-only so page scripts cannot read the raw token
    HeaderValue::from_str(&format!(
        "{TOKEN_COOKIE}={token}; HttpOnly; SameSite=Lax; Path=/; Max-Age=604800"
    )).unwrap()
}

fn clear_token_cookie() -> HeaderValue {
    HeaderValue::from_str(&format!(
        "{TOKEN_COOKIE}=deleted; Expires=Thu, 01 Jan 1970 00:00:00 GMT; HttpOnly; SameSite=Lax; Path=/"
    )).unwrap()
}

fn verify(state: &AppState, headers: &HeaderMap, required: &[Role]) -> AppResult<Principal> {
    state.gate.verify(session_token(headers).as_deref(), required)
}

fn store_fault(e: StoreError) -> AppError {
    error!("store operation failed: {e}");
    AppError::internal("store_failed", "internal server error")
}

async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    state.gate.register(&payload)?;
    Ok((StatusCode::CREATED, Json(json!({"status":"ok","msg":"account created"}))))
}

async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let resp = state.gate.login(&payload)?;
    let mut headers = HeaderMap::new();
    headers.insert("Set-Cookie", set_token_cookie(&resp.token));
    Ok((StatusCode::OK, headers, Json(json!({"status":"ok","user": resp.account}))))
}

async fn me(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let principal = verify(&state, &headers, &[])?;
    let profile = state.gate.identity(&principal)?;
    Ok(Json(profile))
}

async fn logout() -> impl IntoResponse {
    // Tokens are not tracked server-side, so an already-issued token stays
    // valid until its natural expiry; logout only tells the client to drop
    // its copy.
    let mut h = HeaderMap::new();
    h.insert("Set-Cookie", clear_token_cookie());
    (StatusCode::OK, h, Json(json!({"status":"ok","message":"logged out"})))
}

async fn update_profile(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<impl IntoResponse, AppError> {
    let principal = verify(&state, &headers, &[])?;
    let profile = state.gate.update_profile(&principal, &payload)?;
    Ok(Json(profile))
}

#[derive(Debug, Deserialize)]
struct CreateEventPayload {
    title: String,
    #[serde(default)]
    description: String,
    location: String,
    starts_at: DateTime<Utc>,
}

async fn create_event(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CreateEventPayload>,
) -> Result<impl IntoResponse, AppError> {
    let principal = verify(&state, &headers, &[Role::Admin])?;
    let mut fields = Vec::new();
    if payload.title.trim().chars().count() < 3 {
        fields.push(FieldError::new("title", "must be at least 3 characters"));
    }
    if payload.location.trim().is_empty() {
        fields.push(FieldError::new("location", "is required"));
    }
    if !fields.is_empty() {
        return Err(AppError::validation(fields));
    }
    let event = state.store.events.insert(Event {
        id: Uuid::new_v4(),
        title: payload.title.trim().to_string(),
        description: payload.description,
        location: payload.location.trim().to_string(),
        starts_at: payload.starts_at,
        created_by: principal.account_id,
        attendees: Vec::new(),
        created_at: Utc::now(),
    }).map_err(store_fault)?;
    Ok((StatusCode::CREATED, Json(event)))
}

async fn list_events(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    verify(&state, &headers, &[])?;
    Ok(Json(state.store.events.list()))
}

async fn rsvp(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let principal = verify(&state, &headers, &[])?;
    let event = state.store.events.rsvp(id, principal.account_id).map_err(|e| match e {
        StoreError::NotFound => AppError::not_found("event_missing", "event does not exist"),
        other => store_fault(other),
    })?;
    Ok(Json(event))
}

#[derive(Debug, Deserialize)]
struct CreateDonationPayload {
    amount_cents: i64,
    #[serde(default)]
    note: Option<String>,
}

async fn create_donation(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CreateDonationPayload>,
) -> Result<impl IntoResponse, AppError> {
    let principal = verify(&state, &headers, &[])?;
    if payload.amount_cents <= 0 {
        return Err(AppError::validation(vec![FieldError::new(
            "amount_cents",
            "must be a positive amount",
        )]));
    }
    // Payment collection is an external collaborator that always succeeds in
    // this deployment, so the record lands as completed.
    let donation = state.store.donations.insert(Donation {
        id: Uuid::new_v4(),
        donor_id: principal.account_id,
        amount_cents: payload.amount_cents,
        note: payload.note,
        status: "completed".into(),
        created_at: Utc::now(),
    }).map_err(store_fault)?;
    Ok((StatusCode::CREATED, Json(donation)))
}

async fn list_donations(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    verify(&state, &headers, &[Role::Admin])?;
    Ok(Json(state.store.donations.list_all()))
}

async fn my_donations(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let principal = verify(&state, &headers, &[])?;
    Ok(Json(state.store.donations.list_by_donor(principal.account_id)))
}

async fn alumni_directory(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    verify(&state, &headers, &[])?;
    let profiles: Vec<_> = state.store.accounts.list_by_role(Role::Alumni)
        .iter()
        .map(|a| a.profile())
        .collect();
    Ok(Json(profiles))
}

async fn student_directory(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    verify(&state, &headers, &[Role::Admin, Role::Student])?;
    let profiles: Vec<_> = state.store.accounts.list_by_role(Role::Student)
        .iter()
        .map(|a| a.profile())
        .collect();
    Ok(Json(profiles))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers_with(name: &'static str, value: &str) -> HeaderMap {
        let mut h = HeaderMap::new();
        h.insert(name, HeaderValue::from_str(value).unwrap());
        h
    }

    #[test]
    fn cookie_parsing_picks_the_named_cookie() {
        let h = headers_with("cookie", "theme=dark; token=abc.def.ghi; lang=en");
        assert_eq!(parse_cookie(&h, "token").as_deref(), Some("abc.def.ghi"));
        assert_eq!(parse_cookie(&h, "missing"), None);
    }

    #[test]
    fn bearer_header_is_a_fallback() {
        let h = headers_with("authorization", "Bearer abc.def.ghi");
        assert_eq!(session_token(&h).as_deref(), Some("abc.def.ghi"));
        assert_eq!(session_token(&HeaderMap::new()), None);
    }

    #[test]
    fn cookie_wins_over_bearer_header() {
        let mut h = headers_with("cookie", "token=from-cookie");
        h.insert("authorization", HeaderValue::from_static("Bearer from-header"));
        assert_eq!(session_token(&h).as_deref(), Some("from-cookie"));
    }

    #[test]
    fn session_cookie_is_http_only() {
        let v = set_token_cookie("abc");
        let s = v.to_str().unwrap();
        assert!(s.starts_with("token=abc"));
        assert!(s.contains("HttpOnly"));
        let cleared = clear_token_cookie().to_str().unwrap().to_string();
        assert!(cleared.contains("Expires=Thu, 01 Jan 1970"));
    }
}

use crate::middleware::identity::Identity;
use crate::state::AppState;
use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use promisance_jot::ROLE_AUTHENTICATED;
use serde_json::json;
use std::sync::Arc;

pub async fn healthz() -> Json<serde_json::Value> {
    Json(json!({ "ok": true, "service": "promisance-server" }))
}

pub async fn whoami(identity: Identity) -> Json<serde_json::Value> {
    Json(json!({
        "authenticated": identity.authenticated,
        "user_id": identity.payload.user_id,
        "empire_id": identity.payload.empire_id,
        "roles": identity.payload.roles,
    }))
}

/// Re-issue the caller's token from the currently preferred signer.
pub async fn session_refresh(
    State(state): State<Arc<AppState>>,
    identity: Identity,
) -> Result<Response, StatusCode> {
    if !identity.authenticated {
        return Err(StatusCode::UNAUTHORIZED);
    }

    // granted on resolution, not stored in the token
    let mut payload = identity.payload;
    payload.roles.revoke(ROLE_AUTHENTICATED);
    let user_id = payload.user_id;

    let cookie = state.factory.new_session_cookie(payload).map_err(|e| {
        tracing::warn!(user_id, error = %e, "session refresh failed");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    let mut headers = HeaderMap::new();
    cookie.append_to(&mut headers).map_err(|e| {
        tracing::warn!(user_id, error = %e, "session cookie rejected");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    tracing::debug!(user_id, expires = %cookie.expires, "session refreshed");
    Ok((headers, Json(json!({ "expires": cookie.expires.to_rfc3339() }))).into_response())
}

/// Clear the token cookie and every legacy session cookie.
pub async fn logout(State(state): State<Arc<AppState>>) -> Result<(StatusCode, HeaderMap), StatusCode> {
    let mut headers = HeaderMap::new();
    state.factory.destroy(&mut headers).map_err(|e| {
        tracing::warn!(error = %e, "logout cookies rejected");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;
    Ok((StatusCode::NO_CONTENT, headers))
}

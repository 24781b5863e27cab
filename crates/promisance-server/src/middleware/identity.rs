use crate::state::AppState;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use promisance_jot::Payload;
use serde::Serialize;
use std::convert::Infallible;
use std::sync::Arc;

/// The caller's resolved identity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub payload: Payload,
    pub authenticated: bool,
}

impl Identity {
    pub fn anonymous() -> Self {
        Self {
            payload: Payload::anonymous(),
            authenticated: false,
        }
    }
}

/// Resolve the request's token into an [`Identity`] and store it in the
/// request extensions.
///
/// Never rejects: a missing or invalid token yields the anonymous identity
/// and the request continues to the next stage.
pub async fn resolve_identity(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Response {
    let (payload, authenticated) = state.factory.payload_from_request(req.headers());
    req.extensions_mut().insert(Identity {
        payload,
        authenticated,
    });
    next.run(req).await
}

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<Identity>()
            .cloned()
            .unwrap_or_else(Identity::anonymous))
    }
}

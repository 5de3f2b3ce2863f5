//! Caller identity middleware

use axum::{
    body::Body,
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use lumi_core::api::USER_ID_HEADER;
use uuid::Uuid;

use crate::error::{ApiError, Result};
use crate::AppState;

/// Caller identity stored in request extensions
#[derive(Clone, Copy, Debug)]
pub struct CurrentUser {
    pub user_id: Uuid,
}

/// Identity middleware - extracts the user id from the `X-User-Id` header
pub async fn identity_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response> {
    let header = request
        .headers()
        .get(USER_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("Missing X-User-Id header".to_string()))?;

    let user_id = Uuid::parse_str(header.trim())
        .map_err(|_| ApiError::Unauthorized("Invalid X-User-Id header".to_string()))?;

    // Rows reference users(id), so the owner must exist before any write
    state.db.ensure_user(user_id).await?;

    request.extensions_mut().insert(CurrentUser { user_id });

    Ok(next.run(request).await)
}

use axum::{
    extract::{FromRequestParts, Path},
    http::{request::Parts, StatusCode},
};
use std::collections::HashMap;
use crate::state::AppState;
use std::sync::Arc;

/// Resort scope from the path. Resorts themselves are managed by the
/// surrounding platform; this service only scopes its records by the id.
pub struct ResortId(pub String);

impl FromRequestParts<Arc<AppState>> for ResortId {
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, state: &Arc<AppState>) -> Result<Self, Self::Rejection> {
        let params: Path<HashMap<String, String>> = Path::from_request_parts(parts, state)
            .await
            .map_err(|_| StatusCode::BAD_REQUEST)?;

        let resort_id = params.get("resort_id").ok_or(StatusCode::BAD_REQUEST)?;

        Ok(ResortId(resort_id.clone()))
    }
}

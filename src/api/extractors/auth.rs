use axum::{
    extract::{FromRequestParts, FromRef},
    http::{header, request::Parts, StatusCode},
};
use crate::state::AppState;
use crate::domain::models::auth::Claims;
use std::sync::Arc;
use jsonwebtoken::{decode, DecodingKey, Validation};
use tracing::Span;

/// Staff caller identity, consumed as an opaque capability: a bearer token
/// minted elsewhere, verified here with the shared secret.
pub struct AuthStaff(pub Claims);

impl<S> FromRequestParts<S> for AuthStaff
where
    S: Send + Sync,
    Arc<AppState>: FromRef<S>,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let header_value = parts.headers.get(header::AUTHORIZATION)
            .ok_or(StatusCode::UNAUTHORIZED)?
            .to_str()
            .map_err(|_| StatusCode::UNAUTHORIZED)?;

        let token = header_value.strip_prefix("Bearer ")
            .ok_or(StatusCode::UNAUTHORIZED)?;

        let app_state = <Arc<AppState> as FromRef<S>>::from_ref(state);

        let decoding_key = DecodingKey::from_secret(app_state.config.jwt_secret.as_bytes());

        let token_data = decode::<Claims>(token, &decoding_key, &Validation::default())
            .map_err(|_| StatusCode::UNAUTHORIZED)?;

        Span::current().record("resort_id", &token_data.claims.resort_id);
        Span::current().record("user_id", &token_data.claims.sub);

        Ok(AuthStaff(token_data.claims))
    }
}

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tracing::warn;

use crate::{
    auth::{
        jwt::JwtKeys,
        repo::{Role, User},
    },
    error::ApiError,
    state::AppState,
};

/// Authenticated caller, resolved to a live user record.
///
/// Extraction fails with 401 when the Authorization header is missing or not
/// `Bearer <token>`, the token does not verify, the encoded user no longer
/// exists, or the account is deactivated.
pub struct CurrentUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                ApiError::Auth("Not authorized to access this route. Please login.".into())
            })?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            ApiError::Auth("Not authorized to access this route. Please login.".into())
        })?;

        let keys = JwtKeys::from_ref(state);
        let claims = keys.verify(token).map_err(|_| {
            warn!("invalid or expired token");
            ApiError::Auth("Not authorized, token failed".into())
        })?;

        let user = User::find_by_id(&state.db, claims.sub)
            .await?
            .ok_or_else(|| ApiError::Auth("User not found".into()))?;

        if !user.is_active {
            warn!(user_id = %user.id, "deactivated account rejected");
            return Err(ApiError::Auth("Account is deactivated".into()));
        }

        Ok(CurrentUser(user))
    }
}

impl CurrentUser {
    /// Role gate, composed after authentication by construction.
    pub fn authorize(&self, allowed: &[Role]) -> Result<(), ApiError> {
        if allowed.contains(&self.0.role) {
            Ok(())
        } else {
            Err(ApiError::Forbidden(format!(
                "User role '{}' is not authorized to access this route",
                self.0.role
            )))
        }
    }
}

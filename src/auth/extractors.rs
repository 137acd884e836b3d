use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::extract::cookie::CookieJar;
use tracing::warn;

use super::{claims::Claims, jwt::SessionKeys, repo_types::Role};
use crate::{config::CookieConfig, error::ApiError, state::AppState};

/// Any caller holding a valid session cookie.
pub struct Session(pub Claims);

/// A caller whose session carries the admin role.
pub struct AdminSession(pub Claims);

impl FromRef<AppState> for CookieConfig {
    fn from_ref(state: &AppState) -> Self {
        state.config.cookie.clone()
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
    SessionKeys: FromRef<S>,
    CookieConfig: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let cookie_cfg = CookieConfig::from_ref(state);
        let jar = CookieJar::from_headers(&parts.headers);
        let token = jar
            .get(&cookie_cfg.name)
            .map(|c| c.value().to_owned())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ApiError::Unauthorized("Not authenticated".into()))?;

        let keys = SessionKeys::from_ref(state);
        match keys.verify(&token) {
            Ok(claims) => Ok(Session(claims)),
            Err(e) => {
                warn!(error = %e, "invalid or expired session token");
                Err(ApiError::Unauthorized("Invalid or expired session".into()))
            }
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AdminSession
where
    S: Send + Sync,
    SessionKeys: FromRef<S>,
    CookieConfig: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Session(claims) = Session::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::Unauthorized("Unauthorized".into()))?;
        if claims.role != Role::Admin {
            warn!(user_id = %claims.sub, role = %claims.role, "admin role required");
            return Err(ApiError::Unauthorized("Unauthorized".into()));
        }
        Ok(AdminSession(claims))
    }
}

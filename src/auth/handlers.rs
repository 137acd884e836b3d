use axum::{
    extract::{rejection::JsonRejection, State},
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use tracing::{info, instrument};

use crate::{
    auth::{
        dto::{LoginResponse, MeResponse, MessageResponse, PublicUser, RequestOtpRequest, VerifyOtpRequest},
        extractors::Session,
        services,
    },
    config::AppConfig,
    error::ApiResult,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/request-otp", post(request_otp))
        .route("/auth/verify-otp", post(verify_otp))
        .route("/auth/logout", post(logout))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/auth/me", get(get_me))
}

fn session_cookie(cfg: &AppConfig, token: String) -> Cookie<'static> {
    Cookie::build((cfg.cookie.name.clone(), token))
        .http_only(true)
        .secure(cfg.cookie.secure)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(time::Duration::minutes(cfg.jwt.ttl_minutes))
        .build()
}

#[instrument(skip(state, payload))]
pub async fn request_otp(
    State(state): State<AppState>,
    payload: Result<Json<RequestOtpRequest>, JsonRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let Json(payload) = payload?;
    services::request_otp(&state, &payload.email).await?;
    Ok(Json(MessageResponse::new("OTP sent successfully to your email")))
}

#[instrument(skip(state, jar, payload))]
pub async fn verify_otp(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: Result<Json<VerifyOtpRequest>, JsonRejection>,
) -> ApiResult<(CookieJar, Json<LoginResponse>)> {
    let Json(payload) = payload?;
    let login = services::verify_otp(&state, &payload.email, &payload.otp).await?;
    let user = PublicUser::from(login.provisioned.user());
    let jar = jar.add(session_cookie(&state.config, login.token));
    Ok((
        jar,
        Json(LoginResponse {
            message: "Login successful".into(),
            user,
        }),
    ))
}

#[instrument(skip(state, jar))]
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> (CookieJar, Json<MessageResponse>) {
    let jar = jar.remove(Cookie::build((state.config.cookie.name.clone(), "")).path("/"));
    info!("session cookie cleared");
    (jar, Json(MessageResponse::new("Logged out successfully")))
}

#[instrument(skip(session))]
pub async fn get_me(session: Session) -> Json<MeResponse> {
    let Session(claims) = session;
    Json(MeResponse {
        user: claims.into(),
    })
}

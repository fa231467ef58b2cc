use crate::domain::user::Registration;
use crate::error::MarketError;
use crate::infrastructure::session::SESSION_COOKIE;
use crate::interfaces::http::AppState;
use crate::interfaces::http::extract::{AuthUser, JsonBody};
use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::http::header::SET_COOKIE;
use axum::response::IntoResponse;
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

pub async fn register(
    State(state): State<AppState>,
    JsonBody(registration): JsonBody<Registration>,
) -> Result<impl IntoResponse, MarketError> {
    let user = state.market.register(registration).await?;
    Ok((StatusCode::CREATED, Json(json!({ "user": user }))))
}

pub async fn login(
    State(state): State<AppState>,
    JsonBody(credentials): JsonBody<Credentials>,
) -> Result<impl IntoResponse, MarketError> {
    let (user, session) = state
        .market
        .login(&credentials.email, &credentials.password)
        .await?;
    let max_age = state.market.sessions().max_age().num_seconds();
    let cookie = format!(
        "{SESSION_COOKIE}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age}",
        session.token
    );
    Ok((
        [(SET_COOKIE, cookie)],
        Json(json!({
            "user": user,
            "token": session.token,
            "expiresAt": session.expires_at,
        })),
    ))
}

/// Sessions are stateless, so signing out only drops the cookie.
pub async fn logout() -> impl IntoResponse {
    let cookie = format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0");
    (
        [(SET_COOKIE, cookie)],
        Json(json!({ "message": "Signed out" })),
    )
}

pub async fn session(AuthUser(principal): AuthUser) -> impl IntoResponse {
    Json(json!({ "user": principal.user.view() }))
}

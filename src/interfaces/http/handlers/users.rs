use crate::application::UserQuery;
use crate::domain::page::PageRequest;
use crate::domain::user::UserUpdate;
use crate::error::MarketError;
use crate::interfaces::http::extract::{AuthUser, JsonBody, QueryParams, parse_id};
use crate::interfaces::http::{AppState, page_body};
use axum::Json;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use serde_json::json;

pub async fn list_users(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    QueryParams(query): QueryParams<UserQuery>,
    QueryParams(page): QueryParams<PageRequest>,
) -> Result<impl IntoResponse, MarketError> {
    let users = state.market.list_users(&principal, &query, page).await?;
    Ok(page_body("users", users))
}

pub async fn get_user(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, MarketError> {
    let user = state
        .market
        .get_user(&principal, parse_id(&id, "User")?)
        .await?;
    Ok(Json(json!({ "user": user })))
}

pub async fn update_user(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path(id): Path<String>,
    JsonBody(update): JsonBody<UserUpdate>,
) -> Result<impl IntoResponse, MarketError> {
    let user = state
        .market
        .update_user(&principal, parse_id(&id, "User")?, update)
        .await?;
    Ok(Json(json!({ "user": user })))
}

pub async fn deactivate_user(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, MarketError> {
    state
        .market
        .deactivate_user(&principal, parse_id(&id, "User")?)
        .await?;
    Ok(Json(json!({ "message": "User deactivated successfully" })))
}

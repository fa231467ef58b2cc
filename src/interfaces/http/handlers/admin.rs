use crate::domain::order::OrderQuery;
use crate::domain::page::PageRequest;
use crate::error::MarketError;
use crate::interfaces::http::extract::{AuthUser, JsonBody, QueryParams, parse_id};
use crate::interfaces::http::{AppState, page_body};
use axum::Json;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use serde::Deserialize;
use serde_json::json;

/// `{"action": "approve"}` and friends.
#[derive(Debug, Deserialize)]
pub struct ActionRequest {
    pub action: String,
}

pub async fn list_users(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
) -> Result<impl IntoResponse, MarketError> {
    let users = state.market.admin_users(&principal).await?;
    Ok(Json(json!({ "users": users })))
}

pub async fn user_action(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path(id): Path<String>,
    JsonBody(request): JsonBody<ActionRequest>,
) -> Result<impl IntoResponse, MarketError> {
    let user = state
        .market
        .admin_user_action(&principal, parse_id(&id, "User")?, &request.action)
        .await?;
    Ok(Json(json!({ "user": user })))
}

pub async fn list_orders(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    QueryParams(query): QueryParams<OrderQuery>,
    QueryParams(page): QueryParams<PageRequest>,
) -> Result<impl IntoResponse, MarketError> {
    let orders = state.market.admin_orders(&principal, &query, page).await?;
    Ok(page_body("orders", orders))
}

pub async fn order_action(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path(id): Path<String>,
    JsonBody(request): JsonBody<ActionRequest>,
) -> Result<impl IntoResponse, MarketError> {
    let order = state
        .market
        .admin_order_action(&principal, parse_id(&id, "Order")?, &request.action)
        .await?;
    Ok(Json(json!({ "order": order })))
}

pub async fn stats(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
) -> Result<impl IntoResponse, MarketError> {
    Ok(Json(state.market.admin_stats(&principal).await?))
}

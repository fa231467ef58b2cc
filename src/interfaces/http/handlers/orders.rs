use crate::domain::order::{OrderDraft, OrderQuery, OrderStatusUpdate};
use crate::domain::page::PageRequest;
use crate::error::MarketError;
use crate::interfaces::http::extract::{AuthUser, JsonBody, QueryParams, parse_id};
use crate::interfaces::http::{AppState, page_body};
use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

pub async fn list_orders(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    QueryParams(query): QueryParams<OrderQuery>,
    QueryParams(page): QueryParams<PageRequest>,
) -> Result<impl IntoResponse, MarketError> {
    let orders = state.market.list_orders(&principal, &query, page).await?;
    Ok(page_body("orders", orders))
}

pub async fn place_order(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    JsonBody(draft): JsonBody<OrderDraft>,
) -> Result<impl IntoResponse, MarketError> {
    let order = state.market.place_order(&principal, draft).await?;
    Ok((StatusCode::CREATED, Json(json!({ "order": order }))))
}

pub async fn get_order(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, MarketError> {
    let order = state
        .market
        .get_order(&principal, parse_id(&id, "Order")?)
        .await?;
    Ok(Json(json!({ "order": order })))
}

pub async fn update_order_status(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path(id): Path<String>,
    JsonBody(update): JsonBody<OrderStatusUpdate>,
) -> Result<impl IntoResponse, MarketError> {
    let order = state
        .market
        .update_order_status(&principal, parse_id(&id, "Order")?, update)
        .await?;
    Ok(Json(json!({ "order": order })))
}

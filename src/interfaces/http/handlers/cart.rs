use crate::domain::cart::{AddToCart, UpdateCartItem};
use crate::error::MarketError;
use crate::interfaces::http::AppState;
use crate::interfaces::http::extract::{AuthUser, JsonBody, parse_id};
use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

pub async fn view_cart(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
) -> Result<impl IntoResponse, MarketError> {
    Ok(Json(state.market.cart(&principal).await?))
}

pub async fn add_to_cart(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    JsonBody(request): JsonBody<AddToCart>,
) -> Result<impl IntoResponse, MarketError> {
    let item = state.market.add_to_cart(&principal, request).await?;
    Ok((StatusCode::CREATED, Json(json!({ "item": item }))))
}

pub async fn update_cart_item(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path(id): Path<String>,
    JsonBody(update): JsonBody<UpdateCartItem>,
) -> Result<impl IntoResponse, MarketError> {
    let item = state
        .market
        .update_cart_item(&principal, parse_id(&id, "Cart item")?, update.quantity)
        .await?;
    Ok(Json(json!({ "item": item })))
}

pub async fn remove_cart_item(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, MarketError> {
    state
        .market
        .remove_cart_item(&principal, parse_id(&id, "Cart item")?)
        .await?;
    Ok(Json(json!({ "message": "Item removed from cart" })))
}

pub async fn clear_cart(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
) -> Result<impl IntoResponse, MarketError> {
    state.market.clear_cart(&principal).await?;
    Ok(Json(json!({ "message": "Cart cleared" })))
}

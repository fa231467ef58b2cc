use crate::domain::catalog::{CategoryDraft, ProductDraft, ProductQuery};
use crate::domain::page::PageRequest;
use crate::error::MarketError;
use crate::interfaces::http::extract::{AuthUser, JsonBody, QueryParams, parse_id};
use crate::interfaces::http::{AppState, page_body};
use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, MarketError> {
    let categories = state.market.list_categories().await?;
    Ok(Json(json!({ "categories": categories })))
}

pub async fn create_category(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    JsonBody(draft): JsonBody<CategoryDraft>,
) -> Result<impl IntoResponse, MarketError> {
    let category = state.market.create_category(&principal, draft).await?;
    Ok((StatusCode::CREATED, Json(json!({ "category": category }))))
}

pub async fn list_products(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<ProductQuery>,
    QueryParams(page): QueryParams<PageRequest>,
) -> Result<impl IntoResponse, MarketError> {
    let products = state.market.list_products(&query, page).await?;
    Ok(page_body("products", products))
}

pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, MarketError> {
    let product = state
        .market
        .get_product(parse_id(&id, "Product")?)
        .await?;
    Ok(Json(json!({ "product": product })))
}

pub async fn create_product(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    JsonBody(draft): JsonBody<ProductDraft>,
) -> Result<impl IntoResponse, MarketError> {
    let product = state.market.create_product(&principal, draft).await?;
    Ok((StatusCode::CREATED, Json(json!({ "product": product }))))
}

pub async fn update_product(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path(id): Path<String>,
    JsonBody(draft): JsonBody<ProductDraft>,
) -> Result<impl IntoResponse, MarketError> {
    let product = state
        .market
        .update_product(&principal, parse_id(&id, "Product")?, draft)
        .await?;
    Ok(Json(json!({ "product": product })))
}

pub async fn delete_product(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, MarketError> {
    state
        .market
        .delete_product(&principal, parse_id(&id, "Product")?)
        .await?;
    Ok(Json(json!({ "message": "Product deleted successfully" })))
}

use crate::domain::invoice::{InvoiceDraft, InvoiceQuery};
use crate::domain::page::PageRequest;
use crate::error::MarketError;
use crate::interfaces::http::extract::{AuthUser, JsonBody, QueryParams};
use crate::interfaces::http::{AppState, page_body};
use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

pub async fn list_invoices(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    QueryParams(query): QueryParams<InvoiceQuery>,
    QueryParams(page): QueryParams<PageRequest>,
) -> Result<impl IntoResponse, MarketError> {
    let invoices = state.market.list_invoices(&principal, &query, page).await?;
    Ok(page_body("invoices", invoices))
}

pub async fn create_invoice(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    JsonBody(draft): JsonBody<InvoiceDraft>,
) -> Result<impl IntoResponse, MarketError> {
    let invoice = state.market.create_invoice(&principal, draft).await?;
    Ok((StatusCode::CREATED, Json(json!({ "invoice": invoice }))))
}

pub async fn invoice_summary(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
) -> Result<impl IntoResponse, MarketError> {
    Ok(Json(state.market.invoice_summary(&principal).await?))
}

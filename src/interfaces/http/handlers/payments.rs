use crate::error::MarketError;
use crate::interfaces::http::AppState;
use crate::interfaces::http::extract::{AuthUser, JsonBody, parse_id};
use axum::Json;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeRequest {
    pub order_id: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    #[serde(default)]
    pub reference: String,
}

pub async fn initialize(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    JsonBody(request): JsonBody<InitializeRequest>,
) -> Result<impl IntoResponse, MarketError> {
    let order_id = parse_id(&request.order_id, "Order")?;
    Ok(Json(
        state.market.initialize_payment(&principal, order_id).await?,
    ))
}

/// Reached by the gateway redirect as well as the buyer, so no session is required.
pub async fn verify(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<VerifyRequest>,
) -> Result<impl IntoResponse, MarketError> {
    Ok(Json(state.market.verify_payment(&request.reference).await?))
}

pub async fn get_payment(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path(reference): Path<String>,
) -> Result<impl IntoResponse, MarketError> {
    let payment = state.market.get_payment(&principal, &reference).await?;
    Ok(Json(json!({ "payment": payment })))
}

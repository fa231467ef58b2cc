//! JSON API over the marketplace.
//!
//! Routes live under `/api`, except `/health`. Handlers stay thin: they
//! pull ids, bodies and the caller out of the request and hand them to
//! `Marketplace`; `MarketError` renders every failure.

pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;

use crate::application::Marketplace;
use crate::domain::page::Paginated;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, patch, post, put};
use axum::{Json, Router, middleware::from_fn};
use handlers::{admin, auth, billing, cart, catalog, orders, payments, users};
use serde::Serialize;
use serde_json::{Value, json};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub market: Arc<Marketplace>,
}

impl AppState {
    pub fn new(market: Marketplace) -> Self {
        Self {
            market: Arc::new(market),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/session", get(auth::session))
        .route(
            "/categories",
            get(catalog::list_categories).post(catalog::create_category),
        )
        .route(
            "/products",
            get(catalog::list_products).post(catalog::create_product),
        )
        .route(
            "/products/:id",
            get(catalog::get_product)
                .put(catalog::update_product)
                .delete(catalog::delete_product),
        )
        .route(
            "/cart",
            get(cart::view_cart)
                .post(cart::add_to_cart)
                .delete(cart::clear_cart),
        )
        .route(
            "/cart/:id",
            put(cart::update_cart_item).delete(cart::remove_cart_item),
        )
        .route("/orders", get(orders::list_orders).post(orders::place_order))
        .route(
            "/orders/:id",
            get(orders::get_order).put(orders::update_order_status),
        )
        .route(
            "/invoices",
            get(billing::list_invoices).post(billing::create_invoice),
        )
        .route("/invoices/summary", get(billing::invoice_summary))
        .route("/payments/initialize", post(payments::initialize))
        .route("/payments/verify", post(payments::verify))
        .route("/payments/:reference", get(payments::get_payment))
        .route("/admin/users", get(admin::list_users))
        .route("/admin/users/:id", patch(admin::user_action))
        .route("/admin/orders", get(admin::list_orders))
        .route("/admin/orders/:id", patch(admin::order_action))
        .route("/admin/stats", get(admin::stats))
        .route("/users", get(users::list_users))
        .route(
            "/users/:id",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::deactivate_user),
        );

    Router::new()
        .route("/health", get(health))
        .nest("/api", api)
        .fallback(not_found)
        .layer(from_fn(middleware::request_tracing))
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "Not found" })))
}

/// `{"<key>": [...], "pagination": {...}}`
pub(crate) fn page_body<T: Serialize>(key: &str, page: Paginated<T>) -> Json<Value> {
    Json(json!({ key: page.items, "pagination": page.pagination }))
}

#![allow(dead_code)]

use procura::application::{Marketplace, MarketplaceConfig};
use procura::domain::ports::{PaymentGatewayRef, Stores, UserStore};
use procura::domain::user::{User, UserRole, UserStatus};
use procura::infrastructure::in_memory::InMemoryStore;
use procura::infrastructure::password::PasswordHasher;
use procura::infrastructure::sandbox::SandboxGateway;
use procura::infrastructure::session::SessionSigner;
use procura::interfaces::http::{AppState, build_router};
use reqwest::{Method, StatusCode};
use serde_json::{Value, json};
use std::sync::Arc;
use tokio::net::TcpListener;

pub const PASSWORD: &str = "password123";

/// A router served on an ephemeral port, backed by memory and the sandbox gateway.
pub struct TestApp {
    pub base: String,
    pub client: reqwest::Client,
    pub store: InMemoryStore,
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with(Arc::new(SandboxGateway::new("http://localhost:3000"))).await
}

pub async fn spawn_app_with(gateway: PaymentGatewayRef) -> TestApp {
    let store = InMemoryStore::new();
    let market = Marketplace::new(
        Stores::from_adapter(store.clone()),
        gateway,
        SessionSigner::new("integration-secret").unwrap(),
        MarketplaceConfig {
            public_url: "http://localhost:3000".into(),
            password_cost: 4,
        },
    );

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, build_router(AppState::new(market)))
            .await
            .unwrap();
    });

    TestApp {
        base: format!("http://{addr}"),
        client: reqwest::Client::new(),
        store,
    }
}

impl TestApp {
    /// Inserts an active account straight into the store, bypassing
    /// self-registration (which cannot create admin or finance users).
    pub async fn seed_user(&self, role: UserRole) -> String {
        let email = format!("{}@procura.test", uuid::Uuid::new_v4());
        let mut user = User::new(format!("{role:?} user"), &email, role);
        user.status = UserStatus::Active;
        user.password_hash = Some(PasswordHasher::new(4).hash(PASSWORD).await.unwrap());
        assert!(UserStore::insert(&self.store, user).await.unwrap());
        email
    }

    pub async fn login(&self, email: &str) -> String {
        let (status, body) = self
            .call(
                Method::POST,
                "/api/auth/login",
                None,
                Some(json!({ "email": email, "password": PASSWORD })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {body}");
        body["token"].as_str().unwrap().to_string()
    }

    /// Seeds a user of `role` and returns its bearer token.
    pub async fn token_for(&self, role: UserRole) -> String {
        let email = self.seed_user(role).await;
        self.login(&email).await
    }

    pub async fn call(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut request = self.client.request(method, format!("{}{}", self.base, path));
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(&body);
        }
        let response = request.send().await.unwrap();
        let status = response.status();
        let body = response.json::<Value>().await.unwrap_or(Value::Null);
        (status, body)
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.call(Method::GET, path, token, None).await
    }

    pub async fn post(&self, path: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.call(Method::POST, path, token, Some(body)).await
    }

    /// Creates a category as admin and a product owned by `supplier`.
    pub async fn listed_product(&self, supplier: &str, sku: &str, stock: u32) -> Value {
        let admin = self.token_for(UserRole::Admin).await;
        let (status, category) = self
            .post(
                "/api/categories",
                Some(&admin),
                json!({ "name": format!("Category {sku}") }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{category}");

        let (status, product) = self
            .post(
                "/api/products",
                Some(supplier),
                json!({
                    "name": format!("Product {sku}"),
                    "price": "100.00",
                    "sku": sku,
                    "stock": stock,
                    "categoryId": category["category"]["id"],
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{product}");
        product["product"].clone()
    }
}

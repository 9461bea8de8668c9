use std::sync::Arc;

use auth::LockoutPolicy;
use auth::PasswordHasher;
use auth::TokenIssuer;
use bcard_service::domain::card::service::CardService;
use bcard_service::domain::clock::ManualClock;
use bcard_service::domain::user::models::UserId;
use bcard_service::domain::user::ports::UserServicePort;
use bcard_service::domain::user::service::UserService;
use bcard_service::inbound::http::router::create_router;
use bcard_service::inbound::http::router::AppState;
use bcard_service::outbound::repositories::InMemoryRepository;
use chrono::Utc;
use serde_json::json;
use serde_json::Value;

pub const TEST_SECRET: &[u8] = b"test-secret-key-for-jwt-signing-at-least-32-bytes";
pub const PASSWORD: &str = "Str0ng!pass";

/// Test application that spawns a real server over in-memory storage.
///
/// Lockout uses a threshold of 3 and a one hour lock; time only moves
/// through `clock`.
pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub api_client: reqwest::Client,
    pub user_service: Arc<UserService<InMemoryRepository>>,
    pub clock: Arc<ManualClock>,
}

impl TestApp {
    /// Spawn the application in a background task and return TestApp
    pub async fn spawn() -> Self {
        // Use random port (0 = OS assigns)
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let repository = Arc::new(InMemoryRepository::new());
        let token_issuer = Arc::new(TokenIssuer::with_default_lifetime(TEST_SECRET));
        let clock = Arc::new(ManualClock::new(Utc::now()));

        let user_service = Arc::new(UserService::new(
            Arc::clone(&repository),
            Arc::clone(&token_issuer),
            PasswordHasher::with_cost(1).expect("Failed to build hasher"),
            LockoutPolicy::new(3, 1).expect("Failed to build lockout policy"),
            clock.clone(),
        ));

        let state = AppState {
            user_service: user_service.clone(),
            card_service: Arc::new(CardService::new(repository, clock.clone())),
            token_issuer,
            clock: clock.clone(),
            environment: "test".to_string(),
        };
        let router = create_router(state, &["http://localhost:3000".to_string()]);

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server error");
        });

        Self {
            address,
            port,
            api_client: reqwest::Client::new(),
            user_service,
            clock,
        }
    }

    /// Helper to make GET request
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(format!("{}{}", self.address, path))
    }

    /// Helper to make POST request
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(format!("{}{}", self.address, path))
    }

    /// Helper to make GET request with Bearer token
    pub fn get_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.get(path).bearer_auth(token)
    }

    /// Helper to make POST request with Bearer token
    pub fn post_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.post(path).bearer_auth(token)
    }

    /// Helper to make PUT request with Bearer token
    pub fn put_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.api_client
            .put(format!("{}{}", self.address, path))
            .bearer_auth(token)
    }

    /// Helper to make PATCH request with Bearer token
    pub fn patch_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.api_client
            .patch(format!("{}{}", self.address, path))
            .bearer_auth(token)
    }

    /// Helper to make DELETE request with Bearer token
    pub fn delete_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.api_client
            .delete(format!("{}{}", self.address, path))
            .bearer_auth(token)
    }

    /// Register a user and return `(id, token)`.
    pub async fn register(&self, email: &str, is_business: bool) -> (String, String) {
        let response = self
            .post("/api/users")
            .json(&registration(email, is_business))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status(), reqwest::StatusCode::CREATED);

        let body: Value = response.json().await.expect("Failed to parse response");
        (
            body["data"]["user"]["id"].as_str().unwrap().to_string(),
            body["data"]["token"].as_str().unwrap().to_string(),
        )
    }

    pub async fn login(&self, email: &str, password: &str) -> reqwest::Response {
        self.post("/api/users/login")
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Register an admin and return `(id, token)`; the token is issued after
    /// promotion so it carries the admin flag.
    pub async fn register_admin(&self, email: &str) -> (String, String) {
        let (id, _) = self.register(email, false).await;
        self.user_service
            .set_admin_status(&UserId::from_string(&id).unwrap(), true)
            .await
            .expect("Failed to promote user");

        let body: Value = self
            .login(email, PASSWORD)
            .await
            .json()
            .await
            .expect("Failed to parse response");
        (id, body["data"]["token"].as_str().unwrap().to_string())
    }
}

pub fn registration(email: &str, is_business: bool) -> Value {
    json!({
        "name": { "first": "Ada", "middle": "", "last": "Lovelace" },
        "phone": "0501234567",
        "email": email,
        "password": PASSWORD,
        "image": { "url": "", "alt": "" },
        "address": {
            "state": "",
            "country": "Israel",
            "city": "Tel Aviv",
            "street": "Dizengoff",
            "house_number": 50,
            "zip": "6433222"
        },
        "is_business": is_business
    })
}

pub fn card_body(title: &str) -> Value {
    json!({
        "title": title,
        "subtitle": "Fresh bread daily",
        "description": "Sourdough and pastries every morning",
        "phone": "0501234567",
        "email": "shop@example.com",
        "web": "https://shop.example.com",
        "image": { "url": "", "alt": "" },
        "address": {
            "country": "Israel",
            "city": "Haifa",
            "street": "Herzl",
            "house_number": 12
        }
    })
}

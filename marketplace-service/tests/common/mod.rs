//! Shared setup for marketplace-service integration tests.
//!
//! Each test gets its own throwaway database and a wiremock server standing
//! in for the Stripe API.

#![allow(dead_code)]

use marketplace_service::config::{
    Config, DatabaseConfig, JwtConfig, ServerConfig, StripeConfig, UploadConfig,
};
use marketplace_service::Application;
use secrecy::Secret;
use serde_json::{json, Value};
use uuid::Uuid;
use wiremock::MockServer;

pub const TEST_PASSWORD: &str = "correct horse battery";
pub const TEST_WEBHOOK_SECRET: &str = "whsec_test_secret";

pub struct TestApp {
    pub address: String,
    pub db: mongodb::Database,
    pub stripe_server: MockServer,
    pub upload_dir: std::path::PathBuf,
}

pub async fn spawn_app() -> TestApp {
    let stripe_server = MockServer::start().await;

    let db_url = std::env::var("TEST_MONGODB_URI")
        .unwrap_or_else(|_| "mongodb://localhost:27017".to_string());
    let db_name = format!("marketplace_test_{}", Uuid::new_v4().simple());

    let upload_dir = std::env::temp_dir()
        .join(format!("marketplace-uploads-{}", Uuid::new_v4().simple()))
        .to_string_lossy()
        .to_string();

    let config = Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        database: DatabaseConfig {
            url: Secret::new(db_url),
            db_name,
        },
        jwt: JwtConfig {
            secret: Secret::new("test-signing-secret".to_string()),
            expiry_minutes: 60,
        },
        stripe: StripeConfig {
            secret_key: Secret::new("sk_test_123".to_string()),
            webhook_secret: Secret::new(TEST_WEBHOOK_SECRET.to_string()),
            api_base_url: stripe_server.uri(),
        },
        uploads: UploadConfig {
            dir: upload_dir.clone(),
        },
        frontend_url: "http://localhost:5173".to_string(),
        service_name: "marketplace-service".to_string(),
    };

    let application = Application::build(config)
        .await
        .expect("Failed to build application");
    let address = format!("http://127.0.0.1:{}", application.port());
    let db = application.db();

    tokio::spawn(application.run_until_stopped());

    TestApp {
        address,
        db,
        stripe_server,
        upload_dir: upload_dir.into(),
    }
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    /// Fresh HTTP client with its own cookie store.
    pub fn client(&self) -> reqwest::Client {
        reqwest::Client::builder()
            .cookie_store(true)
            .build()
            .expect("Failed to build reqwest client")
    }

    pub async fn register_customer(&self, email: &str) {
        let response = self
            .client()
            .post(self.url("/auth/register/customer"))
            .json(&json!({
                "first_name": "Test",
                "last_name": "Customer",
                "email": email,
                "password": TEST_PASSWORD,
            }))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status().as_u16(), 201);
    }

    pub async fn register_seller(&self, store_name: &str, email: &str) {
        let response = self
            .client()
            .post(self.url("/auth/register/seller"))
            .json(&json!({
                "store_name": store_name,
                "email": email,
                "password": TEST_PASSWORD,
            }))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status().as_u16(), 201);
    }

    pub async fn register_admin(&self, email: &str) {
        let response = self
            .client()
            .post(self.url("/auth/register/admin"))
            .json(&json!({
                "first_name": "Test",
                "last_name": "Admin",
                "email": email,
                "password": TEST_PASSWORD,
            }))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status().as_u16(), 201);
    }

    /// Log in and return a client holding the session cookie.
    pub async fn login(&self, email: &str) -> reqwest::Client {
        let client = self.client();
        let response = client
            .post(self.url("/auth/login"))
            .json(&json!({ "email": email, "password": TEST_PASSWORD }))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status().as_u16(), 200);
        client
    }

    /// The authenticated account's id, via `/auth/me`.
    pub async fn account_id(&self, client: &reqwest::Client) -> String {
        let body: Value = client
            .get(self.url("/auth/me"))
            .send()
            .await
            .expect("Failed to execute request")
            .json()
            .await
            .expect("Failed to parse response");
        body["account"]["id"]
            .as_str()
            .expect("Account has no id")
            .to_string()
    }

    /// Create a shipping address for the logged-in customer, returning its id.
    pub async fn create_shipping_address(&self, client: &reqwest::Client) -> String {
        let response = client
            .post(self.url("/shipping"))
            .json(&json!({
                "full_name": "Test Customer",
                "email": "ship@example.com",
                "phone": "07001234567",
                "region": "Test Region",
                "city": "Test City",
                "address": "1 Test Street",
            }))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status().as_u16(), 201);

        let body: Value = response.json().await.expect("Failed to parse response");
        body["address"]["_id"]
            .as_str()
            .expect("Address has no id")
            .to_string()
    }

    pub async fn cleanup(&self) {
        self.db
            .drop(None)
            .await
            .expect("Failed to drop test database");
    }
}

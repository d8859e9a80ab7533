use anyhow::Result;
use dotenvy::dotenv;
use secrecy::Secret;
use serde::Deserialize;
use std::env;

#[derive(Deserialize, Clone, Debug)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub stripe: StripeConfig,
    pub uploads: UploadConfig,
    pub frontend_url: String,
    pub service_name: String,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Deserialize, Clone, Debug)]
pub struct DatabaseConfig {
    pub url: Secret<String>,
    pub db_name: String,
}

#[derive(Deserialize, Clone, Debug)]
pub struct JwtConfig {
    pub secret: Secret<String>,
    pub expiry_minutes: i64,
}

#[derive(Deserialize, Clone, Debug)]
pub struct StripeConfig {
    pub secret_key: Secret<String>,
    pub webhook_secret: Secret<String>,
    pub api_base_url: String,
}

#[derive(Deserialize, Clone, Debug)]
pub struct UploadConfig {
    pub dir: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let host = env::var("MARKETPLACE_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("MARKETPLACE_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()?;

        let db_url =
            env::var("MARKETPLACE_DATABASE_URL").expect("MARKETPLACE_DATABASE_URL must be set");
        let db_name =
            env::var("MARKETPLACE_DATABASE_NAME").unwrap_or_else(|_| "marketplace_db".to_string());

        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET must be set");
        let jwt_expiry_minutes = env::var("JWT_EXPIRY_MINUTES")
            .unwrap_or_else(|_| "60".to_string())
            .parse()
            .unwrap_or(60);

        let stripe_secret_key = env::var("STRIPE_SECRET_KEY").unwrap_or_default();
        let stripe_webhook_secret = env::var("STRIPE_WEBHOOK_SECRET").unwrap_or_default();
        let stripe_api_base_url = env::var("STRIPE_API_BASE_URL")
            .unwrap_or_else(|_| "https://api.stripe.com/v1".to_string());

        let upload_dir = env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".to_string());
        let frontend_url =
            env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:5173".to_string());

        Ok(Self {
            server: ServerConfig { host, port },
            database: DatabaseConfig {
                url: Secret::new(db_url),
                db_name,
            },
            jwt: JwtConfig {
                secret: Secret::new(jwt_secret),
                expiry_minutes: jwt_expiry_minutes,
            },
            stripe: StripeConfig {
                secret_key: Secret::new(stripe_secret_key),
                webhook_secret: Secret::new(stripe_webhook_secret),
                api_base_url: stripe_api_base_url,
            },
            uploads: UploadConfig { dir: upload_dir },
            frontend_url,
            service_name: "marketplace-service".to_string(),
        })
    }
}

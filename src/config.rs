use std::env;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub audit_sink_url: String,
    pub audit_sink_token: String,
    pub jwt_secret: String, // HS256 verification key for staff tokens
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            port: env::var("PORT").unwrap_or_else(|_| "3000".to_string()).parse().expect("PORT must be a number"),
            audit_sink_url: env::var("AUDIT_SINK_URL").unwrap_or_else(|_| "http://localhost:8100/api/v1/audit".to_string()),
            audit_sink_token: env::var("AUDIT_SINK_TOKEN").unwrap_or_else(|_| "test-token-1".to_string()),
            jwt_secret: env::var("JWT_SECRET").expect("JWT_SECRET must be set"),
        }
    }
}

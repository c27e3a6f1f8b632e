use std::env;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: String,
    pub remote_url: Option<String>,
    pub remote_api_key: String,
    pub remote_timeout_ms: u64,
    pub business_name: String,
    pub business_whatsapp: String,
    pub business_email: String,
    pub catalog_path: Option<String>,
    pub draft_ttl_minutes: i64,
    pub lookup_debounce_ms: u64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            database_url: env::var("DATABASE_URL").unwrap_or_else(|_| "salonbook.db".to_string()),
            remote_url: env::var("REMOTE_URL").ok().filter(|v| !v.trim().is_empty()),
            remote_api_key: env::var("REMOTE_API_KEY").unwrap_or_default(),
            remote_timeout_ms: env::var("REMOTE_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5000),
            business_name: env::var("BUSINESS_NAME").unwrap_or_else(|_| "Studio".to_string()),
            business_whatsapp: env::var("BUSINESS_WHATSAPP").unwrap_or_default(),
            business_email: env::var("BUSINESS_EMAIL").unwrap_or_default(),
            catalog_path: env::var("CATALOG_PATH").ok().filter(|v| !v.trim().is_empty()),
            draft_ttl_minutes: env::var("DRAFT_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
            lookup_debounce_ms: env::var("LOOKUP_DEBOUNCE_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1000),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            database_url: ":memory:".to_string(),
            remote_url: None,
            remote_api_key: String::new(),
            remote_timeout_ms: 5000,
            business_name: "Studio".to_string(),
            business_whatsapp: String::new(),
            business_email: String::new(),
            catalog_path: None,
            draft_ttl_minutes: 30,
            lookup_debounce_ms: 1000,
        }
    }
}

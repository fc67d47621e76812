use std::net::SocketAddr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub google_maps_api_key: Option<String>,
    pub http_timeout_secs: u64,
    pub user_agent: String,
    pub google_base_url: String,
    pub nominatim_base_url: String,
    pub registry_base_url: String,
    pub nominatim_min_interval_ms: u64,
    pub rate_limit_backoff_ms: u64,
    pub search_max_distance_km: f64,
    pub search_limit: usize,
    pub enrich_batch_size: usize,
    pub enrich_batch_delay_ms: u64,
    pub enrich_record_delay_ms: u64,
    pub smart_enrich_cap: usize,
    pub smart_enrich_batch_size: usize,
    pub smart_enrich_batch_delay_ms: u64,
    pub registry_batch_concurrency: usize,
    pub registry_batch_delay_ms: u64,
    pub geocode_batch_concurrency: usize,
    pub geocode_batch_delay_ms: u64,
    pub enrich_cron: Option<String>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("database_url", &"[redacted]")
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field(
                "google_maps_api_key",
                &self.google_maps_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("http_timeout_secs", &self.http_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("google_base_url", &self.google_base_url)
            .field("nominatim_base_url", &self.nominatim_base_url)
            .field("registry_base_url", &self.registry_base_url)
            .field("nominatim_min_interval_ms", &self.nominatim_min_interval_ms)
            .field("rate_limit_backoff_ms", &self.rate_limit_backoff_ms)
            .field("search_max_distance_km", &self.search_max_distance_km)
            .field("search_limit", &self.search_limit)
            .field("enrich_batch_size", &self.enrich_batch_size)
            .field("enrich_batch_delay_ms", &self.enrich_batch_delay_ms)
            .field("enrich_record_delay_ms", &self.enrich_record_delay_ms)
            .field("smart_enrich_cap", &self.smart_enrich_cap)
            .field("smart_enrich_batch_size", &self.smart_enrich_batch_size)
            .field(
                "smart_enrich_batch_delay_ms",
                &self.smart_enrich_batch_delay_ms,
            )
            .field(
                "registry_batch_concurrency",
                &self.registry_batch_concurrency,
            )
            .field("registry_batch_delay_ms", &self.registry_batch_delay_ms)
            .field("geocode_batch_concurrency", &self.geocode_batch_concurrency)
            .field("geocode_batch_delay_ms", &self.geocode_batch_delay_ms)
            .field("enrich_cron", &self.enrich_cron)
            .finish()
    }
}

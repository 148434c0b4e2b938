use urlshort_core::config::env_or;

/// The Gateway's only real job: knowing where to forward a request.
#[derive(Debug, Clone)]
pub struct Config {
    pub create_base_url: String,
    pub lookup_base_url: String,
    pub stats_base_url: String,
    pub listen_addr: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Ok(Self {
            create_base_url: env_or("CREATE_SERVICE_URL", "http://localhost:8081"),
            lookup_base_url: env_or("LOOKUP_SERVICE_URL", "http://localhost:8082"),
            stats_base_url: env_or("STATS_SERVICE_URL", "http://localhost:8083"),
            listen_addr: env_or("LISTEN_ADDR", "0.0.0.0:8080"),
        })
    }
}

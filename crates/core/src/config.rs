//! Env-var helpers shared by every service's `Config::from_env`. Lifted
//! verbatim from the pattern each teacher binary wrote for itself.

/// Read a required env var, failing loudly if it is missing.
pub fn env(key: &str) -> anyhow::Result<String> {
    std::env::var(key).map_err(|_| anyhow::anyhow!("Missing env var: {key}"))
}

/// Read an optional env var, falling back to `default`.
pub fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Read and parse an optional env var, falling back to `default` on absence
/// or parse failure.
pub fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Normalizes a `postgresql+asyncpg://` DSN prefix, sometimes handed down from
/// a shared config source, to the plain scheme sqlx expects.
pub fn normalize_postgres_dsn(dsn: String) -> String {
    dsn.replace("postgresql+asyncpg://", "postgresql://")
}

/// Split a comma-separated list of replica DSNs from a single env var.
pub fn env_list(key: &str) -> Vec<String> {
    std::env::var(key)
        .ok()
        .map(|v| {
            v.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

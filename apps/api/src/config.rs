use anyhow::{bail, Context, Result};

/// Application configuration loaded from environment variables.
/// Every variable is optional; invalid values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub latency_min_ms: u64,
    pub latency_max_ms: u64,
    /// Probability that a write endpoint fails before touching the store.
    pub write_failure_rate: f64,
    pub seed_data: bool,
    pub seed_candidates: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: 8080,
            rust_log: "info".to_string(),
            latency_min_ms: 200,
            latency_max_ms: 1200,
            write_failure_rate: 0.08,
            seed_data: true,
            seed_candidates: 1000,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = Config::default();
        let config = Config {
            port: parse_env("PORT", defaults.port)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or(defaults.rust_log),
            latency_min_ms: parse_env("NETWORK_LATENCY_MIN_MS", defaults.latency_min_ms)?,
            latency_max_ms: parse_env("NETWORK_LATENCY_MAX_MS", defaults.latency_max_ms)?,
            write_failure_rate: parse_env("WRITE_FAILURE_RATE", defaults.write_failure_rate)?,
            seed_data: parse_env("SEED_DATA", defaults.seed_data)?,
            seed_candidates: parse_env("SEED_CANDIDATES", defaults.seed_candidates)?,
        };
        config.check()?;
        Ok(config)
    }

    fn check(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.write_failure_rate) {
            bail!(
                "WRITE_FAILURE_RATE must be between 0 and 1, got {}",
                self.write_failure_rate
            );
        }
        if self.latency_min_ms > self.latency_max_ms {
            bail!(
                "NETWORK_LATENCY_MIN_MS ({}) exceeds NETWORK_LATENCY_MAX_MS ({})",
                self.latency_min_ms,
                self.latency_max_ms
            );
        }
        Ok(())
    }
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value '{raw}'")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_pass_check() {
        assert!(Config::default().check().is_ok());
    }

    #[test]
    fn test_failure_rate_above_one_rejected() {
        let config = Config {
            write_failure_rate: 1.5,
            ..Config::default()
        };
        assert!(config.check().is_err());
    }

    #[test]
    fn test_inverted_latency_rejected() {
        let config = Config {
            latency_min_ms: 900,
            latency_max_ms: 100,
            ..Config::default()
        };
        assert!(config.check().is_err());
    }
}

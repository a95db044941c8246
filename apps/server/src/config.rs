use std::str::FromStr;
use std::{net::SocketAddr, time::Duration};

use anyhow::Context;
use xref_source::{CircuitBreakerConfig, RateLimitConfig, DEFAULT_ENDPOINT};

pub struct Config {
    pub listen_addr: SocketAddr,
    pub redis_url: String,
    pub cors_allow: Vec<String>,
    pub request_timeout: Duration,
    pub downstream_endpoint: String,
    pub downstream_timeout: Duration,
    pub refresh_interval: Duration,
    pub refresh_initial_delay: Duration,
    pub lookup_rate: RateLimitConfig,
    pub downstream_rate: RateLimitConfig,
    pub circuit: CircuitBreakerConfig,
    pub log_format: String,
}

/// Reads `name`, falling back to `default` when unset.
fn env_or<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid {}='{}': {}", name, raw, e)),
        Err(_) => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let listen_addr: SocketAddr = std::env::var("XREF_LISTEN_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:8080".to_string())
            .parse()
            .context("Invalid XREF_LISTEN_ADDR")?;
        let redis_url =
            std::env::var("XREF_REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".into());
        let cors_allow = std::env::var("XREF_CORS_ALLOW_ORIGINS")
            .unwrap_or_else(|_| "*".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let downstream_endpoint = std::env::var("XREF_DOWNSTREAM_ENDPOINT")
            .unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string());

        let defaults = CircuitBreakerConfig::default();
        let circuit = CircuitBreakerConfig {
            failure_rate_threshold: env_or(
                "XREF_CIRCUIT_FAILURE_RATE",
                defaults.failure_rate_threshold,
            )?,
            window_size: env_or("XREF_CIRCUIT_WINDOW", defaults.window_size)?,
            minimum_calls: env_or("XREF_CIRCUIT_MIN_CALLS", defaults.minimum_calls)?,
            cool_down: Duration::from_secs(env_or(
                "XREF_CIRCUIT_COOLDOWN_SECS",
                defaults.cool_down.as_secs(),
            )?),
            half_open_success_threshold: defaults.half_open_success_threshold,
        };

        let config = Self {
            listen_addr,
            redis_url,
            cors_allow,
            request_timeout: Duration::from_millis(env_or("XREF_REQUEST_TIMEOUT_MS", 30_000)?),
            downstream_endpoint,
            downstream_timeout: Duration::from_millis(env_or(
                "XREF_DOWNSTREAM_TIMEOUT_MS",
                30_000,
            )?),
            refresh_interval: Duration::from_secs(env_or("XREF_REFRESH_INTERVAL_SECS", 86_400)?),
            refresh_initial_delay: Duration::from_secs(env_or(
                "XREF_REFRESH_INITIAL_DELAY_SECS",
                60,
            )?),
            lookup_rate: RateLimitConfig::per_minute(
                env_or("XREF_LOOKUP_RATE_PER_MINUTE", 6_000)?,
                env_or("XREF_LOOKUP_BURST", 100)?,
            ),
            downstream_rate: RateLimitConfig::per_minute(
                env_or("XREF_DOWNSTREAM_RATE_PER_MINUTE", 10)?,
                env_or("XREF_DOWNSTREAM_BURST", 2)?,
            ),
            circuit,
            log_format: std::env::var("XREF_LOG_FORMAT").unwrap_or_else(|_| "text".to_string()),
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would stall or crash the service at runtime.
    pub fn validate(&self) -> anyhow::Result<()> {
        let durations = [
            ("XREF_REQUEST_TIMEOUT_MS", self.request_timeout),
            ("XREF_DOWNSTREAM_TIMEOUT_MS", self.downstream_timeout),
            ("XREF_REFRESH_INTERVAL_SECS", self.refresh_interval),
        ];
        for (name, value) in durations {
            if value.is_zero() {
                anyhow::bail!("{} must be greater than zero", name);
            }
        }

        let rates = [
            ("XREF_LOOKUP", &self.lookup_rate),
            ("XREF_DOWNSTREAM", &self.downstream_rate),
        ];
        for (prefix, rate) in rates {
            if rate.requests_per_minute == 0 || rate.burst_capacity == 0 {
                anyhow::bail!(
                    "{}_RATE_PER_MINUTE and {}_BURST must be greater than zero",
                    prefix,
                    prefix
                );
            }
        }

        if self.circuit.failure_rate_threshold > 100 {
            anyhow::bail!("XREF_CIRCUIT_FAILURE_RATE must be between 0 and 100");
        }
        if self.circuit.window_size == 0 {
            anyhow::bail!("XREF_CIRCUIT_WINDOW must be greater than zero");
        }
        Ok(())
    }
}

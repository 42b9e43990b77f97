use std::time::Duration;

use clap::{Parser, ValueEnum};

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    // Firebase Realtime Database over REST
    Firebase,
    // In-process counters, lost on restart
    Memory,
}

// CLI argument structure, every flag also readable from the environment
#[derive(Parser, Debug, Clone)]
#[command(name = "portfolio-metrics")]
#[command(about = "Visitor metrics API for the portfolio site")]
pub struct Args {
    // Port to run the server on
    #[arg(short, long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    // Counter store backend
    #[arg(long, env = "METRICS_STORE", value_enum, default_value_t = StoreKind::Firebase)]
    pub store: StoreKind,

    // Realtime Database root, e.g. https://<project>-default-rtdb.firebaseio.com
    #[arg(long, env = "FIREBASE_DATABASE_URL")]
    pub database_url: Option<String>,

    // Database secret / ID token sent as ?auth=
    #[arg(long, env = "FIREBASE_DATABASE_AUTH", hide_env_values = true)]
    pub database_auth: Option<String>,

    // Per-request timeout against the store, seconds
    #[arg(long, env = "FIREBASE_TIMEOUT", default_value_t = 10)]
    pub store_timeout: u64,

    // Stats cache TTL in seconds
    #[arg(short, long, env = "METRICS_CACHE_TTL", default_value_t = 60)]
    pub cache_ttl: u64,

    // Accepted increments per IP per window
    #[arg(long, env = "METRICS_RATE_LIMIT", default_value_t = 10)]
    pub rate_limit: u32,

    // Rate limit window in seconds
    #[arg(long, env = "METRICS_RATE_WINDOW", default_value_t = 3600)]
    pub rate_window: u64,

    // How often expired rate limit entries are dropped, seconds
    #[arg(long, env = "METRICS_SWEEP_INTERVAL", default_value_t = 300)]
    pub sweep_interval: u64,

    // Comma-separated CORS origins
    #[arg(long, env = "ALLOWED_ORIGINS", default_value = "http://localhost:5173")]
    pub allowed_origins: String,
}

impl Args {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl)
    }

    pub fn rate_window(&self) -> Duration {
        Duration::from_secs(self.rate_window)
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_secs(self.store_timeout)
    }

    // tokio intervals panic on zero
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval.max(1))
    }

    pub fn origins(&self) -> Vec<String> {
        self.allowed_origins
            .split(',')
            .map(|s| s.trim()) // remove spaces
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.store == StoreKind::Firebase && self.database_url.is_none() {
            return Err("--database-url (FIREBASE_DATABASE_URL) is required for the firebase store".into());
        }
        if self.rate_window == 0 {
            return Err("--rate-window must be at least one second".into());
        }
        if self.store_timeout == 0 {
            return Err("--store-timeout must be at least one second".into());
        }
        Ok(())
    }
}

use std::env;
use std::time::Duration;

/// Store configuration, read from the environment at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub mongodb_uri: String,
    pub database: String,
    pub connect_timeout: Duration,
    pub server_selection_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        let mongodb_uri =
            env::var("MONGODB_URI").unwrap_or_else(|_| "mongodb://localhost:27017/".to_string());
        let database = env::var("MONGODB_DATABASE").unwrap_or_else(|_| "todo_app".to_string());
        let connect_timeout = env_secs("MONGODB_CONNECT_TIMEOUT_SECS", 10);
        let server_selection_timeout = env_secs("MONGODB_SELECTION_TIMEOUT_SECS", 5);

        Config {
            mongodb_uri,
            database,
            connect_timeout,
            server_selection_timeout,
        }
    }
}

fn env_secs(key: &str, default_secs: u64) -> Duration {
    let secs = env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default_secs);
    Duration::from_secs(secs)
}

use std::{env, path::PathBuf, time::Duration};

/// Display delay before the bootstrap lands on a dashboard, when not configured.
pub const DEFAULT_BOOTSTRAP_DELAY_MS: u64 = 1500;
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_STATIC_DIR: &str = "./dist";

/// AppConfig
///
/// Process configuration, loaded once at startup and immutable afterwards. The role
/// table and public routes are deliberately not part of it: they are static and live
/// in `AccessPolicy`.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Runtime environment marker. Selects the log format and which variables are mandatory.
    pub env: Env,
    // Socket address the HTTP server binds to.
    pub bind_addr: String,
    // Delay the client bootstrap waits before navigating to a dashboard.
    pub bootstrap_delay: Duration,
    // Directory holding the built dashboard bundle (index.html, assets/).
    pub static_dir: PathBuf,
}

/// Env
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

impl Default for AppConfig {
    /// Non-panicking values for tests; nothing is read from the environment.
    fn default() -> Self {
        Self {
            env: Env::Local,
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            bootstrap_delay: Duration::from_millis(DEFAULT_BOOTSTRAP_DELAY_MS),
            static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads the configuration from environment variables.
    ///
    /// # Panics
    /// Panics when `BIND_ADDR` is missing in production, or when `BOOTSTRAP_DELAY_MS`
    /// is set but is not a whole number of milliseconds. A gate that starts on a guessed
    /// address or delay is worse than one that does not start.
    pub fn load() -> Self {
        let env = match env::var("APP_ENV").as_deref() {
            Ok("production") => Env::Production,
            _ => Env::Local,
        };

        let bind_addr = match env {
            Env::Production => {
                env::var("BIND_ADDR").expect("FATAL: BIND_ADDR must be set in production.")
            }
            Env::Local => env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string()),
        };

        let bootstrap_delay = env::var("BOOTSTRAP_DELAY_MS")
            .ok()
            .map(|raw| {
                raw.trim()
                    .parse::<u64>()
                    .expect("FATAL: BOOTSTRAP_DELAY_MS must be a whole number of milliseconds.")
            })
            .map(Duration::from_millis)
            .unwrap_or(Duration::from_millis(DEFAULT_BOOTSTRAP_DELAY_MS));

        let static_dir = env::var("STATIC_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_STATIC_DIR));

        Self {
            env,
            bind_addr,
            bootstrap_delay,
            static_dir,
        }
    }
}

use std::{env, time::Duration};

use fcm_tools::FcmConfig;
use ghazaresan_tools::GhazaresanConfig;
use log::*;

use crate::errors::ServerError;

const DEFAULT_OPN_HOST: &str = "0.0.0.0";
const DEFAULT_OPN_PORT: u16 = 3000;
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Time between two order checks for the same user.
    pub poll_interval: Duration,
    /// Upstream order API configuration
    pub ghazaresan: GhazaresanConfig,
    /// Firebase Cloud Messaging configuration. There is no sensible default for this, so it is required.
    pub fcm: FcmConfig,
}

impl ServerConfig {
    pub fn new(host: &str, port: u16, fcm: FcmConfig) -> Self {
        Self {
            host: host.to_string(),
            port,
            poll_interval: DEFAULT_POLL_INTERVAL,
            ghazaresan: GhazaresanConfig::default(),
            fcm,
        }
    }

    /// Loads the configuration from the environment.
    ///
    /// Optional values that are missing or invalid are replaced by their defaults, with a log message. Missing or
    /// invalid Firebase settings are an error, since the server cannot do anything useful without them.
    pub fn try_from_env() -> Result<Self, ServerError> {
        let host = env::var("OPN_HOST").ok().unwrap_or_else(|| DEFAULT_OPN_HOST.into());
        let port = configure_port();
        let poll_interval = configure_poll_interval();
        let ghazaresan = GhazaresanConfig::new_from_env_or_default();
        let fcm = FcmConfig::try_from_env().map_err(|e| {
            error!("🪛️ Firebase Cloud Messaging is not configured. {e}");
            ServerError::from(e)
        })?;
        info!("🪛️ Push notifications will be sent via Firebase project {}", fcm.project_id);
        Ok(Self { host, port, poll_interval, ghazaresan, fcm })
    }
}

fn configure_port() -> u16 {
    // PORT is what most container platforms inject
    env::var("OPN_PORT")
        .or_else(|_| env::var("PORT"))
        .map(|s| {
            s.parse::<u16>().unwrap_or_else(|e| {
                error!("🪛️ {s} is not a valid port for OPN_PORT. {e} Using the default, {DEFAULT_OPN_PORT}, instead.");
                DEFAULT_OPN_PORT
            })
        })
        .ok()
        .unwrap_or(DEFAULT_OPN_PORT)
}

fn configure_poll_interval() -> Duration {
    env::var("OPN_POLL_INTERVAL")
        .map_err(|_| {
            info!(
                "🪛️ OPN_POLL_INTERVAL is not set. Using the default value of {}s.",
                DEFAULT_POLL_INTERVAL.as_secs()
            )
        })
        .and_then(|s| {
            parse_poll_interval(&s).map_err(|e| warn!("🪛️ Invalid configuration value for OPN_POLL_INTERVAL. {e}"))
        })
        .ok()
        .unwrap_or(DEFAULT_POLL_INTERVAL)
}

fn parse_poll_interval(s: &str) -> Result<Duration, String> {
    match s.trim().parse::<u64>() {
        Ok(0) => Err("The poll interval must be at least one second".to_string()),
        Ok(secs) => Ok(Duration::from_secs(secs)),
        Err(e) => Err(format!("{s} is not a whole number of seconds. {e}")),
    }
}

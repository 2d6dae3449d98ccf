use std::{fs::File, io::BufReader, path::Path, time::Duration};

use log::info;
use serde::Deserialize;

use crate::structures::{errors::ProbeError, model::Credentials};

/// One week.
const MAX_INTERVAL_MINUTES: u64 = 7 * 24 * 60;
const MAX_REQUEST_TIMEOUT_SECS: u64 = 60 * 60;

fn default_name() -> String {
    "Unknown".to_string()
}

fn default_interval() -> u64 {
    5
}

fn default_request_timeout() -> u64 {
    10
}

/// Agent configuration file. Legacy `config.json` files (capitalized keys) parse as well.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Display name of this probe.
    #[serde(alias = "Name", default = "default_name")]
    pub name: String,
    /// Control server base URL.
    #[serde(alias = "Server")]
    pub server: String,
    #[serde(alias = "Email")]
    pub email: String,
    #[serde(alias = "Password")]
    pub password: String,
    /// Minutes between site list refreshes.
    #[serde(alias = "Interval", default = "default_interval")]
    pub interval: u64,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ProbeError> {
        let path = path.as_ref();
        info!("Reading config from {}", path.display());
        let config: Config = serde_yaml::from_reader(BufReader::new(File::open(path)?))?;
        config.validate()
    }

    fn validate(mut self) -> Result<Self, ProbeError> {
        let server = self.server.trim().trim_end_matches('/');
        if !(server.starts_with("http://") || server.starts_with("https://")) {
            return Err(ProbeError::Config(format!(
                "server must be an http(s) URL, got {:?}",
                self.server
            )));
        }
        self.server = server.to_string();

        if self.email.trim().is_empty() {
            return Err(ProbeError::Config("email must not be empty".to_string()));
        }
        if self.interval == 0 || self.interval > MAX_INTERVAL_MINUTES {
            return Err(ProbeError::Config(format!(
                "interval must be between 1 and {} minutes, got {}",
                MAX_INTERVAL_MINUTES, self.interval
            )));
        }
        if self.request_timeout_secs == 0 || self.request_timeout_secs > MAX_REQUEST_TIMEOUT_SECS {
            return Err(ProbeError::Config(format!(
                "request_timeout_secs must be between 1 and {}, got {}",
                MAX_REQUEST_TIMEOUT_SECS, self.request_timeout_secs
            )));
        }
        Ok(self)
    }

    pub fn credentials(&self) -> Credentials {
        Credentials {
            email: self.email.clone(),
            secret: self.password.clone(),
        }
    }

    pub fn refresh_every(&self) -> Duration {
        Duration::from_secs(self.interval.saturating_mul(60))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

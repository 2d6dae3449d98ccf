use std::time::{Duration, Instant};

use log::{info, warn};
use reqwest::{Client, StatusCode};

use crate::structures::{
    errors::ProbeError,
    model::{CheckResult, Site},
};

pub fn unix_now() -> i64 {
    time::OffsetDateTime::now_utc().unix_timestamp()
}

/// Probes monitored sites. Requests carry no control-server credentials.
#[derive(Debug, Clone)]
pub struct SiteChecker {
    http: Client,
}

impl SiteChecker {
    pub fn new(timeout: Duration) -> Result<Self, ProbeError> {
        let http = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;
        Ok(SiteChecker { http })
    }

    /// Never fails: an unreachable site is reported as "Down".
    pub async fn check(&self, site: &Site) -> CheckResult {
        let start = Instant::now();
        match self.http.get(&site.url).send().await {
            Ok(response) => {
                let elapsed = start.elapsed().as_secs_f64() * 1e3;
                let status = response.status();
                info!("{} responseTime: {:.1}ms ({})", site.name, elapsed, status);
                CheckResult {
                    site_id: site.id.clone(),
                    created_at: unix_now(),
                    up: status == StatusCode::OK,
                    status_code: status.as_u16(),
                    status: status.to_string(),
                    response_time: elapsed,
                }
            }
            Err(e) => {
                warn!("Failed to reach {} at {}: {}", site.name, site.url, e);
                CheckResult::down(&site.id, unix_now())
            }
        }
    }
}

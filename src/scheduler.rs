use std::{future::Future, time::Duration};

use futures::{stream, StreamExt};
use log::{error, info, warn};
use reqwest::StatusCode;
use tokio::time::{interval, interval_at, Instant, MissedTickBehavior};

use crate::{
    checker::SiteChecker,
    client::ControlClient,
    reporter,
    sites::{self, SiteCache},
    structures::errors::ProbeError,
};

/// Period of the check-all-sites job.
pub const CHECK_EVERY: Duration = Duration::from_secs(10 * 60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentState {
    Unauthenticated,
    Authenticating,
    PrimedWithSiteList,
    Running,
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    pub refresh_every: Duration,
    pub check_every: Duration,
}

impl Schedule {
    pub fn new(refresh_every: Duration) -> Self {
        Schedule {
            refresh_every,
            check_every: CHECK_EVERY,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchSummary {
    pub checked: usize,
    pub up: usize,
    pub report_failures: usize,
}

#[derive(Debug, Clone)]
pub struct Agent {
    client: ControlClient,
    checker: SiteChecker,
    sites: SiteCache,
    state: AgentState,
}

impl Agent {
    pub fn new(client: ControlClient, checker: SiteChecker) -> Self {
        Agent {
            client,
            checker,
            sites: SiteCache::new(),
            state: AgentState::Unauthenticated,
        }
    }

    pub fn state(&self) -> AgentState {
        self.state
    }

    pub fn sites(&self) -> &SiteCache {
        &self.sites
    }

    /// Test credentials, then load the first site list. Either failure is fatal.
    pub async fn start(&mut self) -> Result<(), ProbeError> {
        self.state = AgentState::Authenticating;
        info!("testing auth");
        if let Err(e) = self.client.test_auth().await {
            self.state = AgentState::Unauthenticated;
            match e.status() {
                Some(StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) => {
                    error!("Control server rejected credentials: {}", e)
                }
                _ => error!("Auth test failed: {}", e),
            }
            return Err(e);
        }
        info!("Auth successful");

        let list = sites::refresh(&self.client).await.map_err(|e| {
            error!("Initial site list refresh failed: {}", e);
            e
        })?;
        if list.is_empty() {
            warn!("Control server returned no sites to monitor");
        }
        self.sites.replace(list);
        self.state = AgentState::PrimedWithSiteList;
        Ok(())
    }

    /// One refresh tick. On failure the cached list is kept.
    pub async fn refresh_sites(&self) {
        match sites::refresh(&self.client).await {
            Ok(list) => self.sites.replace(list),
            Err(e) if e.is_transport() => {
                warn!("Control server unreachable, keeping cached site list: {}", e)
            }
            Err(e) => warn!("Site list refresh failed, keeping cached site list: {}", e),
        }
    }

    /// Check and report every cached site in order. One site's failure does not
    /// affect the others.
    pub async fn check_all(&self) -> BatchSummary {
        let snapshot = self.sites.snapshot();
        let summary = stream::iter(snapshot.sites.iter())
            .fold(BatchSummary::default(), |mut summary, site| async move {
                let result = self.checker.check(site).await;
                summary.checked += 1;
                if result.up {
                    summary.up += 1;
                }
                if let Err(e) = reporter::report(&self.client, &result).await {
                    warn!("cannot report result for {} at this time: {}", site.name, e);
                    summary.report_failures += 1;
                }
                summary
            })
            .await;
        info!(
            "Checked {} sites: {} up, {} reports failed",
            summary.checked, summary.up, summary.report_failures
        );
        summary
    }

    /// Run both jobs until `shutdown` resolves. Starts the agent first if needed.
    pub async fn run<F>(&mut self, schedule: Schedule, shutdown: F) -> Result<(), ProbeError>
    where
        F: Future<Output = ()>,
    {
        if self.state != AgentState::PrimedWithSiteList {
            self.start().await?;
        }
        self.state = AgentState::Running;
        info!(
            "Running: refreshing sites every {:?}, checking every {:?}",
            schedule.refresh_every, schedule.check_every
        );

        let refresher = self.clone();
        let refresh_job = tokio::spawn(async move {
            let mut ticker = interval_at(
                Instant::now() + schedule.refresh_every,
                schedule.refresh_every,
            );
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                refresher.refresh_sites().await;
            }
        });

        let checker = self.clone();
        let check_job = tokio::spawn(async move {
            let mut ticker = interval(schedule.check_every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                checker.check_all().await;
            }
        });

        shutdown.await;
        refresh_job.abort();
        check_job.abort();
        self.state = AgentState::Stopped;
        info!("Stopped");
        Ok(())
    }
}

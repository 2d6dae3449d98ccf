mod checker;
mod client;
mod config;
mod reporter;
mod scheduler;
mod sites;
mod structures;
#[cfg(test)]
mod testing;

use std::future::Future;

use clap::{command, Parser};
use log::{error, info};

use crate::{
    checker::SiteChecker,
    client::ControlClient,
    config::Config,
    scheduler::{Agent, Schedule},
    structures::errors::ProbeError,
};

#[cfg(all(target_env = "musl", target_pointer_width = "64"))]
#[global_allocator]
static GLOBAL: jemallocator::Jemalloc = jemallocator::Jemalloc;

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// path to config file
    #[arg(long, env, default_value = "./config.yaml")]
    config_path: String,
}

async fn ctrl_c() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl-C, shutting down"),
        Err(e) => {
            error!("Unable to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await
        }
    }
}

/// Resolves on Ctrl-C or SIGTERM. Handlers are installed before this returns.
#[cfg(unix)]
fn shutdown_signal() -> Result<impl Future<Output = ()>, ProbeError> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate = signal(SignalKind::terminate())?;
    Ok(async move {
        tokio::select! {
            _ = ctrl_c() => {}
            _ = terminate.recv() => info!("Received SIGTERM, shutting down"),
        }
    })
}

#[cfg(not(unix))]
fn shutdown_signal() -> Result<impl Future<Output = ()>, ProbeError> {
    Ok(ctrl_c())
}

#[tokio::main]
async fn main() -> Result<(), ProbeError> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let args = Args::parse();
    info!("Started with args: {:?}", args);

    let config = Config::load(&args.config_path)?;
    info!("Probe {} reporting to {}", config.name, config.server);

    let client = ControlClient::new(
        &config.server,
        config.credentials(),
        &config.name,
        config.request_timeout(),
    )?;
    let checker = SiteChecker::new(config.request_timeout())?;

    let mut agent = Agent::new(client, checker);
    agent.start().await?;
    info!(
        "{:?} with {} sites",
        agent.state(),
        agent.sites().snapshot().len()
    );
    agent
        .run(Schedule::new(config.refresh_every()), shutdown_signal()?)
        .await
}

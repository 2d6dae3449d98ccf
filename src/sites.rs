use std::sync::{Arc, PoisonError, RwLock};

use log::info;

use crate::{
    client::ControlClient,
    structures::{errors::ProbeError, model::SiteList},
};

pub const SITES_PATH: &str = "/api/sites";

/// Fetch the current site list. Nothing is cached here; see [`SiteCache::replace`].
pub async fn refresh(client: &ControlClient) -> Result<SiteList, ProbeError> {
    let body = client.get(SITES_PATH).await?.bytes().await?;
    let list: SiteList = serde_json::from_slice(&body)?;
    info!("received updated site list ({} sites)", list.len());
    Ok(list)
}

/// Most recently fetched site list, shared between the refresh and check jobs.
///
/// The list is swapped wholesale; readers hold an `Arc` to whichever list was
/// current when they took their snapshot.
#[derive(Debug, Clone, Default)]
pub struct SiteCache {
    current: Arc<RwLock<Arc<SiteList>>>,
}

impl SiteCache {
    pub fn new() -> Self {
        SiteCache::default()
    }

    pub fn snapshot(&self) -> Arc<SiteList> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn replace(&self, list: SiteList) {
        *self
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Arc::new(list);
    }
}

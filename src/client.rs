use std::time::Duration;

use log::debug;
use reqwest::{Client, Response, StatusCode};
use serde::Serialize;

use crate::structures::{errors::ProbeError, model::Credentials};

#[derive(Debug, Clone)]
pub struct ControlClient {
    http: Client,
    server: String,
    credentials: Credentials,
}

impl ControlClient {
    pub fn new(
        server: &str,
        credentials: Credentials,
        probe_name: &str,
        timeout: Duration,
    ) -> Result<Self, ProbeError> {
        let http = Client::builder()
            .user_agent(format!(
                "{}/{} ({})",
                env!("CARGO_PKG_NAME"),
                env!("CARGO_PKG_VERSION"),
                probe_name
            ))
            .timeout(timeout)
            .build()?;
        Ok(ControlClient {
            http,
            server: server.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.server, path)
    }

    /// GET `path` with basic auth. Anything at or above 201 is an error.
    pub async fn get(&self, path: &str) -> Result<Response, ProbeError> {
        let url = self.url(path);
        debug!("GET {}", url);
        let response = self
            .http
            .get(&url)
            .basic_auth(&self.credentials.email, Some(&self.credentials.secret))
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() < 201 {
            Ok(response)
        } else {
            Err(ProbeError::UnexpectedStatus { url, status })
        }
    }

    /// Credential check against the site list endpoint.
    pub async fn test_auth(&self) -> Result<(), ProbeError> {
        self.get(crate::sites::SITES_PATH).await.map(|_| ())
    }

    /// POST `payload` as JSON with basic auth. Only 200 counts as delivered.
    pub async fn post<T: Serialize + ?Sized>(
        &self,
        path: &str,
        payload: &T,
    ) -> Result<(), ProbeError> {
        let url = self.url(path);
        debug!("POST {}", url);
        let response = self
            .http
            .post(&url)
            .basic_auth(&self.credentials.email, Some(&self.credentials.secret))
            .json(payload)
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => Ok(()),
            status => Err(ProbeError::UnexpectedStatus { url, status }),
        }
    }
}

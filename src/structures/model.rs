use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// `null` decodes like a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// One monitored site as served by the control server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Site {
    #[serde(rename = "createdAt", deserialize_with = "null_as_default")]
    pub created_at: String,
    #[serde(rename = "updatedAt", deserialize_with = "null_as_default")]
    pub updated_at: String,
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub url: String,
    #[serde(rename = "userID", deserialize_with = "null_as_default")]
    pub user_id: String,
}

/// Body of `GET /api/sites`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct SiteList {
    #[serde(default, deserialize_with = "null_as_default")]
    pub sites: Vec<Site>,
}

impl SiteList {
    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }
}

/// Outcome of probing one site once. Posted verbatim to `/api/responses`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckResult {
    #[serde(rename = "siteID")]
    pub site_id: String,
    /// Seconds since the unix epoch.
    #[serde(rename = "createdAt")]
    pub created_at: i64,
    pub up: bool,
    /// 0 when the site could not be reached.
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub status: String,
    /// Milliseconds, or [`CheckResult::UNREACHABLE_MS`].
    #[serde(rename = "responseTime")]
    pub response_time: f64,
}

impl CheckResult {
    pub const UNREACHABLE_MS: f64 = -1.0;
    pub const DOWN_STATUS: &'static str = "Down";

    pub fn down(site_id: &str, created_at: i64) -> Self {
        CheckResult {
            site_id: site_id.to_string(),
            created_at,
            up: false,
            status_code: 0,
            status: Self::DOWN_STATUS.to_string(),
            response_time: Self::UNREACHABLE_MS,
        }
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub secret: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("secret", &"<redacted>")
            .finish()
    }
}

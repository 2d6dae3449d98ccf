use crate::{
    client::ControlClient,
    structures::{errors::ProbeError, model::CheckResult},
};

pub const RESPONSES_PATH: &str = "/api/responses";

/// Deliver one result. At most once: a failed post is not retried.
pub async fn report(client: &ControlClient, result: &CheckResult) -> Result<(), ProbeError> {
    client.post(RESPONSES_PATH, result).await
}

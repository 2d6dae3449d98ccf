use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("IO error\n{0}")]
    Read(#[from] std::io::Error),

    #[error("reqwest error\n{0}")]
    Transport(#[from] reqwest::Error),

    #[error("serde_yaml error\n{0}")]
    SerdeYaml(#[from] serde_yaml::Error),

    #[error("serde_json error\n{0}")]
    Decode(#[from] serde_json::Error),

    #[error("unexpected status {status} from {url}")]
    UnexpectedStatus { url: String, status: StatusCode },

    #[error("config error \n{0}")]
    Config(String),
}

impl ProbeError {
    /// Status carried by a protocol error, if this is one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ProbeError::UnexpectedStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, ProbeError::Transport(_))
    }
}

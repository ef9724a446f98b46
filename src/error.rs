use thiserror::Error;

#[derive(Error, Debug)]
pub enum DiscoveryError {
    // Gateway errors
    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("HTTP error! status: {status}")]
    HttpStatus { status: u16 },

    #[error("malformed response body: {0}")]
    Decode(String),

    #[error("discovery {0} not found")]
    RecordNotFound(i64),

    #[error("invalid API URL '{0}': {1}")]
    InvalidUrl(String, String),

    // Local errors
    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml_ng::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DiscoveryError {
    /// HTTP status carried by the error, if the service answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            DiscoveryError::HttpStatus { status } => Some(*status),
            DiscoveryError::RecordNotFound(_) => Some(404),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for DiscoveryError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            return DiscoveryError::Decode(err.to_string());
        }
        DiscoveryError::Transport(err)
    }
}

pub type Result<T> = std::result::Result<T, DiscoveryError>;

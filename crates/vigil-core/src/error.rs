use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("failed to decode check config: {0}")]
    Decode(#[from] serde_yaml::Error),

    #[error("invalid check config: {0}")]
    Config(String),

    #[error("connection error: {0}")]
    Connection(#[source] anyhow::Error),

    #[error("query error: {0}")]
    Query(#[source] anyhow::Error),

    #[error("no documents returned from query: {0:?}")]
    NoMatch(String),
}

pub type ProbeResult<T> = Result<T, ProbeError>;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PortalError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{url} answered with status {status}")]
    Status { url: String, status: u16 },

    #[error("invalid portal url: {0}")]
    Url(#[from] url::ParseError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("no csrftoken cookie issued for {0}")]
    MissingCsrfToken(String),
}

pub type Result<T, E = PortalError> = std::result::Result<T, E>;

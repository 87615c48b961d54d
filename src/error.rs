use thiserror::Error;

#[derive(Error, Debug)]
pub enum VapixError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Device error ({status}): {message}")]
    DeviceError { status: u16, message: String },

    #[error("Protocol error: {0}")]
    ProtocolError(String),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),
}

pub type Result<T> = std::result::Result<T, VapixError>;

use thiserror::Error;

/// Every way a single user action on a page can fail.
///
/// None of these are fatal to the page: the UI reports them as a notice and
/// the user may try again.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClientError {
    #[error("Unsupported file type \"{0}\". Please choose a PNG or JPEG image.")]
    InvalidFileType(String),
    #[error("File is too large ({size} bytes). The maximum is {limit} bytes.")]
    FileTooLarge { size: usize, limit: usize },
    #[error("No image selected. Please upload an image first.")]
    NoImageSelected,
    #[error("Inference service unavailable: {0}")]
    ConnectionUnavailable(String),
    #[error("Unexpected response from the inference service: {0}")]
    MalformedResponse(String),
    #[error("{0}")]
    RemoteError(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config parse error: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

use thiserror::Error;

/// Everything that can go wrong asking the provider for a new profile. The
/// page treats every variant the same way; the split exists for logs.
#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("no API key configured for the profile generator")]
    MissingApiKey,

    #[error("generation request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("provider rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("provider returned a malformed profile: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("provider returned no content")]
    EmptyResponse,
}

/// Failures of the browser layer. None of them stop the page.
#[derive(Error, Debug)]
pub enum PageError {
    #[error("background rendering unavailable: {0}")]
    RenderingUnavailable(String),

    #[error("IntersectionObserver unavailable")]
    ObservationUnavailable,

    #[error("DOM operation failed: {0}")]
    Dom(String),

    #[error("invalid site configuration: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T, E = PageError> = std::result::Result<T, E>;

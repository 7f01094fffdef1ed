use thiserror::Error;

#[derive(Error, Debug)]
pub enum DiscoverError {
    #[error("http request failed: {0}")]
    HttpRequest(#[from] reqwest::Error),

    #[error("orchestrator rejected registration ({status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

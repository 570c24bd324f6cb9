use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("invalid config: {0}")]
    Config(String),

    #[error("proxy pool is empty")]
    EmptyPool,

    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("unexpected status {status} from {url}")]
    NonSuccessStatus { url: String, status: u16 },

    #[error("giving up on {url} after {attempts} attempts")]
    RetriesExhausted {
        url: String,
        attempts: u32,
        #[source]
        source: Option<Box<ScrapeError>>,
    },

    #[error("detail page has no '{selector}' region")]
    MissingRegion { selector: &'static str },

    #[error("detail page has no active color variant")]
    NoActiveColor,

    #[error("malformed field '{field}': {value}")]
    MalformedField { field: &'static str, value: String },
}

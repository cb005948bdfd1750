use thiserror::Error;

/// Errors surfaced by the fallible parts of the page runtime.
///
/// Event handling itself never fails; these cover loading markup and
/// setting the page up.
#[derive(Debug, Error)]
pub enum SiteError {
    #[error("failed to read page {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid page location '{location}': {source}")]
    InvalidUrl {
        location: String,
        #[source]
        source: url::ParseError,
    },
    #[error("request for {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} answered with HTTP {status}")]
    HttpStatus { url: String, status: u16 },
    #[error("unsupported selector '{0}'")]
    Selector(String),
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Failure reported by a playback primitive when asked to start.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("playback refused: {0}")]
pub struct PlaybackError(pub String);

/// Failure reported by a clipboard when a write is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("clipboard write failed: {0}")]
pub struct ClipboardError(pub String);

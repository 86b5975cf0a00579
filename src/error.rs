//! Error types for the alp-dl library.

use thiserror::Error;

/// Errors that can occur while talking to the catalog or downloading documents.
#[derive(Error, Debug)]
pub enum Error {
    /// Network failure or non-success HTTP status.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    Status {
        /// Status code returned by the server.
        status: u16,
        /// Requested URL.
        url: String,
    },

    /// A response body was not the JSON shape we expected.
    #[error("malformed response from {endpoint}: {message}")]
    Decode {
        /// Endpoint path the body came from.
        endpoint: String,
        /// Parser message.
        message: String,
    },

    /// No filename override was given and `Content-Disposition` was missing or unparseable.
    #[error("cannot resolve filename for file {file_id}")]
    FilenameResolution {
        /// Identifier of the document being fetched.
        file_id: u64,
    },

    /// A download run is already active.
    #[error("a download is already running")]
    AlreadyRunning,

    /// A document fetch failed inside a download run.
    #[error("route \"{route}\", file {file_id}: {source}")]
    Document {
        /// Sanitized route label the document belongs to.
        route: String,
        /// Identifier of the failing document.
        file_id: u64,
        /// Underlying failure.
        #[source]
        source: Box<Error>,
    },

    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file could not be parsed.
    #[error("config error: {0}")]
    Config(#[from] toml::de::Error),
}

impl Error {
    /// Builds a [`Error::Decode`] from a `serde_json` failure.
    pub(crate) fn decode(endpoint: &str, err: &serde_json::Error) -> Self {
        Self::Decode {
            endpoint: endpoint.to_string(),
            message: err.to_string(),
        }
    }

    /// Returns true for failures of the network layer (including HTTP status errors).
    #[must_use]
    pub fn is_transport(&self) -> bool {
        match self {
            Self::Transport(_) | Self::Status { .. } => true,
            Self::Document { source, .. } => source.is_transport(),
            _ => false,
        }
    }
}

/// A specialized `Result` type for alp-dl operations.
pub type Result<T> = std::result::Result<T, Error>;

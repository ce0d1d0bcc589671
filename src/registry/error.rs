//! Error types for the model registry client.

use thiserror::Error;

/// Errors that can occur while talking to the model registry.
#[derive(Error, Debug)]
pub enum RegistryError {
    /// A required credential is absent from the process environment.
    ///
    /// Raised before any request is sent.
    #[error("Missing credential: environment variable {var} must be set ({hint})")]
    MissingCredential {
        /// Name of the environment variable
        var: &'static str,
        /// What the variable should contain
        hint: &'static str,
    },

    /// The request never produced a response (DNS, TLS, connection, timeout).
    #[error("Request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The registry answered with a non-success status.
    #[error("Registry request to {url} failed\n\nStatus: {status}\nBody: {body}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
        body: String,
    },

    /// A local file could not be read for upload.
    #[error("Failed to read {path} for upload: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A commit line could not be serialized.
    #[error("Failed to serialize commit payload: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The registry answered with a body this client cannot use.
    #[error("Unexpected response from {url}: {message}")]
    UnexpectedResponse { url: String, message: String },

    /// The large-file store refused an object.
    #[error("Large file upload of {path} rejected: {message}")]
    Lfs { path: String, message: String },
}

/// Result type alias for registry operations
pub type RegistryResult<T> = std::result::Result<T, RegistryError>;

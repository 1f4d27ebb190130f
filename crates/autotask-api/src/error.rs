//! Error types for the Autotask API client.

use thiserror::Error;

/// A specialized Result type for API operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when interacting with the Autotask API.
#[derive(Debug, Error)]
pub enum Error {
    /// No usable session context (missing credentials or zone URL).
    #[error("not authenticated: no API session is configured; supply the integration code, username, secret and zone URL")]
    NotAuthenticated,

    /// The logical resource name has no registry entry.
    #[error("unknown resource '{name}'")]
    UnknownResource {
        /// The name that failed to resolve.
        name: String,
    },

    /// The resource has no `/query` endpoint, so filter selectors and
    /// counts cannot be used with it.
    #[error("resource '{name}' does not support query filters; fetch it by id or through its parent")]
    QueryNotSupported {
        /// The resource name the selector was aimed at.
        name: String,
    },

    /// A filter expression failed to compile.
    #[error(transparent)]
    Query(#[from] autotask_query_rs::QueryError),

    /// A filter tree failed to serialize to its wire document.
    #[error("filter serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The API rejected the request.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The request never produced an HTTP response (network/TLS/DNS failure),
    /// or the response body could not be read or decoded.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

impl Error {
    /// Creates an unknown resource error.
    pub fn unknown_resource(name: impl Into<String>) -> Self {
        Error::UnknownResource { name: name.into() }
    }

    /// Creates a query-not-supported error.
    pub fn query_not_supported(name: impl Into<String>) -> Self {
        Error::QueryNotSupported { name: name.into() }
    }
}

/// HTTP-level failures classified from an API response.
///
/// Classification order mirrors how the responses are checked: 401 first,
/// then maintenance pages (404 or an HTML body), then the structured error
/// envelope, then any other non-2xx status.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    /// Authentication failure (HTTP 401).
    #[error("authentication rejected (HTTP 401) for {url}; verify the integration code, username and secret, then re-authenticate")]
    Auth {
        /// The URL that failed.
        url: String,
    },

    /// Not-found or HTML response, typically a maintenance page rather
    /// than a JSON API error.
    #[error("service unavailable for {url}: {snippet}")]
    ServiceUnavailable {
        /// The URL that failed.
        url: String,
        /// A truncated body snippet for diagnostics.
        snippet: String,
    },

    /// A structured JSON error envelope with an errors list.
    #[error("API error (HTTP {status}) for {url}: {messages}")]
    Api {
        /// The HTTP status code.
        status: u16,
        /// The URL that failed.
        url: String,
        /// The joined error messages from the envelope.
        messages: String,
    },

    /// Any other non-2xx status.
    #[error("HTTP error {status} for {url}: {snippet}")]
    Http {
        /// The HTTP status code.
        status: u16,
        /// The URL that failed.
        url: String,
        /// A truncated body snippet, or the canonical status reason.
        snippet: String,
    },
}

impl ApiError {
    /// Returns the HTTP status associated with this error, where known.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Auth { .. } => Some(401),
            ApiError::ServiceUnavailable { .. } => None,
            ApiError::Api { status, .. } | ApiError::Http { status, .. } => Some(*status),
        }
    }

    /// Returns the URL the failing request was sent to.
    pub fn url(&self) -> &str {
        match self {
            ApiError::Auth { url }
            | ApiError::ServiceUnavailable { url, .. }
            | ApiError::Api { url, .. }
            | ApiError::Http { url, .. } => url,
        }
    }
}

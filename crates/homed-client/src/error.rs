//! Error types for API requests.

use std::error::Error;

use homed_search::SearchError;
use thiserror::Error;

/// Failure while talking to the marketplace API.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client")]
    Build {
        /// Underlying builder failure.
        #[source]
        source: reqwest::Error,
    },
    /// The configured base URL and path do not form a valid URL.
    #[error("invalid endpoint URL")]
    InvalidUrl {
        /// The rejected URL text.
        url: String,
        /// Parser failure.
        #[source]
        source: url::ParseError,
    },
    /// The request did not complete.
    #[error("request failed")]
    Transport {
        /// Endpoint path.
        endpoint: String,
        /// Underlying transport failure.
        #[source]
        source: reqwest::Error,
    },
    /// The server answered with a non-success status.
    #[error("unexpected response status")]
    Status {
        /// Endpoint path.
        endpoint: String,
        /// HTTP status code.
        status: u16,
        /// Response body, trimmed.
        body: String,
    },
    /// The envelope reported `success: false`.
    #[error("request rejected")]
    Rejected {
        /// Endpoint path.
        endpoint: String,
        /// Server-provided summary.
        message: String,
    },
    /// The body was not the expected envelope.
    #[error("malformed response body")]
    Decode {
        /// Endpoint path.
        endpoint: String,
        /// Decoder failure.
        #[source]
        source: reqwest::Error,
    },
}

/// Convenience alias for client results.
pub type ClientResult<T> = Result<T, ClientError>;

impl ClientError {
    /// One-line description including the endpoint and underlying causes.
    #[must_use]
    pub fn detail(&self) -> String {
        let mut message = match self {
            Self::Build { .. } => self.to_string(),
            Self::InvalidUrl { url, .. } => format!("{self} '{url}'"),
            Self::Transport { endpoint, .. } | Self::Decode { endpoint, .. } => {
                format!("{self} ({endpoint})")
            }
            Self::Status {
                endpoint,
                status,
                body,
            } if body.is_empty() => format!("{self} {status} ({endpoint})"),
            Self::Status {
                endpoint,
                status,
                body,
            } => format!("{self} {status} ({endpoint}): {body}"),
            Self::Rejected { endpoint, message } => format!("{self} ({endpoint}): {message}"),
        };
        let mut cause = self.source();
        while let Some(err) = cause {
            message.push_str(": ");
            message.push_str(&err.to_string());
            cause = err.source();
        }
        message
    }
}

impl From<ClientError> for SearchError {
    fn from(err: ClientError) -> Self {
        let message = err.detail();
        match err {
            ClientError::Rejected { .. } => Self::rejected(message),
            ClientError::Status { status, .. } if (400..500).contains(&status) => {
                Self::rejected(message)
            }
            ClientError::Decode { .. } => Self::decode(message),
            ClientError::Build { .. }
            | ClientError::InvalidUrl { .. }
            | ClientError::Transport { .. }
            | ClientError::Status { .. } => Self::transport(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_errors_map_by_class() {
        let client_side = ClientError::Status {
            endpoint: "/properties".into(),
            status: 422,
            body: "bad page".into(),
        };
        assert_eq!(
            SearchError::from(client_side),
            SearchError::rejected("unexpected response status 422 (/properties): bad page")
        );

        let server_side = ClientError::Status {
            endpoint: "/properties".into(),
            status: 503,
            body: String::new(),
        };
        assert!(matches!(
            SearchError::from(server_side),
            SearchError::Transport { .. }
        ));
    }

    #[test]
    fn rejections_keep_the_server_message() {
        let err = ClientError::Rejected {
            endpoint: "/search/suggestions".into(),
            message: "index rebuilding".into(),
        };
        assert_eq!(
            err.detail(),
            "request rejected (/search/suggestions): index rebuilding"
        );
    }

    #[test]
    fn invalid_urls_include_the_parser_cause() {
        let err = ClientError::InvalidUrl {
            url: "not a url".into(),
            source: url::ParseError::RelativeUrlWithoutBase,
        };
        assert_eq!(
            err.detail(),
            "invalid endpoint URL 'not a url': relative URL without a base"
        );
    }
}

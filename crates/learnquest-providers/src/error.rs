//! Provider error types.

use thiserror::Error;

use learnquest_core::error::{DataError, FetchError};

/// Errors that can occur when talking to a question generator service.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Authentication failed (invalid API key).
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The API returned an error response.
    #[error("API error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A network error occurred.
    #[error("network error: {0}")]
    NetworkError(String),

    /// The response body could not be understood.
    #[error(transparent)]
    Data(#[from] DataError),
}

impl From<ProviderError> for FetchError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::AuthenticationFailed(message) => FetchError::Api {
                status: 401,
                message,
            },
            ProviderError::ApiError { status, message } => FetchError::Api { status, message },
            ProviderError::Timeout(secs) => FetchError::Timeout(secs),
            ProviderError::NetworkError(message) => FetchError::Network(message),
            ProviderError::Data(data) => FetchError::Data(data),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_to_fetch_error() {
        assert_eq!(
            FetchError::from(ProviderError::Timeout(10)),
            FetchError::Timeout(10)
        );
        assert!(FetchError::from(ProviderError::Data(DataError::EmptyQuestionList)).is_data_error());
        assert_eq!(
            FetchError::from(ProviderError::AuthenticationFailed("bad key".into())),
            FetchError::Api {
                status: 401,
                message: "bad key".into()
            }
        );
    }
}

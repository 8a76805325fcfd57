//! Error types for NovaBot Lambda functions.

use aws_sdk_bedrockagentruntime::error::ProvideErrorMetadata;
use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in NovaBot Lambda functions.
#[derive(Error, Debug)]
pub enum Error {
    /// AWS SDK service error, keyed by the modeled exception name
    #[error("AWS error ({code}): {message}")]
    Aws { code: String, message: String },

    /// Zendesk API returned a non-success status
    #[error("Zendesk error ({status}): {message}")]
    Zendesk { status: u16, message: String },

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Build an `Aws` error from an SDK error, preserving the exception name.
    pub fn aws<E>(context: &str, err: E) -> Self
    where
        E: ProvideErrorMetadata + std::fmt::Display,
    {
        let code = err.code().unwrap_or("UnknownError").to_string();
        let message = match err.message() {
            Some(message) => format!("{}: {}", context, message),
            None => format!("{}: {}", context, err),
        };

        Error::Aws { code, message }
    }

    /// Get HTTP status code for this error.
    ///
    /// AWS exceptions pass through by name; everything else that isn't a
    /// caller mistake is a 500.
    pub fn status_code(&self) -> u16 {
        match self {
            Error::Validation(_) => 400,
            Error::Aws { code, .. } => match code.as_str() {
                "ValidationException" => 400,
                "AccessDeniedException" => 403,
                "ResourceNotFoundException" => 404,
                "ConflictException" => 409,
                "ThrottlingException" | "ServiceQuotaExceededException" => 429,
                "DependencyFailedException" | "BadGatewayException" => 502,
                "ModelNotReadyException" => 503,
                _ => 500,
            },
            _ => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aws_error(code: &str) -> Error {
        Error::Aws {
            code: code.to_string(),
            message: "boom".to_string(),
        }
    }

    #[test]
    fn test_aws_exception_names_map_to_statuses() {
        assert_eq!(aws_error("ValidationException").status_code(), 400);
        assert_eq!(aws_error("AccessDeniedException").status_code(), 403);
        assert_eq!(aws_error("ResourceNotFoundException").status_code(), 404);
        assert_eq!(aws_error("ConflictException").status_code(), 409);
        assert_eq!(aws_error("ThrottlingException").status_code(), 429);
        assert_eq!(aws_error("ServiceQuotaExceededException").status_code(), 429);
        assert_eq!(aws_error("DependencyFailedException").status_code(), 502);
        assert_eq!(aws_error("BadGatewayException").status_code(), 502);
        assert_eq!(aws_error("ModelNotReadyException").status_code(), 503);
        assert_eq!(aws_error("InternalServerException").status_code(), 500);
        assert_eq!(aws_error("UnknownError").status_code(), 500);
    }

    #[test]
    fn test_validation_is_400() {
        assert_eq!(Error::Validation("bad".to_string()).status_code(), 400);
    }

    #[test]
    fn test_zendesk_is_always_500() {
        let err = Error::Zendesk {
            status: 422,
            message: "unprocessable".to_string(),
        };
        assert_eq!(err.status_code(), 500);
    }

    #[test]
    fn test_config_and_internal_are_500() {
        assert_eq!(Error::Config("X not set".to_string()).status_code(), 500);
        assert_eq!(Error::Internal("oops".to_string()).status_code(), 500);
    }
}

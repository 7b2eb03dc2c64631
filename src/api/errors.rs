use crate::session::SessionError;
use thiserror::Error;

#[derive(Clone, Debug, Error)]
pub enum ApiError {
    #[error("Config error: {0}")]
    Config(String),
    #[error("Network error: {0}")]
    Network(String),
    #[error("Timeout: {0}")]
    Timeout(String),
    #[error("Request failed ({status}): {message}")]
    Http { status: u16, message: String },
    #[error("Response error: {0}")]
    Parse(String),
    #[error("Not signed in: no session token stored")]
    MissingToken,
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout("Request timed out. Please try again.".to_string())
        } else if err.is_decode() {
            Self::Parse(format!("Failed to decode response: {err}"))
        } else if err.is_builder() {
            Self::Config(format!("Failed to build request: {err}"))
        } else {
            Self::Network(format!("Unable to reach the server: {err}"))
        }
    }
}

impl From<ApiError> for SessionError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Config(_) | ApiError::Network(_) | ApiError::Timeout(_) => {
                Self::Transient(err.to_string())
            }
            ApiError::Http { status, message } => match status {
                500..=599 => Self::Transient(message),
                400 | 409 | 422 => Self::Validation(message),
                _ => Self::Auth(message),
            },
            ApiError::Parse(message) => Self::Auth(format!("unexpected response: {message}")),
            ApiError::MissingToken => Self::Auth(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn http(status: u16) -> SessionError {
        ApiError::Http {
            status,
            message: "Incorrect email or password".to_string(),
        }
        .into()
    }

    #[test]
    fn status_codes_map_to_taxonomy() {
        assert!(matches!(http(401), SessionError::Auth(_)));
        assert!(matches!(http(403), SessionError::Auth(_)));
        assert!(matches!(http(404), SessionError::Auth(_)));
        assert!(matches!(http(400), SessionError::Validation(_)));
        assert!(matches!(http(409), SessionError::Validation(_)));
        assert!(matches!(http(422), SessionError::Validation(_)));
        assert!(matches!(http(502), SessionError::Transient(_)));
    }

    #[test]
    fn transport_failures_are_transient() {
        let network: SessionError = ApiError::Network("connection refused".to_string()).into();
        let timeout: SessionError = ApiError::Timeout("slow".to_string()).into();
        assert!(network.is_transient());
        assert!(timeout.is_transient());
    }

    #[test]
    fn missing_token_and_bad_payload_are_auth_errors() {
        assert!(matches!(
            SessionError::from(ApiError::MissingToken),
            SessionError::Auth(_)
        ));
        assert!(matches!(
            SessionError::from(ApiError::Parse("missing field `_id`".to_string())),
            SessionError::Auth(message) if message.contains("_id")
        ));
    }
}

use http::StatusCode;

pub type Result<T> = std::result::Result<T, Error>;

/// Reasons a request is refused before anything is sent upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("token required")]
    MissingToken,
    #[error("invalid token")]
    InvalidToken,
    #[error("server misconfigured: upstream credential not set")]
    ServerMisconfigured,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    // Auth errors
    #[error(transparent)]
    Auth(#[from] AuthError),

    // Upstream errors
    #[error("internal server error: {0}")]
    Network(String),
    #[error("{message}")]
    UpstreamStatus { status: StatusCode, message: String },

    // Generic errors
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Status code this error is reported with.
    pub fn status(&self) -> StatusCode {
        match self {
            Error::Auth(AuthError::MissingToken) => StatusCode::BAD_REQUEST,
            Error::Auth(AuthError::InvalidToken) => StatusCode::FORBIDDEN,
            Error::Auth(AuthError::ServerMisconfigured) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::UpstreamStatus { status, .. } => *status,
            Error::Network(_) | Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// axum IntoResponse implementation
#[cfg(feature = "axum")]
impl axum::response::IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        (status, self.to_string()).into_response()
    }
}

use axum::http::StatusCode;

pub const NO_SOURCE_MESSAGE: &str = "Unable to load any data. Please check your connection.";

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}

/// Failure reported by a [`DataSource`](crate::source::DataSource).
///
/// `Unavailable` lets a chain move on to its next source; `Upstream` means a
/// source answered with an error of its own and the chain stops there.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SourceError {
    #[error("source unavailable: {0}")]
    Unavailable(String),

    #[error("{0}")]
    Upstream(String),

    #[error("Unable to load any data. Please check your connection.")]
    Exhausted,
}

impl SourceError {
    /// Text shown to the user for this failure.
    pub fn user_message(&self) -> String {
        match self {
            SourceError::Upstream(message) => message.clone(),
            SourceError::Unavailable(_) | SourceError::Exhausted => NO_SOURCE_MESSAGE.to_string(),
        }
    }
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        Self::Unavailable(err.to_string())
    }
}

impl From<std::io::Error> for SourceError {
    fn from(err: std::io::Error) -> Self {
        Self::Unavailable(err.to_string())
    }
}

impl From<serde_json::Error> for SourceError {
    fn from(err: serde_json::Error) -> Self {
        Self::Unavailable(err.to_string())
    }
}

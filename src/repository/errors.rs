use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// Classified failure of a backend call.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Session token rejected")]
    Unauthorized,

    /// Login refused; carries the backend reason.
    #[error("Credentials rejected: {0}")]
    Credentials(String),

    #[error("Forbidden")]
    Forbidden,

    #[error("Entity not found")]
    NotFound,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Server error: {0}")]
    Server(u16),

    #[error("Connection error: {0}")]
    Network(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Unexpected response: {0}")]
    Decode(String),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

impl RepositoryError {
    /// Maps a non-success status and its body.
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let detail = || detail_from_body(body).unwrap_or_else(|| status.to_string());
        match status {
            StatusCode::UNAUTHORIZED => RepositoryError::Unauthorized,
            StatusCode::FORBIDDEN => RepositoryError::Forbidden,
            StatusCode::NOT_FOUND => RepositoryError::NotFound,
            StatusCode::UNPROCESSABLE_ENTITY => RepositoryError::Validation(detail()),
            s if s.is_server_error() => RepositoryError::Server(s.as_u16()),
            _ => RepositoryError::BadRequest(detail()),
        }
    }

    /// HTTP status the error stands for, if it came from a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            RepositoryError::Unauthorized | RepositoryError::Credentials(_) => Some(401),
            RepositoryError::Forbidden => Some(403),
            RepositoryError::NotFound => Some(404),
            RepositoryError::Validation(_) => Some(422),
            RepositoryError::BadRequest(_) => Some(400),
            RepositoryError::Server(code) => Some(*code),
            RepositoryError::Network(_) | RepositoryError::Timeout | RepositoryError::Decode(_) => {
                None
            }
        }
    }
}

impl From<reqwest::Error> for RepositoryError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            RepositoryError::Timeout
        } else if err.is_decode() {
            RepositoryError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            RepositoryError::from_status(status, "")
        } else {
            RepositoryError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for RepositoryError {
    fn from(err: serde_json::Error) -> Self {
        RepositoryError::Decode(err.to_string())
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    detail: Detail,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Detail {
    Message(String),
    Items(Vec<DetailItem>),
}

#[derive(Deserialize)]
struct DetailItem {
    msg: String,
}

/// Extracts `detail` from a backend error body.
///
/// FastAPI validation bodies carry a list of `{loc, msg, type}`; their
/// messages are joined.
pub fn detail_from_body(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    let detail = match parsed.detail {
        Detail::Message(message) => message,
        Detail::Items(items) => items
            .into_iter()
            .map(|item| item.msg)
            .collect::<Vec<_>>()
            .join("; "),
    };
    let detail = detail.trim().to_string();
    (!detail.is_empty()).then_some(detail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_statuses() {
        assert!(matches!(
            RepositoryError::from_status(StatusCode::UNAUTHORIZED, ""),
            RepositoryError::Unauthorized
        ));
        assert!(matches!(
            RepositoryError::from_status(StatusCode::FORBIDDEN, ""),
            RepositoryError::Forbidden
        ));
        assert!(matches!(
            RepositoryError::from_status(StatusCode::NOT_FOUND, ""),
            RepositoryError::NotFound
        ));
        assert!(matches!(
            RepositoryError::from_status(StatusCode::BAD_GATEWAY, ""),
            RepositoryError::Server(502)
        ));
        match RepositoryError::from_status(
            StatusCode::BAD_REQUEST,
            r#"{"detail": "Cliente ya existe"}"#,
        ) {
            RepositoryError::BadRequest(detail) => assert_eq!(detail, "Cliente ya existe"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn joins_fastapi_validation_messages() {
        let body = r#"{"detail": [
            {"loc": ["body", "correo"], "msg": "value is not a valid email address", "type": "value_error"},
            {"loc": ["body", "celular"], "msg": "field required", "type": "missing"}
        ]}"#;
        match RepositoryError::from_status(StatusCode::UNPROCESSABLE_ENTITY, body) {
            RepositoryError::Validation(detail) => assert_eq!(
                detail,
                "value is not a valid email address; field required"
            ),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn falls_back_to_status_text() {
        match RepositoryError::from_status(StatusCode::UNPROCESSABLE_ENTITY, "<html>") {
            RepositoryError::Validation(detail) => assert_eq!(detail, "422 Unprocessable Entity"),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(RepositoryError::Timeout.status(), None);
        assert_eq!(RepositoryError::Server(503).status(), Some(503));
    }
}

/// Error types for the hoot service
///
/// Every failure is handled per request and rendered straight to an HTTP
/// response. All paths use a JSON `{"err": message}` envelope except
/// `Forbidden`, which keeps the plain-text body clients of this API rely on.
use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use std::fmt;

/// Result type for hoot-service operations
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error types
#[derive(Debug)]
pub enum AppError {
    /// Missing or unverifiable bearer token
    Unauthorized(String),

    /// Non-owner attempted to mutate a hoot
    Forbidden,

    /// Hoot absent from the store
    NotFound(String),

    /// Store operation failed
    Database(String),

    /// Anything else escaping a handler
    Internal(String),
}

impl AppError {
    /// Message exposed to the client.
    fn message(&self) -> &str {
        match self {
            AppError::Unauthorized(msg)
            | AppError::NotFound(msg)
            | AppError::Database(msg)
            | AppError::Internal(msg) => msg,
            AppError::Forbidden => "You're not allowed to do that!",
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::Forbidden => write!(f, "Forbidden"),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::Database(msg) => write!(f, "Database error: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            // The 403 body is bare text, not the JSON envelope.
            AppError::Forbidden => HttpResponse::Forbidden()
                .content_type("text/plain; charset=utf-8")
                .body(self.message().to_owned()),
            _ => HttpResponse::build(self.status_code())
                .json(serde_json::json!({ "err": self.message() })),
        }
    }
}

impl From<mongodb::error::Error> for AppError {
    fn from(err: mongodb::error::Error) -> Self {
        AppError::Database(err.to_string())
    }
}

impl From<bson::ser::Error> for AppError {
    fn from(err: bson::ser::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;
    use actix_web::http::header;

    #[actix_web::test]
    async fn forbidden_renders_plain_text_without_envelope() {
        let resp = AppError::Forbidden.error_response();

        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        let content_type = resp
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap()
            .to_owned();
        assert!(content_type.starts_with("text/plain"));

        let body = to_bytes(resp.into_body()).await.unwrap();
        assert_eq!(&body[..], b"You're not allowed to do that!");
    }

    #[actix_web::test]
    async fn not_found_uses_err_envelope() {
        let resp = AppError::NotFound("Hoot not found.".to_string()).error_response();

        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body = to_bytes(resp.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["err"], "Hoot not found.");
    }

    #[actix_web::test]
    async fn database_error_exposes_message() {
        let resp = AppError::Database("connection reset".to_string()).error_response();

        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = to_bytes(resp.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["err"], "connection reset");
    }

    #[actix_web::test]
    async fn unauthorized_uses_err_envelope() {
        let resp = AppError::Unauthorized("Invalid token.".to_string()).error_response();

        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body = to_bytes(resp.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["err"], "Invalid token.");
    }
}

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use diesel::result::DatabaseErrorKind;
use serde::{Deserialize, Serialize};

use crate::types::ApiErrorResponse;

/// Application error codes following the pattern E{service}{sequence}
///
/// Ranges:
/// - E0xxx: Shared/infrastructure errors
/// - E1xxx: Auth errors
/// - E2xxx: User errors
/// - E3xxx: Matching errors
/// - E4xxx: Messaging errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    // Shared (E0xxx)
    InternalError,
    ValidationError,
    NotFound,
    Unauthorized,
    Forbidden,
    ServiceUnavailable,
    BadRequest,
    PayloadTooLarge,
    Conflict,

    // Auth (E1xxx)
    InvalidCredentials,
    EmailAlreadyExists,
    PasswordTooWeak,
    TokenExpired,
    TokenInvalid,

    // User (E2xxx)
    UserNotFound,
    InvalidProfile,
    PhotoNotFound,
    PhotoUploadFailed,
    TooManyPhotos,

    // Matching (E3xxx)
    CannotSwipeSelf,
    SwipeTargetNotFound,
    NotMatched,
    MatchNotFound,
    ProfileIncomplete,

    // Messaging (E4xxx)
    ChatNotFound,
    NotChatParticipant,
    MessageNotFound,
    DirectChatParticipants,
    NotMessageSender,
    InsufficientChatRole,
    GroupOnlyOperation,
}

impl ErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            // Shared
            Self::InternalError => "E0001",
            Self::ValidationError => "E0002",
            Self::NotFound => "E0003",
            Self::Unauthorized => "E0004",
            Self::Forbidden => "E0005",
            Self::ServiceUnavailable => "E0007",
            Self::BadRequest => "E0008",
            Self::PayloadTooLarge => "E0009",
            Self::Conflict => "E0010",

            // Auth
            Self::InvalidCredentials => "E1001",
            Self::EmailAlreadyExists => "E1002",
            Self::PasswordTooWeak => "E1003",
            Self::TokenExpired => "E1004",
            Self::TokenInvalid => "E1005",

            // User
            Self::UserNotFound => "E2001",
            Self::InvalidProfile => "E2002",
            Self::PhotoNotFound => "E2003",
            Self::PhotoUploadFailed => "E2004",
            Self::TooManyPhotos => "E2005",

            // Matching
            Self::CannotSwipeSelf => "E3001",
            Self::SwipeTargetNotFound => "E3002",
            Self::NotMatched => "E3003",
            Self::MatchNotFound => "E3004",
            Self::ProfileIncomplete => "E3005",

            // Messaging
            Self::ChatNotFound => "E4001",
            Self::NotChatParticipant => "E4002",
            Self::MessageNotFound => "E4003",
            Self::DirectChatParticipants => "E4004",
            Self::NotMessageSender => "E4005",
            Self::InsufficientChatRole => "E4006",
            Self::GroupOnlyOperation => "E4007",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ServiceUnavailable | Self::PhotoUploadFailed => StatusCode::SERVICE_UNAVAILABLE,
            Self::ValidationError | Self::BadRequest | Self::PasswordTooWeak
            | Self::InvalidProfile | Self::TooManyPhotos | Self::CannotSwipeSelf
            | Self::ProfileIncomplete | Self::DirectChatParticipants
            | Self::GroupOnlyOperation => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::NotFound | Self::UserNotFound | Self::PhotoNotFound
            | Self::SwipeTargetNotFound | Self::MatchNotFound | Self::ChatNotFound
            | Self::MessageNotFound => StatusCode::NOT_FOUND,
            Self::Unauthorized | Self::InvalidCredentials | Self::TokenExpired
            | Self::TokenInvalid => StatusCode::UNAUTHORIZED,
            Self::Forbidden | Self::NotMatched | Self::NotChatParticipant
            | Self::NotMessageSender | Self::InsufficientChatRole => StatusCode::FORBIDDEN,
            Self::Conflict | Self::EmailAlreadyExists => StatusCode::CONFLICT,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{message}")]
    Known {
        code: ErrorCode,
        message: String,
        details: Option<serde_json::Value>,
    },

    #[error("internal server error")]
    Internal(#[from] anyhow::Error),

    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),

    #[error("validation error: {0}")]
    Validation(String),
}

impl AppError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Known {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(code: ErrorCode, message: impl Into<String>, details: serde_json::Value) -> Self {
        Self::Known {
            code,
            message: message.into(),
            details: Some(details),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::BadRequest, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Forbidden, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Conflict, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// Error code carried by this error, as it will be reported to the client.
    pub fn error_code(&self) -> ErrorCode {
        match self {
            AppError::Known { code, .. } => *code,
            AppError::Internal(_) => ErrorCode::InternalError,
            AppError::Database(err) => database_error_code(err),
            AppError::Validation(_) => ErrorCode::ValidationError,
        }
    }
}

/// Transaction aborts and constraint races are surfaced as conflicts so the
/// caller can retry the whole request.
fn database_error_code(err: &diesel::result::Error) -> ErrorCode {
    match err {
        diesel::result::Error::NotFound => ErrorCode::NotFound,
        diesel::result::Error::DatabaseError(kind, _) => match kind {
            DatabaseErrorKind::UniqueViolation | DatabaseErrorKind::SerializationFailure => {
                ErrorCode::Conflict
            }
            DatabaseErrorKind::ForeignKeyViolation | DatabaseErrorKind::CheckViolation => {
                ErrorCode::ValidationError
            }
            _ => ErrorCode::InternalError,
        },
        _ => ErrorCode::InternalError,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_response) = match &self {
            AppError::Known { code, message, details } => {
                let status = code.status_code();
                let mut resp = ApiErrorResponse::new(code.code(), message);
                if let Some(d) = details {
                    resp = resp.with_details(d.clone());
                }
                (status, resp)
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiErrorResponse::new("E0001", "internal server error"),
                )
            }
            AppError::Database(err) => {
                let code = database_error_code(err);
                let message = match code {
                    ErrorCode::NotFound => "resource not found",
                    ErrorCode::Conflict => "concurrent update, please retry",
                    ErrorCode::ValidationError => "request violates a data constraint",
                    _ => "database error",
                };
                if code == ErrorCode::InternalError {
                    tracing::error!(error = %err, "database error");
                } else {
                    tracing::warn!(error = %err, code = code.code(), "database constraint error");
                }
                (code.status_code(), ApiErrorResponse::new(code.code(), message))
            }
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                ApiErrorResponse::new("E0002", msg),
            ),
        };

        (status, Json(error_response)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

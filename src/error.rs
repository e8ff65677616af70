use axum::{
    Json,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use validator::ValidationErrors;

use crate::{
    model::{AnalysisError, ErrorKind},
    models,
};

pub trait StdErrorExt: std::error::Error + Send + Sync + 'static {}
impl<T> StdErrorExt for T where T: std::error::Error + Send + Sync + 'static {}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{user_message}")]
    BadRequest {
        tag: &'static str,
        user_message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    #[error("{user_message}")]
    UnsupportedMediaType {
        user_message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    #[error("{user_message}")]
    PayloadTooLarge {
        user_message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    #[error("{user_message}")]
    UnprocessableEntity {
        user_message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    #[error("{0}")]
    Validation(#[from] ValidationErrors),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AppError {
    pub fn bad_request_with_source<E>(msg: impl Into<String>, err: E) -> Self
    where
        E: StdErrorExt,
    {
        Self::BadRequest {
            tag: "bad_request",
            user_message: msg.into(),
            source: Some(anyhow::Error::new(err)),
        }
    }
}

impl AppError {
    fn source_error(&self) -> Option<&anyhow::Error> {
        match self {
            AppError::BadRequest { source, .. }
            | AppError::UnsupportedMediaType { source, .. }
            | AppError::PayloadTooLarge { source, .. }
            | AppError::UnprocessableEntity { source, .. } => source.as_ref(),
            _ => None,
        }
    }
}

impl From<AnalysisError> for AppError {
    fn from(err: AnalysisError) -> Self {
        let user_message = match &err {
            AnalysisError::Stream(_) => String::from("error reading model stream"),
            other => other.to_string(),
        };
        let kind = err.kind();
        let source = Some(anyhow::Error::new(err));

        match kind {
            ErrorKind::UnsupportedFormat => Self::UnsupportedMediaType {
                user_message,
                source,
            },
            ErrorKind::TooLarge => Self::PayloadTooLarge {
                user_message,
                source,
            },
            ErrorKind::InvalidMesh => Self::UnprocessableEntity {
                user_message,
                source,
            },
            ErrorKind::Malformed | ErrorKind::PrematureEnd | ErrorKind::Stream => {
                Self::BadRequest {
                    tag: kind.as_str(),
                    user_message,
                    source,
                }
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status_code, tag, user_message) = match &self {
            AppError::BadRequest {
                tag, user_message, ..
            } => (StatusCode::BAD_REQUEST, *tag, user_message.clone()),
            AppError::UnsupportedMediaType { user_message, .. } => (
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                ErrorKind::UnsupportedFormat.as_str(),
                user_message.clone(),
            ),
            AppError::PayloadTooLarge { user_message, .. } => (
                StatusCode::PAYLOAD_TOO_LARGE,
                ErrorKind::TooLarge.as_str(),
                user_message.clone(),
            ),
            AppError::UnprocessableEntity { user_message, .. } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorKind::InvalidMesh.as_str(),
                user_message.clone(),
            ),
            AppError::Validation(errs) => {
                let msg = errs
                    .field_errors()
                    .values()
                    .flat_map(|v| v.iter())
                    .flat_map(|e| e.message.as_ref().map(|m| m.to_string()))
                    .next()
                    .unwrap_or_else(|| "invalid value".to_string());

                (StatusCode::BAD_REQUEST, "validation", msg)
            }
            AppError::Other(error) => {
                log::error!("[other] unexpected error: {:?}", error);

                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "other",
                    String::from("something went wrong"),
                )
            }
        };

        match (tag == "other", self.source_error()) {
            (true, Some(source)) => log::error!("[{}] {}: {:?}", tag, user_message, source),
            (true, None) => log::error!("[{}] {}", tag, user_message),
            (false, Some(source)) => log::info!("[{}] {}: {:?}", tag, user_message, source),
            (false, None) => log::info!("[{}] {}", tag, user_message),
        }

        (
            status_code,
            [(header::CONTENT_TYPE, "application/json")],
            Json(models::error::ResponseError {
                status: String::from("error"),
                kind: tag.to_string(),
                message: user_message,
            }),
        )
            .into_response()
    }
}

use std::sync::{Arc, OnceLock};

use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use validator::ValidationErrors;

use crate::error_responses;

pub use response::ErrorResponse;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    // request
    #[error("missing_details")]
    MissingDetails,
    #[error("incorrect_id")]
    IncorrectId,
    #[error("incorrect_details: {0}")]
    IncorrectDetails(#[from] ValidationErrors),
    #[error("invalid_field: {field}")]
    InvalidField { field: &'static str, value: String },
    #[error("quota_exceeded")]
    QuotaExceeded,

    #[error("not_found")]
    NotFound(String),

    #[error(transparent)]
    DB(crate::db::Error),

    #[error(transparent)]
    Config(#[from] envy::Error),

    #[error("unexpected")]
    Unexpected(String),
}

impl From<crate::db::Error> for Error {
    fn from(error: crate::db::Error) -> Self {
        match error {
            crate::db::Error::NotFound(msg) => Self::NotFound(msg),
            error => Self::DB(error),
        }
    }
}

/// crate::Error <--> tokio_rusqlite::Error
///
/// Store closures return `crate::Error` through `tokio_rusqlite::Error::Other`;
/// it is unwrapped again on the way out. Anything else goes through `db::Error`,
/// which turns "no rows" into `NotFound`.
pub mod db_mappers {
    use super::*;

    impl From<tokio_rusqlite::Error> for Error {
        fn from(error: tokio_rusqlite::Error) -> Self {
            match error {
                tokio_rusqlite::Error::Other(err) => match err.downcast::<Error>() {
                    Ok(err) => *err,
                    Err(err) => crate::db::Error::from(tokio_rusqlite::Error::Other(err)).into(),
                },
                error => crate::db::Error::from(error).into(),
            }
        }
    }

    impl From<Error> for tokio_rusqlite::Error {
        fn from(error: Error) -> Self {
            tokio_rusqlite::Error::Other(error.into())
        }
    }
}

// Response

error_responses! {
    missing_details: 400 => "Missing details",
    incorrect_id: 400 => "Incorrect Id.",
    incorrect_details: 400 => "Incorrect note details",
    invalid_field: 400 => "Error:: Invalid field",
    quota_exceeded: 400 => "Notes' limit reached",
    not_found: 404 => "Not found.",
    unexpected: 500 => "Error:: Unexpected"
}

impl From<&Error> for ErrorResponse {
    fn from(error: &Error) -> Self {
        let errors = errors();
        match error {
            Error::MissingDetails => errors.missing_details.clone(),
            Error::IncorrectId => errors.incorrect_id.clone(),
            Error::IncorrectDetails(_) => errors.incorrect_details.clone(),
            Error::InvalidField { field, value } => errors
                .invalid_field
                .with_message(format!("Error:: Invalid {field}: {value}")),
            Error::QuotaExceeded => errors.quota_exceeded.clone(),
            Error::NotFound(message) => errors.not_found.with_message(message),
            Error::DB(_) => errors.unexpected.with_message("Error:: Unexpected database failure"),
            Error::Unexpected(message) => errors.unexpected.with_message(format!("Error:: {message}")),
            Error::Config(_) => errors.unexpected.clone(),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        let error = Arc::new(self);

        let error_res = ErrorResponse::from(error.as_ref());
        let mut res = error_res.into_response();
        res.extensions_mut().insert(error);

        res
    }
}

pub async fn on_error(request: Request, next: Next) -> Response {
    let response = next.run(request).await;

    let error = response.extensions().get::<Arc<Error>>().map(Arc::as_ref);
    if let Some(error) = error {
        if response.status().is_server_error() {
            tracing::error!("{:?}", error);
        } else {
            tracing::debug!("{:?}", error);
        }
    }

    response
}

mod response {
    use super::*;

    /// Uniform error body: `{"error": "<message>"}`.
    #[derive(Debug, Serialize, Clone)]
    pub struct ErrorResponse {
        pub error: String,
        #[serde(skip)]
        pub status: u16,
    }

    impl Default for ErrorResponse {
        fn default() -> Self {
            Self {
                error: "An Error occurred.".into(),
                status: 501,
            }
        }
    }

    impl ErrorResponse {
        pub fn new(error: impl Into<String>, status: u16) -> Self {
            Self {
                error: error.into(),
                status,
            }
        }

        pub fn with_message(&self, message: impl Into<String>) -> Self {
            let mut res = self.clone();
            res.error = message.into();
            res
        }
    }

    impl IntoResponse for ErrorResponse {
        fn into_response(self) -> Response {
            let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::NOT_IMPLEMENTED);
            (status, axum::Json(self)).into_response()
        }
    }

    /// Named error responses with their status and default message
    /// ```rust
    /// error_responses! {
    ///     not_found: 404 => "Not found.",
    ///     unexpected: 500 => "Error:: Unexpected"
    /// }
    ///
    /// impl From<&Error> for ErrorResponse {
    ///     fn from(error: &Error) -> Self {
    ///     let errors = errors(); // <- from macro
    ///     match error {
    ///         Error::NotFound(message) => errors.not_found.with_message(message),
    ///         Error::Unexpected(_) => errors.unexpected.clone(),
    ///     }
    /// }
    /// ```
    #[macro_export]
    macro_rules! error_responses {
        (
            $($name:ident: $code:expr => $message:expr),* $(,)?
        ) => {
            #[derive(Debug, Clone)]
            struct Responses {
                $(
                    $name: ErrorResponse,
                )*
            }

            static ERRORS: OnceLock<Responses> = OnceLock::new();

            fn errors() -> &'static Responses {
                ERRORS.get_or_init(|| Responses {
                    $(
                        $name: ErrorResponse::new($message, $code),
                    )*
                })
            }
        };
    }
}

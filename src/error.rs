//! Error types.

use log::{error, warn};

use rocket::http::{Status, StatusClass};
use rocket::response::{self, Responder};
use rocket::serde::json::Json;
use rocket::Request;

use derive_more::{Display, From};

use crate::models::{CommentId, PostId, SubId};
use crate::views::error::ErrorView;

/// Our error type.
#[derive(Debug, Display, From)]
pub enum Error {
    #[display(fmt = "Missing param '{}'", param)]
    MissingParam { param: String },
    #[display(fmt = "Invalid param '{}', expected {}", param, expected)]
    InvalidParam {
        param: String,
        expected: &'static str,
    },
    #[display(fmt = "Request body must be a JSON object")]
    BodyNotObject,
    #[display(fmt = "Request body is not valid JSON: {}", cause)]
    BodyNotJson { cause: serde_json::Error },
    #[display(fmt = "Couldn't read request body: {}", cause)]
    BodyUnreadable { cause: std::io::Error },
    #[display(fmt = "Request body is larger than the limit of {}", limit)]
    BodyTooLarge { limit: rocket::data::ByteUnit },
    #[display(fmt = "Sub #{} not found", sub_id)]
    SubNotFound { sub_id: SubId },
    #[display(fmt = "Post #{} not found", post_id)]
    PostNotFound { post_id: PostId },
    #[display(fmt = "Comment #{} not found", comment_id)]
    CommentNotFound { comment_id: CommentId },
    #[display(fmt = "A sub named '{}' already exists", name)]
    SubNameTaken { name: String },
    #[display(fmt = "Can't comment on post #{}, it doesn't exist", post_id)]
    CommentPostNotFound { post_id: PostId },
    #[display(fmt = "Constraint violation: {}", message)]
    ConstraintViolation { message: String },
    #[display(fmt = "JSON error: {}", _0)]
    #[from]
    JsonError(serde_json::error::Error),
    #[display(fmt = "YAML error: {}", _0)]
    #[from]
    YamlError(serde_yaml::Error),
    #[display(fmt = "Couldn't initialize logging: {}", _0)]
    #[from]
    LogError(log::SetLoggerError),
    #[display(fmt = "Database connection pool error: {}", _0)]
    #[from]
    R2d2Error(r2d2::Error),
    #[display(fmt = "Database error: {}", _0)]
    #[from]
    DatabaseError(diesel::result::Error),
    #[display(fmt = "Database migration error: {}", _0)]
    DatabaseMigrationError(Box<dyn std::error::Error + Send + Sync>),
    #[display(fmt = "Couldn't connect to the SQLite database: {}", _0)]
    #[from]
    ConnectionError(diesel::ConnectionError),
    #[display(fmt = "Database task failed: {}", _0)]
    #[from]
    TaskError(rocket::tokio::task::JoinError),
    #[display(fmt = "I/O error: {}", _0)]
    #[from]
    IoError(std::io::Error),
    #[display(fmt = "I/O error: {}: {}", msg, cause)]
    IoErrorMsg { cause: std::io::Error, msg: String },
    #[display(fmt = "Couldn't launch the server: {}", _0)]
    #[from]
    LaunchError(rocket::Error),
}

impl Error {
    pub fn from_io_error<S>(cause: std::io::Error, msg: S) -> Error
    where
        S: Into<String>,
    {
        Error::IoErrorMsg {
            cause,
            msg: msg.into(),
        }
    }

    /// The HTTP status this error is reported with.
    pub fn status(&self) -> Status {
        match self {
            Error::MissingParam { .. }
            | Error::InvalidParam { .. }
            | Error::BodyNotObject
            | Error::BodyNotJson { .. }
            | Error::BodyUnreadable { .. } => Status::BadRequest,

            Error::BodyTooLarge { .. } => Status::PayloadTooLarge,

            Error::SubNotFound { .. }
            | Error::PostNotFound { .. }
            | Error::CommentNotFound { .. } => Status::NotFound,

            Error::SubNameTaken { .. }
            | Error::CommentPostNotFound { .. }
            | Error::ConstraintViolation { .. } => Status::Conflict,

            Error::R2d2Error(..) => Status::ServiceUnavailable,

            _ => Status::InternalServerError,
        }
    }
}

impl<'r> Responder<'r, 'static> for Error {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'static> {
        let status = self.status();

        if status.class() == StatusClass::ServerError {
            error!("{}", &self);
        } else {
            warn!("{}", &self);
        }

        let view = ErrorView::new(status, self.to_string());

        (status, Json(view)).respond_to(req)
    }
}

impl std::error::Error for Error {}

/// Our result type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_map_to_4xx() {
        let missing = Error::MissingParam {
            param: "name".into(),
        };
        assert_eq!(missing.status(), Status::BadRequest);
        assert_eq!(missing.to_string(), "Missing param 'name'");

        let not_found = Error::PostNotFound { post_id: 7 };
        assert_eq!(not_found.status(), Status::NotFound);
        assert_eq!(not_found.to_string(), "Post #7 not found");

        let taken = Error::SubNameTaken {
            name: "programming".into(),
        };
        assert_eq!(taken.status(), Status::Conflict);
        assert_eq!(
            Error::CommentPostNotFound { post_id: 3 }.status(),
            Status::Conflict
        );
    }

    #[test]
    fn store_errors_map_to_5xx() {
        let err = Error::from(diesel::result::Error::RollbackTransaction);
        assert_eq!(err.status(), Status::InternalServerError);

        let err = Error::from_io_error(
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
            "Couldn't open config file",
        );
        assert_eq!(err.status(), Status::InternalServerError);
        assert_eq!(err.to_string(), "I/O error: Couldn't open config file: gone");
    }
}

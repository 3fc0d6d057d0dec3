use std::fmt;

use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};

/// How a caller should treat a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The named resource does not exist.
    NotFound,
    /// The request never got a usable answer (timeout, dispatch, transport),
    /// or the service throttled it or failed on its side.
    Transient,
    /// The request could not be built or the outcome cannot be used.
    Fatal,
    /// Any other service failure, e.g. access denied.
    Unknown,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::NotFound => "not found",
            ErrorKind::Transient => "transient",
            ErrorKind::Fatal => "fatal",
            ErrorKind::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteFailure {
    pub key: String,
    pub code: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{message}")]
    Service {
        kind: ErrorKind,
        code: Option<String>,
        message: String,
    },

    #[error(
        "{} object(s) in {bucket} could not be deleted (first: {})",
        .failed.len(),
        first_key(.failed)
    )]
    PartialDelete {
        bucket: String,
        failed: Vec<DeleteFailure>,
    },

    #[error("could not decode {what}: {reason}")]
    Decode { what: String, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

fn first_key(failed: &[DeleteFailure]) -> &str {
    failed.first().map(|f| f.key.as_str()).unwrap_or("none")
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn service(kind: ErrorKind, code: Option<&str>, message: impl Into<String>) -> Self {
        Error::Service {
            kind,
            code: code.map(str::to_owned),
            message: message.into(),
        }
    }

    pub fn decode(what: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::Decode {
            what: what.into(),
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Service { kind, .. } => *kind,
            Error::PartialDelete { .. } | Error::Decode { .. } | Error::Json(_) => ErrorKind::Fatal,
            Error::Io(_) => ErrorKind::Unknown,
        }
    }

    pub fn code(&self) -> Option<&str> {
        match self {
            Error::Service { code, .. } => code.as_deref(),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }
}

const NOT_FOUND_CODES: &[&str] = &[
    "NoSuchBucket",
    "NoSuchKey",
    "NotFound",
    "ResourceNotFoundException",
    "DBClusterNotFoundFault",
    "DBParameterGroupNotFound",
];

/// Throttling and server-side failures that the SDK's own retry policy also
/// treats as retryable.
const TRANSIENT_CODES: &[&str] = &[
    "SlowDown",
    "InternalError",
    "ServiceUnavailable",
    "RequestTimeout",
    "Throttling",
    "ThrottlingException",
    "ThrottledException",
    "TooManyRequestsException",
    "RequestLimitExceeded",
    "RequestThrottled",
    "RequestThrottledException",
    "ProvisionedThroughputExceededException",
    "TransactionInProgressException",
];

pub fn kind_for_code(code: Option<&str>) -> ErrorKind {
    match code {
        Some(code) if NOT_FOUND_CODES.contains(&code) => ErrorKind::NotFound,
        Some(code) if TRANSIENT_CODES.contains(&code) => ErrorKind::Transient,
        _ => ErrorKind::Unknown,
    }
}

/// Turns an SDK failure into an [`Error::Service`]. Works for every service
/// crate since they all share the smithy error types.
pub fn classify<E, R>(err: SdkError<E, R>) -> Error
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: fmt::Debug,
{
    match &err {
        SdkError::ServiceError(ctx) => {
            let inner = ctx.err();
            let code = inner.code();
            let message = inner
                .message()
                .map(str::to_owned)
                .unwrap_or_else(|| match code {
                    Some(code) => code.to_owned(),
                    None => DisplayErrorContext(inner).to_string(),
                });
            Error::service(kind_for_code(code), code, message)
        }
        SdkError::TimeoutError(_)
        | SdkError::DispatchFailure(_)
        | SdkError::ResponseError(_) => {
            Error::service(ErrorKind::Transient, None, DisplayErrorContext(&err).to_string())
        }
        SdkError::ConstructionFailure(_) => {
            Error::service(ErrorKind::Fatal, None, DisplayErrorContext(&err).to_string())
        }
        _ => Error::service(ErrorKind::Unknown, None, DisplayErrorContext(&err).to_string()),
    }
}

impl<E, R> From<SdkError<E, R>> for Error
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: fmt::Debug,
{
    fn from(err: SdkError<E, R>) -> Self {
        classify(err)
    }
}

use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use softlens::imgproc::filter::FilterError;
use softlens::io::IoError;

/// Errors raised while serving a blur request.
#[derive(thiserror::Error, Debug)]
pub enum ServeError {
    /// The multipart form has no image part.
    #[error("missing multipart part `{0}`")]
    MissingImage(&'static str),

    /// The multipart body could not be read.
    #[error("failed to read multipart body: {0}")]
    Multipart(#[from] MultipartError),

    /// The uploaded image exceeds the configured limit.
    #[error("uploaded image is {size} bytes, the limit is {max} bytes")]
    FileTooLarge { size: usize, max: usize },

    /// The kernel requested in the query is out of range.
    #[error("kernel size must be in 1..={max}, got {size}")]
    KernelTooLarge { size: usize, max: usize },

    /// Decoding or encoding the image failed.
    #[error(transparent)]
    Io(#[from] IoError),

    /// The filter rejected its input.
    #[error(transparent)]
    Filter(#[from] FilterError),

    /// The blocking filter task panicked or was cancelled.
    #[error("filter worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),

    /// The filter queue was closed.
    #[error("filter queue closed: {0}")]
    Queue(#[from] tokio::sync::AcquireError),
}

impl ServeError {
    /// The HTTP status reported for the error.
    pub fn status(&self) -> StatusCode {
        match self {
            ServeError::MissingImage(_) | ServeError::KernelTooLarge { .. } => {
                StatusCode::BAD_REQUEST
            }
            ServeError::Multipart(err) => err.status(),
            ServeError::FileTooLarge { .. }
            | ServeError::Io(IoError::TooManyPixels { .. })
            | ServeError::Io(IoError::DecodeLimitExceeded(_)) => StatusCode::PAYLOAD_TOO_LARGE,
            ServeError::Io(IoError::ImageDecodeError(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            ServeError::Filter(FilterError::InvalidBuffer { .. }) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ServeError::Filter(FilterError::UnknownEdgePolicy(_)) => StatusCode::BAD_REQUEST,
            ServeError::Io(_)
            | ServeError::Filter(_)
            | ServeError::Worker(_)
            | ServeError::Queue(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServeError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            log::error!("{self}");
        } else {
            log::warn!("{self}");
        }

        (
            status,
            Json(serde_json::json!({
                "error": self.to_string()
            })),
        )
            .into_response()
    }
}

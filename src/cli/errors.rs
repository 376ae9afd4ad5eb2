use thiserror::Error;

/// Application-specific errors for the CLI
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Missing required argument: {arg}")]
    MissingArgument { arg: String },

    #[error("Either --dst-crs or --like must be given")]
    MissingTarget,

    #[error("Resolution must be a positive number, got: {resolution}")]
    InvalidResolution { resolution: f64 },

    #[error("Band index must be 1 or greater")]
    ZeroBand,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config file: {0}")]
    Config(#[from] serde_json::Error),

    #[error(transparent)]
    Gridwarp(#[from] gridwarp::Error),
}

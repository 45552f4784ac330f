use std::path::PathBuf;

/// Errors surfaced by the command line tool
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("Failed to read links file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse GeoJSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Feature {index} has an invalid LineString: {reason}")]
    InvalidFeature { index: usize, reason: String },

    #[error(transparent)]
    Network(#[from] findlink_lib::NetworkError),
}

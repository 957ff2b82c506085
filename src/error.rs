use std::path::PathBuf;

use snafu::Snafu;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Everything that can abort a run. No stage recovers from another
/// stage's failure; the first error is surfaced as-is.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display("input file not found at {path:?}: {source}"))]
    NotFound {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("malformed chat export at {path:?}: {source}"))]
    Format {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[snafu(display("cannot render word cloud: {reason}"))]
    Render { reason: String },

    #[snafu(display("failed to write word cloud to {path:?}: {source}"))]
    Write {
        path: PathBuf,
        source: image::ImageError,
    },
}

use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("failed to start translation process: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("failed to read translation process output: {0}")]
    Io(#[from] std::io::Error),

    #[error("translation process did not finish within {0:?}")]
    Timeout(Duration),

    #[error("translation process exited with code {exit_code}")]
    ExternalProcessFailed { exit_code: i32, stderr: String },

    #[error("no result line found in translation output")]
    NoResultFound,

    #[error("translation result is not valid JSON: {0}")]
    MalformedResult(String),
}

use std::path::PathBuf;
use thiserror::Error;

/// Errors a render call can surface. Missing names, broken reference
/// chains, and falsey sections are not errors — they render empty or
/// skip their body. This enum only covers genuine failure to produce
/// output.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("writer error: {0}")]
    Writer(String),

    #[error("no space left in fixed output buffer")]
    BufferExhausted,

    #[error("template parse error at {file}:{line}: {message}")]
    Parse {
        file: String,
        line: usize,
        message: String,
    },

    #[error("failed to read template file {path}: {source}")]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl RenderError {
    pub fn parse(file: impl Into<String>, line: usize, message: impl Into<String>) -> Self {
        RenderError::Parse {
            file: file.into(),
            line,
            message: message.into(),
        }
    }
}

/// Error a user-supplied lambda can return. Unless the caller's own
/// error set declares a conversion for it, the engine swallows this
/// and renders whatever text the lambda produced before failing.
#[derive(Error, Debug)]
pub enum LambdaError {
    #[error("lambda failed: {0}")]
    Failed(String),

    #[error("lambda produced a template that failed to parse: {0}")]
    ReentrantParse(String),
}

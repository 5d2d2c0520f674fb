//! Error types for releasekit.

use derive_more::Display;
use thiserror::Error;

/// Failure taxonomy shared by every pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ErrorKind {
    MissingParameter,
    ExternalToolFailure,
    ArtifactNotFound,
    TransportFailure,
    ReferenceConflict,
    Io,
    Internal,
    Aggregate,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("missing parameter: {0}")]
    MissingParameter(String),

    #[error("{tool} exited with {}: {stderr}", describe_status(.status))]
    ExternalTool {
        tool: String,
        status: Option<i32>,
        stderr: String,
    },

    /// The tool could not be started at all.
    #[error("could not launch {tool}: {message}")]
    ToolLaunch { tool: String, message: String },

    #[error("artifact not found: {0}")]
    ArtifactNotFound(String),

    #[error("transport failure: {0}")]
    Transport(String),

    #[error("reference conflict: {0}")]
    ReferenceConflict(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),

    /// A failure tagged with the identity of the operation that produced it.
    #[error("[{label}] {source}")]
    Labeled {
        label: String,
        #[source]
        source: Box<Error>,
    },

    /// Every failure observed while combining independent operations.
    #[error("{}", join_messages(.0))]
    Aggregate(Vec<Error>),
}

fn describe_status(status: &Option<i32>) -> String {
    status.map_or_else(|| "signal".to_string(), |code| format!("status {code}"))
}

fn join_messages(errors: &[Error]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl Error {
    pub fn missing(parameter: impl Into<String>) -> Self {
        Self::MissingParameter(parameter.into())
    }

    pub fn labeled(label: impl Into<String>, source: Error) -> Self {
        Self::Labeled {
            label: label.into(),
            source: Box::new(source),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::MissingParameter(_) => ErrorKind::MissingParameter,
            Error::ExternalTool { .. } | Error::ToolLaunch { .. } => {
                ErrorKind::ExternalToolFailure
            }
            Error::ArtifactNotFound(_) => ErrorKind::ArtifactNotFound,
            Error::Transport(_) => ErrorKind::TransportFailure,
            Error::ReferenceConflict(_) => ErrorKind::ReferenceConflict,
            Error::Io(_) => ErrorKind::Io,
            Error::Internal(_) => ErrorKind::Internal,
            Error::Labeled { source, .. } => source.kind(),
            Error::Aggregate(_) => ErrorKind::Aggregate,
        }
    }

    /// Leaf failures with aggregates flattened. Labels stay attached.
    pub fn failures(&self) -> Vec<&Error> {
        match self {
            Error::Aggregate(errors) => errors.iter().flat_map(Error::failures).collect(),
            Error::Labeled { source, .. } if matches!(**source, Error::Aggregate(_)) => {
                source.failures()
            }
            other => vec![other],
        }
    }

    /// True if this failure, or any failure it aggregates, is of `kind`.
    pub fn contains_kind(&self, kind: ErrorKind) -> bool {
        self.failures().iter().any(|e| e.kind() == kind)
    }
}

/// Success-or-failure result of any boundary-touching operation.
pub type Outcome<T> = std::result::Result<T, Error>;

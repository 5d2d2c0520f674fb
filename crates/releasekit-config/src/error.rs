//! Errors raised while reading a release configuration.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("release configuration is not valid KDL: {0}")]
    Syntax(#[from] kdl::KdlError),

    /// A node lacks an argument or property it cannot do without.
    #[error("`{node}` node is missing its {field}")]
    MissingField { node: &'static str, field: String },

    #[error("unusable {field} in release configuration: {message}")]
    InvalidValue { field: String, message: String },

    /// Two declarations would produce the same packaging output.
    #[error("{0} is declared more than once")]
    Duplicate(String),

    #[error("{kind} target refers to undeclared project '{project}'")]
    UnknownProject { kind: String, project: String },

    #[error("cannot read release configuration: {0}")]
    Io(#[from] std::io::Error),
}

impl ConfigError {
    pub(crate) fn missing(node: &'static str, field: impl Into<String>) -> Self {
        Self::MissingField {
            node,
            field: field.into(),
        }
    }
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_offending_node() {
        assert_eq!(
            ConfigError::missing("project", "path").to_string(),
            "`project` node is missing its path"
        );
        assert_eq!(
            ConfigError::UnknownProject {
                kind: "linux".into(),
                project: "Sample.Gtk".into(),
            }
            .to_string(),
            "linux target refers to undeclared project 'Sample.Gtk'"
        );
    }
}

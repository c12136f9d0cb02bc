//! Assembly-time error types with rule-coded rejection reasons.
//!
//! Every rejection carries the kind of rule that fired and the name of
//! the function that raised it, so callers (and tests) can match on the
//! exact constraint instead of parsing message text.

use std::error::Error as StdError;
use std::fmt;

use thiserror::Error;

use crate::types::{Action, Datastore, Method, OutputFormat};

/// The kind of assembly rule that rejected a request or command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageErrorKind {
    /// The request carries no commands.
    NoCommands,
    /// A command path was empty.
    EmptyPath,
    /// A command carried a value where the method forbids one.
    ValueNotAllowed {
        /// The method that forbids values.
        method: Method,
    },
    /// A command carried an action where the method forbids one.
    ActionNotAllowed {
        /// The method that forbids actions.
        method: Method,
    },
    /// A command lacked an action where the method requires one.
    ActionRequired {
        /// The method that requires an action.
        method: Method,
    },
    /// A datastore is not usable with the given method.
    DatastoreNotAllowed {
        /// The method in effect.
        method: Method,
        /// The rejected datastore.
        datastore: Datastore,
    },
    /// The tools datastore accepts only the update action.
    ToolsUpdateOnly {
        /// The rejected action.
        action: Action,
    },
    /// SET requires the candidate or tools datastore.
    SetDatastore {
        /// The rejected datastore.
        datastore: Datastore,
    },
    /// VALIDATE requires the candidate datastore.
    ValidateDatastore {
        /// The rejected datastore.
        datastore: Datastore,
    },
    /// DIFF requires the candidate datastore.
    DiffDatastore {
        /// The rejected datastore.
        datastore: Datastore,
    },
    /// DIFF requires an explicit yang-models selector.
    YangModelsRequired,
    /// The yang-models selector is not usable with the given method.
    YangModelsNotAllowed {
        /// The method in effect.
        method: Method,
    },
    /// The output format is not usable with the given method.
    OutputFormatNotAllowed {
        /// The method in effect.
        method: Method,
        /// The rejected format.
        format: OutputFormat,
    },
    /// Update and replace need a value unless the path embeds one.
    MissingValue {
        /// The action that needs a value.
        action: Action,
    },
    /// Delete commands must not carry a value.
    DeleteWithValue,
    /// A CLI command string was empty.
    CliEmptyCommand,
    /// The method cannot be used with this request form.
    MethodNotSupported {
        /// The rejected method.
        method: Method,
    },
    /// The path-keywords payload was not a JSON object.
    InvalidPathKeywords,
    /// A textual wire form did not match any enum value.
    UnknownToken {
        /// Which vocabulary was being parsed.
        what: &'static str,
        /// The offending token.
        token: String,
    },
    /// The enum value has no textual wire form.
    NoWireForm {
        /// Which vocabulary was being rendered.
        what: &'static str,
    },
    /// Serializing the request to wire JSON failed.
    Marshal,
}

impl fmt::Display for MessageErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoCommands => write!(f, "at least one command is required"),
            Self::EmptyPath => write!(f, "command path cannot be empty"),
            Self::ValueNotAllowed { method } => {
                write!(f, "value is not allowed for {method} method")
            }
            Self::ActionNotAllowed { method } => {
                write!(f, "action is not allowed for {method} method")
            }
            Self::ActionRequired { method } => {
                write!(f, "action is required for {method} method")
            }
            Self::DatastoreNotAllowed { method, datastore } => {
                write!(f, "datastore {datastore} is not allowed for {method} method")
            }
            Self::ToolsUpdateOnly { action } => {
                write!(f, "tools datastore accepts only the update action, got {action}")
            }
            Self::SetDatastore { datastore } => {
                write!(f, "set method requires candidate or tools datastore, got {datastore}")
            }
            Self::ValidateDatastore { datastore } => {
                write!(f, "validate method requires candidate datastore, got {datastore}")
            }
            Self::DiffDatastore { datastore } => {
                write!(f, "diff method requires candidate datastore, got {datastore}")
            }
            Self::YangModelsRequired => {
                write!(f, "diff method requires an explicit yang-models selector")
            }
            Self::YangModelsNotAllowed { method } => {
                write!(f, "yang-models selector is not allowed for {method} method")
            }
            Self::OutputFormatNotAllowed { method, format } => {
                write!(f, "output format {format} is not allowed for {method} method")
            }
            Self::MissingValue { action } => {
                write!(f, "value is required for {action} action")
            }
            Self::DeleteWithValue => write!(f, "value must be empty for delete action"),
            Self::CliEmptyCommand => write!(f, "cli command cannot be empty"),
            Self::MethodNotSupported { method } => {
                write!(f, "{method} method is not supported by this request form")
            }
            Self::InvalidPathKeywords => {
                write!(f, "path-keywords is not a valid JSON object")
            }
            Self::UnknownToken { what, token } => write!(f, "unknown {what} '{token}'"),
            Self::NoWireForm { what } => write!(f, "{what} has no wire form"),
            Self::Marshal => write!(f, "request could not be marshalled"),
        }
    }
}

/// Error raised while assembling or validating a request.
///
/// Carries the originating function, the rule [`MessageErrorKind`] and
/// an optional underlying cause. Two errors compare equal when function
/// and kind match and, where both carry causes, the cause messages
/// match.
#[derive(Debug, Error)]
#[error("{function}: {kind}")]
pub struct MessageError {
    function: &'static str,
    kind: MessageErrorKind,
    #[source]
    source: Option<Box<dyn StdError + Send + Sync>>,
}

impl MessageError {
    /// Create a new error from the raising function and the rule kind.
    #[must_use]
    pub fn new(function: &'static str, kind: MessageErrorKind) -> Self {
        Self {
            function,
            kind,
            source: None,
        }
    }

    /// Attach the underlying cause.
    #[must_use]
    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// The rule that fired.
    #[must_use]
    pub fn kind(&self) -> &MessageErrorKind {
        &self.kind
    }

    /// The function that raised the error.
    #[must_use]
    pub fn function(&self) -> &'static str {
        self.function
    }
}

impl PartialEq for MessageError {
    fn eq(&self, other: &Self) -> bool {
        if self.function != other.function || self.kind != other.kind {
            return false;
        }
        match (&self.source, &other.source) {
            (Some(a), Some(b)) => a.to_string() == b.to_string(),
            _ => true,
        }
    }
}

/// Result alias for assembly operations.
pub type MessageResult<T> = Result<T, MessageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_composes_function_and_kind() {
        let err = MessageError::new(
            "RequestBuilder::build",
            MessageErrorKind::DatastoreNotAllowed {
                method: Method::Get,
                datastore: Datastore::Tools,
            },
        );
        assert_eq!(
            err.to_string(),
            "RequestBuilder::build: datastore tools is not allowed for get method"
        );
    }

    #[test]
    fn equality_is_on_function_and_kind() {
        let a = MessageError::new("RequestBuilder::build", MessageErrorKind::NoCommands);
        let b = MessageError::new("RequestBuilder::build", MessageErrorKind::NoCommands);
        let c = MessageError::new("CliRequest::new", MessageErrorKind::NoCommands);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn causes_compare_by_message_when_both_present() {
        let mk = |msg: &str| {
            MessageError::new("Command::with_path_keywords", MessageErrorKind::InvalidPathKeywords)
                .with_source(std::io::Error::other(msg.to_string()))
        };
        let bare = MessageError::new(
            "Command::with_path_keywords",
            MessageErrorKind::InvalidPathKeywords,
        );
        assert_eq!(mk("eof"), mk("eof"));
        assert_ne!(mk("eof"), mk("trailing characters"));
        assert_eq!(bare, mk("eof"));
    }

    #[test]
    fn source_is_exposed_through_the_error_chain() {
        let err = MessageError::new("Request::to_json", MessageErrorKind::Marshal)
            .with_source(std::io::Error::other("backing writer closed"));
        let source = err.source().expect("cause attached");
        assert_eq!(source.to_string(), "backing writer closed");
    }
}

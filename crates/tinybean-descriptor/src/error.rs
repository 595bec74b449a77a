//! Descriptor parsing errors.
//!
//! All variants use the `PARSE_` prefix and none are recoverable:
//! feeding the same bytes again yields the same failure.

use thiserror::Error;
use tinybean_types::ErrorCode;

/// Failure to turn descriptor bytes into a typed model.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The byte stream could not be read (I/O or invalid UTF-8).
    #[error("failed to read descriptor: {0}")]
    Read(#[source] std::io::Error),

    /// The document is not well-formed XML.
    #[error("malformed descriptor at byte {position}: {message}")]
    Malformed { position: u64, message: String },

    /// The document root is not the expected element.
    #[error("unexpected root element <{found}>, expected <{expected}>")]
    UnexpectedRoot {
        expected: &'static str,
        found: String,
    },

    /// A required element is absent or empty.
    #[error("{context}: missing required element <{element}>")]
    MissingElement {
        context: String,
        element: &'static str,
    },

    /// An element holds a value outside its allowed set.
    #[error("{context}: invalid value '{value}' for <{element}>")]
    InvalidValue {
        context: String,
        element: &'static str,
        value: String,
    },

    /// A component declares neither a local nor a remote home.
    #[error("component '{component}' declares no home interface")]
    MissingHome { component: String },

    /// A home interface is declared without its component interface
    /// (or the other way round).
    #[error("component '{component}': <{present}> declared without <{missing}>")]
    IncompletePair {
        component: String,
        present: &'static str,
        missing: &'static str,
    },

    /// Two components share one name.
    #[error("duplicate component name '{name}'")]
    DuplicateComponent { name: String },

    /// A declaration refers to a component the descriptor does not define.
    #[error("{context} refers to unknown component '{component}'")]
    UnknownComponent {
        context: &'static str,
        component: String,
    },
}

impl ParseError {
    /// Creates a missing element error.
    pub fn missing(context: impl Into<String>, element: &'static str) -> Self {
        Self::MissingElement {
            context: context.into(),
            element,
        }
    }

    /// Creates an invalid value error.
    pub fn invalid(
        context: impl Into<String>,
        element: &'static str,
        value: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            context: context.into(),
            element,
            value: value.into(),
        }
    }
}

impl ErrorCode for ParseError {
    fn code(&self) -> &'static str {
        match self {
            Self::Read(_) => "PARSE_READ",
            Self::Malformed { .. } => "PARSE_MALFORMED",
            Self::UnexpectedRoot { .. } => "PARSE_UNEXPECTED_ROOT",
            Self::MissingElement { .. } => "PARSE_MISSING_ELEMENT",
            Self::InvalidValue { .. } => "PARSE_INVALID_VALUE",
            Self::MissingHome { .. } => "PARSE_MISSING_HOME",
            Self::IncompletePair { .. } => "PARSE_INCOMPLETE_PAIR",
            Self::DuplicateComponent { .. } => "PARSE_DUPLICATE_COMPONENT",
            Self::UnknownComponent { .. } => "PARSE_UNKNOWN_COMPONENT",
        }
    }

    fn is_recoverable(&self) -> bool {
        false
    }
}

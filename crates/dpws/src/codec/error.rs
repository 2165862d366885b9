// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Codec error types.

use crate::model::QualifiedName;
use crate::security::SecurityError;
use std::fmt;
use thiserror::Error;

/// Why an inbound message was dropped without being parsed further.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscardReason {
    /// Echo of a message this node sent itself.
    OwnMessage,
    /// MessageID already seen recently.
    Duplicate,
    /// AppSequence older than what was already accepted for this endpoint.
    OutdatedAppSequence,
    /// Envelope or addressing namespace of another protocol version.
    VersionMismatch,
    /// Suppressed by an application-defined rule.
    NotRelevant(String),
}

impl fmt::Display for DiscardReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OwnMessage => write!(f, "own message"),
            Self::Duplicate => write!(f, "duplicate message"),
            Self::OutdatedAppSequence => write!(f, "outdated app sequence"),
            Self::VersionMismatch => write!(f, "version mismatch"),
            Self::NotRelevant(why) => write!(f, "not relevant: {}", why),
        }
    }
}

/// Decode failure classification.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Tokenizer-level syntax error.
    #[error("Malformed XML: {0}")]
    Malformed(String),

    #[error("Missing element: expected {expected}")]
    MissingElement { expected: QualifiedName },

    #[error("Unexpected element: found {found}, expected {expected}")]
    UnexpectedElement {
        found: QualifiedName,
        expected: String,
    },

    /// Not SOAP 1.2 (or an unsupported addressing namespace).
    #[error("Version mismatch: {namespace}")]
    VersionMismatch { namespace: String },

    #[error("Discarded: {0}")]
    Discarded(DiscardReason),

    /// No operation is registered for an application action.
    #[error("Action not supported: {0}")]
    ActionNotSupported(String),

    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Invalid value {value:?} in {element}")]
    InvalidValue { element: String, value: String },
}

impl DecodeError {
    /// Version mismatches and policy discards are expected outcomes, not errors.
    pub fn is_discard(&self) -> bool {
        matches!(self, Self::Discarded(_) | Self::VersionMismatch { .. })
    }

    /// Discard reason reported to the monitoring hook, if any.
    pub fn discard_reason(&self) -> Option<DiscardReason> {
        match self {
            Self::Discarded(reason) => Some(reason.clone()),
            Self::VersionMismatch { .. } => Some(DiscardReason::VersionMismatch),
            _ => None,
        }
    }

    pub(crate) fn missing(namespace: &str, local: &str) -> Self {
        Self::MissingElement {
            expected: QualifiedName::new(namespace, local),
        }
    }

    pub(crate) fn unexpected(found: &QualifiedName, expected: impl Into<String>) -> Self {
        Self::UnexpectedElement {
            found: found.clone(),
            expected: expected.into(),
        }
    }
}

impl From<quick_xml::Error> for DecodeError {
    fn from(err: quick_xml::Error) -> Self {
        Self::Malformed(err.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for DecodeError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        Self::Malformed(err.to_string())
    }
}

impl From<std::str::Utf8Error> for DecodeError {
    fn from(err: std::str::Utf8Error) -> Self {
        Self::Malformed(err.to_string())
    }
}

/// Encode failure.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// The fixed encode buffer is full; output is never truncated or grown.
    #[error("Encode buffer overflow (capacity {capacity} bytes)")]
    BufferOverflow { capacity: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Namespace not declared on envelope: {0}")]
    UndeclaredNamespace(String),

    #[error("Missing field: {0}")]
    MissingField(&'static str),

    /// A field value the wire format cannot carry without changing its meaning.
    #[error("Invalid field {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("Security error: {0}")]
    Security(#[from] SecurityError),
}

/// Result type for decode operations
pub type DecodeResult<T> = Result<T, DecodeError>;

/// Result type for encode operations
pub type EncodeResult<T> = Result<T, EncodeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discard_classification() {
        assert!(DecodeError::Discarded(DiscardReason::OwnMessage).is_discard());
        assert!(DecodeError::VersionMismatch {
            namespace: "urn:x".into()
        }
        .is_discard());
        assert!(!DecodeError::Malformed("eof".into()).is_discard());
        assert_eq!(
            DecodeError::VersionMismatch {
                namespace: "urn:x".into()
            }
            .discard_reason(),
            Some(DiscardReason::VersionMismatch)
        );
    }

    #[test]
    fn test_missing_element_names_expected_qname() {
        let err = DecodeError::missing("urn:wsa", "Action");
        assert_eq!(err.to_string(), "Missing element: expected {urn:wsa}Action");
    }
}

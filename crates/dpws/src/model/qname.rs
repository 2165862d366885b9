// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Namespace-qualified XML names.

use std::fmt;

/// An XML name resolved against its namespace URI.
///
/// An empty `namespace` means the name is unqualified (no namespace).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QualifiedName {
    pub namespace: String,
    pub local: String,
}

impl QualifiedName {
    pub fn new(namespace: impl Into<String>, local: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            local: local.into(),
        }
    }

    /// Name without a namespace.
    pub fn unqualified(local: impl Into<String>) -> Self {
        Self {
            namespace: String::new(),
            local: local.into(),
        }
    }

    pub fn has_namespace(&self) -> bool {
        !self.namespace.is_empty()
    }

    /// `true` if this name is `{namespace}local`.
    pub fn is(&self, namespace: &str, local: &str) -> bool {
        self.local == local && self.namespace == namespace
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace.is_empty() {
            write!(f, "{}", self.local)
        } else {
            write!(f, "{{{}}}{}", self.namespace, self.local)
        }
    }
}

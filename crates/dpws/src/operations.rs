// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Application operation descriptors.
//!
//! Messages whose action is not a protocol action are application Invokes.
//! The decoder finds the operation by action URI and reads the body element
//! the operation declares for that direction:
//!
//! ```text
//!                     initiating (no RelatesTo)   reply (RelatesTo)
//! one-way             input                       -
//! request-response    input                       output
//! notification        output                      -
//! solicit-response    output                      input
//! ```

use crate::model::QualifiedName;
use std::collections::HashMap;
use std::sync::Arc;

/// Message exchange pattern of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationType {
    OneWay,
    RequestResponse,
    SolicitResponse,
    Notification,
}

impl OperationType {
    /// Whether the first message of the exchange is the input message.
    pub fn starts_with_input(self) -> bool {
        matches!(self, Self::OneWay | Self::RequestResponse)
    }

    pub fn has_reply(self) -> bool {
        matches!(self, Self::RequestResponse | Self::SolicitResponse)
    }
}

/// A fault an operation may return.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaultDescriptor {
    pub name: String,
    pub action: String,
    /// Expected child of `s12:Detail`.
    pub detail_element: Option<QualifiedName>,
}

impl FaultDescriptor {
    pub fn new(name: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            action: action.into(),
            detail_element: None,
        }
    }

    pub fn with_detail(mut self, element: QualifiedName) -> Self {
        self.detail_element = Some(element);
        self
    }
}

/// Input/output/fault schema of one operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationDescriptor {
    pub name: String,
    pub operation_type: OperationType,
    pub input_action: Option<String>,
    pub input_element: Option<QualifiedName>,
    pub output_action: Option<String>,
    pub output_element: Option<QualifiedName>,
    pub faults: Vec<FaultDescriptor>,
}

impl OperationDescriptor {
    pub fn new(name: impl Into<String>, operation_type: OperationType) -> Self {
        Self {
            name: name.into(),
            operation_type,
            input_action: None,
            input_element: None,
            output_action: None,
            output_element: None,
            faults: Vec::new(),
        }
    }

    pub fn with_input(mut self, action: impl Into<String>, element: QualifiedName) -> Self {
        self.input_action = Some(action.into());
        self.input_element = Some(element);
        self
    }

    pub fn with_output(mut self, action: impl Into<String>, element: QualifiedName) -> Self {
        self.output_action = Some(action.into());
        self.output_element = Some(element);
        self
    }

    pub fn with_fault(mut self, fault: FaultDescriptor) -> Self {
        self.faults.push(fault);
        self
    }

    /// Body element expected for a message of this operation.
    pub fn expected_element(&self, is_reply: bool) -> Option<&QualifiedName> {
        let input = self.operation_type.starts_with_input() != is_reply;
        if input {
            self.input_element.as_ref()
        } else {
            self.output_element.as_ref()
        }
    }
}

/// Action URI -> operation lookup.
#[derive(Debug, Clone, Default)]
pub struct OperationRegistry {
    by_action: HashMap<String, Arc<OperationDescriptor>>,
    faults: HashMap<String, FaultDescriptor>,
}

impl OperationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, operation: OperationDescriptor) {
        let operation = Arc::new(operation);
        for action in [&operation.input_action, &operation.output_action]
            .into_iter()
            .flatten()
        {
            self.by_action.insert(action.clone(), Arc::clone(&operation));
        }
        for fault in &operation.faults {
            self.faults.insert(fault.action.clone(), fault.clone());
        }
    }

    pub fn by_action(&self, action: &str) -> Option<&OperationDescriptor> {
        self.by_action.get(action).map(|op| op.as_ref())
    }

    pub fn fault(&self, action: &str) -> Option<&FaultDescriptor> {
        self.faults.get(action)
    }

    pub fn is_empty(&self) -> bool {
        self.by_action.is_empty()
    }
}

// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! SOAP header shared by every message kind.

use super::epr::collect_opt;
use super::{EndpointReference, HandlerRegistry, ReferenceParameter, UnknownContent};
use crate::protocol::ProtocolVersion;

/// WS-Discovery ordering triple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppSequence {
    /// Monotonic epoch, bumped whenever the sender restarts.
    pub instance_id: u64,
    pub sequence_id: Option<String>,
    /// Monotonic within (instance_id, sequence_id).
    pub message_number: u64,
}

impl AppSequence {
    pub fn new(instance_id: u64, message_number: u64) -> Self {
        Self {
            instance_id,
            sequence_id: None,
            message_number,
        }
    }

    pub fn with_sequence_id(mut self, sequence_id: impl Into<String>) -> Self {
        self.sequence_id = Some(sequence_id.into());
        self
    }
}

/// WS-Addressing header plus AppSequence and signature.
#[derive(Debug, Clone, PartialEq)]
pub struct Header {
    pub version: ProtocolVersion,
    pub action: String,
    pub message_id: Option<String>,
    pub relates_to: Option<String>,
    pub reply_to: Option<EndpointReference>,
    pub to: Option<String>,
    /// Reference parameters of the target EPR, copied as header blocks.
    pub reference_parameters: Vec<ReferenceParameter>,
    pub app_sequence: Option<AppSequence>,
    /// Compact signature value (set by the decoder when present on the wire).
    pub signature: Option<String>,
    /// Request the signing serializer on encode.
    pub secure: bool,
    pub unknown: UnknownContent,
}

impl Header {
    pub fn new(version: ProtocolVersion, action: impl Into<String>) -> Self {
        Self {
            version,
            action: action.into(),
            message_id: None,
            relates_to: None,
            reply_to: None,
            to: None,
            reference_parameters: Vec::new(),
            app_sequence: None,
            signature: None,
            secure: false,
            unknown: UnknownContent::default(),
        }
    }

    pub fn with_message_id(mut self, id: impl Into<String>) -> Self {
        self.message_id = Some(id.into());
        self
    }

    pub fn with_relates_to(mut self, id: impl Into<String>) -> Self {
        self.relates_to = Some(id.into());
        self
    }

    pub fn with_to(mut self, to: impl Into<String>) -> Self {
        self.to = Some(to.into());
        self
    }

    pub fn with_reply_to(mut self, reply_to: EndpointReference) -> Self {
        self.reply_to = Some(reply_to);
        self
    }

    pub fn with_app_sequence(mut self, app_sequence: AppSequence) -> Self {
        self.app_sequence = Some(app_sequence);
        self
    }

    /// Address this message to an endpoint: `To` plus its reference parameters.
    pub fn target(mut self, epr: &EndpointReference) -> Self {
        self.to = Some(epr.address.clone());
        self.reference_parameters = epr.reference_parameters.clone();
        self
    }

    pub fn secure(mut self) -> Self {
        self.secure = true;
        self
    }

    pub(crate) fn collect_namespaces(&self, handlers: &HandlerRegistry, out: &mut Vec<String>) {
        collect_opt(self.reply_to.as_ref(), handlers, out);
        for parameter in &self.reference_parameters {
            parameter.collect_namespaces(out);
        }
        self.unknown.collect_namespaces(handlers, out);
    }
}

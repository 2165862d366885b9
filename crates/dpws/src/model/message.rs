// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! The message tagged union.

use super::{
    Bye, EmptyBody, ExpiresBody, Fault, GetMetadata, GetMetadataResponse, GetResponse,
    HandlerRegistry, Header, Hello, Invoke, Probe, ProbeMatches, Resolve, ResolveMatches,
    Subscribe, SubscribeResponse, SubscriptionEnd,
};
use crate::protocol::ProtocolVersion;
use std::fmt;

/// Message kinds, in protocol-range order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MessageKind {
    Hello,
    Bye,
    Probe,
    ProbeMatches,
    Resolve,
    ResolveMatches,
    Subscribe,
    SubscribeResponse,
    Renew,
    RenewResponse,
    GetStatus,
    GetStatusResponse,
    Unsubscribe,
    UnsubscribeResponse,
    SubscriptionEnd,
    Get,
    GetResponse,
    GetMetadata,
    GetMetadataResponse,
    Invoke,
    Fault,
}

impl MessageKind {
    pub const ALL: [MessageKind; 21] = [
        MessageKind::Hello,
        MessageKind::Bye,
        MessageKind::Probe,
        MessageKind::ProbeMatches,
        MessageKind::Resolve,
        MessageKind::ResolveMatches,
        MessageKind::Subscribe,
        MessageKind::SubscribeResponse,
        MessageKind::Renew,
        MessageKind::RenewResponse,
        MessageKind::GetStatus,
        MessageKind::GetStatusResponse,
        MessageKind::Unsubscribe,
        MessageKind::UnsubscribeResponse,
        MessageKind::SubscriptionEnd,
        MessageKind::Get,
        MessageKind::GetResponse,
        MessageKind::GetMetadata,
        MessageKind::GetMetadataResponse,
        MessageKind::Invoke,
        MessageKind::Fault,
    ];

    /// Hello ... ResolveMatches.
    pub fn is_discovery(self) -> bool {
        (MessageKind::Hello..=MessageKind::ResolveMatches).contains(&self)
    }

    /// Subscribe ... SubscriptionEnd.
    pub fn is_eventing(self) -> bool {
        (MessageKind::Subscribe..=MessageKind::SubscriptionEnd).contains(&self)
    }

    /// Get ... GetMetadataResponse.
    pub fn is_metadata(self) -> bool {
        (MessageKind::Get..=MessageKind::GetMetadataResponse).contains(&self)
    }

    /// Kinds that may be signed with the compact signature block.
    pub fn is_signable(self) -> bool {
        matches!(
            self,
            MessageKind::Hello
                | MessageKind::Bye
                | MessageKind::ProbeMatches
                | MessageKind::ResolveMatches
        )
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Kind-specific payload.
#[derive(Debug, Clone, PartialEq)]
pub enum MessageBody {
    Hello(Hello),
    Bye(Bye),
    Probe(Probe),
    ProbeMatches(ProbeMatches),
    Resolve(Resolve),
    ResolveMatches(ResolveMatches),
    Subscribe(Subscribe),
    SubscribeResponse(SubscribeResponse),
    Renew(ExpiresBody),
    RenewResponse(ExpiresBody),
    GetStatus(EmptyBody),
    GetStatusResponse(ExpiresBody),
    Unsubscribe(EmptyBody),
    UnsubscribeResponse(EmptyBody),
    SubscriptionEnd(SubscriptionEnd),
    Get(EmptyBody),
    GetResponse(GetResponse),
    GetMetadata(GetMetadata),
    GetMetadataResponse(GetMetadataResponse),
    Invoke(Invoke),
    Fault(Fault),
}

impl MessageBody {
    pub fn kind(&self) -> MessageKind {
        match self {
            Self::Hello(_) => MessageKind::Hello,
            Self::Bye(_) => MessageKind::Bye,
            Self::Probe(_) => MessageKind::Probe,
            Self::ProbeMatches(_) => MessageKind::ProbeMatches,
            Self::Resolve(_) => MessageKind::Resolve,
            Self::ResolveMatches(_) => MessageKind::ResolveMatches,
            Self::Subscribe(_) => MessageKind::Subscribe,
            Self::SubscribeResponse(_) => MessageKind::SubscribeResponse,
            Self::Renew(_) => MessageKind::Renew,
            Self::RenewResponse(_) => MessageKind::RenewResponse,
            Self::GetStatus(_) => MessageKind::GetStatus,
            Self::GetStatusResponse(_) => MessageKind::GetStatusResponse,
            Self::Unsubscribe(_) => MessageKind::Unsubscribe,
            Self::UnsubscribeResponse(_) => MessageKind::UnsubscribeResponse,
            Self::SubscriptionEnd(_) => MessageKind::SubscriptionEnd,
            Self::Get(_) => MessageKind::Get,
            Self::GetResponse(_) => MessageKind::GetResponse,
            Self::GetMetadata(_) => MessageKind::GetMetadata,
            Self::GetMetadataResponse(_) => MessageKind::GetMetadataResponse,
            Self::Invoke(_) => MessageKind::Invoke,
            Self::Fault(_) => MessageKind::Fault,
        }
    }
}

/// One SOAP message: common header plus kind-specific body.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub header: Header,
    pub body: MessageBody,
}

impl Message {
    pub fn new(header: Header, body: MessageBody) -> Self {
        Self { header, body }
    }

    /// Build a protocol message whose action comes from the version table.
    ///
    /// Invoke and Fault have no table action; their header action is left
    /// empty and must be set by the caller.
    pub fn from_body(version: ProtocolVersion, body: MessageBody) -> Self {
        let action = version.helper().action(body.kind()).unwrap_or_default();
        Self::new(Header::new(version, action), body)
    }

    pub fn kind(&self) -> MessageKind {
        self.body.kind()
    }

    pub fn version(&self) -> ProtocolVersion {
        self.header.version
    }

    /// Every namespace the message content needs declared, beyond the
    /// protocol namespaces.
    pub fn collect_namespaces(&self, handlers: &HandlerRegistry) -> Vec<String> {
        let mut out = Vec::new();
        self.header.collect_namespaces(handlers, &mut out);
        match &self.body {
            MessageBody::Hello(Hello { data }) | MessageBody::Bye(Bye { data }) => {
                data.collect_namespaces(handlers, &mut out);
            }
            MessageBody::Probe(probe) => probe.collect_namespaces(handlers, &mut out),
            MessageBody::ProbeMatches(pm) => {
                for m in &pm.matches {
                    m.collect_namespaces(handlers, &mut out);
                }
                pm.unknown.collect_namespaces(handlers, &mut out);
            }
            MessageBody::Resolve(r) => {
                r.endpoint_reference.collect_namespaces(handlers, &mut out);
                r.unknown.collect_namespaces(handlers, &mut out);
            }
            MessageBody::ResolveMatches(rm) => {
                if let Some(m) = &rm.resolve_match {
                    m.collect_namespaces(handlers, &mut out);
                }
                rm.unknown.collect_namespaces(handlers, &mut out);
            }
            MessageBody::Subscribe(s) => s.collect_namespaces(handlers, &mut out),
            MessageBody::SubscribeResponse(s) => {
                s.subscription_manager.collect_namespaces(handlers, &mut out);
                s.unknown.collect_namespaces(handlers, &mut out);
            }
            MessageBody::Renew(b)
            | MessageBody::RenewResponse(b)
            | MessageBody::GetStatusResponse(b) => b.unknown.collect_namespaces(handlers, &mut out),
            MessageBody::GetStatus(b)
            | MessageBody::Unsubscribe(b)
            | MessageBody::UnsubscribeResponse(b)
            | MessageBody::Get(b) => b.unknown.collect_namespaces(handlers, &mut out),
            MessageBody::SubscriptionEnd(s) => {
                s.subscription_manager.collect_namespaces(handlers, &mut out);
                s.unknown.collect_namespaces(handlers, &mut out);
            }
            MessageBody::GetResponse(g) => g.collect_namespaces(handlers, &mut out),
            MessageBody::GetMetadata(g) => g.unknown.collect_namespaces(handlers, &mut out),
            MessageBody::GetMetadataResponse(g) => g.collect_namespaces(handlers, &mut out),
            MessageBody::Invoke(i) => i.collect_namespaces(handlers, &mut out),
            MessageBody::Fault(f) => f.collect_namespaces(handlers, &mut out),
        }
        out
    }
}

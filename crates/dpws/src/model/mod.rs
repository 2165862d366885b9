// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Typed message model.
//!
//! A [`Message`] is a [`Header`] plus a [`MessageBody`] variant per kind.
//! Every element the codec models also carries an [`UnknownContent`] bag so
//! that content from unrecognized namespaces survives a decode/encode cycle.

mod discovery;
mod epr;
mod eventing;
mod header;
mod invoke;
mod message;
mod metadata;
mod qname;
mod unknown;

pub use discovery::{Bye, DiscoveryData, Hello, Probe, ProbeMatches, Resolve, ResolveMatches, ScopeSet};
pub use epr::EndpointReference;
pub use eventing::{
    Delivery, EmptyBody, ExpiresBody, Filter, LocalizedString, Subscribe, SubscribeResponse,
    SubscriptionEnd,
};
pub use header::{AppSequence, Header};
pub use invoke::{Fault, Invoke, ParameterValue};
pub use message::{Message, MessageBody, MessageKind};
pub use metadata::{
    GetMetadata, GetMetadataResponse, GetResponse, HostedService, MetadataSection, Relationship,
    SectionContent, ThisDevice, ThisModel,
};
pub use qname::QualifiedName;
pub use unknown::{
    Chunk, ExtensionHandler, ExtensionValue, HandlerRegistry, RawElement, ReferenceParameter,
    UnknownContent, UnknownElement,
};

pub(crate) use eventing::identifier_value;
pub(crate) use unknown::{push_markup, push_namespace};

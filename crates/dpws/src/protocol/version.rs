// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Protocol-version helpers.
//!
//! Each supported DPWS generation implements [`ProtocolHelper`], which
//! supplies the namespaces and action URIs that differ between versions.
//! A helper is selected once per message (from the WS-Addressing namespace
//! on decode, from [`crate::Header::version`] on encode) and threaded
//! explicitly through the codec.
//!
//! ```text
//! +---------------------------------------------------+
//! |                ProtocolHelper Trait               |
//! +---------------------------------------------------+
//! | namespaces()  action(kind)  kind_for_action(uri)  |
//! +---------------------------------------------------+
//!                 |                     |
//!          +-------------+       +-------------+
//!          |  Dpws2006   |       |  Dpws2009   |
//!          | WSA 2004/08 |       | WSA 2005/08 |
//!          +-------------+       +-------------+
//! ```

use super::constants::{
    DPWS_2006_NS, DPWS_2009_NS, MEX_NS, WSA_2004_NS, WSA_2005_NS, WSD_2005_NS, WSD_2009_NS,
    WSE_NS, WXF_NS,
};
use crate::model::MessageKind;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

/// Supported DPWS protocol generations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProtocolVersion {
    /// DPWS 2006 / WS-Addressing 2004 / WS-Discovery 2005.
    Dpws2006,
    /// DPWS 1.1 (2009) / WS-Addressing 1.0 / WS-Discovery 1.1.
    #[default]
    Dpws2009,
}

impl ProtocolVersion {
    pub const ALL: [ProtocolVersion; 2] = [ProtocolVersion::Dpws2006, ProtocolVersion::Dpws2009];

    pub fn helper(self) -> &'static dyn ProtocolHelper {
        match self {
            Self::Dpws2006 => &Dpws2006,
            Self::Dpws2009 => &Dpws2009,
        }
    }

    /// Detect the version from a WS-Addressing namespace.
    pub fn from_addressing_namespace(namespace: &str) -> Option<Self> {
        match namespace {
            WSA_2004_NS => Some(Self::Dpws2006),
            WSA_2005_NS => Some(Self::Dpws2009),
            _ => None,
        }
    }

    /// Detect the version from a WS-Discovery namespace.
    pub fn from_discovery_namespace(namespace: &str) -> Option<Self> {
        match namespace {
            WSD_2005_NS => Some(Self::Dpws2006),
            WSD_2009_NS => Some(Self::Dpws2009),
            _ => None,
        }
    }

    /// Detect the version from a DPWS namespace.
    pub fn from_dpws_namespace(namespace: &str) -> Option<Self> {
        match namespace {
            DPWS_2006_NS => Some(Self::Dpws2006),
            DPWS_2009_NS => Some(Self::Dpws2009),
            _ => None,
        }
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dpws2006 => write!(f, "DPWS 2006"),
            Self::Dpws2009 => write!(f, "DPWS 2009"),
        }
    }
}

/// Version-specific constants used for all dispatch after version detection.
pub trait ProtocolHelper: Send + Sync {
    fn version(&self) -> ProtocolVersion;

    fn addressing_namespace(&self) -> &'static str;
    fn discovery_namespace(&self) -> &'static str;
    fn dpws_namespace(&self) -> &'static str;

    fn eventing_namespace(&self) -> &'static str {
        WSE_NS
    }

    fn mex_namespace(&self) -> &'static str {
        MEX_NS
    }

    fn transfer_namespace(&self) -> &'static str {
        WXF_NS
    }

    /// Anonymous reply endpoint address.
    fn anonymous_address(&self) -> &'static str;

    /// `wsa:To` value of multicast discovery messages.
    fn discovery_target(&self) -> &'static str;

    /// WS-Addressing fault action.
    fn fault_action(&self) -> &'static str;

    /// DPWS-level fault action.
    fn dpws_fault_action(&self) -> &'static str;

    /// Whether copied reference parameters carry `wsa:IsReferenceParameter`.
    fn marks_reference_parameters(&self) -> bool;

    /// Action URI of a message kind (`None` for Invoke/Fault).
    fn action(&self, kind: MessageKind) -> Option<&'static str>;

    /// Reverse lookup through the static action table.
    fn kind_for_action(&self, action: &str) -> Option<MessageKind> {
        action_table(self.version()).get(action).copied()
    }

    fn this_model_dialect(&self) -> &'static str;
    fn this_device_dialect(&self) -> &'static str;
    fn relationship_dialect(&self) -> &'static str;
    fn host_relationship_type(&self) -> &'static str;
}

/// Action URI -> kind, built once per version.
fn action_table(version: ProtocolVersion) -> &'static HashMap<&'static str, MessageKind> {
    static DPWS_2006: OnceLock<HashMap<&'static str, MessageKind>> = OnceLock::new();
    static DPWS_2009: OnceLock<HashMap<&'static str, MessageKind>> = OnceLock::new();

    let cell = match version {
        ProtocolVersion::Dpws2006 => &DPWS_2006,
        ProtocolVersion::Dpws2009 => &DPWS_2009,
    };
    cell.get_or_init(|| {
        let helper = version.helper();
        MessageKind::ALL
            .iter()
            .filter_map(|kind| helper.action(*kind).map(|action| (action, *kind)))
            .collect()
    })
}

/// Action URIs shared by both versions.
fn common_action(kind: MessageKind) -> Option<&'static str> {
    match kind {
        MessageKind::Subscribe => Some("http://schemas.xmlsoap.org/ws/2004/08/eventing/Subscribe"),
        MessageKind::SubscribeResponse => {
            Some("http://schemas.xmlsoap.org/ws/2004/08/eventing/SubscribeResponse")
        }
        MessageKind::Renew => Some("http://schemas.xmlsoap.org/ws/2004/08/eventing/Renew"),
        MessageKind::RenewResponse => {
            Some("http://schemas.xmlsoap.org/ws/2004/08/eventing/RenewResponse")
        }
        MessageKind::GetStatus => Some("http://schemas.xmlsoap.org/ws/2004/08/eventing/GetStatus"),
        MessageKind::GetStatusResponse => {
            Some("http://schemas.xmlsoap.org/ws/2004/08/eventing/GetStatusResponse")
        }
        MessageKind::Unsubscribe => {
            Some("http://schemas.xmlsoap.org/ws/2004/08/eventing/Unsubscribe")
        }
        MessageKind::UnsubscribeResponse => {
            Some("http://schemas.xmlsoap.org/ws/2004/08/eventing/UnsubscribeResponse")
        }
        MessageKind::SubscriptionEnd => {
            Some("http://schemas.xmlsoap.org/ws/2004/08/eventing/SubscriptionEnd")
        }
        MessageKind::Get => Some("http://schemas.xmlsoap.org/ws/2004/09/transfer/Get"),
        MessageKind::GetResponse => Some("http://schemas.xmlsoap.org/ws/2004/09/transfer/GetResponse"),
        MessageKind::GetMetadata => {
            Some("http://schemas.xmlsoap.org/ws/2004/09/mex/GetMetadata/Request")
        }
        MessageKind::GetMetadataResponse => {
            Some("http://schemas.xmlsoap.org/ws/2004/09/mex/GetMetadata/Response")
        }
        MessageKind::Hello
        | MessageKind::Bye
        | MessageKind::Probe
        | MessageKind::ProbeMatches
        | MessageKind::Resolve
        | MessageKind::ResolveMatches
        | MessageKind::Invoke
        | MessageKind::Fault => None,
    }
}

/// DPWS 2006 (WS-Addressing 2004/08, WS-Discovery 2005/04).
#[derive(Debug, Clone, Copy)]
pub struct Dpws2006;

impl ProtocolHelper for Dpws2006 {
    fn version(&self) -> ProtocolVersion {
        ProtocolVersion::Dpws2006
    }

    fn addressing_namespace(&self) -> &'static str {
        WSA_2004_NS
    }

    fn discovery_namespace(&self) -> &'static str {
        WSD_2005_NS
    }

    fn dpws_namespace(&self) -> &'static str {
        DPWS_2006_NS
    }

    fn anonymous_address(&self) -> &'static str {
        "http://schemas.xmlsoap.org/ws/2004/08/addressing/role/anonymous"
    }

    fn discovery_target(&self) -> &'static str {
        "urn:schemas-xmlsoap-org:ws:2005:04:discovery"
    }

    fn fault_action(&self) -> &'static str {
        "http://schemas.xmlsoap.org/ws/2004/08/addressing/fault"
    }

    fn dpws_fault_action(&self) -> &'static str {
        "http://schemas.xmlsoap.org/ws/2006/02/devprof/Fault"
    }

    fn marks_reference_parameters(&self) -> bool {
        false
    }

    fn action(&self, kind: MessageKind) -> Option<&'static str> {
        match kind {
            MessageKind::Hello => Some("http://schemas.xmlsoap.org/ws/2005/04/discovery/Hello"),
            MessageKind::Bye => Some("http://schemas.xmlsoap.org/ws/2005/04/discovery/Bye"),
            MessageKind::Probe => Some("http://schemas.xmlsoap.org/ws/2005/04/discovery/Probe"),
            MessageKind::ProbeMatches => {
                Some("http://schemas.xmlsoap.org/ws/2005/04/discovery/ProbeMatches")
            }
            MessageKind::Resolve => Some("http://schemas.xmlsoap.org/ws/2005/04/discovery/Resolve"),
            MessageKind::ResolveMatches => {
                Some("http://schemas.xmlsoap.org/ws/2005/04/discovery/ResolveMatches")
            }
            other => common_action(other),
        }
    }

    fn this_model_dialect(&self) -> &'static str {
        "http://schemas.xmlsoap.org/ws/2006/02/devprof/ThisModel"
    }

    fn this_device_dialect(&self) -> &'static str {
        "http://schemas.xmlsoap.org/ws/2006/02/devprof/ThisDevice"
    }

    fn relationship_dialect(&self) -> &'static str {
        "http://schemas.xmlsoap.org/ws/2006/02/devprof/Relationship"
    }

    fn host_relationship_type(&self) -> &'static str {
        "http://schemas.xmlsoap.org/ws/2006/02/devprof/host"
    }
}

/// DPWS 1.1 (WS-Addressing 1.0, WS-Discovery 1.1).
#[derive(Debug, Clone, Copy)]
pub struct Dpws2009;

impl ProtocolHelper for Dpws2009 {
    fn version(&self) -> ProtocolVersion {
        ProtocolVersion::Dpws2009
    }

    fn addressing_namespace(&self) -> &'static str {
        WSA_2005_NS
    }

    fn discovery_namespace(&self) -> &'static str {
        WSD_2009_NS
    }

    fn dpws_namespace(&self) -> &'static str {
        DPWS_2009_NS
    }

    fn anonymous_address(&self) -> &'static str {
        "http://www.w3.org/2005/08/addressing/anonymous"
    }

    fn discovery_target(&self) -> &'static str {
        "urn:docs-oasis-open-org:ws-dd:ns:discovery:2009:01"
    }

    fn fault_action(&self) -> &'static str {
        "http://www.w3.org/2005/08/addressing/fault"
    }

    fn dpws_fault_action(&self) -> &'static str {
        "http://docs.oasis-open.org/ws-dd/ns/dpws/2009/01/fault"
    }

    fn marks_reference_parameters(&self) -> bool {
        true
    }

    fn action(&self, kind: MessageKind) -> Option<&'static str> {
        match kind {
            MessageKind::Hello => Some("http://docs.oasis-open.org/ws-dd/ns/discovery/2009/01/Hello"),
            MessageKind::Bye => Some("http://docs.oasis-open.org/ws-dd/ns/discovery/2009/01/Bye"),
            MessageKind::Probe => Some("http://docs.oasis-open.org/ws-dd/ns/discovery/2009/01/Probe"),
            MessageKind::ProbeMatches => {
                Some("http://docs.oasis-open.org/ws-dd/ns/discovery/2009/01/ProbeMatches")
            }
            MessageKind::Resolve => {
                Some("http://docs.oasis-open.org/ws-dd/ns/discovery/2009/01/Resolve")
            }
            MessageKind::ResolveMatches => {
                Some("http://docs.oasis-open.org/ws-dd/ns/discovery/2009/01/ResolveMatches")
            }
            other => common_action(other),
        }
    }

    fn this_model_dialect(&self) -> &'static str {
        "http://docs.oasis-open.org/ws-dd/ns/dpws/2009/01/ThisModel"
    }

    fn this_device_dialect(&self) -> &'static str {
        "http://docs.oasis-open.org/ws-dd/ns/dpws/2009/01/ThisDevice"
    }

    fn relationship_dialect(&self) -> &'static str {
        "http://docs.oasis-open.org/ws-dd/ns/dpws/2009/01/Relationship"
    }

    fn host_relationship_type(&self) -> &'static str {
        "http://docs.oasis-open.org/ws-dd/ns/dpws/2009/01/host"
    }
}

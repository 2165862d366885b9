// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Version-independent namespaces, prefixes and element names.
//!
//! Version-dependent strings live behind [`super::ProtocolHelper`].

// =======================================================================
// Namespaces
// =======================================================================

/// SOAP 1.2 envelope namespace (the only accepted envelope).
pub const SOAP12_NS: &str = "http://www.w3.org/2003/05/soap-envelope";

/// SOAP 1.1 envelope namespace, recognized only to report a version mismatch.
pub const SOAP11_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";

/// Implicitly bound to the `xml` prefix, never declared.
pub const XML_NS: &str = "http://www.w3.org/XML/1998/namespace";

pub const WSE_NS: &str = "http://schemas.xmlsoap.org/ws/2004/08/eventing";
pub const MEX_NS: &str = "http://schemas.xmlsoap.org/ws/2004/09/mex";
pub const WXF_NS: &str = "http://schemas.xmlsoap.org/ws/2004/09/transfer";

pub const WSA_2004_NS: &str = "http://schemas.xmlsoap.org/ws/2004/08/addressing";
pub const WSA_2005_NS: &str = "http://www.w3.org/2005/08/addressing";
pub const WSD_2005_NS: &str = "http://schemas.xmlsoap.org/ws/2005/04/discovery";
pub const WSD_2009_NS: &str = "http://docs.oasis-open.org/ws-dd/ns/discovery/2009/01";
pub const DPWS_2006_NS: &str = "http://schemas.xmlsoap.org/ws/2006/02/devprof";
pub const DPWS_2009_NS: &str = "http://docs.oasis-open.org/ws-dd/ns/dpws/2009/01";

/// WSDL dialect for GetMetadata sections.
pub const WSDL_DIALECT: &str = "http://schemas.xmlsoap.org/wsdl/";

/// Default delivery mode for WS-Eventing subscriptions.
pub const WSE_DELIVERY_PUSH: &str = "http://schemas.xmlsoap.org/ws/2004/08/eventing/DeliveryModes/Push";

// =======================================================================
// Prefixes
// =======================================================================

pub const PREFIX_SOAP: &str = "s12";
pub const PREFIX_WSA: &str = "wsa";
pub const PREFIX_WSD: &str = "wsd";
pub const PREFIX_DPWS: &str = "dpws";
pub const PREFIX_WSE: &str = "wse";
pub const PREFIX_MEX: &str = "mex";
pub const PREFIX_XML: &str = "xml";

/// Generated prefixes are `i0`, `i1`, ...
pub const GENERATED_PREFIX: &str = "i";

// =======================================================================
// Element and attribute local names
// =======================================================================

pub const ENVELOPE: &str = "Envelope";
pub const HEADER: &str = "Header";
pub const BODY: &str = "Body";
pub const FAULT: &str = "Fault";
pub const CODE: &str = "Code";
pub const SUBCODE: &str = "Subcode";
pub const VALUE: &str = "Value";
pub const REASON: &str = "Reason";
pub const TEXT: &str = "Text";
pub const DETAIL: &str = "Detail";
pub const LANG: &str = "lang";

pub const ACTION: &str = "Action";
pub const MESSAGE_ID: &str = "MessageID";
pub const RELATES_TO: &str = "RelatesTo";
pub const REPLY_TO: &str = "ReplyTo";
pub const TO: &str = "To";
pub const ADDRESS: &str = "Address";
pub const REFERENCE_PARAMETERS: &str = "ReferenceParameters";
pub const METADATA: &str = "Metadata";
pub const IS_REFERENCE_PARAMETER: &str = "IsReferenceParameter";
pub const ENDPOINT_REFERENCE: &str = "EndpointReference";

pub const APP_SEQUENCE: &str = "AppSequence";
pub const INSTANCE_ID: &str = "InstanceId";
pub const SEQUENCE_ID: &str = "SequenceId";
pub const MESSAGE_NUMBER: &str = "MessageNumber";
pub const HELLO: &str = "Hello";
pub const BYE: &str = "Bye";
pub const PROBE: &str = "Probe";
pub const PROBE_MATCHES: &str = "ProbeMatches";
pub const PROBE_MATCH: &str = "ProbeMatch";
pub const RESOLVE: &str = "Resolve";
pub const RESOLVE_MATCHES: &str = "ResolveMatches";
pub const RESOLVE_MATCH: &str = "ResolveMatch";
pub const TYPES: &str = "Types";
pub const SCOPES: &str = "Scopes";
pub const MATCH_BY: &str = "MatchBy";
pub const XADDRS: &str = "XAddrs";
pub const METADATA_VERSION: &str = "MetadataVersion";

pub const SUBSCRIBE: &str = "Subscribe";
pub const SUBSCRIBE_RESPONSE: &str = "SubscribeResponse";
pub const RENEW: &str = "Renew";
pub const RENEW_RESPONSE: &str = "RenewResponse";
pub const GET_STATUS: &str = "GetStatus";
pub const GET_STATUS_RESPONSE: &str = "GetStatusResponse";
pub const UNSUBSCRIBE: &str = "Unsubscribe";
pub const SUBSCRIPTION_END: &str = "SubscriptionEnd";
pub const END_TO: &str = "EndTo";
pub const DELIVERY: &str = "Delivery";
pub const MODE: &str = "Mode";
pub const NOTIFY_TO: &str = "NotifyTo";
pub const EXPIRES: &str = "Expires";
pub const FILTER: &str = "Filter";
pub const DIALECT: &str = "Dialect";
pub const IDENTIFIER: &str = "Identifier";
pub const SUBSCRIPTION_MANAGER: &str = "SubscriptionManager";
pub const STATUS: &str = "Status";

pub const GET_METADATA: &str = "GetMetadata";
pub const METADATA_SECTION: &str = "MetadataSection";
pub const METADATA_REFERENCE: &str = "MetadataReference";
pub const LOCATION: &str = "Location";
pub const THIS_MODEL: &str = "ThisModel";
pub const THIS_DEVICE: &str = "ThisDevice";
pub const RELATIONSHIP: &str = "Relationship";
pub const RELATIONSHIP_TYPE: &str = "Type";
pub const HOST: &str = "Host";
pub const HOSTED: &str = "Hosted";
pub const SERVICE_ID: &str = "ServiceId";
pub const MANUFACTURER: &str = "Manufacturer";
pub const MANUFACTURER_URL: &str = "ManufacturerUrl";
pub const MODEL_NAME: &str = "ModelName";
pub const MODEL_NUMBER: &str = "ModelNumber";
pub const MODEL_URL: &str = "ModelUrl";
pub const PRESENTATION_URL: &str = "PresentationUrl";
pub const FRIENDLY_NAME: &str = "FriendlyName";
pub const FIRMWARE_VERSION: &str = "FirmwareVersion";
pub const SERIAL_NUMBER: &str = "SerialNumber";

pub const SECURITY: &str = "Security";
pub const SIG: &str = "Sig";
pub const SIG_SCHEME: &str = "Scheme";
pub const SIG_REFS: &str = "Refs";
pub const SIG_VALUE: &str = "Sig";

/// Reference id of the signed body part in the compact signature block.
pub const BODY_REFERENCE_ID: &str = "BID1";

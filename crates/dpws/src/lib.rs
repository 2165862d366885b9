// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! DPWS SOAP Codec
//!
//! Encodes and decodes the SOAP 1.2 messages of the Devices Profile for Web
//! Services: WS-Discovery, WS-Eventing, WS-Transfer/MetadataExchange and
//! application invocations, for DPWS 2006 and DPWS 1.1 (2009).
//!
//! # Features
//!
//! - **Typed model**: one [`MessageBody`] variant per message kind
//! - **Round-trip fidelity**: unknown elements and reference parameters are
//!   captured opaquely and re-emitted verbatim
//! - **Discard policies**: own-message echo, duplicate MessageID and
//!   outdated AppSequence filtering before the body is parsed
//! - **Bounded output**: a fixed pooled buffer sized by the datagram limit
//!
//! # Quick Start
//!
//! ```no_run
//! use dpws::{CodecPool, ConnectionInfo, Message, MessageBody, Probe, ProtocolVersion};
//!
//! let pool = CodecPool::default();
//! let mut probe = Message::from_body(ProtocolVersion::Dpws2009, MessageBody::Probe(Probe::default()));
//! probe.header.message_id = Some("urn:uuid:0a6dc791-2be6-4991-9af1-454778a1917a".into());
//! let bytes = pool.encode(&probe, &ConnectionInfo::outbound())?;
//!
//! match pool.decode(&bytes, &ConnectionInfo::inbound("192.168.1.20")) {
//!     Ok(message) => println!("{}", message.kind()),
//!     Err(err) if err.is_discard() => println!("discarded: {}", err),
//!     Err(err) => eprintln!("decode failed: {}", err),
//! }
//! # Ok::<(), dpws::EncodeError>(())
//! ```
//!
//! # Configuration File
//!
//! ```toml
//! max_datagram_size = 32767
//! max_sequence_ids = 10
//! message_id_buffer_size = 50
//! reference_parameter_mode = true
//! default_version = "dpws2009"
//! track_sent_messages = true
//! ```

pub mod codec;
pub mod config;
pub mod dedup;
pub mod model;
pub mod operations;
pub mod protocol;
pub mod security;
pub mod xml;

pub use codec::{
    AcceptAll, CodecEnvironment, CodecPool, ConnectionInfo, DecodeError, Decoder, DiscardPolicy,
    DiscardReason, EncodeError, Encoder, MessageMonitor, MessageReceiver,
};
pub use config::{CodecConfig, ConfigError};
pub use dedup::{AppSequenceTracker, MessageIdBuffer};
pub use model::{
    AppSequence, EndpointReference, Header, Message, MessageBody, MessageKind, Probe,
    QualifiedName,
};
pub use operations::{OperationDescriptor, OperationRegistry, OperationType};
pub use protocol::{ProtocolHelper, ProtocolVersion};
pub use security::{SecurityError, SecurityHook};

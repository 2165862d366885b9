// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! SOAP 1.2 codec: encoder, decoder, discard policies and the thread pool.

mod context;
mod decoder;
mod discard;
mod encoder;
mod environment;
mod error;
mod pool;

pub use context::{
    ConnectionInfo, Direction, MessageMonitor, MonitorStats, NoMonitor, PendingMetadataRequests,
};
pub use decoder::Decoder;
pub use discard::{
    AcceptAll, AppSequenceFilter, CompositePolicy, DiscardPolicy, DuplicateMessageFilter,
    OwnMessageFilter,
};
pub use encoder::Encoder;
pub use environment::{CodecEnvironment, CodecEnvironmentBuilder};
pub use error::{DecodeError, DecodeResult, DiscardReason, EncodeError, EncodeResult};
pub use pool::{CodecPool, MessageReceiver};

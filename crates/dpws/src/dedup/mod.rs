// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Duplicate and ordering detection for inbound messages.
//!
//! - [`AppSequenceTracker`]: per-endpoint WS-Discovery ordering filter
//! - [`MessageIdBuffer`]: bounded cache of recently seen MessageIDs

mod app_sequence;
mod message_ids;

pub use app_sequence::{AppSequenceTracker, AppSequenceTrackers, DEFAULT_MAX_SEQUENCE_IDS};
pub use message_ids::MessageIdBuffer;

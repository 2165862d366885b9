// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Per-thread encoder/decoder pool.
//!
//! One [`Encoder`] and one [`Decoder`] per calling thread, created lazily on
//! first use. An instance is taken out of the map for the duration of a call
//! and put back afterwards, so the map lock is never held while encoding or
//! decoding and a thread always finds its own instance again.
//!
//! ```text
//! thread A ──encode──> take(A) ─> Encoder ─> bytes ─> put(A)
//! thread B ──decode──> take(B) ─> Decoder ─> Message ─> put(B)
//! ```

use super::{
    CodecEnvironment, ConnectionInfo, DecodeError, DecodeResult, Decoder, DiscardPolicy,
    EncodeResult, Encoder,
};
use crate::config::CodecConfig;
use crate::model::Message;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::io::Write;
use std::sync::Arc;
use std::thread::{self, ThreadId};

/// Destination for decoded messages and decode failures.
pub trait MessageReceiver {
    fn receive(&mut self, message: Message, connection: &ConnectionInfo);

    /// Called for malformed input and for discards alike.
    fn receive_failed(&mut self, error: DecodeError, connection: &ConnectionInfo);
}

/// Thread-affine codec instances sharing one environment.
///
/// Instances are keyed by [`ThreadId`] and are not dropped when their thread
/// exits. Hosts that retire worker threads call
/// [`release_current_thread`](Self::release_current_thread) from the worker
/// before it ends, or [`clear`](Self::clear) when reconfiguring.
pub struct CodecPool {
    env: Arc<CodecEnvironment>,
    encoders: Mutex<HashMap<ThreadId, Encoder>>,
    decoders: Mutex<HashMap<ThreadId, Decoder>>,
}

impl CodecPool {
    pub fn new(config: CodecConfig) -> Self {
        Self::with_environment(Arc::new(CodecEnvironment::new(config)))
    }

    pub fn with_environment(env: Arc<CodecEnvironment>) -> Self {
        Self {
            env,
            encoders: Mutex::new(HashMap::new()),
            decoders: Mutex::new(HashMap::new()),
        }
    }

    pub fn environment(&self) -> &Arc<CodecEnvironment> {
        &self.env
    }

    /// Encode with the calling thread's encoder; returns an owned copy.
    pub fn encode(&self, message: &Message, connection: &ConnectionInfo) -> EncodeResult<Vec<u8>> {
        self.with_encoder(|encoder, env| {
            encoder
                .encode(message, connection, env)
                .map(|bytes| bytes.to_vec())
        })
    }

    /// Encode straight into `out`; returns the byte count.
    pub fn encode_to<W: Write>(
        &self,
        message: &Message,
        connection: &ConnectionInfo,
        out: &mut W,
    ) -> EncodeResult<usize> {
        self.with_encoder(|encoder, env| encoder.encode_to(message, connection, env, out))
    }

    /// Decode with the environment's discard policy.
    pub fn decode(&self, input: &[u8], connection: &ConnectionInfo) -> DecodeResult<Message> {
        let policy = Arc::clone(&self.env.discard_policy);
        self.decode_with(input, connection, policy.as_ref())
    }

    pub fn decode_with(
        &self,
        input: &[u8],
        connection: &ConnectionInfo,
        policy: &dyn DiscardPolicy,
    ) -> DecodeResult<Message> {
        let id = thread::current().id();
        let taken = self.decoders.lock().remove(&id);
        let mut decoder = taken.unwrap_or_else(|| {
            log::debug!("[pool] new decoder for {:?}", id);
            Decoder::new()
        });
        let result = decoder.decode(input, connection, &self.env, policy);
        self.decoders.lock().insert(id, decoder);
        result
    }

    /// Decode and hand the outcome to `receiver`.
    pub fn receive(
        &self,
        input: &[u8],
        connection: &ConnectionInfo,
        receiver: &mut dyn MessageReceiver,
    ) {
        match self.decode(input, connection) {
            Ok(message) => receiver.receive(message, connection),
            Err(err) => receiver.receive_failed(err, connection),
        }
    }

    /// Drop every pooled instance, e.g. after reconfiguration.
    pub fn clear(&self) {
        let encoders = {
            let mut map = self.encoders.lock();
            let n = map.len();
            map.clear();
            n
        };
        let decoders = {
            let mut map = self.decoders.lock();
            let n = map.len();
            map.clear();
            n
        };
        log::info!("[pool] cleared {} encoders, {} decoders", encoders, decoders);
    }

    /// Drop the calling thread's instances; returns whether any existed.
    pub fn release_current_thread(&self) -> bool {
        let id = thread::current().id();
        let encoder = self.encoders.lock().remove(&id).is_some();
        let decoder = self.decoders.lock().remove(&id).is_some();
        if encoder || decoder {
            log::debug!("[pool] released instances of {:?}", id);
        }
        encoder || decoder
    }

    pub fn pooled_encoders(&self) -> usize {
        self.encoders.lock().len()
    }

    pub fn pooled_decoders(&self) -> usize {
        self.decoders.lock().len()
    }

    fn with_encoder<T>(&self, f: impl FnOnce(&mut Encoder, &CodecEnvironment) -> T) -> T {
        let id = thread::current().id();
        let taken = self.encoders.lock().remove(&id);
        let mut encoder = taken.unwrap_or_else(|| {
            log::debug!(
                "[pool] new encoder for {:?} ({} bytes)",
                id,
                self.env.config.max_datagram_size
            );
            Encoder::new(self.env.config.max_datagram_size)
        });
        let result = f(&mut encoder, &self.env);
        self.encoders.lock().insert(id, encoder);
        result
    }
}

impl Default for CodecPool {
    fn default() -> Self {
        Self::new(CodecConfig::default())
    }
}

impl std::fmt::Debug for CodecPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodecPool")
            .field("encoders", &self.pooled_encoders())
            .field("decoders", &self.pooled_decoders())
            .finish()
    }
}

// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Shared, read-mostly state consulted by every encoder and decoder.

use super::discard::{AppSequenceFilter, CompositePolicy, DiscardPolicy, DuplicateMessageFilter, OwnMessageFilter};
use super::{MessageMonitor, NoMonitor, PendingMetadataRequests};
use crate::config::CodecConfig;
use crate::dedup::{AppSequenceTrackers, MessageIdBuffer};
use crate::model::{ExtensionHandler, HandlerRegistry, QualifiedName};
use crate::operations::{OperationDescriptor, OperationRegistry};
use crate::security::SecurityHook;
use std::sync::Arc;

/// Registries, hooks and dedup state shared across threads.
pub struct CodecEnvironment {
    pub config: CodecConfig,
    pub handlers: HandlerRegistry,
    pub operations: OperationRegistry,
    /// `None` when no security module is configured: signature blocks are
    /// then neither produced nor validated.
    pub security: Option<Arc<dyn SecurityHook>>,
    pub monitor: Arc<dyn MessageMonitor>,
    /// Policy used by decode calls that do not pass their own.
    pub discard_policy: Arc<dyn DiscardPolicy>,
    pub pending_metadata: PendingMetadataRequests,
    /// MessageIDs of messages this node encoded.
    pub sent_messages: Arc<MessageIdBuffer>,
    pub app_sequences: Arc<AppSequenceTrackers>,
}

impl CodecEnvironment {
    pub fn new(config: CodecConfig) -> Self {
        Self::builder().config(config).build()
    }

    pub fn builder() -> CodecEnvironmentBuilder {
        CodecEnvironmentBuilder::default()
    }
}

impl Default for CodecEnvironment {
    fn default() -> Self {
        Self::new(CodecConfig::default())
    }
}

impl std::fmt::Debug for CodecEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodecEnvironment")
            .field("config", &self.config)
            .field("handlers", &self.handlers)
            .field("security", &self.security.as_ref().map(|s| s.scheme().to_string()))
            .field("sent_messages", &self.sent_messages)
            .finish()
    }
}

/// Builder for [`CodecEnvironment`].
#[derive(Default)]
pub struct CodecEnvironmentBuilder {
    config: CodecConfig,
    handlers: HandlerRegistry,
    operations: OperationRegistry,
    security: Option<Arc<dyn SecurityHook>>,
    monitor: Option<Arc<dyn MessageMonitor>>,
    discard_policy: Option<Arc<dyn DiscardPolicy>>,
}

impl CodecEnvironmentBuilder {
    pub fn config(mut self, config: CodecConfig) -> Self {
        self.config = config;
        self
    }

    pub fn handler(mut self, name: QualifiedName, handler: Arc<dyn ExtensionHandler>) -> Self {
        self.handlers.register(name, handler);
        self
    }

    pub fn operation(mut self, operation: OperationDescriptor) -> Self {
        self.operations.register(operation);
        self
    }

    pub fn security(mut self, hook: Arc<dyn SecurityHook>) -> Self {
        self.security = Some(hook);
        self
    }

    pub fn monitor(mut self, monitor: Arc<dyn MessageMonitor>) -> Self {
        self.monitor = Some(monitor);
        self
    }

    pub fn discard_policy(mut self, policy: Arc<dyn DiscardPolicy>) -> Self {
        self.discard_policy = Some(policy);
        self
    }

    pub fn build(self) -> CodecEnvironment {
        let config = self.config;
        let sent_messages = Arc::new(MessageIdBuffer::new(config.message_id_buffer_size));
        let app_sequences = Arc::new(AppSequenceTrackers::new(config.max_sequence_ids));

        let discard_policy = self.discard_policy.unwrap_or_else(|| {
            let mut policy = CompositePolicy::new();
            if config.track_sent_messages {
                policy.push(Box::new(OwnMessageFilter::new(Arc::clone(&sent_messages))));
            }
            policy.push(Box::new(DuplicateMessageFilter::new(
                config.message_id_buffer_size,
            )));
            policy.push(Box::new(AppSequenceFilter::new(Arc::clone(&app_sequences))));
            Arc::new(policy)
        });

        CodecEnvironment {
            pending_metadata: PendingMetadataRequests::new(config.message_id_buffer_size),
            handlers: self.handlers,
            operations: self.operations,
            security: self.security,
            monitor: self.monitor.unwrap_or_else(|| Arc::new(NoMonitor)),
            discard_policy,
            sent_messages,
            app_sequences,
            config,
        }
    }
}

// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Codec configuration.
//!
//! Supports both programmatic and file-based configuration.

use crate::dedup::DEFAULT_MAX_SEQUENCE_IDS;
use crate::protocol::ProtocolVersion;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Smallest accepted encode buffer.
pub const MIN_DATAGRAM_SIZE: usize = 512;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Codec configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodecConfig {
    /// Capacity of each pooled encode buffer (bytes).
    #[serde(default = "default_max_datagram_size")]
    pub max_datagram_size: usize,

    /// Sequence ids tracked per AppSequence instance.
    #[serde(default = "default_max_sequence_ids")]
    pub max_sequence_ids: usize,

    /// Capacity of each MessageID buffer.
    #[serde(default = "default_message_id_buffer_size")]
    pub message_id_buffer_size: usize,

    /// Carry the subscription identifier as a `wse:Identifier` reference
    /// parameter of NotifyTo (otherwise as the NotifyTo URI fragment).
    #[serde(default = "default_true")]
    pub reference_parameter_mode: bool,

    /// Version used when the transport context names none.
    #[serde(default)]
    pub default_version: ProtocolVersion,

    /// Record outgoing MessageIDs so their echoes are discarded.
    #[serde(default = "default_true")]
    pub track_sent_messages: bool,
}

fn default_max_datagram_size() -> usize {
    32767
}

fn default_max_sequence_ids() -> usize {
    DEFAULT_MAX_SEQUENCE_IDS
}

fn default_message_id_buffer_size() -> usize {
    50
}

fn default_true() -> bool {
    true
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            max_datagram_size: default_max_datagram_size(),
            max_sequence_ids: default_max_sequence_ids(),
            message_id_buffer_size: default_message_id_buffer_size(),
            reference_parameter_mode: true,
            default_version: ProtocolVersion::default(),
            track_sent_messages: true,
        }
    }
}

impl CodecConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse and validate a TOML document.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_datagram_size < MIN_DATAGRAM_SIZE {
            return Err(ConfigError::Invalid(format!(
                "max_datagram_size {} is below the minimum of {} bytes",
                self.max_datagram_size, MIN_DATAGRAM_SIZE
            )));
        }
        if self.max_sequence_ids == 0 {
            return Err(ConfigError::Invalid("max_sequence_ids must be > 0".into()));
        }
        if self.message_id_buffer_size == 0 {
            return Err(ConfigError::Invalid(
                "message_id_buffer_size must be > 0".into(),
            ));
        }
        Ok(())
    }

    pub fn with_max_datagram_size(mut self, size: usize) -> Self {
        self.max_datagram_size = size;
        self
    }

    pub fn with_reference_parameter_mode(mut self, enabled: bool) -> Self {
        self.reference_parameter_mode = enabled;
        self
    }

    pub fn with_default_version(mut self, version: ProtocolVersion) -> Self {
        self.default_version = version;
        self
    }
}

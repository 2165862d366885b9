// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! XML reader and writer used by the codec.

pub mod reader;
pub mod writer;

pub use reader::{Content, ElementReader, StartTag, Tag};
pub use writer::{BoundedBuffer, PrefixTable, SerializerMode, XmlSink};

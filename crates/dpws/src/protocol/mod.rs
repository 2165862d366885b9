// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Wire constants and protocol-version helpers.

pub mod constants;
pub mod version;

pub use version::{Dpws2006, Dpws2009, ProtocolHelper, ProtocolVersion};

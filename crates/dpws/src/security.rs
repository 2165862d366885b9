// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Security hook for compact message signatures.
//!
//! The codec never implements signing itself; it calls a [`SecurityHook`]:
//!
//! ```text
//! encode (secure Hello/Bye/ProbeMatches/ResolveMatches)
//!   canonical serializer -> body bytes -> sign() -> <dpws:Security> block
//!
//! decode
//!   wrap_input() -> parse -> Security block -> validate(sig, body, EPR, XAddrs)
//! ```
//!
//! With the `security` feature, [`HmacSecurity`] provides a shared-key
//! HMAC-SHA256 implementation.

use crate::codec::ConnectionInfo;
use crate::model::EndpointReference;
use std::borrow::Cow;
use std::fmt;

/// Security-related errors
#[derive(Debug, Clone)]
pub enum SecurityError {
    /// Signing operation failed
    SigningFailed(String),

    /// Input stream could not be unwrapped
    InvalidInput(String),

    /// Key material missing or unusable
    ConfigurationError(String),
}

impl fmt::Display for SecurityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SigningFailed(msg) => write!(f, "Signing failed: {}", msg),
            Self::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            Self::ConfigurationError(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for SecurityError {}

/// Everything a validator may need to judge a received signature.
#[derive(Debug)]
pub struct SignatureCheck<'a> {
    pub signature: &'a str,
    /// Exact bytes of the signed `s12:Body` element as received.
    pub signed_part: &'a [u8],
    pub connection: &'a ConnectionInfo,
    pub endpoint: &'a EndpointReference,
    /// Transport addresses the sender may legitimately use.
    pub candidate_addresses: &'a [String],
}

/// Narrow interface to the signing subsystem.
pub trait SecurityHook: Send + Sync {
    /// Signature scheme URI written to the compact block.
    fn scheme(&self) -> &str;

    /// Sign the serialized body; returns the encoded signature value.
    fn sign(&self, part: &[u8]) -> Result<String, SecurityError>;

    /// Validate a received signature.
    fn validate(&self, check: &SignatureCheck<'_>) -> bool;

    /// Transform raw input before parsing (decryption, framing removal).
    fn wrap_input<'a>(&self, input: &'a [u8]) -> Result<Cow<'a, [u8]>, SecurityError> {
        Ok(Cow::Borrowed(input))
    }
}

#[cfg(feature = "security")]
pub use hmac_impl::HmacSecurity;

#[cfg(feature = "security")]
mod hmac_impl {
    use super::{SecurityError, SecurityHook, SignatureCheck};
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use ring::hmac;

    /// Signature scheme identifier for HMAC-SHA256 compact signatures.
    pub const HMAC_SHA256_SCHEME: &str = "http://www.w3.org/2001/04/xmldsig-more#hmac-sha256";

    /// Shared-key HMAC-SHA256 signer/validator.
    pub struct HmacSecurity {
        key: hmac::Key,
    }

    impl HmacSecurity {
        pub fn new(secret: &[u8]) -> Result<Self, SecurityError> {
            if secret.is_empty() {
                return Err(SecurityError::ConfigurationError(
                    "HMAC secret must not be empty".into(),
                ));
            }
            Ok(Self {
                key: hmac::Key::new(hmac::HMAC_SHA256, secret),
            })
        }
    }

    impl SecurityHook for HmacSecurity {
        fn scheme(&self) -> &str {
            HMAC_SHA256_SCHEME
        }

        fn sign(&self, part: &[u8]) -> Result<String, SecurityError> {
            let tag = hmac::sign(&self.key, part);
            Ok(STANDARD.encode(tag.as_ref()))
        }

        fn validate(&self, check: &SignatureCheck<'_>) -> bool {
            let Ok(tag) = STANDARD.decode(check.signature) else {
                log::debug!("[security] signature is not base64");
                return false;
            };
            hmac::verify(&self.key, check.signed_part, &tag).is_ok()
        }
    }

}

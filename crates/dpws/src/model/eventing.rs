// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! WS-Eventing message bodies.

use super::epr::collect_opt;
use super::{EndpointReference, HandlerRegistry, RawElement, UnknownContent};
use crate::protocol::constants::IDENTIFIER;

/// Text with an optional `xml:lang`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalizedString {
    pub lang: Option<String>,
    pub value: String,
}

impl LocalizedString {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            lang: None,
            value: value.into(),
        }
    }

    pub fn with_lang(lang: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            lang: Some(lang.into()),
            value: value.into(),
        }
    }
}

/// `wse:Delivery`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Delivery {
    pub mode: Option<String>,
    pub notify_to: EndpointReference,
    /// Subscription identifier carried either as a `wse:Identifier`
    /// reference parameter or as the NotifyTo URI fragment.
    pub identifier: Option<String>,
    pub unknown: UnknownContent,
}

/// Identifier carried by a `wse:Identifier` reference parameter, when the
/// parameter is plain text that [`RawElement::with_text`] reproduces exactly.
pub(crate) fn identifier_value(parameter: &RawElement, eventing_ns: &str) -> Option<String> {
    if !parameter.name.is(eventing_ns, IDENTIFIER) {
        return None;
    }
    let text = parameter.text_content()?;
    (RawElement::with_text(parameter.name.clone(), &text) == *parameter).then_some(text)
}

/// `wse:Filter` listing the subscribed action URIs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    pub dialect: Option<String>,
    pub actions: Vec<String>,
    pub unknown: UnknownContent,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Subscribe {
    pub end_to: Option<EndpointReference>,
    pub delivery: Delivery,
    pub expires: Option<String>,
    pub filter: Option<Filter>,
    pub unknown: UnknownContent,
}

impl Subscribe {
    pub(crate) fn collect_namespaces(&self, handlers: &HandlerRegistry, out: &mut Vec<String>) {
        collect_opt(self.end_to.as_ref(), handlers, out);
        self.delivery.notify_to.collect_namespaces(handlers, out);
        self.delivery.unknown.collect_namespaces(handlers, out);
        if let Some(filter) = &self.filter {
            filter.unknown.collect_namespaces(handlers, out);
        }
        self.unknown.collect_namespaces(handlers, out);
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubscribeResponse {
    pub subscription_manager: EndpointReference,
    pub expires: Option<String>,
    pub unknown: UnknownContent,
}

/// Body of Renew, RenewResponse and GetStatusResponse.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpiresBody {
    pub expires: Option<String>,
    pub unknown: UnknownContent,
}

/// Body of GetStatus, Unsubscribe, UnsubscribeResponse and Get.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmptyBody {
    pub unknown: UnknownContent,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubscriptionEnd {
    pub subscription_manager: EndpointReference,
    pub status: String,
    pub reasons: Vec<LocalizedString>,
    pub unknown: UnknownContent,
}

// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! WS-Eventing bodies.

use super::{write_epr, write_localized, write_unknown_elements, EncodeCtx};
use crate::codec::{EncodeError, EncodeResult};
use crate::model::{
    identifier_value, Delivery, EmptyBody, EndpointReference, ExpiresBody, QualifiedName,
    RawElement, Subscribe, SubscribeResponse, SubscriptionEnd,
};
use crate::protocol::constants::{
    DELIVERY, DIALECT, END_TO, EXPIRES, FILTER, IDENTIFIER, MODE, NOTIFY_TO, REASON, STATUS,
    SUBSCRIBE, SUBSCRIBE_RESPONSE, SUBSCRIPTION_END, SUBSCRIPTION_MANAGER,
};
use crate::xml::XmlSink;

pub(super) fn write_subscribe(
    w: &mut XmlSink<'_>,
    cx: &EncodeCtx<'_>,
    subscribe: &Subscribe,
) -> EncodeResult<()> {
    let wse = cx.helper.eventing_namespace();
    w.start(wse, SUBSCRIBE)?;
    w.attributes(&subscribe.unknown.attributes)?;
    if let Some(end_to) = &subscribe.end_to {
        write_epr(w, cx, wse, END_TO, end_to)?;
    }

    let delivery = &subscribe.delivery;
    w.start(wse, DELIVERY)?;
    if let Some(mode) = &delivery.mode {
        w.attribute("", MODE, mode)?;
    }
    w.attributes(&delivery.unknown.attributes)?;
    let notify_to = resolve_notify_to(cx, delivery)?;
    write_epr(w, cx, wse, NOTIFY_TO, &notify_to)?;
    write_unknown_elements(w, cx, &delivery.unknown)?;
    w.end()?;

    if let Some(expires) = &subscribe.expires {
        w.leaf(wse, EXPIRES, expires)?;
    }
    if let Some(filter) = &subscribe.filter {
        w.start(wse, FILTER)?;
        if let Some(dialect) = &filter.dialect {
            w.attribute("", DIALECT, dialect)?;
        }
        w.attributes(&filter.unknown.attributes)?;
        w.text(&filter.actions.join(" "))?;
        w.end()?;
    }
    write_unknown_elements(w, cx, &subscribe.unknown)?;
    w.end()
}

/// NotifyTo as sent: relative addresses resolved against the local binding,
/// the subscription identifier attached as reference parameter or fragment.
///
/// The slot the identifier travels in must be free in the address given by
/// the caller, otherwise the receiver would read it back as the identifier.
fn resolve_notify_to(cx: &EncodeCtx<'_>, delivery: &Delivery) -> EncodeResult<EndpointReference> {
    let mut epr = delivery.notify_to.clone();
    let wse = cx.helper.eventing_namespace();
    if cx.env.config.reference_parameter_mode {
        if epr
            .reference_parameters
            .iter()
            .any(|p| identifier_value(p, wse).is_some())
        {
            return Err(EncodeError::InvalidField {
                field: "NotifyTo",
                reason: "wse:Identifier reference parameter; use Delivery::identifier".into(),
            });
        }
    } else if epr.address.contains('#') {
        return Err(EncodeError::InvalidField {
            field: "NotifyTo",
            reason: format!(
                "address fragment is reserved for the subscription identifier: {}",
                epr.address
            ),
        });
    }

    if epr.address.starts_with('/') {
        match &cx.connection.local_binding {
            Some(binding) => {
                epr.address = format!("{}{}", binding.trim_end_matches('/'), epr.address);
            }
            None => log::warn!(
                "[encode] relative NotifyTo {} without a local binding",
                epr.address
            ),
        }
    }
    if let Some(identifier) = &delivery.identifier {
        if cx.env.config.reference_parameter_mode {
            epr.reference_parameters.push(RawElement::with_text(
                QualifiedName::new(wse, IDENTIFIER),
                identifier,
            ));
        } else {
            epr.address = format!("{}#{}", epr.address, identifier);
        }
    }
    Ok(epr)
}

pub(super) fn write_subscribe_response(
    w: &mut XmlSink<'_>,
    cx: &EncodeCtx<'_>,
    response: &SubscribeResponse,
) -> EncodeResult<()> {
    let wse = cx.helper.eventing_namespace();
    w.start(wse, SUBSCRIBE_RESPONSE)?;
    w.attributes(&response.unknown.attributes)?;
    write_epr(w, cx, wse, SUBSCRIPTION_MANAGER, &response.subscription_manager)?;
    if let Some(expires) = &response.expires {
        w.leaf(wse, EXPIRES, expires)?;
    }
    write_unknown_elements(w, cx, &response.unknown)?;
    w.end()
}

/// Renew, RenewResponse and GetStatusResponse.
pub(super) fn write_expires_body(
    w: &mut XmlSink<'_>,
    cx: &EncodeCtx<'_>,
    local: &str,
    body: &ExpiresBody,
) -> EncodeResult<()> {
    let wse = cx.helper.eventing_namespace();
    w.start(wse, local)?;
    w.attributes(&body.unknown.attributes)?;
    if let Some(expires) = &body.expires {
        w.leaf(wse, EXPIRES, expires)?;
    }
    write_unknown_elements(w, cx, &body.unknown)?;
    w.end()
}

/// GetStatus and Unsubscribe.
pub(super) fn write_empty_element(
    w: &mut XmlSink<'_>,
    cx: &EncodeCtx<'_>,
    local: &str,
    body: &EmptyBody,
) -> EncodeResult<()> {
    w.start(cx.helper.eventing_namespace(), local)?;
    w.attributes(&body.unknown.attributes)?;
    write_unknown_elements(w, cx, &body.unknown)?;
    w.end()
}

pub(super) fn write_subscription_end(
    w: &mut XmlSink<'_>,
    cx: &EncodeCtx<'_>,
    end: &SubscriptionEnd,
) -> EncodeResult<()> {
    let wse = cx.helper.eventing_namespace();
    w.start(wse, SUBSCRIPTION_END)?;
    w.attributes(&end.unknown.attributes)?;
    write_epr(w, cx, wse, SUBSCRIPTION_MANAGER, &end.subscription_manager)?;
    w.leaf(wse, STATUS, &end.status)?;
    for reason in &end.reasons {
        write_localized(w, wse, REASON, reason)?;
    }
    write_unknown_elements(w, cx, &end.unknown)?;
    w.end()
}

// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! WS-Eventing bodies.

use super::{
    capture_remaining, capture_unknown, finish_body, parse_epr, parse_localized, split_list,
    take_attributes, DecodeCtx,
};
use crate::codec::{DecodeError, DecodeResult};
use crate::model::{
    identifier_value, Delivery, EmptyBody, EndpointReference, ExpiresBody, Filter, MessageBody,
    Subscribe, SubscribeResponse, SubscriptionEnd,
};
use crate::protocol::constants::{
    DELIVERY, DIALECT, END_TO, EXPIRES, FILTER, GET_STATUS, GET_STATUS_RESPONSE, MODE,
    NOTIFY_TO, REASON, RENEW, RENEW_RESPONSE, STATUS, SUBSCRIBE, SUBSCRIBE_RESPONSE,
    SUBSCRIPTION_END, SUBSCRIPTION_MANAGER, UNSUBSCRIBE,
};
use crate::xml::{ElementReader, StartTag};

pub(super) fn parse_subscribe(
    r: &mut ElementReader<'_>,
    cx: &DecodeCtx<'_>,
    _body: &StartTag,
) -> DecodeResult<MessageBody> {
    let wse = cx.helper.eventing_namespace();
    let wsa = cx.helper.addressing_namespace();
    let start = r.expect_child(wse, SUBSCRIBE)?;
    let mut subscribe = Subscribe::default();
    take_attributes(&start, &[], &mut subscribe.unknown);
    let mut delivery = None;
    while let Some(child) = r.next_child()? {
        if child.is(wse, END_TO) {
            subscribe.end_to = Some(parse_epr(r, cx.env, wsa, &child)?);
        } else if child.is(wse, DELIVERY) && delivery.is_none() {
            delivery = Some(parse_delivery(r, cx, &child)?);
        } else if child.is(wse, EXPIRES) {
            subscribe.expires = Some(r.next_trimmed()?);
        } else if child.is(wse, FILTER) {
            let mut filter = Filter {
                dialect: child.attr(DIALECT).map(str::to_string),
                ..Filter::default()
            };
            take_attributes(&child, &[DIALECT], &mut filter.unknown);
            filter.actions = split_list(&r.next_text()?);
            subscribe.filter = Some(filter);
        } else {
            capture_unknown(r, cx.env, child, &mut subscribe.unknown)?;
        }
    }
    subscribe.delivery = delivery.ok_or_else(|| DecodeError::missing(wse, DELIVERY))?;
    finish_body(r)?;
    Ok(MessageBody::Subscribe(subscribe))
}

fn parse_delivery(
    r: &mut ElementReader<'_>,
    cx: &DecodeCtx<'_>,
    start: &StartTag,
) -> DecodeResult<Delivery> {
    let wse = cx.helper.eventing_namespace();
    let mut delivery = Delivery {
        mode: start.attr(MODE).map(str::to_string),
        ..Delivery::default()
    };
    take_attributes(start, &[MODE], &mut delivery.unknown);
    let mut notify_to = None;
    while let Some(child) = r.next_child()? {
        if child.is(wse, NOTIFY_TO) && notify_to.is_none() {
            notify_to = Some(parse_epr(r, cx.env, cx.helper.addressing_namespace(), &child)?);
        } else {
            capture_unknown(r, cx.env, child, &mut delivery.unknown)?;
        }
    }
    let mut notify_to = notify_to.ok_or_else(|| DecodeError::missing(wse, NOTIFY_TO))?;
    delivery.identifier = take_identifier(cx, &mut notify_to);
    delivery.notify_to = notify_to;
    Ok(delivery)
}

/// Subscription identifier from a `wse:Identifier` reference parameter or
/// from the address fragment, following the configured mode.
///
/// Identifier parameters with attributes or markup stay in place.
fn take_identifier(cx: &DecodeCtx<'_>, epr: &mut EndpointReference) -> Option<String> {
    if cx.env.config.reference_parameter_mode {
        let wse = cx.helper.eventing_namespace();
        let (index, identifier) = epr
            .reference_parameters
            .iter()
            .enumerate()
            .find_map(|(i, p)| identifier_value(p, wse).map(|id| (i, id)))?;
        epr.reference_parameters.remove(index);
        return Some(identifier);
    }
    let (base, fragment) = epr.address.split_once('#')?;
    let (base, fragment) = (base.to_string(), fragment.to_string());
    epr.address = base;
    Some(fragment)
}

pub(super) fn parse_subscribe_response(
    r: &mut ElementReader<'_>,
    cx: &DecodeCtx<'_>,
    _body: &StartTag,
) -> DecodeResult<MessageBody> {
    let wse = cx.helper.eventing_namespace();
    let start = r.expect_child(wse, SUBSCRIBE_RESPONSE)?;
    let mut response = SubscribeResponse::default();
    take_attributes(&start, &[], &mut response.unknown);
    let mut manager = None;
    while let Some(child) = r.next_child()? {
        if child.is(wse, SUBSCRIPTION_MANAGER) && manager.is_none() {
            manager = Some(parse_epr(r, cx.env, cx.helper.addressing_namespace(), &child)?);
        } else if child.is(wse, EXPIRES) {
            response.expires = Some(r.next_trimmed()?);
        } else {
            capture_unknown(r, cx.env, child, &mut response.unknown)?;
        }
    }
    response.subscription_manager =
        manager.ok_or_else(|| DecodeError::missing(wse, SUBSCRIPTION_MANAGER))?;
    finish_body(r)?;
    Ok(MessageBody::SubscribeResponse(response))
}

fn parse_expires_body(
    r: &mut ElementReader<'_>,
    cx: &DecodeCtx<'_>,
    local: &str,
) -> DecodeResult<ExpiresBody> {
    let wse = cx.helper.eventing_namespace();
    let start = r.expect_child(wse, local)?;
    let mut body = ExpiresBody::default();
    take_attributes(&start, &[], &mut body.unknown);
    while let Some(child) = r.next_child()? {
        if child.is(wse, EXPIRES) {
            body.expires = Some(r.next_trimmed()?);
        } else {
            capture_unknown(r, cx.env, child, &mut body.unknown)?;
        }
    }
    finish_body(r)?;
    Ok(body)
}

fn parse_empty_element(
    r: &mut ElementReader<'_>,
    cx: &DecodeCtx<'_>,
    local: &str,
) -> DecodeResult<EmptyBody> {
    let start = r.expect_child(cx.helper.eventing_namespace(), local)?;
    let mut body = EmptyBody::default();
    take_attributes(&start, &[], &mut body.unknown);
    capture_remaining(r, cx.env, &mut body.unknown)?;
    finish_body(r)?;
    Ok(body)
}

/// Body with no wrapper element: `s12:Body` attributes and children.
pub(super) fn parse_bare_body(
    r: &mut ElementReader<'_>,
    cx: &DecodeCtx<'_>,
    body: &StartTag,
) -> DecodeResult<EmptyBody> {
    let mut empty = EmptyBody::default();
    take_attributes(body, &[], &mut empty.unknown);
    capture_remaining(r, cx.env, &mut empty.unknown)?;
    Ok(empty)
}

pub(super) fn parse_renew(
    r: &mut ElementReader<'_>,
    cx: &DecodeCtx<'_>,
    _body: &StartTag,
) -> DecodeResult<MessageBody> {
    parse_expires_body(r, cx, RENEW).map(MessageBody::Renew)
}

pub(super) fn parse_renew_response(
    r: &mut ElementReader<'_>,
    cx: &DecodeCtx<'_>,
    _body: &StartTag,
) -> DecodeResult<MessageBody> {
    parse_expires_body(r, cx, RENEW_RESPONSE).map(MessageBody::RenewResponse)
}

pub(super) fn parse_get_status(
    r: &mut ElementReader<'_>,
    cx: &DecodeCtx<'_>,
    _body: &StartTag,
) -> DecodeResult<MessageBody> {
    parse_empty_element(r, cx, GET_STATUS).map(MessageBody::GetStatus)
}

pub(super) fn parse_get_status_response(
    r: &mut ElementReader<'_>,
    cx: &DecodeCtx<'_>,
    _body: &StartTag,
) -> DecodeResult<MessageBody> {
    parse_expires_body(r, cx, GET_STATUS_RESPONSE).map(MessageBody::GetStatusResponse)
}

pub(super) fn parse_unsubscribe(
    r: &mut ElementReader<'_>,
    cx: &DecodeCtx<'_>,
    _body: &StartTag,
) -> DecodeResult<MessageBody> {
    parse_empty_element(r, cx, UNSUBSCRIBE).map(MessageBody::Unsubscribe)
}

pub(super) fn parse_unsubscribe_response(
    r: &mut ElementReader<'_>,
    cx: &DecodeCtx<'_>,
    body: &StartTag,
) -> DecodeResult<MessageBody> {
    parse_bare_body(r, cx, body).map(MessageBody::UnsubscribeResponse)
}

pub(super) fn parse_subscription_end(
    r: &mut ElementReader<'_>,
    cx: &DecodeCtx<'_>,
    _body: &StartTag,
) -> DecodeResult<MessageBody> {
    let wse = cx.helper.eventing_namespace();
    let start = r.expect_child(wse, SUBSCRIPTION_END)?;
    let mut end = SubscriptionEnd::default();
    take_attributes(&start, &[], &mut end.unknown);
    let mut manager = None;
    let mut status = None;
    while let Some(child) = r.next_child()? {
        if child.is(wse, SUBSCRIPTION_MANAGER) && manager.is_none() {
            manager = Some(parse_epr(r, cx.env, cx.helper.addressing_namespace(), &child)?);
        } else if child.is(wse, STATUS) {
            status = Some(r.next_trimmed()?);
        } else if child.is(wse, REASON) {
            end.reasons.push(parse_localized(r, &child)?);
        } else {
            capture_unknown(r, cx.env, child, &mut end.unknown)?;
        }
    }
    end.subscription_manager =
        manager.ok_or_else(|| DecodeError::missing(wse, SUBSCRIPTION_MANAGER))?;
    end.status = status.ok_or_else(|| DecodeError::missing(wse, STATUS))?;
    finish_body(r)?;
    Ok(MessageBody::SubscriptionEnd(end))
}

#[cfg(test)]
mod tests {
    use crate::codec::{AcceptAll, CodecEnvironment, ConnectionInfo, Decoder};
    use crate::config::CodecConfig;
    use crate::model::MessageBody;

    fn subscribe(notify_to: &str) -> String {
        format!(
            r#"<s12:Envelope xmlns:s12="http://www.w3.org/2003/05/soap-envelope" xmlns:wsa="http://www.w3.org/2005/08/addressing" xmlns:wse="http://schemas.xmlsoap.org/ws/2004/08/eventing">
<s12:Header><wsa:Action>http://schemas.xmlsoap.org/ws/2004/08/eventing/Subscribe</wsa:Action></s12:Header>
<s12:Body><wse:Subscribe>
  <wse:Delivery Mode="http://schemas.xmlsoap.org/ws/2004/08/eventing/DeliveryModes/Push">
    <wse:NotifyTo>{}</wse:NotifyTo>
  </wse:Delivery>
  <wse:Expires>PT1H</wse:Expires>
  <wse:Filter Dialect="http://docs.oasis-open.org/ws-dd/ns/dpws/2009/01/Action">urn:a urn:b</wse:Filter>
</wse:Subscribe></s12:Body></s12:Envelope>"#,
            notify_to
        )
    }

    fn decode_subscribe(xml: &str, env: &CodecEnvironment) -> crate::model::Subscribe {
        let message = Decoder::new()
            .decode(xml.as_bytes(), &ConnectionInfo::default(), env, &AcceptAll)
            .unwrap();
        match message.body {
            MessageBody::Subscribe(subscribe) => subscribe,
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_identifier_from_reference_parameter() {
        let xml = subscribe(
            "<wsa:Address>http://10.0.0.2/sink</wsa:Address><wsa:ReferenceParameters><wse:Identifier>urn:uuid:sub</wse:Identifier></wsa:ReferenceParameters>",
        );
        let sub = decode_subscribe(&xml, &CodecEnvironment::default());
        assert_eq!(sub.delivery.identifier.as_deref(), Some("urn:uuid:sub"));
        assert!(sub.delivery.notify_to.reference_parameters.is_empty());
        assert_eq!(sub.expires.as_deref(), Some("PT1H"));
        assert_eq!(sub.filter.unwrap().actions, vec!["urn:a", "urn:b"]);
    }

    #[test]
    fn test_identifier_from_fragment() {
        let env = CodecEnvironment::new(CodecConfig::default().with_reference_parameter_mode(false));
        let xml = subscribe("<wsa:Address>http://10.0.0.2/sink#sub-7</wsa:Address>");
        let sub = decode_subscribe(&xml, &env);
        assert_eq!(sub.delivery.identifier.as_deref(), Some("sub-7"));
        assert_eq!(sub.delivery.notify_to.address, "http://10.0.0.2/sink");
    }

    #[test]
    fn test_structured_identifier_left_in_place() {
        let xml = subscribe(
            "<wsa:Address>http://10.0.0.2/sink</wsa:Address><wsa:ReferenceParameters><wse:Identifier><wse:Part>a</wse:Part></wse:Identifier><wse:Identifier scheme=\"x\">b</wse:Identifier></wsa:ReferenceParameters>",
        );
        let sub = decode_subscribe(&xml, &CodecEnvironment::default());
        assert!(sub.delivery.identifier.is_none());
        assert_eq!(sub.delivery.notify_to.reference_parameters.len(), 2);
    }

    #[test]
    fn test_first_plain_identifier_taken() {
        let xml = subscribe(
            "<wsa:Address>http://10.0.0.2/sink</wsa:Address><wsa:ReferenceParameters><wse:Identifier><wse:Part>a</wse:Part></wse:Identifier><wse:Identifier>urn:uuid:plain</wse:Identifier></wsa:ReferenceParameters>",
        );
        let sub = decode_subscribe(&xml, &CodecEnvironment::default());
        assert_eq!(sub.delivery.identifier.as_deref(), Some("urn:uuid:plain"));
        assert_eq!(sub.delivery.notify_to.reference_parameters.len(), 1);
    }
}

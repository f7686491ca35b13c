/*
** This file is a part of Colibri (stanza decoder for Jitsi Videobridge)
**
** Colibri is free software: you can redistribute it and/or modify it
** under the terms of the GNU Lesser General Public License as
** published by the Free Software Foundation, either version 3 of
** the License, or (at your option) any later version.
*/

use crate::colibri::names;
use crate::colibri::optional_attr;
use crate::colibri::parse_attr;
use crate::skip_element;
use crate::Candidate;
use crate::ColibriError;
use crate::Fingerprint;
use crate::IceUdpTransport;
use crate::RawUdpTransport;
use crate::SkipMode;
use crate::StartTag;
use crate::TokenStream;
use crate::Transport;

use super::read_children;
use super::ElementDecoder;
use super::Extension;

fn parse_candidate(tag: &StartTag) -> Result<Candidate, ColibriError> {
    Ok(Candidate {
        component: parse_attr(tag, "component")?,
        foundation: optional_attr(tag, "foundation"),
        generation: parse_attr(tag, "generation")?,
        id: optional_attr(tag, "id"),
        ip: optional_attr(tag, "ip"),
        network: optional_attr(tag, "network"),
        port: parse_attr(tag, "port")?,
        priority: parse_attr(tag, "priority")?,
        protocol: optional_attr(tag, "protocol"),
        kind: optional_attr(tag, "type"),
        rel_addr: optional_attr(tag, "rel-addr"),
        rel_port: parse_attr(tag, "rel-port")?,
    })
}

fn read_fingerprint(tag: &StartTag, stream: &mut dyn TokenStream) -> Result<Fingerprint, ColibriError> {
    let mut value = String::new();
    read_children(
        tag,
        stream,
        |child, stream| skip_element(stream, child.name(), SkipMode::DepthCounted),
        |cdata| value.push_str(&cdata),
    )?;
    Ok(Fingerprint {
        hash: optional_attr(tag, "hash"),
        setup: optional_attr(tag, "setup"),
        value,
    })
}

/// Decodes an ICE-UDP `<transport>` with its candidates and DTLS fingerprint.
#[derive(Clone, Copy, Debug, Default)]
pub struct IceUdpTransportDecoder;

impl ElementDecoder for IceUdpTransportDecoder {
    fn decode(&self, start: &StartTag, stream: &mut dyn TokenStream) -> Result<Extension, ColibriError> {
        let mut ice = IceUdpTransport {
            ufrag: optional_attr(start, "ufrag"),
            pwd: optional_attr(start, "pwd"),
            ..Default::default()
        };

        read_children(
            start,
            stream,
            |tag, stream| match tag.name() {
                names::CANDIDATE => {
                    ice.candidates.push(parse_candidate(&tag)?);
                    skip_element(stream, tag.name(), SkipMode::DepthCounted)
                }
                names::FINGERPRINT => {
                    // last one wins, like transports in a channel
                    ice.fingerprint = Some(read_fingerprint(&tag, stream)?);
                    Ok(())
                }
                _ => skip_element(stream, tag.name(), SkipMode::DepthCounted),
            },
            |_| (),
        )?;

        Ok(Extension::Transport(Transport::IceUdp(ice)))
    }
}

/// Decodes a Raw-UDP `<transport>`, which only lists candidates.
#[derive(Clone, Copy, Debug, Default)]
pub struct RawUdpTransportDecoder;

impl ElementDecoder for RawUdpTransportDecoder {
    fn decode(&self, start: &StartTag, stream: &mut dyn TokenStream) -> Result<Extension, ColibriError> {
        let mut raw = RawUdpTransport::default();

        read_children(
            start,
            stream,
            |tag, stream| {
                if tag.name() == names::CANDIDATE {
                    raw.candidates.push(parse_candidate(&tag)?);
                }
                skip_element(stream, tag.name(), SkipMode::DepthCounted)
            },
            |_| (),
        )?;

        Ok(Extension::Transport(Transport::RawUdp(raw)))
    }
}

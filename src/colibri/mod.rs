/*
** This file is a part of Colibri (stanza decoder for Jitsi Videobridge)
**
** Colibri is free software: you can redistribute it and/or modify it
** under the terms of the GNU Lesser General Public License as
** published by the Free Software Foundation, either version 3 of
** the License, or (at your option) any later version.
*/

mod decoder;
mod error;
mod model;
mod serialize;

use std::str::FromStr;

use tracing::trace;

use crate::StartTag;
use crate::Token;
use crate::TokenStream;

pub use decoder::ColibriDecoder;
pub use decoder::ColibriDecoderBuilder;
pub use decoder::Decoded;
pub use error::ColibriError;
pub use model::Candidate;
pub use model::Channel;
pub use model::ChannelBuilder;
pub use model::Conference;
pub use model::ConferenceBuilder;
pub use model::Content;
pub use model::ContentBuilder;
pub use model::Fingerprint;
pub use model::IceUdpTransport;
pub use model::MediaDirection;
pub use model::Parameter;
pub use model::PayloadType;
pub use model::RawUdpTransport;
pub use model::Transport;

pub const COLIBRI_NS: &str = "http://jitsi.org/protocol/colibri";

pub const JINGLE_RTP_NS: &str = "urn:xmpp:jingle:apps:rtp:1";

pub const ICE_UDP_NS: &str = "urn:xmpp:jingle:transports:ice-udp:1";

pub const RAW_UDP_NS: &str = "urn:xmpp:jingle:transports:raw-udp:1";

pub const DTLS_NS: &str = "urn:xmpp:jingle:apps:dtls:0";

pub(crate) mod names {
    pub(crate) const CONFERENCE: &str = "conference";
    pub(crate) const CONTENT: &str = "content";
    pub(crate) const CHANNEL: &str = "channel";
    pub(crate) const SSRC: &str = "src";
    pub(crate) const PAYLOAD_TYPE: &str = "payload-type";
    pub(crate) const PARAMETER: &str = "parameter";
    pub(crate) const TRANSPORT: &str = "transport";
    pub(crate) const CANDIDATE: &str = "candidate";
    pub(crate) const FINGERPRINT: &str = "fingerprint";
}

/// How unknown elements are stepped over.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum SkipMode {
    /// Count nested start and end tags, stop at the end tag closing the element.
    #[default]
    DepthCounted,

    /// Stop at the first end tag with the same name as the element.
    ///
    /// This ends too early when the element has a descendant with the same
    /// name. Only useful for matching the behavior of older bridges.
    NameMatched,
}

/// Consumes tokens up to and including the end tag of an element whose
/// start tag has just been read.
pub fn skip_element(
    stream: &mut dyn TokenStream,
    name: &str,
    mode: SkipMode,
) -> Result<(), ColibriError> {
    trace!(element = name, ?mode, "skipping element");
    let mut depth: usize = 0;
    loop {
        match stream.next_token()? {
            Token::StartTag(_) => depth += 1,
            Token::EndTag(end) => match mode {
                SkipMode::NameMatched => {
                    if end == name {
                        return Ok(());
                    }
                }
                SkipMode::DepthCounted => {
                    if depth == 0 {
                        if end != name {
                            return Err(ColibriError::UnbalancedTag {
                                expected: name.to_string(),
                                found: end,
                            });
                        }
                        return Ok(());
                    }
                    depth -= 1;
                }
            },
            Token::Text(_) => (),
            Token::EndOfStream => return Err(ColibriError::TruncatedStream(name.to_string())),
        }
    }
}

/// Attribute value, with an empty value treated the same as a missing one.
pub(crate) fn optional_attr(tag: &StartTag, name: &str) -> Option<String> {
    match tag.attribute(name) {
        Some(value) if !value.is_empty() => Some(value.to_string()),
        _ => None,
    }
}

pub(crate) fn parse_attr<T: FromStr>(tag: &StartTag, name: &str) -> Result<Option<T>, ColibriError> {
    match tag.attribute(name) {
        Some(value) if !value.is_empty() => value
            .parse()
            .map(Some)
            .map_err(|_| ColibriError::invalid(name, value)),
        _ => Ok(None),
    }
}

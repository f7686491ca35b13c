/*
** This file is a part of Colibri (stanza decoder for Jitsi Videobridge)
**
** Colibri is free software: you can redistribute it and/or modify it
** under the terms of the GNU Lesser General Public License as
** published by the Free Software Foundation, either version 3 of
** the License, or (at your option) any later version.
*/

mod payload;
mod transport;

use std::collections::HashMap;

use tracing::trace;

use crate::colibri::names;
use crate::ColibriError;
use crate::PayloadType;
use crate::StartTag;
use crate::Token;
use crate::TokenStream;
use crate::Transport;
use crate::COLIBRI_NS;
use crate::ICE_UDP_NS;
use crate::JINGLE_RTP_NS;
use crate::RAW_UDP_NS;

pub use payload::PayloadTypeDecoder;
pub use transport::IceUdpTransportDecoder;
pub use transport::RawUdpTransportDecoder;

/// A child object produced by an [ElementDecoder].
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Extension {
    PayloadType(PayloadType),
    Transport(Transport),
}

/// Decoder for one kind of extension element.
pub trait ElementDecoder {
    /// Decodes the element whose start tag has just been read from the stream.
    ///
    /// Implementations must consume the stream up to and including the
    /// end tag of the element, and nothing past it.
    fn decode(&self, start: &StartTag, stream: &mut dyn TokenStream) -> Result<Extension, ColibriError>;
}

/// Reads the content of an element up to and including its end tag.
///
/// Child start tags go to `child`, which must consume the whole child
/// element. Character data goes to `text`.
fn read_children(
    start: &StartTag,
    stream: &mut dyn TokenStream,
    mut child: impl FnMut(StartTag, &mut dyn TokenStream) -> Result<(), ColibriError>,
    mut text: impl FnMut(String),
) -> Result<(), ColibriError> {
    loop {
        match stream.next_token()? {
            Token::StartTag(tag) => child(tag, stream)?,
            Token::Text(cdata) => text(cdata),
            Token::EndTag(name) if name == start.name() => return Ok(()),
            Token::EndTag(name) => {
                return Err(ColibriError::UnbalancedTag {
                    expected: start.name().to_string(),
                    found: name,
                });
            }
            Token::EndOfStream => return Err(ColibriError::TruncatedStream(start.name().to_string())),
        }
    }
}

type BoxedDecoder = Box<dyn ElementDecoder + Send + Sync>;

/// Lookup table from (element name, namespace) to [ElementDecoder].
///
/// # Examples
///
/// ```
/// use colibri::{ExtensionRegistry, ICE_UDP_NS};
///
/// let registry = ExtensionRegistry::with_jingle();
/// assert!(registry.lookup("transport", ICE_UDP_NS).is_some());
/// assert!(registry.lookup("transport", "urn:example").is_none());
/// ```
#[derive(Default)]
pub struct ExtensionRegistry {
    decoders: HashMap<(String, String), BoxedDecoder>,
}

impl ExtensionRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        ExtensionRegistry::default()
    }

    /// Creates a registry with decoders for the payload types and
    /// transports used in Colibri channels.
    pub fn with_jingle() -> Self {
        let mut registry = ExtensionRegistry::new();
        registry.register(names::PAYLOAD_TYPE, COLIBRI_NS, PayloadTypeDecoder);
        registry.register(names::PAYLOAD_TYPE, JINGLE_RTP_NS, PayloadTypeDecoder);
        registry.register(names::TRANSPORT, ICE_UDP_NS, IceUdpTransportDecoder);
        registry.register(names::TRANSPORT, RAW_UDP_NS, RawUdpTransportDecoder);
        registry
    }

    /// Adds a decoder, replacing and returning the one previously
    /// registered for the same element.
    pub fn register(
        &mut self,
        name: &str,
        namespace: &str,
        decoder: impl ElementDecoder + Send + Sync + 'static,
    ) -> Option<Box<dyn ElementDecoder + Send + Sync>> {
        self.decoders
            .insert((name.to_string(), namespace.to_string()), Box::new(decoder))
    }

    pub fn lookup(&self, name: &str, namespace: &str) -> Option<&dyn ElementDecoder> {
        let found = self
            .decoders
            .get(&(name.to_string(), namespace.to_string()))
            .map(|decoder| &**decoder as &dyn ElementDecoder);
        trace!(element = name, namespace, found = found.is_some(), "registry lookup");
        found
    }

    pub fn len(&self) -> usize {
        self.decoders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decoders.is_empty()
    }
}

impl std::fmt::Debug for ExtensionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.decoders.keys()).finish()
    }
}

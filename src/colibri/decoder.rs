/*
** This file is a part of Colibri (stanza decoder for Jitsi Videobridge)
**
** Colibri is free software: you can redistribute it and/or modify it
** under the terms of the GNU Lesser General Public License as
** published by the Free Software Foundation, either version 3 of
** the License, or (at your option) any later version.
*/

use tracing::debug;
use tracing::trace;

use crate::Extension;
use crate::ExtensionRegistry;
use crate::StartTag;
use crate::Token;
use crate::TokenStream;
use crate::XmlReader;

use super::names;
use super::optional_attr;
use super::parse_attr;
use super::skip_element;
use super::Channel;
use super::ChannelBuilder;
use super::ColibriError;
use super::Conference;
use super::Content;
use super::ContentBuilder;
use super::PayloadType;
use super::SkipMode;
use super::COLIBRI_NS;
use super::ICE_UDP_NS;
use super::RAW_UDP_NS;

const OPUS: &str = "opus";

/// Result of a decode attempt.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Decoded {
    Conference(Conference),
    /// The element is not a Colibri conference, another decoder may
    /// handle it. Nothing was consumed from the stream.
    NotApplicable,
}

// Innermost open scope along with the builders of the unfinished parents.
enum State {
    InConference,
    InContent(ContentBuilder),
    InChannel(ContentBuilder, ChannelBuilder),
    InSsrc(ContentBuilder, ChannelBuilder, String),
}

impl State {
    fn element(&self) -> &'static str {
        match self {
            State::InConference => names::CONFERENCE,
            State::InContent(..) => names::CONTENT,
            State::InChannel(..) => names::CHANNEL,
            State::InSsrc(..) => names::SSRC,
        }
    }
}

/// Builder for a [ColibriDecoder].
#[derive(Debug)]
pub struct ColibriDecoderBuilder {
    registry: Option<ExtensionRegistry>,
    skip_mode: SkipMode,
    normalize_opus: bool,
}

impl ColibriDecoderBuilder {
    /// Sets the decoders for channel children. Defaults to
    /// [ExtensionRegistry::with_jingle()].
    pub fn registry(mut self, registry: ExtensionRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn skip_mode(mut self, mode: SkipMode) -> Self {
        self.skip_mode = mode;
        self
    }

    /// Enables forcing two channels on opus payload types, on by default.
    pub fn normalize_opus(mut self, normalize: bool) -> Self {
        self.normalize_opus = normalize;
        self
    }

    pub fn build(self) -> ColibriDecoder {
        ColibriDecoder {
            registry: self.registry.unwrap_or_else(ExtensionRegistry::with_jingle),
            skip_mode: self.skip_mode,
            normalize_opus: self.normalize_opus,
        }
    }
}

/// Decoder for `<conference/>` elements of the Colibri protocol.
///
/// The decoder keeps no state between calls and can be shared freely.
///
/// # Examples
///
/// ```
/// use colibri::{ColibriDecoder, Decoded, MediaDirection};
///
/// let xml = "<conference xmlns='http://jitsi.org/protocol/colibri' id='conf1'>\
///     <content name='audio'>\
///     <channel id='ch1' rtp-port='5000' direction='sendrecv'>\
///     <payload-type name='opus' channels='1'/><src>123456</src>\
///     </channel></content></conference>";
///
/// let decoder = ColibriDecoder::new();
/// let Decoded::Conference(conference) = decoder.decode_bytes(xml.as_bytes())? else {
///     panic!("not a conference");
/// };
/// let channel = conference.channel("ch1").unwrap();
/// assert_eq!(channel.direction(), Some(MediaDirection::SendRecv));
/// assert_eq!(channel.payload_types()[0].channels, 2);
/// assert_eq!(channel.ssrcs(), &[123456]);
/// # Ok::<(), colibri::ColibriError>(())
/// ```
#[derive(Debug)]
pub struct ColibriDecoder {
    registry: ExtensionRegistry,
    skip_mode: SkipMode,
    normalize_opus: bool,
}

impl Default for ColibriDecoder {
    fn default() -> Self {
        ColibriDecoder::new()
    }
}

impl ColibriDecoder {
    /// Creates a decoder with the Jingle extensions and default settings.
    pub fn new() -> ColibriDecoder {
        ColibriDecoder::builder().build()
    }

    pub fn builder() -> ColibriDecoderBuilder {
        ColibriDecoderBuilder {
            registry: None,
            skip_mode: SkipMode::DepthCounted,
            normalize_opus: true,
        }
    }

    pub fn registry(&self) -> &ExtensionRegistry {
        &self.registry
    }

    /// Decodes a stanza held in a buffer.
    pub fn decode_bytes(&self, bytes: &[u8]) -> Result<Decoded, ColibriError> {
        let mut reader = XmlReader::open(bytes)?;
        self.decode(&mut reader)
    }

    /// Decodes the element whose start tag is the current token of the stream.
    ///
    /// On success the stream is left at the end tag of the conference.
    pub fn decode(&self, stream: &mut dyn TokenStream) -> Result<Decoded, ColibriError> {
        let start = match stream.current() {
            Some(Token::StartTag(tag)) => tag.clone(),
            None | Some(Token::EndOfStream) => {
                return Err(ColibriError::TruncatedStream(names::CONFERENCE.to_string()));
            }
            Some(_) => return Ok(Decoded::NotApplicable),
        };
        if !start.is(names::CONFERENCE, COLIBRI_NS) {
            trace!(element = start.name(), namespace = start.namespace(), "not a conference");
            return Ok(Decoded::NotApplicable);
        }

        let mut conference = Conference::builder();
        if let Some(id) = optional_attr(&start, "id") {
            conference.id(id);
        }

        let mut state = State::InConference;
        loop {
            state = match (state, stream.next_token()?) {
                (state, Token::StartTag(tag)) => self.start_tag(state, tag, start.namespace(), stream)?,
                (State::InSsrc(content, channel, mut ssrc), Token::Text(text)) => {
                    ssrc.push_str(&text);
                    State::InSsrc(content, channel, ssrc)
                }
                (state, Token::Text(_)) => state,
                (State::InConference, Token::EndTag(name)) if name == names::CONFERENCE => {
                    let conference = conference.build();
                    debug!(
                        id = conference.id(),
                        contents = conference.contents().len(),
                        "decoded conference"
                    );
                    return Ok(Decoded::Conference(conference));
                }
                (State::InContent(mut content), Token::EndTag(name)) if name == names::CONTENT => {
                    conference.content(content.build());
                    State::InConference
                }
                (State::InChannel(mut content, mut channel), Token::EndTag(name))
                    if name == names::CHANNEL =>
                {
                    content.channel(channel.build());
                    State::InContent(content)
                }
                (State::InSsrc(content, mut channel, ssrc), Token::EndTag(name)) if name == names::SSRC => {
                    let value = ssrc.trim();
                    let ssrc: i64 = value
                        .parse()
                        .map_err(|_| ColibriError::invalid(names::SSRC, value))?;
                    channel.ssrc(ssrc);
                    State::InChannel(content, channel)
                }
                (state, Token::EndTag(name)) => {
                    return Err(ColibriError::UnbalancedTag {
                        expected: state.element().to_string(),
                        found: name,
                    });
                }
                (state, Token::EndOfStream) => {
                    return Err(ColibriError::TruncatedStream(state.element().to_string()));
                }
            };
        }
    }

    fn start_tag(
        &self,
        state: State,
        tag: StartTag,
        namespace: &str,
        stream: &mut dyn TokenStream,
    ) -> Result<State, ColibriError> {
        Ok(match (state, tag.name()) {
            (State::InConference, names::CONTENT) => State::InContent(parse_content(&tag)),
            (State::InContent(content), names::CHANNEL) => State::InChannel(content, parse_channel(&tag)?),
            (State::InChannel(content, channel), names::SSRC) => State::InSsrc(content, channel, String::new()),
            (State::InChannel(content, mut channel), names::PAYLOAD_TYPE | names::TRANSPORT) => {
                self.child_extension(&mut channel, &tag, namespace, stream)?;
                State::InChannel(content, channel)
            }
            (state, _) => {
                skip_element(stream, tag.name(), self.skip_mode)?;
                state
            }
        })
    }

    // Payload types are looked up under the namespace of the conference,
    // transports under their own.
    fn child_extension(
        &self,
        channel: &mut ChannelBuilder,
        tag: &StartTag,
        conference_ns: &str,
        stream: &mut dyn TokenStream,
    ) -> Result<(), ColibriError> {
        let namespace = match tag.name() {
            names::PAYLOAD_TYPE => conference_ns,
            _ if tag.namespace() == ICE_UDP_NS || tag.namespace() == RAW_UDP_NS => tag.namespace(),
            _ => return skip_element(stream, tag.name(), self.skip_mode),
        };
        let Some(decoder) = self.registry.lookup(tag.name(), namespace) else {
            return skip_element(stream, tag.name(), self.skip_mode);
        };

        match decoder.decode(tag, stream)? {
            Extension::PayloadType(payload_type) => {
                channel.payload_type(self.normalize(payload_type));
            }
            Extension::Transport(transport) => {
                channel.transport(transport);
            }
        }
        Ok(())
    }

    fn normalize(&self, mut payload_type: PayloadType) -> PayloadType {
        if self.normalize_opus && payload_type.name.as_deref() == Some(OPUS) && payload_type.channels != 2 {
            debug!(
                id = payload_type.id,
                channels = payload_type.channels,
                "forcing two channels for opus"
            );
            payload_type.channels = 2;
        }
        payload_type
    }
}

fn parse_content(tag: &StartTag) -> ContentBuilder {
    let mut content = Content::builder();
    if let Some(name) = optional_attr(tag, "name") {
        content.name(name);
    }
    content
}

fn parse_channel(tag: &StartTag) -> Result<ChannelBuilder, ColibriError> {
    let mut channel = Channel::builder();
    if let Some(id) = optional_attr(tag, "id") {
        channel.id(id);
    }
    if let Some(host) = optional_attr(tag, "host") {
        channel.host(host);
    }
    if let Some(port) = parse_attr(tag, "rtp-port")? {
        channel.rtp_port(port);
    }
    if let Some(port) = parse_attr(tag, "rtcp-port")? {
        channel.rtcp_port(port);
    }
    if let Some(direction) = parse_attr(tag, "direction")? {
        channel.direction(direction);
    }
    if let Some(expire) = parse_attr(tag, "expire")? {
        channel.expire(expire);
    }
    Ok(channel)
}

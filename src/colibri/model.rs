/*
** This file is a part of Colibri (stanza decoder for Jitsi Videobridge)
**
** Colibri is free software: you can redistribute it and/or modify it
** under the terms of the GNU Lesser General Public License as
** published by the Free Software Foundation, either version 3 of
** the License, or (at your option) any later version.
*/

use std::fmt::Display;
use std::str::FromStr;

use super::ColibriError;

/// Media flow of a channel, as seen from the bridge.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum MediaDirection {
    SendRecv,
    SendOnly,
    RecvOnly,
    Inactive,
}

impl MediaDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaDirection::SendRecv => "sendrecv",
            MediaDirection::SendOnly => "sendonly",
            MediaDirection::RecvOnly => "recvonly",
            MediaDirection::Inactive => "inactive",
        }
    }
}

impl FromStr for MediaDirection {
    type Err = ColibriError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sendrecv" => Ok(MediaDirection::SendRecv),
            "sendonly" => Ok(MediaDirection::SendOnly),
            "recvonly" => Ok(MediaDirection::RecvOnly),
            "inactive" => Ok(MediaDirection::Inactive),
            _ => Err(ColibriError::invalid("direction", s)),
        }
    }
}

impl Display for MediaDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A `<parameter/>` of a payload type, usually a codec format parameter.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub value: String,
}

/// RTP payload type description from the Jingle RTP schema.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PayloadType {
    pub id: Option<u8>,
    pub name: Option<String>,
    pub clockrate: Option<u32>,
    /// Number of audio channels, 1 when the attribute is missing.
    pub channels: u32,
    pub ptime: Option<u32>,
    pub maxptime: Option<u32>,
    pub parameters: Vec<Parameter>,
}

impl Default for PayloadType {
    fn default() -> Self {
        PayloadType {
            id: None,
            name: None,
            clockrate: None,
            channels: 1,
            ptime: None,
            maxptime: None,
            parameters: Vec::new(),
        }
    }
}

impl PayloadType {
    pub fn new(id: u8, name: &str) -> PayloadType {
        PayloadType {
            id: Some(id),
            name: Some(name.to_string()),
            ..Default::default()
        }
    }

    /// Returns the value of the named format parameter.
    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters
            .iter()
            .find(|param| param.name == name)
            .map(|param| param.value.as_str())
    }
}

/// A transport address offered by a Jingle `<candidate/>`.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Candidate {
    pub component: Option<u8>,
    pub foundation: Option<String>,
    pub generation: Option<u32>,
    pub id: Option<String>,
    pub ip: Option<String>,
    pub network: Option<String>,
    pub port: Option<u16>,
    pub priority: Option<u32>,
    pub protocol: Option<String>,
    /// Value of the `type` attribute, such as `host` or `srflx`.
    pub kind: Option<String>,
    pub rel_addr: Option<String>,
    pub rel_port: Option<u16>,
}

/// DTLS certificate fingerprint carried inside an ICE transport.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Fingerprint {
    pub hash: Option<String>,
    pub setup: Option<String>,
    pub value: String,
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct IceUdpTransport {
    pub ufrag: Option<String>,
    pub pwd: Option<String>,
    pub fingerprint: Option<Fingerprint>,
    pub candidates: Vec<Candidate>,
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RawUdpTransport {
    pub candidates: Vec<Candidate>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Transport {
    IceUdp(IceUdpTransport),
    RawUdp(RawUdpTransport),
}

impl Transport {
    pub fn candidates(&self) -> &[Candidate] {
        match self {
            Transport::IceUdp(ice) => &ice.candidates,
            Transport::RawUdp(raw) => &raw.candidates,
        }
    }
}

/// A media channel allocated on the bridge for one participant.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Channel {
    id: Option<String>,
    host: Option<String>,
    rtp_port: Option<i32>,
    rtcp_port: Option<i32>,
    direction: Option<MediaDirection>,
    expire: Option<u32>,
    payload_types: Vec<PayloadType>,
    transport: Option<Transport>,
    ssrcs: Vec<i64>,
}

impl Channel {
    pub fn builder() -> ChannelBuilder {
        ChannelBuilder::default()
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    /// Any decimal integer is kept, ports are not range checked.
    pub fn rtp_port(&self) -> Option<i32> {
        self.rtp_port
    }

    pub fn rtcp_port(&self) -> Option<i32> {
        self.rtcp_port
    }

    pub fn direction(&self) -> Option<MediaDirection> {
        self.direction
    }

    /// Seconds until the bridge expires the channel.
    pub fn expire(&self) -> Option<u32> {
        self.expire
    }

    pub fn payload_types(&self) -> &[PayloadType] {
        &self.payload_types
    }

    pub fn transport(&self) -> Option<&Transport> {
        self.transport.as_ref()
    }

    pub fn ssrcs(&self) -> &[i64] {
        &self.ssrcs
    }
}

/// Collects the fields of a [Channel] while its element is being read.
#[derive(Debug, Default)]
pub struct ChannelBuilder {
    channel: Channel,
}

impl ChannelBuilder {
    pub fn id(&mut self, id: impl Into<String>) -> &mut Self {
        self.channel.id = Some(id.into());
        self
    }

    pub fn host(&mut self, host: impl Into<String>) -> &mut Self {
        self.channel.host = Some(host.into());
        self
    }

    pub fn rtp_port(&mut self, port: i32) -> &mut Self {
        self.channel.rtp_port = Some(port);
        self
    }

    pub fn rtcp_port(&mut self, port: i32) -> &mut Self {
        self.channel.rtcp_port = Some(port);
        self
    }

    pub fn direction(&mut self, direction: MediaDirection) -> &mut Self {
        self.channel.direction = Some(direction);
        self
    }

    pub fn expire(&mut self, seconds: u32) -> &mut Self {
        self.channel.expire = Some(seconds);
        self
    }

    pub fn payload_type(&mut self, payload_type: PayloadType) -> &mut Self {
        self.channel.payload_types.push(payload_type);
        self
    }

    /// Sets the transport, replacing any earlier one.
    pub fn transport(&mut self, transport: Transport) -> &mut Self {
        self.channel.transport = Some(transport);
        self
    }

    pub fn ssrc(&mut self, ssrc: i64) -> &mut Self {
        self.channel.ssrcs.push(ssrc);
        self
    }

    /// Returns the finished channel and leaves the builder empty.
    pub fn build(&mut self) -> Channel {
        std::mem::take(&mut self.channel)
    }
}

/// A group of channels carrying the same kind of media.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Content {
    name: Option<String>,
    channels: Vec<Channel>,
}

impl Content {
    pub fn builder() -> ContentBuilder {
        ContentBuilder::default()
    }

    /// Media name, usually `audio` or `video`.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }
}

#[derive(Debug, Default)]
pub struct ContentBuilder {
    content: Content,
}

impl ContentBuilder {
    pub fn name(&mut self, name: impl Into<String>) -> &mut Self {
        self.content.name = Some(name.into());
        self
    }

    pub fn channel(&mut self, channel: Channel) -> &mut Self {
        self.content.channels.push(channel);
        self
    }

    pub fn build(&mut self) -> Content {
        std::mem::take(&mut self.content)
    }
}

/// A decoded Colibri conference.
///
/// # Examples
///
/// ```
/// use colibri::{Channel, Conference, Content};
///
/// let conference = Conference::builder()
///     .id("conf1")
///     .content(
///         Content::builder()
///             .name("audio")
///             .channel(Channel::builder().id("ch1").rtp_port(5000).build())
///             .build(),
///     )
///     .build();
/// assert_eq!(conference.channel("ch1").and_then(|ch| ch.rtp_port()), Some(5000));
/// ```
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Conference {
    id: Option<String>,
    contents: Vec<Content>,
}

impl Conference {
    pub fn builder() -> ConferenceBuilder {
        ConferenceBuilder::default()
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn contents(&self) -> &[Content] {
        &self.contents
    }

    /// Returns the first content with the given name.
    pub fn content(&self, name: &str) -> Option<&Content> {
        self.contents
            .iter()
            .find(|content| content.name() == Some(name))
    }

    /// Returns the first channel with the given id, searching all contents.
    pub fn channel(&self, id: &str) -> Option<&Channel> {
        self.contents
            .iter()
            .flat_map(|content| content.channels())
            .find(|channel| channel.id() == Some(id))
    }
}

#[derive(Debug, Default)]
pub struct ConferenceBuilder {
    conference: Conference,
}

impl ConferenceBuilder {
    pub fn id(&mut self, id: impl Into<String>) -> &mut Self {
        self.conference.id = Some(id.into());
        self
    }

    pub fn content(&mut self, content: Content) -> &mut Self {
        self.conference.contents.push(content);
        self
    }

    pub fn build(&mut self) -> Conference {
        std::mem::take(&mut self.conference)
    }
}

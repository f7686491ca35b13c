/*
** This file is a part of Colibri (stanza decoder for Jitsi Videobridge)
**
** Colibri is free software: you can redistribute it and/or modify it
** under the terms of the GNU Lesser General Public License as
** published by the Free Software Foundation, either version 3 of
** the License, or (at your option) any later version.
*/

use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result;

use crate::entities::escape_fmt;
use crate::entities::Escaped;

use super::names;
use super::Candidate;
use super::Channel;
use super::Conference;
use super::Content;
use super::PayloadType;
use super::Transport;
use super::COLIBRI_NS;
use super::DTLS_NS;
use super::ICE_UDP_NS;
use super::RAW_UDP_NS;

fn attr(f: &mut Formatter<'_>, name: &str, value: &str) -> Result {
    write!(f, " {}=\"{}\"", name, Escaped(value))
}

fn opt_attr(f: &mut Formatter<'_>, name: &str, value: Option<impl Display>) -> Result {
    match value {
        Some(value) => attr(f, name, &value.to_string()),
        None => Ok(()),
    }
}

fn end_tag(f: &mut Formatter<'_>, name: &str) -> Result {
    f.write_str("</")?;
    f.write_str(name)?;
    f.write_str(">")
}

fn candidate(f: &mut Formatter<'_>, candidate: &Candidate) -> Result {
    f.write_str("<")?;
    f.write_str(names::CANDIDATE)?;
    opt_attr(f, "component", candidate.component)?;
    opt_attr(f, "foundation", candidate.foundation.as_deref())?;
    opt_attr(f, "generation", candidate.generation)?;
    opt_attr(f, "id", candidate.id.as_deref())?;
    opt_attr(f, "ip", candidate.ip.as_deref())?;
    opt_attr(f, "network", candidate.network.as_deref())?;
    opt_attr(f, "port", candidate.port)?;
    opt_attr(f, "priority", candidate.priority)?;
    opt_attr(f, "protocol", candidate.protocol.as_deref())?;
    opt_attr(f, "type", candidate.kind.as_deref())?;
    opt_attr(f, "rel-addr", candidate.rel_addr.as_deref())?;
    opt_attr(f, "rel-port", candidate.rel_port)?;
    f.write_str("/>")
}

impl Display for PayloadType {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        f.write_str("<")?;
        f.write_str(names::PAYLOAD_TYPE)?;
        opt_attr(f, "id", self.id)?;
        opt_attr(f, "name", self.name.as_deref())?;
        opt_attr(f, "clockrate", self.clockrate)?;
        if self.channels != 1 {
            attr(f, "channels", &self.channels.to_string())?;
        }
        opt_attr(f, "ptime", self.ptime)?;
        opt_attr(f, "maxptime", self.maxptime)?;
        if self.parameters.is_empty() {
            return f.write_str("/>");
        }
        f.write_str(">")?;
        for param in &self.parameters {
            f.write_str("<")?;
            f.write_str(names::PARAMETER)?;
            attr(f, "name", &param.name)?;
            attr(f, "value", &param.value)?;
            f.write_str("/>")?;
        }
        end_tag(f, names::PAYLOAD_TYPE)
    }
}

impl Display for Transport {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        f.write_str("<")?;
        f.write_str(names::TRANSPORT)?;
        match self {
            Transport::IceUdp(ice) => {
                attr(f, "xmlns", ICE_UDP_NS)?;
                opt_attr(f, "ufrag", ice.ufrag.as_deref())?;
                opt_attr(f, "pwd", ice.pwd.as_deref())?;
                f.write_str(">")?;
                if let Some(fingerprint) = &ice.fingerprint {
                    f.write_str("<")?;
                    f.write_str(names::FINGERPRINT)?;
                    attr(f, "xmlns", DTLS_NS)?;
                    opt_attr(f, "hash", fingerprint.hash.as_deref())?;
                    opt_attr(f, "setup", fingerprint.setup.as_deref())?;
                    f.write_str(">")?;
                    escape_fmt(&fingerprint.value, f)?;
                    end_tag(f, names::FINGERPRINT)?;
                }
            }
            Transport::RawUdp(_) => {
                attr(f, "xmlns", RAW_UDP_NS)?;
                f.write_str(">")?;
            }
        }
        for cand in self.candidates() {
            candidate(f, cand)?;
        }
        end_tag(f, names::TRANSPORT)
    }
}

impl Display for Channel {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        f.write_str("<")?;
        f.write_str(names::CHANNEL)?;
        opt_attr(f, "id", self.id())?;
        opt_attr(f, "host", self.host())?;
        opt_attr(f, "rtp-port", self.rtp_port())?;
        opt_attr(f, "rtcp-port", self.rtcp_port())?;
        opt_attr(f, "direction", self.direction())?;
        opt_attr(f, "expire", self.expire())?;
        if self.payload_types().is_empty() && self.transport().is_none() && self.ssrcs().is_empty() {
            return f.write_str("/>");
        }
        f.write_str(">")?;
        for payload_type in self.payload_types() {
            payload_type.fmt(f)?;
        }
        if let Some(transport) = self.transport() {
            transport.fmt(f)?;
        }
        for ssrc in self.ssrcs() {
            write!(f, "<{}>{}</{}>", names::SSRC, ssrc, names::SSRC)?;
        }
        end_tag(f, names::CHANNEL)
    }
}

impl Display for Content {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        f.write_str("<")?;
        f.write_str(names::CONTENT)?;
        opt_attr(f, "name", self.name())?;
        if self.channels().is_empty() {
            return f.write_str("/>");
        }
        f.write_str(">")?;
        for channel in self.channels() {
            channel.fmt(f)?;
        }
        end_tag(f, names::CONTENT)
    }
}

/// Writes the conference in the Colibri wire format.
///
/// Optional fields which are not set are left out. Payload types are
/// written in the Colibri namespace, transports declare their own.
impl Display for Conference {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        f.write_str("<")?;
        f.write_str(names::CONFERENCE)?;
        attr(f, "xmlns", COLIBRI_NS)?;
        opt_attr(f, "id", self.id())?;
        if self.contents().is_empty() {
            return f.write_str("/>");
        }
        f.write_str(">")?;
        for content in self.contents() {
            content.fmt(f)?;
        }
        end_tag(f, names::CONFERENCE)
    }
}

impl Conference {
    /// Returns the conference as an XML string.
    pub fn to_xml(&self) -> String {
        self.to_string()
    }
}

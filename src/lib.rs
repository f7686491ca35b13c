/*
** This file is a part of Colibri (stanza decoder for Jitsi Videobridge)
**
** Colibri is free software: you can redistribute it and/or modify it
** under the terms of the GNU Lesser General Public License as
** published by the Free Software Foundation, either version 3 of
** the License, or (at your option) any later version.
*/

//! Decoder for the `<conference/>` elements of the Colibri protocol,
//! used by conference focus agents to allocate channels on a Jitsi
//! Videobridge.
//!
//! ```
//! use colibri::{ColibriDecoder, Decoded};
//!
//! let xml = b"<conference xmlns='http://jitsi.org/protocol/colibri' id='c1'/>";
//! match ColibriDecoder::new().decode_bytes(xml)? {
//!     Decoded::Conference(conference) => assert_eq!(conference.id(), Some("c1")),
//!     Decoded::NotApplicable => unreachable!(),
//! }
//! # Ok::<(), colibri::ColibriError>(())
//! ```

mod colibri;
mod entities;
mod extension;
mod lexer;
mod reader;

pub use lexer::LexError;
pub use lexer::LexEvent;
pub use lexer::LexHandler;
pub use lexer::Location;
pub use lexer::XmlLexer;

pub use reader::Attribute;
pub use reader::ReadError;
pub use reader::StartTag;
pub use reader::Token;
pub use reader::TokenStream;
pub use reader::XmlReader;
pub use reader::XML_NS;

pub use extension::ElementDecoder;
pub use extension::Extension;
pub use extension::ExtensionRegistry;
pub use extension::IceUdpTransportDecoder;
pub use extension::PayloadTypeDecoder;
pub use extension::RawUdpTransportDecoder;

pub use colibri::skip_element;
pub use colibri::Candidate;
pub use colibri::Channel;
pub use colibri::ChannelBuilder;
pub use colibri::ColibriDecoder;
pub use colibri::ColibriDecoderBuilder;
pub use colibri::ColibriError;
pub use colibri::Conference;
pub use colibri::ConferenceBuilder;
pub use colibri::Content;
pub use colibri::ContentBuilder;
pub use colibri::Decoded;
pub use colibri::Fingerprint;
pub use colibri::IceUdpTransport;
pub use colibri::MediaDirection;
pub use colibri::Parameter;
pub use colibri::PayloadType;
pub use colibri::RawUdpTransport;
pub use colibri::SkipMode;
pub use colibri::Transport;
pub use colibri::COLIBRI_NS;
pub use colibri::DTLS_NS;
pub use colibri::ICE_UDP_NS;
pub use colibri::JINGLE_RTP_NS;
pub use colibri::RAW_UDP_NS;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

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
use crate::ColibriError;
use crate::Parameter;
use crate::PayloadType;
use crate::SkipMode;
use crate::StartTag;
use crate::TokenStream;

use super::read_children;
use super::ElementDecoder;
use super::Extension;

/// Decodes a Jingle RTP `<payload-type>` with its `<parameter/>` children.
///
/// Parameters without a name are dropped, other children are skipped.
#[derive(Clone, Copy, Debug, Default)]
pub struct PayloadTypeDecoder;

impl ElementDecoder for PayloadTypeDecoder {
    fn decode(&self, start: &StartTag, stream: &mut dyn TokenStream) -> Result<Extension, ColibriError> {
        let mut payload_type = PayloadType {
            id: parse_attr(start, "id")?,
            name: optional_attr(start, "name"),
            clockrate: parse_attr(start, "clockrate")?,
            channels: parse_attr(start, "channels")?.unwrap_or(1),
            ptime: parse_attr(start, "ptime")?,
            maxptime: parse_attr(start, "maxptime")?,
            parameters: Vec::new(),
        };

        read_children(
            start,
            stream,
            |tag, stream| {
                if tag.name() == names::PARAMETER {
                    if let Some(name) = optional_attr(&tag, "name") {
                        let value = tag.attribute("value").unwrap_or_default().to_string();
                        payload_type.parameters.push(Parameter { name, value });
                    }
                }
                skip_element(stream, tag.name(), SkipMode::DepthCounted)
            },
            |_| (),
        )?;

        Ok(Extension::PayloadType(payload_type))
    }
}

/*
** This file is a part of Colibri (stanza decoder for Jitsi Videobridge)
**
** Colibri is free software: you can redistribute it and/or modify it
** under the terms of the GNU Lesser General Public License as
** published by the Free Software Foundation, either version 3 of
** the License, or (at your option) any later version.
*/

mod error;
mod location;

use error::description;
pub use error::LexError;
pub use location::Location;

/// An XML event produced by the lexer.
#[derive(Debug, Eq, PartialEq)]
pub enum LexEvent<'a> {
    /// Start of a start tag or an empty element tag, with the full tag name.
    StartTag(&'a str),

    /// An attribute of the last StartTag, as name and value.
    ///
    /// References in the value are already replaced with their characters.
    Attribute(&'a str, &'a str),

    /// The last StartTag is closed with '>' and content follows.
    StartTagContent,

    /// The last StartTag is closed with '/>' and has no content.
    StartTagEmpty,

    /// An end tag with the full tag name.
    EndTag(&'a str),

    /// Character data.
    ///
    /// A continuous block of text can arrive in several pieces, for example
    /// when the input is split into chunks or contains references.
    CData(&'a str),
}

pub trait LexHandler {
    fn handle_event(&mut self, event: &LexEvent) -> Result<(), LexError>;
}

/// Push based lexer for the restricted XML used on XMPP streams.
///
/// Bytes can be fed in chunks of any size; the handler sees the same
/// sequence of events regardless of how the input is split, except that
/// character data may be delivered in more pieces.
///
/// XMPP does not allow comments, processing instructions, and document
/// type declarations inside streams, so they are rejected with
/// [LexError::Restricted]. The only exception is the XML declaration
/// at the very beginning of the input.
///
/// # Examples
///
/// ```
/// use colibri::{LexError, LexEvent, LexHandler, XmlLexer};
///
/// struct Counter { tags: usize }
/// impl LexHandler for Counter {
///     fn handle_event(&mut self, event: &LexEvent) -> Result<(), LexError> {
///         if let LexEvent::StartTag(_) = event {
///             self.tags += 1;
///         }
///         Ok(())
///     }
/// }
///
/// let mut counter = Counter { tags: 0 };
/// let mut lexer = XmlLexer::new();
/// lexer.parse_bytes_finish(&mut counter, b"<conference><content/></conference>").unwrap();
/// assert_eq!(counter.tags, 2);
/// ```
pub struct XmlLexer {
    state: State,
    uni_len: u32,
    uni_left: u32,
    uni_char: u32,
    uni_start: usize,
    depth: usize,
    is_end_tag: bool,
    is_apos_value: bool,
    seen_content: bool,
    seen_declaration: bool,
    failed: bool,
    value_pos: usize,
    buffer: Vec<u8>,
    ref_buffer: Vec<u8>,
    char_ref_value: u32,
    is_value_ref: bool,
    location: Location,
}

#[derive(Debug, Eq, PartialEq)]
enum State {
    Prolog,
    TagStart,
    DeclarationX,
    DeclarationXM,
    DeclarationXML,
    DeclarationTarget,
    DeclarationBody,
    DeclarationEnd,
    Markup,
    CDataSectionC,
    CDataSectionCD,
    CDataSectionCDA,
    CDataSectionCDAT,
    CDataSectionCDATA,
    CDataSectionCDATAb,
    CDataSectionBody,
    CDataSectionMaybeEnd,
    CDataSectionMaybeEnd2,
    TagName,
    EndTagWhitespace,
    EmptyTagEnd,
    AttributeWhitespace,
    AttributeName,
    AttributeEq,
    AttributeValueStart,
    AttributeValue,
    CData,
    Reference,
    CharReference,
    CharReferenceBody,
    HexCharReference,
    Entity,
    Epilog,
}

const INITIAL_BUFFER_CAPACITY: usize = 128;

const REF_BUFFER_SIZE: usize = 8;

macro_rules! whitespace {
    () => {
        b' ' | b'\t' | b'\r' | b'\n'
    };
}

macro_rules! xml_error {
    ($a:ident) => {
        return Err(LexError::BadXml(description::$a))
    };
}

macro_rules! restricted {
    ($a:ident) => {
        return Err(LexError::Restricted(description::$a))
    };
}

fn is_valid_xml_char(c: u32) -> bool {
    matches!(c, 0x09 | 0x0a | 0x0d | 0x20..=0xd7ff | 0xe000..=0xfffd | 0x10000..=0x10ffff)
}

fn as_str(bytes: &[u8]) -> &str {
    // SAFETY: every byte has passed the UTF-8 checks in parse_chunk and
    // slices are only cut at ASCII delimiters or complete characters.
    unsafe { std::str::from_utf8_unchecked(bytes) }
}

impl XmlLexer {
    /// Creates a new lexer instance.
    ///
    /// The instance can be reused for multiple documents with the
    /// [reset()](XmlLexer::reset) method.
    pub fn new() -> XmlLexer {
        XmlLexer {
            state: State::Prolog,
            uni_len: 0,
            uni_left: 0,
            uni_char: 0,
            uni_start: 0,
            depth: 0,
            is_end_tag: false,
            is_apos_value: false,
            seen_content: false,
            seen_declaration: false,
            failed: false,
            value_pos: 0,
            buffer: Vec::<u8>::with_capacity(INITIAL_BUFFER_CAPACITY),
            ref_buffer: Vec::<u8>::with_capacity(REF_BUFFER_SIZE),
            char_ref_value: 0,
            is_value_ref: false,
            location: Location::new(),
        }
    }

    /// Resets the lexer into a clean state.
    pub fn reset(&mut self) {
        self.state = State::Prolog;
        self.uni_len = 0;
        self.uni_left = 0;
        self.uni_char = 0;
        self.uni_start = 0;
        self.depth = 0;
        self.is_end_tag = false;
        self.is_apos_value = false;
        self.seen_content = false;
        self.seen_declaration = false;
        self.failed = false;
        self.value_pos = 0;
        self.buffer.clear();
        self.ref_buffer.clear();
        self.char_ref_value = 0;
        self.is_value_ref = false;
        self.location = Location::new();
    }

    /// Number of currently open tags.
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn location(&self) -> Location {
        self.location
    }

    fn check_buffer(&mut self, need: usize) -> Result<(), LexError> {
        if self.buffer.len() + need > self.buffer.capacity() {
            let diff = std::cmp::max(need, self.buffer.capacity());
            if self.buffer.try_reserve_exact(diff).is_err() {
                return Err(LexError::NoMemory);
            }
        }
        Ok(())
    }

    fn push_buffer(&mut self, bytes: &[u8]) -> Result<(), LexError> {
        self.check_buffer(bytes.len())?;
        self.buffer.extend_from_slice(bytes);
        Ok(())
    }

    fn send_char_reference(
        &mut self,
        handler: &mut impl LexHandler,
        value: u32,
    ) -> Result<(), LexError> {
        let c = match char::from_u32(value) {
            Some(c) if is_valid_xml_char(value) => c,
            _ => xml_error!(CHAR_INVALID),
        };
        let mut buf = [0u8; 4];
        let s = c.encode_utf8(&mut buf);

        if self.is_value_ref {
            self.push_buffer(s.as_bytes())
        } else {
            handler.handle_event(&LexEvent::CData(s))
        }
    }

    /// Checks if the document is complete.
    ///
    /// A completed document has a root tag and no unfinished constructs.
    pub fn parse_finish(&mut self) -> Result<(), LexError> {
        if self.failed {
            xml_error!(REUSE_WITHOUT_RESET);
        }
        if !self.seen_content {
            xml_error!(DOC_NO_CONTENT);
        }
        if self.depth > 0 {
            xml_error!(DOC_OPEN_TAGS);
        }
        if self.state != State::Epilog {
            xml_error!(DOC_OPEN_MARKUP);
        }
        Ok(())
    }

    /// Lexes given bytes and checks if the document is complete.
    pub fn parse_bytes_finish(
        &mut self,
        handler: &mut impl LexHandler,
        bytes: &[u8],
    ) -> Result<(), LexError> {
        self.parse_bytes(handler, bytes)?;
        self.parse_finish()
    }

    /// Lexes given bytes.
    ///
    /// After an error the lexer refuses further input until it is reset.
    pub fn parse_bytes(
        &mut self,
        handler: &mut impl LexHandler,
        bytes: &[u8],
    ) -> Result<(), LexError> {
        if self.failed {
            xml_error!(REUSE_WITHOUT_RESET);
        }
        let result = self.parse_chunk(handler, bytes);
        if result.is_err() {
            self.failed = true;
        }
        result
    }

    fn parse_chunk(&mut self, handler: &mut impl LexHandler, bytes: &[u8]) -> Result<(), LexError> {
        let mut pos: usize = 0;
        let mut back: usize = 0;
        let mut redo = false;

        while pos < bytes.len() {
            let c = bytes[pos];

            if redo {
                // Byte is already checked, only the state machine runs again
                redo = false;
            } else if self.uni_left > 0 {
                if c & 0xc0 != 0x80 {
                    xml_error!(UTF8_INVALID_CONT_BYTE);
                }
                self.uni_char <<= 6;
                self.uni_char += c as u32 & 0x3f;
                self.uni_left -= 1;
                if self.uni_left == 0 {
                    // Sequences longer than the actual character codepoint
                    // size are security hazards.
                    if (self.uni_len == 2 && self.uni_char <= 0x7f)
                        || (self.uni_len == 3 && self.uni_char <= 0x7ff)
                        || (self.uni_len == 4 && self.uni_char <= 0xffff)
                    {
                        xml_error!(UTF8_OVERLONG_SEQUENCE);
                    }
                    if !is_valid_xml_char(self.uni_char) {
                        xml_error!(CHAR_INVALID);
                    }
                    // A character split between chunks is now complete
                    if !self.buffer.is_empty()
                        && matches!(self.state, State::CData | State::CDataSectionBody)
                    {
                        self.push_buffer(&bytes[back..pos + 1])?;
                        handler.handle_event(&LexEvent::CData(as_str(&self.buffer)))?;
                        self.buffer.clear();
                        back = pos + 1;
                    }
                }
            } else if c & 0x80 == 0x80 {
                self.uni_start = pos;
                if c & 0x60 == 0x40 {
                    self.uni_len = 2;
                    self.uni_left = 1;
                    self.uni_char = c as u32 & 0x1f;
                } else if c & 0x70 == 0x60 {
                    self.uni_len = 3;
                    self.uni_left = 2;
                    self.uni_char = c as u32 & 0x0f;
                } else if c & 0x78 == 0x70 {
                    self.uni_len = 4;
                    self.uni_left = 3;
                    self.uni_char = c as u32 & 0x07;
                } else {
                    xml_error!(UTF8_INVALID_PREFIX_BYTE);
                }
            } else if c < 0x20 && (c != 0x09 && c != 0x0a && c != 0x0d) {
                xml_error!(CHAR_INVALID);
            }

            match self.state {
                State::Prolog => match c {
                    b'<' => self.state = State::TagStart,
                    whitespace!() => (),
                    _ => xml_error!(DOC_CDATA_WITHOUT_PARENT),
                },

                State::TagStart => match c {
                    b'!' => self.state = State::Markup,
                    b'?' => {
                        if self.seen_content || self.seen_declaration {
                            restricted!(PROCESSING_INSTRUCTION);
                        }
                        self.state = State::DeclarationX;
                    }
                    b'/' => {
                        if self.depth == 0 {
                            xml_error!(TAG_CLOSE_WITHOUT_OPEN);
                        }
                        back = pos + 1;
                        self.is_end_tag = true;
                        self.state = State::TagName;
                    }
                    whitespace!() => xml_error!(TAG_WHITESPACE_START),
                    b'>' => xml_error!(TAG_EMPTY_NAME),
                    _ => {
                        if self.depth == 0 && self.seen_content {
                            xml_error!(TAG_OUTSIDE_ROOT);
                        }
                        self.depth += 1;
                        back = pos;
                        self.is_end_tag = false;
                        self.seen_content = true;
                        self.state = State::TagName;
                    }
                },

                State::DeclarationX => match c {
                    b'x' => self.state = State::DeclarationXM,
                    _ => restricted!(PROCESSING_INSTRUCTION),
                },

                State::DeclarationXM => match c {
                    b'm' => self.state = State::DeclarationXML,
                    _ => restricted!(PROCESSING_INSTRUCTION),
                },

                State::DeclarationXML => match c {
                    b'l' => self.state = State::DeclarationTarget,
                    _ => restricted!(PROCESSING_INSTRUCTION),
                },

                State::DeclarationTarget => match c {
                    whitespace!() => self.state = State::DeclarationBody,
                    b'?' => self.state = State::DeclarationEnd,
                    _ => restricted!(PROCESSING_INSTRUCTION),
                },

                State::DeclarationBody => {
                    if c == b'?' {
                        self.state = State::DeclarationEnd;
                    }
                }

                State::DeclarationEnd => match c {
                    b'>' => {
                        self.seen_declaration = true;
                        self.state = State::Prolog;
                    }
                    _ => xml_error!(DECLARATION_MISSING_END),
                },

                State::Markup => match c {
                    b'[' => {
                        if self.depth == 0 {
                            xml_error!(MARKUP_CDATA_SECTION_OUTSIDE_ROOT);
                        }
                        self.state = State::CDataSectionC;
                    }
                    b'-' => restricted!(COMMENT),
                    b'D' => restricted!(DOCTYPE),
                    _ => xml_error!(MARKUP_UNRECOGNIZED),
                },

                State::CDataSectionC => {
                    if c != b'C' {
                        xml_error!(MARKUP_CDATA_SECTION_BAD_START);
                    }
                    self.state = State::CDataSectionCD;
                }

                State::CDataSectionCD => {
                    if c != b'D' {
                        xml_error!(MARKUP_CDATA_SECTION_BAD_START);
                    }
                    self.state = State::CDataSectionCDA;
                }

                State::CDataSectionCDA => {
                    if c != b'A' {
                        xml_error!(MARKUP_CDATA_SECTION_BAD_START);
                    }
                    self.state = State::CDataSectionCDAT;
                }

                State::CDataSectionCDAT => {
                    if c != b'T' {
                        xml_error!(MARKUP_CDATA_SECTION_BAD_START);
                    }
                    self.state = State::CDataSectionCDATA;
                }

                State::CDataSectionCDATA => {
                    if c != b'A' {
                        xml_error!(MARKUP_CDATA_SECTION_BAD_START);
                    }
                    self.state = State::CDataSectionCDATAb;
                }

                State::CDataSectionCDATAb => {
                    if c != b'[' {
                        xml_error!(MARKUP_CDATA_SECTION_BAD_START);
                    }
                    back = pos + 1;
                    self.state = State::CDataSectionBody;
                }

                State::CDataSectionBody => {
                    if c == b']' {
                        if back < pos {
                            handler.handle_event(&LexEvent::CData(as_str(&bytes[back..pos])))?;
                        }
                        self.state = State::CDataSectionMaybeEnd;
                    }
                }

                State::CDataSectionMaybeEnd => match c {
                    b']' => self.state = State::CDataSectionMaybeEnd2,
                    _ => {
                        handler.handle_event(&LexEvent::CData("]"))?;
                        back = pos;
                        self.state = State::CDataSectionBody;
                    }
                },

                State::CDataSectionMaybeEnd2 => match c {
                    b'>' => {
                        back = pos + 1;
                        self.state = State::CData;
                    }
                    b']' => {
                        handler.handle_event(&LexEvent::CData("]"))?;
                    }
                    _ => {
                        handler.handle_event(&LexEvent::CData("]]"))?;
                        back = pos;
                        self.state = State::CDataSectionBody;
                    }
                },

                State::TagName => match c {
                    b'/' | b'>' | whitespace!() => {
                        if back < pos {
                            self.push_buffer(&bytes[back..pos])?;
                        }
                        if self.buffer.is_empty() {
                            xml_error!(TAG_EMPTY_NAME);
                        }
                        if self.is_end_tag {
                            if c == b'/' {
                                xml_error!(TAG_DOUBLE_END);
                            }
                            handler.handle_event(&LexEvent::EndTag(as_str(&self.buffer)))?;
                        } else {
                            handler.handle_event(&LexEvent::StartTag(as_str(&self.buffer)))?;
                        }
                        self.buffer.clear();
                        match c {
                            b'/' => {
                                handler.handle_event(&LexEvent::StartTagEmpty)?;
                                self.state = State::EmptyTagEnd;
                            }
                            b'>' => {
                                if self.is_end_tag {
                                    self.close_tag(pos, &mut back);
                                } else {
                                    handler.handle_event(&LexEvent::StartTagContent)?;
                                    back = pos + 1;
                                    self.state = State::CData;
                                }
                            }
                            _ => {
                                if self.is_end_tag {
                                    self.state = State::EndTagWhitespace;
                                } else {
                                    self.state = State::AttributeWhitespace;
                                }
                            }
                        }
                    }
                    b'<' => xml_error!(TAG_EMPTY_NAME),
                    _ => (),
                },

                State::EmptyTagEnd => match c {
                    b'>' => self.close_tag(pos, &mut back),
                    _ => xml_error!(TAG_EMPTY_TAG_MISSING_END),
                },

                State::EndTagWhitespace => match c {
                    b'>' => self.close_tag(pos, &mut back),
                    whitespace!() => (),
                    _ => xml_error!(TAG_END_TAG_ATTRIBUTES),
                },

                State::AttributeWhitespace => match c {
                    whitespace!() => (),
                    b'/' => {
                        handler.handle_event(&LexEvent::StartTagEmpty)?;
                        self.state = State::EmptyTagEnd;
                    }
                    b'>' => {
                        handler.handle_event(&LexEvent::StartTagContent)?;
                        back = pos + 1;
                        self.state = State::CData;
                    }
                    _ => {
                        back = pos;
                        self.state = State::AttributeName;
                        redo = true;
                    }
                },

                State::AttributeName => match c {
                    b'=' | whitespace!() => {
                        if back < pos {
                            self.push_buffer(&bytes[back..pos])?;
                        }
                        if c == b'=' {
                            self.state = State::AttributeValueStart;
                        } else {
                            self.state = State::AttributeEq;
                        }
                    }
                    b'/' | b'>' | b'<' => xml_error!(TAG_ATTRIBUTE_BAD_NAME),
                    _ => (),
                },

                State::AttributeEq => match c {
                    b'=' => self.state = State::AttributeValueStart,
                    whitespace!() => (),
                    _ => xml_error!(TAG_ATTRIBUTE_WITHOUT_EQUAL),
                },

                State::AttributeValueStart => match c {
                    b'"' | b'\'' => {
                        self.is_apos_value = c == b'\'';
                        self.value_pos = self.buffer.len();
                        back = pos + 1;
                        self.state = State::AttributeValue;
                    }
                    whitespace!() => (),
                    _ => xml_error!(TAG_ATTRIBUTE_WITHOUT_QUOTE),
                },

                State::AttributeValue => {
                    if (self.is_apos_value && c == b'\'') || (!self.is_apos_value && c == b'"') {
                        if back < pos {
                            self.push_buffer(&bytes[back..pos])?;
                        }
                        let (name, value) = self.buffer.split_at(self.value_pos);
                        handler.handle_event(&LexEvent::Attribute(as_str(name), as_str(value)))?;
                        self.buffer.clear();
                        self.state = State::AttributeWhitespace;
                    } else if c == b'&' {
                        if back < pos {
                            self.push_buffer(&bytes[back..pos])?;
                        }
                        self.ref_buffer.clear();
                        self.is_value_ref = true;
                        self.state = State::Reference;
                    } else if c == b'<' {
                        xml_error!(TAG_ATTRIBUTE_BAD_VALUE);
                    }
                }

                State::CData => match c {
                    b'<' | b'&' => {
                        if back < pos {
                            handler.handle_event(&LexEvent::CData(as_str(&bytes[back..pos])))?;
                        }
                        if c == b'<' {
                            back = pos + 1;
                            self.state = State::TagStart;
                        } else {
                            self.ref_buffer.clear();
                            self.is_value_ref = false;
                            self.state = State::Reference;
                        }
                    }
                    _ => (),
                },

                State::Reference => match c {
                    b'#' => {
                        self.char_ref_value = 0;
                        self.state = State::CharReference;
                    }
                    _ => {
                        self.ref_buffer.push(c);
                        self.state = State::Entity;
                    }
                },

                State::Entity => match c {
                    b';' => {
                        let ent = match self.ref_buffer.as_slice() {
                            b"amp" => "&",
                            b"lt" => "<",
                            b"gt" => ">",
                            b"quot" => "\"",
                            b"apos" => "'",
                            _ => restricted!(CUSTOM_ENTITY),
                        };
                        back = pos + 1;
                        if self.is_value_ref {
                            self.push_buffer(ent.as_bytes())?;
                            self.state = State::AttributeValue;
                        } else {
                            handler.handle_event(&LexEvent::CData(ent))?;
                            self.state = State::CData;
                        }
                    }
                    _ => {
                        if self.ref_buffer.len() >= REF_BUFFER_SIZE {
                            restricted!(CUSTOM_ENTITY);
                        }
                        self.ref_buffer.push(c);
                    }
                },

                State::CharReference => match c {
                    b'x' => self.state = State::HexCharReference,
                    b'0'..=b'9' => {
                        self.char_ref_value = (c - b'0') as u32;
                        self.state = State::CharReferenceBody;
                    }
                    _ => xml_error!(REFERENCE_INVALID_DECIMAL),
                },

                State::CharReferenceBody | State::HexCharReference => {
                    let radix = if self.state == State::HexCharReference {
                        16
                    } else {
                        10
                    };
                    if c == b';' {
                        self.send_char_reference(handler, self.char_ref_value)?;
                        back = pos + 1;
                        if self.is_value_ref {
                            self.state = State::AttributeValue;
                        } else {
                            self.state = State::CData;
                        }
                    } else {
                        let digit = match (c as char).to_digit(radix) {
                            Some(digit) => digit,
                            None if radix == 16 => xml_error!(REFERENCE_INVALID_HEX),
                            None => xml_error!(REFERENCE_INVALID_DECIMAL),
                        };
                        // Saturate so that huge references fail as invalid chars
                        self.char_ref_value = self
                            .char_ref_value
                            .saturating_mul(radix)
                            .saturating_add(digit);
                    }
                }

                State::Epilog => match c {
                    b'<' => self.state = State::TagStart,
                    whitespace!() => (),
                    _ => xml_error!(DOC_CDATA_WITHOUT_PARENT),
                },
            }

            if !redo {
                pos += 1;
                self.location.advance(c);
            }
        }

        match self.state {
            State::TagName | State::AttributeName | State::AttributeValue => {
                if back < pos {
                    self.push_buffer(&bytes[back..pos])?;
                }
            }
            State::CData | State::CDataSectionBody => {
                if self.uni_left > 0 {
                    // Keep the incomplete character until the next chunk
                    if self.buffer.is_empty() {
                        if back < self.uni_start {
                            let s = as_str(&bytes[back..self.uni_start]);
                            handler.handle_event(&LexEvent::CData(s))?;
                        }
                        self.push_buffer(&bytes[self.uni_start..pos])?;
                    } else {
                        self.push_buffer(&bytes[back..pos])?;
                    }
                } else if back < pos {
                    handler.handle_event(&LexEvent::CData(as_str(&bytes[back..pos])))?;
                }
            }
            _ => (),
        }

        Ok(())
    }

    fn close_tag(&mut self, pos: usize, back: &mut usize) {
        // Open tag count is always positive here, TagStart rejects a stray '</'
        self.depth -= 1;
        if self.depth == 0 {
            self.state = State::Epilog;
        } else {
            *back = pos + 1;
            self.state = State::CData;
        }
    }
}

impl Default for XmlLexer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests;

/*
** This file is a part of Colibri (stanza decoder for Jitsi Videobridge)
**
** Colibri is free software: you can redistribute it and/or modify it
** under the terms of the GNU Lesser General Public License as
** published by the Free Software Foundation, either version 3 of
** the License, or (at your option) any later version.
*/

mod error;
mod token;

use std::collections::VecDeque;

use tracing::trace;

use crate::LexError;
use crate::LexEvent;
use crate::LexHandler;
use crate::XmlLexer;

pub use error::ReadError;
pub use token::Attribute;
pub use token::StartTag;
pub use token::Token;

pub const XML_NS: &str = "http://www.w3.org/XML/1998/namespace";

/// A forward only source of XML tokens.
///
/// Stanza decoders pull tokens one by one. The stream remembers the last
/// returned token so that a decoder can be handed a stream positioned at
/// the opening tag of its element.
pub trait TokenStream {
    /// Advances the stream and returns the new current token.
    ///
    /// Once the tokens are exhausted, [Token::EndOfStream] is returned
    /// for every call.
    fn next_token(&mut self) -> Result<Token, ReadError>;

    /// The token returned by the last [next_token()](TokenStream::next_token) call.
    fn current(&self) -> Option<&Token>;
}

struct PendingTag {
    name: String,
    attributes: Vec<(String, String)>,
}

struct OpenTag {
    name: String,
    nr_bindings: usize,
}

fn split_name(name: &str) -> (&str, &str) {
    match name.split_once(':') {
        Some((prefix, local)) => (prefix, local),
        None => ("", name),
    }
}

/// Turns lexer events into namespace resolved tokens.
struct TokenBuilder {
    tokens: VecDeque<Token>,
    pending: Option<PendingTag>,
    open: Vec<OpenTag>,
    // (prefix, uri) pairs in declaration order, empty prefix is the default namespace
    bindings: Vec<(String, String)>,
    error: Option<ReadError>,
}

impl TokenBuilder {
    fn new() -> Self {
        TokenBuilder {
            tokens: VecDeque::new(),
            pending: None,
            open: Vec::new(),
            bindings: Vec::new(),
            error: None,
        }
    }

    fn resolve(&self, prefix: &str) -> Result<String, ReadError> {
        if prefix == "xml" {
            return Ok(XML_NS.to_string());
        }
        match self.bindings.iter().rev().find(|(p, _)| p == prefix) {
            Some((_, uri)) => Ok(uri.clone()),
            None if prefix.is_empty() => Ok(String::new()),
            None => Err(ReadError::UnboundPrefix(prefix.to_string())),
        }
    }

    fn finish_start_tag(&mut self, is_empty: bool) -> Result<(), ReadError> {
        let Some(pending) = self.pending.take() else {
            return Ok(());
        };

        let mut nr_bindings = 0;
        let mut plain = Vec::with_capacity(pending.attributes.len());
        for (name, value) in pending.attributes {
            if name == "xmlns" {
                self.bindings.push((String::new(), value));
                nr_bindings += 1;
            } else if let Some(prefix) = name.strip_prefix("xmlns:") {
                self.bindings.push((prefix.to_string(), value));
                nr_bindings += 1;
            } else {
                plain.push((name, value));
            }
        }

        let (prefix, local) = split_name(&pending.name);
        let namespace = self.resolve(prefix)?;
        let mut attributes = Vec::with_capacity(plain.len());
        for (name, value) in plain {
            let (prefix, local) = split_name(&name);
            let namespace = if prefix.is_empty() {
                None
            } else {
                Some(self.resolve(prefix)?)
            };
            attributes.push(Attribute {
                name: local.to_string(),
                namespace,
                value,
            });
        }

        let local = local.to_string();
        if is_empty {
            self.bindings.truncate(self.bindings.len() - nr_bindings);
            self.tokens.push_back(Token::StartTag(StartTag::from_parts(
                local.clone(),
                namespace,
                attributes,
            )));
            self.tokens.push_back(Token::EndTag(local));
        } else {
            self.open.push(OpenTag {
                name: pending.name,
                nr_bindings,
            });
            self.tokens.push_back(Token::StartTag(StartTag::from_parts(
                local, namespace, attributes,
            )));
        }
        Ok(())
    }

    fn end_tag(&mut self, name: &str) -> Result<(), ReadError> {
        let Some(open) = self.open.pop() else {
            return Err(ReadError::TagMismatch {
                expected: String::new(),
                found: name.to_string(),
            });
        };
        if open.name != name {
            return Err(ReadError::TagMismatch {
                expected: open.name,
                found: name.to_string(),
            });
        }
        self.bindings.truncate(self.bindings.len() - open.nr_bindings);
        let (_, local) = split_name(name);
        self.tokens.push_back(Token::EndTag(local.to_string()));
        Ok(())
    }

    fn add_event(&mut self, event: &LexEvent) -> Result<(), ReadError> {
        match event {
            LexEvent::StartTag(name) => {
                self.pending = Some(PendingTag {
                    name: name.to_string(),
                    attributes: Vec::new(),
                });
            }
            LexEvent::Attribute(name, value) => {
                if let Some(pending) = self.pending.as_mut() {
                    if pending.attributes.iter().any(|(n, _)| n == name) {
                        return Err(ReadError::DuplicateAttribute(name.to_string()));
                    }
                    pending.attributes.push((name.to_string(), value.to_string()));
                }
            }
            LexEvent::StartTagContent => self.finish_start_tag(false)?,
            LexEvent::StartTagEmpty => self.finish_start_tag(true)?,
            LexEvent::EndTag(name) => self.end_tag(name)?,
            LexEvent::CData(cdata) => {
                if let Some(Token::Text(text)) = self.tokens.back_mut() {
                    text.push_str(cdata);
                } else {
                    self.tokens.push_back(Token::Text(cdata.to_string()));
                }
            }
        }
        Ok(())
    }
}

impl LexHandler for TokenBuilder {
    fn handle_event(&mut self, event: &LexEvent) -> Result<(), LexError> {
        self.add_event(event).map_err(|err| {
            self.error = Some(err);
            LexError::HandlerAbort
        })
    }
}

/// Pull style reader over a buffer holding a single stanza.
///
/// The whole buffer is lexed up front. The document does not need to be
/// complete: a stanza cut in the middle simply yields
/// [Token::EndOfStream] early, and a syntax error is returned in place
/// of the first token that could not be produced.
///
/// # Examples
///
/// ```
/// use colibri::{Token, TokenStream, XmlReader};
///
/// let mut reader = XmlReader::from_bytes(b"<src>1234</src>");
/// assert!(matches!(reader.next_token(), Ok(Token::StartTag(tag)) if tag.name() == "src"));
/// assert_eq!(reader.next_token(), Ok(Token::Text("1234".to_string())));
/// assert_eq!(reader.next_token(), Ok(Token::EndTag("src".to_string())));
/// assert_eq!(reader.next_token(), Ok(Token::EndOfStream));
/// ```
pub struct XmlReader {
    tokens: VecDeque<Token>,
    current: Option<Token>,
    error: Option<ReadError>,
}

impl XmlReader {
    pub fn from_bytes(bytes: &[u8]) -> XmlReader {
        let mut builder = TokenBuilder::new();
        let mut lexer = XmlLexer::new();
        let error = match lexer.parse_bytes(&mut builder, bytes) {
            Ok(()) => None,
            Err(LexError::HandlerAbort) => builder.error.take(),
            Err(error) => Some(ReadError::Lex {
                error,
                location: lexer.location(),
            }),
        };
        trace!(
            tokens = builder.tokens.len(),
            open_tags = lexer.depth(),
            failed = error.is_some(),
            "lexed stanza"
        );
        XmlReader {
            tokens: builder.tokens,
            current: None,
            error,
        }
    }

    /// Creates a reader serving the given tokens as they are.
    ///
    /// No well-formedness checks are done, which makes this useful for
    /// feeding decoders with hand made or recorded token sequences.
    pub fn from_tokens(tokens: impl IntoIterator<Item = Token>) -> XmlReader {
        XmlReader {
            tokens: tokens.into_iter().collect(),
            current: None,
            error: None,
        }
    }

    /// Creates a reader positioned at the first start tag of the buffer.
    ///
    /// Character data before the root tag is skipped. If there is no start
    /// tag at all, the reader is left at [Token::EndOfStream].
    pub fn open(bytes: &[u8]) -> Result<XmlReader, ReadError> {
        let mut reader = XmlReader::from_bytes(bytes);
        loop {
            match reader.next_token()? {
                Token::StartTag(_) | Token::EndOfStream => return Ok(reader),
                _ => (),
            }
        }
    }
}

impl From<&str> for XmlReader {
    fn from(s: &str) -> Self {
        XmlReader::from_bytes(s.as_bytes())
    }
}

impl TokenStream for XmlReader {
    fn next_token(&mut self) -> Result<Token, ReadError> {
        let token = match self.tokens.pop_front() {
            Some(token) => token,
            None => match self.error.take() {
                Some(err) => return Err(err),
                None => Token::EndOfStream,
            },
        };
        self.current = Some(token.clone());
        Ok(token)
    }

    fn current(&self) -> Option<&Token> {
        self.current.as_ref()
    }
}

/*
** This file is a part of Colibri (stanza decoder for Jitsi Videobridge)
**
** Colibri is free software: you can redistribute it and/or modify it
** under the terms of the GNU Lesser General Public License as
** published by the Free Software Foundation, either version 3 of
** the License, or (at your option) any later version.
*/

use thiserror::Error;

use crate::LexError;
use crate::Location;

/// Errors from the token stream.
#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum ReadError {
    /// The bytes are not acceptable XML.
    #[error("{error} at {location}")]
    Lex { error: LexError, location: Location },

    #[error("namespace prefix '{0}' is not declared")]
    UnboundPrefix(String),

    #[error("attribute '{0}' is used more than once in a tag")]
    DuplicateAttribute(String),

    #[error("end tag '{found}' does not match start tag '{expected}'")]
    TagMismatch { expected: String, found: String },
}

/*
** This file is a part of Colibri (stanza decoder for Jitsi Videobridge)
**
** Colibri is free software: you can redistribute it and/or modify it
** under the terms of the GNU Lesser General Public License as
** published by the Free Software Foundation, either version 3 of
** the License, or (at your option) any later version.
*/

use thiserror::Error;

use crate::ReadError;

/// Reasons a stanza could not be decoded.
///
/// None of these leave a partially decoded conference behind. An element
/// which simply is not a Colibri conference is not an error, see
/// [Decoded::NotApplicable](crate::Decoded::NotApplicable).
#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum ColibriError {
    /// An attribute or text value could not be converted to its type.
    #[error("invalid value '{value}' for '{name}'")]
    Parse { name: String, value: String },

    /// The stream ended inside the named element.
    #[error("stream ended inside '{0}' element")]
    TruncatedStream(String),

    /// An end tag does not close the innermost open element.
    #[error("end tag '{found}' does not close '{expected}' element")]
    UnbalancedTag { expected: String, found: String },

    /// The token stream itself failed.
    #[error(transparent)]
    Read(#[from] ReadError),
}

impl ColibriError {
    pub(crate) fn invalid(name: &str, value: &str) -> ColibriError {
        ColibriError::Parse {
            name: name.to_string(),
            value: value.to_string(),
        }
    }
}

/*
** This file is a part of Colibri (stanza decoder for Jitsi Videobridge)
**
** Colibri is free software: you can redistribute it and/or modify it
** under the terms of the GNU Lesser General Public License as
** published by the Free Software Foundation, either version 3 of
** the License, or (at your option) any later version.
*/

use std::fmt::Display;

/// A position in the lexer input byte stream.
///
/// Counts the bytes consumed so far. When lexing fails the offending
/// byte is not consumed, so the one-based column printed by `Display`
/// is the column of that byte.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Location {
    /// Number of bytes consumed so far.
    pub bytes: usize,
    /// Number of newline characters consumed so far.
    pub lines: usize,
    /// Number of bytes consumed after the last newline.
    pub column: usize,
}

impl Location {
    pub fn new() -> Self {
        Location::default()
    }

    pub(super) fn advance(&mut self, c: u8) {
        self.bytes += 1;
        if c == b'\n' {
            self.lines += 1;
            self.column = 0;
        } else {
            self.column += 1;
        }
    }
}

impl Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Humans count lines and columns from one
        write!(f, "line {}, column {}", self.lines + 1, self.column + 1)
    }
}

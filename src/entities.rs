/*
** This file is a part of Colibri (stanza decoder for Jitsi Videobridge)
**
** Colibri is free software: you can redistribute it and/or modify it
** under the terms of the GNU Lesser General Public License as
** published by the Free Software Foundation, either version 3 of
** the License, or (at your option) any later version.
*/

pub mod predefined {
    pub const LT: &str = "&lt;";
    pub const GT: &str = "&gt;";
    pub const AMP: &str = "&amp;";
    pub const APOS: &str = "&apos;";
    pub const QUOT: &str = "&quot;";
}

fn entity(c: char) -> Option<&'static str> {
    match c {
        '<' => Some(predefined::LT),
        '>' => Some(predefined::GT),
        '&' => Some(predefined::AMP),
        '\'' => Some(predefined::APOS),
        '"' => Some(predefined::QUOT),
        _ => None,
    }
}

/// Writes the string with the XML special characters replaced by entities.
///
/// Runs of plain characters are written in one piece.
pub fn escape_fmt(s: &str, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let mut start = 0;
    for (pos, c) in s.char_indices() {
        if let Some(ent) = entity(c) {
            if start < pos {
                f.write_str(&s[start..pos])?;
            }
            f.write_str(ent)?;
            start = pos + 1;
        }
    }
    if start < s.len() {
        f.write_str(&s[start..])?;
    }

    Ok(())
}

/// Display adapter for [escape_fmt].
pub struct Escaped<'a>(pub &'a str);

impl std::fmt::Display for Escaped<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        escape_fmt(self.0, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape() {
        const NOESCAPE: &str = "abc$#@!%^*(){}[]=-+/.,;:FDSF3443";
        assert_eq!(Escaped(NOESCAPE).to_string(), NOESCAPE);
        assert_eq!(Escaped("abc&def").to_string(), "abc&amp;def");
        assert_eq!(Escaped("<>&'\"").to_string(), "&lt;&gt;&amp;&apos;&quot;");
        assert_eq!(Escaped("ç<ş>").to_string(), "ç&lt;ş&gt;");
        assert_eq!(Escaped("").to_string(), "");
    }
}

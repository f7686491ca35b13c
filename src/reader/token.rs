/*
** This file is a part of Colibri (stanza decoder for Jitsi Videobridge)
**
** Colibri is free software: you can redistribute it and/or modify it
** under the terms of the GNU Lesser General Public License as
** published by the Free Software Foundation, either version 3 of
** the License, or (at your option) any later version.
*/

/// A token of the pull style XML stream.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Token {
    /// Opening tag of an element. Empty element tags produce this followed
    /// by a matching [Token::EndTag].
    StartTag(StartTag),

    /// Closing tag with the local name of the element.
    EndTag(String),

    /// Character data between tags. Adjacent pieces are already merged.
    Text(String),

    /// There are no more tokens.
    EndOfStream,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Attribute {
    /// Local name, without any namespace prefix.
    pub name: String,
    /// Namespace of a prefixed attribute, None for plain attributes.
    pub namespace: Option<String>,
    pub value: String,
}

/// An opening tag with its resolved namespace and attributes.
///
/// Namespace declarations are consumed by the reader and do not show up
/// among the attributes.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StartTag {
    name: String,
    namespace: String,
    attributes: Vec<Attribute>,
}

impl StartTag {
    pub fn new(name: &str, namespace: &str) -> StartTag {
        StartTag {
            name: name.to_string(),
            namespace: namespace.to_string(),
            attributes: Vec::new(),
        }
    }

    /// Adds a plain attribute, handy for building token streams by hand.
    pub fn with_attribute(mut self, name: &str, value: &str) -> StartTag {
        self.attributes.push(Attribute {
            name: name.to_string(),
            namespace: None,
            value: value.to_string(),
        });
        self
    }

    pub(super) fn from_parts(name: String, namespace: String, attributes: Vec<Attribute>) -> Self {
        StartTag {
            name,
            namespace,
            attributes,
        }
    }

    /// Local name of the element.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Namespace URI of the element, empty if the element has none.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Value of the plain (non prefixed) attribute with the given name.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|attr| attr.namespace.is_none() && attr.name == name)
            .map(|attr| attr.value.as_str())
    }

    pub fn attributes(&self) -> impl Iterator<Item = &Attribute> {
        self.attributes.iter()
    }

    pub fn is(&self, name: &str, namespace: &str) -> bool {
        self.name == name && self.namespace == namespace
    }
}

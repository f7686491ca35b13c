/*
** This file is a part of Colibri (stanza decoder for Jitsi Videobridge)
**
** Colibri is free software: you can redistribute it and/or modify it
** under the terms of the GNU Lesser General Public License as
** published by the Free Software Foundation, either version 3 of
** the License, or (at your option) any later version.
*/

use super::*;

struct Tester<'a> {
    expected: &'a [LexEvent<'a>],
    current: usize,
    cdata_buf: String,
}

impl<'a> Tester<'a> {
    fn new(expected: &'a [LexEvent]) -> Tester<'a> {
        Tester {
            expected,
            current: 0,
            cdata_buf: String::new(),
        }
    }

    fn check(&mut self, s: &str) {
        let nr_lines = s.matches('\n').count();
        let nr_column = s.lines().last().unwrap().len();

        let mut lexer = XmlLexer::new();
        assert_eq!(lexer.parse_bytes_finish(self, s.as_bytes()), Ok(()));
        assert_eq!(self.current, self.expected.len());
        assert_eq!(lexer.location().lines, nr_lines);
        assert_eq!(lexer.location().column, nr_column);
        assert_eq!(lexer.location().bytes, s.len());

        // now try byte by byte
        lexer.reset();
        self.current = 0;
        self.cdata_buf.clear();
        for i in 0..s.len() {
            assert_eq!(lexer.parse_bytes(self, &s.as_bytes()[i..i + 1]), Ok(()));
        }
        assert_eq!(lexer.parse_finish(), Ok(()));
        assert_eq!(self.current, self.expected.len());
        assert_eq!(lexer.location().bytes, s.len());
    }
}

impl LexHandler for Tester<'_> {
    fn handle_event(&mut self, event: &LexEvent) -> Result<(), LexError> {
        assert!(self.current < self.expected.len());
        if let LexEvent::CData(cdata) = event {
            if let LexEvent::CData(expected) = self.expected[self.current] {
                self.cdata_buf.push_str(cdata);
                if self.cdata_buf.len() >= expected.len() {
                    assert_eq!(self.cdata_buf, expected);
                    self.current += 1;
                    self.cdata_buf.clear();
                }
            } else {
                assert_eq!(event, &self.expected[self.current]);
            }
        } else {
            assert_eq!(event, &self.expected[self.current]);
            self.current += 1;
        }
        Ok(())
    }
}

struct BadTester {
    bad_byte: usize,
}

impl BadTester {
    fn new(bad_byte: usize) -> BadTester {
        BadTester { bad_byte }
    }

    fn check(&mut self, s: &str) {
        self.check_bytes(s.as_bytes())
    }

    fn check_bytes(&mut self, bytes: &[u8]) {
        let mut lexer = XmlLexer::new();
        let result = lexer.parse_bytes_finish(self, bytes);
        assert!(matches!(result, Err(LexError::BadXml(_))), "{result:?}");
        assert_eq!(lexer.location().bytes, self.bad_byte);
    }

    fn check_restricted(&mut self, s: &str, what: &'static str) {
        let mut lexer = XmlLexer::new();
        assert_eq!(
            lexer.parse_bytes_finish(self, s.as_bytes()),
            Err(LexError::Restricted(what))
        );
        assert_eq!(lexer.location().bytes, self.bad_byte);
    }
}

impl LexHandler for BadTester {
    fn handle_event(&mut self, _event: &LexEvent) -> Result<(), LexError> {
        Ok(())
    }
}

#[test]
fn tags() {
    Tester::new(&[LexEvent::StartTag("lonely"), LexEvent::StartTagEmpty]).check("<lonely/>");

    Tester::new(&[LexEvent::StartTag("lonely"), LexEvent::StartTagEmpty])
        .check("   <lonely/>    ");

    Tester::new(&[
        LexEvent::StartTag("parent"),
        LexEvent::StartTagContent,
        LexEvent::StartTag("child"),
        LexEvent::StartTagEmpty,
        LexEvent::StartTag("child"),
        LexEvent::StartTagEmpty,
        LexEvent::CData("child"),
        LexEvent::EndTag("parent"),
    ])
    .check("<?xml version='1.0'?><parent><child/><child/>child</parent>");

    Tester::new(&[
        LexEvent::StartTag("parent"),
        LexEvent::StartTagContent,
        LexEvent::StartTag("empty"),
        LexEvent::StartTagEmpty,
        LexEvent::StartTag("b"),
        LexEvent::StartTagContent,
        LexEvent::CData("lala"),
        LexEvent::EndTag("b"),
        LexEvent::EndTag("parent"),
    ])
    .check("<parent  ><empty \t /><b>lala</b \n></parent>");

    Tester::new(&[
        LexEvent::StartTag("channel"),
        LexEvent::Attribute("rtp-port", "5000"),
        LexEvent::Attribute("id", "XC72"),
        LexEvent::StartTagContent,
        LexEvent::EndTag("channel"),
    ])
    .check("<channel rtp-port='5000' id=\"XC72\"></channel>");

    Tester::new(&[
        LexEvent::StartTag("a"),
        LexEvent::StartTagContent,
        LexEvent::StartTag("b"),
        LexEvent::Attribute("x1", "lala"),
        LexEvent::StartTagEmpty,
        LexEvent::StartTag("c"),
        LexEvent::Attribute("x2", "bibi"),
        LexEvent::StartTagEmpty,
        LexEvent::EndTag("a"),
    ])
    .check("<a><b x1 ='lala'/><c x2\t= \t'bibi'/></a>");

    Tester::new(&[
        LexEvent::StartTag("tag"),
        LexEvent::Attribute("a", "12\"34"),
        LexEvent::Attribute("b", "123'456"),
        LexEvent::StartTagEmpty,
    ])
    .check("<tag a='12\"34' b=\"123'456\" />");
}

#[test]
fn prefixed_names() {
    Tester::new(&[
        LexEvent::StartTag("c:conference"),
        LexEvent::Attribute("xmlns:c", "http://jitsi.org/protocol/colibri"),
        LexEvent::StartTagContent,
        LexEvent::StartTag("c:content"),
        LexEvent::StartTagEmpty,
        LexEvent::EndTag("c:conference"),
    ])
    .check("<c:conference xmlns:c='http://jitsi.org/protocol/colibri'><c:content/></c:conference>");
}

#[test]
fn cdata_sections() {
    Tester::new(&[
        LexEvent::StartTag("ka"),
        LexEvent::StartTagContent,
        LexEvent::CData("1234 <ka> lala ] ]] ]]] 4321"),
        LexEvent::EndTag("ka"),
    ])
    .check("<ka>1234<![CDATA[ <ka> lala ] ]] ]]] ]]>4321</ka>");

    Tester::new(&[
        LexEvent::StartTag("data"),
        LexEvent::StartTagContent,
        LexEvent::CData("[TEST]"),
        LexEvent::EndTag("data"),
    ])
    .check("<data><![CDATA[[TEST]]]></data>");

    Tester::new(&[
        LexEvent::StartTag("data"),
        LexEvent::StartTagContent,
        LexEvent::CData("[TEST]]"),
        LexEvent::EndTag("data"),
    ])
    .check("<data><![CDATA[[TEST]]]]></data>");
}

#[test]
fn multibyte_chars() {
    Tester::new(&[
        LexEvent::StartTag("a"),
        LexEvent::StartTagContent,
        LexEvent::CData("[[bg:Чингис хан]][[bn:চেঙ্গিজ খান]]"),
        LexEvent::EndTag("a"),
    ])
    .check("<a>[[bg:Чингис хан]][[bn:চেঙ্গিজ খান]]</a>");

    Tester::new(&[
        LexEvent::StartTag("src"),
        LexEvent::StartTagContent,
        LexEvent::CData("𝄞12"),
        LexEvent::EndTag("src"),
    ])
    .check("<src><![CDATA[𝄞]]>12</src>");

    Tester::new(&[
        LexEvent::StartTag("content"),
        LexEvent::Attribute("name", "видео"),
        LexEvent::StartTagEmpty,
    ])
    .check("<content name='видео'/>");
}

#[test]
fn entities() {
    Tester::new(&[
            LexEvent::StartTag("body"),
            LexEvent::StartTagContent,
            LexEvent::CData("I'm fixing parser&tester for \"<\" and \">\" chars."),
            LexEvent::EndTag("body"),
        ])
        .check("<body>I&apos;m fixing parser&amp;tester for &quot;&lt;&quot; and &quot;&gt;&quot; chars.</body>");

    Tester::new(&[
        LexEvent::StartTag("a"),
        LexEvent::StartTagContent,
        LexEvent::CData(";AB;"),
        LexEvent::EndTag("a"),
    ])
    .check("<a>&#x3B;&#65;&#x42;&#x3b;</a>");

    Tester::new(&[
        LexEvent::StartTag("a"),
        LexEvent::StartTagContent,
        LexEvent::CData(" \u{90} \u{900} \u{10abc} "),
        LexEvent::EndTag("a"),
    ])
    .check("<a> &#x90; &#x900; &#x10abc; </a>");
}

#[test]
fn attribute_entities() {
    Tester::new(&[
        LexEvent::StartTag("a"),
        LexEvent::Attribute("b", "a&b BA"),
        LexEvent::StartTagContent,
        LexEvent::EndTag("a"),
    ])
    .check("<a b='a&amp;b &#x42;&#65;'></a>");
}

#[test]
fn long_tag() {
    let name = "abc".repeat(500);
    let xml = format!("<{}></{}>", name, name);

    Tester::new(&[
        LexEvent::StartTag(&name),
        LexEvent::StartTagContent,
        LexEvent::EndTag(&name),
    ])
    .check(&xml);
}

#[test]
fn location() {
    Tester::new(&[
        LexEvent::StartTag("a"),
        LexEvent::StartTagContent,
        LexEvent::CData("\n\n "),
        LexEvent::EndTag("a"),
    ])
    .check("<a>\n\n </a>");

    assert_eq!(
        Location {
            bytes: 12,
            lines: 2,
            column: 4
        }
        .to_string(),
        "line 3, column 5"
    );
}

#[test]
fn bad_tags() {
    BadTester::new(4).check("<a>< b/></a>");
    BadTester::new(6).check("<a><b/ ></a>");
    BadTester::new(8).check("<a></ccc/></a>");
    BadTester::new(1).check("</a>");
    BadTester::new(9).check("<a> </a  b>");
    BadTester::new(8).check("<a></a><b/>");
    BadTester::new(10).check("<a a='1' b></a>");
    BadTester::new(11).check("<a a='1' b=></a>");
    BadTester::new(12).check("<a a='12' b '2'></a>");
    BadTester::new(14).check("<a a='12'></a b='1'>");
    BadTester::new(17).check("<g><test a='123'/ b='lala'></g>");
    BadTester::new(13).check("<a a='1' b='></a>");
    BadTester::new(5).check("<a> <> </a>");
    BadTester::new(6).check("<a> </> </a>");
}

#[test]
fn restricted_constructs() {
    BadTester::new(5).check_restricted("<e><!-- x --></e>", description::COMMENT);
    BadTester::new(2).check_restricted("<!DOCTYPE x><x/>", description::DOCTYPE);
    BadTester::new(4).check_restricted("<a><?foo?></a>", description::PROCESSING_INSTRUCTION);
    BadTester::new(5).check_restricted("<?xmlfoo?><a/>", description::PROCESSING_INSTRUCTION);
    BadTester::new(22).check_restricted(
        "<?xml version='1.0'?><?xml?><a/>",
        description::PROCESSING_INSTRUCTION,
    );
    BadTester::new(8).check_restricted("<a>&lala;</a>", description::CUSTOM_ENTITY);
}

#[test]
fn bad_cdatas() {
    BadTester::new(2).check("  lala <a></a>");
    BadTester::new(10).check("  <a></a> lala");
    BadTester::new(2).check("<![CDATA[lala]> <a/>");
    BadTester::new(7).check("<a> <![DATA[lala]> </a>");
    BadTester::new(12).check("<a> <![CDATAlala]> </a>");
}

#[test]
fn bad_references() {
    BadTester::new(6).check("<a>&#1a;</a>");
    BadTester::new(5).check("<a>&#Xaa;</a>");
    BadTester::new(8).check("<a>&#xa5g;</a>");
    BadTester::new(6).check("<a>&#8;</a>");
    BadTester::new(10).check("<a>&#xD800;</a>");
    BadTester::new(10).check("<a>&#xFFff;</a>");
    BadTester::new(12).check("<a>&#x110000;</a>");
}

#[test]
fn bad_chars() {
    BadTester::new(6).check_bytes(b"<test>\xFF</test>");
    BadTester::new(2).check_bytes(b"<t\x00></t>");
    BadTester::new(8).check_bytes(b"<test>\xe3\x8fa</test>");
    BadTester::new(7).check_bytes(b"<test>\xC0\x80</test>");
    BadTester::new(8).check_bytes(b"<test>\xe0\x80\xaf</test>");
    BadTester::new(1).check_bytes(b"<\x8f\x85></\x8f\x85>");
}

#[test]
fn bad_unfinished() {
    BadTester::new(5).check(" <a> ");
    BadTester::new(0).check("");
}

#[test]
fn no_reuse_after_error() {
    let mut handler = BadTester::new(0);
    let mut lexer = XmlLexer::new();
    assert!(lexer.parse_bytes(&mut handler, b"</a>").is_err());
    assert_eq!(
        lexer.parse_bytes(&mut handler, b"<a/>"),
        Err(LexError::BadXml(description::REUSE_WITHOUT_RESET))
    );
    lexer.reset();
    assert_eq!(lexer.parse_bytes_finish(&mut handler, b"<a/>"), Ok(()));
}

#[test]
fn depth_tracking() {
    let mut handler = BadTester::new(0);
    let mut lexer = XmlLexer::new();
    assert_eq!(lexer.parse_bytes(&mut handler, b"<a><b><c/>"), Ok(()));
    assert_eq!(lexer.depth(), 2);
    assert_eq!(lexer.parse_bytes(&mut handler, b"</b></a>"), Ok(()));
    assert_eq!(lexer.depth(), 0);
}

//! Tree builders on top of quick-xml.
//!
//! `parse_xml` is strict. `parse_html` is a lenient approximation of an HTML
//! tokenizer: names are lower-cased, void elements never take children, raw
//! text elements swallow markup, and stray end tags are ignored.

use std::borrow::Cow;

use quick_xml::escape::{resolve_html5_entity, unescape_with};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::ast::*;
use crate::error::DomserError;
use crate::names::{is_unencoded_element, is_void_element};

/// Parse an XML string into a `Node::Root`.
pub fn parse_xml(xml: &str) -> Result<Node, DomserError> {
    TreeBuilder::new(Flavor::Xml).build(xml)
}

/// Parse an HTML string into a `Node::Root`.
pub fn parse_html(html: &str) -> Result<Node, DomserError> {
    TreeBuilder::new(Flavor::Html).build(html)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flavor {
    Xml,
    Html,
}

struct TreeBuilder {
    flavor: Flavor,
    root: Vec<Node>,
    open: Vec<Element>,
}

impl TreeBuilder {
    fn new(flavor: Flavor) -> Self {
        Self {
            flavor,
            root: Vec::new(),
            open: Vec::new(),
        }
    }

    fn build(mut self, input: &str) -> Result<Node, DomserError> {
        // Raw text elements interrupt tokenizing; resume after their end tag.
        let mut offset = 0;
        while let Some(consumed) = self.read_chunk(&input[offset..])? {
            offset += consumed;
        }

        match self.flavor {
            Flavor::Xml => {
                if let Some(unclosed) = self.open.last() {
                    return Err(DomserError::UnclosedElement(unclosed.name.clone()));
                }
            }
            Flavor::Html => {
                while !self.open.is_empty() {
                    self.close_current();
                }
            }
        }

        Ok(Node::Root(self.root))
    }

    fn reader<'a>(&self, input: &'a str) -> Reader<&'a [u8]> {
        let mut reader = Reader::from_str(input);
        if self.flavor == Flavor::Html {
            let config = reader.config_mut();
            config.check_end_names = false;
            config.allow_unmatched_ends = true;
        }
        reader
    }

    /// Feed events from `input` into the tree. Returns the number of bytes
    /// consumed when a raw text element stopped the chunk, `None` at end of input.
    fn read_chunk(&mut self, input: &str) -> Result<Option<usize>, DomserError> {
        let mut reader = self.reader(input);
        loop {
            match reader.read_event()? {
                Event::Start(start) => {
                    let mut element = self.element_start(&start)?;
                    if self.flavor == Flavor::Html {
                        if is_void_element(&element.name) {
                            self.append(element.into());
                            continue;
                        }
                        if is_unencoded_element(&element.name) {
                            let text_start = reader.buffer_position() as usize;
                            let (text, consumed) = raw_text(&input[text_start..], &element.name);
                            if !text.is_empty() {
                                element.children.push(Node::Text(text.to_owned()));
                            }
                            self.append(element.into());
                            return Ok(Some(text_start + consumed));
                        }
                    }
                    self.open.push(element);
                }
                Event::Empty(start) => {
                    let element = self.element_start(&start)?;
                    self.append(element.into());
                }
                Event::End(end) => match self.flavor {
                    Flavor::Xml => self.close_current(),
                    Flavor::Html => {
                        let name_bytes = end.name();
                        let name = std::str::from_utf8(name_bytes.as_ref())?.to_ascii_lowercase();
                        // Unknown end tags are dropped; a known one closes everything above it.
                        if let Some(pos) = self.open.iter().rposition(|e| e.name == name) {
                            while self.open.len() > pos {
                                self.close_current();
                            }
                        }
                    }
                },
                Event::Text(text) => {
                    let text = match self.flavor {
                        Flavor::Xml => text.unescape()?.into_owned(),
                        Flavor::Html => decode_html(std::str::from_utf8(&text)?),
                    };
                    if !text.is_empty() {
                        self.append(Node::Text(text));
                    }
                }
                Event::CData(cdata) => {
                    self.append(Node::CData(std::str::from_utf8(&cdata)?.to_owned()));
                }
                Event::Comment(comment) => {
                    self.append(Node::Comment(std::str::from_utf8(&comment)?.to_owned()));
                }
                Event::Decl(decl) => {
                    let content = std::str::from_utf8(&decl)?;
                    self.append(Node::ProcessingInstruction(format!("?{content}?")));
                }
                Event::PI(pi) => {
                    let content = std::str::from_utf8(&pi)?;
                    self.append(Node::ProcessingInstruction(format!("?{content}?")));
                }
                Event::DocType(doctype) => {
                    let content = std::str::from_utf8(&doctype)?;
                    self.append(Node::Doctype(format!("!DOCTYPE {content}")));
                }
                Event::Eof => return Ok(None),
                #[allow(unreachable_patterns)]
                _ => {}
            }
        }
    }

    /// Add a node to the innermost open element, or to the root.
    fn append(&mut self, node: Node) {
        match self.open.last_mut() {
            Some(parent) => parent.children.push(node),
            None => self.root.push(node),
        }
    }

    fn close_current(&mut self) {
        if let Some(element) = self.open.pop() {
            self.append(element.into());
        }
    }

    fn element_start(&self, start: &BytesStart) -> Result<Element, DomserError> {
        let name_bytes = start.name();
        let name = std::str::from_utf8(name_bytes.as_ref())?;

        let mut element = match self.flavor {
            Flavor::Xml => Element::new(name),
            Flavor::Html => Element::new(name.to_ascii_lowercase()),
        };

        match self.flavor {
            Flavor::Xml => {
                for attr in start.attributes() {
                    let attr = attr?;
                    let key = std::str::from_utf8(attr.key.as_ref())?;
                    let value = attr.unescape_value()?;
                    element.attributes.push(Attribute::new(key, value));
                }
            }
            Flavor::Html => {
                for attr in start.html_attributes() {
                    let attr = attr?;
                    let key = std::str::from_utf8(attr.key.as_ref())?.to_ascii_lowercase();
                    let raw = std::str::from_utf8(&attr.value)?;
                    // `checked` and `checked=""` are indistinguishable here.
                    element.attributes.push(if raw.is_empty() {
                        Attribute::boolean(key)
                    } else {
                        Attribute::new(key, decode_html(raw))
                    });
                }
            }
        }

        Ok(element)
    }
}

/// Split the content of a raw text element off `rest`, which starts right
/// after its start tag. Returns the text and the number of bytes up to and
/// including the end tag. Without an end tag the text runs to the end.
fn raw_text<'a>(rest: &'a str, name: &str) -> (&'a str, usize) {
    let bytes = rest.as_bytes();
    let mut from = 0;
    while let Some(found) = rest[from..].find("</") {
        let tag_start = from + found;
        let name_end = tag_start + 2 + name.len();
        let closes = bytes
            .get(tag_start + 2..name_end)
            .is_some_and(|candidate| candidate.eq_ignore_ascii_case(name.as_bytes()))
            && bytes
                .get(name_end)
                .is_none_or(|&b| b == b'>' || b == b'/' || b.is_ascii_whitespace());
        if closes {
            let end = rest[name_end..].find('>').map_or(rest.len(), |gt| name_end + gt + 1);
            return (&rest[..tag_start], end);
        }
        from = tag_start + 2;
    }
    (rest, rest.len())
}

/// Decode HTML character references, leaving the text as written if any
/// reference is malformed or unknown.
fn decode_html(raw: &str) -> String {
    unescape_with(raw, resolve_html5_entity)
        .map(Cow::into_owned)
        .unwrap_or_else(|_| raw.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root_children(node: &Node) -> &[Node] {
        match node {
            Node::Root(children) => children,
            other => panic!("expected root, got {other:?}"),
        }
    }

    fn first_element(node: &Node) -> &Element {
        root_children(node)
            .iter()
            .find_map(|n| match n {
                Node::Element(e) => Some(e),
                _ => None,
            })
            .expect("no element")
    }

    #[test]
    fn test_parse_simple_xml() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg" width="100" height="100">
    <rect x="10" y="10" width="80" height="80" fill="red"/>
</svg>"#;

        let doc = parse_xml(xml).unwrap();
        assert_eq!(
            root_children(&doc)[0],
            Node::ProcessingInstruction(r#"?xml version="1.0" encoding="UTF-8"?"#.into())
        );
        let svg = first_element(&doc);
        assert_eq!(svg.name, "svg");
        assert_eq!(svg.get_attr("width"), Some("100"));
        let elements = svg.children.iter().filter(|n| matches!(n, Node::Element(_)));
        assert_eq!(elements.count(), 1);
    }

    #[test]
    fn test_parse_xml_keeps_case_and_cdata() {
        let doc = parse_xml("<svg><linearGradient/><![CDATA[a&b]]><!-- c --></svg>").unwrap();
        let svg = first_element(&doc);
        assert_eq!(
            svg.children,
            vec![
                Node::Element(Element::new("linearGradient")),
                Node::CData("a&b".into()),
                Node::Comment(" c ".into()),
            ]
        );
    }

    #[test]
    fn test_parse_xml_decodes_entities() {
        let doc = parse_xml(r#"<a title="x &amp; y">&lt;b&gt;</a>"#).unwrap();
        let a = first_element(&doc);
        assert_eq!(a.get_attr("title"), Some("x & y"));
        assert_eq!(a.children, vec![Node::text("<b>")]);
    }

    #[test]
    fn test_parse_xml_unclosed_is_error() {
        assert!(parse_xml("<a><b></b>").is_err());
    }

    #[test]
    fn test_parse_html_lowercases_names() {
        let doc = parse_html(r#"<SVG viewBox="0 0 1 1"><radialGradient/></SVG>"#).unwrap();
        let svg = first_element(&doc);
        assert_eq!(svg.name, "svg");
        assert_eq!(svg.attributes, vec![Attribute::new("viewbox", "0 0 1 1")]);
        assert_eq!(svg.children, vec![Node::Element(Element::new("radialgradient"))]);
    }

    #[test]
    fn test_parse_html_void_and_boolean() {
        let doc = parse_html("<p><input checked>text</p>").unwrap();
        let p = first_element(&doc);
        assert_eq!(
            p.children,
            vec![
                Node::Element(Element::new("input").with_bool_attr("checked")),
                Node::text("text"),
            ]
        );
    }

    #[test]
    fn test_parse_html_raw_text() {
        let doc = parse_html(r#"<script>x = "<br>"; y = '<p>';</script>"#).unwrap();
        let script = first_element(&doc);
        assert_eq!(script.kind, ElementKind::Script);
        assert_eq!(script.children, vec![Node::text(r#"x = "<br>"; y = '<p>';"#)]);
    }

    #[test]
    fn test_parse_html_raw_text_with_bare_less_than() {
        let doc = parse_html("<script>if (a<b) {}</script><p>x</p>").unwrap();
        assert_eq!(
            root_children(&doc),
            &[
                Node::Element(Element::new("script").with_child(Node::text("if (a<b) {}"))),
                Node::Element(Element::new("p").with_child(Node::text("x"))),
            ]
        );
    }

    #[test]
    fn test_raw_text_end_tag_search() {
        assert_eq!(raw_text("a < b</script>rest", "script"), ("a < b", 14));
        assert_eq!(raw_text("x</scripts></SCRIPT >", "script"), ("x</scripts>", 21));
        assert_eq!(raw_text("unterminated <b>", "style"), ("unterminated <b>", 16));
        assert_eq!(raw_text("</style>", "style"), ("", 8));
    }

    #[test]
    fn test_parse_html_recovers_from_bad_nesting() {
        let doc = parse_html("<div><p>one</div></span>two").unwrap();
        assert_eq!(
            root_children(&doc),
            &[
                Node::Element(
                    Element::new("div").with_child(Element::new("p").with_child(Node::text("one")))
                ),
                Node::text("two"),
            ]
        );
    }

    #[test]
    fn test_parse_html_entities() {
        let doc = parse_html("<p title='caf&eacute;'>&copy; 2024 &bogus;</p>").unwrap();
        let p = first_element(&doc);
        assert_eq!(p.get_attr("title"), Some("café"));
        // An unknown reference leaves the whole run as written.
        assert_eq!(p.children, vec![Node::text("&copy; 2024 &bogus;")]);
    }

    #[test]
    fn test_parse_doctype() {
        let doc = parse_html("<!DOCTYPE html><html></html>").unwrap();
        assert_eq!(root_children(&doc)[0], Node::Doctype("!DOCTYPE html".into()));
    }
}

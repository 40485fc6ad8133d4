//! Entity encoding for text and attribute values.

use std::borrow::Cow;
use std::fmt::Write;

/// Escape strategy for text and attribute values, picked once per render call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoder {
    /// Only `"` is escaped; used when entity encoding is disabled.
    QuotesOnly,
    /// Markup characters plus every non-ASCII code point.
    Xml,
    /// Minimal HTML escaping that leaves non-ASCII text alone.
    Utf8,
}

impl Encoder {
    pub fn attribute<'a>(self, value: &'a str) -> Cow<'a, str> {
        match self {
            Encoder::QuotesOnly => replace_quotes(value),
            Encoder::Xml => encode_xml(value),
            Encoder::Utf8 => escape_attribute(value),
        }
    }

    /// Text is left untouched when encoding is disabled.
    pub fn text<'a>(self, value: &'a str) -> Cow<'a, str> {
        match self {
            Encoder::QuotesOnly => Cow::Borrowed(value),
            Encoder::Xml => encode_xml(value),
            Encoder::Utf8 => escape_text(value),
        }
    }
}

/// Full XML entity encoding: reserved markup characters become named
/// entities and non-ASCII code points become hex character references.
pub fn encode_xml(s: &str) -> Cow<'_, str> {
    escape_with(s, |c| match c {
        '&' | '<' | '>' | '"' | '\'' => true,
        c => !c.is_ascii(),
    })
}

/// Escape an attribute value for HTML output, leaving non-ASCII text as is.
pub fn escape_attribute(s: &str) -> Cow<'_, str> {
    escape_with(s, |c| matches!(c, '&' | '"' | '\u{a0}'))
}

/// Escape text content for HTML output, leaving non-ASCII text as is.
pub fn escape_text(s: &str) -> Cow<'_, str> {
    escape_with(s, |c| matches!(c, '&' | '<' | '>' | '\u{a0}'))
}

/// Escape double quotes only.
pub fn replace_quotes(s: &str) -> Cow<'_, str> {
    escape_with(s, |c| c == '"')
}

fn escape_with(s: &str, needs_escape: impl Fn(char) -> bool) -> Cow<'_, str> {
    let Some(first) = s.find(&needs_escape) else {
        return Cow::Borrowed(s);
    };

    let mut out = String::with_capacity(s.len() + 16);
    out.push_str(&s[..first]);
    for c in s[first..].chars() {
        if needs_escape(c) {
            push_entity(&mut out, c);
        } else {
            out.push(c);
        }
    }
    Cow::Owned(out)
}

fn push_entity(out: &mut String, c: char) {
    match c {
        '&' => out.push_str("&amp;"),
        '<' => out.push_str("&lt;"),
        '>' => out.push_str("&gt;"),
        '"' => out.push_str("&quot;"),
        '\'' => out.push_str("&apos;"),
        '\u{a0}' => out.push_str("&nbsp;"),
        c => {
            let _ = write!(out, "&#x{:x};", c as u32);
        }
    }
}

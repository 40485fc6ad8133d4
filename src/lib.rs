//! domser - render parsed markup trees back to HTML or XML
//!
//! domser turns a tree of elements, text, comments, CDATA sections and
//! directives into its serialized "outer markup". SVG and MathML embedded in
//! HTML are written with their case-sensitive XML names, the way browsers
//! serialize foreign content.
//!
//! # Example
//!
//! ```rust
//! use domser::{parse_html, render_node, Options};
//!
//! let tree = parse_html("<input checked><svg viewbox='0 0 1 1'></svg>").unwrap();
//! assert_eq!(
//!     render_node(&tree, &Options::default()),
//!     r#"<input checked><svg viewBox="0 0 1 1"/>"#,
//! );
//! ```

#[macro_use]
mod tracing_macros;

mod ast;
mod entities;
mod error;
mod names;
mod parse;
mod serialize;

pub use ast::*;
pub use entities::{encode_xml, escape_attribute, escape_text, replace_quotes};
pub use error::*;
pub use parse::*;
pub use serialize::*;

/// Parse HTML and render it back with the given options.
pub fn rewrite_html(html: &str, options: &Options) -> Result<String, DomserError> {
    let tree = parse_html(html)?;
    Ok(render_node(&tree, options))
}

/// Parse XML and render it back with the given options.
pub fn rewrite_xml(xml: &str, options: &Options) -> Result<String, DomserError> {
    let tree = parse_xml(xml)?;
    Ok(render_node(&tree, options))
}

/// Serialization mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum XmlMode {
    /// HTML serialization rules
    #[default]
    Html,
    /// Strict XML serialization rules
    Xml,
    /// SVG/MathML inside HTML. Entered automatically at `<svg>` and `<math>`.
    Foreign,
}

impl XmlMode {
    /// True for both `Xml` and `Foreign`.
    pub fn is_xml(self) -> bool {
        self != XmlMode::Html
    }
}

/// How text and attribute values are escaped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodeEntities {
    /// Escape nothing but the double quotes inside attribute values
    No,
    /// Encode markup characters and all non-ASCII characters
    Yes,
    /// Escape only what HTML requires, keeping non-ASCII text as UTF-8
    Utf8,
}

/// Serialization options.
///
/// Unset fields fall back to defaults derived from `xml_mode`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Options {
    /// Serialization mode (default: HTML)
    pub xml_mode: XmlMode,
    /// Use `<tag/>` for childless elements. In HTML mode this only ever
    /// applies to void elements. Unset means "only in XML mode".
    pub self_closing_tags: Option<bool>,
    /// Write `attr=""` instead of a bare `attr` for empty values.
    /// Unset means "only in XML mode".
    pub empty_attrs: Option<bool>,
    /// Escaping strategy. Unset falls back to `decode_entities`.
    pub encode_entities: Option<EncodeEntities>,
    /// Legacy switch used when `encode_entities` is unset (default: true)
    pub decode_entities: Option<bool>,
}

impl Options {
    /// Create new default options (HTML mode).
    pub fn new() -> Self {
        Self::default()
    }

    /// Options for strict XML output.
    pub fn xml() -> Self {
        Self::new().xml_mode(XmlMode::Xml)
    }

    pub fn xml_mode(mut self, mode: XmlMode) -> Self {
        self.xml_mode = mode;
        self
    }

    /// Force foreign-content serialization from the root down.
    pub fn foreign_mode(self) -> Self {
        self.xml_mode(XmlMode::Foreign)
    }

    pub fn self_closing_tags(mut self, enabled: bool) -> Self {
        self.self_closing_tags = Some(enabled);
        self
    }

    pub fn empty_attrs(mut self, enabled: bool) -> Self {
        self.empty_attrs = Some(enabled);
        self
    }

    pub fn encode_entities(mut self, encode: EncodeEntities) -> Self {
        self.encode_entities = Some(encode);
        self
    }

    pub fn decode_entities(mut self, decode: bool) -> Self {
        self.decode_entities = Some(decode);
        self
    }

    /// The escaping strategy after applying the `decode_entities` fallback.
    pub fn effective_encoding(&self) -> EncodeEntities {
        match (self.encode_entities, self.decode_entities) {
            (Some(encode), _) => encode,
            (None, Some(false)) => EncodeEntities::No,
            (None, _) => EncodeEntities::Yes,
        }
    }

    /// A copy of these options with a different mode, for a foreign subtree.
    pub(crate) fn with_mode(&self, mode: XmlMode) -> Self {
        Self {
            xml_mode: mode,
            ..self.clone()
        }
    }
}

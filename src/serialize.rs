//! Markup serialization.
//!
//! Rendering follows the HTML fragment serialization rules, with the quirks
//! scraping libraries rely on:
//!
//! - Void elements never get end tags outside XML mode
//! - Text inside `script`, `style` and friends is not escaped in HTML mode
//! - `<svg>` and `<math>` switch to foreign mode, where names get their
//!   canonical mixed-case spelling and childless elements self-close
//! - Integration points (`foreignObject`, `mi`, `desc`, ...) switch their
//!   children back to HTML

use crate::ast::*;
use crate::entities::Encoder;
use crate::names::{
    foreign_attribute_name, foreign_element_name, is_foreign_root, is_integration_point,
    is_unencoded_element, is_void_element,
};
use crate::{EncodeEntities, Options, XmlMode};

/// Render a sequence of sibling nodes, concatenated in order.
pub fn render(nodes: &[Node], options: &Options) -> String {
    debug!(nodes = nodes.len(), mode = ?options.xml_mode, "render");
    let mut out = String::new();
    serialize_nodes(&mut out, nodes, None, options);
    out
}

/// Render a single node and its descendants.
pub fn render_node(node: &Node, options: &Options) -> String {
    render(std::slice::from_ref(node), options)
}

/// Render an element's children without its own tags.
///
/// The element is passed as the children's parent, so text inside `script`,
/// `style` and friends stays raw exactly as it does in the element's outer
/// markup. `options` is used as given.
pub fn render_children(elem: &Element, options: &Options) -> String {
    let mut out = String::new();
    serialize_nodes(&mut out, &elem.children, Some(&elem.name), options);
    out
}

impl Node {
    /// The node's markup with default (HTML) options.
    pub fn outer_html(&self) -> String {
        render_node(self, &Options::default())
    }
}

impl Element {
    /// The element's inner markup with default (HTML) options.
    pub fn inner_html(&self) -> String {
        render_children(self, &Options::default())
    }
}

/// Format an element's attributes as `key="value"` pairs joined by spaces.
///
/// In foreign mode attribute names are first mapped to their canonical
/// SVG/MathML spelling.
pub fn format_attributes(attributes: &[Attribute], options: &Options) -> String {
    let encoder = encoder_for(options);
    let foreign = options.xml_mode == XmlMode::Foreign;
    let bare_empty = options.empty_attrs != Some(true) && !options.xml_mode.is_xml();

    let mut out = String::new();
    for attr in attributes {
        let mut key = attr.name.as_str();
        if foreign {
            key = foreign_attribute_name(key).unwrap_or(key);
        }
        let value = attr.value.as_deref().unwrap_or("");

        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(key);
        if bare_empty && value.is_empty() {
            continue;
        }
        out.push_str("=\"");
        out.push_str(&encoder.attribute(value));
        out.push('"');
    }
    out
}

/// Pick the escaping strategy for a subtree rendered with `options`.
fn encoder_for(options: &Options) -> Encoder {
    match options.effective_encoding() {
        EncodeEntities::No => Encoder::QuotesOnly,
        EncodeEntities::Utf8 if !options.xml_mode.is_xml() => Encoder::Utf8,
        _ => Encoder::Xml,
    }
}

fn serialize_nodes(out: &mut String, nodes: &[Node], parent: Option<&str>, options: &Options) {
    for node in nodes {
        serialize_node(out, node, parent, options);
    }
}

fn serialize_node(out: &mut String, node: &Node, parent: Option<&str>, options: &Options) {
    match node {
        Node::Root(children) => serialize_nodes(out, children, None, options),
        Node::Element(elem) => serialize_element(out, elem, parent, options),
        Node::Text(text) => serialize_text(out, text, parent, options),
        Node::Comment(comment) => {
            out.push_str("<!--");
            out.push_str(comment);
            out.push_str("-->");
        }
        Node::CData(data) => {
            out.push_str("<![CDATA[");
            out.push_str(data);
            out.push_str("]]>");
        }
        Node::ProcessingInstruction(data) | Node::Doctype(data) => {
            out.push('<');
            out.push_str(data);
            out.push('>');
        }
    }
}

fn serialize_element(out: &mut String, elem: &Element, parent: Option<&str>, options: &Options) {
    let mut name = elem.name.as_str();
    let mut mode = options.xml_mode;

    if mode == XmlMode::Foreign {
        name = foreign_element_name(name).unwrap_or(name);
        if parent.is_some_and(is_integration_point) {
            trace!(element = name, "leaving foreign content");
            mode = XmlMode::Html;
        }
    }
    if !mode.is_xml() && is_foreign_root(name) {
        trace!(element = name, "entering foreign content");
        mode = XmlMode::Foreign;
    }

    // The override only reaches this element's subtree; siblings keep `options`.
    let overridden;
    let options = if mode == options.xml_mode {
        options
    } else {
        overridden = options.with_mode(mode);
        &overridden
    };
    let xml = options.xml_mode.is_xml();

    out.push('<');
    out.push_str(name);
    let attrs = format_attributes(&elem.attributes, options);
    if !attrs.is_empty() {
        out.push(' ');
        out.push_str(&attrs);
    }

    if elem.children.is_empty() && self_closes(name, options) {
        if !xml {
            out.push(' ');
        }
        out.push_str("/>");
    } else {
        out.push('>');
        serialize_nodes(out, &elem.children, Some(name), options);

        if xml || !is_void_element(name) {
            out.push_str("</");
            out.push_str(name);
            out.push('>');
        }
    }
}

fn self_closes(name: &str, options: &Options) -> bool {
    if options.xml_mode.is_xml() {
        options.self_closing_tags != Some(false)
    } else {
        options.self_closing_tags == Some(true) && is_void_element(name)
    }
}

fn serialize_text(out: &mut String, text: &str, parent: Option<&str>, options: &Options) {
    if !options.xml_mode.is_xml() && parent.is_some_and(is_unencoded_element) {
        out.push_str(text);
    } else {
        out.push_str(&encoder_for(options).text(text));
    }
}

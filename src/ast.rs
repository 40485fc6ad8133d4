//! Markup tree consumed by the renderer.

/// A node in a parsed markup tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// A document or fragment root
    Root(Vec<Node>),
    /// An element node (ordinary tag, `script` or `style`)
    Element(Element),
    /// A text node
    Text(String),
    /// A comment node
    Comment(String),
    /// A CDATA section, holding the text of its single text child
    CData(String),
    /// A processing instruction, stored as the raw data between `<` and `>`
    /// (e.g. `?xml version="1.0"?`)
    ProcessingInstruction(String),
    /// A doctype declaration, stored as the raw data between `<` and `>`
    /// (e.g. `!DOCTYPE html`)
    Doctype(String),
}

/// Which flavor of element this is.
///
/// Parsers tag `script` and `style` separately because their content is raw
/// text; all three are rendered the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ElementKind {
    #[default]
    Tag,
    Script,
    Style,
}

impl ElementKind {
    /// Classify an element by its name.
    pub fn for_name(name: &str) -> Self {
        match name {
            "script" => ElementKind::Script,
            "style" => ElementKind::Style,
            _ => ElementKind::Tag,
        }
    }
}

/// An element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Element name as produced by the parser (e.g. "div", "radialgradient", "svg:rect")
    pub name: String,
    pub kind: ElementKind,
    /// Attributes, in source order
    pub attributes: Vec<Attribute>,
    /// Child nodes
    pub children: Vec<Node>,
}

/// An attribute on an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    /// `None` for boolean-style attributes written without a value
    pub value: Option<String>,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: Some(value.into()),
        }
    }

    /// A boolean-style attribute with no value (e.g. `checked`).
    pub fn boolean(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
        }
    }
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            kind: ElementKind::for_name(&name),
            name,
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Builder: append an attribute with a value.
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push(Attribute::new(name, value));
        self
    }

    /// Builder: append a valueless attribute.
    pub fn with_bool_attr(mut self, name: impl Into<String>) -> Self {
        self.attributes.push(Attribute::boolean(name));
        self
    }

    /// Builder: append a child node.
    pub fn with_child(mut self, child: impl Into<Node>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Get an attribute value by name. Valueless attributes read as `""`.
    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_deref().unwrap_or(""))
    }
}

impl Node {
    /// Shorthand for a text node.
    pub fn text(data: impl Into<String>) -> Self {
        Node::Text(data.into())
    }

    /// Children of root and element nodes; empty for leaves.
    pub fn children(&self) -> &[Node] {
        match self {
            Node::Root(children) => children,
            Node::Element(e) => &e.children,
            _ => &[],
        }
    }
}

impl From<Element> for Node {
    fn from(e: Element) -> Self {
        Node::Element(e)
    }
}

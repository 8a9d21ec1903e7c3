//! Minimal HTML tree used by the summary report.
//!
//! Elements are assembled as values and serialized in one pass, so every
//! start tag gets its matching end tag and all text and attribute values go
//! through the same escaping.

use quick_xml::escape::escape;

/// Elements that never carry children or an end tag.
const VOID_ELEMENTS: &[&str] = &["br", "meta", "hr"];

#[derive(Debug, Clone)]
pub enum Node {
    Element(Element),
    Text(String),
    /// Pre-escaped content such as a stylesheet body.
    Raw(String),
}

impl From<Element> for Node {
    fn from(e: Element) -> Self {
        Node::Element(e)
    }
}

impl From<&str> for Node {
    fn from(s: &str) -> Self {
        Node::Text(s.to_string())
    }
}

impl From<String> for Node {
    fn from(s: String) -> Self {
        Node::Text(s)
    }
}

#[derive(Debug, Clone)]
pub struct Element {
    tag: &'static str,
    attrs: Vec<(&'static str, String)>,
    children: Vec<Node>,
}

impl Element {
    pub fn new(tag: &'static str) -> Self {
        Self {
            tag,
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn attr(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.attrs.push((name, value.into()));
        self
    }

    #[must_use]
    pub fn child(mut self, node: impl Into<Node>) -> Self {
        self.children.push(node.into());
        self
    }

    #[must_use]
    pub fn children<I, N>(mut self, nodes: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<Node>,
    {
        self.children.extend(nodes.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn text(self, text: impl Into<String>) -> Self {
        self.child(Node::Text(text.into()))
    }

    pub fn push(&mut self, node: impl Into<Node>) {
        self.children.push(node.into());
    }

    pub fn render(&self, out: &mut String) {
        out.push('<');
        out.push_str(self.tag);
        for (name, value) in &self.attrs {
            out.push(' ');
            out.push_str(name);
            out.push_str("=\"");
            out.push_str(&escape(value.as_str()));
            out.push('"');
        }
        if VOID_ELEMENTS.contains(&self.tag) {
            out.push_str("/>");
            return;
        }
        out.push('>');
        for child in &self.children {
            child.render(out);
        }
        out.push_str("</");
        out.push_str(self.tag);
        out.push('>');
    }
}

impl Node {
    pub fn render(&self, out: &mut String) {
        match self {
            Node::Element(e) => e.render(out),
            Node::Text(t) => out.push_str(&escape(t.as_str())),
            Node::Raw(r) => out.push_str(r),
        }
    }
}

/// Shorthand for `<br/>`.
pub fn br() -> Element {
    Element::new("br")
}

/// Serialize a full document with the HTML5 doctype.
#[must_use]
pub fn document(root: &Element) -> String {
    let mut out = String::from("<!DOCTYPE html>\n");
    root.render(&mut out);
    out.push('\n');
    out
}

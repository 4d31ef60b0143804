//! Minimal XML element tree with a deterministic pretty printer.

use std::borrow::Cow;
use std::fmt::Write;

const INDENT: &str = "  ";

/// An XML element with attributes and either text or child elements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlElement {
    name: String,
    attributes: Vec<(String, String)>,
    text: Option<String>,
    children: Vec<XmlElement>,
}

impl XmlElement {
    pub fn new(name: impl Into<String>) -> Self {
        XmlElement {
            name: name.into(),
            attributes: Vec::new(),
            text: None,
            children: Vec::new(),
        }
    }

    /// Add an attribute. Attributes render in insertion order.
    pub fn attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((key.into(), value.into()));
        self
    }

    /// Set the text content. Ignored when the element has children.
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn child(mut self, child: XmlElement) -> Self {
        self.children.push(child);
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = XmlElement>) -> Self {
        self.children.extend(children);
        self
    }

    /// Shorthand for a child holding only text.
    pub fn child_text(self, name: impl Into<String>, text: impl Into<String>) -> Self {
        self.child(XmlElement::new(name).text(text))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Direct children with the given name.
    pub fn find_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    fn write_to(&self, out: &mut String, depth: usize) {
        let pad = INDENT.repeat(depth);
        let _ = write!(out, "{}<{}", pad, self.name);
        for (key, value) in &self.attributes {
            let _ = write!(out, " {}=\"{}\"", key, escape(value, true));
        }

        if !self.children.is_empty() {
            out.push_str(">\n");
            for child in &self.children {
                child.write_to(out, depth + 1);
            }
            let _ = writeln!(out, "{}</{}>", pad, self.name);
        } else if let Some(ref text) = self.text {
            let _ = writeln!(out, ">{}</{}>", escape(text, false), self.name);
        } else {
            out.push_str("/>\n");
        }
    }
}

/// A complete XML document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlDocument {
    root: XmlElement,
    declaration: bool,
}

impl XmlDocument {
    /// A document with an XML declaration.
    pub fn new(root: XmlElement) -> Self {
        XmlDocument {
            root,
            declaration: true,
        }
    }

    /// Omit the `<?xml ...?>` declaration.
    pub fn without_declaration(mut self) -> Self {
        self.declaration = false;
        self
    }

    pub fn root(&self) -> &XmlElement {
        &self.root
    }

    /// Serialize with two-space indentation and a trailing newline.
    pub fn render(&self) -> String {
        let mut out = String::new();
        if self.declaration {
            out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        }
        self.root.write_to(&mut out, 0);
        out
    }
}

fn escape(input: &str, attribute: bool) -> Cow<'_, str> {
    let needs_escape = |c: char| matches!(c, '&' | '<' | '>') || (attribute && c == '"');
    if !input.chars().any(needs_escape) {
        return Cow::Borrowed(input);
    }

    let mut escaped = String::with_capacity(input.len() + 8);
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' if attribute => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    Cow::Owned(escaped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_nested() {
        let doc = XmlDocument::new(
            XmlElement::new("settings")
                .child(XmlElement::new("mirrors").child(XmlElement::new("mirror").child_text("id", "m")))
                .child(XmlElement::new("empty").attr("name", "x")),
        );

        assert_eq!(
            doc.render(),
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
             <settings>\n  <mirrors>\n    <mirror>\n      <id>m</id>\n    </mirror>\n  </mirrors>\n  <empty name=\"x\"/>\n</settings>\n"
        );
    }

    #[test]
    fn test_without_declaration() {
        let doc = XmlDocument::new(XmlElement::new("a").text("b")).without_declaration();
        assert_eq!(doc.render(), "<a>b</a>\n");
    }

    #[test]
    fn test_escaping() {
        let doc = XmlDocument::new(
            XmlElement::new("url")
                .attr("q", "a\"b&c")
                .text("http://x/?a=1&b=<2>"),
        )
        .without_declaration();

        assert_eq!(
            doc.render(),
            "<url q=\"a&quot;b&amp;c\">http://x/?a=1&amp;b=&lt;2&gt;</url>\n"
        );
    }

    #[test]
    fn test_ivy_pattern_passes_through() {
        let pattern = "[organisation]/[module]/[revision]/[module]-[revision](-[classifier]).[ext]";
        assert!(matches!(escape(pattern, true), Cow::Borrowed(_)));
    }

    #[test]
    fn test_find_all() {
        let el = XmlElement::new("toolchains")
            .child(XmlElement::new("toolchain"))
            .child(XmlElement::new("other"))
            .child(XmlElement::new("toolchain"));
        assert_eq!(el.find_all("toolchain").count(), 2);
    }
}

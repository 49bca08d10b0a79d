//! Owned XML tree for the OXT descriptor files.
//!
//! The tree keeps what the descriptors need to survive a load/edit/save
//! cycle: qualified tags, attribute order, namespace declarations, text,
//! comments and the DOCTYPE. Parsing and serialization go through
//! `quick-xml`; whitespace-only text between elements is dropped on load and
//! regenerated by the indenting writer.
mod parse;
mod path;
mod write;

pub use parse::parse_document;
pub use path::{Location, NamespaceMap, Scope};
pub use write::{serialize_document, write_document};

/// A node inside an element or around the root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
    Comment(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Qualified tag as written (`prefix:local` or `local`).
    pub name: String,
    /// Attributes in document order, namespace declarations included.
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// DOCTYPE body without the `<!DOCTYPE` and `>` delimiters.
    pub doctype: Option<String>,
    pub prolog: Vec<Node>,
    pub root: Element,
    pub epilog: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, name: &str, value: &str) -> Self {
        self.set_attribute(name, value);
        self
    }

    pub fn local_name(&self) -> &str {
        split_qualified(&self.name).1
    }

    pub fn prefix(&self) -> Option<&str> {
        split_qualified(&self.name).0
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Replace the value of `name` in place, or append it.
    pub fn set_attribute(&mut self, name: &str, value: &str) {
        match self.attributes.iter_mut().find(|(key, _)| key == name) {
            Some((_, existing)) => *existing = value.to_string(),
            None => self
                .attributes
                .push((name.to_string(), value.to_string())),
        }
    }

    /// Namespace declarations carried by this element as `(prefix, uri)`;
    /// the default namespace uses the empty prefix.
    pub fn declarations(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes.iter().filter_map(|(key, value)| {
            if key == "xmlns" {
                Some(("", value.as_str()))
            } else {
                key.strip_prefix("xmlns:")
                    .map(|prefix| (prefix, value.as_str()))
            }
        })
    }

    /// Text before the first non-text child, if any.
    pub fn text(&self) -> Option<&str> {
        match self.children.first() {
            Some(Node::Text(text)) => Some(text.as_str()),
            _ => None,
        }
    }

    pub fn set_text(&mut self, text: &str) {
        match self.children.first_mut() {
            Some(Node::Text(existing)) => *existing = text.to_string(),
            _ => self.children.insert(0, Node::Text(text.to_string())),
        }
    }

    /// Append a child element and return its index among `children`.
    pub fn push_element(&mut self, element: Element) -> usize {
        self.children.push(Node::Element(element));
        self.children.len() - 1
    }

    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(element) => Some(element),
            _ => None,
        })
    }

    /// Follow child indices from this element.
    #[cfg(test)]
    pub fn descendant(&self, path: &[usize]) -> Option<&Element> {
        let mut current = self;
        for index in path {
            current = match current.children.get(*index) {
                Some(Node::Element(element)) => element,
                _ => return None,
            };
        }
        Some(current)
    }

    pub fn descendant_mut(&mut self, path: &[usize]) -> Option<&mut Element> {
        let mut current = self;
        for index in path {
            current = match current.children.get_mut(*index) {
                Some(Node::Element(element)) => element,
                _ => return None,
            };
        }
        Some(current)
    }

    fn comments_mut<'a>(&'a mut self, out: &mut Vec<&'a mut String>) {
        for child in &mut self.children {
            match child {
                Node::Comment(text) => out.push(text),
                Node::Element(element) => element.comments_mut(out),
                Node::Text(_) => {}
            }
        }
    }
}

impl Document {
    pub fn new(root: Element) -> Self {
        Self {
            doctype: None,
            prolog: Vec::new(),
            root,
            epilog: Vec::new(),
        }
    }

    pub fn with_doctype(mut self, doctype: &str) -> Self {
        self.doctype = Some(doctype.to_string());
        self
    }

    /// Every comment in document order, prolog and epilog included.
    pub fn comments_mut(&mut self) -> Vec<&mut String> {
        let Document {
            prolog,
            root,
            epilog,
            ..
        } = self;
        let mut out = Vec::new();
        for node in prolog.iter_mut() {
            if let Node::Comment(text) = node {
                out.push(text);
            }
        }
        root.comments_mut(&mut out);
        for node in epilog.iter_mut() {
            if let Node::Comment(text) = node {
                out.push(text);
            }
        }
        out
    }

    /// Drop every comment `keep` rejects; comments are offered in document
    /// order.
    pub fn retain_comments(&mut self, mut keep: impl FnMut(&str) -> bool) {
        retain_comments_in(&mut self.prolog, &mut keep);
        retain_comments_in(&mut self.root.children, &mut keep);
        retain_comments_in(&mut self.epilog, &mut keep);
    }

    /// Namespace bindings in scope at the element reached by `path`.
    pub fn scope_at(&self, path: &[usize]) -> Scope {
        let mut current = &self.root;
        let mut scope = Scope::default().extended(current);
        for index in path {
            match current.children.get(*index) {
                Some(Node::Element(element)) => {
                    current = element;
                    scope = scope.extended(current);
                }
                _ => break,
            }
        }
        scope
    }
}

fn retain_comments_in(nodes: &mut Vec<Node>, keep: &mut dyn FnMut(&str) -> bool) {
    nodes.retain_mut(|node| match node {
        Node::Comment(text) => keep(text.as_str()),
        Node::Element(element) => {
            retain_comments_in(&mut element.children, &mut *keep);
            true
        }
        Node::Text(_) => true,
    });
}

pub(crate) fn split_qualified(name: &str) -> (Option<&str>, &str) {
    match name.split_once(':') {
        Some((prefix, local)) => (Some(prefix), local),
        None => (None, name),
    }
}

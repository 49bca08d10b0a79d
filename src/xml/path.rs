//! Location strings (`/xmlns:description/xmlns:identifier`) and their
//! resolution against a [`Document`].
//!
//! Resolution is two-tier: an exact match on local name plus namespace URI,
//! then a retry on local names alone so that documents written without the
//! expected namespace still line up with the schema.
use super::{split_qualified, Document, Element, Node};
use std::fmt;

/// One `prefix:local` segment of a location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub prefix: Option<String>,
    pub local: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    steps: Vec<Step>,
}

/// Fixed prefix aliases used by location strings; `xmlns` names the
/// default namespace.
#[derive(Debug, Clone, Copy)]
pub struct NamespaceMap {
    entries: &'static [(&'static str, &'static str)],
}

/// In-scope namespace bindings while walking a tree.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    bindings: Vec<(String, String)>,
}

impl Location {
    pub fn parse(raw: &str) -> Self {
        let steps = raw
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(|segment| {
                let (prefix, local) = split_qualified(segment);
                Step {
                    prefix: prefix.map(str::to_string),
                    local: local.to_string(),
                }
            })
            .collect();
        Self { steps }
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn leaf(&self) -> Option<&Step> {
        self.steps.last()
    }

    /// The enclosing location; `None` for the root location.
    pub fn parent(&self) -> Option<Location> {
        if self.steps.len() < 2 {
            return None;
        }
        Some(Self {
            steps: self.steps[..self.steps.len() - 1].to_vec(),
        })
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for step in &self.steps {
            match &step.prefix {
                Some(prefix) => write!(f, "/{prefix}:{}", step.local)?,
                None => write!(f, "/{}", step.local)?,
            }
        }
        Ok(())
    }
}

impl NamespaceMap {
    pub const fn new(entries: &'static [(&'static str, &'static str)]) -> Self {
        Self { entries }
    }

    pub fn uri(&self, alias: &str) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|(key, _)| *key == alias)
            .map(|(_, uri)| *uri)
    }

    /// Declarations to put on a freshly generated root; the `xmlns` alias
    /// becomes the default namespace.
    pub fn declarations(&self) -> impl Iterator<Item = (String, &'static str)> + '_ {
        self.entries.iter().map(|(alias, uri)| {
            let key = if *alias == "xmlns" {
                "xmlns".to_string()
            } else {
                format!("xmlns:{alias}")
            };
            (key, *uri)
        })
    }
}

impl Scope {
    pub fn extended(&self, element: &Element) -> Self {
        let mut bindings = self.bindings.clone();
        bindings.extend(
            element
                .declarations()
                .map(|(prefix, uri)| (prefix.to_string(), uri.to_string())),
        );
        Self { bindings }
    }

    /// URI bound to `prefix` (empty for the default namespace); an empty
    /// binding (`xmlns=""`) counts as unbound.
    pub fn resolve(&self, prefix: &str) -> Option<&str> {
        self.bindings
            .iter()
            .rev()
            .find(|(bound, _)| bound == prefix)
            .map(|(_, uri)| uri.as_str())
            .filter(|uri| !uri.is_empty())
    }

    /// A prefix currently bound to `uri`, trying `preferred` first. The
    /// default namespace is reported as `Some("")`.
    pub fn prefix_for(&self, uri: &str, preferred: Option<&str>) -> Option<String> {
        if let Some(preferred) = preferred {
            if self.resolve(preferred) == Some(uri) {
                return Some(preferred.to_string());
            }
        }
        self.bindings
            .iter()
            .rev()
            .map(|(prefix, _)| prefix)
            .find(|prefix| self.resolve(prefix) == Some(uri))
            .cloned()
    }

    pub fn namespace_of(&self, element: &Element) -> Option<&str> {
        self.resolve(element.prefix().unwrap_or(""))
    }
}

impl Document {
    /// Index path of the first element matching `location`, trying the
    /// namespace-aware match before the local-name-only one.
    pub fn resolve(&self, location: &Location, namespaces: &NamespaceMap) -> Option<Vec<usize>> {
        find_path(&self.root, location.steps(), namespaces, true)
            .or_else(|| find_path(&self.root, location.steps(), namespaces, false))
    }

    pub fn element_mut(&mut self, path: &[usize]) -> Option<&mut Element> {
        self.root.descendant_mut(path)
    }
}

fn find_path(
    root: &Element,
    steps: &[Step],
    namespaces: &NamespaceMap,
    strict: bool,
) -> Option<Vec<usize>> {
    let (first, rest) = steps.split_first()?;
    let root_scope = Scope::default().extended(root);
    if !step_matches(root, &root_scope, first, namespaces, strict) {
        return None;
    }

    // Frontier stays in document order, so the first survivor is the first
    // match in the document.
    let mut frontier = vec![(Vec::new(), root, root_scope)];
    for step in rest {
        let mut next = Vec::new();
        for (path, element, scope) in &frontier {
            for (index, child) in element.children.iter().enumerate() {
                let Node::Element(child) = child else {
                    continue;
                };
                let child_scope = scope.extended(child);
                if step_matches(child, &child_scope, step, namespaces, strict) {
                    let mut child_path = path.clone();
                    child_path.push(index);
                    next.push((child_path, child, child_scope));
                }
            }
        }
        if next.is_empty() {
            return None;
        }
        frontier = next;
    }
    frontier.into_iter().next().map(|(path, _, _)| path)
}

fn step_matches(
    element: &Element,
    scope: &Scope,
    step: &Step,
    namespaces: &NamespaceMap,
    strict: bool,
) -> bool {
    if element.local_name() != step.local {
        return false;
    }
    if !strict {
        return true;
    }
    let expected = match &step.prefix {
        Some(prefix) => match namespaces.uri(prefix) {
            Some(uri) => Some(uri),
            None => return false,
        },
        None => None,
    };
    scope.namespace_of(element) == expected
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::parse_document;

    const NAMESPACES: NamespaceMap = NamespaceMap::new(&[
        ("xmlns", "urn:desc"),
        ("xlink", "urn:link"),
    ]);

    #[test]
    fn location_parse_and_parent() {
        let location = Location::parse("/xmlns:description/xmlns:publisher/xmlns:name");
        assert_eq!(location.steps().len(), 3);
        assert_eq!(location.leaf().map(|step| step.local.as_str()), Some("name"));
        let parent = location.parent().expect("parent");
        assert_eq!(parent.to_string(), "/xmlns:description/xmlns:publisher");
        assert!(Location::parse("/xmlns:description").parent().is_none());
    }

    #[test]
    fn resolves_default_namespace_elements() {
        let document = parse_document(
            r#"<description xmlns="urn:desc"><identifier value="a"/><version value="1"/></description>"#,
        )
        .expect("parse");
        let path = document
            .resolve(&Location::parse("/xmlns:description/xmlns:version"), &NAMESPACES)
            .expect("version");
        assert_eq!(path, vec![1]);
    }

    #[test]
    fn resolves_explicit_prefix_bound_to_same_uri() {
        let document = parse_document(
            r#"<d:description xmlns:d="urn:desc"><d:identifier value="a"/></d:description>"#,
        )
        .expect("parse");
        let location = Location::parse("/xmlns:description/xmlns:identifier");
        assert_eq!(
            find_path(&document.root, location.steps(), &NAMESPACES, true),
            Some(vec![0])
        );
    }

    #[test]
    fn falls_back_to_local_names_without_namespace() {
        let document =
            parse_document(r#"<description><identifier value="a"/></description>"#).expect("parse");
        let location = Location::parse("/xmlns:description/xmlns:identifier");
        assert!(find_path(&document.root, location.steps(), &NAMESPACES, true).is_none());
        assert_eq!(document.resolve(&location, &NAMESPACES), Some(vec![0]));
    }

    #[test]
    fn first_match_in_document_order_wins() {
        let document = parse_document(
            r#"<description xmlns="urn:desc">
                 <publisher><name>first</name></publisher>
                 <publisher><name>second</name></publisher>
               </description>"#,
        )
        .expect("parse");
        let path = document
            .resolve(
                &Location::parse("/xmlns:description/xmlns:publisher/xmlns:name"),
                &NAMESPACES,
            )
            .expect("name");
        let element = document.root.descendant(&path).expect("element");
        assert_eq!(element.text(), Some("first"));
    }

    #[test]
    fn scope_prefers_requested_prefix() {
        let root = Element::new("root")
            .with_attribute("xmlns", "urn:desc")
            .with_attribute("xmlns:dep", "urn:desc");
        let scope = Scope::default().extended(&root);
        assert_eq!(scope.prefix_for("urn:desc", Some("dep")), Some("dep".to_string()));
        assert_eq!(scope.prefix_for("urn:link", Some("xlink")), None);
        assert_eq!(scope.namespace_of(&root), Some("urn:desc"));
    }
}

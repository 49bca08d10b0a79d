//! `description.xml` verification and repair.
//!
//! The document is brought in line with a [`DocumentSchema`]: missing
//! elements are created parent-first, missing attribute and text values are
//! filled from prompts (guided) or with [`INCOMPLETE_TEXT`], and existing
//! values are left alone. The file is rewritten only when the serialized
//! tree changed.
use crate::error::BuildError;
use crate::prompt::{ask, Prompter};
use crate::schema::{
    is_missing, is_prompt, packaging_comment, DocumentSchema, DESCRIPTION_DOC_COMMENT,
    INCOMPLETE_TEXT, PACKAGING_COMMENT_PREFIX,
};
use crate::xml::{
    parse_document, serialize_document, write_document, Document, Element, Location,
    NamespaceMap, Node, Scope,
};
use anyhow::{anyhow, Context, Result};
use serde::Serialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DescriptionState {
    Created,
    Updated,
    Unchanged,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconcileOutcome {
    pub state: DescriptionState,
    /// Fields still empty or holding the sentinel, as `element/path@attr`
    /// or `element/path#text`.
    pub incomplete: Vec<String>,
}

/// Make the document at `path` satisfy `schema`, asking `prompter` for
/// missing values when one is given.
pub fn reconcile(
    path: &Path,
    schema: &DocumentSchema,
    mut prompter: Option<&mut dyn Prompter>,
) -> Result<ReconcileOutcome> {
    let loaded = load_document(path)?;
    let created = loaded.is_none();
    let mut document = match loaded {
        Some(document) => document,
        None => fresh_document(schema)?,
    };
    let before = serialize_document(&document)?;

    ensure_comment(&mut document, DESCRIPTION_DOC_COMMENT);
    ensure_packaging_comment(&mut document);

    let mut incomplete = Vec::new();
    for entry in schema.entries {
        let location = Location::parse(entry.location);
        let element_path = ensure_element(&mut document, &location, &schema.namespaces, path)?;
        let label = field_label(&location);

        for (name, fallback) in entry.attributes {
            let scope = document.scope_at(&element_path);
            let element = document
                .element_mut(&element_path)
                .ok_or_else(|| anyhow!("lost element {location}"))?;
            let (key, declaration) = attribute_key(element, &scope, name, &schema.namespaces);
            if is_missing(element.attribute(&key)) {
                let value = match prompter.as_mut() {
                    Some(prompter) => guided_value(&mut **prompter, fallback)?,
                    None => INCOMPLETE_TEXT.to_string(),
                };
                if let Some((declaration, uri)) = declaration {
                    element.set_attribute(&declaration, uri);
                }
                element.set_attribute(&key, &value);
            }
            if is_missing(element.attribute(&key)) {
                incomplete.push(format!("{label}@{name}"));
            }
        }

        if let Some(fallback) = entry.text {
            let element = document
                .element_mut(&element_path)
                .ok_or_else(|| anyhow!("lost element {location}"))?;
            if is_missing(element.text()) {
                let value = match prompter.as_mut() {
                    Some(prompter) => guided_value(&mut **prompter, fallback)?,
                    None => INCOMPLETE_TEXT.to_string(),
                };
                element.set_text(&value);
            }
            if is_missing(element.text()) {
                incomplete.push(format!("{label}#text"));
            }
        }
    }

    let after = serialize_document(&document)?;
    tracing::debug!(
        document = %String::from_utf8_lossy(&after),
        "reconciled {}",
        path.display()
    );
    let state = if created {
        DescriptionState::Created
    } else if after != before {
        DescriptionState::Updated
    } else {
        DescriptionState::Unchanged
    };
    if after != before {
        write_document(path, &document)?;
    }
    Ok(ReconcileOutcome { state, incomplete })
}

/// `None` when the file is absent or empty.
fn load_document(path: &Path) -> Result<Option<Document>> {
    if !path.is_file() {
        tracing::info!("Creating new \"{}\".", file_label(path));
        return Ok(None);
    }
    tracing::info!("Verifying existing \"{}\".", file_label(path));
    let bytes = fs::read(path).with_context(|| format!("read {}", path.display()))?;
    let text = String::from_utf8(bytes).map_err(|err| BuildError::XmlParse {
        path: path.to_path_buf(),
        detail: err.to_string(),
    })?;
    match parse_document(&text) {
        Ok(document) => Ok(Some(document)),
        Err(_) if text.trim().is_empty() => Ok(None),
        Err(err) => Err(BuildError::XmlParse {
            path: path.to_path_buf(),
            detail: err.to_string(),
        }
        .into()),
    }
}

fn fresh_document(schema: &DocumentSchema) -> Result<Document> {
    let root_name = schema
        .entries
        .first()
        .and_then(|entry| Location::parse(entry.location).leaf().cloned())
        .ok_or_else(|| anyhow!("schema has no root entry"))?;
    let mut root = Element::new(root_name.local);
    for (key, uri) in schema.namespaces.declarations() {
        root.set_attribute(&key, uri);
    }
    Ok(Document::new(root))
}

fn ensure_comment(document: &mut Document, text: &str) {
    keep_first_comment(document, |comment| comment == text);
    if document
        .comments_mut()
        .iter()
        .any(|comment| comment.trim() == text)
    {
        return;
    }
    document
        .root
        .children
        .insert(0, Node::Comment(text.to_string()));
}

/// A packaging comment from another version is rewritten in place; extra
/// copies are removed.
fn ensure_packaging_comment(document: &mut Document) {
    let current = packaging_comment();
    keep_first_comment(document, |comment| {
        comment.starts_with(PACKAGING_COMMENT_PREFIX)
    });
    let existing = document
        .comments_mut()
        .into_iter()
        .find(|comment| comment.trim().starts_with(PACKAGING_COMMENT_PREFIX));
    match existing {
        Some(comment) => {
            if comment.trim() != current {
                *comment = current;
            }
        }
        None => document.root.children.insert(0, Node::Comment(current)),
    }
}

/// Remove all but the first comment whose trimmed text satisfies `matches`.
fn keep_first_comment(document: &mut Document, matches: impl Fn(&str) -> bool) {
    let mut seen = false;
    document.retain_comments(|comment| {
        if !matches(comment.trim()) {
            return true;
        }
        let first = !seen;
        seen = true;
        first
    });
}

/// Index path of the element at `location`, creating it under its parent if
/// neither lookup finds it.
fn ensure_element(
    document: &mut Document,
    location: &Location,
    namespaces: &NamespaceMap,
    path: &Path,
) -> Result<Vec<usize>> {
    if let Some(found) = document.resolve(location, namespaces) {
        return Ok(found);
    }
    let leaf = location
        .leaf()
        .ok_or_else(|| anyhow!("empty schema location"))?;
    let Some(parent_location) = location.parent() else {
        return Err(BuildError::UnexpectedRoot {
            path: path.to_path_buf(),
            found: document.root.name.clone(),
            expected: leaf.local.clone(),
        }
        .into());
    };
    let parent_path = document
        .resolve(&parent_location, namespaces)
        .ok_or_else(|| anyhow!("{location} declared before its parent {parent_location}"))?;

    let uri = leaf.prefix.as_deref().and_then(|prefix| namespaces.uri(prefix));
    let element = element_in_namespace(&document.scope_at(&parent_path), &leaf.local, uri);
    let parent = document
        .element_mut(&parent_path)
        .ok_or_else(|| anyhow!("lost element {parent_location}"))?;
    let index = parent.push_element(element);
    tracing::debug!(%location, "created element");

    let mut created = parent_path;
    created.push(index);
    Ok(created)
}

/// New element named so that it lands in `uri` under `scope`.
fn element_in_namespace(scope: &Scope, local: &str, uri: Option<&str>) -> Element {
    let Some(uri) = uri else {
        return match scope.resolve("") {
            Some(_) => Element::new(local).with_attribute("xmlns", ""),
            None => Element::new(local),
        };
    };
    match scope.prefix_for(uri, Some("")) {
        Some(prefix) if prefix.is_empty() => Element::new(local),
        Some(prefix) => Element::new(format!("{prefix}:{local}")),
        None => Element::new(local).with_attribute("xmlns", uri),
    }
}

/// Attribute name to read and write for the schema attribute `name`, plus
/// a namespace declaration to add when its prefix is not in scope.
fn attribute_key(
    element: &Element,
    scope: &Scope,
    name: &str,
    namespaces: &NamespaceMap,
) -> (String, Option<(String, &'static str)>) {
    let Some((prefix, local)) = name.split_once(':') else {
        return (name.to_string(), None);
    };
    let Some(uri) = namespaces.uri(prefix) else {
        return (name.to_string(), None);
    };

    let existing = element.attributes.iter().find_map(|(key, _)| {
        let (key_prefix, key_local) = key.split_once(':')?;
        let matches = key_prefix != "xmlns"
            && key_local == local
            && scope.resolve(key_prefix) == Some(uri);
        matches.then(|| key.clone())
    });
    if let Some(key) = existing {
        return (key, None);
    }
    if element.attribute(name).is_some() {
        return (name.to_string(), None);
    }
    match scope
        .prefix_for(uri, Some(prefix))
        .filter(|bound| !bound.is_empty())
    {
        Some(bound) => (format!("{bound}:{local}"), None),
        None => (name.to_string(), Some((format!("xmlns:{prefix}"), uri))),
    }
}

fn guided_value(prompter: &mut dyn Prompter, fallback: &str) -> Result<String> {
    if is_prompt(fallback) {
        ask(prompter, fallback)
    } else {
        Ok(fallback.to_string())
    }
}

fn field_label(location: &Location) -> String {
    location
        .steps()
        .iter()
        .map(|step| step.local.as_str())
        .collect::<Vec<_>>()
        .join("/")
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

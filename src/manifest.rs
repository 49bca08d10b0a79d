//! `META-INF/manifest.xml` generation and readback.
use crate::files::filter_files;
use crate::schema::{MANIFEST_DOCTYPE, MANIFEST_NS, MIME_BASE};
use crate::xml::{parse_document, serialize_document, write_document, Document, Element, Scope};
use anyhow::{anyhow, Context, Result};
use serde::Serialize;
use std::path::Path;

/// One `manifest:file-entry`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestEntry {
    pub full_path: String,
    pub media_type: String,
}

/// Rewrite the manifest at `manifest_path` from the files found under the
/// source folder two levels up.
///
/// `table` maps a file extension to the media-type suffix appended to
/// `application/vnd.sun.star`.
pub fn generate_manifest(
    manifest_path: &Path,
    table: &[(&str, &str)],
) -> Result<Vec<ManifestEntry>> {
    let root = manifest_path
        .parent()
        .and_then(Path::parent)
        .ok_or_else(|| anyhow!("manifest {} has no source folder", manifest_path.display()))?;

    let mut entries = Vec::new();
    for (extension, suffix) in table {
        for path in filter_files(&[*extension], root) {
            let Ok(relative) = path.strip_prefix(root) else {
                continue;
            };
            let full_path = relative
                .components()
                .map(|component| component.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            entries.push(ManifestEntry {
                full_path,
                media_type: format!("{MIME_BASE}{suffix}"),
            });
        }
    }

    let mut root_element =
        Element::new("manifest:manifest").with_attribute("xmlns:manifest", MANIFEST_NS);
    for entry in &entries {
        root_element.push_element(
            Element::new("manifest:file-entry")
                .with_attribute("manifest:media-type", &entry.media_type)
                .with_attribute("manifest:full-path", &entry.full_path),
        );
    }
    let document = Document::new(root_element).with_doctype(MANIFEST_DOCTYPE);
    tracing::debug!(
        document = %String::from_utf8_lossy(&serialize_document(&document)?),
        "generated manifest"
    );
    write_document(manifest_path, &document)?;
    tracing::info!(
        entries = entries.len(),
        "wrote {}",
        manifest_path.display()
    );
    Ok(entries)
}

/// `full-path` of every file entry in a manifest document, in document
/// order. Entries are matched by namespace, whatever prefix the document
/// binds to it.
pub fn manifest_paths(xml: &str) -> Result<Vec<String>> {
    let document = parse_document(xml).context("parse archived manifest")?;
    let mut paths = Vec::new();
    collect_full_paths(&document.root, &Scope::default(), &mut paths);
    Ok(paths)
}

fn collect_full_paths(element: &Element, outer: &Scope, out: &mut Vec<String>) {
    let scope = outer.extended(element);
    if element.local_name() == "file-entry" && scope.namespace_of(element) == Some(MANIFEST_NS) {
        let full_path = element.attributes.iter().find_map(|(key, value)| {
            let (prefix, local) = key.split_once(':')?;
            let matches = local == "full-path" && scope.resolve(prefix) == Some(MANIFEST_NS);
            matches.then(|| value.clone())
        });
        out.extend(full_path);
    }
    for child in element.elements() {
        collect_full_paths(child, &scope, out);
    }
}

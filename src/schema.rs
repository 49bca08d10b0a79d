//! Schema tables for the OXT descriptor files.
//!
//! Entries are listed parent-first; reconciliation walks them in order and
//! relies on that to create missing elements top-down.

use crate::xml::NamespaceMap;

/// Value written into fields left unfilled outside guided mode.
pub const INCOMPLETE_TEXT: &str = "[incomplete]";

pub const TOOL_VERSION: &str = env!("CARGO_PKG_VERSION");
/// Empty when the package declares no homepage.
pub const TOOL_HOMEPAGE: &str = env!("CARGO_PKG_HOMEPAGE");

pub const DESCRIPTION_NS: &str = "http://openoffice.org/extensions/description/2006";
pub const XLINK_NS: &str = "http://www.w3.org/1999/xlink";
pub const MANIFEST_NS: &str = "http://openoffice.org/2001/manifest";

/// Namespaces of a generated `description.xml`; `xmlns` is the default.
pub const DESCRIPTION_NAMESPACES: NamespaceMap = NamespaceMap::new(&[
    ("xmlns", DESCRIPTION_NS),
    ("dep", DESCRIPTION_NS),
    ("xlink", XLINK_NS),
]);

pub const DESCRIPTION_DOC_COMMENT: &str =
    "Reference: https://wiki.documentfoundation.org/Documentation/DevGuide/Extensions#description.xml";
pub const PACKAGING_COMMENT_PREFIX: &str = "Packaged by oxtbuild";

pub const MANIFEST_DOCTYPE: &str =
    r#"manifest:manifest PUBLIC "-//OpenOffice.org//DTD Manifest 1.0//EN" "Manifest.dtd""#;
pub const MIME_BASE: &str = "application/vnd.sun.star";

/// Extension → media-type suffix for manifested resources.
pub const MANIFEST_MEDIA_TYPES: &[(&str, &str)] = &[(".xcu", ".configuration-data")];

/// File types packaged in strict mode, besides the manifested ones.
pub const STRICT_EXTENSIONS: &[&str] = &[".md", ".txt", ".xml"];

/// One required element of a descriptor.
///
/// Attribute and text fallbacks ending in `": "` are prompts in guided mode;
/// anything else is assigned literally.
#[derive(Debug, Clone, Copy)]
pub struct SchemaEntry {
    pub location: &'static str,
    pub attributes: &'static [(&'static str, &'static str)],
    pub text: Option<&'static str>,
}

impl SchemaEntry {
    const fn element(location: &'static str) -> Self {
        Self {
            location,
            attributes: &[],
            text: None,
        }
    }

    const fn with_attributes(
        location: &'static str,
        attributes: &'static [(&'static str, &'static str)],
    ) -> Self {
        Self {
            location,
            attributes,
            text: None,
        }
    }

    const fn with_text(
        location: &'static str,
        attributes: &'static [(&'static str, &'static str)],
        text: &'static str,
    ) -> Self {
        Self {
            location,
            attributes,
            text: Some(text),
        }
    }
}

pub const DESCRIPTION_ENTRIES: &[SchemaEntry] = &[
    SchemaEntry::element("/xmlns:description"),
    SchemaEntry::with_attributes(
        "/xmlns:description/xmlns:identifier",
        &[("value", "OXT unique identifier: ")],
    ),
    SchemaEntry::with_attributes(
        "/xmlns:description/xmlns:version",
        &[("value", "OXT release version: ")],
    ),
    SchemaEntry::with_attributes(
        "/xmlns:description/xmlns:platform",
        &[("value", "OXT platform [all]: ")],
    ),
    SchemaEntry::element("/xmlns:description/xmlns:registration"),
    SchemaEntry::with_attributes(
        "/xmlns:description/xmlns:registration/xmlns:simple-license",
        &[
            ("accept-by", "Approval level admin/user? [admin]: "),
            (
                "suppress-on-update",
                "Suppress license agreement on update? [true]: ",
            ),
        ],
    ),
    SchemaEntry::with_attributes(
        "/xmlns:description/xmlns:registration/xmlns:simple-license/xmlns:license-text",
        &[("xlink:href", "License filename (en): "), ("lang", "en")],
    ),
    SchemaEntry::element("/xmlns:description/xmlns:dependencies"),
    SchemaEntry::with_attributes(
        "/xmlns:description/xmlns:dependencies/xmlns:OpenOffice.org-minimal-version",
        &[
            ("value", "Minimum OpenOffice.org version [3.0]: "),
            ("dep:name", "Minimum version name [OpenOffice.org 3.0]: "),
        ],
    ),
    SchemaEntry::element("/xmlns:description/xmlns:publisher"),
    SchemaEntry::with_text(
        "/xmlns:description/xmlns:publisher/xmlns:name",
        &[("xlink:href", "Publisher's URL (en): "), ("lang", "en")],
        "Publisher's name (en): ",
    ),
    SchemaEntry::element("/xmlns:description/xmlns:display-name"),
    SchemaEntry::with_text(
        "/xmlns:description/xmlns:display-name/xmlns:name",
        &[("lang", "en")],
        "OXT display name (en): ",
    ),
];

/// A descriptor's required entries together with the prefixes they use.
#[derive(Debug, Clone, Copy)]
pub struct DocumentSchema {
    pub entries: &'static [SchemaEntry],
    pub namespaces: NamespaceMap,
}

pub const DESCRIPTION_SCHEMA: DocumentSchema = DocumentSchema {
    entries: DESCRIPTION_ENTRIES,
    namespaces: DESCRIPTION_NAMESPACES,
};

pub fn packaging_comment() -> String {
    packaging_comment_for(TOOL_VERSION, TOOL_HOMEPAGE)
}

fn packaging_comment_for(version: &str, homepage: &str) -> String {
    if homepage.is_empty() {
        format!("{PACKAGING_COMMENT_PREFIX} v{version}")
    } else {
        format!("{PACKAGING_COMMENT_PREFIX} v{version}, {homepage}")
    }
}

/// Whether a fallback reads as a question to put to the user.
pub fn is_prompt(fallback: &str) -> bool {
    fallback.ends_with(": ")
}

/// Absent, blank or still holding the sentinel.
pub fn is_missing(value: Option<&str>) -> bool {
    match value.map(str::trim) {
        None => true,
        Some(value) => value.is_empty() || value == INCOMPLETE_TEXT,
    }
}

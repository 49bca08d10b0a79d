use super::{Document, Element, Node};
use anyhow::{Context, Result};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::fs;
use std::io::Write;
use std::path::Path;

/// Pretty-printed UTF-8 bytes with an XML declaration and the document's
/// DOCTYPE, if any.
pub fn serialize_document(document: &Document) -> Result<Vec<u8>> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .context("write XML declaration")?;
    if let Some(doctype) = &document.doctype {
        writer
            .write_event(Event::DocType(BytesText::from_escaped(doctype.as_str())))
            .context("write DOCTYPE")?;
    }
    for node in &document.prolog {
        write_node(&mut writer, node)?;
    }
    write_element(&mut writer, &document.root)?;
    for node in &document.epilog {
        write_node(&mut writer, node)?;
    }
    let mut bytes = writer.into_inner();
    bytes.push(b'\n');
    Ok(bytes)
}

/// Serialize `document` to `path`, creating parent directories first.
pub fn write_document(path: &Path, document: &Document) -> Result<()> {
    let bytes = serialize_document(document)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    fs::write(path, bytes).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

fn write_node<W: Write>(writer: &mut Writer<W>, node: &Node) -> Result<()> {
    match node {
        Node::Element(element) => write_element(writer, element)?,
        Node::Text(text) => writer
            .write_event(Event::Text(BytesText::new(text)))
            .context("write text")?,
        Node::Comment(text) => writer
            .write_event(Event::Comment(BytesText::from_escaped(text.as_str())))
            .context("write comment")?,
    }
    Ok(())
}

fn write_element<W: Write>(writer: &mut Writer<W>, element: &Element) -> Result<()> {
    let mut start = BytesStart::new(element.name.as_str());
    for (key, value) in &element.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }
    if element.children.is_empty() {
        writer
            .write_event(Event::Empty(start))
            .with_context(|| format!("write <{}/>", element.name))?;
        return Ok(());
    }
    writer
        .write_event(Event::Start(start))
        .with_context(|| format!("write <{}>", element.name))?;
    for child in &element.children {
        write_node(writer, child)?;
    }
    writer
        .write_event(Event::End(BytesEnd::new(element.name.as_str())))
        .with_context(|| format!("write </{}>", element.name))?;
    Ok(())
}

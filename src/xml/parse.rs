use super::{Document, Element, Node};
use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::{BytesRef, BytesStart, Event};
use quick_xml::Reader;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum XmlError {
    #[error("{0}")]
    Syntax(String),
    #[error("unknown entity &{0};")]
    UnknownEntity(String),
    #[error("unclosed element <{0}>")]
    Unclosed(String),
    #[error("more than one root element (<{0}>)")]
    MultipleRoots(String),
    #[error("document has no root element")]
    NoRoot,
    #[error("text outside the root element: {0:?}")]
    TextOutsideRoot(String),
}

/// Parse a complete document into an owned tree.
pub fn parse_document(text: &str) -> Result<Document, XmlError> {
    let mut reader = Reader::from_str(text);
    let mut doctype = None;
    let mut prolog = Vec::new();
    let mut epilog = Vec::new();
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;
    let mut pending = String::new();

    loop {
        let event = reader
            .read_event()
            .map_err(|err| syntax_error(&reader, err))?;
        match event {
            Event::Start(start) => {
                flush_text(&mut pending, &mut stack);
                stack.push(element_from_start(&reader, &start)?);
            }
            Event::Empty(start) => {
                flush_text(&mut pending, &mut stack);
                let element = element_from_start(&reader, &start)?;
                attach(element, &mut stack, &mut root)?;
            }
            Event::End(_) => {
                flush_text(&mut pending, &mut stack);
                if let Some(element) = stack.pop() {
                    attach(element, &mut stack, &mut root)?;
                }
            }
            Event::Text(text) => {
                let decoded = text.decode().map_err(|err| syntax_error(&reader, err))?;
                if stack.is_empty() {
                    if !decoded.trim().is_empty() {
                        return Err(XmlError::TextOutsideRoot(decoded.trim().to_string()));
                    }
                } else {
                    pending.push_str(&decoded);
                }
            }
            Event::CData(data) => {
                let decoded = data.decode().map_err(|err| syntax_error(&reader, err))?;
                if stack.is_empty() {
                    return Err(XmlError::TextOutsideRoot(decoded.into_owned()));
                }
                pending.push_str(&decoded);
            }
            Event::GeneralRef(reference) => {
                let resolved = resolve_reference(&reader, &reference)?;
                if stack.is_empty() {
                    return Err(XmlError::TextOutsideRoot(resolved));
                }
                pending.push_str(&resolved);
            }
            Event::Comment(comment) => {
                flush_text(&mut pending, &mut stack);
                let text = comment
                    .decode()
                    .map_err(|err| syntax_error(&reader, err))?
                    .into_owned();
                match stack.last_mut() {
                    Some(parent) => parent.children.push(Node::Comment(text)),
                    None if root.is_none() => prolog.push(Node::Comment(text)),
                    None => epilog.push(Node::Comment(text)),
                }
            }
            Event::DocType(body) => {
                let body = body.decode().map_err(|err| syntax_error(&reader, err))?;
                doctype = Some(body.trim().to_string());
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(XmlError::Unclosed(open.name.clone()));
    }
    let root = root.ok_or(XmlError::NoRoot)?;
    Ok(Document {
        doctype,
        prolog,
        root,
        epilog,
    })
}

fn syntax_error(reader: &Reader<&[u8]>, err: impl std::fmt::Display) -> XmlError {
    XmlError::Syntax(format!("{err} (at byte {})", reader.buffer_position()))
}

fn element_from_start(reader: &Reader<&[u8]>, start: &BytesStart<'_>) -> Result<Element, XmlError> {
    let name = std::str::from_utf8(start.name().as_ref())
        .map_err(|err| syntax_error(reader, err))?
        .to_string();
    let mut element = Element::new(name);
    for attribute in start.attributes() {
        let attribute = attribute.map_err(|err| syntax_error(reader, err))?;
        let key = std::str::from_utf8(attribute.key.as_ref())
            .map_err(|err| syntax_error(reader, err))?
            .to_string();
        let value = attribute
            .unescape_value()
            .map_err(|err| syntax_error(reader, err))?;
        element.attributes.push((key, value.into_owned()));
    }
    Ok(element)
}

fn resolve_reference(reader: &Reader<&[u8]>, reference: &BytesRef<'_>) -> Result<String, XmlError> {
    if let Some(ch) = reference
        .resolve_char_ref()
        .map_err(|err| syntax_error(reader, err))?
    {
        return Ok(ch.to_string());
    }
    let name = reference.decode().map_err(|err| syntax_error(reader, err))?;
    resolve_predefined_entity(&name)
        .map(str::to_string)
        .ok_or_else(|| XmlError::UnknownEntity(name.into_owned()))
}

/// Text runs that are only indentation are dropped; anything else is kept
/// verbatim.
fn flush_text(pending: &mut String, stack: &mut [Element]) {
    if pending.is_empty() {
        return;
    }
    let text = std::mem::take(pending);
    if text.trim().is_empty() {
        return;
    }
    if let Some(parent) = stack.last_mut() {
        parent.children.push(Node::Text(text));
    }
}

fn attach(
    element: Element,
    stack: &mut [Element],
    root: &mut Option<Element>,
) -> Result<(), XmlError> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(Node::Element(element));
        return Ok(());
    }
    if root.is_some() {
        return Err(XmlError::MultipleRoots(element.name));
    }
    *root = Some(element);
    Ok(())
}

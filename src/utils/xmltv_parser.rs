//! Quick-XML based XMLTV parser
//!
//! Builds a small element tree from the document and lifts the `channel`
//! and `programme` children of the root into a [`GuideSnapshot`]. Parsing is
//! strict (mismatched tags, bad entities, illegal characters and multiple
//! roots are errors) so that [`parse_guide_lenient`] can decide when to fall
//! back to the repair helpers.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::{debug, warn};

use crate::errors::{AppError, AppResult};
use crate::models::{Channel, GuideSnapshot, Programme, XmlElement, XmlNode};
use crate::utils::xml_repair::{is_xml_char, repair_xml, wrap_in_root};

const SOURCE_TYPE: &str = "xmltv";

fn parse_error<S: Into<String>>(message: S) -> AppError {
    AppError::parse(SOURCE_TYPE, message)
}

fn check_chars(value: &str, context: &str) -> AppResult<()> {
    match value.chars().find(|c| !is_xml_char(*c)) {
        Some(c) => Err(parse_error(format!(
            "Illegal character U+{:04X} in {context}",
            c as u32
        ))),
        None => Ok(()),
    }
}

fn element_from_start(start: &BytesStart) -> AppResult<XmlElement> {
    let name = std::str::from_utf8(start.name().as_ref())
        .map_err(|e| parse_error(format!("Invalid UTF-8 in XML element name: {e}")))?
        .to_string();

    let mut element = XmlElement::new(name);
    for attr in start.attributes() {
        let attr = attr.map_err(|e| {
            parse_error(format!("Invalid attribute on <{}>: {e}", element.name))
        })?;
        let key = std::str::from_utf8(attr.key.as_ref())
            .map_err(|e| parse_error(format!("Invalid UTF-8 in attribute name: {e}")))?
            .to_string();
        let value = attr.unescape_value().map_err(|e| {
            parse_error(format!(
                "Invalid value for attribute '{key}' on <{}>: {e}",
                element.name
            ))
        })?;
        check_chars(&value, "attribute value")?;
        element.attributes.push((key, value.into_owned()));
    }
    Ok(element)
}

/// Attach a finished element to its parent, or make it the document root
fn attach(
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    element: XmlElement,
) -> AppResult<()> {
    match stack.last_mut() {
        Some(parent) => {
            parent.children.push(XmlNode::Element(element));
            Ok(())
        }
        None if root.is_none() => {
            *root = Some(element);
            Ok(())
        }
        None => Err(parse_error(format!(
            "Junk after document element: <{}>",
            element.name
        ))),
    }
}

/// Parse a complete XML document into its root element
///
/// Whitespace-only text between elements is dropped; all other text is
/// kept exactly as unescaped.
pub fn parse_document(content: &str) -> AppResult<XmlElement> {
    let mut reader = Reader::from_str(content);

    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        let event = reader.read_event().map_err(|e| {
            parse_error(format!(
                "XML parsing error at position {}: {e}",
                reader.buffer_position()
            ))
        })?;

        match event {
            Event::Start(ref e) => {
                if root.is_some() && stack.is_empty() {
                    return Err(parse_error("Junk after document element"));
                }
                stack.push(element_from_start(e)?);
            }

            Event::Empty(ref e) => {
                let element = element_from_start(e)?;
                attach(&mut stack, &mut root, element)?;
            }

            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| parse_error("Closing tag without matching opening tag"))?;
                attach(&mut stack, &mut root, element)?;
            }

            Event::Text(e) => {
                let text = e
                    .unescape()
                    .map_err(|e| parse_error(format!("Invalid text content: {e}")))?;
                check_chars(&text, "text content")?;
                if text.trim().is_empty() {
                    continue;
                }
                match stack.last_mut() {
                    Some(parent) => parent.children.push(XmlNode::Text(text.into_owned())),
                    None => return Err(parse_error("Text content outside of the root element")),
                }
            }

            Event::CData(e) => {
                let text = std::str::from_utf8(&e)
                    .map_err(|e| parse_error(format!("Invalid UTF-8 in CDATA: {e}")))?;
                check_chars(text, "CDATA section")?;
                if let Some(parent) = stack.last_mut() {
                    parent.children.push(XmlNode::CData(text.to_string()));
                }
            }

            Event::Comment(e) => {
                let text = std::str::from_utf8(&e)
                    .map_err(|e| parse_error(format!("Invalid UTF-8 in comment: {e}")))?;
                if let Some(parent) = stack.last_mut() {
                    parent.children.push(XmlNode::Comment(text.to_string()));
                }
            }

            Event::Eof => break,

            // Declaration, DOCTYPE and processing instructions carry nothing we keep
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(parse_error(format!(
            "Unexpected end of document inside <{}>",
            open.name
        )));
    }

    root.ok_or_else(|| parse_error("Document has no root element"))
}

/// Collect channels and programmes from a document root
///
/// Nested `tv` elements (left behind when a feed is wrapped in a synthetic
/// root) are flattened in document order.
pub fn snapshot_from_root(root: XmlElement) -> GuideSnapshot {
    let XmlElement {
        name,
        attributes,
        children,
    } = root;

    if name != "tv" {
        warn!("XMLTV root element is <{}>, expected <tv>", name);
    }

    let mut snapshot = GuideSnapshot {
        root_attributes: attributes,
        ..GuideSnapshot::default()
    };
    let mut skipped = 0usize;
    collect_entries(children, &mut snapshot, &mut skipped);

    if skipped > 0 {
        debug!("Ignored {} non-channel/programme elements under <tv>", skipped);
    }
    snapshot
}

fn collect_entries(children: Vec<XmlNode>, snapshot: &mut GuideSnapshot, skipped: &mut usize) {
    for node in children {
        let XmlNode::Element(element) = node else {
            continue;
        };
        match element.name.as_str() {
            "channel" => snapshot.channels.push(Channel::new(element)),
            "programme" => snapshot.programmes.push(Programme::new(element)),
            "tv" => {
                if snapshot.root_attributes.is_empty() {
                    snapshot.root_attributes = element.attributes.clone();
                }
                collect_entries(element.children, snapshot, skipped);
            }
            _ => *skipped += 1,
        }
    }
}

/// Strictly parse an XMLTV document
pub fn parse_guide(content: &str) -> AppResult<GuideSnapshot> {
    parse_document(content).map(snapshot_from_root)
}

/// Parse an XMLTV feed, falling back to repair and root wrapping
///
/// Tries the content as-is, then with illegal characters stripped and bare
/// ampersands escaped, then the repaired content wrapped in a synthetic
/// root. The error of the last attempt is returned if all three fail.
pub fn parse_guide_lenient(content: &str) -> AppResult<GuideSnapshot> {
    let first_error = match parse_document(content) {
        Ok(root) => return Ok(snapshot_from_root(root)),
        Err(e) => e,
    };
    warn!("XMLTV feed failed to parse ({}), retrying after character repair", first_error);

    let repaired = repair_xml(content);
    let second_error = match parse_document(&repaired) {
        Ok(root) => return Ok(snapshot_from_root(root)),
        Err(e) => e,
    };
    warn!(
        "Repaired XMLTV feed still failed to parse ({}), retrying wrapped in a <tv> root",
        second_error
    );

    match parse_document(&wrap_in_root(&repaired)) {
        Ok(root) => Ok(snapshot_from_root(root)),
        Err(e) => Err(parse_error(format!(
            "Feed is unparsable even after repair: {e}"
        ))),
    }
}

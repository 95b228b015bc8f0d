//! XMLTV serialization
//!
//! Writes a [`GuideSnapshot`] as an indented UTF-8 document with an XML
//! declaration and a `<tv>` root holding all channels, then all programmes.

use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::Write;

use crate::errors::{AppError, AppResult};
use crate::models::{GuideSnapshot, XmlElement, XmlNode};

fn write_err<E: std::fmt::Display>(e: E) -> AppError {
    AppError::xml_write(e.to_string())
}

/// Serialize a guide to XMLTV bytes
pub fn write_guide(guide: &GuideSnapshot) -> AppResult<Vec<u8>> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(write_err)?;

    let mut root = BytesStart::new("tv");
    for (key, value) in &guide.root_attributes {
        root.push_attribute((key.as_str(), value.as_str()));
    }
    writer.write_event(Event::Start(root)).map_err(write_err)?;

    for channel in &guide.channels {
        write_element(&mut writer, channel.element())?;
    }
    for programme in &guide.programmes {
        write_element(&mut writer, programme.element())?;
    }

    writer
        .write_event(Event::End(BytesEnd::new("tv")))
        .map_err(write_err)?;

    let mut output = writer.into_inner();
    output.push(b'\n');
    Ok(output)
}

fn write_element<W: Write>(writer: &mut Writer<W>, element: &XmlElement) -> AppResult<()> {
    let mut start = BytesStart::new(element.name.as_str());
    for (key, value) in &element.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if element.children.is_empty() {
        writer.write_event(Event::Empty(start)).map_err(write_err)?;
        return Ok(());
    }

    writer.write_event(Event::Start(start)).map_err(write_err)?;
    for child in &element.children {
        match child {
            XmlNode::Element(nested) => write_element(writer, nested)?,
            XmlNode::Text(text) => writer
                .write_event(Event::Text(BytesText::new(text)))
                .map_err(write_err)?,
            // "]]>" cannot appear inside a CDATA section; fall back to escaped text
            XmlNode::CData(text) if text.contains("]]>") => writer
                .write_event(Event::Text(BytesText::new(text)))
                .map_err(write_err)?,
            XmlNode::CData(text) => writer
                .write_event(Event::CData(BytesCData::new(text.as_str())))
                .map_err(write_err)?,
            XmlNode::Comment(text) => writer
                .write_event(Event::Comment(BytesText::from_escaped(text.as_str())))
                .map_err(write_err)?,
        }
    }
    writer
        .write_event(Event::End(BytesEnd::new(element.name.as_str())))
        .map_err(write_err)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Channel, Programme};
    use crate::utils::xmltv_parser::parse_guide;

    fn sample_guide() -> GuideSnapshot {
        GuideSnapshot::new(
            vec![("generator-info-name".to_string(), "centra".to_string())],
            vec![Channel::with_display_name("tnt.1", "TNT Sports 1")],
            vec![Programme::with_title(
                "tnt.1",
                "20260110233000 +0530",
                "20260111003000 +0530",
                "Premier League: Arsenal v Spurs & more",
            )],
        )
    }

    #[test]
    fn test_write_guide_layout() {
        let bytes = write_guide(&sample_guide()).unwrap();
        let text = String::from_utf8(bytes).unwrap();

        assert!(text.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(text.contains("<tv generator-info-name=\"centra\">"));
        assert!(text.contains("<display-name>TNT Sports 1</display-name>"));
        assert!(text.contains("Arsenal v Spurs &amp; more"));

        let channel_at = text.find("<channel").unwrap();
        let programme_at = text.find("<programme").unwrap();
        assert!(channel_at < programme_at);
        assert!(text.trim_end().ends_with("</tv>"));
    }

    #[test]
    fn test_written_guide_parses_back() {
        let guide = sample_guide();
        let bytes = write_guide(&guide).unwrap();
        let reparsed = parse_guide(&String::from_utf8(bytes).unwrap()).unwrap();
        assert_eq!(reparsed, guide);
    }

    #[test]
    fn test_cdata_with_terminator_is_written_as_text() {
        let mut element = XmlElement::new("desc");
        element.children.push(XmlNode::CData("a ]]> b".to_string()));
        let guide = GuideSnapshot::new(
            Vec::new(),
            Vec::new(),
            vec![Programme::new(
                XmlElement::new("programme")
                    .with_attribute("channel", "x")
                    .with_child(element),
            )],
        );

        let text = String::from_utf8(write_guide(&guide).unwrap()).unwrap();
        assert!(text.contains("a ]]&gt; b"));
        assert!(parse_guide(&text).is_ok());
    }
}

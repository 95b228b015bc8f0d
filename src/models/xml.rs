//! Generic XML element tree
//!
//! Channels and programmes carry arbitrary children (titles, icons,
//! ratings, vendor extensions) that must be written back untouched, so they
//! are held as plain element trees rather than typed structs.

/// A node inside an element
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlNode {
    Element(XmlElement),
    /// Unescaped character data
    Text(String),
    CData(String),
    Comment(String),
}

/// An XML element with ordered attributes and children
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlElement {
    pub name: String,
    /// Attribute pairs in document order, values unescaped
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlNode>,
}

impl XmlElement {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Builder-style attribute setter
    pub fn with_attribute<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.set_attribute(key, value);
        self
    }

    /// Builder-style child element
    pub fn with_child(mut self, child: XmlElement) -> Self {
        self.children.push(XmlNode::Element(child));
        self
    }

    /// Builder-style text content
    pub fn with_text<S: Into<String>>(mut self, text: S) -> Self {
        self.children.push(XmlNode::Text(text.into()));
        self
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Set an attribute, replacing an existing value in place so document
    /// order is kept
    pub fn set_attribute<K: Into<String>, V: Into<String>>(&mut self, key: K, value: V) {
        let key = key.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| *k == key) {
            Some(existing) => existing.1 = value,
            None => self.attributes.push((key, value)),
        }
    }

    /// Iterate over child elements, skipping text and comments
    pub fn child_elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|node| match node {
            XmlNode::Element(element) => Some(element),
            _ => None,
        })
    }

    /// First child element with the given name
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.child_elements().find(|element| element.name == name)
    }

    /// Concatenated text and CDATA content of this element's direct children
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|node| match node {
                XmlNode::Text(text) | XmlNode::CData(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_attribute_keeps_position() {
        let mut element = XmlElement::new("programme")
            .with_attribute("start", "20260110180000 +0000")
            .with_attribute("stop", "20260110190000 +0000")
            .with_attribute("channel", "fox.501");

        element.set_attribute("start", "20260110233000 +0530");

        assert_eq!(element.attributes[0].0, "start");
        assert_eq!(element.attribute("start"), Some("20260110233000 +0530"));
        assert_eq!(element.attributes.len(), 3);
    }

    #[test]
    fn test_child_text() {
        let element = XmlElement::new("channel")
            .with_attribute("id", "kayo.1")
            .with_child(XmlElement::new("display-name").with_text("Kayo Sports"));

        let name = element.child("display-name").map(|c| c.text());
        assert_eq!(name.as_deref(), Some("Kayo Sports"));
        assert!(element.child("icon").is_none());
    }
}

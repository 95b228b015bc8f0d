//! Guide data model
//!
//! [`Channel`] and [`Programme`] are thin typed views over a single XMLTV
//! element. Only the identity attributes are interpreted; everything else
//! is carried through to the output as-is.

pub mod xml;

pub use xml::{XmlElement, XmlNode};

/// XMLTV `<channel>` element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Channel {
    element: XmlElement,
}

impl Channel {
    pub fn new(element: XmlElement) -> Self {
        Self { element }
    }

    /// Convenience constructor used by fixtures and tests
    pub fn with_display_name(id: &str, display_name: &str) -> Self {
        Self::new(
            XmlElement::new("channel")
                .with_attribute("id", id)
                .with_child(XmlElement::new("display-name").with_text(display_name)),
        )
    }

    /// Channel identifier; a missing `id` attribute reads as empty
    pub fn id(&self) -> &str {
        self.element.attribute("id").unwrap_or("")
    }

    /// Text of the first `display-name` child, if any
    pub fn display_name(&self) -> Option<String> {
        self.element.child("display-name").map(XmlElement::text)
    }

    pub fn element(&self) -> &XmlElement {
        &self.element
    }

    pub fn into_element(self) -> XmlElement {
        self.element
    }
}

/// Identity of a broadcast slot
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProgrammeKey {
    pub channel: String,
    pub start: String,
}

/// XMLTV `<programme>` element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Programme {
    element: XmlElement,
}

impl Programme {
    pub fn new(element: XmlElement) -> Self {
        Self { element }
    }

    /// Convenience constructor used by fixtures and tests
    pub fn with_title(channel: &str, start: &str, stop: &str, title: &str) -> Self {
        Self::new(
            XmlElement::new("programme")
                .with_attribute("start", start)
                .with_attribute("stop", stop)
                .with_attribute("channel", channel)
                .with_child(XmlElement::new("title").with_text(title)),
        )
    }

    /// Referenced channel identifier; missing reads as empty
    pub fn channel_id(&self) -> &str {
        self.element.attribute("channel").unwrap_or("")
    }

    pub fn start(&self) -> Option<&str> {
        self.element.attribute("start")
    }

    pub fn stop(&self) -> Option<&str> {
        self.element.attribute("stop")
    }

    pub fn set_start<S: Into<String>>(&mut self, start: S) {
        self.element.set_attribute("start", start);
    }

    pub fn set_stop<S: Into<String>>(&mut self, stop: S) {
        self.element.set_attribute("stop", stop);
    }

    /// Text of the first `title` child, if any
    pub fn title(&self) -> Option<String> {
        self.element.child("title").map(XmlElement::text)
    }

    pub fn key(&self) -> ProgrammeKey {
        ProgrammeKey {
            channel: self.channel_id().to_string(),
            start: self.start().unwrap_or("").to_string(),
        }
    }

    pub fn element(&self) -> &XmlElement {
        &self.element
    }

    pub fn into_element(self) -> XmlElement {
        self.element
    }
}

/// One complete channel and programme data set
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GuideSnapshot {
    /// Attributes of the `<tv>` root, e.g. `generator-info-name`
    pub root_attributes: Vec<(String, String)>,
    pub channels: Vec<Channel>,
    pub programmes: Vec<Programme>,
}

impl GuideSnapshot {
    pub fn new(
        root_attributes: Vec<(String, String)>,
        channels: Vec<Channel>,
        programmes: Vec<Programme>,
    ) -> Self {
        Self {
            root_attributes,
            channels,
            programmes,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty() && self.programmes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_programme_key_uses_channel_and_start() {
        let programme = Programme::with_title(
            "fox.503",
            "20260110233000 +0530",
            "20260111003000 +0530",
            "NRL Tonight",
        );

        assert_eq!(
            programme.key(),
            ProgrammeKey {
                channel: "fox.503".to_string(),
                start: "20260110233000 +0530".to_string(),
            }
        );
        assert_eq!(programme.title().as_deref(), Some("NRL Tonight"));
    }

    #[test]
    fn test_missing_identity_attributes_read_as_empty() {
        let channel = Channel::new(XmlElement::new("channel"));
        assert_eq!(channel.id(), "");
        assert_eq!(channel.display_name(), None);

        let programme = Programme::new(XmlElement::new("programme"));
        assert_eq!(programme.channel_id(), "");
        assert_eq!(programme.start(), None);
        assert_eq!(programme.key().start, "");
    }
}

use std::io::Cursor;

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::error::GeometryError;

/// Element-by-element XML output into a string.
pub(crate) struct XmlOutput {
    writer: Writer<Cursor<Vec<u8>>>,
}

impl XmlOutput {
    pub fn new() -> Self {
        Self {
            writer: Writer::new(Cursor::new(Vec::new())),
        }
    }

    pub fn start(&mut self, name: &str) -> Result<(), GeometryError> {
        self.write(Event::Start(BytesStart::new(name)))
    }

    pub fn start_with(
        &mut self,
        name: &str,
        attributes: &[(&str, &str)],
    ) -> Result<(), GeometryError> {
        self.write(Event::Start(
            BytesStart::new(name).with_attributes(attributes.iter().copied()),
        ))
    }

    pub fn end(&mut self, name: &str) -> Result<(), GeometryError> {
        self.write(Event::End(BytesEnd::new(name)))
    }

    pub fn empty(&mut self, name: &str) -> Result<(), GeometryError> {
        self.write(Event::Empty(BytesStart::new(name)))
    }

    pub fn text(&mut self, text: &str) -> Result<(), GeometryError> {
        self.write(Event::Text(BytesText::new(text)))
    }

    /// Writes `<name>text</name>`.
    pub fn element(&mut self, name: &str, text: &str) -> Result<(), GeometryError> {
        self.start(name)?;
        self.text(text)?;
        self.end(name)
    }

    /// Writes `<name attributes...>text</name>`.
    pub fn element_with(
        &mut self,
        name: &str,
        attributes: &[(&str, &str)],
        text: &str,
    ) -> Result<(), GeometryError> {
        self.start_with(name, attributes)?;
        self.text(text)?;
        self.end(name)
    }

    pub fn finish(self) -> Result<String, GeometryError> {
        String::from_utf8(self.writer.into_inner().into_inner())
            .map_err(|e| GeometryError::Xml(e.to_string()))
    }

    fn write(&mut self, event: Event<'_>) -> Result<(), GeometryError> {
        self.writer
            .write_event(event)
            .map_err(|e| GeometryError::Xml(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_elements() {
        let mut xml = XmlOutput::new();
        xml.start("a").unwrap();
        xml.element_with("b", &[("cs", ","), ("ts", " ")], "1,2 3,4")
            .unwrap();
        xml.empty("c").unwrap();
        xml.end("a").unwrap();
        assert_eq!(
            xml.finish().unwrap(),
            r#"<a><b cs="," ts=" ">1,2 3,4</b><c/></a>"#
        );
    }
}

//! Minimal XML element tree
//!
//! Request fragments are built as [`Element`] values and serialized with
//! quick-xml's `Writer`; responses are read back into the same tree with
//! element names reduced to their local part (namespace prefixes dropped).

use crate::{Error, Result};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::collections::BTreeMap;
use std::io::Cursor;

/// XML element with either text content or child elements
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    /// Element name (qualified when built, local when parsed)
    pub name: String,
    /// Attributes in insertion order
    pub attributes: Vec<(String, String)>,
    /// Text content
    pub text: Option<String>,
    /// Child elements
    pub children: Vec<Element>,
}

impl Element {
    /// Empty element
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Element holding only text
    pub fn text(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: Some(text.into()),
            ..Self::default()
        }
    }

    /// Add an attribute
    pub fn attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((key.into(), value.into()));
        self
    }

    /// Add a child
    pub fn child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    /// Add a text child when `value` is present
    pub fn opt_text(mut self, name: &str, value: Option<&str>) -> Self {
        if let Some(value) = value {
            self.children.push(Element::text(name, value));
        }
        self
    }

    /// Add a child element when it ended up with content
    pub fn non_empty_child(mut self, child: Element) -> Self {
        if !child.children.is_empty() || child.text.is_some() {
            self.children.push(child);
        }
        self
    }

    /// First direct child with this name
    pub fn find(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    /// All direct children with this name
    pub fn find_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Follow a path of child names
    pub fn path(&self, names: &[&str]) -> Option<&Element> {
        names.iter().try_fold(self, |node, name| node.find(name))
    }

    /// Text of the child at `names`
    pub fn text_at(&self, names: &[&str]) -> Option<&str> {
        self.path(names).and_then(|e| e.text.as_deref())
    }

    /// First descendant (depth-first) with this name, including self
    pub fn descendant(&self, name: &str) -> Option<&Element> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.descendant(name))
    }

    /// True when this element has no children
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Flatten into a single-level map.
    ///
    /// Nested elements are merged upward; a leaf at a shallower level wins
    /// over a same-named leaf found deeper.
    pub fn flatten(&self) -> BTreeMap<String, String> {
        let mut out = BTreeMap::new();

        for child in self.children.iter().filter(|c| !c.is_leaf()) {
            out.extend(child.flatten());
        }
        for child in self.children.iter().filter(|c| c.is_leaf()) {
            out.insert(
                child.name.clone(),
                child.text.clone().unwrap_or_default(),
            );
        }

        out
    }

    /// Serialize as a standalone document with an XML declaration
    pub fn to_document(&self) -> Result<String> {
        let mut writer = Writer::new(Cursor::new(Vec::new()));

        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))
            .map_err(|e| Error::Xml(e.to_string()))?;
        write_element(&mut writer, self)?;

        let bytes = writer.into_inner().into_inner();
        String::from_utf8(bytes).map_err(|e| Error::Xml(e.to_string()))
    }

    /// Parse a document; returns the root element
    pub fn parse(xml: &str) -> Result<Element> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut stack: Vec<Element> = Vec::new();

        loop {
            match reader.read_event()? {
                Event::Start(start) => stack.push(start_element(&start)?),
                Event::Empty(start) => {
                    let element = start_element(&start)?;
                    attach(&mut stack, element);
                }
                Event::Text(text) => {
                    let value = text.unescape()?.into_owned();
                    append_text(&mut stack, &value);
                }
                Event::CData(data) => {
                    let value = String::from_utf8_lossy(&data.into_inner()).into_owned();
                    append_text(&mut stack, &value);
                }
                Event::End(_) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| Error::Xml("unbalanced closing tag".to_string()))?;
                    if stack.is_empty() {
                        return Ok(element);
                    }
                    attach(&mut stack, element);
                }
                Event::Eof => {
                    return Err(Error::Xml("document has no root element".to_string()))
                }
                _ => {}
            }
        }
    }
}

fn write_element(writer: &mut Writer<Cursor<Vec<u8>>>, element: &Element) -> Result<()> {
    let mut start = BytesStart::new(element.name.as_str());
    for (key, value) in &element.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if element.children.is_empty() && element.text.is_none() {
        writer
            .write_event(Event::Empty(start))
            .map_err(|e| Error::Xml(e.to_string()))?;
        return Ok(());
    }

    writer
        .write_event(Event::Start(start))
        .map_err(|e| Error::Xml(e.to_string()))?;

    if let Some(text) = &element.text {
        writer
            .write_event(Event::Text(BytesText::new(text)))
            .map_err(|e| Error::Xml(e.to_string()))?;
    }

    for child in &element.children {
        write_element(writer, child)?;
    }

    writer
        .write_event(Event::End(BytesEnd::new(element.name.as_str())))
        .map_err(|e| Error::Xml(e.to_string()))?;

    Ok(())
}

fn start_element(start: &BytesStart<'_>) -> Result<Element> {
    let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
    let mut element = Element::new(name);

    for attribute in start.attributes() {
        let attribute = attribute.map_err(|e| Error::Xml(e.to_string()))?;
        let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
        let value = attribute.unescape_value()?.into_owned();
        element.attributes.push((key, value));
    }

    Ok(element)
}

fn attach(stack: &mut [Element], element: Element) {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(element);
    }
}

fn append_text(stack: &mut [Element], value: &str) {
    if let Some(current) = stack.last_mut() {
        current
            .text
            .get_or_insert_with(String::new)
            .push_str(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_escapes_text() {
        let doc = Element::new("hps:Block1")
            .child(Element::text("hps:CardHolderLastName", "Smith & <Sons>"))
            .to_document()
            .unwrap();
        assert!(doc.contains("<hps:CardHolderLastName>Smith &amp; &lt;Sons&gt;</hps:CardHolderLastName>"));
    }

    #[test]
    fn test_parse_drops_prefixes() {
        let root = Element::parse(
            r#"<?xml version="1.0"?><soap:Envelope xmlns:soap="urn:x"><soap:Body><A x="1"><B>b&amp;c</B><C/></A></soap:Body></soap:Envelope>"#,
        )
        .unwrap();
        assert_eq!(root.name, "Envelope");
        assert_eq!(root.text_at(&["Body", "A", "B"]), Some("b&c"));
        assert!(root.path(&["Body", "A", "C"]).is_some());
        assert_eq!(root.descendant("A").unwrap().attributes[0].1, "1");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(Element::parse("not xml at all").is_err());
    }

    #[test]
    fn test_flatten_shallow_leaf_wins() {
        let node = Element::new("Ver1.0")
            .child(
                Element::new("Header")
                    .child(Element::text("GatewayTxnId", "1001"))
                    .child(Element::text("RspCode", "deep")),
            )
            .child(Element::text("RspCode", "shallow"));
        let flat = node.flatten();
        assert_eq!(flat.get("GatewayTxnId").map(String::as_str), Some("1001"));
        assert_eq!(flat.get("RspCode").map(String::as_str), Some("shallow"));
    }
}

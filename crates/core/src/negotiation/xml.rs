//! XML to `serde_json::Value` conversion
//!
//! Elements become mappings keyed by child name. Repeated children collapse
//! into a sequence, attributes sit under `@attributes`, and an element that
//! only holds text becomes a string. Text next to attributes or children is
//! kept under `@text`. The root element itself is always a mapping.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde_json::{Map, Value};

use moneybird_domain::{MoneybirdError, Result};

const ATTRIBUTES_KEY: &str = "@attributes";
const TEXT_KEY: &str = "@text";

#[derive(Debug, Default)]
struct Element {
    name: String,
    attributes: Map<String, Value>,
    children: Map<String, Value>,
    text: String,
}

impl Element {
    fn open(start: &BytesStart<'_>) -> Result<Self> {
        let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let mut attributes = Map::new();
        for attribute in start.attributes() {
            let attribute = attribute.map_err(decode_error)?;
            let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
            let value = attribute.unescape_value().map_err(decode_error)?;
            attributes.insert(key, Value::String(value.into_owned()));
        }
        Ok(Self { name, attributes, ..Self::default() })
    }

    fn add_child(&mut self, name: String, value: Value) {
        match self.children.get_mut(&name) {
            Some(Value::Array(items)) => items.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
            None => {
                self.children.insert(name, value);
            }
        }
    }

    /// Value of a nested element.
    fn into_child_value(self) -> Value {
        if self.attributes.is_empty() && self.children.is_empty() {
            if self.text.is_empty() {
                return Value::Object(Map::new());
            }
            return Value::String(self.text);
        }
        self.into_mapping()
    }

    fn into_mapping(self) -> Value {
        let mut mapping = Map::new();
        if !self.attributes.is_empty() {
            mapping.insert(ATTRIBUTES_KEY.to_string(), Value::Object(self.attributes));
        }
        if !self.text.is_empty() {
            mapping.insert(TEXT_KEY.to_string(), Value::String(self.text));
        }
        mapping.extend(self.children);
        Value::Object(mapping)
    }
}

/// Convert an XML document into a mapping rooted at its document element.
pub(super) fn to_value(raw: &str) -> Result<Value> {
    let mut reader = Reader::from_str(raw);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Value> = None;

    loop {
        match reader.read_event().map_err(decode_error)? {
            Event::Start(start) => stack.push(Element::open(&start)?),
            Event::Empty(start) => {
                let element = Element::open(&start)?;
                close(element, &mut stack, &mut root);
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| MoneybirdError::Decode("unbalanced XML end tag".into()))?;
                close(element, &mut stack, &mut root);
            }
            Event::Text(text) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&text.unescape().map_err(decode_error)?);
                }
            }
            Event::CData(data) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&String::from_utf8_lossy(&data.into_inner()));
                }
            }
            Event::Eof => break,
            Event::Decl(_) | Event::PI(_) | Event::Comment(_) | Event::DocType(_) => {}
        }
    }

    if !stack.is_empty() {
        return Err(MoneybirdError::Decode("XML document ended inside an element".into()));
    }
    root.ok_or_else(|| MoneybirdError::Decode("XML document has no root element".into()))
}

fn close(element: Element, stack: &mut Vec<Element>, root: &mut Option<Value>) {
    match stack.last_mut() {
        Some(parent) => {
            let name = element.name.clone();
            parent.add_child(name, element.into_child_value());
        }
        None if root.is_none() => *root = Some(element.into_mapping()),
        None => {}
    }
}

fn decode_error(err: impl std::fmt::Display) -> MoneybirdError {
    MoneybirdError::Decode(format!("invalid XML: {err}"))
}

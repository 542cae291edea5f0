//! XML projection into the JSON tree shape.
//!
//! The document becomes an object keyed by the root element name. Attributes
//! are members with a reserved prefix, repeated sibling elements collapse into
//! arrays, and text-only elements become scalars.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::document::Format;
use crate::error::{DiffError, DiffResult};

/// Projection settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct XmlOptions {
    /// Prefix prepended to attribute names.
    pub attribute_prefix: String,
    /// Member holding the text of an element that also has attributes or children.
    pub text_key: String,
    /// Parse text content into numbers and booleans.
    pub parse_values: bool,
}

impl Default for XmlOptions {
    fn default() -> Self {
        Self {
            attribute_prefix: "@_".to_string(),
            text_key: "#text".to_string(),
            parse_values: true,
        }
    }
}

/// An element still being built.
struct Frame {
    name: String,
    members: Map<String, Value>,
    text: String,
}

/// Parse `text` as XML and project it into a tree.
pub fn parse_xml(text: &str, options: &XmlOptions) -> DiffResult<Value> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Frame> = Vec::new();
    let mut document = Map::new();

    loop {
        let event = reader
            .read_event()
            .map_err(|e| parse_error(format!("at byte {}: {e}", reader.buffer_position())))?;
        match event {
            Event::Start(start) => stack.push(open(&start, options)?),
            Event::Empty(start) => {
                let frame = open(&start, options)?;
                close(frame, &mut stack, &mut document, options)?;
            }
            Event::End(_) => {
                let frame = stack
                    .pop()
                    .ok_or_else(|| parse_error("closing tag without an open element"))?;
                close(frame, &mut stack, &mut document, options)?;
            }
            Event::Text(content) => {
                let content = content
                    .unescape()
                    .map_err(|e| parse_error(format!("bad text content: {e}")))?;
                append_text(&mut stack, &content);
            }
            Event::CData(content) => {
                let raw = content.into_inner();
                append_text(&mut stack, &String::from_utf8_lossy(&raw));
            }
            Event::Eof => break,
            // Declaration, comments, processing instructions and doctype.
            _ => {}
        }
    }

    if let Some(frame) = stack.last() {
        return Err(parse_error(format!("element <{}> is never closed", frame.name)));
    }
    if document.is_empty() {
        return Err(parse_error("document has no root element"));
    }
    Ok(Value::Object(document))
}

fn parse_error(message: impl Into<String>) -> DiffError {
    DiffError::Parse {
        format: Format::Xml,
        message: message.into(),
    }
}

fn open(start: &BytesStart<'_>, options: &XmlOptions) -> DiffResult<Frame> {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let mut members = Map::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| parse_error(format!("bad attribute on <{name}>: {e}")))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|e| parse_error(format!("bad value for attribute {key:?} on <{name}>: {e}")))?;
        members.insert(
            format!("{}{key}", options.attribute_prefix),
            Value::String(value.into_owned()),
        );
    }
    Ok(Frame {
        name,
        members,
        text: String::new(),
    })
}

fn append_text(stack: &mut [Frame], content: &str) {
    // Text outside the root element is ignored.
    if let Some(frame) = stack.last_mut() {
        frame.text.push_str(content);
    }
}

/// Finish `frame` and attach it to its parent, or to the document if it is a root.
fn close(
    frame: Frame,
    stack: &mut [Frame],
    document: &mut Map<String, Value>,
    options: &XmlOptions,
) -> DiffResult<()> {
    let Frame {
        name,
        mut members,
        text,
    } = frame;

    let value = if members.is_empty() {
        if text.is_empty() {
            Value::String(String::new())
        } else {
            scalar(&text, options)
        }
    } else {
        if !text.is_empty() {
            members.insert(options.text_key.clone(), scalar(&text, options));
        }
        Value::Object(members)
    };

    let parent = match stack.last_mut() {
        Some(parent) => &mut parent.members,
        None if document.is_empty() => document,
        None => {
            return Err(parse_error(format!(
                "second root element <{name}> after the document element"
            )))
        }
    };
    insert_child(parent, name, value);
    Ok(())
}

fn insert_child(parent: &mut Map<String, Value>, name: String, value: Value) {
    match parent.get_mut(&name) {
        Some(Value::Array(items)) => items.push(value),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, value]);
        }
        None => {
            parent.insert(name, value);
        }
    }
}

fn scalar(text: &str, options: &XmlOptions) -> Value {
    if options.parse_values {
        if let Some(value) = parse_scalar(text) {
            return value;
        }
    }
    Value::String(text.to_string())
}

/// Booleans and plain decimal numbers. Leading zeros and signs keep text as text.
fn parse_scalar(text: &str) -> Option<Value> {
    match text {
        "true" => return Some(Value::Bool(true)),
        "false" => return Some(Value::Bool(false)),
        _ => {}
    }

    let digits = text.strip_prefix('-').unwrap_or(text);
    let first = digits.chars().next()?;
    if !first.is_ascii_digit() {
        return None;
    }
    if first == '0' && digits.len() > 1 && !digits[1..].starts_with(['.', 'e', 'E']) {
        return None;
    }

    if let Ok(n) = text.parse::<i64>() {
        return Some(Value::Number(n.into()));
    }
    text.parse::<f64>()
        .ok()
        .filter(|f| f.is_finite())
        .and_then(Number::from_f64)
        .map(Value::Number)
}

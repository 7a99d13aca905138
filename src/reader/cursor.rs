//! Forward-only tag cursor over quick-xml
//!
//! The cursor always rests on a structural tag: a start tag (possibly
//! self-closing), an end tag, or end of input. Whitespace, comments,
//! processing instructions and the XML declaration are skipped. Entering a
//! self-closing element leaves the cursor on a synthetic end tag so callers
//! treat `<x/>` and `<x></x>` alike.

use std::io::BufRead;

use quick_xml::events::{BytesStart, Event};
use quick_xml::name::QName;
use quick_xml::Reader;

use super::error::DocumentError;

/// Default capacity of the input buffer
pub const DEFAULT_INPUT_BUFFER_SIZE: usize = 64 * 1024;

#[derive(Debug, Clone, PartialEq)]
enum Tag {
    Start {
        name: String,
        attributes: Vec<(String, String)>,
        empty: bool,
    },
    End {
        name: String,
    },
    Eof,
}

/// Pull cursor positioned on one structural tag at a time
pub struct TagCursor<R: BufRead> {
    reader: Reader<R>,
    buf: Vec<u8>,
    current: Tag,
}

impl<R: BufRead> TagCursor<R> {
    /// Create a cursor and move it to the first tag
    pub fn new(reader: R) -> Result<Self, DocumentError> {
        // Text is kept verbatim; whitespace between tags is skipped in `advance`
        let mut xml_reader = Reader::from_reader(reader);
        xml_reader.config_mut().trim_text(false);

        let mut cursor = Self {
            reader: xml_reader,
            buf: Vec::new(),
            current: Tag::Eof,
        };
        cursor.advance()?;
        Ok(cursor)
    }

    /// Read events until the next structural tag
    fn advance(&mut self) -> Result<(), DocumentError> {
        loop {
            self.buf.clear();
            let decoder = self.reader.decoder();
            match self.reader.read_event_into(&mut self.buf)? {
                Event::Start(e) => {
                    self.current = start_tag(&e, false, decoder)?;
                    return Ok(());
                }
                Event::Empty(e) => {
                    self.current = start_tag(&e, true, decoder)?;
                    return Ok(());
                }
                Event::End(e) => {
                    self.current = Tag::End {
                        name: std::str::from_utf8(e.name().as_ref())?.to_string(),
                    };
                    return Ok(());
                }
                Event::Eof => {
                    self.current = Tag::Eof;
                    return Ok(());
                }
                // Text between structural tags, comments, declarations
                _ => {}
            }
        }
    }

    /// Whether the cursor is on a start tag
    pub fn is_start(&self) -> bool {
        matches!(self.current, Tag::Start { .. })
    }

    /// Whether the cursor is on a start tag named `name`
    pub fn is_start_element(&self, name: &str) -> bool {
        matches!(&self.current, Tag::Start { name: n, .. } if n == name)
    }

    /// Whether the cursor is on an end tag
    pub fn is_end(&self) -> bool {
        matches!(self.current, Tag::End { .. })
    }

    /// Whether all input has been consumed
    pub fn is_eof(&self) -> bool {
        matches!(self.current, Tag::Eof)
    }

    /// Name of the current start or end tag
    pub fn current_name(&self) -> Option<&str> {
        match &self.current {
            Tag::Start { name, .. } | Tag::End { name } => Some(name),
            Tag::Eof => None,
        }
    }

    /// Whether the current start tag is self-closing
    pub fn is_empty_element(&self) -> bool {
        matches!(self.current, Tag::Start { empty: true, .. })
    }

    /// Human-readable description of the cursor position for errors
    pub fn describe(&self) -> String {
        match &self.current {
            Tag::Start { name, .. } => format!("<{name}>"),
            Tag::End { name } => format!("</{name}>"),
            Tag::Eof => "end of document".to_string(),
        }
    }

    /// Error for a tag the caller did not expect
    pub fn unexpected(&self, expected: impl Into<String>) -> DocumentError {
        DocumentError::UnexpectedElement {
            expected: expected.into(),
            found: self.describe(),
        }
    }

    /// Raw attribute value on the current start tag
    pub fn attribute(&self, name: &str) -> Option<&str> {
        match &self.current {
            Tag::Start { attributes, .. } => attributes
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.as_str()),
            _ => None,
        }
    }

    /// All attributes of the current start tag, in document order
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        let attributes = match &self.current {
            Tag::Start { attributes, .. } => attributes.as_slice(),
            _ => &[],
        };
        attributes.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Attribute value that must be present
    pub fn required_attribute(&self, name: &str) -> Result<&str, DocumentError> {
        self.attribute(name)
            .ok_or_else(|| DocumentError::MissingAttribute {
                element: self.current_name().unwrap_or_default().to_string(),
                attribute: name.to_string(),
            })
    }

    fn parse_attribute<T: std::str::FromStr>(&self, name: &str) -> Result<Option<T>, DocumentError> {
        match self.attribute(name) {
            None => Ok(None),
            Some(value) => value.trim().parse::<T>().map(Some).map_err(|_| {
                DocumentError::InvalidAttributeValue {
                    attribute: name.to_string(),
                    value: value.to_string(),
                }
            }),
        }
    }

    /// Boolean attribute, `default` when absent
    pub fn bool_attribute(&self, name: &str, default: bool) -> Result<bool, DocumentError> {
        Ok(self.nullable_bool_attribute(name)?.unwrap_or(default))
    }

    /// Optional boolean attribute (`true`/`false`/`1`/`0`)
    pub fn nullable_bool_attribute(&self, name: &str) -> Result<Option<bool>, DocumentError> {
        match self.attribute(name) {
            None => Ok(None),
            Some(value) => match value.trim().to_ascii_lowercase().as_str() {
                "true" | "1" => Ok(Some(true)),
                "false" | "0" => Ok(Some(false)),
                _ => Err(DocumentError::InvalidAttributeValue {
                    attribute: name.to_string(),
                    value: value.to_string(),
                }),
            },
        }
    }

    /// Integer attribute, `0` when absent
    pub fn int_attribute(&self, name: &str) -> Result<i32, DocumentError> {
        self.int_attribute_or(name, 0)
    }

    /// Integer attribute, `default` when absent
    pub fn int_attribute_or(&self, name: &str, default: i32) -> Result<i32, DocumentError> {
        Ok(self.nullable_int_attribute(name)?.unwrap_or(default))
    }

    /// Optional integer attribute
    pub fn nullable_int_attribute(&self, name: &str) -> Result<Option<i32>, DocumentError> {
        self.parse_attribute(name)
    }

    /// Single-precision attribute, `0` when absent
    pub fn float_attribute(&self, name: &str) -> Result<f32, DocumentError> {
        Ok(self.nullable_float_attribute(name)?.unwrap_or(0.0))
    }

    /// Optional single-precision attribute
    pub fn nullable_float_attribute(&self, name: &str) -> Result<Option<f32>, DocumentError> {
        self.parse_attribute(name)
    }

    /// Double-precision attribute, `0` when absent
    pub fn double_attribute(&self, name: &str) -> Result<f64, DocumentError> {
        Ok(self.nullable_double_attribute(name)?.unwrap_or(0.0))
    }

    /// Optional double-precision attribute
    pub fn nullable_double_attribute(&self, name: &str) -> Result<Option<f64>, DocumentError> {
        self.parse_attribute(name)
    }

    /// Step inside the current start tag.
    ///
    /// On a self-closing tag the cursor moves to a synthetic end tag.
    pub fn enter_element(&mut self) -> Result<(), DocumentError> {
        match &self.current {
            Tag::Start {
                name, empty: true, ..
            } => {
                self.current = Tag::End { name: name.clone() };
                Ok(())
            }
            Tag::Start { .. } => self.advance(),
            _ => Err(self.unexpected("a start tag")),
        }
    }

    /// Enter the current start tag, which must be named `name`
    pub fn enter_named(&mut self, name: &str) -> Result<(), DocumentError> {
        if !self.is_start_element(name) {
            return Err(self.unexpected(format!("<{name}>")));
        }
        self.enter_element()
    }

    /// Step past the current end tag
    pub fn exit_element(&mut self) -> Result<(), DocumentError> {
        if !self.is_end() {
            return Err(self.unexpected("an end tag"));
        }
        self.advance()
    }

    /// Step over the current element and everything inside it
    pub fn skip_element(&mut self) -> Result<(), DocumentError> {
        match &self.current {
            Tag::Start { empty: true, .. } => self.advance(),
            Tag::Start { name, .. } => {
                let name = name.clone();
                self.buf.clear();
                self.reader
                    .read_to_end_into(QName(name.as_bytes()), &mut self.buf)?;
                self.advance()
            }
            _ => Err(self.unexpected("a start tag")),
        }
    }

    /// Read the text content of the current element and step past it.
    ///
    /// The element must not contain child elements.
    pub fn read_element_text(&mut self) -> Result<String, DocumentError> {
        let name = match &self.current {
            Tag::Start { empty: true, .. } => {
                self.advance()?;
                return Ok(String::new());
            }
            Tag::Start { name, .. } => name.clone(),
            _ => return Err(self.unexpected("a start tag")),
        };
        let mut text = String::new();
        loop {
            self.buf.clear();
            match self.reader.read_event_into(&mut self.buf)? {
                Event::Text(t) => text.push_str(&t.unescape()?),
                Event::CData(c) => text.push_str(std::str::from_utf8(&c)?),
                Event::End(_) => break,
                Event::Start(e) | Event::Empty(e) => {
                    return Err(DocumentError::UnexpectedElement {
                        expected: format!("text content of <{name}>"),
                        found: format!("<{}>", String::from_utf8_lossy(e.name().as_ref())),
                    });
                }
                Event::Eof => {
                    return Err(DocumentError::UnexpectedElement {
                        expected: format!("</{name}>"),
                        found: "end of document".to_string(),
                    });
                }
                _ => {}
            }
        }
        self.advance()?;
        Ok(text)
    }

    /// Read the current element's text as a number and step past it
    pub fn read_element_f64(&mut self) -> Result<f64, DocumentError> {
        let element = self.current_name().unwrap_or_default().to_string();
        let text = self.read_element_text()?;
        text.trim()
            .parse::<f64>()
            .map_err(|_| DocumentError::InvalidElementValue {
                element,
                value: text,
            })
    }
}

fn start_tag(
    e: &BytesStart<'_>,
    empty: bool,
    decoder: quick_xml::encoding::Decoder,
) -> Result<Tag, DocumentError> {
    let name = std::str::from_utf8(e.name().as_ref())?.to_string();
    let mut attributes = Vec::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|e| DocumentError::Xml(quick_xml::Error::from(e)))?;
        let key = std::str::from_utf8(attr.key.as_ref())?.to_string();
        let value = attr.decode_and_unescape_value(decoder)?.into_owned();
        attributes.push((key, value));
    }
    Ok(Tag::Start {
        name,
        attributes,
        empty,
    })
}

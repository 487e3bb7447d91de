//! Shared strings table for Excel files.
//!
//! Excel uses a shared strings table to efficiently store string values.
//! Cells of type `s` carry an index into this table instead of the text.
//! The table is loaded once from `xl/sharedStrings.xml` and is read-only
//! afterwards, so a single instance can back any number of decode sessions.

use std::io::BufRead;

use quick_xml::Reader;
use quick_xml::events::Event;

use super::parsers::{decode_cdata, decode_text, resolve_reference};
use super::rich_text::plain_text;
use crate::common::{Error, Result};

// Performance: Pre-allocate typical capacities to reduce reallocations
const INITIAL_STRINGS_CAPACITY: usize = 1024;

/// Shared strings table for efficient string storage.
#[derive(Debug, Default, Clone)]
pub struct SharedStrings {
    strings: Vec<String>,
}

impl SharedStrings {
    /// Create a new empty shared strings table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse shared strings from xl/sharedStrings.xml content.
    pub fn parse(content: &str) -> Result<Self> {
        Self::from_reader(content.as_bytes())
    }

    /// Stream shared strings from a reader over xl/sharedStrings.xml.
    ///
    /// Each `<si>` yields one entry, in document order. Rich-text runs
    /// (`<r><t>..</t></r>`) are concatenated; phonetic runs (`<rPh>`) are
    /// skipped. An empty `<si/>` still occupies its index.
    pub fn from_reader<R: BufRead>(source: R) -> Result<Self> {
        let mut reader = Reader::from_reader(source);
        reader.config_mut().trim_text(false);

        let mut strings = Vec::with_capacity(INITIAL_STRINGS_CAPACITY);
        let mut current = String::new();
        let mut in_si = false;
        let mut in_t = false;
        let mut phonetic_depth = 0usize;
        let mut buf = Vec::with_capacity(1024);

        loop {
            buf.clear();
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) => match e.local_name().as_ref() {
                    b"si" => {
                        current.clear();
                        in_si = true;
                    },
                    b"rPh" => phonetic_depth += 1,
                    b"t" if in_si && phonetic_depth == 0 => in_t = true,
                    _ => {},
                },
                Event::Empty(e) if e.local_name().as_ref() == b"si" => {
                    strings.push(String::new());
                },
                Event::End(e) => match e.local_name().as_ref() {
                    b"si" => {
                        strings.push(plain_text(&current));
                        in_si = false;
                    },
                    b"rPh" => phonetic_depth = phonetic_depth.saturating_sub(1),
                    b"t" => in_t = false,
                    _ => {},
                },
                Event::Text(e) if in_t => current.push_str(&decode_text(&e)?),
                Event::CData(e) if in_t => current.push_str(&decode_cdata(&e)?),
                Event::GeneralRef(e) if in_t => current.push(resolve_reference(&e)?),
                Event::Eof => break,
                _ => {},
            }
        }

        if in_si {
            return Err(Error::Xml("sharedStrings.xml ended inside <si>".to_string()));
        }

        log::debug!("loaded {} shared strings", strings.len());
        Ok(SharedStrings { strings })
    }

    /// Get a string by its index.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&str> {
        self.strings.get(index).map(|s| s.as_str())
    }

    /// Get the number of strings in the table.
    #[inline]
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    /// Check if the table is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    /// Get all strings.
    pub fn strings(&self) -> &[String] {
        &self.strings
    }
}

impl<S: Into<String>> FromIterator<S> for SharedStrings {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        SharedStrings {
            strings: iter.into_iter().map(Into::into).collect(),
        }
    }
}

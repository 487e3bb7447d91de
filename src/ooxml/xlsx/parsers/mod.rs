//! XML parsing modules for Excel files.
//!
//! This module contains specialized parsers for different XML files
//! within an Excel workbook (.xlsx), plus the text helpers they share.

pub mod workbook_parser;
pub mod worksheet_parser;

use std::borrow::Cow;

use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::{BytesCData, BytesRef, BytesText};

use crate::common::{Error, Result};

/// Decode a text event into a string slice.
///
/// Entity references arrive as separate `GeneralRef` events and are resolved
/// by [`resolve_reference`].
#[inline]
pub(crate) fn decode_text<'a>(text: &'a BytesText<'_>) -> Result<Cow<'a, str>> {
    text.decode()
        .map_err(|e| Error::Xml(format!("text decoding error: {}", e)))
}

/// Decode a CDATA section into a string slice.
#[inline]
pub(crate) fn decode_cdata<'a>(cdata: &'a BytesCData<'_>) -> Result<Cow<'a, str>> {
    cdata
        .decode()
        .map_err(|e| Error::Xml(format!("CDATA decoding error: {}", e)))
}

/// Resolve a general entity or character reference (`&amp;`, `&#10;`, `&#x41;`).
///
/// Only the five predefined entities exist in SpreadsheetML parts; anything
/// else is an XML error.
pub(crate) fn resolve_reference(reference: &BytesRef<'_>) -> Result<char> {
    if let Some(ch) = reference.resolve_char_ref()? {
        return Ok(ch);
    }

    let name = reference.decode()?;
    resolve_predefined_entity(&name)
        .and_then(|text| text.chars().next())
        .ok_or_else(|| Error::Xml(format!("unknown entity reference: &{};", name)))
}

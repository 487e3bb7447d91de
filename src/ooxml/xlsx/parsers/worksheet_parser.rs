//! Streaming event source for worksheet XML (sheet1.xml, sheet2.xml, etc.).
//!
//! [`WorksheetEventReader`] pulls XML events from a `BufRead` and turns the
//! `sheetData` section into [`MarkupEvent`]s. Only one XML event is buffered
//! at a time, so arbitrarily large sheet parts can be decoded in constant
//! memory.

use std::collections::VecDeque;
use std::io::BufRead;

use quick_xml::Reader;
use quick_xml::encoding::Decoder;
use quick_xml::events::{BytesStart, Event};

use super::{decode_cdata, decode_text, resolve_reference};
use crate::common::{Error, Result};
use crate::ooxml::xlsx::reference::{column_letters, decode_reference};
use crate::ooxml::xlsx::stream::MarkupEvent;

/// Where text content currently goes.
#[derive(Debug, Default)]
struct TextScope {
    /// Inside `<v>`
    value: bool,
    /// Inside `<is>`
    inline: bool,
    /// Inside `<t>` of an inline string, outside phonetic runs
    inline_text: bool,
    /// Nesting depth of `<rPh>`
    phonetic_depth: usize,
}

impl TextScope {
    #[inline]
    fn capturing(&self) -> bool {
        self.value || self.inline_text
    }
}

#[derive(Debug, Default)]
struct SheetPosition {
    in_sheet_data: bool,
    last_row: u32,
    next_column: usize,
}

/// Iterator of [`MarkupEvent`]s over one worksheet part.
///
/// Rows without an `r` attribute are numbered after the previous row; cells
/// without an `r` attribute get the reference of the column after the
/// previous cell. Formula source text (`<f>`) and phonetic runs (`<rPh>`)
/// are never delivered.
pub struct WorksheetEventReader<R: BufRead> {
    reader: Reader<R>,
    buf: Vec<u8>,
    pending: VecDeque<MarkupEvent>,
    text: TextScope,
    position: SheetPosition,
    done: bool,
}

impl<R: BufRead> WorksheetEventReader<R> {
    /// Create an event source over a worksheet part.
    pub fn new(source: R) -> Self {
        let mut reader = Reader::from_reader(source);
        reader.config_mut().trim_text(false);

        WorksheetEventReader {
            reader,
            buf: Vec::with_capacity(4096),
            pending: VecDeque::with_capacity(4),
            text: TextScope::default(),
            position: SheetPosition::default(),
            done: false,
        }
    }

    /// Read XML until at least one markup event is pending or the part ends.
    fn fill(&mut self) -> Result<()> {
        let WorksheetEventReader {
            reader,
            buf,
            pending,
            text,
            position,
            done,
        } = self;

        while pending.is_empty() && !*done {
            buf.clear();
            let decoder = reader.decoder();
            match reader.read_event_into(buf)? {
                Event::Start(e) => {
                    on_start(&e, false, decoder, text, position, pending)?;
                },
                Event::Empty(e) => {
                    if e.local_name().as_ref() == b"sheetData" {
                        *done = true;
                    } else {
                        on_start(&e, true, decoder, text, position, pending)?;
                    }
                },
                Event::End(e) => {
                    if position.in_sheet_data {
                        match e.local_name().as_ref() {
                            b"sheetData" => {
                                position.in_sheet_data = false;
                                *done = true;
                            },
                            b"row" => pending.push_back(MarkupEvent::RowEnd),
                            b"c" => pending.push_back(MarkupEvent::CellEnd),
                            b"v" => {
                                text.value = false;
                                pending.push_back(MarkupEvent::ValueClose);
                            },
                            b"is" => {
                                text.inline = false;
                                text.inline_text = false;
                                pending.push_back(MarkupEvent::ValueClose);
                            },
                            b"t" => text.inline_text = false,
                            b"rPh" => text.phonetic_depth = text.phonetic_depth.saturating_sub(1),
                            _ => {},
                        }
                    }
                },
                Event::Text(e) if text.capturing() => {
                    pending.push_back(MarkupEvent::Characters(decode_text(&e)?.into_owned()));
                },
                Event::CData(e) if text.capturing() => {
                    pending.push_back(MarkupEvent::Characters(decode_cdata(&e)?.into_owned()));
                },
                Event::GeneralRef(e) if text.capturing() => {
                    let ch = resolve_reference(&e)?;
                    pending.push_back(MarkupEvent::Characters(ch.to_string()));
                },
                Event::Eof => *done = true,
                _ => {},
            }
        }
        Ok(())
    }
}

fn on_start(
    e: &BytesStart<'_>,
    empty: bool,
    decoder: Decoder,
    text: &mut TextScope,
    position: &mut SheetPosition,
    pending: &mut VecDeque<MarkupEvent>,
) -> Result<()> {
    let name = e.local_name();
    if !position.in_sheet_data {
        if name.as_ref() == b"sheetData" {
            position.in_sheet_data = true;
        }
        return Ok(());
    }

    match name.as_ref() {
        b"row" => {
            let row = row_number(e, decoder, position.last_row)?;
            position.last_row = row;
            position.next_column = 0;
            pending.push_back(MarkupEvent::RowStart(row));
            if empty {
                pending.push_back(MarkupEvent::RowEnd);
            }
        },
        b"c" => {
            pending.push_back(cell_start(e, decoder, position)?);
            if empty {
                pending.push_back(MarkupEvent::CellEnd);
            }
        },
        b"v" => {
            pending.push_back(MarkupEvent::ValueOpen);
            if empty {
                pending.push_back(MarkupEvent::ValueClose);
            } else {
                text.value = true;
            }
        },
        b"is" => {
            pending.push_back(MarkupEvent::ValueOpen);
            if empty {
                pending.push_back(MarkupEvent::ValueClose);
            } else {
                text.inline = true;
            }
        },
        b"t" if !empty && text.inline && text.phonetic_depth == 0 => text.inline_text = true,
        b"rPh" if !empty => text.phonetic_depth += 1,
        _ => {},
    }
    Ok(())
}

fn row_number(e: &BytesStart<'_>, decoder: Decoder, last_row: u32) -> Result<u32> {
    for attr in e.attributes() {
        let attr = attr?;
        if attr.key.local_name().as_ref() == b"r" {
            let value = attr.decode_and_unescape_value(decoder)?;
            let row: u32 = atoi_simd::parse(value.trim().as_bytes())
                .map_err(|_| Error::InvalidFormat(format!("invalid row number {:?}", value)))?;
            return Ok(row);
        }
    }
    Ok(last_row.saturating_add(1))
}

fn cell_start(e: &BytesStart<'_>, decoder: Decoder, position: &mut SheetPosition) -> Result<MarkupEvent> {
    let mut reference = None;
    let mut type_attr = None;
    let mut style_attr = None;

    for attr in e.attributes() {
        let attr = attr?;
        match attr.key.local_name().as_ref() {
            b"r" => reference = Some(attr.decode_and_unescape_value(decoder)?.into_owned()),
            b"t" => type_attr = Some(attr.decode_and_unescape_value(decoder)?.into_owned()),
            b"s" => style_attr = Some(attr.decode_and_unescape_value(decoder)?.into_owned()),
            _ => {},
        }
    }

    let reference = match reference {
        Some(reference) => {
            // Malformed references pass through; the decoder reports them.
            if let Ok(address) = decode_reference(&reference) {
                position.next_column = address.column + 1;
            }
            reference
        },
        None => {
            let synthesized = format!("{}{}", column_letters(position.next_column), position.last_row);
            position.next_column += 1;
            synthesized
        },
    };

    Ok(MarkupEvent::CellStart {
        reference,
        type_attr,
        style_attr,
    })
}

impl<R: BufRead> Iterator for WorksheetEventReader<R> {
    type Item = Result<MarkupEvent>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pending.is_empty()
            && let Err(e) = self.fill()
        {
            self.done = true;
            self.pending.clear();
            return Some(Err(e));
        }
        self.pending.pop_front().map(Ok)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn events(xml: &str) -> Vec<MarkupEvent> {
        WorksheetEventReader::new(xml.as_bytes())
            .collect::<Result<Vec<_>>>()
            .unwrap()
    }

    fn chars(text: &str) -> MarkupEvent {
        MarkupEvent::Characters(text.to_string())
    }

    #[test]
    fn test_rows_and_cells() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
  <dimension ref="A1:B2"/>
  <sheetData>
    <row r="1"><c r="A1" t="s"><v>0</v></c><c r="B1" s="2"><v>1.5</v></c></row>
    <row r="3"><c r="A3"/></row>
  </sheetData>
  <mergeCells count="0"/>
</worksheet>"#;

        assert_eq!(
            events(xml),
            vec![
                MarkupEvent::RowStart(1),
                MarkupEvent::cell("A1", Some("s"), None),
                MarkupEvent::ValueOpen,
                chars("0"),
                MarkupEvent::ValueClose,
                MarkupEvent::CellEnd,
                MarkupEvent::cell("B1", None, Some("2")),
                MarkupEvent::ValueOpen,
                chars("1.5"),
                MarkupEvent::ValueClose,
                MarkupEvent::CellEnd,
                MarkupEvent::RowEnd,
                MarkupEvent::RowStart(3),
                MarkupEvent::cell("A3", None, None),
                MarkupEvent::CellEnd,
                MarkupEvent::RowEnd,
            ]
        );
    }

    #[test]
    fn test_formula_source_is_skipped() {
        let xml = r#"<worksheet><sheetData><row r="1"><c r="A1" t="str"><f>CONCAT("a","b")</f><v>ab</v></c></row></sheetData></worksheet>"#;
        assert_eq!(
            events(xml),
            vec![
                MarkupEvent::RowStart(1),
                MarkupEvent::cell("A1", Some("str"), None),
                MarkupEvent::ValueOpen,
                chars("ab"),
                MarkupEvent::ValueClose,
                MarkupEvent::CellEnd,
                MarkupEvent::RowEnd,
            ]
        );
    }

    #[test]
    fn test_inline_string_runs() {
        let xml = r#"<worksheet><sheetData><row r="1"><c r="A1" t="inlineStr"><is><r><t>Tom </t></r><r><t>&amp; Jerry</t></r><rPh><t>x</t></rPh></is></c></row></sheetData></worksheet>"#;
        let collected: String = events(xml)
            .into_iter()
            .filter_map(|event| match event {
                MarkupEvent::Characters(text) => Some(text),
                _ => None,
            })
            .collect();
        assert_eq!(collected, "Tom & Jerry");
    }

    #[test]
    fn test_missing_references_are_synthesized() {
        let xml = r#"<worksheet><sheetData><row><c><v>1</v></c><c><v>2</v></c></row><row/></sheetData></worksheet>"#;
        let events = events(xml);
        assert_eq!(events[0], MarkupEvent::RowStart(1));
        assert_eq!(events[1], MarkupEvent::cell("A1", None, None));
        assert_eq!(events[6], MarkupEvent::cell("B1", None, None));
        assert_eq!(&events[11..], &[MarkupEvent::RowEnd, MarkupEvent::RowStart(2), MarkupEvent::RowEnd]);
    }

    #[test]
    fn test_empty_sheet_data() {
        assert!(events("<worksheet><sheetData/></worksheet>").is_empty());
        assert!(events("<worksheet></worksheet>").is_empty());
    }

    #[test]
    fn test_invalid_row_number() {
        let xml = r#"<worksheet><sheetData><row r="one"></row></sheetData></worksheet>"#;
        let result: Result<Vec<_>> = WorksheetEventReader::new(xml.as_bytes()).collect();
        assert!(matches!(result, Err(Error::InvalidFormat(_))));
    }
}

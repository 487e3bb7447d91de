//! XML parser for styles.xml file.
//!
//! Only the parts of styles.xml that influence a cell's textual value are
//! read: the custom number formats (`numFmts`) and the cell format records
//! (`cellXfs`). Fonts, fills, borders and named styles are skipped.

use std::collections::HashMap;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use super::{CellStyle, NumberFormat, StyleTable};
use crate::common::{Error, Result};

/// Parse styles from xl/styles.xml XML content.
pub fn parse_styles(content: &str) -> Result<StyleTable> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    let mut styles = StyleTable::new();
    let mut buf = Vec::with_capacity(1024);

    loop {
        buf.clear();
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"numFmts" => {
                    parse_number_formats(&mut reader, &mut styles.number_formats)?;
                },
                b"cellXfs" => {
                    parse_cell_xfs(&mut reader, &mut styles.cell_xfs)?;
                },
                _ => {},
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::Xml(format!("XML parsing error: {}", e)));
            },
            _ => {},
        }
    }

    log::debug!(
        "loaded style table: {} cell formats, {} custom number formats",
        styles.cell_xfs.len(),
        styles.number_formats.len()
    );

    Ok(styles)
}

/// Parse number formats section.
fn parse_number_formats(
    reader: &mut Reader<&[u8]>,
    number_formats: &mut HashMap<u32, NumberFormat>,
) -> Result<()> {
    let mut buf = Vec::with_capacity(512);

    loop {
        buf.clear();
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) if e.local_name().as_ref() == b"numFmt" => {
                let mut id = None;
                let mut code = None;

                for attr in e.attributes().flatten() {
                    match attr.key.local_name().as_ref() {
                        b"numFmtId" => {
                            if let Ok(value) = attr.decode_and_unescape_value(reader.decoder()) {
                                id = value.parse::<u32>().ok();
                            }
                        },
                        b"formatCode" => {
                            if let Ok(value) = attr.decode_and_unescape_value(reader.decoder()) {
                                code = Some(value.to_string());
                            }
                        },
                        _ => {},
                    }
                }

                if let (Some(id), Some(code)) = (id, code) {
                    number_formats.insert(id, NumberFormat::new(id, code));
                }
            },
            Ok(Event::End(e)) if e.local_name().as_ref() == b"numFmts" => break,
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Xml(format!("XML error in numFmts: {}", e))),
            _ => {},
        }
    }

    Ok(())
}

/// Parse cell XFs (cell format records).
fn parse_cell_xfs(reader: &mut Reader<&[u8]>, cell_xfs: &mut Vec<CellStyle>) -> Result<()> {
    let mut buf = Vec::with_capacity(512);

    loop {
        buf.clear();
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) if e.local_name().as_ref() == b"xf" => {
                let style = parse_xf_attributes(reader, &e);
                skip_to_xf_end(reader)?;
                cell_xfs.push(style);
            },
            Ok(Event::Empty(e)) if e.local_name().as_ref() == b"xf" => {
                cell_xfs.push(parse_xf_attributes(reader, &e));
            },
            Ok(Event::End(e)) if e.local_name().as_ref() == b"cellXfs" => break,
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Xml(format!("XML error in cellXfs: {}", e))),
            _ => {},
        }
    }

    Ok(())
}

/// Read the attributes of a single xf (format) element.
fn parse_xf_attributes(reader: &Reader<&[u8]>, start: &BytesStart) -> CellStyle {
    let mut style = CellStyle::new();

    for attr in start.attributes().flatten() {
        match attr.key.local_name().as_ref() {
            b"numFmtId" => {
                if let Ok(value) = attr.decode_and_unescape_value(reader.decoder()) {
                    style.num_fmt_id = value.parse::<u32>().ok();
                }
            },
            _ => {},
        }
    }

    style
}

/// Skip the children (alignment, protection) of a non-empty xf element.
fn skip_to_xf_end(reader: &mut Reader<&[u8]>) -> Result<()> {
    let mut buf = Vec::with_capacity(256);
    loop {
        buf.clear();
        match reader.read_event_into(&mut buf) {
            Ok(Event::End(e)) if e.local_name().as_ref() == b"xf" => break,
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Xml(format!("XML error in xf: {}", e))),
            _ => {},
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const STYLES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
  <numFmts count="2">
    <numFmt numFmtId="164" formatCode="yyyy&quot;年&quot;m&quot;月&quot;d&quot;日&quot;"/>
    <numFmt numFmtId="165" formatCode="0.000"/>
  </numFmts>
  <fonts count="1"><font><sz val="11"/><name val="Calibri"/></font></fonts>
  <cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs>
  <cellXfs count="4">
    <xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/>
    <xf numFmtId="14" fontId="0" fillId="0" borderId="0" xfId="0" applyNumberFormat="1"/>
    <xf numFmtId="164" fontId="0" fillId="0" borderId="0" xfId="0" applyNumberFormat="1">
      <alignment horizontal="center"/>
    </xf>
    <xf numFmtId="165" fontId="0" fillId="0" borderId="0" xfId="0" applyNumberFormat="1"/>
  </cellXfs>
</styleSheet>"#;

    #[test]
    fn test_parse_number_formats_and_cell_xfs() {
        let styles = parse_styles(STYLES_XML).unwrap();

        // cellStyleXfs must not leak into the cell formats
        assert_eq!(styles.cell_xfs.len(), 4);
        assert_eq!(styles.cell_xfs[1].num_fmt_id, Some(14));
        assert_eq!(styles.cell_xfs[0].num_fmt_id, Some(0));
        assert_eq!(styles.cell_xfs[2].num_fmt_id, Some(164));
        assert_eq!(styles.cell_xfs[3].num_fmt_id, Some(165));

        assert_eq!(styles.number_formats.len(), 2);
        assert_eq!(styles.number_formats[&164].code, "yyyy\"年\"m\"月\"d\"日\"");
        assert_eq!(styles.number_formats[&165].code, "0.000");
    }

    #[test]
    fn test_parse_empty_stylesheet() {
        let styles = parse_styles("<styleSheet/>").unwrap();
        assert!(styles.cell_xfs.is_empty());
        assert!(styles.number_formats.is_empty());
    }
}

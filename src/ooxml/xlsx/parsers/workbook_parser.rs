//! Parser for Excel workbook.xml files and their relationships.
//!
//! Sheet names live in `xl/workbook.xml`; each `<sheet>` points through a
//! relationship ID into `xl/_rels/workbook.xml.rels`, which names the part
//! holding the sheet's cells.

use std::collections::HashMap;

use quick_xml::Reader;
use quick_xml::events::Event;

use crate::common::{Error, Result};

// Performance: Pre-allocate typical capacity for worksheets
const INITIAL_SHEETS_CAPACITY: usize = 16;

/// One `<sheet>` entry of workbook.xml.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetEntry {
    /// Display name of the sheet
    pub name: String,
    /// Workbook-unique sheet ID
    pub sheet_id: u32,
    /// Relationship ID pointing at the worksheet part
    pub relationship_id: String,
}

/// Parse workbook.xml content into its sheet entries, in tab order.
pub fn parse_workbook_xml(content: &str) -> Result<Vec<SheetEntry>> {
    let mut reader = Reader::from_str(content);
    let mut sheets = Vec::with_capacity(INITIAL_SHEETS_CAPACITY);

    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"sheet" => {
                let mut name = None;
                let mut sheet_id = None;
                let mut relationship_id = None;

                for attr in e.attributes() {
                    let attr = attr?;
                    let value = attr.decode_and_unescape_value(reader.decoder())?;
                    // `r:id` is the only namespaced attribute on <sheet>
                    match (attr.key.prefix().is_some(), attr.key.local_name().as_ref()) {
                        (false, b"name") => name = Some(value.into_owned()),
                        (false, b"sheetId") => {
                            let id: std::result::Result<u32, _> = atoi_simd::parse(value.as_bytes());
                            sheet_id = id.ok();
                        },
                        (true, b"id") => relationship_id = Some(value.into_owned()),
                        _ => {},
                    }
                }

                match (name, relationship_id) {
                    (Some(name), Some(relationship_id)) => sheets.push(SheetEntry {
                        name,
                        sheet_id: sheet_id.unwrap_or(sheets.len() as u32 + 1),
                        relationship_id,
                    }),
                    (name, _) => {
                        log::warn!("ignoring workbook sheet entry without name or r:id: {:?}", name);
                    },
                }
            },
            Event::Eof => break,
            _ => {},
        }
    }

    Ok(sheets)
}

/// Parse workbook.xml.rels content into a relationship ID → part path map.
///
/// Targets are resolved against the `xl/` directory; absolute targets
/// (`/xl/worksheets/sheet1.xml`) are taken from the package root.
pub fn parse_workbook_rels(content: &str) -> Result<HashMap<String, String>> {
    let mut reader = Reader::from_str(content);
    let mut relationships = HashMap::with_capacity(INITIAL_SHEETS_CAPACITY);

    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"Relationship" => {
                let mut id = None;
                let mut target = None;
                let mut external = false;

                for attr in e.attributes() {
                    let attr = attr?;
                    let value = attr.decode_and_unescape_value(reader.decoder())?;
                    match attr.key.local_name().as_ref() {
                        b"Id" => id = Some(value.into_owned()),
                        b"Target" => target = Some(value.into_owned()),
                        b"TargetMode" => external = value.eq_ignore_ascii_case("External"),
                        _ => {},
                    }
                }

                if let (Some(id), Some(target), false) = (id, target, external) {
                    relationships.insert(id, resolve_target(&target));
                }
            },
            Event::Eof => break,
            _ => {},
        }
    }

    Ok(relationships)
}

/// Resolve a relationship target relative to `xl/`.
fn resolve_target(target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }

    let mut segments: Vec<&str> = vec!["xl"];
    for segment in target.split('/') {
        match segment {
            "" | "." => {},
            ".." => {
                segments.pop();
            },
            other => segments.push(other),
        }
    }
    segments.join("/")
}

/// Map sheet names to part paths, preserving tab order.
pub fn resolve_sheet_parts(
    sheets: Vec<SheetEntry>,
    relationships: &HashMap<String, String>,
) -> Result<Vec<(String, String)>> {
    sheets
        .into_iter()
        .map(|sheet| {
            let path = relationships.get(&sheet.relationship_id).ok_or_else(|| {
                Error::InvalidFormat(format!(
                    "sheet {:?} refers to missing relationship {}",
                    sheet.name, sheet.relationship_id
                ))
            })?;
            Ok((sheet.name, path.clone()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const WORKBOOK: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"
          xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
  <bookViews><workbookView activeTab="0"/></bookViews>
  <sheets>
    <sheet name="Data" sheetId="1" r:id="rId1"/>
    <sheet name="Q&amp;A" sheetId="4" r:id="rId2"/>
  </sheets>
</workbook>"#;

    const RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>
  <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="/xl/worksheets/sheet2.xml"/>
  <Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>
  <Relationship Id="rId9" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink" Target="https://example.com" TargetMode="External"/>
</Relationships>"#;

    #[test]
    fn test_parse_workbook_sheets() {
        let sheets = parse_workbook_xml(WORKBOOK).unwrap();
        assert_eq!(sheets.len(), 2);
        assert_eq!(sheets[0].name, "Data");
        assert_eq!(sheets[0].relationship_id, "rId1");
        assert_eq!(sheets[1].name, "Q&A");
        assert_eq!(sheets[1].sheet_id, 4);
    }

    #[test]
    fn test_parse_rels_targets() {
        let rels = parse_workbook_rels(RELS).unwrap();
        assert_eq!(rels.get("rId1").map(String::as_str), Some("xl/worksheets/sheet1.xml"));
        assert_eq!(rels.get("rId2").map(String::as_str), Some("xl/worksheets/sheet2.xml"));
        assert_eq!(rels.get("rId3").map(String::as_str), Some("xl/styles.xml"));
        assert!(!rels.contains_key("rId9"));
    }

    #[test]
    fn test_resolve_target_parent_segments() {
        assert_eq!(resolve_target("../xl/worksheets/sheet3.xml"), "xl/worksheets/sheet3.xml");
        assert_eq!(resolve_target("./worksheets/sheet1.xml"), "xl/worksheets/sheet1.xml");
    }

    #[test]
    fn test_resolve_sheet_parts() {
        let sheets = parse_workbook_xml(WORKBOOK).unwrap();
        let rels = parse_workbook_rels(RELS).unwrap();
        let parts = resolve_sheet_parts(sheets, &rels).unwrap();
        assert_eq!(
            parts,
            vec![
                ("Data".to_string(), "xl/worksheets/sheet1.xml".to_string()),
                ("Q&A".to_string(), "xl/worksheets/sheet2.xml".to_string()),
            ]
        );

        let missing = vec![SheetEntry {
            name: "Ghost".to_string(),
            sheet_id: 9,
            relationship_id: "rId42".to_string(),
        }];
        assert!(matches!(
            resolve_sheet_parts(missing, &rels),
            Err(Error::InvalidFormat(_))
        ));
    }
}

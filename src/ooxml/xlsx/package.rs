//! XLSX package access.
//!
//! [`XlsxPackage`] opens the ZIP container, loads the workbook-wide tables
//! once (styles and shared strings) and decodes individual sheets by name.
//! A sheet part is streamed straight from the archive into the decoder and
//! is never held in memory as a whole.

use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use zip::ZipArchive;
use zip::result::ZipError;

use super::options::DecodeOptions;
use super::parsers::workbook_parser::{parse_workbook_rels, parse_workbook_xml, resolve_sheet_parts};
use super::parsers::worksheet_parser::WorksheetEventReader;
use super::row::AcceptedRow;
use super::shared_strings::SharedStrings;
use super::stream::{SheetStreamDriver, SheetSummary};
use super::styles::StyleTable;
use super::value::CellIssue;
use crate::common::{Error, Result};

const WORKBOOK_PART: &str = "xl/workbook.xml";
const WORKBOOK_RELS_PART: &str = "xl/_rels/workbook.xml.rels";
const STYLES_PART: &str = "xl/styles.xml";
const SHARED_STRINGS_PART: &str = "xl/sharedStrings.xml";

/// Result of decoding one sheet to completion.
#[derive(Debug, Clone)]
pub struct SheetReport {
    /// Name of the decoded sheet
    pub sheet: String,
    /// Accepted rows in document order
    pub rows: Vec<AcceptedRow>,
    /// Cells skipped because of recoverable problems
    pub issues: Vec<CellIssue>,
    pub summary: SheetSummary,
}

/// Rows accepted before a session stopped, with the error that stopped it.
#[derive(Debug)]
pub struct PartialRead {
    pub rows: Vec<AcceptedRow>,
    pub error: Option<Error>,
}

impl PartialRead {
    /// Whether the whole sheet was decoded.
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }
}

/// An opened `.xlsx` workbook.
///
/// # Example
///
/// ```rust,no_run
/// use rowstream::ooxml::xlsx::{DecodeOptions, XlsxPackage};
///
/// let mut package = XlsxPackage::open("report.xlsx")?;
/// println!("sheets: {:?}", package.sheet_names());
///
/// let options = DecodeOptions::new().with_min_columns(4);
/// let report = package.read_sheet("Data", &options)?;
/// println!("{} rows accepted", report.summary.rows_accepted);
/// # Ok::<(), rowstream::Error>(())
/// ```
pub struct XlsxPackage<R: Read + Seek> {
    archive: ZipArchive<R>,
    /// (sheet name, part path) in tab order
    sheets: Vec<(String, String)>,
    styles: StyleTable,
    shared_strings: SharedStrings,
}

impl XlsxPackage<BufReader<File>> {
    /// Open an `.xlsx` file from disk.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        log::debug!("opening workbook {}", path.display());
        Self::from_reader(BufReader::new(file))
    }
}

impl<R: Read + Seek> XlsxPackage<R> {
    /// Load a workbook from any seekable reader.
    ///
    /// `xl/workbook.xml` and its relationships are required; a workbook
    /// without `styles.xml` or `sharedStrings.xml` gets empty tables.
    pub fn from_reader(reader: R) -> Result<Self> {
        let mut archive = ZipArchive::new(reader)?;

        let workbook = read_part_string(&mut archive, WORKBOOK_PART)?
            .ok_or_else(|| Error::PartNotFound(WORKBOOK_PART.to_string()))?;
        let rels = read_part_string(&mut archive, WORKBOOK_RELS_PART)?
            .ok_or_else(|| Error::PartNotFound(WORKBOOK_RELS_PART.to_string()))?;
        let sheets = resolve_sheet_parts(parse_workbook_xml(&workbook)?, &parse_workbook_rels(&rels)?)?;

        let styles = match read_part_string(&mut archive, STYLES_PART)? {
            Some(content) => StyleTable::parse(&content)?,
            None => StyleTable::new(),
        };

        let shared_strings = match archive.by_name(SHARED_STRINGS_PART) {
            Ok(part) => SharedStrings::from_reader(BufReader::new(part))?,
            Err(ZipError::FileNotFound) => SharedStrings::new(),
            Err(e) => return Err(e.into()),
        };

        log::debug!(
            "workbook loaded: {} sheets, {} shared strings, {} cell formats",
            sheets.len(),
            shared_strings.len(),
            styles.cell_style_count()
        );

        Ok(XlsxPackage {
            archive,
            sheets,
            styles,
            shared_strings,
        })
    }

    /// Sheet names in tab order.
    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// The workbook's style table.
    #[inline]
    pub fn styles(&self) -> &StyleTable {
        &self.styles
    }

    /// The workbook's shared-string table.
    #[inline]
    pub fn shared_strings(&self) -> &SharedStrings {
        &self.shared_strings
    }

    /// Decode the sheet called `name`.
    ///
    /// Any fatal decode error is returned as `Err`; an `Ok` report with
    /// [`SheetOutcome::Empty`](super::stream::SheetOutcome::Empty) means the
    /// sheet decoded cleanly but no row was accepted.
    pub fn read_sheet(&mut self, name: &str, options: &DecodeOptions) -> Result<SheetReport> {
        let path = self.sheet_path(name)?;
        log::debug!("decoding sheet {:?} from {}", name, path);

        let part = self.archive.by_name(&path)?;
        let mut driver = SheetStreamDriver::new(&self.styles, &self.shared_strings, options)?;
        driver.feed_all(WorksheetEventReader::new(BufReader::new(part)))?;
        let output = driver.finish()?;

        Ok(SheetReport {
            sheet: name.to_string(),
            rows: output.rows,
            issues: output.issues,
            summary: output.summary,
        })
    }

    /// Decode the sheet called `name`, keeping the rows accepted before a
    /// fatal error instead of discarding them.
    ///
    /// Rows of an incomplete read are only as trustworthy as the input up to
    /// the fault.
    pub fn read_sheet_partial(&mut self, name: &str, options: &DecodeOptions) -> PartialRead {
        let path = match self.sheet_path(name) {
            Ok(path) => path,
            Err(e) => return PartialRead { rows: Vec::new(), error: Some(e) },
        };
        let part = match self.archive.by_name(&path) {
            Ok(part) => part,
            Err(e) => return PartialRead { rows: Vec::new(), error: Some(e.into()) },
        };
        let mut driver = match SheetStreamDriver::new(&self.styles, &self.shared_strings, options) {
            Ok(driver) => driver,
            Err(e) => return PartialRead { rows: Vec::new(), error: Some(e) },
        };

        match driver.feed_all(WorksheetEventReader::new(BufReader::new(part))) {
            Ok(()) => match driver.finish() {
                Ok(output) => PartialRead { rows: output.rows, error: None },
                Err(e) => PartialRead { rows: Vec::new(), error: Some(e) },
            },
            Err(e) => {
                log::warn!("sheet {:?} aborted: {}", name, e);
                PartialRead { rows: driver.into_rows(), error: Some(e) }
            },
        }
    }

    fn sheet_path(&self, name: &str) -> Result<String> {
        self.sheets
            .iter()
            .find(|(sheet, _)| sheet == name)
            .map(|(_, path)| path.clone())
            .ok_or_else(|| Error::SheetNotFound(name.to_string()))
    }
}

/// Read a whole (small) part as UTF-8 text; `None` when the part is absent.
fn read_part_string<R: Read + Seek>(archive: &mut ZipArchive<R>, name: &str) -> Result<Option<String>> {
    let mut part = match archive.by_name(name) {
        Ok(part) => part,
        Err(ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    let mut content = String::with_capacity(part.size() as usize);
    part.read_to_string(&mut content)?;
    Ok(Some(content))
}

//! HTML table output for accepted rows.

use std::io::Write;

use crate::common::Result;
use crate::common::xml::escape_markup;
use crate::ooxml::xlsx::{AcceptedRow, column_letters};

/// HTML output settings.
#[derive(Debug, Clone, Default)]
pub struct HtmlOptions {
    /// Wrap the table in a full `<html>` document titled with the sheet name
    pub complete_page: bool,
    /// `class` attribute of the `<table>` element
    pub table_class: Option<String>,
    /// Emit a `<thead>` row of column letters (`A`, `B`, ...)
    pub column_heads: bool,
    /// Render absent cells as `&nbsp;` so they keep their borders
    pub nbsp_for_empty: bool,
}

impl HtmlOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_complete_page(mut self, complete_page: bool) -> Self {
        self.complete_page = complete_page;
        self
    }

    pub fn with_table_class(mut self, class: impl Into<String>) -> Self {
        self.table_class = Some(class.into());
        self
    }

    pub fn with_column_heads(mut self, column_heads: bool) -> Self {
        self.column_heads = column_heads;
        self
    }

    pub fn with_nbsp_for_empty(mut self, nbsp_for_empty: bool) -> Self {
        self.nbsp_for_empty = nbsp_for_empty;
        self
    }
}

/// Writes accepted rows as an HTML table, one `<tr>` per row.
#[derive(Debug, Clone, Default)]
pub struct HtmlTableWriter {
    options: HtmlOptions,
}

impl HtmlTableWriter {
    pub fn new(options: HtmlOptions) -> Self {
        HtmlTableWriter { options }
    }

    /// Write `rows` of the sheet `sheet_name` to `writer`.
    pub fn write_rows<W: Write>(&self, rows: &[AcceptedRow], sheet_name: &str, writer: &mut W) -> Result<()> {
        let title = escape_markup(sheet_name);

        if self.options.complete_page {
            writeln!(writer, "<!DOCTYPE html>")?;
            writeln!(writer, "<html>")?;
            writeln!(writer, "<head>")?;
            writeln!(writer, "<meta charset=\"utf-8\">")?;
            writeln!(writer, "<title>{}</title>", title)?;
            writeln!(writer, "</head>")?;
            writeln!(writer, "<body>")?;
        }

        match &self.options.table_class {
            Some(class) => writeln!(writer, "<table class=\"{}\">", escape_markup(class))?,
            None => writeln!(writer, "<table>")?,
        }
        writeln!(writer, "<caption>{}</caption>", title)?;

        let width = rows.iter().map(AcceptedRow::width).max().unwrap_or(0);
        if self.options.column_heads {
            writer.write_all(b"<thead>\n<tr>")?;
            for col_idx in 0..width {
                write!(writer, "<th>{}</th>", column_letters(col_idx))?;
            }
            writer.write_all(b"</tr>\n</thead>\n<tbody>\n")?;
        }

        let empty_cell: &[u8] = if self.options.nbsp_for_empty {
            b"<td>&nbsp;</td>"
        } else {
            b"<td></td>"
        };
        for row in rows {
            writer.write_all(b"<tr>")?;
            for col_idx in 0..width {
                match row.get(col_idx) {
                    Some(value) => write!(writer, "<td>{}</td>", escape_markup(value))?,
                    None => writer.write_all(empty_cell)?,
                }
            }
            writer.write_all(b"</tr>\n")?;
        }
        if self.options.column_heads {
            writeln!(writer, "</tbody>")?;
        }

        writeln!(writer, "</table>")?;
        if self.options.complete_page {
            writeln!(writer, "</body>")?;
            writeln!(writer, "</html>")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(writer: &HtmlTableWriter, rows: &[AcceptedRow], sheet: &str) -> String {
        let mut out = Vec::new();
        writer.write_rows(rows, sheet, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_table_fragment() {
        let rows = vec![
            AcceptedRow::new(vec![Some("Tom & Jerry".to_string()), None]),
            AcceptedRow::new(vec![Some("<b>".to_string())]),
        ];
        let html = render(&HtmlTableWriter::default(), &rows, "Q&A");
        assert_eq!(
            html,
            "<table>\n<caption>Q&amp;A</caption>\n\
             <tr><td>Tom &amp; Jerry</td><td></td></tr>\n\
             <tr><td>&lt;b&gt;</td><td></td></tr>\n\
             </table>\n"
        );
    }

    #[test]
    fn test_column_heads_and_blank_cells() {
        let rows = vec![AcceptedRow::new(vec![Some("1".to_string()), None, Some("3".to_string())])];
        let writer = HtmlTableWriter::new(HtmlOptions::new().with_column_heads(true).with_nbsp_for_empty(true));
        let html = render(&writer, &rows, "Sheet1");
        assert_eq!(
            html,
            "<table>\n<caption>Sheet1</caption>\n\
             <thead>\n<tr><th>A</th><th>B</th><th>C</th></tr>\n</thead>\n\
             <tbody>\n\
             <tr><td>1</td><td>&nbsp;</td><td>3</td></tr>\n\
             </tbody>\n\
             </table>\n"
        );
    }

    #[test]
    fn test_complete_page() {
        let writer = HtmlTableWriter::new(HtmlOptions::new().with_complete_page(true).with_table_class("grid"));
        let html = render(&writer, &[], "Data");
        assert!(html.starts_with("<!DOCTYPE html>\n<html>"));
        assert!(html.contains("<title>Data</title>"));
        assert!(html.contains("<table class=\"grid\">"));
        assert!(html.trim_end().ends_with("</html>"));
    }
}

use serde::{Deserialize, Serialize};

use super::event::MarkupEvent;
use crate::common::{Error, Result};
use crate::ooxml::xlsx::options::DecodeOptions;
use crate::ooxml::xlsx::reference::{column_letters, decode_reference};
use crate::ooxml::xlsx::row::{AcceptedRow, RowBuilder};
use crate::ooxml::xlsx::shared_strings::SharedStrings;
use crate::ooxml::xlsx::styles::StyleTable;
use crate::ooxml::xlsx::value::{CellContext, CellIssue, CellTypeTag, Resolved, resolve_value};

/// Decoder state between events.
#[derive(Debug, Clone, Copy)]
enum State<'a> {
    /// Between cells.
    Idle,
    /// A cell opened; its value has not started.
    CellOpen(CellContext<'a>),
    /// Accumulating the cell's value text.
    ValueOpen(CellContext<'a>),
}

/// How a completed session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SheetOutcome {
    /// The sheet decoded cleanly but no row passed the acceptance rule.
    Empty,
    /// The sheet decoded cleanly and produced at least one row.
    Completed,
}

/// Row counts of a completed session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetSummary {
    pub rows_seen: usize,
    pub rows_accepted: usize,
    pub rows_discarded: usize,
    pub recovered_cells: usize,
    pub outcome: SheetOutcome,
}

/// Everything a completed session produced.
#[derive(Debug, Clone)]
pub struct SessionOutput {
    pub rows: Vec<AcceptedRow>,
    pub issues: Vec<CellIssue>,
    pub summary: SheetSummary,
}

/// Event-driven state machine decoding one worksheet into rows.
///
/// Feed events in document order with [`feed`](Self::feed), then call
/// [`finish`](Self::finish). Any error returned by `feed` is fatal: the
/// session must be abandoned, although the rows accepted before the fault
/// remain available through [`into_rows`](Self::into_rows).
#[derive(Debug)]
pub struct SheetStreamDriver<'a> {
    styles: &'a StyleTable,
    shared: &'a SharedStrings,
    builder: RowBuilder,
    state: State<'a>,
    raw: String,
    current_row: Option<u32>,
    issues: Vec<CellIssue>,
    rows_seen: usize,
    rows_discarded: usize,
}

impl<'a> SheetStreamDriver<'a> {
    /// Start a session over borrowed tables.
    pub fn new(
        styles: &'a StyleTable,
        shared: &'a SharedStrings,
        options: &DecodeOptions,
    ) -> Result<Self> {
        options.validate()?;
        Ok(SheetStreamDriver {
            styles,
            shared,
            builder: RowBuilder::new(options.min_columns, options.required_column),
            state: State::Idle,
            raw: String::new(),
            current_row: None,
            issues: Vec::new(),
            rows_seen: 0,
            rows_discarded: 0,
        })
    }

    /// Process one event.
    pub fn feed(&mut self, event: MarkupEvent) -> Result<()> {
        match event {
            MarkupEvent::RowStart(row) => {
                if let Some(open) = self.current_row {
                    return Err(Error::UnexpectedEvent(format!(
                        "row {} started while row {} was still open",
                        row, open
                    )));
                }
                self.current_row = Some(row);
                self.state = State::Idle;
            },
            MarkupEvent::CellStart {
                reference,
                type_attr,
                style_attr,
            } => {
                if self.current_row.is_none() {
                    return Err(Error::UnexpectedEvent(format!(
                        "cell {} outside of a row",
                        reference
                    )));
                }
                // A previous cell whose value never closed stays absent.
                let ctx = self.open_cell(&reference, type_attr.as_deref(), style_attr.as_deref())?;
                self.state = State::CellOpen(ctx);
            },
            MarkupEvent::ValueOpen => match self.state {
                State::CellOpen(ctx) | State::ValueOpen(ctx) => {
                    self.raw.clear();
                    self.state = State::ValueOpen(ctx);
                },
                State::Idle => {
                    return Err(Error::UnexpectedEvent("value opened outside of a cell".to_string()));
                },
            },
            MarkupEvent::Characters(text) => {
                if let State::ValueOpen(_) = self.state {
                    self.raw.push_str(&text);
                }
            },
            MarkupEvent::ValueClose => match self.state {
                State::ValueOpen(ctx) => {
                    self.state = State::Idle;
                    self.close_value(ctx)?;
                },
                State::CellOpen(_) | State::Idle => {
                    return Err(Error::UnexpectedEvent("value closed before it opened".to_string()));
                },
            },
            MarkupEvent::CellEnd => self.state = State::Idle,
            MarkupEvent::RowEnd => self.end_row()?,
        }
        Ok(())
    }

    /// Feed every event from `events`, stopping at the first error.
    pub fn feed_all<I>(&mut self, events: I) -> Result<()>
    where
        I: IntoIterator<Item = Result<MarkupEvent>>,
    {
        for event in events {
            self.feed(event?)?;
        }
        Ok(())
    }

    /// Rows accepted so far.
    #[inline]
    pub fn rows(&self) -> &[AcceptedRow] {
        self.builder.rows()
    }

    /// Abandon the session, keeping the rows accepted before it stopped.
    pub fn into_rows(self) -> Vec<AcceptedRow> {
        self.builder.into_rows()
    }

    /// End the session once the event source is exhausted.
    pub fn finish(self) -> Result<SessionOutput> {
        if let Some(row) = self.current_row {
            return Err(Error::UnexpectedEvent(format!(
                "event source ended inside row {}",
                row
            )));
        }

        let rows = self.builder.into_rows();
        let summary = SheetSummary {
            rows_seen: self.rows_seen,
            rows_accepted: rows.len(),
            rows_discarded: self.rows_discarded,
            recovered_cells: self.issues.len(),
            outcome: if rows.is_empty() {
                SheetOutcome::Empty
            } else {
                SheetOutcome::Completed
            },
        };
        Ok(SessionOutput {
            rows,
            issues: self.issues,
            summary,
        })
    }

    fn open_cell(
        &self,
        reference: &str,
        type_attr: Option<&str>,
        style_attr: Option<&str>,
    ) -> Result<CellContext<'a>> {
        let address = decode_reference(reference)?;

        let style_index = match style_attr {
            Some(raw) => {
                let index: usize = atoi_simd::parse(raw.as_bytes()).map_err(|_| {
                    Error::InvalidFormat(format!("invalid style index {:?} on cell {}", raw, reference))
                })?;
                Some(index)
            },
            None => None,
        };
        let styles: &'a StyleTable = self.styles;
        let format = styles.resolve(style_index)?;

        Ok(CellContext {
            address,
            type_tag: CellTypeTag::from_type_attr(type_attr),
            format,
        })
    }

    fn close_value(&mut self, ctx: CellContext<'a>) -> Result<()> {
        match resolve_value(ctx, &self.raw, self.shared) {
            Resolved::Value(value) => self.builder.write(ctx.address.column, value),
            Resolved::Recovered(kind) => {
                let issue = CellIssue {
                    address: ctx.address,
                    kind,
                };
                log::warn!("skipping cell {}", issue);
                self.issues.push(issue);
                Ok(())
            },
        }
    }

    fn end_row(&mut self) -> Result<()> {
        let Some(row) = self.current_row else {
            return Err(Error::UnexpectedEvent("row ended before it started".to_string()));
        };

        if let State::CellOpen(ctx) | State::ValueOpen(ctx) = self.state {
            return Err(Error::UnexpectedRowEnd {
                row,
                reference: format!("{}{}", column_letters(ctx.address.column), ctx.address.row),
            });
        }

        self.rows_seen += 1;
        if self.builder.accept_or_discard() {
            log::trace!("row {} accepted", row);
        } else {
            self.rows_discarded += 1;
            log::trace!("row {} discarded", row);
        }
        self.current_row = None;
        Ok(())
    }
}

/// Decode a complete event sequence in one call.
///
/// # Example
///
/// ```rust
/// use rowstream::ooxml::xlsx::{DecodeOptions, MarkupEvent, SharedStrings, StyleTable, decode_events};
///
/// let shared: SharedStrings = ["Name"].into_iter().collect();
/// let events = vec![
///     MarkupEvent::RowStart(1),
///     MarkupEvent::cell("A1", Some("s"), None),
///     MarkupEvent::ValueOpen,
///     MarkupEvent::Characters("0".to_string()),
///     MarkupEvent::ValueClose,
///     MarkupEvent::CellEnd,
///     MarkupEvent::RowEnd,
/// ];
///
/// let output = decode_events(events, &StyleTable::new(), &shared, &DecodeOptions::new())?;
/// assert_eq!(output.rows[0].get(0), Some("Name"));
/// # Ok::<(), rowstream::Error>(())
/// ```
pub fn decode_events<I>(
    events: I,
    styles: &StyleTable,
    shared: &SharedStrings,
    options: &DecodeOptions,
) -> Result<SessionOutput>
where
    I: IntoIterator<Item = MarkupEvent>,
{
    let mut driver = SheetStreamDriver::new(styles, shared, options)?;
    for event in events {
        driver.feed(event)?;
    }
    driver.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::xlsx::styles::CellStyle;
    use crate::ooxml::xlsx::value::CellIssueKind;

    fn value_cell(reference: &str, type_attr: Option<&str>, style: Option<&str>, raw: &str) -> Vec<MarkupEvent> {
        vec![
            MarkupEvent::cell(reference, type_attr, style),
            MarkupEvent::ValueOpen,
            MarkupEvent::Characters(raw.to_string()),
            MarkupEvent::ValueClose,
            MarkupEvent::CellEnd,
        ]
    }

    fn row(number: u32, cells: Vec<Vec<MarkupEvent>>) -> Vec<MarkupEvent> {
        let mut events = vec![MarkupEvent::RowStart(number)];
        events.extend(cells.into_iter().flatten());
        events.push(MarkupEvent::RowEnd);
        events
    }

    fn options(min_columns: usize, required_column: usize) -> DecodeOptions {
        DecodeOptions::new()
            .with_min_columns(min_columns)
            .with_required_column(required_column)
    }

    #[test]
    fn test_two_row_scenario() {
        let shared: SharedStrings = ["Name", "Age"].into_iter().collect();
        let styles = StyleTable::new();

        let mut events = row(
            1,
            vec![
                value_cell("A1", Some("s"), None, "0"),
                value_cell("B1", Some("s"), None, "1"),
            ],
        );
        events.extend(row(2, vec![value_cell("B2", None, None, "30")]));

        let output = decode_events(events, &styles, &shared, &options(3, 0)).unwrap();
        assert_eq!(output.rows.len(), 1);
        assert_eq!(
            output.rows[0].cells(),
            &[Some("Name".to_string()), Some("Age".to_string()), None]
        );
        assert_eq!(output.summary.rows_seen, 2);
        assert_eq!(output.summary.rows_accepted, 1);
        assert_eq!(output.summary.rows_discarded, 1);
        assert_eq!(output.summary.outcome, SheetOutcome::Completed);
    }

    #[test]
    fn test_all_value_types() {
        let shared: SharedStrings = ["shared"].into_iter().collect();
        let mut styles = StyleTable::new();
        styles.push_cell_style(CellStyle::new());
        styles.push_cell_style(CellStyle::with_number_format(14));
        styles.push_cell_style(CellStyle::with_number_format(2));

        let events = row(
            1,
            vec![
                value_cell("A1", Some("b"), None, "0"),
                value_cell("B1", Some("e"), None, "#N/A"),
                value_cell("C1", Some("str"), None, "42"),
                value_cell("D1", Some("inlineStr"), None, "inline"),
                value_cell("E1", Some("s"), None, "0"),
                value_cell("F1", None, Some("1"), "44197"),
                value_cell("G1", None, Some("2"), "2.5"),
                value_cell("H1", None, None, "7"),
            ],
        );

        let output = decode_events(events, &styles, &shared, &options(8, 0)).unwrap();
        let cells: Vec<_> = output.rows[0].cells().iter().map(|c| c.as_deref()).collect();
        assert_eq!(
            cells,
            vec![
                Some("FALSE"),
                Some("\"ERROR:#N/A\""),
                Some("\"42\""),
                Some("\"inline\""),
                Some("shared"),
                Some("2021-01-01 00:00:00"),
                Some("2.50"),
                Some("7"),
            ]
        );
    }

    #[test]
    fn test_value_split_across_characters() {
        let shared = SharedStrings::new();
        let styles = StyleTable::new();
        let events = vec![
            MarkupEvent::RowStart(1),
            MarkupEvent::cell("A1", Some("inlineStr"), None),
            MarkupEvent::ValueOpen,
            MarkupEvent::Characters("Tom ".to_string()),
            MarkupEvent::Characters("& Jerry".to_string()),
            MarkupEvent::ValueClose,
            MarkupEvent::CellEnd,
            MarkupEvent::RowEnd,
        ];
        let output = decode_events(events, &styles, &shared, &options(1, 0)).unwrap();
        assert_eq!(output.rows[0].get(0), Some("\"Tom & Jerry\""));
    }

    #[test]
    fn test_empty_cells_stay_absent() {
        let shared = SharedStrings::new();
        let styles = StyleTable::new();
        let events = vec![
            MarkupEvent::RowStart(1),
            MarkupEvent::cell("A1", None, None),
            MarkupEvent::cell("B1", None, None),
            MarkupEvent::ValueOpen,
            MarkupEvent::Characters("1".to_string()),
            MarkupEvent::ValueClose,
            MarkupEvent::CellEnd,
            MarkupEvent::RowEnd,
        ];
        let output = decode_events(events, &styles, &shared, &options(3, 1)).unwrap();
        assert_eq!(output.rows[0].cells(), &[None, Some("1".to_string()), None]);
    }

    #[test]
    fn test_unclosed_value_is_dropped_at_next_cell() {
        let shared = SharedStrings::new();
        let styles = StyleTable::new();
        let events = vec![
            MarkupEvent::RowStart(1),
            MarkupEvent::cell("A1", None, None),
            MarkupEvent::ValueOpen,
            MarkupEvent::Characters("lost".to_string()),
            MarkupEvent::cell("B1", None, None),
            MarkupEvent::ValueOpen,
            MarkupEvent::Characters("kept".to_string()),
            MarkupEvent::ValueClose,
            MarkupEvent::CellEnd,
            MarkupEvent::RowEnd,
        ];
        let output = decode_events(events, &styles, &shared, &options(2, 1)).unwrap();
        assert_eq!(output.rows[0].cells(), &[None, Some("kept".to_string())]);
    }

    #[test]
    fn test_invalid_shared_string_is_recovered() {
        let shared: SharedStrings = ["Alpha"].into_iter().collect();
        let styles = StyleTable::new();
        let events = row(
            1,
            vec![
                value_cell("A1", None, None, "1"),
                value_cell("B1", Some("s"), None, "x"),
                value_cell("C1", Some("s"), None, "0"),
            ],
        );
        let output = decode_events(events, &styles, &shared, &options(3, 0)).unwrap();
        assert_eq!(
            output.rows[0].cells(),
            &[Some("1".to_string()), None, Some("Alpha".to_string())]
        );
        assert_eq!(output.issues.len(), 1);
        assert_eq!(
            output.issues[0].kind,
            CellIssueKind::SharedStringIndexInvalid("x".to_string())
        );
        assert_eq!(output.summary.recovered_cells, 1);
    }

    #[test]
    fn test_row_end_inside_cell_is_fatal() {
        let shared = SharedStrings::new();
        let styles = StyleTable::new();

        let mut driver = SheetStreamDriver::new(&styles, &shared, &options(2, 0)).unwrap();
        driver.feed(MarkupEvent::RowStart(4)).unwrap();
        driver.feed(MarkupEvent::cell("B4", None, None)).unwrap();
        driver.feed(MarkupEvent::ValueOpen).unwrap();
        let err = driver.feed(MarkupEvent::RowEnd).unwrap_err();
        assert!(err.is_protocol_violation());
        assert!(matches!(
            err,
            Error::UnexpectedRowEnd { row: 4, ref reference } if reference == "B4"
        ));

        let mut driver = SheetStreamDriver::new(&styles, &shared, &options(2, 0)).unwrap();
        driver.feed(MarkupEvent::RowStart(1)).unwrap();
        driver.feed(MarkupEvent::cell("A1", None, None)).unwrap();
        assert!(matches!(
            driver.feed(MarkupEvent::RowEnd),
            Err(Error::UnexpectedRowEnd { row: 1, .. })
        ));
    }

    #[test]
    fn test_fatal_errors() {
        let shared = SharedStrings::new();
        let styles = StyleTable::new();

        let bad_reference = row(1, vec![value_cell("12", None, None, "1")]);
        assert!(matches!(
            decode_events(bad_reference, &styles, &shared, &options(1, 0)),
            Err(Error::MalformedReference(_))
        ));

        let bad_style = row(1, vec![value_cell("A1", None, Some("3"), "1")]);
        assert!(matches!(
            decode_events(bad_style, &styles, &shared, &options(1, 0)),
            Err(Error::StyleIndexOutOfRange { index: 3, len: 0 })
        ));

        let too_wide = row(1, vec![value_cell("C1", None, None, "1")]);
        assert!(matches!(
            decode_events(too_wide, &styles, &shared, &options(2, 0)),
            Err(Error::ColumnOutOfRange { column: 2, width: 2 })
        ));

        let truncated = vec![MarkupEvent::RowStart(1)];
        assert!(matches!(
            decode_events(truncated, &styles, &shared, &options(1, 0)),
            Err(Error::UnexpectedEvent(_))
        ));
    }

    #[test]
    fn test_out_of_place_events_are_fatal() {
        let shared = SharedStrings::new();
        let styles = StyleTable::new();

        let mut driver = SheetStreamDriver::new(&styles, &shared, &options(1, 0)).unwrap();
        driver.feed(MarkupEvent::RowStart(1)).unwrap();
        let err = driver.feed(MarkupEvent::ValueOpen).unwrap_err();
        assert!(matches!(err, Error::UnexpectedEvent(ref msg) if msg.contains("outside of a cell")));

        let mut driver = SheetStreamDriver::new(&styles, &shared, &options(1, 0)).unwrap();
        driver.feed(MarkupEvent::RowStart(1)).unwrap();
        driver.feed(MarkupEvent::cell("A1", None, None)).unwrap();
        let err = driver.feed(MarkupEvent::ValueClose).unwrap_err();
        assert!(matches!(err, Error::UnexpectedEvent(ref msg) if msg.contains("before it opened")));

        let mut driver = SheetStreamDriver::new(&styles, &shared, &options(1, 0)).unwrap();
        driver.feed(MarkupEvent::RowStart(1)).unwrap();
        let err = driver.feed(MarkupEvent::RowStart(2)).unwrap_err();
        assert!(matches!(err, Error::UnexpectedEvent(ref msg) if msg.contains("row 1 was still open")));
        assert!(err.is_protocol_violation());

        let mut driver = SheetStreamDriver::new(&styles, &shared, &options(1, 0)).unwrap();
        assert!(matches!(
            driver.feed(MarkupEvent::cell("A1", None, None)),
            Err(Error::UnexpectedEvent(_))
        ));
    }

    #[test]
    fn test_partial_rows_survive_fatal_error() {
        let shared = SharedStrings::new();
        let styles = StyleTable::new();
        let mut events = row(1, vec![value_cell("A1", None, None, "1")]);
        events.extend(row(2, vec![value_cell("Z2", None, None, "2")]));

        let mut driver = SheetStreamDriver::new(&styles, &shared, &options(1, 0)).unwrap();
        let result = driver.feed_all(events.into_iter().map(Ok));
        assert!(result.is_err());
        let rows = driver.into_rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get(0), Some("1"));
    }

    #[test]
    fn test_empty_sheet_outcome() {
        let shared = SharedStrings::new();
        let styles = StyleTable::new();
        let output = decode_events(Vec::new(), &styles, &shared, &options(1, 0)).unwrap();
        assert_eq!(output.summary.outcome, SheetOutcome::Empty);
        assert_eq!(output.summary.rows_seen, 0);
    }
}

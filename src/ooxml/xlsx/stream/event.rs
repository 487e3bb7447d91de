//! Markup events delivered by a worksheet event source.

/// One structural event of a worksheet, in document order.
///
/// A well-formed stream nests as
/// `RowStart (CellStart [ValueOpen Characters* ValueClose] CellEnd)* RowEnd`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkupEvent {
    /// A row opens; carries its 1-based row number.
    RowStart(u32),
    /// A cell opens with its raw `r`, `t` and `s` attributes.
    CellStart {
        reference: String,
        type_attr: Option<String>,
        style_attr: Option<String>,
    },
    /// The cell's value text starts.
    ValueOpen,
    /// A fragment of value text, already unescaped.
    Characters(String),
    /// The cell's value text ends.
    ValueClose,
    CellEnd,
    RowEnd,
}

impl MarkupEvent {
    /// Convenience constructor for a cell start.
    pub fn cell(reference: &str, type_attr: Option<&str>, style_attr: Option<&str>) -> Self {
        MarkupEvent::CellStart {
            reference: reference.to_string(),
            type_attr: type_attr.map(str::to_string),
            style_attr: style_attr.map(str::to_string),
        }
    }
}

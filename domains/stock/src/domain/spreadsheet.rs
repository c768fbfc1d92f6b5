//! Spreadsheet rendering for stock exports
//!
//! A [`RenderedDocument`] is the in-memory table: one header row followed by
//! one row per line item, in input order. [`RenderedDocument::to_xlsx`]
//! serializes it to an XLSX workbook with a single `Sheet1` worksheet.

use rust_xlsxwriter::{Color, ColNum, Format, FormatAlign, RowNum, Workbook, XlsxError};
use thiserror::Error;

use super::entities::LineItem;

/// Worksheet name used for the export
pub const SHEET_NAME: &str = "Sheet1";

/// Fixed, positional header labels
pub const HEADERS: [&str; 8] = [
    "Item Name",
    "Cost Price",
    "Selling Price",
    "Available Quantity",
    "Min Quantity",
    "Item Code",
    "Group",
    "Unit",
];

/// Width applied to every column
pub const COLUMN_WIDTH: f64 = 15.0;

/// Header fill (light green)
pub const HEADER_FILL: u32 = 0xC6EFCE;

const HEADER_FONT_SIZE: f64 = 12.0;

/// Longest text a single XLSX cell holds, in characters
pub const MAX_CELL_CHARS: usize = 32_767;

/// MIME type of the serialized workbook
pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Too many rows for a worksheet: {0}")]
    TooManyRows(usize),

    #[error("XLSX error: {0}")]
    Xlsx(#[from] XlsxError),
}

/// Value of a single cell
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

/// Text cell cut to [`MAX_CELL_CHARS`] on a character boundary
fn text_cell(value: &str) -> CellValue {
    match value.char_indices().nth(MAX_CELL_CHARS) {
        Some((end, _)) => CellValue::Text(value[..end].to_string()),
        None => CellValue::from(value),
    }
}

impl LineItem {
    /// Cells for this item in header order
    ///
    /// Text longer than a cell can hold is truncated.
    pub fn cells(&self) -> [CellValue; 8] {
        [
            text_cell(&self.name),
            CellValue::Number(self.cost_price),
            CellValue::Number(self.selling_price),
            // Quantities beyond 2^53 lose precision; XLSX stores doubles only
            CellValue::Number(self.available_quantity as f64),
            CellValue::Number(self.min_quantity as f64),
            text_cell(&self.code),
            text_cell(&self.group),
            text_cell(&self.unit),
        ]
    }
}

/// Tabular export document
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedDocument {
    rows: Vec<Vec<CellValue>>,
}

impl RenderedDocument {
    /// Render line items under the fixed header
    pub fn render(items: &[LineItem]) -> Self {
        let mut rows: Vec<Vec<CellValue>> = Vec::with_capacity(items.len() + 1);
        rows.push(HEADERS.iter().map(|&label| label.into()).collect());

        for (index, item) in items.iter().enumerate() {
            tracing::trace!(row = index + 2, item = %item.name, "Rendering line item");
            rows.push(item.cells().to_vec());
        }

        Self { rows }
    }

    /// Total rows including the header
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        HEADERS.len()
    }

    pub fn header(&self) -> &[CellValue] {
        &self.rows[0]
    }

    /// Cell at a zero-based position; row 0 is the header
    pub fn cell(&self, row: usize, column: usize) -> Option<&CellValue> {
        self.rows.get(row).and_then(|cells| cells.get(column))
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    /// Serialize to XLSX bytes
    pub fn to_xlsx(&self) -> Result<Vec<u8>, RenderError> {
        let mut workbook = Workbook::new();

        let header_format = Format::new()
            .set_bold()
            .set_font_size(HEADER_FONT_SIZE)
            .set_align(FormatAlign::Center)
            .set_background_color(Color::RGB(HEADER_FILL));

        let worksheet = workbook.add_worksheet();
        worksheet.set_name(SHEET_NAME)?;

        for (row_index, cells) in self.rows.iter().enumerate() {
            let row = RowNum::try_from(row_index)
                .map_err(|_| RenderError::TooManyRows(self.rows.len()))?;

            for (column, value) in (0 as ColNum..).zip(cells) {
                match value {
                    CellValue::Text(text) if row == 0 => {
                        worksheet.write_string_with_format(row, column, text, &header_format)?
                    }
                    CellValue::Text(text) => worksheet.write_string(row, column, text)?,
                    CellValue::Number(number) => worksheet.write_number(row, column, *number)?,
                };
            }
        }

        for column in (0 as ColNum..).take(HEADERS.len()) {
            worksheet.set_column_width(column, COLUMN_WIDTH)?;
        }

        Ok(workbook.save_to_buffer()?)
    }
}

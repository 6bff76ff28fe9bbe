//! In-memory sheet model. Builders fill a [`SheetLayout`]; [`render`] turns
//! it into an `.xlsx` buffer with a single worksheet.

use rust_xlsxwriter::{Format, FormatAlign, FormatBorder, Workbook, XlsxError};

#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
}

impl CellValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            CellValue::Number(_) => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            CellValue::Text(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellStyle {
    Plain,
    /// 16pt bold, centered
    Title,
    Bold,
    /// Bold with a thin bottom border
    Header,
    /// `#,##0`
    Amount,
    /// `#,##0`, bold
    AmountBold,
}

impl CellStyle {
    fn format(self) -> Option<Format> {
        match self {
            CellStyle::Plain => None,
            CellStyle::Title => Some(
                Format::new()
                    .set_bold()
                    .set_font_size(16)
                    .set_align(FormatAlign::Center),
            ),
            CellStyle::Bold => Some(Format::new().set_bold()),
            CellStyle::Header => Some(
                Format::new()
                    .set_bold()
                    .set_border_bottom(FormatBorder::Thin),
            ),
            CellStyle::Amount => Some(Format::new().set_num_format("#,##0")),
            CellStyle::AmountBold => Some(Format::new().set_bold().set_num_format("#,##0")),
        }
    }
}

/// Zero-based cell position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct CellRef {
    pub row: u32,
    pub col: u16,
}

/// Spreadsheet-style address: `at('C', 3)` is cell C3.
pub const fn at(col: char, row: u32) -> CellRef {
    CellRef {
        row: row - 1,
        col: (col as u32 - 'A' as u32) as u16,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub pos: CellRef,
    pub value: CellValue,
    pub style: CellStyle,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MergedRange {
    pub first: CellRef,
    pub last: CellRef,
    pub text: String,
    pub style: CellStyle,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SheetLayout {
    pub name: String,
    pub cells: Vec<Cell>,
    pub merges: Vec<MergedRange>,
    /// (column, width in character units)
    pub column_widths: Vec<(u16, f64)>,
}

impl SheetLayout {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cells: Vec::new(),
            merges: Vec::new(),
            column_widths: Vec::new(),
        }
    }

    /// Writes text; empty strings leave the cell blank.
    pub fn text(&mut self, pos: CellRef, value: impl Into<String>) -> &mut Self {
        self.styled_text(pos, value, CellStyle::Plain)
    }

    pub fn styled_text(
        &mut self,
        pos: CellRef,
        value: impl Into<String>,
        style: CellStyle,
    ) -> &mut Self {
        let value = value.into();
        if !value.is_empty() {
            self.put(pos, CellValue::Text(value), style);
        }
        self
    }

    pub fn number(&mut self, pos: CellRef, value: f64, style: CellStyle) -> &mut Self {
        self.put(pos, CellValue::Number(value), style);
        self
    }

    pub fn merge(
        &mut self,
        first: CellRef,
        last: CellRef,
        text: impl Into<String>,
        style: CellStyle,
    ) -> &mut Self {
        self.merges.push(MergedRange {
            first,
            last,
            text: text.into(),
            style,
        });
        self
    }

    pub fn column_width(&mut self, col: char, width: f64) -> &mut Self {
        self.column_widths.push((at(col, 1).col, width));
        self
    }

    /// Later writes to the same position replace earlier ones.
    fn put(&mut self, pos: CellRef, value: CellValue, style: CellStyle) {
        match self.cells.iter_mut().find(|c| c.pos == pos) {
            Some(cell) => {
                cell.value = value;
                cell.style = style;
            }
            None => self.cells.push(Cell { pos, value, style }),
        }
    }

    pub fn cell(&self, pos: CellRef) -> Option<&Cell> {
        self.cells.iter().find(|c| c.pos == pos)
    }

    pub fn text_at(&self, pos: CellRef) -> Option<&str> {
        self.cell(pos).and_then(|c| c.value.as_text())
    }

    pub fn number_at(&self, pos: CellRef) -> Option<f64> {
        self.cell(pos).and_then(|c| c.value.as_number())
    }
}

/// Serializes a layout into `.xlsx` bytes.
pub fn render(layout: &SheetLayout) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(&layout.name)?;

    for (col, width) in &layout.column_widths {
        sheet.set_column_width(*col, *width)?;
    }

    for range in &layout.merges {
        let format = range.style.format().unwrap_or_else(Format::new);
        sheet.merge_range(
            range.first.row,
            range.first.col,
            range.last.row,
            range.last.col,
            &range.text,
            &format,
        )?;
    }

    for cell in &layout.cells {
        let CellRef { row, col } = cell.pos;
        match (&cell.value, cell.style.format()) {
            (CellValue::Text(s), None) => {
                sheet.write_string(row, col, s)?;
            }
            (CellValue::Text(s), Some(format)) => {
                sheet.write_string_with_format(row, col, s, &format)?;
            }
            (CellValue::Number(n), None) => {
                sheet.write_number(row, col, *n)?;
            }
            (CellValue::Number(n), Some(format)) => {
                sheet.write_number_with_format(row, col, *n, &format)?;
            }
        }
    }

    workbook.save_to_buffer()
}

// Reading and writing the workbooks.

use calamine::{open_workbook, DataType, Reader, Xlsx};
use rust_xlsxwriter::{Formula, Workbook};
use vote_history::{Cell, Worksheet};

use crate::wards::{table::Table, *};

pub const SHEET_NAME: &str = "Voters";

/// Writes the table as a plain workbook: the headers, then one row per voter,
/// all as text. Empty values are left blank.
pub fn write_table(table: &Table, path: &str) -> WardResult<()> {
    let mut workbook = Workbook::new();
    let sheet = workbook
        .add_worksheet()
        .set_name(SHEET_NAME)
        .context(WritingExcelSnafu { path })?;
    for (col, header) in table.headers.iter().enumerate() {
        let (r, c) = position_at(0, col)?;
        sheet
            .write_string(r, c, header)
            .context(WritingExcelSnafu { path })?;
    }
    for (ridx, row) in table.rows.iter().enumerate() {
        for (cidx, value) in row.iter().enumerate() {
            if value.is_empty() {
                continue;
            }
            let (r, c) = position_at(ridx + 1, cidx)?;
            sheet
                .write_string(r, c, value)
                .context(WritingExcelSnafu { path })?;
        }
    }
    sheet
        .set_freeze_panes(1, 0)
        .context(WritingExcelSnafu { path })?;
    workbook.save(path).context(WritingExcelSnafu { path })?;
    debug!("write_table: {}: {} rows", path, table.len());
    Ok(())
}

/// Loads the first worksheet of a workbook. Formulas take precedence over
/// their cached values.
pub fn load_worksheet(path: &str) -> WardResult<Worksheet> {
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu { path })?;
    let name = workbook
        .sheet_names()
        .first()
        .cloned()
        .context(EmptyExcelSnafu { path })?;
    let values = workbook
        .worksheet_range(&name)
        .context(EmptyExcelSnafu { path })?
        .context(OpeningExcelSnafu { path })?;
    let formulas = workbook
        .worksheet_formula(&name)
        .context(EmptyExcelSnafu { path })?
        .context(OpeningExcelSnafu { path })?;

    // Both ranges are addressed from A1 and may start further down.
    let (max_row, max_col) = [values.end(), formulas.end()]
        .iter()
        .flatten()
        .fold((0_u32, 0_u32), |(r, c), (er, ec)| (r.max(*er + 1), c.max(*ec + 1)));
    debug!("load_worksheet: {}: {}x{}", path, max_row, max_col);

    let mut rows: Vec<Vec<Cell>> = Vec::with_capacity(max_row as usize);
    for r in 0..max_row {
        let mut row: Vec<Cell> = Vec::with_capacity(max_col as usize);
        for c in 0..max_col {
            let cell = match formulas.get_value((r, c)) {
                Some(f) if !f.is_empty() => Cell::Formula(format!("={}", f)),
                _ => values.get_value((r, c)).map(read_cell).unwrap_or(Cell::Empty),
            };
            row.push(cell);
        }
        rows.push(row);
    }
    Ok(Worksheet::from_rows(rows))
}

fn read_cell(value: &DataType) -> Cell {
    match value {
        DataType::String(s) if s.is_empty() => Cell::Empty,
        DataType::String(s) => Cell::Text(s.clone()),
        DataType::Float(f) => Cell::Number(*f),
        DataType::Int(i) => Cell::Number(*i as f64),
        DataType::Bool(b) => Cell::Bool(*b),
        DataType::DateTime(f) => Cell::Number(*f),
        DataType::Error(e) => Cell::Text(e.to_string()),
        _ => Cell::Empty,
    }
}

/// Replaces the workbook at `path` with the content of the worksheet.
pub fn save_worksheet(ws: &Worksheet, path: &str) -> WardResult<()> {
    let mut workbook = Workbook::new();
    let sheet = workbook
        .add_worksheet()
        .set_name(SHEET_NAME)
        .context(WritingExcelSnafu { path })?;
    for (ridx, row) in ws.rows().enumerate() {
        for (cidx, cell) in row.iter().enumerate() {
            let (r, c) = position_at(ridx, cidx)?;
            let written = match cell {
                Cell::Empty => continue,
                Cell::Text(s) => sheet.write_string(r, c, s),
                Cell::Number(f) => sheet.write_number(r, c, *f),
                Cell::Bool(b) => sheet.write_boolean(r, c, *b),
                Cell::Formula(f) => sheet.write_formula(r, c, Formula::new(f)),
            };
            written.context(WritingExcelSnafu { path })?;
        }
    }
    sheet
        .set_freeze_panes(1, 0)
        .context(WritingExcelSnafu { path })?;
    workbook.save(path).context(WritingExcelSnafu { path })?;
    Ok(())
}

// 0-based row and column, in the types of the writer.
fn position_at(row: usize, col: usize) -> WardResult<(u32, u16)> {
    let r = match u32::try_from(row) {
        Ok(r) => r,
        Err(_) => whatever!("Row {} does not fit in a worksheet", row + 1),
    };
    let c = match u16::try_from(col) {
        Ok(c) => c,
        Err(_) => whatever!("Column {} does not fit in a worksheet", col + 1),
    };
    Ok((r, c))
}

use log::debug;
use std::collections::HashMap;
use std::fmt::Display;

use crate::config::{AugmentError, AugmentStage};

/// The largest column index a spreadsheet accepts (`XFD`).
pub const MAX_COLUMNS: usize = 16_384;

/// The content of one cell.
#[derive(PartialEq, Debug, Clone)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    /// The text of a formula, including the leading `=`. It is never evaluated here.
    Formula(String),
}

impl Cell {
    pub fn text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn formula(&self) -> Option<&str> {
        match self {
            Cell::Formula(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Cell {
        if s.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(s.to_string())
        }
    }
}

static EMPTY_CELL: Cell = Cell::Empty;

/// A flat worksheet: row 1 holds the headers, the following rows hold the data.
///
/// All the rows have the same width. Positions are 1-based, as in the
/// spreadsheet applications.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct Worksheet {
    rows: Vec<Vec<Cell>>,
}

impl Worksheet {
    pub fn from_headers<S: AsRef<str>>(headers: &[S]) -> Worksheet {
        let header_row = headers.iter().map(|h| Cell::from(h.as_ref())).collect();
        Worksheet {
            rows: vec![header_row],
        }
    }

    /// Builds a worksheet from raw rows. Short rows are padded with empty cells.
    pub fn from_rows(rows: Vec<Vec<Cell>>) -> Worksheet {
        let mut ws = Worksheet { rows };
        let width = ws.rows.iter().map(|r| r.len()).max().unwrap_or(0);
        ws.ensure_width(width);
        ws
    }

    pub fn push_row(&mut self, row: Vec<Cell>) {
        let width = self.max_column().max(row.len());
        self.rows.push(row);
        self.ensure_width(width);
    }

    /// The number of rows, header row included.
    pub fn max_row(&self) -> usize {
        self.rows.len()
    }

    pub fn max_column(&self) -> usize {
        self.rows.first().map(|r| r.len()).unwrap_or(0)
    }

    pub fn cell(&self, row: usize, col: usize) -> &Cell {
        if row == 0 || col == 0 {
            return &EMPTY_CELL;
        }
        self.rows
            .get(row - 1)
            .and_then(|r| r.get(col - 1))
            .unwrap_or(&EMPTY_CELL)
    }

    /// Writes a cell, growing the worksheet if needed.
    pub fn set_cell(&mut self, row: usize, col: usize, cell: Cell) {
        debug_assert!(row >= 1 && col >= 1, "positions are 1-based");
        if row == 0 || col == 0 {
            return;
        }
        let width = self.max_column().max(col);
        while self.rows.len() < row {
            self.rows.push(Vec::new());
        }
        self.ensure_width(width);
        self.rows[row - 1][col - 1] = cell;
    }

    /// The text of the header at this column, if it is a text cell.
    pub fn header(&self, col: usize) -> Option<&str> {
        self.cell(1, col).text()
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.rows.iter().map(|r| r.as_slice())
    }

    /// Inserts `amount` empty columns right before the column `at`.
    ///
    /// Every column at or after `at` moves right by `amount`, and the cell
    /// references of all the formulas are updated to follow them. Any position
    /// captured before this call must go through the returned shift.
    pub fn insert_columns(&mut self, at: usize, amount: usize) -> ColumnShift {
        let at = at.max(1);
        let shift = ColumnShift { at, amount };
        if amount == 0 {
            return shift;
        }
        debug!(
            "insert_columns: inserting {} column(s) before {} (width {})",
            amount,
            column_letter(at),
            self.max_column()
        );
        if at > self.max_column() + 1 {
            self.ensure_width(at - 1);
        }
        for row in self.rows.iter_mut() {
            row.splice(at - 1..at - 1, std::iter::repeat(Cell::Empty).take(amount));
            for cell in row.iter_mut() {
                if let Cell::Formula(f) = cell {
                    *f = shift_references(f, shift);
                }
            }
        }
        shift
    }

    fn ensure_width(&mut self, width: usize) {
        for row in self.rows.iter_mut() {
            if row.len() < width {
                row.resize(width, Cell::Empty);
            }
        }
    }
}

// ******** Header lookup *********

pub fn normalize_header(text: &str) -> String {
    text.trim().to_uppercase()
}

/// Finds the first header equal to `target`, ignoring case and surrounding spaces.
pub fn find_column(ws: &Worksheet, target: &str) -> Option<usize> {
    let target = normalize_header(target);
    (1..=ws.max_column()).find(|col| {
        ws.header(*col)
            .map(|h| normalize_header(h) == target)
            .unwrap_or(false)
    })
}

/// A snapshot of the header positions. It must be rebuilt after any column insertion.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct HeaderIndex {
    positions: HashMap<String, usize>,
}

impl HeaderIndex {
    pub fn build(ws: &Worksheet) -> HeaderIndex {
        let mut positions: HashMap<String, usize> = HashMap::new();
        for col in 1..=ws.max_column() {
            if let Some(h) = ws.header(col) {
                // The first occurrence wins.
                positions.entry(normalize_header(h)).or_insert(col);
            }
        }
        HeaderIndex { positions }
    }

    pub fn position(&self, header: &str) -> Option<usize> {
        self.positions.get(&normalize_header(header)).cloned()
    }

    pub fn require(&self, header: &str, stage: AugmentStage) -> Result<usize, AugmentError> {
        self.position(header)
            .ok_or_else(|| AugmentError::MissingRequiredColumn {
                header: header.to_string(),
                stage,
            })
    }
}

// ******** Column insertion *********

/// The effect of one column insertion on the positions captured before it.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct ColumnShift {
    pub at: usize,
    pub amount: usize,
}

impl ColumnShift {
    pub fn adjust(&self, col: usize) -> usize {
        if col >= self.at {
            col + self.amount
        } else {
            col
        }
    }

    pub fn adjust_all(&self, cols: &mut [usize]) {
        for col in cols.iter_mut() {
            *col = self.adjust(*col);
        }
    }
}

/// The spreadsheet name of a 1-based column: 1 is `A`, 27 is `AA`.
pub fn column_letter(col: usize) -> String {
    let mut letters: Vec<char> = Vec::new();
    let mut c = col;
    while c > 0 {
        let rem = (c - 1) % 26;
        letters.push((b'A' + rem as u8) as char);
        c = (c - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// The inverse of `column_letter`. Case is ignored.
pub fn column_number(letters: &str) -> Option<usize> {
    if letters.is_empty() {
        return None;
    }
    let mut res: usize = 0;
    for c in letters.chars() {
        if !c.is_ascii_alphabetic() {
            return None;
        }
        let digit = (c.to_ascii_uppercase() as usize) - ('A' as usize) + 1;
        res = res.checked_mul(26)?.checked_add(digit)?;
    }
    Some(res)
}

/// A single A1-style cell reference inside a formula.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct CellRef {
    pub col: usize,
    pub row: u32,
    pub col_absolute: bool,
    pub row_absolute: bool,
}

impl CellRef {
    fn shifted(self, shift: ColumnShift) -> CellRef {
        CellRef {
            col: shift.adjust(self.col),
            ..self
        }
    }
}

impl Display for CellRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let col_mark = if self.col_absolute { "$" } else { "" };
        let row_mark = if self.row_absolute { "$" } else { "" };
        write!(
            f,
            "{}{}{}{}",
            col_mark,
            column_letter(self.col),
            row_mark,
            self.row
        )
    }
}

/// Moves the references of a formula to follow a column insertion.
///
/// Only plain cell references are rewritten: text inside string literals,
/// function names and other identifiers stay as they are.
pub fn shift_references(formula: &str, shift: ColumnShift) -> String {
    let chars: Vec<char> = formula.chars().collect();
    let mut res = String::with_capacity(formula.len() + 4);
    let mut in_string = false;
    let mut idx = 0;
    while idx < chars.len() {
        let c = chars[idx];
        if c == '"' {
            // A doubled quote inside a literal toggles twice and stays inside.
            in_string = !in_string;
            res.push(c);
            idx += 1;
            continue;
        }
        let at_boundary = idx == 0 || !is_identifier_char(chars[idx - 1]);
        if !in_string && at_boundary {
            if let Some((len, cref)) = scan_reference(&chars[idx..]) {
                res.push_str(&cref.shifted(shift).to_string());
                idx += len;
                continue;
            }
        }
        res.push(c);
        idx += 1;
    }
    res
}

fn is_identifier_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '.' || c == '$'
}

// Reads a reference such as `F2`, `$F$2` or `AB$10` at the start of the slice.
fn scan_reference(chars: &[char]) -> Option<(usize, CellRef)> {
    let mut idx = 0;
    let col_absolute = chars.first() == Some(&'$');
    if col_absolute {
        idx += 1;
    }
    let letters_start = idx;
    while idx < chars.len() && chars[idx].is_ascii_alphabetic() {
        idx += 1;
    }
    let letters: String = chars[letters_start..idx].iter().collect();
    if letters.is_empty() || letters.len() > 3 {
        return None;
    }
    let row_absolute = chars.get(idx) == Some(&'$');
    if row_absolute {
        idx += 1;
    }
    let digits_start = idx;
    while idx < chars.len() && chars[idx].is_ascii_digit() {
        idx += 1;
    }
    if idx == digits_start {
        return None;
    }
    // `LOG10(` is a function, `A1B` is a name.
    if let Some(next) = chars.get(idx) {
        if next.is_alphanumeric() || *next == '_' || *next == '(' {
            return None;
        }
    }
    let col = column_number(&letters)?;
    if col > MAX_COLUMNS {
        return None;
    }
    let row: u32 = chars[digits_start..idx]
        .iter()
        .collect::<String>()
        .parse()
        .ok()?;
    if row == 0 {
        return None;
    }
    Some((
        idx,
        CellRef {
            col,
            row,
            col_absolute,
            row_absolute,
        },
    ))
}

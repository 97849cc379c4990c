//! Formula text for the derived columns.
//!
//! Every function here is pure: it takes a row number and the letters of the
//! columns to reference, and returns the text of a formula. Nothing is
//! evaluated; the application that opens the workbook computes the values.

pub const DISPLAY_LABEL: &str = "DISPLAY";
pub const STREET_NAME_LABEL: &str = "StreetName";

/// The summary block inserted after the ward column, in insertion order.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum SummaryColumn {
    Total,
    Dems,
    Reps,
    Muni,
    Latest,
    Both,
}

impl SummaryColumn {
    pub const ALL: [SummaryColumn; 6] = [
        SummaryColumn::Total,
        SummaryColumn::Dems,
        SummaryColumn::Reps,
        SummaryColumn::Muni,
        SummaryColumn::Latest,
        SummaryColumn::Both,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SummaryColumn::Total => "Total:",
            SummaryColumn::Dems => "Dems",
            SummaryColumn::Reps => "REPS",
            SummaryColumn::Muni => "Muni",
            SummaryColumn::Latest => "Latest",
            SummaryColumn::Both => "Both",
        }
    }

    /// The prefix of this value in the display column.
    pub fn tag(self) -> &'static str {
        match self {
            SummaryColumn::Total => "T",
            SummaryColumn::Dems => "D",
            SummaryColumn::Reps => "R",
            SummaryColumn::Muni => "M",
            SummaryColumn::Latest => "L",
            SummaryColumn::Both => "B",
        }
    }
}

/// A row-locked range such as `$F$2:$K$2`.
pub fn history_range(first: &str, last: &str, row: usize) -> String {
    format!("${}${}:${}${}", first, row, last, row)
}

pub fn total_formula(range: &str) -> String {
    format!("=COUNTA({})", range)
}

pub fn party_count_formula(range: &str, code: &str) -> String {
    format!("=COUNTIF({},{})", range, quote(code))
}

/// One point for each listed column equal to `code`.
pub fn equals_sum_formula(columns: &[String], row: usize, code: &str) -> String {
    let code = quote(code);
    sum_of_terms(
        columns
            .iter()
            .map(|c| format!("IF({}{}={},1,0)", c, row, code))
            .collect(),
    )
}

/// One point for each listed column that is not blank.
pub fn nonblank_sum_formula(columns: &[String], row: usize) -> String {
    sum_of_terms(
        columns
            .iter()
            .map(|c| format!("IF({}{}<>\"\",1,0)", c, row))
            .collect(),
    )
}

pub fn both_formula(dems: &str, reps: &str, row: usize) -> String {
    format!("=IF(AND({}{r}>0,{}{r}>0),1,0)", dems, reps, r = row)
}

/// Everything after the first space (the house number is dropped).
pub fn street_name_formula(address: &str, row: usize) -> String {
    let a = format!("{}{}", address, row);
    format!("=IFERROR(RIGHT({a},LEN({a})-FIND(\" \",{a})),{a})", a = a)
}

fn sum_of_terms(terms: Vec<String>) -> String {
    if terms.is_empty() {
        "=0".to_string()
    } else {
        format!("={}", terms.join("+"))
    }
}

fn quote(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

/// The resolved columns used by the summary formulas of one worksheet.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct SummaryLayout {
    pub history_first: String,
    pub history_last: String,
    pub odd_year: Vec<String>,
    pub recent: Vec<String>,
    pub dems: String,
    pub reps: String,
    pub democrat_code: String,
    pub republican_code: String,
}

impl SummaryLayout {
    pub fn formula(&self, column: SummaryColumn, row: usize) -> String {
        let range = history_range(&self.history_first, &self.history_last, row);
        match column {
            SummaryColumn::Total => total_formula(&range),
            SummaryColumn::Dems => party_count_formula(&range, &self.democrat_code),
            SummaryColumn::Reps => party_count_formula(&range, &self.republican_code),
            SummaryColumn::Muni => equals_sum_formula(&self.odd_year, row, &self.democrat_code),
            SummaryColumn::Latest => nonblank_sum_formula(&self.recent, row),
            SummaryColumn::Both => both_formula(&self.dems, &self.reps, row),
        }
    }
}

/// The resolved columns used by the display formula.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct DisplayLayout {
    pub last_name: String,
    pub birth_date: String,
    /// The summary columns, in the order of `SummaryColumn::ALL`.
    pub summary: Vec<String>,
}

impl DisplayLayout {
    /// `=B2&" "&LEFT(E2,4)&" T="&J2&...`: the last name, the birth year, then
    /// each summary value with its tag.
    pub fn formula(&self, row: usize) -> String {
        let mut res = format!(
            "={}{r}&\" \"&LEFT({}{r},4)",
            self.last_name,
            self.birth_date,
            r = row
        );
        for (column, letters) in SummaryColumn::ALL.iter().zip(self.summary.iter()) {
            res.push_str(&format!("&\" {}=\"&{}{}", column.tag(), letters, row));
        }
        res
    }
}

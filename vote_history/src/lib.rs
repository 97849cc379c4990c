mod config;
pub mod formulas;
pub mod history;
pub mod manual;
pub mod sheet;

use log::{debug, info};

pub use crate::config::*;
pub use crate::formulas::{SummaryColumn, DISPLAY_LABEL, STREET_NAME_LABEL};
pub use crate::sheet::{column_letter, find_column, Cell, ColumnShift, HeaderIndex, Worksheet};

use crate::formulas::{street_name_formula, DisplayLayout, SummaryLayout};
use crate::history::{check_contiguous, classify_history, first_history_column};
use crate::sheet::normalize_header;

/// Adds the summary, display and street name columns to a worksheet.
///
/// The states are run in a fixed order and each of them resolves the column
/// positions again after the previous insertion. On error the worksheet may be
/// partially modified and should be discarded.
///
/// Arguments:
/// * `ws` the worksheet to augment. Row 1 must hold the headers.
/// * `rules` the headers to look for and the classification rules.
pub fn augment_worksheet(
    ws: &mut Worksheet,
    rules: &AugmentRules,
) -> Result<AugmentReport, AugmentError> {
    info!(
        "Augmenting worksheet with {:?} data rows and {:?} columns",
        ws.max_row().saturating_sub(1),
        ws.max_column()
    );

    // Locate the required headers
    let stage = AugmentStage::LocateRequiredHeaders;
    let index = HeaderIndex::build(ws);
    let ward_col = index.require(&rules.ward_header, stage)?;
    let first_history = match &rules.first_history_header {
        Some(header) => index.require(header, stage)?,
        None => first_history_column(ws).ok_or_else(|| AugmentError::MissingRequiredColumn {
            header: "<vote history column>".to_string(),
            stage,
        })?,
    };
    check_contiguous(ws, first_history)?;
    // The history column is tracked by name from now on.
    let history_header = ws
        .header(first_history)
        .map(normalize_header)
        .unwrap_or_default();
    debug!(
        "augment_worksheet: ward column {}, first history column {} ({})",
        ward_col, first_history, history_header
    );

    // Insert the summary block right after the ward column
    let stage = AugmentStage::InsertSummaryColumns;
    debug!("augment_worksheet: {}", stage);
    let summary_shift = ws.insert_columns(ward_col + 1, SummaryColumn::ALL.len());
    let mut summary_cols: Vec<usize> = (0..SummaryColumn::ALL.len())
        .map(|i| summary_shift.at + i)
        .collect();
    for (column, col) in SummaryColumn::ALL.iter().zip(summary_cols.iter()) {
        ws.set_cell(1, *col, Cell::Text(column.label().to_string()));
    }

    // Classify the history columns at their new position
    let stage = AugmentStage::ClassifyHistoryColumns;
    let index = HeaderIndex::build(ws);
    let first = index.require(&history_header, stage)?;
    let last = ws.max_column();
    let subsets = classify_history(ws, first, last, &rules.history);
    info!(
        "History columns {}..{}: {} odd year, {} recent, {} unclassified",
        column_letter(first),
        column_letter(last),
        subsets.odd_year.len(),
        subsets.recent.len(),
        subsets.unclassified.len()
    );

    // Summary formulas
    let stage = AugmentStage::WriteSummaryFormulas;
    debug!("augment_worksheet: {}", stage);
    let summary_layout = SummaryLayout {
        history_first: column_letter(first),
        history_last: column_letter(last),
        odd_year: subsets.odd_year.iter().map(|c| column_letter(*c)).collect(),
        recent: subsets.recent.iter().map(|c| column_letter(*c)).collect(),
        dems: column_letter(summary_cols[1]),
        reps: column_letter(summary_cols[2]),
        democrat_code: rules.democrat_code.clone(),
        republican_code: rules.republican_code.clone(),
    };
    let data_rows = ws.max_row().saturating_sub(1);
    for row in 2..=ws.max_row() {
        for (column, col) in SummaryColumn::ALL.iter().zip(summary_cols.iter()) {
            ws.set_cell(row, *col, Cell::Formula(summary_layout.formula(*column, row)));
        }
    }

    // Name and address headers
    let stage = AugmentStage::LocateNameAddressHeaders;
    let index = HeaderIndex::build(ws);
    let first_name = index.require(&rules.first_name_header, stage)?;
    index.require(&rules.last_name_header, stage)?;
    index.require(&rules.birth_date_header, stage)?;
    index.require(&rules.address_header, stage)?;

    // Display column, right after the first name
    let stage = AugmentStage::InsertDisplayColumn;
    let display_shift = ws.insert_columns(first_name + 1, 1);
    display_shift.adjust_all(&mut summary_cols);
    let mut display_col = display_shift.at;
    ws.set_cell(1, display_col, Cell::Text(DISPLAY_LABEL.to_string()));
    let index = HeaderIndex::build(ws);
    let display_layout = DisplayLayout {
        last_name: column_letter(index.require(&rules.last_name_header, stage)?),
        birth_date: column_letter(index.require(&rules.birth_date_header, stage)?),
        summary: summary_cols.iter().map(|c| column_letter(*c)).collect(),
    };
    for row in 2..=ws.max_row() {
        ws.set_cell(row, display_col, Cell::Formula(display_layout.formula(row)));
    }

    // Street name column, right after the address
    let stage = AugmentStage::InsertStreetNameColumn;
    let index = HeaderIndex::build(ws);
    let address = index.require(&rules.address_header, stage)?;
    let street_shift = ws.insert_columns(address + 1, 1);
    street_shift.adjust_all(&mut summary_cols);
    display_col = street_shift.adjust(display_col);
    let street_col = street_shift.at;
    let address_letters = column_letter(address);
    ws.set_cell(1, street_col, Cell::Text(STREET_NAME_LABEL.to_string()));
    for row in 2..=ws.max_row() {
        ws.set_cell(
            row,
            street_col,
            Cell::Formula(street_name_formula(&address_letters, row)),
        );
    }

    let history_columns = (
        street_shift.adjust(display_shift.adjust(first)),
        ws.max_column(),
    );
    debug!(
        "augment_worksheet: done, summary {:?} display {} street {} history {:?}",
        summary_cols, display_col, street_col, history_columns
    );
    Ok(AugmentReport {
        data_rows,
        history_columns,
        odd_year_columns: subsets.odd_year.len(),
        recent_columns: subsets.recent.len(),
        unclassified_columns: subsets.unclassified.len(),
        summary_columns: summary_cols,
        display_column: display_col,
        street_name_column: street_col,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    const HEADERS: [&str; 11] = [
        "SOS_VOTERID",
        "LAST_NAME",
        "FIRST_NAME",
        "DATE_OF_BIRTH",
        "RESIDENTIAL_ADDRESS1",
        "PRECINCT_NAME",
        "WARD",
        "PRIMARY-03/07/2000",
        "GENERAL-11/07/2000",
        "PRIMARY-05/02/2023",
        "GENERAL-11/05/2024",
    ];

    fn voter(id: &str, last: &str, ward: &str, votes: [&str; 4]) -> Vec<Cell> {
        let mut row: Vec<Cell> = vec![
            id.into(),
            last.into(),
            "PAT".into(),
            "1970-01-01".into(),
            "123 MAIN ST".into(),
            "WARREN 1-A".into(),
            ward.into(),
        ];
        row.extend(votes.iter().map(|v| Cell::from(*v)));
        row
    }

    fn sample() -> Worksheet {
        let mut ws = Worksheet::from_headers(&HEADERS);
        ws.push_row(voter("OH1", "SMITH", "WARREN-WARD 1", ["D", "", "D", "R"]));
        ws.push_row(voter("OH2", "JONES", "WARREN-WARD 2", ["", "R", "", ""]));
        ws
    }

    fn headers(ws: &Worksheet) -> Vec<String> {
        (1..=ws.max_column())
            .map(|c| ws.header(c).unwrap_or("").to_string())
            .collect()
    }

    #[test]
    fn full_augmentation_layout() {
        init();
        let mut ws = sample();
        let report = augment_worksheet(&mut ws, &AugmentRules::for_year(2025)).unwrap();

        assert_eq!(
            headers(&ws),
            vec![
                "SOS_VOTERID",
                "LAST_NAME",
                "FIRST_NAME",
                "DISPLAY",
                "DATE_OF_BIRTH",
                "RESIDENTIAL_ADDRESS1",
                "StreetName",
                "PRECINCT_NAME",
                "WARD",
                "Total:",
                "Dems",
                "REPS",
                "Muni",
                "Latest",
                "Both",
                "PRIMARY-03/07/2000",
                "GENERAL-11/07/2000",
                "PRIMARY-05/02/2023",
                "GENERAL-11/05/2024",
            ]
        );
        assert_eq!(
            report,
            AugmentReport {
                data_rows: 2,
                history_columns: (16, 19),
                odd_year_columns: 1,
                recent_columns: 2,
                unclassified_columns: 0,
                summary_columns: vec![10, 11, 12, 13, 14, 15],
                display_column: 4,
                street_name_column: 7,
            }
        );

        // The formulas written before the later insertions follow their columns.
        let formulas: Vec<&str> = (10..=15)
            .map(|c| ws.cell(2, c).formula().unwrap_or(""))
            .collect();
        assert_eq!(
            formulas,
            vec![
                "=COUNTA($P$2:$S$2)",
                "=COUNTIF($P$2:$S$2,\"D\")",
                "=COUNTIF($P$2:$S$2,\"R\")",
                "=IF(R2=\"D\",1,0)",
                "=IF(R2<>\"\",1,0)+IF(S2<>\"\",1,0)",
                "=IF(AND(K2>0,L2>0),1,0)",
            ]
        );
        assert_eq!(
            ws.cell(3, 4).formula(),
            Some("=B3&\" \"&LEFT(E3,4)&\" T=\"&J3&\" D=\"&K3&\" R=\"&L3&\" M=\"&M3&\" L=\"&N3&\" B=\"&O3")
        );
        assert_eq!(
            ws.cell(3, 7).formula(),
            Some("=IFERROR(RIGHT(F3,LEN(F3)-FIND(\" \",F3)),F3)")
        );
        // Source values moved along.
        assert_eq!(ws.cell(2, 16), &Cell::Text("D".to_string()));
        assert_eq!(ws.cell(2, 19), &Cell::Text("R".to_string()));
        assert_eq!(ws.cell(3, 17), &Cell::Text("R".to_string()));
        assert_eq!(ws.cell(3, 9), &Cell::Text("WARREN-WARD 2".to_string()));
    }

    #[test]
    fn both_uses_the_final_party_columns() {
        init();
        let mut ws = sample();
        for i in 0..3 {
            ws.push_row(voter(&format!("OH{}", i + 3), "DOE", "WARREN-WARD 1", ["D"; 4]));
        }
        let report = augment_worksheet(&mut ws, &AugmentRules::for_year(2025)).unwrap();
        let dems = column_letter(report.summary_columns[1]);
        let reps = column_letter(report.summary_columns[2]);
        assert_eq!(
            ws.cell(5, report.summary_columns[5]).formula().map(|s| s.to_string()),
            Some(format!("=IF(AND({}5>0,{}5>0),1,0)", dems, reps))
        );
    }

    #[test]
    fn configured_first_history_column() {
        init();
        let mut ws = sample();
        let mut rules = AugmentRules::for_year(2025);
        rules.first_history_header = Some("primary-05/02/2023".to_string());
        let report = augment_worksheet(&mut ws, &rules).unwrap();
        assert_eq!(report.history_columns, (18, 19));
        assert_eq!(ws.cell(2, 10).formula(), Some("=COUNTA($R$2:$S$2)"));
        assert_eq!(ws.cell(2, 13).formula(), Some("=IF(R2=\"D\",1,0)"));
    }

    #[test]
    fn no_odd_year_elections() {
        let mut ws = Worksheet::from_headers(&[
            "LAST_NAME",
            "FIRST_NAME",
            "DATE_OF_BIRTH",
            "RESIDENTIAL_ADDRESS1",
            "WARD",
            "GENERAL-11/07/2000",
        ]);
        ws.push_row(vec![
            "DOE".into(),
            "JO".into(),
            "1980-02-03".into(),
            "9 ELM".into(),
            "W".into(),
            "".into(),
        ]);
        let report = augment_worksheet(&mut ws, &AugmentRules::for_year(2025)).unwrap();
        assert_eq!(report.odd_year_columns, 0);
        assert_eq!(report.recent_columns, 0);
        assert_eq!(ws.cell(2, report.summary_columns[3]).formula(), Some("=0"));
        assert_eq!(ws.cell(2, report.summary_columns[4]).formula(), Some("=0"));
    }

    #[test]
    fn header_only_worksheet() {
        let mut ws = Worksheet::from_headers(&HEADERS);
        let report = augment_worksheet(&mut ws, &AugmentRules::for_year(2025)).unwrap();
        assert_eq!(report.data_rows, 0);
        assert_eq!(ws.max_row(), 1);
        assert_eq!(ws.max_column(), 19);
    }

    #[test]
    fn missing_ward_leaves_worksheet_untouched() {
        let mut ws = Worksheet::from_headers(&["LAST_NAME", "PRIMARY-03/07/2000"]);
        let before = ws.clone();
        let res = augment_worksheet(&mut ws, &AugmentRules::for_year(2025));
        assert_eq!(
            res,
            Err(AugmentError::MissingRequiredColumn {
                header: "WARD".to_string(),
                stage: AugmentStage::LocateRequiredHeaders
            })
        );
        assert_eq!(ws, before);
    }

    #[test]
    fn missing_history_columns() {
        let mut ws = Worksheet::from_headers(&["WARD", "FIRST_NAME"]);
        let res = augment_worksheet(&mut ws, &AugmentRules::for_year(2025));
        assert!(matches!(
            res,
            Err(AugmentError::MissingRequiredColumn {
                stage: AugmentStage::LocateRequiredHeaders,
                ..
            })
        ));
    }

    #[test]
    fn missing_first_name_is_reported_at_its_stage() {
        let mut ws = Worksheet::from_headers(&["WARD", "GENERAL-11/07/2000"]);
        let res = augment_worksheet(&mut ws, &AugmentRules::for_year(2025));
        assert_eq!(
            res,
            Err(AugmentError::MissingRequiredColumn {
                header: "FIRST_NAME".to_string(),
                stage: AugmentStage::LocateNameAddressHeaders
            })
        );
    }

    #[test]
    fn trailing_column_after_history_is_rejected() {
        let mut ws = Worksheet::from_headers(&["WARD", "GENERAL-11/07/2000", "NOTES"]);
        let res = augment_worksheet(&mut ws, &AugmentRules::for_year(2025));
        assert_eq!(
            res,
            Err(AugmentError::NonContiguousHistory {
                header: "NOTES".to_string(),
                column: 3
            })
        );
    }
}

// ********* Configuration **********

use std::error::Error;
use std::fmt::Display;

pub const DEFAULT_WARD_HEADER: &str = "WARD";
pub const DEFAULT_FIRST_NAME_HEADER: &str = "FIRST_NAME";
pub const DEFAULT_LAST_NAME_HEADER: &str = "LAST_NAME";
pub const DEFAULT_BIRTH_DATE_HEADER: &str = "DATE_OF_BIRTH";
pub const DEFAULT_ADDRESS_HEADER: &str = "RESIDENTIAL_ADDRESS1";

/// Number of years before the reference year that still count as recent.
pub const DEFAULT_RECENT_WINDOW: i32 = 6;
pub const DEFAULT_RECENT_ELECTION_TYPES: [&str; 3] = ["PRIMARY", "GENERAL", "SPECIAL"];

pub const DEFAULT_DEMOCRAT_CODE: &str = "D";
pub const DEFAULT_REPUBLICAN_CODE: &str = "R";

/// Rules that govern the classification of the vote history columns.
///
/// The reference year is always given explicitly: the classification of the
/// recent elections does not depend on the clock of the machine.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct HistoryRules {
    pub reference_year: i32,
    pub recent_window: i32,
    /// Election type tokens (upper case) that count for the recency indicator.
    pub recent_election_types: Vec<String>,
}

impl HistoryRules {
    pub fn for_year(reference_year: i32) -> HistoryRules {
        HistoryRules {
            reference_year,
            recent_window: DEFAULT_RECENT_WINDOW,
            recent_election_types: DEFAULT_RECENT_ELECTION_TYPES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }

    /// The first year that is still considered recent.
    pub fn earliest_recent_year(&self) -> i32 {
        self.reference_year - self.recent_window
    }
}

/// The headers and codes used to augment a worksheet.
///
/// Header names are compared after trimming and upper-casing, on both sides.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct AugmentRules {
    pub ward_header: String,
    /// The header of the first vote history column. When not provided, the
    /// first header shaped like `<TYPE>-<MM>/<DD>/<YYYY>` is used.
    pub first_history_header: Option<String>,
    pub first_name_header: String,
    pub last_name_header: String,
    pub birth_date_header: String,
    pub address_header: String,
    pub democrat_code: String,
    pub republican_code: String,
    pub history: HistoryRules,
}

impl AugmentRules {
    pub fn for_year(reference_year: i32) -> AugmentRules {
        AugmentRules {
            ward_header: DEFAULT_WARD_HEADER.to_string(),
            first_history_header: None,
            first_name_header: DEFAULT_FIRST_NAME_HEADER.to_string(),
            last_name_header: DEFAULT_LAST_NAME_HEADER.to_string(),
            birth_date_header: DEFAULT_BIRTH_DATE_HEADER.to_string(),
            address_header: DEFAULT_ADDRESS_HEADER.to_string(),
            democrat_code: DEFAULT_DEMOCRAT_CODE.to_string(),
            republican_code: DEFAULT_REPUBLICAN_CODE.to_string(),
            history: HistoryRules::for_year(reference_year),
        }
    }
}

// ******** Augmentation states and results *********

/// The successive states of one augmentation run. There is no going back.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum AugmentStage {
    LocateRequiredHeaders,
    InsertSummaryColumns,
    ClassifyHistoryColumns,
    WriteSummaryFormulas,
    LocateNameAddressHeaders,
    InsertDisplayColumn,
    InsertStreetNameColumn,
    /// Saving is done by the caller, this state only exists for reporting.
    Persist,
}

impl Display for AugmentStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            AugmentStage::LocateRequiredHeaders => "locate required headers",
            AugmentStage::InsertSummaryColumns => "insert summary columns",
            AugmentStage::ClassifyHistoryColumns => "classify history columns",
            AugmentStage::WriteSummaryFormulas => "write summary formulas",
            AugmentStage::LocateNameAddressHeaders => "locate name and address headers",
            AugmentStage::InsertDisplayColumn => "insert display column",
            AugmentStage::InsertStreetNameColumn => "insert street name column",
            AugmentStage::Persist => "persist",
        };
        write!(f, "{}", name)
    }
}

/// Where the derived columns ended up once the worksheet is fully augmented.
///
/// All the positions are 1-based and valid for the final layout.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct AugmentReport {
    pub data_rows: usize,
    /// First and last vote history columns.
    pub history_columns: (usize, usize),
    pub odd_year_columns: usize,
    pub recent_columns: usize,
    /// Skipped by the aggregates because the year could not be decoded.
    pub unclassified_columns: usize,
    /// In the order Total, Dems, REPS, Muni, Latest, Both.
    pub summary_columns: Vec<usize>,
    pub display_column: usize,
    pub street_name_column: usize,
}

/// Errors that stop the augmentation of one worksheet.
///
/// The worksheet may have been partially modified and should not be saved.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum AugmentError {
    MissingRequiredColumn {
        header: String,
        stage: AugmentStage,
    },
    /// A column that is not a vote history column sits after the first one.
    NonContiguousHistory { header: String, column: usize },
}

impl Error for AugmentError {}

impl Display for AugmentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AugmentError::MissingRequiredColumn { header, stage } => {
                write!(f, "could not find column {:?} (while trying to {})", header, stage)
            }
            AugmentError::NonContiguousHistory { header, column } => write!(
                f,
                "column {} ({:?}) is not a vote history column but comes after the first one",
                column, header
            ),
        }
    }
}

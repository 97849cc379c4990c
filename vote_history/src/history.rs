use log::debug;
use std::ops::RangeInclusive;

use crate::config::{AugmentError, HistoryRules};
use crate::sheet::{normalize_header, Worksheet};

/// What can be read from a vote history header such as `GENERAL-11/03/2020`.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct HistoryHeader {
    /// The token before the dash, upper case.
    pub election_type: String,
    pub year: i32,
}

impl HistoryHeader {
    pub fn is_odd_year(&self) -> bool {
        self.year % 2 == 1
    }
}

/// Decodes the election type and the year of a history header.
///
/// The year is read from the last 4 characters. Any header that does not end
/// with 4 digits is not classified.
pub fn decode_history_header(text: &str) -> Option<HistoryHeader> {
    let trimmed = text.trim();
    let (election_type, _) = trimmed.split_once('-')?;
    let election_type = normalize_header(election_type);
    if election_type.is_empty() {
        return None;
    }
    let chars: Vec<char> = trimmed.chars().collect();
    if chars.len() < 4 {
        return None;
    }
    let tail = &chars[chars.len() - 4..];
    if !tail.iter().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let year = tail.iter().collect::<String>().parse::<i32>().ok()?;
    Some(HistoryHeader {
        election_type,
        year,
    })
}

/// True for headers with the overall shape `<TYPE>-<MM>/<DD>/<YYYY>`.
///
/// The date itself is not checked: `PRIMARY-XX/YY/20AB` has the shape of a
/// history header even though no year can be read from it.
pub fn looks_like_history(text: &str) -> bool {
    match text.trim().split_once('-') {
        Some((kind, date)) => {
            !kind.trim().is_empty()
                && kind
                    .chars()
                    .all(|c| c.is_alphabetic() || c == '_' || c == ' ')
                && date.matches('/').count() == 2
        }
        None => false,
    }
}

/// The first column whose header has the shape of a vote history column.
pub fn first_history_column(ws: &Worksheet) -> Option<usize> {
    (1..=ws.max_column()).find(|col| ws.header(*col).map(looks_like_history).unwrap_or(false))
}

/// Checks that all the columns from `first` to the end are history columns.
pub fn check_contiguous(ws: &Worksheet, first: usize) -> Result<(), AugmentError> {
    for col in first..=ws.max_column() {
        let header = ws.header(col).unwrap_or("");
        if !looks_like_history(header) {
            return Err(AugmentError::NonContiguousHistory {
                header: header.to_string(),
                column: col,
            });
        }
    }
    Ok(())
}

/// The vote history columns, split by the indicators that use them.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct HistorySubsets {
    pub first: usize,
    pub last: usize,
    /// Elections held on an odd year (municipal elections).
    pub odd_year: Vec<usize>,
    /// Elections of a recognized type held within the recent window.
    pub recent: Vec<usize>,
    /// Columns for which no year could be read.
    pub unclassified: Vec<usize>,
}

impl HistorySubsets {
    /// Every column of the history range, classified or not.
    pub fn full(&self) -> RangeInclusive<usize> {
        self.first..=self.last
    }
}

pub fn classify_history(
    ws: &Worksheet,
    first: usize,
    last: usize,
    rules: &HistoryRules,
) -> HistorySubsets {
    let earliest_recent = rules.earliest_recent_year();
    let recent_types: Vec<String> = rules
        .recent_election_types
        .iter()
        .map(|t| normalize_header(t))
        .collect();

    let mut odd_year: Vec<usize> = Vec::new();
    let mut recent: Vec<usize> = Vec::new();
    let mut unclassified: Vec<usize> = Vec::new();
    for col in first..=last {
        let decoded = ws.header(col).and_then(decode_history_header);
        match decoded {
            Some(h) => {
                if h.is_odd_year() {
                    odd_year.push(col);
                }
                if h.year >= earliest_recent && recent_types.contains(&h.election_type) {
                    recent.push(col);
                }
            }
            None => {
                debug!(
                    "classify_history: no year in header {:?} at column {}, skipping",
                    ws.header(col),
                    col
                );
                unclassified.push(col);
            }
        }
    }
    debug!(
        "classify_history: columns {}..={}: odd year {:?} recent {:?}",
        first, last, odd_year, recent
    );
    HistorySubsets {
        first,
        last,
        odd_year,
        recent,
        unclassified,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheet::Cell;

    fn history_sheet(headers: &[&str]) -> Worksheet {
        let mut ws = Worksheet::from_headers(headers);
        ws.push_row(headers.iter().map(|_| Cell::Empty).collect());
        ws
    }

    #[test]
    fn decode_headers() {
        assert_eq!(
            decode_history_header("PRIMARY-03/05/2019"),
            Some(HistoryHeader {
                election_type: "PRIMARY".to_string(),
                year: 2019
            })
        );
        assert_eq!(
            decode_history_header(" general-11/03/2020 ").map(|h| (h.election_type, h.year)),
            Some(("GENERAL".to_string(), 2020))
        );
        assert_eq!(decode_history_header("PRIMARY-XX/YY/20AB"), None);
        assert_eq!(decode_history_header("WARD"), None);
        assert_eq!(decode_history_header("-2020"), None);
    }

    #[test]
    fn header_shapes() {
        assert!(looks_like_history("PRIMARY-03/07/2000"));
        assert!(looks_like_history("PRIMARY-XX/YY/20AB"));
        assert!(looks_like_history("special-08/08/2023"));
        assert!(!looks_like_history("WARD"));
        assert!(!looks_like_history("PRECINCT-CODE"));
        assert!(!looks_like_history("03/07/2000"));
    }

    #[test]
    fn odd_years_and_unparsable_years() {
        let ws = history_sheet(&[
            "WARD",
            "PRIMARY-03/05/2019",
            "GENERAL-11/03/2020",
            "PRIMARY-XX/YY/20AB",
        ]);
        let subsets = classify_history(&ws, 2, 4, &HistoryRules::for_year(2020));
        assert_eq!(subsets.odd_year, vec![2]);
        assert_eq!(subsets.recent, vec![2, 3]);
        assert_eq!(subsets.unclassified, vec![4]);
        assert_eq!(subsets.full(), 2..=4);
    }

    #[test]
    fn recent_window_is_relative_to_reference_year() {
        let ws = history_sheet(&[
            "GENERAL-11/07/2017",
            "GENERAL-11/06/2018",
            "SPECIAL-08/08/2023",
            "LOCAL-05/02/2023",
        ]);
        let subsets = classify_history(&ws, 1, 4, &HistoryRules::for_year(2024));
        assert_eq!(subsets.recent, vec![2, 3]);
        let subsets = classify_history(&ws, 1, 4, &HistoryRules::for_year(2023));
        assert_eq!(subsets.recent, vec![1, 2, 3]);

        let mut rules = HistoryRules::for_year(2024);
        rules.recent_election_types = vec!["local".to_string()];
        rules.recent_window = 1;
        assert_eq!(classify_history(&ws, 1, 4, &rules).recent, vec![4]);
    }

    #[test]
    fn contiguity() {
        let ws = history_sheet(&["WARD", "PRIMARY-03/07/2000", "GENERAL-11/07/2000"]);
        assert_eq!(first_history_column(&ws), Some(2));
        assert_eq!(check_contiguous(&ws, 2), Ok(()));

        let ws = history_sheet(&["WARD", "PRIMARY-03/07/2000", "NOTES", "GENERAL-11/07/2000"]);
        assert_eq!(
            check_contiguous(&ws, 2),
            Err(AugmentError::NonContiguousHistory {
                header: "NOTES".to_string(),
                column: 3
            })
        );
        assert_eq!(first_history_column(&history_sheet(&["WARD", "CITY"])), None);
    }
}

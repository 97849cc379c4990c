// The voter table, as read from the extract.

use vote_history::sheet::normalize_header;

use crate::wards::*;

/// A rectangular table of text values with normalized headers.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: Vec<String>) -> Table {
        Table {
            headers,
            rows: Vec::new(),
        }
    }

    /// Adds a row, padded or cut to the width of the headers.
    pub fn push_row(&mut self, mut row: Vec<String>) {
        row.resize(self.headers.len(), String::new());
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The 0-based index of a column, compared like the worksheet headers.
    pub fn column(&self, name: &str) -> WardResult<usize> {
        let target = normalize_header(name);
        self.headers
            .iter()
            .position(|h| normalize_header(h) == target)
            .context(MissingColumnSnafu { name })
    }

    /// Keeps the rows for which the column contains `pattern`, ignoring case.
    pub fn filter_contains(self, column: &str, pattern: &str) -> WardResult<Table> {
        let idx = self.column(column)?;
        let pattern = pattern.to_uppercase();
        let before = self.len();
        let rows: Vec<Vec<String>> = self
            .rows
            .into_iter()
            .filter(|r| r[idx].to_uppercase().contains(&pattern))
            .collect();
        debug!(
            "filter_contains: {} {:?}: kept {} of {} rows",
            column,
            pattern,
            rows.len(),
            before
        );
        Ok(Table {
            headers: self.headers,
            rows,
        })
    }

    /// Stable sort on the text of one column.
    pub fn sort_by(&mut self, column: &str) -> WardResult<()> {
        let idx = self.column(column)?;
        self.rows.sort_by(|a, b| a[idx].cmp(&b[idx]));
        Ok(())
    }

    /// Splits the rows by the distinct values of a column, in order of first
    /// appearance. Every row lands in exactly one group.
    pub fn partition_by(&self, column: &str) -> WardResult<Vec<(String, Table)>> {
        let idx = self.column(column)?;
        let mut groups: Vec<(String, Table)> = Vec::new();
        let mut group_index: HashMap<String, usize> = HashMap::new();
        for row in self.rows.iter() {
            let key = row[idx].clone();
            let gidx = match group_index.get(&key) {
                Some(gidx) => *gidx,
                None => {
                    groups.push((key.clone(), Table::new(self.headers.clone())));
                    group_index.insert(key, groups.len() - 1);
                    groups.len() - 1
                }
            };
            groups[gidx].1.rows.push(row.clone());
        }
        Ok(groups)
    }
}

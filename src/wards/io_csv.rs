// Primitives for reading the voter extract and writing CSV chunks.

use std::path::Path;

use vote_history::sheet::normalize_header;

use crate::wards::{io_common::chunk_file_name, table::Table, *};

const BOM: char = '\u{feff}';

/// Reads a delimited extract with a header row.
///
/// The headers are normalized. Values are kept as text, and lines shorter or
/// longer than the header row are padded or cut.
pub fn read_extract(path: &str, delimiter: u8) -> WardResult<Table> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .context(OpeningCsvSnafu { path })?;

    let headers: Vec<String> = rdr
        .byte_headers()
        .context(CsvLineParseSnafu { lineno: 1_usize })?
        .iter()
        .map(|h| normalize_header(String::from_utf8_lossy(h).trim_start_matches(BOM)))
        .collect();
    debug!("read_extract: headers: {:?}", headers);
    if headers.iter().all(|h| h.is_empty()) {
        whatever!("The voter extract {} has no header row", path)
    }

    let mut table = Table::new(headers);
    for (idx, record_r) in rdr.byte_records().enumerate() {
        // The header is line 1.
        let lineno = idx + 2;
        let record = record_r.context(CsvLineParseSnafu { lineno })?;
        let row: Vec<String> = record
            .iter()
            .map(|v| String::from_utf8_lossy(v).into_owned())
            .collect();
        if row.len() != table.headers.len() {
            debug!(
                "read_extract: line {} has {} fields, expected {}",
                lineno,
                row.len(),
                table.headers.len()
            );
        }
        table.push_row(row);
    }
    Ok(table)
}

/// Writes the rows of one ward into CSV files of at most `chunk_rows` rows,
/// each starting with the header row.
///
/// Every chunk is attempted, and each one reports its own outcome.
pub fn write_ward_chunks(
    table: &Table,
    dir: &Path,
    stem: &str,
    ward: &str,
    chunk_rows: usize,
) -> Vec<(String, WardResult<()>)> {
    let mut res = Vec::new();
    if chunk_rows == 0 {
        return res;
    }
    for (idx, chunk) in table.rows.chunks(chunk_rows).enumerate() {
        let start = idx * chunk_rows + 1;
        let end = start + chunk.len() - 1;
        let path = dir
            .join(chunk_file_name(stem, ward, start, end))
            .display()
            .to_string();
        let written = write_chunk(&table.headers, chunk, &path);
        res.push((path, written));
    }
    res
}

fn write_chunk(headers: &[String], rows: &[Vec<String>], path: &str) -> WardResult<()> {
    let mut wtr = csv::Writer::from_path(path).context(WritingCsvSnafu { path })?;
    wtr.write_record(headers)
        .context(WritingCsvSnafu { path })?;
    for row in rows.iter() {
        wtr.write_record(row).context(WritingCsvSnafu { path })?;
    }
    wtr.flush()
        .map_err(csv::Error::from)
        .context(WritingCsvSnafu { path })?;
    Ok(())
}

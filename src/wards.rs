use log::{debug, error, info, warn};

use snafu::{prelude::*, Snafu};

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use vote_history::{augment_worksheet, AugmentError, AugmentReport, AugmentRules};

use crate::args::Args;
use crate::wards::config_reader::*;
use crate::wards::table::Table;

pub mod config_reader;
pub mod io_common;
pub mod io_csv;
pub mod io_xlsx;
pub mod table;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum WardError {
    #[snafu(display("Error opening the voter extract {path}"))]
    OpeningCsv { source: csv::Error, path: String },
    #[snafu(display("Error reading line {lineno} of the voter extract"))]
    CsvLineParse { source: csv::Error, lineno: usize },
    #[snafu(display("Error writing {path}"))]
    WritingCsv { source: csv::Error, path: String },
    #[snafu(display("Column {name} not found in the voter extract"))]
    MissingColumn { name: String },
    #[snafu(display("Error opening workbook {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("Workbook {path} has no worksheet"))]
    EmptyExcel { path: String },
    #[snafu(display("Error writing workbook {path}"))]
    WritingExcel {
        source: rust_xlsxwriter::XlsxError,
        path: String,
    },
    #[snafu(display("Error opening file {path}"))]
    OpeningJson { source: std::io::Error, path: String },
    #[snafu(display("Error parsing the configuration"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Error creating directory {path}"))]
    CreatingDirectory { source: std::io::Error, path: String },
    #[snafu(display("Could not augment {path}: {source}"))]
    Augmenting { source: AugmentError, path: String },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type WardResult<T> = Result<T, WardError>;

/// What was produced by a run. Failed files carry the reason.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct RunSummary {
    pub written: Vec<String>,
    pub failed: Vec<(String, String)>,
}

impl RunSummary {
    fn record<T>(&mut self, path: String, res: WardResult<T>) -> Option<T> {
        match res {
            Ok(x) => {
                self.written.push(path);
                Some(x)
            }
            Err(e) => {
                error!("{}: {}", path, e);
                self.failed.push((path, e.to_string()));
                None
            }
        }
    }
}

pub fn run(args: &Args) -> WardResult<RunSummary> {
    let (config, config_dir) = match &args.config {
        Some(p) => {
            let config = read_config(p)?;
            let dir = Path::new(p).parent().map(|d| d.to_path_buf());
            (config, dir)
        }
        None => (RunConfig::default(), None),
    };
    debug!("config: {:?}", config);
    let today = Local::now().date_naive();
    let settings = validate_settings(&config, args, config_dir.as_deref(), today)?;
    info!("settings: {:?}", settings);
    run_with_settings(&settings)
}

/// Reads the extract, then writes and augments the combined workbook and one
/// workbook per ward.
///
/// Only the problems with the extract itself stop the run. A workbook that
/// cannot be produced is reported in the summary and the next one is attempted.
pub fn run_with_settings(settings: &RunSettings) -> WardResult<RunSummary> {
    info!("Attempting to read voter extract {:?}", settings.input);
    let table = io_csv::read_extract(&settings.input, settings.delimiter)?;
    info!(
        "Read {} voters with {} columns",
        table.len(),
        table.headers.len()
    );
    let table = select_voters(table, settings)?;

    let out_dir = settings.output_directory.clone();
    fs::create_dir_all(&out_dir).context(CreatingDirectorySnafu {
        path: out_dir.display().to_string(),
    })?;

    let mut summary = RunSummary::default();

    let combined_path = out_dir.join(io_common::combined_file_name(
        &settings.combined_prefix,
        &settings.date,
    ));
    produce_workbook(&table, &combined_path, &settings.rules, &mut summary);

    let wards = table.partition_by(&settings.ward_column)?;
    info!("Found {} wards", wards.len());
    for (ward, ward_table) in wards.iter() {
        let path = out_dir.join(io_common::ward_file_name(
            &settings.ward_prefix,
            ward,
            &settings.date,
        ));
        info!("Ward {:?}: {} voters", ward, ward_table.len());
        produce_workbook(ward_table, &path, &settings.rules, &mut summary);

        if let Some(chunk_rows) = settings.chunk_rows {
            let stem = format!("{}{}", settings.combined_prefix, settings.date);
            for (chunk_path, res) in
                io_csv::write_ward_chunks(ward_table, &out_dir, &stem, ward, chunk_rows)
            {
                summary.record(chunk_path, res);
            }
        }
    }

    if !summary.failed.is_empty() {
        warn!(
            "{} file(s) written, {} failed",
            summary.written.len(),
            summary.failed.len()
        );
    }
    Ok(summary)
}

fn select_voters(table: Table, settings: &RunSettings) -> WardResult<Table> {
    // Checked upfront: an unknown ward column would otherwise only show up after
    // the combined workbook is written.
    table.column(&settings.ward_column)?;
    let mut table = match &settings.ward_filter {
        Some(pattern) => table.filter_contains(&settings.filter_column, pattern)?,
        None => table,
    };
    table.sort_by(&settings.sort_column)?;
    info!(
        "Selected {} voters, sorted by {}",
        table.len(),
        settings.sort_column
    );
    Ok(table)
}

fn produce_workbook(table: &Table, path: &Path, rules: &AugmentRules, summary: &mut RunSummary) {
    let p = path.display().to_string();
    let res = write_and_augment(table, &p, rules);
    if let Some(report) = summary.record(p.clone(), res) {
        debug!("{}: {:?}", p, report);
        info!("Wrote {} ({} voters)", p, report.data_rows);
    }
}

pub fn write_and_augment(table: &Table, path: &str, rules: &AugmentRules) -> WardResult<AugmentReport> {
    io_xlsx::write_table(table, path)?;
    augment_file(path, rules)
}

/// Loads a workbook, augments its first worksheet and saves it in place.
///
/// The file is left as it was when the augmentation fails.
pub fn augment_file(path: &str, rules: &AugmentRules) -> WardResult<AugmentReport> {
    let mut ws = io_xlsx::load_worksheet(path)?;
    let report = augment_worksheet(&mut ws, rules).context(AugmentingSnafu { path })?;
    io_xlsx::save_worksheet(&ws, path)?;
    Ok(report)
}

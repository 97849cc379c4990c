use crate::wards::*;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(rename = "inputPath")]
    pub input_path: Option<String>,
    pub delimiter: Option<String>,
    #[serde(rename = "outputDirectory")]
    pub output_directory: Option<String>,
    #[serde(rename = "wardColumn")]
    pub ward_column: Option<String>,
    #[serde(rename = "wardFilter")]
    pub ward_filter: Option<String>,
    #[serde(rename = "filterColumn")]
    pub filter_column: Option<String>,
    #[serde(rename = "sortColumn")]
    pub sort_column: Option<String>,
    #[serde(rename = "combinedPrefix")]
    pub combined_prefix: Option<String>,
    #[serde(rename = "wardPrefix")]
    pub ward_prefix: Option<String>,
    #[serde(rename = "firstHistoryColumn")]
    pub first_history_column: Option<String>,
    #[serde(rename = "firstNameColumn")]
    pub first_name_column: Option<String>,
    #[serde(rename = "lastNameColumn")]
    pub last_name_column: Option<String>,
    #[serde(rename = "birthDateColumn")]
    pub birth_date_column: Option<String>,
    #[serde(rename = "addressColumn")]
    pub address_column: Option<String>,
    #[serde(rename = "referenceYear")]
    pub reference_year: Option<i32>,
    #[serde(rename = "recentWindowYears")]
    pub recent_window_years: Option<i32>,
    #[serde(rename = "recentElectionTypes")]
    pub recent_election_types: Option<Vec<String>>,
    #[serde(rename = "democratCode")]
    pub democrat_code: Option<String>,
    #[serde(rename = "republicanCode")]
    pub republican_code: Option<String>,
    #[serde(rename = "chunkRows")]
    pub chunk_rows: Option<usize>,
}

/// The settings of a run, once the configuration file and the command line
/// have been merged and checked.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RunSettings {
    pub input: String,
    pub delimiter: u8,
    pub output_directory: PathBuf,
    pub ward_column: String,
    pub filter_column: String,
    pub ward_filter: Option<String>,
    pub sort_column: String,
    pub combined_prefix: String,
    pub ward_prefix: String,
    pub chunk_rows: Option<usize>,
    /// The date embedded in the file names, `YYYY-MM-DD`.
    pub date: String,
    pub rules: AugmentRules,
}

pub const DEFAULT_SORT_COLUMN: &str = "PRECINCT_NAME";
pub const DEFAULT_COMBINED_PREFIX: &str = "AllWards-";
pub const DEFAULT_WARD_PREFIX: &str = "City of ";

pub fn read_config(path: &str) -> WardResult<RunConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    debug!("read content: {:?}", contents);
    serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})
}

/// Merges the configuration with the command line. The command line wins.
///
/// Relative paths in the configuration file are resolved from the directory of
/// that file.
pub fn validate_settings(
    config: &RunConfig,
    args: &Args,
    config_dir: Option<&Path>,
    today: NaiveDate,
) -> WardResult<RunSettings> {
    let resolve = |p: &str| -> PathBuf {
        match config_dir {
            Some(dir) if Path::new(p).is_relative() => dir.join(p),
            _ => PathBuf::from(p),
        }
    };

    let input = match (&args.input, &config.input_path) {
        (Some(p), _) => p.clone(),
        (None, Some(p)) => resolve(p).display().to_string(),
        (None, None) => whatever!("No voter extract given: use --input or the inputPath option"),
    };

    let delimiter = match config.delimiter.as_deref() {
        None => b',',
        Some(d) if d.len() == 1 && d.is_ascii() => d.as_bytes()[0],
        Some(d) => whatever!("The delimiter must be a single ASCII character, got {:?}", d),
    };

    let output_directory = match (&args.out, &config.output_directory) {
        (Some(p), _) => PathBuf::from(p),
        (None, Some(p)) => resolve(p),
        (None, None) => PathBuf::from("."),
    };

    let chunk_rows = match args.chunk_rows.or(config.chunk_rows) {
        Some(0) => whatever!("chunkRows must be at least 1"),
        x => x,
    };

    let reference_year = args
        .reference_year
        .or(config.reference_year)
        .unwrap_or_else(|| today.year());

    let mut rules = AugmentRules::for_year(reference_year);
    if let Some(window) = config.recent_window_years {
        if window < 0 {
            whatever!("recentWindowYears cannot be negative, got {}", window)
        }
        rules.history.recent_window = window;
    }
    if let Some(types) = &config.recent_election_types {
        rules.history.recent_election_types = types.clone();
    }
    let ward_column = config
        .ward_column
        .clone()
        .unwrap_or_else(|| rules.ward_header.clone());
    rules.ward_header = ward_column.clone();
    rules.first_history_header = config.first_history_column.clone();
    override_with(&mut rules.first_name_header, &config.first_name_column);
    override_with(&mut rules.last_name_header, &config.last_name_column);
    override_with(&mut rules.birth_date_header, &config.birth_date_column);
    override_with(&mut rules.address_header, &config.address_column);
    override_with(&mut rules.democrat_code, &config.democrat_code);
    override_with(&mut rules.republican_code, &config.republican_code);

    Ok(RunSettings {
        input,
        delimiter,
        output_directory,
        filter_column: config
            .filter_column
            .clone()
            .unwrap_or_else(|| ward_column.clone()),
        ward_column,
        ward_filter: args.ward_filter.clone().or_else(|| config.ward_filter.clone()),
        sort_column: config
            .sort_column
            .clone()
            .unwrap_or_else(|| DEFAULT_SORT_COLUMN.to_string()),
        combined_prefix: config
            .combined_prefix
            .clone()
            .unwrap_or_else(|| DEFAULT_COMBINED_PREFIX.to_string()),
        ward_prefix: config
            .ward_prefix
            .clone()
            .unwrap_or_else(|| DEFAULT_WARD_PREFIX.to_string()),
        chunk_rows,
        date: io_common::date_stamp(today),
        rules,
    })
}

fn override_with(value: &mut String, option: &Option<String>) {
    if let Some(x) = option {
        *value = x.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> Args {
        Args {
            input: None,
            config: None,
            out: None,
            ward_filter: None,
            reference_year: None,
            chunk_rows: None,
            verbose: false,
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 2, 6).unwrap()
    }

    const CONFIG: &str = r#"{
        "inputPath": "SWVF_78.txt",
        "delimiter": "\t",
        "outputDirectory": "out",
        "wardFilter": "WARREN-WARD",
        "combinedPrefix": "CityOfWarren",
        "firstHistoryColumn": "PRIMARY-03/07/2000",
        "recentWindowYears": 4,
        "recentElectionTypes": ["GENERAL"],
        "chunkRows": 2000
    }"#;

    #[test]
    fn defaults() {
        let mut a = args();
        a.input = Some("extract.txt".to_string());
        let s = validate_settings(&RunConfig::default(), &a, None, today()).unwrap();
        assert_eq!(s.input, "extract.txt");
        assert_eq!(s.delimiter, b',');
        assert_eq!(s.output_directory, PathBuf::from("."));
        assert_eq!(s.ward_column, "WARD");
        assert_eq!(s.filter_column, "WARD");
        assert_eq!(s.ward_filter, None);
        assert_eq!(s.sort_column, "PRECINCT_NAME");
        assert_eq!(s.combined_prefix, "AllWards-");
        assert_eq!(s.date, "2025-02-06");
        assert_eq!(s.rules, AugmentRules::for_year(2025));
    }

    #[test]
    fn config_file_values() {
        let config: RunConfig = serde_json::from_str(CONFIG).unwrap();
        let s = validate_settings(&config, &args(), Some(Path::new("/data")), today()).unwrap();
        assert_eq!(s.input, "/data/SWVF_78.txt");
        assert_eq!(s.delimiter, b'\t');
        assert_eq!(s.output_directory, PathBuf::from("/data/out"));
        assert_eq!(s.ward_filter.as_deref(), Some("WARREN-WARD"));
        assert_eq!(s.combined_prefix, "CityOfWarren");
        assert_eq!(s.chunk_rows, Some(2000));
        assert_eq!(
            s.rules.first_history_header.as_deref(),
            Some("PRIMARY-03/07/2000")
        );
        assert_eq!(s.rules.history.recent_window, 4);
        assert_eq!(s.rules.history.recent_election_types, vec!["GENERAL"]);
    }

    #[test]
    fn command_line_wins() {
        let config: RunConfig = serde_json::from_str(CONFIG).unwrap();
        let a = Args {
            input: Some("other.txt".to_string()),
            out: Some("elsewhere".to_string()),
            ward_filter: Some("HOWLAND".to_string()),
            reference_year: Some(2019),
            chunk_rows: Some(10),
            ..args()
        };
        let s = validate_settings(&config, &a, Some(Path::new("/data")), today()).unwrap();
        assert_eq!(s.input, "other.txt");
        assert_eq!(s.output_directory, PathBuf::from("elsewhere"));
        assert_eq!(s.ward_filter.as_deref(), Some("HOWLAND"));
        assert_eq!(s.rules.history.reference_year, 2019);
        assert_eq!(s.chunk_rows, Some(10));
    }

    #[test]
    fn invalid_settings() {
        assert!(validate_settings(&RunConfig::default(), &args(), None, today()).is_err());

        let mut a = args();
        a.input = Some("extract.txt".to_string());
        let config = RunConfig {
            delimiter: Some("||".to_string()),
            ..RunConfig::default()
        };
        assert!(validate_settings(&config, &a, None, today()).is_err());

        a.chunk_rows = Some(0);
        assert!(validate_settings(&RunConfig::default(), &a, None, today()).is_err());

        let config = RunConfig {
            recent_window_years: Some(-1),
            ..RunConfig::default()
        };
        a.chunk_rows = None;
        assert!(validate_settings(&config, &a, None, today()).is_err());
    }

    #[test]
    fn read_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("wards.json");
        fs::write(&p, CONFIG).unwrap();
        let config = read_config(&p.display().to_string()).unwrap();
        assert_eq!(config.chunk_rows, Some(2000));

        fs::write(&p, "{ not json").unwrap();
        assert!(matches!(
            read_config(&p.display().to_string()),
            Err(WardError::ParsingJson { .. })
        ));
        assert!(matches!(
            read_config("/nonexistent/wards.json"),
            Err(WardError::OpeningJson { .. })
        ));
    }
}

use clap::Parser;

/// Builds voter history workbooks, one for all the selected voters and one per ward.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path) The voter history extract, as a delimited text file with a header row.
    /// Setting this option overrides the path that may be specified with the --config option.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (file path, optional) A JSON file with the run configuration. See the manual for the list of options.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (directory, default '.') Where the workbooks are written.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (text, optional) Only keep the voters whose ward contains this text (case insensitive),
    /// for example WARREN-WARD.
    #[clap(long, value_parser)]
    pub ward_filter: Option<String>,

    /// (year, default current year) The year from which the recent elections are counted.
    #[clap(long, value_parser)]
    pub reference_year: Option<i32>,

    /// (number, optional) If specified, the voters of each ward are also written as CSV files of at
    /// most this many rows.
    #[clap(long, value_parser)]
    pub chunk_rows: Option<usize>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}

use clap::Parser;

/// This is a seat allocation program using the D'Hondt method.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) The file containing the description of the contest in JSON format: the
    /// submission files, the registered lists and the rules. See the manual of the dhondt crate.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,
    /// (file path) A reference file containing the summary of an allocation in JSON format.
    /// If provided, dhondt will check that the computed summary matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (file path, 'stdout' or empty) If specified, the summary of the allocation will be
    /// written in JSON format to the given location. Setting this option overrides the output
    /// directory that may be specified with the --config option.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path or empty) If specified, the file with the vote submissions. Setting this option
    /// overrides the submission sources that may be specified with the --config option.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (default csv) The type of the input: csv, xlsx or json.
    #[clap(long, value_parser)]
    pub input_type: Option<String>,

    /// (positive number) The number of seats to allocate. Required without --config, overrides the
    /// value of the configuration otherwise.
    #[clap(short, long, value_parser)]
    pub seats: Option<i64>,

    /// (default 3.0) The minimum share of the votes, in percent, for a list to receive seats.
    #[clap(short, long, value_parser)]
    pub threshold: Option<f64>,

    /// When using an Excel file, indicates the name of the worksheet to use. The first worksheet
    /// is used otherwise.
    #[clap(long, value_parser)]
    pub excel_worksheet_name: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}

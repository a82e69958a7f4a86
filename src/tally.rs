use log::{debug, info, warn};

use dhondt::builder::Builder;
use dhondt::*;
use snafu::{prelude::*, Snafu};

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::json;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::Args;
use crate::tally::config_reader::*;

mod config_reader;
mod io_common;
mod io_csv;
mod io_excel;
mod io_json;

#[derive(Debug, Snafu)]
pub enum DhondtError {
    #[snafu(display("Error opening file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("Missing worksheet in excel file {path}"))]
    EmptyExcel { path: String },
    #[snafu(display("Unexpected cell in line {lineno}: {content}"))]
    ExcelWrongCellType { lineno: usize, content: String },
    #[snafu(display("Error opening file {path}: {source}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON: {source}"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Expected a positive index in the configuration, got {content}"))]
    ParsingJsonNumber { content: String },
    #[snafu(display("Error opening CSV file: {source}"))]
    CsvOpen { source: csv::Error },
    #[snafu(display("Error reading CSV line: {source}"))]
    CsvLineParse { source: csv::Error },
    #[snafu(display("Line {lineno} is too short"))]
    CsvLineTooShort { lineno: usize },
    #[snafu(display("Line {lineno}: could not read the number of votes {content:?}"))]
    InvalidVoteCount { lineno: usize, content: String },
    #[snafu(display("Configuration file has no parent directory"))]
    MissingParentDir {},
    #[snafu(display("Provider not implemented: {provider}"))]
    UnknownProvider { provider: String },
    #[snafu(display("The number of seats is missing: use --seats or rules.totalSeats"))]
    MissingSeats {},
    #[snafu(display(
        "No submission to read: use --input or submissionSources in the configuration"
    ))]
    MissingInput {},
    #[snafu(display("Invalid submission {id}: {source}"))]
    InvalidSubmission {
        source: AllocationErrors,
        id: String,
    },
    #[snafu(display("Allocation error: {source}"))]
    Allocation { source: AllocationErrors },
    #[snafu(display("Error writing {path}: {source}"))]
    WritingOutput {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Difference detected between calculated summary and reference summary"))]
    ReferenceMismatch {},
}

pub type DhondtResult<T> = Result<T, DhondtError>;

pub type BDhondtResult<T> = Result<T, Box<DhondtError>>;

/// A submission, as parsed by the readers.
/// This is before any validation of the names and the votes.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ParsedSubmission {
    pub id: String,
    pub name: String,
    pub votes: i64,
}

fn results_to_json(summary: &AllocationSummary) -> Vec<JSValue> {
    let mut results = summary.results.clone();
    sort_for_presentation(&mut results);
    results
        .iter()
        .map(|r| json!({"name": r.name, "votes": r.votes, "seats": r.seats}))
        .collect()
}

fn round_stats_to_json(summary: &AllocationSummary) -> Vec<JSValue> {
    summary
        .round_stats
        .iter()
        .map(|rs| {
            json!({
                "round": rs.round,
                "elected": rs.elected,
                "quotient": {"votes": rs.quotient.votes, "divisor": rs.quotient.divisor},
                "tied": rs.tied,
            })
        })
        .collect()
}

fn build_summary_js(
    settings: &OutputSettings,
    summary: &AllocationSummary,
    total_submissions: usize,
) -> JSValue {
    let c = OutputConfig {
        contest: settings.contest_name.clone(),
        date: settings.contest_date.clone(),
        jurisdiction: settings.contest_jurisdiction.clone(),
        office: settings.contest_office.clone(),
        total_seats: summary.total_seats,
        threshold_percent: summary.threshold_percent,
        threshold_votes: format!("{:.2}", summary.threshold_votes),
        total_votes: summary.total_votes,
        total_submissions,
        outcome: summary.outcome.as_str().to_string(),
    };
    json!({
        "config": c,
        "results": results_to_json(summary),
        "rounds": round_stats_to_json(summary),
    })
}

fn read_submissions(root_path: &Path, cfs: &FileSource) -> BDhondtResult<Vec<ParsedSubmission>> {
    let p: PathBuf = root_path.join(&cfs.file_path);
    let p2 = p.as_path().display().to_string();
    info!("Attempting to read submission file {:?}", p2);
    match cfs.provider.as_str() {
        "csv" => io_csv::read_csv_submissions(&p2, cfs),
        "xlsx" | "excel" => io_excel::read_excel_submissions(&p2, cfs),
        "json" => io_json::read_json_submissions(&p2),
        x => Err(Box::new(DhondtError::UnknownProvider {
            provider: x.to_string(),
        })),
    }
}

fn validate_submissions(
    builder: &mut Builder,
    submissions: &[ParsedSubmission],
) -> BDhondtResult<()> {
    for s in submissions.iter() {
        debug!("validate_submissions: {:?}", s);
        builder
            .add_submission(&s.name, s.votes)
            .context(InvalidSubmissionSnafu { id: s.id.clone() })?;
    }
    Ok(())
}

// The configuration used when no configuration file is passed.
fn default_config(args: &Args) -> AllocationConfig {
    AllocationConfig {
        output_settings: OutputSettings {
            contest_name: args
                .input
                .as_deref()
                .map(io_common::simplify_file_name)
                .unwrap_or_default(),
            output_directory: None,
            contest_date: None,
            contest_jurisdiction: None,
            contest_office: None,
        },
        submission_sources: Vec::new(),
        lists: None,
        rules: RulesConfig {
            total_seats: None,
            threshold_percent: None,
            rules_description: None,
        },
    }
}

fn read_config(config_path: &str) -> BDhondtResult<(AllocationConfig, PathBuf)> {
    let config_str = fs::read_to_string(config_path).context(OpeningJsonSnafu {
        path: config_path.to_string(),
    })?;
    let config: AllocationConfig =
        serde_json::from_str(&config_str).context(ParsingJsonSnafu {})?;
    let root_p = Path::new(config_path)
        .parent()
        .context(MissingParentDirSnafu {})?;
    Ok((config, root_p.to_path_buf()))
}

fn output_path(out: Option<&str>, settings: &OutputSettings, root: &Path) -> Option<PathBuf> {
    match out {
        Some("stdout") => None,
        Some(p) => Some(PathBuf::from(p)),
        None => settings.output_directory.as_ref().map(|d| {
            let file_name: String = settings
                .contest_name
                .chars()
                .map(|c| if c.is_alphanumeric() { c } else { '_' })
                .collect();
            root.join(d).join(format!("{}_summary.json", file_name))
        }),
    }
}

fn write_summary(path: Option<PathBuf>, content: &str) -> BDhondtResult<()> {
    match path {
        None => {
            println!("{}", content);
        }
        Some(p) => {
            let ps = p.display().to_string();
            if let Some(parent) = p.parent() {
                fs::create_dir_all(parent).context(WritingOutputSnafu { path: ps.clone() })?;
            }
            fs::write(&p, content).context(WritingOutputSnafu { path: ps.clone() })?;
            info!("Summary written to {}", ps);
        }
    }
    Ok(())
}

pub fn run_allocation(args: &Args) -> BDhondtResult<()> {
    let (mut config, root_p) = match args.config.as_deref() {
        Some(config_path) => read_config(config_path)?,
        None => (default_config(args), PathBuf::new()),
    };
    debug!("config: {:?}", config);

    // The input on the command line replaces the sources of the configuration.
    if let Some(input) = args.input.clone() {
        let provider = args.input_type.clone().unwrap_or_else(|| "csv".to_string());
        let mut source = FileSource::new(provider, input);
        source.excel_worksheet_name = args.excel_worksheet_name.clone();
        config.submission_sources = vec![source];
    }
    if config.submission_sources.is_empty() {
        return Err(Box::new(DhondtError::MissingInput {}));
    }

    let total_seats = args
        .seats
        .or(config.rules.total_seats)
        .context(MissingSeatsSnafu {})?;
    let threshold_percent = args
        .threshold
        .or(config.rules.threshold_percent)
        .unwrap_or(AllocationRules::DEFAULT_THRESHOLD_PERCENT);
    let rules = AllocationRules {
        total_seats,
        threshold_percent,
    };
    info!("rules: {:?}", rules);

    let mut builder = Builder::new(&rules).context(AllocationSnafu {})?;
    if let Some(lists) = config.lists.as_ref() {
        let names: Vec<String> = lists.iter().map(|l| l.name.clone()).collect();
        builder = builder.lists(&names).context(AllocationSnafu {})?;
    }

    for cfs in config.submission_sources.iter() {
        let submissions = read_submissions(&root_p, cfs)?;
        info!(
            "Read {} submissions from {}",
            submissions.len(),
            cfs.file_path
        );
        validate_submissions(&mut builder, &submissions)?;
    }
    info!(
        "Aggregated {} submissions: {} votes",
        builder.num_submissions(),
        builder.total_votes()
    );

    let summary = builder.run().context(AllocationSnafu {})?;
    if summary.outcome != AllocationOutcome::Allocated {
        warn!("No seat was allocated: {}", summary.outcome.as_str());
    }

    // Assemble the final json
    let result_js = build_summary_js(&config.output_settings, &summary, builder.num_submissions());
    let pretty_js_stats = serde_json::to_string_pretty(&result_js).context(ParsingJsonSnafu {})?;

    write_summary(
        output_path(args.out.as_deref(), &config.output_settings, &root_p),
        &pretty_js_stats,
    )?;

    // The reference summary, if provided for comparison
    if let Some(summary_p) = args.reference.as_deref() {
        let summary_ref = read_summary(summary_p)?;
        if summary_ref != result_js {
            let pretty_js_summary_ref =
                serde_json::to_string_pretty(&summary_ref).context(ParsingJsonSnafu {})?;
            warn!("Found differences with the reference summary");
            print_diff(
                pretty_js_summary_ref.as_str(),
                pretty_js_stats.as_ref(),
                "\n",
            );
            return Err(Box::new(DhondtError::ReferenceMismatch {}));
        }
        info!("The summary matches the reference {}", summary_p);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> OutputSettings {
        OutputSettings {
            contest_name: "Legislatura 2025".to_string(),
            output_directory: Some("out".to_string()),
            contest_date: None,
            contest_jurisdiction: Some("CABA".to_string()),
            contest_office: None,
        }
    }

    #[test]
    fn summary_json() {
        let summary = run_allocation_stats(
            &[Candidate::new("B", 50), Candidate::new("A", 50)],
            &AllocationRules::new(1).with_threshold(0.0),
        )
        .unwrap();
        let js = build_summary_js(&settings(), &summary, 7);
        assert_eq!(
            js,
            json!({
                "config": {
                    "contest": "Legislatura 2025",
                    "jurisdiction": "CABA",
                    "totalSeats": 1,
                    "thresholdPercent": 0.0,
                    "thresholdVotes": "0.00",
                    "totalVotes": 100,
                    "totalSubmissions": 7,
                    "outcome": "allocated",
                },
                "results": [
                    {"name": "B", "votes": 50, "seats": 1},
                    {"name": "A", "votes": 50, "seats": 0},
                ],
                "rounds": [
                    {
                        "round": 1,
                        "elected": "B",
                        "quotient": {"votes": 50, "divisor": 1},
                        "tied": ["B", "A"],
                    },
                ],
            })
        );
    }

    #[test]
    fn output_locations() {
        let root = Path::new("contests");
        assert_eq!(output_path(Some("stdout"), &settings(), root), None);
        assert_eq!(
            output_path(Some("x.json"), &settings(), root),
            Some(PathBuf::from("x.json"))
        );
        assert_eq!(
            output_path(None, &settings(), root),
            Some(PathBuf::from("contests/out/Legislatura_2025_summary.json"))
        );
    }

    #[test]
    fn unknown_provider() {
        let res = read_submissions(
            Path::new(""),
            &FileSource::new("dominion".to_string(), "x".to_string()),
        );
        assert!(matches!(
            res.map_err(|e| *e),
            Err(DhondtError::UnknownProvider { .. })
        ));
    }
}

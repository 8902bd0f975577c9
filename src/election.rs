use log::{debug, info, warn};

use instant_runoff::*;
use snafu::{prelude::*, Snafu};

use std::fs;
use std::path::Path;

use serde_json::json;
use serde_json::Map as JSMap;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::Args;
use crate::election::config_reader::*;

pub mod config_reader;
mod io_csv;

#[derive(Debug, Snafu)]
pub enum CountError {
    #[snafu(display("File doesn't exist or cannot be read: {path}"))]
    OpeningBallots { source: csv::Error, path: String },
    #[snafu(display("Voter roll doesn't exist or cannot be read: {path}"))]
    OpeningRoll { source: csv::Error, path: String },
    #[snafu(display("{path}: could not read the record at line {lineno}"))]
    CsvLineParse {
        source: csv::Error,
        path: String,
        lineno: usize,
    },
    #[snafu(display("Error opening file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing the JSON content of {path}"))]
    ParsingJson {
        source: serde_json::Error,
        path: String,
    },
    #[snafu(display("Error writing the summary to {path}"))]
    WritingSummary {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Invalid list of candidates: {source}"))]
    InvalidCandidates { source: VotingErrors },
    #[snafu(display("Malformed ballot in {path}: {source}"))]
    Ingestion { source: VotingErrors, path: String },
    #[snafu(display("Voting error: {source}"))]
    Tabulation { source: VotingErrors },
    #[snafu(display("Difference detected between calculated summary and reference summary {path}"))]
    ReferenceMismatch { path: String },
}

pub type CountResult<T> = Result<T, CountError>;

fn result_stats_to_json(rs: &VotingResult) -> Vec<JSValue> {
    let mut l: Vec<JSValue> = Vec::new();
    for round_stat in rs.round_stats.iter() {
        let mut tally: JSMap<String, JSValue> = JSMap::new();
        for (name, count) in round_stat.tally.iter() {
            tally.insert(name.clone(), json!(count.to_string()));
        }

        let mut tally_results: Vec<JSValue> = Vec::new();
        if let Some(elim_stats) = &round_stat.eliminated {
            let mut transfers: JSMap<String, JSValue> = JSMap::new();
            for (name, count) in elim_stats.transfers.iter() {
                transfers.insert(name.clone(), json!(count.to_string()));
            }
            if elim_stats.exhausted > 0 {
                transfers.insert(
                    "exhausted".to_string(),
                    json!(elim_stats.exhausted.to_string()),
                );
            }
            tally_results.push(json!({
                "eliminated": elim_stats.name,
                "transfers": transfers
            }));
        }

        let js = json!({
            "round": round_stat.round,
            "tally": tally,
            "exhausted": round_stat.exhausted.to_string(),
            "tallyResults": tally_results
        });
        l.push(js);
    }
    l
}

fn outcome_to_json(rs: &VotingResult) -> JSValue {
    match &rs.outcome {
        Outcome::Winner { name, votes } => json!({
            "winner": name,
            "votes": votes.to_string(),
            "percentage": rs.winner_percentage()
        }),
        Outcome::Tie { candidates } => json!({ "tie": candidates }),
    }
}

fn build_summary_js(setup: &ElectionSetup, rv: &VotingResult) -> JSValue {
    let c = OutputConfig {
        contest: setup.contest_name.clone(),
        date: setup.contest_date.clone(),
        total_votes: rv.total_votes.to_string(),
    };
    json!({
        "config": c,
        "results": result_stats_to_json(rv),
        "outcome": outcome_to_json(rv)
    })
}

fn write_summary(out: &str, pretty_js_stats: &str) -> CountResult<()> {
    if out == "stdout" {
        println!("{}", pretty_js_stats);
        return Ok(());
    }
    info!("Writing the summary to {:?}", out);
    fs::write(out, pretty_js_stats).context(WritingSummarySnafu { path: out })
}

fn check_reference(reference: &str, pretty_js_stats: &str) -> CountResult<()> {
    let summary_ref = read_summary(reference)?;
    debug!("reference summary: {:?}", summary_ref);
    let pretty_js_summary_ref =
        serde_json::to_string_pretty(&summary_ref).context(ParsingJsonSnafu { path: reference })?;
    if pretty_js_summary_ref != pretty_js_stats {
        warn!("Found differences with the reference string");
        print_diff(pretty_js_summary_ref.as_str(), pretty_js_stats, "\n");
        return ReferenceMismatchSnafu { path: reference }.fail();
    }
    Ok(())
}

/// Reads the voter roll and the ballots, runs the tabulation and prints the
/// rounds and the outcome.
pub fn run_election(args: &Args) -> CountResult<VotingResult> {
    let setup = election_setup(args)?;
    info!("setup: {:?}", setup);

    let registry = CandidateRegistry::new(&setup.candidates).context(InvalidCandidatesSnafu {})?;
    let mut roll = io_csv::read_roll(&setup.roll_path)?;
    info!("Voter roll {:?}: {} voters", setup.roll_path, roll.len());
    let rows = io_csv::read_ballot_rows(&args.ballots)?;

    let ballot_box = ingest_ballots(&rows, &mut roll, &registry).context(IngestionSnafu {
        path: args.ballots.as_str(),
    })?;
    let result = run_voting_stats(&ballot_box, &registry).context(TabulationSnafu {})?;
    debug!("result: {:?}", result);

    for line in render_text(&result) {
        println!("{}", line);
    }

    if args.out.is_some() || args.reference.is_some() {
        let result_js = build_summary_js(&setup, &result);
        let pretty_js_stats = serde_json::to_string_pretty(&result_js).context(ParsingJsonSnafu {
            path: "summary",
        })?;
        if let Some(out) = &args.out {
            write_summary(out, &pretty_js_stats)?;
        }
        if let Some(reference) = &args.reference {
            check_reference(reference, &pretty_js_stats)?;
        }
    }
    Ok(result)
}

fn simplify_file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or(path)
        .to_string()
}

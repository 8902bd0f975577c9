use crate::election::*;

use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;
use std::path::PathBuf;

/// The candidates of the reference deployment, in tie-break order.
pub const DEFAULT_CANDIDATES: [&str; 9] = [
    "Narwhals",
    "Cobras",
    "Swifts",
    "Volts",
    "Isotopes",
    "Scientists",
    "Robots",
    "Geckos",
    "Dingisos",
];

pub const DEFAULT_ROLL_PATH: &str = "studentids.csv";

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(rename = "contestName")]
    pub contest_name: String,
    #[serde(rename = "contestDate")]
    pub contest_date: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub contest: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(rename = "totalVotes")]
    pub total_votes: String,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ConfigCandidate {
    pub name: String,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ElectionConfig {
    #[serde(rename = "outputSettings")]
    pub output_settings: Option<OutputSettings>,
    pub candidates: Vec<ConfigCandidate>,
    /// Relative paths are resolved from the directory of the configuration file.
    #[serde(rename = "eligibilityFile")]
    pub eligibility_file: Option<String>,
}

/// Everything needed to run an election, once the defaults and the command
/// line overrides are applied.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ElectionSetup {
    pub contest_name: String,
    pub contest_date: Option<String>,
    pub candidates: Vec<String>,
    pub roll_path: String,
}

pub fn read_config(path: &str) -> CountResult<ElectionConfig> {
    let config_str = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let config: ElectionConfig =
        serde_json::from_str(&config_str).context(ParsingJsonSnafu { path })?;
    debug!("read_config: {:?}", config);
    Ok(config)
}

pub fn read_summary(path: &str) -> CountResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu { path })?;
    Ok(js)
}

pub fn election_setup(args: &Args) -> CountResult<ElectionSetup> {
    let config = match &args.config {
        Some(config_path) => Some((config_path.as_str(), read_config(config_path)?)),
        None => None,
    };

    let roll_path: String = match (&args.roll, &config) {
        (Some(roll), _) => roll.clone(),
        (None, Some((config_path, ElectionConfig {
            eligibility_file: Some(f),
            ..
        }))) => {
            let mut p: PathBuf = Path::new(config_path)
                .parent()
                .map(|d| d.to_path_buf())
                .unwrap_or_default();
            p.push(f);
            p.as_path().display().to_string()
        }
        _ => DEFAULT_ROLL_PATH.to_string(),
    };

    let (contest_name, contest_date) = match config
        .as_ref()
        .and_then(|(_, c)| c.output_settings.clone())
    {
        Some(os) => (os.contest_name, os.contest_date),
        None => (simplify_file_name(&args.ballots), None),
    };

    let candidates: Vec<String> = match &config {
        Some((_, c)) => c.candidates.iter().map(|c| c.name.clone()).collect(),
        None => DEFAULT_CANDIDATES.iter().map(|s| s.to_string()).collect(),
    };

    Ok(ElectionSetup {
        contest_name,
        contest_date,
        candidates,
        roll_path,
    })
}

// Primitives for reading the CSV files: the voter roll and the ballots.

use crate::election::*;

// Columns of the ballot file: `<unused>,<voter id>,<choice 1>,<choice 2>,<choice 3>`
const VOTER_ID_COL: usize = 1;
const FIRST_CHOICE_COL: usize = 2;

fn csv_reader(path: &str) -> csv::Result<csv::Reader<fs::File>> {
    // The first row is always a header. Short rows are allowed: trailing
    // empty choices are often dropped by spreadsheet exports.
    csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
}

fn record_lineno(record: &csv::StringRecord, idx: usize) -> usize {
    record
        .position()
        .map(|p| p.line() as usize)
        .unwrap_or(idx + 2)
}

/// Reads the voter identifiers from the first column.
pub fn read_roll(path: &str) -> CountResult<EligibilityRegistry> {
    info!("Attempting to read voter roll {:?}", path);
    let rdr = csv_reader(path).context(OpeningRollSnafu { path })?;
    let mut voter_ids: Vec<String> = Vec::new();
    for (idx, line_r) in rdr.into_records().enumerate() {
        let line = line_r.context(CsvLineParseSnafu {
            path,
            lineno: idx + 2,
        })?;
        match line.get(0) {
            Some(id) if !id.is_empty() => voter_ids.push(id.to_string()),
            _ => debug!(
                "read_roll: line {}: no voter id",
                record_lineno(&line, idx)
            ),
        }
    }
    Ok(EligibilityRegistry::new(voter_ids))
}

pub fn read_ballot_rows(path: &str) -> CountResult<Vec<RawBallotRow>> {
    info!("Attempting to read ballot file {:?}", path);
    let rdr = csv_reader(path).context(OpeningBallotsSnafu { path })?;
    let mut res: Vec<RawBallotRow> = Vec::new();
    for (idx, line_r) in rdr.into_records().enumerate() {
        let line = line_r.context(CsvLineParseSnafu {
            path,
            lineno: idx + 2,
        })?;
        let lineno = record_lineno(&line, idx);
        let field = |col: usize| line.get(col).unwrap_or("").to_string();
        let row = RawBallotRow {
            lineno,
            voter_id: field(VOTER_ID_COL),
            choices: (FIRST_CHOICE_COL..FIRST_CHOICE_COL + MAX_RANKINGS)
                .map(field)
                .collect(),
        };
        debug!("read_ballot_rows: {:?}", row);
        res.push(row);
    }
    Ok(res)
}

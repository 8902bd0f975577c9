use log::{debug, info};

use std::collections::HashMap;

use crate::ballot::Ballot;
use crate::config::{RawBallotRow, VotingErrors, MAX_RANKINGS};
use crate::registry::{CandidateId, CandidateRegistry};

/// The voters allowed to cast a ballot, and whether they already did.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct EligibilityRegistry {
    has_voted: HashMap<String, bool>,
}

impl EligibilityRegistry {
    pub fn new<I, S>(voter_ids: I) -> EligibilityRegistry
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        EligibilityRegistry {
            has_voted: voter_ids.into_iter().map(|s| (s.into(), false)).collect(),
        }
    }

    pub fn is_eligible(&self, voter_id: &str) -> bool {
        self.has_voted.contains_key(voter_id)
    }

    pub fn has_voted(&self, voter_id: &str) -> bool {
        self.has_voted.get(voter_id).cloned().unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.has_voted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.has_voted.is_empty()
    }

    fn mark_voted(&mut self, voter_id: &str) {
        if let Some(flag) = self.has_voted.get_mut(voter_id) {
            *flag = true;
        }
    }
}

/// The accepted ballots of an election.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct BallotBox {
    pub ballots: Vec<Ballot>,
    pub total_votes: u64,
    pub blank_rows: u64,
    pub ineligible_rows: u64,
    pub duplicate_rows: u64,
}

/// Turns raw rows into ballots.
///
/// Blank rows, unknown voters and voters who already voted are dropped.
/// A token that is not a candidate stops the ingestion: it means the source
/// does not follow the expected layout.
pub fn ingest_ballots<'a, I>(
    rows: I,
    roll: &mut EligibilityRegistry,
    registry: &CandidateRegistry,
) -> Result<BallotBox, VotingErrors>
where
    I: IntoIterator<Item = &'a RawBallotRow>,
{
    let mut res = BallotBox::default();
    for row in rows {
        if row.is_blank() {
            debug!("ingest_ballots: line {}: blank row", row.lineno);
            res.blank_rows += 1;
            continue;
        }
        if !roll.is_eligible(&row.voter_id) {
            debug!(
                "ingest_ballots: line {}: voter {:?} is not on the roll",
                row.lineno, row.voter_id
            );
            res.ineligible_rows += 1;
            continue;
        }
        if roll.has_voted(&row.voter_id) {
            debug!(
                "ingest_ballots: line {}: voter {:?} already voted",
                row.lineno, row.voter_id
            );
            res.duplicate_rows += 1;
            continue;
        }
        roll.mark_voted(&row.voter_id);
        res.total_votes += 1;

        let preferences = unique_choices(row, registry)?;
        let ballot = Ballot::new(row.voter_id.clone(), preferences);
        info!("{}", ballot.describe(registry));
        res.ballots.push(ballot);
    }
    info!(
        "ingest_ballots: {} accepted, {} blank rows, {} ineligible, {} duplicates",
        res.total_votes, res.blank_rows, res.ineligible_rows, res.duplicate_rows
    );
    Ok(res)
}

// The first choice is mandatory, the other ones may be empty.
// Repeated candidates are only counted at their first rank.
fn unique_choices(
    row: &RawBallotRow,
    registry: &CandidateRegistry,
) -> Result<Vec<CandidateId>, VotingErrors> {
    let ranked = row.choices.iter().filter(|c| !c.is_empty()).count();
    if ranked > MAX_RANKINGS {
        return Err(VotingErrors::TooManyRankings {
            lineno: row.lineno,
            voter_id: row.voter_id.clone(),
            count: ranked,
        });
    }
    match row.choices.first() {
        Some(c) if !c.is_empty() => {}
        _ => {
            return Err(VotingErrors::MissingFirstChoice {
                lineno: row.lineno,
                voter_id: row.voter_id.clone(),
            });
        }
    }

    let mut choices: Vec<CandidateId> = Vec::new();
    for token in row.choices.iter().filter(|c| !c.is_empty()) {
        let cid = registry
            .lookup(token)
            .ok_or_else(|| VotingErrors::UnknownCandidate {
                lineno: row.lineno,
                voter_id: row.voter_id.clone(),
                token: token.clone(),
            })?;
        if !choices.contains(&cid) {
            choices.push(cid);
        }
    }
    Ok(choices)
}

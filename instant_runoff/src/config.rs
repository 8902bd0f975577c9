// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;

/// The maximum number of ranked preferences a ballot may carry.
pub const MAX_RANKINGS: usize = 3;

/// One record of the ballot source, after field splitting.
///
/// The choices are the raw tokens in rank order. An empty token is an
/// absent preference.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RawBallotRow {
    /// The line of the record in its source, used for diagnostics.
    pub lineno: usize,
    pub voter_id: String,
    pub choices: Vec<String>,
}

impl RawBallotRow {
    pub fn is_blank(&self) -> bool {
        self.voter_id.is_empty() && self.choices.iter().all(|c| c.is_empty())
    }
}

// ******** Output data structures *********

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct EliminationStats {
    pub name: String,
    /// The number of ballots the candidate held when it was removed.
    pub votes: u64,
    /// Ballots moved to each running candidate, in candidate order.
    pub transfers: Vec<(String, u64)>,
    pub exhausted: u64,
}

/// Statistics for one round
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RoundStats {
    pub round: u32,
    /// The bucket size of every running candidate, in candidate order.
    pub tally: Vec<(String, u64)>,
    /// Ballots exhausted in all the previous rounds.
    pub exhausted: u64,
    /// Not set for the round that ends in a tie.
    pub eliminated: Option<EliminationStats>,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub enum Outcome {
    Winner { name: String, votes: u64 },
    Tie { candidates: Vec<String> },
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct VotingResult {
    /// The number of accepted ballots, including the ones exhausted later on.
    pub total_votes: u64,
    pub round_stats: Vec<RoundStats>,
    pub outcome: Outcome,
}

impl VotingResult {
    /// The share of all the accepted ballots that ended with the winner.
    pub fn winner_percentage(&self) -> Option<f64> {
        match &self.outcome {
            Outcome::Winner { votes, .. } if self.total_votes > 0 => {
                Some((*votes as f64) * 100.0 / (self.total_votes as f64))
            }
            _ => None,
        }
    }
}

/// Errors that prevent the algorithm from completing successfully.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum VotingErrors {
    EmptyElection,
    NoCandidates,
    NotEnoughCandidates(usize),
    EmptyCandidateName,
    DuplicateCandidate(String),
    UnknownCandidate {
        lineno: usize,
        voter_id: String,
        token: String,
    },
    MissingFirstChoice {
        lineno: usize,
        voter_id: String,
    },
    TooManyRankings {
        lineno: usize,
        voter_id: String,
        count: usize,
    },
    NoConvergence,
}

impl Error for VotingErrors {}

impl Display for VotingErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VotingErrors::EmptyElection => write!(f, "no ballot was accepted for this election"),
            VotingErrors::NoCandidates => write!(f, "no candidate registered for this election"),
            VotingErrors::NotEnoughCandidates(n) => {
                write!(f, "at least 2 candidates are required, got {}", n)
            }
            VotingErrors::EmptyCandidateName => write!(f, "a candidate name is empty"),
            VotingErrors::DuplicateCandidate(name) => {
                write!(f, "candidate {:?} is registered twice", name)
            }
            VotingErrors::UnknownCandidate {
                lineno,
                voter_id,
                token,
            } => write!(
                f,
                "line {}: ballot of voter {:?} names unknown candidate {:?}",
                lineno, voter_id, token
            ),
            VotingErrors::MissingFirstChoice { lineno, voter_id } => write!(
                f,
                "line {}: ballot of voter {:?} has no first choice",
                lineno, voter_id
            ),
            VotingErrors::TooManyRankings {
                lineno,
                voter_id,
                count,
            } => write!(
                f,
                "line {}: ballot of voter {:?} ranks {} choices, at most {} are allowed",
                lineno, voter_id, count, MAX_RANKINGS
            ),
            VotingErrors::NoConvergence => write!(f, "the tabulation did not converge"),
        }
    }
}

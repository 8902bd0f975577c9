/*!
Tabulation of single-winner instant-runoff elections.

The candidates are registered once, in a fixed order, with
[`CandidateRegistry`]. Raw rows are validated against an
[`EligibilityRegistry`] by [`ingest_ballots`], then [`run_voting_stats`]
eliminates the last candidate round after round until one candidate is left
or all the remaining candidates are tied.

```
use instant_runoff::*;

let names: Vec<String> = vec!["Anna".to_string(), "Bob".to_string()];
let registry = CandidateRegistry::new(&names)?;
let mut roll = EligibilityRegistry::new(vec!["1", "2", "3"]);
let rows = vec![
    RawBallotRow { lineno: 2, voter_id: "1".to_string(), choices: vec!["Anna".to_string()] },
    RawBallotRow { lineno: 3, voter_id: "2".to_string(), choices: vec!["Anna".to_string()] },
    RawBallotRow { lineno: 4, voter_id: "3".to_string(), choices: vec!["Bob".to_string()] },
];
let ballot_box = ingest_ballots(&rows, &mut roll, &registry)?;
let result = run_voting_stats(&ballot_box, &registry)?;
assert_eq!(result.outcome, Outcome::Winner { name: "Anna".to_string(), votes: 2 });

# Ok::<(), VotingErrors>(())
```
*/
mod ballot;
mod config;
mod ingest;
mod registry;
mod report;

use log::{debug, info, warn};

use std::{
    collections::BTreeMap,
    ops::{Add, AddAssign},
};

pub use crate::ballot::{Advance, Ballot};
pub use crate::config::*;
pub use crate::ingest::{ingest_ballots, BallotBox, EligibilityRegistry};
pub use crate::registry::{CandidateId, CandidateRegistry};
pub use crate::report::render_text;

// **** Private structures ****

type RoundId = u32;

#[derive(Eq, PartialEq, Debug, Clone, Copy, PartialOrd, Ord, Hash)]
struct VoteCount(u64);

impl VoteCount {
    const EMPTY: VoteCount = VoteCount(0);
    const ONE: VoteCount = VoteCount(1);
}

impl std::iter::Sum for VoteCount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        VoteCount(iter.map(|vc| vc.0).sum())
    }
}

impl AddAssign for VoteCount {
    fn add_assign(&mut self, rhs: VoteCount) {
        self.0 += rhs.0;
    }
}

impl Add for VoteCount {
    type Output = VoteCount;
    fn add(self: VoteCount, rhs: VoteCount) -> VoteCount {
        VoteCount(self.0 + rhs.0)
    }
}

// The ballots held by each running candidate.
// Invariant: the bucket sizes plus the exhausted count add up to the number of
// accepted ballots. The map is keyed by CandidateId, so iterating it follows
// the registry order.
#[derive(Eq, PartialEq, Debug, Clone)]
struct RoundState {
    buckets: BTreeMap<CandidateId, Vec<Ballot>>,
    exhausted: VoteCount,
}

impl RoundState {
    // Every candidate starts with a bucket, even without any first choice.
    fn initial(ballots: &[Ballot], registry: &CandidateRegistry) -> RoundState {
        let mut buckets: BTreeMap<CandidateId, Vec<Ballot>> =
            registry.ids().map(|cid| (cid, Vec::new())).collect();
        let mut exhausted = VoteCount::EMPTY;
        for b in ballots.iter() {
            match b.current().and_then(|cid| buckets.get_mut(&cid)) {
                Some(bucket) => bucket.push(b.clone()),
                None => {
                    warn!(
                        "RoundState::initial: ballot of voter {:?} has no registered choice",
                        b.voter_id()
                    );
                    exhausted += VoteCount::ONE;
                }
            }
        }
        RoundState { buckets, exhausted }
    }

    fn tally(&self) -> Vec<(CandidateId, VoteCount)> {
        self.buckets
            .iter()
            .map(|(cid, bucket)| (*cid, VoteCount(bucket.len() as u64)))
            .collect()
    }

    fn active_count(&self) -> VoteCount {
        self.tally().iter().map(|(_, vc)| *vc).sum()
    }
}

#[derive(Eq, PartialEq, Debug, Clone)]
struct EliminationInternal {
    candidate: CandidateId,
    count: VoteCount,
    transfers: Vec<(CandidateId, VoteCount)>,
    exhausted: VoteCount,
}

#[derive(Eq, PartialEq, Debug, Clone)]
struct RoundStatistics {
    tally: Vec<(CandidateId, VoteCount)>,
    exhausted: VoteCount,
    eliminated: Option<EliminationInternal>,
}

#[derive(Eq, PartialEq, Debug, Clone)]
enum RoundTransition {
    Continue(RoundState),
    Winner(CandidateId, VoteCount),
    Tie(Vec<CandidateId>),
}

#[derive(Eq, PartialEq, Debug, Clone)]
struct RoundResult {
    stats: RoundStatistics,
    transition: RoundTransition,
}

/// Runs the instant-runoff tabulation over the accepted ballots.
///
/// The ballot box is left untouched: running it twice gives the same result.
///
/// Arguments:
/// * `ballot_box` the ballots accepted by [`ingest_ballots`]
/// * `registry` the candidates of this election. Its order breaks the ties
/// between candidates with the same number of ballots.
pub fn run_voting_stats(
    ballot_box: &BallotBox,
    registry: &CandidateRegistry,
) -> Result<VotingResult, VotingErrors> {
    info!(
        "run_voting_stats: Processing {:?} ballots, {:?} candidates",
        ballot_box.ballots.len(),
        registry.len()
    );
    if registry.is_empty() {
        return Err(VotingErrors::NoCandidates);
    }
    if ballot_box.ballots.is_empty() || ballot_box.total_votes == 0 {
        return Err(VotingErrors::EmptyElection);
    }
    for cid in registry.ids() {
        info!("Candidate: {}", registry.name(cid));
    }

    let total_votes = VoteCount(ballot_box.total_votes);
    let mut cur_state = RoundState::initial(&ballot_box.ballots, registry);
    let mut cur_stats: Vec<RoundStatistics> = Vec::new();

    // Every round but the last removes one candidate.
    while cur_stats.len() < registry.len() {
        let round_id = (cur_stats.len() + 1) as RoundId;
        debug_assert_eq!(
            cur_state.active_count() + cur_state.exhausted,
            total_votes,
            "round {}: ballots were lost",
            round_id
        );
        let round_res = run_one_round(cur_state);
        info!("Round id: {:?} stats: {:?}", round_id, round_res.stats);
        cur_stats.push(round_res.stats);

        let outcome = match round_res.transition {
            RoundTransition::Continue(next_state) => {
                cur_state = next_state;
                continue;
            }
            RoundTransition::Winner(cid, count) => {
                info!(
                    "run_voting_stats: {} wins with {:?} of {:?} votes",
                    registry.name(cid),
                    count,
                    total_votes
                );
                Outcome::Winner {
                    name: registry.name(cid).to_string(),
                    votes: count.0,
                }
            }
            RoundTransition::Tie(cids) => {
                info!("run_voting_stats: tie between {:?}", cids);
                Outcome::Tie {
                    candidates: cids
                        .iter()
                        .map(|cid| registry.name(*cid).to_string())
                        .collect(),
                }
            }
        };
        return Ok(VotingResult {
            total_votes: total_votes.0,
            round_stats: round_results_to_stats(&cur_stats, registry),
            outcome,
        });
    }
    Err(VotingErrors::NoConvergence)
}

fn round_results_to_stats(
    results: &[RoundStatistics],
    registry: &CandidateRegistry,
) -> Vec<RoundStats> {
    results
        .iter()
        .enumerate()
        .map(|(idx, r)| round_result_to_stat(r, idx as RoundId + 1, registry))
        .collect()
}

fn round_result_to_stat(
    stats: &RoundStatistics,
    round_id: RoundId,
    registry: &CandidateRegistry,
) -> RoundStats {
    let named = |counts: &[(CandidateId, VoteCount)]| -> Vec<(String, u64)> {
        counts
            .iter()
            .map(|(cid, vc)| (registry.name(*cid).to_string(), vc.0))
            .collect()
    };
    RoundStats {
        round: round_id,
        tally: named(stats.tally.as_slice()),
        exhausted: stats.exhausted.0,
        eliminated: stats.eliminated.as_ref().map(|e| EliminationStats {
            name: registry.name(e.candidate).to_string(),
            votes: e.count.0,
            transfers: named(e.transfers.as_slice()),
            exhausted: e.exhausted.0,
        }),
    }
}

/// Tallies the running candidates, then either stops on a tie or removes the
/// last candidate and moves its ballots.
fn run_one_round(mut state: RoundState) -> RoundResult {
    let tally = state.tally();
    debug!("run_one_round: tally: {:?}", tally);
    let exhausted_before = state.exhausted;

    // Only one candidate. It is the winner by any standard.
    if let [(cid, count)] = tally.as_slice() {
        let transition = RoundTransition::Winner(*cid, *count);
        return RoundResult {
            stats: RoundStatistics {
                tally,
                exhausted: exhausted_before,
                eliminated: None,
            },
            transition,
        };
    }

    let (loser, loser_count) = match find_eliminated_candidate(&tally) {
        Some(x) => x,
        None => {
            let tied: Vec<CandidateId> = tally.iter().map(|(cid, _)| *cid).collect();
            debug!("run_one_round: all candidates are tied: {:?}", tied);
            return RoundResult {
                stats: RoundStatistics {
                    tally,
                    exhausted: exhausted_before,
                    eliminated: None,
                },
                transition: RoundTransition::Tie(tied),
            };
        }
    };
    debug!(
        "run_one_round: eliminating {:?} with {:?}",
        loser, loser_count
    );

    let orphaned: Vec<Ballot> = state.buckets.remove(&loser).unwrap_or_default();
    let mut transfers: BTreeMap<CandidateId, VoteCount> = BTreeMap::new();
    let mut exhausted = VoteCount::EMPTY;
    for mut ballot in orphaned {
        match next_running_choice(&mut ballot, &state.buckets) {
            Advance::Next(cid) => {
                *transfers.entry(cid).or_insert(VoteCount::EMPTY) += VoteCount::ONE;
                state.buckets.entry(cid).or_default().push(ballot);
            }
            Advance::Exhausted => {
                debug!(
                    "run_one_round: ballot of voter {:?} is exhausted",
                    ballot.voter_id()
                );
                exhausted += VoteCount::ONE;
            }
        }
    }
    state.exhausted += exhausted;

    let stats = RoundStatistics {
        tally,
        exhausted: exhausted_before,
        eliminated: Some(EliminationInternal {
            candidate: loser,
            count: loser_count,
            transfers: transfers.into_iter().collect(),
            exhausted,
        }),
    };

    let transition = match state.tally().as_slice() {
        [(cid, count)] => RoundTransition::Winner(*cid, *count),
        _ => RoundTransition::Continue(state),
    };
    RoundResult { stats, transition }
}

/// The candidate with the fewest ballots, or None if all the candidates hold
/// the same number of ballots.
///
/// Among several candidates with the fewest ballots, the first one in the
/// registry order is picked.
fn find_eliminated_candidate(
    tally: &[(CandidateId, VoteCount)],
) -> Option<(CandidateId, VoteCount)> {
    let (_, first_count) = tally.first()?;
    if tally.iter().all(|(_, vc)| vc == first_count) {
        return None;
    }
    let mut lowest: Option<(CandidateId, VoteCount)> = None;
    for (cid, vc) in tally.iter() {
        match lowest {
            Some((_, low_vc)) if *vc >= low_vc => {}
            _ => lowest = Some((*cid, *vc)),
        }
    }
    lowest
}

// Skips the preferences for candidates that are no longer running.
fn next_running_choice(
    ballot: &mut Ballot,
    running: &BTreeMap<CandidateId, Vec<Ballot>>,
) -> Advance {
    loop {
        match ballot.advance() {
            Advance::Next(cid) if running.contains_key(&cid) => return Advance::Next(cid),
            Advance::Next(_) => {}
            Advance::Exhausted => return Advance::Exhausted,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry(names: &[&str]) -> CandidateRegistry {
        let names: Vec<String> = names.iter().map(|s| s.to_string()).collect();
        CandidateRegistry::new(&names).unwrap()
    }

    // One ballot per entry, voter ids are the positions.
    fn ballot_box(reg: &CandidateRegistry, votes: &[&[&str]]) -> BallotBox {
        let rows: Vec<RawBallotRow> = votes
            .iter()
            .enumerate()
            .map(|(idx, choices)| RawBallotRow {
                lineno: idx + 2,
                voter_id: format!("{}", idx + 1),
                choices: choices.iter().map(|s| s.to_string()).collect(),
            })
            .collect();
        let mut roll = EligibilityRegistry::new((1..=votes.len()).map(|i| format!("{}", i)));
        ingest_ballots(&rows, &mut roll, reg).unwrap()
    }

    fn tally(entries: &[(&str, u64)]) -> Vec<(String, u64)> {
        entries.iter().map(|(n, c)| (n.to_string(), *c)).collect()
    }

    fn check_ballot_conservation(res: &VotingResult) {
        for rs in res.round_stats.iter() {
            let active: u64 = rs.tally.iter().map(|(_, c)| *c).sum();
            assert_eq!(active + rs.exhausted, res.total_votes, "round {}", rs.round);
        }
    }

    #[test]
    fn clear_winner() {
        let _ = env_logger::builder().is_test(true).try_init();
        let reg = registry(&["A", "B", "C"]);
        let bb = ballot_box(
            &reg,
            &[&["A", "B"], &["A", "C"], &["B", "A"], &["C", "A"], &["C", "B"]],
        );
        let res = run_voting_stats(&bb, &reg).unwrap();

        assert_eq!(res.total_votes, 5);
        assert_eq!(res.round_stats.len(), 2);

        let r1 = &res.round_stats[0];
        assert_eq!(r1.tally, tally(&[("A", 2), ("B", 1), ("C", 2)]));
        assert_eq!(
            r1.eliminated,
            Some(EliminationStats {
                name: "B".to_string(),
                votes: 1,
                transfers: tally(&[("A", 1)]),
                exhausted: 0,
            })
        );

        let r2 = &res.round_stats[1];
        assert_eq!(r2.tally, tally(&[("A", 3), ("C", 2)]));
        // C>A moves to A, C>B has nowhere to go.
        assert_eq!(
            r2.eliminated,
            Some(EliminationStats {
                name: "C".to_string(),
                votes: 2,
                transfers: tally(&[("A", 1)]),
                exhausted: 1,
            })
        );

        assert_eq!(
            res.outcome,
            Outcome::Winner {
                name: "A".to_string(),
                votes: 4
            }
        );
        assert_eq!(res.winner_percentage(), Some(80.0));
        check_ballot_conservation(&res);
    }

    #[test]
    fn two_way_tie() {
        let reg = registry(&["A", "B"]);
        let bb = ballot_box(&reg, &[&["A"], &["B"]]);
        let res = run_voting_stats(&bb, &reg).unwrap();
        assert_eq!(res.round_stats.len(), 1);
        assert_eq!(res.round_stats[0].tally, tally(&[("A", 1), ("B", 1)]));
        assert_eq!(res.round_stats[0].eliminated, None);
        assert_eq!(
            res.outcome,
            Outcome::Tie {
                candidates: vec!["A".to_string(), "B".to_string()]
            }
        );
        assert_eq!(res.winner_percentage(), None);
    }

    #[test]
    fn tie_after_eliminations() {
        let reg = registry(&["A", "B", "C"]);
        let bb = ballot_box(&reg, &[&["A", "B"], &["B"], &["C"], &["C"]]);
        let res = run_voting_stats(&bb, &reg).unwrap();
        assert_eq!(res.round_stats.len(), 2);
        assert_eq!(res.round_stats[1].tally, tally(&[("B", 2), ("C", 2)]));
        assert_eq!(
            res.outcome,
            Outcome::Tie {
                candidates: vec!["B".to_string(), "C".to_string()]
            }
        );
    }

    #[test]
    fn exhausted_ballot_stays_in_total() {
        let reg = registry(&["A", "B", "C"]);
        let bb = ballot_box(&reg, &[&["A"], &["B"], &["B"], &["C"], &["C"], &["C"]]);
        let res = run_voting_stats(&bb, &reg).unwrap();

        let r1 = &res.round_stats[0];
        assert_eq!(r1.exhausted, 0);
        assert_eq!(r1.eliminated.as_ref().map(|e| e.exhausted), Some(1));

        let r2 = &res.round_stats[1];
        assert_eq!(r2.tally, tally(&[("B", 2), ("C", 3)]));
        assert_eq!(r2.exhausted, 1);
        assert_eq!(res.total_votes, 6);

        assert_eq!(
            res.outcome,
            Outcome::Winner {
                name: "C".to_string(),
                votes: 3
            }
        );
        assert_eq!(res.winner_percentage(), Some(50.0));
        check_ballot_conservation(&res);
    }

    #[test]
    fn transfer_skips_eliminated_candidates() {
        let reg = registry(&["A", "B", "C", "D"]);
        // Round 1 removes B, round 2 removes A: the A>B>D ballot must land on D.
        let bb = ballot_box(
            &reg,
            &[
                &["A", "B", "D"],
                &["A", "C"],
                &["B", "C"],
                &["C"],
                &["C"],
                &["C"],
                &["D"],
                &["D"],
                &["D"],
            ],
        );
        let res = run_voting_stats(&bb, &reg).unwrap();
        assert_eq!(res.round_stats.len(), 3);

        let r1 = &res.round_stats[0];
        assert_eq!(r1.tally, tally(&[("A", 2), ("B", 1), ("C", 3), ("D", 3)]));
        assert_eq!(r1.eliminated.as_ref().unwrap().name, "B");

        let r2 = &res.round_stats[1];
        assert_eq!(r2.tally, tally(&[("A", 2), ("C", 4), ("D", 3)]));
        assert_eq!(
            r2.eliminated,
            Some(EliminationStats {
                name: "A".to_string(),
                votes: 2,
                transfers: tally(&[("C", 1), ("D", 1)]),
                exhausted: 0,
            })
        );

        let r3 = &res.round_stats[2];
        assert_eq!(r3.tally, tally(&[("C", 5), ("D", 4)]));
        assert_eq!(r3.eliminated.as_ref().map(|e| e.exhausted), Some(4));
        assert_eq!(
            res.outcome,
            Outcome::Winner {
                name: "C".to_string(),
                votes: 5
            }
        );
        check_ballot_conservation(&res);
    }

    #[test]
    fn lowest_tie_goes_by_registry_order() {
        let votes: &[&[&str]] = &[&["C"], &["B"], &["A"], &["A"]];

        let reg = registry(&["A", "B", "C"]);
        let res = run_voting_stats(&ballot_box(&reg, votes), &reg).unwrap();
        assert_eq!(res.round_stats[0].eliminated.as_ref().unwrap().name, "B");
        assert_eq!(res.round_stats[1].eliminated.as_ref().unwrap().name, "C");

        let reg = registry(&["C", "B", "A"]);
        let res = run_voting_stats(&ballot_box(&reg, votes), &reg).unwrap();
        assert_eq!(res.round_stats[0].eliminated.as_ref().unwrap().name, "C");
        assert_eq!(res.round_stats[1].eliminated.as_ref().unwrap().name, "B");
    }

    #[test]
    fn candidates_without_votes_are_removed_first() {
        let reg = registry(&["A", "B", "C"]);
        let bb = ballot_box(&reg, &[&["A"], &["A"]]);
        let res = run_voting_stats(&bb, &reg).unwrap();
        assert_eq!(res.round_stats[0].tally, tally(&[("A", 2), ("B", 0), ("C", 0)]));
        let e = res.round_stats[0].eliminated.clone().unwrap();
        assert_eq!(e.name, "B");
        assert_eq!(e.votes, 0);
        assert!(e.transfers.is_empty());
        assert_eq!(res.winner_percentage(), Some(100.0));
    }

    #[test]
    fn one_candidate_removed_per_round() {
        let reg = registry(&["A", "B", "C", "D", "E"]);
        let bb = ballot_box(
            &reg,
            &[
                &["A", "B", "C"],
                &["B", "C", "D"],
                &["C", "D", "E"],
                &["D", "E", "A"],
                &["E", "A", "B"],
                &["A", "C", "E"],
                &["B", "D"],
                &["C", "A"],
                &["A"],
                &["E", "B"],
                &["D", "C", "B"],
            ],
        );
        let res = run_voting_stats(&bb, &reg).unwrap();
        for (idx, rs) in res.round_stats.iter().enumerate() {
            assert_eq!(rs.tally.len(), reg.len() - idx);
        }
        check_ballot_conservation(&res);
    }

    #[test]
    fn rerun_is_identical() {
        let reg = registry(&["A", "B", "C"]);
        let bb = ballot_box(
            &reg,
            &[&["A", "B"], &["A", "C"], &["B", "A"], &["C", "A"], &["C", "B"]],
        );
        let first = run_voting_stats(&bb, &reg).unwrap();
        let second = run_voting_stats(&bb, &reg).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn empty_election_is_rejected() {
        let reg = registry(&["A", "B"]);
        assert_eq!(
            run_voting_stats(&BallotBox::default(), &reg),
            Err(VotingErrors::EmptyElection)
        );
    }

    #[test]
    fn elimination_choice() {
        let reg = registry(&["A", "B", "C"]);
        let ids: Vec<CandidateId> = reg.ids().collect();
        let t = vec![
            (ids[0], VoteCount(3)),
            (ids[1], VoteCount(1)),
            (ids[2], VoteCount(1)),
        ];
        assert_eq!(find_eliminated_candidate(&t), Some((ids[1], VoteCount(1))));
        let t = vec![(ids[0], VoteCount(2)), (ids[2], VoteCount(2))];
        assert_eq!(find_eliminated_candidate(&t), None);
        assert_eq!(find_eliminated_candidate(&[]), None);
    }
}

use crate::registry::{CandidateId, CandidateRegistry};

/// The outcome of moving a ballot to its next preference.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum Advance {
    Next(CandidateId),
    Exhausted,
}

/// One accepted vote.
///
/// Invariant: `preferences` is never empty and holds no duplicate.
/// While the ballot is active, `cursor` points into `preferences`.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Ballot {
    voter_id: String,
    preferences: Vec<CandidateId>,
    cursor: usize,
}

impl Ballot {
    /// Only the ingestion builds ballots, once the preferences are checked.
    pub(crate) fn new(voter_id: String, preferences: Vec<CandidateId>) -> Ballot {
        debug_assert!(!preferences.is_empty());
        Ballot {
            voter_id,
            preferences,
            cursor: 0,
        }
    }

    pub fn voter_id(&self) -> &str {
        self.voter_id.as_str()
    }

    pub fn preferences(&self) -> &[CandidateId] {
        &self.preferences
    }

    /// The candidate this ballot currently counts for.
    pub fn current(&self) -> Option<CandidateId> {
        self.preferences.get(self.cursor).cloned()
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.preferences.len()
    }

    pub(crate) fn advance(&mut self) -> Advance {
        if self.cursor < self.preferences.len() {
            self.cursor += 1;
        }
        match self.current() {
            Some(cid) => Advance::Next(cid),
            None => Advance::Exhausted,
        }
    }

    /// Audit form: `<voter_id>:  1: <c1>, 2: <c2>, `
    pub fn describe(&self, registry: &CandidateRegistry) -> String {
        let mut s = format!("{}:  ", self.voter_id);
        for (idx, cid) in self.preferences.iter().enumerate() {
            s.push_str(format!("{}: {}, ", idx + 1, registry.name(*cid)).as_str());
        }
        s
    }
}
